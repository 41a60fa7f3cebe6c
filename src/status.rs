use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity class attached to every status label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Good,
    Warning,
    Danger,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Good => "good",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
        };
        f.write_str(s)
    }
}

/// Severity ladder shared by every built-in sensor table.
pub const DEFAULT_SEVERITIES: [Severity; 4] = [
    Severity::Danger,
    Severity::Good,
    Severity::Warning,
    Severity::Danger,
];

// ---------------------------------------------------------------------------
// StatusTable
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatusResult {
    pub label: String,
    pub severity: Severity,
}

/// One bracket of a [`StatusTable`]: values strictly below `upper_bound`
/// (and not below any earlier bound) get this label.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusBand {
    pub upper_bound: f64,
    pub label: String,
    pub severity: Severity,
}

#[derive(Debug, Error, PartialEq)]
pub enum StatusTableError {
    #[error("expected {expected} labels for {thresholds} thresholds, got {got}")]
    LabelCount {
        thresholds: usize,
        expected: usize,
        got: usize,
    },
    #[error("expected {expected} severities for {thresholds} thresholds, got {got}")]
    SeverityCount {
        thresholds: usize,
        expected: usize,
        got: usize,
    },
    #[error("thresholds must be ascending: {prev} is followed by {next}")]
    NotAscending { prev: f64, next: f64 },
    #[error("threshold {index} is not a finite number: {value}")]
    NonFinite { index: usize, value: f64 },
}

/// Ordered lookup table mapping a reading to a status.
///
/// Lookup is a linear scan over `bands` in ascending order; the first band
/// whose `upper_bound` is strictly greater than the value wins. A value
/// equal to a bound therefore lands in the next band up. Values not below
/// any bound (including `+inf` and `NaN`) get the `top` status.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusTable {
    bands: Vec<StatusBand>,
    top: StatusResult,
}

impl StatusTable {
    /// Build a table from the positional form: `thresholds` of length N,
    /// `labels` and `severities` of length N + 1.
    pub fn from_ladder(
        thresholds: &[f64],
        labels: &[&str],
        severities: &[Severity],
    ) -> Result<Self, StatusTableError> {
        let expected = thresholds.len() + 1;
        if labels.len() != expected {
            return Err(StatusTableError::LabelCount {
                thresholds: thresholds.len(),
                expected,
                got: labels.len(),
            });
        }
        if severities.len() != expected {
            return Err(StatusTableError::SeverityCount {
                thresholds: thresholds.len(),
                expected,
                got: severities.len(),
            });
        }
        if let Some((index, &value)) = thresholds.iter().enumerate().find(|(_, t)| !t.is_finite()) {
            return Err(StatusTableError::NonFinite { index, value });
        }
        if let Some(w) = thresholds.windows(2).find(|w| !(w[0] < w[1])) {
            return Err(StatusTableError::NotAscending { prev: w[0], next: w[1] });
        }

        let bands = thresholds
            .iter()
            .zip(labels)
            .zip(severities)
            .map(|((&upper_bound, label), &severity)| StatusBand {
                upper_bound,
                label: (*label).to_owned(),
                severity,
            })
            .collect();

        Ok(Self {
            bands,
            top: StatusResult {
                label: labels[thresholds.len()].to_owned(),
                severity: severities[thresholds.len()],
            },
        })
    }

    pub fn evaluate(&self, value: f64) -> StatusResult {
        self.bands
            .iter()
            .find(|band| value < band.upper_bound)
            .map(|band| StatusResult {
                label: band.label.clone(),
                severity: band.severity,
            })
            .unwrap_or_else(|| self.top.clone())
    }

    /// Position of the band `value` falls into, `bands.len()` for the top band.
    pub fn band_index(&self, value: f64) -> usize {
        self.bands
            .iter()
            .position(|band| value < band.upper_bound)
            .unwrap_or(self.bands.len())
    }

    pub fn bands(&self) -> &[StatusBand] {
        &self.bands
    }
}

// ---------------------------------------------------------------------------
// Built-in sensor tables
// ---------------------------------------------------------------------------

fn builtin(thresholds: &[f64], labels: &[&str]) -> StatusTable {
    match StatusTable::from_ladder(thresholds, labels, &DEFAULT_SEVERITIES) {
        Ok(table) => table,
        Err(e) => unreachable!("built-in status table is malformed: {e}"),
    }
}

pub fn water_level_table() -> StatusTable {
    builtin(&[20.0, 40.0, 60.0], &["Low", "Average", "Good", "High"])
}

pub fn ph_table() -> StatusTable {
    builtin(&[5.5, 6.5, 7.5], &["Acidic", "Good", "Average", "Alkaline"])
}

pub fn water_temp_table() -> StatusTable {
    builtin(&[10.0, 20.0, 30.0], &["Cold", "Good", "Warm", "Hot"])
}

pub fn air_quality_table() -> StatusTable {
    builtin(&[50.0, 100.0, 150.0], &["Good", "Average", "Bad", "Hazardous"])
}

pub fn flow_table() -> StatusTable {
    builtin(&[1.0, 3.0, 5.0], &["Low", "Average", "Good", "High"])
}

/// Air-quality labels that raise a user-facing alert.
pub const AIR_QUALITY_HAZARDOUS: [&str; 2] = ["Bad", "Hazardous"];

#[cfg(test)]
mod tests {
    use super::*;

    const LABELS: [&str; 4] = ["Low", "Average", "Good", "High"];

    #[test]
    fn water_level_45_lands_in_third_band() {
        // 45 is not < 40 but is < 60.
        let r = water_level_table().evaluate(45.0);
        assert_eq!(r.label, "Good");
        assert_eq!(r.severity, Severity::Warning);
    }

    #[test]
    fn caller_supplied_severities_map_positionally() {
        let table = StatusTable::from_ladder(
            &[20.0, 40.0, 60.0],
            &LABELS,
            &[Severity::Danger, Severity::Good, Severity::Good, Severity::Danger],
        )
        .unwrap();
        assert_eq!(table.evaluate(30.0).label, "Average");
        assert_eq!(table.evaluate(30.0).severity, Severity::Good);
    }

    #[test]
    fn value_equal_to_threshold_goes_to_band_above() {
        let table = water_level_table();
        assert_eq!(table.evaluate(20.0).label, "Average");
        assert_eq!(table.evaluate(40.0).label, "Good");
        assert_eq!(table.evaluate(60.0).label, "High");
        assert_eq!(table.evaluate(19.999).label, "Low");
    }

    #[test]
    fn air_quality_150_is_hazardous() {
        let r = air_quality_table().evaluate(150.0);
        assert_eq!(r.label, "Hazardous");
        assert_eq!(r.severity, Severity::Danger);
        assert!(AIR_QUALITY_HAZARDOUS.contains(&r.label.as_str()));
    }

    #[test]
    fn zero_reading_falls_in_first_band() {
        assert_eq!(ph_table().evaluate(0.0).label, "Acidic");
        assert_eq!(flow_table().evaluate(0.0).label, "Low");
        assert_eq!(water_temp_table().evaluate(0.0).severity, Severity::Danger);
    }

    #[test]
    fn negative_and_huge_values_are_total() {
        let table = water_temp_table();
        assert_eq!(table.evaluate(-40.0).label, "Cold");
        assert_eq!(table.evaluate(f64::INFINITY).label, "Hot");
        assert_eq!(table.evaluate(f64::NAN).label, "Hot");
    }

    #[test]
    fn band_index_is_non_decreasing_in_value() {
        let table = air_quality_table();
        let mut prev = 0;
        for step in 0..400 {
            let idx = table.band_index(step as f64 * 0.5);
            assert!(idx >= prev, "index dropped at value {}", step as f64 * 0.5);
            prev = idx;
        }
        assert_eq!(prev, 3);
    }

    #[test]
    fn evaluate_matches_band_index() {
        let table = ph_table();
        let labels = ["Acidic", "Good", "Average", "Alkaline"];
        for v in [0.0, 5.4, 5.5, 6.0, 6.5, 7.0, 7.5, 14.0] {
            assert_eq!(table.evaluate(v).label, labels[table.band_index(v)]);
        }
    }

    #[test]
    fn label_count_mismatch_is_rejected() {
        let err = StatusTable::from_ladder(&[1.0, 2.0], &["a", "b"], &DEFAULT_SEVERITIES[..3])
            .unwrap_err();
        assert_eq!(
            err,
            StatusTableError::LabelCount { thresholds: 2, expected: 3, got: 2 }
        );
    }

    #[test]
    fn severity_count_mismatch_is_rejected() {
        let err = StatusTable::from_ladder(&[1.0], &["a", "b"], &DEFAULT_SEVERITIES).unwrap_err();
        assert!(err.to_string().contains("severities"));
    }

    #[test]
    fn descending_thresholds_are_rejected() {
        let err = StatusTable::from_ladder(&[5.0, 3.0], &["a", "b", "c"], &DEFAULT_SEVERITIES[..3])
            .unwrap_err();
        assert!(matches!(err, StatusTableError::NotAscending { .. }));
    }

    #[test]
    fn non_finite_thresholds_are_rejected() {
        let err = StatusTable::from_ladder(&[f64::NAN], &["a", "b"], &DEFAULT_SEVERITIES[..2])
            .unwrap_err();
        assert!(matches!(err, StatusTableError::NonFinite { index: 0, .. }));

        let err = StatusTable::from_ladder(
            &[1.0, f64::INFINITY],
            &["a", "b", "c"],
            &DEFAULT_SEVERITIES[..3],
        )
        .unwrap_err();
        assert!(matches!(err, StatusTableError::NonFinite { index: 1, .. }));
    }

    #[test]
    fn empty_ladder_always_returns_the_only_label() {
        let table = StatusTable::from_ladder(&[], &["Only"], &[Severity::Good]).unwrap();
        assert!(table.bands().is_empty());
        assert_eq!(table.evaluate(-1e9).label, "Only");
        assert_eq!(table.evaluate(1e9).label, "Only");
    }
}

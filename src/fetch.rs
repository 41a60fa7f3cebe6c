use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// Failure of a single upstream request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("{url} returned a body that does not match the expected JSON: {source}")]
    Malformed {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Send `req`, require a 2xx status and return the raw body.
pub(crate) async fn send(url: &str, req: RequestBuilder) -> FetchResult<Vec<u8>> {
    let resp = req.send().await.map_err(|source| FetchError::Transport {
        url: url.to_owned(),
        source,
    })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_owned(),
            status,
        });
    }

    let bytes = resp.bytes().await.map_err(|source| FetchError::Transport {
        url: url.to_owned(),
        source,
    })?;
    debug!(url = %url, bytes = bytes.len(), "Upstream response received");

    Ok(bytes.to_vec())
}

/// Send `req` and decode the body as `T`.
pub(crate) async fn json<T: DeserializeOwned>(url: &str, req: RequestBuilder) -> FetchResult<T> {
    let body = send(url, req).await?;
    decode(url, &body)
}

pub(crate) fn decode<T: DeserializeOwned>(url: &str, body: &[u8]) -> FetchResult<T> {
    serde_json::from_slice(body).map_err(|source| FetchError::Malformed {
        url: url.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize)]
    struct Probe {
        #[allow(dead_code)]
        pump: bool,
    }

    #[test]
    fn decode_reports_malformed_body_with_url() {
        let err = decode::<Probe>("http://db/controls.json", b"<html>oops</html>").unwrap_err();
        assert!(matches!(err, FetchError::Malformed { .. }));
        assert!(err.to_string().contains("http://db/controls.json"));
    }

    #[test]
    fn decode_accepts_valid_json() {
        let p: Option<Probe> = decode("u", br#"{"pump":true}"#).unwrap();
        assert!(p.is_some());
        let none: Option<Probe> = decode("u", b"null").unwrap();
        assert!(none.is_none());
    }
}

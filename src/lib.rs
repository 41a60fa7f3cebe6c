pub mod alerts;
pub mod api;
pub mod config;
pub mod dashboard;
pub mod fetch;
pub mod firebase;
pub mod history;
pub mod panels;
pub mod poller;
pub mod preferences;
pub mod pump;
pub mod status;
pub mod weather;

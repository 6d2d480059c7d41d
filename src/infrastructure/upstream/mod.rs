//! Upstream campaign results API client.

pub mod http_results_source;

pub use http_results_source::{HttpResultsSource, HttpSourceBuildError, PUBLIC_ACCESS_HEADER};

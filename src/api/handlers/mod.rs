//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod shared_reports;

pub use health::health_handler;
pub use shared_reports::{
    create_shared_report_handler, get_shared_report_handler, revoke_shared_report_handler,
};

//! Helper functions used across the application.
//!
//! - [`share_id`] - Share identifier generation and validation

pub mod share_id;

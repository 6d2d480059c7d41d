//! Application layer services implementing business logic.
//!
//! Services consume the domain traits ([`crate::domain::repositories`] and
//! [`crate::domain::sources`]) and expose the operations HTTP handlers and
//! the operator CLI call.
//!
//! # Available Services
//!
//! - [`services::share_link_service::ShareLinkService`] - Share link registry
//! - [`services::report_gateway::ReportGateway`] - Upstream fetch with credential fallback
//! - [`services::report_service::ReportService`] - Public report orchestration

pub mod services;

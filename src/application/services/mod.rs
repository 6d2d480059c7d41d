//! Business logic services for the application layer.

pub mod report_gateway;
pub mod report_service;
pub mod share_link_service;

pub use report_gateway::{
    AuthorizedPage, CredentialStrategy, GatewayError, GatewaySettings, ReportGateway,
};
pub use report_service::{CreatedShareLink, ReportService, ReportSettings, SharedReport};
pub use share_link_service::{LinkValidation, ShareLinkService};

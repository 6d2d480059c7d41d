//! Core domain entities.
//!
//! # Entity Types
//!
//! - [`ShareLink`] - A time-bounded, revocable public report identifier
//! - [`RawPostRecord`] - One post's metrics as returned by the upstream source
//! - [`ResultsPage`] - A page of raw records plus the upstream total

pub mod post_record;
pub mod share_link;

pub use post_record::{RawPostRecord, ResultsPage};
pub use share_link::{Deactivation, LinkStatus, ShareLink};

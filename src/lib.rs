//! Step-wise data donation flow.
//!
//! Validates an uploaded platform export, extracts reviewable tables from it,
//! and walks a participant through consent, donation, and a short
//! questionnaire by exchanging [`protocol::Command`] and [`protocol::Payload`]
//! values with a host.
pub mod archive;
pub mod config;
pub mod extract;
pub mod flow;
pub mod form;
pub mod host;
pub mod platform;
pub mod props;
pub mod protocol;
pub mod session_log;
pub mod table;
pub mod validate;

pub use flow::{DonationFlow, FlowError};
pub use protocol::{Command, Payload};

//! RAPI over HTTP.
//!
//! [`HttpRapiClient`] implements [`rwl_core::RapiClient`] on top of
//! `reqwest`, speaking version 2 of the remote API with basic
//! authentication.
mod error;
pub use error::ClientError;

mod query;

mod http;
pub use http::{HttpRapiClient, base_url};

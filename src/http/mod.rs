//! HTTP client module
//!
//! Provides the bounded request primitives the scanner is built on:
//! a reqwest wrapper, the response model, host resolution and the
//! primary probe.

mod client;
mod dns;
mod probe;
mod response;

pub use client::{HttpClient, Redirects};
pub use dns::Resolver;
pub use probe::{Probe, Prober};
pub use response::{header, Response};

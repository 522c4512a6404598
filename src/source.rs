//! In-memory implementations of trust anchor, certificate and CRL sources

pub mod cert_source;
pub mod crl_source;
pub mod ta_source;

pub use crate::source::{cert_source::*, crl_source::*, ta_source::*};

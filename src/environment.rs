//! Structures and traits that provide crypto, storage and validation capabilities to path
//! processing operations

pub mod pki_environment;
pub mod pki_environment_traits;

pub use crate::environment::{pki_environment::*, pki_environment_traits::*};

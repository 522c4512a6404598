//! Certification path building via depth-first backtracking search

pub mod path_builder;

pub use crate::builder::path_builder::*;

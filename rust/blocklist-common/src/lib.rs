//! Core definitions shared by all blocklist-* crates: the error taxonomy and
//! result helpers.

pub mod error;
pub mod result;

pub use result::Result;

//! Core types and trait definitions for the Factbook archive.
//!
//! No markup, regex or database dependencies live here; every other crate
//! in the workspace builds on these types.

// The store trait spells out `Send` futures itself.
#![allow(async_fn_in_trait)]

pub mod entity;
pub mod error;
pub mod mapping;
pub mod parsed;
pub mod record;
pub mod store;
pub mod subvalue;
pub mod validate;

pub use error::{Error, Result};

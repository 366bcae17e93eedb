//! Domain types and validation shared by the database and API crates.
//!
//! Nothing in here performs I/O.

pub mod category;
pub mod error;
pub mod task;
pub mod types;

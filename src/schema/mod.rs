//! Reverse-engineering table mappings from live database schema

pub mod infer;
pub mod raw_types;
pub mod reverse;
pub mod source;
pub mod sqlite;

pub use infer::*;
pub use raw_types::*;
pub use reverse::*;
pub use source::*;
pub use sqlite::*;

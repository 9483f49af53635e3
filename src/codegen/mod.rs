//! Source emission for resolved table mappings

pub mod rust;

pub use rust::{emit_declaration, emit_module};

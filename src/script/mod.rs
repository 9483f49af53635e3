//! SQL script fragments over resolved table mappings

pub mod fragments;
pub mod statements;

pub use fragments::ColumnSet;

//! Naming rules: database-form and view-form transformations of identifiers

pub mod ident;
pub mod rules;

pub use ident::*;
pub use rules::*;

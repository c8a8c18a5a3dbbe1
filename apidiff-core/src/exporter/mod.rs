//! Serialization of surfaces and change lists.

pub mod json;

pub use json::{export_changes, export_surface, import_surface};

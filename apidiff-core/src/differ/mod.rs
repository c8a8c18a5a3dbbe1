//! Surface differ and severity classifier.
//!
//! Compares two [`ApiSurface`](crate::types::ApiSurface) values and emits
//! typed, severity-ranked [`Change`] records.
//!
//! # Features
//!
//! - **Declaration-level diffing**: functions, parameters, return types,
//!   interfaces, properties, base interfaces, type aliases
//! - **Compatibility rules**: additive optional members are never reported
//! - **Severity classification**: a fixed lookup per change kind
//! - **Batch diffing**: many files at once via Rayon
//!
//! # Example
//!
//! ```
//! use apidiff_core::differ::{detect_breaking_changes, ChangeKind};
//! use apidiff_core::parser::parse_api_surface;
//!
//! let old = parse_api_surface("export function goodbye(name: string): string {}", "a.ts");
//! let new = parse_api_surface("", "a.ts");
//!
//! let changes = detect_breaking_changes(&old, &new);
//! assert_eq!(changes[0].kind, ChangeKind::FunctionRemoved);
//! ```

pub mod changes;
pub mod comparator;

pub use changes::{Change, ChangeKind, DiffReport, DiffSummary, Severity};
pub use comparator::{
    detect_breaking_changes, detect_breaking_changes_batch, detect_breaking_changes_with,
};

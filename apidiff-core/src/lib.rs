//! apidiff core - API surface extraction, breaking-change detection and
//! documentation impact analysis.
//!
//! Works on two snapshots of a source file: each snapshot is reduced to its
//! exported contract, the two contracts are compared, and every difference
//! is classified by severity. The change list can then be cross-referenced
//! against a documentation corpus to find reference pages that need an
//! update.
//!
//! # Features
//!
//! - **Tolerant parsing**: exported functions, interfaces and type aliases
//!   are recognized without a full grammar; unparseable input yields an
//!   empty surface, never an error
//! - **Severity classification**: `critical`, `major` or `minor` per change
//! - **Documentation impact**: whole-word symbol search over reference docs
//! - **Parallel batches**: many files at once via Rayon
//!
//! # Example
//!
//! ```
//! use apidiff_core::{analyze_documentation_impact, detect_breaking_changes, parse_api_surface};
//! use apidiff_core::impact::DocumentationArtifact;
//!
//! let old = parse_api_surface(
//!     "export function greet(name: string): string {}\nexport function goodbye(name: string): string {}",
//!     "src/api.ts",
//! );
//! let new = parse_api_surface(
//!     "export function greet(name: string, title: string): string {}",
//!     "src/api.ts",
//! );
//!
//! let changes = detect_breaking_changes(&old, &new);
//! assert_eq!(changes.len(), 2);
//!
//! let docs = vec![DocumentationArtifact::new("docs/api.md", "Use goodbye() to leave.", "api")];
//! assert_eq!(analyze_documentation_impact(&changes, &docs), vec!["docs/api.md"]);
//! ```

pub mod config;
pub mod differ;
pub mod error;
pub mod exporter;
pub mod impact;
pub mod parser;
pub mod types;

pub use config::{Config, DiffOptions, ImpactOptions};
pub use differ::{
    detect_breaking_changes, detect_breaking_changes_batch, detect_breaking_changes_with, Change,
    ChangeKind, DiffReport, Severity,
};
pub use error::{ApiDiffError, Result};
pub use impact::{analyze_documentation_impact, analyze_documentation_impact_with, DocumentationArtifact};
pub use parser::{parse_api_surface, parse_sources_parallel};
pub use types::ApiSurface;

/// Get the version of apidiff-core.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

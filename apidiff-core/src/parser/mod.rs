//! API surface parsing.
//!
//! A tolerant scanner, not a grammar: it looks for exported functions,
//! interfaces and type aliases and skips whatever it does not understand.
//! Parsing never fails; callers that need "no exports found" feedback
//! check [`ApiSurface::is_empty`].

use rayon::prelude::*;
use tracing::debug;

use crate::types::{ApiSurface, SourceFile};

pub mod typescript;

mod helpers;

/// Parse one source snapshot into its exported API surface.
///
/// `file_path` is provenance only and is never opened.
pub fn parse_api_surface(source: &str, file_path: &str) -> ApiSurface {
    let surface = typescript::parse(source, file_path);
    debug!(
        file = file_path,
        functions = surface.functions.len(),
        interfaces = surface.interfaces.len(),
        types = surface.types.len(),
        "parsed api surface"
    );
    surface
}

/// Parse multiple snapshots in parallel using rayon.
///
/// Output order matches input order. A dedicated pool is built when
/// `num_threads` is given; otherwise the global pool is used.
pub fn parse_sources_parallel(files: &[SourceFile], num_threads: Option<usize>) -> Vec<ApiSurface> {
    let pool = match num_threads {
        Some(n) if n > 0 => rayon::ThreadPoolBuilder::new().num_threads(n).build().ok(),
        _ => None,
    };

    let parse_fn = |file: &SourceFile| parse_api_surface(&file.source, &file.path);

    match pool {
        Some(pool) => pool.install(|| files.par_iter().map(parse_fn).collect()),
        None => files.par_iter().map(parse_fn).collect(),
    }
}

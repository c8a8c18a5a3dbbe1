//! JSON format exporter.

use serde::Serialize;

use crate::differ::Change;
use crate::error::Result;
use crate::types::ApiSurface;

fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

/// Export a change list as a JSON array.
pub fn export_changes(changes: &[Change], pretty: bool) -> Result<String> {
    to_json(changes, pretty)
}

/// Export a parsed surface.
pub fn export_surface(surface: &ApiSurface, pretty: bool) -> Result<String> {
    to_json(surface, pretty)
}

/// Load a surface previously written by [`export_surface`].
pub fn import_surface(json: &str) -> Result<ApiSurface> {
    Ok(serde_json::from_str(json)?)
}

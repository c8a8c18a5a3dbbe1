//! Comparator logic for diffing API surfaces.
//!
//! All comparisons are on raw type text: `string | null` and
//! `string|null` differ. Changes come out in a fixed order: functions,
//! then interfaces, then types; within each, old-surface order for
//! removals and modifications, then new-surface order for additions.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use tracing::debug;

use crate::config::DiffOptions;
use crate::differ::changes::{Change, ChangeKind};
use crate::types::{ApiSurface, FunctionSignature, InterfaceDef, TypeAliasDef};

/// Compare two surfaces with the default policy.
pub fn detect_breaking_changes(old: &ApiSurface, new: &ApiSurface) -> Vec<Change> {
    detect_breaking_changes_with(old, new, &DiffOptions::default())
}

/// Compare two surfaces.
pub fn detect_breaking_changes_with(
    old: &ApiSurface,
    new: &ApiSurface,
    options: &DiffOptions,
) -> Vec<Change> {
    let file_path = if new.file_path.is_empty() {
        old.file_path.as_str()
    } else {
        new.file_path.as_str()
    };

    let mut changes = Vec::new();
    diff_functions(old, new, file_path, options, &mut changes);
    diff_interfaces(old, new, file_path, options, &mut changes);
    diff_types(old, new, file_path, &mut changes);

    debug!(
        file = file_path,
        changes = changes.len(),
        breaking = changes.iter().filter(|c| c.is_breaking()).count(),
        "diffed api surface"
    );
    changes
}

/// Diff many files at once, pairing surfaces by `file_path`.
///
/// A path present on one side only is compared with an empty surface, so
/// a deleted file reports all its exports as removed. Output follows the
/// old list's order, then paths only found in the new list.
pub fn detect_breaking_changes_batch(
    old_surfaces: &[ApiSurface],
    new_surfaces: &[ApiSurface],
    options: &DiffOptions,
) -> Vec<Change> {
    let new_by_path: HashMap<&str, &ApiSurface> = new_surfaces
        .iter()
        .map(|s| (s.file_path.as_str(), s))
        .collect();
    let old_paths: HashSet<&str> = old_surfaces.iter().map(|s| s.file_path.as_str()).collect();

    let mut pairs: Vec<(ApiSurface, ApiSurface)> = Vec::new();
    for old in old_surfaces {
        let new = new_by_path
            .get(old.file_path.as_str())
            .map(|s| (*s).clone())
            .unwrap_or_else(|| ApiSurface::empty(&old.file_path));
        pairs.push((old.clone(), new));
    }
    for new in new_surfaces {
        if !old_paths.contains(new.file_path.as_str()) {
            pairs.push((ApiSurface::empty(&new.file_path), new.clone()));
        }
    }

    let per_file: Vec<Vec<Change>> = pairs
        .par_iter()
        .map(|(old, new)| detect_breaking_changes_with(old, new, options))
        .collect();
    per_file.into_iter().flatten().collect()
}

fn diff_functions(
    old: &ApiSurface,
    new: &ApiSurface,
    file_path: &str,
    options: &DiffOptions,
    changes: &mut Vec<Change>,
) {
    for base in &old.functions {
        match new.function(&base.name) {
            None => changes.push(
                Change::create(
                    ChangeKind::FunctionRemoved,
                    base.name.clone(),
                    file_path,
                    format!("Function '{}' was removed", base.name),
                )
                .at_line(base.line),
            ),
            Some(head) => diff_function(base, head, file_path, changes),
        }
    }

    if options.report_additions {
        for head in &new.functions {
            if old.function(&head.name).is_none() {
                changes.push(
                    Change::create(
                        ChangeKind::FunctionAdded,
                        head.name.clone(),
                        file_path,
                        format!("Function '{}' was added", head.name),
                    )
                    .at_line(head.line),
                );
            }
        }
    }
}

/// Diff two versions of the same function.
///
/// Callers pass arguments by position, so parameters are compared slot by
/// slot: `base.params[i]` against `head.params[i]`. Names are labels only;
/// a rename at the same slot is silent and a reorder shows up as type
/// changes.
fn diff_function(
    base: &FunctionSignature,
    head: &FunctionSignature,
    file_path: &str,
    changes: &mut Vec<Change>,
) {
    let func = &head.name;

    for (idx, old_param) in base.params.iter().enumerate() {
        let Some(new_param) = head.params.get(idx) else {
            if !old_param.optional {
                changes.push(
                    Change::create(
                        ChangeKind::ParameterRemoved,
                        format!("{}.{}", func, old_param.name),
                        file_path,
                        format!(
                            "Required parameter '{}' was removed from '{}'",
                            old_param.name, func
                        ),
                    )
                    .at_line(head.line),
                );
            }
            continue;
        };

        let member = format!("{}.{}", func, new_param.name);
        if old_param.param_type != new_param.param_type {
            changes.push(
                Change::create(
                    ChangeKind::ParameterTypeChanged,
                    member.clone(),
                    file_path,
                    format!(
                        "Parameter {} ('{}') of '{}' changed type from '{}' to '{}'",
                        idx, new_param.name, func, old_param.param_type, new_param.param_type
                    ),
                )
                .at_line(head.line)
                .with_values(&old_param.param_type, &new_param.param_type),
            );
        }
        if old_param.optional && !new_param.optional {
            changes.push(
                Change::create(
                    ChangeKind::ParameterAddedRequired,
                    member,
                    file_path,
                    format!("Parameter '{}' of '{}' is now required", new_param.name, func),
                )
                .at_line(head.line),
            );
        }
    }

    // New optional parameters are backward compatible and never reported.
    for param in head.params.iter().skip(base.params.len()).filter(|p| !p.optional) {
        changes.push(
            Change::create(
                ChangeKind::ParameterAddedRequired,
                format!("{}.{}", func, param.name),
                file_path,
                format!(
                    "Required parameter '{}' was added to '{}' at position {}",
                    param.name, func, param.position
                ),
            )
            .at_line(head.line),
        );
    }

    if base.return_type != head.return_type {
        changes.push(
            Change::create(
                ChangeKind::ReturnTypeChanged,
                func.clone(),
                file_path,
                format!(
                    "Return type of '{}' changed from '{}' to '{}'",
                    func, base.return_type, head.return_type
                ),
            )
            .at_line(head.line)
            .with_values(&base.return_type, &head.return_type),
        );
    }
}

fn diff_interfaces(
    old: &ApiSurface,
    new: &ApiSurface,
    file_path: &str,
    options: &DiffOptions,
    changes: &mut Vec<Change>,
) {
    for base in &old.interfaces {
        match new.interface(&base.name) {
            None => changes.push(
                Change::create(
                    ChangeKind::InterfaceRemoved,
                    base.name.clone(),
                    file_path,
                    format!("Interface '{}' was removed", base.name),
                )
                .at_line(base.line),
            ),
            Some(head) => diff_interface(base, head, file_path, options, changes),
        }
    }
}

/// Diff two versions of the same interface.
fn diff_interface(
    base: &InterfaceDef,
    head: &InterfaceDef,
    file_path: &str,
    options: &DiffOptions,
    changes: &mut Vec<Change>,
) {
    let name = &head.name;

    // Only dropped bases narrow the contract; new bases are not reported.
    let head_bases: HashSet<&str> = head.extends.iter().map(|s| s.as_str()).collect();
    let dropped: Vec<&str> = base
        .extends
        .iter()
        .map(|s| s.as_str())
        .filter(|b| !head_bases.contains(b))
        .collect();
    if !dropped.is_empty() {
        changes.push(
            Change::create(
                ChangeKind::InterfaceExtendsChanged,
                name.clone(),
                file_path,
                format!("Interface '{}' no longer extends {}", name, dropped.join(", ")),
            )
            .at_line(head.line)
            .with_values(&base.extends.join(", "), &head.extends.join(", ")),
        );
    }

    // Overloads share a name; the n-th `on` pairs with the n-th `on`.
    for (prop, occurrence) in base.members() {
        let member = format!("{}.{}", name, prop.name);
        let Some(current) = head.member(&prop.name, occurrence) else {
            changes.push(
                Change::create(
                    ChangeKind::InterfacePropertyRemoved,
                    member,
                    file_path,
                    format!("Property '{}' was removed from '{}'", prop.name, name),
                )
                .at_line(prop.line),
            );
            continue;
        };

        if prop.optional && !current.optional {
            changes.push(
                Change::create(
                    ChangeKind::InterfacePropertyRequired,
                    member.clone(),
                    file_path,
                    format!("Property '{}' of '{}' is now required", prop.name, name),
                )
                .at_line(current.line),
            );
        }
        if prop.prop_type != current.prop_type {
            changes.push(
                Change::create(
                    ChangeKind::InterfacePropertyTypeChanged,
                    member,
                    file_path,
                    format!(
                        "Property '{}' of '{}' changed type from '{}' to '{}'",
                        prop.name, name, prop.prop_type, current.prop_type
                    ),
                )
                .at_line(current.line)
                .with_values(&prop.prop_type, &current.prop_type)
                .with_severity(options.property_type_severity),
            );
        }
    }

    // Optional additions widen the contract and are never reported.
    for (prop, occurrence) in head.members() {
        if !prop.optional && base.member(&prop.name, occurrence).is_none() {
            changes.push(
                Change::create(
                    ChangeKind::InterfacePropertyAdded,
                    format!("{}.{}", name, prop.name),
                    file_path,
                    format!("Required property '{}' was added to '{}'", prop.name, name),
                )
                .at_line(prop.line),
            );
        }
    }
}

fn diff_types(old: &ApiSurface, new: &ApiSurface, file_path: &str, changes: &mut Vec<Change>) {
    for base in &old.types {
        match new.type_alias(&base.name) {
            None => changes.push(
                Change::create(
                    ChangeKind::TypeRemoved,
                    base.name.clone(),
                    file_path,
                    format!("Type '{}' was removed", base.name),
                )
                .at_line(base.line),
            ),
            Some(head) => diff_type(base, head, file_path, changes),
        }
    }
}

fn diff_type(base: &TypeAliasDef, head: &TypeAliasDef, file_path: &str, changes: &mut Vec<Change>) {
    if base.definition != head.definition {
        changes.push(
            Change::create(
                ChangeKind::TypeChanged,
                head.name.clone(),
                file_path,
                format!("Definition of type '{}' changed", head.name),
            )
            .at_line(head.line)
            .with_values(&base.definition, &head.definition),
        );
    }
}

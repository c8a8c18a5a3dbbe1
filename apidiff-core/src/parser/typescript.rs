//! Exported declaration extractor for TypeScript source.
//!
//! Three declaration shapes are recognized: `export [async] function`,
//! `export interface` and `export type`. Anything else is ignored, and a
//! recognized head whose remainder cannot be scanned is dropped.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::helpers::{
    continues_expression, is_closer, mask_comments, matching_close, skip_ws, split_top_level,
    LineIndex, TopLevelBytes,
};
use crate::types::{
    ApiSurface, Declaration, FunctionSignature, InterfaceDef, Parameter, PropertyDef,
    TypeAliasDef,
};

static FUNCTION_HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*export[ \t]+(?:declare[ \t]+)?(async[ \t]+)?function\b[ \t]*\*?[ \t]*([A-Za-z_$][\w$]*)",
    )
    .unwrap()
});
static INTERFACE_HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*export[ \t]+(?:declare[ \t]+)?interface[ \t]+([A-Za-z_$][\w$]*)")
        .unwrap()
});
static TYPE_HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*export[ \t]+(?:declare[ \t]+)?type[ \t]+([A-Za-z_$][\w$]*)").unwrap()
});

/// Return type used when a function has no annotation.
const DEFAULT_RETURN_TYPE: &str = "void";
/// Type used for an unannotated parameter or property.
const IMPLICIT_TYPE: &str = "any";

/// Parse TypeScript source into an API surface.
pub fn parse(source: &str, file_path: &str) -> ApiSurface {
    let text = mask_comments(source);
    let lines = LineIndex::new(&text);
    let mut surface = ApiSurface::empty(file_path);

    for caps in FUNCTION_HEAD.captures_iter(&text) {
        let (Some(head), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let line = lines.line_of(keyword_offset(head));
        let is_async = caps.get(1).is_some();
        match extract_function(&text, head.end(), name.as_str(), is_async, line) {
            Some(func) => {
                trace!(name = %func.name, line, "function");
                surface.insert(Declaration::Function(func));
            }
            None => trace!(name = name.as_str(), line, "skipped function"),
        }
    }

    for caps in INTERFACE_HEAD.captures_iter(&text) {
        let (Some(head), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let line = lines.line_of(keyword_offset(head));
        match extract_interface(&text, head.end(), name.as_str(), line, &lines) {
            Some(iface) => {
                trace!(name = %iface.name, line, "interface");
                surface.insert(Declaration::Interface(iface));
            }
            None => trace!(name = name.as_str(), line, "skipped interface"),
        }
    }

    for caps in TYPE_HEAD.captures_iter(&text) {
        let (Some(head), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let line = lines.line_of(keyword_offset(head));
        match extract_type_alias(&text, head.end(), name.as_str(), line) {
            Some(alias) => {
                trace!(name = %alias.name, line, "type alias");
                surface.insert(Declaration::TypeAlias(alias));
            }
            None => trace!(name = name.as_str(), line, "skipped type alias"),
        }
    }

    surface
}

/// Offset of the `export` keyword, past any indentation the head matched.
fn keyword_offset(head: regex::Match<'_>) -> usize {
    head.start() + head.as_str().find("export").unwrap_or(0)
}

/// Skip a generic parameter list (`<T extends X>`) if one starts at `pos`.
fn skip_generics(text: &str, pos: usize) -> Option<usize> {
    let pos = skip_ws(text, pos);
    if text.as_bytes().get(pos) == Some(&b'<') {
        matching_close(text, pos).map(|close| close + 1)
    } else {
        Some(pos)
    }
}

/// Extract a function signature; `pos` points just past the name.
fn extract_function(
    text: &str,
    pos: usize,
    name: &str,
    is_async: bool,
    line: u32,
) -> Option<FunctionSignature> {
    let open = skip_ws(text, skip_generics(text, pos)?);
    if text.as_bytes().get(open) != Some(&b'(') {
        return None;
    }
    let close = matching_close(text, open)?;
    let params = parse_params(&text[open + 1..close]);

    let after = skip_ws(text, close + 1);
    let return_type = if text.as_bytes().get(after) == Some(&b':') {
        scan_return_type(text, after + 1)
    } else {
        None
    };

    Some(FunctionSignature::new(
        name.to_string(),
        params,
        return_type.unwrap_or_else(|| DEFAULT_RETURN_TYPE.to_string()),
        is_async,
        line,
    ))
}

/// Read a return annotation starting just after its `:`.
///
/// Ends at the body's `{`, a `;`, a closer of an enclosing scope, or a
/// newline that does not continue the type. A `{` with nothing before it,
/// or following `|`, `&` or `=>`, opens an object type instead of the body.
fn scan_return_type(text: &str, start: usize) -> Option<String> {
    let bytes = text.as_bytes();
    let mut end = text.len();
    for (i, b, depth) in TopLevelBytes::new(text, start) {
        if depth != 0 {
            continue;
        }
        let stop = match b {
            b'{' => {
                let so_far = text[start..i].trim();
                !(so_far.is_empty()
                    || so_far.ends_with('|')
                    || so_far.ends_with('&')
                    || so_far.ends_with("=>"))
            }
            b';' => true,
            b'\n' => !continues_expression(&text[start..i], &text[i + 1..]),
            _ => is_closer(bytes, i),
        };
        if stop {
            end = i;
            break;
        }
    }
    let ty = text[start..end].trim();
    (!ty.is_empty()).then(|| ty.to_string())
}

/// Parse the text between a function's parentheses.
fn parse_params(text: &str) -> Vec<Parameter> {
    let mut params = Vec::new();
    for (_, raw) in split_top_level(text, b",") {
        if let Some(param) = parse_param(raw.trim(), params.len()) {
            params.push(param);
        }
    }
    params
}

fn parse_param(raw: &str, position: usize) -> Option<Parameter> {
    if raw.is_empty() {
        return None;
    }
    let (raw, is_rest) = match raw.strip_prefix("...") {
        Some(rest) => (rest.trim_start(), true),
        None => (raw, false),
    };

    let bytes = raw.as_bytes();
    let default_at = TopLevelBytes::new(raw, 0)
        .find(|&(i, b, depth)| {
            depth == 0
                && b == b'='
                && bytes.get(i + 1) != Some(&b'>')
                && bytes.get(i + 1) != Some(&b'=')
        })
        .map(|(i, _, _)| i);
    let head = &raw[..default_at.unwrap_or(raw.len())];

    let colon = TopLevelBytes::new(head, 0)
        .find(|&(_, b, depth)| depth == 0 && b == b':')
        .map(|(i, _, _)| i);
    let (name_part, param_type) = match colon {
        Some(c) => (&head[..c], head[c + 1..].trim()),
        None => (head, ""),
    };

    let name_part = name_part.trim();
    let (name, marked_optional) = match name_part.strip_suffix('?') {
        Some(n) => (n.trim_end(), true),
        None => (name_part, false),
    };
    // `this` only types the receiver; callers never pass it.
    if name.is_empty() || name == "this" {
        return None;
    }

    let param_type = if param_type.is_empty() {
        IMPLICIT_TYPE
    } else {
        param_type
    };

    Some(Parameter::new(
        name.to_string(),
        marked_optional || default_at.is_some() || is_rest,
        param_type.to_string(),
        position,
    ))
}

/// Extract an interface; `pos` points just past the name.
fn extract_interface(
    text: &str,
    pos: usize,
    name: &str,
    line: u32,
    lines: &LineIndex,
) -> Option<InterfaceDef> {
    let mut pos = skip_ws(text, skip_generics(text, pos)?);

    let mut extends = Vec::new();
    if let Some(rest) = text[pos..].strip_prefix("extends") {
        if rest.starts_with(|c: char| c.is_ascii_whitespace()) {
            let list_start = pos + "extends".len();
            let brace = TopLevelBytes::new(text, list_start)
                .find(|&(_, b, depth)| depth == 0 && b == b'{')
                .map(|(i, _, _)| i)?;
            extends = split_top_level(&text[list_start..brace], b",")
                .into_iter()
                .map(|(_, base)| base.trim())
                .filter(|base| !base.is_empty())
                .map(str::to_string)
                .collect();
            pos = brace;
        }
    }

    if text.as_bytes().get(pos) != Some(&b'{') {
        return None;
    }
    let close = matching_close(text, pos)?;
    let body_start = pos + 1;
    let properties = split_members(&text[body_start..close])
        .into_iter()
        .filter_map(|(offset, member)| {
            parse_member(member, lines.line_of(body_start + offset))
        })
        .collect();

    Some(InterfaceDef::new(name.to_string(), extends, properties, line))
}

/// Split an interface body into members, returning each trimmed member
/// with the offset where it starts.
fn split_members(body: &str) -> Vec<(usize, &str)> {
    let mut members = Vec::new();
    let mut start = 0;
    for (i, b, depth) in TopLevelBytes::new(body, 0) {
        if depth != 0 {
            continue;
        }
        let split = match b {
            b';' | b',' => true,
            b'\n' => !continues_expression(&body[start..i], &body[i + 1..]),
            _ => false,
        };
        if split {
            push_member(body, start, i, &mut members);
            start = i + 1;
        }
    }
    push_member(body, start, body.len(), &mut members);
    members
}

fn push_member<'a>(body: &'a str, start: usize, end: usize, members: &mut Vec<(usize, &'a str)>) {
    let piece = &body[start..end];
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        let lead = piece.len() - piece.trim_start().len();
        members.push((start + lead, trimmed));
    }
}

/// Split a `get`/`set` accessor keyword off a member. A member that is
/// itself named `get` or `set` (`get(): T`, `set: Fn`) is left alone.
fn split_accessor(member: &str) -> (&str, Option<&'static str>) {
    for keyword in ["get", "set"] {
        let Some(rest) = member.strip_prefix(keyword) else {
            continue;
        };
        let name = rest.trim_start();
        if name.len() < rest.len()
            && name.starts_with(|c: char| c.is_alphanumeric() || matches!(c, '_' | '$' | '"' | '\''))
        {
            return (name, Some(keyword));
        }
    }
    (member, None)
}

/// The property type an accessor exposes: the getter's return annotation
/// or the setter's parameter annotation. `rest` starts at the `(`.
fn accessor_type<'a>(rest: &'a str, keyword: &str) -> Option<&'a str> {
    let close = matching_close(rest, 0)?;
    let ty = if keyword == "get" {
        rest[close + 1..]
            .trim_start()
            .strip_prefix(':')
            .map_or("", |ty| ty.trim().trim_end_matches(';').trim_end())
    } else {
        let params = &rest[1..close];
        match split_top_level(params, b":").get(1) {
            Some(&(offset, _)) => params[offset..].trim(),
            None => "",
        }
    };
    Some(if ty.is_empty() { IMPLICIT_TYPE } else { ty })
}

fn parse_member(member: &str, line: u32) -> Option<PropertyDef> {
    let member = member
        .strip_prefix("readonly ")
        .map(str::trim_start)
        .unwrap_or(member);
    let (member, accessor) = split_accessor(member);

    // Index, call and construct signatures have no member name.
    if member.starts_with(['[', '(', '<']) || member.starts_with("new ") || member.starts_with("new(")
    {
        return None;
    }

    let (name, rest) = match *member.as_bytes().first()? {
        q @ (b'"' | b'\'') => {
            let end = member[1..].find(q as char)? + 1;
            (&member[1..end], &member[end + 1..])
        }
        _ => {
            let len = member
                .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
                .unwrap_or(member.len());
            (&member[..len], &member[len..])
        }
    };
    if name.is_empty() {
        return None;
    }

    let mut rest = rest.trim_start();
    let optional = match rest.strip_prefix('?') {
        Some(r) => {
            rest = r.trim_start();
            true
        }
        None => false,
    };

    let prop_type = if let Some(keyword) = accessor {
        if !rest.starts_with('(') {
            return None;
        }
        accessor_type(rest, keyword)?
    } else if let Some(ty) = rest.strip_prefix(':') {
        ty.trim()
    } else if rest.starts_with(['(', '<']) {
        rest.trim()
    } else {
        IMPLICIT_TYPE
    };
    if prop_type.is_empty() {
        return None;
    }

    Some(PropertyDef::new(
        name.to_string(),
        optional,
        prop_type.to_string(),
        line,
    ))
}

/// Extract a type alias; `pos` points just past the name.
fn extract_type_alias(text: &str, pos: usize, name: &str, line: u32) -> Option<TypeAliasDef> {
    let eq = skip_ws(text, skip_generics(text, pos)?);
    if text.as_bytes().get(eq) != Some(&b'=') {
        return None;
    }
    let start = eq + 1;
    let bytes = text.as_bytes();

    let mut end = text.len();
    for (i, b, depth) in TopLevelBytes::new(text, start) {
        if depth != 0 {
            continue;
        }
        let stop = match b {
            b';' => true,
            b'\n' => !continues_expression(&text[start..i], &text[i + 1..]),
            _ => is_closer(bytes, i),
        };
        if stop {
            end = i;
            break;
        }
    }

    let definition = text[start..end].trim();
    if definition.is_empty() {
        return None;
    }
    Some(TypeAliasDef::new(
        name.to_string(),
        definition.to_string(),
        line,
    ))
}

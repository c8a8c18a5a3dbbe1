//! Documentation impact analysis.
//!
//! Cross-references a change list against a documentation corpus and
//! reports which reference-like documents mention a changed symbol.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ImpactOptions;
use crate::differ::Change;

/// Upper bound on the compiled size of the combined symbol pattern.
const PATTERN_SIZE_LIMIT: usize = 64 * 1024 * 1024;

/// A documentation artifact supplied by the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationArtifact {
    pub path: String,
    pub content: String,
    /// Document type, e.g. `api`, `reference`, `readme`, `guide`.
    #[serde(rename = "type")]
    pub doc_type: String,
}

impl DocumentationArtifact {
    pub fn new(path: &str, content: &str, doc_type: &str) -> Self {
        Self {
            path: path.to_string(),
            content: content.to_string(),
            doc_type: doc_type.to_string(),
        }
    }
}

/// One impacted document and the changed symbols it mentions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocImpact {
    pub path: String,
    /// Matched symbols in order of first mention.
    pub symbols: Vec<String>,
}

/// Paths of reference-like docs that mention a changed symbol, using the
/// default options.
pub fn analyze_documentation_impact(
    changes: &[Change],
    docs: &[DocumentationArtifact],
) -> Vec<String> {
    analyze_documentation_impact_with(changes, docs, &ImpactOptions::default())
}

/// Paths of reference-like docs that mention a changed symbol.
///
/// Paths are distinct and keep corpus order.
pub fn analyze_documentation_impact_with(
    changes: &[Change],
    docs: &[DocumentationArtifact],
    options: &ImpactOptions,
) -> Vec<String> {
    find_impacted_docs(changes, docs, options)
        .into_iter()
        .map(|impact| impact.path)
        .collect()
}

/// Impacted docs with the symbols each one mentions.
pub fn find_impacted_docs(
    changes: &[Change],
    docs: &[DocumentationArtifact],
    options: &ImpactOptions,
) -> Vec<DocImpact> {
    let symbols = changed_symbols(changes);
    let Some(matcher) = build_matcher(&symbols) else {
        return Vec::new();
    };

    let mut impacts: Vec<DocImpact> = Vec::new();
    for doc in docs {
        if !options.is_reference_type(&doc.doc_type) {
            continue;
        }
        if impacts.iter().any(|i| i.path == doc.path) {
            continue;
        }

        let window = scan_window(&doc.content, options.max_scan_chars);
        let mut found: Vec<String> = Vec::new();
        for caps in matcher.captures_iter(window) {
            let Some(m) = caps.get(1) else {
                continue;
            };
            if window[m.end()..].chars().next().is_some_and(is_identifier_char) {
                continue;
            }
            if !found.iter().any(|s| s == m.as_str()) {
                found.push(m.as_str().to_string());
            }
        }
        if !found.is_empty() {
            impacts.push(DocImpact {
                path: doc.path.clone(),
                symbols: found,
            });
        }
    }

    debug!(
        changes = changes.len(),
        symbols = symbols.len(),
        docs = docs.len(),
        impacted = impacts.len(),
        "documentation impact"
    );
    impacts
}

/// Distinct base symbols of the changes, in first-seen order.
fn changed_symbols(changes: &[Change]) -> Vec<&str> {
    let mut symbols: Vec<&str> = Vec::new();
    for change in changes {
        let symbol = change.base_symbol();
        if !symbol.is_empty() && !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
    symbols
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// One case-sensitive alternation over all symbols, captured in group 1.
///
/// `$` counts as part of an identifier, so `\b` cannot delimit symbols
/// such as `$http`. The leading boundary is matched as a non-identifier
/// character (or the start of text) and the trailing one is checked by the
/// caller, which keeps adjacent mentions from sharing a boundary. Longer
/// symbols go first so `UserId` is tried before `User` at the same offset.
fn build_matcher(symbols: &[&str]) -> Option<Regex> {
    if symbols.is_empty() {
        return None;
    }
    let mut ordered = symbols.to_vec();
    ordered.sort_by_key(|s| std::cmp::Reverse(s.len()));
    let alternation: Vec<String> = ordered.iter().map(|s| regex::escape(s)).collect();
    let pattern = format!(r"(?:^|[^\w$])({})", alternation.join("|"));
    match RegexBuilder::new(&pattern)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
    {
        Ok(regex) => Some(regex),
        Err(e) => {
            debug!(error = %e, symbols = symbols.len(), "symbol pattern rejected");
            None
        }
    }
}

/// The leading part of `content` that gets scanned.
fn scan_window(content: &str, max_chars: Option<usize>) -> &str {
    match max_chars.and_then(|n| content.char_indices().nth(n)) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

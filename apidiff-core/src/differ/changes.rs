//! Change types and result structures for surface diffs.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordinal classification of a change. `Critical > Major > Minor`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Minor,
    Major,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Minor => "minor",
            Severity::Major => "major",
            Severity::Critical => "critical",
        }
    }

    /// Major and critical changes break existing consumers.
    pub fn is_breaking(&self) -> bool {
        *self >= Severity::Major
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of difference detected between two surfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    FunctionRemoved,
    FunctionAdded,
    ParameterAddedRequired,
    ParameterRemoved,
    ParameterTypeChanged,
    ReturnTypeChanged,
    InterfaceRemoved,
    InterfacePropertyRemoved,
    InterfacePropertyAdded,
    InterfacePropertyRequired,
    InterfacePropertyTypeChanged,
    InterfaceExtendsChanged,
    TypeRemoved,
    TypeChanged,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::FunctionRemoved => "function_removed",
            ChangeKind::FunctionAdded => "function_added",
            ChangeKind::ParameterAddedRequired => "parameter_added_required",
            ChangeKind::ParameterRemoved => "parameter_removed",
            ChangeKind::ParameterTypeChanged => "parameter_type_changed",
            ChangeKind::ReturnTypeChanged => "return_type_changed",
            ChangeKind::InterfaceRemoved => "interface_removed",
            ChangeKind::InterfacePropertyRemoved => "interface_property_removed",
            ChangeKind::InterfacePropertyAdded => "interface_property_added",
            ChangeKind::InterfacePropertyRequired => "interface_property_required",
            ChangeKind::InterfacePropertyTypeChanged => "interface_property_type_changed",
            ChangeKind::InterfaceExtendsChanged => "interface_extends_changed",
            ChangeKind::TypeRemoved => "type_removed",
            ChangeKind::TypeChanged => "type_changed",
        }
    }

    /// Default severity for this kind of change.
    ///
    /// Removing a whole entity is critical. Narrowing or altering an
    /// existing member is major. Additions and alias rewrites are minor,
    /// since alias compatibility cannot be judged from text.
    pub fn severity(&self) -> Severity {
        match self {
            ChangeKind::FunctionRemoved | ChangeKind::InterfaceRemoved | ChangeKind::TypeRemoved => {
                Severity::Critical
            }
            ChangeKind::ParameterAddedRequired
            | ChangeKind::ParameterRemoved
            | ChangeKind::ParameterTypeChanged
            | ChangeKind::ReturnTypeChanged
            | ChangeKind::InterfacePropertyRemoved
            | ChangeKind::InterfacePropertyAdded
            | ChangeKind::InterfacePropertyRequired
            | ChangeKind::InterfacePropertyTypeChanged
            | ChangeKind::InterfaceExtendsChanged => Severity::Major,
            ChangeKind::FunctionAdded | ChangeKind::TypeChanged => Severity::Minor,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected difference between two surfaces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    #[serde(rename = "type")]
    pub kind: ChangeKind,

    /// Bare symbol for whole entities (`goodbye`), `Parent.member` for
    /// nested ones (`greet.title`, `User.email`).
    pub name: String,

    pub description: String,

    pub file_path: String,

    /// Declaration start line, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,

    pub severity: Severity,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<String>,
}

impl Change {
    /// Create a change with the kind's default severity.
    pub fn create(kind: ChangeKind, name: String, file_path: &str, description: String) -> Self {
        Self {
            kind,
            name,
            description,
            file_path: file_path.to_string(),
            line_number: None,
            severity: kind.severity(),
            previous_value: None,
            current_value: None,
        }
    }

    /// Set the line number.
    pub fn at_line(mut self, line: u32) -> Self {
        self.line_number = (line > 0).then_some(line);
        self
    }

    /// Set previous and current raw values.
    pub fn with_values(mut self, previous: &str, current: &str) -> Self {
        self.previous_value = Some(previous.to_string());
        self.current_value = Some(current.to_string());
        self
    }

    /// Override the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Symbol the change belongs to: the part of `name` before the first `.`.
    pub fn base_symbol(&self) -> &str {
        self.name.split('.').next().unwrap_or(&self.name)
    }

    pub fn is_breaking(&self) -> bool {
        self.severity.is_breaking()
    }
}

/// Summary statistics for a diff.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub critical: u32,
    pub major: u32,
    pub minor: u32,

    /// Count per change kind, keyed by its wire name.
    pub by_kind: BTreeMap<String, u32>,
}

impl DiffSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment counters for one change.
    pub fn record(&mut self, change: &Change) {
        match change.severity {
            Severity::Critical => self.critical += 1,
            Severity::Major => self.major += 1,
            Severity::Minor => self.minor += 1,
        }
        *self.by_kind.entry(change.kind.as_str().to_string()).or_insert(0) += 1;
    }

    pub fn total(&self) -> u32 {
        self.critical + self.major + self.minor
    }

    pub fn breaking(&self) -> u32 {
        self.critical + self.major
    }

    /// Generate human-readable summary string.
    pub fn text(&self) -> String {
        if self.total() == 0 {
            return "No changes".to_string();
        }

        let mut parts = Vec::new();
        if self.critical > 0 {
            parts.push(format!("{} critical", self.critical));
        }
        if self.major > 0 {
            parts.push(format!("{} major", self.major));
        }
        if self.minor > 0 {
            parts.push(format!("{} minor", self.minor));
        }
        format!(
            "{} changes ({}); {} breaking",
            self.total(),
            parts.join(", "),
            self.breaking()
        )
    }
}

/// Complete result of a surface diff.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DiffReport {
    /// All changes, in emission order.
    pub changes: Vec<Change>,

    /// Breaking changes only (critical and major).
    pub breaking_changes: Vec<Change>,

    pub summary: DiffSummary,

    pub summary_text: String,
}

impl DiffReport {
    /// Build a report from a change list.
    pub fn from_changes(changes: Vec<Change>) -> Self {
        let mut report = Self::default();
        for change in changes {
            report.add_change(change);
        }
        report.summary_text = report.summary.text();
        report
    }

    /// Add a change and update summary.
    pub fn add_change(&mut self, change: Change) {
        self.summary.record(&change);
        if change.is_breaking() {
            self.breaking_changes.push(change.clone());
        }
        self.changes.push(change);
    }

    pub fn has_breaking_changes(&self) -> bool {
        !self.breaking_changes.is_empty()
    }

    /// Highest severity present, if any change was found.
    pub fn max_severity(&self) -> Option<Severity> {
        self.changes.iter().map(|c| c.severity).max()
    }

    /// True if any change is at or above `threshold`. Used by severity gates.
    pub fn exceeds(&self, threshold: Severity) -> bool {
        self.max_severity().is_some_and(|max| max >= threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_change(kind: ChangeKind, name: &str) -> Change {
        Change::create(
            kind,
            name.to_string(),
            "src/api.ts",
            format!("{} {}", kind, name),
        )
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::Major);
        assert!(Severity::Major > Severity::Minor);
        assert!(Severity::Critical.is_breaking());
        assert!(Severity::Major.is_breaking());
        assert!(!Severity::Minor.is_breaking());
    }

    #[test]
    fn test_kind_severity_lookup() {
        assert_eq!(ChangeKind::FunctionRemoved.severity(), Severity::Critical);
        assert_eq!(ChangeKind::InterfaceRemoved.severity(), Severity::Critical);
        assert_eq!(ChangeKind::TypeRemoved.severity(), Severity::Critical);
        assert_eq!(ChangeKind::ParameterAddedRequired.severity(), Severity::Major);
        assert_eq!(ChangeKind::ReturnTypeChanged.severity(), Severity::Major);
        assert_eq!(ChangeKind::InterfacePropertyRequired.severity(), Severity::Major);
        assert_eq!(ChangeKind::InterfaceExtendsChanged.severity(), Severity::Major);
        assert_eq!(ChangeKind::FunctionAdded.severity(), Severity::Minor);
        assert_eq!(ChangeKind::TypeChanged.severity(), Severity::Minor);
    }

    #[test]
    fn test_change_serializes_wire_format() {
        let change = make_change(ChangeKind::ReturnTypeChanged, "greet")
            .at_line(3)
            .with_values("string", "number");
        let json = serde_json::to_value(&change).unwrap();

        assert_eq!(json["type"], "return_type_changed");
        assert_eq!(json["severity"], "major");
        assert_eq!(json["filePath"], "src/api.ts");
        assert_eq!(json["lineNumber"], 3);
        assert_eq!(json["previousValue"], "string");
        assert_eq!(json["currentValue"], "number");
    }

    #[test]
    fn test_change_omits_absent_values() {
        let change = make_change(ChangeKind::FunctionRemoved, "goodbye");
        let json = serde_json::to_string(&change).unwrap();
        assert!(!json.contains("previousValue"));
        assert!(!json.contains("lineNumber"));
    }

    #[test]
    fn test_base_symbol() {
        assert_eq!(make_change(ChangeKind::ParameterRemoved, "greet.title").base_symbol(), "greet");
        assert_eq!(make_change(ChangeKind::FunctionRemoved, "goodbye").base_symbol(), "goodbye");
    }

    #[test]
    fn test_diff_summary_text() {
        let mut summary = DiffSummary::new();
        assert_eq!(summary.text(), "No changes");

        summary.record(&make_change(ChangeKind::FunctionRemoved, "a"));
        summary.record(&make_change(ChangeKind::FunctionAdded, "b"));
        summary.record(&make_change(ChangeKind::FunctionAdded, "c"));

        assert_eq!(summary.by_kind["function_added"], 2);
        assert_eq!(summary.text(), "3 changes (1 critical, 2 minor); 1 breaking");
    }

    #[test]
    fn test_report_breaking_and_gate() {
        let report = DiffReport::from_changes(vec![
            make_change(ChangeKind::FunctionAdded, "fresh"),
            make_change(ChangeKind::ParameterTypeChanged, "load.id"),
        ]);

        assert!(report.has_breaking_changes());
        assert_eq!(report.breaking_changes.len(), 1);
        assert_eq!(report.max_severity(), Some(Severity::Major));
        assert!(report.exceeds(Severity::Major));
        assert!(!report.exceeds(Severity::Critical));
        assert!(!report.summary_text.is_empty());
    }

    #[test]
    fn test_empty_report() {
        let report = DiffReport::from_changes(vec![]);
        assert!(report.changes.is_empty());
        assert_eq!(report.max_severity(), None);
        assert!(!report.exceeds(Severity::Minor));
        assert_eq!(report.summary_text, "No changes");
    }
}

//! Data models for a parsed public API surface.
//!
//! These types describe the exported contract of one source file:
//! functions, interfaces and type aliases, in declaration order. They are
//! plain value objects, produced once by the parser and never mutated
//! afterwards.

use serde::{Deserialize, Serialize};

/// A function parameter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    /// True for `name?: T`, a default value, or a rest parameter.
    pub optional: bool,
    #[serde(rename = "type")]
    pub param_type: String,
    /// Zero-based index in the parameter list.
    pub position: usize,
}

impl Parameter {
    pub fn new(name: String, optional: bool, param_type: String, position: usize) -> Self {
        Self {
            name,
            optional,
            param_type,
            position,
        }
    }
}

/// An exported function signature.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<Parameter>,
    /// Declared return type text, `"void"` when not annotated.
    pub return_type: String,
    #[serde(rename = "async")]
    pub is_async: bool,
    pub line: u32,
}

impl FunctionSignature {
    pub fn new(
        name: String,
        params: Vec<Parameter>,
        return_type: String,
        is_async: bool,
        line: u32,
    ) -> Self {
        Self {
            name,
            params,
            return_type,
            is_async,
            line,
        }
    }
}

/// An interface member. Method signatures are stored as properties whose
/// type is the signature text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDef {
    pub name: String,
    pub optional: bool,
    #[serde(rename = "type")]
    pub prop_type: String,
    pub line: u32,
}

impl PropertyDef {
    pub fn new(name: String, optional: bool, prop_type: String, line: u32) -> Self {
        Self {
            name,
            optional,
            prop_type,
            line,
        }
    }
}

/// An exported interface.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceDef {
    pub name: String,
    /// Base interfaces, verbatim and in declared order.
    pub extends: Vec<String>,
    pub properties: Vec<PropertyDef>,
    pub line: u32,
}

impl InterfaceDef {
    pub fn new(name: String, extends: Vec<String>, properties: Vec<PropertyDef>, line: u32) -> Self {
        Self {
            name,
            extends,
            properties,
            line,
        }
    }

    /// The `occurrence`-th member called `name`. Overloaded methods share a
    /// name, so members are identified by name and occurrence together.
    pub fn member(&self, name: &str, occurrence: usize) -> Option<&PropertyDef> {
        self.properties
            .iter()
            .filter(|p| p.name == name)
            .nth(occurrence)
    }

    /// Members paired with their occurrence index among same-named members.
    pub fn members(&self) -> impl Iterator<Item = (&PropertyDef, usize)> + '_ {
        self.properties.iter().enumerate().map(|(idx, prop)| {
            let occurrence = self.properties[..idx]
                .iter()
                .filter(|p| p.name == prop.name)
                .count();
            (prop, occurrence)
        })
    }
}

/// An exported type alias. The definition is kept as raw text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeAliasDef {
    pub name: String,
    pub definition: String,
    pub line: u32,
}

impl TypeAliasDef {
    pub fn new(name: String, definition: String, line: u32) -> Self {
        Self {
            name,
            definition,
            line,
        }
    }
}

/// One recognized exported declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Declaration {
    Function(FunctionSignature),
    Interface(InterfaceDef),
    TypeAlias(TypeAliasDef),
}


/// The parsed public contract of one source file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSurface {
    /// Provenance only; stamped into every change found on this surface.
    pub file_path: String,
    pub functions: Vec<FunctionSignature>,
    pub interfaces: Vec<InterfaceDef>,
    pub types: Vec<TypeAliasDef>,
}

impl ApiSurface {
    /// Create an empty surface for a file.
    pub fn empty(file_path: &str) -> Self {
        Self {
            file_path: file_path.to_string(),
            ..Default::default()
        }
    }

    /// Add a declaration. A name already present in the same category is
    /// replaced in place, so the last declaration wins.
    pub fn insert(&mut self, declaration: Declaration) {
        match declaration {
            Declaration::Function(f) => upsert(&mut self.functions, f, |x| &x.name),
            Declaration::Interface(i) => upsert(&mut self.interfaces, i, |x| &x.name),
            Declaration::TypeAlias(t) => upsert(&mut self.types, t, |x| &x.name),
        }
    }

    pub fn function(&self, name: &str) -> Option<&FunctionSignature> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn interface(&self, name: &str) -> Option<&InterfaceDef> {
        self.interfaces.iter().find(|i| i.name == name)
    }

    pub fn type_alias(&self, name: &str) -> Option<&TypeAliasDef> {
        self.types.iter().find(|t| t.name == name)
    }

    /// True when no exported declaration was recognized.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.interfaces.is_empty() && self.types.is_empty()
    }
}

fn upsert<T>(items: &mut Vec<T>, item: T, key: impl Fn(&T) -> &String) {
    match items.iter().position(|existing| key(existing) == key(&item)) {
        Some(idx) => items[idx] = item,
        None => items.push(item),
    }
}

/// One source snapshot to parse.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    pub source: String,
}

impl SourceFile {
    pub fn new(path: String, source: String) -> Self {
        Self { path, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_function(name: &str, return_type: &str) -> FunctionSignature {
        FunctionSignature::new(name.to_string(), vec![], return_type.to_string(), false, 1)
    }

    #[test]
    fn test_surface_default_is_empty() {
        let surface = ApiSurface::default();
        assert!(surface.is_empty());
    }

    #[test]
    fn test_insert_replaces_same_name() {
        let mut surface = ApiSurface::empty("a.ts");
        surface.insert(Declaration::Function(make_function("greet", "string")));
        surface.insert(Declaration::Function(make_function("other", "void")));
        surface.insert(Declaration::Function(make_function("greet", "number")));

        assert_eq!(surface.functions.len(), 2);
        assert_eq!(surface.functions[0].name, "greet");
        assert_eq!(surface.functions[0].return_type, "number");
    }

    #[test]
    fn test_same_name_in_different_categories() {
        let mut surface = ApiSurface::empty("a.ts");
        surface.insert(Declaration::Interface(InterfaceDef::new(
            "User".to_string(),
            vec![],
            vec![],
            1,
        )));
        surface.insert(Declaration::TypeAlias(TypeAliasDef::new(
            "User".to_string(),
            "string".to_string(),
            5,
        )));
        assert_eq!(surface.interfaces.len(), 1);
        assert_eq!(surface.types.len(), 1);
        assert!(!surface.is_empty());
    }

    #[test]
    fn test_overloaded_members_by_occurrence() {
        let iface = InterfaceDef::new(
            "Emitter".to_string(),
            vec![],
            vec![
                PropertyDef::new("on".to_string(), false, "(e: 'open'): void".to_string(), 2),
                PropertyDef::new("id".to_string(), false, "string".to_string(), 3),
                PropertyDef::new("on".to_string(), false, "(e: 'close'): void".to_string(), 4),
            ],
            1,
        );

        let occurrences: Vec<(&str, usize)> =
            iface.members().map(|(p, n)| (p.name.as_str(), n)).collect();
        assert_eq!(occurrences, vec![("on", 0), ("id", 0), ("on", 1)]);
        assert_eq!(iface.member("on", 1).unwrap().line, 4);
        assert!(iface.member("on", 2).is_none());
        assert!(iface.member("id", 0).is_some());
    }

    #[test]
    fn test_serialization_uses_wire_names() {
        let mut surface = ApiSurface::empty("src/api.ts");
        let mut func = make_function("load", "Promise<Data>");
        func.is_async = true;
        func.params
            .push(Parameter::new("id".to_string(), false, "string".to_string(), 0));
        surface.insert(Declaration::Function(func));

        let json = serde_json::to_string(&surface).unwrap();
        assert!(json.contains("\"filePath\":\"src/api.ts\""));
        assert!(json.contains("\"returnType\":\"Promise<Data>\""));
        assert!(json.contains("\"async\":true"));
        assert!(json.contains("\"type\":\"string\""));
    }
}

use super::relation::RelationKind;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TypeVariant {
    RawClass,
    Parameterized,
    Wildcard,
    TypeVariable,
}

impl std::fmt::Display for TypeVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TypeVariant::RawClass => "class",
            TypeVariant::Parameterized => "parameterized",
            TypeVariant::Wildcard => "wildcard",
            TypeVariant::TypeVariable => "type variable",
        };
        f.write_str(s)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Field,
    Method,
    Constructor,
    Parameter,
}

impl std::fmt::Display for MemberKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MemberKind::Field => "field",
            MemberKind::Method => "method",
            MemberKind::Constructor => "constructor",
            MemberKind::Parameter => "parameter",
        };
        f.write_str(s)
    }
}

/// A display-ready type.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct ClassView {
    pub id: u32,
    pub array_depth: u32,
    pub variant: TypeVariant,
    /// Fully-qualified name including generics.
    pub reference_name: String,
    /// Name without the package prefix.
    pub name: String,
    pub simple_name: String,
    pub package: String,
    pub modifiers: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub annotations: Vec<String>,
    /// Script line loading the class; raw classes only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_snippet: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct MemberView {
    pub kind: MemberKind,
    pub declaring_class: u32,
    pub declaring_class_name: String,
    /// Index within the declaring class's member list.
    pub index: usize,
    pub name: String,
    /// Rendered type (field type, return type, parameter type).
    pub type_name: String,
    pub modifiers: String,
    pub signature: String,
    pub parameter_count: Option<usize>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct RelatedClassView {
    pub relation: String,
    pub class: ClassView,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct RelationView {
    pub relation: RelationKind,
    pub class: ClassView,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct EventGroupView {
    pub base: String,
    pub classes: Vec<ClassView>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct BindingView {
    pub id: String,
    pub name: String,
    pub type_id: u32,
    pub type_name: String,
    pub data: Option<serde_json::Value>,
}

/// A row that could not be rendered. Sits beside the rows that could.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct RowFailure {
    pub subject: String,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct Table<T> {
    pub rows: Vec<T>,
    pub failures: Vec<RowFailure>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<T> Table<T> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, JsonSchema)]
pub struct SearchResults {
    pub classes: Table<ClassView>,
    pub fields: Table<MemberView>,
    pub methods: Table<MemberView>,
    pub parameters: Table<MemberView>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, JsonSchema)]
pub struct IndexStats {
    pub types: usize,
    pub raw_classes: usize,
    pub parameterized: usize,
    pub type_variables: usize,
    pub wildcards: usize,
    pub edges: usize,
    pub relation_counts: BTreeMap<RelationKind, usize>,
    pub event_classes: usize,
    pub bindings: usize,
    pub warnings: Vec<String>,
    pub loaded_from_cache: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum QueryResult {
    Classes(Table<ClassView>),
    Members(Table<MemberView>),
    Related(Table<RelatedClassView>),
    Relations(Table<RelationView>),
    Search(SearchResults),
    Events(Vec<EventGroupView>),
    Bindings(Table<BindingView>),
    Stats(IndexStats),
}

//! Structured records decoded from a snapshot.
//!
//! Field names on the wire are the single-letter keys the exporter emits;
//! see [`crate::snapshot::decoder`] for the positional string encoding.

use super::ids::{TypeId, TypeRef, one_or_many};
use refdoc_api::TypeVariant;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The four mutually exclusive type variants. Decided once at decode time.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeData {
    Raw(ClassRecord),
    Parameterized(ParameterizedRecord),
    TypeVariable(TypeVariableRecord),
    Wildcard(WildcardRecord),
}

impl TypeData {
    pub fn variant(&self) -> TypeVariant {
        match self {
            TypeData::Raw(_) => TypeVariant::RawClass,
            TypeData::Parameterized(_) => TypeVariant::Parameterized,
            TypeData::TypeVariable(_) => TypeVariant::TypeVariable,
            TypeData::Wildcard(_) => TypeVariant::Wildcard,
        }
    }

    pub fn as_raw(&self) -> Option<&ClassRecord> {
        match self {
            TypeData::Raw(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_parameterized(&self) -> Option<&ParameterizedRecord> {
        match self {
            TypeData::Parameterized(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_type_variable(&self) -> Option<&TypeVariableRecord> {
        match self {
            TypeData::TypeVariable(tv) => Some(tv),
            _ => None,
        }
    }

    pub fn as_wildcard(&self) -> Option<&WildcardRecord> {
        match self {
            TypeData::Wildcard(w) => Some(w),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassRecord {
    #[serde(rename = "n")]
    pub name: u32,
    #[serde(rename = "P", default)]
    pub package: Option<u32>,
    #[serde(rename = "s", default)]
    pub super_class: Option<TypeRef>,
    #[serde(rename = "i", default, deserialize_with = "one_or_many")]
    pub interfaces: Vec<TypeRef>,
    #[serde(rename = "v", default, deserialize_with = "one_or_many")]
    pub type_variables: Vec<TypeId>,
    #[serde(rename = "a", default, deserialize_with = "one_or_many")]
    pub annotations: Vec<u32>,
    #[serde(rename = "M", default)]
    pub modifiers: u32,
    #[serde(rename = "c", default, deserialize_with = "one_or_many")]
    pub constructors: Vec<Value>,
    #[serde(rename = "f", default, deserialize_with = "one_or_many")]
    pub fields: Vec<Value>,
    #[serde(rename = "m", default, deserialize_with = "one_or_many")]
    pub methods: Vec<Value>,
    #[serde(rename = "I", default, deserialize_with = "one_or_many")]
    pub inner_classes: Vec<TypeRef>,
    #[serde(rename = "E", default)]
    pub enclosing_class: Option<TypeRef>,
    #[serde(rename = "D", default)]
    pub declaring_class: Option<TypeRef>,
}

impl ClassRecord {
    /// Super class followed by interfaces, in declaration order.
    pub fn supertypes(&self) -> impl Iterator<Item = TypeRef> + '_ {
        self.super_class.iter().chain(self.interfaces.iter()).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterizedRecord {
    #[serde(rename = "r")]
    pub raw_type: TypeRef,
    #[serde(rename = "o", default)]
    pub owner_type: Option<TypeRef>,
    /// Actual type arguments, positionally matched to the raw type's
    /// declared type variables.
    #[serde(rename = "v", default, deserialize_with = "one_or_many")]
    pub arguments: Vec<TypeRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeVariableRecord {
    pub name: u32,
    pub bounds: Vec<TypeRef>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WildcardRecord {
    #[serde(rename = "u", default, deserialize_with = "one_or_many")]
    pub upper: Vec<TypeRef>,
    #[serde(rename = "l", default, deserialize_with = "one_or_many")]
    pub lower: Vec<TypeRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    #[serde(rename = "n", default)]
    pub name: Option<u32>,
    #[serde(rename = "t")]
    pub ty: TypeRef,
    #[serde(rename = "M", default)]
    pub modifiers: u32,
    #[serde(rename = "a", default, deserialize_with = "one_or_many")]
    pub annotations: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodRecord {
    #[serde(rename = "n", default)]
    pub name: Option<u32>,
    #[serde(rename = "M", default)]
    pub modifiers: u32,
    #[serde(rename = "t")]
    pub return_type: TypeRef,
    #[serde(rename = "a", default, deserialize_with = "one_or_many")]
    pub annotations: Vec<u32>,
    #[serde(rename = "p", default, deserialize_with = "one_or_many")]
    pub parameters: Vec<u32>,
    #[serde(rename = "v", default, deserialize_with = "one_or_many")]
    pub type_variables: Vec<TypeId>,
    #[serde(rename = "e", default, deserialize_with = "one_or_many")]
    pub exceptions: Vec<TypeRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorRecord {
    #[serde(rename = "M", default)]
    pub modifiers: u32,
    #[serde(rename = "a", default, deserialize_with = "one_or_many")]
    pub annotations: Vec<u32>,
    #[serde(rename = "e", default, deserialize_with = "one_or_many")]
    pub exceptions: Vec<TypeRef>,
    #[serde(rename = "v", default, deserialize_with = "one_or_many")]
    pub type_variables: Vec<TypeId>,
    #[serde(rename = "p", default, deserialize_with = "one_or_many")]
    pub parameters: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRecord {
    #[serde(rename = "n", default)]
    pub name: Option<u32>,
    #[serde(rename = "t")]
    pub ty: TypeRef,
    #[serde(rename = "M", default)]
    pub modifiers: u32,
    #[serde(rename = "a", default, deserialize_with = "one_or_many")]
    pub annotations: Vec<u32>,
}

/// Annotation argument text: inline, or a name-table id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationText {
    Name(u32),
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    #[serde(rename = "t")]
    pub ty: TypeRef,
    #[serde(rename = "s", default)]
    pub text: Option<AnnotationText>,
}

/// A global script binding: a name exposed to users with a Java type.
///
/// Wire form is `[name, typeId]` or `[name, typeId, payload]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Value>")]
pub struct Binding {
    pub name: String,
    pub ty: TypeRef,
    pub data: Option<Value>,
}

impl TryFrom<Vec<Value>> for Binding {
    type Error = String;

    fn try_from(parts: Vec<Value>) -> Result<Self, Self::Error> {
        if !(2..=3).contains(&parts.len()) {
            return Err(format!("binding must have 2 or 3 parts, found {}", parts.len()));
        }
        let mut parts = parts.into_iter();
        let name = match parts.next() {
            Some(Value::String(name)) => name,
            other => return Err(format!("binding name must be a string, found {:?}", other)),
        };
        let ty: TypeRef = parts
            .next()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| e.to_string())?
            .ok_or("binding type is missing")?;
        let data = parts.next().filter(|v| !v.is_null());
        Ok(Binding { name, ty, data })
    }
}

impl Binding {
    pub fn id(&self) -> String {
        format!("{}-{}", self.name, self.ty.id)
    }
}

/// Members of a raw class, decoded together on first access.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassMembers {
    pub fields: Vec<FieldRecord>,
    pub methods: Vec<MethodRecord>,
    pub constructors: Vec<ConstructorRecord>,
}

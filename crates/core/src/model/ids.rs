use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Index into the snapshot's `types` table.
pub type TypeId = u32;

/// A reference to a type, possibly wrapped in `depth` array dimensions.
///
/// This is a plain value: two references to `String[][]` compare and hash
/// equal, so render and lookup caches never hold duplicate-but-unequal
/// array wrappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "TypeRefRepr", into = "TypeRefRepr")]
pub struct TypeRef {
    pub id: TypeId,
    pub depth: u32,
}

impl TypeRef {
    pub const fn new(id: TypeId) -> Self {
        Self { id, depth: 0 }
    }

    pub const fn array(id: TypeId, depth: u32) -> Self {
        Self { id, depth }
    }

    pub fn is_array(&self) -> bool {
        self.depth > 0
    }

    /// The same element type with no array dimensions.
    pub fn element(&self) -> TypeRef {
        TypeRef::new(self.id)
    }

    /// Adds `extra` array dimensions.
    pub fn deepen(&self, extra: u32) -> TypeRef {
        TypeRef::array(self.id, self.depth + extra)
    }
}

impl From<TypeId> for TypeRef {
    fn from(id: TypeId) -> Self {
        TypeRef::new(id)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.depth == 0 {
            write!(f, "{}", self.id)
        } else {
            write!(f, "[{}, {}]", self.id, self.depth)
        }
    }
}

/// Wire form: a bare id, or `[id, depth]` for arrays.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum TypeRefRepr {
    Plain(TypeId),
    Array(TypeId, u32),
}

impl From<TypeRefRepr> for TypeRef {
    fn from(repr: TypeRefRepr) -> Self {
        match repr {
            TypeRefRepr::Plain(id) => TypeRef::new(id),
            TypeRefRepr::Array(id, depth) => TypeRef::array(id, depth),
        }
    }
}

impl From<TypeRef> for TypeRefRepr {
    fn from(r: TypeRef) -> Self {
        if r.depth == 0 {
            TypeRefRepr::Plain(r.id)
        } else {
            TypeRefRepr::Array(r.id, r.depth)
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Accepts either a single value or a list. `null` becomes an empty list.
pub(crate) fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value: Option<OneOrMany<T>> = Option::deserialize(deserializer)?;
    Ok(match value {
        None => Vec::new(),
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
    })
}

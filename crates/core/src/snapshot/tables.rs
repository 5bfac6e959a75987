use super::decoder::{EntityKind, decode};
use super::{NameEntry, PackageEntry, Snapshot};
use crate::error::{RefdocError, Result};
use crate::model::ids::one_or_many;
use crate::model::{
    AnnotationRecord, Binding, ClassMembers, ClassRecord, ParameterRecord, ParameterizedRecord,
    TypeData, TypeId, TypeRef, TypeVariableRecord, WildcardRecord,
};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Nesting cap for name aliases and package parents.
const MAX_CHAIN: usize = 256;

/// Decoded view over a [`Snapshot`]. Each slot is decoded on first access
/// and kept for the lifetime of the tables.
#[derive(Debug)]
pub struct DataTables {
    snapshot: Snapshot,
    types: Vec<OnceCell<TypeData>>,
    members: Vec<OnceCell<ClassMembers>>,
    parameters: Vec<OnceCell<ParameterRecord>>,
    annotations: Vec<OnceCell<AnnotationRecord>>,
    names: Vec<OnceCell<String>>,
    packages: Vec<OnceCell<String>>,
}

fn cells<T>(len: usize) -> Vec<OnceCell<T>> {
    (0..len).map(|_| OnceCell::new()).collect()
}

fn check_index(table: &'static str, id: i64, len: usize) -> Result<usize> {
    if id < 0 || id as usize >= len {
        return Err(RefdocError::InvalidId { table, id, len });
    }
    Ok(id as usize)
}

impl DataTables {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            types: cells(snapshot.types.len()),
            members: cells(snapshot.types.len()),
            parameters: cells(snapshot.parameters.len()),
            annotations: cells(snapshot.annotations.len()),
            names: cells(snapshot.names.len()),
            packages: cells(snapshot.packages.len()),
            snapshot,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn type_count(&self) -> usize {
        self.snapshot.types.len()
    }

    pub fn type_ids(&self) -> impl Iterator<Item = TypeId> {
        0..self.type_count() as TypeId
    }

    /// Raw record text for diagnostics.
    pub fn raw_type(&self, id: TypeId) -> String {
        self.snapshot
            .types
            .get(id as usize)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "<missing>".to_string())
    }

    pub fn type_data(&self, id: TypeId) -> Result<&TypeData> {
        let index = check_index("type", id as i64, self.type_count())?;
        self.types[index].get_or_try_init(|| classify(id, &self.snapshot.types[index]))
    }

    pub fn raw_class(&self, id: TypeId) -> Result<Option<&ClassRecord>> {
        Ok(self.type_data(id)?.as_raw())
    }

    /// Fields, methods and constructors of a raw class. Other variants
    /// have none.
    pub fn members(&self, id: TypeId) -> Result<&ClassMembers> {
        let index = check_index("type", id as i64, self.type_count())?;
        self.members[index].get_or_try_init(|| {
            let Some(class) = self.type_data(id)?.as_raw() else {
                return Ok(ClassMembers::default());
            };
            Ok(ClassMembers {
                fields: class
                    .fields
                    .iter()
                    .map(|raw| decode(EntityKind::Field, raw))
                    .collect::<Result<_>>()?,
                methods: class
                    .methods
                    .iter()
                    .map(|raw| decode(EntityKind::Method, raw))
                    .collect::<Result<_>>()?,
                constructors: class
                    .constructors
                    .iter()
                    .map(|raw| decode(EntityKind::Constructor, raw))
                    .collect::<Result<_>>()?,
            })
        })
    }

    pub fn parameter(&self, id: u32) -> Result<&ParameterRecord> {
        let index = check_index("parameter", id as i64, self.snapshot.parameters.len())?;
        self.parameters[index]
            .get_or_try_init(|| decode(EntityKind::Parameter, &self.snapshot.parameters[index]))
    }

    pub fn annotation(&self, id: u32) -> Result<&AnnotationRecord> {
        let index = check_index("annotation", id as i64, self.snapshot.annotations.len())?;
        self.annotations[index]
            .get_or_try_init(|| decode(EntityKind::Annotation, &self.snapshot.annotations[index]))
    }

    pub fn name(&self, id: u32) -> Result<&str> {
        let index = check_index("name", id as i64, self.snapshot.names.len())?;
        let resolved = self.names[index].get_or_try_init(|| self.resolve_name(id, 0))?;
        Ok(resolved.as_str())
    }

    /// Nested lookups read finished cells but never initialize one, so a
    /// cyclic alias runs into the depth cap instead of re-entering a cell.
    fn resolve_name(&self, id: u32, depth: usize) -> Result<String> {
        let index = check_index("name", id as i64, self.snapshot.names.len())?;
        if let Some(done) = self.names[index].get() {
            return Ok(done.clone());
        }
        if depth > MAX_CHAIN {
            return Err(RefdocError::Decode(format!("name {} has a cyclic alias chain", id)));
        }
        match &self.snapshot.names[index] {
            NameEntry::Text(text) => Ok(text.clone()),
            NameEntry::Alias(other) => self.resolve_name(*other, depth + 1),
            NameEntry::Parts(parts) => {
                let mut out = String::new();
                for part in parts {
                    out.push_str(&self.resolve_name(*part, depth + 1)?);
                }
                Ok(out)
            }
        }
    }

    /// Dotted package name, e.g. `java.util.concurrent`.
    pub fn package_name(&self, id: u32) -> Result<&str> {
        let index = check_index("package", id as i64, self.snapshot.packages.len())?;
        let resolved = self.packages[index].get_or_try_init(|| self.resolve_package(id, 0))?;
        Ok(resolved.as_str())
    }

    fn resolve_package(&self, id: u32, depth: usize) -> Result<String> {
        let index = check_index("package", id as i64, self.snapshot.packages.len())?;
        if let Some(done) = self.packages[index].get() {
            return Ok(done.clone());
        }
        if depth > MAX_CHAIN {
            return Err(RefdocError::Decode(format!("package {} is its own parent", id)));
        }
        let entry: &PackageEntry = &self.snapshot.packages[index];
        match entry.parent() {
            Some(parent) => Ok(format!(
                "{}.{}",
                self.resolve_package(parent, depth + 1)?,
                entry.segment()
            )),
            None => Ok(entry.segment().to_string()),
        }
    }

    pub fn bindings(&self) -> Result<Vec<Binding>> {
        self.snapshot
            .bindings
            .iter()
            .map(|raw| {
                serde_json::from_value::<Binding>(raw.clone())
                    .map_err(|e| RefdocError::Decode(format!("invalid binding {}: {}", raw, e)))
            })
            .collect()
    }

    /// Checks that a reference points into the type table.
    pub fn check_ref(&self, r: TypeRef) -> Result<()> {
        check_index("type", r.id as i64, self.type_count()).map(|_| ())
    }
}

#[derive(Deserialize)]
struct TypeVariableWire {
    #[serde(default)]
    tv: Option<u32>,
    #[serde(default)]
    n: Option<u32>,
    #[serde(rename = "b", default, deserialize_with = "one_or_many")]
    bounds: Vec<TypeRef>,
}

/// Decides the variant of a type record from its keys.
///
/// Precedence: type variable (`tv` or `b`), parameterized (`r`), raw
/// class (`n`), wildcard (`u`/`l`, or no public keys at all).
fn classify(id: TypeId, raw: &Value) -> Result<TypeData> {
    let Value::Object(obj) = raw else {
        if raw.is_null() {
            return Err(RefdocError::Decode(format!("type {} has no data", id)));
        }
        return Err(unknown(id, raw));
    };

    let convert = |e: serde_json::Error| {
        RefdocError::Decode(format!("invalid type record {}: {} ({})", id, raw, e))
    };
    let value = || Value::Object(obj.clone());

    if obj.contains_key("tv") || obj.contains_key("b") {
        let wire: TypeVariableWire = serde_json::from_value(value()).map_err(convert)?;
        let name = wire
            .tv
            .or(wire.n)
            .ok_or_else(|| RefdocError::Decode(format!("type variable {} has no name", id)))?;
        return Ok(TypeData::TypeVariable(TypeVariableRecord {
            name,
            bounds: wire.bounds,
        }));
    }
    if obj.contains_key("r") {
        let record: ParameterizedRecord = serde_json::from_value(value()).map_err(convert)?;
        return Ok(TypeData::Parameterized(record));
    }
    if obj.contains_key("n") {
        let record: ClassRecord = serde_json::from_value(value()).map_err(convert)?;
        return Ok(TypeData::Raw(record));
    }
    if obj.contains_key("u") || obj.contains_key("l") || has_no_public_keys(obj) {
        let record: WildcardRecord = serde_json::from_value(value()).map_err(convert)?;
        return Ok(TypeData::Wildcard(record));
    }

    tracing::error!("Unknown type {}: {}", id, raw);
    Err(unknown(id, raw))
}

fn has_no_public_keys(obj: &Map<String, Value>) -> bool {
    obj.keys().all(|key| key.starts_with('_'))
}

fn unknown(id: TypeId, raw: &Value) -> RefdocError {
    RefdocError::UnknownType {
        id,
        raw: raw.to_string(),
    }
}

//! The type wrapper and the per-session type system around it.
//!
//! [`TypeSystem`] owns the decoded tables plus every derived cache
//! (substitution maps, rendered names, inheritance sets, name lookups).
//! [`JavaType`] is a cheap borrowed view over one type reference with a
//! uniform surface across the four variants.

pub mod lookup;
pub mod members;
pub mod partitions;
pub mod related;

pub use members::{Constructor, Field, Method, Parameter, ParameterOwner};
pub use partitions::Partitions;
pub use related::{Related, RelatedClass};

use crate::config::RefdocConfig;
use crate::error::Result;
use crate::model::{ClassRecord, TypeData, TypeId, TypeRef};
use crate::render::{NameOptions, Renderer};
use crate::snapshot::DataTables;
use crate::substitution::{SubstitutionEngine, TypeVariableMap, strip_self_mappings};
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use refdoc_api::{Modifiers, TypeVariant};
use std::collections::HashSet;
use std::sync::Arc;

pub struct TypeSystem {
    tables: Arc<DataTables>,
    config: Arc<RefdocConfig>,
    substitution: SubstitutionEngine,
    renderer: Renderer,
    inherited: DashMap<TypeId, Arc<Vec<TypeId>>>,
    lookup: DashMap<String, TypeRef>,
    partitions: OnceCell<Arc<Partitions>>,
}

impl std::fmt::Debug for TypeSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeSystem")
            .field("types", &self.tables.type_count())
            .field("lookups", &self.lookup.len())
            .finish_non_exhaustive()
    }
}

impl TypeSystem {
    pub fn new(tables: Arc<DataTables>, config: Arc<RefdocConfig>) -> Self {
        Self {
            substitution: SubstitutionEngine::new(
                config.substitution_hop_limit,
                config.owner_walk_limit,
            ),
            renderer: Renderer::new(),
            inherited: DashMap::new(),
            lookup: DashMap::new(),
            partitions: OnceCell::new(),
            tables,
            config,
        }
    }

    pub fn tables(&self) -> &DataTables {
        &self.tables
    }

    pub fn shared_tables(&self) -> Arc<DataTables> {
        self.tables.clone()
    }

    pub fn config(&self) -> &RefdocConfig {
        &self.config
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn substitution(&self) -> &SubstitutionEngine {
        &self.substitution
    }

    /// Wraps a reference. An out-of-range id is fatal.
    pub fn get(&self, r: TypeRef) -> Result<JavaType<'_>> {
        let data = self.tables.type_data(r.id)?;
        Ok(JavaType {
            sys: self,
            r,
            data,
            overlay: None,
        })
    }

    pub fn get_id(&self, id: TypeId) -> Result<JavaType<'_>> {
        self.get(TypeRef::new(id))
    }

    pub fn partitions(&self) -> Result<Arc<Partitions>> {
        self.partitions
            .get_or_try_init(|| Partitions::build(&self.tables).map(Arc::new))
            .cloned()
    }

    /// Uses partitions restored from a persisted index. Returns `false`
    /// when partitions were already built; the built ones stay.
    pub fn install_partitions(&self, partitions: Arc<Partitions>) -> bool {
        match self.partitions.set(partitions) {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!("Partitions already built; restored partitions ignored");
                false
            }
        }
    }

    /// Type-variable map of `id` with self-mappings removed.
    pub fn type_variable_map(&self, id: TypeId) -> Result<Arc<TypeVariableMap>> {
        let full = self.substitution.exhaustive(&self.tables, id)?;
        if full.iter().any(|(k, v)| v.id == *k && v.depth == 0) {
            return Ok(Arc::new(strip_self_mappings(&full)));
        }
        Ok(full)
    }

    pub fn render(&self, r: TypeRef, options: &NameOptions) -> Result<String> {
        self.renderer.render(&self.tables, r, options)
    }

    /// Every type reached from `id` through super classes, interfaces and
    /// raw types, `id` first. Memoized per id.
    pub fn all_inherited_classes(&self, id: TypeId) -> Result<Arc<Vec<TypeId>>> {
        if let Some(hit) = self.inherited.get(&id) {
            return Ok(hit.value().clone());
        }
        let mut order = Vec::new();
        self.follow_inheritance(id, |t| {
            order.push(t.id());
            Ok(())
        })?;
        let order = Arc::new(order);
        self.inherited.insert(id, order.clone());
        Ok(order)
    }

    /// Depth-first walk over the inheritance graph of `id`, visiting each
    /// type once. Super classes are visited before interfaces.
    pub fn follow_inheritance<F>(&self, id: TypeId, mut action: F) -> Result<()>
    where
        F: FnMut(&JavaType<'_>) -> Result<()>,
    {
        let mut seen = HashSet::new();
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if !seen.insert(current) {
                continue;
            }
            let wrapped = self.get_id(current)?;
            action(&wrapped)?;

            let mut next: Vec<TypeId> = Vec::new();
            match wrapped.data {
                TypeData::Raw(class) => next.extend(class.supertypes().map(|s| s.id)),
                TypeData::Parameterized(p) => next.push(p.raw_type.id),
                TypeData::TypeVariable(_) | TypeData::Wildcard(_) => {}
            }
            pending.extend(next.into_iter().rev());
        }
        Ok(())
    }

    pub fn cache_lookup(&self, name: &str, r: TypeRef) {
        self.lookup.insert(name.to_string(), r);
    }

    pub fn cached_lookup(&self, name: &str) -> Option<TypeRef> {
        self.lookup.get(name).map(|hit| *hit.value())
    }

    pub fn lookup_entries(&self) -> Vec<(String, TypeRef)> {
        let mut entries: Vec<_> = self
            .lookup
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect();
        entries.sort();
        entries
    }

    /// Drops every memoized value. Decoded tables are kept.
    pub fn clear_caches(&self) {
        self.substitution.clear();
        self.renderer.clear();
        self.inherited.clear();
        self.lookup.clear();
    }
}

/// One type reference, viewed through its variant.
#[derive(Clone)]
pub struct JavaType<'a> {
    sys: &'a TypeSystem,
    r: TypeRef,
    data: &'a TypeData,
    overlay: Option<Arc<TypeVariableMap>>,
}

impl std::fmt::Debug for JavaType<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JavaType")
            .field("ref", &self.r)
            .field("variant", &self.variant())
            .finish()
    }
}

impl<'a> JavaType<'a> {
    pub fn system(&self) -> &'a TypeSystem {
        self.sys
    }

    pub fn id(&self) -> TypeId {
        self.r.id
    }

    pub fn type_ref(&self) -> TypeRef {
        self.r
    }

    pub fn array_depth(&self) -> u32 {
        self.r.depth
    }

    pub fn data(&self) -> &'a TypeData {
        self.data
    }

    pub fn variant(&self) -> TypeVariant {
        self.data.variant()
    }

    pub fn is_raw_class(&self) -> bool {
        matches!(self.data, TypeData::Raw(_))
    }

    pub fn is_parameterized(&self) -> bool {
        matches!(self.data, TypeData::Parameterized(_))
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self.data, TypeData::Wildcard(_))
    }

    pub fn is_type_variable(&self) -> bool {
        matches!(self.data, TypeData::TypeVariable(_))
    }

    pub fn class(&self) -> Option<&'a ClassRecord> {
        self.data.as_raw()
    }

    pub fn super_class(&self) -> Option<TypeRef> {
        self.class().and_then(|c| c.super_class)
    }

    pub fn interfaces(&self) -> &'a [TypeRef] {
        self.class().map(|c| c.interfaces.as_slice()).unwrap_or(&[])
    }

    /// Type variables declared by a raw class.
    pub fn declared_type_variables(&self) -> &'a [TypeId] {
        self.class().map(|c| c.type_variables.as_slice()).unwrap_or(&[])
    }

    /// Actual arguments of a parameterized type.
    pub fn arguments(&self) -> &'a [TypeRef] {
        self.data
            .as_parameterized()
            .map(|p| p.arguments.as_slice())
            .unwrap_or(&[])
    }

    pub fn raw_type(&self) -> Option<TypeRef> {
        self.data.as_parameterized().map(|p| p.raw_type)
    }

    pub fn owner_type(&self) -> Option<TypeRef> {
        self.data.as_parameterized().and_then(|p| p.owner_type)
    }

    pub fn bounds(&self) -> &'a [TypeRef] {
        self.data
            .as_type_variable()
            .map(|tv| tv.bounds.as_slice())
            .unwrap_or(&[])
    }

    pub fn upper_bounds(&self) -> &'a [TypeRef] {
        self.data
            .as_wildcard()
            .map(|w| w.upper.as_slice())
            .unwrap_or(&[])
    }

    pub fn lower_bounds(&self) -> &'a [TypeRef] {
        self.data
            .as_wildcard()
            .map(|w| w.lower.as_slice())
            .unwrap_or(&[])
    }

    pub fn enclosing_class(&self) -> Option<TypeRef> {
        self.class().and_then(|c| c.enclosing_class)
    }

    pub fn declaring_class(&self) -> Option<TypeRef> {
        self.class().and_then(|c| c.declaring_class)
    }

    pub fn inner_classes(&self) -> &'a [TypeRef] {
        self.class().map(|c| c.inner_classes.as_slice()).unwrap_or(&[])
    }

    pub fn modifiers(&self) -> Modifiers {
        Modifiers(self.class().map(|c| c.modifiers).unwrap_or(0))
    }

    pub fn annotations(&self) -> &'a [u32] {
        self.class().map(|c| c.annotations.as_slice()).unwrap_or(&[])
    }

    /// Package of a raw class, or of a parameterized type's raw class.
    /// Empty for everything else.
    pub fn package_name(&self) -> Result<String> {
        match self.data {
            TypeData::Raw(class) => match class.package {
                Some(p) => Ok(self.sys.tables().package_name(p)?.to_string()),
                None => Ok(String::new()),
            },
            TypeData::Parameterized(p) => self.sys.get(p.raw_type.element())?.package_name(),
            TypeData::TypeVariable(_) | TypeData::Wildcard(_) => Ok(String::new()),
        }
    }

    /// Adds bindings from a surrounding context; they take precedence over
    /// this type's own map.
    pub fn with_type_variable_map(mut self, map: Option<Arc<TypeVariableMap>>) -> Self {
        let Some(map) = map.filter(|m| !m.is_empty()) else {
            return self;
        };
        let merged = match self.overlay.take() {
            Some(existing) => {
                let mut merged = (*existing).clone();
                merged.extend(map.iter().map(|(k, v)| (*k, *v)));
                Arc::new(merged)
            }
            None => map,
        };
        self.overlay = Some(merged);
        self
    }

    /// This type's own resolved map plus any overlay.
    pub fn type_variable_map(&self) -> Result<Arc<TypeVariableMap>> {
        let own = self.sys.type_variable_map(self.id())?;
        let Some(overlay) = &self.overlay else {
            return Ok(own);
        };
        let mut merged = (*own).clone();
        merged.extend(overlay.iter().map(|(k, v)| (*k, *v)));
        Ok(Arc::new(strip_self_mappings(&merged)))
    }

    fn options(&self, append_package: bool, include_generics: bool) -> Result<NameOptions> {
        Ok(NameOptions::default()
            .with_type_variable_map(Some(self.type_variable_map()?))
            .append_package_name(append_package)
            .include_generics(include_generics))
    }

    /// Declared type variables of a raw class as `<A, B>`, rendered with the
    /// given options. Empty when there are none.
    fn generic_suffix(&self, options: &NameOptions) -> Result<String> {
        let vars = self.declared_type_variables();
        if vars.is_empty() || !options.is_including_generics() {
            return Ok(String::new());
        }
        let rendered = vars
            .iter()
            .map(|v| self.sys.render(TypeRef::new(*v), options))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("<{}>", rendered.join(", ")))
    }

    fn with_depth(&self, mut text: String) -> String {
        for _ in 0..self.array_depth() {
            text.push_str("[]");
        }
        text
    }

    /// Package-qualified name, e.g. `java.util.Map<K, V>`.
    pub fn fully_qualified_name(&self, include_generics: bool) -> Result<String> {
        let options = self.options(true, include_generics)?;
        let base = self.sys.render(self.r.element(), &options)?;
        let suffix = self.generic_suffix(&options)?;
        Ok(self.with_depth(base + &suffix))
    }

    /// The fully-qualified name with generics; used as a unique key.
    pub fn reference_name(&self) -> Result<String> {
        self.fully_qualified_name(true)
    }

    /// Name without the package prefix, e.g. `Map$Entry<K, V>`.
    pub fn name(&self) -> Result<String> {
        let options = self.options(false, true)?;
        let base = self.sys.render(self.r.element(), &options)?;
        let suffix = self.generic_suffix(&options)?;
        Ok(self.with_depth(base + &suffix))
    }

    pub fn simple_name(&self) -> Result<String> {
        let tables = self.sys.tables();
        let base = match self.data {
            TypeData::Wildcard(_) => "?".to_string(),
            TypeData::TypeVariable(tv) => tables.name(tv.name)?.to_string(),
            TypeData::Parameterized(p) => {
                let raw = self.sys.get(p.raw_type.element())?.simple_name()?;
                match p.owner_type {
                    Some(owner) => {
                        format!("{}${}", self.sys.get(owner.element())?.simple_name()?, raw)
                    }
                    None => raw,
                }
            }
            TypeData::Raw(class) => tables.name(class.name)?.to_string(),
        };
        Ok(self.with_depth(base))
    }

    /// Renders with explicit options, keeping this type's map.
    pub fn render(&self, options: &NameOptions) -> Result<String> {
        let options = options.with_type_variable_map(Some(self.type_variable_map()?));
        self.sys.render(self.r, &options)
    }

    /// Rendered annotation texts, e.g. `@java.lang.Deprecated()`.
    pub fn annotation_texts(&self) -> Result<Vec<String>> {
        crate::render::signature::annotations(self.sys, self.annotations())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Snapshot;
    use serde_json::json;

    // 0 Object, 1 T, 2 Box<T>, 3 Integer, 4 Box<Integer>, 5 IntBox,
    // 6 Map, 7 Entry (declared in Map), 8 K, 9 V
    pub(crate) fn system() -> TypeSystem {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "types": [
                {"n": 0, "P": 1},
                {"tv": 1},
                {"n": 2, "P": 2, "s": 0, "v": [1], "M": 1},
                {"n": 3, "P": 1, "s": 0, "M": 17},
                {"r": 2, "v": [3]},
                {"n": 4, "P": 2, "s": 4, "M": 1},
                {"n": 5, "P": 3, "v": [8, 9], "M": 513},
                {"n": 6, "P": 3, "D": 6, "v": [8, 9], "M": 521},
                {"tv": 7},
                {"tv": 8}
            ],
            "names": ["Object", "T", "Box", "Integer", "IntBox", "Map", "Entry", "K", "V"],
            "packages": [["java"], ["lang", 0], ["demo"], ["util", 0]]
        }))
        .unwrap();
        TypeSystem::new(
            Arc::new(DataTables::new(snapshot)),
            Arc::new(RefdocConfig::default()),
        )
    }

    #[test]
    fn test_variant_predicates_are_exclusive() {
        let sys = system();
        for id in sys.tables().type_ids() {
            let t = sys.get_id(id).unwrap();
            let flags = [
                t.is_raw_class(),
                t.is_parameterized(),
                t.is_wildcard(),
                t.is_type_variable(),
            ];
            assert_eq!(flags.iter().filter(|f| **f).count(), 1, "type {}", id);
        }
    }

    #[test]
    fn test_names_of_generic_class() {
        let sys = system();
        let b = sys.get_id(2).unwrap();
        assert_eq!(b.reference_name().unwrap(), "demo.Box<T>");
        assert_eq!(b.fully_qualified_name(false).unwrap(), "demo.Box");
        assert_eq!(b.name().unwrap(), "Box<T>");
        assert_eq!(b.simple_name().unwrap(), "Box");
    }

    #[test]
    fn test_parameterized_names() {
        let sys = system();
        let p = sys.get_id(4).unwrap();
        assert_eq!(p.reference_name().unwrap(), "demo.Box<java.lang.Integer>");
        assert_eq!(p.name().unwrap(), "Box<Integer>");
        assert_eq!(p.simple_name().unwrap(), "Box");
        assert_eq!(p.package_name().unwrap(), "demo");
    }

    #[test]
    fn test_nested_class_names() {
        let sys = system();
        let entry = sys.get_id(7).unwrap();
        assert_eq!(entry.reference_name().unwrap(), "java.util.Map$Entry<K, V>");
        assert_eq!(entry.simple_name().unwrap(), "Entry");
    }

    #[test]
    fn test_array_names() {
        let sys = system();
        let t = sys.get(TypeRef::array(3, 2)).unwrap();
        assert_eq!(t.reference_name().unwrap(), "java.lang.Integer[][]");
        assert_eq!(t.simple_name().unwrap(), "Integer[][]");
        assert_eq!(t.array_depth(), 2);
    }

    #[test]
    fn test_inheritance_walk_order() {
        let sys = system();
        assert_eq!(*sys.all_inherited_classes(5).unwrap(), vec![5, 4, 2, 0]);
    }

    #[test]
    fn test_restored_partitions_only_install_once() {
        let sys = system();
        let restored = Arc::new(Partitions {
            raw: vec![0],
            ..Partitions::default()
        });
        assert!(sys.install_partitions(restored.clone()));
        assert_eq!(sys.partitions().unwrap(), restored);

        let late = system();
        let built = late.partitions().unwrap();
        assert!(!late.install_partitions(restored));
        assert_eq!(late.partitions().unwrap(), built);
    }

    #[test]
    fn test_overlay_wins_over_own_map() {
        let sys = system();
        let overlay: TypeVariableMap = [(1, TypeRef::new(0))].into_iter().collect();
        let t = sys
            .get_id(5)
            .unwrap()
            .with_type_variable_map(Some(Arc::new(overlay)));
        assert_eq!(t.type_variable_map().unwrap().get(&1), Some(&TypeRef::new(0)));
    }
}

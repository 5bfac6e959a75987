//! One-time indexing pass over every type in a snapshot.
//!
//! Produces the relationship graph, the variant partitions used by name
//! lookup, the event-class groups and a list of integrity warnings. Runs
//! synchronously; the session moves it off the async runtime.

use crate::error::{RefdocError, Result};
use crate::graph::RelationshipGraph;
use crate::model::{TypeData, TypeId, TypeRef};
use crate::types::{Partitions, TypeSystem};
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::Dfs;
use refdoc_api::{IndexStats, RelationKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use RelationKind::*;

/// Everything the indexing pass produces. Persisted as one unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexOutput {
    pub graph: RelationshipGraph,
    pub partitions: Partitions,
    /// Marker base class name → the marker and every class derived from it.
    pub events: BTreeMap<String, Vec<TypeId>>,
    /// Name lookups resolved while indexing.
    pub lookups: Vec<(String, TypeRef)>,
    pub warnings: Vec<String>,
}

impl IndexOutput {
    pub fn stats(&self, bindings: usize) -> IndexStats {
        let counts = self.graph.counts();
        IndexStats {
            types: self.partitions.len(),
            raw_classes: self.partitions.raw.len(),
            parameterized: self.partitions.parameterized.len(),
            type_variables: self.partitions.type_variables.len(),
            wildcards: self.partitions.wildcards.len(),
            edges: counts.values().sum(),
            relation_counts: counts,
            event_classes: self
                .events
                .values()
                .flatten()
                .collect::<BTreeSet<_>>()
                .len(),
            bindings,
            warnings: self.warnings.clone(),
            loaded_from_cache: false,
        }
    }
}

pub struct Indexer<'a> {
    sys: &'a TypeSystem,
    graph: RelationshipGraph,
    warnings: Vec<String>,
}

impl<'a> Indexer<'a> {
    pub fn new(sys: &'a TypeSystem) -> Self {
        Self {
            sys,
            graph: RelationshipGraph::new(),
            warnings: Vec::new(),
        }
    }

    pub fn run(mut self) -> Result<IndexOutput> {
        let start = Instant::now();
        let sys = self.sys;
        let tables = sys.tables();
        info!("Indexing {} types", tables.type_count());

        let partitions = sys.partitions()?;
        let hierarchy = self.hierarchy()?;

        for id in tables.type_ids() {
            self.index_type(id, &hierarchy)?;
        }

        let events = self.find_event_classes()?;
        info!(
            "Indexed {} types into {} edges in {:?} ({} warnings)",
            tables.type_count(),
            self.graph.edge_count(),
            start.elapsed(),
            self.warnings.len()
        );

        Ok(IndexOutput {
            graph: self.graph,
            partitions: (*partitions).clone(),
            events,
            lookups: sys.lookup_entries(),
            warnings: self.warnings,
        })
    }

    /// Direct supertype edges: class → super class and interfaces,
    /// parameterized type → raw type.
    fn hierarchy(&self) -> Result<DiGraphMap<TypeId, ()>> {
        let tables = self.sys.tables();
        let mut hierarchy = DiGraphMap::new();
        for id in tables.type_ids() {
            hierarchy.add_node(id);
            match tables.type_data(id)? {
                TypeData::Raw(class) => {
                    for parent in class.supertypes() {
                        tables.check_ref(parent)?;
                        hierarchy.add_edge(id, parent.id, ());
                    }
                }
                TypeData::Parameterized(p) => {
                    tables.check_ref(p.raw_type)?;
                    hierarchy.add_edge(id, p.raw_type.id, ());
                }
                TypeData::TypeVariable(_) | TypeData::Wildcard(_) => {}
            }
        }
        Ok(hierarchy)
    }

    fn mark<I>(&mut self, from: TypeId, targets: I, kinds: &[RelationKind]) -> Result<()>
    where
        I: IntoIterator<Item = TypeRef>,
    {
        let unique: BTreeSet<TypeId> = targets.into_iter().map(|r| r.id).collect();
        for to in unique {
            self.sys.tables().check_ref(TypeRef::new(to))?;
            for kind in kinds {
                self.graph.add_edge(from, *kind, to);
            }
        }
        Ok(())
    }

    fn index_type(&mut self, id: TypeId, hierarchy: &DiGraphMap<TypeId, ()>) -> Result<()> {
        let sys = self.sys;
        let tables = sys.tables();

        let mut inherited = Vec::new();
        let mut dfs = Dfs::new(hierarchy, id);
        while let Some(next) = dfs.next(hierarchy) {
            if next != id {
                inherited.push(TypeRef::new(next));
            }
        }
        self.mark(id, inherited, &[Inherits, References])?;

        match tables.type_data(id)? {
            TypeData::Raw(class) => {
                self.mark(id, class.super_class, &[SuperClass])?;

                let members = tables.members(id)?;
                let mut constructor_params = Vec::new();
                for ctor in &members.constructors {
                    for param in &ctor.parameters {
                        constructor_params.push(tables.parameter(*param)?.ty);
                    }
                }
                self.mark(
                    id,
                    constructor_params,
                    &[ConstructorParameterType, ParameterType, References],
                )?;
                self.mark(
                    id,
                    members.fields.iter().map(|f| f.ty),
                    &[FieldType, References],
                )?;
                self.mark(
                    id,
                    members.methods.iter().map(|m| m.return_type),
                    &[MethodReturnType, References],
                )?;
                let mut method_params = Vec::new();
                for method in &members.methods {
                    for param in &method.parameters {
                        method_params.push(tables.parameter(*param)?.ty);
                    }
                }
                self.mark(
                    id,
                    method_params,
                    &[MethodParameterType, ParameterType, References],
                )?;

                self.mark(id, class.declaring_class, &[DeclaringClass, References])?;
                self.mark(id, class.enclosing_class, &[EnclosingClass, References])?;
                self.mark(
                    id,
                    class.inner_classes.iter().copied(),
                    &[EnclosesClass, References],
                )?;
                self.mark(
                    id,
                    class.type_variables.iter().map(|v| TypeRef::new(*v)),
                    &[TypeVariableOf, References],
                )?;
            }
            TypeData::Parameterized(p) => {
                self.check_arity(id, p.raw_type, p.arguments.len())?;
                self.mark(id, Some(p.raw_type), &[RawType, References])?;
                self.mark(id, p.owner_type, &[OwnerType, References])?;
            }
            TypeData::Wildcard(w) => {
                self.mark(id, w.lower.iter().copied(), &[LowerBound, References])?;
                self.mark(id, w.upper.iter().copied(), &[UpperBound, References])?;
            }
            TypeData::TypeVariable(tv) => {
                self.mark(
                    id,
                    tv.bounds.iter().copied(),
                    &[TypeVariableBounds, References],
                )?;
            }
        }
        Ok(())
    }

    /// A parameterized type must carry one argument per declared variable.
    /// Mismatches are recorded, not fatal.
    fn check_arity(&mut self, id: TypeId, raw: TypeRef, found: usize) -> Result<()> {
        let Some(class) = self.sys.tables().raw_class(raw.id)? else {
            error!(
                "Parameterized type {} has non-class raw type {}: {}",
                id,
                raw.id,
                self.sys.tables().raw_type(raw.id)
            );
            return Err(RefdocError::Decode(format!(
                "raw type {} of parameterized type {} is not a class",
                raw.id, id
            )));
        };
        let expected = class.type_variables.len();
        if expected != found {
            let message = format!(
                "Parameterized type {} has {} type arguments but raw type {} declares {}",
                id, found, raw.id, expected
            );
            warn!("{}", message);
            self.warnings.push(message);
        }
        Ok(())
    }

    /// Groups every class derived from a configured marker base.
    fn find_event_classes(&self) -> Result<BTreeMap<String, Vec<TypeId>>> {
        let mut events = BTreeMap::new();
        for base in &self.sys.config().event_base_classes {
            let Some(found) = self.sys.find_class_by_name(base)? else {
                debug!("Event base class {} is not in the snapshot", base);
                continue;
            };
            let mut seen = BTreeSet::new();
            let mut group = Vec::new();
            let derived = self.graph.relation(InheritedBy, found.id);
            let variants = self.graph.relation(ParameterizedVariant, found.id);
            for id in std::iter::once(found.id).chain(derived).chain(variants) {
                if seen.insert(id) {
                    group.push(id);
                }
            }
            events.insert(base.clone(), group);
        }
        Ok(events)
    }
}

pub fn index(sys: &TypeSystem) -> Result<IndexOutput> {
    Indexer::new(sys).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RefdocConfig;
    use crate::snapshot::{DataTables, Snapshot};
    use serde_json::json;
    use std::sync::Arc;

    // 0 Object, 1 T, 2 Event<T>, 3 String, 4 Event<String>, 5 ChatEvent
    // extends Event<String> { String message; }, 6 Event<T, T> (bad arity)
    fn system() -> TypeSystem {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "types": [
                {"n": 0, "P": 0},
                {"tv": 1, "b": [0]},
                {"n": 2, "P": 1, "s": 0, "v": [1]},
                {"n": 3, "P": 0, "s": 0},
                {"r": 2, "v": [3]},
                {"n": 4, "P": 1, "s": 4, "f": ",3,1,", "m": "5,1,[3|1],,[0],,", "E": 2, "D": 2},
                {"r": 2, "v": [1, 1]}
            ],
            "parameters": ["6,0,,"],
            "names": ["Object", "T", "Event", "String", "ChatEvent", "reply", "sender"],
            "packages": [["java.lang"], ["demo.event"]]
        }))
        .unwrap();
        let config = RefdocConfig {
            event_base_classes: vec!["demo.event.Event".to_string(), "missing.Base".to_string()],
            ..Default::default()
        };
        TypeSystem::new(Arc::new(DataTables::new(snapshot)), Arc::new(config))
    }

    #[test]
    fn test_inheritance_is_flattened() {
        let sys = system();
        let out = index(&sys).unwrap();
        assert_eq!(out.graph.relation(Inherits, 5), vec![0, 2, 4]);
        assert_eq!(out.graph.relation(InheritedBy, 0), vec![2, 3, 4, 5, 6]);
        assert_eq!(out.graph.relation(SuperClass, 5), vec![4]);
        assert_eq!(out.graph.relation(Subclass, 4), vec![5]);
    }

    #[test]
    fn test_member_usage_edges() {
        let sys = system();
        let out = index(&sys).unwrap();
        assert!(out.graph.has_edge(5, FieldType, 3));
        assert!(out.graph.has_edge(3, MethodReturnTypeOf, 5));
        assert!(out.graph.has_edge(5, MethodParameterType, 0));
        assert!(out.graph.has_edge(0, ParameterTypeOf, 5));
        assert!(out.graph.has_edge(3, ReferencedBy, 5));
        assert!(out.graph.has_edge(5, EnclosingClass, 2));
        assert!(out.graph.has_edge(2, DeclaresClass, 5));
        assert!(out.graph.has_edge(2, TypeVariableOf, 1));
        assert!(!out.graph.has_edge(1, BoundedWithin, 0));
        assert!(out.graph.has_edge(0, BoundedWithin, 1));
    }

    #[test]
    fn test_every_edge_has_its_inverse() {
        let sys = system();
        let out = index(&sys).unwrap();
        for (kind, from, to) in out.graph.triples() {
            assert!(out.graph.has_edge(to, kind.inverse(), from));
        }
    }

    #[test]
    fn test_arity_mismatch_is_a_warning() {
        let sys = system();
        let out = index(&sys).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("Parameterized type 6 has 2 type arguments"));
    }

    #[test]
    fn test_event_classes() {
        let sys = system();
        let out = index(&sys).unwrap();
        assert_eq!(out.events.len(), 1);
        assert_eq!(out.events["demo.event.Event"], vec![2, 4, 5, 6]);
        let stats = out.stats(0);
        assert_eq!(stats.event_classes, 4);
        assert_eq!(stats.types, 7);
        assert_eq!(stats.parameterized, 2);
    }
}

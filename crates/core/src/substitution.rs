//! Type-variable substitution.
//!
//! For a type id, computes which type every type variable reachable through
//! its inheritance graph resolves to. Inherited members then render with the
//! subtype's actual arguments (`IntBox extends Box<Integer>` shows `Box.T`
//! as `Integer`).
//!
//! Precedence rules:
//! - A parameterized type's own positional bindings always win over anything
//!   inherited from its raw type or owner.
//! - For a raw class, supertypes are visited superclass first, then
//!   interfaces in declaration order; the first binding of a variable wins.
//! - A chain that ends at a variable mapped to itself stays unresolved.

use crate::error::{RefdocError, Result};
use crate::model::{ParameterizedRecord, TypeData, TypeId, TypeRef};
use crate::snapshot::DataTables;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// Type variable id to the type it resolves to.
pub type TypeVariableMap = BTreeMap<TypeId, TypeRef>;

/// Drops `k -> k` entries; they mean "still free", not a resolution.
pub fn strip_self_mappings(map: &TypeVariableMap) -> TypeVariableMap {
    map.iter()
        .filter(|(k, v)| !is_self_mapping(**k, **v))
        .map(|(k, v)| (*k, *v))
        .collect()
}

fn is_self_mapping(key: TypeId, value: TypeRef) -> bool {
    value.id == key && value.depth == 0
}

/// Adds every entry of `from` whose key `into` does not have yet.
fn merge_missing(into: &mut TypeVariableMap, from: &TypeVariableMap) {
    for (key, value) in from {
        into.entry(*key).or_insert(*value);
    }
}

pub struct SubstitutionEngine {
    cache: DashMap<TypeId, Arc<TypeVariableMap>>,
    hop_limit: usize,
    owner_walk_limit: usize,
}

impl SubstitutionEngine {
    pub fn new(hop_limit: usize, owner_walk_limit: usize) -> Self {
        Self {
            cache: DashMap::new(),
            hop_limit,
            owner_walk_limit,
        }
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// The resolved map for `id`, with self-mappings removed.
    pub fn type_variable_map(&self, tables: &DataTables, id: TypeId) -> Result<TypeVariableMap> {
        let full = self.exhaustive(tables, id)?;
        Ok(strip_self_mappings(&full))
    }

    /// The full map for `id`, including `v -> v` entries for free variables.
    /// Memoized per id.
    pub fn exhaustive(&self, tables: &DataTables, id: TypeId) -> Result<Arc<TypeVariableMap>> {
        let mut stack = Vec::new();
        self.exhaustive_inner(tables, id, &mut stack)
    }

    fn exhaustive_inner(
        &self,
        tables: &DataTables,
        id: TypeId,
        stack: &mut Vec<TypeId>,
    ) -> Result<Arc<TypeVariableMap>> {
        if let Some(hit) = self.cache.get(&id) {
            return Ok(hit.value().clone());
        }
        if stack.contains(&id) {
            tracing::error!("Inheritance cycle through type {}: {:?}", id, stack);
            return Err(RefdocError::InheritanceCycle(id));
        }

        stack.push(id);
        let computed = self.compute(tables, id, stack);
        stack.pop();

        let map = Arc::new(computed?);
        self.cache.insert(id, map.clone());
        Ok(map)
    }

    fn compute(
        &self,
        tables: &DataTables,
        id: TypeId,
        stack: &mut Vec<TypeId>,
    ) -> Result<TypeVariableMap> {
        let mut acc = TypeVariableMap::new();
        match tables.type_data(id)? {
            TypeData::Wildcard(_) => {}
            TypeData::TypeVariable(_) => {
                acc.insert(id, TypeRef::new(id));
            }
            TypeData::Parameterized(p) => {
                self.bind_positional(tables, &mut acc, id, p)?;
                let inherited = self.exhaustive_inner(tables, p.raw_type.id, stack)?;
                merge_missing(&mut acc, &inherited);
                self.merge_owners(tables, &mut acc, p, stack)?;
                self.resolve_chains(tables, &mut acc)?;
            }
            TypeData::Raw(class) => {
                for supertype in class.supertypes() {
                    match tables.type_data(supertype.id)? {
                        TypeData::Parameterized(p) => {
                            self.remap(tables, &mut acc, supertype.id, p)?;
                            let inherited = self.exhaustive_inner(tables, p.raw_type.id, stack)?;
                            merge_missing(&mut acc, &inherited);
                            self.merge_owners(tables, &mut acc, p, stack)?;
                        }
                        TypeData::Raw(_) => {
                            let inherited = self.exhaustive_inner(tables, supertype.id, stack)?;
                            merge_missing(&mut acc, &inherited);
                        }
                        // Not valid supertypes; nothing to bind.
                        TypeData::TypeVariable(_) | TypeData::Wildcard(_) => {}
                    }
                }
                self.resolve_chains(tables, &mut acc)?;
            }
        }
        Ok(acc)
    }

    /// Declared variables of the raw type, paired with the actual arguments.
    fn declared_variables<'t>(
        &self,
        tables: &'t DataTables,
        id: TypeId,
        p: &ParameterizedRecord,
    ) -> Result<&'t [TypeId]> {
        let raw = tables.raw_class(p.raw_type.id)?.ok_or_else(|| {
            tracing::error!(
                "Raw type {} of parameterized type {} is not a class",
                p.raw_type.id,
                id
            );
            RefdocError::Decode(format!(
                "raw type {} of parameterized type {} is not a class: {}",
                p.raw_type.id,
                id,
                tables.raw_type(id)
            ))
        })?;
        if raw.type_variables.len() != p.arguments.len() {
            warn!(
                "Parameterized type {} has {} type arguments but its raw type {} declares {}",
                id,
                p.arguments.len(),
                p.raw_type.id,
                raw.type_variables.len()
            );
        }
        Ok(&raw.type_variables)
    }

    /// `vi -> Ai` for this level. Overwrites whatever is there.
    fn bind_positional(
        &self,
        tables: &DataTables,
        acc: &mut TypeVariableMap,
        id: TypeId,
        p: &ParameterizedRecord,
    ) -> Result<()> {
        let declared = self.declared_variables(tables, id, p)?;
        for (var, arg) in declared.iter().zip(&p.arguments) {
            acc.insert(*var, *arg);
        }
        Ok(())
    }

    /// Folds one parameterized supertype edge into `acc`.
    ///
    /// Variables already bound are left alone. An argument that is itself a
    /// type variable is followed through `acc` until it reaches a concrete
    /// type or a variable with no binding. If the chain reaches a variable
    /// bound to itself, the declared variable is not bound at all.
    fn remap(
        &self,
        tables: &DataTables,
        acc: &mut TypeVariableMap,
        id: TypeId,
        p: &ParameterizedRecord,
    ) -> Result<()> {
        let declared = self.declared_variables(tables, id, p)?;
        'vars: for (var, arg) in declared.iter().zip(&p.arguments) {
            if acc.contains_key(var) {
                continue;
            }
            if !is_type_variable(tables, *arg)? {
                acc.insert(*var, *arg);
                continue;
            }

            let mut current = *arg;
            let mut hops = 0;
            loop {
                let Some(next) = acc.get(&current.id).copied() else {
                    acc.insert(*var, current);
                    continue 'vars;
                };
                if is_self_mapping(current.id, next) {
                    continue 'vars;
                }
                let next = next.deepen(current.depth);
                if !is_type_variable(tables, next)? {
                    acc.insert(*var, next);
                    continue 'vars;
                }
                current = next;
                hops += 1;
                if hops > self.hop_limit {
                    tracing::error!("Type variable {} did not resolve after {} hops", var, hops);
                    return Err(RefdocError::SubstitutionLoop { id: *var, hops });
                }
            }
        }
        Ok(())
    }

    /// Merges the maps contributed by a parameterized type's owner chain.
    fn merge_owners(
        &self,
        tables: &DataTables,
        acc: &mut TypeVariableMap,
        p: &ParameterizedRecord,
        stack: &mut Vec<TypeId>,
    ) -> Result<()> {
        let mut owner = p.owner_type;
        let mut walked = 0;
        while let Some(current) = owner {
            if walked >= self.owner_walk_limit {
                warn!(
                    "Owner chain starting at {} is longer than {} types; stopped merging",
                    current.id, self.owner_walk_limit
                );
                break;
            }
            walked += 1;
            owner = match tables.type_data(current.id)? {
                TypeData::Parameterized(owner_p) => {
                    let mut level = TypeVariableMap::new();
                    self.bind_positional(tables, &mut level, current.id, owner_p)?;
                    merge_missing(acc, &level);
                    if !stack.contains(&owner_p.raw_type.id) {
                        let inherited = self.exhaustive_inner(tables, owner_p.raw_type.id, stack)?;
                        merge_missing(acc, &inherited);
                    }
                    owner_p.owner_type
                }
                TypeData::Raw(_) => {
                    if !stack.contains(&current.id) {
                        let inherited = self.exhaustive_inner(tables, current.id, stack)?;
                        merge_missing(acc, &inherited);
                    }
                    None
                }
                TypeData::TypeVariable(_) | TypeData::Wildcard(_) => None,
            };
        }
        Ok(())
    }

    /// Rewrites every value that is a bound type variable to what that
    /// variable resolves to.
    fn resolve_chains(&self, tables: &DataTables, acc: &mut TypeVariableMap) -> Result<()> {
        let keys: Vec<TypeId> = acc.keys().copied().collect();
        for key in keys {
            let mut value = acc[&key];
            let mut hops = 0;
            while is_type_variable(tables, value)? {
                let Some(next) = acc.get(&value.id).copied() else {
                    break;
                };
                if is_self_mapping(value.id, next) || next == value {
                    break;
                }
                value = next.deepen(value.depth);
                hops += 1;
                if hops > self.hop_limit {
                    tracing::error!("Type variable {} did not resolve after {} hops", key, hops);
                    return Err(RefdocError::SubstitutionLoop { id: key, hops });
                }
            }
            acc.insert(key, value);
        }
        Ok(())
    }
}

fn is_type_variable(tables: &DataTables, r: TypeRef) -> Result<bool> {
    Ok(matches!(tables.type_data(r.id)?, TypeData::TypeVariable(_)))
}

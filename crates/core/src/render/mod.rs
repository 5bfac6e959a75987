//! Textual rendering of types.
//!
//! [`Renderer::render`] turns a type reference into Java source syntax
//! (`java.util.Map$Entry<K, V>`, `? extends Number`, `T extends Comparable<T>`).
//! Results are cached per `(reference, options)`; [`NameOptions`] is an
//! immutable value so it can serve as part of the key.

pub mod signature;

use crate::error::{RefdocError, Result};
use crate::model::{ClassRecord, TypeData, TypeId, TypeRef};
use crate::snapshot::DataTables;
use crate::substitution::TypeVariableMap;
use dashmap::DashMap;
use std::sync::Arc;

/// How a type should be rendered. Every setter returns a new value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameOptions {
    type_variable_map: Option<Arc<TypeVariableMap>>,
    defining_type_variable: bool,
    append_package_name: bool,
    include_generics: bool,
    defining_parameterized_type: bool,
}

impl Default for NameOptions {
    fn default() -> Self {
        Self {
            type_variable_map: None,
            defining_type_variable: false,
            append_package_name: true,
            include_generics: false,
            defining_parameterized_type: false,
        }
    }
}

impl NameOptions {
    /// Package-qualified, with generics.
    pub fn qualified() -> Self {
        Self::default().include_generics(true)
    }

    /// No package prefix, with generics.
    pub fn short() -> Self {
        Self::default()
            .append_package_name(false)
            .include_generics(true)
    }

    pub fn with_type_variable_map(&self, map: Option<Arc<TypeVariableMap>>) -> Self {
        Self {
            // An empty map and no map render identically; keep one cache key.
            type_variable_map: map.filter(|m| !m.is_empty()),
            ..self.clone()
        }
    }

    pub fn defining_type_variable(&self, defining: bool) -> Self {
        Self {
            defining_type_variable: defining,
            ..self.clone()
        }
    }

    pub fn append_package_name(&self, append: bool) -> Self {
        Self {
            append_package_name: append,
            ..self.clone()
        }
    }

    pub fn include_generics(&self, include: bool) -> Self {
        Self {
            include_generics: include,
            ..self.clone()
        }
    }

    /// Set while rendering the pieces of a parameterized type; suppresses
    /// enclosing-class prefixes the owner type already provides.
    pub fn defining_parameterized_type(&self, defining: bool) -> Self {
        Self {
            defining_parameterized_type: defining,
            ..self.clone()
        }
    }

    pub fn type_variable_map(&self) -> Option<&TypeVariableMap> {
        self.type_variable_map.as_deref()
    }

    pub fn is_defining_type_variable(&self) -> bool {
        self.defining_type_variable
    }

    pub fn is_appending_package_name(&self) -> bool {
        self.append_package_name
    }

    pub fn is_including_generics(&self) -> bool {
        self.include_generics
    }

    pub fn is_defining_parameterized_type(&self) -> bool {
        self.defining_parameterized_type
    }
}

pub struct Renderer {
    cache: DashMap<(TypeRef, NameOptions), String>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    pub fn render(&self, tables: &DataTables, r: TypeRef, options: &NameOptions) -> Result<String> {
        let key = (r, options.clone());
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.value().clone());
        }

        let resolved = self.remap(tables, r.element(), options)?;
        let mut out = self.render_variant(tables, resolved.id, options)?;
        for _ in 0..(resolved.depth + r.depth) {
            out.push_str("[]");
        }

        self.cache.insert(key, out.clone());
        Ok(out)
    }

    /// Follows the active map from a type variable to what it stands for.
    /// Stops at the first repeat, so cyclic maps cannot recurse.
    fn remap(&self, tables: &DataTables, r: TypeRef, options: &NameOptions) -> Result<TypeRef> {
        if options.defining_type_variable {
            return Ok(r);
        }
        let Some(map) = options.type_variable_map() else {
            return Ok(r);
        };

        let mut current = r;
        let mut seen: Vec<TypeId> = vec![r.id];
        while matches!(tables.type_data(current.id)?, TypeData::TypeVariable(_)) {
            let Some(next) = map.get(&current.id) else {
                break;
            };
            let next = next.deepen(current.depth);
            if seen.contains(&next.id) {
                break;
            }
            seen.push(next.id);
            current = next;
        }
        Ok(current)
    }

    fn render_variant(&self, tables: &DataTables, id: TypeId, options: &NameOptions) -> Result<String> {
        match tables.type_data(id)? {
            TypeData::Raw(class) => {
                if let Some(declaring) = class.declaring_class
                    && !options.defining_parameterized_type
                {
                    if declaring.id == id {
                        return Err(RefdocError::Decode(format!(
                            "class {} declares itself",
                            id
                        )));
                    }
                    let outer = self.render(tables, declaring, options)?;
                    return Ok(format!("{}${}", outer, raw_class_name(tables, class, false)?));
                }
                raw_class_name(tables, class, options.append_package_name)
            }
            TypeData::TypeVariable(tv) => {
                let name = tables.name(tv.name)?;
                if options.defining_type_variable || tv.bounds.is_empty() {
                    return Ok(name.to_string());
                }
                let bound_options = options.defining_type_variable(true);
                let bounds = self.join(tables, &tv.bounds, " & ", &bound_options)?;
                Ok(format!("{} extends {}", name, bounds))
            }
            TypeData::Wildcard(w) => {
                if !w.lower.is_empty() {
                    return Ok(format!("? super {}", self.join(tables, &w.lower, " & ", options)?));
                }
                if !w.upper.is_empty() {
                    return Ok(format!("? extends {}", self.join(tables, &w.upper, " & ", options)?));
                }
                Ok("?".to_string())
            }
            TypeData::Parameterized(p) => {
                let inner = options.defining_parameterized_type(true);
                let raw_options =
                    inner.append_package_name(options.append_package_name && p.owner_type.is_none());
                let raw_name = self.render(tables, p.raw_type, &raw_options)?;

                let mut out = String::new();
                if let Some(owner) = p.owner_type
                    && !options.defining_parameterized_type
                {
                    out.push_str(&self.render(tables, owner, &inner)?);
                    out.push('$');
                }
                out.push_str(&raw_name);
                if options.include_generics && !p.arguments.is_empty() {
                    out.push('<');
                    out.push_str(&self.join(tables, &p.arguments, ", ", &inner)?);
                    out.push('>');
                }
                Ok(out)
            }
        }
    }

    fn join(
        &self,
        tables: &DataTables,
        refs: &[TypeRef],
        separator: &str,
        options: &NameOptions,
    ) -> Result<String> {
        let parts = refs
            .iter()
            .map(|r| self.render(tables, *r, options))
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join(separator))
    }
}

/// `pkg.Name` or `Name`.
pub fn raw_class_name(tables: &DataTables, class: &ClassRecord, append_package: bool) -> Result<String> {
    let name = tables.name(class.name)?;
    if append_package && let Some(package) = class.package {
        let package = tables.package_name(package)?;
        if !package.is_empty() {
            return Ok(format!("{}.{}", package, name));
        }
    }
    Ok(name.to_string())
}

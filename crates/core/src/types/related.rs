use super::JavaType;
use crate::error::Result;
use crate::model::TypeRef;
use std::collections::HashSet;
use std::fmt;

/// How a related class connects to the subject class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Related {
    Extends,
    Implements,
    ExtendsIndirect,
    ImplementsIndirect,
    EnclosingClass,
    InnerClass,
}

impl Related {
    pub fn label(&self) -> &'static str {
        match self {
            Related::Extends => "Extends",
            Related::Implements => "Implements",
            Related::ExtendsIndirect => "Extends (Indirect)",
            Related::ImplementsIndirect => "Implements (Indirect)",
            Related::EnclosingClass => "Enclosing Class",
            Related::InnerClass => "Inner Class",
        }
    }

    fn indirect(self) -> Related {
        match self {
            Related::Extends | Related::ExtendsIndirect => Related::ExtendsIndirect,
            Related::Implements | Related::ImplementsIndirect => Related::ImplementsIndirect,
            other => other,
        }
    }
}

impl fmt::Display for Related {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelatedClass {
    pub relation: Related,
    pub class: TypeRef,
}

impl<'a> JavaType<'a> {
    /// Super class and interfaces of this type as written. A parameterized
    /// type answers for its raw class.
    fn direct_supertypes(&self) -> Result<Vec<(TypeRef, Related)>> {
        let class = match self.class() {
            Some(class) => Some(class),
            None => match self.raw_type() {
                Some(raw) => self.sys.tables().raw_class(raw.id)?,
                None => None,
            },
        };
        let Some(class) = class else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        if let Some(parent) = class.super_class {
            out.push((parent, Related::Extends));
        }
        out.extend(class.interfaces.iter().map(|i| (*i, Related::Implements)));
        Ok(out)
    }

    /// Direct supertypes first, then everything reached through them in
    /// breadth order, then the enclosing class and inner classes. Each
    /// class appears once.
    pub fn related_classes(&self) -> Result<Vec<RelatedClass>> {
        let mut seen: HashSet<u32> = HashSet::from([self.id()]);
        let mut out = Vec::new();

        let mut frontier = Vec::new();
        for (class, relation) in self.direct_supertypes()? {
            if seen.insert(class.id) {
                out.push(RelatedClass { relation, class });
                frontier.push(class);
            }
        }

        while !frontier.is_empty() {
            let mut next = Vec::new();
            for current in frontier {
                let wrapped = self.sys.get(current.element())?;
                for (class, relation) in wrapped.direct_supertypes()? {
                    if seen.insert(class.id) {
                        out.push(RelatedClass {
                            relation: relation.indirect(),
                            class,
                        });
                        next.push(class);
                    }
                }
            }
            frontier = next;
        }

        if let Some(enclosing) = self.enclosing_class()
            && seen.insert(enclosing.id)
        {
            out.push(RelatedClass {
                relation: Related::EnclosingClass,
                class: enclosing,
            });
        }
        for inner in self.inner_classes() {
            if seen.insert(inner.id) {
                out.push(RelatedClass {
                    relation: Related::InnerClass,
                    class: *inner,
                });
            }
        }
        Ok(out)
    }

    /// Wraps a related class so it renders with this type's bindings.
    pub fn related_type(&self, related: &RelatedClass) -> Result<JavaType<'a>> {
        Ok(self
            .sys
            .get(related.class)?
            .with_type_variable_map(Some(self.type_variable_map()?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RefdocConfig;
    use crate::snapshot::{DataTables, Snapshot};
    use crate::types::TypeSystem;
    use serde_json::json;
    use std::sync::Arc;

    // 0 Object, 1 Runnable, 2 Base implements Runnable, 3 Derived extends Base
    // (declares inner 4), 4 Derived$Inner, 5 Closeable, 6 Derived2 extends
    // Derived implements Closeable, Runnable
    fn system() -> TypeSystem {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "types": [
                {"n": 0},
                {"n": 1, "M": 513},
                {"n": 2, "s": 0, "i": 1},
                {"n": 3, "s": 2, "I": [4]},
                {"n": 4, "s": 0, "E": 3, "D": 3},
                {"n": 5, "M": 513},
                {"n": 6, "s": 3, "i": [5, 1]}
            ],
            "names": ["Object", "Runnable", "Base", "Derived", "Inner", "Closeable", "Derived2"]
        }))
        .unwrap();
        TypeSystem::new(
            Arc::new(DataTables::new(snapshot)),
            Arc::new(RefdocConfig::default()),
        )
    }

    fn labels(sys: &TypeSystem, id: u32) -> Vec<(u32, &'static str)> {
        sys.get_id(id)
            .unwrap()
            .related_classes()
            .unwrap()
            .into_iter()
            .map(|r| (r.class.id, r.relation.label()))
            .collect()
    }

    #[test]
    fn test_direct_before_indirect() {
        let sys = system();
        assert_eq!(
            labels(&sys, 3),
            vec![
                (2, "Extends"),
                (0, "Extends (Indirect)"),
                (1, "Implements (Indirect)"),
                (4, "Inner Class"),
            ]
        );
    }

    #[test]
    fn test_duplicates_keep_first_relation() {
        let sys = system();
        assert_eq!(
            labels(&sys, 6),
            vec![
                (3, "Extends"),
                (5, "Implements"),
                (1, "Implements"),
                (2, "Extends (Indirect)"),
                (0, "Extends (Indirect)"),
            ]
        );
    }

    #[test]
    fn test_enclosing_class() {
        let sys = system();
        assert_eq!(
            labels(&sys, 4),
            vec![(0, "Extends"), (3, "Enclosing Class")]
        );
    }
}

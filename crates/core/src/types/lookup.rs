//! Resolving user-supplied class names to type references.
//!
//! Input is untrusted, so every miss is `Ok(None)`. Hits are memoized per
//! input string until the session is reset.

use super::{JavaType, TypeSystem};
use crate::error::Result;
use crate::model::{TypeId, TypeRef};
use once_cell::sync::Lazy;
use regex::Regex;

static CLASS_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}\p{N}_$.<>?,&\s\[\]]+$").expect("class name pattern is valid")
});

/// Which index spaces a name can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NameShape {
    Wildcard,
    Generic,
    /// `Outer$Inner` without type arguments.
    Nested,
    Plain,
}

impl NameShape {
    fn of(name: &str) -> Self {
        if name.starts_with('?') {
            NameShape::Wildcard
        } else if name.contains('<') {
            NameShape::Generic
        } else if name.contains('$') {
            NameShape::Nested
        } else {
            NameShape::Plain
        }
    }
}

/// Splits `Foo[][]` into `("Foo", 2)`.
fn strip_array_suffix(name: &str) -> (&str, u32) {
    let mut rest = name.trim_end();
    let mut depth = 0;
    while let Some(stripped) = rest.strip_suffix("[]") {
        rest = stripped.trim_end();
        depth += 1;
    }
    (rest, depth)
}

impl TypeSystem {
    /// A decimal id in range, or a class name.
    pub fn resolve(&self, target: &str) -> Result<Option<TypeRef>> {
        let target = target.trim();
        if !target.is_empty() && target.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(target
                .parse::<TypeId>()
                .ok()
                .filter(|id| (*id as usize) < self.tables().type_count())
                .map(TypeRef::new));
        }
        self.find_class_by_name(target)
    }

    pub fn find_class_by_name(&self, name: &str) -> Result<Option<TypeRef>> {
        if let Some(hit) = self.cached_lookup(name) {
            return Ok(Some(hit));
        }
        let (element, depth) = strip_array_suffix(name.trim());
        if element.is_empty() || !CLASS_NAME.is_match(element) {
            return Ok(None);
        }

        let partitions = self.partitions()?;
        let qualified = element.contains('.');
        let spaces: [&[TypeId]; 2] = match NameShape::of(element) {
            NameShape::Wildcard => [partitions.wildcards.as_slice(), &[]],
            NameShape::Generic => [partitions.parameterized.as_slice(), partitions.raw.as_slice()],
            NameShape::Nested => [partitions.raw.as_slice(), &[]],
            NameShape::Plain => [partitions.raw.as_slice(), partitions.type_variables.as_slice()],
        };

        for space in spaces {
            for id in space {
                let candidate = self.get_id(*id)?;
                if matches_name(&candidate, element, qualified)? {
                    let found = TypeRef::array(*id, depth);
                    tracing::debug!("Resolved class name {:?} to {}", name, found);
                    self.cache_lookup(name, found);
                    return Ok(Some(found));
                }
            }
        }
        Ok(None)
    }
}

fn matches_name(candidate: &JavaType<'_>, name: &str, qualified: bool) -> Result<bool> {
    if qualified {
        return Ok(candidate.reference_name()? == name
            || candidate.fully_qualified_name(false)? == name);
    }
    if candidate.name()? == name || candidate.simple_name()? == name {
        return Ok(true);
    }
    Ok(candidate.is_raw_class() && binary_name(candidate)? == name)
}

/// `Map$Entry` for `java.util.Map$Entry<K, V>`: no package, no generics.
fn binary_name(candidate: &JavaType<'_>) -> Result<String> {
    let qualified = candidate.fully_qualified_name(false)?;
    let package = candidate.package_name()?;
    if package.is_empty() {
        return Ok(qualified);
    }
    Ok(qualified
        .strip_prefix(package.as_str())
        .and_then(|rest| rest.strip_prefix('.'))
        .map(str::to_string)
        .unwrap_or(qualified))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::system;

    #[test]
    fn test_numeric_ids() {
        let sys = system();
        assert_eq!(sys.resolve("3").unwrap(), Some(TypeRef::new(3)));
        assert_eq!(sys.resolve("999").unwrap(), None);
    }

    #[test]
    fn test_qualified_and_simple_names() {
        let sys = system();
        assert_eq!(sys.resolve("java.lang.Integer").unwrap(), Some(TypeRef::new(3)));
        assert_eq!(sys.resolve("IntBox").unwrap(), Some(TypeRef::new(5)));
        assert_eq!(sys.resolve("demo.Box<T>").unwrap(), Some(TypeRef::new(2)));
        assert_eq!(sys.resolve("Map$Entry<K, V>").unwrap(), Some(TypeRef::new(7)));
    }

    #[test]
    fn test_nested_name_without_generics() {
        let sys = system();
        assert_eq!(sys.resolve("Map$Entry").unwrap(), Some(TypeRef::new(7)));
        assert_eq!(sys.resolve("java.util.Map$Entry").unwrap(), Some(TypeRef::new(7)));
        assert_eq!(sys.resolve("Map$Entry[]").unwrap(), Some(TypeRef::array(7, 1)));
        assert_eq!(sys.resolve("Box$Entry").unwrap(), None);
    }

    #[test]
    fn test_generic_names_prefer_parameterized() {
        let sys = system();
        assert_eq!(
            sys.resolve("demo.Box<java.lang.Integer>").unwrap(),
            Some(TypeRef::new(4))
        );
    }

    #[test]
    fn test_array_suffix_becomes_depth() {
        let sys = system();
        assert_eq!(
            sys.resolve("java.lang.Integer[][]").unwrap(),
            Some(TypeRef::array(3, 2))
        );
    }

    #[test]
    fn test_misses_are_not_errors() {
        let sys = system();
        assert_eq!(sys.resolve("java.lang.Nope").unwrap(), None);
        assert_eq!(sys.resolve("drop table;").unwrap(), None);
        assert_eq!(sys.resolve("").unwrap(), None);
    }

    #[test]
    fn test_hits_are_memoized_until_cleared() {
        let sys = system();
        sys.resolve("IntBox").unwrap();
        assert_eq!(sys.lookup_entries(), vec![("IntBox".to_string(), TypeRef::new(5))]);
        sys.clear_caches();
        assert!(sys.lookup_entries().is_empty());
    }
}

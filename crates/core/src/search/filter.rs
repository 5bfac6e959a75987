//! Predicates over classes and their members.

use crate::error::Result;
use crate::model::TypeId;
use crate::types::{Field, JavaType, Method, Parameter};
use refdoc_api::TypeVariant;

/// How text leaves compare against an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// `false` turns the leaf into "must not match".
    pub inclusive: bool,
    /// Whole-value comparison instead of substring.
    pub exact: bool,
    pub case_sensitive: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            inclusive: true,
            exact: false,
            case_sensitive: false,
        }
    }
}

impl MatchOptions {
    pub fn from_params(params: &refdoc_api::SearchParams) -> Self {
        Self {
            inclusive: params.inclusive,
            exact: params.exact,
            case_sensitive: params.is_case_sensitive(),
        }
    }
}

/// Attributes a type exposes to text leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeAttribute {
    ReferenceName,
    Name,
    SimpleName,
    Package,
    /// Non-generic name of the raw class behind a parameterized type.
    RawType,
}

/// Where a text leaf reads its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    /// The member's own name. Classes have none.
    MemberName,
    /// An attribute of the class itself, or of the member's type (field
    /// type, return type, parameter type).
    Type(TypeAttribute),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatcher {
    query: String,
    options: MatchOptions,
}

impl TextMatcher {
    pub fn new(query: &str, options: MatchOptions) -> Self {
        let query = if options.case_sensitive {
            query.to_string()
        } else {
            query.to_lowercase()
        };
        Self { query, options }
    }

    /// A missing or empty value fails an inclusive leaf and satisfies an
    /// exclusive one.
    pub fn matches(&self, value: Option<&str>) -> bool {
        let value = match value {
            Some(value) if !value.is_empty() => value,
            _ => return !self.options.inclusive,
        };
        let hit = match (self.options.case_sensitive, self.options.exact) {
            (true, true) => value == self.query,
            (true, false) => value.contains(&self.query),
            (false, true) => value.to_lowercase() == self.query,
            (false, false) => value.to_lowercase().contains(&self.query),
        };
        hit == self.options.inclusive
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Text {
        attribute: Attribute,
        matcher: TextMatcher,
    },
    /// Type id equality; `inclusive == false` negates it.
    Id { id: TypeId, inclusive: bool },
    ParameterCount(usize),
    /// Whether the subject type is (or is not) of the given variant.
    Variant { variant: TypeVariant, expected: bool },
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Leaf(Predicate),
    All(Vec<Filter>),
    Any(Vec<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    pub fn text(attribute: Attribute, query: &str, options: MatchOptions) -> Self {
        Filter::Leaf(Predicate::Text {
            attribute,
            matcher: TextMatcher::new(query, options),
        })
    }

    pub fn never() -> Self {
        Filter::Leaf(Predicate::Never)
    }

    /// Joins alternatives so that an exclusive query rejects a subject when
    /// any alternative contains the text: inclusive leaves are OR-ed,
    /// exclusive leaves AND-ed.
    pub fn alternatives(filters: Vec<Filter>, options: MatchOptions) -> Self {
        if filters.len() == 1 {
            return filters.into_iter().next().unwrap_or_else(Filter::never);
        }
        if options.inclusive {
            Filter::Any(filters)
        } else {
            Filter::All(filters)
        }
    }

    pub(crate) fn evaluate(&self, subject: &Subject<'_, '_>) -> Result<bool> {
        match self {
            Filter::Leaf(predicate) => subject.test(predicate),
            Filter::All(filters) => {
                for filter in filters {
                    if !filter.evaluate(subject)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Filter::Any(filters) => {
                for filter in filters {
                    if filter.evaluate(subject)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Filter::Not(inner) => Ok(!inner.evaluate(subject)?),
        }
    }
}

/// Something a filter can be evaluated against.
pub(crate) enum Subject<'s, 'a> {
    Class(&'s JavaType<'a>),
    Field(&'s Field<'a>),
    Method(&'s Method<'a>),
    Parameter(&'s Parameter<'a>),
}

impl<'s, 'a> Subject<'s, 'a> {
    /// The class itself, or the declared type of the member.
    fn subject_type(&self) -> Result<JavaType<'a>> {
        match self {
            Subject::Class(class) => Ok((*class).clone()),
            Subject::Field(field) => field.system().get(field.ty()),
            Subject::Method(method) => method.system().get(method.return_type()),
            Subject::Parameter(param) => param.system().get(param.ty()),
        }
    }

    fn member_name(&self) -> Result<Option<&'a str>> {
        match self {
            Subject::Class(_) => Ok(None),
            Subject::Field(field) => field.name(),
            Subject::Method(method) => method.name(),
            Subject::Parameter(param) => param.name(),
        }
    }

    fn attribute(&self, attribute: Attribute) -> Result<Option<String>> {
        match attribute {
            Attribute::MemberName => Ok(self.member_name()?.map(str::to_string)),
            Attribute::Type(attr) => type_attribute(&self.subject_type()?, attr),
        }
    }

    fn test(&self, predicate: &Predicate) -> Result<bool> {
        match predicate {
            Predicate::Text { attribute, matcher } => {
                let value = self.attribute(*attribute)?;
                Ok(matcher.matches(value.as_deref()))
            }
            Predicate::Id { id, inclusive } => {
                Ok((self.subject_type()?.id() == *id) == *inclusive)
            }
            Predicate::ParameterCount(count) => Ok(match self {
                Subject::Method(method) => method.parameter_count() == *count,
                _ => false,
            }),
            Predicate::Variant { variant, expected } => {
                Ok((self.subject_type()?.variant() == *variant) == *expected)
            }
            Predicate::Never => Ok(false),
        }
    }
}

fn type_attribute(ty: &JavaType<'_>, attribute: TypeAttribute) -> Result<Option<String>> {
    Ok(match attribute {
        TypeAttribute::ReferenceName => Some(ty.reference_name()?),
        TypeAttribute::Name => Some(ty.name()?),
        TypeAttribute::SimpleName => Some(ty.simple_name()?),
        TypeAttribute::Package => Some(ty.package_name()?),
        TypeAttribute::RawType => match ty.raw_type() {
            Some(raw) => Some(ty.system().get(raw)?.fully_qualified_name(false)?),
            None => None,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(inclusive: bool, exact: bool, case_sensitive: bool) -> MatchOptions {
        MatchOptions {
            inclusive,
            exact,
            case_sensitive,
        }
    }

    #[test]
    fn test_substring_ignores_case_by_default() {
        let m = TextMatcher::new("Foo", MatchOptions::default());
        assert!(m.matches(Some("getFOOBar")));
        assert!(!m.matches(Some("getBar")));
    }

    #[test]
    fn test_exact_case_sensitive() {
        let m = TextMatcher::new("Foo", options(true, true, true));
        assert!(m.matches(Some("Foo")));
        assert!(!m.matches(Some("foo")));
        assert!(!m.matches(Some("Foobar")));
    }

    #[test]
    fn test_exact_case_insensitive() {
        let m = TextMatcher::new("Foo", options(true, true, false));
        assert!(m.matches(Some("FOO")));
        assert!(!m.matches(Some("FOOD")));
    }

    #[test]
    fn test_exclusive_negates() {
        let m = TextMatcher::new("foo", options(false, false, false));
        assert!(!m.matches(Some("MyFoo")));
        assert!(m.matches(Some("Bar")));
    }

    #[test]
    fn test_missing_value_depends_on_mode() {
        let inclusive = TextMatcher::new("foo", options(true, false, false));
        let exclusive = TextMatcher::new("foo", options(false, false, false));
        assert!(!inclusive.matches(None));
        assert!(!inclusive.matches(Some("")));
        assert!(exclusive.matches(None));
        assert!(exclusive.matches(Some("")));
    }

    #[test]
    fn test_alternatives_follow_mode() {
        let inclusive = MatchOptions::default();
        let exclusive = options(false, false, false);
        let leaves = || {
            vec![
                Filter::text(Attribute::MemberName, "a", inclusive),
                Filter::text(Attribute::Type(TypeAttribute::Name), "a", inclusive),
            ]
        };
        assert!(matches!(Filter::alternatives(leaves(), inclusive), Filter::Any(_)));
        assert!(matches!(Filter::alternatives(leaves(), exclusive), Filter::All(_)));
        assert!(matches!(
            Filter::alternatives(vec![Filter::never()], exclusive),
            Filter::Leaf(Predicate::Never)
        ));
    }
}

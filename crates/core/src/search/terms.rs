//! Named query terms and how they expand into per-kind filters.

use super::filter::{Attribute, Filter, MatchOptions, Predicate, TypeAttribute};
use crate::error::{RefdocError, Result};
use crate::model::TypeId;
use refdoc_api::{QueryExpr, SearchParams, TypeVariant};

/// Every key accepted by flat and structured queries.
pub const TERM_KEYS: &[&str] = &[
    "any",
    "class-any",
    "field-any",
    "method-any",
    "parameter-any",
    "class-id",
    "field-id",
    "method-id",
    "parameter-id",
    "name",
    "class-name",
    "field-name",
    "method-name",
    "parameter-name",
    "simplename",
    "class-type-simplename",
    "field-type-simplename",
    "method-type-simplename",
    "parameter-type-simple-name",
    "raw-type",
    "class-raw-type",
    "field-raw-type",
    "method-raw-type",
    "parameter-raw-type",
    "type-name",
    "class-type-name",
    "field-type-name",
    "method-type-name",
    "parameter-type-name",
    "package",
    "class-package",
    "field-type-package",
    "method-type-package",
    "parameter-type-package",
    "parameter-count",
    "ignore-classes",
    "ignore-fields",
    "ignore-methods",
    "ignore-parameters",
    "raw-class-only",
    "non-raw-class-only",
    "type-variable-only",
    "non-type-variable-only",
    "wildcard-only",
    "non-wildcard-only",
];

/// Lowercases a key and drops everything outside `[a-z0-9-_]`.
pub fn normalize_key(key: &str) -> String {
    key.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '_')
        .collect()
}

/// The filters one term contributes to each entity kind. `None` means the
/// term says nothing about that kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindFilters {
    pub class: Option<Filter>,
    pub field: Option<Filter>,
    pub method: Option<Filter>,
    pub parameter: Option<Filter>,
}

impl KindFilters {
    fn class(filter: Filter) -> Self {
        Self {
            class: Some(filter),
            ..Self::default()
        }
    }

    fn field(filter: Filter) -> Self {
        Self {
            field: Some(filter),
            ..Self::default()
        }
    }

    fn method(filter: Filter) -> Self {
        Self {
            method: Some(filter),
            ..Self::default()
        }
    }

    fn parameter(filter: Filter) -> Self {
        Self {
            parameter: Some(filter),
            ..Self::default()
        }
    }

    fn every(mut make: impl FnMut() -> Filter) -> Self {
        Self {
            class: Some(make()),
            field: Some(make()),
            method: Some(make()),
            parameter: Some(make()),
        }
    }

    fn slots_mut(&mut self) -> [&mut Option<Filter>; 4] {
        [
            &mut self.class,
            &mut self.field,
            &mut self.method,
            &mut self.parameter,
        ]
    }

    fn into_slots(self) -> [Option<Filter>; 4] {
        [self.class, self.field, self.method, self.parameter]
    }

    /// Slot-wise combination; a kind present on one side only keeps that
    /// side's filter.
    fn combine(parts: Vec<KindFilters>, join: fn(Vec<Filter>) -> Filter) -> Self {
        let mut grouped: [Vec<Filter>; 4] = Default::default();
        for part in parts {
            for (slot, filter) in part.into_slots().into_iter().enumerate() {
                if let Some(filter) = filter {
                    grouped[slot].push(filter);
                }
            }
        }
        let mut out = KindFilters::default();
        for (target, filters) in out.slots_mut().into_iter().zip(grouped) {
            *target = match filters.len() {
                0 => None,
                1 => filters.into_iter().next(),
                _ => Some(join(filters)),
            };
        }
        out
    }

    fn negate(self) -> Self {
        let [class, field, method, parameter] =
            self.into_slots().map(|slot| slot.map(|f| Filter::Not(Box::new(f))));
        Self {
            class,
            field,
            method,
            parameter,
        }
    }
}

/// Per-kind filter lists. Every filter in a list must pass; a kind with an
/// empty list is not searched at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub classes: Vec<Filter>,
    pub fields: Vec<Filter>,
    pub methods: Vec<Filter>,
    pub parameters: Vec<Filter>,
}

impl SearchQuery {
    pub fn from_params(params: &SearchParams) -> Result<Self> {
        let options = MatchOptions::from_params(params);
        let mut query = SearchQuery::default();
        for (key, value) in &params.terms {
            match expand(key, value, options)? {
                Some(filters) => query.push(filters),
                None => tracing::debug!("Ignoring unknown search term {:?}", key),
            }
        }
        Ok(query)
    }

    pub fn from_expr(expr: &QueryExpr, options: MatchOptions) -> Result<Self> {
        let mut query = SearchQuery::default();
        query.push(compile(expr, options)?);
        Ok(query)
    }

    fn push(&mut self, filters: KindFilters) {
        let lists = [
            &mut self.classes,
            &mut self.fields,
            &mut self.methods,
            &mut self.parameters,
        ];
        for (list, filter) in lists.into_iter().zip(filters.into_slots()) {
            list.extend(filter);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
            && self.fields.is_empty()
            && self.methods.is_empty()
            && self.parameters.is_empty()
    }
}

fn compile(expr: &QueryExpr, options: MatchOptions) -> Result<KindFilters> {
    match expr {
        QueryExpr::Term { key, value } => expand(key, value, options)?
            .ok_or_else(|| RefdocError::InvalidQuery(format!("unknown search term {:?}", key))),
        QueryExpr::And(parts) => Ok(KindFilters::combine(
            parts
                .iter()
                .map(|p| compile(p, options))
                .collect::<Result<_>>()?,
            Filter::All,
        )),
        QueryExpr::Or(parts) => Ok(KindFilters::combine(
            parts
                .iter()
                .map(|p| compile(p, options))
                .collect::<Result<_>>()?,
            Filter::Any,
        )),
        QueryExpr::Not(inner) => Ok(compile(inner, options)?.negate()),
    }
}

fn type_text(attr: TypeAttribute, value: &str, options: MatchOptions) -> Filter {
    Filter::text(Attribute::Type(attr), value, options)
}

fn member_name(value: &str, options: MatchOptions) -> Filter {
    Filter::text(Attribute::MemberName, value, options)
}

fn variant(variant: TypeVariant, expected: bool) -> KindFilters {
    KindFilters::class(Filter::Leaf(Predicate::Variant { variant, expected }))
}

/// Reference name, own name, type simple name and package of a member.
fn member_any(value: &str, options: MatchOptions) -> Filter {
    Filter::alternatives(
        vec![
            type_text(TypeAttribute::ReferenceName, value, options),
            member_name(value, options),
            type_text(TypeAttribute::SimpleName, value, options),
            type_text(TypeAttribute::Package, value, options),
        ],
        options,
    )
}

fn class_any(value: &str, options: MatchOptions) -> Filter {
    Filter::alternatives(
        vec![
            type_text(TypeAttribute::ReferenceName, value, options),
            type_text(TypeAttribute::Name, value, options),
            type_text(TypeAttribute::SimpleName, value, options),
            type_text(TypeAttribute::Package, value, options),
        ],
        options,
    )
}

fn class_id(value: &str, options: MatchOptions) -> Filter {
    match value.trim().parse::<TypeId>() {
        Ok(id) => Filter::Leaf(Predicate::Id {
            id,
            inclusive: options.inclusive,
        }),
        Err(_) => type_text(TypeAttribute::ReferenceName, value, options),
    }
}

/// Expands one term. `Ok(None)` for an unknown key.
pub fn expand(key: &str, value: &str, options: MatchOptions) -> Result<Option<KindFilters>> {
    use TypeAttribute::*;

    let key = normalize_key(key);
    let text = |attr| type_text(attr, value, options);
    let own_or_type = |attr| {
        Filter::alternatives(
            vec![member_name(value, options), type_text(attr, value, options)],
            options,
        )
    };

    let filters = match key.as_str() {
        "any" => KindFilters {
            class: Some(class_any(value, options)),
            field: Some(member_any(value, options)),
            method: Some(member_any(value, options)),
            parameter: Some(member_any(value, options)),
        },
        "class-any" => KindFilters::class(class_any(value, options)),
        "field-any" => KindFilters::field(member_any(value, options)),
        "method-any" => KindFilters::method(member_any(value, options)),
        "parameter-any" => KindFilters::parameter(member_any(value, options)),

        "class-id" => KindFilters::class(class_id(value, options)),
        "field-id" => KindFilters::field(text(ReferenceName)),
        "method-id" => KindFilters::method(text(ReferenceName)),
        "parameter-id" => KindFilters::parameter(text(ReferenceName)),

        "name" => KindFilters {
            class: Some(text(Name)),
            field: Some(own_or_type(Name)),
            method: Some(own_or_type(Name)),
            parameter: Some(own_or_type(Name)),
        },
        "class-name" | "class-type-name" => KindFilters::class(text(Name)),
        "field-name" => KindFilters::field(member_name(value, options)),
        "method-name" => KindFilters::method(member_name(value, options)),
        "parameter-name" => KindFilters::parameter(member_name(value, options)),

        "simplename" => KindFilters {
            class: Some(text(SimpleName)),
            field: Some(own_or_type(SimpleName)),
            method: Some(text(SimpleName)),
            parameter: Some(own_or_type(SimpleName)),
        },
        "class-type-simplename" => KindFilters::class(text(SimpleName)),
        "field-type-simplename" => KindFilters::field(text(SimpleName)),
        "method-type-simplename" => KindFilters::method(text(SimpleName)),
        "parameter-type-simple-name" => KindFilters::parameter(text(SimpleName)),

        "raw-type" => KindFilters::every(|| text(RawType)),
        "class-raw-type" => KindFilters::class(text(RawType)),
        "field-raw-type" => KindFilters::field(text(RawType)),
        "method-raw-type" => KindFilters::method(text(RawType)),
        "parameter-raw-type" => KindFilters::parameter(text(RawType)),

        "type-name" => KindFilters::every(|| text(Name)),
        "field-type-name" => KindFilters::field(text(Name)),
        "method-type-name" => KindFilters::method(text(Name)),
        "parameter-type-name" => KindFilters::parameter(text(Name)),

        "package" => KindFilters::every(|| text(Package)),
        "class-package" => KindFilters::class(text(Package)),
        "field-type-package" => KindFilters::field(text(Package)),
        "method-type-package" => KindFilters::method(text(Package)),
        "parameter-type-package" => KindFilters::parameter(text(Package)),

        "parameter-count" => {
            let count = value.trim().parse::<usize>().map_err(|_| {
                RefdocError::InvalidQuery(format!("parameter-count expects a number, got {:?}", value))
            })?;
            KindFilters::method(Filter::Leaf(Predicate::ParameterCount(count)))
        }

        "ignore-classes" => KindFilters::class(Filter::never()),
        "ignore-fields" => KindFilters::field(Filter::never()),
        "ignore-methods" => KindFilters::method(Filter::never()),
        "ignore-parameters" => KindFilters::parameter(Filter::never()),

        "raw-class-only" => variant(TypeVariant::RawClass, true),
        "non-raw-class-only" => variant(TypeVariant::RawClass, false),
        "type-variable-only" => variant(TypeVariant::TypeVariable, true),
        "non-type-variable-only" => variant(TypeVariant::TypeVariable, false),
        "wildcard-only" => variant(TypeVariant::Wildcard, true),
        "non-wildcard-only" => variant(TypeVariant::Wildcard, false),

        _ => return Ok(None),
    };
    Ok(Some(filters))
}

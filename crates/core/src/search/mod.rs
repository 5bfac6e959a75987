//! Search over every class and member in the snapshot.
//!
//! A [`SearchQuery`] holds one filter list per entity kind and each kind is
//! matched on its own. Fields and methods are found through the raw classes
//! that declare them, parameters through their methods.

pub mod filter;
pub mod terms;

pub use filter::{Attribute, Filter, MatchOptions, Predicate, TextMatcher, TypeAttribute};
pub use terms::{KindFilters, SearchQuery, TERM_KEYS, expand, normalize_key};

use crate::error::{RefdocError, Result};
use crate::model::TypeId;
use crate::types::{Field, JavaType, Method, Parameter, TypeSystem};
use filter::Subject;
use std::time::Instant;

/// A matching parameter together with the method that declares it.
#[derive(Debug, Clone)]
pub struct ParameterMatch<'a> {
    pub method: Method<'a>,
    pub parameter: Parameter<'a>,
}

/// A class whose own or member evaluation failed. The rest of the search
/// still completes.
#[derive(Debug)]
pub struct SearchFailure {
    pub subject: TypeId,
    pub error: RefdocError,
}

#[derive(Debug, Default)]
pub struct SearchHits<'a> {
    pub classes: Vec<JavaType<'a>>,
    pub fields: Vec<Field<'a>>,
    pub methods: Vec<Method<'a>>,
    pub parameters: Vec<ParameterMatch<'a>>,
    pub failures: Vec<SearchFailure>,
}

impl SearchHits<'_> {
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
            && self.fields.is_empty()
            && self.methods.is_empty()
            && self.parameters.is_empty()
    }
}

fn passes(filters: &[Filter], subject: &Subject<'_, '_>) -> Result<bool> {
    for filter in filters {
        if !filter.evaluate(subject)? {
            return Ok(false);
        }
    }
    Ok(true)
}

struct Search<'q, 'a> {
    query: &'q SearchQuery,
    hits: SearchHits<'a>,
}

impl<'q, 'a> Search<'q, 'a> {
    fn visit(&mut self, subject: &JavaType<'a>) -> Result<()> {
        let query = self.query;
        if !query.classes.is_empty() && passes(&query.classes, &Subject::Class(subject))? {
            self.hits.classes.push(subject.clone());
        }

        // Members belong to the raw class; parameterized variants would only
        // repeat them.
        if !subject.is_raw_class() || subject.array_depth() > 0 {
            return Ok(());
        }

        if !query.fields.is_empty() {
            for field in subject.fields(true)? {
                if passes(&query.fields, &Subject::Field(&field))? {
                    self.hits.fields.push(field);
                }
            }
        }

        if query.methods.is_empty() && query.parameters.is_empty() {
            return Ok(());
        }
        for method in subject.methods(true)? {
            if !query.parameters.is_empty() {
                for parameter in method.parameters()? {
                    if passes(&query.parameters, &Subject::Parameter(&parameter))? {
                        self.hits.parameters.push(ParameterMatch {
                            method: method.clone(),
                            parameter,
                        });
                    }
                }
            }
            if !query.methods.is_empty() && passes(&query.methods, &Subject::Method(&method))? {
                self.hits.methods.push(method);
            }
        }
        Ok(())
    }
}

fn sort_key(name: Result<Option<&str>>) -> String {
    name.ok().flatten().unwrap_or_default().to_lowercase()
}

impl<'a> SearchHits<'a> {
    /// Classes by simple name, members by name, parameters by their own
    /// name.
    pub fn sort(&mut self) {
        self.classes.sort_by_cached_key(|c| {
            c.simple_name()
                .map(|n| n.to_lowercase())
                .unwrap_or_default()
        });
        self.fields.sort_by_cached_key(|f| sort_key(f.name()));
        self.methods.sort_by_cached_key(|m| sort_key(m.name()));
        self.parameters
            .sort_by_cached_key(|p| sort_key(p.parameter.name()));
    }
}

/// Runs `query` against every type. Data errors are recorded per class in
/// [`SearchHits::failures`] instead of aborting the search.
pub fn search<'a>(sys: &'a TypeSystem, query: &SearchQuery) -> Result<SearchHits<'a>> {
    let start = Instant::now();
    tracing::debug!(
        "Performing search with {} class filters, {} field filters, {} method filters, and {} parameter filters",
        query.classes.len(),
        query.fields.len(),
        query.methods.len(),
        query.parameters.len()
    );

    let mut search = Search {
        query,
        hits: SearchHits::default(),
    };
    if !query.is_empty() {
        for id in sys.tables().type_ids() {
            let outcome = sys
                .get_id(id)
                .and_then(|subject| search.visit(&subject));
            if let Err(error) = outcome {
                tracing::warn!("Search skipped type {}: {}", id, error);
                search.hits.failures.push(SearchFailure { subject: id, error });
            }
        }
    }

    let mut hits = search.hits;
    hits.sort();
    tracing::debug!(
        "Search found {} classes, {} fields, {} methods, {} parameters in {:?}",
        hits.classes.len(),
        hits.fields.len(),
        hits.methods.len(),
        hits.parameters.len(),
        start.elapsed()
    );
    Ok(hits)
}

use super::relation::RelationKind;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Commands accepted by [`crate::DocumentationService::query`].
///
/// `target` is either a numeric type id or a class name understood by the
/// name lookup (`java.util.List`, `List<E>`, `Map$Entry`, `String[]`, ...).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum DocQuery {
    Search {
        params: SearchParams,
    },
    SearchExpr {
        expr: QueryExpr,
        #[serde(default = "default_true")]
        inclusive: bool,
        #[serde(default)]
        exact: bool,
    },
    Show {
        target: String,
    },
    Fields {
        target: String,
        #[serde(default)]
        shallow: bool,
    },
    Methods {
        target: String,
        #[serde(default)]
        shallow: bool,
    },
    Constructors {
        target: String,
    },
    Related {
        target: String,
    },
    Relations {
        target: String,
        #[serde(default)]
        kind: Option<RelationKind>,
    },
    Events,
    Bindings,
    Stats,
}

/// Flat key/value search, as typed into a search bar.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct SearchParams {
    /// Query terms in insertion order (`name` → `Foo`, `parameter-count` → `2`).
    pub terms: Vec<(String, String)>,
    /// `false` turns every leaf into an exclusion.
    #[serde(default = "default_true")]
    pub inclusive: bool,
    /// `true` means whole-value, case-sensitive comparison.
    #[serde(default)]
    pub exact: bool,
    /// Overrides the case sensitivity implied by `exact`.
    #[serde(default)]
    pub case_sensitive: Option<bool>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            terms: Vec::new(),
            inclusive: true,
            exact: false,
            case_sensitive: None,
        }
    }
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.terms.push((key.into(), value.into()));
        self
    }

    pub fn inclusive(mut self, inclusive: bool) -> Self {
        self.inclusive = inclusive;
        self
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    /// Builds params from `key=value` pairs, pulling out the `inclusive`,
    /// `exact` and `case_sensitive` modifiers.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let key = key.into();
            let value = value.into();
            match key.as_str() {
                "inclusive" => params.inclusive = value == "true",
                "exact" => params.exact = value == "true",
                "case_sensitive" | "case-sensitive" => {
                    params.case_sensitive = Some(value == "true")
                }
                _ => params.terms.push((key, value)),
            }
        }
        params
    }

    /// Parses `name=Foo&inclusive=false&exact=false`. A leading `?` or `#?`
    /// is ignored, as are empty segments.
    pub fn parse(query: &str) -> Self {
        let query = query.trim_start_matches('#').trim_start_matches('?');
        Self::from_pairs(query.split('&').filter(|s| !s.is_empty()).map(|pair| {
            match pair.split_once('=') {
                Some((k, v)) => (k.to_string(), v.to_string()),
                None => (pair.to_string(), String::new()),
            }
        }))
    }

    /// Effective case sensitivity for every leaf built from these params.
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive.unwrap_or(self.exact)
    }
}

/// Structured query: boolean combinations of named terms.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueryExpr {
    And(Vec<QueryExpr>),
    Or(Vec<QueryExpr>),
    Not(Box<QueryExpr>),
    Term { key: String, value: String },
}

impl QueryExpr {
    pub fn term(key: impl Into<String>, value: impl Into<String>) -> Self {
        QueryExpr::Term {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_query() {
        let params = SearchParams::parse("#?name=Foo&inclusive=false&exact=false");
        assert_eq!(params.terms, vec![("name".to_string(), "Foo".to_string())]);
        assert!(!params.inclusive);
        assert!(!params.exact);
        assert!(!params.is_case_sensitive());
    }

    #[test]
    fn test_defaults_are_inclusive_and_fuzzy() {
        let params = SearchParams::parse("package=java.util");
        assert!(params.inclusive);
        assert!(!params.exact);
    }

    #[test]
    fn test_case_sensitive_overrides_exact() {
        let params = SearchParams::parse("name=Foo&exact=false&case_sensitive=true");
        assert!(params.is_case_sensitive());
        assert!(!params.exact);
    }

    #[test]
    fn test_doc_query_is_command_tagged() {
        let json = r#"{"command":"fields","target":"java.util.List"}"#;
        let query: DocQuery = serde_json::from_str(json).unwrap();
        assert_eq!(
            query,
            DocQuery::Fields {
                target: "java.util.List".to_string(),
                shallow: false
            }
        );
    }

    #[test]
    fn test_query_expr_shape() {
        let json = r#"{"or":[{"term":{"key":"name","value":"Foo"}},{"not":{"term":{"key":"package","value":"net"}}}]}"#;
        let expr: QueryExpr = serde_json::from_str(json).unwrap();
        assert_eq!(
            expr,
            QueryExpr::Or(vec![
                QueryExpr::term("name", "Foo"),
                QueryExpr::Not(Box::new(QueryExpr::term("package", "net"))),
            ])
        );
    }
}

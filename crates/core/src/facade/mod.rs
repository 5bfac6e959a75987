use std::path::Path;
use std::sync::Arc;

use crate::config::RefdocConfig;
use crate::error::Result;
use crate::session::DocumentationSession;
use crate::snapshot::Snapshot;
use async_trait::async_trait;
use refdoc_api::{ApiResult, DocQuery, DocumentationService, IndexStats, QueryResult};

mod queries;
pub mod views;

/// Session handle - the interface every front end talks to
///
/// Provides the async [`DocumentationService`] API and a sync
/// [`SessionHandle::query_sync`] for callers that already hold a ready
/// session (the shell, tests).
#[derive(Clone)]
pub struct SessionHandle {
    pub(crate) session: Arc<DocumentationSession>,
}

impl SessionHandle {
    /// In-memory handle; `save` is unavailable.
    pub fn new(snapshot: Snapshot, config: RefdocConfig) -> Self {
        Self::from_session(Arc::new(DocumentationSession::new(snapshot, config)))
    }

    /// Opens a snapshot file; its index is persisted under the configured
    /// index directory.
    pub fn open(path: &Path, config: RefdocConfig) -> Result<Self> {
        Ok(Self::from_session(Arc::new(DocumentationSession::open(
            path, config,
        )?)))
    }

    pub fn from_session(session: Arc<DocumentationSession>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &DocumentationSession {
        &self.session
    }

    pub fn query_sync(&self, query: &DocQuery) -> ApiResult<QueryResult> {
        let ready = self.session.ready()?;
        queries::run(&ready, query)
    }
}

#[async_trait]
impl DocumentationService for SessionHandle {
    async fn prepare(&self) -> ApiResult<IndexStats> {
        Ok(self.session.prepare().await?)
    }

    async fn query(&self, query: &DocQuery) -> ApiResult<QueryResult> {
        let ready = self.session.ready()?;
        let query = query.clone();
        tracing::debug!("Running query {:?}", query);
        tokio::task::spawn_blocking(move || queries::run(&ready, &query))
            .await
            .map_err(|e| refdoc_api::ApiError::Internal(e.to_string()))?
    }

    async fn save(&self) -> ApiResult<()> {
        Ok(self.session.save().await?)
    }

    async fn reset(&self) -> ApiResult<()> {
        self.session.reset();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refdoc_api::{ApiError, MemberKind, QueryExpr, RelationKind, SearchParams};
    use serde_json::json;

    // 0 Object, 1 Number, 2 Integer, 3 T,
    // 4 Box<T> { T value; T get(); Object set(T item); Box(T item) },
    // 5 Box<Integer>, 6 IntBox extends Box<Integer>
    fn snapshot() -> Snapshot {
        serde_json::from_value(json!({
            "types": [
                {"n": 0, "P": 0, "M": 1},
                {"n": 1, "P": 0, "s": 0, "M": 1025},
                {"n": 2, "P": 0, "s": 1, "M": 17},
                {"tv": 3},
                {
                    "n": 4, "P": 1, "s": 0, "v": [3], "M": 1,
                    "f": "5,3,2,",
                    "m": ["6,1,3,,,,", "9,1,0,,[0],,"],
                    "c": "1,,,,[0]"
                },
                {"r": 4, "v": [2]},
                {"n": 7, "P": 1, "s": 5, "M": 1}
            ],
            "parameters": ["8,3,,"],
            "names": ["Object", "Number", "Integer", "T", "Box", "value", "get", "IntBox", "item", "set"],
            "packages": [["java.lang"], ["demo"]],
            "bindings": [["Boxes", 6, {"count": 2}]]
        }))
        .unwrap()
    }

    async fn ready_handle() -> SessionHandle {
        let handle = SessionHandle::new(snapshot(), RefdocConfig::default());
        handle.prepare().await.unwrap();
        handle
    }

    #[tokio::test]
    async fn test_query_before_prepare_is_not_ready() {
        let handle = SessionHandle::new(snapshot(), RefdocConfig::default());
        let err = handle.query(&DocQuery::Stats).await.unwrap_err();
        assert!(matches!(err, ApiError::NotReady(_)));
    }

    #[tokio::test]
    async fn test_inherited_field_renders_bound_type() {
        let handle = ready_handle().await;
        let result = handle
            .query(&DocQuery::Fields {
                target: "demo.IntBox".to_string(),
                shallow: false,
            })
            .await
            .unwrap();
        let QueryResult::Members(table) = result else {
            panic!("expected members");
        };
        assert_eq!(table.rows.len(), 1);
        let value = &table.rows[0];
        assert_eq!(value.kind, MemberKind::Field);
        assert_eq!(value.name, "value");
        assert_eq!(value.type_name, "Integer");
        assert_eq!(value.declaring_class, 4);
    }

    #[tokio::test]
    async fn test_unknown_target_is_not_found() {
        let handle = ready_handle().await;
        let err = handle
            .query(&DocQuery::Show {
                target: "demo.Missing".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_relations_by_kind() {
        let handle = ready_handle().await;
        let result = handle
            .query(&DocQuery::Relations {
                target: "java.lang.Number".to_string(),
                kind: Some(RelationKind::Subclass),
            })
            .await
            .unwrap();
        let QueryResult::Relations(table) = result else {
            panic!("expected relations");
        };
        let names: Vec<_> = table.rows.iter().map(|r| r.class.name.as_str()).collect();
        assert_eq!(names, vec!["Integer"]);
    }

    #[tokio::test]
    async fn test_search_finds_parameters() {
        let handle = ready_handle().await;
        let result = handle
            .query(&DocQuery::Search {
                params: SearchParams::parse("name=item"),
            })
            .await
            .unwrap();
        let QueryResult::Search(results) = result else {
            panic!("expected search results");
        };
        assert!(results.classes.is_empty());
        assert!(results.fields.is_empty());
        assert!(results.methods.is_empty());
        assert_eq!(results.parameters.rows.len(), 1);
        let param = &results.parameters.rows[0];
        assert_eq!(param.kind, MemberKind::Parameter);
        assert_eq!(param.type_name, "T");
        assert_eq!(param.signature, "public Object set(T item)");
        assert_eq!(param.parameter_count, Some(1));
    }

    #[tokio::test]
    async fn test_structured_search() {
        let handle = ready_handle().await;
        let expr = QueryExpr::And(vec![
            QueryExpr::term("class-package", "java.lang"),
            QueryExpr::Not(Box::new(QueryExpr::term("class-type-simplename", "Object"))),
        ]);
        let result = handle
            .query(&DocQuery::SearchExpr {
                expr,
                inclusive: true,
                exact: false,
            })
            .await
            .unwrap();
        let QueryResult::Search(results) = result else {
            panic!("expected search results");
        };
        let names: Vec<_> = results.classes.rows.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Integer", "Number"]);
    }

    #[tokio::test]
    async fn test_bindings_render_type_names() {
        let handle = ready_handle().await;
        let QueryResult::Bindings(table) = handle.query(&DocQuery::Bindings).await.unwrap() else {
            panic!("expected bindings");
        };
        assert_eq!(table.rows.len(), 1);
        let binding = &table.rows[0];
        assert_eq!(binding.id, "Boxes-6");
        assert_eq!(binding.type_name, "demo.IntBox");
        assert_eq!(binding.data, Some(json!({"count": 2})));
    }

    #[tokio::test]
    async fn test_saving_without_a_snapshot_file_is_a_storage_error() {
        let handle = ready_handle().await;
        let err = handle.save().await.unwrap_err();
        assert!(matches!(err, ApiError::Storage(_)));
        assert_eq!(err.code(), "storage");
    }

    #[tokio::test]
    async fn test_reset_returns_to_not_ready() {
        let handle = ready_handle().await;
        handle.reset().await.unwrap();
        assert!(matches!(
            handle.query_sync(&DocQuery::Stats),
            Err(ApiError::NotReady(_))
        ));
        let stats = handle.prepare().await.unwrap();
        assert_eq!(stats.types, 7);
        assert_eq!(stats.bindings, 1);
    }
}

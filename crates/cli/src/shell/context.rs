use refdoc_api::{ApiResult, DocQuery, DocumentationService, QueryResult};
use refdoc_core::SessionHandle;
use std::sync::{Arc, RwLock};

/// The class the shell is "in"; commands without a target use it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentClass {
    pub id: u32,
    pub name: String,
}

#[derive(Clone)]
pub struct ShellContext {
    pub handle: SessionHandle,
    pub rt_handle: tokio::runtime::Handle,
    pub current: Arc<RwLock<Option<CurrentClass>>>,
}

impl ShellContext {
    pub fn new(handle: SessionHandle, rt_handle: tokio::runtime::Handle) -> Self {
        Self {
            handle,
            rt_handle,
            current: Arc::new(RwLock::new(None)),
        }
    }

    pub fn current(&self) -> Option<CurrentClass> {
        self.current.read().map(|c| c.clone()).unwrap_or(None)
    }

    pub fn set_current(&self, class: Option<CurrentClass>) {
        if let Ok(mut current) = self.current.write() {
            *current = class;
        }
    }

    /// Queries run on the calling thread; the shell loop is outside the runtime.
    pub fn execute(&self, query: &DocQuery) -> ApiResult<QueryResult> {
        self.handle.query_sync(query)
    }

    pub fn save(&self) -> ApiResult<()> {
        self.rt_handle.block_on(self.handle.save())
    }

    /// Resolves `target` and makes it the current class.
    pub fn change_class(&self, target: &str) -> Result<String, Box<dyn std::error::Error>> {
        if target == ".." || target == "/" {
            self.set_current(None);
            return Ok(String::new());
        }
        let QueryResult::Classes(mut table) = self.execute(&DocQuery::Show {
            target: target.to_string(),
        })?
        else {
            return Err("unexpected result for show".into());
        };
        if table.rows.is_empty() {
            let reason = table
                .failures
                .first()
                .map(|f| f.message.clone())
                .unwrap_or_else(|| format!("class '{}' not found", target));
            return Err(reason.into());
        }
        let view = table.rows.remove(0);
        self.set_current(Some(CurrentClass {
            id: view.id,
            name: view.reference_name,
        }));
        Ok(String::new())
    }

    /// Number of types in the ready index, `None` before `prepare`.
    pub fn type_count(&self) -> Option<usize> {
        let ready = self.handle.session().ready().ok()?;
        Some(ready.system().tables().type_count())
    }

    /// Fully-qualified raw class names starting with `prefix`, or whose
    /// simple name does. Empty before the index is ready.
    pub fn class_names(&self, prefix: &str, limit: usize) -> Vec<String> {
        let Ok(ready) = self.handle.session().ready() else {
            return Vec::new();
        };
        let system = ready.system();
        let Ok(partitions) = system.partitions() else {
            return Vec::new();
        };
        partitions
            .raw
            .iter()
            .filter_map(|id| system.get_id(*id).ok())
            .filter_map(|ty| ty.fully_qualified_name(false).ok())
            .filter(|fqn| {
                fqn.starts_with(prefix)
                    || fqn
                        .rsplit('.')
                        .next()
                        .is_some_and(|simple| simple.starts_with(prefix))
            })
            .take(limit)
            .collect()
    }
}

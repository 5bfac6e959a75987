//! Query dispatch over a ready index.

use super::views;
use crate::model::TypeId;
use crate::search::{self, MatchOptions, SearchQuery};
use crate::session::ReadyIndex;
use crate::types::{JavaType, TypeSystem};
use refdoc_api::{
    ApiError, ApiResult, DocQuery, EventGroupView, QueryResult, RelatedClassView, RelationKind,
    RelationView, RowFailure, SearchResults,
};

pub fn run(ready: &ReadyIndex, query: &DocQuery) -> ApiResult<QueryResult> {
    let sys = ready.system();
    match query {
        DocQuery::Search { params } => {
            let query = SearchQuery::from_params(params)?;
            search_results(sys, &query)
        }
        DocQuery::SearchExpr {
            expr,
            inclusive,
            exact,
        } => {
            let options = MatchOptions {
                inclusive: *inclusive,
                exact: *exact,
                case_sensitive: *exact,
            };
            let query = SearchQuery::from_expr(expr, options)?;
            search_results(sys, &query)
        }
        DocQuery::Show { target } => {
            let class = resolve(sys, target)?;
            Ok(QueryResult::Classes(views::table(
                [class],
                |c| subject(c.id()),
                views::class_view,
            )))
        }
        DocQuery::Fields { target, shallow } => {
            let fields = resolve(sys, target)?.fields(*shallow)?;
            Ok(QueryResult::Members(views::table(
                fields,
                |f| format!("field {} of type {}", f.index(), f.declaring_class()),
                views::field_view,
            )))
        }
        DocQuery::Methods { target, shallow } => {
            let methods = resolve(sys, target)?.methods(*shallow)?;
            Ok(QueryResult::Members(views::table(
                methods,
                |m| format!("method {} of type {}", m.index(), m.declaring_class()),
                views::method_view,
            )))
        }
        DocQuery::Constructors { target } => {
            let ctors = resolve(sys, target)?.constructors()?;
            Ok(QueryResult::Members(views::table(
                ctors,
                |c| format!("constructor {} of type {}", c.index(), c.declaring_class()),
                views::constructor_view,
            )))
        }
        DocQuery::Related { target } => {
            let class = resolve(sys, target)?;
            let related = class.related_classes()?;
            Ok(QueryResult::Related(views::table(
                related,
                |r| subject(r.class.id),
                |r| {
                    Ok(RelatedClassView {
                        relation: r.relation.label().to_string(),
                        class: views::class_view(&class.related_type(r)?)?,
                    })
                },
            )))
        }
        DocQuery::Relations { target, kind } => {
            let class = resolve(sys, target)?;
            let pairs: Vec<(RelationKind, TypeId)> = match kind {
                Some(kind) => ready
                    .relation(*kind, class.id())
                    .into_iter()
                    .map(|to| (*kind, to))
                    .collect(),
                None => ready
                    .relations_of(class.id())
                    .into_iter()
                    .flat_map(|(kind, ids)| ids.into_iter().map(move |to| (kind, to)))
                    .collect(),
            };
            Ok(QueryResult::Relations(views::table(
                pairs,
                |(kind, to)| format!("{} {}", kind, subject(*to)),
                |(kind, to)| {
                    Ok(RelationView {
                        relation: *kind,
                        class: views::class_view(&sys.get_id(*to)?)?,
                    })
                },
            )))
        }
        DocQuery::Events => Ok(QueryResult::Events(events(ready))),
        DocQuery::Bindings => {
            let bindings = sys.tables().bindings()?;
            Ok(QueryResult::Bindings(views::table(
                bindings.iter(),
                |b| format!("binding {}", b.name),
                |b| views::binding_view(sys, b),
            )))
        }
        DocQuery::Stats => Ok(QueryResult::Stats(ready.stats()?)),
    }
}

fn subject(id: TypeId) -> String {
    format!("type {}", id)
}

fn resolve<'a>(sys: &'a TypeSystem, target: &str) -> ApiResult<JavaType<'a>> {
    match sys.resolve(target)? {
        Some(r) => Ok(sys.get(r)?),
        None => Err(ApiError::NotFound(format!("class '{}'", target.trim()))),
    }
}

fn search_results(sys: &TypeSystem, query: &SearchQuery) -> ApiResult<QueryResult> {
    let hits = search::search(sys, query)?;
    let mut classes = views::table(hits.classes, |c| subject(c.id()), views::class_view);
    classes
        .failures
        .extend(hits.failures.iter().map(|failure| RowFailure {
            subject: subject(failure.subject),
            message: failure.error.to_string(),
        }));
    Ok(QueryResult::Search(SearchResults {
        classes,
        fields: views::table(
            hits.fields,
            |f| format!("field {} of type {}", f.index(), f.declaring_class()),
            views::field_view,
        ),
        methods: views::table(
            hits.methods,
            |m| format!("method {} of type {}", m.index(), m.declaring_class()),
            views::method_view,
        ),
        parameters: views::table(
            hits.parameters,
            |p| {
                format!(
                    "parameter {} of method {} in type {}",
                    p.parameter.index(),
                    p.method.index(),
                    p.method.declaring_class()
                )
            },
            views::parameter_view,
        ),
    }))
}

/// Event groups keyed by base class name. Classes that fail to render are
/// left out of their group.
fn events(ready: &ReadyIndex) -> Vec<EventGroupView> {
    let sys = ready.system();
    ready
        .events()
        .iter()
        .map(|(base, ids)| {
            let table = views::table(ids.iter(), |id| subject(**id), |id| {
                views::class_view(&sys.get_id(**id)?)
            });
            EventGroupView {
                base: base.clone(),
                classes: table.rows,
            }
        })
        .collect()
}

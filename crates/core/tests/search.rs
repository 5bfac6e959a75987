mod common;

use common::{SnapshotBuilder, init_tracing};
use pretty_assertions::assert_eq;
use refdoc_api::{DocQuery, DocumentationService, QueryResult, SearchParams, SearchResults};
use refdoc_core::SessionHandle;
use refdoc_core::config::RefdocConfig;

// Object, Integer, Foo and
// Bar { Integer fooCount; Integer size; Foo owner; Foo getFoo(); Object clear(Object target, Integer fooHint) }
fn snapshot() -> SnapshotBuilder {
    let mut b = SnapshotBuilder::new();
    let object = b.class("java.lang.Object");
    let integer = b.class("java.lang.Integer");
    b.extends(integer, object);
    let foo = b.class("demo.Foo");
    b.extends(foo, object);
    let bar = b.class("demo.Bar");
    b.extends(bar, object);
    b.field(bar, "fooCount", integer, 1)
        .field(bar, "size", integer, 1)
        .field(bar, "owner", foo, 1);
    let target = b.parameter("target", object);
    let hint = b.parameter("fooHint", integer);
    b.method(bar, "getFoo", foo, &[])
        .method(bar, "clear", object, &[target, hint]);
    b
}

async fn search(query: &str) -> SearchResults {
    init_tracing();
    let handle = SessionHandle::new(snapshot().build(), RefdocConfig::default());
    handle.prepare().await.unwrap();
    match handle
        .query(&DocQuery::Search {
            params: SearchParams::parse(query),
        })
        .await
        .unwrap()
    {
        QueryResult::Search(results) => results,
        other => panic!("expected search results, got {:?}", other),
    }
}

fn names(results: &SearchResults) -> [Vec<String>; 4] {
    [
        results.classes.rows.iter().map(|c| c.simple_name.clone()).collect(),
        results.fields.rows.iter().map(|f| f.name.clone()).collect(),
        results.methods.rows.iter().map(|m| m.name.clone()).collect(),
        results.parameters.rows.iter().map(|p| p.name.clone()).collect(),
    ]
}

#[tokio::test]
async fn inclusive_name_matches_every_kind() {
    let results = search("name=foo").await;
    assert_eq!(
        names(&results),
        [
            vec!["Foo".to_string()],
            vec!["fooCount".to_string(), "owner".to_string()],
            vec!["getFoo".to_string()],
            vec!["fooHint".to_string()],
        ]
    );
}

#[tokio::test]
async fn exclusive_name_returns_everything_without_the_text() {
    let results = search("name=Foo&inclusive=false&exact=false").await;
    assert_eq!(
        names(&results),
        [
            vec!["Bar".to_string(), "Integer".to_string(), "Object".to_string()],
            vec!["size".to_string()],
            vec!["clear".to_string()],
            vec!["target".to_string()],
        ]
    );
    for class in &results.classes.rows {
        assert!(!class.name.to_lowercase().contains("foo"));
    }
    for member in results
        .fields
        .rows
        .iter()
        .chain(&results.methods.rows)
        .chain(&results.parameters.rows)
    {
        assert!(!member.name.to_lowercase().contains("foo"));
        assert!(!member.type_name.to_lowercase().contains("foo"));
    }
}

#[tokio::test]
async fn exact_search_is_case_sensitive() {
    let results = search("class-name=foo&exact=true").await;
    assert!(results.classes.is_empty());
    let results = search("class-name=Foo&exact=true").await;
    assert_eq!(results.classes.rows.len(), 1);
    let results = search("class-name=foo&exact=true&case_sensitive=false").await;
    assert_eq!(results.classes.rows.len(), 1);
}

#[tokio::test]
async fn ignored_kinds_are_left_out() {
    let results = search("name=foo&ignore-classes=true&ignore-parameters=true").await;
    assert!(results.classes.is_empty());
    assert!(results.parameters.is_empty());
    assert_eq!(results.fields.rows.len(), 2);
    assert_eq!(results.methods.rows.len(), 1);
}

#[tokio::test]
async fn parameter_count_selects_methods() {
    let results = search("parameter-count=2").await;
    assert_eq!(names(&results)[2], vec!["clear".to_string()]);
    assert!(results.classes.is_empty());
    assert!(results.fields.is_empty());
}

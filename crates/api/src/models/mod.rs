pub mod modifiers;
pub mod query;
pub mod relation;
pub mod views;

pub use modifiers::Modifiers;
pub use query::{DocQuery, QueryExpr, SearchParams};
pub use relation::RelationKind;
pub use views::{
    BindingView, ClassView, EventGroupView, IndexStats, MemberKind, MemberView, QueryResult,
    RelatedClassView, RelationView, RowFailure, SearchResults, Table, TypeVariant,
};

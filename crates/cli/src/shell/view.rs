use nu_ansi_term::Color;
use refdoc_api::{
    BindingView, ClassView, IndexStats, MemberView, QueryResult, RelatedClassView, RelationView,
    RowFailure, SearchResults, Table as ResultTable,
};
use tabled::settings::Style;
use tabled::{Table, Tabled};

const NO_RECORDS: &str = "NO RECORDS FOUND";

/// A terminal-optimized row for a class
#[derive(Tabled)]
pub struct ClassRow {
    pub id: u32,
    pub variant: String,
    pub name: String,
    pub package: String,
    pub modifiers: String,
}

impl From<&ClassView> for ClassRow {
    fn from(view: &ClassView) -> Self {
        Self {
            id: view.id,
            variant: view.variant.to_string(),
            name: view.name.clone(),
            package: or_dash(&view.package),
            modifiers: or_dash(&view.modifiers),
        }
    }
}

#[derive(Tabled)]
pub struct MemberRow {
    pub kind: String,
    pub name: String,
    #[tabled(rename = "type")]
    pub type_name: String,
    pub signature: String,
    pub declared_in: String,
}

impl From<&MemberView> for MemberRow {
    fn from(view: &MemberView) -> Self {
        Self {
            kind: view.kind.to_string(),
            name: view.name.clone(),
            type_name: view.type_name.clone(),
            signature: view.signature.clone(),
            declared_in: shorten_fqn(&view.declaring_class_name),
        }
    }
}

#[derive(Tabled)]
pub struct RelationRow {
    pub relation: String,
    pub id: u32,
    pub class: String,
}

impl From<&RelatedClassView> for RelationRow {
    fn from(view: &RelatedClassView) -> Self {
        Self {
            relation: view.relation.clone(),
            id: view.class.id,
            class: view.class.reference_name.clone(),
        }
    }
}

impl From<&RelationView> for RelationRow {
    fn from(view: &RelationView) -> Self {
        Self {
            relation: view.relation.to_string(),
            id: view.class.id,
            class: view.class.reference_name.clone(),
        }
    }
}

#[derive(Tabled)]
pub struct BindingRow {
    pub id: String,
    #[tabled(rename = "type")]
    pub type_name: String,
    pub data: String,
}

impl From<&BindingView> for BindingRow {
    fn from(view: &BindingView) -> Self {
        Self {
            id: view.id.clone(),
            type_name: view.type_name.clone(),
            data: view
                .data
                .as_ref()
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Key/value row used for class details and statistics.
#[derive(Tabled)]
pub struct PropertyRow {
    pub property: String,
    pub value: String,
}

impl PropertyRow {
    fn new(property: &str, value: impl ToString) -> Self {
        Self {
            property: property.to_string(),
            value: value.to_string(),
        }
    }
}

pub fn render(result: &QueryResult) -> String {
    match result {
        QueryResult::Classes(table) if table.rows.len() == 1 => {
            with_failures(class_details(&table.rows[0]), &table.failures)
        }
        QueryResult::Classes(table) => render_table::<_, ClassRow>(table),
        QueryResult::Members(table) => render_table::<_, MemberRow>(table),
        QueryResult::Related(table) => render_table::<_, RelationRow>(table),
        QueryResult::Relations(table) => render_table::<_, RelationRow>(table),
        QueryResult::Bindings(table) => render_table::<_, BindingRow>(table),
        QueryResult::Search(results) => render_search(results),
        QueryResult::Events(groups) => {
            if groups.is_empty() {
                return NO_RECORDS.to_string();
            }
            groups
                .iter()
                .map(|group| {
                    let rows: Vec<ClassRow> = group.classes.iter().map(ClassRow::from).collect();
                    format!(
                        "{} ({})\n{}",
                        Color::LightBlue.bold().paint(&group.base),
                        rows.len(),
                        Table::new(&rows).with(Style::psql())
                    )
                })
                .collect::<Vec<_>>()
                .join("\n\n")
        }
        QueryResult::Stats(stats) => render_stats(stats),
    }
}

fn render_table<'a, T, R>(table: &'a ResultTable<T>) -> String
where
    R: Tabled + From<&'a T>,
{
    if table.is_empty() {
        return NO_RECORDS.to_string();
    }
    let rows: Vec<R> = table.rows.iter().map(R::from).collect();
    let body = if rows.is_empty() {
        String::new()
    } else {
        Table::new(&rows).with(Style::psql()).to_string()
    };
    with_failures(body, &table.failures)
}

fn section<'a, T, R>(title: &str, table: &'a ResultTable<T>) -> Option<String>
where
    R: Tabled + From<&'a T>,
{
    if table.is_empty() {
        return None;
    }
    Some(format!(
        "{} ({})\n{}",
        Color::LightBlue.bold().paint(title),
        table.len(),
        render_table::<_, R>(table)
    ))
}

fn render_search(results: &SearchResults) -> String {
    let sections: Vec<String> = [
        section::<_, ClassRow>("Classes", &results.classes),
        section::<_, MemberRow>("Fields", &results.fields),
        section::<_, MemberRow>("Methods", &results.methods),
        section::<_, MemberRow>("Parameters", &results.parameters),
    ]
    .into_iter()
    .flatten()
    .collect();
    if sections.is_empty() {
        NO_RECORDS.to_string()
    } else {
        sections.join("\n\n")
    }
}

fn class_details(view: &ClassView) -> String {
    let mut rows = vec![
        PropertyRow::new("id", view.id),
        PropertyRow::new("name", &view.reference_name),
        PropertyRow::new("kind", view.variant),
        PropertyRow::new("package", or_dash(&view.package)),
        PropertyRow::new("modifiers", or_dash(&view.modifiers)),
    ];
    if view.array_depth > 0 {
        rows.push(PropertyRow::new("array depth", view.array_depth));
    }
    if let Some(super_class) = &view.super_class {
        rows.push(PropertyRow::new("extends", super_class));
    }
    if !view.interfaces.is_empty() {
        rows.push(PropertyRow::new("implements", view.interfaces.join(", ")));
    }
    for annotation in &view.annotations {
        rows.push(PropertyRow::new("annotation", annotation));
    }
    if let Some(snippet) = &view.load_snippet {
        rows.push(PropertyRow::new("load", snippet));
    }
    Table::new(&rows).with(Style::psql()).to_string()
}

fn render_stats(stats: &IndexStats) -> String {
    let mut rows = vec![
        PropertyRow::new("types", stats.types),
        PropertyRow::new("raw classes", stats.raw_classes),
        PropertyRow::new("parameterized", stats.parameterized),
        PropertyRow::new("type variables", stats.type_variables),
        PropertyRow::new("wildcards", stats.wildcards),
        PropertyRow::new("edges", stats.edges),
        PropertyRow::new("event classes", stats.event_classes),
        PropertyRow::new("bindings", stats.bindings),
        PropertyRow::new("from stored index", stats.loaded_from_cache),
    ];
    for (kind, count) in &stats.relation_counts {
        rows.push(PropertyRow::new(kind.wire_name(), count));
    }
    let mut out = Table::new(&rows).with(Style::psql()).to_string();
    for warning in &stats.warnings {
        out.push('\n');
        out.push_str(&Color::Yellow.paint(format!("warning: {}", warning)).to_string());
    }
    out
}

fn with_failures(body: String, failures: &[RowFailure]) -> String {
    let mut out = body;
    for failure in failures {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(
            &Color::Red
                .paint(format!("! {}: {}", failure.subject, failure.message))
                .to_string(),
        );
    }
    out
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

pub fn shorten_fqn(fqn: &str) -> String {
    let parts: Vec<&str> = fqn.split('.').collect();
    if parts.len() <= 2 {
        return fqn.to_string();
    }
    let mut result = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i < parts.len() - 2 {
            if let Some(c) = part.chars().next() {
                result.push(c);
                result.push('.');
            }
        } else {
            result.push_str(part);
            if i < parts.len() - 1 {
                result.push('.');
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use refdoc_api::{MemberKind, TypeVariant};

    fn member(name: &str) -> MemberView {
        MemberView {
            kind: MemberKind::Field,
            declaring_class: 4,
            declaring_class_name: "net.example.deep.Box".to_string(),
            index: 0,
            name: name.to_string(),
            type_name: "Integer".to_string(),
            modifiers: "private".to_string(),
            signature: format!("private Integer {}", name),
            parameter_count: None,
        }
    }

    #[test]
    fn test_shorten_fqn_keeps_last_two_parts() {
        assert_eq!(shorten_fqn("net.example.deep.Box"), "n.e.deep.Box");
        assert_eq!(shorten_fqn("demo.Box"), "demo.Box");
    }

    #[test]
    fn test_empty_table_says_so() {
        let result = QueryResult::Members(ResultTable::default());
        assert_eq!(render(&result), NO_RECORDS);
    }

    #[test]
    fn test_failures_are_listed_after_rows() {
        let result = QueryResult::Members(ResultTable {
            rows: vec![member("value")],
            failures: vec![RowFailure {
                subject: "field 1 of type 5".to_string(),
                message: "name id 99 out of range".to_string(),
            }],
        });
        let out = render(&result);
        assert!(out.contains("private Integer value"));
        assert!(out.contains("n.e.deep.Box"));
        let failure_at = out.find("field 1 of type 5").unwrap();
        assert!(failure_at > out.find("value").unwrap());
    }

    #[test]
    fn test_single_class_renders_details() {
        let view = ClassView {
            id: 7,
            array_depth: 0,
            variant: TypeVariant::RawClass,
            reference_name: "demo.IntBox".to_string(),
            name: "IntBox".to_string(),
            simple_name: "IntBox".to_string(),
            package: "demo".to_string(),
            modifiers: "public".to_string(),
            super_class: Some("demo.Box<java.lang.Integer>".to_string()),
            interfaces: vec![],
            annotations: vec![],
            load_snippet: Some("const $INTBOX = Java.loadClass(\"demo.IntBox\");".to_string()),
        };
        let out = render(&QueryResult::Classes(ResultTable {
            rows: vec![view],
            failures: vec![],
        }));
        assert!(out.contains("extends"));
        assert!(out.contains("demo.Box<java.lang.Integer>"));
        assert!(!out.contains("implements"));
        assert!(out.contains("Java.loadClass"));
    }

    #[test]
    fn test_empty_search_says_so() {
        assert_eq!(render(&QueryResult::Search(SearchResults::default())), NO_RECORDS);
    }
}

//! Conversion from type-system handles to the serializable API views.

use crate::error::Result;
use crate::model::Binding;
use crate::render::{NameOptions, signature};
use crate::search::ParameterMatch;
use crate::types::{Constructor, Field, JavaType, Method, Related, TypeSystem};
use refdoc_api::{BindingView, ClassView, MemberKind, MemberView, RowFailure, Table};

pub fn class_view(class: &JavaType<'_>) -> Result<ClassView> {
    let mut super_class = None;
    let mut interfaces = Vec::new();
    for related in class.related_classes()? {
        match related.relation {
            Related::Extends => {
                super_class = Some(class.related_type(&related)?.reference_name()?);
            }
            Related::Implements => {
                interfaces.push(class.related_type(&related)?.reference_name()?);
            }
            _ => {}
        }
    }
    Ok(ClassView {
        id: class.id(),
        array_depth: class.array_depth(),
        variant: class.variant(),
        reference_name: class.reference_name()?,
        name: class.name()?,
        simple_name: class.simple_name()?,
        package: class.package_name()?,
        modifiers: class.modifiers().to_string(),
        super_class,
        interfaces,
        annotations: class.annotation_texts()?,
        load_snippet: if class.is_raw_class() && class.array_depth() == 0 {
            Some(signature::load_snippet(class)?)
        } else {
            None
        },
    })
}

pub fn field_view(field: &Field<'_>) -> Result<MemberView> {
    Ok(MemberView {
        kind: MemberKind::Field,
        declaring_class: field.declaring_class(),
        declaring_class_name: field.declaring()?.fully_qualified_name(false)?,
        index: field.index(),
        name: field.name()?.unwrap_or_default().to_string(),
        type_name: field.type_name(&NameOptions::short())?,
        modifiers: field.modifiers().to_string(),
        signature: signature::field(field)?,
        parameter_count: None,
    })
}

pub fn method_view(method: &Method<'_>) -> Result<MemberView> {
    Ok(MemberView {
        kind: MemberKind::Method,
        declaring_class: method.declaring_class(),
        declaring_class_name: method.declaring()?.fully_qualified_name(false)?,
        index: method.index(),
        name: method.name()?.unwrap_or_default().to_string(),
        type_name: method.return_type_name(&NameOptions::short())?,
        modifiers: method.modifiers().to_string(),
        signature: signature::method(method)?,
        parameter_count: Some(method.parameter_count()),
    })
}

pub fn constructor_view(ctor: &Constructor<'_>) -> Result<MemberView> {
    let declaring = ctor.declaring()?;
    Ok(MemberView {
        kind: MemberKind::Constructor,
        declaring_class: ctor.declaring_class(),
        declaring_class_name: declaring.fully_qualified_name(false)?,
        index: ctor.index(),
        name: declaring.simple_name()?,
        type_name: declaring.name()?,
        modifiers: ctor.modifiers().to_string(),
        signature: signature::constructor(ctor)?,
        parameter_count: Some(ctor.parameter_count()),
    })
}

/// A parameter row carries the signature of the method it belongs to.
pub fn parameter_view(hit: &ParameterMatch<'_>) -> Result<MemberView> {
    let param = &hit.parameter;
    let name = match param.name()? {
        Some(name) => name.to_string(),
        None => format!("arg{}", param.index()),
    };
    Ok(MemberView {
        kind: MemberKind::Parameter,
        declaring_class: param.declaring_class(),
        declaring_class_name: param.declaring()?.fully_qualified_name(false)?,
        index: param.index(),
        name,
        type_name: param.type_name(&NameOptions::short())?,
        modifiers: param.modifiers().to_string(),
        signature: signature::method(&hit.method)?,
        parameter_count: Some(hit.method.parameter_count()),
    })
}

pub fn binding_view(sys: &TypeSystem, binding: &Binding) -> Result<BindingView> {
    Ok(BindingView {
        id: binding.id(),
        name: binding.name.clone(),
        type_id: binding.ty.id,
        type_name: sys.get(binding.ty)?.reference_name()?,
        data: binding.data.clone(),
    })
}

/// Builds one row per item. A row that fails to render becomes a
/// [`RowFailure`]; the other rows are unaffected.
pub fn table<I, T, S, F>(items: I, subject: S, mut build: F) -> Table<T>
where
    I: IntoIterator,
    S: Fn(&I::Item) -> String,
    F: FnMut(&I::Item) -> Result<T>,
{
    let mut table = Table::default();
    for item in items {
        match build(&item) {
            Ok(row) => table.rows.push(row),
            Err(e) => {
                let subject = subject(&item);
                tracing::warn!("Failed to render {}: {}", subject, e);
                table.failures.push(RowFailure {
                    subject,
                    message: e.to_string(),
                });
            }
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::members::tests::system;

    #[test]
    fn test_class_view_renders_bound_supertype() {
        let sys = system();
        // IntBox extends Box<Integer>
        let view = class_view(&sys.get_id(5).unwrap()).unwrap();
        assert_eq!(view.simple_name, "IntBox");
        assert_eq!(view.super_class.as_deref(), Some("demo.Box<java.lang.Integer>"));
        assert_eq!(
            view.load_snippet.as_deref(),
            Some("const $INTBOX = Java.loadClass(\"demo.IntBox\");")
        );
        assert_eq!(class_view(&sys.get_id(4).unwrap()).unwrap().load_snippet, None);
    }

    #[test]
    fn test_field_type_follows_subject_bindings() {
        let sys = system();
        let int_box = sys.get_id(5).unwrap();
        let rows: Vec<MemberView> = int_box
            .fields(false)
            .unwrap()
            .iter()
            .map(|f| field_view(f).unwrap())
            .collect();
        let value = rows.iter().find(|r| r.name == "value").unwrap();
        assert_eq!(value.type_name, "Integer");
        assert_eq!(value.declaring_class, 2);
    }

    #[test]
    fn test_table_isolates_failures() {
        let table = table(
            vec![1, 2, 3],
            |n| format!("row {}", n),
            |n| {
                if *n == 2 {
                    Err(crate::error::RefdocError::Internal("boom".to_string()))
                } else {
                    Ok(*n * 10)
                }
            },
        );
        assert_eq!(table.rows, vec![10, 30]);
        assert_eq!(table.failures.len(), 1);
        assert_eq!(table.failures[0].subject, "row 2");
    }
}

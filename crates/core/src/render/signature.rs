//! Java-style declarations for members, annotations and classes.

use super::NameOptions;
use crate::error::Result;
use crate::model::{AnnotationText, TypeId, TypeRef};
use crate::types::{Constructor, Field, JavaType, Method, Parameter, TypeSystem};
use refdoc_api::Modifiers;

fn with_modifiers(modifiers: Modifiers, rest: String) -> String {
    let keywords = modifiers.to_string();
    if keywords.is_empty() {
        rest
    } else {
        format!("{} {}", keywords, rest)
    }
}

/// `@java.lang.Deprecated(since = "1.2")`, or just `@Name` without arguments.
pub fn annotation(sys: &TypeSystem, id: u32) -> Result<String> {
    let record = sys.tables().annotation(id)?;
    let ty = sys.render(record.ty, &NameOptions::qualified())?;
    let text = match &record.text {
        Some(AnnotationText::Name(name)) => Some(sys.tables().name(*name)?.to_string()),
        Some(AnnotationText::Literal(text)) => Some(text.clone()),
        None => None,
    };
    Ok(match text {
        Some(text) => format!("@{}({})", ty, text),
        None => format!("@{}", ty),
    })
}

pub fn annotations(sys: &TypeSystem, ids: &[u32]) -> Result<Vec<String>> {
    ids.iter().map(|id| annotation(sys, *id)).collect()
}

fn type_variables(
    render: impl Fn(TypeRef) -> Result<String>,
    vars: &[TypeId],
) -> Result<Option<String>> {
    if vars.is_empty() {
        return Ok(None);
    }
    let rendered = vars
        .iter()
        .map(|v| render(TypeRef::new(*v)))
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(format!("<{}>", rendered.join(", "))))
}

fn throws(render: impl Fn(TypeRef) -> Result<String>, exceptions: &[TypeRef]) -> Result<String> {
    if exceptions.is_empty() {
        return Ok(String::new());
    }
    let rendered = exceptions
        .iter()
        .map(|e| render(*e))
        .collect::<Result<Vec<_>>>()?;
    Ok(format!(" throws {}", rendered.join(", ")))
}

fn parameter_list(params: &[Parameter<'_>], options: &NameOptions) -> Result<String> {
    let rendered = params
        .iter()
        .map(|p| parameter_with(p, options))
        .collect::<Result<Vec<_>>>()?;
    Ok(rendered.join(", "))
}

fn parameter_with(param: &Parameter<'_>, options: &NameOptions) -> Result<String> {
    let ty = param.type_name(options)?;
    Ok(match param.name()? {
        Some(name) => format!("{} {}", ty, name),
        None => format!("{} arg{}", ty, param.index()),
    })
}

/// `String[] args`; unnamed parameters become `argN`.
pub fn parameter(param: &Parameter<'_>) -> Result<String> {
    parameter_with(param, &NameOptions::short())
}

/// `private final Integer value`
pub fn field(field: &Field<'_>) -> Result<String> {
    let ty = field.type_name(&NameOptions::short())?;
    let name = field.name()?.unwrap_or("<unnamed>");
    Ok(with_modifiers(field.modifiers(), format!("{} {}", ty, name)))
}

/// `public static <T> List<T> of(T first, T second) throws IOException`
pub fn method(method: &Method<'_>) -> Result<String> {
    let options = NameOptions::short();
    let render = |r: TypeRef| method.render(r, &options);

    let mut out = String::new();
    if let Some(vars) = type_variables(render, method.type_variables())? {
        out.push_str(&vars);
        out.push(' ');
    }
    out.push_str(&method.return_type_name(&options)?);
    out.push(' ');
    out.push_str(method.name()?.unwrap_or("<unnamed>"));
    out.push('(');
    out.push_str(&parameter_list(&method.parameters()?, &options)?);
    out.push(')');
    out.push_str(&throws(render, method.exceptions())?);
    Ok(with_modifiers(method.modifiers(), out))
}

/// `public Box(T value)`
pub fn constructor(ctor: &Constructor<'_>) -> Result<String> {
    let options = NameOptions::short();
    let render = |r: TypeRef| ctor.render(r, &options);

    let mut out = String::new();
    if let Some(vars) = type_variables(render, ctor.type_variables())? {
        out.push_str(&vars);
        out.push(' ');
    }
    out.push_str(&ctor.declaring()?.simple_name()?);
    out.push('(');
    out.push_str(&parameter_list(&ctor.parameters()?, &options)?);
    out.push(')');
    out.push_str(&throws(render, ctor.exceptions())?);
    Ok(with_modifiers(ctor.modifiers(), out))
}

/// Script line that loads the class by its binary name.
pub fn load_snippet(class: &JavaType<'_>) -> Result<String> {
    Ok(format!(
        "const ${} = Java.loadClass(\"{}\");",
        class.simple_name()?.to_uppercase(),
        class.fully_qualified_name(false)?
    ))
}

//! Entity decoding: positional records into structured ones.

use super::scalar::decode_scalar;
use crate::error::{RefdocError, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Field,
    Method,
    Constructor,
    Parameter,
    Annotation,
}

impl EntityKind {
    /// Wire keys, in the order fields appear in the encoded string.
    pub fn schema(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Field => &["n", "t", "M", "a"],
            EntityKind::Method => &["n", "M", "t", "a", "p", "v", "e"],
            EntityKind::Constructor => &["M", "a", "e", "v", "p"],
            EntityKind::Parameter => &["n", "t", "M", "a"],
            EntityKind::Annotation => &["t", "s"],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Field => "field",
            EntityKind::Method => "method",
            EntityKind::Constructor => "constructor",
            EntityKind::Parameter => "parameter",
            EntityKind::Annotation => "annotation",
        }
    }
}

/// Turns an encoded record into a JSON object keyed by wire key.
///
/// Objects pass through untouched. Strings are split on `,` and arrays are
/// taken positionally; either must match the schema's field count exactly.
pub fn decode_record(kind: EntityKind, raw: &Value) -> Result<Map<String, Value>> {
    let schema = kind.schema();
    match raw {
        Value::Object(map) => Ok(map.clone()),
        Value::String(encoded) => {
            let parts: Vec<&str> = encoded.split(',').collect();
            check_arity(kind, parts.len(), raw)?;
            let mut out = Map::new();
            for (key, part) in schema.iter().zip(parts) {
                if let Some(value) = decode_scalar(part)? {
                    out.insert((*key).to_string(), value);
                }
            }
            Ok(out)
        }
        Value::Array(items) => {
            check_arity(kind, items.len(), raw)?;
            let mut out = Map::new();
            for (key, item) in schema.iter().zip(items) {
                if !item.is_null() {
                    out.insert((*key).to_string(), item.clone());
                }
            }
            Ok(out)
        }
        other => Err(RefdocError::Decode(format!(
            "invalid {} structure: {}",
            kind.label(),
            other
        ))),
    }
}

fn check_arity(kind: EntityKind, found: usize, raw: &Value) -> Result<()> {
    let expected = kind.schema().len();
    if found != expected {
        tracing::error!(
            "Schema mismatch decoding {}: expected {} fields, found {}",
            kind.label(),
            expected,
            found
        );
        return Err(RefdocError::SchemaMismatch {
            kind: kind.label(),
            expected,
            found,
            raw: raw.to_string(),
        });
    }
    Ok(())
}

/// Decodes and converts into the typed record in one step.
pub fn decode<T: DeserializeOwned>(kind: EntityKind, raw: &Value) -> Result<T> {
    let map = decode_record(kind, raw)?;
    serde_json::from_value(Value::Object(map)).map_err(|e| {
        RefdocError::Decode(format!("invalid {} record {}: {}", kind.label(), raw, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AnnotationRecord, AnnotationText, ConstructorRecord, FieldRecord, MethodRecord,
        ParameterRecord, TypeRef,
    };
    use serde_json::json;

    #[test]
    fn test_decode_method_string() {
        let method: MethodRecord = decode(EntityKind::Method, &json!("4,1,9,,[0|1],,[12]")).unwrap();
        assert_eq!(method.name, Some(4));
        assert_eq!(method.modifiers, 1);
        assert_eq!(method.return_type, TypeRef::new(9));
        assert!(method.annotations.is_empty());
        assert_eq!(method.parameters, vec![0, 1]);
        assert!(method.type_variables.is_empty());
        assert_eq!(method.exceptions, vec![TypeRef::new(12)]);
    }

    #[test]
    fn test_decode_constructor_string() {
        let ctor: ConstructorRecord =
            decode(EntityKind::Constructor, &json!("1,,,,[3]")).unwrap();
        assert_eq!(ctor.modifiers, 1);
        assert_eq!(ctor.parameters, vec![3]);
    }

    #[test]
    fn test_parameter_modifiers_default_to_zero() {
        let param: ParameterRecord = decode(EntityKind::Parameter, &json!("2,5,,")).unwrap();
        assert_eq!(param.modifiers, 0);
        assert_eq!(param.ty, TypeRef::new(5));
    }

    #[test]
    fn test_field_without_name() {
        let field: FieldRecord = decode(EntityKind::Field, &json!(",7,2,")).unwrap();
        assert_eq!(field.name, None);
        assert_eq!(field.ty, TypeRef::new(7));
    }

    #[test]
    fn test_array_type_in_encoded_field() {
        let field: FieldRecord = decode(EntityKind::Field, &json!("1,[7|2],1,")).unwrap();
        assert_eq!(field.ty, TypeRef::array(7, 2));
    }

    #[test]
    fn test_objects_pass_through() {
        let field: FieldRecord =
            decode(EntityKind::Field, &json!({"n": 1, "t": 2, "M": 8})).unwrap();
        assert_eq!(field.name, Some(1));
        assert_eq!(field.modifiers, 8);
    }

    #[test]
    fn test_positional_arrays() {
        let ann: AnnotationRecord =
            decode(EntityKind::Annotation, &json!([3, "value = \"x\""])).unwrap();
        assert_eq!(ann.ty, TypeRef::new(3));
        assert_eq!(
            ann.text,
            Some(AnnotationText::Literal("value = \"x\"".to_string()))
        );
    }

    #[test]
    fn test_field_count_mismatch_is_fatal() {
        let err = decode::<MethodRecord>(EntityKind::Method, &json!("4,1,9")).unwrap_err();
        match err {
            RefdocError::SchemaMismatch {
                kind,
                expected,
                found,
                ..
            } => {
                assert_eq!(kind, "method");
                assert_eq!(expected, 7);
                assert_eq!(found, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_record_value_is_rejected() {
        assert!(matches!(
            decode_record(EntityKind::Field, &json!(12)),
            Err(RefdocError::Decode(_))
        ));
    }
}

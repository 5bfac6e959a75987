use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A directed relation between two types in the relationship graph.
///
/// Kinds come in inverse pairs: inserting `A -[k]-> B` always inserts
/// `B -[k.inverse()]-> A` as well.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationKind {
    Inherits,
    InheritedBy,
    SuperClass,
    Subclass,
    References,
    ReferencedBy,
    FieldType,
    FieldTypeOf,
    MethodReturnType,
    MethodReturnTypeOf,
    ParameterType,
    ParameterTypeOf,
    ConstructorParameterType,
    ConstructorParameterTypeOf,
    MethodParameterType,
    MethodParameterTypeOf,
    TypeVariableOf,
    ComponentOf,
    DeclaringClass,
    DeclaresClass,
    EnclosingClass,
    EnclosesClass,
    RawType,
    ParameterizedVariant,
    OwnerType,
    OwnedType,
    LowerBound,
    LowerBoundOf,
    UpperBound,
    UpperBoundOf,
    TypeVariableBounds,
    BoundedWithin,
}

impl RelationKind {
    pub const ALL: [RelationKind; 32] = [
        RelationKind::Inherits,
        RelationKind::InheritedBy,
        RelationKind::SuperClass,
        RelationKind::Subclass,
        RelationKind::References,
        RelationKind::ReferencedBy,
        RelationKind::FieldType,
        RelationKind::FieldTypeOf,
        RelationKind::MethodReturnType,
        RelationKind::MethodReturnTypeOf,
        RelationKind::ParameterType,
        RelationKind::ParameterTypeOf,
        RelationKind::ConstructorParameterType,
        RelationKind::ConstructorParameterTypeOf,
        RelationKind::MethodParameterType,
        RelationKind::MethodParameterTypeOf,
        RelationKind::TypeVariableOf,
        RelationKind::ComponentOf,
        RelationKind::DeclaringClass,
        RelationKind::DeclaresClass,
        RelationKind::EnclosingClass,
        RelationKind::EnclosesClass,
        RelationKind::RawType,
        RelationKind::ParameterizedVariant,
        RelationKind::OwnerType,
        RelationKind::OwnedType,
        RelationKind::LowerBound,
        RelationKind::LowerBoundOf,
        RelationKind::UpperBound,
        RelationKind::UpperBoundOf,
        RelationKind::TypeVariableBounds,
        RelationKind::BoundedWithin,
    ];

    pub fn inverse(self) -> RelationKind {
        use RelationKind::*;
        match self {
            Inherits => InheritedBy,
            InheritedBy => Inherits,
            SuperClass => Subclass,
            Subclass => SuperClass,
            References => ReferencedBy,
            ReferencedBy => References,
            FieldType => FieldTypeOf,
            FieldTypeOf => FieldType,
            MethodReturnType => MethodReturnTypeOf,
            MethodReturnTypeOf => MethodReturnType,
            ParameterType => ParameterTypeOf,
            ParameterTypeOf => ParameterType,
            ConstructorParameterType => ConstructorParameterTypeOf,
            ConstructorParameterTypeOf => ConstructorParameterType,
            MethodParameterType => MethodParameterTypeOf,
            MethodParameterTypeOf => MethodParameterType,
            TypeVariableOf => ComponentOf,
            ComponentOf => TypeVariableOf,
            DeclaringClass => DeclaresClass,
            DeclaresClass => DeclaringClass,
            EnclosingClass => EnclosesClass,
            EnclosesClass => EnclosingClass,
            RawType => ParameterizedVariant,
            ParameterizedVariant => RawType,
            OwnerType => OwnedType,
            OwnedType => OwnerType,
            LowerBound => LowerBoundOf,
            LowerBoundOf => LowerBound,
            UpperBound => UpperBoundOf,
            UpperBoundOf => UpperBound,
            TypeVariableBounds => BoundedWithin,
            BoundedWithin => TypeVariableBounds,
        }
    }

    /// Name used as the top-level key of the serialized graph.
    pub fn wire_name(self) -> &'static str {
        use RelationKind::*;
        match self {
            Inherits => "INHERITS",
            InheritedBy => "INHERITED_BY",
            SuperClass => "SUPER_CLASS",
            Subclass => "SUBCLASS",
            References => "REFERENCES",
            ReferencedBy => "REFERENCED_BY",
            FieldType => "FIELD_TYPE",
            FieldTypeOf => "FIELD_TYPE_OF",
            MethodReturnType => "METHOD_RETURN_TYPE",
            MethodReturnTypeOf => "METHOD_RETURN_TYPE_OF",
            ParameterType => "PARAMETER_TYPE",
            ParameterTypeOf => "PARAMETER_TYPE_OF",
            ConstructorParameterType => "CONSTRUCTOR_PARAMETER_TYPE",
            ConstructorParameterTypeOf => "CONSTRUCTOR_PARAMETER_TYPE_OF",
            MethodParameterType => "METHOD_PARAMETER_TYPE",
            MethodParameterTypeOf => "METHOD_PARAMETER_TYPE_OF",
            TypeVariableOf => "TYPE_VARIABLE_OF",
            ComponentOf => "COMPONENT_OF",
            DeclaringClass => "DECLARING_CLASS",
            DeclaresClass => "DECLARES_CLASS",
            EnclosingClass => "ENCLOSING_CLASS",
            EnclosesClass => "ENCLOSES_CLASS",
            RawType => "RAW_TYPE",
            ParameterizedVariant => "PARAMETERIZED_VARIANT",
            OwnerType => "OWNER_TYPE",
            OwnedType => "OWNED_TYPE",
            LowerBound => "LOWER_BOUND",
            LowerBoundOf => "LOWER_BOUND_OF",
            UpperBound => "UPPER_BOUND",
            UpperBoundOf => "UPPER_BOUND_OF",
            TypeVariableBounds => "TYPE_VARIABLE_BOUNDS",
            BoundedWithin => "BOUNDED_WITHIN",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for RelationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        RelationKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.wire_name() == normalized)
            .ok_or_else(|| format!("unknown relation kind: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_is_involution() {
        for kind in RelationKind::ALL {
            assert_ne!(kind, kind.inverse(), "{} is its own inverse", kind);
            assert_eq!(kind, kind.inverse().inverse());
        }
    }

    #[test]
    fn test_wire_names_round_trip() {
        for kind in RelationKind::ALL {
            assert_eq!(kind.wire_name().parse::<RelationKind>().unwrap(), kind);
        }
        assert_eq!(
            "inherited-by".parse::<RelationKind>().unwrap(),
            RelationKind::InheritedBy
        );
        assert!("SIDEWAYS".parse::<RelationKind>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_names() {
        for kind in RelationKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.wire_name()));
        }
    }
}

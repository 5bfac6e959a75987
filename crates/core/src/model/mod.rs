pub mod ids;
pub mod records;

pub use ids::{TypeId, TypeRef};
pub use records::{
    AnnotationRecord, AnnotationText, Binding, ClassMembers, ClassRecord, ConstructorRecord,
    FieldRecord, MethodRecord, ParameterRecord, ParameterizedRecord, TypeData,
    TypeVariableRecord, WildcardRecord,
};

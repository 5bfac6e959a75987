//! Fields, methods, constructors and parameters of a class.
//!
//! Every member carries a back-reference to the raw class that declares it
//! plus its index in that class's member list. Members listed through a
//! subclass also carry the subclass's type-variable map, so an inherited
//! `T value` from `Box<T>` reads as `Integer value` on `IntBox`.

use super::{JavaType, TypeSystem};
use crate::error::Result;
use crate::model::{
    ConstructorRecord, FieldRecord, MethodRecord, ParameterRecord, TypeId, TypeRef,
};
use crate::render::NameOptions;
use crate::substitution::TypeVariableMap;
use refdoc_api::Modifiers;
use std::sync::Arc;

/// Follows the map one step for a type variable, keeping array depth.
fn resolve(map: &TypeVariableMap, r: TypeRef) -> TypeRef {
    match map.get(&r.id) {
        Some(target) => target.deepen(r.depth),
        None => r,
    }
}

fn optional_name<'a>(sys: &'a TypeSystem, id: Option<u32>) -> Result<Option<&'a str>> {
    id.map(|id| sys.tables().name(id)).transpose()
}

/// Where a parameter is declared: the `n`th method or constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterOwner {
    Method(usize),
    Constructor(usize),
}

/// State every member kind shares.
#[derive(Debug, Clone)]
struct MemberContext<'a> {
    sys: &'a TypeSystem,
    declaring_class: TypeId,
    index: usize,
    map: Arc<TypeVariableMap>,
}

impl<'a> MemberContext<'a> {
    fn render(&self, r: TypeRef, options: &NameOptions) -> Result<String> {
        let options = options.with_type_variable_map(Some(self.map.clone()));
        self.sys.render(r, &options)
    }

    fn declaring(&self) -> Result<JavaType<'a>> {
        Ok(self
            .sys
            .get_id(self.declaring_class)?
            .with_type_variable_map(Some(self.map.clone())))
    }
}

#[derive(Debug, Clone)]
pub struct Field<'a> {
    ctx: MemberContext<'a>,
    record: &'a FieldRecord,
}

impl<'a> Field<'a> {
    pub fn declaring_class(&self) -> TypeId {
        self.ctx.declaring_class
    }

    pub fn declaring(&self) -> Result<JavaType<'a>> {
        self.ctx.declaring()
    }

    pub fn index(&self) -> usize {
        self.ctx.index
    }

    pub fn record(&self) -> &'a FieldRecord {
        self.record
    }

    /// `None` when the snapshot carries no name for this field.
    pub fn name(&self) -> Result<Option<&'a str>> {
        optional_name(self.ctx.sys, self.record.name)
    }

    pub fn ty(&self) -> TypeRef {
        resolve(&self.ctx.map, self.record.ty)
    }

    pub fn type_name(&self, options: &NameOptions) -> Result<String> {
        self.ctx.render(self.record.ty, options)
    }

    pub fn modifiers(&self) -> Modifiers {
        Modifiers(self.record.modifiers)
    }

    pub fn annotations(&self) -> &'a [u32] {
        &self.record.annotations
    }

    pub fn type_variable_map(&self) -> &Arc<TypeVariableMap> {
        &self.ctx.map
    }

    pub fn system(&self) -> &'a TypeSystem {
        self.ctx.sys
    }
}

#[derive(Debug, Clone)]
pub struct Method<'a> {
    ctx: MemberContext<'a>,
    record: &'a MethodRecord,
}

impl<'a> Method<'a> {
    pub fn declaring_class(&self) -> TypeId {
        self.ctx.declaring_class
    }

    pub fn declaring(&self) -> Result<JavaType<'a>> {
        self.ctx.declaring()
    }

    pub fn index(&self) -> usize {
        self.ctx.index
    }

    pub fn record(&self) -> &'a MethodRecord {
        self.record
    }

    pub fn name(&self) -> Result<Option<&'a str>> {
        optional_name(self.ctx.sys, self.record.name)
    }

    pub fn return_type(&self) -> TypeRef {
        resolve(&self.ctx.map, self.record.return_type)
    }

    pub fn return_type_name(&self, options: &NameOptions) -> Result<String> {
        self.ctx.render(self.record.return_type, options)
    }

    pub fn modifiers(&self) -> Modifiers {
        Modifiers(self.record.modifiers)
    }

    pub fn annotations(&self) -> &'a [u32] {
        &self.record.annotations
    }

    pub fn type_variables(&self) -> &'a [TypeId] {
        &self.record.type_variables
    }

    pub fn exceptions(&self) -> &'a [TypeRef] {
        &self.record.exceptions
    }

    pub fn parameter_count(&self) -> usize {
        self.record.parameters.len()
    }

    pub fn parameters(&self) -> Result<Vec<Parameter<'a>>> {
        parameters(
            &self.ctx,
            &self.record.parameters,
            ParameterOwner::Method(self.ctx.index),
        )
    }

    pub fn render(&self, r: TypeRef, options: &NameOptions) -> Result<String> {
        self.ctx.render(r, options)
    }

    pub fn system(&self) -> &'a TypeSystem {
        self.ctx.sys
    }
}

#[derive(Debug, Clone)]
pub struct Constructor<'a> {
    ctx: MemberContext<'a>,
    record: &'a ConstructorRecord,
}

impl<'a> Constructor<'a> {
    pub fn declaring_class(&self) -> TypeId {
        self.ctx.declaring_class
    }

    pub fn declaring(&self) -> Result<JavaType<'a>> {
        self.ctx.declaring()
    }

    pub fn index(&self) -> usize {
        self.ctx.index
    }

    pub fn record(&self) -> &'a ConstructorRecord {
        self.record
    }

    pub fn modifiers(&self) -> Modifiers {
        Modifiers(self.record.modifiers)
    }

    pub fn annotations(&self) -> &'a [u32] {
        &self.record.annotations
    }

    pub fn type_variables(&self) -> &'a [TypeId] {
        &self.record.type_variables
    }

    pub fn exceptions(&self) -> &'a [TypeRef] {
        &self.record.exceptions
    }

    pub fn parameter_count(&self) -> usize {
        self.record.parameters.len()
    }

    pub fn parameters(&self) -> Result<Vec<Parameter<'a>>> {
        parameters(
            &self.ctx,
            &self.record.parameters,
            ParameterOwner::Constructor(self.ctx.index),
        )
    }

    pub fn render(&self, r: TypeRef, options: &NameOptions) -> Result<String> {
        self.ctx.render(r, options)
    }

    pub fn system(&self) -> &'a TypeSystem {
        self.ctx.sys
    }
}

#[derive(Debug, Clone)]
pub struct Parameter<'a> {
    ctx: MemberContext<'a>,
    owner: ParameterOwner,
    id: u32,
    record: &'a ParameterRecord,
}

fn parameters<'a>(
    ctx: &MemberContext<'a>,
    ids: &[u32],
    owner: ParameterOwner,
) -> Result<Vec<Parameter<'a>>> {
    ids.iter()
        .enumerate()
        .map(|(index, id)| {
            Ok(Parameter {
                ctx: MemberContext {
                    index,
                    ..ctx.clone()
                },
                owner,
                id: *id,
                record: ctx.sys.tables().parameter(*id)?,
            })
        })
        .collect()
}

impl<'a> Parameter<'a> {
    pub fn declaring_class(&self) -> TypeId {
        self.ctx.declaring_class
    }

    pub fn declaring(&self) -> Result<JavaType<'a>> {
        self.ctx.declaring()
    }

    pub fn owner(&self) -> ParameterOwner {
        self.owner
    }

    /// Position within the owning method or constructor.
    pub fn index(&self) -> usize {
        self.ctx.index
    }

    /// Row in the snapshot's parameter table.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> Result<Option<&'a str>> {
        optional_name(self.ctx.sys, self.record.name)
    }

    pub fn ty(&self) -> TypeRef {
        resolve(&self.ctx.map, self.record.ty)
    }

    pub fn type_name(&self, options: &NameOptions) -> Result<String> {
        self.ctx.render(self.record.ty, options)
    }

    pub fn modifiers(&self) -> Modifiers {
        Modifiers(self.record.modifiers)
    }

    pub fn annotations(&self) -> &'a [u32] {
        &self.record.annotations
    }

    pub fn system(&self) -> &'a TypeSystem {
        self.ctx.sys
    }
}

impl<'a> JavaType<'a> {
    /// Raw classes whose members belong to this type: the class itself, or
    /// the raw type of a parameterized type; with `shallow == false` every
    /// raw class in the inheritance walk.
    fn member_sources(&self, shallow: bool) -> Result<Vec<TypeId>> {
        if shallow {
            return Ok(match (self.is_raw_class(), self.raw_type()) {
                (true, _) => vec![self.id()],
                (false, Some(raw)) => vec![raw.id],
                (false, None) => Vec::new(),
            });
        }
        let inherited = self.sys.all_inherited_classes(self.id())?;
        let tables = self.sys.tables();
        let mut sources = Vec::new();
        for id in inherited.iter() {
            if tables.raw_class(*id)?.is_some() {
                sources.push(*id);
            }
        }
        Ok(sources)
    }

    fn member_context(&self, declaring_class: TypeId, index: usize) -> Result<MemberContext<'a>> {
        Ok(MemberContext {
            sys: self.sys,
            declaring_class,
            index,
            map: self.type_variable_map()?,
        })
    }

    pub fn fields(&self, shallow: bool) -> Result<Vec<Field<'a>>> {
        let mut out = Vec::new();
        for source in self.member_sources(shallow)? {
            let members = self.sys.tables().members(source)?;
            for (index, record) in members.fields.iter().enumerate() {
                out.push(Field {
                    ctx: self.member_context(source, index)?,
                    record,
                });
            }
        }
        Ok(out)
    }

    pub fn methods(&self, shallow: bool) -> Result<Vec<Method<'a>>> {
        let mut out = Vec::new();
        for source in self.member_sources(shallow)? {
            let members = self.sys.tables().members(source)?;
            for (index, record) in members.methods.iter().enumerate() {
                out.push(Method {
                    ctx: self.member_context(source, index)?,
                    record,
                });
            }
        }
        Ok(out)
    }

    /// Constructors are never inherited.
    pub fn constructors(&self) -> Result<Vec<Constructor<'a>>> {
        let mut out = Vec::new();
        for source in self.member_sources(true)? {
            let members = self.sys.tables().members(source)?;
            for (index, record) in members.constructors.iter().enumerate() {
                out.push(Constructor {
                    ctx: self.member_context(source, index)?,
                    record,
                });
            }
        }
        Ok(out)
    }
}

use std::collections::HashMap;

use crate::{lexer::Span, parser::ast::TypeName};

use super::{
    context::Context,
    error::{IllegalGenericUse, IllegalNullableTarget, TypeCheckError, UnresolvedReference},
};

/// The ten numeric storage kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BasicType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl BasicType {
    pub fn from_name(name: &str) -> Option<BasicType> {
        let basic = match name {
            "i8" => BasicType::I8,
            "i16" => BasicType::I16,
            "i32" => BasicType::I32,
            "i64" => BasicType::I64,
            "u8" => BasicType::U8,
            "u16" => BasicType::U16,
            "u32" => BasicType::U32,
            "u64" => BasicType::U64,
            "f32" => BasicType::F32,
            "f64" => BasicType::F64,
            _ => return None,
        };
        Some(basic)
    }

    pub fn name(&self) -> &'static str {
        match self {
            BasicType::I8 => "i8",
            BasicType::I16 => "i16",
            BasicType::I32 => "i32",
            BasicType::I64 => "i64",
            BasicType::U8 => "u8",
            BasicType::U16 => "u16",
            BasicType::U32 => "u32",
            BasicType::U64 => "u64",
            BasicType::F32 => "f32",
            BasicType::F64 => "f64",
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, BasicType::F32 | BasicType::F64)
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            BasicType::I8 | BasicType::I16 | BasicType::I32 | BasicType::I64
        )
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            BasicType::U8 | BasicType::U16 | BasicType::U32 | BasicType::U64
        )
    }

    /// Whether a non-negative integer value is storable in this kind.
    pub fn fits_unsigned(&self, value: u64) -> bool {
        match self {
            BasicType::I8 => value <= i8::MAX as u64,
            BasicType::I16 => value <= i16::MAX as u64,
            BasicType::I32 => value <= i32::MAX as u64,
            BasicType::I64 => value <= i64::MAX as u64,
            BasicType::U8 => value <= u8::MAX as u64,
            BasicType::U16 => value <= u16::MAX as u64,
            BasicType::U32 => value <= u32::MAX as u64,
            BasicType::U64 => true,
            BasicType::F32 | BasicType::F64 => true,
        }
    }

    /// Whether a negative integer value is storable in this kind.
    /// Unsigned kinds reject every negative value.
    pub fn fits_negative(&self, value: i64) -> bool {
        match self {
            BasicType::I8 => value >= i8::MIN as i64,
            BasicType::I16 => value >= i16::MIN as i64,
            BasicType::I32 => value >= i32::MIN as i64,
            BasicType::I64 => true,
            _ => false,
        }
    }

    pub fn fits_float(&self, value: f64) -> bool {
        match self {
            BasicType::F32 => value.abs() <= f32::MAX as f64,
            BasicType::F64 => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StructType {
    pub fields: Vec<(String, Type)>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EnumValue {
    Int(i64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EnumMember {
    pub name: String,
    pub value: Option<EnumValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EnumType {
    pub name: String,
    pub target: Option<BasicType>,
    pub members: Vec<EnumMember>,
}

impl EnumType {
    pub fn is_string_enum(&self) -> bool {
        self.members
            .iter()
            .any(|m| matches!(m.value, Some(EnumValue::Str(_))))
    }

    pub fn member(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn has_string_member(&self, value: &str) -> bool {
        self.members
            .iter()
            .any(|m| matches!(&m.value, Some(EnumValue::Str(v)) if v == value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VariantConstructorType {
    pub name: String,
    pub parameters: Vec<(String, Type)>,
    /// Name of the enclosing variant; always set.
    pub parent: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VariantType {
    pub name: String,
    pub constructors: Vec<VariantConstructorType>,
}

impl VariantType {
    pub fn constructor(&self, name: &str) -> Option<&VariantConstructorType> {
        self.constructors.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ClassAttribute {
    pub name: String,
    pub ty: Type,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ClassMethod {
    pub name: String,
    /// Always a `Type::Function`.
    pub ty: Type,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ClassType {
    pub name: String,
    pub supertypes: Vec<Type>,
    pub attributes: Vec<ClassAttribute>,
    pub methods: Vec<ClassMethod>,
}

impl ClassType {
    pub fn attribute(&self, name: &str) -> Option<&ClassAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&ClassMethod> {
        self.methods.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InterfaceMethod {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InterfaceType {
    pub name: String,
    pub supertypes: Vec<Type>,
    pub methods: Vec<InterfaceMethod>,
}

/// A spawned class: same member surface, process identity.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProcessType {
    pub name: String,
    pub attributes: Vec<ClassAttribute>,
    pub methods: Vec<ClassMethod>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FunctionParamType {
    pub name: String,
    pub ty: Type,
    pub mutable: bool,
}

impl FunctionParamType {
    pub fn unnamed(ty: Type) -> FunctionParamType {
        FunctionParamType {
            name: String::new(),
            ty,
            mutable: false,
        }
    }

    pub fn named(name: impl ToString, ty: Type) -> FunctionParamType {
        FunctionParamType {
            name: name.to_string(),
            ty,
            mutable: false,
        }
    }
}

/// An unresolved by-name reference to a declared type. References are the
/// cycle breaker: class and interface bodies store member types as
/// references which [`Type::deref`] resolves through the declaration
/// registry, instantiating generic declarations on demand.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReferenceType {
    pub path: Vec<String>,
    pub type_args: Vec<Type>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MetaKind {
    Class,
    Interface,
    Enum,
    Variant,
}

/// Canonical semantic type representation. A closed lattice: every type in
/// the language is exactly one of these nodes.
#[derive(Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Type {
    /// Placeholder before resolution / during inference.
    Unset,
    Basic(BasicType),
    Boolean,
    Void,
    Null,
    /// May hold a value of the inner type or null. The inner type is never
    /// `Nullable` or `Null`.
    Nullable(Box<Type>),
    Array(Box<Type>),
    /// Structural record; equality is by name + type set.
    Struct(StructType),
    Enum(EnumType),
    Variant(VariantType),
    VariantConstructor(Box<VariantConstructorType>),
    Class(Box<ClassType>),
    Interface(Box<InterfaceType>),
    Process(Box<ProcessType>),
    Function {
        params: Vec<FunctionParamType>,
        return_value: Box<Type>,
    },
    Union(Box<Type>, Box<Type>),
    Join(Box<Type>, Box<Type>),
    Reference(ReferenceType),
    Generic {
        name: String,
        constraint: Option<Box<Type>>,
    },
    FfiNamespace(String),
    /// The type of an expression that *names* a type (the class itself, not
    /// an instance); left side of static access and constructor selection.
    Meta(MetaKind, Box<Type>),
}

impl std::fmt::Debug for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.shortname())
    }
}

impl Type {
    /// Follow reference chains through the declaration registry,
    /// instantiating generic declarations as needed. Non-references come
    /// back unchanged.
    pub fn deref(&self, ctx: &Context) -> Result<Type, TypeCheckError> {
        let mut current = self.clone();
        loop {
            match current {
                Type::Reference(ReferenceType { path, type_args }) => {
                    let name = path.last().cloned().unwrap_or_default();
                    let Some(declared) = ctx.scope.get_declared_type(&name) else {
                        return Err(TypeCheckError::UnresolvedReference(
                            UnresolvedReference {
                                name: path.join("."),
                            },
                            Span::default(),
                        ));
                    };
                    current = declared.instantiate(&type_args, ctx, &Span::default())?;
                }
                other => return Ok(other),
            }
        }
    }

    /// Stable identity string; two types are the same type iff their
    /// serialized forms are equal.
    pub fn serialize(&self) -> String {
        match self {
            Type::Unset => "unset".into(),
            Type::Basic(basic) => basic.name().into(),
            Type::Boolean => "bool".into(),
            Type::Void => "void".into(),
            Type::Null => "null".into(),
            Type::Nullable(inner) => format!("nullable({})", inner.serialize()),
            Type::Array(inner) => format!("array({})", inner.serialize()),
            Type::Struct(StructType { fields }) => {
                let fields = fields
                    .iter()
                    .map(|(name, ty)| format!("{name}:{}", ty.serialize()))
                    .collect::<Vec<_>>()
                    .join(",");
                format!("struct({fields})")
            }
            Type::Enum(e) => format!("enum({})", e.name),
            Type::Variant(v) => {
                let constructors = v
                    .constructors
                    .iter()
                    .map(|c| {
                        let params = c
                            .parameters
                            .iter()
                            .map(|(name, ty)| format!("{name}:{}", ty.serialize()))
                            .collect::<Vec<_>>()
                            .join(",");
                        format!("{}({params})", c.name)
                    })
                    .collect::<Vec<_>>()
                    .join(",");
                format!("variant({},{constructors})", v.name)
            }
            Type::VariantConstructor(c) => {
                let params = c
                    .parameters
                    .iter()
                    .map(|(name, ty)| format!("{name}:{}", ty.serialize()))
                    .collect::<Vec<_>>()
                    .join(",");
                format!("constructor({}.{}({params}))", c.parent, c.name)
            }
            Type::Class(class) => {
                let attributes = class
                    .attributes
                    .iter()
                    .map(|a| format!("{}:{}", a.name, a.ty.serialize()))
                    .collect::<Vec<_>>()
                    .join(",");
                let methods = class
                    .methods
                    .iter()
                    .map(|m| format!("{}:{}", m.name, m.ty.serialize()))
                    .collect::<Vec<_>>()
                    .join(",");
                format!("class({}|{attributes}|{methods})", class.name)
            }
            Type::Interface(interface) => {
                let methods = interface
                    .methods
                    .iter()
                    .map(|m| format!("{}:{}", m.name, m.ty.serialize()))
                    .collect::<Vec<_>>()
                    .join(",");
                format!("interface({}|{methods})", interface.name)
            }
            Type::Process(process) => format!("process({})", process.name),
            Type::Function {
                params,
                return_value,
            } => {
                let params = params
                    .iter()
                    .map(|p| p.ty.serialize())
                    .collect::<Vec<_>>()
                    .join(",");
                format!("fn({params})->{}", return_value.serialize())
            }
            Type::Union(lhs, rhs) => format!("union({},{})", lhs.serialize(), rhs.serialize()),
            Type::Join(lhs, rhs) => format!("join({},{})", lhs.serialize(), rhs.serialize()),
            Type::Reference(ReferenceType { path, type_args }) => {
                let args = type_args
                    .iter()
                    .map(|a| a.serialize())
                    .collect::<Vec<_>>()
                    .join(",");
                format!("ref({}<{args}>)", path.join("."))
            }
            Type::Generic { name, .. } => format!("generic({name})"),
            Type::FfiNamespace(name) => format!("ffi({name})"),
            Type::Meta(kind, inner) => {
                let kind = match kind {
                    MetaKind::Class => "class",
                    MetaKind::Interface => "interface",
                    MetaKind::Enum => "enum",
                    MetaKind::Variant => "variant",
                };
                format!("meta({kind},{})", inner.serialize())
            }
        }
    }

    /// Human readable name for diagnostics.
    pub fn shortname(&self) -> String {
        match self {
            Type::Unset => "unset".into(),
            Type::Basic(basic) => basic.name().into(),
            Type::Boolean => "bool".into(),
            Type::Void => "void".into(),
            Type::Null => "null".into(),
            Type::Nullable(inner) => format!("{}?", inner.shortname()),
            Type::Array(inner) => format!("{}[]", inner.shortname()),
            Type::Struct(StructType { fields }) => {
                let fields = fields
                    .iter()
                    .map(|(name, ty)| format!("{name}: {}", ty.shortname()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{ {fields} }}")
            }
            Type::Enum(e) => e.name.clone(),
            Type::Variant(v) => v.name.clone(),
            Type::VariantConstructor(c) => format!("{}.{}", c.parent, c.name),
            Type::Class(class) => class.name.clone(),
            Type::Interface(interface) => interface.name.clone(),
            Type::Process(process) => format!("process {}", process.name),
            Type::Function {
                params,
                return_value,
            } => {
                let params = params
                    .iter()
                    .map(|p| p.ty.shortname())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("fn({params}) -> {}", return_value.shortname())
            }
            Type::Union(lhs, rhs) => format!("{} | {}", lhs.shortname(), rhs.shortname()),
            Type::Join(lhs, rhs) => format!("{} & {}", lhs.shortname(), rhs.shortname()),
            Type::Reference(ReferenceType { path, type_args }) => {
                let mut out = path.join(".");
                if !type_args.is_empty() {
                    let args = type_args
                        .iter()
                        .map(|a| a.shortname())
                        .collect::<Vec<_>>()
                        .join(", ");
                    out = format!("{out}<{args}>");
                }
                out
            }
            Type::Generic { name, .. } => name.clone(),
            Type::FfiNamespace(name) => format!("namespace {name}"),
            Type::Meta(_, inner) => format!("type {}", inner.shortname()),
        }
    }

    /// Clone with `Generic -> concrete` substitution. The receiver is never
    /// mutated; generic templates stay pristine.
    pub fn substitute(&self, map: &HashMap<String, Type>) -> Type {
        match self {
            Type::Generic { name, .. } => match map.get(name) {
                Some(concrete) => concrete.clone(),
                None => self.clone(),
            },
            Type::Nullable(inner) => Type::Nullable(Box::new(inner.substitute(map))),
            Type::Array(inner) => Type::Array(Box::new(inner.substitute(map))),
            Type::Struct(StructType { fields }) => Type::Struct(StructType {
                fields: fields
                    .iter()
                    .map(|(name, ty)| (name.clone(), ty.substitute(map)))
                    .collect(),
            }),
            Type::Variant(v) => Type::Variant(VariantType {
                name: v.name.clone(),
                constructors: v
                    .constructors
                    .iter()
                    .map(|c| VariantConstructorType {
                        name: c.name.clone(),
                        parameters: c
                            .parameters
                            .iter()
                            .map(|(name, ty)| (name.clone(), ty.substitute(map)))
                            .collect(),
                        parent: c.parent.clone(),
                    })
                    .collect(),
            }),
            Type::VariantConstructor(c) => {
                Type::VariantConstructor(Box::new(VariantConstructorType {
                    name: c.name.clone(),
                    parameters: c
                        .parameters
                        .iter()
                        .map(|(name, ty)| (name.clone(), ty.substitute(map)))
                        .collect(),
                    parent: c.parent.clone(),
                }))
            }
            Type::Class(class) => Type::Class(Box::new(ClassType {
                name: class.name.clone(),
                supertypes: class
                    .supertypes
                    .iter()
                    .map(|s| s.substitute(map))
                    .collect(),
                attributes: class
                    .attributes
                    .iter()
                    .map(|a| ClassAttribute {
                        name: a.name.clone(),
                        ty: a.ty.substitute(map),
                        is_static: a.is_static,
                    })
                    .collect(),
                methods: class
                    .methods
                    .iter()
                    .map(|m| ClassMethod {
                        name: m.name.clone(),
                        ty: m.ty.substitute(map),
                        is_static: m.is_static,
                    })
                    .collect(),
            })),
            Type::Interface(interface) => Type::Interface(Box::new(InterfaceType {
                name: interface.name.clone(),
                supertypes: interface
                    .supertypes
                    .iter()
                    .map(|s| s.substitute(map))
                    .collect(),
                methods: interface
                    .methods
                    .iter()
                    .map(|m| InterfaceMethod {
                        name: m.name.clone(),
                        ty: m.ty.substitute(map),
                    })
                    .collect(),
            })),
            Type::Process(process) => Type::Process(Box::new(ProcessType {
                name: process.name.clone(),
                attributes: process
                    .attributes
                    .iter()
                    .map(|a| ClassAttribute {
                        name: a.name.clone(),
                        ty: a.ty.substitute(map),
                        is_static: a.is_static,
                    })
                    .collect(),
                methods: process
                    .methods
                    .iter()
                    .map(|m| ClassMethod {
                        name: m.name.clone(),
                        ty: m.ty.substitute(map),
                        is_static: m.is_static,
                    })
                    .collect(),
            })),
            Type::Function {
                params,
                return_value,
            } => Type::Function {
                params: params
                    .iter()
                    .map(|p| FunctionParamType {
                        name: p.name.clone(),
                        ty: p.ty.substitute(map),
                        mutable: p.mutable,
                    })
                    .collect(),
                return_value: Box::new(return_value.substitute(map)),
            },
            Type::Union(lhs, rhs) => Type::Union(
                Box::new(lhs.substitute(map)),
                Box::new(rhs.substitute(map)),
            ),
            Type::Join(lhs, rhs) => Type::Join(
                Box::new(lhs.substitute(map)),
                Box::new(rhs.substitute(map)),
            ),
            Type::Reference(ReferenceType { path, type_args }) => Type::Reference(ReferenceType {
                path: path.clone(),
                type_args: type_args.iter().map(|a| a.substitute(map)).collect(),
            }),
            Type::Meta(kind, inner) => Type::Meta(*kind, Box::new(inner.substitute(map))),
            other => other.clone(),
        }
    }

    /// Whether this type may be wrapped in `Nullable`. Basic numerics,
    /// void, null, enums and the remaining special forms may not.
    pub fn allowed_nullable(&self) -> bool {
        matches!(
            self,
            Type::Class(_)
                | Type::Struct(_)
                | Type::Interface(_)
                | Type::Variant(_)
                | Type::VariantConstructor(_)
                | Type::Function { .. }
                | Type::Process(_)
                | Type::Reference(_)
                | Type::Generic { .. }
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Basic(_))
    }

    pub fn to_class(&self) -> Option<&ClassType> {
        match self {
            Type::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn to_interface(&self) -> Option<&InterfaceType> {
        match self {
            Type::Interface(interface) => Some(interface),
            _ => None,
        }
    }

    pub fn to_variant(&self) -> Option<&VariantType> {
        match self {
            Type::Variant(variant) => Some(variant),
            _ => None,
        }
    }

    pub fn to_enum(&self) -> Option<&EnumType> {
        match self {
            Type::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Wrap into `Nullable`. `Nullable(Nullable(T))` and `Nullable(Null)`
    /// are ill-formed.
    pub fn make_nullable(inner: Type, position: &Span) -> Result<Type, TypeCheckError> {
        if matches!(inner, Type::Nullable(_) | Type::Null) {
            return Err(TypeCheckError::IllegalNullableTarget(
                IllegalNullableTarget {
                    target: inner.clone(),
                },
                position.clone(),
            ));
        }
        Ok(Type::Nullable(Box::new(inner)))
    }

    /// Wrap a type that was not declared nullable, as `?.` access and safe
    /// casts do. Unlike a declared `T?`, on-the-fly wrapping is restricted
    /// to the kinds that admit a null sentinel.
    pub fn wrap_nullable(inner: Type, position: &Span) -> Result<Type, TypeCheckError> {
        if !inner.allowed_nullable() {
            return Err(TypeCheckError::IllegalNullableTarget(
                IllegalNullableTarget {
                    target: inner.clone(),
                },
                position.clone(),
            ));
        }
        Type::make_nullable(inner, position)
    }
}

/// Convert a parsed `TypeName` plus current context into a semantic type.
/// User declared names become `Reference` nodes (resolved lazily through
/// the registry); generic parameters in scope come back as `Generic`.
impl TryFrom<(&TypeName, &Context)> for Type {
    type Error = TypeCheckError;

    fn try_from((value, ctx): (&TypeName, &Context)) -> Result<Self, Self::Error> {
        match value {
            TypeName::Named {
                path,
                type_args,
                position,
            } => {
                if path.len() == 1 && type_args.is_empty() {
                    match path[0].as_str() {
                        "bool" => return Ok(Type::Boolean),
                        "void" => return Ok(Type::Void),
                        name => {
                            if let Some(basic) = BasicType::from_name(name) {
                                return Ok(Type::Basic(basic));
                            }
                        }
                    }
                }

                let name = path.last().cloned().unwrap_or_default();

                // A qualified path may select a variant constructor
                // (`Opt.Some`); the enclosing variant resolves first.
                if path.len() >= 2 && type_args.is_empty() {
                    let parent = &path[path.len() - 2];
                    if let Some(declared) = ctx.scope.get_declared_type(parent) {
                        if let Type::Variant(variant) = &declared.ty {
                            if let Some(constructor) = variant.constructor(&name) {
                                return Ok(Type::VariantConstructor(Box::new(
                                    constructor.clone(),
                                )));
                            }
                        }
                    }
                }

                let Some(declared) = ctx.scope.get_declared_type(&name) else {
                    return Err(TypeCheckError::UnresolvedReference(
                        UnresolvedReference {
                            name: path.join("."),
                        },
                        position.clone(),
                    ));
                };

                // Generic parameters in scope resolve directly so that
                // substitution finds them.
                if let Type::Generic { .. } = &declared.ty {
                    return Ok(declared.ty.clone());
                }

                if !type_args.is_empty()
                    && matches!(&declared.ty, Type::Enum(_) | Type::Interface(_))
                {
                    return Err(TypeCheckError::IllegalGenericUse(
                        IllegalGenericUse { name },
                        position.clone(),
                    ));
                }

                let mut args = vec![];
                for arg in type_args {
                    args.push(Type::try_from((arg, ctx))?);
                }

                declared.check_arity(args.len(), position)?;

                Ok(Type::Reference(ReferenceType {
                    path: path.clone(),
                    type_args: args,
                }))
            }
            TypeName::Nullable(inner, position) => {
                let inner = Type::try_from((inner.as_ref(), ctx))?;
                Type::make_nullable(inner, position)
            }
            TypeName::Array(inner, _) => Ok(Type::Array(Box::new(Type::try_from((
                inner.as_ref(),
                ctx,
            ))?))),
            TypeName::Function {
                params,
                return_type,
                ..
            } => {
                let mut converted = vec![];
                for param in params {
                    converted.push(FunctionParamType::unnamed(Type::try_from((param, ctx))?));
                }

                Ok(Type::Function {
                    params: converted,
                    return_value: Box::new(Type::try_from((return_type.as_ref(), ctx))?),
                })
            }
            TypeName::Struct { fields, .. } => {
                let mut converted = vec![];
                for (name, ty) in fields {
                    converted.push((name.clone(), Type::try_from((ty, ctx))?));
                }

                Ok(Type::Struct(StructType { fields: converted }))
            }
            TypeName::Union(lhs, rhs, _) => Ok(Type::Union(
                Box::new(Type::try_from((lhs.as_ref(), ctx))?),
                Box::new(Type::try_from((rhs.as_ref(), ctx))?),
            )),
            TypeName::Join(lhs, rhs, _) => Ok(Type::Join(
                Box::new(Type::try_from((lhs.as_ref(), ctx))?),
                Box::new(Type::try_from((rhs.as_ref(), ctx))?),
            )),
        }
    }
}

//! Type and member symbols.

use javelin_core::{DataType, Flags, QualifiedName, TypeHash};

/// What kind of type a [`TypeSymbol`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

impl TypeKind {
    /// Flags every symbol of this kind carries.
    pub fn implied_flags(self) -> Flags {
        match self {
            TypeKind::Class => Flags::empty(),
            TypeKind::Interface => Flags::INTERFACE | Flags::ABSTRACT,
            TypeKind::Enum => Flags::ENUM,
            TypeKind::Annotation => Flags::INTERFACE | Flags::ANNOTATION | Flags::ABSTRACT,
        }
    }
}

/// A registered type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSymbol {
    pub name: QualifiedName,
    pub type_hash: TypeHash,
    pub kind: TypeKind,
    /// Declared modifiers plus [`TypeKind::implied_flags`].
    pub flags: Flags,
    /// Names of the type's own type parameters.
    pub type_params: Vec<String>,
    pub superclass: Option<TypeHash>,
    pub interfaces: Vec<TypeHash>,
    /// Members in declaration order.
    pub members: Vec<MemberSymbol>,
    /// Enclosing type of a member type.
    pub outer: Option<TypeHash>,
}

impl TypeSymbol {
    pub fn new(name: QualifiedName, kind: TypeKind, flags: Flags) -> Self {
        Self {
            type_hash: name.to_type_hash(),
            name,
            kind,
            flags: flags | kind.implied_flags(),
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            outer: None,
        }
    }

    pub fn with_superclass(mut self, superclass: TypeHash) -> Self {
        self.superclass = Some(superclass);
        self
    }

    pub fn with_interface(mut self, interface: TypeHash) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn with_member(mut self, member: MemberSymbol) -> Self {
        self.members.push(member);
        self
    }

    /// Methods in declaration order (constructors excluded).
    pub fn methods(&self) -> impl Iterator<Item = &MethodSymbol> {
        self.members.iter().filter_map(MemberSymbol::as_method)
    }

    pub fn constructors(&self) -> impl Iterator<Item = &MethodSymbol> {
        self.members.iter().filter_map(|m| match m {
            MemberSymbol::Constructor(ctor) => Some(ctor),
            _ => None,
        })
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSymbol> {
        self.members.iter().filter_map(|m| match m {
            MemberSymbol::Field(field) => Some(field),
            _ => None,
        })
    }

    /// A field declared directly on this type.
    pub fn field(&self, name: &str) -> Option<&FieldSymbol> {
        self.fields().find(|f| f.name == name)
    }

    pub fn is_interface(&self) -> bool {
        self.flags.contains(Flags::INTERFACE)
    }
}

/// One entry in a type's member list.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberSymbol {
    Method(MethodSymbol),
    Constructor(MethodSymbol),
    Field(FieldSymbol),
    /// A `static { }` or instance initializer block.
    Initializer { is_static: bool },
}

impl MemberSymbol {
    pub fn as_method(&self) -> Option<&MethodSymbol> {
        match self {
            MemberSymbol::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            MemberSymbol::Method(m) | MemberSymbol::Constructor(m) => &m.name,
            MemberSymbol::Field(f) => &f.name,
            MemberSymbol::Initializer { .. } => "",
        }
    }

    pub fn flags(&self) -> Flags {
        match self {
            MemberSymbol::Method(m) | MemberSymbol::Constructor(m) => m.flags,
            MemberSymbol::Field(f) => f.flags,
            MemberSymbol::Initializer { is_static: true } => Flags::STATIC,
            MemberSymbol::Initializer { is_static: false } => Flags::empty(),
        }
    }
}

/// Parameter and return types of a method, erased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodType {
    pub params: Vec<DataType>,
    pub return_type: DataType,
    /// Last parameter is `T...`.
    pub varargs: bool,
}

impl MethodType {
    pub fn new(params: Vec<DataType>, return_type: DataType) -> Self {
        Self {
            params,
            return_type,
            varargs: false,
        }
    }

    pub fn with_varargs(mut self, varargs: bool) -> Self {
        self.varargs = varargs;
        self
    }

    /// Whether a call with `count` arguments can bind to this signature.
    pub fn accepts_arity(&self, count: usize) -> bool {
        if self.varargs {
            count + 1 >= self.params.len()
        } else {
            count == self.params.len()
        }
    }
}

/// The type of a method symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SymbolType {
    /// A plain method type.
    Method(MethodType),
    /// A generic method: `<T> R m(..)`, quantified over its own type parameters.
    ForAll {
        type_params: Vec<String>,
        inner: MethodType,
    },
}

impl SymbolType {
    /// The underlying signature, generic or not.
    pub fn signature(&self) -> &MethodType {
        match self {
            SymbolType::Method(ty) => ty,
            SymbolType::ForAll { inner, .. } => inner,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodSymbol {
    pub name: String,
    pub owner: TypeHash,
    pub flags: Flags,
    /// Identity of this overload.
    pub hash: TypeHash,
    pub ty: SymbolType,
}

impl MethodSymbol {
    pub fn new(owner: TypeHash, name: impl Into<String>, flags: Flags, ty: SymbolType) -> Self {
        let name = name.into();
        let param_hashes: Vec<TypeHash> = ty
            .signature()
            .params
            .iter()
            .map(|p| TypeHash(p.type_hash.0.wrapping_add(p.dims as u64)))
            .collect();
        Self {
            hash: TypeHash::from_method(owner, &name, &param_hashes),
            name,
            owner,
            flags,
            ty,
        }
    }

    /// The method type if this is a plain (non-generic) method.
    pub fn method_type(&self) -> Option<&MethodType> {
        match &self.ty {
            SymbolType::Method(ty) => Some(ty),
            SymbolType::ForAll { .. } => None,
        }
    }

    pub fn signature(&self) -> &MethodType {
        self.ty.signature()
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(Flags::STATIC)
    }

    pub fn is_public(&self) -> bool {
        self.flags.contains(Flags::PUBLIC)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSymbol {
    pub name: String,
    pub owner: TypeHash,
    pub flags: Flags,
    pub ty: DataType,
}

impl FieldSymbol {
    pub fn new(owner: TypeHash, name: impl Into<String>, flags: Flags, ty: DataType) -> Self {
        Self {
            name: name.into(),
            owner,
            flags,
            ty,
        }
    }
}

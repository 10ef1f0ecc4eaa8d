use std::fmt::Display;

/// Index of a class in the analyzer's class arena.
pub type ClassId = usize;

/// The fixed, pre-declared type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Integer64,
    String,
    Boolean,
    Null,
    Function,
    Class,
    Module,
}

impl Builtin {
    pub const ALL: [Builtin; 7] = [
        Builtin::Integer64,
        Builtin::String,
        Builtin::Boolean,
        Builtin::Null,
        Builtin::Function,
        Builtin::Class,
        Builtin::Module,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Integer64 => "Integer64",
            Builtin::String => "String",
            Builtin::Boolean => "Boolean",
            Builtin::Null => "Null",
            Builtin::Function => "Function",
            Builtin::Class => "Class",
            Builtin::Module => "Module",
        }
    }

    pub fn from_name(name: &str) -> Option<Builtin> {
        Builtin::ALL.into_iter().find(|builtin| builtin.name() == name)
    }
}

impl Display for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A class used as the type of a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassRef {
    pub id: ClassId,
    pub name: String,
}

/// Resolved semantic type of a node.
///
/// Compatibility is decided by `name()` equality, so two types are the same
/// exactly when they print the same.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Integer64,
    String,
    Boolean,
    Null,
    Function,
    Class,
    Module,
    Object(ClassRef),
}

impl Type {
    pub fn name(&self) -> &str {
        match self {
            Type::Integer64 => "Integer64",
            Type::String => "String",
            Type::Boolean => "Boolean",
            Type::Null => "Null",
            Type::Function => "Function",
            Type::Class => "Class",
            Type::Module => "Module",
            Type::Object(class) => &class.name,
        }
    }

    pub fn same_as(&self, other: &Type) -> bool {
        self.name() == other.name()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Type::Null)
    }

    pub fn as_class(&self) -> Option<&ClassRef> {
        match self {
            Type::Object(class) => Some(class),
            _ => None,
        }
    }
}

impl From<Builtin> for Type {
    fn from(builtin: Builtin) -> Self {
        match builtin {
            Builtin::Integer64 => Type::Integer64,
            Builtin::String => Type::String,
            Builtin::Boolean => Type::Boolean,
            Builtin::Null => Type::Null,
            Builtin::Function => Type::Function,
            Builtin::Class => Type::Class,
            Builtin::Module => Type::Module,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

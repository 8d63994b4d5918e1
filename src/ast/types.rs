use std::fmt::Display;

use crate::lexer::tokens::NumSuffix;

/// Static type attached to declarations, literals and operator results.
///
/// `Number`, `Integer`, `Unsigned` and `Float` are ambiguous numeric classes
/// that literal completion later narrows to a concrete width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Unknown,
    Void,
    Bool,
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
    Number,
    Integer,
    Unsigned,
    Float,
}

impl Type {
    /// Parses a type name as written in source.
    pub fn parse(name: &str) -> Option<Type> {
        Some(match name {
            "void" => Type::Void,
            "bool" => Type::Bool,
            "i8" => Type::I8,
            "i16" => Type::I16,
            "i32" => Type::I32,
            "i64" => Type::I64,
            "u8" => Type::U8,
            "u16" => Type::U16,
            "u32" => Type::U32,
            "u64" => Type::U64,
            "f32" => Type::F32,
            "f64" => Type::F64,
            _ => return None,
        })
    }

    pub fn from_suffix(suffix: NumSuffix, is_float: bool) -> Type {
        match suffix {
            NumSuffix::None if is_float => Type::Float,
            NumSuffix::None => Type::Number,
            NumSuffix::I => Type::Integer,
            NumSuffix::U => Type::Unsigned,
            NumSuffix::F => Type::Float,
            NumSuffix::I8 => Type::I8,
            NumSuffix::I16 => Type::I16,
            NumSuffix::I32 => Type::I32,
            NumSuffix::I64 => Type::I64,
            NumSuffix::U8 => Type::U8,
            NumSuffix::U16 => Type::U16,
            NumSuffix::U32 => Type::U32,
            NumSuffix::U64 => Type::U64,
            NumSuffix::F32 => Type::F32,
            NumSuffix::F64 => Type::F64,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Type::Unknown => "?",
            Type::Void => "void",
            Type::Bool => "bool",
            Type::I8 => "i8",
            Type::I16 => "i16",
            Type::I32 => "i32",
            Type::I64 => "i64",
            Type::U8 => "u8",
            Type::U16 => "u16",
            Type::U32 => "u32",
            Type::U64 => "u64",
            Type::F32 => "f32",
            Type::F64 => "f64",
            Type::Number => "{number}",
            Type::Integer => "{integer}",
            Type::Unsigned => "{unsigned}",
            Type::Float => "{float}",
        };
        write!(f, "{}", name)
    }
}

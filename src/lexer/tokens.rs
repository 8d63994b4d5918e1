use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("fn", TokenKind::Fn);
        map.insert("pub", TokenKind::Pub);
        map.insert("import", TokenKind::Import);
        map.insert("global", TokenKind::Global);
        map.insert("const", TokenKind::Const);
        map.insert("mod", TokenKind::Mod);
        map.insert("return", TokenKind::Return);
        map.insert("if", TokenKind::If);
        map.insert("else", TokenKind::Else);
        map.insert("while", TokenKind::While);
        map.insert("break", TokenKind::Break);
        map.insert("continue", TokenKind::Continue);
        map.insert("true", TokenKind::True);
        map.insert("false", TokenKind::False);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    /// Statement terminator, produced by `;` and line breaks.
    End,
    Integer,
    Float,
    Identifier,

    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment, // =
    Equals,     // ==
    Not,        // !
    NotEquals,  // !=

    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    ShiftLeft,
    ShiftRight,

    Or,
    And,
    Pipe,
    Ampersand,
    Caret,

    Dot,
    Colon,
    Comma,

    PlusEquals,
    MinusEquals,
    StarEquals,
    SlashEquals,
    PercentEquals,
    AmpersandEquals,
    PipeEquals,
    CaretEquals,
    ShiftLeftEquals,
    ShiftRightEquals,

    Plus,
    Dash,
    Slash,
    Star,
    Percent,

    // Reserved
    Fn,
    Pub,
    Import,
    Global,
    Const,
    Mod,
    Return,
    If,
    Else,
    While,
    Break,
    Continue,
    True,
    False,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Numeric literal suffix. `None` means the literal carried no suffix and its
/// numeric class is left for literal completion to decide.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum NumSuffix {
    None,
    I,
    U,
    F,
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

impl NumSuffix {
    pub fn parse(suffix: &str) -> Option<NumSuffix> {
        Some(match suffix {
            "" => NumSuffix::None,
            "i" => NumSuffix::I,
            "u" => NumSuffix::U,
            "f" => NumSuffix::F,
            "i8" => NumSuffix::I8,
            "i16" => NumSuffix::I16,
            "i32" => NumSuffix::I32,
            "i64" => NumSuffix::I64,
            "u8" => NumSuffix::U8,
            "u16" => NumSuffix::U16,
            "u32" => NumSuffix::U32,
            "u64" => NumSuffix::U64,
            "f32" => NumSuffix::F32,
            "f64" => NumSuffix::F64,
            _ => return None,
        })
    }

    pub fn is_float(&self) -> bool {
        matches!(self, NumSuffix::F | NumSuffix::F32 | NumSuffix::F64)
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Number {
    Int(u64),
    Float(f64),
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
    pub number: Option<Number>,
    pub suffix: NumSuffix,
    /// Dot separated segments of an identifier, `a.b.c` -> `[a, b, c]`.
    pub path: Vec<String>,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{\nkind: {},\nvalue: {}}}", self.kind, self.value)
    }
}

impl Token {
    pub fn is_simple_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier && self.path.len() == 1
    }

    pub fn int(&self) -> Option<u64> {
        match self.number {
            Some(Number::Int(value)) => Some(value),
            _ => None,
        }
    }

    pub fn float(&self) -> Option<f64> {
        match self.number {
            Some(Number::Float(value)) => Some(value),
            Some(Number::Int(value)) => Some(value as f64),
            None => None,
        }
    }
}

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::{ast::expressions::Op, lexer::tokens::TokenKind};

lazy_static! {
    /// Operator tokens in expression position. `-` and `/` map to their binary
    /// form and are turned into `Neg`/`Inv` when no operand precedes them.
    pub static ref OPERATOR_LOOKUP: HashMap<TokenKind, Op> = {
        let mut map = HashMap::new();
        map.insert(TokenKind::Plus, Op::Add);
        map.insert(TokenKind::Dash, Op::Sub);
        map.insert(TokenKind::Star, Op::Mul);
        map.insert(TokenKind::Slash, Op::Div);
        map.insert(TokenKind::Percent, Op::Mod);
        map.insert(TokenKind::ShiftLeft, Op::Lsh);
        map.insert(TokenKind::ShiftRight, Op::Rsh);
        map.insert(TokenKind::Ampersand, Op::BAnd);
        map.insert(TokenKind::Pipe, Op::BOr);
        map.insert(TokenKind::Caret, Op::Xor);
        map.insert(TokenKind::Equals, Op::Eq);
        map.insert(TokenKind::NotEquals, Op::Neq);
        map.insert(TokenKind::And, Op::And);
        map.insert(TokenKind::Or, Op::Or);
        map.insert(TokenKind::Not, Op::Not);
        map.insert(TokenKind::Greater, Op::Gt);
        map.insert(TokenKind::Less, Op::Lt);
        map.insert(TokenKind::GreaterEquals, Op::Geq);
        map.insert(TokenKind::LessEquals, Op::Leq);
        map
    };

    /// Compound assignment tokens and the operator they desugar to.
    pub static ref COMPOUND_LOOKUP: HashMap<TokenKind, Op> = {
        let mut map = HashMap::new();
        map.insert(TokenKind::PlusEquals, Op::Add);
        map.insert(TokenKind::MinusEquals, Op::Sub);
        map.insert(TokenKind::StarEquals, Op::Mul);
        map.insert(TokenKind::SlashEquals, Op::Div);
        map.insert(TokenKind::PercentEquals, Op::Mod);
        map.insert(TokenKind::AmpersandEquals, Op::BAnd);
        map.insert(TokenKind::PipeEquals, Op::BOr);
        map.insert(TokenKind::CaretEquals, Op::Xor);
        map.insert(TokenKind::ShiftLeftEquals, Op::Lsh);
        map.insert(TokenKind::ShiftRightEquals, Op::Rsh);
        map
    };
}

/// Binding strength of an operator, higher binds tighter.
pub fn precedence(op: Op) -> i8 {
    match op {
        Op::Neg | Op::Not | Op::Inv => 10,
        Op::Mul | Op::Div | Op::Mod => 9,
        Op::Add | Op::Sub => 8,
        Op::Lsh | Op::Rsh => 7,
        Op::Leq | Op::Geq | Op::Lt | Op::Gt => 6,
        Op::Eq | Op::Neq => 5,
        Op::BAnd => 4,
        Op::Xor => 3,
        Op::BOr => 2,
        Op::And => 1,
        Op::Or => 0,
    }
}

/// Prefix operators associate to the right, everything else to the left.
pub fn left_assoc(op: Op) -> bool {
    !matches!(op, Op::Neg | Op::Inv | Op::Not)
}

/// Whether `incoming` must first flush `pending` off the operator stack.
pub fn flushes(incoming: Op, pending: Op) -> bool {
    if left_assoc(incoming) {
        precedence(incoming) <= precedence(pending)
    } else {
        precedence(incoming) < precedence(pending)
    }
}

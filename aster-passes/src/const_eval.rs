//! Compile-time evaluation of integer `let` initializers.

use aster_parser::ast::{BinaryOp, Expr, UnaryOp};
use num_traits::Bounded;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstEvalResult {
    pub is_constant: bool,
    /// Folded value. Wider than 64 bits so that every `i64` and `u64` value is representable.
    pub value: i128,
}

impl ConstEvalResult {
    pub const NOT_CONSTANT: ConstEvalResult = ConstEvalResult {
        is_constant: false,
        value: 0,
    };

    fn constant(value: i128) -> Self {
        Self {
            is_constant: true,
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstEvalError {
    DivisionByZero,
    /// The intermediate result does not even fit in 128 bits.
    Overflow,
}

/// Folds `expr` if it is built only from integer literals, `+ - * /`, unary `-` and parentheses.
/// Any other node makes the whole expression non-constant.
pub fn evaluate(expr: &Expr) -> Result<ConstEvalResult, ConstEvalError> {
    match expr {
        Expr::IntLit(value) => Ok(ConstEvalResult::constant(i128::from(*value))),
        Expr::Grouping(inner) => evaluate(inner),
        Expr::Unary {
            op: UnaryOp::Negate,
            arg,
        } => {
            let arg = evaluate(arg)?;
            if !arg.is_constant {
                return Ok(ConstEvalResult::NOT_CONSTANT);
            }
            arg.value
                .checked_neg()
                .map(ConstEvalResult::constant)
                .ok_or(ConstEvalError::Overflow)
        }
        Expr::Binary { lhs, op, rhs } => {
            let fold: fn(i128, i128) -> Option<i128> = match op {
                BinaryOp::Add => i128::checked_add,
                BinaryOp::Sub => i128::checked_sub,
                BinaryOp::Mul => i128::checked_mul,
                BinaryOp::Div => i128::checked_div,
                _ => return Ok(ConstEvalResult::NOT_CONSTANT),
            };
            let (lhs, rhs) = (evaluate(lhs), evaluate(rhs));
            // errors in a constant operand only count if the whole expression is constant
            let is_runtime = |side: &Result<ConstEvalResult, ConstEvalError>| {
                matches!(side, Ok(result) if !result.is_constant)
            };
            if is_runtime(&lhs) || is_runtime(&rhs) {
                return Ok(ConstEvalResult::NOT_CONSTANT);
            }
            let (lhs, rhs) = (lhs?, rhs?);
            if *op == BinaryOp::Div && rhs.value == 0 {
                return Err(ConstEvalError::DivisionByZero);
            }
            fold(lhs.value, rhs.value)
                .map(ConstEvalResult::constant)
                .ok_or(ConstEvalError::Overflow)
        }
        _ => Ok(ConstEvalResult::NOT_CONSTANT),
    }
}

/// Integer types whose range is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
}

fn bounds_of<T: Bounded + Into<i128>>() -> (i128, i128) {
    (T::min_value().into(), T::max_value().into())
}

impl IntType {
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "i8" => IntType::I8,
            "u8" => IntType::U8,
            "i16" => IntType::I16,
            "u16" => IntType::U16,
            "i32" => IntType::I32,
            "u32" => IntType::U32,
            "i64" => IntType::I64,
            "u64" => IntType::U64,
            _ => return None,
        };
        Some(ty)
    }

    /// Returns the inclusive `(min, max)` range of the type.
    pub fn bounds(self) -> (i128, i128) {
        match self {
            IntType::I8 => bounds_of::<i8>(),
            IntType::U8 => bounds_of::<u8>(),
            IntType::I16 => bounds_of::<i16>(),
            IntType::U16 => bounds_of::<u16>(),
            IntType::I32 => bounds_of::<i32>(),
            IntType::U32 => bounds_of::<u32>(),
            IntType::I64 => bounds_of::<i64>(),
            IntType::U64 => bounds_of::<u64>(),
        }
    }

    pub fn check_range(self, value: i128) -> Result<(), RangeError> {
        let (min, max) = self.bounds();
        if value > max {
            Err(RangeError::Overflow { max })
        } else if value < min {
            Err(RangeError::Underflow { min })
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for IntType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IntType::I8 => "i8",
            IntType::U8 => "u8",
            IntType::I16 => "i16",
            IntType::U16 => "u16",
            IntType::I32 => "i32",
            IntType::U32 => "u32",
            IntType::I64 => "i64",
            IntType::U64 => "u64",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    Overflow { max: i128 },
    Underflow { min: i128 },
}

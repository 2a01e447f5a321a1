//! Mapping of Aster types and operators to their C spelling.

use aster_parser::ast::{BinaryOp, TypeRef, UnaryOp};

/// Maps a primitive Aster type name to C. Any other name (user struct, enum or interface) is
/// passed through unchanged.
pub fn map_type_name(name: &str) -> &str {
    match name {
        "u0" => "void",
        "rawptr" => "void*",
        "u8" => "unsigned char",
        "u16" => "unsigned short",
        "u32" => "unsigned int",
        "u64" => "unsigned long",
        "i8" => "signed char",
        "i16" => "signed short",
        "i32" => "signed int",
        "i64" => "signed long",
        "bool" => "_Bool",
        "f32" => "float",
        "f64" => "double",
        "size" => "size_t",
        other => other,
    }
}

/// Maps a type annotation to C, appending one `*` per level of pointer indirection.
pub fn map_type(ty: &TypeRef) -> String {
    let mut mapped = map_type_name(&ty.name).to_string();
    for _ in 0..ty.pointer_depth {
        mapped.push('*');
    }
    mapped
}

/// Returns `None` for [`BinaryOp::As`] which is lowered to a cast instead.
pub fn binary_op_symbol(op: BinaryOp) -> Option<&'static str> {
    let symbol = match op {
        BinaryOp::Or => "||",
        BinaryOp::And => "&&",
        BinaryOp::BitOr => "|",
        BinaryOp::BitXor => "^",
        BinaryOp::BitAnd => "&",
        BinaryOp::Eq => "==",
        BinaryOp::NotEq => "!=",
        BinaryOp::Less => "<",
        BinaryOp::LessEq => "<=",
        BinaryOp::Greater => ">",
        BinaryOp::GreaterEq => ">=",
        BinaryOp::ShiftLeft => "<<",
        BinaryOp::ShiftRight => ">>",
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Rem => "%",
        BinaryOp::As => return None,
    };
    Some(symbol)
}

pub fn unary_op_symbol(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Negate => "-",
        UnaryOp::Plus => "+",
        UnaryOp::Not => "!",
        UnaryOp::BitNot => "~",
        UnaryOp::Deref => "*",
        UnaryOp::AddressOf => "&",
        UnaryOp::Sizeof => "sizeof",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aster_parser::ast::PRIMITIVE_TYPES;

    #[test]
    fn test_map_type() {
        assert_eq!(map_type(&TypeRef::new("i32", 0)), "signed int");
        assert_eq!(map_type(&TypeRef::new("u8", 2)), "unsigned char**");
        assert_eq!(map_type(&TypeRef::new("rawptr", 1)), "void**");
        assert_eq!(map_type(&TypeRef::new("u0", 0)), "void");
        assert_eq!(map_type(&TypeRef::new("Point", 1)), "Point*");
        assert_eq!(map_type_name("size"), "size_t");
        assert_eq!(map_type_name("bool"), "_Bool");
        for name in PRIMITIVE_TYPES {
            assert_ne!(map_type_name(name), *name, "`{}` has no C type", name);
        }
    }

    #[test]
    fn test_operators() {
        assert_eq!(binary_op_symbol(BinaryOp::And), Some("&&"));
        assert_eq!(binary_op_symbol(BinaryOp::Or), Some("||"));
        assert_eq!(binary_op_symbol(BinaryOp::As), None);
        assert_eq!(unary_op_symbol(UnaryOp::Not), "!");
        assert_eq!(unary_op_symbol(UnaryOp::Deref), "*");
    }
}

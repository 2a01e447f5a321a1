//! AST model shared by the parser, the analyzer and the transpiler.
//! Every node owns its children; there is no sharing between nodes.

/// Maximum number of `*` in a type or in a pointer assignment target.
pub const MAX_POINTER_DEPTH: u8 = 8;

/// Built-in type names. They are reserved and cannot name a variable, function or type.
pub const PRIMITIVE_TYPES: &[&str] = &[
    "u0", "rawptr", "u8", "u16", "u32", "u64", "i8", "i16", "i32", "i64", "bool", "f32", "f64",
    "size",
];

/// A type annotation (e.g. `**u8`).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    pub name: String,
    pub pointer_depth: u8,
}

impl TypeRef {
    pub fn new(name: impl ToString, pointer_depth: u8) -> Self {
        Self {
            name: name.to_string(),
            pointer_depth,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-`
    Negate,
    /// `+`
    Plus,
    /// `not`
    Not,
    /// `~`
    BitNot,
    /// `*`
    Deref,
    /// `&`
    AddressOf,
    /// `sizeof`
    Sizeof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    ShiftLeft,
    ShiftRight,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    /// `lhs as <type>`, the rhs is always an [`Expr::Type`].
    As,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    IntLit(u64),
    FloatLit(f64),
    /// String literal contents without the quotes. Escapes are kept verbatim.
    StringLit(String),
    /// Char literal contents without the quotes.
    CharLit(String),
    BoolLit(bool),
    /// An identifier (e.g. `foo`).
    Identifier(String),
    /// A type used in expression position (rhs of `as`).
    Type(TypeRef),
    Unary {
        op: UnaryOp,
        arg: Box<Expr>,
    },
    /// A binary expression (e.g. `1+1`).
    Binary {
        lhs: Box<Expr>,
        op: BinaryOp,
        rhs: Box<Expr>,
    },
    /// `if condition then then_expr else else_expr`
    Ternary {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    FnCall {
        ident: String,
        args: Vec<Expr>,
    },
    Grouping(Box<Expr>),
    Match(MatchExpr),
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchExpr {
    pub scrutinee: Box<Expr>,
    pub cases: Vec<MatchCase>,
    pub else_case: Option<Box<MatchCase>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchCase {
    /// `None` only for the else-case.
    pub pattern: Option<Expr>,
    pub result: Expr,
    pub is_else: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ident: String,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FnBody {
    Block(Vec<Stmt>),
    /// `fn f(): T => expr`
    Lambda(Expr),
    /// Interface method without a body.
    Signature,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnDeclaration {
    pub ident: String,
    pub params: Vec<Param>,
    pub return_ty: TypeRef,
    pub body: FnBody,
    pub is_public: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDeclaration {
    pub ident: String,
    /// Fields ([`Stmt::Field`]) and methods ([`Stmt::FnDeclaration`]) in source order.
    pub members: Vec<Stmt>,
    pub is_interface: bool,
    pub is_public: bool,
}

impl StructDeclaration {
    pub fn fields(&self) -> impl Iterator<Item = (&String, &TypeRef)> {
        self.members.iter().filter_map(|member| match member {
            Stmt::Field { ident, ty } => Some((ident, ty)),
            _ => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &FnDeclaration> {
        self.members.iter().filter_map(|member| match member {
            Stmt::FnDeclaration(func) => Some(func),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDeclaration {
    pub ident: String,
    pub values: Vec<String>,
    pub is_public: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    LetDeclaration {
        ident: String,
        ty: TypeRef,
        initializer: Expr,
        is_mutable: bool,
    },
    /// `***ident = value`
    Assignment {
        ident: String,
        deref_depth: u8,
        value: Expr,
    },
    FnDeclaration(FnDeclaration),
    StructDeclaration(StructDeclaration),
    /// A struct member `ident: ty`.
    Field {
        ident: String,
        ty: TypeRef,
    },
    EnumDeclaration(EnumDeclaration),
    Block(Vec<Stmt>),
    IfStmt {
        condition: Expr,
        then_body: Vec<Stmt>,
        /// Either a [`Stmt::Block`] or another [`Stmt::IfStmt`] for `else if`.
        else_body: Option<Box<Stmt>>,
    },
    WhileStmt {
        condition: Expr,
        body: Vec<Stmt>,
        step: Option<Box<Stmt>>,
    },
    ForStmt {
        init: Box<Stmt>,
        condition: Expr,
        step: Option<Box<Stmt>>,
        body: Vec<Stmt>,
    },
    ReturnStmt(Option<Expr>),
    /// `next` (continue)
    NextStmt,
    /// `stop` (break)
    StopStmt,
    ExprStmt(Expr),
    Error,
}

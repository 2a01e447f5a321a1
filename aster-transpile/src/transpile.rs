//! Lowers an analyzed AST into C source code.
//!
//! The AST is walked once per section of the output file. There is no intermediate representation:
//! every node is printed directly by the rule for its kind.

use crate::types::{binary_op_symbol, map_type, map_type_name, unary_op_symbol};
use aster_parser::ast::{
    BinaryOp, EnumDeclaration, Expr, FnBody, FnDeclaration, MatchExpr, Stmt, StructDeclaration,
    TypeRef, UnaryOp, PRIMITIVE_TYPES,
};
use aster_parser::visitor::Visitor;
use aster_source::internal_compiler_error;
use std::io;
use tracing::debug;

const INCLUDES: &[&str] = &["stdbool.h", "stdio.h"];
const INDENT: &str = "    ";

/// Collects every top-level function and struct method, in source order, to emit prototypes.
#[derive(Default)]
struct PrototypeCollector<'ast> {
    functions: Vec<&'ast FnDeclaration>,
}

impl<'ast> Visitor<'ast> for PrototypeCollector<'ast> {
    fn visit_fn(&mut self, func: &'ast FnDeclaration) {
        // Function bodies cannot declare other functions.
        self.functions.push(func);
    }
}

/// Where the result of each `match` case goes when the `match` is lowered to a `switch`.
#[derive(Debug, Clone, Copy)]
enum MatchTarget<'t> {
    /// `return result;`
    Return,
    /// `target = result; break;`
    Assign(&'t str),
    /// `result; break;`
    Discard,
}

/// Generates C source code from an abstract syntax tree.
pub struct Transpiler {
    output: String,
    /// Current block nesting level.
    indent: usize,
}

impl Transpiler {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    /// Consumes `self` and returns the generated C source code.
    #[must_use]
    pub fn into_inner_source(self) -> String {
        self.output
    }

    /// Emits a whole program. To get the generated code, call [`Transpiler::into_inner_source`].
    pub fn transpile_program(&mut self, program: &[Stmt]) {
        for include in INCLUDES {
            self.line(format!("#include <{}>", include));
        }
        self.blank_line();

        let structs: Vec<&StructDeclaration> = program
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::StructDeclaration(decl) => Some(decl),
                _ => None,
            })
            .collect();
        for decl in &structs {
            self.line(format!("typedef struct {0} {0};", decl.ident));
        }
        if !structs.is_empty() {
            self.blank_line();
        }

        // enums only depend on their own values so they can all be emitted first
        let mut has_enums = false;
        for stmt in program {
            if let Stmt::EnumDeclaration(decl) = stmt {
                self.emit_enum(decl);
                has_enums = true;
            }
        }
        if has_enums {
            self.blank_line();
        }

        let mut prototypes = PrototypeCollector::default();
        for stmt in program {
            prototypes.visit_stmt(stmt);
        }
        for func in &prototypes.functions {
            self.line(format!("{};", signature(func)));
        }
        if !prototypes.functions.is_empty() {
            self.blank_line();
        }

        // functions may use a global declared further down the file
        let mut has_globals = false;
        for stmt in program {
            if let Stmt::LetDeclaration { ident, ty, .. } = stmt {
                self.line(format!("extern {};", declaration(ty, ident)));
                has_globals = true;
            }
        }
        if has_globals {
            self.blank_line();
        }

        for stmt in program {
            match stmt {
                Stmt::EnumDeclaration(_) => continue,
                Stmt::StructDeclaration(decl) => self.emit_struct(decl, true),
                Stmt::FnDeclaration(func) => self.emit_fn(func),
                _ => self.emit_stmt(stmt),
            }
            self.blank_line();
        }

        debug!(
            functions = prototypes.functions.len(),
            bytes = self.output.len(),
            "transpiled program"
        );
    }

    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.indent {
            self.output.push_str(INDENT);
        }
        self.output.push_str(text.as_ref());
        self.output.push('\n');
    }

    fn blank_line(&mut self) {
        self.output.push('\n');
    }

    /// Emits `body` one nesting level deeper.
    fn emit_body(&mut self, body: &[Stmt]) {
        self.indent += 1;
        for stmt in body {
            self.emit_stmt(stmt);
        }
        self.indent -= 1;
    }

    fn emit_fn(&mut self, func: &FnDeclaration) {
        if let FnBody::Signature = func.body {
            return;
        }

        self.line(format!("{} {{", signature(func)));
        match &func.body {
            FnBody::Block(body) => self.emit_body(body),
            FnBody::Lambda(expr) => {
                self.indent += 1;
                match expr {
                    Expr::Match(m) if is_void(&func.return_ty) => {
                        self.emit_match(m, MatchTarget::Discard)
                    }
                    Expr::Match(m) => self.emit_match(m, MatchTarget::Return),
                    _ if is_void(&func.return_ty) => self.line(format!("{};", expr_to_c(expr))),
                    _ => self.line(format!("return {};", expr_to_c(expr))),
                }
                self.indent -= 1;
            }
            FnBody::Signature => {}
        }
        self.line("}");
    }

    /// Emits the struct body with its fields only. Methods of a top-level struct follow the
    /// closing `};` as free functions.
    fn emit_struct(&mut self, decl: &StructDeclaration, is_top_level: bool) {
        if !is_top_level {
            self.line(format!("typedef struct {0} {0};", decl.ident));
        }

        self.line(format!("struct {} {{", decl.ident));
        self.indent += 1;
        let mut has_fields = false;
        for (ident, ty) in decl.fields() {
            self.line(format!("{};", declaration(ty, ident)));
            has_fields = true;
        }
        if !has_fields {
            self.line("char _placeholder;");
        }
        self.indent -= 1;
        self.line("};");

        for method in decl.methods() {
            if !is_top_level {
                internal_compiler_error(format!(
                    "method `{}` of a local struct reached the transpiler",
                    method.ident
                ));
            }
            if let FnBody::Signature = method.body {
                continue;
            }
            self.blank_line();
            self.emit_fn(method);
        }
    }

    fn emit_enum(&mut self, decl: &EnumDeclaration) {
        self.line(format!(
            "typedef enum {0} {{ {1} }} {0};",
            decl.ident,
            decl.values.join(", ")
        ));
    }

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::LetDeclaration {
                ident,
                ty,
                initializer: Expr::Match(m),
                ..
            } => {
                self.line(format!("{};", declaration(ty, ident)));
                self.emit_match(m, MatchTarget::Assign(ident));
            }
            Stmt::Assignment {
                ident,
                deref_depth,
                value: Expr::Match(m),
            } => {
                let target = assignment_target(ident, *deref_depth);
                self.emit_match(m, MatchTarget::Assign(&target));
            }
            Stmt::ExprStmt(Expr::Match(m)) => self.emit_match(m, MatchTarget::Discard),
            Stmt::LetDeclaration { .. } | Stmt::Assignment { .. } | Stmt::ExprStmt(_) => {
                if let Some(simple) = simple_stmt(stmt) {
                    self.line(format!("{};", simple));
                }
            }
            Stmt::FnDeclaration(func) => internal_compiler_error(format!(
                "nested function `{}` reached the transpiler",
                func.ident
            )),
            Stmt::StructDeclaration(decl) => self.emit_struct(decl, false),
            Stmt::Field { ident, .. } => internal_compiler_error(format!(
                "field `{}` outside of a struct reached the transpiler",
                ident
            )),
            Stmt::EnumDeclaration(decl) => self.emit_enum(decl),
            Stmt::Block(body) => {
                self.line("{");
                self.emit_body(body);
                self.line("}");
            }
            Stmt::IfStmt {
                condition,
                then_body,
                else_body,
            } => self.emit_if(condition, then_body, else_body.as_deref()),
            Stmt::WhileStmt {
                condition,
                body,
                step,
            } => self.emit_loop("", condition, step.as_deref(), body),
            Stmt::ForStmt {
                init,
                condition,
                step,
                body,
            } => match simple_stmt(init) {
                Some(init) => self.emit_loop(&init, condition, step.as_deref(), body),
                None => {
                    // the initializer needs a `switch`, so it is hoisted into an enclosing block
                    self.line("{");
                    self.indent += 1;
                    self.emit_stmt(init);
                    self.emit_loop("", condition, step.as_deref(), body);
                    self.indent -= 1;
                    self.line("}");
                }
            },
            Stmt::ReturnStmt(Some(Expr::Match(m))) => self.emit_match(m, MatchTarget::Return),
            Stmt::ReturnStmt(Some(expr)) => self.line(format!("return {};", expr_to_c(expr))),
            Stmt::ReturnStmt(None) => self.line("return;"),
            Stmt::NextStmt => self.line("continue;"),
            Stmt::StopStmt => self.line("break;"),
            Stmt::Error => internal_compiler_error("error statement reached the transpiler"),
        }
    }

    fn emit_if(&mut self, condition: &Expr, then_body: &[Stmt], else_body: Option<&Stmt>) {
        self.line(format!("if ({}) {{", expr_to_c(condition)));
        self.emit_body(then_body);

        let mut else_body = else_body;
        loop {
            match else_body {
                None => break,
                Some(Stmt::IfStmt {
                    condition,
                    then_body,
                    else_body: next,
                }) => {
                    self.line(format!("}} else if ({}) {{", expr_to_c(condition)));
                    self.emit_body(then_body);
                    else_body = next.as_deref();
                }
                Some(Stmt::Block(body)) => {
                    self.line("} else {");
                    self.emit_body(body);
                    break;
                }
                Some(other) => {
                    self.line("} else {");
                    self.emit_body(std::slice::from_ref(other));
                    break;
                }
            }
        }
        self.line("}");
    }

    /// Emits a `while` loop, or a `for` loop if there is an `init` or a `step`. The step always
    /// goes in the `for` header so that `next` runs it.
    fn emit_loop(&mut self, init: &str, condition: &Expr, step: Option<&Stmt>, body: &[Stmt]) {
        let condition = expr_to_c(condition);

        match step {
            None if init.is_empty() => self.line(format!("while ({}) {{", condition)),
            step => self.line(format!(
                "for ({}; {}; {}) {{",
                init,
                condition,
                step.map(loop_step_to_c).unwrap_or_default()
            )),
        }
        self.emit_body(body);
        self.line("}");
    }

    /// Lowers a `match` into a `switch`. The else-case becomes `default`.
    fn emit_match(&mut self, m: &MatchExpr, target: MatchTarget<'_>) {
        self.line(format!("switch ({}) {{", expr_to_c(&m.scrutinee)));
        self.indent += 1;
        for case in &m.cases {
            match &case.pattern {
                Some(pattern) => self.line(format!("case {}:", expr_to_c(pattern))),
                None => internal_compiler_error("match case without a pattern"),
            }
            self.emit_case_result(&case.result, target);
        }
        if let Some(else_case) = &m.else_case {
            self.line("default:");
            self.emit_case_result(&else_case.result, target);
        }
        self.indent -= 1;
        self.line("}");
    }

    fn emit_case_result(&mut self, result: &Expr, target: MatchTarget<'_>) {
        self.indent += 1;
        match (result, target) {
            (Expr::Match(inner), _) => {
                self.emit_match(inner, target);
                // an inner match without an else-case must not fall through to the next case
                self.line("break;");
            }
            (_, MatchTarget::Return) => self.line(format!("return {};", expr_to_c(result))),
            (_, MatchTarget::Assign(target)) => {
                self.line(format!("{} = {};", target, expr_to_c(result)));
                self.line("break;");
            }
            (_, MatchTarget::Discard) => {
                self.line(format!("{};", expr_to_c(result)));
                self.line("break;");
            }
        }
        self.indent -= 1;
    }
}

impl Default for Transpiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Transpiles `program` and returns the C source code.
pub fn transpile_to_string(program: &[Stmt]) -> String {
    let mut transpiler = Transpiler::new();
    transpiler.transpile_program(program);
    transpiler.into_inner_source()
}

/// Transpiles `program` and writes the C source code to `sink`.
pub fn transpile(program: &[Stmt], sink: &mut impl io::Write) -> io::Result<()> {
    sink.write_all(transpile_to_string(program).as_bytes())
}

fn is_void(ty: &TypeRef) -> bool {
    ty.name == "u0" && ty.pointer_depth == 0
}

/// `T ident`
fn declaration(ty: &TypeRef, ident: &str) -> String {
    format!("{} {}", map_type(ty), ident)
}

fn signature(func: &FnDeclaration) -> String {
    let params = if func.params.is_empty() {
        "void".to_string()
    } else {
        func.params
            .iter()
            .map(|param| declaration(&param.ty, &param.ident))
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("{}({})", declaration(&func.return_ty, &func.ident), params)
}

fn assignment_target(ident: &str, deref_depth: u8) -> String {
    format!("{}{}", "*".repeat(usize::from(deref_depth)), ident)
}

/// Statements that fit on one line and inside a `for` header, without the trailing `;`.
fn simple_stmt(stmt: &Stmt) -> Option<String> {
    match stmt {
        Stmt::LetDeclaration {
            initializer: Expr::Match(_),
            ..
        }
        | Stmt::Assignment {
            value: Expr::Match(_),
            ..
        }
        | Stmt::ExprStmt(Expr::Match(_)) => None,
        Stmt::LetDeclaration {
            ident,
            ty,
            initializer,
            ..
        } => Some(format!(
            "{} = {}",
            declaration(ty, ident),
            expr_to_c(initializer)
        )),
        Stmt::Assignment {
            ident,
            deref_depth,
            value,
        } => Some(format!(
            "{} = {}",
            assignment_target(ident, *deref_depth),
            expr_to_c(value)
        )),
        Stmt::ExprStmt(expr) => Some(expr_to_c(expr)),
        _ => None,
    }
}

/// A loop step is an assignment or an expression. A `match` in it becomes a chain of conditionals.
fn loop_step_to_c(step: &Stmt) -> String {
    match step {
        Stmt::Assignment {
            ident,
            deref_depth,
            value,
        } => format!(
            "{} = {}",
            assignment_target(ident, *deref_depth),
            expr_to_c(value)
        ),
        Stmt::ExprStmt(expr) => expr_to_c(expr),
        other => internal_compiler_error(format!("invalid loop step {:?}", other)),
    }
}

/// Wraps binary and ternary expressions in parentheses.
fn operand_to_c(expr: &Expr) -> String {
    match expr {
        Expr::Binary { .. } | Expr::Ternary { .. } => format!("({})", expr_to_c(expr)),
        _ => expr_to_c(expr),
    }
}

/// `sizeof` accepts both a type name and an expression.
fn sizeof_operand_to_c(expr: &Expr) -> String {
    match expr {
        Expr::Grouping(inner) => sizeof_operand_to_c(inner),
        Expr::Identifier(ident) if PRIMITIVE_TYPES.contains(&ident.as_str()) => {
            map_type_name(ident).to_string()
        }
        Expr::Type(ty) => map_type(ty),
        _ => expr_to_c(expr),
    }
}

fn expr_to_c(expr: &Expr) -> String {
    match expr {
        Expr::IntLit(value) => value.to_string(),
        Expr::FloatLit(value) => format!("{:?}", value),
        Expr::StringLit(value) => format!("\"{}\"", value),
        Expr::CharLit(value) => format!("'{}'", value),
        Expr::BoolLit(value) => value.to_string(),
        Expr::Identifier(ident) => ident.clone(),
        Expr::Type(ty) => map_type(ty),
        Expr::Unary {
            op: UnaryOp::Sizeof,
            arg,
        } => format!("sizeof({})", sizeof_operand_to_c(arg)),
        Expr::Unary { op, arg } => {
            let symbol = unary_op_symbol(*op);
            let arg = expr_to_c(arg);
            // `- -x` must not become `--x`, nor `& &x` become `&&x`
            let needs_space = matches!(op, UnaryOp::Negate | UnaryOp::Plus | UnaryOp::AddressOf)
                && arg.starts_with(symbol);
            if needs_space {
                format!("{} {}", symbol, arg)
            } else {
                format!("{}{}", symbol, arg)
            }
        }
        Expr::Binary {
            lhs,
            op: BinaryOp::As,
            rhs,
        } => format!("({}){}", expr_to_c(rhs), operand_to_c(lhs)),
        Expr::Binary { lhs, op, rhs } => {
            let symbol = binary_op_symbol(*op)
                .unwrap_or_else(|| internal_compiler_error(format!("no C operator for {:?}", op)));
            format!("{} {} {}", expr_to_c(lhs), symbol, expr_to_c(rhs))
        }
        Expr::Ternary {
            condition,
            then_expr,
            else_expr,
        } => format!(
            "{} ? {} : {}",
            expr_to_c(condition),
            expr_to_c(then_expr),
            expr_to_c(else_expr)
        ),
        Expr::FnCall { ident, args } => {
            let args: Vec<String> = args.iter().map(expr_to_c).collect();
            format!("{}({})", ident, args.join(", "))
        }
        Expr::Grouping(inner) => format!("({})", expr_to_c(inner)),
        Expr::Match(m) => {
            // A match nested inside an expression becomes a chain of conditionals. The scrutinee is
            // repeated in every comparison, which is why it cannot contain a call.
            let scrutinee = operand_to_c(&m.scrutinee);
            let fallback = m
                .else_case
                .as_ref()
                .map_or_else(|| "0".to_string(), |case| expr_to_c(&case.result));
            let conditional = m.cases.iter().rev().fold(fallback, |otherwise, case| {
                match &case.pattern {
                    Some(pattern) => format!(
                        "{} == {} ? {} : {}",
                        scrutinee,
                        operand_to_c(pattern),
                        expr_to_c(&case.result),
                        otherwise
                    ),
                    None => otherwise,
                }
            });
            format!("({})", conditional)
        }
        Expr::Error => internal_compiler_error("error expression reached the transpiler"),
    }
}

//! Semantic analysis pass.
//!
//! Checks the entry point, scoping of symbols, constant `let` initializers and the placement of
//! `stop`/`next`. The tree is only read; every problem is reported to the [`Source`] and the walk
//! continues so that all semantic errors are reported in one run.

use std::collections::HashSet;

use aster_parser::ast::{
    EnumDeclaration, Expr, FnBody, FnDeclaration, Stmt, StructDeclaration, PRIMITIVE_TYPES,
};
use aster_parser::visitor::{walk_expr, walk_fn, Visitor};
use aster_source::{internal_compiler_error, Diagnostic, Source};

use crate::const_eval::{evaluate, ConstEvalError, IntType, RangeError};
use crate::symbol_table::{Declaration, ScopeLookup, SymbolTable};

/// Name of the function every program must declare.
pub const ENTRY_POINT: &str = "main";

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub scope_lookup: ScopeLookup,
    /// Functions provided by the C environment that can be called without a declaration.
    pub host_functions: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            scope_lookup: ScopeLookup::default(),
            host_functions: Vec::new(),
        }
    }
}

/// Semantic analysis pass.
pub struct Analyzer<'a> {
    config: AnalyzerConfig,
    symbols: SymbolTable<'a>,
    /// Number of loops enclosing the current statement within the current function.
    loop_depth: u32,
    /// Number of functions enclosing the current statement.
    fn_depth: u32,
    had_error: bool,
    /// `match` expressions that are lowered to a C `switch` (returned, assigned or used as a
    /// statement). Every other `match` becomes a chain of conditionals.
    switch_matches: HashSet<*const Expr>,
    source: &'a Source<'a>,
}

/// Searches an expression tree for a sub-expression matching `predicate`.
struct ExprSearch<F> {
    predicate: F,
    found: bool,
}

impl<'ast, F: Fn(&Expr) -> bool> Visitor<'ast> for ExprSearch<F> {
    fn visit_expr(&mut self, expr: &'ast Expr) {
        if (self.predicate)(expr) {
            self.found = true;
            return;
        }
        walk_expr(self, expr);
    }
}

fn contains_expr(expr: &Expr, predicate: impl Fn(&Expr) -> bool) -> bool {
    let mut search = ExprSearch {
        predicate,
        found: false,
    };
    search.visit_expr(expr);
    search.found
}

impl<'a> Analyzer<'a> {
    pub fn new(source: &'a Source<'a>) -> Self {
        Self::with_config(source, AnalyzerConfig::default())
    }

    pub fn with_config(source: &'a Source<'a>, config: AnalyzerConfig) -> Self {
        Self {
            config,
            symbols: SymbolTable::new(),
            loop_depth: 0,
            fn_depth: 0,
            had_error: false,
            switch_matches: HashSet::new(),
            source,
        }
    }

    /// Analyzes a whole program. Returns `true` if any semantic error was reported.
    pub fn analyze(&mut self, program: &'a [Stmt]) -> bool {
        let has_entry_point = program.iter().any(|stmt| {
            matches!(stmt, Stmt::FnDeclaration(func) if func.ident == ENTRY_POINT)
        });
        if !has_entry_point {
            self.error(format!(
                "missing entry point: no `fn {}` declared",
                ENTRY_POINT
            ));
            return self.had_error;
        }

        self.declare_globals(program);
        for stmt in program {
            if self.check_top_level(stmt) {
                self.visit_stmt(stmt);
            }
        }

        tracing::debug!(had_error = self.had_error, "analyzed {}", self.source.name);
        self.had_error
    }

    fn error(&mut self, message: impl ToString) {
        self.had_error = true;
        self.source.errors.add_error(Diagnostic::semantic(message));
    }

    /// Only declarations are allowed at file scope in C, and global initializers are evaluated
    /// before `main`. Returns `false` if `stmt` is not a valid top-level item.
    fn check_top_level(&mut self, stmt: &Stmt) -> bool {
        match stmt {
            Stmt::FnDeclaration(_) | Stmt::StructDeclaration(_) | Stmt::EnumDeclaration(_) => true,
            Stmt::LetDeclaration {
                ident, initializer, ..
            } => {
                let is_runtime = contains_expr(initializer, |expr| {
                    matches!(expr, Expr::FnCall { .. } | Expr::Match(_))
                });
                if is_runtime {
                    self.error(format!(
                        "the initializer of global variable `{}` cannot call a function or use `match`",
                        ident
                    ));
                }
                !is_runtime
            }
            _ => {
                self.error(
                    "only functions, structs, interfaces, enums and variables can be declared at the top level",
                );
                false
            }
        }
    }

    /// Adds a symbol to the innermost scope, reporting duplicates.
    fn declare(&mut self, ident: &str, decl: Declaration<'a>) {
        if PRIMITIVE_TYPES.contains(&ident) {
            self.error(format!(
                "`{}` is a primitive type and cannot be used as a {} name",
                ident,
                decl.describe()
            ));
        }
        if let Err(existing) = self.symbols.declare(ident, decl) {
            self.error(format!(
                "duplicate symbol `{}`: a {} with this name is already declared in this scope",
                ident,
                existing.decl.describe()
            ));
        }
    }

    /// Declares every top-level function, type, struct method and variable up front so that they
    /// can be referenced before their declaration.
    fn declare_globals(&mut self, program: &'a [Stmt]) {
        for stmt in program {
            match stmt {
                Stmt::LetDeclaration { ident, .. } => self.declare(ident, Declaration::Let(stmt)),
                Stmt::FnDeclaration(func) => self.declare(&func.ident, Declaration::Fn(func)),
                Stmt::StructDeclaration(decl) => {
                    self.declare(&decl.ident, Declaration::Struct(decl));
                    for method in decl.methods() {
                        self.declare(&method.ident, Declaration::Fn(method));
                    }
                }
                Stmt::EnumDeclaration(decl) => self.declare_enum(decl),
                _ => {}
            }
        }
    }

    fn declare_enum(&mut self, decl: &'a EnumDeclaration) {
        self.declare(&decl.ident, Declaration::Enum(decl));
        for value in &decl.values {
            self.declare(value, Declaration::EnumValue(decl));
        }
    }

    /// Folds a constant `let` initializer and checks it against the declared type.
    fn check_constant_initializer(
        &mut self,
        ident: &str,
        ty_name: &str,
        initializer: &Expr,
        is_pointer: bool,
    ) {
        let int_type = if is_pointer {
            None
        } else {
            IntType::from_name(ty_name)
        };

        let result = match evaluate(initializer) {
            Ok(result) => result,
            Err(ConstEvalError::DivisionByZero) => {
                self.error(format!("division by zero in the initializer of `{}`", ident));
                return;
            }
            Err(ConstEvalError::Overflow) => {
                self.error(format!(
                    "integer overflow: the initializer of `{}` does not fit in `{}`",
                    ident, ty_name
                ));
                return;
            }
        };
        if !result.is_constant {
            return;
        }

        if let Some(int_type) = int_type {
            match int_type.check_range(result.value) {
                Ok(()) => {}
                Err(RangeError::Overflow { max }) => self.error(format!(
                    "integer overflow: `{}` is {} but `{}` holds at most {}",
                    ident, result.value, int_type, max
                )),
                Err(RangeError::Underflow { min }) => self.error(format!(
                    "integer underflow: `{}` is {} but `{}` holds at least {}",
                    ident, result.value, int_type, min
                )),
            }
        }
    }

    fn check_assignment(&mut self, ident: &str, deref_depth: u8) {
        let symbol = self
            .symbols
            .lookup(ident, self.config.scope_lookup)
            .cloned();
        match symbol {
            None => self.error(format!("undefined symbol `{}`", ident)),
            Some(symbol) if !symbol.is_variable() => self.error(format!(
                "cannot assign to {} `{}`",
                symbol.decl.describe(),
                ident
            )),
            Some(symbol) if symbol.is_constant() && deref_depth == 0 => {
                self.error(format!("cannot reassign constant `{}`", ident))
            }
            Some(_) => {}
        }
    }

    fn check_loop_keyword(&mut self, keyword: &str) {
        if self.loop_depth == 0 {
            self.error(format!("`{}` is only valid inside a loop", keyword));
        }
    }

    /// Records that `expr` is lowered to a `switch`, along with any `match` case result that is
    /// itself a `match`.
    fn mark_switch_match(&mut self, expr: &Expr) {
        if let Expr::Match(m) = expr {
            self.switch_matches.insert(expr as *const Expr);
            for case in m.cases.iter().chain(m.else_case.as_deref()) {
                self.mark_switch_match(&case.result);
            }
        }
    }

    /// Loop steps are written in the header of a C `for`, so a `match` in them is never a `switch`.
    fn visit_loop_step(&mut self, step: &'a Stmt) {
        match step {
            Stmt::Assignment {
                ident,
                deref_depth,
                value,
            } => {
                self.check_assignment(ident, *deref_depth);
                self.visit_expr(value);
            }
            Stmt::ExprStmt(expr) => self.visit_expr(expr),
            _ => self.visit_stmt(step),
        }
    }

    /// Visits `body` in a new scope.
    fn visit_scoped_body(&mut self, body: &'a [Stmt]) {
        self.symbols.enter_scope();
        for stmt in body {
            self.visit_stmt(stmt);
        }
        self.symbols.exit_scope();
    }

    fn visit_struct(&mut self, decl: &'a StructDeclaration) {
        let mut fields = HashSet::new();
        for member in &decl.members {
            match member {
                Stmt::Field { ident, .. } => {
                    if !fields.insert(ident.as_str()) {
                        self.error(format!(
                            "duplicate field `{}` in struct `{}`",
                            ident, decl.ident
                        ));
                    }
                }
                _ => self.visit_stmt(member),
            }
        }
    }
}

impl<'a> Visitor<'a> for Analyzer<'a> {
    fn visit_expr(&mut self, expr: &'a Expr) {
        match expr {
            Expr::FnCall { ident, .. } => {
                let is_declared = self
                    .symbols
                    .lookup(ident, self.config.scope_lookup)
                    .is_some()
                    || self.config.host_functions.iter().any(|host| host == ident);
                if !is_declared {
                    self.error(format!("call to undefined function `{}`", ident));
                }
            }
            Expr::Match(m) if !self.switch_matches.contains(&(expr as *const Expr)) => {
                // the scrutinee is compared once per case
                if contains_expr(&m.scrutinee, |expr| matches!(expr, Expr::FnCall { .. })) {
                    self.error(
                        "the scrutinee of a `match` inside an expression cannot call a function, bind it to a variable first",
                    );
                }
            }
            Expr::Error => internal_compiler_error("error expression reached the analyzer"),
            _ => {}
        }

        walk_expr(self, expr);
    }

    fn visit_fn(&mut self, func: &'a FnDeclaration) {
        self.symbols.enter_scope();
        for param in &func.params {
            self.declare(&param.ident, Declaration::Param(param));
        }

        if let FnBody::Lambda(expr) = &func.body {
            self.mark_switch_match(expr);
        }

        let outer_loop_depth = std::mem::replace(&mut self.loop_depth, 0);
        self.fn_depth += 1;
        walk_fn(self, func);
        self.fn_depth -= 1;
        self.loop_depth = outer_loop_depth;

        self.symbols.exit_scope();
    }

    fn visit_stmt(&mut self, stmt: &'a Stmt) {
        // Do not use default walking logic.

        match stmt {
            Stmt::LetDeclaration {
                ident,
                ty,
                initializer,
                is_mutable: _,
            } => {
                if !self.symbols.is_global_scope() {
                    self.declare(ident, Declaration::Let(stmt));
                }
                self.mark_switch_match(initializer);
                self.visit_expr(initializer);
                let is_pointer = ty.pointer_depth > 0;
                self.check_constant_initializer(ident, &ty.name, initializer, is_pointer);
            }
            Stmt::Assignment {
                ident,
                deref_depth,
                value,
            } => {
                self.check_assignment(ident, *deref_depth);
                self.mark_switch_match(value);
                self.visit_expr(value);
            }
            Stmt::FnDeclaration(func) => {
                if self.fn_depth > 0 {
                    self.error(format!(
                        "function `{}` must be declared at the top level or inside a struct",
                        func.ident
                    ));
                    return;
                }
                self.visit_fn(func);
            }
            Stmt::StructDeclaration(decl) => {
                if !self.symbols.is_global_scope() {
                    self.declare(&decl.ident, Declaration::Struct(decl));
                }
                self.visit_struct(decl);
            }
            Stmt::Field { ident, .. } => {
                self.error(format!("field `{}` declared outside of a struct", ident))
            }
            Stmt::EnumDeclaration(decl) => {
                if !self.symbols.is_global_scope() {
                    self.declare_enum(decl);
                }
            }
            Stmt::Block(body) => self.visit_scoped_body(body),
            Stmt::IfStmt {
                condition,
                then_body,
                else_body,
            } => {
                self.visit_expr(condition);
                self.visit_scoped_body(then_body);
                if let Some(else_body) = else_body {
                    self.visit_stmt(else_body);
                }
            }
            Stmt::WhileStmt {
                condition,
                body,
                step,
            } => {
                self.visit_expr(condition);
                self.symbols.enter_scope();
                self.loop_depth += 1;
                for stmt in body {
                    self.visit_stmt(stmt);
                }
                if let Some(step) = step {
                    self.visit_loop_step(step);
                }
                self.loop_depth -= 1;
                self.symbols.exit_scope();
            }
            Stmt::ForStmt {
                init,
                condition,
                step,
                body,
            } => {
                self.symbols.enter_scope();
                self.visit_stmt(init);
                self.visit_expr(condition);
                self.loop_depth += 1;
                for stmt in body {
                    self.visit_stmt(stmt);
                }
                if let Some(step) = step {
                    self.visit_loop_step(step);
                }
                self.loop_depth -= 1;
                self.symbols.exit_scope();
            }
            Stmt::ReturnStmt(expr) => {
                if let Some(expr) = expr {
                    self.mark_switch_match(expr);
                    self.visit_expr(expr);
                }
            }
            Stmt::NextStmt => self.check_loop_keyword("next"),
            Stmt::StopStmt => self.check_loop_keyword("stop"),
            Stmt::ExprStmt(expr) => {
                self.mark_switch_match(expr);
                self.visit_expr(expr);
            }
            Stmt::Error => internal_compiler_error("error statement reached the analyzer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aster_parser::ast::{FnBody, TypeRef};
    use aster_parser::parser::Parser;

    fn analyze_with(content: &str, config: AnalyzerConfig) -> Vec<String> {
        let source = content.into();
        let ast = Parser::new(&source).parse_program();
        assert!(source.has_no_errors(), "{}", source.errors);

        let had_error = Analyzer::with_config(&source, config).analyze(&ast);
        let messages: Vec<String> = source
            .errors
            .errors()
            .iter()
            .map(|error| error.message.clone())
            .collect();
        assert_eq!(had_error, !messages.is_empty());
        messages
    }

    fn analyze(content: &str) -> Vec<String> {
        analyze_with(content, AnalyzerConfig::default())
    }

    #[test]
    fn test_valid_program() {
        assert!(analyze("fn main(): i32 { let x: i32 = 41 return x }").is_empty());
    }

    #[test]
    fn test_entry_point() {
        assert_eq!(
            analyze(""),
            vec!["missing entry point: no `fn main` declared"]
        );
        // stops before walking, so the undefined call is not reported
        assert_eq!(
            analyze("fn start(): i32 { undefined() return 0 }"),
            vec!["missing entry point: no `fn main` declared"]
        );
        assert!(analyze("let main: i32 = 0").len() == 1);
    }

    #[test]
    fn test_constant_overflow() {
        assert_eq!(
            analyze("fn main(): i32 { let x: i8 = 127 + 1 return 0 }"),
            vec!["integer overflow: `x` is 128 but `i8` holds at most 127"]
        );
        assert!(analyze("fn main(): i32 { let x: i8 = 127 return 0 }").is_empty());
        assert_eq!(
            analyze("fn main(): i32 { let y: u16 = 2 - 3 return 0 }"),
            vec!["integer underflow: `y` is -1 but `u16` holds at least 0"]
        );
        // non-constant initializers and non-integer types are not checked
        assert!(analyze(
            "fn main(): i32 { let a: i32 = 1 let b: i8 = a * 1000 let c: f32 = 100000 let d: *i8 = 1000 return 0 }"
        )
        .is_empty());
        assert_eq!(
            analyze("fn main(): i32 { let z: i32 = 10 / (5 - 5) return 0 }"),
            vec!["division by zero in the initializer of `z`"]
        );
    }

    #[test]
    fn test_duplicate_symbols() {
        assert_eq!(
            analyze("fn main(): i32 { let y: i32 = 1 let y: i32 = 2 return y }"),
            vec!["duplicate symbol `y`: a variable with this name is already declared in this scope"]
        );
        assert!(analyze(
            r#"
            fn other(): i32 { let y: i32 = 1 return y }
            fn main(): i32 { let y: i32 = 2 return y }"#
        )
        .is_empty());
        assert_eq!(
            analyze("fn main(): i32 { return 0 } fn main(): i32 { return 1 }"),
            vec!["duplicate symbol `main`: a function with this name is already declared in this scope"]
        );
        assert_eq!(
            analyze("fn f(a: i32, a: i32): i32 => a fn main(): i32 => 0"),
            vec!["duplicate symbol `a`: a parameter with this name is already declared in this scope"]
        );
        assert!(analyze(
            "fn main(): i32 { if true { let y: i32 = 1 } else { let y: i32 = 2 } return 0 }"
        )
        .is_empty());
    }

    #[test]
    fn test_loop_context() {
        assert_eq!(
            analyze("fn main(): i32 { stop return 0 }"),
            vec!["`stop` is only valid inside a loop"]
        );
        assert_eq!(
            analyze("fn main(): i32 { if true { next } return 0 }"),
            vec!["`next` is only valid inside a loop"]
        );
        assert!(analyze("fn main(): i32 { while true { stop } return 0 }").is_empty());
        // leaving the inner loop keeps the outer loop context
        assert!(analyze(
            "fn main(): i32 { while true { while false { next } stop } return 0 }"
        )
        .is_empty());
        assert!(analyze(
            "fn main(): i32 { for let mut i: i32 = 0; i < 3; i = i + 1 { next } return 0 }"
        )
        .is_empty());
        assert_eq!(
            analyze("fn main(): i32 { while true { } stop return 0 }"),
            vec!["`stop` is only valid inside a loop"]
        );
    }

    #[test]
    fn test_assignments() {
        assert_eq!(
            analyze("fn main(): i32 { x = 1 return 0 }"),
            vec!["undefined symbol `x`"]
        );
        assert_eq!(
            analyze("fn main(): i32 { let x: i32 = 1 x = 2 return x }"),
            vec!["cannot reassign constant `x`"]
        );
        assert!(analyze(
            "fn main(): i32 { let mut x: i32 = 1 x = 2 let p: *i32 = &x; *p = 3 return x }"
        )
        .is_empty());
        assert!(analyze("fn f(a: i32): i32 { a = 2 return a } fn main(): i32 => f(1)").is_empty());
        assert_eq!(
            analyze("fn main(): i32 { main = 1 return 0 }"),
            vec!["cannot assign to function `main`"]
        );
    }

    #[test]
    fn test_calls() {
        assert_eq!(
            analyze("fn main(): i32 { return missing(1) }"),
            vec!["call to undefined function `missing`"]
        );
        // functions and struct methods declared later are visible
        assert!(analyze(
            r#"
            fn main(): i32 => helper() + origin_x()
            fn helper(): i32 => 1
            struct Point { x: i32 fn origin_x(): i32 => 0 }"#
        )
        .is_empty());

        let config = AnalyzerConfig {
            host_functions: vec!["printf".to_string()],
            ..AnalyzerConfig::default()
        };
        assert!(analyze_with("fn main(): i32 { printf(\"hi\") return 0 }", config).is_empty());
    }

    #[test]
    fn test_innermost_scope_lookup() {
        let config = || AnalyzerConfig {
            scope_lookup: ScopeLookup::Innermost,
            ..AnalyzerConfig::default()
        };
        assert_eq!(
            analyze_with(
                "fn helper(): i32 => 1 fn main(): i32 { return helper() }",
                config()
            ),
            vec!["call to undefined function `helper`"]
        );
        assert_eq!(
            analyze_with(
                "fn main(): i32 { let mut x: i32 = 0 while x < 3 { x = x + 1 } return x }",
                config()
            ),
            vec!["undefined symbol `x`"]
        );
    }

    #[test]
    fn test_declaration_placement() {
        assert_eq!(
            analyze("fn main(): i32 { fn inner(): i32 => 1 return 0 }"),
            vec!["function `inner` must be declared at the top level or inside a struct"]
        );
        assert_eq!(
            analyze("fn main(): i32 { x: i32 return 0 }"),
            vec!["field `x` declared outside of a struct"]
        );
        assert_eq!(
            analyze("struct S { x: i32 x: u8 } fn main(): i32 => 0"),
            vec!["duplicate field `x` in struct `S`"]
        );
        assert!(analyze(
            "enum Colour { Red, Green } fn main(): i32 { enum Local { A } return 0 }"
        )
        .is_empty());
    }

    #[test]
    fn test_top_level_items() {
        const MESSAGE: &str =
            "only functions, structs, interfaces, enums and variables can be declared at the top level";
        assert_eq!(analyze(r#"fn main(): i32 => 0 puts("x")"#), vec![MESSAGE]);
        assert_eq!(analyze("fn main(): i32 => 0 while true { }"), vec![MESSAGE]);
        assert_eq!(
            analyze("fn main(): i32 => 0 let y: i32 = match 1 { 1 => 2 }"),
            vec!["the initializer of global variable `y` cannot call a function or use `match`"]
        );
        assert_eq!(
            analyze("let z: i32 = 1 + f() fn f(): i32 => 1 fn main(): i32 => 0"),
            vec!["the initializer of global variable `z` cannot call a function or use `match`"]
        );
        assert!(analyze(
            "let limit: i32 = 10 * 2 struct P { x: i32 } enum E { A } fn main(): i32 => limit"
        )
        .is_empty());
    }

    #[test]
    fn test_globals() {
        // globals are visible before their declaration
        assert!(analyze("fn main(): i32 { g = 2 return 0 } let mut g: i32 = 1").is_empty());
        assert_eq!(
            analyze("fn main(): i32 { g = 2 return 0 } let g: i32 = 1"),
            vec!["cannot reassign constant `g`"]
        );
        assert_eq!(
            analyze("let g: i32 = 1 fn g(): i32 => 0 fn main(): i32 => 0"),
            vec!["duplicate symbol `g`: a variable with this name is already declared in this scope"]
        );
        assert_eq!(
            analyze("let big: i8 = 200 fn main(): i32 => 0"),
            vec!["integer overflow: `big` is 200 but `i8` holds at most 127"]
        );
    }

    #[test]
    fn test_non_constant_division_by_zero() {
        assert!(analyze("fn main(): i32 { let a: i32 = 1 let b: i32 = a + 1 / 0 return b }")
            .is_empty());
        assert_eq!(
            analyze("fn main(): i32 { let b: i32 = 2 + 1 / 0 return b }"),
            vec!["division by zero in the initializer of `b`"]
        );
    }

    #[test]
    fn test_match_scrutinee_calls() {
        const MESSAGE: &str =
            "the scrutinee of a `match` inside an expression cannot call a function, bind it to a variable first";
        let program = |main_body: &str| format!("fn f(): i32 => 1 fn main(): i32 {{ {} }}", main_body);

        assert_eq!(
            analyze(&program("let x: i32 = 1 + match f() { 1 => 2, else => 3 } return x")),
            vec![MESSAGE]
        );
        assert_eq!(
            analyze(&program(
                "let mut x: i32 = 0 while x < 3 : x = match f() { 1 => 2, else => 3 } { } return x"
            )),
            vec![MESSAGE]
        );
        assert_eq!(
            analyze(&program("let x: i32 = match 1 { 1 => 1 + match f() { 1 => 2 } } return x")),
            vec![MESSAGE]
        );

        // lowered to a `switch`, which evaluates the scrutinee once
        assert!(analyze(&program(
            "let mut x: i32 = match f() { 1 => match f() { 2 => 3 } } x = 0 return match f() { 1 => x }"
        ))
        .is_empty());
        assert!(analyze(&program("match f() { 1 => f() } return 0")).is_empty());
        assert!(analyze("fn f(): i32 => 1 fn main(): i32 => match f() { 1 => 0, else => 1 }").is_empty());
        assert!(analyze(&program("let y: i32 = 1 let x: i32 = 2 * match y { 1 => f() } return x"))
            .is_empty());
    }

    #[test]
    fn test_primitive_type_names() {
        assert_eq!(
            analyze("fn main(): i32 { let size: size = 4 return 0 }"),
            vec!["`size` is a primitive type and cannot be used as a variable name"]
        );
        assert_eq!(
            analyze("fn f(i32: i32): i32 => 0 fn main(): i32 => 0"),
            vec!["`i32` is a primitive type and cannot be used as a parameter name"]
        );
        assert_eq!(
            analyze("struct bool { } fn main(): i32 => 0"),
            vec!["`bool` is a primitive type and cannot be used as a struct name"]
        );
        assert!(analyze("fn main(): i32 { let bytes: size = sizeof i64 return 0 }").is_empty());
    }

    #[test]
    fn test_errors_accumulate() {
        let messages = analyze(
            r#"
            fn main(): i32 {
                let a: u8 = 256
                stop
                b = 1
                return nope()
            }"#,
        );
        assert_eq!(messages.len(), 4);
    }

    #[test]
    #[should_panic(expected = "internal compiler error")]
    fn test_error_sentinel_is_internal_error() {
        let source = "".into();
        let program = vec![Stmt::FnDeclaration(FnDeclaration {
            ident: "main".to_string(),
            params: Vec::new(),
            return_ty: TypeRef::new("i32", 0),
            body: FnBody::Block(vec![Stmt::Error]),
            is_public: false,
        })];
        Analyzer::new(&source).analyze(&program);
    }
}

//! Visitor pattern for AST nodes.

use crate::ast::{Expr, FnBody, FnDeclaration, Stmt};

pub trait Visitor<'ast>: Sized {
    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        walk_stmt(self, stmt);
    }
    fn visit_fn(&mut self, func: &'ast FnDeclaration) {
        walk_fn(self, func);
    }
}

pub fn walk_expr<'ast>(visitor: &mut impl Visitor<'ast>, expr: &'ast Expr) {
    match expr {
        Expr::IntLit(_)
        | Expr::FloatLit(_)
        | Expr::StringLit(_)
        | Expr::CharLit(_)
        | Expr::BoolLit(_)
        | Expr::Identifier(_)
        | Expr::Type(_) => {}
        Expr::Unary { op: _, arg } => visitor.visit_expr(arg),
        Expr::Binary { lhs, op: _, rhs } => {
            visitor.visit_expr(lhs);
            visitor.visit_expr(rhs);
        }
        Expr::Ternary {
            condition,
            then_expr,
            else_expr,
        } => {
            visitor.visit_expr(condition);
            visitor.visit_expr(then_expr);
            visitor.visit_expr(else_expr);
        }
        Expr::FnCall { ident: _, args } => {
            for arg in args {
                visitor.visit_expr(arg);
            }
        }
        Expr::Grouping(inner) => visitor.visit_expr(inner),
        Expr::Match(m) => {
            visitor.visit_expr(&m.scrutinee);
            for case in m.cases.iter().chain(m.else_case.as_deref()) {
                if let Some(pattern) = &case.pattern {
                    visitor.visit_expr(pattern);
                }
                visitor.visit_expr(&case.result);
            }
        }
        Expr::Error => {}
    }
}

pub fn walk_fn<'ast>(visitor: &mut impl Visitor<'ast>, func: &'ast FnDeclaration) {
    match &func.body {
        FnBody::Block(body) => {
            for stmt in body {
                visitor.visit_stmt(stmt);
            }
        }
        FnBody::Lambda(expr) => visitor.visit_expr(expr),
        FnBody::Signature => {}
    }
}

pub fn walk_stmt<'ast>(visitor: &mut impl Visitor<'ast>, stmt: &'ast Stmt) {
    /// Iteratively visit all statements in a `Vec<Stmt>`.
    macro_rules! visit_stmt_list {
        ($visitor: expr, $body: expr) => {
            for stmt in $body {
                Visitor::visit_stmt($visitor, stmt);
            }
        };
    }

    match stmt {
        Stmt::LetDeclaration { initializer, .. } => visitor.visit_expr(initializer),
        Stmt::Assignment { value, .. } => visitor.visit_expr(value),
        Stmt::FnDeclaration(func) => visitor.visit_fn(func),
        Stmt::StructDeclaration(decl) => visit_stmt_list!(visitor, &decl.members),
        Stmt::Field { .. } | Stmt::EnumDeclaration(_) => {}
        Stmt::Block(body) => visit_stmt_list!(visitor, body),
        Stmt::IfStmt {
            condition,
            then_body,
            else_body,
        } => {
            visitor.visit_expr(condition);
            visit_stmt_list!(visitor, then_body);
            if let Some(else_body) = else_body {
                visitor.visit_stmt(else_body);
            }
        }
        Stmt::WhileStmt {
            condition,
            body,
            step,
        } => {
            visitor.visit_expr(condition);
            visit_stmt_list!(visitor, body);
            if let Some(step) = step {
                visitor.visit_stmt(step);
            }
        }
        Stmt::ForStmt {
            init,
            condition,
            step,
            body,
        } => {
            visitor.visit_stmt(init);
            visitor.visit_expr(condition);
            visit_stmt_list!(visitor, body);
            if let Some(step) = step {
                visitor.visit_stmt(step);
            }
        }
        Stmt::ReturnStmt(expr) => {
            if let Some(expr) = expr {
                visitor.visit_expr(expr);
            }
        }
        Stmt::NextStmt | Stmt::StopStmt => {}
        Stmt::ExprStmt(expr) => visitor.visit_expr(expr),
        Stmt::Error => {}
    }
}

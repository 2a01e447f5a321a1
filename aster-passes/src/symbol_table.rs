//! Scoped symbol table used by the analyzer.

use aster_parser::ast::{EnumDeclaration, FnDeclaration, Param, Stmt, StructDeclaration};
use std::collections::HashMap;

/// The node that declared a [`Symbol`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Declaration<'ast> {
    /// A [`Stmt::LetDeclaration`].
    Let(&'ast Stmt),
    Param(&'ast Param),
    Fn(&'ast FnDeclaration),
    Struct(&'ast StructDeclaration),
    Enum(&'ast EnumDeclaration),
    /// A value of the enum.
    EnumValue(&'ast EnumDeclaration),
}

impl<'ast> Declaration<'ast> {
    /// Describes the kind of symbol in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Declaration::Let(_) => "variable",
            Declaration::Param(_) => "parameter",
            Declaration::Fn(_) => "function",
            Declaration::Struct(decl) if decl.is_interface => "interface",
            Declaration::Struct(_) => "struct",
            Declaration::Enum(_) => "enum",
            Declaration::EnumValue(_) => "enum value",
        }
    }
}

/// Represents a symbol (created using `let`, `fn`, a parameter or a type declaration).
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol<'ast> {
    pub decl: Declaration<'ast>,
    /// Depth of the owning scope. `0` is global scope.
    pub scope_depth: usize,
}

impl<'ast> Symbol<'ast> {
    /// `let` without `mut`.
    pub fn is_constant(&self) -> bool {
        matches!(
            self.decl,
            Declaration::Let(Stmt::LetDeclaration {
                is_mutable: false,
                ..
            })
        )
    }

    /// Only variables and parameters can be assigned to.
    pub fn is_variable(&self) -> bool {
        matches!(self.decl, Declaration::Let(_) | Declaration::Param(_))
    }
}

/// How [`SymbolTable::lookup`] searches the scope stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeLookup {
    /// Search from the innermost scope outward.
    Lexical,
    /// Only search the innermost scope.
    Innermost,
}

impl Default for ScopeLookup {
    fn default() -> Self {
        ScopeLookup::Lexical
    }
}

#[derive(Debug, Default)]
pub struct Scope<'ast> {
    symbols: HashMap<String, Symbol<'ast>>,
}

/// A stack of [`Scope`]s. The bottom scope is the global scope and is never popped.
#[derive(Debug)]
pub struct SymbolTable<'ast> {
    scopes: Vec<Scope<'ast>>,
}

impl<'ast> SymbolTable<'ast> {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    /// Depth of the innermost scope. `0` is global scope.
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    pub fn is_global_scope(&self) -> bool {
        self.depth() == 0
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Drops every symbol of the innermost scope.
    pub fn exit_scope(&mut self) {
        debug_assert!(self.scopes.len() > 1, "cannot exit global scope");
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Declares `ident` in the innermost scope.
    /// Returns the existing symbol if `ident` is already declared in that same scope.
    pub fn declare(
        &mut self,
        ident: &str,
        decl: Declaration<'ast>,
    ) -> Result<(), Symbol<'ast>> {
        let scope_depth = self.depth();
        let scope = &mut self.scopes[scope_depth];
        if let Some(existing) = scope.symbols.get(ident) {
            return Err(existing.clone());
        }
        scope
            .symbols
            .insert(ident.to_string(), Symbol { decl, scope_depth });
        Ok(())
    }

    pub fn lookup(&self, ident: &str, mode: ScopeLookup) -> Option<&Symbol<'ast>> {
        match mode {
            ScopeLookup::Lexical => self
                .scopes
                .iter()
                .rev()
                .find_map(|scope| scope.symbols.get(ident)),
            ScopeLookup::Innermost => self.scopes.last()?.symbols.get(ident),
        }
    }
}

impl<'ast> Default for SymbolTable<'ast> {
    fn default() -> Self {
        Self::new()
    }
}

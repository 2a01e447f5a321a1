use super::*;
use std::mem;

impl<'a> Parser<'a> {
    /// Parses a declaration (or statement) and eats an optional trailing `;`.
    pub fn parse_declaration(&mut self) -> Stmt {
        let stmt = propagate!(match self.current_kind() {
            TokenKind::Let => self.parse_let_declaration(),
            TokenKind::Fn => self.parse_fn_declaration(false),
            TokenKind::Struct | TokenKind::Interface => self.parse_struct_declaration(false),
            TokenKind::Enum => self.parse_enum_declaration(false),
            TokenKind::Pub => self.parse_public_declaration(),
            _ => self.parse_stmt(),
        });
        self.eat(TokenKind::Semi);
        stmt
    }

    /// Parses a statement.
    pub fn parse_stmt(&mut self) -> Stmt {
        match self.current_kind() {
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::Stop => {
                self.next();
                Stmt::StopStmt
            }
            TokenKind::Next => {
                self.next();
                Stmt::NextStmt
            }
            TokenKind::OpenBrace => Stmt::Block(require!(self.parse_block())),
            TokenKind::Asterisk => self.parse_pointer_assignment(),
            TokenKind::Identifier => match self.peek_kind() {
                TokenKind::Equals => self.parse_assignment(0),
                TokenKind::Colon => self.parse_field(),
                // call-as-statement or any other expression
                _ => self.parse_expr_stmt(),
            },
            _ => self.parse_expr_stmt(),
        }
    }

    fn parse_expr_stmt(&mut self) -> Stmt {
        Stmt::ExprStmt(propagate!(self.parse_expr()))
    }

    /// Parses `{ declarations... }`.
    fn parse_block(&mut self) -> Option<Vec<Stmt>> {
        self.expect(TokenKind::OpenBrace, "`{` to start block")?;

        let mut body = Vec::new();
        while !self.eat(TokenKind::CloseBrace) {
            if self.current_kind() == TokenKind::Eof {
                self.error("expected `}` to close block");
                return None;
            }
            let stmt = self.parse_declaration();
            if stmt.is_error() {
                return None;
            }
            body.push(stmt);
        }

        Some(body)
    }

    /// Parses `pub` followed by a function, struct, interface or enum declaration.
    fn parse_public_declaration(&mut self) -> Stmt {
        self.next(); // pub
        match self.current_kind() {
            TokenKind::Fn => self.parse_fn_declaration(true),
            TokenKind::Struct | TokenKind::Interface => self.parse_struct_declaration(true),
            TokenKind::Enum => self.parse_enum_declaration(true),
            _ => {
                self.error("expected `fn`, `struct`, `interface` or `enum` after `pub`");
                Stmt::Error
            }
        }
    }

    fn parse_let_declaration(&mut self) -> Stmt {
        require!(self.expect(TokenKind::Let, "`let`"));
        let is_mutable = self.eat(TokenKind::Mut);
        let ident = require!(self.expect_ident("variable name after `let`"));
        require!(self.expect(
            TokenKind::Colon,
            "`:` and a type after the variable name, types are never inferred"
        ));
        let ty = require!(self.parse_type());
        require!(self.expect(TokenKind::Equals, "`=` after the variable type"));
        let initializer = propagate!(self.parse_expr());

        Stmt::LetDeclaration {
            ident,
            ty,
            initializer,
            is_mutable,
        }
    }

    /// Parses `ident = value` (`deref_depth` is `0`) or the part after the `*`s of a pointer assignment.
    fn parse_assignment(&mut self, deref_depth: u8) -> Stmt {
        let ident = require!(self.expect_ident("assignment target"));
        require!(self.expect(TokenKind::Equals, "`=` in assignment"));
        let value = propagate!(self.parse_expr());

        Stmt::Assignment {
            ident,
            deref_depth,
            value,
        }
    }

    /// Parses `**ident = value`.
    fn parse_pointer_assignment(&mut self) -> Stmt {
        let mut deref_depth = 0;
        while self.current_kind() == TokenKind::Asterisk {
            if deref_depth == MAX_POINTER_DEPTH {
                self.error(format!(
                    "too many levels of pointer indirection (at most {} allowed)",
                    MAX_POINTER_DEPTH
                ));
                return Stmt::Error;
            }
            self.next();
            deref_depth += 1;
        }
        self.parse_assignment(deref_depth)
    }

    /// Parses a struct member `ident: type`.
    fn parse_field(&mut self) -> Stmt {
        let ident = require!(self.expect_ident("field name"));
        require!(self.expect(TokenKind::Colon, "`:` after field name"));
        let ty = require!(self.parse_type());
        Stmt::Field { ident, ty }
    }

    fn parse_fn_declaration(&mut self, is_public: bool) -> Stmt {
        require!(self.expect(TokenKind::Fn, "`fn`"));
        let ident = require!(self.expect_ident("function name"));

        require!(self.expect(TokenKind::OpenParen, "`(` after function name"));
        let mut params = Vec::new();
        if !self.eat(TokenKind::CloseParen) {
            loop {
                let ident = require!(self.expect_ident("parameter name"));
                require!(self.expect(TokenKind::Colon, "`:` after parameter name"));
                let ty = require!(self.parse_type());
                params.push(Param { ident, ty });

                if self.eat(TokenKind::CloseParen) {
                    break;
                } else if !self.eat(TokenKind::Comma) {
                    self.error("expected `,` or `)` in parameter list");
                    return Stmt::Error;
                }
            }
        }

        require!(self.expect(TokenKind::Colon, "`:` and a return type"));
        let return_ty = require!(self.parse_type());

        let body = if self.current_kind() == TokenKind::OpenBrace {
            FnBody::Block(require!(self.parse_block()))
        } else if self.eat(TokenKind::FatArrow) {
            FnBody::Lambda(propagate!(self.parse_expr()))
        } else if self.in_interface {
            FnBody::Signature
        } else {
            self.error("expected `{` or `=>` to start function body");
            return Stmt::Error;
        };

        Stmt::FnDeclaration(FnDeclaration {
            ident,
            params,
            return_ty,
            body,
            is_public,
        })
    }

    /// Parses a `struct` or an `interface` declaration.
    fn parse_struct_declaration(&mut self, is_public: bool) -> Stmt {
        let is_interface = self.next().kind == TokenKind::Interface;
        let ident = require!(self.expect_ident("struct name"));
        require!(self.expect(TokenKind::OpenBrace, "`{` after struct name"));

        let was_in_interface = mem::replace(&mut self.in_interface, is_interface);
        let members = self.parse_struct_members(&ident);
        self.in_interface = was_in_interface;

        Stmt::StructDeclaration(StructDeclaration {
            ident,
            members: require!(members),
            is_interface,
            is_public,
        })
    }

    /// Every member is parsed as a declaration, then checked to be a field or a method.
    fn parse_struct_members(&mut self, struct_ident: &str) -> Option<Vec<Stmt>> {
        let mut members = Vec::new();
        while !self.eat(TokenKind::CloseBrace) {
            if self.current_kind() == TokenKind::Eof {
                self.error(format!("expected `}}` to close struct `{}`", struct_ident));
                return None;
            }
            let member = self.parse_declaration();
            match member {
                Stmt::Field { .. } | Stmt::FnDeclaration(_) => members.push(member),
                Stmt::Error => return None,
                _ => {
                    self.error(format!(
                        "expected a field or a method in struct `{}`",
                        struct_ident
                    ));
                    return None;
                }
            }
        }
        Some(members)
    }

    fn parse_enum_declaration(&mut self, is_public: bool) -> Stmt {
        require!(self.expect(TokenKind::Enum, "`enum`"));
        let ident = require!(self.expect_ident("enum name"));
        require!(self.expect(TokenKind::OpenBrace, "`{` after enum name"));

        let mut values = Vec::new();
        while !self.eat(TokenKind::CloseBrace) {
            values.push(require!(self.expect_ident("enum value or `}`")));
            self.eat(TokenKind::Comma);
        }
        if values.is_empty() {
            self.error(format!("enum `{}` must have at least one value", ident));
            return Stmt::Error;
        }

        Stmt::EnumDeclaration(EnumDeclaration {
            ident,
            values,
            is_public,
        })
    }

    fn parse_if_stmt(&mut self) -> Stmt {
        require!(self.expect(TokenKind::If, "`if`"));
        let condition = propagate!(self.parse_expr_bp(0));
        let then_body = require!(self.parse_block());

        let else_body = if self.eat(TokenKind::Else) {
            let else_body = if self.current_kind() == TokenKind::If {
                propagate!(self.parse_if_stmt())
            } else {
                Stmt::Block(require!(self.parse_block()))
            };
            Some(Box::new(else_body))
        } else {
            None
        };

        Stmt::IfStmt {
            condition,
            then_body,
            else_body,
        }
    }

    /// Parses `while condition [: step] { body }`.
    fn parse_while_stmt(&mut self) -> Stmt {
        require!(self.expect(TokenKind::While, "`while`"));
        let condition = propagate!(self.parse_expr_bp(0));
        let step = if self.eat(TokenKind::Colon) {
            Some(Box::new(propagate!(self.parse_loop_step())))
        } else {
            None
        };
        let body = require!(self.parse_block());

        Stmt::WhileStmt {
            condition,
            body,
            step,
        }
    }

    /// Parses `for init; condition [; step] { body }`.
    fn parse_for_stmt(&mut self) -> Stmt {
        require!(self.expect(TokenKind::For, "`for`"));
        let init = propagate!(if self.current_kind() == TokenKind::Let {
            self.parse_let_declaration()
        } else {
            self.parse_stmt()
        });
        if !matches!(init, Stmt::LetDeclaration { .. } | Stmt::Assignment { .. }) {
            self.error("expected a `let` or an assignment to initialize the `for` loop");
            return Stmt::Error;
        }
        require!(self.expect(TokenKind::Semi, "`;` after `for` initializer"));
        let condition = propagate!(self.parse_expr_bp(0));
        let step = if self.eat(TokenKind::Semi) {
            Some(Box::new(propagate!(self.parse_loop_step())))
        } else {
            None
        };
        let body = require!(self.parse_block());

        Stmt::ForStmt {
            init: Box::new(init),
            condition,
            step,
            body,
        }
    }

    /// Parses the step of a `while` or `for` loop: an assignment or an expression, which both fit
    /// in the header of a C `for`.
    fn parse_loop_step(&mut self) -> Stmt {
        const MESSAGE: &str = "expected an assignment or an expression as the loop step";

        let is_statement_keyword = matches!(
            self.current_kind(),
            TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Return
                | TokenKind::Stop
                | TokenKind::Next
                | TokenKind::OpenBrace
                | TokenKind::Let
                | TokenKind::Fn
                | TokenKind::Struct
                | TokenKind::Interface
                | TokenKind::Enum
                | TokenKind::Pub
        );
        if is_statement_keyword {
            self.error(MESSAGE);
            return Stmt::Error;
        }

        let step = propagate!(self.parse_stmt());
        if !matches!(step, Stmt::Assignment { .. } | Stmt::ExprStmt(_)) {
            self.error(MESSAGE);
            return Stmt::Error;
        }
        step
    }

    fn parse_return_stmt(&mut self) -> Stmt {
        require!(self.expect(TokenKind::Return, "`return`"));
        match self.current_kind() {
            TokenKind::CloseBrace | TokenKind::Semi | TokenKind::Eof => Stmt::ReturnStmt(None),
            _ => Stmt::ReturnStmt(Some(propagate!(self.parse_expr()))),
        }
    }
}

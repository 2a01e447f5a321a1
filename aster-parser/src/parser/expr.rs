use super::*;

/// Maps an infix operator token to its [`BinaryOp`].
fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Or => BinaryOp::Or,
        TokenKind::And => BinaryOp::And,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::Caret => BinaryOp::BitXor,
        TokenKind::Ampersand => BinaryOp::BitAnd,
        TokenKind::EqualsEquals => BinaryOp::Eq,
        TokenKind::NotEquals => BinaryOp::NotEq,
        TokenKind::LessThan => BinaryOp::Less,
        TokenKind::LessThanEquals => BinaryOp::LessEq,
        TokenKind::GreaterThan => BinaryOp::Greater,
        TokenKind::GreaterThanEquals => BinaryOp::GreaterEq,
        TokenKind::ShiftLeft => BinaryOp::ShiftLeft,
        TokenKind::ShiftRight => BinaryOp::ShiftRight,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Asterisk => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Rem,
        TokenKind::As => BinaryOp::As,
        _ => return None,
    };
    Some(op)
}

impl<'a> Parser<'a> {
    /* Expressions */
    /// Parses any expression.
    /// A leading `if` starts a ternary, everything else goes through [`Self::parse_expr_bp`] with `min_bp = 0`.
    pub fn parse_expr(&mut self) -> Expr {
        if self.current_kind() == TokenKind::If {
            self.parse_ternary_expr()
        } else {
            self.parse_expr_bp(0) // 0 to accept any expression
        }
    }

    /// Parses `if condition then expr else expr`.
    fn parse_ternary_expr(&mut self) -> Expr {
        self.next(); // if
        let condition = propagate!(self.parse_expr_bp(0));
        require!(self.expect(TokenKind::Then, "`then` after ternary condition"));
        let then_expr = propagate!(self.parse_expr());
        require!(self.expect(TokenKind::Else, "`else` in ternary expression"));
        let else_expr = propagate!(self.parse_expr());

        Expr::Ternary {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        }
    }

    /// Parses an expression with the specified `min_bp`.
    /// To parse any expression use, [`Self::parse_expr`].
    pub(super) fn parse_expr_bp(&mut self, min_bp: u8) -> Expr {
        let mut lhs = propagate!(self.parse_unary_expr());

        loop {
            let kind = self.current_kind();
            let (l_bp, r_bp) = match kind.binop_bp() {
                Some(bp) => bp,
                None => break, // not a valid binop, stop parsing
            };
            if l_bp < min_bp {
                break; // less than the min_bp, stop parsing
            }
            let op = require!(binary_op(kind));
            self.next();

            let rhs = if op == BinaryOp::As {
                Expr::Type(require!(self.parse_type()))
            } else {
                propagate!(self.parse_expr_bp(r_bp))
            };

            lhs = Expr::Binary {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
            }
        }

        lhs
    }

    /// Parses prefix `-`, `+`, `not` and `~`.
    fn parse_unary_expr(&mut self) -> Expr {
        let op = match self.current_kind() {
            TokenKind::Minus => UnaryOp::Negate,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Not => UnaryOp::Not,
            TokenKind::Tilde => UnaryOp::BitNot,
            _ => return self.parse_pointer_expr(),
        };
        self.next();
        let arg = propagate!(self.parse_unary_expr());
        Expr::Unary {
            op,
            arg: Box::new(arg),
        }
    }

    /// Parses prefix `*` (deref), `&` (address-of) and `sizeof`.
    fn parse_pointer_expr(&mut self) -> Expr {
        let op = match self.current_kind() {
            TokenKind::Asterisk => UnaryOp::Deref,
            TokenKind::Ampersand => UnaryOp::AddressOf,
            TokenKind::Sizeof => UnaryOp::Sizeof,
            _ => return self.parse_primary_expr(),
        };
        self.next();
        let arg = propagate!(self.parse_pointer_expr());
        Expr::Unary {
            op,
            arg: Box::new(arg),
        }
    }

    /// Parses a primary (atom) expression.
    fn parse_primary_expr(&mut self) -> Expr {
        match self.current_kind() {
            TokenKind::IntLit
            | TokenKind::FloatLit
            | TokenKind::StringLit
            | TokenKind::CharLit
            | TokenKind::True
            | TokenKind::False => self.parse_literal_expr(),
            TokenKind::Identifier => self.parse_identifier_or_call_expr(),
            TokenKind::OpenParen => {
                self.next();
                let inner = propagate!(self.parse_expr());
                require!(self.expect(TokenKind::CloseParen, "`)` to close group"));
                Expr::Grouping(Box::new(inner))
            }
            TokenKind::Match => self.parse_match_expr(),
            _ => {
                self.error("expected expression");
                Expr::Error
            }
        }
    }

    /* Expressions.Literals */
    /// Parses a literal expression.
    fn parse_literal_expr(&mut self) -> Expr {
        let token = self.current().clone();
        let quoted = || token.lexeme[1..token.lexeme.len() - 1].to_string();
        let val = match token.kind {
            TokenKind::IntLit => match token.lexeme.parse() {
                Ok(val) => Expr::IntLit(val),
                Err(_) => {
                    self.error(format!("integer literal `{}` is too large", token.lexeme));
                    return Expr::Error;
                }
            },
            TokenKind::FloatLit => match token.lexeme.parse() {
                Ok(val) => Expr::FloatLit(val),
                Err(_) => {
                    self.error(format!("invalid float literal `{}`", token.lexeme));
                    return Expr::Error;
                }
            },
            TokenKind::StringLit => Expr::StringLit(quoted()),
            TokenKind::CharLit => Expr::CharLit(quoted()),
            TokenKind::True => Expr::BoolLit(true),
            TokenKind::False => Expr::BoolLit(false),
            _ => {
                self.error("expected literal");
                return Expr::Error;
            }
        };
        self.next(); // eat parsed token if not error
        val
    }

    /* Expressions.Identifier */
    /// Parses an identifier or a call expression.
    pub(super) fn parse_identifier_or_call_expr(&mut self) -> Expr {
        let ident = require!(self.expect_ident("identifier"));

        if self.eat(TokenKind::OpenParen) {
            // parse call expression
            let mut args = Vec::new();

            if !self.eat(TokenKind::CloseParen) {
                loop {
                    args.push(propagate!(self.parse_expr()));

                    if self.eat(TokenKind::CloseParen) {
                        break;
                    } else if !self.eat(TokenKind::Comma) {
                        self.error("expected `,` or `)` in argument list");
                        return Expr::Error;
                    }
                }
            }

            Expr::FnCall { ident, args }
        } else {
            // parse identifier expression
            Expr::Identifier(ident)
        }
    }

    /* Expressions.Match */
    /// Parses `match scrutinee { pattern => expr, else => expr }`.
    fn parse_match_expr(&mut self) -> Expr {
        self.next(); // match
        let scrutinee = propagate!(self.parse_expr_bp(0));
        require!(self.expect(TokenKind::OpenBrace, "`{` after match scrutinee"));

        let mut cases = Vec::new();
        let mut else_case = None;
        while !self.eat(TokenKind::CloseBrace) {
            if self.current_kind() == TokenKind::Eof {
                self.error("expected `}` to close match");
                return Expr::Error;
            }
            if else_case.is_some() {
                self.error("the `else` case must be the last match case");
                return Expr::Error;
            }

            if self.eat(TokenKind::Else) {
                require!(self.expect(TokenKind::FatArrow, "`=>` after `else`"));
                let result = propagate!(self.parse_expr());
                else_case = Some(Box::new(MatchCase {
                    pattern: None,
                    result,
                    is_else: true,
                }));
            } else {
                let pattern = propagate!(self.parse_expr_bp(0));
                require!(self.expect(TokenKind::FatArrow, "`=>` after match pattern"));
                let result = propagate!(self.parse_expr());
                cases.push(MatchCase {
                    pattern: Some(pattern),
                    result,
                    is_else: false,
                });
            }

            self.eat(TokenKind::Comma);
        }

        Expr::Match(MatchExpr {
            scrutinee: Box::new(scrutinee),
            cases,
            else_case,
        })
    }

    /* Types */
    /// Parses a type annotation: up to [`MAX_POINTER_DEPTH`] `*` followed by a type name.
    pub(super) fn parse_type(&mut self) -> Option<TypeRef> {
        let mut pointer_depth = 0;
        while self.current_kind() == TokenKind::Asterisk {
            if pointer_depth == MAX_POINTER_DEPTH {
                self.error(format!(
                    "too many levels of pointer indirection (at most {} allowed)",
                    MAX_POINTER_DEPTH
                ));
                return None;
            }
            self.next();
            pointer_depth += 1;
        }
        let name = self.expect_ident("type name")?;
        Some(TypeRef {
            name,
            pointer_depth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_debug_snapshot;

    fn expr(source: &str) -> Expr {
        let source = source.into();
        let ast = Parser::new(&source).parse_expr();
        assert!(source.has_no_errors(), "{}", source.errors);
        ast
    }

    fn expr_error(source: &str) -> String {
        let source = source.into();
        let mut parser = Parser::new(&source);
        let ast = parser.parse_expr();
        assert_eq!(ast, Expr::Error);
        assert!(parser.had_error());
        let message = source.errors.errors()[0].message.clone();
        message
    }

    fn binary(lhs: Expr, op: BinaryOp, rhs: Expr) -> Expr {
        Expr::Binary {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        }
    }

    #[test]
    fn test_literal() {
        assert_eq!(expr("true"), Expr::BoolLit(true));
        assert_eq!(expr("false"), Expr::BoolLit(false));
        assert_eq!(expr("1"), Expr::IntLit(1));
        assert_eq!(expr("2.5"), Expr::FloatLit(2.5));
        assert_eq!(expr(r#""hi\n""#), Expr::StringLit(r"hi\n".to_string()));
        assert_eq!(expr("'a'"), Expr::CharLit("a".to_string()));
        assert_eq!(
            expr("18446744073709551615"),
            Expr::IntLit(18_446_744_073_709_551_615)
        );
    }

    #[test]
    fn test_precedence() {
        assert_debug_snapshot!(expr("1 + 2 * 3"), @r###"
        Binary {
            lhs: IntLit(
                1,
            ),
            op: Add,
            rhs: Binary {
                lhs: IntLit(
                    2,
                ),
                op: Mul,
                rhs: IntLit(
                    3,
                ),
            },
        }
        "###);
        assert_eq!(
            expr("2 * 3 + 1"),
            binary(
                binary(Expr::IntLit(2), BinaryOp::Mul, Expr::IntLit(3)),
                BinaryOp::Add,
                Expr::IntLit(1)
            )
        );
    }

    #[test]
    fn test_left_associativity() {
        // (2 - 2) - 2
        assert_eq!(
            expr("2 - 2 - 2"),
            binary(
                binary(Expr::IntLit(2), BinaryOp::Sub, Expr::IntLit(2)),
                BinaryOp::Sub,
                Expr::IntLit(2)
            )
        );
    }

    #[test]
    fn test_tiers() {
        let a = || Expr::Identifier("a".to_string());
        let b = || Expr::Identifier("b".to_string());
        let c = || Expr::Identifier("c".to_string());
        // or < and
        assert_eq!(
            expr("a or b and c"),
            binary(a(), BinaryOp::Or, binary(b(), BinaryOp::And, c()))
        );
        // bitwise-and < equality
        assert_eq!(
            expr("a & b == c"),
            binary(a(), BinaryOp::BitAnd, binary(b(), BinaryOp::Eq, c()))
        );
        // relational < shift
        assert_eq!(
            expr("a < b << c"),
            binary(a(), BinaryOp::Less, binary(b(), BinaryOp::ShiftLeft, c()))
        );
        // bit-or < bit-xor
        assert_eq!(
            expr("a | b ^ c"),
            binary(a(), BinaryOp::BitOr, binary(b(), BinaryOp::BitXor, c()))
        );
    }

    #[test]
    fn test_cast() {
        assert_eq!(
            expr("a * b as *u8"),
            binary(
                binary(
                    Expr::Identifier("a".to_string()),
                    BinaryOp::Mul,
                    Expr::Identifier("b".to_string())
                ),
                BinaryOp::As,
                Expr::Type(TypeRef::new("u8", 1))
            )
        );
    }

    #[test]
    fn test_unary_and_pointer_ops() {
        assert_eq!(
            expr("-*p"),
            Expr::Unary {
                op: UnaryOp::Negate,
                arg: Box::new(Expr::Unary {
                    op: UnaryOp::Deref,
                    arg: Box::new(Expr::Identifier("p".to_string())),
                }),
            }
        );
        assert_eq!(
            expr("not not sizeof x"),
            Expr::Unary {
                op: UnaryOp::Not,
                arg: Box::new(Expr::Unary {
                    op: UnaryOp::Not,
                    arg: Box::new(Expr::Unary {
                        op: UnaryOp::Sizeof,
                        arg: Box::new(Expr::Identifier("x".to_string())),
                    }),
                }),
            }
        );
        // unary binds tighter than binary operators
        assert!(matches!(
            expr("-a + b"),
            Expr::Binary {
                op: BinaryOp::Add,
                ..
            }
        ));
        assert_eq!(expr_error("*-p"), "expected expression");
    }

    #[test]
    fn test_ternary() {
        assert_eq!(
            expr("if a > 1 then 1 else if b then 2 else 3"),
            Expr::Ternary {
                condition: Box::new(binary(
                    Expr::Identifier("a".to_string()),
                    BinaryOp::Greater,
                    Expr::IntLit(1)
                )),
                then_expr: Box::new(Expr::IntLit(1)),
                else_expr: Box::new(Expr::Ternary {
                    condition: Box::new(Expr::Identifier("b".to_string())),
                    then_expr: Box::new(Expr::IntLit(2)),
                    else_expr: Box::new(Expr::IntLit(3)),
                }),
            }
        );
        assert_eq!(expr_error("if a then 1"), "expected `else` in ternary expression");
    }

    #[test]
    fn test_grouping() {
        assert_eq!(
            expr("(1 + 2) * 3"),
            binary(
                Expr::Grouping(Box::new(binary(
                    Expr::IntLit(1),
                    BinaryOp::Add,
                    Expr::IntLit(2)
                ))),
                BinaryOp::Mul,
                Expr::IntLit(3)
            )
        );
        assert_eq!(expr_error("(1 + 2"), "expected `)` to close group");
    }

    #[test]
    fn test_fn_call() {
        assert_eq!(
            expr("foo()"),
            Expr::FnCall {
                ident: "foo".to_string(),
                args: vec![]
            }
        );
        assert_eq!(
            expr("foo(1, bar, baz())"),
            Expr::FnCall {
                ident: "foo".to_string(),
                args: vec![
                    Expr::IntLit(1),
                    Expr::Identifier("bar".to_string()),
                    Expr::FnCall {
                        ident: "baz".to_string(),
                        args: vec![]
                    }
                ]
            }
        );
        assert_eq!(expr_error("foo(1 2)"), "expected `,` or `)` in argument list");
    }

    #[test]
    fn test_match() {
        let ast = expr("match x { 1 => 10, 2 => 20 else => 0 }");
        let m = match ast {
            Expr::Match(m) => m,
            other => panic!("expected match, got {:?}", other),
        };
        assert_eq!(*m.scrutinee, Expr::Identifier("x".to_string()));
        assert_eq!(m.cases.len(), 2);
        assert_eq!(m.cases[1].pattern, Some(Expr::IntLit(2)));
        assert_eq!(m.cases[1].result, Expr::IntLit(20));
        assert!(!m.cases[0].is_else);
        let else_case = m.else_case.expect("else case");
        assert!(else_case.is_else);
        assert_eq!(else_case.pattern, None);
        assert_eq!(else_case.result, Expr::IntLit(0));

        assert_eq!(
            expr_error("match x { else => 0, 1 => 1 }"),
            "the `else` case must be the last match case"
        );
        assert_eq!(expr_error("match x { 1 => 2"), "expected `}` to close match");
    }
}

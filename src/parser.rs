// ABOUTME: Pratt parser turning the token stream into a program AST
// Two-token lookahead; diagnostics accumulate so one run surfaces many

use crate::ast::{Block, Expr, Identifier, Program, Stmt, TypeLiteral};
use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind, TokenSubkind};
use std::rc::Rc;

use TokenKind as K;
use TokenSubkind as S;

/// Binding power levels, lowest to highest. `to` shares the `and`/`or`
/// level so that `a to b` composes naturally in list and slice contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    AndOr,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

fn precedence_of(subkind: TokenSubkind) -> Precedence {
    match subkind {
        S::And | S::Or | S::To => Precedence::AndOr,
        S::Is | S::IsNot => Precedence::Equals,
        S::Lt | S::Gt | S::Lte | S::Gte => Precedence::LessGreater,
        S::Plus | S::Minus => Precedence::Sum,
        S::Slash | S::Asterisk => Precedence::Product,
        S::Lparen | S::Dot => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

pub struct Parser {
    lexer: Lexer,
    current: Token,
    peek: Token,
    pub errors: Vec<ParseError>,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Self {
        let current = lexer.next_token();
        let peek = lexer.next_token();
        Parser {
            lexer,
            current,
            peek,
            errors: Vec::new(),
        }
    }

    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while self.current.kind != K::Eof {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }
        Program { statements }
    }

    fn next_token(&mut self) {
        self.current = std::mem::replace(&mut self.peek, self.lexer.next_token());
    }

    fn expect_peek(&mut self, subkind: TokenSubkind, label: &str) -> bool {
        if self.peek.subkind == subkind {
            self.next_token();
            return true;
        }
        self.errors.push(ParseError::UnexpectedToken {
            expected: label.to_string(),
            got: self.peek.literal.clone(),
        });
        false
    }

    fn expect_peek_identifier(&mut self) -> bool {
        if self.peek.kind == K::Identifier {
            self.next_token();
            return true;
        }
        self.errors.push(ParseError::UnexpectedToken {
            expected: "identifier".to_string(),
            got: self.peek.literal.clone(),
        });
        false
    }

    /// A statement ends when the next token opens another statement: any
    /// keyword other than `to`, or the end of input.
    fn peek_ends_expression(&self) -> bool {
        (self.peek.kind == K::Keyword && self.peek.subkind != S::To) || self.peek.kind == K::Eof
    }

    fn peek_precedence(&self) -> Precedence {
        precedence_of(self.peek.subkind)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_statement(&mut self) -> Option<Stmt> {
        match (self.current.kind, self.current.subkind) {
            (K::Keyword, S::Let) => self.parse_let(),
            (K::Keyword, S::Return) => {
                self.next_token();
                Some(Stmt::Return(self.parse_expression(Precedence::Lowest)?))
            }
            (K::Keyword, S::Mut) => self.parse_mut(),
            (K::Keyword, S::Exe) => {
                self.next_token();
                Some(Stmt::Exe(self.parse_expression(Precedence::Lowest)?))
            }
            (K::Keyword, S::Break) => {
                let cond = self.parse_loop_exit_condition()?;
                Some(Stmt::Break { cond })
            }
            (K::Keyword, S::Continue) => {
                let cond = self.parse_loop_exit_condition()?;
                Some(Stmt::Continue { cond })
            }
            (K::Keyword, S::Pass) => Some(Stmt::Pass),
            _ => Some(Stmt::Expression(self.parse_expression(Precedence::Lowest)?)),
        }
    }

    /// `let IDENT: TYPE = EXPR`, `let IDENT be EXPR`, `let IDENT = EXPR`.
    /// The annotation-free forms record the type inferred from the literal.
    fn parse_let(&mut self) -> Option<Stmt> {
        if !self.expect_peek_identifier() {
            return None;
        }
        let name = self.current.literal.clone();

        let mut ty = None;
        match self.peek.subkind {
            S::Colon => {
                self.next_token();
                self.next_token();
                ty = Some(self.parse_type_literal()?);
                if !self.expect_peek(S::Assign, "=") {
                    return None;
                }
            }
            S::Be | S::Assign => self.next_token(),
            _ => {
                self.errors.push(ParseError::UnexpectedToken {
                    expected: ": or be".to_string(),
                    got: self.peek.literal.clone(),
                });
                return None;
            }
        }

        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        let ty = ty.or_else(|| infer_type(&value));
        Some(Stmt::Let {
            name: Identifier { name, ty },
            value,
        })
    }

    /// `mut TARGET to EXPR`; TARGET is an identifier or `ident(index)`.
    fn parse_mut(&mut self) -> Option<Stmt> {
        if !self.expect_peek_identifier() {
            return None;
        }
        let identifier = Expr::Identifier(Identifier::new(self.current.literal.clone()));

        let target = if self.peek.subkind == S::Lparen {
            self.next_token();
            let args = self.parse_expression_list(S::Rparen, ")")?;
            Expr::Call {
                callee: Box::new(identifier),
                args,
            }
        } else {
            identifier
        };

        if !self.expect_peek(S::To, "to") {
            return None;
        }
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        Some(Stmt::Mut { target, value })
    }

    /// The optional `if EXPR` tail of `break` and `continue`.
    fn parse_loop_exit_condition(&mut self) -> Option<Option<Expr>> {
        if self.peek.subkind != S::If {
            return Some(None);
        }
        self.next_token();
        self.next_token();
        Some(Some(self.parse_expression(Precedence::Lowest)?))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expr> {
        let mut left = self.parse_prefix()?;
        while !self.peek_ends_expression() && precedence < self.peek_precedence() {
            self.next_token();
            left = self.parse_infix(left)?;
        }
        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expr> {
        match (self.current.kind, self.current.subkind) {
            (K::Identifier, _) => Some(Expr::Identifier(Identifier::new(
                self.current.literal.clone(),
            ))),
            (K::Literal, S::I64) => match self.current.literal.parse::<i64>() {
                Ok(value) => Some(Expr::Integer(value)),
                Err(_) => {
                    self.errors
                        .push(ParseError::InvalidInteger(self.current.literal.clone()));
                    None
                }
            },
            (K::Literal, S::F64) => match self.current.literal.parse::<f64>() {
                Ok(value) => Some(Expr::Float(value)),
                Err(_) => {
                    self.errors
                        .push(ParseError::InvalidFloat(self.current.literal.clone()));
                    None
                }
            },
            (K::Literal, S::Str) => Some(Expr::Str(self.current.literal.clone())),
            (K::Literal, S::True) => Some(Expr::Bool(true)),
            (K::Literal, S::False) => Some(Expr::Bool(false)),
            (K::Operator, S::Minus) | (K::Operator, S::Not) => {
                let op = self.current.clone();
                self.next_token();
                let right = self.parse_expression(Precedence::Prefix)?;
                Some(Expr::Prefix {
                    op,
                    right: Box::new(right),
                })
            }
            (K::Delimiter, S::Lparen) => {
                self.next_token();
                let expr = self.parse_expression(Precedence::Lowest)?;
                if !self.expect_peek(S::Rparen, ")") {
                    return None;
                }
                Some(expr)
            }
            (K::Delimiter, S::Dot) => self.parse_receiverless_method(),
            (K::Keyword, S::If) => self.parse_if(),
            (K::Keyword, S::While) => self.parse_while(),
            (K::Keyword, S::For) => self.parse_for(),
            (K::Type, S::Fn) => self.parse_function(),
            (K::Type, S::List) => self.parse_list(),
            (K::Type, S::Map) => self.parse_map(),
            (K::Type, S::None) => Some(Expr::TypeLiteral(TypeLiteral {
                token: self.current.clone(),
                subtypes: vec![],
            })),
            _ => {
                self.errors
                    .push(ParseError::NoPrefixRule(self.current.literal.clone()));
                None
            }
        }
    }

    fn parse_infix(&mut self, left: Expr) -> Option<Expr> {
        match self.current.subkind {
            S::Lparen => {
                let args = self.parse_expression_list(S::Rparen, ")")?;
                Some(Expr::Call {
                    callee: Box::new(left),
                    args,
                })
            }
            S::Dot => self.parse_method(left),
            S::Plus
            | S::Minus
            | S::Asterisk
            | S::Slash
            | S::Lt
            | S::Gt
            | S::Lte
            | S::Gte
            | S::And
            | S::Or
            | S::To
            | S::Is
            | S::IsNot => {
                let mut op = self.current.clone();
                // `is not` collapses into a single operator at parse time.
                if op.subkind == S::Is && self.peek.subkind == S::Not {
                    self.next_token();
                    op = Token::is_not();
                }
                let precedence = precedence_of(op.subkind);
                self.next_token();
                let right = self.parse_expression(precedence)?;
                Some(Expr::Infix {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
            _ => {
                self.errors
                    .push(ParseError::NoPrefixRule(self.current.literal.clone()));
                None
            }
        }
    }

    /// `receiver.name(args)` or the reserved attribute form `receiver.name`.
    fn parse_method(&mut self, receiver: Expr) -> Option<Expr> {
        if !self.expect_peek_identifier() {
            return None;
        }
        let name = self.current.literal.clone();
        if self.peek.subkind != S::Lparen {
            return Some(Expr::Attribute {
                receiver: Box::new(receiver),
                name,
            });
        }
        self.next_token();
        let args = self.parse_expression_list(S::Rparen, ")")?;
        Some(Expr::Method {
            receiver: Some(Box::new(receiver)),
            name,
            args,
        })
    }

    /// `.name(args)` with no left-hand side; only meaningful as the
    /// right-hand side of `mut`, where the target supplies the receiver.
    fn parse_receiverless_method(&mut self) -> Option<Expr> {
        if !self.expect_peek_identifier() {
            return None;
        }
        let name = self.current.literal.clone();
        if !self.expect_peek(S::Lparen, "(") {
            return None;
        }
        let args = self.parse_expression_list(S::Rparen, ")")?;
        Some(Expr::Method {
            receiver: None,
            name,
            args,
        })
    }

    fn parse_if(&mut self) -> Option<Expr> {
        self.next_token();
        let cond = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(S::Lbrace, "{") {
            return None;
        }
        let consequence = self.parse_block();

        let mut alternative = None;
        if self.peek.subkind == S::Else {
            self.next_token();
            if self.peek.subkind == S::If {
                // `else if` nests the chained conditional in the alternative.
                self.next_token();
                let nested = self.parse_if()?;
                alternative = Some(Block {
                    statements: vec![Stmt::Expression(nested)],
                });
            } else {
                if !self.expect_peek(S::Lbrace, "{") {
                    return None;
                }
                alternative = Some(self.parse_block());
            }
        }

        Some(Expr::If {
            cond: Box::new(cond),
            consequence,
            alternative,
        })
    }

    fn parse_while(&mut self) -> Option<Expr> {
        self.next_token();
        let cond = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(S::Lbrace, "{") {
            return None;
        }
        let body = self.parse_block();
        Some(Expr::While {
            cond: Box::new(cond),
            body,
        })
    }

    fn parse_for(&mut self) -> Option<Expr> {
        let index = self.parse_loop_binding()?;
        if !self.expect_peek(S::Comma, ",") {
            return None;
        }
        let value = self.parse_loop_binding()?;
        if !self.expect_peek(S::In, "in") {
            return None;
        }
        self.next_token();
        let iterable = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(S::Lbrace, "{") {
            return None;
        }
        let body = self.parse_block();
        Some(Expr::For {
            index,
            value,
            iterable: Box::new(iterable),
            body,
        })
    }

    /// A loop binding is an identifier or the `_` wildcard (bind nothing).
    fn parse_loop_binding(&mut self) -> Option<Option<String>> {
        if self.peek.kind == K::Identifier {
            self.next_token();
            return Some(Some(self.current.literal.clone()));
        }
        if self.peek.subkind == S::Underscore {
            self.next_token();
            return Some(None);
        }
        self.errors.push(ParseError::UnexpectedToken {
            expected: "identifier or _".to_string(),
            got: self.peek.literal.clone(),
        });
        None
    }

    /// `fn(IDENT: TYPE, ...): TYPE { BLOCK }`
    fn parse_function(&mut self) -> Option<Expr> {
        if !self.expect_peek(S::Lparen, "(") {
            return None;
        }

        let mut params = Vec::new();
        if self.peek.subkind == S::Rparen {
            self.next_token();
        } else {
            loop {
                if !self.expect_peek_identifier() {
                    return None;
                }
                let name = self.current.literal.clone();
                if !self.expect_peek(S::Colon, ":") {
                    return None;
                }
                self.next_token();
                let ty = self.parse_type_literal()?;
                params.push(Identifier { name, ty: Some(ty) });
                if self.peek.subkind == S::Comma {
                    self.next_token();
                } else {
                    break;
                }
            }
            if !self.expect_peek(S::Rparen, ")") {
                return None;
            }
        }

        if !self.expect_peek(S::Colon, ":") {
            return None;
        }
        self.next_token();
        let return_ty = self.parse_type_literal()?;

        if !self.expect_peek(S::Lbrace, "{") {
            return None;
        }
        let body = self.parse_block();

        Some(Expr::Function {
            params: Rc::new(params),
            return_ty: Some(return_ty),
            body: Rc::new(body),
        })
    }

    /// `list(...)` literal, or the bare `list` type token.
    fn parse_list(&mut self) -> Option<Expr> {
        if self.peek.subkind != S::Lparen {
            return Some(Expr::TypeLiteral(TypeLiteral {
                token: self.current.clone(),
                subtypes: vec![],
            }));
        }
        self.next_token();
        let elements = self.parse_expression_list(S::Rparen, ")")?;
        Some(Expr::List(elements))
    }

    /// `map(k: v, ...)` literal, or the bare `map` type token.
    fn parse_map(&mut self) -> Option<Expr> {
        if self.peek.subkind != S::Lparen {
            return Some(Expr::TypeLiteral(TypeLiteral {
                token: self.current.clone(),
                subtypes: vec![],
            }));
        }
        self.next_token();

        let mut pairs = Vec::new();
        if self.peek.subkind == S::Rparen {
            self.next_token();
            return Some(Expr::Map(pairs));
        }
        loop {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            if !self.expect_peek(S::Colon, ":") {
                return None;
            }
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if self.peek.subkind != S::Comma {
                break;
            }
            self.next_token();
            if self.peek.subkind == S::Rparen {
                break;
            }
        }
        if !self.expect_peek(S::Rparen, ")") {
            return None;
        }
        Some(Expr::Map(pairs))
    }

    /// Parses `{ ... }` with the current token on the opening brace;
    /// finishes with the current token on the closing brace.
    fn parse_block(&mut self) -> Block {
        let mut statements = Vec::new();
        self.next_token();
        while self.current.subkind != S::Rbrace && self.current.kind != K::Eof {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }
        Block { statements }
    }

    /// Comma-separated expressions up to `end`; tolerates a trailing comma.
    fn parse_expression_list(&mut self, end: TokenSubkind, label: &str) -> Option<Vec<Expr>> {
        let mut items = Vec::new();
        if self.peek.subkind == end {
            self.next_token();
            return Some(items);
        }

        self.next_token();
        items.push(self.parse_expression(Precedence::Lowest)?);
        while self.peek.subkind == S::Comma {
            self.next_token();
            if self.peek.subkind == end {
                break;
            }
            self.next_token();
            items.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(end, label) {
            return None;
        }
        Some(items)
    }

    fn parse_type_literal(&mut self) -> Option<TypeLiteral> {
        if self.current.kind != K::Type {
            self.errors.push(ParseError::UnexpectedToken {
                expected: "type".to_string(),
                got: self.current.literal.clone(),
            });
            return None;
        }
        let token = self.current.clone();

        let mut subtypes = Vec::new();
        // Only the container types take subtype parameters.
        if matches!(token.subkind, S::List | S::Map) && self.peek.subkind == S::Lparen {
            self.next_token();
            loop {
                self.next_token();
                if self.current.kind != K::Type {
                    self.errors.push(ParseError::UnexpectedToken {
                        expected: "type".to_string(),
                        got: self.current.literal.clone(),
                    });
                    return None;
                }
                subtypes.push(self.current.clone());
                if self.peek.subkind == S::Comma {
                    self.next_token();
                } else {
                    break;
                }
            }
            if !self.expect_peek(S::Rparen, ")") {
                return None;
            }
        }

        Some(TypeLiteral { token, subtypes })
    }
}

/// Type recorded on annotation-free `let` bindings, derived from the shape
/// of the bound literal.
fn infer_type(value: &Expr) -> Option<TypeLiteral> {
    let word = match value {
        Expr::Integer(_) => "i64",
        Expr::Float(_) => "f64",
        Expr::Str(_) => "str",
        Expr::Bool(_) => "bool",
        Expr::List(_) => "list",
        Expr::Map(_) => "map",
        Expr::Function { .. } => "fn",
        _ => return None,
    };
    Some(TypeLiteral {
        token: crate::token::lookup_word(word),
        subtypes: vec![],
    })
}

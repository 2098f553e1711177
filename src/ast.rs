// ABOUTME: AST node types produced by the parser, with the canonical
// pretty-printer used by tests and by function value inspection

use crate::token::Token;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{statement}")?;
        }
        Ok(())
    }
}

/// A type annotation: a primary type token plus optional subtype tokens,
/// e.g. `list(i64)` or `map(str, i64)`. Recorded on bindings and parameters
/// but never consulted at evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeLiteral {
    pub token: Token,
    pub subtypes: Vec<Token>,
}

impl fmt::Display for TypeLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token.literal)?;
        if !self.subtypes.is_empty() {
            let subtypes: Vec<&str> = self.subtypes.iter().map(|t| t.literal.as_str()).collect();
            write!(f, "({})", subtypes.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub ty: Option<TypeLiteral>,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Identifier {
            name: name.into(),
            ty: None,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{statement}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let {
        name: Identifier,
        value: Expr,
    },
    Mut {
        target: Expr,
        value: Expr,
    },
    Return(Expr),
    Expression(Expr),
    /// Legacy fire-and-forget call statement; an alias of a call expression.
    Exe(Expr),
    Break {
        cond: Option<Expr>,
    },
    Continue {
        cond: Option<Expr>,
    },
    Pass,
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Let { name, value } => match &name.ty {
                Some(ty) => write!(f, "let {name}: {ty} = {value}"),
                None => write!(f, "let {name} = {value}"),
            },
            Stmt::Mut { target, value } => write!(f, "mut {target} to {value}"),
            Stmt::Return(expr) => write!(f, "return {expr}"),
            Stmt::Expression(expr) => write!(f, "{expr}"),
            Stmt::Exe(expr) => write!(f, "exe {expr}"),
            Stmt::Break { cond: None } => write!(f, "break"),
            Stmt::Break { cond: Some(cond) } => write!(f, "break if {cond}"),
            Stmt::Continue { cond: None } => write!(f, "continue"),
            Stmt::Continue { cond: Some(cond) } => write!(f, "continue if {cond}"),
            Stmt::Pass => write!(f, "pass"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identifier(Identifier),
    TypeLiteral(TypeLiteral),
    Integer(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    List(Vec<Expr>),
    Map(Vec<(Expr, Expr)>),
    Prefix {
        op: Token,
        right: Box<Expr>,
    },
    Infix {
        op: Token,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    If {
        cond: Box<Expr>,
        consequence: Block,
        alternative: Option<Block>,
    },
    Function {
        params: Rc<Vec<Identifier>>,
        return_ty: Option<TypeLiteral>,
        body: Rc<Block>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `receiver.name(args)`. The receiver is absent only on the right-hand
    /// side of `mut`, where the mutation target supplies it.
    Method {
        receiver: Option<Box<Expr>>,
        name: String,
        args: Vec<Expr>,
    },
    /// `receiver.name` without a call; parsed, reserved for a future
    /// resolver, and rejected at evaluation time.
    Attribute {
        receiver: Box<Expr>,
        name: String,
    },
    While {
        cond: Box<Expr>,
        body: Block,
    },
    For {
        index: Option<String>,
        value: Option<String>,
        iterable: Box<Expr>,
        body: Block,
    },
}

fn join_exprs(exprs: &[Expr]) -> String {
    exprs
        .iter()
        .map(Expr::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Identifier(identifier) => write!(f, "{identifier}"),
            Expr::TypeLiteral(ty) => write!(f, "{ty}"),
            Expr::Integer(value) => write!(f, "{value}"),
            Expr::Float(value) => write!(f, "{value}"),
            Expr::Str(value) => write!(f, "{value}"),
            Expr::Bool(value) => write!(f, "{value}"),
            Expr::List(elements) => write!(f, "list({})", join_exprs(elements)),
            Expr::Map(pairs) => {
                let pairs: Vec<String> = pairs.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "map({})", pairs.join(", "))
            }
            Expr::Prefix { op, right } => write!(f, "({}{right})", op.literal),
            Expr::Infix { op, left, right } => write!(f, "({left} {} {right})", op.literal),
            Expr::If {
                cond,
                consequence,
                alternative,
            } => {
                write!(f, "if {cond} {consequence}")?;
                if let Some(alternative) = alternative {
                    write!(f, " else {alternative}")?;
                }
                Ok(())
            }
            Expr::Function { params, body, .. } => {
                let params: Vec<String> = params.iter().map(Identifier::to_string).collect();
                write!(f, "fn({}): {body}", params.join(", "))
            }
            Expr::Call { callee, args } => write!(f, "{callee}({})", join_exprs(args)),
            Expr::Method {
                receiver,
                name,
                args,
            } => {
                if let Some(receiver) = receiver {
                    write!(f, "{receiver}")?;
                }
                write!(f, ".{name}({})", join_exprs(args))
            }
            Expr::Attribute { receiver, name } => write!(f, "{receiver}.{name}"),
            Expr::While { cond, body } => write!(f, "while {cond} {body}"),
            Expr::For {
                index,
                value,
                iterable,
                body,
            } => {
                let index = index.as_deref().unwrap_or("_");
                let value = value.as_deref().unwrap_or("_");
                write!(f, "for {index}, {value} in {iterable} {body}")
            }
        }
    }
}

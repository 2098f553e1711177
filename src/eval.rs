// ABOUTME: Recursive evaluator walking the AST against an environment chain
// Control tokens and errors ride the Err channel; see error::Signal

use crate::ast::{Block, Expr, Identifier, Program, Stmt};
use crate::builtins;
use crate::env::Environment;
use crate::error::{RuntimeError, Signal};
use crate::token::{Token, TokenSubkind};
use crate::value::{FunctionValue, MapPair, Value};
use std::collections::HashMap;
use std::rc::Rc;

use TokenSubkind as S;

/// Evaluates a whole program, unwrapping `return` at the root. Stray
/// `break`/`continue` outside a loop degrade to `none`.
pub fn eval_program(program: &Program, env: &Rc<Environment>) -> Result<Value, RuntimeError> {
    let mut result = Value::None;
    for statement in &program.statements {
        match eval_statement(statement, env) {
            Ok(value) => result = value,
            Err(Signal::Return(value)) => return Ok(value),
            Err(Signal::Error(error)) => return Err(error),
            Err(Signal::Break | Signal::Continue) => result = Value::None,
        }
    }
    Ok(result)
}

/// Evaluates a block, passing control signals through wrapped so the
/// enclosing function or loop decides what to unwrap.
fn eval_block(block: &Block, env: &Rc<Environment>) -> Result<Value, Signal> {
    let mut result = Value::None;
    for statement in &block.statements {
        result = eval_statement(statement, env)?;
    }
    Ok(result)
}

fn eval_statement(statement: &Stmt, env: &Rc<Environment>) -> Result<Value, Signal> {
    match statement {
        Stmt::Let { name, value } => {
            let value = eval_expression(value, env)?.copy_for_binding();
            env.define(name.name.clone(), value.clone());
            Ok(value)
        }
        Stmt::Mut { target, value } => eval_mut(target, value, env),
        Stmt::Return(expr) => {
            let value = eval_expression(expr, env)?;
            Err(Signal::Return(value))
        }
        Stmt::Expression(expr) | Stmt::Exe(expr) => eval_expression(expr, env),
        Stmt::Break { cond } => match cond {
            None => Err(Signal::Break),
            Some(cond) => {
                if eval_expression(cond, env)?.is_truthy() {
                    Err(Signal::Break)
                } else {
                    Ok(Value::None)
                }
            }
        },
        Stmt::Continue { cond } => match cond {
            None => Err(Signal::Continue),
            Some(cond) => {
                if eval_expression(cond, env)?.is_truthy() {
                    Err(Signal::Continue)
                } else {
                    Ok(Value::None)
                }
            }
        },
        Stmt::Pass => Ok(Value::None),
    }
}

/// `mut x to v` rebinds the innermost frame; `mut xs(i) to v` writes a list
/// element in place. A receiverless method on the right-hand side
/// (`mut xs to .append(v)`) receives the target's current value.
fn eval_mut(target: &Expr, value: &Expr, env: &Rc<Environment>) -> Result<Value, Signal> {
    match target {
        Expr::Identifier(identifier) => {
            let new_value = match value {
                Expr::Method {
                    receiver: None,
                    name,
                    args,
                } => {
                    let receiver = env
                        .get(&identifier.name)
                        .ok_or_else(|| RuntimeError::IdentifierNotFound(identifier.name.clone()))?;
                    let args = eval_expressions(args, env)?;
                    eval_method(receiver, name, args)?
                }
                _ => eval_expression(value, env)?,
            };
            env.define(identifier.name.clone(), new_value.clone());
            Ok(new_value)
        }
        Expr::Call { callee, args } => {
            let base = eval_expression(callee, env)?;
            let Value::List(elements) = base else {
                return Err(RuntimeError::BadMutTarget(target.to_string()).into());
            };
            if args.len() != 1 {
                return Err(RuntimeError::WrongArity {
                    expected: 1,
                    got: args.len(),
                }
                .into());
            }
            let index = match eval_expression(&args[0], env)? {
                Value::I64(index) => index,
                other => return Err(RuntimeError::UnusableIndex(other.kind_name()).into()),
            };
            let new_value = eval_expression(value, env)?;

            let mut elements = elements.borrow_mut();
            let slot = usize::try_from(index)
                .ok()
                .and_then(|index| elements.get_mut(index))
                .ok_or(RuntimeError::IndexOutOfRange(index))?;
            *slot = new_value.clone();
            Ok(new_value)
        }
        other => Err(RuntimeError::BadMutTarget(other.to_string()).into()),
    }
}

fn eval_expression(expr: &Expr, env: &Rc<Environment>) -> Result<Value, Signal> {
    match expr {
        Expr::Identifier(identifier) => eval_identifier(identifier, env).map_err(Signal::from),
        Expr::TypeLiteral(ty) => {
            if ty.token.subkind == S::None {
                Ok(Value::None)
            } else {
                Err(RuntimeError::InvalidTypeLiteral(ty.token.literal.clone()).into())
            }
        }
        Expr::Integer(value) => Ok(Value::I64(*value)),
        Expr::Float(value) => Ok(Value::F64(*value)),
        Expr::Str(value) => Ok(Value::Str(value.clone())),
        Expr::Bool(value) => Ok(Value::Bool(*value)),
        Expr::List(elements) => eval_list_literal(elements, env),
        Expr::Map(pairs) => eval_map_literal(pairs, env),
        Expr::Prefix { op, right } => {
            let right = eval_expression(right, env)?;
            eval_prefix(op, right).map_err(Signal::from)
        }
        Expr::Infix { op, left, right } => {
            let left = eval_expression(left, env)?;
            let right = eval_expression(right, env)?;
            eval_infix(op, left, right).map_err(Signal::from)
        }
        Expr::If {
            cond,
            consequence,
            alternative,
        } => {
            if eval_expression(cond, env)?.is_truthy() {
                eval_block(consequence, env)
            } else if let Some(alternative) = alternative {
                eval_block(alternative, env)
            } else {
                Ok(Value::None)
            }
        }
        Expr::Function { params, body, .. } => Ok(Value::Function(Rc::new(FunctionValue {
            params: params.clone(),
            body: body.clone(),
            env: env.clone(),
        }))),
        Expr::Call { callee, args } => {
            let callee = eval_expression(callee, env)?;
            let args = eval_expressions(args, env)?;
            apply(callee, args)
        }
        Expr::Method {
            receiver: Some(receiver),
            name,
            args,
        } => {
            let receiver = eval_expression(receiver, env)?;
            let args = eval_expressions(args, env)?;
            eval_method(receiver, name, args).map_err(Signal::from)
        }
        Expr::Method {
            receiver: None,
            name,
            ..
        } => Err(RuntimeError::MissingReceiver(name.clone()).into()),
        Expr::Attribute { name, .. } => Err(RuntimeError::AttributeUnsupported(name.clone()).into()),
        Expr::While { cond, body } => {
            loop {
                if !eval_expression(cond, env)?.is_truthy() {
                    return Ok(Value::None);
                }
                match eval_block(body, env) {
                    Ok(_) | Err(Signal::Continue) => {}
                    Err(Signal::Break) => return Ok(Value::None),
                    Err(signal) => return Err(signal),
                }
            }
        }
        Expr::For {
            index,
            value,
            iterable,
            body,
        } => {
            let iterable = eval_expression(iterable, env)?;
            let mut position = 0usize;
            loop {
                let Some(item) = iterable.next_item(position)? else {
                    return Ok(Value::None);
                };
                if let Some(name) = index {
                    env.define(name.clone(), Value::I64(position as i64));
                }
                if let Some(name) = value {
                    env.define(name.clone(), item);
                }
                match eval_block(body, env) {
                    Ok(_) | Err(Signal::Continue) => {}
                    Err(Signal::Break) => return Ok(Value::None),
                    Err(signal) => return Err(signal),
                }
                position += 1;
            }
        }
    }
}

fn eval_identifier(identifier: &Identifier, env: &Rc<Environment>) -> Result<Value, RuntimeError> {
    if let Some(value) = env.get(&identifier.name) {
        return Ok(value);
    }
    if let Some(function) = builtins::lookup(&identifier.name) {
        return Ok(Value::Builtin(function));
    }
    Err(RuntimeError::IdentifierNotFound(identifier.name.clone()))
}

fn eval_expressions(exprs: &[Expr], env: &Rc<Environment>) -> Result<Vec<Value>, Signal> {
    let mut values = Vec::with_capacity(exprs.len());
    for expr in exprs {
        values.push(eval_expression(expr, env)?);
    }
    Ok(values)
}

/// `list(a to b)` materializes the range; an empty or inverted range keeps
/// the legacy one-element result `[a]`.
fn eval_list_literal(elements: &[Expr], env: &Rc<Environment>) -> Result<Value, Signal> {
    let mut values = eval_expressions(elements, env)?;
    if let Some(&Value::Slice { start, end }) = values.first() {
        let mut expanded: Vec<Value> = if end > start {
            (start..end).map(Value::I64).collect()
        } else {
            vec![Value::I64(start)]
        };
        expanded.extend(values.drain(1..));
        return Ok(Value::list(expanded));
    }
    Ok(Value::list(values))
}

fn eval_map_literal(pairs: &[(Expr, Expr)], env: &Rc<Environment>) -> Result<Value, Signal> {
    let mut map = HashMap::with_capacity(pairs.len());
    for (key_expr, value_expr) in pairs {
        let key_value = eval_expression(key_expr, env)?;
        let key = key_value
            .map_key()
            .ok_or(RuntimeError::UnusableMapKey(key_value.kind_name()))?;
        let value = eval_expression(value_expr, env)?;
        map.insert(
            key,
            MapPair {
                key: key_value,
                value,
            },
        );
    }
    Ok(Value::map(map))
}

fn eval_prefix(op: &Token, right: Value) -> Result<Value, RuntimeError> {
    match op.subkind {
        S::Not => Ok(Value::Bool(!right.is_truthy())),
        S::Minus => match right {
            Value::I64(value) => Ok(Value::I64(value.wrapping_neg())),
            Value::F64(value) => Ok(Value::F64(-value)),
            other => Err(RuntimeError::UnknownPrefix {
                op: op.literal.clone(),
                operand: other.kind_name(),
            }),
        },
        _ => Err(RuntimeError::UnknownPrefix {
            op: op.literal.clone(),
            operand: right.kind_name(),
        }),
    }
}

fn eval_infix(op: &Token, left: Value, right: Value) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::I64(l), Value::I64(r)) => eval_integer_infix(op, l, r),
        (Value::F64(l), Value::F64(r)) => eval_float_infix(op, l, r),
        (Value::Str(l), Value::Str(r)) => match op.subkind {
            S::Plus => Ok(Value::Str(format!("{l}{r}"))),
            S::Is => Ok(Value::Bool(l == r)),
            S::IsNot => Ok(Value::Bool(l != r)),
            _ => Err(unknown_infix("str", op, "str")),
        },
        (Value::Bool(l), Value::Bool(r)) => match op.subkind {
            S::Is => Ok(Value::Bool(l == r)),
            S::IsNot => Ok(Value::Bool(l != r)),
            S::And => Ok(Value::Bool(l && r)),
            S::Or => Ok(Value::Bool(l || r)),
            _ => Err(unknown_infix("bool", op, "bool")),
        },
        (Value::List(l), Value::List(r)) if op.subkind == S::Plus => {
            let mut elements = l.borrow().clone();
            elements.extend(r.borrow().iter().cloned());
            Ok(Value::list(elements))
        }
        (Value::List(l), Value::I64(n)) if op.subkind == S::Asterisk => {
            let source = l.borrow();
            let count = usize::try_from(n).unwrap_or(0);
            let mut elements = Vec::with_capacity(source.len() * count);
            for _ in 0..count {
                elements.extend(source.iter().cloned());
            }
            Ok(Value::list(elements))
        }
        (left, right) if left.kind_name() == right.kind_name() => {
            Err(unknown_infix(left.kind_name(), op, right.kind_name()))
        }
        (left, right) => Err(RuntimeError::MixedOperands {
            left: left.kind_name(),
            op: op.literal.clone(),
            right: right.kind_name(),
        }),
    }
}

fn unknown_infix(left: &'static str, op: &Token, right: &'static str) -> RuntimeError {
    RuntimeError::UnknownInfix {
        left,
        op: op.literal.clone(),
        right,
    }
}

/// Integer arithmetic follows two's-complement `i64` semantics: wrapping
/// overflow and truncating division.
fn eval_integer_infix(op: &Token, l: i64, r: i64) -> Result<Value, RuntimeError> {
    match op.subkind {
        S::Plus => Ok(Value::I64(l.wrapping_add(r))),
        S::Minus => Ok(Value::I64(l.wrapping_sub(r))),
        S::Asterisk => Ok(Value::I64(l.wrapping_mul(r))),
        S::Slash => {
            if r == 0 {
                Err(RuntimeError::DivisionByZero)
            } else {
                Ok(Value::I64(l.wrapping_div(r)))
            }
        }
        S::Lt => Ok(Value::Bool(l < r)),
        S::Gt => Ok(Value::Bool(l > r)),
        S::Lte => Ok(Value::Bool(l <= r)),
        S::Gte => Ok(Value::Bool(l >= r)),
        S::Is => Ok(Value::Bool(l == r)),
        S::IsNot => Ok(Value::Bool(l != r)),
        S::To => Ok(Value::Slice { start: l, end: r }),
        _ => Err(unknown_infix("i64", op, "i64")),
    }
}

fn eval_float_infix(op: &Token, l: f64, r: f64) -> Result<Value, RuntimeError> {
    match op.subkind {
        S::Plus => Ok(Value::F64(l + r)),
        S::Minus => Ok(Value::F64(l - r)),
        S::Asterisk => Ok(Value::F64(l * r)),
        S::Slash => Ok(Value::F64(l / r)),
        S::Lt => Ok(Value::Bool(l < r)),
        S::Gt => Ok(Value::Bool(l > r)),
        S::Lte => Ok(Value::Bool(l <= r)),
        S::Gte => Ok(Value::Bool(l >= r)),
        S::Is => Ok(Value::Bool(l == r)),
        S::IsNot => Ok(Value::Bool(l != r)),
        _ => Err(unknown_infix("f64", op, "f64")),
    }
}

/// Call-form dispatch: functions and builtins are invoked; lists, maps, and
/// strings reinterpret the call as indexing; anything else is not callable.
fn apply(callee: Value, args: Vec<Value>) -> Result<Value, Signal> {
    match callee {
        Value::Function(function) => apply_function(&function, args),
        Value::Builtin(function) => function(&args).map_err(Signal::from),
        receiver @ (Value::List(_) | Value::Str(_) | Value::Map(_)) => {
            if args.len() != 1 {
                return Err(RuntimeError::WrongArity {
                    expected: 1,
                    got: args.len(),
                }
                .into());
            }
            eval_index(&receiver, &args[0]).map_err(Signal::from)
        }
        other => Err(RuntimeError::NotCallable(other.kind_name()).into()),
    }
}

fn apply_function(function: &FunctionValue, args: Vec<Value>) -> Result<Value, Signal> {
    if function.params.len() != args.len() {
        return Err(RuntimeError::WrongArity {
            expected: function.params.len(),
            got: args.len(),
        }
        .into());
    }

    // The new frame encloses the closure's captured environment, not the
    // caller's. Arguments share references; only `let` copies lists.
    let env = Environment::with_parent(function.env.clone());
    for (param, arg) in function.params.iter().zip(args) {
        env.define(param.name.clone(), arg);
    }

    match eval_block(&function.body, &env) {
        Ok(value) => Ok(value),
        Err(Signal::Return(value)) => Ok(value),
        Err(Signal::Break | Signal::Continue) => Ok(Value::None),
        Err(signal) => Err(signal),
    }
}

/// `receiver.name(args)` resolves `name` in the builtin table only and
/// invokes it with the receiver prepended: `x.len()` is `len(x)`.
fn eval_method(receiver: Value, name: &str, args: Vec<Value>) -> Result<Value, RuntimeError> {
    let Some(function) = builtins::lookup(name) else {
        return Err(RuntimeError::NotAMethod(name.to_string()));
    };
    let mut full_args = Vec::with_capacity(args.len() + 1);
    full_args.push(receiver);
    full_args.extend(args);
    function(&full_args)
}

fn eval_index(receiver: &Value, index: &Value) -> Result<Value, RuntimeError> {
    match (receiver, index) {
        (Value::List(elements), Value::I64(position)) => {
            let elements = elements.borrow();
            usize::try_from(*position)
                .ok()
                .and_then(|position| elements.get(position))
                .cloned()
                .ok_or(RuntimeError::IndexOutOfRange(*position))
        }
        (Value::List(elements), Value::Slice { start, end }) => {
            let elements = elements.borrow();
            let range = slice_range(*start, *end, elements.len())?;
            Ok(Value::list(elements[range].to_vec()))
        }
        (Value::Str(value), Value::I64(position)) => usize::try_from(*position)
            .ok()
            .and_then(|position| value.as_bytes().get(position))
            .map(|b| Value::Str((*b as char).to_string()))
            .ok_or(RuntimeError::IndexOutOfRange(*position)),
        (Value::Str(value), Value::Slice { start, end }) => {
            let range = slice_range(*start, *end, value.len())?;
            value
                .get(range)
                .map(|s| Value::Str(s.to_string()))
                .ok_or(RuntimeError::SliceOutOfRange {
                    start: *start,
                    end: *end,
                })
        }
        (Value::Map(pairs), key) => {
            let key = key
                .map_key()
                .ok_or(RuntimeError::UnusableMapKey(key.kind_name()))?;
            Ok(pairs
                .borrow()
                .get(&key)
                .map(|pair| pair.value.clone())
                .unwrap_or(Value::None))
        }
        (_, index) => Err(RuntimeError::UnusableIndex(index.kind_name())),
    }
}

fn slice_range(start: i64, end: i64, len: usize) -> Result<std::ops::Range<usize>, RuntimeError> {
    if start < 0 || end < start || end as usize > len {
        return Err(RuntimeError::SliceOutOfRange { start, end });
    }
    Ok(start as usize..end as usize)
}

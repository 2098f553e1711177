// ABOUTME: Runtime values produced by the evaluator, map key hashing, and
// the stable inspect forms printed by `print` and the REPL

use crate::ast::{Block, Identifier};
use crate::env::Environment;
use crate::error::RuntimeError;
use fnv::FnvHasher;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hasher;
use std::rc::Rc;

pub type BuiltinFunction = fn(&[Value]) -> Result<Value, RuntimeError>;

/// A user function paired with the environment its literal was evaluated in.
#[derive(Clone)]
pub struct FunctionValue {
    pub params: Rc<Vec<Identifier>>,
    pub body: Rc<Block>,
    pub env: Rc<Environment>,
}

// The captured environment can (indirectly) contain this function again, so
// the derived Debug would recurse; print the signature instead.
impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(Identifier::to_string).collect();
        write!(f, "FunctionValue(fn({}))", params.join(", "))
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    I64(i64),
    F64(f64),
    Str(String),
    Bool(bool),
    None,
    /// Mutable in place; `let` binds a shallow copy, parameter passing shares.
    List(Rc<RefCell<Vec<Value>>>),
    Map(Rc<RefCell<HashMap<MapKey, MapPair>>>),
    /// Transient half-open range `[start, end)`; consumed by indexing,
    /// iteration, or list materialization, never bound to an identifier.
    Slice { start: i64, end: i64 },
    Function(Rc<FunctionValue>),
    Builtin(BuiltinFunction),
}

/// Hashable identity of a map key. The kind tag keeps `I64(5)`, `F64(5.0)`
/// and `Bool(true)` distinct even when their hashes collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapKey {
    kind: KeyKind,
    hash: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum KeyKind {
    I64,
    F64,
    Str,
    Bool,
}

/// A map entry retaining the original key value for inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct MapPair {
    pub key: Value,
    pub value: Value,
}

impl Value {
    pub fn list(elements: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(elements)))
    }

    pub fn map(pairs: HashMap<MapKey, MapPair>) -> Value {
        Value::Map(Rc::new(RefCell::new(pairs)))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::I64(_) => "i64",
            Value::F64(_) => "f64",
            Value::Str(_) => "str",
            Value::Bool(_) => "bool",
            Value::None => "none",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Slice { .. } => "slice",
            Value::Function(_) => "fn",
            Value::Builtin(_) => "builtin",
        }
    }

    /// `false` and `none` are false; every other value is true.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false) | Value::None)
    }

    /// The value bound by `let`: lists are shallow-copied so later in-place
    /// mutation of the source leaves the binding intact.
    pub fn copy_for_binding(&self) -> Value {
        match self {
            Value::List(elements) => Value::list(elements.borrow().clone()),
            other => other.clone(),
        }
    }

    /// Hashable identity for map keys; only scalar kinds qualify.
    /// Float keys hash by numeric cast and are undefined for NaN.
    pub fn map_key(&self) -> Option<MapKey> {
        let (kind, hash) = match self {
            Value::I64(value) => (KeyKind::I64, *value as u64),
            Value::F64(value) => (KeyKind::F64, *value as u64),
            Value::Bool(value) => (KeyKind::Bool, u64::from(*value)),
            Value::Str(value) => {
                let mut hasher = FnvHasher::default();
                hasher.write(value.as_bytes());
                (KeyKind::Str, hasher.finish())
            }
            _ => return None,
        };
        Some(MapKey { kind, hash })
    }

    /// The iteration capability consumed by `for`: item at `index`, or
    /// `None` once exhausted. Lists yield elements, strings one-byte
    /// substrings, slices the integers of their range.
    pub fn next_item(&self, index: usize) -> Result<Option<Value>, RuntimeError> {
        match self {
            Value::List(elements) => Ok(elements.borrow().get(index).cloned()),
            Value::Str(value) => Ok(value
                .as_bytes()
                .get(index)
                .map(|b| Value::Str((*b as char).to_string()))),
            Value::Slice { start, end } => {
                let item = start.wrapping_add(index as i64);
                if item < *end {
                    Ok(Some(Value::I64(item)))
                } else {
                    Ok(None)
                }
            }
            other => Err(RuntimeError::NotIterable(other.kind_name())),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::I64(l), Value::I64(r)) => l == r,
            (Value::F64(l), Value::F64(r)) => l == r,
            (Value::Str(l), Value::Str(r)) => l == r,
            (Value::Bool(l), Value::Bool(r)) => l == r,
            (Value::None, Value::None) => true,
            (Value::List(l), Value::List(r)) => {
                Rc::ptr_eq(l, r) || *l.borrow() == *r.borrow()
            }
            (Value::Map(l), Value::Map(r)) => Rc::ptr_eq(l, r) || *l.borrow() == *r.borrow(),
            (
                Value::Slice { start: ls, end: le },
                Value::Slice { start: rs, end: re },
            ) => ls == rs && le == re,
            (Value::Function(l), Value::Function(r)) => Rc::ptr_eq(l, r),
            (Value::Builtin(l), Value::Builtin(r)) => std::ptr::fn_addr_eq(*l, *r),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I64(value) => write!(f, "{value}"),
            Value::F64(value) => write!(f, "{value:.6}"),
            Value::Str(value) => write!(f, "{value}"),
            Value::Bool(value) => write!(f, "{}", if *value { "true" } else { "false" }),
            Value::None => write!(f, "none"),
            Value::List(elements) => {
                let elements: Vec<String> =
                    elements.borrow().iter().map(Value::to_string).collect();
                write!(f, "[{}]", elements.join(", "))
            }
            Value::Map(pairs) => {
                let pairs: Vec<String> = pairs
                    .borrow()
                    .values()
                    .map(|pair| format!("{}: {}", pair.key, pair.value))
                    .collect();
                write!(f, "map({})", pairs.join(", "))
            }
            Value::Slice { start, end } => write!(f, "slice({start}, {end})"),
            Value::Function(function) => {
                let params: Vec<String> =
                    function.params.iter().map(Identifier::to_string).collect();
                write!(f, "fn({}): {}", params.join(", "), function.body)
            }
            Value::Builtin(_) => write!(f, "builtin function"),
        }
    }
}

// ABOUTME: Parse diagnostics, runtime errors, and the evaluator's
// control-flow signal channel

use crate::value::Value;
use thiserror::Error;

/// A diagnostic recorded by the parser. Parsing continues past these so a
/// single run can surface more than one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected next token to be {expected}, got {got} instead")]
    UnexpectedToken { expected: String, got: String },

    #[error("no prefix parse rule for {0}")]
    NoPrefixRule(String),

    #[error("could not parse {0} as an integer")]
    InvalidInteger(String),

    #[error("could not parse {0} as a float")]
    InvalidFloat(String),
}

/// A runtime error. These are first-class: the evaluator threads them up
/// unchanged to the program root, and the REPL prints them as
/// `ERROR: <message>`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),

    #[error("cannot operate the values: {left} {op} {right}")]
    MixedOperands {
        left: &'static str,
        op: String,
        right: &'static str,
    },

    #[error("unknown operator: {left} {op} {right}")]
    UnknownInfix {
        left: &'static str,
        op: String,
        right: &'static str,
    },

    #[error("unknown operator: {op}{operand}")]
    UnknownPrefix { op: String, operand: &'static str },

    #[error("not a function: {0}")]
    NotCallable(&'static str),

    #[error("not a method: {0}")]
    NotAMethod(String),

    #[error("method call without receiver: {0}")]
    MissingReceiver(String),

    #[error("attribute access is not supported: {0}")]
    AttributeUnsupported(String),

    #[error("invalid use of type: {0}")]
    InvalidTypeLiteral(String),

    #[error("index out of range: {0}")]
    IndexOutOfRange(i64),

    #[error("slice out of range: {start} to {end}")]
    SliceOutOfRange { start: i64, end: i64 },

    #[error("unusable as index: {0}")]
    UnusableIndex(&'static str),

    #[error("unusable as map key: {0}")]
    UnusableMapKey(&'static str),

    #[error("division by zero")]
    DivisionByZero,

    #[error("{0} is not iterable")]
    NotIterable(&'static str),

    #[error("wrong number of arguments: expected {expected}, got {got}")]
    WrongArity { expected: usize, got: usize },

    #[error("cannot mutate {0}")]
    BadMutTarget(String),

    /// Type mismatch inside a built-in, with the offending argument position.
    #[error("{function}: expected {expected}, got {actual} at argument {position}")]
    BuiltinType {
        function: &'static str,
        expected: &'static str,
        actual: &'static str,
        position: usize,
    },

    /// Arity mismatch inside a built-in; `expected` reads like "2" or "1-2".
    #[error("{function}: expected {expected} argument{}, got {actual}", if *.expected == "1" { "" } else { "s" })]
    BuiltinArity {
        function: &'static str,
        expected: &'static str,
        actual: usize,
    },

    /// Any other built-in failure with function context.
    #[error("{function}: {message}")]
    Builtin {
        function: &'static str,
        message: String,
    },
}

impl RuntimeError {
    /// Create a built-in type mismatch with full context.
    pub fn builtin_type(
        function: &'static str,
        expected: &'static str,
        actual: &Value,
        position: usize,
    ) -> Self {
        RuntimeError::BuiltinType {
            function,
            expected,
            actual: actual.kind_name(),
            position,
        }
    }

    /// Create a built-in arity error.
    pub fn builtin_arity(function: &'static str, expected: &'static str, actual: usize) -> Self {
        RuntimeError::BuiltinArity {
            function,
            expected,
            actual,
        }
    }

    /// Create a built-in failure with function context.
    pub fn builtin(function: &'static str, message: impl Into<String>) -> Self {
        RuntimeError::Builtin {
            function,
            message: message.into(),
        }
    }
}

/// In-flight control tokens. `Return`, `Break`, and `Continue` ride the same
/// channel as errors so that every evaluation step propagates them with `?`;
/// only function and loop boundaries unwrap them.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Return(Value),
    Break,
    Continue,
    Error(RuntimeError),
}

impl From<RuntimeError> for Signal {
    fn from(error: RuntimeError) -> Self {
        Signal::Error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let error = ParseError::UnexpectedToken {
            expected: ")".to_string(),
            got: "{".to_string(),
        };
        assert_eq!(error.to_string(), "expected next token to be ), got { instead");
    }

    #[test]
    fn test_runtime_error_display() {
        let error = RuntimeError::IdentifierNotFound("foo".to_string());
        assert_eq!(error.to_string(), "identifier not found: foo");

        let error = RuntimeError::MixedOperands {
            left: "i64",
            op: "+".to_string(),
            right: "str",
        };
        assert_eq!(error.to_string(), "cannot operate the values: i64 + str");
    }

    #[test]
    fn test_builtin_arity_pluralization() {
        let one = RuntimeError::builtin_arity("len", "1", 2);
        assert_eq!(one.to_string(), "len: expected 1 argument, got 2");

        let two = RuntimeError::builtin_arity("split", "2", 1);
        assert_eq!(two.to_string(), "split: expected 2 arguments, got 1");
    }

    #[test]
    fn test_runtime_error_converts_to_signal() {
        let signal: Signal = RuntimeError::DivisionByZero.into();
        assert_eq!(signal, Signal::Error(RuntimeError::DivisionByZero));
    }
}

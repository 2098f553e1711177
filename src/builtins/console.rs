// ABOUTME: Console I/O builtins: print, printf, input

use crate::error::RuntimeError;
use crate::value::Value;
use std::io::{self, BufRead, Write};

/// Concatenates the inspect forms of every argument and emits one line.
pub fn print(args: &[Value]) -> Result<Value, RuntimeError> {
    let message: String = args.iter().map(Value::to_string).collect();
    println!("{message}");
    Ok(Value::None)
}

/// Writes each argument's inspect form quoted, without a trailing newline.
pub fn printf(args: &[Value]) -> Result<Value, RuntimeError> {
    for arg in args {
        print!("{:?}", arg.to_string());
    }
    Ok(Value::None)
}

/// Reads one line from standard input, with an optional string prompt.
/// The trailing newline is trimmed.
pub fn input(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() > 1 {
        return Err(RuntimeError::builtin_arity("input", "0-1", args.len()));
    }
    if let Some(prompt) = args.first() {
        let Value::Str(prompt) = prompt else {
            return Err(RuntimeError::builtin_type("input", "str", prompt, 1));
        };
        print!("{prompt}");
        io::stdout()
            .flush()
            .map_err(|_| RuntimeError::builtin("input", "error writing prompt"))?;
    }

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|_| RuntimeError::builtin("input", "error reading input"))?;
    if line.ends_with('\n') {
        line.pop();
    }
    Ok(Value::Str(line))
}

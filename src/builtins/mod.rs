// ABOUTME: Built-in function registry
// Builtins are plain native functions; method syntax reaches the same table
// with the receiver prepended, so `xs.len()` and `len(xs)` are identical

use crate::value::BuiltinFunction;

pub mod console;
pub mod convert;
pub mod fs;
pub mod lists;
pub mod math;
pub mod strings;

/// Resolves a builtin by name. Consulted after the environment chain for
/// identifiers, and exclusively for method dispatch.
pub fn lookup(name: &str) -> Option<BuiltinFunction> {
    let function: BuiltinFunction = match name {
        "print" => console::print,
        "printf" => console::printf,
        "input" => console::input,
        "read" => fs::read,
        "len" => lists::len,
        "type" => convert::type_name,
        "as_i64" => convert::as_i64,
        "as_f64" => convert::as_f64,
        "as_str" => convert::as_str,
        "split" => strings::split,
        "join" => strings::join,
        "strip" => strings::strip,
        "append" => lists::append,
        "concat" => lists::concat,
        "reverse" => lists::reverse,
        "sort" => lists::sort,
        "sum" => lists::sum,
        "max" => lists::max,
        "min" => lists::min,
        "with_size" => lists::with_size,
        "transpose" => lists::transpose,
        "sqrt" => math::sqrt,
        _ => return None,
    };
    Some(function)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_names() {
        for name in ["print", "len", "sort", "as_str", "with_size", "sqrt"] {
            assert!(lookup(name).is_some(), "missing builtin {name}");
        }
    }

    #[test]
    fn test_lookup_unknown_name() {
        assert!(lookup("no_such_builtin").is_none());
    }
}

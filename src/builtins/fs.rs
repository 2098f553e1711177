// ABOUTME: Filesystem builtins: read
// Reads are confined to the working directory through a cap-std capability
// root; absolute paths and `..` traversals are rejected up front

use crate::error::RuntimeError;
use crate::value::Value;
use cap_std::ambient_authority;
use cap_std::fs::Dir;

/// Reads a whole file as a string, trimming one trailing newline. The path
/// must stay inside the working directory.
pub fn read(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::builtin_arity("read", "1", args.len()));
    }
    let Value::Str(path) = &args[0] else {
        return Err(RuntimeError::builtin_type("read", "str", &args[0], 1));
    };

    let contents = read_contained(path)?;
    let contents = contents.strip_suffix('\n').unwrap_or(&contents);
    Ok(Value::Str(contents.to_string()))
}

/// Opens the working directory as a capability root and reads `path`
/// through it. The root rejects anything the up-front checks miss, symlinks
/// pointing outside included.
fn read_contained(path: &str) -> Result<String, RuntimeError> {
    if path.starts_with('/') || path.starts_with('\\') || path.contains("..") {
        return Err(RuntimeError::builtin(
            "read",
            format!("access denied: {path} is outside the working directory"),
        ));
    }

    let root = Dir::open_ambient_dir(".", ambient_authority()).map_err(|error| {
        RuntimeError::builtin("read", format!("cannot open working directory: {error}"))
    })?;
    root.read_to_string(path)
        .map_err(|error| RuntimeError::builtin("read", format!("cannot read {path}: {error}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_read_trims_trailing_newline() {
        let dir = "chi_fs_read_ok_temp";
        fs::create_dir_all(dir).unwrap();
        fs::write(format!("{dir}/input.txt"), "hello world\n").unwrap();

        let value = read(&[Value::Str(format!("{dir}/input.txt"))]).unwrap();
        assert_eq!(value, Value::Str("hello world".to_string()));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_read_missing_file() {
        let error = read(&[Value::Str("chi_fs_no_such_file.txt".to_string())]).unwrap_err();
        assert!(
            error.to_string().starts_with("read: cannot read"),
            "unexpected error: {error}"
        );
    }

    #[test]
    fn test_read_rejects_path_traversal() {
        let error = read(&[Value::Str("../../../etc/passwd".to_string())]).unwrap_err();
        assert_eq!(
            error.to_string(),
            "read: access denied: ../../../etc/passwd is outside the working directory"
        );
    }

    #[test]
    fn test_read_rejects_absolute_paths() {
        let error = read(&[Value::Str("/etc/passwd".to_string())]).unwrap_err();
        assert_eq!(
            error.to_string(),
            "read: access denied: /etc/passwd is outside the working directory"
        );
    }

    #[test]
    fn test_read_rejects_non_string_paths() {
        assert!(read(&[Value::I64(1)]).is_err());
    }
}

//! Line-oriented parser for `.msg` definitions
//!
//! Every non-blank line is either a constant (`<type> <NAME>=<value>`) or a
//! field (`<type> <name>`). The parser is stateless; it only needs the
//! enclosing package to qualify unqualified message types.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use crate::error::SchemaError;
use crate::schema::{Arity, BuiltinType, ConstantSpec, FieldSpec};

/// Introduces a comment running to the end of the line
pub const COMMENT_CHAR: char = '#';

/// Separates a constant's name from its value
pub const CONST_CHAR: char = '=';

/// Unqualified `Header` always refers to this package
const HEADER_PACKAGE: &str = "std_msgs";

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("valid name regex"));

static TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?P<pkg>[A-Za-z][A-Za-z0-9_]*)/)?(?P<base>[A-Za-z][A-Za-z0-9_]*)(?P<array>\[(?P<len>[0-9]*)\])?$")
        .expect("valid type regex")
});

/// A syntax error at a 1-based line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl ParseError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }

    /// Attach the definition's full name
    pub fn with_name(self, full_name: &str) -> SchemaError {
        SchemaError::Syntax {
            full_name: full_name.to_string(),
            line: self.line,
            message: self.message,
        }
    }
}

/// Output of a successful parse, in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDefinition {
    pub fields: Vec<FieldSpec>,
    pub constants: Vec<ConstantSpec>,
}

/// How a single line is handled, decided before any structural parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Constant,
    Field,
}

/// Drop everything from the comment character on
pub fn strip_comment(line: &str) -> &str {
    match line.find(COMMENT_CHAR) {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Classify a raw line by its comment-stripped content
pub fn classify_line(line: &str) -> LineKind {
    let clean = strip_comment(line).trim();
    if clean.is_empty() {
        LineKind::Blank
    } else if clean.contains(CONST_CHAR) {
        LineKind::Constant
    } else {
        LineKind::Field
    }
}

/// Parse definition text.
///
/// Unqualified non-builtin types resolve to `package`.
pub fn parse(text: &str, package: &str) -> Result<ParsedDefinition, ParseError> {
    let mut parsed = ParsedDefinition::default();

    for (idx, line) in text.lines().enumerate() {
        let lineno = idx + 1;
        match classify_line(line) {
            LineKind::Blank => {}
            LineKind::Constant => {
                let constant = parse_constant_line(line).map_err(|m| ParseError::new(lineno, m))?;
                parsed.constants.push(constant);
            }
            LineKind::Field => {
                let field =
                    parse_field_line(line, package).map_err(|m| ParseError::new(lineno, m))?;
                parsed.fields.push(field);
            }
        }
    }

    Ok(parsed)
}

fn parse_constant_line(line: &str) -> Result<ConstantSpec, String> {
    let clean = strip_comment(line);
    let eq = clean
        .find(CONST_CHAR)
        .ok_or_else(|| "expected `=` in constant declaration".to_string())?;

    let mut tokens = clean[..eq].split_whitespace();
    let (type_token, name) = match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(ty), Some(name), None) => (ty, name),
        (Some(ty), None, _) => {
            return Err(format!("missing constant name after type `{}`", ty));
        }
        (None, _, _) => return Err("missing constant type".to_string()),
        (Some(_), Some(_), Some(extra)) => {
            return Err(format!("unexpected token `{}` before `=`", extra));
        }
    };

    if type_token.contains('[') {
        return Err(format!("array constants are not supported: `{}`", type_token));
    }
    let ty = match BuiltinType::parse(type_token) {
        Some(ty) if ty.is_primitive() => ty,
        _ => {
            return Err(format!(
                "constant type `{}` must be a builtin primitive type",
                type_token
            ))
        }
    };
    if !NAME_RE.is_match(name) {
        return Err(format!("invalid constant name `{}`", name));
    }

    // String constants keep everything after `=`, comment characters included.
    // `eq` is a valid offset into `line` since `clean` is a prefix of it.
    let value = if ty == BuiltinType::String {
        line[eq + 1..].trim()
    } else {
        clean[eq + 1..].trim()
    };
    if value.is_empty() {
        return Err(format!("missing value for constant `{}`", name));
    }
    if ty != BuiltinType::String && value.split_whitespace().count() > 1 {
        return Err(format!("invalid value `{}` for constant `{}`", value, name));
    }

    Ok(ConstantSpec::new(ty.name(), name, value))
}

fn parse_field_line(line: &str, package: &str) -> Result<FieldSpec, String> {
    let clean = strip_comment(line);
    let mut tokens = clean.split_whitespace();
    let (type_token, name) = match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(ty), Some(name), None) => (ty, name),
        (Some(ty), None, _) => return Err(format!("missing field name after type `{}`", ty)),
        (None, _, _) => return Err("empty field declaration".to_string()),
        (Some(_), Some(_), Some(extra)) => {
            return Err(format!("unexpected token `{}` after field name", extra));
        }
    };

    let caps = TYPE_RE.captures(type_token).ok_or_else(|| {
        if type_token.contains('[') || type_token.contains(']') {
            format!("malformed array type `{}`", type_token)
        } else {
            format!("invalid field type `{}`", type_token)
        }
    })?;

    let arity = match (caps.name("array"), caps.name("len")) {
        (None, _) => Arity::Scalar,
        (Some(_), Some(len)) if len.as_str().is_empty() => Arity::VariableArray,
        (Some(_), Some(len)) => match len.as_str().parse::<usize>() {
            Ok(n) if n > 0 => Arity::FixedArray(n),
            _ => {
                return Err(format!(
                    "array length in `{}` must be a positive integer",
                    type_token
                ))
            }
        },
        (Some(_), None) => Arity::VariableArray,
    };

    if !NAME_RE.is_match(name) {
        return Err(format!("invalid field name `{}`", name));
    }

    let base = &caps["base"];
    let field = match (caps.name("pkg"), BuiltinType::parse(base)) {
        (Some(pkg), None) => FieldSpec::message(name, pkg.as_str(), base, arity),
        (Some(_), Some(_)) => {
            return Err(format!("builtin type `{}` cannot be package-qualified", base));
        }
        (None, Some(ty)) => FieldSpec::builtin(name, ty, arity),
        (None, None) if base == "Header" => FieldSpec::message(name, HEADER_PACKAGE, base, arity),
        (None, None) => FieldSpec::message(name, package, base, arity),
    };

    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worked_example() {
        let parsed = parse("int32 x\nstring name", "pkg").unwrap();
        assert!(parsed.constants.is_empty());
        assert_eq!(
            parsed.fields,
            vec![
                FieldSpec::builtin("x", BuiltinType::Int32, Arity::Scalar),
                FieldSpec::builtin("name", BuiltinType::String, Arity::Scalar),
            ]
        );
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let text = "# leading comment\n\n  int32 x   # trailing\n\t\nstring  name\n# end";
        let parsed = parse(text, "pkg").unwrap();
        assert_eq!(parsed.fields.len(), 2);
        assert_eq!(parsed.fields[0].name, "x");
        assert_eq!(parsed.fields[1].name, "name");
    }

    #[test]
    fn test_classify_line() {
        assert_eq!(classify_line("   # only comment"), LineKind::Blank);
        assert_eq!(classify_line(""), LineKind::Blank);
        assert_eq!(classify_line("int32 X=1"), LineKind::Constant);
        assert_eq!(classify_line("int32 x # default=1"), LineKind::Field);
    }

    #[test]
    fn test_missing_name_line_number() {
        let err = parse("int32 x\nfoo 1", "pkg").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("invalid field name"));

        let err = parse("int32 x\n\n# c\nint32", "pkg").unwrap_err();
        assert_eq!(err.line, 4);
        assert!(err.message.contains("missing field name"));
    }

    #[test]
    fn test_array_fields() {
        let parsed = parse("float64[36] covariance\nuint8[] data\nPoint[3] pts", "geometry_msgs").unwrap();
        assert_eq!(parsed.fields[0].arity, Arity::FixedArray(36));
        assert_eq!(parsed.fields[1].arity, Arity::VariableArray);
        assert_eq!(parsed.fields[2].arity, Arity::FixedArray(3));
        assert_eq!(parsed.fields[2].package, "geometry_msgs");
        assert_eq!(parsed.fields[2].type_name, "Point");
    }

    #[test]
    fn test_malformed_arrays() {
        for text in ["int32[ x", "int32] x", "int32[0] x", "int32[-1] x", "int32[a] x", "int32[][] x"] {
            let err = parse(text, "pkg").unwrap_err();
            assert_eq!(err.line, 1, "{}", text);
        }
    }

    #[test]
    fn test_type_resolution() {
        let text = "Header header\ngeometry_msgs/Pose pose\nLocal local\ntime stamp";
        let parsed = parse(text, "my_pkg").unwrap();
        assert_eq!(parsed.fields[0].full_type_name(), "std_msgs/Header");
        assert_eq!(parsed.fields[1].full_type_name(), "geometry_msgs/Pose");
        assert_eq!(parsed.fields[2].full_type_name(), "my_pkg/Local");
        assert!(parsed.fields[3].is_builtin());
    }

    #[test]
    fn test_qualified_builtin_rejected() {
        let err = parse("std_msgs/int32 x", "pkg").unwrap_err();
        assert!(err.message.contains("cannot be package-qualified"));
    }

    #[test]
    fn test_constants() {
        let text = "byte DEBUG=1\nint32 MAX = 100 # comment\nstring GREETING=hello # world";
        let parsed = parse(text, "pkg").unwrap();
        assert_eq!(parsed.constants.len(), 3);
        assert_eq!(parsed.constants[0], ConstantSpec::new("byte", "DEBUG", "1"));
        assert_eq!(parsed.constants[1], ConstantSpec::new("int32", "MAX", "100"));
        assert_eq!(parsed.constants[2].value_text, "hello # world");
        assert!(parsed.fields.is_empty());
    }

    #[test]
    fn test_invalid_constants() {
        assert!(parse("time T=1", "pkg").is_err());
        assert!(parse("int32[] A=1", "pkg").is_err());
        assert!(parse("Header H=1", "pkg").is_err());
        assert!(parse("int32 A=", "pkg").is_err());
        assert!(parse("int32 =1", "pkg").is_err());
        assert!(parse("int32 A=1 2", "pkg").is_err());

        let err = parse("int32 x\nint32 Y=", "pkg").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("missing value"));
    }

    #[test]
    fn test_extra_tokens() {
        let err = parse("int32 x y", "pkg").unwrap_err();
        assert!(err.message.contains("unexpected token `y`"));
    }

    #[test]
    fn test_error_with_name() {
        let err = parse("int32 x\nfoo 1", "pkg").unwrap_err().with_name("pkg/Msg");
        assert!(err.to_string().starts_with("pkg/Msg:2: "));
    }
}

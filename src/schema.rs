//! Definition model: fields, constants, messages and services

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::checksum::Checksum;
use crate::error::{Result, SchemaError};

/// Builtin scalar types of the message language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinType {
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    String,
    Time,
    Duration,
    /// Deprecated alias of `int8`
    Byte,
    /// Deprecated alias of `uint8`
    Char,
}

impl BuiltinType {
    /// Look up a builtin by its spelling in a definition file
    pub fn parse(name: &str) -> Option<Self> {
        let ty = match name {
            "bool" => BuiltinType::Bool,
            "int8" => BuiltinType::Int8,
            "uint8" => BuiltinType::UInt8,
            "int16" => BuiltinType::Int16,
            "uint16" => BuiltinType::UInt16,
            "int32" => BuiltinType::Int32,
            "uint32" => BuiltinType::UInt32,
            "int64" => BuiltinType::Int64,
            "uint64" => BuiltinType::UInt64,
            "float32" => BuiltinType::Float32,
            "float64" => BuiltinType::Float64,
            "string" => BuiltinType::String,
            "time" => BuiltinType::Time,
            "duration" => BuiltinType::Duration,
            "byte" => BuiltinType::Byte,
            "char" => BuiltinType::Char,
            _ => return None,
        };
        Some(ty)
    }

    /// The spelling used in definition files and canonical text
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinType::Bool => "bool",
            BuiltinType::Int8 => "int8",
            BuiltinType::UInt8 => "uint8",
            BuiltinType::Int16 => "int16",
            BuiltinType::UInt16 => "uint16",
            BuiltinType::Int32 => "int32",
            BuiltinType::UInt32 => "uint32",
            BuiltinType::Int64 => "int64",
            BuiltinType::UInt64 => "uint64",
            BuiltinType::Float32 => "float32",
            BuiltinType::Float64 => "float64",
            BuiltinType::String => "string",
            BuiltinType::Time => "time",
            BuiltinType::Duration => "duration",
            BuiltinType::Byte => "byte",
            BuiltinType::Char => "char",
        }
    }

    /// Whether constants may be declared with this type.
    ///
    /// `time` and `duration` are builtin but not primitive.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, BuiltinType::Time | BuiltinType::Duration)
    }
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Array-ness of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "len")]
pub enum Arity {
    Scalar,
    /// `T[]`
    VariableArray,
    /// `T[N]`
    FixedArray(usize),
}

impl Arity {
    /// The suffix as written after the type name
    pub fn suffix(&self) -> String {
        match self {
            Arity::Scalar => String::new(),
            Arity::VariableArray => "[]".to_string(),
            Arity::FixedArray(len) => format!("[{}]", len),
        }
    }

    pub fn is_array(&self) -> bool {
        !matches!(self, Arity::Scalar)
    }
}

/// A single field declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name
    pub name: String,
    /// Builtin name or the short name of a message type
    pub type_name: String,
    /// Package of a message type; empty for builtins
    pub package: String,
    pub arity: Arity,
}

impl FieldSpec {
    /// Create a builtin-typed field
    pub fn builtin(name: impl Into<String>, ty: BuiltinType, arity: Arity) -> Self {
        Self {
            name: name.into(),
            type_name: ty.name().to_string(),
            package: String::new(),
            arity,
        }
    }

    /// Create a field referencing another message
    pub fn message(
        name: impl Into<String>,
        package: impl Into<String>,
        type_name: impl Into<String>,
        arity: Arity,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            package: package.into(),
            arity,
        }
    }

    /// True when no cross-definition resolution is needed
    pub fn is_builtin(&self) -> bool {
        self.package.is_empty()
    }

    /// `package/Type` for message fields, the builtin name otherwise
    pub fn full_type_name(&self) -> String {
        if self.package.is_empty() {
            self.type_name.clone()
        } else {
            format!("{}/{}", self.package, self.type_name)
        }
    }

    /// Type name with its array suffix, e.g. `float64[36]`
    pub fn type_text(&self) -> String {
        format!("{}{}", self.type_name, self.arity.suffix())
    }
}

/// A named constant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantSpec {
    pub type_name: String,
    pub name: String,
    /// Literal value text, not interpreted
    pub value_text: String,
}

impl ConstantSpec {
    pub fn new(
        type_name: impl Into<String>,
        name: impl Into<String>,
        value_text: impl Into<String>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            value_text: value_text.into(),
        }
    }
}

/// A resolved message definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSpec {
    pub package_name: String,
    pub short_name: String,
    /// `package/Type`
    pub full_name: String,
    /// Fields in source order
    pub fields: Vec<FieldSpec>,
    /// Constants in source order
    pub constants: Vec<ConstantSpec>,
    /// Raw definition text
    pub text: String,
    /// Memoized fingerprint, absent until computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5sum: Option<Checksum>,
}

impl MsgSpec {
    /// Create a spec without a fingerprint
    pub fn new(
        full_name: &str,
        fields: Vec<FieldSpec>,
        constants: Vec<ConstantSpec>,
        text: impl Into<String>,
    ) -> Result<Self> {
        let (package_name, short_name) = split_full_name(full_name)?;
        Ok(Self {
            package_name: package_name.to_string(),
            short_name: short_name.to_string(),
            full_name: full_name.to_string(),
            fields,
            constants,
            text: text.into(),
            md5sum: None,
        })
    }

    /// Full names of every directly referenced message, in field order
    pub fn dependencies(&self) -> Vec<String> {
        let mut deps: Vec<String> = Vec::new();
        for field in self.fields.iter().filter(|f| !f.is_builtin()) {
            let name = field.full_type_name();
            if !deps.contains(&name) {
                deps.push(name);
            }
        }
        deps
    }

    pub fn has_header(&self) -> bool {
        self.fields
            .first()
            .map(|f| f.package == "std_msgs" && f.type_name == "Header" && !f.arity.is_array())
            .unwrap_or(false)
    }
}

/// A resolved service definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrvSpec {
    pub package_name: String,
    pub short_name: String,
    pub full_name: String,
    /// Raw definition text
    pub text: String,
    /// Composite fingerprint over request and response
    pub md5sum: Checksum,
    /// `<full_name>Request`
    pub request: Arc<MsgSpec>,
    /// `<full_name>Response`
    pub response: Arc<MsgSpec>,
}

/// Split `package/Type` into its two parts
pub fn split_full_name(full_name: &str) -> Result<(&str, &str)> {
    match full_name.split_once('/') {
        Some((package, name))
            if !package.is_empty() && !name.is_empty() && !name.contains('/') =>
        {
            Ok((package, name))
        }
        _ => Err(SchemaError::InvalidName(full_name.to_string())),
    }
}

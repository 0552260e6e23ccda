//! ROS Message Definition Registry
//!
//! Loads ROS `.msg` and `.srv` definitions from package roots, resolves
//! every field's type across packages and computes the MD5 fingerprints
//! that publishers, subscribers and service clients compare before they
//! talk to each other.
//!
//! ## Features
//!
//! - **Package Discovery**: one scan of the configured roots, `package.xml` marks a package
//! - **Line Parser**: constants and fields in source order, line-numbered syntax errors
//! - **Wire-Compatible Fingerprints**: canonical text and md5sum identical to the ROS toolchain
//! - **Memoization**: each message is read, parsed and hashed once per registry
//!
//! ## Layout
//!
//! ```text
//! <root>/
//! ├── std_msgs/
//! │   ├── package.xml
//! │   └── msg/
//! │       ├── Header.msg      -> std_msgs/Header
//! │       └── String.msg      -> std_msgs/String
//! └── std_srvs/
//!     ├── package.xml
//!     └── srv/
//!         └── Trigger.srv     -> std_srvs/Trigger
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use rosmsg_schemas::SchemaRegistry;
//!
//! let mut registry = SchemaRegistry::new(&["/opt/ros/noetic/share"])?;
//! let spec = registry.load_msg("std_msgs/String")?;
//! println!("{} {}", spec.full_name, spec.md5sum.as_ref().unwrap());
//! # Ok::<(), rosmsg_schemas::SchemaError>(())
//! ```

pub mod checksum;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod parser;
pub mod path_index;
pub mod registry;
pub mod schema;

pub use checksum::Checksum;
pub use config::{OutputFormat, RosmsgConfig};
pub use error::{DefinitionKind, Result, SchemaError};
pub use fingerprint::DefinitionResolver;
pub use parser::{ParseError, ParsedDefinition};
pub use path_index::PathIndex;
pub use registry::SchemaRegistry;
pub use schema::{Arity, BuiltinType, ConstantSpec, FieldSpec, MsgSpec, SrvSpec};

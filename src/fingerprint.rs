//! Canonical text and MD5 fingerprints
//!
//! The canonical text lists constants, then fields, one per line, in
//! source order. Fields of message type are written as
//! `<md5 of referenced message> <name>` so that a change anywhere in the
//! dependency tree changes every dependent fingerprint.

use std::sync::Arc;

use crate::checksum::Checksum;
use crate::error::Result;
use crate::schema::MsgSpec;

/// Source of referenced message definitions during fingerprinting
pub trait DefinitionResolver {
    /// Resolve `package/Type` to a spec, loading it if needed
    fn resolve_msg(&mut self, full_name: &str) -> Result<Arc<MsgSpec>>;
}

/// Build the canonical text hashed into the fingerprint.
///
/// Any failure to resolve a referenced message aborts the whole text.
pub fn md5_text(spec: &MsgSpec, resolver: &mut dyn DefinitionResolver) -> Result<String> {
    let mut lines = Vec::with_capacity(spec.constants.len() + spec.fields.len());

    for constant in &spec.constants {
        lines.push(format!(
            "{} {}={}",
            constant.type_name, constant.name, constant.value_text
        ));
    }

    for field in &spec.fields {
        if field.is_builtin() {
            lines.push(format!("{} {}", field.type_text(), field.name));
        } else {
            let sub_spec = resolver.resolve_msg(&field.full_type_name())?;
            let sub_md5 = msg_md5(&sub_spec, resolver)?;
            lines.push(format!("{} {}", sub_md5, field.name));
        }
    }

    Ok(lines.join("\n").trim_matches('\n').to_string())
}

/// Fingerprint of a message, reusing a memoized value when present
pub fn msg_md5(spec: &MsgSpec, resolver: &mut dyn DefinitionResolver) -> Result<Checksum> {
    if let Some(md5sum) = &spec.md5sum {
        return Ok(md5sum.clone());
    }
    Ok(Checksum::from_text(&md5_text(spec, resolver)?))
}

/// Fingerprint of a service.
///
/// Request and response canonical texts are hashed in one pass with no
/// separator, which differs from hashing each and joining the digests.
pub fn srv_md5(
    request: &MsgSpec,
    response: &MsgSpec,
    resolver: &mut dyn DefinitionResolver,
) -> Result<Checksum> {
    let request_text = md5_text(request, resolver)?;
    let response_text = md5_text(response, resolver)?;
    Ok(Checksum::from_parts([request_text.as_str(), response_text.as_str()]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DefinitionKind, SchemaError};
    use crate::parser;
    use std::collections::HashMap;

    /// Resolver over a fixed set of already-fingerprinted specs
    #[derive(Default)]
    struct MapResolver {
        specs: HashMap<String, Arc<MsgSpec>>,
        lookups: usize,
    }

    impl MapResolver {
        fn add(&mut self, full_name: &str, text: &str) -> Arc<MsgSpec> {
            let mut spec = spec_from(full_name, text);
            spec.md5sum = Some(msg_md5(&spec, self).unwrap());
            let spec = Arc::new(spec);
            self.specs.insert(full_name.to_string(), spec.clone());
            spec
        }
    }

    impl DefinitionResolver for MapResolver {
        fn resolve_msg(&mut self, full_name: &str) -> Result<Arc<MsgSpec>> {
            self.lookups += 1;
            self.specs
                .get(full_name)
                .cloned()
                .ok_or_else(|| SchemaError::NotFound {
                    kind: DefinitionKind::Message,
                    full_name: full_name.to_string(),
                })
        }
    }

    fn spec_from(full_name: &str, text: &str) -> MsgSpec {
        let (package, _) = crate::schema::split_full_name(full_name).unwrap();
        let parsed = parser::parse(text, package).unwrap();
        MsgSpec::new(full_name, parsed.fields, parsed.constants, text).unwrap()
    }

    #[test]
    fn test_worked_example() {
        let mut resolver = MapResolver::default();
        let spec = spec_from("pkg/Example", "int32 x\nstring name\n");
        let text = md5_text(&spec, &mut resolver).unwrap();
        assert_eq!(text, "int32 x\nstring name");
        assert_eq!(text.len(), 19);
        assert_eq!(
            msg_md5(&spec, &mut resolver).unwrap().as_str(),
            "ca85c322958a9a81e938f6b9641ea3cf"
        );
    }

    #[test]
    fn test_constants_precede_fields() {
        let mut resolver = MapResolver::default();
        let spec = spec_from("pkg/Mixed", "int32 a\nint32 MAX=10\nint32 b");
        assert_eq!(
            md5_text(&spec, &mut resolver).unwrap(),
            "int32 MAX=10\nint32 a\nint32 b"
        );
    }

    #[test]
    fn test_nested_reference_uses_digest() {
        let mut resolver = MapResolver::default();
        resolver.add("geometry_msgs/Point", "float64 x\nfloat64 y\nfloat64 z");
        resolver.add("geometry_msgs/Quaternion", "float64 x\nfloat64 y\nfloat64 z\nfloat64 w");
        let pose = spec_from("geometry_msgs/Pose", "Point position\nQuaternion orientation");

        let text = md5_text(&pose, &mut resolver).unwrap();
        assert_eq!(
            text,
            "4a842b65f413084dc2b10fb484ea7f17 position\na779879fadf0160734f906b8c19c7004 orientation"
        );
        assert_eq!(
            msg_md5(&pose, &mut resolver).unwrap().as_str(),
            "e45d45a5a1ce597b249e23fb30fc871f"
        );
    }

    #[test]
    fn test_memoized_digest_skips_resolution() {
        let mut resolver = MapResolver::default();
        resolver.add("pkg/Inner", "int32 x");
        let mut outer = spec_from("pkg/Outer", "Inner inner");
        outer.md5sum = Some(Checksum::from("0123456789abcdef0123456789abcdef"));

        let before = resolver.lookups;
        let md5sum = msg_md5(&outer, &mut resolver).unwrap();
        assert_eq!(md5sum.as_str(), "0123456789abcdef0123456789abcdef");
        assert_eq!(resolver.lookups, before);
    }

    #[test]
    fn test_unresolved_reference_propagates() {
        let mut resolver = MapResolver::default();
        let spec = spec_from("pkg/Broken", "int32 ok\nMissing missing");
        let err = md5_text(&spec, &mut resolver).unwrap_err();
        assert_eq!(err.to_string(), "message definition of `pkg/Missing` is not found");
    }

    #[test]
    fn test_service_digest() {
        let mut resolver = MapResolver::default();
        let request = spec_from("rospy_tutorials/AddTwoIntsRequest", "int64 a\nint64 b");
        let response = spec_from("rospy_tutorials/AddTwoIntsResponse", "int64 sum");
        assert_eq!(
            srv_md5(&request, &response, &mut resolver).unwrap().as_str(),
            "6a2e34150c00229791cc89ff309fff21"
        );
    }
}

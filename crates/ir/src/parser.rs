//! Byte-level diagram parser.
//!
//! Accepts both the direct shape (a diagram object at the top level) and the
//! project-wrapped shape, where the diagram sits one level down inside a
//! wrapper object.

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::DiagramIr;

/// Parse a diagram document from raw bytes.
///
/// If the top-level object has no `nodes` key, the first top-level value that
/// is itself an object with `nodes` is used as the document root. The scan is
/// in document order.
///
/// # Errors
///
/// Returns [`Error::MalformedIr`] if the bytes are not JSON, if neither shape
/// is found, or if the diagram fails to decode.
pub fn parse_diagram(bytes: &[u8]) -> Result<DiagramIr> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| Error::malformed(format!("invalid JSON: {e}")))?;

    let root = resolve_root(value)?;
    let ir: DiagramIr = serde_path_to_error::deserialize(root)
        .map_err(|e| Error::malformed(format!("diagram does not match schema: {e}")))?;

    debug!(
        nodes = ir.nodes.len(),
        edges = ir.edges.len(),
        "parsed diagram document"
    );
    Ok(ir)
}

/// Find the diagram object inside a decoded document.
fn resolve_root(value: Value) -> Result<Value> {
    let Value::Object(map) = value else {
        return Err(Error::malformed("top-level value is not an object"));
    };

    if map.contains_key("nodes") {
        return Ok(Value::Object(map));
    }

    for (key, candidate) in map {
        if let Value::Object(inner) = &candidate
            && inner.contains_key("nodes")
        {
            debug!(wrapper = %key, "using project-wrapped diagram");
            return Ok(candidate);
        }
    }

    Err(Error::malformed(
        "no 'nodes' key at the top level or one level down",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_direct_shape() {
        let bytes = br#"{"nodes":[{"id":"a","type":"resource","resourceType":"vpc"}]}"#;
        let ir = parse_diagram(bytes).unwrap();
        assert_eq!(ir.nodes.len(), 1);
        assert_eq!(ir.nodes[0].id, "a");
        assert_eq!(ir.nodes[0].resource_type, "vpc");
    }

    #[test]
    fn test_parse_project_wrapped_shape() {
        let bytes = br#"{"project":{"nodes":[{"id":"a"}],"edges":[]}}"#;
        let ir = parse_diagram(bytes).unwrap();
        assert_eq!(ir.nodes.len(), 1);
    }

    #[test]
    fn test_parse_wrapped_picks_first_candidate() {
        let bytes = br#"{"meta":{"version":1},"diagram":{"nodes":[{"id":"x"}]},"other":{"nodes":[{"id":"y"}]}}"#;
        let ir = parse_diagram(bytes).unwrap();
        assert_eq!(ir.nodes[0].id, "x");
    }

    #[test]
    fn test_parse_rejects_missing_nodes() {
        let bytes = br#"{"edges":[]}"#;
        let err = parse_diagram(bytes).unwrap_err();
        assert!(matches!(err, Error::MalformedIr { .. }));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = parse_diagram(b"[1,2,3]").unwrap_err();
        assert!(matches!(err, Error::MalformedIr { .. }));
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let err = parse_diagram(b"not json").unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_parse_defaults_optional_sections() {
        let bytes = br#"{"nodes":[]}"#;
        let ir = parse_diagram(bytes).unwrap();
        assert!(ir.edges.is_empty());
        assert!(ir.variables.is_empty());
        assert!(ir.outputs.is_empty());
    }

    #[test]
    fn test_parse_variables_and_outputs() {
        let bytes = br#"{
            "nodes":[],
            "variables":[{"name":"aws_region","type":"string","description":"","default":"us-east-1","sensitive":false}],
            "outputs":[{"name":"vpc_id","value":"aws_vpc.vpc-1.id","description":"the vpc"}]
        }"#;
        let ir = parse_diagram(bytes).unwrap();
        assert_eq!(ir.variables.len(), 1);
        assert_eq!(ir.variables[0].type_expr, "string");
        assert_eq!(ir.outputs.len(), 1);
        assert!(!ir.outputs[0].sensitive);
    }

    #[test]
    fn test_parse_does_not_interpret_resource_type() {
        let bytes = br#"{"nodes":[{"id":"a","resourceType":"definitely-not-a-real-type"}]}"#;
        let ir = parse_diagram(bytes).unwrap();
        assert_eq!(ir.nodes[0].resource_type, "definitely-not-a-real-type");
    }
}

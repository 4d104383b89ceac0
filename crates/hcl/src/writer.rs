//! Deterministic HCL renderer.
//!
//! Rendering is a pure function of the block sequence: attributes and map
//! keys sort lexicographically, nested blocks sort by kind (insertion order
//! within a kind), and every value shape has exactly one textual form.

use crate::block::{Block, NestedBlock, Value};

const INDENT: &str = "  ";

/// Render a block sequence into HCL text.
///
/// Blocks are separated by a blank line; the text ends with a single
/// newline.
#[must_use]
pub fn render_blocks(blocks: &[Block]) -> String {
    let mut out = String::new();
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_block(block, &mut out);
    }
    out
}

fn render_block(block: &Block, out: &mut String) {
    out.push_str(block.kind.as_str());
    for label in &block.labels {
        out.push(' ');
        out.push_str(&quote(label));
    }
    out.push_str(" {\n");
    render_attributes(&block.attributes, 1, out);
    render_nested(&block.nested, 1, out);
    out.push_str("}\n");
}

fn render_attributes(
    attributes: &indexmap::IndexMap<String, Value>,
    depth: usize,
    out: &mut String,
) {
    let mut keys: Vec<&String> = attributes.keys().collect();
    keys.sort();
    for key in keys {
        let value = &attributes[key.as_str()];
        out.push_str(&INDENT.repeat(depth));
        out.push_str(key);
        out.push_str(" = ");
        render_value(value, depth, out);
        out.push('\n');
    }
}

fn render_nested(nested: &[NestedBlock], depth: usize, out: &mut String) {
    let mut ordered: Vec<&NestedBlock> = nested.iter().collect();
    // Stable sort keeps insertion order within a kind.
    ordered.sort_by(|a, b| a.kind.cmp(&b.kind));
    for block in ordered {
        out.push('\n');
        out.push_str(&INDENT.repeat(depth));
        out.push_str(&block.kind);
        for label in &block.labels {
            out.push(' ');
            out.push_str(&quote(label));
        }
        out.push_str(" {\n");
        render_attributes(&block.attributes, depth + 1, out);
        out.push_str(&INDENT.repeat(depth));
        out.push_str("}\n");
    }
}

fn render_value(value: &Value, depth: usize, out: &mut String) {
    match value {
        Value::Str(s) => out.push_str(&quote(s)),
        Value::Num(n) => out.push_str(&n.to_string()),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::List(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push_str("[\n");
            for item in items {
                out.push_str(&INDENT.repeat(depth + 1));
                render_value(item, depth + 1, out);
                out.push_str(",\n");
            }
            out.push_str(&INDENT.repeat(depth));
            out.push(']');
        }
        Value::Map(map) => {
            if map.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{\n");
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                out.push_str(&INDENT.repeat(depth + 1));
                out.push_str(&map_key(key));
                out.push_str(" = ");
                render_value(&map[key.as_str()], depth + 1, out);
                out.push('\n');
            }
            out.push_str(&INDENT.repeat(depth));
            out.push('}');
        }
        Value::Expr(traversal) => {
            // A traversal with an empty head is not a valid reference; fall
            // back to a quoted literal.
            if traversal.is_empty() || traversal.starts_with('.') {
                out.push_str(&quote(traversal));
            } else {
                out.push_str(traversal);
            }
        }
    }
}

/// Quote and escape a string for HCL.
fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '$' if chars.peek() == Some(&'{') => {
                chars.next();
                quoted.push_str("$${");
            }
            '%' if chars.peek() == Some(&'{') => {
                chars.next();
                quoted.push_str("%%{");
            }
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

/// Render a map key, quoting it when it is not a bare identifier.
fn map_key(key: &str) -> String {
    let bare = !key.is_empty()
        && key
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if bare {
        key.to_string()
    } else {
        quote(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use indexmap::IndexMap;

    #[test]
    fn test_render_simple_resource() {
        let block = Block::resource("aws_vpc", "main")
            .attr("cidr_block", Value::str("10.0.0.0/16"))
            .tagged("main-vpc");
        let text = render_blocks(&[block]);
        assert_eq!(
            text,
            "resource \"aws_vpc\" \"main\" {\n  cidr_block = \"10.0.0.0/16\"\n  tags = {\n    Name = \"main-vpc\"\n  }\n}\n"
        );
    }

    #[test]
    fn test_attributes_render_sorted() {
        let block = Block::provider("aws")
            .attr("zeta", Value::str("z"))
            .attr("alpha", Value::str("a"));
        let text = render_blocks(&[block]);
        let alpha = text.find("alpha").unwrap();
        let zeta = text.find("zeta").unwrap();
        assert!(alpha < zeta);
    }

    #[test]
    fn test_expr_renders_unquoted() {
        let block = Block::resource("aws_subnet", "s")
            .attr("vpc_id", Value::expr("aws_vpc.main.id"));
        let text = render_blocks(&[block]);
        assert!(text.contains("vpc_id = aws_vpc.main.id"));
        assert!(!text.contains("\"aws_vpc.main.id\""));
    }

    #[test]
    fn test_empty_headed_expr_falls_back_to_string() {
        let block = Block::output("o").attr("value", Value::expr(".dangling.id"));
        let text = render_blocks(&[block]);
        assert!(text.contains("value = \".dangling.id\""));
    }

    #[test]
    fn test_list_renders_one_element_per_line() {
        let block = Block::resource("aws_instance", "i").attr(
            "vpc_security_group_ids",
            Value::List(vec![Value::expr("aws_security_group.a.id")]),
        );
        let text = render_blocks(&[block]);
        assert!(text.contains("vpc_security_group_ids = [\n    aws_security_group.a.id,\n  ]"));
    }

    #[test]
    fn test_empty_collections() {
        let block = Block::resource("aws_instance", "i")
            .attr("empty_list", Value::List(vec![]))
            .attr("empty_map", Value::Map(IndexMap::new()));
        let text = render_blocks(&[block]);
        assert!(text.contains("empty_list = []"));
        assert!(text.contains("empty_map = {}"));
    }

    #[test]
    fn test_string_escapes() {
        let block = Block::output("o").attr("value", Value::str("a\"b\\c\nd${oops}"));
        let text = render_blocks(&[block]);
        assert!(text.contains(r#""a\"b\\c\nd$${oops}""#));
    }

    #[test]
    fn test_map_keys_sorted_and_quoted_when_needed() {
        let mut map = IndexMap::new();
        map.insert("z-key".to_string(), Value::int(1));
        map.insert("app.kubernetes.io/name".to_string(), Value::int(2));
        let block = Block::resource("aws_s3_bucket", "b").attr("tags", Value::Map(map));
        let text = render_blocks(&[block]);
        let quoted = text.find("\"app.kubernetes.io/name\"").unwrap();
        let bare = text.find("z-key").unwrap();
        assert!(quoted < bare);
    }

    #[test]
    fn test_nested_blocks_sorted_by_kind_stable_within() {
        let block = Block {
            kind: BlockKind::Resource,
            labels: vec!["aws_security_group".to_string(), "sg".to_string()],
            attributes: IndexMap::new(),
            nested: vec![
                NestedBlock::new("ingress").attr("from_port", Value::int(443)),
                NestedBlock::new("egress").attr("from_port", Value::int(0)),
                NestedBlock::new("ingress").attr("from_port", Value::int(22)),
            ],
        };
        let text = render_blocks(&[block]);
        let egress = text.find("egress").unwrap();
        let first_ingress = text.find("from_port = 443").unwrap();
        let second_ingress = text.find("from_port = 22").unwrap();
        assert!(egress < first_ingress);
        assert!(first_ingress < second_ingress);
    }

    #[test]
    fn test_blocks_separated_by_blank_line() {
        let text = render_blocks(&[Block::provider("aws"), Block::resource("aws_vpc", "v")]);
        assert!(text.contains("}\n\nresource"));
    }

    #[test]
    fn test_number_renders_shortest_form() {
        let block = Block::output("o")
            .attr("int", Value::int(42))
            .attr("float", Value::Num(serde_json::Number::from_f64(1.5).unwrap()));
        let text = render_blocks(&[block]);
        assert!(text.contains("int = 42"));
        assert!(text.contains("float = 1.5"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let block = Block::resource("aws_vpc", "v")
            .attr("b", Value::str("2"))
            .attr("a", Value::str("1"));
        assert_eq!(render_blocks(&[block.clone()]), render_blocks(&[block]));
    }
}

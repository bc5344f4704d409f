//! Serialization support for closed-AST trees.
//!
//! Two forms:
//!
//! - plain JSON of a [`Node`] (`to_json` / `from_json`), the nested
//!   `{"type": ..., "children": [...]}` shape
//! - versioned snapshots (`to_snapshot` / `from_snapshot`), which wrap the
//!   plain form as `{"schemaVersion": N, "root": ...}` so stored trees from an
//!   incompatible schema are rejected instead of misread

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MdError, MdResult};
use crate::node::Node;

/// Current schema version of the serialized node form.
/// Increment this when making breaking changes to `Node`'s serde shape.
pub const SCHEMA_VERSION: u32 = 1;

/// Serialize a tree to compact JSON.
pub fn to_json(node: &Node) -> MdResult<String> {
    Ok(serde_json::to_string(node)?)
}

/// Serialize a tree to indented JSON.
pub fn to_json_pretty(node: &Node) -> MdResult<String> {
    Ok(serde_json::to_string_pretty(node)?)
}

/// Deserialize a tree from its plain JSON form.
///
/// The tree is checked with [`Node::validate`], so a loaded tree keeps the
/// same guarantees as a freshly normalized one.
pub fn from_json(json: &str) -> MdResult<Node> {
    let node: Node = serde_json::from_str(json)?;
    node.validate()?;
    Ok(node)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRef<'a> {
    schema_version: u32,
    root: &'a Node,
}

/// Serialize a tree into a versioned snapshot.
pub fn to_snapshot(node: &Node) -> MdResult<String> {
    let snapshot = SnapshotRef {
        schema_version: SCHEMA_VERSION,
        root: node,
    };
    Ok(serde_json::to_string(&snapshot)?)
}

/// Deserialize a versioned snapshot.
///
/// # Errors
///
/// Returns an error if:
/// - the input is not a JSON object with a numeric `schemaVersion`
/// - the schema version differs from [`SCHEMA_VERSION`]
/// - the `root` does not match the node schema or fails [`Node::validate`]
pub fn from_snapshot(json: &str) -> MdResult<Node> {
    #[derive(Deserialize)]
    struct Envelope {
        #[serde(rename = "schemaVersion")]
        schema_version: u32,
        root: Value,
    }

    let envelope: Envelope = serde_json::from_str(json)?;
    if envelope.schema_version != SCHEMA_VERSION {
        return Err(MdError::VersionMismatch {
            expected: SCHEMA_VERSION,
            found: envelope.schema_version,
        });
    }
    let node = Node::deserialize(envelope.root).map_err(MdError::serialize)?;
    node.validate()?;
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Align, List, Table, TableCell, TableRow};

    fn sample() -> Node {
        Node::root(vec![
            Node::heading(1, vec![Node::text("Title")]),
            Node::List(List {
                ordered: false,
                start: None,
                spread: false,
                children: vec![
                    Node::list_item(Some(false), vec![Node::paragraph(vec![Node::text("todo")])]),
                    Node::list_item(None, vec![Node::paragraph(vec![Node::text("plain")])]),
                ],
            }),
            Node::Table(Table {
                align: [Align::Center].into_iter().collect(),
                children: vec![Node::TableRow(TableRow {
                    children: vec![Node::TableCell(TableCell {
                        align: Some(Align::Center),
                        children: vec![Node::text("c")],
                    })],
                })],
            }),
            Node::ThematicBreak,
        ])
    }

    #[test]
    fn test_json_round_trip() {
        let root = sample();
        let json = to_json(&root).unwrap();
        assert_eq!(from_json(&json).unwrap(), root);

        let pretty = to_json_pretty(&root).unwrap();
        assert_eq!(from_json(&pretty).unwrap(), root);
    }

    #[test]
    fn test_plain_shape() {
        let json: Value = serde_json::from_str(&to_json(&sample()).unwrap()).unwrap();
        assert_eq!(json["type"], "root");
        assert_eq!(json["children"][0]["depth"], 1);
        assert_eq!(json["children"][1]["children"][0]["checked"], false);
        assert!(json["children"][1]["children"][1].get("checked").is_none());
        assert_eq!(json["children"][2]["align"][0], "center");
    }

    #[test]
    fn test_snapshot_round_trip() {
        let root = sample();
        let snapshot = to_snapshot(&root).unwrap();
        assert!(snapshot.starts_with("{\"schemaVersion\":1,"));
        assert_eq!(from_snapshot(&snapshot).unwrap(), root);
    }

    #[test]
    fn test_snapshot_version_mismatch() {
        let json = r#"{"schemaVersion": 99, "root": {"type": "root", "children": []}}"#;
        let err = from_snapshot(json).unwrap_err();
        assert!(matches!(err, MdError::VersionMismatch { expected: 1, found: 99 }));
    }

    #[test]
    fn test_invariant_breaking_trees_rejected() {
        let cases = [
            r#"{"type": "heading", "depth": 42, "children": []}"#,
            r#"{"type": "list", "ordered": false, "start": 5, "children": []}"#,
            r#"{"type": "table", "align": ["left"], "children": [{"type": "tableRow", "children": []}]}"#,
        ];
        for json in cases {
            let err = from_json(json).unwrap_err();
            assert!(matches!(err, MdError::InvalidField { .. }), "{json}");

            let snapshot = format!(r#"{{"schemaVersion": 1, "root": {json}}}"#);
            let err = from_snapshot(&snapshot).unwrap_err();
            assert!(matches!(err, MdError::InvalidField { .. }), "{json}");
        }
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = from_json(r#"{"type": "footnoteReference"}"#).unwrap_err();
        assert!(matches!(err, MdError::Serialize(_)));
    }
}

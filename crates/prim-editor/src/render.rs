//! Plain-text rendering of the tree and property panels

use prim_tree::prelude::*;
use prim_tree::{PropertyRow, TimeSampleRow};

/// The rows a tree view would show: the root, plus the children of every
/// expanded row
///
/// Rows are prefixed with `-` when expanded, `+` when they have children
/// that are not shown.
pub fn outline(model: &TreeModel) -> String {
    let tree = model.cached();
    let Some(root) = tree.root() else {
        return String::new();
    };

    let mut lines = Vec::new();
    let mut pending = vec![(root, 0)];
    while let Some((index, depth)) = pending.pop() {
        let Some(node) = tree.get(index) else {
            continue;
        };
        let expanded = model.is_expanded(index).unwrap_or(false);
        let marker = if node.is_leaf() {
            ' '
        } else if expanded {
            '-'
        } else {
            '+'
        };
        lines.push(format!("{}{} {}", "  ".repeat(depth), marker, describe(node)));

        if expanded {
            let children: Vec<_> = tree.children(index).collect();
            pending.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
        }
    }
    lines.join("\n")
}

fn describe(node: &SceneNode) -> String {
    let mut text = node.name.clone();
    if !node.type_name.is_empty() {
        text.push_str(&format!(" ({})", node.type_name));
    }
    if !node.kind.is_empty() {
        text.push_str(&format!(" kind={}", node.kind));
    }
    if let Some(purpose) = node.purpose {
        text.push_str(&format!(" purpose={}", purpose));
    }
    if !node.variant_sets.is_empty() {
        text.push_str(&format!(" variants=[{}]", node.variant_summary()));
    }
    if node.has_payload {
        let state = if node.payload_loaded { "loaded" } else { "unloaded" };
        text.push_str(&format!(" payload={}", state));
    }
    if !node.active {
        text.push_str(" inactive");
    }
    text.push_str(&format!(" <{}>", node.tag));
    text
}

/// One line per attribute: name, type, value and colour class
pub fn properties(rows: &[PropertyRow]) -> String {
    rows.iter()
        .map(|row| {
            let animated = if row.time_sampled { " (animated)" } else { "" };
            format!(
                "{:<28} {:<10} {:<20} <{}>{}",
                row.name, row.type_name, row.value, row.class, animated
            )
            .trim_end()
            .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per time sample
pub fn time_samples(rows: &[TimeSampleRow]) -> String {
    rows.iter()
        .map(|row| format!("{} @ {} = {}", row.attribute, row.time, row.value))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use stage::{AttributeInfo, InMemoryStage, PrimPurpose, PrimSpec, Value, VariantSetSpec};

    fn stage() -> InMemoryStage {
        let mesh = PrimSpec::new("mesh", "Mesh")
            .with_attribute(AttributeInfo::new("foo", "string", Value::String("bar".into())).custom())
            .with_payload(true, vec![PrimSpec::new("detail", "Mesh")]);
        let geo = PrimSpec::new("geo", "Xform")
            .with_attribute(AttributeInfo::new(
                "xformOp:translate",
                "double3",
                Value::Vec3([0.0; 3]),
            ))
            .with_child(mesh);
        let lookdev = PrimSpec::new("lookdev", "Scope").with_variant_set(
            VariantSetSpec::new("shading")
                .with_variant("red", vec![PrimSpec::new("redMat", "Material")]),
        );
        let proxy = PrimSpec::new("proxy", "Mesh")
            .with_purpose(PrimPurpose::Proxy)
            .inactive();

        InMemoryStage::new(
            "render",
            PrimSpec::new("world", "Xform")
                .with_kind("assembly")
                .with_child(geo)
                .with_child(lookdev)
                .with_child(proxy),
        )
    }

    #[test]
    fn test_outline() {
        let stage = stage();
        let mut model = TreeModel::new();
        let root = model.bind_stage(&stage).unwrap();

        let top = model.expand(&stage, root).unwrap();
        model.set_expanded(root, true).unwrap();
        for &index in &top[..2] {
            model.expand(&stage, index).unwrap();
            model.set_expanded(index, true).unwrap();
        }

        insta::assert_snapshot!(outline(&model), @r###"
        - world (Xform) kind=assembly <default>
          - geo (Xform) <transform>
            + mesh (Mesh) payload=loaded <custom>
          - lookdev (Scope) variants=[shading: red] <default>
              redMat (Material) <default>
            proxy (Mesh) purpose=proxy inactive <default>
        "###);
    }

    #[test]
    fn test_outline_collapsed_root() {
        let stage = stage();
        let mut model = TreeModel::new();
        model.bind_stage(&stage).unwrap();

        insta::assert_snapshot!(outline(&model), @"+ world (Xform) kind=assembly <default>");
    }

    #[test]
    fn test_time_samples() {
        let rows = vec![
            TimeSampleRow {
                attribute: "radius".into(),
                time: 1.0,
                value: "0.5".into(),
            },
            TimeSampleRow {
                attribute: "radius".into(),
                time: 24.5,
                value: "2".into(),
            },
        ];
        insta::assert_snapshot!(time_samples(&rows), @r###"
        radius @ 1 = 0.5
        radius @ 24.5 = 2
        "###);
    }
}

//! Columns and data roles exposed to tree views

use derive_more::Display;

use crate::classify::ColorClass;
use crate::tree::SceneNode;

/// Text colour of inactive prims
pub const INACTIVE_FOREGROUND: [u8; 3] = [150, 150, 150];
/// Row background of inactive prims
pub const INACTIVE_BACKGROUND: [u8; 3] = [200, 200, 200];

/// A column of the prim tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Column {
    #[display(fmt = "Prim Name")]
    Name,
    #[display(fmt = "Type")]
    Type,
    #[display(fmt = "Kind")]
    Kind,
    #[display(fmt = "Purpose")]
    Purpose,
    #[display(fmt = "Variant Sets")]
    VariantSets,
    #[display(fmt = "Has Payload")]
    Payload,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Name,
        Column::Type,
        Column::Kind,
        Column::Purpose,
        Column::VariantSets,
        Column::Payload,
    ];

    /// Column by position, `None` when out of range
    pub fn from_position(position: usize) -> Option<Column> {
        Column::ALL.get(position).copied()
    }
}

/// What a view is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Text shown in the cell
    Display,
    /// Text colour
    Foreground,
    /// Cell background
    Background,
    /// The prim path, for mapping a row back to the stage
    Path,
}

/// Answer to a data query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Text(String),
    Color([u8; 3]),
}

/// The value of `column` for `node` under `role`
pub(crate) fn cell(node: &SceneNode, column: Column, role: Role) -> Option<CellValue> {
    match role {
        Role::Display => Some(CellValue::Text(display_text(node, column))),
        Role::Path => Some(CellValue::Text(node.path.to_string())),
        Role::Foreground if !node.active => Some(CellValue::Color(INACTIVE_FOREGROUND)),
        Role::Foreground => Some(CellValue::Color(foreground(node.tag))),
        Role::Background if !node.active => Some(CellValue::Color(INACTIVE_BACKGROUND)),
        Role::Background => None,
    }
}

fn foreground(tag: ColorClass) -> [u8; 3] {
    tag.rgb()
}

fn display_text(node: &SceneNode, column: Column) -> String {
    match column {
        Column::Name => node.name.clone(),
        Column::Type => node.type_name.clone(),
        Column::Kind => node.kind.clone(),
        Column::Purpose => node
            .purpose
            .map(|p| p.to_string())
            .unwrap_or_default(),
        Column::VariantSets => node.variant_summary(),
        Column::Payload => if node.has_payload { "Yes" } else { "No" }.to_string(),
    }
}

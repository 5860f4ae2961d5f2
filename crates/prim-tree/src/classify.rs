//! Colour classification of attributes
//!
//! Every attribute falls into exactly one [`ColorClass`]. When an attribute
//! qualifies for several, the first match in [`ColorClass::PRECEDENCE`] wins.

use derive_more::Display;
use stage::AttributeInfo;

/// Display category of an attribute (and, by extension, of a prim row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ColorClass {
    /// Custom attribute, not defined by the prim's schema
    #[display(fmt = "custom")]
    Custom,
    /// Transform operation (`xformOp:` namespace)
    #[display(fmt = "transform")]
    Transform,
    /// Carries time-sampled (animated) data
    #[display(fmt = "time-sampled")]
    TimeSampled,
    /// Token-valued attribute
    #[display(fmt = "token")]
    Token,
    /// Primvar (`primvars:` namespace)
    #[display(fmt = "primvar")]
    Primvar,
    /// Anything else
    #[display(fmt = "default")]
    Default,
}

impl ColorClass {
    /// All classes, highest precedence first
    pub const PRECEDENCE: [ColorClass; 6] = [
        ColorClass::Custom,
        ColorClass::Transform,
        ColorClass::TimeSampled,
        ColorClass::Token,
        ColorClass::Primvar,
        ColorClass::Default,
    ];

    /// Position in [`ColorClass::PRECEDENCE`] (0 = highest)
    pub fn rank(self) -> usize {
        match self {
            ColorClass::Custom => 0,
            ColorClass::Transform => 1,
            ColorClass::TimeSampled => 2,
            ColorClass::Token => 3,
            ColorClass::Primvar => 4,
            ColorClass::Default => 5,
        }
    }

    /// Display colour as RGB
    pub fn rgb(self) -> [u8; 3] {
        match self {
            ColorClass::Custom => [255, 255, 0],
            ColorClass::Transform => [200, 200, 255],
            ColorClass::TimeSampled => [0, 255, 0],
            ColorClass::Token => [217, 157, 52],
            ColorClass::Primvar => [0, 255, 255],
            ColorClass::Default => [142, 211, 245],
        }
    }

    /// The highest-precedence class among `classes`, `Default` when empty
    pub fn strongest(classes: impl IntoIterator<Item = ColorClass>) -> ColorClass {
        classes
            .into_iter()
            .min_by_key(|class| class.rank())
            .unwrap_or(ColorClass::Default)
    }
}

/// The attribute metadata classification looks at
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeMeta {
    /// Full name including namespace prefixes
    pub name: String,
    /// Whether the attribute is custom
    pub custom: bool,
    /// Value type token
    pub type_name: String,
    /// Whether the attribute carries time samples
    pub time_sampled: bool,
}

impl From<&AttributeInfo> for AttributeMeta {
    fn from(attribute: &AttributeInfo) -> Self {
        Self {
            name: attribute.name.clone(),
            custom: attribute.custom,
            type_name: attribute.type_name.clone(),
            time_sampled: attribute.has_time_samples(),
        }
    }
}

/// Classify an attribute. Pure and deterministic.
pub fn classify(meta: &AttributeMeta) -> ColorClass {
    if meta.custom {
        ColorClass::Custom
    } else if meta.name.starts_with("xformOp:") {
        ColorClass::Transform
    } else if meta.time_sampled {
        ColorClass::TimeSampled
    } else if meta.type_name == "token" {
        ColorClass::Token
    } else if meta.name.starts_with("primvars:") {
        ColorClass::Primvar
    } else {
        ColorClass::Default
    }
}

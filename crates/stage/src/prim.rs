use anyhow::{anyhow, Result};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::value::Value;

/// Kind values the editor offers (the empty string clears the kind)
pub const KIND_VALUES: &[&str] = &["", "component", "subcomponent", "assembly", "group"];

/// The purpose of an imageable prim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimPurpose {
    /// Always drawn
    #[default]
    #[display(fmt = "default")]
    Default,
    /// Drawn for final renders only
    #[display(fmt = "render")]
    Render,
    /// Lightweight stand-in drawn interactively
    #[display(fmt = "proxy")]
    Proxy,
    /// Visual aid, never rendered
    #[display(fmt = "guide")]
    Guide,
}

impl PrimPurpose {
    pub const ALL: [PrimPurpose; 4] = [
        PrimPurpose::Default,
        PrimPurpose::Render,
        PrimPurpose::Proxy,
        PrimPurpose::Guide,
    ];
}

impl FromStr for PrimPurpose {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        PrimPurpose::ALL
            .into_iter()
            .find(|p| p.to_string() == s)
            .ok_or_else(|| anyhow!("Unknown purpose: {:?}", s))
    }
}

/// A single time sample of an attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSample {
    pub time: f64,
    pub value: Value,
}

/// Snapshot of one attribute on a prim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeInfo {
    /// Full attribute name including namespaces, e.g. `xformOp:translate`
    pub name: String,
    /// Value type token, e.g. `double3` or `token`
    pub type_name: String,
    /// Whether the attribute is custom (not defined by the prim's schema)
    #[serde(default)]
    pub custom: bool,
    /// Default (non-animated) value
    #[serde(default)]
    pub value: Option<Value>,
    /// Animated values, sorted by time
    #[serde(default)]
    pub time_samples: Vec<TimeSample>,
}

impl AttributeInfo {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            custom: false,
            value: Some(value),
            time_samples: Vec::new(),
        }
    }

    /// Mark the attribute as custom
    pub fn custom(mut self) -> Self {
        self.custom = true;
        self
    }

    /// Add a time sample, keeping samples ordered by time
    pub fn with_sample(mut self, time: f64, value: Value) -> Self {
        self.set_sample(time, value);
        self
    }

    pub fn has_time_samples(&self) -> bool {
        !self.time_samples.is_empty()
    }

    pub fn is_primvar(&self) -> bool {
        self.name.starts_with("primvars:")
    }

    pub fn is_xform_op(&self) -> bool {
        self.name.starts_with("xformOp:")
    }

    /// Set or replace the sample at `time`
    pub fn set_sample(&mut self, time: f64, value: Value) {
        match self
            .time_samples
            .binary_search_by(|s| s.time.total_cmp(&time))
        {
            Ok(pos) => self.time_samples[pos].value = value,
            Err(pos) => self.time_samples.insert(pos, TimeSample { time, value }),
        }
    }

    /// Remove the sample at `time`, returning whether one existed
    pub fn remove_sample(&mut self, time: f64) -> bool {
        match self
            .time_samples
            .binary_search_by(|s| s.time.total_cmp(&time))
        {
            Ok(pos) => {
                self.time_samples.remove(pos);
                true
            }
            Err(_) => false,
        }
    }
}

/// A variant set and its current selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSetInfo {
    pub name: String,
    pub variants: Vec<String>,
    pub selection: Option<String>,
}

/// Prim-level metadata snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimMetadata {
    /// The prim name (last path segment)
    pub name: String,
    /// Schema type name, e.g. `Xform` or `Mesh` (empty for typeless prims)
    pub type_name: String,
    /// Model kind (empty when unset)
    pub kind: String,
    /// Purpose, for imageable prims
    pub purpose: Option<PrimPurpose>,
    /// Whether the prim is active
    pub active: bool,
    /// Whether the prim carries a payload
    pub has_payload: bool,
    /// Whether that payload is currently loaded
    pub payload_loaded: bool,
    /// Variant sets in authored order
    pub variant_sets: Vec<VariantSetInfo>,
}

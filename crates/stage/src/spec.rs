//! Authored prim descriptions the in-memory stage composes from

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::prim::{AttributeInfo, PrimPurpose, VariantSetInfo};

fn default_true() -> bool {
    true
}

/// One authored prim and everything beneath it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimSpec {
    pub name: String,
    #[serde(default)]
    pub type_name: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub purpose: Option<PrimPurpose>,
    #[serde(default = "default_true")]
    pub active: bool,
    /// Abstract prims (classes) are skipped by traversal
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub attributes: Vec<AttributeInfo>,
    #[serde(default)]
    pub children: Vec<PrimSpec>,
    #[serde(default)]
    pub variant_sets: Vec<VariantSetSpec>,
    #[serde(default)]
    pub payload: Option<PayloadSpec>,
}

/// A variant set with its alternatives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantSetSpec {
    pub name: String,
    #[serde(default)]
    pub selection: Option<String>,
    #[serde(default)]
    pub variants: Vec<VariantSpec>,
}

/// One alternative of a variant set, contributing children when selected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantSpec {
    pub name: String,
    #[serde(default)]
    pub children: Vec<PrimSpec>,
}

/// Deferred children that only compose while loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadSpec {
    #[serde(default = "default_true")]
    pub loaded: bool,
    #[serde(default)]
    pub children: Vec<PrimSpec>,
}

impl PrimSpec {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            kind: String::new(),
            purpose: None,
            active: true,
            is_abstract: false,
            attributes: Vec::new(),
            children: Vec::new(),
            variant_sets: Vec::new(),
            payload: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_purpose(mut self, purpose: PrimPurpose) -> Self {
        self.purpose = Some(purpose);
        self
    }

    pub fn with_attribute(mut self, attribute: AttributeInfo) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_child(mut self, child: PrimSpec) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_variant_set(mut self, set: VariantSetSpec) -> Self {
        self.variant_sets.push(set);
        self
    }

    pub fn with_payload(mut self, loaded: bool, children: Vec<PrimSpec>) -> Self {
        self.payload = Some(PayloadSpec { loaded, children });
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn abstract_prim(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Children in composition order: own, selected variants, loaded payload
    ///
    /// A name contributed by more than one source composes once, from the
    /// first (strongest) source.
    pub(crate) fn composed_children(&self) -> impl Iterator<Item = &PrimSpec> {
        let variant_children = self.variant_sets.iter().flat_map(|set| {
            set.selected()
                .map(|v| v.children.as_slice())
                .unwrap_or_default()
        });
        let payload_children = self
            .payload
            .iter()
            .filter(|p| p.loaded)
            .flat_map(|p| p.children.iter());
        let mut seen = HashSet::new();

        self.children
            .iter()
            .chain(variant_children)
            .chain(payload_children)
            .filter(move |&child| seen.insert(child.name.as_str()))
            .filter(|child| !child.is_abstract)
    }

    /// Mutable lookup of a composed child by name
    pub(crate) fn composed_child_mut(&mut self, name: &str) -> Option<&mut PrimSpec> {
        let PrimSpec {
            children,
            variant_sets,
            payload,
            ..
        } = self;

        let own = children.iter_mut();
        let variants = variant_sets.iter_mut().flat_map(|set| {
            let selection = set.selection.clone();
            set.variants
                .iter_mut()
                .filter(move |v| selection.as_deref() == Some(v.name.as_str()))
                .flat_map(|v| v.children.iter_mut())
        });
        let loaded = payload
            .iter_mut()
            .filter(|p| p.loaded)
            .flat_map(|p| p.children.iter_mut());

        own.chain(variants)
            .chain(loaded)
            .find(|child| child.name == name)
            .filter(|child| !child.is_abstract)
    }
}

impl VariantSetSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selection: None,
            variants: Vec::new(),
        }
    }

    /// Add a variant; the first variant added becomes the selection
    pub fn with_variant(mut self, name: impl Into<String>, children: Vec<PrimSpec>) -> Self {
        let name = name.into();
        if self.selection.is_none() {
            self.selection = Some(name.clone());
        }
        self.variants.push(VariantSpec { name, children });
        self
    }

    pub fn selected(&self) -> Option<&VariantSpec> {
        let selection = self.selection.as_deref()?;
        self.variants.iter().find(|v| v.name == selection)
    }

    pub fn info(&self) -> VariantSetInfo {
        VariantSetInfo {
            name: self.name.clone(),
            variants: self.variants.iter().map(|v| v.name.clone()).collect(),
            selection: self.selection.clone(),
        }
    }
}

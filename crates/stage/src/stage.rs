use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info};
use std::path::Path;

use crate::edit::StageEdit;
use crate::path::PrimPath;
use crate::prim::{AttributeInfo, PrimMetadata, KIND_VALUES};
use crate::spec::PrimSpec;
use crate::value::Value;

/// Read access to a composed scene graph
///
/// Every call returns an owned snapshot that stays valid until the next
/// mutation of the stage. A path that does not exist yields `Ok(None)`;
/// `Err` is reserved for the stage itself failing.
pub trait SceneGraph {
    /// A stable identity for this stage (e.g. its root layer path)
    fn identifier(&self) -> &str;

    /// The path of the root prim
    fn root(&self) -> Result<PrimPath>;

    /// Child paths of a prim, in composition order
    fn children(&self, path: &PrimPath) -> Result<Option<Vec<PrimPath>>>;

    /// Attributes of a prim, in authored order
    fn attributes(&self, path: &PrimPath) -> Result<Option<Vec<AttributeInfo>>>;

    /// Prim-level metadata
    fn metadata(&self, path: &PrimPath) -> Result<Option<PrimMetadata>>;
}

/// Authoring access to a scene graph
///
/// Callers are expected to tell any tree model built over the stage about
/// each applied edit before serving the next read.
pub trait EditableSceneGraph: SceneGraph {
    fn apply(&mut self, edit: &StageEdit) -> Result<()>;
}

/// A composed stage held entirely in memory
#[derive(Debug, Clone)]
pub struct InMemoryStage {
    /// Identity reported to tree models
    identifier: String,
    /// The root prim and everything authored beneath it
    root: PrimSpec,
    /// Set once the stage has been closed
    closed: bool,
}

impl InMemoryStage {
    /// Create a stage from an authored root prim
    pub fn new(identifier: impl Into<String>, root: PrimSpec) -> Self {
        Self {
            identifier: identifier.into(),
            root,
            closed: false,
        }
    }

    /// Parse a stage from its JSON description
    pub fn from_json(identifier: impl Into<String>, json: &str) -> Result<Self> {
        let root: PrimSpec =
            serde_json::from_str(json).context("Failed to parse stage description")?;
        PrimPath::absolute_root()
            .child(&root.name)
            .context("Invalid root prim name")?;
        Ok(Self::new(identifier, root))
    }

    /// Open a stage description from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stage {}", path.display()))?;
        let stage = Self::from_json(path.display().to_string(), &json)?;
        info!("Opened stage {}", stage.identifier);
        Ok(stage)
    }

    /// Serialize the authored prims back to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.root).context("Failed to serialize stage")
    }

    /// Write the stage description to disk
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write stage {}", path.display()))
    }

    /// Close the stage; every later call fails
    pub fn close(&mut self) {
        info!("Closing stage {}", self.identifier);
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            bail!("Stage {} is closed", self.identifier);
        }
        Ok(())
    }

    fn find(&self, path: &PrimPath) -> Option<&PrimSpec> {
        let mut segments = path.segments();
        if segments.next()? != self.root.name {
            return None;
        }
        let mut current = &self.root;
        for segment in segments {
            current = current.composed_children().find(|c| c.name == segment)?;
        }
        Some(current)
    }

    fn find_mut(&mut self, path: &PrimPath) -> Option<&mut PrimSpec> {
        let mut segments = path.segments();
        if segments.next()? != self.root.name {
            return None;
        }
        let mut current = &mut self.root;
        for segment in segments {
            current = current.composed_child_mut(segment)?;
        }
        Some(current)
    }

    fn prim_mut(&mut self, path: &PrimPath) -> Result<&mut PrimSpec> {
        self.find_mut(path)
            .ok_or_else(|| anyhow!("No prim at {}", path))
    }
}

fn attribute_mut<'a>(prim: &'a mut PrimSpec, name: &str) -> Result<&'a mut AttributeInfo> {
    prim.attributes
        .iter_mut()
        .find(|a| a.name == name)
        .ok_or_else(|| anyhow!("No attribute named {}", name))
}

impl SceneGraph for InMemoryStage {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn root(&self) -> Result<PrimPath> {
        self.ensure_open()?;
        PrimPath::absolute_root().child(&self.root.name)
    }

    fn children(&self, path: &PrimPath) -> Result<Option<Vec<PrimPath>>> {
        self.ensure_open()?;
        let Some(prim) = self.find(path) else {
            return Ok(None);
        };
        let children = prim
            .composed_children()
            .map(|child| path.child(&child.name))
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(children))
    }

    fn attributes(&self, path: &PrimPath) -> Result<Option<Vec<AttributeInfo>>> {
        self.ensure_open()?;
        Ok(self.find(path).map(|prim| prim.attributes.clone()))
    }

    fn metadata(&self, path: &PrimPath) -> Result<Option<PrimMetadata>> {
        self.ensure_open()?;
        Ok(self.find(path).map(|prim| PrimMetadata {
            name: prim.name.clone(),
            type_name: prim.type_name.clone(),
            kind: prim.kind.clone(),
            purpose: prim.purpose,
            active: prim.active,
            has_payload: prim.payload.is_some(),
            payload_loaded: prim.payload.as_ref().map(|p| p.loaded).unwrap_or(false),
            variant_sets: prim.variant_sets.iter().map(|set| set.info()).collect(),
        }))
    }
}

impl EditableSceneGraph for InMemoryStage {
    fn apply(&mut self, edit: &StageEdit) -> Result<()> {
        self.ensure_open()?;
        debug!("Applying edit: {}", edit);
        let prim = self.prim_mut(edit.target())?;

        match edit {
            StageEdit::SetKind { kind, .. } => {
                if !KIND_VALUES.contains(&kind.as_str()) {
                    bail!("Unknown kind {:?}", kind);
                }
                prim.kind = kind.clone();
            }
            StageEdit::SetPurpose { purpose, .. } => {
                prim.purpose = Some(*purpose);
            }
            StageEdit::SetAttribute { name, value, .. } => {
                let attribute = attribute_mut(prim, name)?;
                let parsed = Value::parse(&attribute.type_name, value)
                    .with_context(|| format!("Failed to set {}", name))?;
                attribute.value = Some(parsed);
            }
            StageEdit::AddAttribute { name, value, .. } => {
                if prim.attributes.iter().any(|a| &a.name == name) {
                    bail!("Attribute {} already exists", name);
                }
                prim.attributes.push(
                    AttributeInfo::new(name.clone(), "string", Value::String(value.clone()))
                        .custom(),
                );
            }
            StageEdit::AddPrimvar { name, value, .. } => {
                let full_name = format!("primvars:{}", name);
                if prim.attributes.iter().any(|a| a.name == full_name) {
                    bail!("Primvar {} already exists", name);
                }
                prim.attributes.push(AttributeInfo::new(
                    full_name,
                    "string",
                    Value::String(value.clone()),
                ));
            }
            StageEdit::RemoveAttribute { name, .. } => {
                let before = prim.attributes.len();
                prim.attributes.retain(|a| &a.name != name);
                if prim.attributes.len() == before {
                    bail!("No attribute named {}", name);
                }
            }
            StageEdit::SetTimeSample {
                name, time, value, ..
            } => {
                let attribute = attribute_mut(prim, name)?;
                let parsed = Value::parse(&attribute.type_name, value)
                    .with_context(|| format!("Failed to set {} at time {}", name, time))?;
                attribute.set_sample(*time, parsed);
            }
            StageEdit::RemoveTimeSample { name, time, .. } => {
                let attribute = attribute_mut(prim, name)?;
                if !attribute.remove_sample(*time) {
                    bail!("{} has no sample at time {}", name, time);
                }
            }
            StageEdit::SelectVariant { set, variant, .. } => {
                let variant_set = prim
                    .variant_sets
                    .iter_mut()
                    .find(|s| &s.name == set)
                    .ok_or_else(|| anyhow!("No variant set named {}", set))?;
                if !variant_set.variants.iter().any(|v| &v.name == variant) {
                    bail!("Variant set {} has no variant {}", set, variant);
                }
                variant_set.selection = Some(variant.clone());
            }
            StageEdit::LoadPayload { path } | StageEdit::UnloadPayload { path } => {
                let payload = prim
                    .payload
                    .as_mut()
                    .ok_or_else(|| anyhow!("Prim {} has no payload", path))?;
                payload.loaded = matches!(edit, StageEdit::LoadPayload { .. });
            }
        }

        Ok(())
    }
}

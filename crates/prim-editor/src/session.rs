//! An editing session: one open stage, its tree model and the settings

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use prim_tree::{PropertyRow, SceneNodeAdapter, TimeSampleRow, TreeModel};
use stage::{EditableSceneGraph, InMemoryStage, PrimPath, StageEdit};
use std::collections::VecDeque;
use std::path::Path;

use crate::config::EditorConfig;
use crate::render;

/// Owns the stage for as long as it is open
///
/// All reads and edits go through the session, so an edit and the model
/// invalidation it implies happen within one call.
pub struct Session {
    config: EditorConfig,
    stage: Option<InMemoryStage>,
    model: TreeModel,
}

impl Session {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            stage: None,
            model: TreeModel::new(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn model(&self) -> &TreeModel {
        &self.model
    }

    /// The open stage
    pub fn stage(&self) -> Result<&InMemoryStage> {
        self.stage.as_ref().ok_or_else(|| anyhow!("No stage open"))
    }

    /// Open a stage, replacing the current one
    pub fn bind(&mut self, stage: InMemoryStage) -> Result<()> {
        self.close();
        self.model.bind_stage(&stage)?;
        self.stage = Some(stage);

        if !self.config.lazy_loading {
            self.load_all()?;
        }
        if self.config.auto_expand_tree {
            self.expand_to_depth(self.config.max_expanded_depth)?;
        }
        Ok(())
    }

    /// Close the stage; the model goes back to empty
    pub fn close(&mut self) {
        if let Some(mut stage) = self.stage.take() {
            self.model.unbind();
            stage.close();
        }
    }

    /// Apply an edit and bring the model up to date with it
    pub fn edit(&mut self, edit: StageEdit) -> Result<()> {
        let stage = self.stage.as_mut().ok_or_else(|| anyhow!("No stage open"))?;
        stage
            .apply(&edit)
            .with_context(|| format!("Failed to {}", edit))?;
        self.model.notify_edit(&*stage, &edit)?;
        info!("Applied: {}", edit);

        if self.config.auto_expand_tree {
            self.expand_to_depth(self.config.max_expanded_depth)?;
        }
        Ok(())
    }

    /// Write the stage back to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        self.stage()?.save(path)
    }

    /// Expand every row down to `depth` (the root is at depth 0)
    pub fn expand_to_depth(&mut self, depth: usize) -> Result<()> {
        let stage = self.stage.as_ref().ok_or_else(|| anyhow!("No stage open"))?;
        let mut pending = VecDeque::from([(self.model.root()?, 0)]);

        while let Some((index, level)) = pending.pop_front() {
            if level > depth {
                continue;
            }
            let children = self.model.expand(stage, index)?;
            if children.is_empty() {
                continue;
            }
            self.model.set_expanded(index, true)?;
            pending.extend(children.into_iter().map(|child| (child, level + 1)));
        }

        debug!("Expanded to depth {}", depth);
        Ok(())
    }

    /// Materialise the whole tree, reporting progress per batch
    fn load_all(&mut self) -> Result<()> {
        let stage = self.stage.as_ref().ok_or_else(|| anyhow!("No stage open"))?;
        let batch = self.config.max_items_per_batch.max(1);
        let mut pending = vec![self.model.root()?];
        let mut next_report = batch;

        while let Some(index) = pending.pop() {
            let children = self.model.expand(stage, index)?;
            if !children.is_empty() {
                self.model.set_expanded(index, true)?;
            }
            pending.extend(children);

            if self.model.node_count() >= next_report {
                debug!("Loaded {} prims", self.model.node_count());
                next_report += batch;
            }
        }

        info!("Loaded {} prims", self.model.node_count());
        Ok(())
    }

    /// The visible part of the tree as text
    pub fn outline(&self) -> String {
        render::outline(&self.model)
    }

    /// Property rows of a prim
    pub fn attributes(&self, path: &PrimPath) -> Result<Vec<PropertyRow>> {
        Ok(SceneNodeAdapter::new(self.stage()?).properties(path)?)
    }

    /// Time samples of a prim's animated attributes
    pub fn time_samples(&self, path: &PrimPath) -> Result<Vec<TimeSampleRow>> {
        Ok(SceneNodeAdapter::new(self.stage()?).time_samples(path)?)
    }
}

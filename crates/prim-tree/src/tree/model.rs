//! Lazy tree model over a bound stage

use log::{debug, info, trace};
use smallvec::SmallVec;
use stage::{PrimPath, SceneGraph, StageEdit};
use std::collections::{HashMap, HashSet};

use crate::adapter::SceneNodeAdapter;
use crate::columns::{self, CellValue, Column, Role};
use crate::error::{TreeError, TreeResult};
use crate::events::{ModelEvent, ModelObserver};
use crate::tree::{SceneNode, TraversalOrder, Tree, TreeIndex, TreeTraversal};

type ChildList = SmallVec<[TreeIndex; 8]>;

/// Whether a node's children have been fetched
#[derive(Debug, Clone)]
enum ChildrenState {
    /// Not fetched yet, or dropped by an invalidation
    NotLoaded,
    /// Fetched and cached, in traversal order
    Loaded(ChildList),
}

/// A materialised row
#[derive(Debug, Clone)]
struct Entry {
    node: SceneNode,
    parent: Option<TreeIndex>,
    row: usize,
    children: ChildrenState,
}

/// Arena slot; the generation is bumped every time the slot is freed
#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

#[derive(Debug, Clone)]
enum ModelState {
    /// No stage bound
    Empty,
    /// Root resolved; children materialise on demand
    Loaded { identifier: String, root: TreeIndex },
}

/// Index-addressable, lazily materialised tree of prims
///
/// The model never owns the stage. Every call that needs to read the scene
/// graph takes it as an argument, and the model checks that it is the stage
/// it was bound to.
///
/// # Example
///
/// ```ignore
/// let mut model = TreeModel::new();
/// let root = model.bind_stage(&stage)?;
///
/// for child in model.expand(&stage, root)? {
///     println!("{}", model.node(child)?.name);
/// }
/// ```
pub struct TreeModel {
    state: ModelState,
    /// Arena storage for rows
    slots: Vec<Slot>,
    /// Freed slots available for reuse
    free: Vec<u32>,
    /// Path -> index for every live row
    by_path: HashMap<PrimPath, TreeIndex>,
    /// Rows the view shows expanded
    expanded: HashSet<PrimPath>,
    /// Selected rows, in selection order
    selection: Vec<PrimPath>,
    observers: Vec<Box<dyn ModelObserver>>,
}

impl Default for TreeModel {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeModel {
    /// Create an empty model with no stage bound
    pub fn new() -> Self {
        Self {
            state: ModelState::Empty,
            slots: Vec::new(),
            free: Vec::new(),
            by_path: HashMap::new(),
            expanded: HashSet::new(),
            selection: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// Register an observer for change notifications
    pub fn subscribe(&mut self, observer: impl ModelObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn emit(&mut self, event: ModelEvent) {
        trace!("Model event: {:?}", event);
        for observer in self.observers.iter_mut() {
            observer.on_event(&event);
        }
    }

    /// Read-only traversal over the materialised rows
    pub fn cached(&self) -> CachedTree<'_> {
        CachedTree { model: self }
    }

    // ----- stage binding -----

    /// Bind a stage and resolve its root
    ///
    /// Any previous binding is dropped and all of its indices become stale.
    /// On failure the model keeps its previous state.
    pub fn bind_stage<S: SceneGraph + ?Sized>(&mut self, stage: &S) -> TreeResult<TreeIndex> {
        let adapter = SceneNodeAdapter::new(stage);
        let root_path = adapter.root()?;
        let node = adapter.resolve(&root_path).map_err(|err| match err {
            TreeError::NotFound(path) => TreeError::StageUnavailable(format!(
                "Stage {} has no root prim at {}",
                stage.identifier(),
                path
            )),
            other => other,
        })?;

        self.clear();
        let root = self.alloc(node, None, 0);
        self.state = ModelState::Loaded {
            identifier: stage.identifier().to_string(),
            root,
        };
        info!("Bound stage {} (root {})", stage.identifier(), root_path);
        self.emit(ModelEvent::Reset);
        Ok(root)
    }

    /// Drop the bound stage and every cached row
    pub fn unbind(&mut self) {
        if let ModelState::Loaded { identifier, .. } = &self.state {
            info!("Unbinding stage {}", identifier);
        }
        self.clear();
        self.state = ModelState::Empty;
        self.emit(ModelEvent::Reset);
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.state, ModelState::Loaded { .. })
    }

    /// Identifier of the bound stage
    pub fn bound_identifier(&self) -> Option<&str> {
        match &self.state {
            ModelState::Loaded { identifier, .. } => Some(identifier),
            ModelState::Empty => None,
        }
    }

    /// The root row
    pub fn root(&self) -> TreeResult<TreeIndex> {
        match &self.state {
            ModelState::Loaded { root, .. } => Ok(*root),
            ModelState::Empty => Err(TreeError::StageUnavailable("No stage bound".into())),
        }
    }

    fn ensure_bound<S: SceneGraph + ?Sized>(&self, stage: &S) -> TreeResult<TreeIndex> {
        match &self.state {
            ModelState::Empty => Err(TreeError::StageUnavailable("No stage bound".into())),
            ModelState::Loaded { identifier, .. } if identifier != stage.identifier() => {
                Err(TreeError::StageUnavailable(format!(
                    "Stage {} is not the bound stage {}",
                    stage.identifier(),
                    identifier
                )))
            }
            ModelState::Loaded { root, .. } => Ok(*root),
        }
    }

    // ----- arena -----

    fn clear(&mut self) {
        for (position, slot) in self.slots.iter_mut().enumerate() {
            if slot.entry.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(position as u32);
            }
        }
        self.by_path.clear();
        self.expanded.clear();
        self.selection.clear();
    }

    fn alloc(&mut self, node: SceneNode, parent: Option<TreeIndex>, row: usize) -> TreeIndex {
        let path = node.path.clone();
        let entry = Entry {
            node,
            parent,
            row,
            children: ChildrenState::NotLoaded,
        };

        let index = match self.free.pop() {
            Some(slot) => {
                let target = &mut self.slots[slot as usize];
                target.entry = Some(entry);
                TreeIndex::new(slot, target.generation)
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some(entry),
                });
                TreeIndex::new(self.slots.len() as u32 - 1, 0)
            }
        };

        self.by_path.insert(path, index);
        index
    }

    fn release(&mut self, index: TreeIndex) {
        let Some(slot) = self.slots.get_mut(index.slot() as usize) else {
            return;
        };
        if slot.generation != index.generation() {
            return;
        }
        if let Some(entry) = slot.entry.take() {
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(index.slot());
            if self.by_path.get(&entry.node.path) == Some(&index) {
                self.by_path.remove(&entry.node.path);
            }
        }
    }

    fn entry(&self, index: TreeIndex) -> TreeResult<&Entry> {
        self.slots
            .get(index.slot() as usize)
            .filter(|slot| slot.generation == index.generation())
            .and_then(|slot| slot.entry.as_ref())
            .ok_or(TreeError::StaleIndex(index))
    }

    fn entry_mut(&mut self, index: TreeIndex) -> TreeResult<&mut Entry> {
        self.slots
            .get_mut(index.slot() as usize)
            .filter(|slot| slot.generation == index.generation())
            .and_then(|slot| slot.entry.as_mut())
            .ok_or(TreeError::StaleIndex(index))
    }

    // ----- queries -----

    /// Whether the index still refers to a live row
    pub fn is_valid(&self, index: TreeIndex) -> bool {
        self.entry(index).is_ok()
    }

    /// Whether the row's children are cached
    pub fn is_loaded(&self, index: TreeIndex) -> bool {
        matches!(
            self.entry(index).map(|e| &e.children),
            Ok(ChildrenState::Loaded(_))
        )
    }

    /// The row's prim snapshot
    pub fn node(&self, index: TreeIndex) -> TreeResult<&SceneNode> {
        Ok(&self.entry(index)?.node)
    }

    /// The row's prim path
    pub fn path(&self, index: TreeIndex) -> TreeResult<&PrimPath> {
        Ok(&self.entry(index)?.node.path)
    }

    /// The parent row, `None` for the root
    pub fn parent(&self, index: TreeIndex) -> TreeResult<Option<TreeIndex>> {
        Ok(self.entry(index)?.parent)
    }

    /// Position of the row under its parent
    pub fn row(&self, index: TreeIndex) -> TreeResult<usize> {
        Ok(self.entry(index)?.row)
    }

    /// Number of live rows
    pub fn node_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.entry.is_some()).count()
    }

    /// Fetch and cache the children of a row
    ///
    /// Idempotent: once cached, the same indices are returned without
    /// touching the stage until the row is invalidated.
    pub fn expand<S: SceneGraph + ?Sized>(
        &mut self,
        stage: &S,
        index: TreeIndex,
    ) -> TreeResult<Vec<TreeIndex>> {
        self.ensure_bound(stage)?;
        if let ChildrenState::Loaded(children) = &self.entry(index)?.children {
            return Ok(children.to_vec());
        }
        self.fetch_children(stage, index, false)
    }

    /// Number of children; materialises them on first call
    pub fn row_count<S: SceneGraph + ?Sized>(
        &mut self,
        stage: &S,
        index: TreeIndex,
    ) -> TreeResult<usize> {
        self.expand(stage, index).map(|children| children.len())
    }

    /// Whether the row has children, without materialising them
    pub fn has_children<S: SceneGraph + ?Sized>(
        &self,
        stage: &S,
        index: TreeIndex,
    ) -> TreeResult<bool> {
        self.ensure_bound(stage)?;
        let entry = self.entry(index)?;
        match &entry.children {
            ChildrenState::Loaded(children) => Ok(!children.is_empty()),
            ChildrenState::NotLoaded => SceneNodeAdapter::new(stage).has_children(&entry.node.path),
        }
    }

    /// The child at `row` under `parent`, `None` when out of range
    pub fn index<S: SceneGraph + ?Sized>(
        &mut self,
        stage: &S,
        parent: TreeIndex,
        row: usize,
    ) -> TreeResult<Option<TreeIndex>> {
        Ok(self.expand(stage, parent)?.get(row).copied())
    }

    /// Re-resolve a row from its stable path, materialising ancestors as needed
    pub fn index_for_path<S: SceneGraph + ?Sized>(
        &mut self,
        stage: &S,
        path: &PrimPath,
    ) -> TreeResult<TreeIndex> {
        let root = self.ensure_bound(stage)?;
        if let Some(&index) = self.by_path.get(path) {
            return Ok(index);
        }
        if !path.has_prefix(self.path(root)?) {
            return Err(TreeError::NotFound(path.clone()));
        }

        let mut current = root;
        while self.path(current)? != path {
            let children = self.expand(stage, current)?;
            current = children
                .into_iter()
                .find(|&child| {
                    self.path(child)
                        .map(|p| path.has_prefix(p))
                        .unwrap_or(false)
                })
                .ok_or_else(|| TreeError::NotFound(path.clone()))?;
        }
        Ok(current)
    }

    fn fetch_children<S: SceneGraph + ?Sized>(
        &mut self,
        stage: &S,
        index: TreeIndex,
        announce: bool,
    ) -> TreeResult<Vec<TreeIndex>> {
        let path = self.entry(index)?.node.path.clone();
        let nodes = SceneNodeAdapter::new(stage).children(&path)?;
        debug!("Fetched {} children of {}", nodes.len(), path);
        self.install_children(index, nodes, announce)
    }

    fn install_children(
        &mut self,
        index: TreeIndex,
        nodes: Vec<SceneNode>,
        announce: bool,
    ) -> TreeResult<Vec<TreeIndex>> {
        let count = nodes.len();
        if announce && count > 0 {
            self.emit(ModelEvent::RowsAboutToBeInserted {
                parent: index,
                first: 0,
                last: count - 1,
            });
        }

        let child_paths: Vec<PrimPath> = nodes.iter().map(|n| n.path.clone()).collect();
        let children: ChildList = nodes
            .into_iter()
            .enumerate()
            .map(|(row, node)| self.alloc(node, Some(index), row))
            .collect();

        let entry = self.entry_mut(index)?;
        entry.node.children = child_paths;
        entry.children = ChildrenState::Loaded(children.clone());

        if announce && count > 0 {
            self.emit(ModelEvent::RowsInserted {
                parent: index,
                first: 0,
                last: count - 1,
            });
        }
        Ok(children.to_vec())
    }

    // ----- invalidation -----

    /// Drop the cached children of a row
    ///
    /// Every descendant index becomes stale; the row itself, its siblings and
    /// its ancestors are untouched.
    pub fn invalidate(&mut self, index: TreeIndex) -> TreeResult<()> {
        let count = match &self.entry(index)?.children {
            ChildrenState::Loaded(children) => children.len(),
            ChildrenState::NotLoaded => return Ok(()),
        };
        let descendants: Vec<TreeIndex> = self
            .cached()
            .walk_from(index, TraversalOrder::PostOrder)
            .filter(|&i| i != index)
            .collect();

        if count > 0 {
            self.emit(ModelEvent::RowsAboutToBeRemoved {
                parent: index,
                first: 0,
                last: count - 1,
            });
        }
        for descendant in &descendants {
            self.release(*descendant);
        }
        self.entry_mut(index)?.children = ChildrenState::NotLoaded;
        if count > 0 {
            self.emit(ModelEvent::RowsRemoved {
                parent: index,
                first: 0,
                last: count - 1,
            });
        }

        debug!(
            "Invalidated {} ({} cached rows dropped)",
            self.path(index)?,
            descendants.len()
        );
        Ok(())
    }

    /// Drop everything cached below the root
    pub fn invalidate_root(&mut self) -> TreeResult<()> {
        let root = self.root()?;
        self.invalidate(root)
    }

    /// Re-fetch a row and its children from the stage
    ///
    /// Previously materialised or expanded descendants that still exist are
    /// fetched again, so the view keeps its expansion state and selection.
    pub fn refresh<S: SceneGraph + ?Sized>(
        &mut self,
        stage: &S,
        index: TreeIndex,
    ) -> TreeResult<()> {
        self.ensure_bound(stage)?;
        let path = self.path(index)?.clone();

        let mut restore: Vec<PrimPath> = self
            .cached()
            .walk_from(index, TraversalOrder::PreOrder)
            .filter(|&i| i != index && self.is_loaded(i))
            .filter_map(|i| self.path(i).ok().cloned())
            .chain(
                self.expanded
                    .iter()
                    .filter(|p| p.has_prefix(&path) && **p != path)
                    .cloned(),
            )
            .collect();
        restore.sort_by(|a, b| a.depth().cmp(&b.depth()).then_with(|| a.cmp(b)));
        restore.dedup();

        // A failed read leaves the cache untouched
        let adapter = SceneNodeAdapter::new(stage);
        let node = adapter.resolve(&path)?;
        let children = adapter.children(&path)?;

        self.invalidate(index)?;
        self.replace_node(index, node)?;
        self.install_children(index, children, true)?;

        for descendant in restore {
            let Some(&child) = self.by_path.get(&descendant) else {
                trace!("{} did not survive the refresh", descendant);
                continue;
            };
            if !self.is_loaded(child) {
                self.fetch_children(stage, child, true)?;
            }
        }

        debug!("Refreshed {}", path);
        Ok(())
    }

    fn update_node<S: SceneGraph + ?Sized>(
        &mut self,
        stage: &S,
        index: TreeIndex,
    ) -> TreeResult<()> {
        let path = self.path(index)?.clone();
        let node = SceneNodeAdapter::new(stage).resolve(&path)?;
        self.replace_node(index, node)
    }

    fn replace_node(&mut self, index: TreeIndex, node: SceneNode) -> TreeResult<()> {
        let entry = self.entry_mut(index)?;
        if let ChildrenState::Loaded(_) = entry.children {
            // Keep the cached child list authoritative until invalidated
            let children = std::mem::take(&mut entry.node.children);
            entry.node = SceneNode { children, ..node };
        } else {
            entry.node = node;
        }
        self.emit(ModelEvent::DataChanged { index });
        Ok(())
    }

    /// Apply the invalidation implied by an edit already made to the stage
    ///
    /// Structural edits refresh the parent of the edited prim; property edits
    /// update the edited row in place. Rows that were never materialised need
    /// no work.
    pub fn notify_edit<S: SceneGraph + ?Sized>(
        &mut self,
        stage: &S,
        edit: &StageEdit,
    ) -> TreeResult<()> {
        let root = self.ensure_bound(stage)?;
        let target = edit.target();

        if edit.is_structural() {
            let targets_root = self.path(root)? == target;
            let scope = match target
                .parent()
                .and_then(|parent| self.by_path.get(&parent).copied())
            {
                Some(parent) => parent,
                None if targets_root => root,
                None => {
                    trace!("Structural edit below unmaterialised rows ({})", edit);
                    return Ok(());
                }
            };
            debug!("Structural edit ({}), refreshing {}", edit, self.path(scope)?);
            if self.is_loaded(scope) {
                self.refresh(stage, scope)
            } else {
                self.update_node(stage, scope)
            }
        } else if let Some(&index) = self.by_path.get(target) {
            debug!("Property edit ({}), updating {}", edit, target);
            self.update_node(stage, index)
        } else {
            trace!("Edit on unmaterialised prim {}", target);
            Ok(())
        }
    }

    // ----- view contract -----

    /// Number of columns
    pub fn column_count(&self) -> usize {
        Column::ALL.len()
    }

    /// Header text of a column
    pub fn header(&self, column: Column) -> String {
        column.to_string()
    }

    /// Cell data for a row
    pub fn data(
        &self,
        index: TreeIndex,
        column: Column,
        role: Role,
    ) -> TreeResult<Option<CellValue>> {
        Ok(columns::cell(&self.entry(index)?.node, column, role))
    }

    // ----- view state -----

    /// Record whether the view shows a row expanded
    pub fn set_expanded(&mut self, index: TreeIndex, expanded: bool) -> TreeResult<()> {
        let path = self.path(index)?.clone();
        if expanded {
            self.expanded.insert(path);
        } else {
            self.expanded.remove(&path);
        }
        Ok(())
    }

    pub fn is_expanded(&self, index: TreeIndex) -> TreeResult<bool> {
        Ok(self.expanded.contains(self.path(index)?))
    }

    /// Add a row to the selection
    pub fn select(&mut self, index: TreeIndex) -> TreeResult<()> {
        let path = self.path(index)?.clone();
        if !self.selection.contains(&path) {
            self.selection.push(path);
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Current indices of the selected rows that are materialised
    pub fn selection(&self) -> Vec<TreeIndex> {
        self.selection
            .iter()
            .filter_map(|path| self.by_path.get(path).copied())
            .collect()
    }

    /// Selected prim paths, in selection order
    pub fn selected_paths(&self) -> &[PrimPath] {
        &self.selection
    }
}

/// [`Tree`] view over the rows a [`TreeModel`] has materialised
#[derive(Clone, Copy)]
pub struct CachedTree<'a> {
    model: &'a TreeModel,
}

impl<'a> Tree for CachedTree<'a> {
    fn root(&self) -> Option<TreeIndex> {
        self.model.root().ok()
    }

    fn get(&self, id: TreeIndex) -> Option<&SceneNode> {
        self.model.node(id).ok()
    }

    fn parent(&self, id: TreeIndex) -> Option<TreeIndex> {
        self.model.parent(id).ok().flatten()
    }

    fn children(&self, id: TreeIndex) -> Box<dyn Iterator<Item = TreeIndex> + '_> {
        match self.model.entry(id).map(|e| &e.children) {
            Ok(ChildrenState::Loaded(children)) => Box::new(children.iter().copied()),
            _ => Box::new(std::iter::empty()),
        }
    }

    fn node_count(&self) -> usize {
        self.model.node_count()
    }
}

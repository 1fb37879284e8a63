//! In-memory block index keyed by `(root_id, id)`.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::block::Block;

/// Blocks of every open document, grouped by root id.
#[derive(Debug, Clone, Default)]
pub struct BlockIndex {
    roots: HashMap<String, HashMap<String, Block>>,
    breadcrumbs: String,
}

impl BlockIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a block under a root.
    pub fn insert(&mut self, root_id: &str, block: Block) {
        self.roots
            .entry(root_id.to_string())
            .or_default()
            .insert(block.id.clone(), block);
    }

    /// Insert every block of a loaded tree.
    pub fn insert_all(&mut self, root_id: &str, blocks: impl IntoIterator<Item = Block>) {
        for block in blocks {
            self.insert(root_id, block);
        }
    }

    /// Remove a block and drop its id from its parent's child list.
    pub fn remove(&mut self, root_id: &str, id: &str) -> Option<Block> {
        let blocks = self.roots.get_mut(root_id)?;
        let removed = blocks.remove(id)?;
        if let Some(parent) = blocks.get_mut(&removed.parent_id) {
            parent.children_ids.retain(|child| child != id);
        }
        Some(removed)
    }

    pub fn get_leaf(&self, root_id: &str, id: &str) -> Option<&Block> {
        self.roots.get(root_id)?.get(id)
    }

    pub fn get_leaf_mut(&mut self, root_id: &str, id: &str) -> Option<&mut Block> {
        self.roots.get_mut(root_id)?.get_mut(id)
    }

    /// Child ids of a block, empty when the block is unknown.
    pub fn get_children_ids(&self, root_id: &str, id: &str) -> &[String] {
        self.get_leaf(root_id, id)
            .map(|block| block.children_ids.as_slice())
            .unwrap_or_default()
    }

    /// Children of a block in order, skipping ids that are not indexed.
    pub fn get_children<F>(&self, root_id: &str, id: &str, filter: F) -> Vec<&Block>
    where
        F: Fn(&Block) -> bool,
    {
        self.get_children_ids(root_id, id)
            .iter()
            .filter_map(|child| self.get_leaf(root_id, child))
            .filter(|&block| filter(block))
            .collect()
    }

    /// Subscription id for a keyed view inside a root.
    pub fn sub_id(root_id: &str, key: &str) -> String {
        format!("{root_id}-{key}")
    }

    /// Merge a fields patch into a block. Returns false when the block is unknown.
    pub fn update_fields(&mut self, root_id: &str, id: &str, patch: &Map<String, Value>) -> bool {
        match self.get_leaf_mut(root_id, id) {
            Some(block) => {
                block.fields.merge(patch);
                true
            }
            None => false,
        }
    }

    pub fn breadcrumbs(&self) -> &str {
        &self.breadcrumbs
    }

    pub fn breadcrumbs_set(&mut self, id: &str) {
        self.breadcrumbs = id.to_string();
    }

    /// Forget every block of one root.
    pub fn blocks_clear(&mut self, root_id: &str) {
        self.roots.remove(root_id);
    }

    /// Forget every block of every root.
    pub fn blocks_clear_all(&mut self) {
        debug!(roots = self.roots.len(), "clearing block index");
        self.roots.clear();
    }

    pub fn len(&self, root_id: &str) -> usize {
        self.roots.get(root_id).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.roots.values().all(HashMap::is_empty)
    }
}

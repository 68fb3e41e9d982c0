//! Depth-aware queries over a validated dimension
//!
//! All queries are read-only and return items in the dimension's stored order.
//! Unknown ids and empty depth buckets yield empty results, never errors.

use tracing::instrument;

use crate::domain::dimension::Dimension;
use crate::domain::entities::{join_path, Item};

impl Dimension {
    /// Items with `depth == depth`.
    #[instrument(level = "trace", skip(self))]
    pub fn items_at_depth(&self, depth: usize) -> Vec<&Item> {
        self.positions_at_depth(depth)
            .iter()
            .map(|&pos| self.item_at(pos))
            .collect()
    }

    /// Items with `depth <= max_depth`.
    #[instrument(level = "trace", skip(self))]
    pub fn items_up_to_depth(&self, max_depth: usize) -> Vec<&Item> {
        self.items().iter().filter(|i| i.depth <= max_depth).collect()
    }

    /// Items with `depth >= min_depth`.
    #[instrument(level = "trace", skip(self))]
    pub fn items_from_depth(&self, min_depth: usize) -> Vec<&Item> {
        self.items().iter().filter(|i| i.depth >= min_depth).collect()
    }

    /// Items at `depth` that are `parent_id` itself or lie below it.
    ///
    /// Empty when `parent_id` is unknown.
    #[instrument(level = "trace", skip(self))]
    pub fn children_at_depth(&self, parent_id: &str, depth: usize) -> Vec<&Item> {
        let Some(parent) = self.get(parent_id) else {
            return Vec::new();
        };
        if depth < parent.depth {
            return Vec::new();
        }
        if depth == parent.depth {
            return vec![parent];
        }
        self.descendant_positions(parent_id)
            .into_iter()
            .map(|pos| self.item_at(pos))
            .filter(|item| item.depth == depth)
            .collect()
    }

    /// Every item strictly below `parent_id`, any depth.
    #[instrument(level = "trace", skip(self))]
    pub fn all_descendants(&self, parent_id: &str) -> Vec<&Item> {
        self.descendant_positions(parent_id)
            .into_iter()
            .map(|pos| self.item_at(pos))
            .collect()
    }

    /// Ancestors of `item_id`, shallowest first, excluding the item itself.
    #[instrument(level = "trace", skip(self))]
    pub fn ancestors(&self, item_id: &str) -> Vec<&Item> {
        let Some(item) = self.get(item_id) else {
            return Vec::new();
        };
        (1..=item.depth)
            .filter_map(|len| self.get(&join_path(&item.path_components[..len])))
            .collect()
    }

    /// Project an item onto `target_depth`.
    ///
    /// Returns the item itself at its own depth, its descendants at a deeper
    /// target, and nothing when the target is shallower or the id unknown.
    #[instrument(level = "trace", skip(self))]
    pub fn expand_to_depth(&self, item_id: &str, target_depth: usize) -> Vec<&Item> {
        match self.get(item_id) {
            Some(item) if item.depth == target_depth => vec![item],
            Some(item) if item.depth < target_depth => {
                self.children_at_depth(item_id, target_depth)
            }
            _ => Vec::new(),
        }
    }

    /// Direct children through `children_ids`, in declared order.
    pub fn children(&self, item_id: &str) -> Vec<&Item> {
        self.get(item_id)
            .map(|item| {
                item.children_ids
                    .iter()
                    .filter_map(|id| self.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Items without children.
    pub fn leaves(&self) -> Vec<&Item> {
        self.items().iter().filter(|i| i.is_leaf()).collect()
    }
}

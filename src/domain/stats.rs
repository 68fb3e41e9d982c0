//! Dimension statistics: item counts per depth, leaves and fan-out.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::dimension::Dimension;
use crate::domain::entities::DimensionType;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionStats {
    pub dimension: DimensionType,
    pub total_items: usize,
    pub items_by_depth: BTreeMap<usize, usize>,
    /// Items without children
    pub leaf_nodes: usize,
    pub max_children: usize,
    /// Mean child count over items that have children, 0 when none do
    pub average_children_per_parent: f64,
    pub declared_max_depth: usize,
    pub observed_max_depth: usize,
}

impl DimensionStats {
    pub fn compute(dim: &Dimension) -> Self {
        let mut items_by_depth = BTreeMap::new();
        let mut leaf_nodes = 0;
        let mut max_children = 0;
        let mut parents = 0usize;
        let mut total_children = 0usize;

        for item in dim.items() {
            *items_by_depth.entry(item.depth).or_insert(0) += 1;
            let n = item.children_ids.len();
            if n == 0 {
                leaf_nodes += 1;
            } else {
                parents += 1;
                total_children += n;
            }
            max_children = max_children.max(n);
        }

        let average_children_per_parent = if parents == 0 {
            0.0
        } else {
            total_children as f64 / parents as f64
        };

        Self {
            dimension: dim.dimension_type(),
            total_items: dim.len(),
            items_by_depth,
            leaf_nodes,
            max_children,
            average_children_per_parent,
            declared_max_depth: dim.hierarchy().max_depth,
            observed_max_depth: dim.observed_max_depth(),
        }
    }

    pub fn count_at_depth(&self, depth: usize) -> usize {
        self.items_by_depth.get(&depth).copied().unwrap_or(0)
    }
}

//! Multi-dimension combinator: Cartesian products of depth-selected items.

use std::collections::{BTreeMap, HashSet};

use itertools::Itertools;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, instrument};

use crate::domain::dimension::Dimension;
use crate::domain::entities::{DimensionType, Item};
use crate::domain::error::{DomainError, DomainResult};

/// Selection rule for one dimension.
#[derive(Debug, Clone)]
pub struct SelectionSpec<'a> {
    pub dimension: &'a Dimension,
    /// Target depth; `None` means the dimension's declared `max_depth`
    pub depth: Option<usize>,
    /// Restrict to `parent_id` and its descendants
    pub parent_id: Option<String>,
    /// Keep only these ids; empty means no filter
    pub filter_ids: Vec<String>,
}

impl<'a> SelectionSpec<'a> {
    pub fn new(dimension: &'a Dimension) -> Self {
        Self {
            dimension,
            depth: None,
            parent_id: None,
            filter_ids: Vec::new(),
        }
    }

    pub fn at_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn under(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn only<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn target_depth(&self) -> usize {
        self.depth.unwrap_or(self.dimension.hierarchy().max_depth)
    }

    /// Items this spec selects, in stored order.
    pub fn resolve(&self) -> DomainResult<Vec<&'a Item>> {
        let dim = self.dimension;
        let depth = self.target_depth();

        if !self.filter_ids.is_empty() && !self.filter_ids.iter().any(|id| dim.contains(id)) {
            return Err(DomainError::schema(
                dim.dimension_type().as_str(),
                format!("filter ids {:?} are all outside the dimension", self.filter_ids),
            ));
        }

        let items = match &self.parent_id {
            Some(parent) => dim.children_at_depth(parent, depth),
            None => dim.items_at_depth(depth),
        };

        if self.filter_ids.is_empty() {
            return Ok(items);
        }
        let keep: HashSet<&str> = self.filter_ids.iter().map(String::as_str).collect();
        let filtered = items
            .into_iter()
            .filter(|item| keep.contains(item.id.as_str()))
            .collect();
        Ok(filtered)
    }
}

/// One tuple of the product: one selected item per spec, in spec order.
#[derive(Debug, Clone, PartialEq)]
pub struct Combination<'a> {
    entries: Vec<(DimensionType, &'a Item)>,
}

impl<'a> Combination<'a> {
    pub fn get(&self, dimension: DimensionType) -> Option<&'a Item> {
        self.entries
            .iter()
            .find(|(tag, _)| *tag == dimension)
            .map(|(_, item)| *item)
    }

    pub fn entries(&self) -> &[(DimensionType, &'a Item)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_map(&self) -> BTreeMap<DimensionType, &'a Item> {
        self.entries.iter().copied().collect()
    }

    /// Item ids in spec order.
    pub fn ids(&self) -> Vec<&'a str> {
        self.entries.iter().map(|(_, item)| item.id.as_str()).collect()
    }
}

impl Serialize for Combination<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (tag, item) in &self.entries {
            map.serialize_entry(tag, item)?;
        }
        map.end()
    }
}

/// Resolved selections over N dimensions, ready to enumerate.
///
/// Construction resolves every spec once; enumeration is lazy, with the last
/// spec varying fastest.
#[derive(Debug)]
pub struct Combinator<'a> {
    tags: Vec<DimensionType>,
    selections: Vec<Vec<&'a Item>>,
}

impl<'a> Combinator<'a> {
    /// Resolve specs; the same dimension tag may appear only once.
    #[instrument(level = "debug", skip(specs), fields(specs = specs.len()))]
    pub fn new(specs: &[SelectionSpec<'a>]) -> DomainResult<Self> {
        let mut seen = HashSet::new();
        let mut tags = Vec::with_capacity(specs.len());
        let mut selections = Vec::with_capacity(specs.len());

        for spec in specs {
            let tag = spec.dimension.dimension_type();
            if !seen.insert(tag) {
                return Err(DomainError::AmbiguousDimension(tag));
            }
            let items = spec.resolve()?;
            debug!("{}: {} items at depth {}", tag, items.len(), spec.target_depth());
            tags.push(tag);
            selections.push(items);
        }

        Ok(Self { tags, selections })
    }

    pub fn tags(&self) -> &[DimensionType] {
        &self.tags
    }

    /// Selected item count per spec.
    pub fn counts(&self) -> Vec<usize> {
        self.selections.iter().map(Vec::len).collect()
    }

    pub fn selection(&self, index: usize) -> Option<&[&'a Item]> {
        self.selections.get(index).map(Vec::as_slice)
    }

    /// Size of the product; `None` if it overflows `usize`.
    pub fn len(&self) -> Option<usize> {
        if self.selections.is_empty() {
            return Some(0);
        }
        self.selections
            .iter()
            .try_fold(1usize, |acc, items| acc.checked_mul(items.len()))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Lazily enumerate the product in lexicographic spec order.
    pub fn iter(&self) -> impl Iterator<Item = Combination<'a>> + '_ {
        let tags = &self.tags;
        let product = if self.selections.is_empty() {
            None
        } else {
            Some(
                self.selections
                    .iter()
                    .map(|items| items.iter().copied())
                    .multi_cartesian_product(),
            )
        };
        product.into_iter().flatten().map(move |items| Combination {
            entries: tags.iter().copied().zip(items).collect(),
        })
    }
}

/// Product of dimensions at fixed depths, no parent scope or filters.
pub fn multiply_at_depth<'a>(
    pairs: &[(&'a Dimension, usize)],
) -> DomainResult<Vec<Combination<'a>>> {
    let specs: Vec<SelectionSpec<'a>> = pairs
        .iter()
        .map(|&(dim, depth)| SelectionSpec::new(dim).at_depth(depth))
        .collect();
    let combinator = Combinator::new(&specs)?;
    let combinations = combinator.iter().collect();
    Ok(combinations)
}

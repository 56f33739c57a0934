//! The R-tree: insertion, leaf selection, split propagation and pruned descent.

use super::node::{Entry, Node, NodeArena, NodeId, NodeKind};
use super::rect::Rect;
use super::split::{ChildRef, split_items};
use crate::config::IndexConfig;
use crate::error::{NearJobsError, Result};
use crate::query::QueryExecutor;
use nearjobs_types::{GeoPoint, Job};
use std::cmp::Ordering;

/// Shape counters of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct TreeStats {
    /// Depth of the leaf level; a tree whose root is a leaf has height 0.
    pub height: usize,
    pub entry_count: usize,
    pub node_count: usize,
    pub leaf_count: usize,
}

/// An R-tree over padded job locations.
///
/// All leaves sit at depth [`RTree::height`]. Every non-root node holds between
/// `min_fanout` and `max_fanout` items and carries the tightest rectangle over
/// them.
#[derive(Debug)]
pub struct RTree {
    arena: NodeArena,
    root: NodeId,
    height: usize,
    entry_count: usize,
    config: IndexConfig,
}

/// The item that pushed a node past `max_fanout`.
enum Overflow {
    Entry(Entry),
    Child(NodeId),
}

impl RTree {
    /// Build a tree by inserting `jobs` one after another.
    ///
    /// Fails with [`NearJobsError::EmptyInput`] when `jobs` yields nothing.
    pub fn build<I>(jobs: I, config: IndexConfig) -> Result<Self>
    where
        I: IntoIterator<Item = Job>,
    {
        config.validate()?;

        let mut jobs = jobs.into_iter();
        let first = jobs.next().ok_or(NearJobsError::EmptyInput)?;

        let mut arena = NodeArena::new();
        let root = arena.alloc(Node::leaf(vec![Entry::new(first, config.pad_degrees)])?);
        let mut tree = Self {
            arena,
            root,
            height: 0,
            entry_count: 1,
            config,
        };

        for job in jobs {
            tree.insert(job)?;
        }

        log::debug!(
            "Built index with {} entries, height {}, {} nodes",
            tree.entry_count,
            tree.height,
            tree.arena.len()
        );
        Ok(tree)
    }

    /// Insert one job.
    pub fn insert(&mut self, job: Job) -> Result<()> {
        let entry = Entry::new(job, self.config.pad_degrees);
        let leaf = self.choose_leaf(entry.rect())?;

        if self.arena.get(leaf)?.can_accept_one_more(self.config.max_fanout) {
            self.arena.insert_entry(leaf, entry)?;
            self.propagate_expansion(leaf)?;
        } else {
            self.split_upwards(leaf, Overflow::Entry(entry))?;
        }

        self.entry_count += 1;
        Ok(())
    }

    /// Descend from the root to the leaf that should receive `rect`.
    ///
    /// At each internal node a child that already contains `rect` wins outright.
    /// Otherwise the child needing the least percentage expansion is taken, ties
    /// going to the smaller resulting area and then to the child with fewer items.
    fn choose_leaf(&self, rect: &Rect) -> Result<NodeId> {
        let mut current = self.root;
        loop {
            let node = self.arena.get(current)?;
            let NodeKind::Internal(children) = &node.kind else {
                return Ok(current);
            };
            if children.is_empty() {
                return Err(NearJobsError::InvariantViolation(format!(
                    "internal node {} has no children",
                    current.index()
                )));
            }

            let mut best: Option<(NodeId, f64, f64, usize)> = None;
            let mut containing = None;
            for &child_id in children {
                let child = self.arena.get(child_id)?;
                if child.rect.contains_without_expansion(rect) {
                    containing = Some(child_id);
                    break;
                }

                let expansion = child.rect.percent_expansion_needed(rect);
                let area = child.rect.expand_to_accommodate(rect).area();
                let len = child.len();
                let better = match best {
                    None => true,
                    Some((_, best_expansion, best_area, best_len)) => {
                        match expansion.partial_cmp(&best_expansion) {
                            Some(Ordering::Less) => true,
                            Some(Ordering::Greater) => false,
                            _ => match area.partial_cmp(&best_area) {
                                Some(Ordering::Less) => true,
                                Some(Ordering::Greater) => false,
                                _ => len < best_len,
                            },
                        }
                    }
                };
                if better {
                    best = Some((child_id, expansion, area, len));
                }
            }

            current = match (containing, best) {
                (Some(id), _) => id,
                (None, Some((id, ..))) => id,
                (None, None) => {
                    return Err(NearJobsError::InvariantViolation(format!(
                        "no child of node {} can take the entry",
                        current.index()
                    )));
                }
            };
        }
    }

    /// Grow every ancestor of `from` to cover its rectangle. Stops as soon as an
    /// ancestor already covers it.
    fn propagate_expansion(&mut self, from: NodeId) -> Result<()> {
        let mut current = from;
        loop {
            let (rect, parent) = {
                let node = self.arena.get(current)?;
                (node.rect, node.parent)
            };
            let Some(parent) = parent else {
                return Ok(());
            };

            let parent_node = self.arena.get_mut(parent)?;
            let expanded = parent_node.rect.expand_to_accommodate(&rect);
            if expanded == parent_node.rect {
                return Ok(());
            }
            parent_node.rect = expanded;
            current = parent;
        }
    }

    /// Split `node` with its overflowing item and walk upwards, replacing each
    /// split node by its two halves in the parent. Terminates when a parent
    /// absorbs both halves or when the root itself split and the tree grew.
    fn split_upwards(&mut self, node: NodeId, overflow: Overflow) -> Result<()> {
        let mut current = node;
        let mut overflow = overflow;
        loop {
            self.check_splittable(current, &overflow)?;
            let parent = self.arena.get(current)?.parent;
            if let Some(parent) = parent {
                self.arena.remove_child(parent, current)?;
            }

            let (first, second) = self.split_node(current, overflow)?;

            let Some(parent) = parent else {
                return self.grow(first, second);
            };

            self.arena.insert_child(parent, first)?;
            if self
                .arena
                .get(parent)?
                .can_accept_one_more(self.config.max_fanout)
            {
                self.arena.insert_child(parent, second)?;
                return self.propagate_expansion(parent);
            }

            current = parent;
            overflow = Overflow::Child(second);
        }
    }

    /// Fails without touching the tree when `id` plus `overflow` cannot be split
    /// into two legal halves.
    fn check_splittable(&self, id: NodeId, overflow: &Overflow) -> Result<()> {
        let node = self.arena.get(id)?;
        let kinds_match = matches!(
            (&node.kind, overflow),
            (NodeKind::Leaf(_), Overflow::Entry(_)) | (NodeKind::Internal(_), Overflow::Child(_))
        );
        if !kinds_match {
            return Err(NearJobsError::InvariantViolation(format!(
                "overflow item does not match the kind of node {}",
                id.index()
            )));
        }

        let items = node.len() + 1;
        let min_fanout = self.config.min_fanout;
        if min_fanout == 0 || items < 2 * min_fanout {
            return Err(NearJobsError::InvariantViolation(format!(
                "node {} with {} items cannot be split into halves of at least {}",
                id.index(),
                items,
                min_fanout
            )));
        }
        Ok(())
    }

    /// Replace `id` by two new nodes holding its items plus `overflow`.
    fn split_node(&mut self, id: NodeId, overflow: Overflow) -> Result<(NodeId, NodeId)> {
        let node = self.arena.release(id)?;
        let min_fanout = self.config.min_fanout;

        let halves = match (node.kind, overflow) {
            (NodeKind::Leaf(mut entries), Overflow::Entry(entry)) => {
                entries.push(entry);
                let (a, b) = split_items(entries, min_fanout)?;
                (
                    self.arena.alloc(Node::leaf(a)?),
                    self.arena.alloc(Node::leaf(b)?),
                )
            }
            (NodeKind::Internal(children), Overflow::Child(extra)) => {
                let mut refs = Vec::with_capacity(children.len() + 1);
                for child in children.into_iter().chain(std::iter::once(extra)) {
                    refs.push(ChildRef {
                        id: child,
                        rect: self.arena.get(child)?.rect,
                    });
                }
                let (a, b) = split_items(refs, min_fanout)?;
                (self.internal_from(&a)?, self.internal_from(&b)?)
            }
            _ => {
                return Err(NearJobsError::InvariantViolation(format!(
                    "overflow item does not match the kind of node {}",
                    id.index()
                )));
            }
        };

        log::debug!(
            "Split node {} into {} and {}",
            id.index(),
            halves.0.index(),
            halves.1.index()
        );
        Ok(halves)
    }

    fn internal_from(&mut self, children: &[ChildRef]) -> Result<NodeId> {
        let seed = children.first().map(|c| c.rect).ok_or_else(|| {
            NearJobsError::InvariantViolation("split produced an empty group".into())
        })?;
        let id = self.arena.alloc(Node::internal(seed));
        for child in children {
            self.arena.insert_child(id, child.id)?;
        }
        Ok(id)
    }

    /// The root split: a fresh internal root adopts both halves.
    fn grow(&mut self, first: NodeId, second: NodeId) -> Result<()> {
        let seed = self.arena.get(first)?.rect;
        let root = self.arena.alloc(Node::internal(seed));
        self.arena.insert_child(root, first)?;
        self.arena.insert_child(root, second)?;
        self.root = root;
        self.height += 1;
        log::debug!("Root split, tree height is now {}", self.height);
        Ok(())
    }

    /// Entries whose rectangle overlaps `query`, found by descending only into
    /// subtrees whose rectangle overlaps it.
    pub fn candidates(&self, query: &Rect) -> Vec<&Entry> {
        let mut found = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.arena.try_get(id) else {
                log::error!("Skipping dangling node {} during descent", id.index());
                continue;
            };
            if !node.rect.overlaps(query) {
                continue;
            }
            match &node.kind {
                NodeKind::Leaf(entries) => {
                    found.extend(entries.iter().filter(|e| e.rect().overlaps(query)));
                }
                NodeKind::Internal(children) => stack.extend(children.iter().copied()),
            }
        }
        found
    }

    /// Jobs within `radius_km` of `center`, optionally restricted to a title
    /// (case-insensitive). Never fails; see [`QueryExecutor`].
    pub fn range_query(&self, center: GeoPoint, radius_km: f64, title: Option<&str>) -> Vec<Job> {
        QueryExecutor::new(self).search(center, radius_km, title)
    }

    /// Every stored job, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.arena
            .iter()
            .filter_map(|(_, node)| match &node.kind {
                NodeKind::Leaf(entries) => Some(entries.iter().map(Entry::job)),
                NodeKind::Internal(_) => None,
            })
            .flatten()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entry_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Bounding rectangle of everything in the tree.
    pub fn root_rect(&self) -> Option<Rect> {
        self.arena.try_get(self.root).map(|node| node.rect)
    }

    pub fn stats(&self) -> TreeStats {
        TreeStats {
            height: self.height,
            entry_count: self.entry_count,
            node_count: self.arena.len(),
            leaf_count: self.arena.iter().filter(|(_, node)| node.is_leaf()).count(),
        }
    }

    /// Audit the structural invariants: uniform leaf depth, fanout bounds, tight
    /// rectangles, consistent parent back-references and matching counters.
    pub fn check_invariants(&self) -> Result<()> {
        let IndexConfig {
            max_fanout,
            min_fanout,
            ..
        } = self.config;
        let violation = |msg: String| Err(NearJobsError::InvariantViolation(msg));

        if self.arena.get(self.root)?.parent.is_some() {
            return violation("root has a parent".into());
        }

        let mut entries = 0;
        let mut visited = 0;
        let mut stack = vec![(self.root, None::<NodeId>, 0usize)];
        while let Some((id, expected_parent, depth)) = stack.pop() {
            let node = self.arena.get(id)?;
            visited += 1;

            if node.parent != expected_parent {
                return violation(format!("node {} has a stale parent link", id.index()));
            }

            let len = node.len();
            let is_root = id == self.root;
            if len > max_fanout {
                return violation(format!("node {} holds {} > {}", id.index(), len, max_fanout));
            }
            if !is_root && len < min_fanout {
                return violation(format!("node {} holds {} < {}", id.index(), len, min_fanout));
            }

            let tight = match &node.kind {
                NodeKind::Leaf(leaf_entries) => {
                    if depth != self.height {
                        return violation(format!(
                            "leaf {} at depth {}, expected {}",
                            id.index(),
                            depth,
                            self.height
                        ));
                    }
                    entries += leaf_entries.len();
                    Rect::union_all(leaf_entries.iter().map(Entry::rect))
                }
                NodeKind::Internal(children) => {
                    if is_root && children.len() < 2 {
                        return violation("internal root has fewer than 2 children".into());
                    }
                    let mut rects = Vec::with_capacity(children.len());
                    for &child in children {
                        rects.push(self.arena.get(child)?.rect);
                        stack.push((child, Some(id), depth + 1));
                    }
                    Rect::union_all(&rects)
                }
            };

            if tight != Some(node.rect) {
                return violation(format!("node {} rectangle is not tight", id.index()));
            }
        }

        if entries != self.entry_count {
            return violation(format!(
                "found {} entries, counter says {}",
                entries, self.entry_count
            ));
        }
        if visited != self.arena.len() {
            return violation(format!(
                "{} nodes reachable, arena holds {}",
                visited,
                self.arena.len()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(title: &str, lon: f64, lat: f64) -> Job {
        Job::new(title, GeoPoint::new(lon, lat))
    }

    fn clustered(n: usize) -> Vec<Job> {
        (0..n)
            .map(|i| job(&format!("job{i}"), 3.0 + i as f64 * 1e-4, 6.0 + i as f64 * 1e-4))
            .collect()
    }

    #[test]
    fn test_build_rejects_empty_input() {
        let result = RTree::build(Vec::new(), IndexConfig::default());
        assert!(matches!(result, Err(NearJobsError::EmptyInput)));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let config = IndexConfig::default().with_min_fanout(20);
        let result = RTree::build(clustered(3), config);
        assert!(matches!(result, Err(NearJobsError::InvalidConfig(_))));
    }

    #[test]
    fn test_single_leaf_root() {
        let tree = RTree::build(clustered(30), IndexConfig::default()).unwrap();
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.len(), 30);
        assert_eq!(tree.stats().node_count, 1);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_first_overflow_splits_root_once() {
        let tree = RTree::build(clustered(31), IndexConfig::default()).unwrap();
        let stats = tree.stats();
        assert_eq!(stats.height, 1);
        assert_eq!(stats.leaf_count, 2);
        assert_eq!(stats.node_count, 3);
        tree.check_invariants().unwrap();

        let root = tree.arena.get(tree.root).unwrap();
        assert_eq!(root.len(), 2);
    }

    #[test]
    fn test_sixty_one_clustered_jobs_with_wide_nodes_split_once() {
        let config = IndexConfig::default().with_max_fanout(60);
        let tree = RTree::build(clustered(61), config).unwrap();
        let stats = tree.stats();
        assert_eq!(stats.height, 1);
        assert_eq!(stats.leaf_count, 2);
        assert_eq!(tree.arena.get(tree.root).unwrap().len(), 2);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_many_inserts_keep_invariants() {
        let config = IndexConfig::default().with_max_fanout(4);
        let mut tree = RTree::build(vec![job("seed", 0.0, 0.0)], config).unwrap();
        for i in 0..500 {
            let lon = ((i * 37) % 360) as f64 - 180.0;
            let lat = ((i * 53) % 180) as f64 - 90.0;
            tree.insert(job(&format!("j{i}"), lon, lat)).unwrap();
            if i % 50 == 0 {
                tree.check_invariants().unwrap();
            }
        }
        tree.check_invariants().unwrap();
        assert_eq!(tree.len(), 501);
        assert_eq!(tree.iter().count(), 501);
        assert!(tree.height() >= 3);
    }

    #[test]
    fn test_duplicate_locations_split_cleanly() {
        let config = IndexConfig::default().with_max_fanout(4);
        let jobs: Vec<_> = (0..100).map(|i| job(&format!("d{i}"), 1.0, 1.0)).collect();
        let tree = RTree::build(jobs, config).unwrap();
        tree.check_invariants().unwrap();
        assert_eq!(tree.len(), 100);
    }

    #[test]
    fn test_candidates_prune_far_subtrees() {
        let config = IndexConfig::default().with_max_fanout(4);
        let mut jobs = clustered(20);
        jobs.extend((0..20).map(|i| job(&format!("far{i}"), 100.0, -40.0 + i as f64 * 0.01)));
        let tree = RTree::build(jobs, config).unwrap();

        let query = Rect::around(GeoPoint::new(3.0, 6.0), 0.5);
        let found = tree.candidates(&query);
        assert_eq!(found.len(), 20);
        assert!(found.iter().all(|e| e.job().title.starts_with("job")));
    }

    #[test]
    fn test_choose_leaf_prefers_containing_child() {
        let config = IndexConfig::default().with_max_fanout(4);
        let mut jobs: Vec<_> = (0..4).map(|i| job("west", 0.0, i as f64)).collect();
        jobs.extend((0..4).map(|i| job("east", 50.0, i as f64)));
        let tree = RTree::build(jobs, config).unwrap();

        // Strictly inside the east leaf on both axes.
        let rect = Rect::new(1.4, 1.6, 49.9, 50.1);
        let leaf = tree.choose_leaf(&rect).unwrap();
        let node = tree.arena.get(leaf).unwrap();
        let NodeKind::Leaf(entries) = &node.kind else {
            panic!("choose_leaf returned an internal node");
        };
        assert!(entries.iter().all(|e| e.job().title == "east"));
    }

    #[test]
    fn test_choose_leaf_on_childless_internal_root() {
        let mut arena = NodeArena::new();
        let root = arena.alloc(Node::internal(Rect::new(0.0, 1.0, 0.0, 1.0)));
        let tree = RTree {
            arena,
            root,
            height: 1,
            entry_count: 0,
            config: IndexConfig::default(),
        };

        let result = tree.choose_leaf(&Rect::new(0.2, 0.4, 0.2, 0.4));
        assert!(matches!(result, Err(NearJobsError::InvariantViolation(_))));
    }

    #[test]
    fn test_failed_split_leaves_tree_intact() {
        let config = IndexConfig::default().with_max_fanout(4);
        let mut tree = RTree::build(clustered(4), config).unwrap();
        // Five items can no longer form two halves of three.
        tree.config.min_fanout = 3;

        let result = tree.insert(job("extra", 3.0, 6.0));
        assert!(matches!(result, Err(NearJobsError::InvariantViolation(_))));

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.iter().count(), 4);
        assert_eq!(tree.stats().node_count, 1);
        assert!(tree.arena.get(tree.root).unwrap().parent.is_none());
        let found = tree.range_query(GeoPoint::new(3.0, 6.0), 1.0, None);
        assert_eq!(found.len(), 4);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_root_rect_covers_everything() {
        let tree = RTree::build(clustered(100), IndexConfig::default()).unwrap();
        let root = tree.root_rect().unwrap();
        for job in tree.iter() {
            let rect = Rect::around(job.location, tree.config().pad_degrees);
            assert_eq!(root.expand_to_accommodate(&rect), root);
        }
    }
}

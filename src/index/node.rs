//! Tree nodes and the arena that owns them.
//!
//! Nodes refer to each other by [`NodeId`], an index into [`NodeArena`]. A parent
//! owns its children through its child list; the `parent` field is a plain
//! back-reference and never keeps a node alive. Released slots are recycled, so
//! an id is only meaningful while the node it names is still linked into the tree.

use super::rect::Rect;
use crate::error::{NearJobsError, Result};
use nearjobs_types::Job;

/// A job together with the padded rectangle around its location.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    job: Job,
    rect: Rect,
}

impl Entry {
    pub fn new(job: Job, pad_degrees: f64) -> Self {
        let rect = Rect::around(job.location, pad_degrees);
        Self { job, rect }
    }

    #[inline]
    pub fn job(&self) -> &Job {
        &self.job
    }

    #[inline]
    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    pub fn into_job(self) -> Job {
        self.job
    }
}

/// Index of a node inside a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn for_tests(index: usize) -> Self {
        Self(index)
    }
}

#[derive(Debug)]
pub(crate) enum NodeKind {
    Leaf(Vec<Entry>),
    Internal(Vec<NodeId>),
}

#[derive(Debug)]
pub(crate) struct Node {
    /// Tight bound over the node's entries or children.
    pub(crate) rect: Rect,
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind,
}

impl Node {
    /// A leaf holding `entries`. Fails when `entries` is empty, since an empty
    /// node has no meaningful rectangle.
    pub(crate) fn leaf(entries: Vec<Entry>) -> Result<Self> {
        let rect = Rect::union_all(entries.iter().map(Entry::rect)).ok_or_else(|| {
            NearJobsError::InvariantViolation("cannot create a leaf without entries".into())
        })?;
        Ok(Self {
            rect,
            parent: None,
            kind: NodeKind::Leaf(entries),
        })
    }

    /// An internal node with no children yet. Its rectangle is set by the first
    /// `NodeArena::insert_child`.
    pub(crate) fn internal(seed_rect: Rect) -> Self {
        Self {
            rect: seed_rect,
            parent: None,
            kind: NodeKind::Internal(Vec::new()),
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    /// Number of entries (leaf) or children (internal).
    #[inline]
    pub(crate) fn len(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf(entries) => entries.len(),
            NodeKind::Internal(children) => children.len(),
        }
    }

    #[inline]
    pub(crate) fn can_accept_one_more(&self, max_fanout: usize) -> bool {
        self.len() < max_fanout
    }
}

/// Owner of every node in a tree.
#[derive(Debug, Default)]
pub(crate) struct NodeArena {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    live: usize,
}

impl NodeArena {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        self.live += 1;
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Remove a node from the arena and hand it back. The caller is responsible
    /// for having unlinked it from its parent first.
    pub(crate) fn release(&mut self, id: NodeId) -> Result<Node> {
        let node = self
            .slots
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or_else(|| dangling(id))?;
        self.free.push(id.0);
        self.live -= 1;
        Ok(node)
    }

    #[inline]
    pub(crate) fn try_get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> Result<&Node> {
        self.try_get(id).ok_or_else(|| dangling(id))
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| dangling(id))
    }

    /// Append `entry` to leaf `id`, growing the leaf's rectangle.
    pub(crate) fn insert_entry(&mut self, id: NodeId, entry: Entry) -> Result<()> {
        let node = self.get_mut(id)?;
        match &mut node.kind {
            NodeKind::Leaf(entries) => {
                node.rect = if entries.is_empty() {
                    *entry.rect()
                } else {
                    node.rect.expand_to_accommodate(entry.rect())
                };
                entries.push(entry);
                Ok(())
            }
            NodeKind::Internal(_) => Err(NearJobsError::InvariantViolation(format!(
                "entry inserted into internal node {}",
                id.0
            ))),
        }
    }

    /// Link `child` under `parent`, growing the parent's rectangle and pointing
    /// the child's back-reference at it.
    pub(crate) fn insert_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let child_rect = {
            let child_node = self.get_mut(child)?;
            child_node.parent = Some(parent);
            child_node.rect
        };

        let node = self.get_mut(parent)?;
        match &mut node.kind {
            NodeKind::Internal(children) => {
                node.rect = if children.is_empty() {
                    child_rect
                } else {
                    node.rect.expand_to_accommodate(&child_rect)
                };
                children.push(child);
                Ok(())
            }
            NodeKind::Leaf(_) => Err(NearJobsError::InvariantViolation(format!(
                "child node {} inserted into leaf {}",
                child.0, parent.0
            ))),
        }
    }

    /// Unlink `child` from `parent` and recompute the parent's rectangle from the
    /// children that remain.
    pub(crate) fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let remaining = {
            let node = self.get_mut(parent)?;
            let NodeKind::Internal(children) = &mut node.kind else {
                return Err(NearJobsError::InvariantViolation(format!(
                    "cannot remove child {} from leaf {}",
                    child.0, parent.0
                )));
            };
            let position = children.iter().position(|c| *c == child).ok_or_else(|| {
                NearJobsError::InvariantViolation(format!(
                    "node {} is not a child of {}",
                    child.0, parent.0
                ))
            })?;
            children.remove(position);
            children.clone()
        };

        if let Some(child_node) = self.slots.get_mut(child.0).and_then(Option::as_mut) {
            child_node.parent = None;
        }

        let mut union: Option<Rect> = None;
        for id in remaining {
            let rect = self.get(id)?.rect;
            union = Some(match union {
                Some(acc) => acc.expand_to_accommodate(&rect),
                None => rect,
            });
        }
        if let Some(rect) = union {
            self.get_mut(parent)?.rect = rect;
        }
        Ok(())
    }

    /// Every live node with its id, in slot order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|node| (NodeId(index), node)))
    }
}

fn dangling(id: NodeId) -> NearJobsError {
    NearJobsError::InvariantViolation(format!("node {} is not in the arena", id.0))
}

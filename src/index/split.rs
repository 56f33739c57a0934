//! Guttman's linear-cost node split.
//!
//! The same routine splits leaves (over entries) and internal nodes (over child
//! references). It is handed the `M + 1` items of an overflowing node and returns
//! two groups that each hold at least `min_fanout` items.

use super::node::{Entry, NodeId};
use super::rect::{Axis, Rect};
use crate::error::{NearJobsError, Result};
use std::cmp::Ordering;

/// Anything that can be placed in a split group.
pub(crate) trait Bounded {
    fn bounds(&self) -> &Rect;
}

impl Bounded for Entry {
    fn bounds(&self) -> &Rect {
        self.rect()
    }
}

/// A child reference with a copy of the child's rectangle, so that internal
/// nodes can be split without touching the arena.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ChildRef {
    pub(crate) id: NodeId,
    pub(crate) rect: Rect,
}

impl Bounded for ChildRef {
    fn bounds(&self) -> &Rect {
        &self.rect
    }
}

struct Group<T> {
    items: Vec<T>,
    rect: Rect,
}

impl<T: Bounded> Group<T> {
    fn seeded(seed: T, capacity: usize) -> Self {
        let rect = *seed.bounds();
        let mut items = Vec::with_capacity(capacity);
        items.push(seed);
        Self { items, rect }
    }

    fn push(&mut self, item: T) {
        self.rect = self.rect.expand_to_accommodate(item.bounds());
        self.items.push(item);
    }
}

/// Split `items` into two groups of at least `min_fanout` items each.
pub(crate) fn split_items<T: Bounded>(
    mut items: Vec<T>,
    min_fanout: usize,
) -> Result<(Vec<T>, Vec<T>)> {
    if items.len() < 2 {
        return Err(NearJobsError::InvariantViolation(format!(
            "cannot split a node holding {} items",
            items.len()
        )));
    }
    if min_fanout == 0 || items.len() < 2 * min_fanout {
        return Err(NearJobsError::InvariantViolation(format!(
            "cannot split {} items into two groups of at least {}",
            items.len(),
            min_fanout
        )));
    }

    let (low_seed, high_seed) = pick_seeds(&items);
    // Remove the later index first so the earlier one stays valid.
    let (first, second) = if low_seed > high_seed {
        let low = items.remove(low_seed);
        let high = items.remove(high_seed);
        (low, high)
    } else {
        let high = items.remove(high_seed);
        let low = items.remove(low_seed);
        (low, high)
    };

    let capacity = items.len() + 1;
    let mut a = Group::seeded(first, capacity);
    let mut b = Group::seeded(second, capacity);

    let mut pending = items.into_iter();
    let mut left = pending.len();
    while let Some(item) = pending.next() {
        // Forced assignment: the pool can only just fill one group to the minimum.
        if a.items.len() + left <= min_fanout {
            a.push(item);
            pending.by_ref().for_each(|rest| a.push(rest));
            break;
        }
        if b.items.len() + left <= min_fanout {
            b.push(item);
            pending.by_ref().for_each(|rest| b.push(rest));
            break;
        }
        left -= 1;

        if prefers_first(&a, &b, item.bounds()) {
            a.push(item);
        } else {
            b.push(item);
        }
    }

    Ok((a.items, b.items))
}

/// Least percentage expansion, then smaller area, then fewer items.
fn prefers_first<T: Bounded>(a: &Group<T>, b: &Group<T>, rect: &Rect) -> bool {
    let expansion_a = a.rect.percent_expansion_needed(rect);
    let expansion_b = b.rect.percent_expansion_needed(rect);
    match expansion_a.partial_cmp(&expansion_b) {
        Some(Ordering::Less) => return true,
        Some(Ordering::Greater) => return false,
        _ => {}
    }

    match a.rect.area().partial_cmp(&b.rect.area()) {
        Some(Ordering::Less) => true,
        Some(Ordering::Greater) => false,
        _ => a.items.len() <= b.items.len(),
    }
}

/// Linear seed selection. Along each axis, take the item whose low side is
/// highest and the item whose high side is lowest. Their gap, normalized by the
/// extent of the whole set on that axis, picks the axis. Returns the indices of
/// the (low, high) pair on the winning axis; they always differ.
fn pick_seeds<T: Bounded>(items: &[T]) -> (usize, usize) {
    if items.len() == 2 {
        return (0, 1);
    }

    let Some(group) = Rect::union_all(items.iter().map(Bounded::bounds)) else {
        return (0, 1);
    };

    let mut best: Option<(f64, usize, usize)> = None;
    for axis in [Axis::X, Axis::Y] {
        let (group_low, group_high) = group.bounds(axis);
        let extent = group_high - group_low;

        let mut highest_low = 0;
        for (i, item) in items.iter().enumerate() {
            if item.bounds().bounds(axis).0 > items[highest_low].bounds().bounds(axis).0 {
                highest_low = i;
            }
        }

        let mut lowest_high: Option<usize> = None;
        for (i, item) in items.iter().enumerate() {
            if i == highest_low {
                continue;
            }
            let high = item.bounds().bounds(axis).1;
            match lowest_high {
                Some(j) if items[j].bounds().bounds(axis).1 <= high => {}
                _ => lowest_high = Some(i),
            }
        }
        let Some(lowest_high) = lowest_high else {
            continue;
        };

        let separation = items[highest_low].bounds().bounds(axis).0
            - items[lowest_high].bounds().bounds(axis).1;
        let normalized = if extent > 0.0 {
            separation / extent
        } else {
            0.0
        };

        if best.is_none_or(|(score, _, _)| normalized > score) {
            best = Some((normalized, lowest_high, highest_low));
        }
    }

    best.map(|(_, low, high)| (low, high)).unwrap_or((0, 1))
}

//! Thread reconstruction: flat activity store → rendered forest
//!
//! The server hands back posts and comments intermixed in one flat, paginated
//! list; the parent of a comment is implicit in its `item_id` /
//! `secondary_item_id` fields. Every reconstruction pass rebuilds the whole
//! forest from scratch, so the output is always consistent with the latest
//! accumulated store and moderation lists, and no stale child references can
//! survive a moderation change.

use std::collections::{HashMap, HashSet};

use crate::models::{ActivityKind, ActivityRecord};
use crate::moderation::ModerationState;

/// Rebuild the rendered forest from the accumulated flat store
///
/// Pure with respect to its inputs: the flat store is only read, and the
/// returned records are independent copies with `children` attached. Calling
/// it twice on the same inputs yields structurally identical forests.
///
/// Top-level entries are the `activity_update` records whose author passes
/// the moderation predicate, in their original relative order. Comments
/// attach under whichever parent candidate resolves (`item_id` first, then
/// `secondary_item_id`); a comment with no resolvable parent is excluded
/// entirely, never promoted to top level. Children are ordered ascending by
/// `recorded_at`, compared as strings.
///
/// Note: only top-level posts are moderation-filtered; nested comments from
/// blocked or muted authors still render. That mirrors the product behavior
/// as shipped (see DESIGN.md).
pub fn reconstruct(flat: &[ActivityRecord], moderation: &ModerationState) -> Vec<ActivityRecord> {
    let by_id: HashMap<i64, &ActivityRecord> = flat.iter().map(|r| (r.id, r)).collect();

    // Child ids grouped under their resolved parent, in arrival order
    let mut children_of: HashMap<i64, Vec<i64>> = HashMap::new();
    for record in flat {
        if record.kind != ActivityKind::Comment {
            continue;
        }
        match resolve_parent(record, &by_id) {
            Some(parent_id) => children_of.entry(parent_id).or_default().push(record.id),
            None => {
                tracing::debug!("Excluding orphaned comment {} from the forest", record.id);
            }
        }
    }

    flat.iter()
        .filter(|r| r.kind == ActivityKind::Update && moderation.is_visible(r.user_id))
        .map(|r| {
            let mut path = HashSet::new();
            build_node(r, &by_id, &children_of, &mut path)
        })
        .collect()
}

/// Pick the parent id for a comment: `item_id` wins if it points at a known
/// record, otherwise `secondary_item_id`; a candidate pointing at the comment
/// itself never resolves.
fn resolve_parent(record: &ActivityRecord, by_id: &HashMap<i64, &ActivityRecord>) -> Option<i64> {
    let resolves = |candidate: i64| candidate != record.id && by_id.contains_key(&candidate);
    record
        .item_id
        .filter(|&c| resolves(c))
        .or_else(|| record.secondary_item_id.filter(|&c| resolves(c)))
}

/// Clone one record and recursively attach its comment subtree
///
/// `path` holds the ids on the current ancestor chain; a child already on it
/// would mean a cyclic parent link in malformed data, and is skipped so the
/// recursion always terminates.
fn build_node(
    record: &ActivityRecord,
    by_id: &HashMap<i64, &ActivityRecord>,
    children_of: &HashMap<i64, Vec<i64>>,
    path: &mut HashSet<i64>,
) -> ActivityRecord {
    let mut node = record.clone();
    node.children.clear();

    if !path.insert(record.id) {
        return node;
    }

    if let Some(child_ids) = children_of.get(&record.id) {
        let mut children = Vec::with_capacity(child_ids.len());
        for child_id in child_ids {
            if path.contains(child_id) {
                continue;
            }
            if let Some(child) = by_id.get(child_id) {
                children.push(build_node(child, by_id, children_of, path));
            }
        }
        // Oldest first; absent timestamps sort ahead of everything
        children.sort_by(|a, b| a.recorded_at.cmp(&b.recorded_at));
        node.children = children;
    }

    path.remove(&record.id);
    node
}

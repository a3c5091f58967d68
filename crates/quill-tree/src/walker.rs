//! Traversal helpers.

use std::collections::BTreeSet;

use quill_store::ContentStore;
use quill_types::ContentId;
use serde::Serialize;

use crate::error::{TreeError, TreeResult};
use crate::kind::NodeKind;
use crate::node::{NodeRef, RootNode};
use crate::record::{self, CommentRecord};

/// One node seen during a depth-first walk.
#[derive(Clone, Copy, Debug)]
pub struct Visit<'a> {
    /// Zero for the root.
    pub depth: usize,
    /// The link name the parent uses for this node; the root's own name
    /// for the root.
    pub name: &'a str,
    pub node: NodeRef<'a>,
}

/// Node counts per level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    pub sites: usize,
    pub blogs: usize,
    pub posts: usize,
    pub comments: usize,
}

impl TreeStats {
    pub fn of(root: &RootNode) -> Self {
        let mut stats = Self::default();
        root.walk(|visit| match visit.node.kind() {
            NodeKind::Root => {}
            NodeKind::Site => stats.sites += 1,
            NodeKind::Blog => stats.blogs += 1,
            NodeKind::Post => stats.posts += 1,
            NodeKind::Comment => stats.comments += 1,
        });
        stats
    }
}

/// Check that every block reachable from `root_id` is present and decodes.
///
/// Walks the stored DAG directly without hydrating nodes, and returns the
/// set of reachable ids. Subtrees shared between parents are visited once.
pub fn verify_closed(store: &dyn ContentStore, root_id: &ContentId) -> TreeResult<BTreeSet<ContentId>> {
    let mut seen = BTreeSet::new();
    let mut pending = vec![(NodeKind::Root, *root_id)];

    while let Some((kind, id)) = pending.pop() {
        if !seen.insert(id) {
            continue;
        }
        let bytes = store.get(&id)?;
        match kind.child() {
            Some(child) => {
                let (_, links) = record::decode_branch(kind, id, &bytes)?;
                pending.extend(links.into_iter().map(|l| (child, l.target)));
            }
            None => {
                CommentRecord::decode(id, &bytes)?;
            }
        }
    }
    Ok(seen)
}

/// Like [`verify_closed`], but reports the first missing id rather than an
/// error when the only problem is absence.
pub fn find_missing(store: &dyn ContentStore, root_id: &ContentId) -> TreeResult<Option<ContentId>> {
    match verify_closed(store, root_id) {
        Ok(_) => Ok(None),
        Err(TreeError::NotFound(id)) => Ok(Some(id)),
        Err(e) => Err(e),
    }
}

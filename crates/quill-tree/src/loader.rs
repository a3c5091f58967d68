//! Hydrating a tree from the store.

use std::sync::Arc;

use quill_store::ContentStore;
use quill_types::ContentId;
use tracing::{debug, instrument};

use crate::error::TreeResult;
use crate::node::{BranchNode, CommentNode, Entry, Level, RootNode, TreeChild};
use crate::record::{self, CommentRecord};

/// Loads a complete tree from a root id.
///
/// Loading is eager and fails closed: if any linked block is missing or
/// does not decode, the whole load fails and no partial tree is returned.
/// Every hydrated node is Written and carries the id it was loaded from.
pub struct TreeLoader<'s> {
    store: &'s dyn ContentStore,
}

impl<'s> TreeLoader<'s> {
    pub fn new(store: &'s dyn ContentStore) -> Self {
        Self { store }
    }

    /// Load the root block at `root_id` and everything below it.
    #[instrument(skip_all, fields(root = %root_id.short_hex()))]
    pub fn load(&self, root_id: &ContentId) -> TreeResult<RootNode> {
        let root: RootNode = hydrate_branch(self.store, *root_id)?;
        debug!(sites = root.len(), "loaded tree");
        Ok(root)
    }

    /// Load a single subtree of a known kind, e.g. one post.
    pub fn load_subtree<C: TreeChild>(&self, id: &ContentId) -> TreeResult<C> {
        C::hydrate(self.store, *id)
    }
}

pub(crate) fn hydrate_branch<L: Level>(
    store: &dyn ContentStore,
    id: ContentId,
) -> TreeResult<BranchNode<L>> {
    let bytes = store.get(&id)?;
    let (name, links) = record::decode_branch(L::KIND, id, &bytes)?;

    let entries = links
        .into_iter()
        .map(|link| {
            let child = <L::Child as TreeChild>::hydrate(store, link.target)?;
            Ok(Entry {
                name: link.name,
                node: Arc::new(child),
            })
        })
        .collect::<TreeResult<Vec<_>>>()?;

    Ok(BranchNode::from_parts(name, entries, Some(id)))
}

pub(crate) fn hydrate_comment(store: &dyn ContentStore, id: ContentId) -> TreeResult<CommentNode> {
    let bytes = store.get(&id)?;
    CommentNode::from_record(id, CommentRecord::decode(id, &bytes)?)
}

//! Node types and their lifecycle.
//!
//! Non-leaf levels share one generic [`BranchNode`], parameterized by a
//! sealed [`Level`] marker that fixes its [`NodeKind`] and child type. The
//! leaf is [`CommentNode`]. Both implement the sealed [`TreeChild`] trait, so
//! the set of kinds is closed and every match over [`NodeRef`] is
//! exhaustive.
//!
//! A node starts Transient (no content id). `write` serializes it, stores
//! it and records the id; it is then Written. Nodes expose no setters:
//! [`BranchNode::with_child`] and [`BranchNode::with_replaced`] derive a new
//! Transient node and leave the original untouched.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use quill_crypto::ContentHasher;
use quill_store::ContentStore;
use quill_types::ContentId;
use tracing::debug;

use crate::error::{TreeError, TreeResult};
use crate::kind::NodeKind;
use crate::loader;
use crate::record::{self, CommentRecord, Link};
use crate::walker::Visit;

mod sealed {
    pub trait Sealed {}
}

/// Behavior shared by every node that can hang below a parent.
pub trait TreeChild:
    sealed::Sealed + Clone + fmt::Debug + PartialEq + Send + Sync + 'static
{
    /// The level this node type occupies.
    const KIND: NodeKind;

    /// The node's content id, `None` while Transient.
    fn content_id(&self) -> Option<ContentId>;

    /// Store this node if it is Transient and return its id.
    fn write(&mut self, store: &dyn ContentStore) -> TreeResult<ContentId>;

    /// Fetch and decode the block at `id`, including all descendants.
    fn hydrate(store: &dyn ContentStore, id: ContentId) -> TreeResult<Self>;

    /// Borrow this node as the tagged [`NodeRef`].
    fn node_ref(&self) -> NodeRef<'_>;

    #[doc(hidden)]
    fn walk_from<'a>(&'a self, depth: usize, name: &'a str, f: &mut dyn FnMut(Visit<'a>));
}

/// Marker for a non-leaf level.
pub trait Level:
    sealed::Sealed + Clone + Copy + fmt::Debug + PartialEq + Send + Sync + 'static
{
    const KIND: NodeKind;
    type Child: TreeChild;

    #[doc(hidden)]
    fn node_ref(node: &BranchNode<Self>) -> NodeRef<'_>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RootLevel;
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SiteLevel;
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlogLevel;
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PostLevel;

impl sealed::Sealed for RootLevel {}
impl sealed::Sealed for SiteLevel {}
impl sealed::Sealed for BlogLevel {}
impl sealed::Sealed for PostLevel {}

impl Level for RootLevel {
    const KIND: NodeKind = NodeKind::Root;
    type Child = SiteNode;

    fn node_ref(node: &RootNode) -> NodeRef<'_> {
        NodeRef::Root(node)
    }
}

impl Level for SiteLevel {
    const KIND: NodeKind = NodeKind::Site;
    type Child = BlogNode;

    fn node_ref(node: &SiteNode) -> NodeRef<'_> {
        NodeRef::Site(node)
    }
}

impl Level for BlogLevel {
    const KIND: NodeKind = NodeKind::Blog;
    type Child = PostNode;

    fn node_ref(node: &BlogNode) -> NodeRef<'_> {
        NodeRef::Blog(node)
    }
}

impl Level for PostLevel {
    const KIND: NodeKind = NodeKind::Post;
    type Child = CommentNode;

    fn node_ref(node: &PostNode) -> NodeRef<'_> {
        NodeRef::Post(node)
    }
}

pub type RootNode = BranchNode<RootLevel>;
pub type SiteNode = BranchNode<SiteLevel>;
pub type BlogNode = BranchNode<BlogLevel>;
pub type PostNode = BranchNode<PostLevel>;

/// A borrowed node of any kind.
#[derive(Clone, Copy, Debug)]
pub enum NodeRef<'a> {
    Root(&'a RootNode),
    Site(&'a SiteNode),
    Blog(&'a BlogNode),
    Post(&'a PostNode),
    Comment(&'a CommentNode),
}

impl NodeRef<'_> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Root(_) => NodeKind::Root,
            Self::Site(_) => NodeKind::Site,
            Self::Blog(_) => NodeKind::Blog,
            Self::Post(_) => NodeKind::Post,
            Self::Comment(_) => NodeKind::Comment,
        }
    }

    pub fn content_id(&self) -> Option<ContentId> {
        match self {
            Self::Root(n) => n.content_id(),
            Self::Site(n) => n.content_id(),
            Self::Blog(n) => n.content_id(),
            Self::Post(n) => n.content_id(),
            Self::Comment(n) => n.content_id(),
        }
    }

    /// Number of child links; always zero for a comment.
    pub fn link_count(&self) -> usize {
        match self {
            Self::Root(n) => n.len(),
            Self::Site(n) => n.len(),
            Self::Blog(n) => n.len(),
            Self::Post(n) => n.len(),
            Self::Comment(_) => 0,
        }
    }
}

/// A named child slot in a parent's ordered link list.
///
/// Children are held behind `Arc` so that a rewritten parent shares every
/// untouched sibling with the version it was derived from.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry<C> {
    pub name: String,
    pub node: Arc<C>,
}

/// A Root, Site, Blog or Post node.
#[derive(Clone, Debug, PartialEq)]
pub struct BranchNode<L: Level> {
    name: String,
    entries: Vec<Entry<L::Child>>,
    id: Option<ContentId>,
    level: PhantomData<L>,
}

impl<L: Level> BranchNode<L> {
    /// A fresh Transient node with no children.
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_parts(name.into(), Vec::new(), None)
    }

    /// Like [`new`](Self::new), but rejects blank names.
    pub fn named(name: impl Into<String>) -> TreeResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TreeError::BadRequest(format!("{} name is empty", L::KIND)));
        }
        Ok(Self::new(name))
    }

    pub(crate) fn from_parts(
        name: String,
        entries: Vec<Entry<L::Child>>,
        id: Option<ContentId>,
    ) -> Self {
        Self {
            name,
            entries,
            id,
            level: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        L::KIND
    }

    pub fn content_id(&self) -> Option<ContentId> {
        self.id
    }

    pub fn is_written(&self) -> bool {
        self.id.is_some()
    }

    /// Child slots in insertion order.
    pub fn entries(&self) -> &[Entry<L::Child>] {
        &self.entries
    }

    /// Child nodes in insertion order.
    pub fn children(&self) -> impl Iterator<Item = &L::Child> + '_ {
        self.entries.iter().map(|e| e.node.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First child whose link name equals `name`, with its position.
    pub fn find_child(&self, name: &str) -> Option<(usize, &L::Child)> {
        self.entries
            .iter()
            .position(|e| e.name == name)
            .map(|i| (i, self.entries[i].node.as_ref()))
    }

    /// Derive a Transient copy with `child` appended under `name`.
    pub fn with_child(&self, name: impl Into<String>, child: L::Child) -> Self {
        let mut entries = self.entries.clone();
        entries.push(Entry {
            name: name.into(),
            node: Arc::new(child),
        });
        Self::from_parts(self.name.clone(), entries, None)
    }

    /// Derive a Transient copy whose slot `index` now holds `child`.
    ///
    /// The slot keeps its link name; only the target changes.
    pub fn with_replaced(&self, index: usize, child: L::Child) -> TreeResult<Self> {
        if index >= self.entries.len() {
            return Err(TreeError::MissingSlot {
                kind: L::KIND,
                index,
            });
        }
        let mut entries = self.entries.clone();
        entries[index].node = Arc::new(child);
        Ok(Self::from_parts(self.name.clone(), entries, None))
    }

    /// The ordered link list this node serializes.
    ///
    /// Fails with [`TreeError::Unwritten`] if any child is still Transient.
    pub fn links(&self) -> TreeResult<Vec<Link>> {
        self.entries
            .iter()
            .map(|e| {
                let target = e.node.content_id().ok_or_else(|| TreeError::Unwritten {
                    kind: <L::Child as TreeChild>::KIND,
                    name: e.name.clone(),
                })?;
                Ok(Link {
                    name: e.name.clone(),
                    target,
                })
            })
            .collect()
    }

    /// Serialize the current in-memory state.
    pub fn encode(&self) -> TreeResult<Vec<u8>> {
        record::encode_branch(L::KIND, &self.name, &self.links()?)
    }

    /// Store this node and return its id.
    ///
    /// A Written node returns its existing id without touching the store.
    pub fn write(&mut self, store: &dyn ContentStore) -> TreeResult<ContentId> {
        if let Some(id) = self.id {
            return Ok(id);
        }
        let bytes = self.encode()?;
        let id = store.put(&bytes)?;
        debug!(kind = %L::KIND, name = %self.name, id = %id.short_hex(), "wrote node");
        self.id = Some(id);
        Ok(id)
    }

    /// Visit this node and all descendants depth-first in link order.
    pub fn walk<'a>(&'a self, mut f: impl FnMut(Visit<'a>)) {
        self.walk_from(0, &self.name, &mut f);
    }
}

impl<L: Level> sealed::Sealed for BranchNode<L> {}

impl<L: Level> TreeChild for BranchNode<L> {
    const KIND: NodeKind = L::KIND;

    fn content_id(&self) -> Option<ContentId> {
        self.id
    }

    fn write(&mut self, store: &dyn ContentStore) -> TreeResult<ContentId> {
        BranchNode::write(self, store)
    }

    fn hydrate(store: &dyn ContentStore, id: ContentId) -> TreeResult<Self> {
        loader::hydrate_branch(store, id)
    }

    fn node_ref(&self) -> NodeRef<'_> {
        L::node_ref(self)
    }

    fn walk_from<'a>(&'a self, depth: usize, name: &'a str, f: &mut dyn FnMut(Visit<'a>)) {
        f(Visit {
            depth,
            name,
            node: L::node_ref(self),
        });
        for entry in &self.entries {
            entry.node.walk_from(depth + 1, &entry.name, f);
        }
    }
}

/// A comment: the leaf of the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommentNode {
    author: String,
    content: String,
    date_time: DateTime<Utc>,
    reply_to: Option<String>,
    display_id: String,
    id: Option<ContentId>,
}

impl CommentNode {
    /// Create a Transient comment.
    ///
    /// Author and content must be non-blank. The timestamp is truncated to
    /// microseconds, the precision comment blocks store. An empty
    /// `reply_to` is treated as absent.
    pub fn new(
        author: impl Into<String>,
        content: impl Into<String>,
        date_time: DateTime<Utc>,
        reply_to: Option<String>,
    ) -> TreeResult<Self> {
        let author = author.into();
        let content = content.into();
        if author.trim().is_empty() {
            return Err(TreeError::BadRequest("comment author is empty".into()));
        }
        if content.trim().is_empty() {
            return Err(TreeError::BadRequest("comment content is empty".into()));
        }
        let date_time = date_time.trunc_subsecs(6);
        let reply_to = reply_to.filter(|r| !r.trim().is_empty());
        let display_id = Self::derive_display_id(&author, &content, &date_time);

        Ok(Self {
            author,
            content,
            date_time,
            reply_to,
            display_id,
            id: None,
        })
    }

    /// Hash of author, timestamp and content, used as the link name and
    /// shown to readers. Not a storage key.
    pub fn derive_display_id(author: &str, content: &str, date_time: &DateTime<Utc>) -> String {
        ContentHasher::COMMENT_ID
            .hash_fields(&[author, &record::format_timestamp(date_time), content])
            .to_hex()
    }

    pub(crate) fn from_record(id: ContentId, rec: CommentRecord) -> TreeResult<Self> {
        let date_time = record::parse_timestamp(&rec.date_time).ok_or_else(|| TreeError::Decode {
            id,
            kind: NodeKind::Comment,
            reason: format!("bad dateTime {:?}", rec.date_time),
        })?;
        Ok(Self {
            author: rec.author,
            content: rec.content,
            date_time,
            reply_to: rec.reply_to,
            display_id: rec.id,
            id: Some(id),
        })
    }

    fn to_record(&self) -> CommentRecord {
        CommentRecord {
            author: self.author.clone(),
            date_time: record::format_timestamp(&self.date_time),
            content: self.content.clone(),
            reply_to: self.reply_to.clone(),
            id: self.display_id.clone(),
        }
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn date_time(&self) -> DateTime<Utc> {
        self.date_time
    }

    pub fn reply_to(&self) -> Option<&str> {
        self.reply_to.as_deref()
    }

    pub fn display_id(&self) -> &str {
        &self.display_id
    }

    pub fn content_id(&self) -> Option<ContentId> {
        self.id
    }

    pub fn is_written(&self) -> bool {
        self.id.is_some()
    }

    pub fn encode(&self) -> TreeResult<Vec<u8>> {
        self.to_record().encode()
    }

    /// Store this comment and return its id.
    pub fn write(&mut self, store: &dyn ContentStore) -> TreeResult<ContentId> {
        if let Some(id) = self.id {
            return Ok(id);
        }
        let id = store.put(&self.encode()?)?;
        debug!(display_id = %self.display_id, id = %id.short_hex(), "wrote comment");
        self.id = Some(id);
        Ok(id)
    }
}

impl sealed::Sealed for CommentNode {}

impl TreeChild for CommentNode {
    const KIND: NodeKind = NodeKind::Comment;

    fn content_id(&self) -> Option<ContentId> {
        self.id
    }

    fn write(&mut self, store: &dyn ContentStore) -> TreeResult<ContentId> {
        CommentNode::write(self, store)
    }

    fn hydrate(store: &dyn ContentStore, id: ContentId) -> TreeResult<Self> {
        loader::hydrate_comment(store, id)
    }

    fn node_ref(&self) -> NodeRef<'_> {
        NodeRef::Comment(self)
    }

    fn walk_from<'a>(&'a self, depth: usize, name: &'a str, f: &mut dyn FnMut(Visit<'a>)) {
        f(Visit {
            depth,
            name,
            node: NodeRef::Comment(self),
        });
    }
}

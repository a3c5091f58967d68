//! Path-copying updates.
//!
//! Every mutation derives a new leaf or branch, writes it, then walks the
//! spine upward: each ancestor is re-derived with its one changed slot,
//! written, and handed to its own parent. Exactly the nodes on the path are
//! re-serialized; every sibling subtree is carried over by `Arc` with its id
//! intact. The input tree is never modified, so a failure part way up
//! leaves nothing reachable from the previous root changed.

use chrono::{DateTime, Utc};
use quill_store::ContentStore;
use quill_types::ContentId;
use tracing::{debug, info};

use crate::comments::NewComment;
use crate::error::TreeResult;
use crate::kind::NodeKind;
use crate::node::{BlogNode, CommentNode, PostNode, RootNode, SiteNode, TreeChild};
use crate::path::{BlogSpine, SiteSpine, Spine};

/// A block written during one commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WrittenBlock {
    pub kind: NodeKind,
    pub id: ContentId,
}

/// Outcome of a successful write.
#[derive(Clone, Debug)]
pub struct Commit<N> {
    /// The new root, fully Written.
    pub root: RootNode,
    pub root_id: ContentId,
    /// The node that was added.
    pub created: N,
    /// Blocks written, leaf first.
    pub written: Vec<WrittenBlock>,
}

/// Rewrites the spine above a new node and produces a new root.
///
/// The writer does not publish the root; callers move their root pointer
/// once the commit returns.
pub struct PathCopyWriter<'s> {
    store: &'s dyn ContentStore,
    written: Vec<WrittenBlock>,
}

impl<'s> PathCopyWriter<'s> {
    pub fn new(store: &'s dyn ContentStore) -> Self {
        Self {
            store,
            written: Vec::new(),
        }
    }

    /// Append a comment to the post at the end of `spine`.
    pub fn add_comment(
        mut self,
        spine: &Spine<'_>,
        new: NewComment,
        at: DateTime<Utc>,
    ) -> TreeResult<Commit<CommentNode>> {
        let mut comment = CommentNode::new(new.author, new.content, at, new.reply_to)?;
        self.write(&mut comment)?;

        let post = spine
            .post()
            .with_child(comment.display_id().to_string(), comment.clone());
        let (root, root_id) = self.commit_post(spine, post)?;

        info!(
            post = %spine.post().name(),
            comment = %comment.display_id(),
            root = %root_id.short_hex(),
            "comment added"
        );
        Ok(self.finish(root, root_id, comment))
    }

    /// Append an empty site under the root.
    pub fn add_site(mut self, root: &RootNode, name: &str) -> TreeResult<Commit<SiteNode>> {
        let mut site = SiteNode::named(name)?;
        self.write(&mut site)?;

        let root = root.with_child(name, site.clone());
        let (root, root_id) = self.commit_root(root)?;
        info!(site = name, root = %root_id.short_hex(), "site added");
        Ok(self.finish(root, root_id, site))
    }

    /// Append an empty blog under the site at the end of `spine`.
    pub fn add_blog(mut self, spine: &SiteSpine<'_>, name: &str) -> TreeResult<Commit<BlogNode>> {
        let mut blog = BlogNode::named(name)?;
        self.write(&mut blog)?;

        let site = spine.site().with_child(name, blog.clone());
        let (root, root_id) = self.commit_site(spine, site)?;
        info!(site = %spine.site().name(), blog = name, root = %root_id.short_hex(), "blog added");
        Ok(self.finish(root, root_id, blog))
    }

    /// Append an empty post under the blog at the end of `spine`.
    pub fn add_post(mut self, spine: &BlogSpine<'_>, name: &str) -> TreeResult<Commit<PostNode>> {
        let mut post = PostNode::named(name)?;
        self.write(&mut post)?;

        let blog = spine.blog().with_child(name, post.clone());
        let (root, root_id) = self.commit_blog(spine, blog)?;
        info!(blog = %spine.blog().name(), post = name, root = %root_id.short_hex(), "post added");
        Ok(self.finish(root, root_id, post))
    }

    fn commit_post(&mut self, spine: &Spine<'_>, mut post: PostNode) -> TreeResult<(RootNode, ContentId)> {
        self.write(&mut post)?;
        let blog = spine.parent.blog().with_replaced(spine.post.index, post)?;
        self.commit_blog(&spine.parent, blog)
    }

    fn commit_blog(&mut self, spine: &BlogSpine<'_>, mut blog: BlogNode) -> TreeResult<(RootNode, ContentId)> {
        self.write(&mut blog)?;
        let site = spine.parent.site().with_replaced(spine.blog.index, blog)?;
        self.commit_site(&spine.parent, site)
    }

    fn commit_site(&mut self, spine: &SiteSpine<'_>, mut site: SiteNode) -> TreeResult<(RootNode, ContentId)> {
        self.write(&mut site)?;
        let root = spine.root.with_replaced(spine.site.index, site)?;
        self.commit_root(root)
    }

    fn commit_root(&mut self, mut root: RootNode) -> TreeResult<(RootNode, ContentId)> {
        let id = self.write(&mut root)?;
        Ok((root, id))
    }

    fn write<C: TreeChild>(&mut self, node: &mut C) -> TreeResult<ContentId> {
        let id = node.write(self.store)?;
        debug!(kind = %C::KIND, id = %id.short_hex(), "path copy");
        self.written.push(WrittenBlock { kind: C::KIND, id });
        Ok(id)
    }

    fn finish<N>(self, root: RootNode, root_id: ContentId, created: N) -> Commit<N> {
        Commit {
            root,
            root_id,
            created,
            written: self.written,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TreeError;
    use crate::loader::TreeLoader;
    use crate::path::{PathResolver, PostPath};
    use chrono::TimeZone;
    use proptest::prelude::*;
    use quill_store::{InMemoryContentStore, StoreError, StoreResult};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Counts puts and can be told to start failing.
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryContentStore,
        puts: AtomicUsize,
        fail_after: Option<usize>,
        failed: AtomicBool,
    }

    impl ContentStore for CountingStore {
        fn put(&self, data: &[u8]) -> StoreResult<ContentId> {
            let n = self.puts.fetch_add(1, Ordering::SeqCst);
            if self.fail_after.is_some_and(|limit| n >= limit) {
                self.failed.store(true, Ordering::SeqCst);
                return Err(StoreError::Unavailable("injected".into()));
            }
            self.inner.put(data)
        }

        fn get(&self, id: &ContentId) -> StoreResult<Vec<u8>> {
            self.inner.get(id)
        }

        fn contains(&self, id: &ContentId) -> StoreResult<bool> {
            self.inner.contains(id)
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_714_564_800 + secs, 0).unwrap()
    }

    fn note(author: &str, content: &str) -> NewComment {
        NewComment {
            author: author.into(),
            content: content.into(),
            reply_to: None,
        }
    }

    /// Two sites, two blogs each, two posts each.
    fn seed(store: &dyn ContentStore) -> RootNode {
        let mut root = RootNode::new("root");
        root.write(store).unwrap();
        for s in ["s1", "s2"] {
            root = PathCopyWriter::new(store).add_site(&root, s).unwrap().root;
            for b in ["b1", "b2"] {
                let site = PathResolver::find_site(&root, s).unwrap();
                root = PathCopyWriter::new(store).add_blog(&site, b).unwrap().root;
                for p in ["p1", "p2"] {
                    let blog = PathResolver::find_blog(&root, s, b).unwrap();
                    root = PathCopyWriter::new(store).add_post(&blog, p).unwrap().root;
                }
            }
        }
        root
    }

    fn post_id(root: &RootNode, path: &PostPath) -> ContentId {
        PathResolver::find(root, path)
            .unwrap()
            .post()
            .content_id()
            .unwrap()
    }

    #[test]
    fn add_comment_writes_exactly_the_spine() {
        let store = CountingStore::default();
        let root = seed(&store);
        let before = store.puts.load(Ordering::SeqCst);

        let path = PostPath::new("s1", "b1", "p1");
        let spine = PathResolver::find(&root, &path).unwrap();
        let commit = PathCopyWriter::new(&store)
            .add_comment(&spine, note("alice", "hello"), at(0))
            .unwrap();

        assert_eq!(store.puts.load(Ordering::SeqCst) - before, 5);
        let kinds: Vec<_> = commit.written.iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            [
                NodeKind::Comment,
                NodeKind::Post,
                NodeKind::Blog,
                NodeKind::Site,
                NodeKind::Root
            ]
        );
        assert_eq!(commit.written.last().map(|w| w.id), Some(commit.root_id));
        assert!(commit.created.is_written());
    }

    #[test]
    fn siblings_keep_their_ids() {
        let store = InMemoryContentStore::new();
        let root = seed(&store);
        let target = PostPath::new("s1", "b1", "p1");
        let untouched = [
            PostPath::new("s1", "b1", "p2"),
            PostPath::new("s1", "b2", "p1"),
            PostPath::new("s2", "b1", "p1"),
        ];
        let before: Vec<_> = untouched.iter().map(|p| post_id(&root, p)).collect();
        let s2_before = PathResolver::find_site(&root, "s2").unwrap().site().content_id();

        let spine = PathResolver::find(&root, &target).unwrap();
        let commit = PathCopyWriter::new(&store)
            .add_comment(&spine, note("alice", "hello"), at(0))
            .unwrap();

        let after: Vec<_> = untouched.iter().map(|p| post_id(&commit.root, p)).collect();
        assert_eq!(before, after);
        assert_eq!(
            PathResolver::find_site(&commit.root, "s2").unwrap().site().content_id(),
            s2_before
        );
        assert_ne!(post_id(&commit.root, &target), post_id(&root, &target));
        assert_ne!(Some(commit.root_id), root.content_id());
    }

    #[test]
    fn old_root_still_loads_unchanged() {
        let store = InMemoryContentStore::new();
        let root = seed(&store);
        let old_id = root.content_id().unwrap();
        let path = PostPath::new("s2", "b2", "p2");
        let spine = PathResolver::find(&root, &path).unwrap();
        PathCopyWriter::new(&store)
            .add_comment(&spine, note("bob", "later"), at(1))
            .unwrap();

        let reloaded = TreeLoader::new(&store).load(&old_id).unwrap();
        assert_eq!(reloaded, root);
        let post = PathResolver::find(&reloaded, &path).unwrap().post();
        assert!(post.is_empty());
    }

    #[test]
    fn committed_tree_matches_reload() {
        let store = InMemoryContentStore::new();
        let root = seed(&store);
        let spine = PathResolver::find(&root, &PostPath::new("s1", "b2", "p1")).unwrap();
        let commit = PathCopyWriter::new(&store)
            .add_comment(&spine, note("carol", "hey"), at(2))
            .unwrap();

        let reloaded = TreeLoader::new(&store).load(&commit.root_id).unwrap();
        assert_eq!(reloaded, commit.root);
    }

    #[test]
    fn comments_append_in_order() {
        let store = InMemoryContentStore::new();
        let mut root = seed(&store);
        let path = PostPath::new("s1", "b1", "p1");
        for (i, text) in ["first", "second", "third"].into_iter().enumerate() {
            let spine = PathResolver::find(&root, &path).unwrap();
            root = PathCopyWriter::new(&store)
                .add_comment(&spine, note("alice", text), at(i as i64))
                .unwrap()
                .root;
        }
        let post = PathResolver::find(&root, &path).unwrap().post();
        let contents: Vec<_> = post.children().map(|c| c.content()).collect();
        assert_eq!(contents, ["first", "second", "third"]);
    }

    #[test]
    fn same_history_same_root() {
        let a = InMemoryContentStore::new();
        let b = InMemoryContentStore::new();
        let path = PostPath::new("s2", "b1", "p2");

        let run = |store: &InMemoryContentStore| {
            let root = seed(store);
            let spine = PathResolver::find(&root, &path).unwrap();
            PathCopyWriter::new(store)
                .add_comment(&spine, note("dave", "same"), at(3))
                .unwrap()
                .root_id
        };
        assert_eq!(run(&a), run(&b));
    }

    #[test]
    fn invalid_comment_writes_nothing() {
        let store = CountingStore::default();
        let root = seed(&store);
        let before = store.puts.load(Ordering::SeqCst);
        let spine = PathResolver::find(&root, &PostPath::new("s1", "b1", "p1")).unwrap();

        let err = PathCopyWriter::new(&store)
            .add_comment(&spine, note("", "no author"), at(0))
            .unwrap_err();
        assert!(matches!(err, TreeError::BadRequest(_)));
        assert_eq!(store.puts.load(Ordering::SeqCst), before);
    }

    #[test]
    fn store_failure_mid_spine_surfaces() {
        let seeded = InMemoryContentStore::new();
        let root = seed(&seeded);
        // Same blocks, but only two more puts succeed.
        let store = CountingStore {
            fail_after: Some(2),
            ..CountingStore::default()
        };
        for id in seeded.ids() {
            store.inner.put(&seeded.get(&id).unwrap()).unwrap();
        }

        let spine = PathResolver::find(&root, &PostPath::new("s1", "b1", "p1")).unwrap();
        let err = PathCopyWriter::new(&store)
            .add_comment(&spine, note("alice", "doomed"), at(0))
            .unwrap_err();
        assert!(matches!(err, TreeError::StoreUnavailable(_)));
        assert!(store.failed.load(Ordering::SeqCst));
        // The input tree is untouched.
        assert!(PathResolver::find(&root, &PostPath::new("s1", "b1", "p1"))
            .unwrap()
            .post()
            .is_empty());
    }

    #[test]
    fn add_site_rejects_empty_name() {
        let store = InMemoryContentStore::new();
        let root = RootNode::new("root");
        let err = PathCopyWriter::new(&store).add_site(&root, "").unwrap_err();
        assert!(matches!(err, TreeError::BadRequest(_)));
    }

    #[test]
    fn rewritten_ancestor_drops_extra_keys() {
        use crate::record::{self, Link};
        use serde_json::{json, Value};

        let store = InMemoryContentStore::new();
        let post = store
            .put(&record::encode_branch(NodeKind::Post, "p1", &[]).unwrap())
            .unwrap();
        let blog_links = [Link {
            name: "p1".into(),
            target: post,
        }];
        let blog = store
            .put(&record::encode_branch(NodeKind::Blog, "b1", &blog_links).unwrap())
            .unwrap();
        let site_block = json!({
            "name": "s1",
            "blogs": [{ "b1": { "link": blog }, "name": "b1" }],
            "pages": ["keep-me"],
        });
        let site = store.put(&serde_json::to_vec(&site_block).unwrap()).unwrap();
        let root_links = [Link {
            name: "s1".into(),
            target: site,
        }];
        let root_id = store
            .put(&record::encode_branch(NodeKind::Root, "root", &root_links).unwrap())
            .unwrap();

        let root = TreeLoader::new(&store).load(&root_id).unwrap();
        let spine = PathResolver::find(&root, &PostPath::new("s1", "b1", "p1")).unwrap();
        let commit = PathCopyWriter::new(&store)
            .add_comment(&spine, note("alice", "hi"), at(0))
            .unwrap();

        let new_site = commit
            .written
            .iter()
            .find(|w| w.kind == NodeKind::Site)
            .unwrap()
            .id;
        let rewritten: Value = serde_json::from_slice(&store.get(&new_site).unwrap()).unwrap();
        assert_eq!(rewritten["name"], "s1");
        assert!(rewritten.get("pages").is_none());
        assert_eq!(rewritten["blogs"].as_array().unwrap().len(), 1);

        // The block the old root points at is untouched.
        let original: Value = serde_json::from_slice(&store.get(&site).unwrap()).unwrap();
        assert_eq!(original["pages"][0], "keep-me");
    }

    #[test]
    fn duplicate_names_append_and_first_wins() {
        let store = InMemoryContentStore::new();
        let mut root = RootNode::new("root");
        root.write(&store).unwrap();
        root = PathCopyWriter::new(&store).add_site(&root, "dup").unwrap().root;
        root = PathCopyWriter::new(&store).add_site(&root, "dup").unwrap().root;
        assert_eq!(root.len(), 2);
        assert_eq!(PathResolver::find_site(&root, "dup").unwrap().site.index, 0);
    }

    proptest! {
        #[test]
        fn random_comments_only_touch_their_path(
            ops in proptest::collection::vec((0usize..2, 0usize..2, 0usize..2, "[a-z]{1,8}"), 1..12)
        ) {
            let sites = ["s1", "s2"];
            let blogs = ["b1", "b2"];
            let posts = ["p1", "p2"];
            let mut all = Vec::new();
            for s in sites {
                for b in blogs {
                    for p in posts {
                        all.push(PostPath::new(s, b, p));
                    }
                }
            }
            let store = InMemoryContentStore::new();
            let mut root = seed(&store);

            for (i, (s, b, p, text)) in ops.iter().enumerate() {
                let target = PostPath::new(sites[*s], blogs[*b], posts[*p]);
                let others: Vec<&PostPath> = all.iter().filter(|path| **path != target).collect();
                let before: Vec<_> = others.iter().map(|p| post_id(&root, p)).collect();
                let count = PathResolver::find(&root, &target).unwrap().post().len();

                let spine = PathResolver::find(&root, &target).unwrap();
                let commit = PathCopyWriter::new(&store)
                    .add_comment(&spine, note("prop", text), at(i as i64))
                    .unwrap();
                root = commit.root;

                let after: Vec<_> = others.iter().map(|p| post_id(&root, p)).collect();
                prop_assert_eq!(before, after);
                prop_assert_eq!(PathResolver::find(&root, &target).unwrap().post().len(), count + 1);
            }

            let reloaded = TreeLoader::new(&store).load(&root.content_id().unwrap()).unwrap();
            prop_assert_eq!(reloaded, root);
        }
    }
}

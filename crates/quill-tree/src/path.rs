//! Locating nodes by name.
//!
//! Resolution returns a spine: the explicit chain of ancestors walked from
//! the root, each paired with the slot index it occupies in its parent.
//! Nodes carry no parent pointers; the spine is what
//! [`PathCopyWriter`](crate::writer::PathCopyWriter) climbs back up.

use std::fmt;
use std::str::FromStr;

use crate::error::{TreeError, TreeResult};
use crate::kind::NodeKind;
use crate::node::{BlogNode, BranchNode, Level, PostNode, RootNode, SiteNode, TreeChild};

/// A `site/blog/post` address.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PostPath {
    pub site: String,
    pub blog: String,
    pub post: String,
}

impl PostPath {
    pub fn new(site: impl Into<String>, blog: impl Into<String>, post: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            blog: blog.into(),
            post: post.into(),
        }
    }
}

impl fmt::Display for PostPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.site, self.blog, self.post)
    }
}

impl FromStr for PostPath {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.trim().split('/').collect();
        match segments.as_slice() {
            [site, blog, post] if !site.is_empty() && !blog.is_empty() && !post.is_empty() => {
                Ok(Self::new(*site, *blog, *post))
            }
            _ => Err(TreeError::BadRequest(format!(
                "expected site/blog/post, got {s:?}"
            ))),
        }
    }
}

/// One resolved hop: a node and its slot index in the parent.
#[derive(Debug)]
pub struct Step<'a, N> {
    pub index: usize,
    pub node: &'a N,
}

impl<N> Clone for Step<'_, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N> Copy for Step<'_, N> {}

/// Root → Site.
#[derive(Clone, Copy, Debug)]
pub struct SiteSpine<'a> {
    pub root: &'a RootNode,
    pub site: Step<'a, SiteNode>,
}

/// Root → Site → Blog.
#[derive(Clone, Copy, Debug)]
pub struct BlogSpine<'a> {
    pub parent: SiteSpine<'a>,
    pub blog: Step<'a, BlogNode>,
}

/// Root → Site → Blog → Post.
#[derive(Clone, Copy, Debug)]
pub struct Spine<'a> {
    pub parent: BlogSpine<'a>,
    pub post: Step<'a, PostNode>,
}

impl<'a> SiteSpine<'a> {
    pub fn site(&self) -> &'a SiteNode {
        self.site.node
    }
}

impl<'a> BlogSpine<'a> {
    pub fn blog(&self) -> &'a BlogNode {
        self.blog.node
    }

    pub fn root(&self) -> &'a RootNode {
        self.parent.root
    }
}

impl<'a> Spine<'a> {
    pub fn post(&self) -> &'a PostNode {
        self.post.node
    }

    pub fn root(&self) -> &'a RootNode {
        self.parent.root()
    }
}

/// Exact-name lookup over a hydrated tree.
///
/// Names match by byte equality. When siblings share a name the first one
/// in link order wins.
pub struct PathResolver;

impl PathResolver {
    pub fn find_site<'a>(root: &'a RootNode, site: &str) -> TreeResult<SiteSpine<'a>> {
        Ok(SiteSpine {
            root,
            site: step(root, site)?,
        })
    }

    pub fn find_blog<'a>(root: &'a RootNode, site: &str, blog: &str) -> TreeResult<BlogSpine<'a>> {
        let parent = Self::find_site(root, site)?;
        let blog = step(parent.site.node, blog)?;
        Ok(BlogSpine { parent, blog })
    }

    /// Resolve a full post path.
    pub fn find<'a>(root: &'a RootNode, path: &PostPath) -> TreeResult<Spine<'a>> {
        let parent = Self::find_blog(root, &path.site, &path.blog)?;
        let post = step(parent.blog.node, &path.post)?;
        Ok(Spine { parent, post })
    }
}

fn step<'a, L: Level>(
    parent: &'a BranchNode<L>,
    name: &str,
) -> TreeResult<Step<'a, L::Child>> {
    match parent.find_child(name) {
        Some((index, node)) => Ok(Step { index, node }),
        None => Err(TreeError::PathNotFound {
            kind: child_kind::<L>(),
            name: name.to_string(),
        }),
    }
}

fn child_kind<L: Level>() -> NodeKind {
    <L::Child as TreeChild>::KIND
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use quill_store::InMemoryContentStore;

    fn tree() -> RootNode {
        let store = InMemoryContentStore::new();
        let mut p1 = PostNode::new("p1");
        p1.write(&store).unwrap();
        let mut p2 = PostNode::new("p2");
        p2.write(&store).unwrap();
        let mut blog = BlogNode::new("b1").with_child("p1", p1).with_child("p2", p2);
        blog.write(&store).unwrap();
        let mut site = SiteNode::new("s1").with_child("b1", blog);
        site.write(&store).unwrap();
        let mut other = SiteNode::new("s2");
        other.write(&store).unwrap();
        RootNode::new("root")
            .with_child("s2", other)
            .with_child("s1", site)
    }

    #[test]
    fn parse_and_display() {
        let path: PostPath = "s1/b1/p1".parse().unwrap();
        assert_eq!(path, PostPath::new("s1", "b1", "p1"));
        assert_eq!(path.to_string(), "s1/b1/p1");
    }

    #[test]
    fn parse_rejects_wrong_shapes() {
        for bad in ["", "s1", "s1/b1", "s1/b1/p1/extra", "s1//p1", "/b1/p1"] {
            let err = bad.parse::<PostPath>().unwrap_err();
            assert_eq!(err.category(), ErrorCategory::BadRequest, "{bad:?}");
        }
    }

    #[test]
    fn find_returns_spine_with_indices() {
        let root = tree();
        let spine = PathResolver::find(&root, &PostPath::new("s1", "b1", "p2")).unwrap();
        assert_eq!(spine.parent.parent.site.index, 1);
        assert_eq!(spine.parent.blog.index, 0);
        assert_eq!(spine.post.index, 1);
        assert_eq!(spine.post().name(), "p2");
        assert!(std::ptr::eq(spine.root(), &root));
    }

    #[test]
    fn missing_segment_names_the_level() {
        let root = tree();
        let cases = [
            (PostPath::new("s9", "b1", "p1"), NodeKind::Site, "s9"),
            (PostPath::new("s1", "b9", "p1"), NodeKind::Blog, "b9"),
            (PostPath::new("s1", "b1", "p9"), NodeKind::Post, "p9"),
        ];
        for (path, kind, name) in cases {
            match PathResolver::find(&root, &path).unwrap_err() {
                TreeError::PathNotFound { kind: k, name: n } => {
                    assert_eq!(k, kind);
                    assert_eq!(n, name);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn names_are_case_sensitive() {
        let root = tree();
        assert!(PathResolver::find_site(&root, "S1").is_err());
    }

    #[test]
    fn find_blog_stops_at_blog() {
        let root = tree();
        let spine = PathResolver::find_blog(&root, "s1", "b1").unwrap();
        assert_eq!(spine.blog().len(), 2);
    }
}

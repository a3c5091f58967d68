use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of tree levels, from the root down to the leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Root,
    Site,
    Blog,
    Post,
    Comment,
}

impl NodeKind {
    /// All kinds, root first.
    pub const ALL: [NodeKind; 5] = [
        NodeKind::Root,
        NodeKind::Site,
        NodeKind::Blog,
        NodeKind::Post,
        NodeKind::Comment,
    ];

    /// The kind of this node's children, or `None` for the leaf.
    pub const fn child(self) -> Option<NodeKind> {
        match self {
            Self::Root => Some(Self::Site),
            Self::Site => Some(Self::Blog),
            Self::Blog => Some(Self::Post),
            Self::Post => Some(Self::Comment),
            Self::Comment => None,
        }
    }

    /// The kind of this node's parent, or `None` for the root.
    pub const fn parent(self) -> Option<NodeKind> {
        match self {
            Self::Root => None,
            Self::Site => Some(Self::Root),
            Self::Blog => Some(Self::Site),
            Self::Post => Some(Self::Blog),
            Self::Comment => Some(Self::Post),
        }
    }

    /// The key under which a block of this kind lists its child links.
    pub const fn collection_key(self) -> Option<&'static str> {
        match self {
            Self::Root => Some("sites"),
            Self::Site => Some("blogs"),
            Self::Blog => Some("posts"),
            Self::Post => Some("comments"),
            Self::Comment => None,
        }
    }

    /// Returns `true` for the leaf kind.
    pub const fn is_leaf(self) -> bool {
        matches!(self, Self::Comment)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Site => "site",
            Self::Blog => "blog",
            Self::Post => "post",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

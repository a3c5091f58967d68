//! Comment input and output shapes for callers above the tree.

use chrono::{DateTime, Utc};
use quill_types::ContentId;
use serde::{Deserialize, Serialize};

use crate::node::{CommentNode, PostNode};

/// A comment submitted by a caller.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub author: String,
    pub content: String,
    #[serde(default)]
    pub reply_to: Option<String>,
}

impl NewComment {
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
            reply_to: None,
        }
    }

    pub fn replying_to(mut self, display_id: impl Into<String>) -> Self {
        self.reply_to = Some(display_id.into());
        self
    }
}

/// A comment as returned to callers.
///
/// `id` is the display id. `content_id` is the block id and is present
/// for every comment read back from or written to the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: String,
    pub author: String,
    pub content: String,
    pub date_time: DateTime<Utc>,
    pub reply_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_id: Option<ContentId>,
}

impl From<&CommentNode> for CommentDto {
    fn from(node: &CommentNode) -> Self {
        Self {
            id: node.display_id().to_string(),
            author: node.author().to_string(),
            content: node.content().to_string(),
            date_time: node.date_time(),
            reply_to: node.reply_to().map(str::to_string),
            content_id: node.content_id(),
        }
    }
}

/// A post's comments, newest first.
///
/// The sort is stable, so comments with equal timestamps keep their link
/// order.
pub fn newest_first(post: &PostNode) -> Vec<CommentDto> {
    let mut out: Vec<CommentDto> = post.children().map(CommentDto::from).collect();
    out.sort_by(|a, b| b.date_time.cmp(&a.date_time));
    out
}

use crate::id::{PostId, TopicId, UserId};

/// Input envelope for one pipeline invocation.
///
/// Constructed per new/edited post and discarded after use. `content`
/// is the only field the pipeline ever replaces (the rewriter swaps in
/// a new value, it never edits in place).
#[derive(Clone, Debug)]
pub struct PostContext {
    pub post_id: PostId,
    pub topic_id: TopicId,
    pub author_id: UserId,
    pub content: String,
}

impl PostContext {
    pub fn new(
        post_id: PostId,
        topic_id: TopicId,
        author_id: UserId,
        content: impl Into<String>,
    ) -> Self {
        Self {
            post_id,
            topic_id,
            author_id,
            content: content.into(),
        }
    }
}

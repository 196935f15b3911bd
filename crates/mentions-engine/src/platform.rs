//! Collaborator contracts the engine depends on.
//!
//! The surrounding platform owns users, groups, topics, notification
//! delivery and email rendering; the engine only calls through these
//! narrow traits. Every async method reports transport failures as
//! [`BoxedError`] and leaves retry policy to the implementor.

use std::sync::Arc;

use async_trait::async_trait;
use mentions_core::id::{GroupName, PostId, Slug, TopicId, UserId};

use crate::error::BoxedError;

/// The user fields the notifier consumes.
#[derive(Clone, Debug)]
pub struct UserFields {
    pub username: String,
    /// Last-seen timestamp, milliseconds since the Unix epoch.
    pub last_online_ms: u64,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn exists(&self, slug: &Slug) -> Result<bool, BoxedError>;

    async fn uid_by_slug(&self, slug: &Slug) -> Result<Option<UserId>, BoxedError>;

    async fn user_fields(&self, uid: UserId) -> Result<UserFields, BoxedError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ListGroupsOpts {
    pub remove_ephemeral_groups: bool,
    pub truncate_user_list: bool,
}

#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn exists(&self, slug: &Slug) -> Result<bool, BoxedError>;

    async fn name_by_slug(&self, slug: &Slug) -> Result<Option<GroupName>, BoxedError>;

    async fn members(&self, group: &GroupName) -> Result<Vec<UserId>, BoxedError>;

    async fn list(&self, opts: ListGroupsOpts) -> Result<Vec<GroupName>, BoxedError>;
}

#[async_trait]
pub trait TopicStore: Send + Sync {
    async fn topic_title(&self, tid: TopicId) -> Result<String, BoxedError>;
}

/// What the engine asks the platform to record for a mention
/// notification. `nid` is a composite identity so that re-processing
/// the same post (e.g. on edit) updates the record instead of
/// duplicating it.
#[derive(Clone, Debug)]
pub struct NotificationSpec {
    pub body_short: String,
    pub body_long: String,
    pub nid: String,
    pub pid: PostId,
    pub tid: TopicId,
    pub from: UserId,
    pub importance: u8,
}

/// Opaque handle to a created notification record, handed back to
/// [`NotificationSink::push`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationId(pub String);

#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// `None` means the platform declined to create the record; the
    /// engine treats that as "nothing to push", not an error.
    async fn create(&self, spec: NotificationSpec) -> Result<Option<NotificationId>, BoxedError>;

    async fn push(&self, notification: &NotificationId, uids: &[UserId])
    -> Result<(), BoxedError>;
}

/// Template context for the mention email.
#[derive(Clone, Debug)]
pub struct EmailContext {
    pub pid: PostId,
    pub subject: String,
    pub intro: String,
    pub post_body: String,
    pub site_title: String,
    pub username: String,
    pub url: String,
    pub base_url: String,
    pub site_url: String,
    pub static_site_url: String,
}

#[async_trait]
pub trait Emailer: Send + Sync {
    async fn send(&self, template: &str, uid: UserId, ctx: &EmailContext)
    -> Result<(), BoxedError>;
}

/// The platform's slugification rule. Rendering and notification must
/// share this implementation, otherwise anchors produced upstream
/// would not round-trip through notify-mode extraction.
pub trait Slugify: Send + Sync {
    fn slugify(&self, raw: &str) -> Slug;
}

/// Bundle of collaborator handles the engine is constructed with.
#[derive(Clone)]
pub struct Platform {
    pub users: Arc<dyn UserStore>,
    pub groups: Arc<dyn GroupStore>,
    pub topics: Arc<dyn TopicStore>,
    pub notifications: Arc<dyn NotificationSink>,
    pub emailer: Arc<dyn Emailer>,
    pub slugify: Arc<dyn Slugify>,
}

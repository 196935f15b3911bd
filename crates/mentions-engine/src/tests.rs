use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mentions_core::id::{GroupName, PostId, Slug, TopicId, UserId};
use mentions_core::post::PostContext;

use crate::MentionsEngine;
use crate::cache::MembershipCache;
use crate::config::SiteConfig;
use crate::error::BoxedError;
use crate::platform::{
    EmailContext, Emailer, GroupStore, ListGroupsOpts, NotificationId, NotificationSink,
    NotificationSpec, Platform, Slugify, TopicStore, UserFields, UserStore,
};

fn test_config() -> SiteConfig {
    SiteConfig {
        url: "https://forum.example.com".to_owned(),
        display_url: None,
        site_url: "https://example.com".to_owned(),
        static_site_url: "https://static.example.com".to_owned(),
        relative_path: "/community".to_owned(),
        title: "Example Forum".to_owned(),
    }
}

#[derive(Default)]
struct FakePlatform {
    /// slug -> uid
    users: HashMap<String, u64>,
    /// uid -> (username, last_online_ms)
    fields: HashMap<u64, (String, u64)>,
    /// slug -> (group name, member uids)
    groups: HashMap<String, (String, Vec<u64>)>,
    group_list: Vec<String>,
    topic_title: String,
    fail_lookups: bool,

    members_calls: Mutex<usize>,
    created: Mutex<Vec<NotificationSpec>>,
    pushed: Mutex<Vec<(String, Vec<u64>)>>,
    emails: Mutex<Vec<(u64, String)>>,
}

impl FakePlatform {
    fn check_up(&self) -> Result<(), BoxedError> {
        if self.fail_lookups {
            return Err("store unavailable".into());
        }
        Ok(())
    }

    fn into_engine(self) -> (Arc<FakePlatform>, MentionsEngine) {
        let fake = Arc::new(self);
        let platform = Platform {
            users: fake.clone(),
            groups: fake.clone(),
            topics: fake.clone(),
            notifications: fake.clone(),
            emailer: fake.clone(),
            slugify: fake.clone(),
        };
        let engine = MentionsEngine::new(platform, test_config(), MembershipCache::default());
        (fake, engine)
    }
}

#[async_trait]
impl UserStore for FakePlatform {
    async fn exists(&self, slug: &Slug) -> Result<bool, BoxedError> {
        self.check_up()?;
        Ok(self.users.contains_key(slug.as_str()))
    }

    async fn uid_by_slug(&self, slug: &Slug) -> Result<Option<UserId>, BoxedError> {
        self.check_up()?;
        Ok(self.users.get(slug.as_str()).map(|&uid| UserId::new(uid)))
    }

    async fn user_fields(&self, uid: UserId) -> Result<UserFields, BoxedError> {
        self.check_up()?;
        self.fields
            .get(&uid.to_u64())
            .map(|(username, last_online_ms)| UserFields {
                username: username.clone(),
                last_online_ms: *last_online_ms,
            })
            .ok_or_else(|| BoxedError::from("no such user"))
    }
}

#[async_trait]
impl GroupStore for FakePlatform {
    async fn exists(&self, slug: &Slug) -> Result<bool, BoxedError> {
        self.check_up()?;
        Ok(self.groups.contains_key(slug.as_str()))
    }

    async fn name_by_slug(&self, slug: &Slug) -> Result<Option<GroupName>, BoxedError> {
        self.check_up()?;
        Ok(self
            .groups
            .get(slug.as_str())
            .map(|(name, _)| GroupName::new(name.clone())))
    }

    async fn members(&self, group: &GroupName) -> Result<Vec<UserId>, BoxedError> {
        self.check_up()?;
        *self.members_calls.lock().expect("lock") += 1;
        self.groups
            .values()
            .find(|(name, _)| name == group.as_str())
            .map(|(_, members)| members.iter().copied().map(UserId::new).collect())
            .ok_or_else(|| BoxedError::from("no such group"))
    }

    async fn list(&self, _opts: ListGroupsOpts) -> Result<Vec<GroupName>, BoxedError> {
        self.check_up()?;
        Ok(self.group_list.iter().cloned().map(GroupName::new).collect())
    }
}

#[async_trait]
impl TopicStore for FakePlatform {
    async fn topic_title(&self, _tid: TopicId) -> Result<String, BoxedError> {
        self.check_up()?;
        Ok(self.topic_title.clone())
    }
}

#[async_trait]
impl NotificationSink for FakePlatform {
    async fn create(&self, spec: NotificationSpec) -> Result<Option<NotificationId>, BoxedError> {
        let id = NotificationId(spec.nid.clone());
        self.created.lock().expect("lock").push(spec);
        Ok(Some(id))
    }

    async fn push(
        &self,
        notification: &NotificationId,
        uids: &[UserId],
    ) -> Result<(), BoxedError> {
        self.pushed.lock().expect("lock").push((
            notification.0.clone(),
            uids.iter().map(|uid| uid.to_u64()).collect(),
        ));
        Ok(())
    }
}

#[async_trait]
impl Emailer for FakePlatform {
    async fn send(
        &self,
        _template: &str,
        uid: UserId,
        ctx: &EmailContext,
    ) -> Result<(), BoxedError> {
        self.emails
            .lock()
            .expect("lock")
            .push((uid.to_u64(), ctx.subject.clone()));
        Ok(())
    }
}

impl Slugify for FakePlatform {
    fn slugify(&self, raw: &str) -> Slug {
        Slug::new(raw.to_lowercase().replace(' ', "-"))
    }
}

fn post(content: &str) -> PostContext {
    PostContext::new(
        PostId::new(100),
        TopicId::new(10),
        UserId::new(3),
        content,
    )
}

fn recent() -> u64 {
    crate::now_ms()
}

fn standard_fixture() -> FakePlatform {
    FakePlatform {
        users: HashMap::from([("alice".to_owned(), 1), ("carol".to_owned(), 3)]),
        fields: HashMap::from([
            (1, ("alice".to_owned(), recent())),
            (3, ("carol".to_owned(), recent())),
            (7, ("greg".to_owned(), recent())),
            // Dormant for longer than the email liveness window.
            (8, ("harriet".to_owned(), 1_000)),
        ]),
        groups: HashMap::from([(
            "moderators".to_owned(),
            ("Moderators".to_owned(), vec![7, 8]),
        )]),
        topic_title: "Release planning".to_owned(),
        ..Default::default()
    }
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn rewrite_links_users_and_groups() {
    let (_fake, engine) = standard_fixture().into_engine();

    let rewritten = engine
        .rewrite_content("Hello @alice and @unknown-user, check with @moderators")
        .await
        .expect("rewrite");

    assert_eq!(
        rewritten,
        "Hello <a class=\"mentions-link\" href=\"/community/user/alice\">@alice</a> \
         and @unknown-user, check with \
         <a class=\"mentions-link\" href=\"/community/groups/moderators\">@moderators</a>"
    );
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn rewrite_is_idempotent() {
    let (_fake, engine) = standard_fixture().into_engine();

    let once = engine
        .rewrite_content("Hello @alice!")
        .await
        .expect("rewrite");
    let twice = engine.rewrite_content(&once).await.expect("rewrite");

    assert_eq!(once, twice);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn rewrite_leaves_trailing_punctuation_outside_link() {
    let (_fake, engine) = standard_fixture().into_engine();

    let rewritten = engine.rewrite_content("Ping @alice.").await.expect("rewrite");

    assert_eq!(
        rewritten,
        "Ping <a class=\"mentions-link\" href=\"/community/user/alice\">@alice</a>."
    );
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn rewrite_ignores_mentions_in_code_spans() {
    let (_fake, engine) = standard_fixture().into_engine();

    let content = "see <code>@alice</code>";
    assert_eq!(
        engine.rewrite_content(content).await.expect("rewrite"),
        content
    );
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn rewrite_mutates_post_envelope_content_only() {
    let (_fake, engine) = standard_fixture().into_engine();

    let mut envelope = post("hey @alice");
    engine.rewrite_post(&mut envelope).await.expect("rewrite");

    assert!(envelope.content.contains("/community/user/alice"));
    assert_eq!(envelope.post_id, PostId::new(100));
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn rewrite_fails_closed_on_transport_error() {
    let mut fake = standard_fixture();
    fake.fail_lookups = true;
    let (_fake, engine) = fake.into_engine();

    assert!(engine.rewrite_content("hey @alice").await.is_err());
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn notify_fans_out_to_users_and_group_members() {
    let (fake, engine) = standard_fixture().into_engine();

    let rendered = "Hello <a href=\"/community/user/alice\">@alice</a> and @unknown-user, \
         check with <a href=\"/community/user/moderators\">@moderators</a>";
    engine.notify(&post(rendered)).await;

    let created = fake.created.lock().expect("lock");
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].nid, "tid:10:pid:100:uid:3");
    assert_eq!(created[0].importance, 6);
    assert!(created[0].body_short.contains("carol"));
    assert!(created[0].body_short.contains("Release planning"));

    let pushed = fake.pushed.lock().expect("lock");
    assert_eq!(pushed.len(), 1);
    let mut recipients = pushed[0].1.clone();
    recipients.sort_unstable();
    assert_eq!(recipients, vec![1, 7, 8]);

    // Only recipients seen online within the liveness window get an
    // email; harriet (8) is dormant.
    let mut emailed: Vec<u64> = fake
        .emails
        .lock()
        .expect("lock")
        .iter()
        .map(|(uid, _)| *uid)
        .collect();
    emailed.sort_unstable();
    assert_eq!(emailed, vec![1, 7]);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn notify_excludes_author_and_ephemeral_groups() {
    let mut fake = standard_fixture();
    fake.groups.insert(
        "registered-users".to_owned(),
        ("registered-users".to_owned(), vec![50, 51]),
    );
    let (fake, engine) = fake.into_engine();

    // The author mentions themselves and an implicit audience group.
    let rendered = "cc <a href=\"/community/user/carol\">@carol</a> \
         <a href=\"/community/user/registered-users\">@registered-users</a>";
    engine.notify(&post(rendered)).await;

    assert!(fake.created.lock().expect("lock").is_empty());
    assert!(fake.pushed.lock().expect("lock").is_empty());
    assert!(fake.emails.lock().expect("lock").is_empty());
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn notify_user_match_wins_over_group_match() {
    let mut fake = standard_fixture();
    fake.users.insert("ops".to_owned(), 5);
    fake.fields.insert(5, ("ops".to_owned(), recent()));
    fake.groups
        .insert("ops".to_owned(), ("Ops".to_owned(), vec![40, 41]));
    let (fake, engine) = fake.into_engine();

    engine
        .notify(&post("ping <a href=\"/community/user/ops\">@ops</a>"))
        .await;

    let pushed = fake.pushed.lock().expect("lock");
    assert_eq!(pushed.len(), 1);
    assert_eq!(pushed[0].1, vec![5]);
    // Group expansion never ran for the slug that matched a user.
    assert_eq!(*fake.members_calls.lock().expect("lock"), 0);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn notify_skips_mentions_in_blockquotes() {
    let (fake, engine) = standard_fixture().into_engine();

    let rendered = "> quoted <a href=\"/community/user/alice\">@alice</a>\nfresh text";
    engine.notify(&post(rendered)).await;

    assert!(fake.created.lock().expect("lock").is_empty());
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn notify_drops_tokens_without_rendered_anchor() {
    let (fake, engine) = standard_fixture().into_engine();

    engine.notify(&post("hello @alice, no anchor here")).await;

    assert!(fake.created.lock().expect("lock").is_empty());
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn notify_swallows_transport_failures() {
    let mut fake = standard_fixture();
    fake.fail_lookups = true;
    let (fake, engine) = fake.into_engine();

    engine
        .notify(&post("hi <a href=\"/community/user/alice\">@alice</a>"))
        .await;

    assert!(fake.created.lock().expect("lock").is_empty());
    assert!(fake.emails.lock().expect("lock").is_empty());
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn notify_reuses_cached_group_membership() {
    let (fake, engine) = standard_fixture().into_engine();

    let rendered = "cc <a href=\"/community/user/moderators\">@moderators</a>";
    engine.notify(&post(rendered)).await;
    engine.notify(&post(rendered)).await;

    assert_eq!(*fake.members_calls.lock().expect("lock"), 1);
    assert_eq!(fake.pushed.lock().expect("lock").len(), 2);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn membership_cache_expires_after_window() {
    let cache = MembershipCache::default();
    let group = GroupName::new("Moderators");
    cache
        .put(group.clone(), vec![UserId::new(7), UserId::new(8)], 0)
        .await;

    assert!(cache.get(&group, 599_999).await.is_some());
    assert!(cache.get(&group, 600_000).await.is_some());
    assert!(cache.get(&group, 600_001).await.is_none());
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn list_assignable_groups_degrades_to_empty_on_failure() {
    let mut fake = standard_fixture();
    fake.group_list = vec!["Moderators".to_owned(), "Staff".to_owned()];
    let (_fake, engine) = fake.into_engine();

    let listed = engine.list_assignable_groups().await;
    assert_eq!(
        listed,
        vec![GroupName::new("Moderators"), GroupName::new("Staff")]
    );

    let mut fake = standard_fixture();
    fake.fail_lookups = true;
    let (_fake, engine) = fake.into_engine();
    assert!(engine.list_assignable_groups().await.is_empty());
}

//! Notification fan-out for mentioned users and groups.

use futures::future;
use mentions_core::clean::clean;
use mentions_core::extract::extract_notify_slugs;
use mentions_core::id::{Slug, UserId};
use mentions_core::post::PostContext;
use snafu::ResultExt as _;
use tracing::debug;

use crate::error::{DeliverSnafu, LookupSnafu, NotifyError, NotifyResult};
use crate::fmt::ErrorChain;
use crate::platform::{EmailContext, NotificationSpec};
use crate::resolve::NO_MENTION_GROUPS;
use crate::{LOG_TARGET, MentionsEngine, now_ms};

/// Importance level distinguishing mention notifications from other
/// notification types.
const MENTION_IMPORTANCE: u8 = 6;

/// Only users seen online within this trailing window get an email.
const EMAIL_RECENT_WINDOW_MS: u64 = 5 * 86_400_000;

impl MentionsEngine {
    /// Notify everyone the post mentions, in-app and by email.
    ///
    /// Best-effort and fire-and-forget: a resolution failure abandons
    /// the whole pass (no partial or duplicate notification) and is
    /// logged, never surfaced to the author.
    pub async fn notify(&self, post: &PostContext) {
        if let Err(err) = self.notify_inner(post).await {
            debug!(
                target: LOG_TARGET,
                post_id = %post.post_id,
                err = %ErrorChain(&err),
                "Skipping mention notification"
            );
        }
    }

    async fn notify_inner(&self, post: &PostContext) -> NotifyResult<()> {
        let cleaned = clean(&post.content, true, true, true);
        let slugs: Vec<Slug> = extract_notify_slugs(&cleaned, &self.config.relative_path)
            .into_iter()
            .filter(|slug| !NO_MENTION_GROUPS.contains(&slug.as_str()))
            .collect();
        if slugs.is_empty() {
            return Ok(());
        }

        let resolution = self.resolve(&slugs).await?;

        let (title, author, recipients) = tokio::try_join!(
            async {
                self.platform
                    .topics
                    .topic_title(post.topic_id)
                    .await
                    .context(LookupSnafu)
            },
            async {
                self.platform
                    .users
                    .user_fields(post.author_id)
                    .await
                    .context(LookupSnafu)
            },
            async {
                self.expand_recipients(&resolution, post.author_id)
                    .await
                    .map_err(NotifyError::from)
            },
        )?;
        if recipients.is_empty() {
            return Ok(());
        }

        // Independent side effects; neither blocks or rolls back the
        // other.
        let (pushed, ()) = tokio::join!(
            self.push_notification(post, &author.username, &title, &recipients),
            self.send_emails(post, &author.username, &title, &recipients),
        );
        if let Err(err) = pushed {
            debug!(
                target: LOG_TARGET,
                post_id = %post.post_id,
                err = %ErrorChain(&err),
                "Failed to record mention notification"
            );
        }
        Ok(())
    }

    async fn push_notification(
        &self,
        post: &PostContext,
        author_name: &str,
        title: &str,
        recipients: &[UserId],
    ) -> NotifyResult<()> {
        let spec = NotificationSpec {
            body_short: format!("[[notifications:user_mentioned_you_in, {author_name}, {title}]]"),
            body_long: post.content.clone(),
            nid: format!(
                "tid:{}:pid:{}:uid:{}",
                post.topic_id, post.post_id, post.author_id
            ),
            pid: post.post_id,
            tid: post.topic_id,
            from: post.author_id,
            importance: MENTION_IMPORTANCE,
        };

        let Some(notification) = self
            .platform
            .notifications
            .create(spec)
            .await
            .context(DeliverSnafu)?
        else {
            return Ok(());
        };
        self.platform
            .notifications
            .push(&notification, recipients)
            .await
            .context(DeliverSnafu)
    }

    /// Email each recipient that was online within the liveness
    /// window. Sends are concurrent and unordered; one recipient's
    /// failure never blocks another's.
    async fn send_emails(
        &self,
        post: &PostContext,
        author_name: &str,
        title: &str,
        recipients: &[UserId],
    ) {
        let now = now_ms();

        future::join_all(recipients.iter().map(|&uid| async move {
            let fields = match self.platform.users.user_fields(uid).await {
                Ok(fields) => fields,
                Err(err) => {
                    debug!(
                        target: LOG_TARGET,
                        %uid,
                        err = %ErrorChain(err.as_ref()),
                        "Failed to load user fields for mention email"
                    );
                    return;
                }
            };
            if fields.last_online_ms + EMAIL_RECENT_WINDOW_MS < now {
                // Dormant account, skip the email.
                return;
            }

            let ctx = EmailContext {
                pid: post.post_id,
                subject: format!("{author_name} mentioned you in \"{title}\""),
                intro: format!(
                    "[[notifications:user_mentioned_you_in, {author_name}, {title}]]"
                ),
                post_body: post.content.clone(),
                site_title: self.config.title.clone(),
                username: fields.username,
                url: format!("{}/topic/{}", self.config.base_url(), post.topic_id),
                base_url: self.config.base_url().to_owned(),
                site_url: self.config.site_url.clone(),
                static_site_url: self.config.static_site_url.clone(),
            };
            if let Err(err) = self.platform.emailer.send("notif_mention", uid, &ctx).await {
                debug!(
                    target: LOG_TARGET,
                    %uid,
                    err = %ErrorChain(err.as_ref()),
                    "Failed to send mention email"
                );
            }
        }))
        .await;
    }
}

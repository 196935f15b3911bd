//! Mention resolution and notification pipeline.
//!
//! On each new or edited post the surrounding platform calls one (or
//! both) of the two entry points:
//!
//! - [`MentionsEngine::rewrite_content`] / [`MentionsEngine::rewrite_post`]
//!   replace resolved `@name` tokens with profile/group links;
//! - [`MentionsEngine::notify`] fans a mention notification and
//!   per-recipient emails out to everyone the post addresses.
//!
//! Data flows one way: raw content is sanitized, candidate tokens are
//! extracted and resolved against the user and group stores, and the
//! rewriter and notifier consume the resolution independently. All
//! platform lookups go through the collaborator traits in
//! [`platform`]; group membership lookups are bounded by the
//! time-based [`cache::MembershipCache`].

pub mod cache;
pub mod config;
pub mod error;
mod fmt;
mod notify;
pub mod platform;
pub mod resolve;
mod rewrite;

#[cfg(test)]
mod tests;

use std::time::{SystemTime, UNIX_EPOCH};

use mentions_core::id::GroupName;
use tracing::debug;

use crate::cache::MembershipCache;
use crate::config::SiteConfig;
use crate::fmt::ErrorChain;
use crate::platform::{ListGroupsOpts, Platform};

pub(crate) const LOG_TARGET: &str = "mentions::engine";

/// Milliseconds since the Unix epoch; the clock the membership cache
/// and the email liveness gate run on.
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as u64)
}

/// One engine per process, shared by reference across posts. The
/// membership cache is the only mutable state; two posts can be
/// processed concurrently without further coordination.
pub struct MentionsEngine {
    pub(crate) platform: Platform,
    pub(crate) config: SiteConfig,
    pub(crate) membership_cache: MembershipCache,
}

impl MentionsEngine {
    pub fn new(platform: Platform, config: SiteConfig, membership_cache: MembershipCache) -> Self {
        Self {
            platform,
            config,
            membership_cache,
        }
    }

    /// Group names offered to the mention-autocomplete widget.
    ///
    /// Ephemeral groups are excluded and member-list detail truncated
    /// by the store; any failure degrades to an empty list rather than
    /// surfacing an error to the widget.
    pub async fn list_assignable_groups(&self) -> Vec<GroupName> {
        let opts = ListGroupsOpts {
            remove_ephemeral_groups: true,
            truncate_user_list: true,
        };
        match self.platform.groups.list(opts).await {
            Ok(groups) => groups,
            Err(err) => {
                debug!(
                    target: LOG_TARGET,
                    err = %ErrorChain(err.as_ref()),
                    "Failed to list assignable groups"
                );
                Vec::new()
            }
        }
    }
}

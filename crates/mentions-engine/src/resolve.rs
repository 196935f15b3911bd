//! Slug resolution against the user and group namespaces.

use std::collections::HashMap;

use futures::future;
use itertools::Itertools as _;
use mentions_core::id::{GroupName, Slug, UserId};
use snafu::ResultExt as _;

use crate::error::{BoxedError, ResolveResult, TransportSnafu};
use crate::{MentionsEngine, now_ms};

/// Implicit/ephemeral audiences. They may resolve as groups but are
/// never expanded into notification recipients.
pub const NO_MENTION_GROUPS: &[&str] = &["registered-users", "guests"];

/// Outcome of resolving a slug set. A slug absent from both maps
/// matched nothing; downstream consumers silently skip it.
#[derive(Debug, Default)]
pub struct Resolution {
    pub users: HashMap<Slug, UserId>,
    pub groups: HashMap<Slug, GroupName>,
}

impl MentionsEngine {
    /// Resolve each slug to a user or a group.
    ///
    /// The two existence predicates run concurrently over the whole
    /// slug set; a slug that exists in both namespaces resolves as a
    /// user only, so group expansion never runs for a token that is
    /// itself a username. Any lookup failure abandons the whole
    /// resolution.
    pub async fn resolve(&self, slugs: &[Slug]) -> ResolveResult<Resolution> {
        let users = self.platform.users.as_ref();
        let groups = self.platform.groups.as_ref();

        let (user_hits, group_hits) = tokio::try_join!(
            future::try_join_all(slugs.iter().map(|slug| async move {
                Ok::<_, BoxedError>((slug, users.exists(slug).await?))
            })),
            future::try_join_all(slugs.iter().map(|slug| async move {
                Ok::<_, BoxedError>((slug, groups.exists(slug).await?))
            })),
        )
        .context(TransportSnafu)?;

        let user_slugs: Vec<&Slug> = user_hits
            .into_iter()
            .filter_map(|(slug, hit)| hit.then_some(slug))
            .collect();
        let group_slugs: Vec<&Slug> = group_hits
            .into_iter()
            .filter_map(|(slug, hit)| hit.then_some(slug))
            .filter(|slug| !user_slugs.contains(slug))
            .collect();

        let (uids, names) = tokio::try_join!(
            future::try_join_all(user_slugs.iter().map(|&slug| async move {
                Ok::<_, BoxedError>((slug, users.uid_by_slug(slug).await?))
            })),
            future::try_join_all(group_slugs.iter().map(|&slug| async move {
                Ok::<_, BoxedError>((slug, groups.name_by_slug(slug).await?))
            })),
        )
        .context(TransportSnafu)?;

        Ok(Resolution {
            users: uids
                .into_iter()
                .filter_map(|(slug, uid)| Some((slug.clone(), uid?)))
                .collect(),
            groups: names
                .into_iter()
                .filter_map(|(slug, name)| Some((slug.clone(), name?)))
                .collect(),
        })
    }

    /// Union of directly mentioned users and the membership of every
    /// mentioned group, deduplicated, minus the author.
    ///
    /// Membership fetches run concurrently, each going through the
    /// time-bounded cache first.
    pub async fn expand_recipients(
        &self,
        resolution: &Resolution,
        author: UserId,
    ) -> ResolveResult<Vec<UserId>> {
        let groups = self.platform.groups.as_ref();
        let cache = &self.membership_cache;

        let memberships = future::try_join_all(
            resolution
                .groups
                .values()
                .filter(|name| !NO_MENTION_GROUPS.contains(&name.as_str()))
                .map(|name| async move {
                    if let Some(members) = cache.get(name, now_ms()).await {
                        return Ok(members);
                    }
                    let members = groups.members(name).await?;
                    cache.put(name.clone(), members.clone(), now_ms()).await;
                    Ok::<_, BoxedError>(members)
                }),
        )
        .await
        .context(TransportSnafu)?;

        Ok(resolution
            .users
            .values()
            .copied()
            .chain(memberships.into_iter().flatten())
            .filter(|&uid| uid != author)
            .unique()
            .collect())
    }
}

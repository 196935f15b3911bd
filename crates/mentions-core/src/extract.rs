//! Mention candidate extraction.
//!
//! Two modes, matching the two pipeline consumers:
//!
//! - *link mode* slugifies each token directly and feeds the rewriter;
//! - *notify mode* cross-references tokens against anchors the
//!   platform's renderer already emitted, so notification reuses the
//!   renderer's slug instead of re-deriving it.

use std::collections::HashSet;

use regex::Regex;

use crate::id::Slug;
use crate::token::{MENTION_RE, MentionToken};

/// A deduplicated mention candidate: the literal token (for rewriting)
/// and the slug it resolves under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub token: MentionToken,
    pub slug: Slug,
}

/// Scan `text` for mention tokens and slugify each one's body with the
/// platform rule.
///
/// Candidates are deduplicated by slug; the first occurrence's order is
/// preserved for the rewriter, which applies replacements in scan
/// order.
pub fn extract_link_candidates(text: &str, slugify: impl Fn(&str) -> Slug) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for found in MENTION_RE.find_iter(text) {
        let token = MentionToken::new(found.as_str());
        if token.body().is_empty() {
            continue;
        }
        let slug = slugify(token.body());
        if seen.insert(slug.clone()) {
            candidates.push(Candidate { token, slug });
        }
    }

    candidates
}

/// Scan `text` for mention tokens and recover, for each one, the slug
/// an already-rendered profile anchor assigned to it.
///
/// The anchor shape is `<a href="{relative_path}/user/SLUG">TOKEN</a>`.
/// A token with no such anchor was not rendered as a mention link and
/// is dropped; its mention is not actionable. Duplicates (by slug) are
/// discarded, first occurrence order preserved.
pub fn extract_notify_slugs(text: &str, relative_path: &str) -> Vec<Slug> {
    let mut seen = HashSet::new();
    let mut slugs = Vec::new();

    for found in MENTION_RE.find_iter(text) {
        let token = MentionToken::new(found.as_str());
        if token.body().is_empty() {
            continue;
        }
        let anchor_re = Regex::new(&format!(
            r#"<a href="{}/user/([^"]*)">{}</a>"#,
            regex::escape(relative_path),
            regex::escape(token.as_str()),
        ))
        .expect("valid regex");

        let Some(captures) = anchor_re.captures(text) else {
            continue;
        };
        let slug = Slug::new(&captures[1]);
        if seen.insert(slug.clone()) {
            slugs.push(slug);
        }
    }

    slugs
}

//! Content rewriting: resolved `@name` tokens become profile or group
//! links.

use futures::future;
use mentions_core::clean::clean;
use mentions_core::extract::extract_link_candidates;
use mentions_core::post::PostContext;
use regex::{Captures, Regex};
use snafu::ResultExt as _;

use crate::MentionsEngine;
use crate::error::{BoxedError, RewriteResult, TransportSnafu};

impl MentionsEngine {
    /// Rewrite a bare content string, returning the annotated copy.
    pub async fn rewrite_content(&self, content: &str) -> RewriteResult<String> {
        self.rewrite(content).await
    }

    /// Rewrite a post envelope in place (`content` is the only field
    /// touched).
    pub async fn rewrite_post(&self, post: &mut PostContext) -> RewriteResult<()> {
        post.content = self.rewrite(&post.content).await?;
        Ok(())
    }

    /// Shared rewrite routine.
    ///
    /// Candidates come from the content with code spans stripped, so a
    /// mention inside a code sample is never linked; replacements are
    /// applied to the original content. Any resolution failure leaves
    /// the content entirely un-annotated rather than partially linked.
    async fn rewrite(&self, content: &str) -> RewriteResult<String> {
        if content.is_empty() {
            return Ok(content.to_owned());
        }

        let cleaned = clean(content, false, false, true);
        let candidates =
            extract_link_candidates(&cleaned, |body| self.platform.slugify.slugify(body));
        if candidates.is_empty() {
            return Ok(content.to_owned());
        }

        let users = self.platform.users.as_ref();
        let groups = self.platform.groups.as_ref();
        let resolved = future::try_join_all(candidates.iter().map(|candidate| async move {
            let (uid, group_exists) = tokio::try_join!(
                users.uid_by_slug(&candidate.slug),
                groups.exists(&candidate.slug),
            )?;
            Ok::<_, BoxedError>((candidate, uid, group_exists))
        }))
        .await
        .context(TransportSnafu)?;

        let mut out = content.to_owned();
        for (candidate, uid, group_exists) in resolved {
            // User resolution wins over group resolution.
            let href = if uid.is_some() {
                format!("{}/user/{}", self.config.relative_path, candidate.slug)
            } else if group_exists {
                format!("{}/groups/{}", self.config.relative_path, candidate.slug)
            } else {
                continue;
            };
            out = link_token(&out, candidate.token.as_str(), candidate.token.is_latin(), &href);
        }
        Ok(out)
    }
}

/// Replace every free-standing occurrence of `token` with an anchor to
/// `href`.
///
/// Latin tokens get a trailing word-boundary assertion so a token that
/// is a prefix of a longer identifier is left alone; word boundaries
/// are undefined for non-ASCII letters, so other tokens match bare.
/// Existing anchor elements are matched and passed through unchanged,
/// which keeps the rewrite idempotent: a token already wrapped in a
/// link is never wrapped again.
fn link_token(content: &str, token: &str, is_latin: bool, href: &str) -> String {
    let escaped = regex::escape(token);
    let pattern = if is_latin {
        format!(r"<a\b[^>]*>.*?</a>|{escaped}\b")
    } else {
        format!(r"<a\b[^>]*>.*?</a>|{escaped}")
    };
    let re = Regex::new(&pattern).expect("valid regex");

    re.replace_all(content, |caps: &Captures<'_>| {
        let matched = &caps[0];
        if matched.starts_with("<a") {
            matched.to_owned()
        } else {
            format!(r#"<a class="mentions-link" href="{href}">{matched}</a>"#)
        }
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::link_token;

    #[test]
    fn latin_token_respects_word_boundary() {
        let out = link_token("hi @bob and @bobby", "@bob", true, "/u/bob");
        assert_eq!(
            out,
            r#"hi <a class="mentions-link" href="/u/bob">@bob</a> and @bobby"#
        );
    }

    #[test]
    fn existing_anchor_is_not_rewrapped() {
        let input = r#"<a class="mentions-link" href="/u/bob">@bob</a>"#;
        assert_eq!(link_token(input, "@bob", true, "/u/bob"), input);
    }

    #[test]
    fn replacement_is_global() {
        let out = link_token("@ann, meet @ann", "@ann", true, "/u/ann");
        assert_eq!(out.matches("<a ").count(), 2);
    }
}

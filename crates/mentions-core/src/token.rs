//! The mention token grammar.

use std::sync::LazyLock;

use regex::Regex;

/// Token grammar: `@` followed by one or more of Unicode letter, digit,
/// hyphen, underscore, dot. Unicode letters are required since
/// usernames may be non-Latin.
pub static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@[\p{L}\d\-_.]+").expect("valid regex"));

static LATIN_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@[A-Za-z0-9\-_.]+$").expect("valid regex"));

/// Drop a trailing run of `!?.` characters; sentence punctuation after
/// a mention is never part of the token.
pub fn trim_punctuation_suffix(raw: &str) -> &str {
    raw.trim_end_matches(['!', '?', '.'])
}

/// A literal `@identifier` substring extracted from content, with any
/// trailing punctuation run already trimmed.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct MentionToken(String);

impl MentionToken {
    pub fn new(raw: &str) -> Self {
        Self(trim_punctuation_suffix(raw).to_owned())
    }

    /// The token including its leading `@`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier part, without the leading `@`.
    pub fn body(&self) -> &str {
        self.0.strip_prefix('@').unwrap_or(&self.0)
    }

    /// Whether the token consists solely of ASCII word characters (plus
    /// hyphen and dot). Word-boundary assertions are only well defined
    /// for these; rewriting appends `\b` to latin tokens and matches
    /// the rest bare.
    pub fn is_latin(&self) -> bool {
        LATIN_TOKEN_RE.is_match(&self.0)
    }
}

impl std::fmt::Display for MentionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

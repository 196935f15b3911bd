//! Sanitizer that strips quoted and code regions before mention
//! matching, so mentions inside them are never extracted.

use std::sync::LazyLock;

use regex::Regex;

static BLOCKQUOTE_MD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^>.*$").expect("valid regex"));
static BLOCKQUOTE_HTML_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^<blockquote>.*</blockquote>").expect("valid regex"));
static CODE_MD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`[^`\n]+`").expect("valid regex"));
static CODE_HTML_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<code>.*</code>").expect("valid regex"));

/// Strip blockquote and inline-code regions from `input`.
///
/// `is_markdown` selects the markup flavor: markdown mode strips `>`
/// lines and backtick spans, rendered-HTML mode strips single-line
/// `<blockquote>` and `<code>` elements. Blockquotes are removed
/// before code spans. Unmatched or malformed markup is left alone;
/// this is best-effort region removal, not a parser.
pub fn clean(input: &str, is_markdown: bool, strip_blockquote: bool, strip_code: bool) -> String {
    let bq_re = if is_markdown {
        &*BLOCKQUOTE_MD_RE
    } else {
        &*BLOCKQUOTE_HTML_RE
    };
    let code_re = if is_markdown {
        &*CODE_MD_RE
    } else {
        &*CODE_HTML_RE
    };

    let mut out = input.to_owned();
    if strip_blockquote {
        out = bq_re.replace_all(&out, "").into_owned();
    }
    if strip_code {
        out = code_re.replace_all(&out, "").into_owned();
    }
    out
}

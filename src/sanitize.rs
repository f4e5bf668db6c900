//! Inbound message sanitization and markdown-to-HTML formatting.
//!
//! Bot replies arrive as a mix of markdown-flavored text and fragments of
//! already-rendered HTML (anchors, <strong>, <em>, <code>). This module turns
//! one such string into a single safe HTML string without re-escaping or
//! double-wrapping content that is already valid markup. Every anchor in the
//! output carries `target="_blank"`, `rel="noopener noreferrer"` and the
//! `chat-link` class, regardless of where it came from.

use once_cell::sync::Lazy;
use regex::{Captures, NoExpand, Regex};

/// Placeholder delimiter. Control characters cannot appear in rendered chat
/// text, so tokens built from them cannot collide with real content.
const PLACEHOLDER_MARK: char = '\u{1}';

static BROKEN_ANCHOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(<a href=")?(https?://[^\s"<>]+)"\s*target="_blank"[^>]*?class="chat-link">([^<\s]*)(</a>)?"#,
    )
    .unwrap()
});

static HAS_MARKUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<a\b|<strong\b|<em\b").unwrap());

static ANCHOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<a\b[^>]*>.*?</a>").unwrap());

/// Inline formatting elements that must survive the markdown passes intact.
/// One pattern per tag: the regex crate has no backreferences, so matching
/// open/close pairs generically is not an option.
static INLINE_TAG_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    ["strong", "em", "code", "b", "i"]
        .iter()
        .map(|tag| Regex::new(&format!(r"(?s)<{tag}\b[^>]*>.*?</{tag}>")).unwrap())
        .collect()
});

static BOLD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^\n]+?)\*\*").unwrap());
// Content may not contain '*', so a '**' delimiter is never half-consumed.
static ITALIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*\n]+)\*").unwrap());
static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`\n]+)`").unwrap());
static MD_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]\n]+)\]\(([^)\s]+)\)").unwrap());
// A quote or '>' before the URL means it sits inside an attribute value or is
// the visible text of an existing anchor; autolinking there would nest links.
static BARE_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(^|[^">])(https?://[^\s<]+)"#).unwrap());
static WWW_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(^|[^"'>/\w.])(www\.[^\s<]+)"#).unwrap());

static ANCHOR_OPEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<a\b([^>]*)>").unwrap());
static CLASS_ATTR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"class="([^"]*)""#).unwrap());

/// Request-scoped mapping from placeholder tokens to the original protected
/// fragments. Insertion order is preserved so restoration is unambiguous.
struct ProtectedSpans {
    spans: Vec<(String, String)>,
}

impl ProtectedSpans {
    fn new() -> Self {
        Self { spans: Vec::new() }
    }

    /// Replace every match of `re` in `text` with a fresh placeholder token,
    /// recording the original fragment for later restoration.
    fn extract(&mut self, text: &str, re: &Regex) -> String {
        re.replace_all(text, |caps: &Captures| {
            let token = format!(
                "{}FMT{}{}",
                PLACEHOLDER_MARK,
                self.spans.len(),
                PLACEHOLDER_MARK
            );
            self.spans.push((token.clone(), caps[0].to_string()));
            token
        })
        .into_owned()
    }

    /// Reinject every protected fragment at its placeholder token.
    fn restore(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (token, fragment) in &self.spans {
            out = out.replace(token, fragment);
        }
        out
    }
}

/// Convert a bot reply into safe, uniformly-attributed HTML.
///
/// Never fails: on unexpected shapes the result is the best-effort partially
/// converted string rather than an error.
pub fn format_bot_html(input: &str) -> String {
    let repaired = repair_broken_anchors(input);

    if HAS_MARKUP_RE.is_match(&repaired) {
        format_mixed_html(&repaired)
    } else {
        format_plain_text(&repaired)
    }
}

/// Entity-escape the five reserved HTML characters. Used verbatim for user
/// turns: user input is never interpreted as markup.
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Repair the known double-processing malformation where an href value is
/// immediately followed by a stray duplicated raw URL and a truncated
/// `target=...class="chat-link">` fragment. Well-formed anchors that happen
/// to match the pattern are rewritten to an identical clean anchor.
fn repair_broken_anchors(text: &str) -> String {
    BROKEN_ANCHOR_RE
        .replace_all(text, |caps: &Captures| {
            let url = caps[2].to_string();
            let has_open = caps.get(1).is_some();
            let has_close = caps.get(4).is_some();
            if has_open && !has_close {
                // An intact anchor whose label contains nested markup; the
                // pattern cannot see its closing tag, so leave it alone.
                return caps[0].to_string();
            }
            let label = caps
                .get(3)
                .map(|m| m.as_str().trim())
                .filter(|s| has_open && !s.is_empty())
                .unwrap_or(&url);
            format!(
                r#"<a href="{url}" target="_blank" rel="noopener noreferrer" class="chat-link">{label}</a>"#
            )
        })
        .into_owned()
}

/// HTML-preserving path: protect existing markup behind placeholder tokens,
/// run the markdown passes over the remainder, then put the markup back.
fn format_mixed_html(text: &str) -> String {
    let mut protected = ProtectedSpans::new();
    let mut out = protected.extract(text, &ANCHOR_RE);
    for re in INLINE_TAG_RES.iter() {
        out = protected.extract(&out, re);
    }
    let out = apply_markdown(&out);
    let out = protected.restore(&out);
    normalize_anchors(&out)
}

/// Plain path: no recognized markup. Anchors are still extracted before
/// entity escaping so attribute quoting survives, per the repair pass having
/// possibly produced one.
fn format_plain_text(text: &str) -> String {
    let mut protected = ProtectedSpans::new();
    let out = protected.extract(text, &ANCHOR_RE);
    let out = escape_html(&out);
    let out = apply_markdown(&out);
    let out = protected.restore(&out);
    normalize_anchors(&out)
}

/// The ordered markdown conversions shared by both paths.
fn apply_markdown(text: &str) -> String {
    let out = BOLD_RE.replace_all(text, "<strong>${1}</strong>");
    // Mask any leftover unmatched '**' so a star belonging to a bold
    // delimiter can never be paired up as an italic delimiter.
    let double_star_token = format!("{}AST{}", PLACEHOLDER_MARK, PLACEHOLDER_MARK);
    let out = out.replace("**", &double_star_token);
    let out = ITALIC_RE.replace_all(&out, "<em>${1}</em>");
    let out = out.replace(&double_star_token, "**");
    let out = CODE_RE.replace_all(&out, "<code>${1}</code>");
    let out = MD_LINK_RE.replace_all(
        &out,
        r#"<a href="${2}" target="_blank" rel="noopener noreferrer" class="chat-link">${1}</a>"#,
    );
    let out = BARE_URL_RE.replace_all(
        &out,
        r#"${1}<a href="${2}" target="_blank" rel="noopener noreferrer" class="chat-link">${2}</a>"#,
    );
    let out = WWW_URL_RE.replace_all(
        &out,
        r#"${1}<a href="http://${2}" target="_blank" rel="noopener noreferrer" class="chat-link">${2}</a>"#,
    );
    out.replace('\n', "<br>")
}

/// Ensure every anchor tag carries the chat-link class, target and rel
/// attributes, whether it came from upstream HTML or from autolinking.
/// Idempotent: attributes already present are never duplicated.
fn normalize_anchors(html: &str) -> String {
    ANCHOR_OPEN_RE
        .replace_all(html, |caps: &Captures| {
            let mut attrs = caps[1].trim_end().to_string();
            if !attrs.contains("target=") {
                attrs.push_str(r#" target="_blank""#);
            }
            if !attrs.contains("rel=") {
                attrs.push_str(r#" rel="noopener noreferrer""#);
            }
            match CLASS_ATTR_RE.captures(&attrs) {
                Some(class_caps) => {
                    if !class_caps[1].split_whitespace().any(|c| c == "chat-link") {
                        let merged = format!(r#"class="{} chat-link""#, &class_caps[1]);
                        attrs = CLASS_ATTR_RE
                            .replace(&attrs, NoExpand(&merged))
                            .into_owned();
                    }
                }
                None => attrs.push_str(r#" class="chat-link""#),
            }
            format!("<a{}>", attrs)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINK_ATTRS: &str = r#"target="_blank" rel="noopener noreferrer" class="chat-link""#;

    #[test]
    fn test_bold_and_autolink() {
        let out = format_bot_html("Check **this** out: https://example.com");
        assert!(out.contains("<strong>this</strong>"), "got: {}", out);
        assert!(
            out.contains(&format!(r#"<a href="https://example.com" {}>"#, LINK_ATTRS)),
            "got: {}",
            out
        );
    }

    #[test]
    fn test_markdown_link() {
        let out = format_bot_html("Visit [our site](https://site.io) today");
        assert!(
            out.contains(&format!(
                r#"<a href="https://site.io" {}>our site</a>"#,
                LINK_ATTRS
            )),
            "got: {}",
            out
        );
    }

    #[test]
    fn test_repairs_malformed_anchor() {
        let input = r#"https://a.co" target="_blank" rel="noopener noreferrer" class="chat-link">https://a.co"#;
        let out = format_bot_html(input);
        assert_eq!(
            out,
            format!(r#"<a href="https://a.co" {}>https://a.co</a>"#, LINK_ATTRS)
        );
    }

    #[test]
    fn test_repair_runs_before_markdown_elsewhere() {
        let input = r#"See https://a.co" target="_blank" class="chat-link">https://a.co and **bold** text"#;
        let out = format_bot_html(input);
        assert!(out.contains(r#"<a href="https://a.co""#), "got: {}", out);
        assert!(out.contains("<strong>bold</strong>"), "got: {}", out);
        // Exactly one anchor: the stray duplicate URL was folded in.
        assert_eq!(out.matches("<a ").count(), 1, "got: {}", out);
    }

    #[test]
    fn test_escape_html_user_input() {
        let out = escape_html("<script>alert(1)</script>");
        assert_eq!(out, "&lt;script&gt;alert(1)&lt;/script&gt;");
        assert_eq!(escape_html(r#"a & b " c ' d"#), "a &amp; b &quot; c &#39; d");
    }

    #[test]
    fn test_italic_does_not_eat_bold() {
        let out = format_bot_html("**bold** and *italic*");
        assert!(out.contains("<strong>bold</strong>"), "got: {}", out);
        assert!(out.contains("<em>italic</em>"), "got: {}", out);
    }

    #[test]
    fn test_unmatched_asterisks_untouched() {
        let out = format_bot_html("a * b and 2 ** 3");
        assert!(!out.contains("<em>"), "got: {}", out);
        assert!(!out.contains("<strong>"), "got: {}", out);
        assert!(out.contains("a * b"), "got: {}", out);
    }

    #[test]
    fn test_inline_code_and_newlines() {
        let out = format_bot_html("run `cargo build`\nthen wait");
        assert!(out.contains("<code>cargo build</code>"), "got: {}", out);
        assert!(out.contains("<br>then wait"), "got: {}", out);
    }

    #[test]
    fn test_www_autolink_gains_scheme() {
        let out = format_bot_html("see www.example.org for more");
        assert!(
            out.contains(&format!(
                r#"<a href="http://www.example.org" {}>www.example.org</a>"#,
                LINK_ATTRS
            )),
            "got: {}",
            out
        );
    }

    #[test]
    fn test_idempotent_on_sanitized_output() {
        let once = format_bot_html("Check **this** out: https://example.com and [site](https://site.io)");
        let twice = format_bot_html(&once);
        assert_eq!(once, twice);
        // No duplicated attributes or nested anchors.
        assert_eq!(
            twice.matches("chat-link").count(),
            twice.matches("<a ").count()
        );
        assert!(!twice.contains("<a href=\"<a"), "got: {}", twice);
    }

    #[test]
    fn test_existing_markup_not_double_wrapped() {
        let input = r#"Already <strong>bold</strong> with <a href="https://x.dev">x</a> and **new** text"#;
        let out = format_bot_html(input);
        assert_eq!(out.matches("<strong>").count(), 2, "got: {}", out);
        assert!(out.contains("<strong>new</strong>"), "got: {}", out);
        // The pre-existing anchor was normalized, not rebuilt.
        assert!(
            out.contains(&format!(r#"<a href="https://x.dev" {}>x</a>"#, LINK_ATTRS)),
            "got: {}",
            out
        );
    }

    #[test]
    fn test_no_autolink_inside_anchor_text() {
        let input = r#"<a href="https://x.dev">https://x.dev</a>"#;
        let out = format_bot_html(input);
        assert_eq!(out.matches("<a ").count(), 1, "got: {}", out);
    }

    #[test]
    fn test_class_attribute_appended_not_replaced() {
        let input = r#"<a href="https://x.dev" class="external">x</a> plus text"#;
        let out = format_bot_html(input);
        assert!(out.contains(r#"class="external chat-link""#), "got: {}", out);
        assert!(out.contains(r#"target="_blank""#), "got: {}", out);
        assert!(out.contains(r#"rel="noopener noreferrer""#), "got: {}", out);
    }

    #[test]
    fn test_plain_text_entities_escaped() {
        let out = format_bot_html("5 < 10 & 10 > 5");
        assert!(out.contains("5 &lt; 10 &amp; 10 &gt; 5"), "got: {}", out);
    }

    #[test]
    fn test_placeholder_tokens_never_leak() {
        let inputs = [
            "plain text",
            "**bold** https://a.co",
            r#"<a href="https://x.dev">x</a> <em>e</em> <code>c</code>"#,
        ];
        for input in inputs {
            let out = format_bot_html(input);
            assert!(!out.contains('\u{1}'), "leaked placeholder in: {}", out);
        }
    }

    #[test]
    fn test_never_panics_on_odd_shapes() {
        for input in [
            "",
            "<a href=\"",
            "<strong>unclosed",
            "]()[",
            "`` ``",
            "***",
            "https://",
        ] {
            let _ = format_bot_html(input);
        }
    }
}

//! Tweet text to HTML: links for URLs, @mentions and #hashtags

use regex::{Captures, Regex};
use std::sync::LazyLock;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\b(?:https?://|www\.)[^\s<>"]+"#).unwrap());
static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\s[^>]*>.*?</a>").unwrap());
static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@([0-9a-zA-Z+_]+)").unwrap());
static HASHTAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#([0-9a-zA-Z+_]+)").unwrap());

const USERNAME_LINK: &str = r#"<a href="http://twitter.com/${1}">@${1}</a>"#;
const HASHTAG_LINK: &str = r#"<a href="http://twitter.com/search?q=%23${1}">#${1}</a>"#;

/// Punctuation that ends a sentence rather than a URL
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ':', ';', '!', '?', ')'];

/// First char that can't be stored by the feed's display widgets
const HIGH_MULTIBYTE_START: u32 = 0x800;

/// Render raw status text the way it is stored.
pub fn render_text(raw: &str, strip_high_multibyte: bool) -> String {
    let text = urlize(raw);
    let text = replace_outside_anchors(&text, &USERNAME_RE, USERNAME_LINK);
    let text = replace_outside_anchors(&text, &HASHTAG_RE, HASHTAG_LINK);
    if strip_high_multibyte {
        strip_high_multibyte_chars(&text)
    } else {
        text
    }
}

/// Wrap bare `http(s)://` and `www.` URLs in anchors.
pub fn urlize(text: &str) -> String {
    URL_RE
        .replace_all(text, |caps: &Captures| {
            let matched = &caps[0];
            let url = matched.trim_end_matches(TRAILING_PUNCTUATION);
            let trailing = &matched[url.len()..];
            let href = if url.len() >= 4 && url[..4].eq_ignore_ascii_case("www.") {
                format!("http://{}", url)
            } else {
                url.to_string()
            };
            format!("<a href=\"{}\">{}</a>{}", href, url, trailing)
        })
        .into_owned()
}

/// Apply `re` to the text between anchors only, so links already in the
/// text are never rewritten.
fn replace_outside_anchors(text: &str, re: &Regex, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for anchor in ANCHOR_RE.find_iter(text) {
        out.push_str(&re.replace_all(&text[last..anchor.start()], replacement));
        out.push_str(anchor.as_str());
        last = anchor.end();
    }
    out.push_str(&re.replace_all(&text[last..], replacement));
    out
}

pub fn strip_high_multibyte_chars(text: &str) -> String {
    text.chars()
        .filter(|c| (*c as u32) < HIGH_MULTIBYTE_START)
        .collect()
}

// Raw-text cleanup applied before tokenization.
//
// Social posts arrive with HTML entities from the harvesting APIs, links,
// @mentions and emoji. None of those carry topic signal, and links in
// particular explode into junk tokens ("https", "co", random slugs).

use std::sync::LazyLock;

use regex_lite::Regex;

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(https?://|www\.)\S+").expect("URL pattern is valid"));

static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@[A-Za-z0-9_]+").expect("mention pattern is valid"));

/// HTML entities the harvesting APIs leave in post bodies. `&amp;` goes last
/// so that "&amp;lt;" decodes to "&lt;" rather than "<".
const HTML_ENTITIES: [(&str, &str); 5] = [
    ("&#39;", "'"),
    ("&quot;", "\""),
    ("&gt;", ">"),
    ("&lt;", "<"),
    ("&amp;", "&"),
];

/// Decode the handful of HTML entities found in API responses.
/// Tags like `<p>` are left alone.
pub fn html_decode(text: &str) -> String {
    HTML_ENTITIES
        .iter()
        .fold(text.to_string(), |acc, (code, plain)| acc.replace(code, plain))
}

/// Strip links, mentions and emoji, then lowercase.
pub fn clean_text(text: &str) -> String {
    let decoded = html_decode(text);
    let no_urls = URL.replace_all(&decoded, " ");
    let no_mentions = MENTION.replace_all(&no_urls, " ");
    let no_emoji: String = no_mentions.chars().filter(|c| !is_emoji(*c)).collect();
    no_emoji.to_lowercase().replace(": ", " ")
}

/// Rough emoji test over the main pictographic blocks.
fn is_emoji(c: char) -> bool {
    matches!(c as u32,
        0x1F000..=0x1FAFF   // mahjong through symbols & pictographs ext-A
        | 0x2600..=0x27BF   // misc symbols, dingbats
        | 0x2B00..=0x2BFF   // arrows, stars
        | 0xFE00..=0xFE0F   // variation selectors
        | 0x200D            // zero width joiner
    )
}

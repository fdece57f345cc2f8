use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern"));
static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));
static IMG_SRC_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img[^>]+src=['"](https?://[^'"]+)['"]"#).expect("img pattern")
});
static SLUG_INVALID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9\s-]").expect("slug pattern"));
static DASH_RUN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("dash pattern"));

pub const WORDS_PER_MINUTE: usize = 200;
pub const EXCERPT_MAX_CHARS: usize = 160;

/// Tags kept when rendering post bodies that arrive from a remote CMS.
const BODY_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "b", "strong", "i", "em", "p", "br",
    "a", "ul", "ol", "li", "blockquote", "cite", "code", "pre", "hr", "img", "table",
    "thead", "tbody", "tr", "th", "td", "s", "del", "figure", "figcaption", "span", "div",
];

const BODY_ATTRIBUTES: &[&str] = &["src", "href", "alt", "title", "class", "width", "height", "align"];

/// Cleans remote post HTML down to a safe subset. Scripts, event handlers and
/// inline styles never survive.
pub fn sanitize_body_html(html: &str) -> String {
    ammonia::Builder::new()
        .tags(BODY_TAGS.iter().copied().collect::<HashSet<_>>())
        .generic_attributes(BODY_ATTRIBUTES.iter().copied().collect::<HashSet<_>>())
        .link_rel(Some("nofollow ugc"))
        .clean(html)
        .to_string()
}

/// Strips all HTML tags from input (for titles) and decodes what ammonia re-escaped.
pub fn strip_all_html(input: &str) -> String {
    let cleaned = ammonia::Builder::new()
        .tags(HashSet::new())
        .clean(input)
        .to_string();
    clean_text(&cleaned)
}

/// Decodes HTML entities (`&amp;`, `&#8217;`, ...) and trims.
pub fn clean_text(text: &str) -> String {
    html_escape::decode_html_entities(text).trim().to_string()
}

/// Markup-free text of an HTML fragment: tags become spaces, entities are decoded,
/// whitespace runs collapse to one space.
pub fn plain_text(html: &str) -> String {
    let without_tags = TAG_REGEX.replace_all(html, " ");
    let decoded = html_escape::decode_html_entities(&without_tags);
    WHITESPACE_REGEX.replace_all(&decoded, " ").trim().to_string()
}

/// WordPress excerpts end with a `[&hellip;]` marker; swap it for a plain ellipsis.
pub fn clean_excerpt(excerpt_html: &str) -> String {
    let marker_free = excerpt_html.replace("[&hellip;]", "...");
    plain_text(&marker_free).replace("[\u{2026}]", "...")
}

/// Builds an excerpt from body HTML, cut at a word boundary.
pub fn create_excerpt(content_html: &str, max_chars: usize) -> String {
    let text = plain_text(content_html);
    if text.chars().count() <= max_chars {
        return text;
    }

    let truncated: String = text.chars().take(max_chars).collect();
    let cut = match truncated.rfind(' ') {
        Some(last_space) if last_space > 0 => &truncated[..last_space],
        _ => truncated.as_str(),
    };
    format!("{}...", cut)
}

pub fn count_words(html: &str) -> usize {
    plain_text(html).split(' ').filter(|word| !word.is_empty()).count()
}

/// Minutes needed to read a body at ~200 words per minute; never below one.
pub fn estimated_reading_minutes(html: &str) -> u32 {
    let words = count_words(html);
    let minutes = words.div_ceil(WORDS_PER_MINUTE);
    u32::try_from(minutes.max(1)).unwrap_or(u32::MAX)
}

/// First absolute image URL referenced by an `<img>` tag.
pub fn extract_featured_image(content_html: &str) -> Option<String> {
    IMG_SRC_REGEX
        .captures(content_html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let kept = SLUG_INVALID_REGEX.replace_all(&lowered, "");
    let dashed = WHITESPACE_REGEX.replace_all(kept.trim(), "-");
    DASH_RUN_REGEX.replace_all(&dashed, "-").trim_matches('-').to_string()
}

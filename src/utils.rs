use regex::Regex;
use std::sync::OnceLock;
use url::Url;

fn heading_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<h([23])[^>]*>(.*?)</h[23]>").unwrap())
}

fn h1_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<h1[^>]*>.*?</h1>").unwrap())
}

fn anchor_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<a\s[^>]*href\s*=\s*"([^"]*)"[^>]*>(.*?)</a>"#).unwrap()
    })
}

/// An H2/H3 heading found in an HTML fragment, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    /// Byte offset just past the closing tag, where side content can be spliced.
    pub end: usize,
}

/// Scan an HTML fragment for H2/H3 headings in document order.
pub fn find_headings(html: &str) -> Vec<Heading> {
    heading_regex()
        .captures_iter(html)
        .map(|caps| {
            let whole = caps.get(0).unwrap();
            Heading {
                level: caps[1].parse().unwrap_or(2),
                text: strip_tags(&caps[2]).trim().to_string(),
                end: whole.end(),
            }
        })
        .collect()
}

/// Remove any H1 blocks; the post title is added by a downstream consumer.
pub fn strip_h1(html: &str) -> String {
    h1_regex().replace_all(html, "").into_owned()
}

/// Strip a leading/trailing markdown code-fence wrapper if present.
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let mut lines: Vec<&str> = trimmed.lines().collect();
    if let Some(first) = lines.first() {
        if first.trim_start().starts_with("```") {
            lines.remove(0);
        }
    }
    if let Some(last) = lines.last() {
        if last.trim_start().starts_with("```") {
            lines.pop();
        }
    }
    lines.join("\n").trim().to_string()
}

/// Drop inner markup from a heading capture so only the text remains.
fn strip_tags(html: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").unwrap());
    re.replace_all(html, "").into_owned()
}

/// Escape text for embedding in HTML element content or attribute values.
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Take the first `max_chars` characters, safe on multi-byte boundaries.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}

fn extract_host(url_str: &str) -> Option<String> {
    Url::parse(url_str)
        .ok()
        .and_then(|url| url.host_str().map(|h| h.to_string()))
}

/// Whether an href points at the client's own site (relative path or same host).
fn is_internal_href(href: &str, website_host: Option<&str>) -> bool {
    if href.starts_with('/') || href.starts_with('#') {
        return true;
    }
    match (extract_host(href), website_host) {
        (Some(host), Some(site)) => host == site,
        (None, _) => !href.contains("://"),
        _ => false,
    }
}

/// Unwrap internal anchors whose href is not in the sitemap pool, keeping
/// their inner text. External links are left alone. Returns the cleaned
/// fragment and the number of anchors unwrapped.
pub fn sanitize_internal_links(
    html: &str,
    website_url: &str,
    sitemap_urls: &[String],
) -> (String, usize) {
    let website_host = extract_host(website_url);
    let mut removed = 0;
    let cleaned = anchor_regex()
        .replace_all(html, |caps: &regex::Captures<'_>| {
            let href = &caps[1];
            let inner = &caps[2];
            if is_internal_href(href, website_host.as_deref())
                && !sitemap_urls.iter().any(|u| u == href)
            {
                removed += 1;
                inner.to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned();
    (cleaned, removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_headings_in_order() {
        let html = "<h2>First</h2><p>x</p><h3 class=\"a\">Second</h3><h2><em>Third</em></h2>";
        let headings = find_headings(html);
        assert_eq!(headings.len(), 3);
        assert_eq!(headings[0].text, "First");
        assert_eq!(headings[0].level, 2);
        assert_eq!(headings[1].text, "Second");
        assert_eq!(headings[1].level, 3);
        assert_eq!(headings[2].text, "Third");
        assert_eq!(&html[..headings[0].end], "<h2>First</h2>");
    }

    #[test]
    fn strips_h1_blocks() {
        let html = "<h1>Title</h1><h2>Keep</h2>";
        let cleaned = strip_h1(html);
        assert!(!cleaned.contains("<h1>"));
        assert!(cleaned.contains("<h2>Keep</h2>"));
    }

    #[test]
    fn strips_code_fence_wrapper() {
        let fenced = "```html\n<p>hello</p>\n```";
        assert_eq!(strip_code_fences(fenced), "<p>hello</p>");
        assert_eq!(strip_code_fences("<p>plain</p>"), "<p>plain</p>");
    }

    #[test]
    fn escapes_html_special_characters() {
        assert_eq!(html_escape("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn excerpt_is_char_boundary_safe() {
        let text = "héllo wörld";
        assert_eq!(excerpt(text, 4), "héll");
        assert_eq!(excerpt("short", 100), "short");
    }

    #[test]
    fn unwraps_internal_links_outside_the_pool() {
        let sitemap = vec!["https://client.com/services".to_string()];
        let html = concat!(
            "<a href=\"https://client.com/services\">ok</a> ",
            "<a href=\"https://client.com/rogue\">bad</a> ",
            "<a href=\"https://authority.org/study\">external</a>"
        );
        let (cleaned, removed) = sanitize_internal_links(html, "https://client.com", &sitemap);
        assert_eq!(removed, 1);
        assert!(cleaned.contains("<a href=\"https://client.com/services\">ok</a>"));
        assert!(!cleaned.contains("client.com/rogue"));
        assert!(cleaned.contains("bad"));
        assert!(cleaned.contains("<a href=\"https://authority.org/study\">external</a>"));
    }

    #[test]
    fn relative_hrefs_count_as_internal() {
        let (cleaned, removed) = sanitize_internal_links(
            "<a href=\"/about\">about</a>",
            "https://client.com",
            &[],
        );
        assert_eq!(removed, 1);
        assert_eq!(cleaned, "about");
    }
}

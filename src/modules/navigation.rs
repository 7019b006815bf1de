// Pure URL display helpers - no network access.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use url::{Host, Url};

// Leading labels that carry no meaning for a tile title.
const MEANINGLESS_PREFIXES: &[&str] = &["www", "m", "mobile"];

// Second-level labels that form a public suffix with a country code, e.g. "co.uk".
const SECOND_LEVEL_SUFFIXES: &[&str] = &["co", "com", "org", "net", "ac", "gov", "edu", "ne", "or"];

/// Short, human readable name for a URL, e.g. `https://en.wikipedia.org/wiki/Rust` -> `wikipedia`.
///
/// IP addresses and single-label hosts are returned unchanged.
/// Input that does not parse as a URL is returned trimmed.
pub fn short_display_string(input: &str) -> String {
    let trimmed = input.trim();
    let Ok(url) = Url::parse(trimmed) else {
        return trimmed.to_string();
    };

    let host = match url.host() {
        Some(Host::Domain(domain)) => domain.to_lowercase(),
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => {
            return url.host_str().unwrap_or(trimmed).to_string();
        }
        None => return trimmed.to_string(),
    };

    let mut labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    while labels.len() > 2 && MEANINGLESS_PREFIXES.contains(&labels[0]) {
        labels.remove(0);
    }

    if labels.len() < 2 {
        return labels.first().map(|l| l.to_string()).unwrap_or(host);
    }

    let last = labels[labels.len() - 1];
    let second_last = labels[labels.len() - 2];
    let suffix_len = if labels.len() >= 3 && last.len() == 2 && SECOND_LEVEL_SUFFIXES.contains(&second_last) {
        2
    } else {
        1
    };

    labels[..labels.len() - suffix_len]
        .last()
        .map(|l| l.to_string())
        .unwrap_or(host)
}

/// Conventional favicon location for a web page (`<origin>/favicon.ico`).
/// Returns None for non-web schemes.
pub fn default_favicon_url(page_url: &str) -> Option<Url> {
    let url = Url::parse(page_url.trim()).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.join("/favicon.ico").ok()
}

// A whole <meta ...> tag; quoted values may contain '>'
static META_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)<meta\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).unwrap());

// One name=value attribute, the name preceded by whitespace or '/'
static META_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)[\s/]([a-z_:][-a-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#).unwrap()
});

/// Pull the `content` of the first `og:image` meta tag out of an HTML document.
///
/// The tag must carry `property` (or `name`) equal to `og:image`; structured
/// variants such as `og:image:width` do not count.
pub fn find_og_image(html: &str) -> Option<String> {
    META_TAG.find_iter(html).find_map(|tag| {
        let attributes = meta_attributes(&tag.as_str()["<meta".len()..]);
        let is_og_image = ["property", "name"].iter().any(|key| {
            attributes
                .get(*key)
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("og:image"))
        });
        if !is_og_image {
            return None;
        }

        attributes
            .get("content")
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
    })
}

/// Attributes of a tag body keyed by lower-cased name. The first occurrence wins.
fn meta_attributes(body: &str) -> HashMap<String, String> {
    let mut attributes = HashMap::new();
    for caps in META_ATTRIBUTE.captures_iter(body) {
        let value = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4)).map_or("", |m| m.as_str());
        attributes
            .entry(caps[1].to_ascii_lowercase())
            .or_insert_with(|| value.to_string());
    }
    attributes
}

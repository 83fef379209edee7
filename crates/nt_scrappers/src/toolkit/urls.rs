use kuchikiki::NodeRef;
use url::Url;

use super::dom;

/// Attributes holding a single media URL, rewritten on every body.
const MEDIA_ATTRIBUTES: &[(&str, &str)] = &[
    ("img", "src"),
    ("img", "data-src"),
    ("source", "src"),
    ("video", "src"),
    ("video", "poster"),
    ("audio", "src"),
    ("iframe", "src"),
    ("embed", "src"),
    ("object", "data"),
];

/// Schemes left untouched by [`to_absolute`]. Anything else before a `:`
/// (`Tribune:-la-crise`, `localhost:8080/x`) is a relative path.
const KNOWN_SCHEMES: &[&str] = &["http", "https", "mailto", "tel", "data", "javascript", "ftp"];

pub fn has_scheme(url: &str) -> bool {
    Url::parse(url).is_ok_and(|parsed| KNOWN_SCHEMES.contains(&parsed.scheme()))
}

/// Resolves `url` against `base_url`. URLs that already carry a known scheme
/// are returned untouched, so the function is idempotent. `//host/path` is
/// protocol-relative and gets `https:`. Otherwise every leading slash is
/// dropped and the rest is appended to the base.
pub fn to_absolute(url: &str, base_url: &str) -> String {
    let url = url.trim();
    if url.is_empty() || has_scheme(url) {
        return url.to_string();
    }
    let protocol_relative = url
        .strip_prefix("//")
        .filter(|host| !host.is_empty() && !host.starts_with('/'));
    if let Some(rest) = protocol_relative {
        return format!("https://{rest}");
    }

    let path = url.trim_start_matches('/');
    if base_url.ends_with('/') {
        format!("{base_url}{path}")
    } else {
        format!("{base_url}/{path}")
    }
}

/// Absolutizes one attribute of `node` if it is present and non-blank.
pub fn rewrite_attribute(node: &NodeRef, attr: &str, base_url: &str) -> bool {
    match dom::attr_non_blank(node, attr) {
        Some(value) => {
            dom::set_attr(node, attr, to_absolute(&value, base_url));
            true
        }
        None => false,
    }
}

/// Rewrites every candidate of a `srcset` value, keeping descriptors and
/// order: `"a.jpg 1x, /b.jpg 2x"` becomes `"{base}a.jpg 1x, {base}b.jpg 2x"`.
pub fn rewrite_src_set_value(src_set: &str, base_url: &str) -> String {
    src_set
        .split(',')
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
        .map(|candidate| {
            let mut parts = candidate.split_whitespace();
            let url = parts.next().unwrap_or_default();
            let descriptors: Vec<&str> = parts.collect();
            let absolute = to_absolute(url, base_url);
            if descriptors.is_empty() {
                absolute
            } else {
                format!("{} {}", absolute, descriptors.join(" "))
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn rewrite_src_set(node: &NodeRef, base_url: &str) {
    for attr in ["srcset", "data-srcset"] {
        if let Some(value) = dom::attr_non_blank(node, attr) {
            dom::set_attr(node, attr, rewrite_src_set_value(&value, base_url));
        }
    }
}

/// First URL of a `srcset` value, if any.
pub fn first_src_set_url(src_set: &str) -> Option<String> {
    src_set
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
        .map(str::to_string)
        .next()
}

pub fn force_https(html: &str) -> String {
    html.replace("http://", "https://")
}

pub fn escape_hashtag(html: &str) -> String {
    html.replace('#', "%23")
}

/// Absolutizes media sources and responsive image sets under `root`.
pub fn rewrite_media(root: &NodeRef, base_url: &str) {
    for (tag, attr) in MEDIA_ATTRIBUTES {
        for node in dom::get_all(root, tag) {
            rewrite_attribute(&node, attr, base_url);
        }
    }
    for tag in ["img", "source"] {
        for node in dom::get_all(root, tag) {
            rewrite_src_set(&node, base_url);
        }
    }
}

/// Anchor clean-up applied to every body: empty local anchors lose their
/// `href`, inline click handlers are dropped, other links are absolutized.
/// Embedded PDFs are removed from the tree.
pub fn correct_links(root: &NodeRef, base_url: &str) {
    for anchor in dom::get_all(root, "a") {
        dom::remove_attr(&anchor, "onclick");
        match dom::attr(&anchor, "href").as_deref().map(str::trim) {
            Some("") | Some("#") => dom::remove_attr(&anchor, "href"),
            Some(href) => dom::set_attr(&anchor, "href", to_absolute(href, base_url)),
            None => {}
        }
    }

    for embed in dom::get_all(root, "embed") {
        if dom::attr(&embed, "src").map_or(false, |src| is_pdf(&src)) {
            embed.detach();
        }
    }
}

fn is_pdf(src: &str) -> bool {
    let path = src.split(['?', '#']).next().unwrap_or_default();
    path.to_ascii_lowercase().ends_with(".pdf")
}

use std::{collections::HashSet, sync::LazyLock};

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;
use wayrip_archive::is_archive_chrome;

use crate::kind::ContentKind;

/// One reference discovered in a document, as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRef {
    /// The reference string exactly as it appears in the document.
    pub target: String,
    /// Inferred kind of the referenced asset.
    pub kind: ContentKind,
}

/// Tags whose `src` attribute points at a downloadable asset.
const SRC_ASSET_TAGS: &[&str] = &[
    "img", "script", "iframe", "embed", "source", "audio", "video", "track", "input",
];

/// Tags carrying a legacy `background` attribute.
const BACKGROUND_TAGS: &[&str] = &["body", "table", "tr", "td", "th"];

pub(crate) static CSS_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*['"]?([^'")]+?)['"]?\s*\)"#).expect("css url regex is valid")
});

pub(crate) static CSS_IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@import\s+['"]([^'"]+)['"]"#).expect("css import regex is valid")
});

/// Quoted string literals that look like asset paths. Best-effort by design;
/// obfuscated or computed paths are out of scope.
pub(crate) static JS_LITERAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"['"]([^'"\s]+\.(?:css|js|mjs|png|jpe?g|gif|svg|webp|avif|ico|bmp|mp4|mp3|ogg|webm|woff2?|ttf|eot|otf|json|xml)(?:\?[^'"\s]*)?)['"]"#,
    )
    .expect("js literal regex is valid")
});

/// One conservative dynamic pattern: a fixed directory prefix concatenated
/// with a filename literal.
pub(crate) static JS_CONCAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"['"]([^'"\s]*/)['"]\s*\+\s*['"]([^'"\s]+\.(?:css|js|png|jpe?g|gif|svg|webp))['"]"#,
    )
    .expect("js concat regex is valid")
});

/// Extracts asset references from a document. Binary content yields nothing;
/// malformed markup degrades to whatever could be parsed.
#[must_use]
pub fn extract(content: &str, kind: ContentKind) -> Vec<RawRef> {
    match kind {
        ContentKind::Html => extract_html(content),
        ContentKind::Css => extract_css(content),
        ContentKind::Js => extract_js(content),
        ContentKind::Binary => Vec::new(),
    }
}

/// Kind inferred from a raw reference string's extension.
pub(crate) fn kind_of_target(target: &str) -> ContentKind {
    let path = target.split(['?', '#']).next().unwrap_or(target);
    let ext = path
        .rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match ext.as_deref() {
        Some("html" | "htm") => ContentKind::Html,
        Some("css") => ContentKind::Css,
        Some("js" | "mjs") => ContentKind::Js,
        _ => ContentKind::Binary,
    }
}

/// Whether a raw reference is worth downloading at all: skips empty strings,
/// in-page anchors, inline data, scriptlets, and archive chrome.
pub(crate) fn wanted(target: &str) -> bool {
    let target = target.trim();
    if target.is_empty()
        || target.starts_with('#')
        || target.starts_with("data:")
        || target.starts_with("blob:")
        || target.starts_with("javascript:")
        || target.starts_with("mailto:")
        || target.starts_with("about:")
    {
        return false;
    }

    if let Ok(url) = Url::parse(target) {
        if is_archive_chrome(&url) {
            return false;
        }
    }

    true
}

struct RefSink {
    seen: HashSet<String>,
    refs: Vec<RawRef>,
}

impl RefSink {
    fn new() -> Self {
        Self {
            seen: HashSet::new(),
            refs: Vec::new(),
        }
    }

    fn push(&mut self, target: &str, kind: ContentKind) {
        let target = target.trim();
        if !wanted(target) {
            return;
        }
        if self.seen.insert(target.to_string()) {
            self.refs.push(RawRef {
                target: target.to_string(),
                kind,
            });
        }
    }

    fn push_inferred(&mut self, target: &str) {
        self.push(target, kind_of_target(target));
    }
}

fn extract_html(html: &str) -> Vec<RawRef> {
    let document = Html::parse_document(html);
    let everything = Selector::parse("*").expect("universal selector is valid");
    let mut sink = RefSink::new();

    for element in document.select(&everything) {
        let tag = element.value().name();

        if let Some(src) = element.value().attr("src") {
            if SRC_ASSET_TAGS.contains(&tag) {
                let kind = if tag == "script" {
                    ContentKind::Js
                } else {
                    kind_of_target(src)
                };
                sink.push(src, kind);
            }
        }

        if tag == "link" {
            if let Some(href) = element.value().attr("href") {
                let rel = element.value().attr("rel").unwrap_or_default();
                let kind = if rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("stylesheet"))
                {
                    ContentKind::Css
                } else {
                    kind_of_target(href)
                };
                sink.push(href, kind);
            }
        }

        if tag == "object" {
            if let Some(data) = element.value().attr("data") {
                sink.push_inferred(data);
            }
        }

        if BACKGROUND_TAGS.contains(&tag) {
            if let Some(background) = element.value().attr("background") {
                sink.push(background, ContentKind::Binary);
            }
        }

        if let Some(srcset) = element.value().attr("srcset") {
            for entry in srcset.split(',') {
                if let Some(url_part) = entry.split_whitespace().next() {
                    sink.push(url_part, ContentKind::Binary);
                }
            }
        }

        if let Some(style) = element.value().attr("style") {
            for captures in CSS_URL_RE.captures_iter(style) {
                sink.push_inferred(&captures[1]);
            }
        }
    }

    sink.refs
}

fn extract_css(css: &str) -> Vec<RawRef> {
    let mut sink = RefSink::new();

    for captures in CSS_URL_RE.captures_iter(css) {
        sink.push_inferred(&captures[1]);
    }
    for captures in CSS_IMPORT_RE.captures_iter(css) {
        sink.push(&captures[1], ContentKind::Css);
    }

    sink.refs
}

fn extract_js(js: &str) -> Vec<RawRef> {
    let mut sink = RefSink::new();

    // The concat rule runs first; its spans mask the literal rule so the
    // filename half of a concat expression is not also emitted bare.
    let mut concat_spans = Vec::new();
    for captures in JS_CONCAT_RE.captures_iter(js) {
        if let Some(whole) = captures.get(0) {
            concat_spans.push(whole.range());
        }
        let joined = format!("{}{}", &captures[1], &captures[2]);
        sink.push_inferred(&joined);
    }

    for captures in JS_LITERAL_RE.captures_iter(js) {
        let Some(literal) = captures.get(1) else {
            continue;
        };
        if concat_spans
            .iter()
            .any(|span| span.start <= literal.start() && literal.end() <= span.end)
        {
            continue;
        }
        sink.push_inferred(literal.as_str());
    }

    sink.refs
}

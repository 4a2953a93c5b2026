use std::{collections::HashMap, sync::LazyLock};

use lol_html::{HtmlRewriter, Settings, doc_comments, element};
use regex::Regex;
use url::Url;
use wayrip_archive::{is_archive_chrome, resolve_relative};

use crate::{
    extract::{CSS_IMPORT_RE, CSS_URL_RE, JS_CONCAT_RE, JS_LITERAL_RE},
    kind::ContentKind,
};

/// Inline scripts injected by the archive replay machinery.
static INLINE_ARCHIVE_SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script[^>]*>[^<]*(?:wombat|wayback|archive_analytics|__wm)[^<]*</script>\s*")
        .expect("inline script regex is valid")
});

/// Archive-inserted comments left over in text assets.
static ARCHIVE_BLOCK_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)/\*[^*]*(?:wayback|archive)[^*]*\*/\s*").expect("block comment regex is valid")
});

static ARCHIVE_HTML_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<!--.*?(?:wayback|archive).*?-->\s*").expect("html comment regex is valid")
});

/// Strips archive chrome from fetched content: the replay toolbar, injected
/// scripts and stylesheets, and machinery comments. Binary content passes
/// through untouched; unparseable HTML degrades to the regex-only pass.
#[must_use]
pub fn clean(content: &str, kind: ContentKind) -> String {
    match kind {
        ContentKind::Html => {
            let stripped = clean_html_elements(content).unwrap_or_else(|| content.to_string());
            let stripped = INLINE_ARCHIVE_SCRIPT_RE.replace_all(&stripped, "");
            ARCHIVE_HTML_COMMENT_RE.replace_all(&stripped, "").into_owned()
        }
        ContentKind::Css | ContentKind::Js => {
            ARCHIVE_BLOCK_COMMENT_RE.replace_all(content, "").into_owned()
        }
        ContentKind::Binary => content.to_string(),
    }
}

fn clean_html_elements(html: &str) -> Option<String> {
    let mut output = Vec::with_capacity(html.len());
    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![
                element!("#wm-ipp, #wm-ipp-base, #wm-ipp-print", |el| {
                    el.remove();
                    Ok(())
                }),
                element!("script[src]", |el| {
                    let src = el.get_attribute("src").unwrap_or_default();
                    if is_chrome_target(&src) {
                        el.remove();
                    }
                    Ok(())
                }),
                element!("link[href]", |el| {
                    let href = el.get_attribute("href").unwrap_or_default();
                    if is_chrome_target(&href) {
                        el.remove();
                    }
                    Ok(())
                }),
            ],
            document_content_handlers: vec![doc_comments!(|comment| {
                let text = comment.text().to_ascii_lowercase();
                if text.contains("wayback") || text.contains("archive") {
                    comment.remove();
                }
                Ok(())
            })],
            ..Settings::new()
        },
        |chunk: &[u8]| output.extend_from_slice(chunk),
    );

    rewriter.write(html.as_bytes()).ok()?;
    rewriter.end().ok()?;
    String::from_utf8(output).ok()
}

fn is_chrome_target(target: &str) -> bool {
    if let Ok(url) = Url::parse(target) {
        return is_archive_chrome(&url);
    }
    target.contains("web-static.archive.org") || target.contains("/_static/")
}

/// Rewrites the references of one cleaned document so it renders from a flat
/// local directory. `map` is keyed by the raw reference string exactly as it
/// appears in the document; values are the local file names.
pub struct RewriteContext<'a> {
    map: &'a HashMap<String, String>,
    base_original: &'a Url,
}

impl<'a> RewriteContext<'a> {
    pub fn new(map: &'a HashMap<String, String>, base_original: &'a Url) -> Self {
        Self { map, base_original }
    }

    /// Applies the mapping to a document of the given kind. Unmapped
    /// references are left as they were found.
    #[must_use]
    pub fn rewrite(&self, content: &str, kind: ContentKind) -> String {
        match kind {
            ContentKind::Html => self
                .rewrite_html(content)
                .unwrap_or_else(|| content.to_string()),
            ContentKind::Css => self.rewrite_css(content),
            ContentKind::Js => self.rewrite_js(content),
            ContentKind::Binary => content.to_string(),
        }
    }

    fn local(&self, raw: &str) -> Option<String> {
        self.map.get(raw.trim()).cloned()
    }

    fn rewrite_html(&self, html: &str) -> Option<String> {
        let mut output = Vec::with_capacity(html.len());
        let mut rewriter = HtmlRewriter::new(
            Settings {
                element_content_handlers: vec![
                    element!("*[src]", |el| {
                        if let Some(src) = el.get_attribute("src") {
                            if let Some(local) = self.local(&src) {
                                el.set_attribute("src", &local)?;
                            }
                        }
                        Ok(())
                    }),
                    element!("*[href]", |el| {
                        let Some(href) = el.get_attribute("href") else {
                            return Ok(());
                        };
                        if el.tag_name().eq_ignore_ascii_case("a") {
                            if let Some(absolute) = self.absolute_anchor(&href) {
                                el.set_attribute("href", &absolute)?;
                            }
                        } else if let Some(local) = self.local(&href) {
                            el.set_attribute("href", &local)?;
                        }
                        Ok(())
                    }),
                    element!("*[background]", |el| {
                        if let Some(background) = el.get_attribute("background") {
                            if let Some(local) = self.local(&background) {
                                el.set_attribute("background", &local)?;
                            }
                        }
                        Ok(())
                    }),
                    element!("*[srcset]", |el| {
                        if let Some(srcset) = el.get_attribute("srcset") {
                            el.set_attribute("srcset", &self.rewrite_srcset(&srcset))?;
                        }
                        Ok(())
                    }),
                    element!("*[style]", |el| {
                        if let Some(style) = el.get_attribute("style") {
                            el.set_attribute("style", &self.rewrite_css(&style))?;
                        }
                        Ok(())
                    }),
                ],
                ..Settings::new()
            },
            |chunk: &[u8]| output.extend_from_slice(chunk),
        );

        rewriter.write(html.as_bytes()).ok()?;
        rewriter.end().ok()?;
        String::from_utf8(output).ok()
    }

    /// Navigation links are not downloaded; they point back at the live
    /// original site instead.
    fn absolute_anchor(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty()
            || href.starts_with('#')
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("data:")
        {
            return None;
        }
        resolve_relative(self.base_original, href)
            .ok()
            .map(|url| url.to_string())
    }

    fn rewrite_srcset(&self, srcset: &str) -> String {
        srcset
            .split(',')
            .map(|entry| {
                let entry = entry.trim();
                let mut parts = entry.splitn(2, char::is_whitespace);
                let url_part = parts.next().unwrap_or_default();
                let descriptor = parts.next();
                let target = self
                    .local(url_part)
                    .unwrap_or_else(|| url_part.to_string());
                match descriptor {
                    Some(descriptor) => format!("{target} {}", descriptor.trim()),
                    None => target,
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn rewrite_css(&self, css: &str) -> String {
        let rewritten = CSS_URL_RE.replace_all(css, |captures: &regex::Captures<'_>| {
            match self.local(&captures[1]) {
                Some(local) => format!("url({local})"),
                None => captures[0].to_string(),
            }
        });
        CSS_IMPORT_RE
            .replace_all(&rewritten, |captures: &regex::Captures<'_>| {
                match self.local(&captures[1]) {
                    Some(local) => format!("@import \"{local}\""),
                    None => captures[0].to_string(),
                }
            })
            .into_owned()
    }

    /// Both rules match against the original text and the edits are spliced
    /// in one pass, so the literal rule never touches the filename half of a
    /// concat expression or the text a concat edit produced.
    fn rewrite_js(&self, js: &str) -> String {
        let mut concat_spans = Vec::new();
        let mut edits: Vec<(std::ops::Range<usize>, String)> = Vec::new();

        for captures in JS_CONCAT_RE.captures_iter(js) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            concat_spans.push(whole.range());
            let joined = format!("{}{}", &captures[1], &captures[2]);
            if let Some(local) = self.local(&joined) {
                edits.push((whole.range(), format!("\"{local}\"")));
            }
        }

        for captures in JS_LITERAL_RE.captures_iter(js) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            if concat_spans
                .iter()
                .any(|span| span.start <= whole.start() && whole.end() <= span.end)
            {
                continue;
            }
            if let Some(local) = self.local(&captures[1]) {
                edits.push((whole.range(), format!("\"{local}\"")));
            }
        }

        edits.sort_by_key(|(range, _)| range.start);
        let mut out = String::with_capacity(js.len());
        let mut cursor = 0;
        for (range, replacement) in edits {
            out.push_str(&js[cursor..range.start]);
            out.push_str(&replacement);
            cursor = range.end;
        }
        out.push_str(&js[cursor..]);
        out
    }
}

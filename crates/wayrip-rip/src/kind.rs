use url::Url;

/// Content kind of an asset, selected once when the asset is discovered and
/// dispatched on explicitly from then on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Html,
    Css,
    Js,
    /// Everything fetched and written verbatim: images, fonts, media.
    Binary,
}

impl ContentKind {
    /// Infers the kind from the extension of the original URL's path.
    /// Unknown or missing extensions are `Binary`.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        let path = url.path();
        let ext = path
            .rsplit('/')
            .next()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());

        match ext.as_deref() {
            Some("html" | "htm") => Self::Html,
            Some("css") => Self::Css,
            Some("js" | "mjs") => Self::Js,
            _ => Self::Binary,
        }
    }

    /// Whether the content is textual and subject to cleaning, reference
    /// extraction, and rewriting.
    #[must_use]
    pub fn is_text(self) -> bool {
        matches!(self, Self::Html | Self::Css | Self::Js)
    }

    /// Extension appended to local filenames that have none.
    #[must_use]
    pub fn default_extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Css => "css",
            Self::Js => "js",
            Self::Binary => "bin",
        }
    }
}

/// A fetched document handed to an adapter: the raw bytes decoded as text,
/// tagged with the source it belongs to and the base used to resolve its
/// relative links.
#[derive(Debug, Clone)]
pub struct Page {
    pub source_id: i64,
    pub url: String,
    pub base_url: String,
    pub html: String,
}

impl Page {
    pub fn new(
        source_id: i64,
        url: impl Into<String>,
        base_url: impl Into<String>,
        html: impl Into<String>,
    ) -> Self {
        Self {
            source_id,
            url: url.into(),
            base_url: base_url.into(),
            html: html.into(),
        }
    }

    /// Invalid UTF-8 sequences are replaced rather than rejected.
    pub fn from_bytes(
        source_id: i64,
        url: impl Into<String>,
        base_url: impl Into<String>,
        bytes: &[u8],
    ) -> Self {
        Self::new(source_id, url, base_url, String::from_utf8_lossy(bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_is_lossy() {
        let page = Page::from_bytes(1, "https://basta.media/x", "https://basta.media/", b"<p>caf\xe9</p>");
        assert!(page.html.starts_with("<p>caf"));
        assert!(page.html.contains('\u{fffd}'));
    }
}

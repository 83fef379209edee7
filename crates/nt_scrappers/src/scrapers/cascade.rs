//! Fallback cascades: a field is read from an ordered list of candidate
//! extractors and the first non-blank result wins.

use std::fmt;

use kuchikiki::NodeRef;
use nt_core::Result;

use crate::scrapers::jsonld;
use crate::toolkit::{dates, dom};

/// One way of reading a field from a page (or from a listing item).
#[derive(Clone, Copy)]
pub enum Candidate {
    /// Text of the first element matching the selector.
    Text(&'static str),
    /// Direct text of the first match, ignoring nested elements.
    OwnText(&'static str),
    /// An attribute of the first element matching the selector.
    Attr(&'static str, &'static str),
    /// The first non-blank text following the matched element among its
    /// siblings, e.g. a byline written after an `<hr>`.
    TextAfter(&'static str),
    /// Text of the Nth `<li>` inside the first element matching the selector.
    ListItem(&'static str, usize),
    /// `content` of `<meta name=..>` or `<meta property=..>`.
    Meta(&'static str),
    /// Author names declared in JSON-LD, comma separated.
    JsonLdAuthor,
    /// A site-specific extractor.
    Custom(fn(&NodeRef) -> Result<Option<String>>),
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Candidate::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Candidate::OwnText(s) => f.debug_tuple("OwnText").field(s).finish(),
            Candidate::Attr(s, a) => f.debug_tuple("Attr").field(s).field(a).finish(),
            Candidate::TextAfter(s) => f.debug_tuple("TextAfter").field(s).finish(),
            Candidate::ListItem(s, i) => f.debug_tuple("ListItem").field(s).field(i).finish(),
            Candidate::Meta(s) => f.debug_tuple("Meta").field(s).finish(),
            Candidate::JsonLdAuthor => f.write_str("JsonLdAuthor"),
            Candidate::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Candidate {
    pub fn extract(&self, scope: &NodeRef) -> Result<Option<String>> {
        let value = match *self {
            Candidate::Text(selector) => dom::select_first(scope, selector)?.map(|n| dom::text_of(&n)),
            Candidate::OwnText(selector) => {
                dom::select_first(scope, selector)?.map(|n| dom::own_text(&n))
            }
            Candidate::Attr(selector, attr) => {
                dom::select_first(scope, selector)?.and_then(|n| dom::attr(&n, attr))
            }
            Candidate::TextAfter(selector) => {
                dom::select_first(scope, selector)?.and_then(|marker| text_after(&marker))
            }
            Candidate::ListItem(selector, index) => dom::select_first(scope, selector)?
                .and_then(|list| dom::find_first(&list, "li", None, Some(index)))
                .map(|item| dom::text_of(&item)),
            Candidate::Meta(name) => {
                let selector = format!("meta[name='{name}'], meta[property='{name}']");
                dom::select_first(scope, &selector)?.and_then(|n| dom::attr(&n, "content"))
            }
            Candidate::JsonLdAuthor => {
                let authors = jsonld::extract_authors(scope)?;
                (!authors.is_empty()).then(|| authors.join(", "))
            }
            Candidate::Custom(extractor) => extractor(scope)?,
        };

        Ok(value
            .map(|v| dom::collapse_whitespace(&v))
            .filter(|v| !v.is_empty()))
    }

    /// Selector strings this candidate will compile, for up-front checks.
    pub fn selectors(&self) -> Vec<&'static str> {
        match *self {
            Candidate::Text(s)
            | Candidate::OwnText(s)
            | Candidate::Attr(s, _)
            | Candidate::TextAfter(s)
            | Candidate::ListItem(s, _) => vec![s],
            Candidate::Meta(_) | Candidate::JsonLdAuthor | Candidate::Custom(_) => vec![],
        }
    }
}

fn text_after(marker: &NodeRef) -> Option<String> {
    marker
        .following_siblings()
        .map(|sibling| dom::collapse_whitespace(&sibling.text_contents()))
        .find(|text| !text.is_empty())
}

/// The first candidate yielding a non-blank value.
pub fn first_non_blank(scope: &NodeRef, candidates: &[Candidate]) -> Result<Option<String>> {
    for candidate in candidates {
        if let Some(value) = candidate.extract(scope)? {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// The first candidate whose text parses as a date (ISO, then literal).
pub fn first_date(scope: &NodeRef, candidates: &[Candidate]) -> Result<Option<i64>> {
    for candidate in candidates {
        if let Some(millis) = candidate.extract(scope)?.as_deref().and_then(dates::parse_any) {
            return Ok(Some(millis));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::Dom;
    use nt_core::Error;

    const PAGE: &str = r#"<html><head>
        <meta property="og:description" content="Depuis les métadonnées">
        </head><body>
        <div class="chapo">  </div>
        <p class="signature">Par <strong>Lorène Lavocat</strong></p>
        <div class="infos"><hr> <span></span> Hervé Kempf </div>
        <ul class="auteurs"><li>Alice</li><li>Bob</li></ul>
        <abbr class="published" title="2020-10-13T09:40:19Z">13 octobre</abbr>
        <span class="date">le 12 octobre 2020</span>
        </body></html>"#;

    fn shout(scope: &NodeRef) -> Result<Option<String>> {
        Ok(dom::select_first(scope, "ul.auteurs")?.map(|n| dom::text_of(&n).to_uppercase()))
    }

    #[test]
    fn test_candidates() {
        let dom = Dom::parse(PAGE);
        let root = dom.root();

        assert_eq!(Candidate::Text("div.chapo").extract(root).unwrap(), None);
        assert_eq!(
            Candidate::Text("p.signature").extract(root).unwrap().as_deref(),
            Some("Par Lorène Lavocat")
        );
        assert_eq!(Candidate::OwnText("p.signature").extract(root).unwrap().as_deref(), Some("Par"));
        assert_eq!(
            Candidate::TextAfter(".infos hr").extract(root).unwrap().as_deref(),
            Some("Hervé Kempf")
        );
        assert_eq!(
            Candidate::ListItem("ul.auteurs", 1).extract(root).unwrap().as_deref(),
            Some("Bob")
        );
        assert_eq!(
            Candidate::Meta("og:description").extract(root).unwrap().as_deref(),
            Some("Depuis les métadonnées")
        );
        assert_eq!(Candidate::Custom(shout).extract(root).unwrap().as_deref(), Some("ALICEBOB"));
    }

    #[test]
    fn test_first_non_blank_short_circuits_in_order() {
        let dom = Dom::parse(PAGE);
        let description = first_non_blank(
            dom.root(),
            &[Candidate::Text("div.chapo"), Candidate::Text(".absent"), Candidate::Meta("og:description")],
        )
        .unwrap();
        assert_eq!(description.as_deref(), Some("Depuis les métadonnées"));

        // Never reached, so never compiled.
        let author = first_non_blank(
            dom.root(),
            &[Candidate::ListItem("ul.auteurs", 0), Candidate::Text("p[[")],
        )
        .unwrap();
        assert_eq!(author.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_first_date_skips_unparseable() {
        let dom = Dom::parse(PAGE);
        let date = first_date(
            dom.root(),
            &[Candidate::Text("abbr.published"), Candidate::Attr("abbr.published", "title")],
        )
        .unwrap();
        assert_eq!(date, Some(1_602_582_019_000));

        let literal = first_date(dom.root(), &[Candidate::Text("span.date")]).unwrap();
        assert_eq!(literal, Some(1_602_460_800_000));

        assert_eq!(first_date(dom.root(), &[Candidate::Text(".nope")]).unwrap(), None);
    }

    #[test]
    fn test_invalid_selector_is_fatal() {
        let dom = Dom::parse(PAGE);
        let err = first_non_blank(dom.root(), &[Candidate::Text("p[[")]).unwrap_err();
        assert!(matches!(err, Error::Selector(_)));
    }
}

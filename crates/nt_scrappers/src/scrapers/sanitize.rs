//! Body sanitation pipelines.
//!
//! Tree steps mutate the parsed body in place; string steps run on the
//! serialized HTML. Once a string step has run the tree is gone, so a tree
//! step declared after it is a pipeline defect.

use kuchikiki::NodeRef;
use nt_core::{Error, Result};
use tracing::debug;

use crate::toolkit::{dom, urls};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeStep {
    /// Moves the footnote block matched by the selector to the end of the
    /// body. Footnotes usually live outside the article container.
    AppendFootnotes(&'static str),
    /// Media sources, responsive image sets and anchor correction.
    RewriteUrls,
    /// Adds a class to the body root so the publisher stylesheet applies.
    MarkCssAnchor(&'static str),
    /// Detaches every element matching one of the selectors (comment
    /// forms, share bars, scripts).
    StripWidgets(&'static [&'static str]),
    EscapeHashtags,
    ForceHttps,
}

impl SanitizeStep {
    fn runs_on_tree(&self) -> bool {
        !matches!(self, SanitizeStep::EscapeHashtags | SanitizeStep::ForceHttps)
    }

    pub fn selectors(&self) -> Vec<&'static str> {
        match *self {
            SanitizeStep::AppendFootnotes(selector) => vec![selector],
            SanitizeStep::StripWidgets(selectors) => selectors.to_vec(),
            _ => vec![],
        }
    }
}

/// Checks that no tree step follows a string step.
pub fn validate(steps: &[SanitizeStep]) -> Result<()> {
    let mut serialized = false;
    for step in steps {
        if step.runs_on_tree() && serialized {
            return Err(Error::Pipeline(format!(
                "{step:?} is declared after the body was serialized"
            )));
        }
        serialized |= !step.runs_on_tree();
    }
    Ok(())
}

/// Runs `steps` over `body`, a node of the document rooted at `document`,
/// and returns the resulting HTML fragment.
pub fn sanitize(
    body: &NodeRef,
    document: &NodeRef,
    base_url: &str,
    steps: &[SanitizeStep],
) -> Result<String> {
    validate(steps)?;

    let mut html: Option<String> = None;
    for step in steps {
        match *step {
            SanitizeStep::AppendFootnotes(selector) => append_footnotes(body, document, selector)?,
            SanitizeStep::RewriteUrls => {
                urls::rewrite_media(body, base_url);
                urls::correct_links(body, base_url);
            }
            SanitizeStep::MarkCssAnchor(class) => dom::add_class(body, class),
            SanitizeStep::StripWidgets(selectors) => strip_widgets(body, selectors)?,
            SanitizeStep::EscapeHashtags => {
                let current = html.take().unwrap_or_else(|| dom::outer_html(body));
                html = Some(urls::escape_hashtag(&current));
            }
            SanitizeStep::ForceHttps => {
                let current = html.take().unwrap_or_else(|| dom::outer_html(body));
                html = Some(urls::force_https(&current));
            }
        }
    }

    Ok(html.unwrap_or_else(|| dom::outer_html(body)))
}

fn append_footnotes(body: &NodeRef, document: &NodeRef, selector: &str) -> Result<()> {
    let Some(notes) = dom::select_first(document, selector)? else {
        debug!("No footnotes matching {selector}");
        return Ok(());
    };
    // A block enclosing the body cannot be moved into it.
    if body.inclusive_ancestors().any(|ancestor| ancestor == notes) {
        return Ok(());
    }
    body.append(notes);
    Ok(())
}

fn strip_widgets(body: &NodeRef, selectors: &[&str]) -> Result<()> {
    for selector in selectors {
        for widget in dom::select_all(body, selector)? {
            if &widget != body {
                widget.detach();
            }
        }
    }
    Ok(())
}

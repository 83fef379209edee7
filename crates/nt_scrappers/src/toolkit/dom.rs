//! Query primitives over a parsed, mutable HTML tree.
//!
//! Every extraction call parses its own [`Dom`], mutates it freely and drops
//! it. Lookups never fail on missing markup: a miss is `None` or an empty
//! list. The only error is a selector string that does not compile, which is
//! a defect in the calling code.

use kuchikiki::iter::NodeIterator;
use kuchikiki::traits::TendrilSink;
use kuchikiki::{NodeRef, Selectors};
use nt_core::{Error, Result};

pub struct Dom {
    root: NodeRef,
}

impl Dom {
    pub fn parse(html: &str) -> Self {
        Self {
            root: kuchikiki::parse_html().one(html),
        }
    }

    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    pub fn find_first(
        &self,
        tag: &str,
        attr: Option<(&str, &str)>,
        index: Option<usize>,
    ) -> Option<NodeRef> {
        find_first(&self.root, tag, attr, index)
    }

    pub fn get_all(&self, tag: &str) -> Vec<NodeRef> {
        get_all(&self.root, tag)
    }

    pub fn select_first(&self, selector: &str) -> Result<Option<NodeRef>> {
        select_first(&self.root, selector)
    }

    pub fn select_all(&self, selector: &str) -> Result<Vec<NodeRef>> {
        select_all(&self.root, selector)
    }
}

/// Returns the first element under `scope` named `tag` that carries
/// `attr == value` when given. With `index`, returns the Nth match instead.
pub fn find_first(
    scope: &NodeRef,
    tag: &str,
    attr: Option<(&str, &str)>,
    index: Option<usize>,
) -> Option<NodeRef> {
    let mut matches = scope
        .descendants()
        .filter(|node| is_tag(node, tag))
        .filter(|node| attr.map_or(true, |(name, value)| has_attr_value(node, name, value)));

    matches.nth(index.unwrap_or(0))
}

/// All elements under `scope` named `tag`, in document order.
pub fn get_all(scope: &NodeRef, tag: &str) -> Vec<NodeRef> {
    scope.descendants().filter(|node| is_tag(node, tag)).collect()
}

/// Keeps the nodes carrying `attr == value`, preserving order.
pub fn filter_by_attr(nodes: &[NodeRef], attr: &str, value: &str) -> Vec<NodeRef> {
    nodes
        .iter()
        .filter(|node| has_attr_value(node, attr, value))
        .cloned()
        .collect()
}

/// The `index`-th element child of `node`. Text and comment children are
/// not counted.
pub fn child_at(node: &NodeRef, index: usize) -> Option<NodeRef> {
    node.children()
        .filter(|child| child.as_element().is_some())
        .nth(index)
}

pub fn is_tag(node: &NodeRef, tag: &str) -> bool {
    node.as_element()
        .map_or(false, |el| (&*el.name.local).eq_ignore_ascii_case(tag))
}

/// Attribute equality, except for `class` where `value` only needs to be one
/// of the whitespace-separated tokens.
pub fn has_attr_value(node: &NodeRef, attr: &str, value: &str) -> bool {
    let Some(element) = node.as_element() else {
        return false;
    };
    let attributes = element.attributes.borrow();
    match attributes.get(attr) {
        Some(found) if attr == "class" => found.split_whitespace().any(|c| c == value),
        Some(found) => found == value,
        None => false,
    }
}

/// Compiles a selector, reporting the offending string on failure.
pub fn compile(selector: &str) -> Result<Selectors> {
    Selectors::compile(selector).map_err(|_| Error::Selector(selector.to_string()))
}

/// First element matching the CSS selector. `scope` itself is a candidate.
pub fn select_first(scope: &NodeRef, selector: &str) -> Result<Option<NodeRef>> {
    let selectors = compile(selector)?;
    Ok(scope
        .inclusive_descendants()
        .elements()
        .find(|el| selectors.matches(el))
        .map(|el| el.as_node().clone()))
}

pub fn select_all(scope: &NodeRef, selector: &str) -> Result<Vec<NodeRef>> {
    let selectors = compile(selector)?;
    Ok(scope
        .inclusive_descendants()
        .elements()
        .filter(|el| selectors.matches(el))
        .map(|el| el.as_node().clone())
        .collect())
}

pub fn attr(node: &NodeRef, name: &str) -> Option<String> {
    node.as_element()
        .and_then(|el| el.attributes.borrow().get(name).map(str::to_string))
}

/// A non-blank attribute value, trimmed.
pub fn attr_non_blank(node: &NodeRef, name: &str) -> Option<String> {
    attr(node, name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn set_attr(node: &NodeRef, name: &str, value: String) {
    if let Some(element) = node.as_element() {
        element.attributes.borrow_mut().insert(name, value);
    }
}

pub fn remove_attr(node: &NodeRef, name: &str) {
    if let Some(element) = node.as_element() {
        element.attributes.borrow_mut().remove(name);
    }
}

/// Adds a class token unless already present.
pub fn add_class(node: &NodeRef, class: &str) {
    if has_attr_value(node, "class", class) {
        return;
    }
    let classes = match attr(node, "class") {
        Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
        _ => class.to_string(),
    };
    set_attr(node, "class", classes);
}

/// All text under `node`, whitespace collapsed.
pub fn text_of(node: &NodeRef) -> String {
    collapse_whitespace(&node.text_contents())
}

/// Only the text nodes that are direct children of `node`.
pub fn own_text(node: &NodeRef) -> String {
    let text: String = node
        .children()
        .filter_map(|child| child.as_text().map(|t| t.borrow().to_string()))
        .collect();
    collapse_whitespace(&text)
}

pub fn outer_html(node: &NodeRef) -> String {
    node.to_string()
}

pub fn inner_html(node: &NodeRef) -> String {
    node.children().map(|child| child.to_string()).collect()
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"
        <html><body>
            <div class="a first">One</div>
            <div class="a">Two <span>nested</span></div>
            <div id="x">Three</div>
            <ul id="list"><li>un</li>texte<li>deux</li></ul>
        </body></html>
    "#;

    #[test]
    fn test_find_first_by_tag_attr_and_index() {
        let dom = Dom::parse(HTML);

        let first = dom.find_first("div", None, None).unwrap();
        assert_eq!(text_of(&first), "One");
        assert!(is_tag(&first, "DIV"));
        assert_eq!(dom.get_all("LI").len(), 2);

        let by_class = dom.find_first("div", Some(("class", "a")), Some(1)).unwrap();
        assert_eq!(own_text(&by_class), "Two");

        let by_id = dom.find_first("div", Some(("id", "x")), None).unwrap();
        assert_eq!(text_of(&by_id), "Three");

        assert!(dom.find_first("div", Some(("class", "a")), Some(5)).is_none());
        assert!(dom.find_first("table", None, None).is_none());
    }

    #[test]
    fn test_filter_by_attr_preserves_order() {
        let dom = Dom::parse(HTML);
        let divs = dom.get_all("div");
        assert_eq!(divs.len(), 3);

        let filtered = filter_by_attr(&divs, "class", "a");
        let texts: Vec<_> = filtered.iter().map(own_text).collect();
        assert_eq!(texts, vec!["One", "Two"]);
    }

    #[test]
    fn test_child_at_is_safe() {
        let dom = Dom::parse(HTML);
        let list = dom.find_first("ul", None, None).unwrap();
        assert_eq!(text_of(&child_at(&list, 1).unwrap()), "deux");
        assert!(child_at(&list, 2).is_none());

        let li = child_at(&list, 0).unwrap();
        let text = li.first_child().unwrap();
        assert!(child_at(&text, 0).is_none());
    }

    #[test]
    fn test_select_reports_invalid_selector() {
        let dom = Dom::parse(HTML);
        assert_eq!(dom.select_all("div.a").unwrap().len(), 2);
        assert!(dom.select_first("section").unwrap().is_none());
        assert!(matches!(
            dom.select_first("div[[").unwrap_err(),
            Error::Selector(s) if s == "div[["
        ));
    }

    #[test]
    fn test_add_class_once() {
        let dom = Dom::parse(HTML);
        let node = dom.find_first("div", Some(("id", "x")), None).unwrap();
        add_class(&node, "texte");
        add_class(&node, "texte");
        assert_eq!(attr(&node, "class").as_deref(), Some("texte"));

        let first = dom.find_first("div", None, None).unwrap();
        add_class(&first, "texte");
        assert_eq!(attr(&first, "class").as_deref(), Some("a first texte"));
    }

    #[test]
    fn test_queries_are_deterministic() {
        let a = Dom::parse(HTML);
        let b = Dom::parse(HTML);
        assert_eq!(
            outer_html(&a.find_first("ul", None, None).unwrap()),
            outer_html(&b.find_first("ul", None, None).unwrap())
        );
    }
}

//! DOM Operations Adapter
//!
//! Thin helpers over the `dom_query` crate, centered on per-element
//! introspection: the signature builder and scorers work on individual
//! `NodeRef`s, not whole selections, so most helpers here take a node.

// Re-export core types for external use
pub use dom_query::{Document, NodeRef, Selection};

// Re-export StrTendril for external use
pub use tendril::StrTendril;

// === Tag / Attribute Information ===

/// Get tag name (lowercase), or `None` for non-element nodes.
#[must_use]
pub fn tag_name(node: &NodeRef) -> Option<String> {
    node.node_name().map(|t| t.to_ascii_lowercase())
}

/// Get any attribute value.
#[inline]
#[must_use]
pub fn attr(node: &NodeRef, name: &str) -> Option<String> {
    Selection::from(*node).attr(name).map(|s| s.to_string())
}

/// Check if an attribute exists.
#[inline]
#[must_use]
pub fn has_attr(node: &NodeRef, name: &str) -> bool {
    Selection::from(*node).has_attr(name)
}

/// Get the element's class attribute split into tokens (document order).
#[must_use]
pub fn class_tokens(node: &NodeRef) -> Vec<String> {
    attr(node, "class")
        .map(|c| {
            c.split_whitespace()
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Get all attribute names of the element, in document order.
#[must_use]
pub fn attr_names(node: &NodeRef) -> Vec<String> {
    node.attrs()
        .iter()
        .map(|a| a.name.local.to_string())
        .collect()
}

// === Text Content ===

/// Get all text content of node and descendants.
///
/// Returns `StrTendril` for zero-copy passing. Use `.to_string()` only when
/// you need owned storage.
#[inline]
#[must_use]
pub fn text_content(node: &NodeRef) -> StrTendril {
    Selection::from(*node).text()
}

// === Tree Navigation ===

/// Nesting depth: number of ancestors between this node and the tree root.
#[must_use]
pub fn depth(node: &NodeRef) -> usize {
    let mut depth = 0;
    let mut current = node.parent();
    while let Some(parent) = current {
        depth += 1;
        current = parent.parent();
    }
    depth
}

/// Direct element children, in document order.
#[must_use]
pub fn child_elements<'a>(node: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    Selection::from(*node)
        .children()
        .nodes()
        .iter()
        .copied()
        .collect()
}

/// Tag names of direct element children, in document order.
#[must_use]
pub fn child_tags(node: &NodeRef) -> Vec<String> {
    child_elements(node)
        .iter()
        .filter_map(tag_name)
        .collect()
}

/// All descendant elements (excluding the node itself), in document order.
#[must_use]
pub fn descendant_elements<'a>(node: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    Selection::from(*node)
        .select("*")
        .nodes()
        .iter()
        .copied()
        .collect()
}

/// Number of descendant elements below the node.
#[must_use]
pub fn descendant_count(node: &NodeRef) -> usize {
    Selection::from(*node).select("*").length()
}

/// Maximum element nesting depth below the node (0 for a leaf element).
#[must_use]
pub fn max_descendant_depth(node: &NodeRef) -> usize {
    let base = depth(node);
    descendant_elements(node)
        .iter()
        .map(|d| depth(d).saturating_sub(base))
        .max()
        .unwrap_or(0)
}

// === Querying ===

/// Query descendants of a node by CSS selector.
///
/// Invalid selector expressions yield `None` rather than panicking; learned
/// and library-supplied selectors are data, not trusted input.
#[must_use]
pub fn select_within<'a>(node: &NodeRef<'a>, selector: &str) -> Option<Selection<'a>> {
    Selection::from(*node).try_select(selector)
}

/// Query a whole document by CSS selector, tolerating invalid expressions.
#[must_use]
pub fn select_in_document<'a>(doc: &'a Document, selector: &str) -> Option<Selection<'a>> {
    doc.try_select(selector)
}

/// Check whether this node or any ancestor carries the given attribute.
#[must_use]
pub fn self_or_ancestor_has_attr(node: &NodeRef, name: &str) -> bool {
    if has_attr(node, name) {
        return true;
    }
    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.is_element() && has_attr(&parent, name) {
            return true;
        }
        current = parent.parent();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_and_class_tokens() {
        let doc = Document::from(r#"<div class="card featured">x</div>"#);
        let node = *doc.select("div").nodes().first().unwrap();

        assert_eq!(tag_name(&node).as_deref(), Some("div"));
        assert_eq!(class_tokens(&node), vec!["card", "featured"]);
    }

    #[test]
    fn test_attr_names_in_document_order() {
        let doc = Document::from(r#"<a href="/x" title="t" data-k="v">x</a>"#);
        let node = *doc.select("a").nodes().first().unwrap();

        assert_eq!(attr_names(&node), vec!["href", "title", "data-k"]);
    }

    #[test]
    fn test_depth_counts_ancestors() {
        let doc = Document::from("<div><section><p id='target'>x</p></section></div>");
        let node = *doc.select("#target").nodes().first().unwrap();

        // html > body > div > section > p
        assert_eq!(depth(&node), 4);
    }

    #[test]
    fn test_child_tags_ordered() {
        let doc = Document::from("<div><h3>t</h3><span>s</span><a>l</a></div>");
        let node = *doc.select("div").nodes().first().unwrap();

        assert_eq!(child_tags(&node), vec!["h3", "span", "a"]);
    }

    #[test]
    fn test_descendant_count_excludes_self() {
        let doc = Document::from("<div><p><span>x</span></p></div>");
        let node = *doc.select("div").nodes().first().unwrap();

        assert_eq!(descendant_count(&node), 2);
        assert_eq!(max_descendant_depth(&node), 2);
    }

    #[test]
    fn test_select_within_scopes_to_descendants() {
        let doc = Document::from(
            "<div class='a'><span class='hit'>1</span></div><span class='hit'>2</span>",
        );
        let node = *doc.select("div.a").nodes().first().unwrap();

        let hits = select_within(&node, ".hit").unwrap();
        assert_eq!(hits.length(), 1);
    }

    #[test]
    fn test_select_within_invalid_selector_is_none() {
        let doc = Document::from("<div>x</div>");
        let node = *doc.select("div").nodes().first().unwrap();

        assert!(select_within(&node, "div[[[").is_none());
    }

    #[test]
    fn test_self_or_ancestor_has_attr() {
        let doc = Document::from(
            r#"<div data-pattern-scout="1"><p id="inner">x</p></div><p id="outer">y</p>"#,
        );
        let inner = *doc.select("#inner").nodes().first().unwrap();
        let outer = *doc.select("#outer").nodes().first().unwrap();

        assert!(self_or_ancestor_has_attr(&inner, "data-pattern-scout"));
        assert!(!self_or_ancestor_has_attr(&outer, "data-pattern-scout"));
    }
}

//! Structure Signature Builder
//!
//! Computes a comparable structural descriptor for any element. Two elements
//! are only ever compared through their signatures, never by node identity,
//! which keeps similarity scoring symmetric and cacheable.
//!
//! Signatures are recomputed per element per pass and are plain data; the
//! serde derives exist because corrections persist the signature of the
//! corrected element for future structural matching.

use serde::{Deserialize, Serialize};

use crate::dom::{self, NodeRef};
use crate::patterns;

/// Coarse classification of an element's text content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextPattern {
    /// No text at all.
    Empty,
    /// Entirely numeric (with grouping punctuation).
    Numeric,
    /// Currency-like: symbol or code next to digits.
    Currency,
    /// Short capitalized word run, typical of names and titles.
    ProperName,
    /// Running text of paragraph length.
    LongText,
    /// Anything else.
    Generic,
}

impl TextPattern {
    /// Classify a trimmed text string into its coarse pattern class.
    #[must_use]
    pub fn classify(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return Self::Empty;
        }
        if patterns::CURRENCY.is_match(text) {
            return Self::Currency;
        }
        if patterns::NUMERIC.is_match(text) {
            return Self::Numeric;
        }
        if text.chars().count() > 150 {
            return Self::LongText;
        }
        if patterns::PROPER_NAME.is_match(text) {
            return Self::ProperName;
        }
        Self::Generic
    }
}

/// Comparable structural descriptor of one element.
///
/// Built by [`StructureSignature::from_node`]; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureSignature {
    /// Lowercase tag name.
    pub tag: String,
    /// Class tokens, sorted for set comparison.
    pub classes: Vec<String>,
    /// Tag names of direct element children, in document order.
    pub child_tags: Vec<String>,
    /// Attribute names, sorted.
    pub attr_names: Vec<String>,
    /// Distance from the document root.
    pub depth: usize,
    /// Number of direct element children.
    pub child_count: usize,
    /// Length of the element's trimmed text content, in characters.
    pub text_len: usize,
    /// Coarse classification of the text content.
    pub text_pattern: TextPattern,
    /// Whether any descendant is an anchor.
    pub has_link: bool,
    /// Whether any descendant is an image.
    pub has_image: bool,
}

impl StructureSignature {
    /// Build the signature for one element. Pure function of element state
    /// at call time; no side effects.
    #[must_use]
    pub fn from_node(node: &NodeRef) -> Self {
        let tag = dom::tag_name(node).unwrap_or_default();

        let mut classes = dom::class_tokens(node);
        classes.sort();
        classes.dedup();

        let child_tags = dom::child_tags(node);
        let child_count = child_tags.len();

        let mut attr_names = dom::attr_names(node);
        attr_names.sort();
        attr_names.dedup();

        let text = dom::text_content(node);
        let text = text.trim();
        let text_len = text.chars().count();
        let text_pattern = TextPattern::classify(text);

        let has_link = dom::select_within(node, "a").is_some_and(|s| s.exists());
        let has_image = dom::select_within(node, "img").is_some_and(|s| s.exists());

        Self {
            tag,
            classes,
            child_tags,
            attr_names,
            depth: dom::depth(node),
            child_count,
            text_len,
            text_pattern,
            has_link,
            has_image,
        }
    }

    /// Text length bucketed into coarse tiers, for cross-page comparison.
    ///
    /// Tiers: 0 = empty, 1 = label-sized, 2 = sentence-sized,
    /// 3 = paragraph-sized, 4 = longer.
    #[must_use]
    pub fn text_len_tier(&self) -> u8 {
        match self.text_len {
            0 => 0,
            1..=20 => 1,
            21..=80 => 2,
            81..=300 => 3,
            _ => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    fn first_signature(html: &str, selector: &str) -> StructureSignature {
        let doc = Document::from(html);
        let node = *doc.select(selector).nodes().first().unwrap();
        StructureSignature::from_node(&node)
    }

    #[test]
    fn test_signature_captures_structure() {
        let sig = first_signature(
            r#"<div class="b a" data-x="1"><h3>Title Here</h3><span>body</span></div>"#,
            "div",
        );

        assert_eq!(sig.tag, "div");
        assert_eq!(sig.classes, vec!["a", "b"]); // sorted
        assert_eq!(sig.child_tags, vec!["h3", "span"]); // document order
        assert_eq!(sig.attr_names, vec!["class", "data-x"]);
        assert_eq!(sig.child_count, 2);
        assert!(!sig.has_link);
        assert!(!sig.has_image);
    }

    #[test]
    fn test_signature_detects_links_and_images() {
        let sig = first_signature(
            r#"<div><a href="/p"><img src="x.jpg"></a></div>"#,
            "div",
        );

        assert!(sig.has_link);
        assert!(sig.has_image);
    }

    #[test]
    fn test_text_pattern_classification() {
        assert_eq!(TextPattern::classify(""), TextPattern::Empty);
        assert_eq!(TextPattern::classify("  \n "), TextPattern::Empty);
        assert_eq!(TextPattern::classify("1,234"), TextPattern::Numeric);
        assert_eq!(TextPattern::classify("$19.99"), TextPattern::Currency);
        assert_eq!(TextPattern::classify("Jane Smith"), TextPattern::ProperName);
        assert_eq!(
            TextPattern::classify(&"long sentence text ".repeat(20)),
            TextPattern::LongText
        );
        assert_eq!(
            TextPattern::classify("a mixed 3 word phrase"),
            TextPattern::Generic
        );
    }

    #[test]
    fn test_text_len_tiers() {
        let mut sig = first_signature("<p></p>", "p");
        assert_eq!(sig.text_len_tier(), 0);

        sig.text_len = 15;
        assert_eq!(sig.text_len_tier(), 1);
        sig.text_len = 50;
        assert_eq!(sig.text_len_tier(), 2);
        sig.text_len = 200;
        assert_eq!(sig.text_len_tier(), 3);
        sig.text_len = 500;
        assert_eq!(sig.text_len_tier(), 4);
    }

    #[test]
    fn test_signature_roundtrips_through_serde() {
        let sig = first_signature(r#"<div class="card"><h3>Product One</h3></div>"#, "div");
        let json = serde_json::to_string(&sig).unwrap();
        let back: StructureSignature = serde_json::from_str(&json).unwrap();

        assert_eq!(back, sig);
    }
}

//! Selector Synthesizer
//!
//! Derives one selector expression addressing every member of an accepted
//! group. Preference order: shared class intersection, then tag under a
//! common parent, then the bare tag. Ids and positional indices are never
//! used: they overfit a single member and break on pages with variable
//! record counts.

use std::collections::HashMap;

use crate::dom::{self, NodeRef};

/// Synthesize the most specific selector still guaranteed to match every
/// member of the group.
#[must_use]
pub fn synthesize(members: &[NodeRef]) -> String {
    if members.is_empty() {
        return String::new();
    }

    let tag = common_tag(members).unwrap_or_else(|| dominant_tag(members));

    let mut shared = shared_classes(members);
    if !shared.is_empty() {
        shared.sort();
        return format!("{tag}.{}", shared.join("."));
    }

    if let Some(parent_tag) = exclusive_parent_tag(members, &tag) {
        return format!("{parent_tag} > {tag}");
    }

    tag
}

/// Class tokens present on every member.
fn shared_classes(members: &[NodeRef]) -> Vec<String> {
    let mut iter = members.iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };
    let mut shared = dom::class_tokens(first);
    for member in iter {
        let classes = dom::class_tokens(member);
        shared.retain(|c| classes.contains(c));
        if shared.is_empty() {
            break;
        }
    }
    shared.dedup();
    shared
}

/// The single tag all members share, if any.
fn common_tag(members: &[NodeRef]) -> Option<String> {
    let mut iter = members.iter();
    let first = dom::tag_name(iter.next()?)?;
    for member in iter {
        if dom::tag_name(member).as_deref() != Some(first.as_str()) {
            return None;
        }
    }
    Some(first)
}

/// Most frequent tag among members, for mixed-tag groups.
fn dominant_tag(members: &[NodeRef]) -> String {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for member in members {
        if let Some(tag) = dom::tag_name(member) {
            *counts.entry(tag).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(tag, _)| tag)
        .unwrap_or_default()
}

/// If all members share one parent and are exactly that parent's children of
/// the group's tag, `parentTag > tag` matches precisely the group.
fn exclusive_parent_tag(members: &[NodeRef], tag: &str) -> Option<String> {
    let first_parent = members.first()?.parent()?;
    for member in members {
        if member.parent().map(|p| p.id) != Some(first_parent.id) {
            return None;
        }
    }

    let matching_children = dom::child_elements(&first_parent)
        .iter()
        .filter(|c| dom::tag_name(c).as_deref() == Some(tag))
        .count();
    if matching_children != members.len() {
        return None;
    }

    dom::tag_name(&first_parent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    fn members_of<'a>(doc: &'a Document, selector: &str) -> Vec<NodeRef<'a>> {
        doc.select(selector).nodes().to_vec()
    }

    #[test]
    fn test_prefers_shared_classes() {
        let doc = Document::from(
            r#"
            <div class="item sale">a</div>
            <div class="item new">b</div>
            <div class="item">c</div>
        "#,
        );
        let members = members_of(&doc, "div");
        assert_eq!(synthesize(&members), "div.item");
    }

    #[test]
    fn test_shared_classes_sorted_for_stability() {
        let doc = Document::from(
            r#"
            <div class="zeta card">a</div>
            <div class="card zeta">b</div>
        "#,
        );
        let members = members_of(&doc, "div");
        assert_eq!(synthesize(&members), "div.card.zeta");
    }

    #[test]
    fn test_falls_back_to_parent_child() {
        let doc = Document::from("<ul><li>a</li><li>b</li><li>c</li></ul>");
        let members = members_of(&doc, "li");
        assert_eq!(synthesize(&members), "ul > li");
    }

    #[test]
    fn test_parent_child_rejected_when_parent_has_other_matching_children() {
        // A fourth li outside the group means "ul > li" would over-match.
        let doc = Document::from("<ul><li>a</li><li>b</li><li>c</li><li>extra</li></ul>");
        let all = members_of(&doc, "li");
        let group = &all[..3];
        assert_eq!(synthesize(group), "li");
    }

    #[test]
    fn test_falls_back_to_bare_tag_across_parents() {
        let doc = Document::from(
            "<div><article>a</article></div><div><article>b</article></div><div><article>c</article></div>",
        );
        let members = members_of(&doc, "article");
        assert_eq!(synthesize(&members), "article");
    }

    #[test]
    fn test_synthesis_is_idempotent() {
        let doc = Document::from(
            r#"
            <div class="card offer">a</div>
            <div class="card offer">b</div>
            <div class="card offer">c</div>
        "#,
        );
        let members = members_of(&doc, "div");
        let first = synthesize(&members);
        let second = synthesize(&members);
        assert_eq!(first, second);
        assert_eq!(first, "div.card.offer");
    }

    #[test]
    fn test_empty_group_yields_empty_selector() {
        assert_eq!(synthesize(&[]), "");
    }

    #[test]
    fn test_synthesized_selector_matches_all_members() {
        let doc = Document::from(
            r#"
            <div class="product featured">a</div>
            <div class="product">b</div>
            <div class="product featured">c</div>
        "#,
        );
        let members = members_of(&doc, "div.product");
        let selector = synthesize(&members);
        assert_eq!(doc.select(&selector).length(), members.len());
    }
}

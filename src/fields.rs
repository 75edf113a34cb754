//! Field Discovery & Validator
//!
//! Proposes candidate fields for a container group from two sources: the
//! classified vertical's pattern library, and dynamic discovery over the
//! first container instance. Every candidate selector is then validated
//! against every member of the group; only candidates clearing the
//! reliability floor survive, and the rest are never surfaced.

use serde::{Deserialize, Serialize};

use crate::dom::{self, NodeRef};
use crate::grouping::ContainerCandidate;
use crate::layout::LayoutProvider;
use crate::patterns;
use crate::result::Provenance;
use crate::site_type::{PatternLibrary, SiteType};
use crate::Options;

/// Semantic type of a field, inferred from its best-matching instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Link,
    Image,
    Email,
    Phone,
    Price,
    Date,
    Button,
}

impl FieldType {
    /// Lowercase label for display and correction records.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Link => "link",
            Self::Image => "image",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Price => "price",
            Self::Date => "date",
            Self::Button => "button",
        }
    }
}

/// One type matcher: the first predicate that fires decides the type.
type TypeMatcher = (FieldType, fn(&NodeRef, &str) -> bool);

/// Ordered matcher list. Order matters: a link wrapping an image is a link,
/// a heading containing a date is still a date, and so on down the chain.
const TYPE_MATCHERS: &[TypeMatcher] = &[
    (FieldType::Link, |node, _| {
        dom::tag_name(node).as_deref() == Some("a") && dom::has_attr(node, "href")
    }),
    (FieldType::Image, |node, _| {
        dom::tag_name(node).as_deref() == Some("img")
    }),
    (FieldType::Email, |node, text| {
        patterns::EMAIL.is_match(text)
            || dom::attr(node, "href").is_some_and(|h| h.starts_with("mailto:"))
    }),
    (FieldType::Phone, |node, text| {
        dom::attr(node, "href").is_some_and(|h| h.starts_with("tel:"))
            || (patterns::PHONE.is_match(text) && text.chars().filter(char::is_ascii_digit).count() >= 7)
    }),
    (FieldType::Price, |_, text| patterns::CURRENCY.is_match(text)),
    (FieldType::Date, |node, text| {
        dom::tag_name(node).as_deref() == Some("time")
            || dom::has_attr(node, "datetime")
            || patterns::DATE_TEXT.is_match(text)
    }),
    (FieldType::Button, |node, _| {
        let tag = dom::tag_name(node).unwrap_or_default();
        tag == "button"
            || dom::attr(node, "role").as_deref() == Some("button")
            || (tag == "input"
                && matches!(dom::attr(node, "type").as_deref(), Some("submit" | "button")))
    }),
];

/// Infer the semantic type of one element from the ordered matcher list.
/// Headings and everything else default to `Text`.
#[must_use]
pub fn infer_type(node: &NodeRef, text: &str) -> FieldType {
    for (field_type, matches) in TYPE_MATCHERS {
        if matches(node, text) {
            return *field_type;
        }
    }
    FieldType::Text
}

/// A field candidate that cleared validation.
#[derive(Debug, Clone)]
pub struct ValidatedField {
    pub label: String,
    pub selector: String,
    pub field_type: FieldType,
    pub confidence: f64,
    pub reliability: f64,
    pub samples: Vec<String>,
    pub provenance: Provenance,
}

/// Discover and validate fields for one container group.
///
/// Library candidates for the classified vertical are tried first (in order,
/// first validating selector wins each field name); dynamic discovery over
/// the first instance fills in whatever the library missed. An absent or
/// empty library for the vertical means dynamic discovery alone.
#[must_use]
pub fn discover_fields(
    candidate: &ContainerCandidate,
    site_type: SiteType,
    library: &PatternLibrary,
    layout: &dyn LayoutProvider,
    options: &Options,
) -> Vec<ValidatedField> {
    let mut validated: Vec<ValidatedField> = Vec::new();

    if let Some(vertical) = library.vertical(site_type) {
        for (label, selectors) in &vertical.fields {
            for selector in selectors {
                if let Some(field) = validate(
                    label,
                    selector,
                    candidate,
                    options.library_confidence_base,
                    Provenance::PatternLibrary,
                    layout,
                    options,
                ) {
                    validated.push(field);
                    break;
                }
            }
        }
    }

    for (label, selector) in dynamic_candidates(candidate, options) {
        if validated
            .iter()
            .any(|f| f.label == label || f.selector == selector)
        {
            continue;
        }
        if let Some(field) = validate(
            &label,
            &selector,
            candidate,
            options.discovery_confidence_base,
            Provenance::DynamicDiscovery,
            layout,
            options,
        ) {
            validated.push(field);
        }
    }

    validated.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    validated
}

/// Scan the first container instance for elements with non-trivial text and
/// propose `(label, selector)` pairs from their most distinctive class or
/// tag. Deduplicated by selector and capped at the most promising
/// `options.max_fields`.
fn dynamic_candidates(
    candidate: &ContainerCandidate,
    options: &Options,
) -> Vec<(String, String)> {
    let Some(first) = candidate.members.first() else {
        return Vec::new();
    };

    // (label, selector, promise) - promise ranks candidates before the cap.
    let mut proposals: Vec<(String, String, f64)> = Vec::new();

    for desc in dom::descendant_elements(first) {
        let text = dom::text_content(&desc);
        let text = text.trim();
        let text_len = text.chars().count();
        if !(2..=300).contains(&text_len) {
            continue;
        }
        let Some(tag) = dom::tag_name(&desc) else {
            continue;
        };

        let distinctive = dom::class_tokens(&desc)
            .into_iter()
            .find(|t| !patterns::is_generic_class(t));

        let (label, selector) = match distinctive {
            Some(class) => (class.to_ascii_lowercase(), format!(".{class}")),
            None => (tag.clone(), tag.clone()),
        };

        if proposals.iter().any(|(_, s, _)| *s == selector) {
            continue;
        }

        // Short labeled text and recognizable patterns promise more than
        // long undifferentiated prose.
        let mut promise = 1.0 - (text_len as f64 / 300.0) * 0.4;
        if infer_type(&desc, text) != FieldType::Text {
            promise += 0.3;
        }
        proposals.push((label, selector, promise));
    }

    proposals.sort_by(|a, b| b.2.total_cmp(&a.2));
    proposals.truncate(options.max_fields);
    proposals
        .into_iter()
        .map(|(label, selector, _)| (label, selector))
        .collect()
}

/// Validate one candidate selector against every member of the group.
///
/// Returns `None` when the selector's reliability (hit fraction) falls below
/// the floor; rejected candidates are never surfaced.
fn validate(
    label: &str,
    selector: &str,
    candidate: &ContainerCandidate,
    confidence_base: f64,
    provenance: Provenance,
    layout: &dyn LayoutProvider,
    options: &Options,
) -> Option<ValidatedField> {
    let total = candidate.members.len();
    if total == 0 {
        return None;
    }

    let mut hits = 0usize;
    let mut samples: Vec<String> = Vec::new();
    let mut semantic_total = 0.0;
    let mut best: Option<(f64, FieldType)> = None;

    for member in &candidate.members {
        let Some(selection) = dom::select_within(member, selector) else {
            continue; // invalid selector expression: counts as a miss
        };
        let Some(hit) = selection.nodes().first().copied() else {
            continue;
        };

        hits += 1;
        let text = patterns::normalize_text(&dom::text_content(&hit));
        if samples.len() < options.max_samples && !text.is_empty() {
            samples.push(text.chars().take(120).collect());
        }

        let semantic = semantic_score(label, &hit, &text, layout, options);
        semantic_total += semantic;

        let hit_type = infer_type(&hit, &text);
        if best.is_none_or(|(score, _)| semantic > score) {
            best = Some((semantic, hit_type));
        }
    }

    let reliability = hits as f64 / total as f64;
    if reliability < options.min_reliability {
        return None;
    }

    let mean_semantic = semantic_total / hits as f64;
    let consistency = sample_consistency(&samples);
    let confidence =
        (confidence_base * reliability * mean_semantic * consistency).clamp(0.0, 1.0);
    let (_, field_type) = best?;

    Some(ValidatedField {
        label: label.to_string(),
        selector: selector.to_string(),
        field_type,
        confidence,
        reliability,
        samples,
        provenance,
    })
}

/// Semantic score of one hit in [0,1]: how much this element looks like the
/// field it is labeled as.
fn semantic_score(
    label: &str,
    node: &NodeRef,
    text: &str,
    layout: &dyn LayoutProvider,
    options: &Options,
) -> f64 {
    let label = label.to_ascii_lowercase();
    let mut score: f64 = 0.3;

    // Keyword/attribute hints: the label appearing in class tokens, id, or
    // itemprop is strong evidence.
    let mut attr_haystack = dom::class_tokens(node).join(" ").to_ascii_lowercase();
    for name in ["id", "itemprop", "name", "data-field"] {
        if let Some(value) = dom::attr(node, name) {
            attr_haystack.push(' ');
            attr_haystack.push_str(&value.to_ascii_lowercase());
        }
    }
    if attr_haystack.contains(&label) {
        score += 0.25;
    }

    // Content-pattern agreement with the label.
    let pattern_hit = match label.as_str() {
        "price" | "cost" | "amount" => patterns::CURRENCY.is_match(text),
        "email" => patterns::EMAIL.is_match(text),
        "phone" | "tel" => patterns::PHONE.is_match(text),
        "date" | "timestamp" | "published" => patterns::DATE_TEXT.is_match(text),
        "author" | "name" => patterns::PROPER_NAME.is_match(text),
        _ => false,
    };
    if pattern_hit {
        score += 0.25;
    }

    // Tag hints.
    let tag = dom::tag_name(node).unwrap_or_default();
    let tag_hit = match label.as_str() {
        "title" | "headline" | "name" => matches!(tag.as_str(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6"),
        "image" => tag == "img",
        "link" => tag == "a",
        "date" => tag == "time",
        "summary" | "description" => tag == "p",
        _ => false,
    };
    if tag_hit {
        score += 0.2;
    }

    // Modest above-the-fold bonus.
    if let Some(rect) = layout.rect(node) {
        if rect.y < options.fold_height {
            score += 0.1;
        }
    }

    score.clamp(0.0, 1.0)
}

/// Consistency of the collected samples: penalizes high variance in text
/// length and inconsistent presence of numeric/symbol patterns.
fn sample_consistency(samples: &[String]) -> f64 {
    if samples.len() < 2 {
        return 1.0;
    }

    let lengths: Vec<f64> = samples.iter().map(|s| s.chars().count() as f64).collect();
    let mean = lengths.iter().sum::<f64>() / lengths.len() as f64;
    let length_score = if mean.abs() < f64::EPSILON {
        1.0
    } else {
        let variance =
            lengths.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / lengths.len() as f64;
        1.0 / (1.0 + variance.sqrt() / mean)
    };

    // Either all samples carry digits/currency marks or none should.
    let presence_score = |pred: fn(&str) -> bool| {
        let with = samples.iter().filter(|s| pred(s)).count() as f64;
        let p = with / samples.len() as f64;
        1.0 - 2.0 * p * (1.0 - p)
    };
    let digit_score = presence_score(|s| s.chars().any(|c| c.is_ascii_digit()));
    let currency_score = presence_score(|s| patterns::CURRENCY.is_match(s));

    (0.6 * length_score + 0.2 * digit_score + 0.2 * currency_score).clamp(0.0, 1.0)
}

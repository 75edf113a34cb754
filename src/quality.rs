//! Container Quality Scorer
//!
//! Scores each candidate group on sub-element richness, structural
//! consistency, visual layout regularity, and member count, combining them
//! into one composite used to accept/reject and rank groups before field
//! discovery spends validation work on them.
//!
//! Per-member analysis never aborts a pass: an element the calculators can't
//! make sense of scores 0 and the rest of the group carries on.

use std::collections::HashSet;

use crate::dom::{self, NodeRef};
use crate::fields::{infer_type, FieldType};
use crate::grouping::ContainerCandidate;
use crate::layout::{LayoutProvider, Rect};
use crate::patterns;
use crate::Options;

/// Composite weights. Base bonus is gated on minimum richness.
const W_RICHNESS: f64 = 0.4;
const W_CONSISTENCY: f64 = 0.2;
const W_VISUAL: f64 = 0.15;
const W_COUNT: f64 = 0.1;
const W_BASE_BONUS: f64 = 0.15;
const RICHNESS_FLOOR_FOR_BONUS: f64 = 0.3;

/// Per-group quality scores, all in [0,1].
#[derive(Debug, Clone, Copy)]
pub struct QualityBreakdown {
    /// Sub-element richness, sampled over the first few members.
    pub richness: f64,
    /// Structural consistency: mean pairwise similarity from grouping.
    pub consistency: f64,
    /// Visual layout regularity from member bounding boxes.
    pub visual: f64,
    /// Member count normalized against the count cap.
    pub count_factor: f64,
    /// Weighted composite, capped at 1.0.
    pub composite: f64,
}

/// Score one candidate group.
#[must_use]
pub fn score_candidate(
    candidate: &ContainerCandidate,
    layout: &dyn LayoutProvider,
    options: &Options,
) -> QualityBreakdown {
    let richness = group_richness(&candidate.members, options);
    let consistency = candidate.mean_similarity.clamp(0.0, 1.0);
    let visual = visual_score(&candidate.members, layout, options);
    let count_factor =
        (candidate.count().min(options.count_cap) as f64) / options.count_cap as f64;

    let mut composite = W_RICHNESS * richness
        + W_CONSISTENCY * consistency
        + W_VISUAL * visual
        + W_COUNT * count_factor;
    if richness > RICHNESS_FLOOR_FOR_BONUS {
        composite += W_BASE_BONUS;
    }

    QualityBreakdown {
        richness,
        consistency,
        visual,
        count_factor,
        composite: composite.clamp(0.0, 1.0),
    }
}

// === Sub-element richness ===

/// Mean member richness over a sample of the group.
fn group_richness(members: &[NodeRef], options: &Options) -> f64 {
    let sample = &members[..members.len().min(options.richness_sample)];
    if sample.is_empty() {
        return 0.0;
    }
    let total: f64 = sample.iter().map(member_richness).sum();
    (total / sample.len() as f64).clamp(0.0, 1.0)
}

/// Richness of one member: type diversity, semantic content value, content
/// depth, and interactivity.
fn member_richness(member: &NodeRef) -> f64 {
    0.35 * type_diversity(member)
        + 0.3 * semantic_value(member)
        + 0.2 * content_depth(member)
        + 0.15 * interactivity(member)
}

/// Distinct inferred field types among the member's text-bearing descendants
/// (plus the member's own media/link content), in five buckets.
fn type_diversity(member: &NodeRef) -> f64 {
    let mut types: HashSet<FieldType> = HashSet::new();

    for desc in dom::descendant_elements(member) {
        let text = dom::text_content(&desc);
        let text = text.trim();
        let inferred = infer_type(&desc, text);
        if inferred != FieldType::Text || !text.is_empty() {
            types.insert(inferred);
        }
    }
    // A leaf member still carries its own text.
    if types.is_empty() && !dom::text_content(member).trim().is_empty() {
        types.insert(FieldType::Text);
    }

    match types.len() {
        0 => 0.0,
        1 => 0.3,
        2 => 0.55,
        3 => 0.75,
        4 => 0.9,
        _ => 1.0,
    }
}

/// Semantic value of the member's content: text volume tiers, recognizable
/// content patterns, and media/link presence.
fn semantic_value(member: &NodeRef) -> f64 {
    let text = dom::text_content(member);
    let text = text.trim();
    let len = text.chars().count();

    let mut score: f64 = match len {
        0 => 0.0,
        1..=19 => 0.2,
        20..=79 => 0.5,
        80..=199 => 0.8,
        _ => 1.0,
    } * 0.5;

    if patterns::CURRENCY.is_match(text) {
        score += 0.15;
    }
    if patterns::DATE_TEXT.is_match(text) {
        score += 0.1;
    }
    if patterns::EMAIL.is_match(text) || patterns::PHONE.is_match(text) {
        score += 0.1;
    }

    let links = dom::select_within(member, "a").map_or(0, |s| s.length());
    let images = dom::select_within(member, "img").map_or(0, |s| s.length());
    score += 0.05 * links.min(3) as f64;
    score += 0.05 * images.min(2) as f64;

    score.clamp(0.0, 1.0)
}

/// Structural depth and volume, with a sweet-spot bonus for 3-20 descendant
/// elements (typical of a data record, unlike bare text nodes or whole page
/// sections).
fn content_depth(member: &NodeRef) -> f64 {
    let descendants = dom::descendant_count(member);
    let nesting = dom::max_descendant_depth(member);

    let depth_part = ((nesting as f64) / 4.0).min(1.0) * 0.5;
    let volume_part = if (3..=20).contains(&descendants) {
        0.5
    } else if descendants > 0 {
        0.2
    } else {
        0.0
    };

    depth_part + volume_part
}

/// Presence of interactive sub-elements: buttons, form controls, and links
/// beyond a single wrapping anchor.
fn interactivity(member: &NodeRef) -> f64 {
    let mut score: f64 = 0.0;

    let buttons = dom::select_within(member, "button, [role='button'], input[type='submit'], input[type='button']")
        .map_or(0, |s| s.length());
    if buttons > 0 {
        score += 0.5;
    }

    let controls = dom::select_within(member, "input, select, textarea")
        .map_or(0, |s| s.length());
    if controls > 0 {
        score += 0.25;
    }

    let links = dom::select_within(member, "a").map_or(0, |s| s.length());
    if links > 1 {
        score += 0.25;
    } else if links == 1 {
        score += 0.15;
    }

    score.clamp(0.0, 1.0)
}

// === Visual layout ===

/// Visual layout score from member bounding boxes: spacing consistency,
/// alignment, size consistency, and a grouping-distance factor rewarding
/// inter-item center distances near the configured ideal.
///
/// Fewer than 2 members with known geometry default to 0.5 (neutral).
fn visual_score(members: &[NodeRef], layout: &dyn LayoutProvider, options: &Options) -> f64 {
    let rects: Vec<Rect> = members
        .iter()
        .filter_map(|m| layout.rect(m))
        .filter(|r| !r.is_empty())
        .collect();
    if rects.len() < 2 {
        return 0.5;
    }

    let spacing = spacing_consistency(&rects);
    let alignment = alignment_score(&rects);
    let size = size_consistency(&rects);
    let grouping = grouping_distance(&rects, options.ideal_item_spacing);

    (0.3 * spacing + 0.3 * alignment + 0.25 * size + 0.15 * grouping).clamp(0.0, 1.0)
}

/// Coefficient of variation mapped into (0,1]: 1.0 for zero variance.
fn regularity(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 1.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if mean.abs() < f64::EPSILON {
        return 1.0;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    let cv = variance.sqrt() / mean.abs();
    1.0 / (1.0 + cv)
}

/// Consistency of gaps between consecutive member centers (sorted by the
/// dominant stacking axis).
fn spacing_consistency(rects: &[Rect]) -> f64 {
    let gaps = consecutive_center_distances(rects);
    if gaps.is_empty() {
        return 1.0;
    }
    regularity(&gaps)
}

/// Best alignment across left edges, top edges, and horizontal centers:
/// grids align on one axis, lists on another, so the best axis wins.
fn alignment_score(rects: &[Rect]) -> f64 {
    let lefts: Vec<f64> = rects.iter().map(|r| r.x).collect();
    let tops: Vec<f64> = rects.iter().map(|r| r.y).collect();
    let centers: Vec<f64> = rects.iter().map(|r| r.center().0).collect();

    let axis_score = |coords: &[f64]| {
        let mean = coords.iter().sum::<f64>() / coords.len() as f64;
        let deviation = coords
            .iter()
            .map(|c| (c - mean).abs())
            .sum::<f64>()
            / coords.len() as f64;
        // Deviations beyond ~40 layout units stop looking aligned.
        (1.0 - deviation / 40.0).clamp(0.0, 1.0)
    };

    axis_score(&lefts).max(axis_score(&tops)).max(axis_score(&centers))
}

/// Regularity of member widths and heights.
fn size_consistency(rects: &[Rect]) -> f64 {
    let widths: Vec<f64> = rects.iter().map(|r| r.width).collect();
    let heights: Vec<f64> = rects.iter().map(|r| r.height).collect();
    (regularity(&widths) + regularity(&heights)) / 2.0
}

/// Rewards mean neighbor-center distance near the ideal inter-item spacing.
fn grouping_distance(rects: &[Rect], ideal: f64) -> f64 {
    let distances = consecutive_center_distances(rects);
    if distances.is_empty() || ideal <= 0.0 {
        return 0.5;
    }
    let mean = distances.iter().sum::<f64>() / distances.len() as f64;
    (1.0 - ((mean - ideal).abs() / ideal).min(1.0)).clamp(0.0, 1.0)
}

/// Distances between consecutive member centers, ordered along the dominant
/// stacking axis (vertical lists sort by y, horizontal rows by x).
fn consecutive_center_distances(rects: &[Rect]) -> Vec<f64> {
    let y_span = span(rects.iter().map(|r| r.center().1));
    let x_span = span(rects.iter().map(|r| r.center().0));

    let mut sorted: Vec<&Rect> = rects.iter().collect();
    if y_span >= x_span {
        sorted.sort_by(|a, b| a.center().1.total_cmp(&b.center().1));
    } else {
        sorted.sort_by(|a, b| a.center().0.total_cmp(&b.center().0));
    }

    sorted
        .windows(2)
        .map(|w| w[0].center_distance(w[1]))
        .collect()
}

fn span(values: impl Iterator<Item = f64>) -> f64 {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if max > min { max - min } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use crate::grouping::collect_candidates;
    use crate::layout::{AttrLayout, NoLayout};

    fn score_first(html: &str) -> QualityBreakdown {
        let doc = Document::from(html);
        let options = Options::default();
        let candidates = collect_candidates(&doc, &NoLayout, &options);
        assert!(!candidates.is_empty(), "no candidate groups");
        score_candidate(&candidates[0], &NoLayout, &options)
    }

    #[test]
    fn test_rich_product_cards_score_above_floor() {
        let html = r#"
            <div class="product"><a href="/1"><img src="1.jpg"></a><h3>Alpha Widget</h3><span class="price">$19.99</span><button>Add</button></div>
            <div class="product"><a href="/2"><img src="2.jpg"></a><h3>Beta Widget</h3><span class="price">$24.99</span><button>Add</button></div>
            <div class="product"><a href="/3"><img src="3.jpg"></a><h3>Gamma Widget</h3><span class="price">$14.99</span><button>Add</button></div>
            <div class="product"><a href="/4"><img src="4.jpg"></a><h3>Delta Widget</h3><span class="price">$29.99</span><button>Add</button></div>
        "#;
        let q = score_first(html);

        assert!(q.richness > 0.3, "richness {}", q.richness);
        assert!(q.composite >= 0.5, "composite {}", q.composite);
        assert!(q.composite <= 1.0);
    }

    #[test]
    fn test_bare_text_snippets_score_below_floor() {
        let html = r#"
            <span class="tag">a</span>
            <span class="tag">b</span>
            <span class="tag">c</span>
            <span class="tag">d</span>
        "#;
        let q = score_first(html);

        assert!(q.richness < 0.3, "richness {}", q.richness);
        assert!(q.composite < 0.5, "composite {}", q.composite);
    }

    #[test]
    fn test_visual_neutral_without_layout() {
        let html = r#"
            <div class="c"><h3>A</h3></div>
            <div class="c"><h3>B</h3></div>
            <div class="c"><h3>C</h3></div>
        "#;
        let q = score_first(html);
        assert!((q.visual - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_regular_vertical_list_scores_high_visually() {
        let html = r#"
            <div class="c" data-rect="0,0,400,180"><h3>A</h3></div>
            <div class="c" data-rect="0,200,400,180"><h3>B</h3></div>
            <div class="c" data-rect="0,400,400,180"><h3>C</h3></div>
            <div class="c" data-rect="0,600,400,180"><h3>D</h3></div>
        "#;
        let doc = Document::from(html);
        let options = Options::default();
        let layout = AttrLayout::default();
        let candidates = collect_candidates(&doc, &layout, &options);
        let q = score_candidate(&candidates[0], &layout, &options);

        // Identical sizes, perfect left alignment, 200-unit spacing.
        assert!(q.visual > 0.9, "visual {}", q.visual);
    }

    #[test]
    fn test_irregular_layout_scores_lower_than_regular() {
        let regular = r#"
            <div class="c" data-rect="0,0,400,180"><h3>A</h3></div>
            <div class="c" data-rect="0,200,400,180"><h3>B</h3></div>
            <div class="c" data-rect="0,400,400,180"><h3>C</h3></div>
        "#;
        let irregular = r#"
            <div class="c" data-rect="0,0,400,60"><h3>A</h3></div>
            <div class="c" data-rect="130,900,210,400"><h3>B</h3></div>
            <div class="c" data-rect="40,1000,80,20"><h3>C</h3></div>
        "#;
        let options = Options::default();
        let layout = AttrLayout::default();

        let doc_a = Document::from(regular);
        let a = collect_candidates(&doc_a, &layout, &options);
        let qa = score_candidate(&a[0], &layout, &options);

        let doc_b = Document::from(irregular);
        let b = collect_candidates(&doc_b, &layout, &options);
        let qb = score_candidate(&b[0], &layout, &options);

        assert!(qa.visual > qb.visual);
    }

    #[test]
    fn test_composite_clamped_to_unit_interval() {
        let q = score_first(
            r#"
            <article class="x"><a href="/"><img src="a"></a><h2>Very Long Product Name Here</h2>
              <span>$10.00</span><span>2024-01-01</span><button>Buy</button>
              <p>A reasonably long description with plenty of words in it for scoring.</p></article>
            <article class="x"><a href="/"><img src="b"></a><h2>Very Long Product Name Here</h2>
              <span>$12.00</span><span>2024-01-02</span><button>Buy</button>
              <p>A reasonably long description with plenty of words in it for scoring.</p></article>
            <article class="x"><a href="/"><img src="c"></a><h2>Very Long Product Name Here</h2>
              <span>$13.00</span><span>2024-01-03</span><button>Buy</button>
              <p>A reasonably long description with plenty of words in it for scoring.</p></article>
        "#,
        );
        assert!(q.composite <= 1.0);
        assert!(q.composite >= 0.0);
    }

    #[test]
    fn test_count_factor_normalized_against_cap() {
        let many: String = (0..12)
            .map(|i| format!(r#"<li class="r"><h4>Row {i}</h4><span>${i}.00</span></li>"#))
            .collect();
        let html = format!("<ul>{many}</ul>");
        let q = score_first(&html);
        assert!((q.count_factor - 1.0).abs() < f64::EPSILON);
    }
}

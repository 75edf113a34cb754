//! Bounding-box access for visual layout scoring.
//!
//! The engine never computes layout itself; geometry comes from the
//! out-of-scope rendering layer. `LayoutProvider` is the seam: the host
//! either implements it directly over its browser bridge, or has the
//! renderer annotate elements with a rect attribute and uses [`AttrLayout`].

use crate::dom::{self, NodeRef};

/// Axis-aligned bounding box in layout units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Center point of the rect.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether the rect has zero rendered area.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Euclidean distance between the centers of two rects.
    #[must_use]
    pub fn center_distance(&self, other: &Rect) -> f64 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }
}

/// Source of bounding boxes for document elements.
pub trait LayoutProvider {
    /// Bounding box of the element, or `None` if the provider has no
    /// geometry for it.
    fn rect(&self, node: &NodeRef) -> Option<Rect>;
}

/// Reads rects from an attribute the renderer injected, `"x,y,w,h"`.
///
/// # Example
///
/// ```rust
/// use pattern_scout::dom::Document;
/// use pattern_scout::layout::{AttrLayout, LayoutProvider};
///
/// let doc = Document::from(r#"<div data-rect="10,20,300,80">x</div>"#);
/// let node = *doc.select("div").nodes().first().unwrap();
/// let layout = AttrLayout::default();
/// let rect = layout.rect(&node).unwrap();
/// assert_eq!(rect.width, 300.0);
/// ```
#[derive(Debug, Clone)]
pub struct AttrLayout {
    attr: String,
}

impl AttrLayout {
    /// Provider reading the given attribute name.
    #[must_use]
    pub fn new(attr: impl Into<String>) -> Self {
        Self { attr: attr.into() }
    }
}

impl Default for AttrLayout {
    fn default() -> Self {
        Self::new("data-rect")
    }
}

impl LayoutProvider for AttrLayout {
    fn rect(&self, node: &NodeRef) -> Option<Rect> {
        let raw = dom::attr(node, &self.attr)?;
        let mut parts = raw.split(',').map(|p| p.trim().parse::<f64>());
        let x = parts.next()?.ok()?;
        let y = parts.next()?.ok()?;
        let width = parts.next()?.ok()?;
        let height = parts.next()?.ok()?;
        Some(Rect { x, y, width, height })
    }
}

/// Provider with no geometry at all.
///
/// Visual scoring degrades to its neutral default and zero-size filtering
/// is skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLayout;

impl LayoutProvider for NoLayout {
    fn rect(&self, _node: &NodeRef) -> Option<Rect> {
        None
    }
}

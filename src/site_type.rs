//! Site-Type Classifier
//!
//! Scores the document against vertical-specific indicator selectors to pick
//! which field pattern library detection should prefer. The pattern library
//! itself is static configuration data, deserializable from JSON so hosts can
//! ship their own; a built-in default covers the common verticals.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dom::{self, Document};
use crate::error::{Error, Result};

/// Vertical classification of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteType {
    Ecommerce,
    Directory,
    News,
    RealEstate,
    /// No vertical matched, or several tied: no preferred pattern library.
    Generic,
}

/// A named container pattern: selectors that typically address repeating
/// records on this kind of site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerPattern {
    pub name: String,
    pub selectors: Vec<String>,
}

/// Patterns for one vertical: classification indicators, known container
/// shapes, and ordered field-selector candidates per semantic field name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerticalPatterns {
    /// Selectors whose match counts vote for this vertical.
    #[serde(default)]
    pub indicators: Vec<String>,
    /// Known container shapes, used for labeling suggestions.
    #[serde(default)]
    pub containers: Vec<ContainerPattern>,
    /// Ordered candidate selectors per semantic field name. Order matters:
    /// the first selector that validates wins the field.
    #[serde(default)]
    pub fields: BTreeMap<String, Vec<String>>,
}

/// Versioned pattern configuration for all verticals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternLibrary {
    #[serde(default)]
    pub verticals: BTreeMap<SiteType, VerticalPatterns>,
}

impl PatternLibrary {
    /// Parse a library from JSON configuration data.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidPatternLibrary(e.to_string()))
    }

    /// Patterns for a vertical, if the library has any.
    #[must_use]
    pub fn vertical(&self, site_type: SiteType) -> Option<&VerticalPatterns> {
        self.verticals.get(&site_type)
    }

    /// The built-in default library.
    #[must_use]
    pub fn builtin() -> Self {
        let mut verticals = BTreeMap::new();

        verticals.insert(SiteType::Ecommerce, VerticalPatterns {
            indicators: strings(&[
                "[class*='product']", "[class*='price']", "[class*='cart']",
                "[class*='sku']", "[class*='add-to-cart']", "[class*='checkout']",
            ]),
            containers: vec![
                container("product card", &[".product", ".product-card", ".product-item", "li.product", ".item"]),
            ],
            fields: field_map(&[
                ("title", &["h2", "h3", "[class*='product-title']", "[class*='title']", "[class*='name']"]),
                ("price", &["[class*='price']", "[class*='amount']", "[class*='cost']"]),
                ("image", &["img"]),
                ("link", &["a[href]"]),
                ("rating", &["[class*='rating']", "[class*='stars']"]),
            ]),
        });

        verticals.insert(SiteType::Directory, VerticalPatterns {
            indicators: strings(&[
                "[class*='listing']", "[class*='business']", "[class*='review']",
                "[class*='rating']", "[class*='phone']", "[class*='address']",
            ]),
            containers: vec![
                container("listing", &[".listing", ".listing-item", ".business", ".result"]),
            ],
            fields: field_map(&[
                ("name", &["h2", "h3", "[class*='name']", "[class*='title']"]),
                ("phone", &["[class*='phone']", "[class*='tel']", "a[href^='tel:']"]),
                ("email", &["a[href^='mailto:']", "[class*='email']"]),
                ("address", &["[class*='address']", "address"]),
                ("link", &["a[href]"]),
            ]),
        });

        verticals.insert(SiteType::News, VerticalPatterns {
            indicators: strings(&[
                "article", "[class*='article']", "[class*='headline']",
                "[class*='byline']", "time", "[class*='story']",
            ]),
            containers: vec![
                container("article teaser", &["article", ".article", ".story", ".post", ".teaser"]),
            ],
            fields: field_map(&[
                ("title", &["h1", "h2", "h3", "[class*='headline']", "[class*='title']"]),
                ("date", &["time", "[datetime]", "[class*='date']", "[class*='timestamp']"]),
                ("author", &["[class*='byline']", "[class*='author']", "[rel='author']"]),
                ("summary", &["p", "[class*='summary']", "[class*='excerpt']", "[class*='teaser']"]),
                ("link", &["a[href]"]),
            ]),
        });

        verticals.insert(SiteType::RealEstate, VerticalPatterns {
            indicators: strings(&[
                "[class*='property']", "[class*='estate']", "[class*='beds']",
                "[class*='baths']", "[class*='sqft']", "[class*='agent']",
            ]),
            containers: vec![
                container("property card", &[".property", ".property-card", ".listing", ".estate-item"]),
            ],
            fields: field_map(&[
                ("title", &["h2", "h3", "[class*='address']", "[class*='title']"]),
                ("price", &["[class*='price']"]),
                ("beds", &["[class*='beds']", "[class*='bedroom']"]),
                ("baths", &["[class*='baths']", "[class*='bathroom']"]),
                ("image", &["img"]),
                ("link", &["a[href]"]),
            ]),
        });

        Self { verticals }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn container(name: &str, selectors: &[&str]) -> ContainerPattern {
    ContainerPattern { name: name.to_string(), selectors: strings(selectors) }
}

fn field_map(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(name, sels)| ((*name).to_string(), strings(sels)))
        .collect()
}

/// Classify the document: the vertical with the highest non-zero indicator
/// match count wins; ties or an all-zero result yield `Generic`.
#[must_use]
pub fn classify(doc: &Document, library: &PatternLibrary) -> SiteType {
    let mut best = SiteType::Generic;
    let mut best_count = 0usize;
    let mut tied = false;

    for (site_type, patterns) in &library.verticals {
        let count: usize = patterns
            .indicators
            .iter()
            .filter_map(|sel| dom::select_in_document(doc, sel))
            .map(|s| s.length())
            .sum();

        if count > best_count {
            best = *site_type;
            best_count = count;
            tied = false;
        } else if count == best_count && count > 0 {
            tied = true;
        }
    }

    if best_count == 0 || tied {
        SiteType::Generic
    } else {
        best
    }
}

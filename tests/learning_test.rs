#![allow(clippy::unwrap_used, clippy::expect_used)] // appropriate in tests for clear panic messages

use chrono::{Duration, Utc};
use pattern_scout::dom::Document;
use pattern_scout::{
    Correction, CorrectionKind, CorrectionStore, DetectionEngine, FieldType, MemoryBackend,
    NoLayout, Provenance, StorageBackend,
};

const SHOP: &str = r#"
    <div class="grid">
        <div class="item"><h3 class="title">Alpha</h3><span class="price">$19.99</span></div>
        <div class="item"><h3 class="title">Beta</h3><span class="price">$24.99</span></div>
        <div class="item"><h3 class="title">Gamma</h3><span class="price">$14.99</span></div>
        <div class="item"><h3 class="title">Delta</h3><span class="price">$29.99</span></div>
        <div class="item"><h3 class="title">Epsilon</h3><span class="price">$9.99</span></div>
    </div>
"#;

const URL: &str = "https://shop.example.com/catalog";

#[test]
fn container_correction_is_reapplied_on_next_pass() {
    let engine = DetectionEngine::new(MemoryBackend::default());
    let doc = Document::from(SHOP);

    let first = engine.detect(&doc, &NoLayout, Some(URL)).unwrap();
    assert_eq!(first.containers[0].selector, "div.item");
    assert!(!first.containers[0].learning_applied);

    engine.record_container_correction(URL, "div.item", "div.item.in-stock", None);

    let second = engine.detect(&doc, &NoLayout, Some(URL)).unwrap();
    assert_eq!(second.containers[0].selector, "div.item.in-stock");
    assert!(second.containers[0].learning_applied);
}

#[test]
fn field_correction_changes_provenance() {
    let engine = DetectionEngine::new(MemoryBackend::default());
    let doc = Document::from(SHOP);

    engine.record_field_correction(
        URL,
        "price",
        Some(FieldType::Price),
        "[class*='price']",
        ".price-current",
    );

    let report = engine.detect(&doc, &NoLayout, Some(URL)).unwrap();
    let price = report.containers[0]
        .fields
        .iter()
        .find(|f| f.label == "price")
        .expect("price field");
    assert_eq!(price.selector, ".price-current");
    assert!(price.learning_applied);
    assert_eq!(price.provenance, Provenance::LearnedCorrection);
}

#[test]
fn corrections_stay_scoped_to_their_domain() {
    let engine = DetectionEngine::new(MemoryBackend::default());
    let doc = Document::from(SHOP);

    engine.record_container_correction(URL, "div.item", "div.item.in-stock", None);

    let elsewhere = engine
        .detect(&doc, &NoLayout, Some("https://other.example.com/list"))
        .unwrap();
    assert_eq!(elsewhere.containers[0].selector, "div.item");
    assert!(!elsewhere.containers[0].learning_applied);
}

#[test]
fn detection_without_url_skips_learning() {
    let engine = DetectionEngine::new(MemoryBackend::default());
    let doc = Document::from(SHOP);

    engine.record_container_correction(URL, "div.item", "div.item.in-stock", None);

    let report = engine.detect(&doc, &NoLayout, None).unwrap();
    assert_eq!(report.containers[0].selector, "div.item");
    assert!(!report.containers[0].learning_applied);
}

#[test]
fn expired_corrections_no_longer_apply() {
    let backend = MemoryBackend::default();
    let engine = DetectionEngine::new(backend.clone());
    let doc = Document::from(SHOP);

    let expired = Correction {
        id: "old".to_string(),
        domain: "shop.example.com".to_string(),
        timestamp: Utc::now() - Duration::days(45),
        kind: CorrectionKind::Container,
        original_selector: "div.item".to_string(),
        corrected_selector: "div.item.in-stock".to_string(),
        signature: None,
        field_label: None,
        field_type: None,
        confidence: 1.0,
    };
    let key = CorrectionStore::<MemoryBackend>::domain_key("shop.example.com");
    backend
        .write(&key, &serde_json::to_vec(&vec![expired]).unwrap())
        .unwrap();

    let report = engine.detect(&doc, &NoLayout, Some(URL)).unwrap();
    assert_eq!(report.containers[0].selector, "div.item");
    assert!(!report.containers[0].learning_applied);

    // The record survives until an explicit clear.
    assert!(backend.read(&key).unwrap().is_some());
    assert_eq!(engine.learning_stats().corrections, 1);
    engine.clear_learned(URL);
    assert_eq!(engine.learning_stats().corrections, 0);
}

#[test]
fn selector_improvement_overwrites_matching_selectors() {
    let engine = DetectionEngine::new(MemoryBackend::default());
    let doc = Document::from(SHOP);

    engine.record_selector_improvement(URL, "div.item", "div.grid > div.item");

    let report = engine.detect(&doc, &NoLayout, Some(URL)).unwrap();
    assert_eq!(report.containers[0].selector, "div.grid > div.item");
    assert!(report.containers[0].learning_applied);
}

#[test]
fn learning_stats_reflect_recorded_corrections() {
    let engine = DetectionEngine::new(MemoryBackend::default());
    let stats = engine.learning_stats();
    assert_eq!(stats.domains, 0);
    assert_eq!(stats.corrections, 0);

    engine.record_container_correction(URL, "div.item", "div.item.in-stock", None);
    engine.record_field_correction(URL, "price", Some(FieldType::Price), ".price", ".amount");
    engine.record_selector_improvement("https://other.example.com/", ".row", "ul > li.row");

    let stats = engine.learning_stats();
    assert_eq!(stats.domains, 2);
    assert_eq!(stats.corrections, 3);
}

#[test]
fn shared_backend_shares_learning_across_engines() {
    let backend = MemoryBackend::default();
    let doc = Document::from(SHOP);

    let writer = DetectionEngine::new(backend.clone());
    writer.record_container_correction(URL, "div.item", "div.item.in-stock", None);

    let reader = DetectionEngine::new(backend);
    let report = reader.detect(&doc, &NoLayout, Some(URL)).unwrap();
    assert_eq!(report.containers[0].selector, "div.item.in-stock");
}

use localaudit::content;
use localaudit::filter::WeaknessFilter;
use localaudit::models::{DetailItem, Horizon};
use localaudit::text::{normalize, slugify};
use serde_json::json;

#[test]
fn normalize_is_idempotent_on_arbitrary_input() {
    let samples = [
        "",
        "Boulangerie « Au Pain Doré » \u{2014} ouverte 7j/7\u{2026}",
        "\u{1F600}\u{2603}\u{FE0F} nothing renderable here \u{1F680}",
        "mixed: œuvre, €20, na\u{0308}ive",
    ];
    for sample in samples {
        let once = normalize(sample);
        let twice = normalize(&once);
        assert_eq!(once, twice, "normalize not idempotent for {sample:?}");
    }
}

#[test]
fn normalize_never_panics_on_fully_foreign_text() {
    // Entirely outside the target alphabet: collapses, does not raise.
    let out = normalize("日本語のテキスト");
    assert!(out.chars().all(|c| c.is_ascii() || ('\u{00A1}'..='\u{00FF}').contains(&c)));
}

#[test]
fn normalize_keeps_french_accents_and_replaces_typography() {
    assert_eq!(
        normalize("L\u{2019}équipe a noté \u{201C}très bien\u{201D}"),
        "L'équipe a noté \"très bien\""
    );
}

#[test]
fn slugify_matches_filename_rules() {
    assert_eq!(slugify("Café de l'Église", 50), "Cafe_de_l_Eglise");
    assert_eq!(slugify("Cafe Test", 50), "Cafe_Test");
    let long = "x".repeat(120);
    assert_eq!(slugify(&long, 50).len(), 50);
}

#[test]
fn content_normalizer_canonical_cases() {
    let input = json!([
        "a",
        {"title": "b", "description": "d"},
        {"titre": "c"},
        {"description": "only-desc"}
    ]);
    let items = content::detail_items(&input);
    assert_eq!(
        items,
        vec![
            DetailItem::new("a", ""),
            DetailItem::new("b", "d"),
            DetailItem::new("c", ""),
        ]
    );
}

#[test]
fn content_normalizer_rejects_non_lists() {
    assert!(content::detail_items(&json!({"title": "x"})).is_empty());
    assert!(content::detail_items(&json!(42)).is_empty());
    assert!(content::detail_items(&json!(null)).is_empty());
}

#[test]
fn action_items_default_horizon_applies() {
    let input = json!([{"title": "Ajouter des photos"}]);
    let actions = content::action_items(&input, Horizon::LongTerm);
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].priority, Horizon::LongTerm);
}

#[test]
fn filter_is_identity_without_reviews() {
    let filter = WeaknessFilter::new().unwrap();
    let weaknesses = vec![
        DetailItem::new("Zéro avis client", ""),
        DetailItem::new("Absence totale d'avis", "aucun avis sur la fiche"),
    ];
    assert_eq!(filter.apply(weaknesses.clone(), 0), weaknesses);
}

#[test]
fn filter_removes_hallucinated_absence_with_reviews_present() {
    let filter = WeaknessFilter::new().unwrap();
    let weaknesses = vec![
        DetailItem::new("Absence of customer reviews", ""),
        DetailItem::new("Reviews mention slow response time", ""),
    ];
    let kept = filter.apply(weaknesses, 12);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].title, "Reviews mention slow response time");
}

#[test]
fn filter_proximity_rule_and_conservative_bias() {
    let filter = WeaknessFilter::new().unwrap();
    // Negation right before a review mention: hallucination.
    assert!(filter.is_review_hallucination("fiche sans aucun avis récent"));
    // Review mention far from the negation: kept.
    assert!(!filter.is_review_hallucination(
        "absence de stratégie claire pour le contenu local et la gestion des avis"
    ));
    // Quality complaint near the word avis: kept.
    assert!(!filter.is_review_hallucination("les avis mentionnent des délais de réponse"));
}

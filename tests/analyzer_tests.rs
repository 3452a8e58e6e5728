use localaudit::analyzer::Analyzer;
use localaudit::planner::plan_from_response;
use localaudit::recovery::recover_json;
use serde_json::json;

#[test]
fn recovery_parses_clean_json() {
    assert_eq!(recover_json("{\"score\":1}"), json!({"score": 1}));
}

#[test]
fn recovery_parses_json_buried_in_prose() {
    assert_eq!(
        recover_json("noise {\"score\":1} trailing"),
        json!({"score": 1})
    );
}

#[test]
fn recovery_degrades_to_empty_object() {
    assert_eq!(recover_json("not json at all"), json!({}));
}

#[test]
fn recovery_handles_markdown_fences() {
    let raw = "Bien sûr !\n```json\n{\"score\": 55, \"forces\": []}\n```";
    assert_eq!(recover_json(raw), json!({"score": 55, "forces": []}));
}

#[test]
fn analysis_mapping_normalizes_and_filters() {
    let analyzer = Analyzer::new().unwrap();
    let raw = json!({
        "score": 64,
        "forces": ["Bonne fiche Google", {"titre": "Bien situé", "description": "centre-ville"}],
        "faiblesses": [
            {"title": "Aucun avis client", "description": ""},
            {"title": "Pas de balises title optimisées", "description": ""}
        ]
    })
    .to_string();

    let result = analyzer.from_response(&raw, 25);
    assert_eq!(result.score, 64);
    assert_eq!(result.strengths.len(), 2);
    assert_eq!(result.strengths[1].title, "Bien situé");
    // "Aucun avis client" contradicts the 25 known reviews and is dropped.
    assert_eq!(result.weaknesses.len(), 1);
    assert_eq!(result.weaknesses[0].title, "Pas de balises title optimisées");
}

#[test]
fn analysis_mapping_keeps_absence_claims_when_no_reviews_exist() {
    let analyzer = Analyzer::new().unwrap();
    let raw = json!({
        "score": 40,
        "faiblesses": [{"title": "Aucun avis client", "description": ""}]
    })
    .to_string();

    let result = analyzer.from_response(&raw, 0);
    assert_eq!(result.weaknesses.len(), 1);
}

#[test]
fn analysis_score_is_clamped_and_coerced() {
    let analyzer = Analyzer::new().unwrap();
    assert_eq!(analyzer.from_response("{\"score\": 130}", 0).score, 100);
    assert_eq!(analyzer.from_response("{\"score\": -10}", 0).score, 0);
    assert_eq!(analyzer.from_response("{\"score\": \"77\"}", 0).score, 77);
    assert_eq!(analyzer.from_response("{\"score\": 66.6}", 0).score, 66);
    assert_eq!(analyzer.from_response("{\"score\": \"n/a\"}", 0).score, 0);
}

#[test]
fn plan_mapping_reads_all_three_horizons() {
    let raw = json!({
        "short_term": [{"titre": "Photos récentes", "description": "sur la fiche"}],
        "mid_term": [{"title": "Campagne d'avis"}],
        "long_term": ["Contenu local mensuel"]
    })
    .to_string();

    let plan = plan_from_response(&raw);
    assert_eq!(plan.short_term[0].title, "Photos récentes");
    assert_eq!(plan.mid_term[0].title, "Campagne d'avis");
    assert_eq!(plan.long_term[0].title, "Contenu local mensuel");
}

#[test]
fn plan_mapping_drops_untitled_entries_and_survives_garbage() {
    let plan = plan_from_response("{\"short_term\": [{\"description\": \"sans titre\"}]}");
    assert!(plan.short_term.is_empty());

    let plan = plan_from_response("je ne peux pas produire de JSON");
    assert!(plan.is_empty());
}

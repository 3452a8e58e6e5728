use localaudit::config::ReportStyle;
use localaudit::error::AuditError;
use localaudit::models::{
    ActionPlan, AnalysisResult, BusinessProfile, DetailItem, MIN_REPORT_BYTES,
};
use localaudit::report::{report_filename, verify_report_bytes, ReportData, ReportEngine};

fn profile() -> BusinessProfile {
    BusinessProfile {
        name: "Café de l'Église".to_string(),
        address: "12 rue des Lilas, Lyon".to_string(),
        website: Some("https://cafe-eglise.fr".to_string()),
        phone: Some("+33 4 78 00 00 00".to_string()),
        rating: 4.4,
        review_count: 37,
        category: Some("Café".to_string()),
        photos: vec![],
        gps_coordinates: None,
        place_id: Some("ChIJtest".to_string()),
    }
}

fn analysis() -> AnalysisResult {
    AnalysisResult {
        score: 72,
        strengths: vec![
            DetailItem::new("Fiche Google complète", "NAP cohérent sur tout le web"),
            DetailItem::new("Bonne note moyenne", "4,4/5 sur 37 avis"),
        ],
        weaknesses: vec![DetailItem::new(
            "Pas de blog local",
            "Aucun contenu ciblant les requêtes de quartier",
        )],
        message: None,
    }
}

fn plan() -> ActionPlan {
    ActionPlan {
        short_term: vec![DetailItem::new("Photos récentes", "Publier 5 photos")],
        mid_term: vec![DetailItem::new("Campagne d'avis", "Relancer les clients fidèles")],
        long_term: vec![DetailItem::new("Contenu local", "Une page par quartier desservi")],
    }
}

#[test]
fn rendered_report_exceeds_corruption_threshold() {
    let engine = ReportEngine::new(ReportStyle::default());
    let rendered = engine
        .render(&ReportData {
            profile: &profile(),
            analysis: &analysis(),
            plan: &plan(),
        })
        .unwrap();

    assert!(rendered.bytes.len() > MIN_REPORT_BYTES);
    assert!(rendered.bytes.starts_with(b"%PDF"));
    assert!(rendered.filename.starts_with("audit_Cafe_de_l_Eglise_"));
    assert!(rendered.filename.ends_with(".pdf"));
}

#[test]
fn degenerate_analysis_still_renders_a_document() {
    let engine = ReportEngine::new(ReportStyle::default());
    let degenerate = AnalysisResult::degenerate(
        "Site web non fourni ou inaccessible, analyse impossible.",
    );
    let rendered = engine
        .render(&ReportData {
            profile: &profile(),
            analysis: &degenerate,
            plan: &ActionPlan::default(),
        })
        .unwrap();

    assert!(rendered.bytes.len() > MIN_REPORT_BYTES);
}

#[test]
fn long_content_paginates_instead_of_failing() {
    let engine = ReportEngine::new(ReportStyle::default());
    let mut big = analysis();
    for i in 0..60 {
        big.weaknesses.push(DetailItem::new(
            format!("Faiblesse numéro {}", i),
            "Une description suffisamment longue pour occuper plusieurs lignes une fois \
             repliée par l'algorithme de césure glouton du moteur de mise en page."
                .to_string(),
        ));
    }

    let rendered = engine
        .render(&ReportData {
            profile: &profile(),
            analysis: &big,
            plan: &plan(),
        })
        .unwrap();

    // Multi-page documents carry one /Page object per page.
    let text = String::from_utf8_lossy(&rendered.bytes).into_owned();
    assert!(rendered.bytes.len() > MIN_REPORT_BYTES * 2);
    assert!(text.contains("/Pages"));
}

#[test]
fn hostile_text_never_aborts_the_render() {
    let engine = ReportEngine::new(ReportStyle::default());
    let mut nasty = analysis();
    nasty.strengths.push(DetailItem::new(
        "\u{1F600}\u{1F680}\u{2603}",
        "x".repeat(500),
    ));
    nasty.weaknesses.push(DetailItem::new(
        "Titre avec\nretours à la ligne\u{2026}",
        "日本語のテキスト",
    ));

    assert!(engine
        .render(&ReportData {
            profile: &profile(),
            analysis: &nasty,
            plan: &plan(),
        })
        .is_ok());
}

#[test]
fn undersized_document_is_a_render_failure() {
    let err = verify_report_bytes(&[0u8; 10]).unwrap_err();
    assert!(matches!(err, AuditError::RenderFailed(_)));
}

#[test]
fn filename_uses_slug_and_timestamp_shape() {
    let name = report_filename("Chez Ça & Là");
    // audit_<slug>_<YYYYMMDD>_<HHMMSS>.pdf
    let stem = name.strip_suffix(".pdf").unwrap();
    let parts: Vec<&str> = stem.split('_').collect();
    assert_eq!(parts[0], "audit");
    let timestamp_len: usize = parts[parts.len() - 2].len() + parts[parts.len() - 1].len();
    assert_eq!(timestamp_len, 8 + 6);
}

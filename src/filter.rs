use anyhow::Result;
use regex::Regex;
use tracing::debug;

use crate::models::DetailItem;

/// Exact phrasings of "this business has no reviews", in the report's
/// working language and their English equivalents. Matched case-insensitively
/// against the combined title + description text.
const EXACT_PHRASES: &[&str] = &[
    // Français
    "absence d'avis",
    "zéro avis",
    "pas d'avis",
    "aucun avis",
    "manque d'avis",
    "peu d'avis",
    "insuffisant d'avis",
    "absence de retours",
    "manque de retours",
    "pas de retours",
    "aucun retour",
    "zéro retour",
    "nombre d'avis faible",
    "avis insuffisants",
    "retours insuffisants",
    "évaluations insuffisantes",
    "pas d'évaluations",
    "aucune évaluation",
    "manque d'évaluations",
    "absence d'évaluations",
    "nombre d'évaluations faible",
    "reviews insuffisants",
    "pas de reviews",
    "aucun review",
    "manque de reviews",
    "absence de reviews",
    "commentaires insuffisants",
    "pas de commentaires",
    "aucun commentaire",
    "manque de commentaires",
    "absence de commentaires",
    "témoignages insuffisants",
    "pas de témoignages",
    "aucun témoignage",
    "manque de témoignages",
    "absence de témoignages",
    "feedback insuffisant",
    "pas de feedback",
    "aucun feedback",
    "manque de feedback",
    "absence de feedback",
    // Variantes avec 0 et zéro
    "0 avis",
    "0 retour",
    "0 évaluation",
    "0 commentaire",
    "0 témoignage",
    "zero avis",
    "zero retour",
    "zero évaluation",
    "zero commentaire",
    // Phrases complètes communes
    "absence totale d'avis",
    "manque total d'avis",
    "aucun avis client",
    "pas d'avis client",
    "zéro avis client",
    "0 avis client",
    // English equivalents
    "no reviews",
    "zero reviews",
    "no customer reviews",
    "absence of reviews",
    "lack of reviews",
    "insufficient reviews",
    "0 reviews",
];

/// Negation tokens for the proximity rule. A hallucination is assumed when
/// one of these occurs within [`PROXIMITY_WINDOW`] tokens before a review
/// mention.
const NEGATION_TOKENS: &[&str] = &[
    "absence", "zéro", "zero", "0", "aucun", "aucune", "pas", "manque", "sans", "none", "lacking",
    "without",
];

const PROXIMITY_WINDOW: usize = 5;

/// Tokens counting as a mention of reviews (substring match, so plural and
/// punctuation-attached forms are covered).
const REVIEW_MARKERS: &[&str] = &["avis", "review", "évaluation", "evaluation"];

enum Rule {
    ExactPhrases(&'static [&'static str]),
    NegationProximity { window: usize },
}

/// Heuristic classifier dropping weaknesses that assert the business has no
/// reviews when the fetched profile proves otherwise.
///
/// This is a tagged-rule evaluator, not a semantic classifier. False
/// negatives (missed hallucinations) and false positives (legitimate
/// weaknesses about review *quality* near a negation word) are accepted
/// risk; the rule set deliberately keeps the conservative bias of only
/// firing on the patterns listed above.
pub struct WeaknessFilter {
    tokenizer: Regex,
    rules: Vec<Rule>,
}

impl WeaknessFilter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            tokenizer: Regex::new(r"[\p{L}\p{N}']+")?,
            rules: vec![
                Rule::ExactPhrases(EXACT_PHRASES),
                Rule::NegationProximity {
                    window: PROXIMITY_WINDOW,
                },
            ],
        })
    }

    /// Drop hallucinated "no reviews" weaknesses. Identity when
    /// `review_count` is zero, since the premise is then not contradicted.
    pub fn apply(&self, weaknesses: Vec<DetailItem>, review_count: u32) -> Vec<DetailItem> {
        if review_count == 0 {
            return weaknesses;
        }

        weaknesses
            .into_iter()
            .filter(|weakness| {
                let combined = format!("{} {}", weakness.title, weakness.description);
                let hallucinated = self.is_review_hallucination(&combined);
                if hallucinated {
                    debug!(title = %weakness.title, review_count, "dropped review hallucination");
                }
                !hallucinated
            })
            .collect()
    }

    /// Evaluate the ordered rule list; matching is case-insensitive.
    pub fn is_review_hallucination(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.rules.iter().any(|rule| match rule {
            Rule::ExactPhrases(phrases) => phrases.iter().any(|phrase| text.contains(phrase)),
            Rule::NegationProximity { window } => self.negation_near_review(&text, *window),
        })
    }

    fn negation_near_review(&self, text: &str, window: usize) -> bool {
        let tokens: Vec<&str> = self
            .tokenizer
            .find_iter(text)
            .map(|m| m.as_str())
            .collect();

        for (i, token) in tokens.iter().enumerate() {
            if !NEGATION_TOKENS.contains(token) {
                continue;
            }
            let lookahead = tokens.iter().skip(i + 1).take(window);
            for next in lookahead {
                if REVIEW_MARKERS.iter().any(|marker| next.contains(marker)) {
                    return true;
                }
            }
        }
        false
    }
}

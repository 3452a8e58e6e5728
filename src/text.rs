use unicode_normalization::char::canonical_combining_class;
use unicode_normalization::UnicodeNormalization;

/// Substitutions for characters the PDF base fonts cannot encode but that
/// language-model output produces constantly: typographic quotes and dashes,
/// the ellipsis, and ligatures/symbols outside Latin-1.
const SUBSTITUTIONS: &[(char, &str)] = &[
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201A}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{201E}', "\""),
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
    ('\u{2015}', "-"),
    ('\u{2026}', "..."),
    ('\u{2022}', "-"),
    ('\u{00A0}', " "),
    ('\u{202F}', " "),
    ('\u{2009}', " "),
    ('\u{00AD}', ""),
    ('\u{0152}', "OE"),
    ('\u{0153}', "oe"),
    ('\u{20AC}', "EUR"),
    ('\u{2122}', "TM"),
    ('\t', " "),
    ('\r', ""),
];

/// True when the renderer's base fonts can encode the character directly:
/// printable ASCII, the newline, and the Latin-1 supplement (which covers
/// every accented letter of the report's working language).
fn renderable(c: char) -> bool {
    c == '\n' || (' '..='~').contains(&c) || ('\u{00A1}'..='\u{00FF}').contains(&c)
}

/// Map arbitrary text into the renderer-safe character subset.
///
/// Idempotent and total: renderable characters pass through unchanged,
/// known problem characters are substituted, everything else is
/// compatibility-decomposed with combining marks dropped, and characters
/// that still fall outside the safe set are removed. Unmappable input
/// collapses to an empty string.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if let Some((_, replacement)) = SUBSTITUTIONS.iter().find(|(from, _)| *from == c) {
            out.push_str(replacement);
        } else if renderable(c) {
            out.push(c);
        } else {
            for d in c.nfkd() {
                if canonical_combining_class(d) != 0 {
                    continue;
                }
                if renderable(d) && d != '\n' {
                    out.push(d);
                }
            }
        }
    }
    out
}

/// Build a filesystem-safe slug: diacritics stripped, anything outside
/// ASCII alphanumerics replaced by an underscore, capped at `max_len`
/// characters, leading/trailing underscores trimmed.
pub fn slugify(value: &str, max_len: usize) -> String {
    let ascii: String = value
        .nfkd()
        .filter(|c| canonical_combining_class(*c) == 0 && c.is_ascii())
        .collect();

    let slug: String = ascii
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    slug.trim_matches('_').chars().take(max_len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "Café « Chez Léa » — l'adresse n°1\u{2026}",
            "plain ascii stays plain ascii",
            "", // empty input
            "\u{1F600}\u{1F680}",
            "Sm\u{00F8}rrebr\u{00F8}d \u{0153}uvre \u{20AC}99",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn normalize_preserves_working_language_accents() {
        assert_eq!(normalize("éèêëàâçùûîôö"), "éèêëàâçùûîôö");
    }

    #[test]
    fn normalize_substitutes_typographic_characters() {
        assert_eq!(normalize("\u{2019}\u{201C}\u{2014}\u{2026}"), "'\"-...");
        assert_eq!(normalize("\u{0153}uvre"), "oeuvre");
    }

    #[test]
    fn normalize_drops_unmappable_input() {
        // Emoji and symbols with no compatibility decomposition vanish.
        assert_eq!(normalize("\u{1F600}"), "");
    }

    #[test]
    fn slugify_strips_diacritics_and_specials() {
        assert_eq!(slugify("Café Crème & Co.", 50), "Cafe_Creme___Co");
        assert_eq!(slugify("   ", 50), "");
    }

    #[test]
    fn slugify_caps_length() {
        let long = "a".repeat(80);
        assert_eq!(slugify(&long, 50).len(), 50);
    }
}

//! Heuristic quality score for a single model response.
//!
//! The score is advisory: it is reported next to each response but never
//! decides which responses reach the synthesizer.
//!
//! | Rule | Points |
//! |------|--------|
//! | blank text | score is 0 |
//! | 50 < chars < 5000 | +20 |
//! | otherwise, chars > 10 | +10 |
//! | newline, `•`, or any `-` | +10 |
//! | backtick (inline code or fence) | +5 |
//! | each hedge phrase occurrence | −10 |
//!
//! The result is clamped to `0..=100`.

use super::locale::Locale;

/// Scores response text against a configurable hedge lexicon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityScorer {
    hedges: Vec<String>,
}

impl QualityScorer {
    /// Build a scorer from an explicit lexicon. Blank phrases are ignored.
    pub fn new<I, S>(hedges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hedges: hedges
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.trim().is_empty())
                .collect(),
        }
    }

    /// Scorer using the preset lexicon of `locale`.
    pub fn for_locale(locale: Locale) -> Self {
        Self::new(locale.hedge_phrases().iter().copied())
    }

    pub fn hedges(&self) -> &[String] {
        &self.hedges
    }

    /// Total occurrences of all hedge phrases in `text`.
    pub fn hedge_count(&self, text: &str) -> usize {
        self.hedges
            .iter()
            .map(|phrase| text.matches(phrase.as_str()).count())
            .sum()
    }

    /// Score `text` in `0..=100`.
    pub fn score(&self, text: &str) -> u8 {
        if text.trim().is_empty() {
            return 0;
        }

        let mut score: i64 = 0;

        let length = text.chars().count();
        if length > 50 && length < 5000 {
            score += 20;
        } else if length > 10 {
            score += 10;
        }

        if has_structure(text) {
            score += 10;
        }

        if text.contains('`') {
            score += 5;
        }

        let hedges = i64::try_from(self.hedge_count(text)).unwrap_or(i64::MAX / 10);
        score = score.saturating_sub(hedges.saturating_mul(10));

        score.clamp(0, 100) as u8
    }
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self::for_locale(Locale::default())
    }
}

fn has_structure(text: &str) -> bool {
    text.contains('\n') || text.contains('•') || text.contains('-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn english() -> QualityScorer {
        QualityScorer::for_locale(Locale::En)
    }

    #[test]
    fn test_blank_scores_zero() {
        assert_eq!(english().score(""), 0);
        assert_eq!(english().score("   \n\t"), 0);
    }

    #[test]
    fn test_length_bands() {
        let scorer = english();
        assert_eq!(scorer.score("short"), 0);
        assert_eq!(scorer.score("a bit longer"), 10);
        assert_eq!(scorer.score(&"a".repeat(51)), 20);
        assert_eq!(scorer.score(&"a".repeat(50)), 10);
        assert_eq!(scorer.score(&"a".repeat(5000)), 10);
    }

    #[test]
    fn test_hedge_newline_example() {
        // 100 chars, one newline, one hedge phrase: 20 + 10 - 10
        let mut text = String::from("I am not sure about this.\n");
        text.push_str(&"x".repeat(100 - text.chars().count()));
        assert_eq!(text.chars().count(), 100);
        assert_eq!(english().score(&text), 20);
    }

    #[test]
    fn test_structure_and_code_bonus() {
        let text = format!("{}\n- item\n`code`", "y".repeat(60));
        assert_eq!(english().score(&text), 35);
    }

    #[test]
    fn test_bullet_without_newline() {
        let text = format!("• {}", "z".repeat(60));
        assert_eq!(english().score(&text), 30);
    }

    #[test]
    fn test_inline_hyphen_counts_as_structure() {
        let text = "Rust is a well-known systems language with zero-cost abstractions.";
        assert!(!text.contains('\n'));
        assert_eq!(english().score(text), 30);
    }

    #[test]
    fn test_each_occurrence_is_penalised_and_clamped() {
        let scorer = english();
        let text = "maybe maybe maybe maybe this is fine";
        assert_eq!(scorer.hedge_count(text), 4);
        assert_eq!(scorer.score(text), 0);
    }

    #[test]
    fn test_korean_lexicon() {
        let scorer = QualityScorer::for_locale(Locale::Ko);
        let text = format!("아마도 그럴 것입니다. {}", "가".repeat(60));
        assert_eq!(scorer.score(&text), 10);
    }

    #[test]
    fn test_custom_lexicon_ignores_blank_phrases() {
        let scorer = QualityScorer::new(vec!["", "  ", "perhaps"]);
        assert_eq!(scorer.hedges(), &["perhaps".to_string()]);
        assert_eq!(scorer.hedge_count("perhaps, perhaps"), 2);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let scorer = english();
        let text = "Rust ownership:\n- moves\n- borrows\nmaybe lifetimes too";
        assert_eq!(scorer.score(text), scorer.score(text));
    }
}

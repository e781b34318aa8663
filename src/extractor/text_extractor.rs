use crate::error::{NumLinksError, Result};
use regex::Regex;

/// Ordered digit tokens as they appear in the input. Duplicates are kept.
pub type TokenSequence = Vec<String>;

/// Finds runs of ASCII digits that are at least `min_length` long.
///
/// The pattern is greedy and the regex engine reports leftmost-first, non-overlapping matches,
/// so every match starts at the beginning of a digit run and extends to its end. Runs shorter
/// than the minimum never match anywhere inside themselves.
#[derive(Debug, Clone)]
pub struct TextTokenExtractor {
    pattern: Regex,
}

impl TextTokenExtractor {
    pub fn new(min_length: usize) -> Result<Self> {
        if min_length == 0 {
            return Err(NumLinksError::Config {
                message: "Minimum token length must be greater than 0".to_string(),
            });
        }

        // `\d` would also accept non-ASCII digits, which cannot appear in a t.me link.
        let pattern = Regex::new(&format!("[0-9]{{{},}}", min_length)).map_err(|e| {
            NumLinksError::Config {
                message: format!("Failed to build token pattern: {}", e),
            }
        })?;

        Ok(Self { pattern })
    }

    pub fn extract(&self, text: &str) -> TokenSequence {
        let mut tokens = Vec::new();
        self.extract_into(text, &mut tokens);
        tokens
    }

    /// Appends the tokens found in `text` to `tokens`.
    pub fn extract_into(&self, text: &str, tokens: &mut TokenSequence) {
        tokens.extend(self.pattern.find_iter(text).map(|m| m.as_str().to_string()));
    }
}

impl Default for TextTokenExtractor {
    fn default() -> Self {
        Self {
            pattern: Regex::new("[0-9]{5,}").unwrap_or_else(|_| unreachable!("static pattern")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_tokens_line_by_line() {
        let extractor = TextTokenExtractor::default();
        let tokens = extractor.extract("12345\nabc\n999999\n42");
        assert_eq!(tokens, vec!["12345", "999999"]);
    }

    #[test]
    fn test_no_tokens_is_empty_not_error() {
        let extractor = TextTokenExtractor::default();
        assert!(extractor.extract("").is_empty());
        assert!(extractor.extract("hello 1234 world 12-34-56").is_empty());
    }

    #[test]
    fn test_tokens_inside_text() {
        let extractor = TextTokenExtractor::default();
        let tokens = extractor.extract("call +8801712345678 or (555) 1234567, ref#00042x");
        assert_eq!(tokens, vec!["8801712345678", "1234567", "00042"]);

        let tokens = extractor.extract("call +8801712345678, ref#0042x");
        assert_eq!(tokens, vec!["8801712345678"]);
    }

    #[test]
    fn test_long_runs_are_not_split() {
        let extractor = TextTokenExtractor::default();
        let tokens = extractor.extract("123456789012345678901234567890");
        assert_eq!(tokens, vec!["123456789012345678901234567890"]);
    }

    #[test]
    fn test_leading_zeros_are_preserved() {
        let extractor = TextTokenExtractor::default();
        assert_eq!(extractor.extract("0001234"), vec!["0001234"]);
    }

    #[test]
    fn test_duplicates_are_kept_in_order() {
        let extractor = TextTokenExtractor::default();
        let tokens = extractor.extract("55555 11111 55555");
        assert_eq!(tokens, vec!["55555", "11111", "55555"]);
    }

    #[test]
    fn test_non_ascii_digits_are_boundaries() {
        let extractor = TextTokenExtractor::default();
        // Bengali digits are not part of the token alphabet.
        let tokens = extractor.extract("১২৩৪৫12345৬");
        assert_eq!(tokens, vec!["12345"]);
    }

    #[test]
    fn test_custom_min_length() {
        let extractor = TextTokenExtractor::new(2).unwrap();
        assert_eq!(extractor.extract("1 22 333"), vec!["22", "333"]);

        assert!(TextTokenExtractor::new(0).is_err());
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let extractor = TextTokenExtractor::default();
        let input = "a 98765 b\n12345678\nxx 1234";
        assert_eq!(extractor.extract(input), extractor.extract(input));
    }

    #[test]
    fn test_extract_into_appends() {
        let extractor = TextTokenExtractor::default();
        let mut tokens = vec!["11111".to_string()];
        extractor.extract_into("22222", &mut tokens);
        assert_eq!(tokens, vec!["11111", "22222"]);
    }
}

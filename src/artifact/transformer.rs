use serde::Serialize;

pub const PLUS_PREFIX: &str = "+";
pub const LINK_PREFIX: &str = "t.me/+";

/// The two renderings of one token sequence. `plus[i]` and `link[i]` come from the same token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormattedPair {
    pub plus: Vec<String>,
    pub link: Vec<String>,
}

impl FormattedPair {
    pub fn len(&self) -> usize {
        self.plus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plus.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FormatTransformer;

impl FormatTransformer {
    pub fn new() -> Self {
        Self
    }

    pub fn transform<S: AsRef<str>>(&self, tokens: &[S]) -> FormattedPair {
        let (plus, link) = tokens
            .iter()
            .map(|token| {
                let token = token.as_ref();
                (
                    format!("{}{}", PLUS_PREFIX, token),
                    format!("{}{}", LINK_PREFIX, token),
                )
            })
            .unzip();

        FormattedPair { plus, link }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_pairs_by_index() {
        let tokens = vec!["12345", "999999", "12345"];
        let pair = FormatTransformer::new().transform(&tokens);

        assert_eq!(pair.len(), tokens.len());
        assert_eq!(pair.link.len(), tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            assert_eq!(pair.plus[i], format!("+{}", token));
            assert_eq!(pair.link[i], format!("t.me/+{}", token));
        }
    }

    #[test]
    fn test_empty_input() {
        let tokens: Vec<String> = Vec::new();
        let pair = FormatTransformer::new().transform(&tokens);
        assert!(pair.is_empty());
        assert!(pair.link.is_empty());
    }
}

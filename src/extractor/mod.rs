pub mod tabular_extractor;
pub mod text_extractor;

pub use tabular_extractor::TabularTokenExtractor;
pub use text_extractor::{TextTokenExtractor, TokenSequence};

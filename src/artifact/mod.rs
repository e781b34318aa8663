pub mod allocator;
pub mod transformer;
pub mod writer;

pub use allocator::NameAllocator;
pub use transformer::{FormatTransformer, FormattedPair};
pub use writer::{ArtifactPair, ArtifactWriter};

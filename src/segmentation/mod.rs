pub mod normalizer;
pub mod pos;
pub mod tagger;

pub use normalizer::{
    normalize,
    normalize_document,
    DocumentStats,
    DropReason,
    Normalized,
    TokenWindow,
};
pub use pos::POS;
pub use tagger::Tagger;

pub mod errors;
pub mod models;
pub mod pipeline;
pub mod settings;
pub mod utils;

pub use errors::LexiconError;
pub use models::{
    ConsolidationKey,
    FrequencyEntry,
    Gender,
    NormalizedToken,
    Token,
    TokenDetails,
    VocabularyRow,
};
pub use pipeline::{
    SharedPipeline,
    VocabularyPipeline,
};
pub use settings::EngineSettings;

pub mod anki;
pub mod core;
pub mod export;
pub mod frequency;
pub mod persistence;
pub mod segmentation;

pub use crate::{
    anki::{
        KnownWordClassifier,
        KnownWordIndex,
    },
    core::{
        EngineSettings,
        LexiconError,
        SharedPipeline,
        Token,
        VocabularyPipeline,
        VocabularyRow,
    },
    export::RowReport,
    segmentation::{
        Tagger,
        POS,
    },
};

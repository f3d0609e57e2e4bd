pub mod aggregator;
pub mod consolidation;

pub use aggregator::{
    FrequencyAggregator,
    FrequencyBand,
};
pub use consolidation::{
    consolidate,
    to_display_map,
};

pub mod rows;

pub use rows::{
    deduplicate,
    RowBuilder,
    RowReport,
};

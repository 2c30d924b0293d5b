//! Data models for order records and pipeline configuration.

pub mod config;
pub mod order;

pub use config::{ColumnConfig, ColumnRename, ExportConfig, OrdexConfig, ReferenceConfig};
pub use order::{
    DetailPair, ExtractedDetails, OrderKind, OrderRecord, OrderType, PartKind, ReferenceMatch,
    DETAIL_SLOTS, EXTRACTED_FIELDS, REMARK_SLOTS,
};

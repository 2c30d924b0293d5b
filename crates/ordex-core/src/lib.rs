//! Core library for order export processing.
//!
//! This crate provides:
//! - Tabular order data loading (CSV) and two-table outer join on the PI key
//! - RTF description normalization
//! - Detail/remark extraction from free-text order descriptions
//! - Rule-based order classification (ORDER / TYPE)
//! - Reference table enrichment by item-code prefix, with an expiry cache
//! - Export layout: column selection, renaming, CSV/TSV/JSON rendering

pub mod error;
pub mod markup;
pub mod models;
pub mod order;
pub mod pipeline;
pub mod reference;
pub mod table;

pub use error::{OrdexError, ReferenceError, Result, TableError};
pub use markup::{MarkupNormalizer, RtfStripper};
pub use models::config::OrdexConfig;
pub use models::order::{ExtractedDetails, OrderRecord, OrderType, ReferenceMatch};
pub use order::{classify, extract_details, extract_remark_delivery};
pub use pipeline::{ExportFormat, ExportLayout, OrderPipeline, PipelineResult};
pub use reference::{
    CacheEntry, CsvReferenceSource, ReferenceCache, ReferenceMatcher, ReferenceSource,
    ReferenceTable,
};
pub use table::Table;

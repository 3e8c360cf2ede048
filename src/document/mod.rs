// Document module - text extraction ahead of analysis

pub mod extractor;

pub use extractor::{
    document_stats, ensure_minimum_length, mime_for_path, DocumentExtractor, DocumentStats,
    MIN_TEXT_LENGTH,
};

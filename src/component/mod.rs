//! 功能元件模組
//!
//! 每個子模組實現一個獨立的批次工作流程，共用 [`crate::runner`] 執行器

pub mod batch_renamer;
pub mod batch_session;
pub mod video_categorizer;
pub mod video_compressor;

pub use batch_renamer::BatchRenamer;
pub use video_categorizer::VideoCategorizer;
pub use video_compressor::VideoCompressor;

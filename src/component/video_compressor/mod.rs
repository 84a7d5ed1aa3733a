//! 影片壓縮元件
//!
//! 使用 ffmpeg 將影片縮放至指定高度並以設定的編碼參數重新編碼

mod main;
mod transcoder;

pub use main::VideoCompressor;
pub use transcoder::{FfmpegTranscoder, TranscodeJob, plan_transcodes};

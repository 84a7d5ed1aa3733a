mod external_process;
mod ffmpeg_command;
mod ffprobe_info;
mod path_validator;
mod progress_reporter;
mod video_scanner;

pub use external_process::{ProcessExit, run_supervised};
pub use ffmpeg_command::{FfmpegCommand, command_available};
pub use ffprobe_info::{VideoInfo, get_video_info};
pub use path_validator::{
    ensure_directory_exists, validate_directory_exists, validate_distinct_directories,
};
pub use progress_reporter::{ItemLabel, TerminalProgress};
pub use video_scanner::{VideoFileInfo, format_size_mb, is_video_file, scan_video_files, total_size};

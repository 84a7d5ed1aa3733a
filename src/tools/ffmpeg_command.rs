use crate::config::CompressorSettings;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// 縮放並重新編碼單一影片的 ffmpeg 命令
pub struct FfmpegCommand {
    source_path: PathBuf,
    destination_path: PathBuf,
    target_height: u32,
    codec: String,
    preset: String,
    bitrate: String,
    threads: u32,
}

impl FfmpegCommand {
    #[must_use]
    pub fn new(source_path: &Path, destination_path: &Path, settings: &CompressorSettings) -> Self {
        Self {
            source_path: source_path.to_path_buf(),
            destination_path: destination_path.to_path_buf(),
            target_height: settings.target_height,
            codec: settings.codec.clone(),
            preset: settings.preset.clone(),
            bitrate: settings.bitrate.clone(),
            threads: settings.threads,
        }
    }

    #[must_use]
    pub fn destination_path(&self) -> &Path {
        &self.destination_path
    }

    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = [
            "-hide_banner",
            "-nostdin",
            "-loglevel", "error",
            "-y",
            "-i",
        ]
        .iter()
        .map(|s| (*s).to_string())
        .collect();

        args.push(format!("file:{}", self.source_path.display()));
        args.extend([
            "-vf".to_string(),
            // 寬度維持比例並取偶數
            format!("scale=-2:{}", self.target_height),
            "-c:v".to_string(),
            self.codec.clone(),
            "-preset".to_string(),
            self.preset.clone(),
            "-b:v".to_string(),
            self.bitrate.clone(),
            "-threads".to_string(),
            self.threads.to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
        ]);
        args.push(format!("file:{}", self.destination_path.display()));
        args
    }

    #[must_use]
    pub fn build_command(&self) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.args(self.args());
        cmd.stdin(Stdio::null());
        cmd
    }
}

/// 檢查外部程式是否可執行
#[must_use]
pub fn command_available(program: &str) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Quality tier for the generic per-format conversion path.
///
/// Each tier maps to fixed literal encoder parameters per format; there is
/// no interpolation between tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    High,
    Medium,
    Low,
}

impl Quality {
    /// The capitalized tier name. The x264 builders pass this label through
    /// as the `-crf` token, matching the engine's observed behavior.
    pub fn label(&self) -> &'static str {
        match self {
            Quality::High => "High",
            Quality::Medium => "Medium",
            Quality::Low => "Low",
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Supported output containers.
///
/// `Webm` is declared but the dispatcher routes it to the stream-copy
/// builder; the VP9 encode path is disabled in this version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoFormat {
    Mp4,
    Mov,
    Mkv,
    Avi,
    Flv,
    Webm,
}

impl VideoFormat {
    /// Lowercase container extension, used for output naming.
    pub fn extension(&self) -> &'static str {
        match self {
            VideoFormat::Mp4 => "mp4",
            VideoFormat::Mov => "mov",
            VideoFormat::Mkv => "mkv",
            VideoFormat::Avi => "avi",
            VideoFormat::Flv => "flv",
            VideoFormat::Webm => "webm",
        }
    }

    /// MIME type for the produced artifact.
    pub fn content_type(&self) -> String {
        format!("video/{}", self.extension())
    }
}

impl std::fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Everything the user chose for one conversion request.
///
/// A value type: the engine takes its own snapshot per derivation call and
/// never mutates it. The two platform flags are not mutually exclusive
/// here; precedence between them is the engine's policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInputSettings {
    pub remove_audio: bool,
    pub twitter_compression: bool,
    pub whatsapp_compression: bool,
    pub quality: Quality,
    pub video_type: VideoFormat,
    /// Trim start in seconds.
    pub custom_start_time: f64,
    /// Trim end in seconds. Must be greater than `custom_start_time`.
    pub custom_end_time: f64,
}

impl Default for VideoInputSettings {
    fn default() -> Self {
        Self {
            remove_audio: false,
            twitter_compression: false,
            whatsapp_compression: false,
            quality: Quality::Medium,
            video_type: VideoFormat::Mp4,
            custom_start_time: 0.0,
            custom_end_time: 0.0,
        }
    }
}

impl VideoInputSettings {
    /// Check the trim range. Callers must validate before deriving a
    /// command; the engine itself never clamps or rejects.
    pub fn validate(&self) -> Result<()> {
        if self.custom_start_time < 0.0 || self.custom_end_time <= self.custom_start_time {
            return Err(Error::InvalidTrimRange {
                start: self.custom_start_time,
                end: self.custom_end_time,
            });
        }
        Ok(())
    }
}

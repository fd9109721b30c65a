use crate::command::{default_command, derive_command};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::process::FfmpegProcess;
use crate::settings::{VideoFormat, VideoInputSettings};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// The user's selected input file, and after a successful conversion the
/// produced output. Replaced wholesale when a new file is picked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileActions {
    pub id: Uuid,
    pub path: PathBuf,
    pub file_name: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Local>,
    pub output: Option<ConversionOutput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    pub path: PathBuf,
    pub content_type: String,
    pub size_bytes: u64,
}

impl FileActions {
    pub fn from_path(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path)
            .map_err(|_| Error::FileNotFound(path.to_path_buf()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| Error::Other(format!("not a file: {}", path.display())))?;

        Ok(Self {
            id: Uuid::new_v4(),
            path: path.to_path_buf(),
            file_name,
            size_bytes: meta.len(),
            created_at: Local::now(),
            output: None,
        })
    }
}

/// Default output name for a conversion: `<stem>_compressed.<ext>`, with
/// the extension taken from the requested container.
pub fn output_name(file_name: &str, format: VideoFormat) -> String {
    let stem = match file_name.rfind('.') {
        Some(idx) => &file_name[..idx],
        None => file_name,
    };
    format!("{}_compressed.{}", stem, format.extension())
}

/// Run one conversion end to end: validate, derive the argument vector,
/// execute ffmpeg, and attach the output record. An explicit `output`
/// path is used as-is; otherwise the file lands in the configured output
/// directory under the default `<stem>_compressed.<ext>` name. On an
/// engine failure the pipeline retries once with the stream-copy fallback
/// before giving up.
pub async fn convert(
    actions: &mut FileActions,
    settings: &VideoInputSettings,
    config: &Config,
    output: Option<&Path>,
) -> Result<ConversionOutput> {
    convert_with(actions, settings, config, output, |args| async move {
        let process = FfmpegProcess::spawn(&args)?;
        process.wait().await
    })
    .await
}

// The runner is injectable so the retry policy is testable without an
// ffmpeg binary on the host.
async fn convert_with<F, Fut>(
    actions: &mut FileActions,
    settings: &VideoInputSettings,
    config: &Config,
    output: Option<&Path>,
    run: F,
) -> Result<ConversionOutput>
where
    F: Fn(Vec<String>) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    settings.validate()?;

    let out_path = match output {
        Some(path) => path.to_path_buf(),
        None => config
            .output
            .dir
            .join(output_name(&actions.file_name, settings.video_type)),
    };
    let input = actions.path.to_string_lossy().to_string();
    let out_str = out_path.to_string_lossy().to_string();

    let args = derive_command(&input, &out_str, settings);
    info!(input = %actions.file_name, output = %out_str, "starting conversion");

    if let Err(first_err) = run(args).await {
        // Only an engine failure earns the retry; a missing binary or an
        // invalid request fails the same way twice.
        if !matches!(first_err, Error::ConversionFailed(_)) {
            return Err(first_err);
        }
        warn!(error = %first_err, "conversion failed, retrying with stream copy");
        let fallback = default_command(&input, &out_str, settings);
        run(fallback).await?;
    }

    let size_bytes = std::fs::metadata(&out_path).map(|m| m.len()).unwrap_or(0);
    let result = ConversionOutput {
        path: out_path,
        content_type: settings.video_type.content_type(),
        size_bytes,
    };
    actions.output = Some(result.clone());

    info!(output = %result.path.display(), bytes = size_bytes, "conversion finished");
    Ok(result)
}

use crate::error::{Error, Result};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ProcessState {
    Starting,
    Running,
    Stopping,
    Stopped,
    Failed,
}

/// Snapshot of FFmpeg's periodic progress line while a conversion runs.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ConvertProgress {
    pub frame: u64,
    pub fps: f64,
    pub time: String,
    pub speed: String,
}

/// One running FFmpeg conversion. A single conversion is in flight per
/// process; cancellation goes through `kill`.
pub struct FfmpegProcess {
    child: Child,
    stderr_rx: tokio::sync::oneshot::Receiver<String>,
    state_tx: watch::Sender<ProcessState>,
    state_rx: watch::Receiver<ProcessState>,
    progress_rx: watch::Receiver<ConvertProgress>,
}

impl FfmpegProcess {
    pub fn spawn(args: &[String]) -> Result<Self> {
        info!(args = ?args, "spawning ffmpeg");

        let mut child = Command::new("ffmpeg")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::FfmpegNotFound
                } else {
                    Error::Io(e)
                }
            })?;

        let (state_tx, state_rx) = watch::channel(ProcessState::Starting);
        let (progress_tx, progress_rx) = watch::channel(ConvertProgress::default());
        let (stderr_tx, stderr_rx) = tokio::sync::oneshot::channel();

        let stderr = child.stderr.take().expect("stderr was piped");
        let state_tx_reader = state_tx.clone();

        tokio::spawn(async move {
            let reader = BufReader::new(stderr);
            let mut lines = reader.lines();
            let mut captured = String::new();
            let mut saw_output = false;

            while let Ok(Some(line)) = lines.next_line().await {
                debug!(line = %line, "ffmpeg stderr");

                if !saw_output && (line.contains("Output #0") || line.contains("frame=")) {
                    saw_output = true;
                    let _ = state_tx_reader.send(ProcessState::Running);
                }

                if let Some(progress) = parse_progress(&line) {
                    let _ = progress_tx.send(progress);
                } else {
                    captured.push_str(&line);
                    captured.push('\n');
                }
            }

            let _ = stderr_tx.send(captured);
        });

        Ok(Self {
            child,
            stderr_rx,
            state_tx,
            state_rx,
            progress_rx,
        })
    }

    /// Wait for the conversion to finish. A non-zero exit becomes
    /// `Error::ConversionFailed` carrying the captured stderr.
    pub async fn wait(mut self) -> Result<()> {
        let status = self.child.wait().await.map_err(Error::Io)?;
        let stderr = self.stderr_rx.await.unwrap_or_default();

        if status.success() {
            let _ = self.state_tx.send(ProcessState::Stopped);
            info!("ffmpeg finished");
            Ok(())
        } else {
            let _ = self.state_tx.send(ProcessState::Failed);
            warn!(status = ?status, "ffmpeg exited with failure");
            Err(Error::ConversionFailed(stderr))
        }
    }

    /// Cancel the conversion. No partial output is surfaced afterwards.
    pub async fn kill(&mut self) -> Result<()> {
        let _ = self.state_tx.send(ProcessState::Stopping);
        self.child.kill().await.map_err(Error::Io)?;
        let _ = self.child.wait().await;
        let _ = self.state_tx.send(ProcessState::Stopped);
        info!("ffmpeg cancelled");
        Ok(())
    }

    pub fn state(&self) -> ProcessState {
        *self.state_rx.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ProcessState> {
        self.state_rx.clone()
    }

    pub fn progress(&self) -> ConvertProgress {
        self.progress_rx.borrow().clone()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<ConvertProgress> {
        self.progress_rx.clone()
    }

    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }
}

fn parse_progress(line: &str) -> Option<ConvertProgress> {
    // frame=  123 fps= 30 q=28.0 size=    1024kB time=00:00:04.10 speed=1.2x
    if !line.contains("frame=") || !line.contains("time=") {
        return None;
    }

    let mut progress = ConvertProgress::default();

    for part in line.split_whitespace() {
        if let Some(val) = part.strip_prefix("frame=") {
            progress.frame = val.parse().unwrap_or(0);
        } else if let Some(val) = part.strip_prefix("fps=") {
            progress.fps = val.parse().unwrap_or(0.0);
        } else if let Some(val) = part.strip_prefix("time=") {
            progress.time = val.to_string();
        } else if let Some(val) = part.strip_prefix("speed=") {
            progress.speed = val.to_string();
        }
    }

    // "frame=  123" splits the key and value into separate tokens.
    if progress.frame == 0 {
        if let Some(idx) = line.find("frame=") {
            let rest = &line[idx + 6..];
            let val: String = rest
                .chars()
                .take_while(|c| c.is_ascii_digit() || c.is_whitespace())
                .collect();
            progress.frame = val.trim().parse().unwrap_or(0);
        }
    }

    Some(progress)
}

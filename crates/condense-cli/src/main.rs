use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use condense_core::command::{derive_command, twitter_command, whatsapp_status_command};
use condense_core::config::Config;
use condense_core::convert::{convert, FileActions};
use condense_core::settings::{Quality, VideoFormat, VideoInputSettings};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "condense",
    version,
    about = "Compress and convert video files with FFmpeg"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum QualityArg {
    High,
    Medium,
    Low,
}

impl From<QualityArg> for Quality {
    fn from(value: QualityArg) -> Self {
        match value {
            QualityArg::High => Quality::High,
            QualityArg::Medium => Quality::Medium,
            QualityArg::Low => Quality::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Mp4,
    Mov,
    Mkv,
    Avi,
    Flv,
}

impl From<FormatArg> for VideoFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Mp4 => VideoFormat::Mp4,
            FormatArg::Mov => VideoFormat::Mov,
            FormatArg::Mkv => VideoFormat::Mkv,
            FormatArg::Avi => VideoFormat::Avi,
            FormatArg::Flv => VideoFormat::Flv,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a video file
    Convert {
        /// Input file
        input: PathBuf,

        /// Output container format
        #[arg(long)]
        format: Option<FormatArg>,

        /// Quality tier
        #[arg(long)]
        quality: Option<QualityArg>,

        /// Strip the audio track from the output
        #[arg(long)]
        remove_audio: bool,

        /// Use the Twitter share preset (overrides format/quality/trim)
        #[arg(long)]
        twitter: bool,

        /// Use the WhatsApp status preset (overrides format/quality/trim)
        #[arg(long)]
        whatsapp: bool,

        /// Trim start in seconds
        #[arg(long, default_value = "0")]
        start: f64,

        /// Trim end in seconds
        #[arg(long)]
        end: Option<f64>,

        /// Output file path
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the derived FFmpeg arguments without running them
        #[arg(long)]
        dry_run: bool,
    },

    /// List the platform share presets and their fixed parameters
    Presets,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "condense=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load().unwrap_or_default();

    match cli.command {
        Commands::Convert {
            input,
            format,
            quality,
            remove_audio,
            twitter,
            whatsapp,
            start,
            end,
            out,
            dry_run,
        } => {
            let mut actions = FileActions::from_path(&input)?;

            let settings = VideoInputSettings {
                remove_audio,
                twitter_compression: twitter,
                whatsapp_compression: whatsapp,
                quality: quality.map(Quality::from).unwrap_or(config.defaults.quality),
                video_type: format
                    .map(VideoFormat::from)
                    .unwrap_or(config.defaults.format),
                custom_start_time: start,
                custom_end_time: end.unwrap_or_else(|| default_end(start)),
            };
            settings.validate()?;

            if dry_run {
                let input_name = input.to_string_lossy().to_string();
                let output_name = out
                    .map(|p| p.to_string_lossy().to_string())
                    .unwrap_or_else(|| input_name.clone());
                let args = derive_command(&input_name, &output_name, &settings);
                println!("ffmpeg {}", args.join(" "));
                return Ok(());
            }

            match &out {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        if !parent.as_os_str().is_empty() {
                            std::fs::create_dir_all(parent)?;
                        }
                    }
                }
                None => config.ensure_dirs()?,
            }

            println!(
                "Converting {} ({} -> {})",
                actions.file_name,
                human_size(actions.size_bytes),
                settings.video_type
            );

            let result = convert(&mut actions, &settings, &config, out.as_deref()).await?;
            println!(
                "Done: {} ({})",
                result.path.display(),
                human_size(result.size_bytes)
            );
        }

        Commands::Presets => {
            println!("twitter:");
            println!("  ffmpeg {}", twitter_command("<input>", "<output>", false).join(" "));
            println!("whatsapp:");
            println!(
                "  ffmpeg {}",
                whatsapp_status_command("<input>", "<output>", false).join(" ")
            );
        }
    }

    Ok(())
}

// Without an explicit end the trim range must still validate; a very large
// end keeps the whole tail of the clip.
fn default_end(start: f64) -> f64 {
    f64::max(start + 1.0, 86400.0)
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

//! Derives the ordered FFmpeg argument vector for a conversion request.
//!
//! The derivation is pure: no I/O, no state, identical settings always
//! produce an identical vector. The caller is responsible for validating
//! the trim range first and for actually running the engine.

use crate::command::platform::{twitter_command, whatsapp_status_command};
use crate::settings::{Quality, VideoFormat, VideoInputSettings};

/// Derive the full argument vector for one conversion.
///
/// Precedence: output-collision rewrite, then the Twitter preset, then the
/// WhatsApp preset, then the per-format path chosen by `video_type`. The
/// platform presets ignore quality, container, and trim settings.
pub fn derive_command(input: &str, output: &str, settings: &VideoInputSettings) -> Vec<String> {
    let final_output = final_output_path(input, output, settings.video_type);

    if settings.twitter_compression {
        return twitter_command(input, &final_output, settings.remove_audio);
    }
    if settings.whatsapp_compression {
        return whatsapp_status_command(input, &final_output, settings.remove_audio);
    }

    match settings.video_type {
        VideoFormat::Mp4 => mp4_command(input, &final_output, settings),
        VideoFormat::Mov => mov_command(input, &final_output, settings),
        VideoFormat::Mkv => mkv_command(input, &final_output, settings),
        VideoFormat::Avi => avi_command(input, &final_output, settings),
        VideoFormat::Flv => flv_command(input, &final_output, settings),
        // VP9 encode path disabled for this release; fall back to copy.
        VideoFormat::Webm => default_command(input, &final_output, settings),
    }
}

/// Never let the engine write over the file it is still reading: when the
/// requested output collides with the input, insert a `_compressed` suffix
/// and retarget the extension to the requested container.
pub fn final_output_path(input: &str, output: &str, format: VideoFormat) -> String {
    if input == output {
        format!("{}_compressed.{}", strip_extension(input), format.extension())
    } else {
        output.to_string()
    }
}

fn strip_extension(name: &str) -> &str {
    // Drops the last dot segment of the file name, dotfiles included.
    match name.rfind('.') {
        Some(idx) if idx >= name.rfind('/').map_or(0, |s| s + 1) => &name[..idx],
        _ => name,
    }
}

fn mp4_command(input: &str, output: &str, settings: &VideoInputSettings) -> Vec<String> {
    let rate = mp4_rate(settings.quality);
    let mut args: Vec<String> = [
        "-i", input,
        "-c:v", "libx264",
        "-profile:v", "high",
        "-level:v", "4.2",
        "-pix_fmt", "yuv420p",
        "-r", "30",
        "-maxrate", rate,
        "-bufsize", rate,
        "-tune", "film",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    // MP4 trims with input boundary markers, not a filter expression.
    args.extend([
        "-ss".to_string(),
        settings.custom_start_time.to_string(),
        "-to".to_string(),
        settings.custom_end_time.to_string(),
    ]);
    args.extend([
        "-crf".to_string(),
        settings.quality.label().to_string(),
        "-preset".to_string(),
        x264_preset(settings.quality).to_string(),
    ]);

    push_audio(&mut args, settings.remove_audio, "aac", aac_bitrate(settings.quality));
    args.extend(["-movflags".to_string(), "faststart".to_string()]);
    args.push(output.to_string());
    args
}

fn mov_command(input: &str, output: &str, settings: &VideoInputSettings) -> Vec<String> {
    x264_filter_trim_command(input, output, settings)
}

fn mkv_command(input: &str, output: &str, settings: &VideoInputSettings) -> Vec<String> {
    x264_filter_trim_command(input, output, settings)
}

// MOV and MKV share the same x264 shape: CRF label, speed preset, and the
// trim embedded as a single -vf filter token.
fn x264_filter_trim_command(
    input: &str,
    output: &str,
    settings: &VideoInputSettings,
) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-i".to_string(),
        input.to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-crf".to_string(),
        settings.quality.label().to_string(),
        "-preset".to_string(),
        x264_preset(settings.quality).to_string(),
        "-vf".to_string(),
        trim_filter(settings),
    ];

    push_audio(&mut args, settings.remove_audio, "aac", aac_bitrate(settings.quality));
    args.push(output.to_string());
    args
}

fn avi_command(input: &str, output: &str, settings: &VideoInputSettings) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-i".to_string(),
        input.to_string(),
        "-c:v".to_string(),
        "mpeg4".to_string(),
        "-q:v".to_string(),
        avi_quantizer(settings.quality).to_string(),
        "-vf".to_string(),
        trim_filter(settings),
    ];

    push_audio(&mut args, settings.remove_audio, "libmp3lame", avi_mp3_bitrate(settings.quality));
    args.extend(["-f".to_string(), "avi".to_string()]);
    args.push(output.to_string());
    args
}

fn flv_command(input: &str, output: &str, settings: &VideoInputSettings) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-i".to_string(),
        input.to_string(),
        "-c:v".to_string(),
        "flv1".to_string(),
        "-q:v".to_string(),
        flv_quantizer(settings.quality).to_string(),
        "-vf".to_string(),
        trim_filter(settings),
    ];

    push_audio(&mut args, settings.remove_audio, "libmp3lame", flv_mp3_bitrate(settings.quality));
    args.extend(["-f".to_string(), "flv".to_string()]);
    args.push(output.to_string());
    args
}

/// Pass-through for unsupported or disabled containers: stream copy both
/// tracks, no re-encode. Also the fallback command after a failed convert.
pub fn default_command(input: &str, output: &str, settings: &VideoInputSettings) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-i".to_string(),
        input.to_string(),
        "-c:v".to_string(),
        "copy".to_string(),
    ];

    if settings.remove_audio {
        args.push("-an".to_string());
    } else {
        args.extend(["-c:a".to_string(), "copy".to_string()]);
    }

    args.push(output.to_string());
    args
}

fn trim_filter(settings: &VideoInputSettings) -> String {
    format!(
        "trim=start={}:end={}",
        settings.custom_start_time, settings.custom_end_time
    )
}

fn push_audio(args: &mut Vec<String>, remove_audio: bool, codec: &str, bitrate: &str) {
    if remove_audio {
        args.push("-an".to_string());
    } else {
        args.extend([
            "-c:a".to_string(),
            codec.to_string(),
            "-b:a".to_string(),
            bitrate.to_string(),
        ]);
    }
}

fn mp4_rate(quality: Quality) -> &'static str {
    match quality {
        Quality::High => "10000k",
        Quality::Medium => "5000k",
        Quality::Low => "2000k",
    }
}

fn x264_preset(quality: Quality) -> &'static str {
    match quality {
        Quality::High => "slow",
        Quality::Medium => "medium",
        Quality::Low => "fast",
    }
}

fn aac_bitrate(quality: Quality) -> &'static str {
    match quality {
        Quality::High => "256k",
        Quality::Medium => "192k",
        Quality::Low => "128k",
    }
}

fn avi_quantizer(quality: Quality) -> &'static str {
    match quality {
        Quality::High => "2",
        Quality::Medium => "4",
        Quality::Low => "6",
    }
}

fn avi_mp3_bitrate(quality: Quality) -> &'static str {
    match quality {
        Quality::High => "192k",
        Quality::Medium => "128k",
        Quality::Low => "96k",
    }
}

fn flv_quantizer(quality: Quality) -> &'static str {
    match quality {
        Quality::High => "3",
        Quality::Medium => "5",
        Quality::Low => "7",
    }
}

fn flv_mp3_bitrate(quality: Quality) -> &'static str {
    match quality {
        Quality::High => "128k",
        Quality::Medium => "96k",
        Quality::Low => "64k",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(format: VideoFormat, quality: Quality) -> VideoInputSettings {
        VideoInputSettings {
            quality,
            video_type: format,
            custom_start_time: 0.0,
            custom_end_time: 10.0,
            ..VideoInputSettings::default()
        }
    }

    fn token_after(args: &[String], flag: &str) -> String {
        let idx = args
            .iter()
            .position(|a| a == flag)
            .unwrap_or_else(|| panic!("missing {flag} in {args:?}"));
        args[idx + 1].clone()
    }

    #[test]
    fn derive_is_deterministic() {
        let s = settings(VideoFormat::Mkv, Quality::High);
        let a = derive_command("clip.mp4", "clip.mkv", &s);
        let b = derive_command("clip.mp4", "clip.mkv", &s);
        assert_eq!(a, b);
    }

    #[test]
    fn mp4_medium_matches_expected_tokens() {
        let s = settings(VideoFormat::Mp4, Quality::Medium);
        let args = derive_command("clip.mp4", "out.mp4", &s);

        assert_eq!(token_after(&args, "-crf"), "Medium");
        assert_eq!(token_after(&args, "-preset"), "medium");
        assert_eq!(token_after(&args, "-maxrate"), "5000k");
        assert_eq!(token_after(&args, "-bufsize"), "5000k");
        assert_eq!(token_after(&args, "-c:a"), "aac");
        assert_eq!(token_after(&args, "-b:a"), "192k");

        // ...and the tail is audio, faststart muxing, output.
        let tail: Vec<&str> = args.iter().rev().take(7).map(|s| s.as_str()).collect();
        assert_eq!(
            tail,
            ["out.mp4", "faststart", "-movflags", "192k", "-b:a", "aac", "-c:a"]
        );
    }

    #[test]
    fn mp4_trims_with_boundary_markers() {
        let s = VideoInputSettings {
            custom_start_time: 3.0,
            custom_end_time: 12.5,
            ..settings(VideoFormat::Mp4, Quality::High)
        };
        let args = derive_command("clip.mp4", "out.mp4", &s);
        assert_eq!(token_after(&args, "-ss"), "3");
        assert_eq!(token_after(&args, "-to"), "12.5");
        assert!(!args.iter().any(|a| a.contains("trim=")));
    }

    #[test]
    fn filter_formats_trim_with_single_vf_token() {
        for format in [
            VideoFormat::Mov,
            VideoFormat::Mkv,
            VideoFormat::Avi,
            VideoFormat::Flv,
        ] {
            let s = VideoInputSettings {
                custom_start_time: 2.0,
                custom_end_time: 8.0,
                ..settings(format, Quality::Medium)
            };
            let args = derive_command("clip.mp4", "out.x", &s);
            assert_eq!(
                token_after(&args, "-vf"),
                "trim=start=2:end=8",
                "format {format:?}"
            );
            assert!(!args.contains(&"-ss".to_string()), "format {format:?}");
            assert!(!args.contains(&"-to".to_string()), "format {format:?}");
        }
    }

    #[test]
    fn mov_and_mkv_use_x264_with_quality_label_crf() {
        for format in [VideoFormat::Mov, VideoFormat::Mkv] {
            let args = derive_command("a.mp4", "b.x", &settings(format, Quality::High));
            assert_eq!(token_after(&args, "-c:v"), "libx264");
            assert_eq!(token_after(&args, "-crf"), "High");
            assert_eq!(token_after(&args, "-preset"), "slow");
            assert_eq!(token_after(&args, "-b:a"), "256k");
        }
    }

    #[test]
    fn avi_quantizer_table() {
        for (quality, q, audio) in [
            (Quality::High, "2", "192k"),
            (Quality::Medium, "4", "128k"),
            (Quality::Low, "6", "96k"),
        ] {
            let args = derive_command("a.mp4", "b.avi", &settings(VideoFormat::Avi, quality));
            assert_eq!(token_after(&args, "-c:v"), "mpeg4");
            assert_eq!(token_after(&args, "-q:v"), q);
            assert_eq!(token_after(&args, "-c:a"), "libmp3lame");
            assert_eq!(token_after(&args, "-b:a"), audio);
            assert_eq!(token_after(&args, "-f"), "avi");
        }
    }

    #[test]
    fn flv_quantizer_table() {
        for (quality, q, audio) in [
            (Quality::High, "3", "128k"),
            (Quality::Medium, "5", "96k"),
            (Quality::Low, "7", "64k"),
        ] {
            let args = derive_command("a.mp4", "b.flv", &settings(VideoFormat::Flv, quality));
            assert_eq!(token_after(&args, "-c:v"), "flv1");
            assert_eq!(token_after(&args, "-q:v"), q);
            assert_eq!(token_after(&args, "-b:a"), audio);
            assert_eq!(token_after(&args, "-f"), "flv");
        }
    }

    #[test]
    fn mp4_rate_table_covers_all_tiers() {
        assert_eq!(mp4_rate(Quality::High), "10000k");
        assert_eq!(mp4_rate(Quality::Medium), "5000k");
        assert_eq!(mp4_rate(Quality::Low), "2000k");
    }

    #[test]
    fn preset_table_covers_all_tiers() {
        assert_eq!(x264_preset(Quality::High), "slow");
        assert_eq!(x264_preset(Quality::Medium), "medium");
        assert_eq!(x264_preset(Quality::Low), "fast");
    }

    #[test]
    fn remove_audio_never_emits_audio_codec() {
        for format in [
            VideoFormat::Mp4,
            VideoFormat::Mov,
            VideoFormat::Mkv,
            VideoFormat::Avi,
            VideoFormat::Flv,
            VideoFormat::Webm,
        ] {
            let s = VideoInputSettings {
                remove_audio: true,
                ..settings(format, Quality::Medium)
            };
            let args = derive_command("a.mp4", "b.x", &s);
            assert!(args.contains(&"-an".to_string()), "format {format:?}");
            assert!(!args.contains(&"-c:a".to_string()), "format {format:?}");
        }
    }

    #[test]
    fn webm_routes_to_stream_copy() {
        let args = derive_command("a.webm", "b.webm", &settings(VideoFormat::Webm, Quality::High));
        assert_eq!(token_after(&args, "-c:v"), "copy");
        assert_eq!(token_after(&args, "-c:a"), "copy");
        assert!(!args.contains(&"libvpx-vp9".to_string()));
    }

    #[test]
    fn default_command_stream_copies() {
        let s = settings(VideoFormat::Mp4, Quality::Low);
        let args = default_command("in.mp4", "out.mp4", &s);
        assert_eq!(
            args,
            ["-i", "in.mp4", "-c:v", "copy", "-c:a", "copy", "out.mp4"]
        );
    }

    #[test]
    fn twitter_preset_ignores_quality_format_and_trim() {
        let s = VideoInputSettings {
            twitter_compression: true,
            quality: Quality::Low,
            video_type: VideoFormat::Avi,
            custom_start_time: 5.0,
            custom_end_time: 20.0,
            ..VideoInputSettings::default()
        };
        let args = derive_command("a.mp4", "b.mp4", &s);
        assert_eq!(token_after(&args, "-crf"), "18");
        assert!(!args.contains(&"mpeg4".to_string()));
        assert!(!args.contains(&"-ss".to_string()));
        assert!(!args.iter().any(|a| a.contains("trim=")));
    }

    #[test]
    fn twitter_wins_over_whatsapp_when_both_set() {
        let s = VideoInputSettings {
            twitter_compression: true,
            whatsapp_compression: true,
            ..settings(VideoFormat::Mp4, Quality::Medium)
        };
        let args = derive_command("a.mp4", "b.mp4", &s);
        // Twitter's CRF, not WhatsApp's; no size ceiling.
        assert_eq!(token_after(&args, "-crf"), "18");
        assert!(!args.contains(&"-fs".to_string()));
    }

    #[test]
    fn whatsapp_preset_applies_when_twitter_unset() {
        let s = VideoInputSettings {
            whatsapp_compression: true,
            ..settings(VideoFormat::Mkv, Quality::High)
        };
        let args = derive_command("a.mp4", "b.mp4", &s);
        assert_eq!(token_after(&args, "-crf"), "28");
        assert_eq!(token_after(&args, "-fs"), "9M");
    }

    #[test]
    fn colliding_output_gets_compressed_suffix() {
        let s = settings(VideoFormat::Mp4, Quality::Medium);
        let args = derive_command("clip.mp4", "clip.mp4", &s);
        assert_eq!(args.last().unwrap(), "clip_compressed.mp4");
        assert_ne!(args.last().unwrap(), "clip.mp4");
    }

    #[test]
    fn collision_rewrite_targets_requested_container() {
        let s = settings(VideoFormat::Mkv, Quality::Medium);
        let args = derive_command("clip.mp4", "clip.mp4", &s);
        assert_eq!(args.last().unwrap(), "clip_compressed.mkv");
    }

    #[test]
    fn distinct_output_kept_unchanged() {
        assert_eq!(
            final_output_path("clip.mp4", "done.mp4", VideoFormat::Mp4),
            "done.mp4"
        );
    }

    #[test]
    fn strip_extension_handles_plain_and_nested_names() {
        assert_eq!(strip_extension("clip.mp4"), "clip");
        assert_eq!(strip_extension("dir/clip.old.mp4"), "dir/clip.old");
        assert_eq!(strip_extension("noext"), "noext");
        assert_eq!(strip_extension("dir.v2/noext"), "dir.v2/noext");
    }

    #[test]
    fn strip_extension_treats_dotfiles_as_extension_only() {
        assert_eq!(strip_extension(".hidden"), "");
        assert_eq!(strip_extension("dir/.hidden"), "dir/");
        let s = settings(VideoFormat::Mp4, Quality::Medium);
        let args = derive_command(".hidden", ".hidden", &s);
        assert_eq!(args.last().unwrap(), "_compressed.mp4");
    }

    #[test]
    fn output_is_always_final_token() {
        for format in [
            VideoFormat::Mp4,
            VideoFormat::Mov,
            VideoFormat::Mkv,
            VideoFormat::Avi,
            VideoFormat::Flv,
            VideoFormat::Webm,
        ] {
            let args = derive_command("a.mp4", "b.out", &settings(format, Quality::Medium));
            assert_eq!(args.last().unwrap(), "b.out", "format {format:?}");
        }
    }
}

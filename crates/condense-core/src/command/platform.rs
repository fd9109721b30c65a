//! Fixed argument bundles for platform share targets.
//!
//! These presets ignore the quality tier, container choice, and trim range
//! of the request entirely; only the audio-removal flag is honored.

/// High-quality H.264 tuned for Twitter: fixed profile/level, 30fps
/// normalization, CRF 18 with an 8000k rate cap, faststart muxing.
pub fn twitter_command(input: &str, output: &str, remove_audio: bool) -> Vec<String> {
    let mut args: Vec<String> = [
        "-i", input,
        "-c:v", "libx264",
        "-profile:v", "high",
        "-level:v", "4.2",
        "-pix_fmt", "yuv420p",
        "-r", "30",
        "-movflags", "faststart",
        "-maxrate", "8000k",
        "-bufsize", "8000k",
        "-tune", "film",
        "-crf", "18",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    if remove_audio {
        args.push("-an".to_string());
    } else {
        args.extend(["-c:a", "aac", "-b:a", "256k"].map(String::from));
    }

    args.push(output.to_string());
    args
}

/// WhatsApp status target: CRF 28 with a 2000k rate cap and a hard 9 MB
/// output size ceiling so the result stays under the status upload limit.
pub fn whatsapp_status_command(input: &str, output: &str, remove_audio: bool) -> Vec<String> {
    let mut args: Vec<String> = [
        "-i", input,
        "-c:v", "libx264",
        "-preset", "slow",
        "-crf", "28",
        "-maxrate", "2000k",
        "-bufsize", "2000k",
        "-fs", "9M",
        "-movflags", "faststart",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    if remove_audio {
        args.push("-an".to_string());
    } else {
        args.extend(["-c:a", "aac", "-b:a", "128k"].map(String::from));
    }

    args.push(output.to_string());
    args
}

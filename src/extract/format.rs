//! Quality-to-format negotiation.
//!
//! Maps a (kind, quality) request onto the engine's format selector language.
//! The table is total: every pair yields exactly one plan, and unknown quality
//! labels select the worst available stream instead of failing.
//!
//! | kind  | quality   | selector                                                        |
//! |-------|-----------|-----------------------------------------------------------------|
//! | audio | (ignored) | `bestaudio/best`, transcoded to MP3 at 192 kbit/s               |
//! | video | 4k        | `bestvideo[height<=2160]+bestaudio/best[height<=2160]/best`     |
//! | video | 1080p     | `bestvideo[height<=1080]+bestaudio/best[height<=1080]/best`     |
//! | video | 720p      | `bestvideo[height<=720]+bestaudio/best[height<=720]/best`       |
//! | video | other     | `worst`                                                         |
//!
//! Every video plan merges into an MP4 container.

use crate::job::{MediaKind, Quality};

/// Container that merged video output is normalized to.
pub const VIDEO_CONTAINER: &str = "mp4";

/// Lossy codec for audio-only output.
pub const AUDIO_CODEC: &str = "mp3";

/// Target bitrate for audio-only output, in kbit/s.
pub const AUDIO_BITRATE_KBPS: u32 = 192;

/// Audio extraction step applied after download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioTranscode {
    /// Target codec.
    pub codec: &'static str,
    /// Target bitrate in kbit/s.
    pub bitrate_kbps: u32,
}

/// Negotiated engine format options for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatPlan {
    /// Format selector expression, in strict preference order.
    pub selector: String,
    /// Container for merged video+audio output.
    pub merge_container: Option<&'static str>,
    /// Audio transcoding step, for audio-only jobs.
    pub audio: Option<AudioTranscode>,
}

/// Negotiates the engine format plan for a (kind, quality) request.
#[must_use]
pub fn negotiate_format(kind: MediaKind, quality: &Quality) -> FormatPlan {
    match kind {
        MediaKind::Audio => FormatPlan {
            selector: "bestaudio/best".to_string(),
            merge_container: None,
            audio: Some(AudioTranscode {
                codec: AUDIO_CODEC,
                bitrate_kbps: AUDIO_BITRATE_KBPS,
            }),
        },
        MediaKind::Video => FormatPlan {
            selector: video_selector(quality),
            merge_container: Some(VIDEO_CONTAINER),
            audio: None,
        },
    }
}

fn video_selector(quality: &Quality) -> String {
    match quality.max_height() {
        // Separate streams first, then a combined stream under the cap, then anything.
        Some(height) => {
            format!("bestvideo[height<={height}]+bestaudio/best[height<={height}]/best")
        }
        None => "worst".to_string(),
    }
}

//! Job identity and the request parameters a job carries.

use std::fmt;
use std::time::SystemTime;

use uuid::Uuid;

/// Collision-resistant job identifier (random 128-bit UUID).
///
/// Its hyphenated rendering is the file name prefix of the job's artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the artifact file name prefix for this job.
    #[must_use]
    pub fn as_prefix(&self) -> String {
        self.0.hyphenated().to_string()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Requested output kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaKind {
    /// Video with audio, merged into one container.
    #[default]
    Video,
    /// Audio only, transcoded to a lossy codec.
    Audio,
}

impl MediaKind {
    /// Maps the wire `format` field: `mp3` selects audio, anything else video.
    #[must_use]
    pub fn from_format(format: &str) -> Self {
        if format.trim().eq_ignore_ascii_case("mp3") {
            Self::Audio
        } else {
            Self::Video
        }
    }

    /// Stable label for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

/// Requested quality tier. Parsing never fails: unknown labels fall back to
/// [`Quality::Lowest`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Quality {
    /// Capped at 720 lines.
    Hd720,
    /// Capped at 1080 lines.
    #[default]
    FullHd1080,
    /// Capped at 2160 lines.
    Uhd4k,
    /// Any other label; the worst available stream is selected.
    Lowest(String),
}

impl Quality {
    /// Parses a wire quality label (`720p`, `1080p`, `4k`, case-insensitive).
    #[must_use]
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "720p" => Self::Hd720,
            "1080p" => Self::FullHd1080,
            "4k" => Self::Uhd4k,
            _ => Self::Lowest(label.to_string()),
        }
    }

    /// Maximum frame height for capped tiers; `None` for the lowest fallback.
    #[must_use]
    pub fn max_height(&self) -> Option<u32> {
        match self {
            Self::Hd720 => Some(720),
            Self::FullHd1080 => Some(1080),
            Self::Uhd4k => Some(2160),
            Self::Lowest(_) => None,
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hd720 => f.write_str("720p"),
            Self::FullHd1080 => f.write_str("1080p"),
            Self::Uhd4k => f.write_str("4k"),
            Self::Lowest(label) => write!(f, "lowest({label})"),
        }
    }
}

/// One client-initiated download.
///
/// Lives only for the duration of the synchronous extraction call; afterwards
/// only its artifact (named after [`Job::id`]) remains.
#[derive(Debug, Clone)]
pub struct Job {
    /// Fresh identifier, also the artifact file name prefix.
    pub id: JobId,
    /// Media page URL as submitted.
    pub url: String,
    /// Requested output kind.
    pub kind: MediaKind,
    /// Requested quality tier.
    pub quality: Quality,
    /// When the job was created.
    pub created_at: SystemTime,
}

impl Job {
    /// Creates a job with a freshly generated identifier.
    #[must_use]
    pub fn new(url: impl Into<String>, kind: MediaKind, quality: Quality) -> Self {
        Self {
            id: JobId::generate(),
            url: url.into(),
            kind,
            quality,
            created_at: SystemTime::now(),
        }
    }
}

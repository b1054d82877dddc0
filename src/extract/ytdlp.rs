//! [`Extractor`] backed by a `yt-dlp` subprocess.
//!
//! Each call spawns one engine process with `kill_on_drop`, so hitting the
//! configured timeout (or the calling task going away) terminates it.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use super::classify::{
    classify_engine_output, last_error_line, redaction_forms, sanitize_diagnostic,
};
use super::{EngineRequest, ExtractionError, ExtractionFailure, Extractor, ProbeResult};
use crate::config::EngineConfig;

/// Subset of the engine's JSON info dict used by probes.
#[derive(Debug, Deserialize)]
struct RawInfo {
    title: Option<String>,
    thumbnail: Option<String>,
    duration_string: Option<String>,
    duration: Option<f64>,
    extractor_key: Option<String>,
}

impl From<RawInfo> for ProbeResult {
    fn from(raw: RawInfo) -> Self {
        let duration = raw
            .duration_string
            .or_else(|| raw.duration.and_then(format_duration));
        Self {
            title: raw.title,
            thumbnail: raw.thumbnail,
            duration,
            platform: raw.extractor_key,
        }
    }
}

/// Renders seconds as `m:ss` or `h:mm:ss`, the way the engine's
/// `duration_string` does.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn format_duration(seconds: f64) -> Option<String> {
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    let total = seconds.round() as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    Some(if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    })
}

/// Runs `yt-dlp` as a child process for every probe and download.
#[derive(Debug, Clone)]
pub struct YtDlpExtractor {
    config: EngineConfig,
}

impl YtDlpExtractor {
    /// Creates an extractor using the given engine options.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Options shared by probes and downloads.
    fn common_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "--no-warnings",
            "--no-progress",
            "--no-playlist",
            "--no-cache-dir",
            "--no-check-certificates",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();

        args.push("--user-agent".into());
        args.push(self.config.user_agent.clone().into());

        if let Some(target) = &self.config.impersonate {
            args.push("--impersonate".into());
            args.push(target.into());
        }
        if !self.config.client_profiles.is_empty() {
            args.push("--extractor-args".into());
            args.push(format!("youtube:player_client={}", self.config.client_profiles.join(",")).into());
        }
        args
    }

    /// Full argument list for a metadata probe.
    #[must_use]
    pub fn probe_args(&self, url: &str) -> Vec<OsString> {
        let mut args = self.common_args();
        args.push("--dump-single-json".into());
        args.push("--skip-download".into());
        args.push("--".into());
        args.push(url.into());
        args
    }

    /// Full argument list for a download.
    #[must_use]
    pub fn download_args(&self, request: &EngineRequest) -> Vec<OsString> {
        let mut args = self.common_args();
        args.push("--quiet".into());
        args.push("--format".into());
        args.push(request.plan.selector.clone().into());
        args.push("--output".into());
        args.push(request.output_template.clone().into_os_string());
        if let Some(container) = request.plan.merge_container {
            args.push("--merge-output-format".into());
            args.push(container.into());
        }
        if let Some(audio) = request.plan.audio {
            args.push("--extract-audio".into());
            args.push("--audio-format".into());
            args.push(audio.codec.into());
            args.push("--audio-quality".into());
            args.push(format!("{}K", audio.bitrate_kbps).into());
        }
        args.push("--".into());
        args.push(request.url.clone().into());
        args
    }

    /// Spawns the engine and waits for it within `limit`.
    async fn run(
        &self,
        args: Vec<OsString>,
        limit: Duration,
        url: &str,
        artifact_dir: Option<&Path>,
    ) -> Result<Output, ExtractionError> {
        let child = Command::new(&self.config.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| {
                warn!(binary = %self.config.binary.display(), error = %err, "failed to start engine");
                let reason = if err.kind() == ErrorKind::NotFound {
                    "extraction engine is not installed"
                } else {
                    "extraction engine could not be started"
                };
                ExtractionError::new(ExtractionFailure::EngineUnavailable, url, reason)
            })?;

        let output = match tokio::time::timeout(limit, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                warn!(error = %err, "engine process I/O failed");
                return Err(ExtractionError::new(
                    ExtractionFailure::Other,
                    url,
                    "extraction engine stopped unexpectedly",
                ));
            }
            Err(_) => {
                // Dropping the wait future dropped the child, which kills it.
                warn!(limit_secs = limit.as_secs(), "engine timed out");
                return Err(ExtractionError::timed_out(url, limit.as_secs()));
            }
        };

        if output.status.success() {
            return Ok(output);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(status = %output.status, stderr = %stderr, "engine failed");
        let kind = classify_engine_output(&stderr);
        let redact = match artifact_dir {
            Some(dir) => redaction_forms(dir).await,
            None => Vec::new(),
        };
        let reason = last_error_line(&stderr).map_or_else(
            || format!("extraction engine exited with {}", output.status),
            |line| sanitize_diagnostic(line, &redact),
        );
        Err(ExtractionError::new(kind, url, reason))
    }
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    #[instrument(skip(self))]
    async fn probe(&self, url: &str) -> Result<ProbeResult, ExtractionError> {
        let output = self
            .run(self.probe_args(url), self.config.probe_timeout, url, None)
            .await?;
        let raw: RawInfo = serde_json::from_slice(&output.stdout).map_err(|err| {
            warn!(error = %err, "engine returned unreadable metadata");
            ExtractionError::new(
                ExtractionFailure::Other,
                url,
                "extraction engine returned unreadable metadata",
            )
        })?;
        Ok(raw.into())
    }

    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn download(&self, request: &EngineRequest) -> Result<(), ExtractionError> {
        let artifact_dir = request.output_template.parent();
        self.run(
            self.download_args(request),
            self.config.download_timeout,
            &request.url,
            artifact_dir,
        )
        .await?;
        debug!("engine finished download");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use crate::extract::negotiate_format;
    use crate::job::{MediaKind, Quality};

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    fn value_after(args: &[String], flag: &str) -> Option<String> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1).cloned())
    }

    fn request(kind: MediaKind, quality: &Quality) -> EngineRequest {
        EngineRequest {
            url: "https://example.com/watch?v=1".to_string(),
            output_template: PathBuf::from("/data/downloads/job.%(ext)s"),
            plan: negotiate_format(kind, quality),
        }
    }

    #[test]
    fn test_probe_args_are_read_only() {
        let extractor = YtDlpExtractor::new(EngineConfig::default());
        let args = strings(&extractor.probe_args("https://example.com/v"));

        assert!(args.contains(&"--dump-single-json".to_string()));
        assert!(args.contains(&"--skip-download".to_string()));
        assert!(!args.contains(&"--output".to_string()));
        assert_eq!(args.last().unwrap(), "https://example.com/v");
        assert_eq!(args[args.len() - 2], "--");
    }

    #[test]
    fn test_common_args_carry_masquerading_options() {
        let extractor = YtDlpExtractor::new(EngineConfig::default());
        let args = strings(&extractor.probe_args("https://example.com/v"));

        assert!(args.contains(&"--no-check-certificates".to_string()));
        assert!(args.contains(&"--no-cache-dir".to_string()));
        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(
            value_after(&args, "--user-agent")
                .unwrap()
                .starts_with("Mozilla/5.0")
        );
        assert!(!args.contains(&"--impersonate".to_string()));
        assert!(!args.contains(&"--extractor-args".to_string()));
    }

    #[test]
    fn test_impersonation_and_client_profiles_forwarded_in_order() {
        let config = EngineConfig {
            impersonate: Some("chrome".to_string()),
            client_profiles: vec!["android".to_string(), "web".to_string()],
            ..EngineConfig::default()
        };
        let args = strings(&YtDlpExtractor::new(config).probe_args("https://example.com/v"));

        assert_eq!(value_after(&args, "--impersonate").as_deref(), Some("chrome"));
        assert_eq!(
            value_after(&args, "--extractor-args").as_deref(),
            Some("youtube:player_client=android,web")
        );
    }

    #[test]
    fn test_video_download_args() {
        let extractor = YtDlpExtractor::new(EngineConfig::default());
        let args = strings(&extractor.download_args(&request(MediaKind::Video, &Quality::Uhd4k)));

        assert_eq!(
            value_after(&args, "--format").as_deref(),
            Some("bestvideo[height<=2160]+bestaudio/best[height<=2160]/best")
        );
        assert_eq!(
            value_after(&args, "--output").as_deref(),
            Some("/data/downloads/job.%(ext)s")
        );
        assert_eq!(value_after(&args, "--merge-output-format").as_deref(), Some("mp4"));
        assert!(!args.contains(&"--extract-audio".to_string()));
        assert_eq!(args.last().unwrap(), "https://example.com/watch?v=1");
    }

    #[test]
    fn test_audio_download_args() {
        let extractor = YtDlpExtractor::new(EngineConfig::default());
        let args = strings(&extractor.download_args(&request(MediaKind::Audio, &Quality::default())));

        assert_eq!(value_after(&args, "--format").as_deref(), Some("bestaudio/best"));
        assert!(args.contains(&"--extract-audio".to_string()));
        assert_eq!(value_after(&args, "--audio-format").as_deref(), Some("mp3"));
        assert_eq!(value_after(&args, "--audio-quality").as_deref(), Some("192K"));
        assert!(!args.contains(&"--merge-output-format".to_string()));
    }

    #[test]
    fn test_raw_info_maps_to_probe_result() {
        let json = r#"{
            "title": "Clip",
            "thumbnail": "https://i.example.com/t.jpg",
            "duration": 185,
            "duration_string": "3:05",
            "extractor_key": "Youtube",
            "formats": []
        }"#;
        let raw: RawInfo = serde_json::from_str(json).unwrap();
        let result = ProbeResult::from(raw);

        assert_eq!(result.title.as_deref(), Some("Clip"));
        assert_eq!(result.thumbnail.as_deref(), Some("https://i.example.com/t.jpg"));
        assert_eq!(result.duration.as_deref(), Some("3:05"));
        assert_eq!(result.platform.as_deref(), Some("Youtube"));
    }

    #[test]
    fn test_duration_falls_back_to_seconds() {
        let raw: RawInfo = serde_json::from_str(r#"{"duration": 3723.4}"#).unwrap();
        assert_eq!(ProbeResult::from(raw).duration.as_deref(), Some("1:02:03"));
    }

    #[test]
    fn test_format_duration_edges() {
        assert_eq!(format_duration(0.0).as_deref(), Some("0:00"));
        assert_eq!(format_duration(59.6).as_deref(), Some("1:00"));
        assert_eq!(format_duration(-1.0), None);
        assert_eq!(format_duration(f64::NAN), None);
    }

    #[tokio::test]
    async fn test_missing_binary_is_engine_unavailable() {
        let config = EngineConfig {
            binary: PathBuf::from("/nonexistent/definitely-not-yt-dlp"),
            ..EngineConfig::default()
        };
        let err = YtDlpExtractor::new(config)
            .probe("https://example.com/v")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ExtractionFailure::EngineUnavailable);
    }
}

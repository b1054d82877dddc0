use std::path::Path;
use std::sync::LazyLock;

use regex::RegexSet;

use super::ExtractionFailure;

// Checked in this order. Temporary refusals reuse the "video unavailable"
// wording of removed videos, and age/privacy walls also say "sign in", so
// each set must win over the ones after it.
static RETRY_LATER: LazyLock<RegexSet> = LazyLock::new(|| build_set(&[r"(?i)try again later"]));

static RESTRICTED: LazyLock<RegexSet> = LazyLock::new(|| {
    build_set(&[
        r"(?i)private video",
        r"(?i)video is private",
        r"(?i)confirm your age",
        r"(?i)age[- ]restricted",
        r"(?i)members[- ]only",
        r"(?i)join this channel",
        r"(?i)video (is )?unavailable",
        r"(?i)has been removed",
        r"(?i)no longer available",
        r"(?i)not available in your country",
        r"(?i)geo[- ]?restrict",
    ])
});

static BLOCKED: LazyLock<RegexSet> = LazyLock::new(|| {
    build_set(&[
        r"(?i)not a bot",
        r"(?i)sign in to confirm",
        r"(?i)login required",
        r"(?i)HTTP Error 429",
        r"(?i)too many requests",
        r"(?i)rate[- ]?limit",
        r"(?i)captcha",
        r"(?i)(ip|address).{0,40}blocked",
    ])
});

static INVALID_URL: LazyLock<RegexSet> = LazyLock::new(|| {
    build_set(&[
        r"(?i)unsupported url",
        r"(?i)is not a valid url",
        r"(?i)invalid url",
    ])
});

static POST_PROCESSING: LazyLock<RegexSet> = LazyLock::new(|| {
    build_set(&[
        r"(?i)postprocessing",
        r"(?i)ffmpeg not found",
        r"(?i)ffprobe.{0,20}not found",
        r"(?i)conversion failed",
    ])
});

fn build_set(patterns: &[&str]) -> RegexSet {
    // Patterns are literals above; an invalid one would match nothing rather than panic.
    RegexSet::new(patterns).unwrap_or_else(|_| RegexSet::empty())
}

/// Classifies engine error output by known failure signatures.
pub(super) fn classify_engine_output(output: &str) -> ExtractionFailure {
    if RETRY_LATER.is_match(output) {
        ExtractionFailure::Blocked
    } else if RESTRICTED.is_match(output) {
        ExtractionFailure::Restricted
    } else if BLOCKED.is_match(output) {
        ExtractionFailure::Blocked
    } else if INVALID_URL.is_match(output) {
        ExtractionFailure::InvalidUrl
    } else if POST_PROCESSING.is_match(output) {
        ExtractionFailure::PostProcessing
    } else {
        ExtractionFailure::Other
    }
}

/// Picks the most useful line of engine error output: the last `ERROR:` line,
/// else the last non-empty line.
pub(super) fn last_error_line(output: &str) -> Option<&str> {
    let mut last = None;
    let mut last_error = None;
    for line in output.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if line.starts_with("ERROR:") {
            last_error = Some(line);
        }
        last = Some(line);
    }
    last_error.or(last)
}

/// Collects the spellings of `dir` that may show up in engine output,
/// longest first.
pub(super) async fn redaction_forms(dir: &Path) -> Vec<String> {
    let canonical = tokio::fs::canonicalize(dir).await.ok();
    let mut forms: Vec<String> = [canonical, std::path::absolute(dir).ok()]
        .into_iter()
        .flatten()
        .map(|path| path.to_string_lossy().into_owned())
        .filter(|form| form.len() > 1)
        .collect();
    // A path must never get half-redacted by one of its suffixes.
    forms.sort_by_key(|form| std::cmp::Reverse(form.len()));
    forms.dedup();
    forms
}

/// Builds a caller-facing diagnostic: strips the `ERROR:` tag and replaces
/// every form of the artifact directory so server paths never leak.
pub(super) fn sanitize_diagnostic(line: &str, redact: &[String]) -> String {
    let mut text = line
        .strip_prefix("ERROR:")
        .unwrap_or(line)
        .trim()
        .to_string();
    for form in redact {
        text = text.replace(form.as_str(), "<downloads>");
    }
    text
}

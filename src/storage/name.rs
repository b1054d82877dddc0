//! Artifact file name rules.
//!
//! Artifacts are named `{job_id}.{extension}`. The engine chooses the
//! extension, and while it works it leaves intermediates beside the final
//! file (`.part` downloads, `.fNNN.` per-format streams before merging,
//! `.temp.` post-processor output, `.ytdl` resume state). Only the final file may be resolved for a job.

/// Suffixes the engine uses for files it has not finished with.
const INTERMEDIATE_SUFFIXES: &[&str] = &[".part", ".ytdl", ".temp", ".tmp"];

/// Returns true if `name` is a single, plain file name that is safe to join
/// onto the artifact directory.
///
/// Rejects empty names, path separators, parent/current directory
/// references, leading dots (hidden files), and control characters.
#[must_use]
pub fn is_safe_artifact_name(name: &str) -> bool {
    if name.is_empty() || name.len() > 255 {
        return false;
    }
    if name.starts_with('.') {
        return false;
    }
    !name
        .chars()
        .any(|c| c == '/' || c == '\\' || c == ':' || c.is_control())
}

/// Returns true if `name` is an engine intermediate rather than a finished artifact.
#[must_use]
pub fn is_intermediate_file(name: &str) -> bool {
    if INTERMEDIATE_SUFFIXES
        .iter()
        .any(|suffix| name.ends_with(suffix))
    {
        return true;
    }
    if name.contains(".part-Frag") {
        return true;
    }
    has_intermediate_segment(name)
}

/// Returns true if `name` is a finished artifact belonging to the job `prefix`.
///
/// The prefix must be followed by an extension separator (or nothing at all),
/// so one job identifier never matches another identifier that merely starts
/// with the same characters.
#[must_use]
pub fn matches_job_prefix(name: &str, prefix: &str) -> bool {
    let Some(rest) = name.strip_prefix(prefix) else {
        return false;
    };
    (rest.is_empty() || rest.starts_with('.')) && !is_intermediate_file(name)
}

/// Detects an inner `.f<digits>.` segment (per-format streams later merged
/// into the final container) or `.temp.` segment (post-processor output
/// before it is renamed into place).
fn has_intermediate_segment(name: &str) -> bool {
    let segments: Vec<&str> = name.split('.').collect();
    if segments.len() < 3 {
        return false;
    }
    segments[1..segments.len() - 1].iter().any(|segment| {
        *segment == "temp"
            || segment.strip_prefix('f').is_some_and(|digits| {
                !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
            })
    })
}

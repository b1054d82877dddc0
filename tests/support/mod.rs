//! Shared test utilities: a scriptable in-process engine and file helpers.
//!
//! [`FakeEngine`] stands in for yt-dlp so coordinator and HTTP tests never
//! spawn a process or touch the network.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use grabber_core::extract::EXTENSION_PLACEHOLDER;
use grabber_core::{EngineRequest, ExtractionError, ExtractionFailure, Extractor, ProbeResult};

/// What the fake engine does when asked to download.
#[derive(Debug, Clone)]
pub enum DownloadBehavior {
    /// Writes `<prefix>.<ext>` and succeeds.
    Write(&'static str),
    /// Succeeds without writing anything.
    WriteNothing,
    /// Writes an intermediate `.part` file, then fails with `kind`.
    FailAfterPartial(ExtractionFailure),
    /// Fails with `kind` without writing anything.
    Fail(ExtractionFailure),
}

/// In-process engine stand-in.
pub struct FakeEngine {
    probe: Result<ProbeResult, ExtractionFailure>,
    download: DownloadBehavior,
    delay: Duration,
    requests: Mutex<Vec<EngineRequest>>,
    probes: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeEngine {
    /// Engine that probes successfully and writes an `mp4` artifact.
    pub fn succeeding() -> Self {
        Self {
            probe: Ok(sample_probe()),
            download: DownloadBehavior::Write("mp4"),
            delay: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
            probes: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Engine whose probes and downloads all fail with `kind`.
    pub fn failing(kind: ExtractionFailure) -> Self {
        Self {
            probe: Err(kind),
            download: DownloadBehavior::Fail(kind),
            ..Self::succeeding()
        }
    }

    pub fn with_download(mut self, behavior: DownloadBehavior) -> Self {
        self.download = behavior;
        self
    }

    /// Makes every download take at least `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn requests(&self) -> Vec<EngineRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    /// Highest number of downloads observed running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn artifact_path(request: &EngineRequest, ext: &str) -> String {
        request
            .output_template
            .to_string_lossy()
            .replace(EXTENSION_PLACEHOLDER, ext)
    }
}

#[async_trait]
impl Extractor for FakeEngine {
    async fn probe(&self, url: &str) -> Result<ProbeResult, ExtractionError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.probe
            .clone()
            .map_err(|kind| ExtractionError::new(kind, url, "ERROR: fake probe failure"))
    }

    async fn download(&self, request: &EngineRequest) -> Result<(), ExtractionError> {
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(request.clone());

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match &self.download {
            DownloadBehavior::Write(ext) => {
                std::fs::write(Self::artifact_path(request, ext), b"fake media bytes")
                    .expect("write fake artifact");
                Ok(())
            }
            DownloadBehavior::WriteNothing => Ok(()),
            DownloadBehavior::FailAfterPartial(kind) => {
                std::fs::write(Self::artifact_path(request, "mp4.part"), b"half")
                    .expect("write fake partial");
                Err(ExtractionError::new(
                    *kind,
                    &request.url,
                    "ERROR: fake download failure",
                ))
            }
            DownloadBehavior::Fail(kind) => Err(ExtractionError::new(
                *kind,
                &request.url,
                "ERROR: fake download failure",
            )),
        }
    }
}

pub fn sample_probe() -> ProbeResult {
    ProbeResult {
        title: Some("Sample clip".to_string()),
        thumbnail: Some("https://img.example.com/t.jpg".to_string()),
        duration: Some("3:25".to_string()),
        platform: Some("Youtube".to_string()),
    }
}

/// Writes `name` into `dir` and backdates its modification time by `age`.
pub fn write_aged_file(dir: &Path, name: &str, age: Duration) {
    let path = dir.join(name);
    std::fs::write(&path, b"old media").expect("write aged file");
    let file = std::fs::File::options()
        .write(true)
        .open(&path)
        .expect("open aged file");
    file.set_modified(SystemTime::now() - age)
        .expect("backdate aged file");
}

/// Lists file names in `dir`, sorted.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("list dir")
        .flatten()
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();
    names
}

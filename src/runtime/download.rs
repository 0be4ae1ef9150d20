//! Installer downloads over HTTP/HTTPS.

use anyhow::{bail, Context};
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

const CHUNK_SIZE: usize = 8192;

/// Percentage step between progress log lines.
const PROGRESS_STEP: u64 = 5;

/// Downloads files, logging progress as they arrive.
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    /// Create a downloader with a 30-second connect timeout.
    pub fn new() -> Result<Self> {
        Self::with_connect_timeout(Duration::from_secs(30))
    }

    pub fn with_connect_timeout(connect_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("inkcut-launcher/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(connect_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// Download `url` into `dest`, returning the number of bytes written.
    ///
    /// Data is written to a sibling `.download` file that is renamed onto
    /// `dest` only when the transfer completes. On failure the partial file
    /// is removed.
    pub fn download(&self, url: &str, dest: &Path) -> anyhow::Result<u64> {
        let partial = partial_path(dest);
        let result = self.transfer(url, &partial).and_then(|written| {
            fs::rename(&partial, dest)
                .with_context(|| format!("Failed to move download to {}", dest.display()))?;
            Ok(written)
        });

        if result.is_err() && partial.exists() {
            if let Err(e) = fs::remove_file(&partial) {
                tracing::warn!("Unable to remove {}: {}", partial.display(), e);
            }
        }
        result
    }

    fn transfer(&self, url: &str, partial: &Path) -> anyhow::Result<u64> {
        let mut response = self.client.get(url).send()?;

        if !response.status().is_success() {
            bail!("HTTP {}", response.status());
        }

        let mut tracker = ProgressTracker::new(response.content_length());
        let file = File::create(partial)
            .with_context(|| format!("Failed to create {}", partial.display()))?;
        let mut writer = BufWriter::new(file);
        let mut buf = vec![0u8; CHUNK_SIZE];

        loop {
            let n = response.read(&mut buf)?;
            if n == 0 {
                break;
            }
            writer.write_all(&buf[..n])?;
            if let Some(percent) = tracker.advance(n as u64) {
                tracing::info!(
                    "Downloading Python installer: {}% ({}/{} KB)",
                    percent,
                    tracker.downloaded() / 1024,
                    tracker.total().unwrap_or(0) / 1024
                );
            }
        }
        writer.flush()?;

        if let Some(total) = tracker.total() {
            if tracker.downloaded() < total {
                bail!(
                    "connection closed after {} of {} bytes",
                    tracker.downloaded(),
                    total
                );
            }
        }
        Ok(tracker.downloaded())
    }
}

/// The temporary path a download is written to before it is complete.
pub fn partial_path(dest: &Path) -> PathBuf {
    dest.with_extension("download")
}

/// Tracks bytes received and decides when a progress line is due.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total: Option<u64>,
    downloaded: u64,
    last_bucket: Option<u64>,
}

impl ProgressTracker {
    /// `total` is the advertised length; `None` or zero disables reporting.
    pub fn new(total: Option<u64>) -> Self {
        Self {
            total: total.filter(|t| *t > 0),
            downloaded: 0,
            last_bucket: None,
        }
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn downloaded(&self) -> u64 {
        self.downloaded
    }

    /// Record `bytes` more and return the percentage to report, if a new
    /// 5% step was reached.
    pub fn advance(&mut self, bytes: u64) -> Option<u64> {
        self.downloaded += bytes;
        let total = self.total?;
        let percent = (self.downloaded.saturating_mul(100) / total).min(100);
        let bucket = percent / PROGRESS_STEP;
        if self.last_bucket.is_some_and(|last| last >= bucket) {
            return None;
        }
        self.last_bucket = Some(bucket);
        Some(bucket * PROGRESS_STEP)
    }
}

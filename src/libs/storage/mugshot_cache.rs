//! Local copies of user mugshots.
//!
//! Every mugshot lands in the cache directory under a name derived from its URL:
//! the first 16 bytes of the URL's SHA-256 in hex, followed by the URL's own
//! extension. A file that is already present is never downloaded again.

use crate::libs::models::User;
use crate::libs::storage::storage_traits::StoreError;
use reqwest::blocking::Client;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use url::Url;

const DEFAULT_EXTENSION: &str = "img";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrefetchSummary {
    pub downloaded: usize,
    pub already_cached: usize,
    pub failed: usize,
}

pub struct MugshotCache {
    dir: PathBuf,
    http: Client,
}

impl MugshotCache {
    pub fn new(dir: impl Into<PathBuf>, http: Client) -> Self {
        Self {
            dir: dir.into(),
            http,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn cached_path(&self, url: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", url_to_cache_key(url), url_extension(url)))
    }

    /// Downloads the mugshot of every user that is not cached yet. Failures are
    /// logged and counted, never returned.
    pub fn prefetch<'a>(&self, users: impl IntoIterator<Item = &'a User>) -> PrefetchSummary {
        let mut summary = PrefetchSummary::default();

        if let Err(err) = fs::create_dir_all(&self.dir) {
            warn!(dir = %self.dir.display(), "Cannot create mugshot cache: {}", err);
        }

        for user in users {
            if user.mugshot_url.is_empty() {
                continue;
            }
            let path = self.cached_path(&user.mugshot_url);
            if path.exists() {
                summary.already_cached += 1;
                continue;
            }
            match self.download(&user.mugshot_url, &path) {
                Ok(()) => {
                    debug!(user = user.id, path = %path.display(), "Cached mugshot");
                    summary.downloaded += 1;
                }
                Err(err) => {
                    warn!(user = user.id, url = %user.mugshot_url, "Skipping mugshot: {}", err);
                    summary.failed += 1;
                }
            }
        }

        info!(
            downloaded = summary.downloaded,
            cached = summary.already_cached,
            failed = summary.failed,
            "Mugshot prefetch finished"
        );
        summary
    }

    fn download(&self, url: &str, path: &Path) -> Result<(), StoreError> {
        let bytes = self
            .http
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.bytes())
            .map_err(|err| StoreError::Io(std::io::Error::other(err)))?;

        // a partial download must never sit under the final name
        let mut staged = NamedTempFile::new_in(&self.dir)?;
        staged.write_all(&bytes)?;
        staged.persist(path).map_err(|err| StoreError::Io(err.error))?;
        Ok(())
    }
}

fn url_to_cache_key(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    hex::encode(&digest[..16])
}

fn url_extension(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            let last = parsed.path_segments()?.last()?.to_string();
            let (_, extension) = last.rsplit_once('.')?;
            let valid = !extension.is_empty()
                && extension.len() <= 5
                && extension.chars().all(|c| c.is_ascii_alphanumeric());
            valid.then(|| extension.to_ascii_lowercase())
        })
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

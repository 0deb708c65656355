use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::calendar::ListMonth;

const DOWNLOAD_BASE_URL: &str = "http://ratings.fide.com/download";
const DATA_DIR: &str = "fide_trends";
const MANIFEST_FILE: &str = "manifest.json";
const MANIFEST_VERSION: u32 = 1;

/// Archives the host has reported as not existing. Published lists are
/// immutable, so a 404 for a past month is remembered across runs instead
/// of being re-requested.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct StoreManifest {
    version: u32,
    missing: BTreeSet<String>,
}

/// Local directory of monthly rating lists plus the manifest. `sync`
/// downloads what is absent; `read` hands out one month's text or `None`.
pub struct SnapshotStore {
    dir: PathBuf,
    manifest: StoreManifest,
}

#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
    pub downloaded: usize,
    pub already_present: usize,
    pub missing: usize,
    pub errors: Vec<String>,
}

impl SnapshotStore {
    pub fn open(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("create data directory {}", dir.display()))?;
        let manifest = load_manifest(&dir);
        Ok(Self { dir, manifest })
    }

    /// `$XDG_CACHE_HOME` or `~/.cache`, under the tool's own directory.
    pub fn default_dir() -> Option<PathBuf> {
        if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
            if !base.trim().is_empty() {
                return Some(PathBuf::from(base).join(DATA_DIR));
            }
        }
        let home = std::env::var("HOME").ok()?;
        if home.trim().is_empty() {
            return None;
        }
        Some(PathBuf::from(home).join(".cache").join(DATA_DIR))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ensure every requested month's list is locally present where the
    /// host has it. Transport failures are collected, never fatal; a month
    /// that cannot be fetched is simply absent for this run.
    pub fn sync(&mut self, client: &Client, months: &[ListMonth]) -> SyncSummary {
        let mut summary = SyncSummary::default();
        for &month in months {
            if self.list_path(month).exists() {
                summary.already_present += 1;
                continue;
            }
            if self.manifest.missing.contains(&month.archive_name()) {
                summary.missing += 1;
                continue;
            }
            // A leftover archive from an interrupted run only needs extracting.
            if self.archive_path(month).exists() {
                match self.extract_archive(&self.archive_path(month)) {
                    Ok(()) => summary.already_present += 1,
                    Err(err) => summary.errors.push(format!("{}: {err:#}", month.archive_name())),
                }
                continue;
            }
            match self.download_month(client, month) {
                Ok(true) => summary.downloaded += 1,
                Ok(false) => {
                    self.manifest.missing.insert(month.archive_name());
                    summary.missing += 1;
                }
                Err(err) => summary.errors.push(format!("{}: {err:#}", month.archive_name())),
            }
        }
        save_manifest(&self.dir, &self.manifest);
        summary
    }

    /// The month's list text decoded from Latin-1, or `None` if absent.
    pub fn read(&self, month: ListMonth) -> Option<String> {
        let bytes = fs::read(self.list_path(month)).ok()?;
        Some(decode_latin1(&bytes))
    }

    pub fn list_path(&self, month: ListMonth) -> PathBuf {
        self.dir.join(month.list_name())
    }

    pub fn archive_path(&self, month: ListMonth) -> PathBuf {
        self.dir.join(month.archive_name())
    }

    /// Download and extract one month. `Ok(false)` means the host has no
    /// such archive (404).
    fn download_month(&self, client: &Client, month: ListMonth) -> Result<bool> {
        let url = format!("{DOWNLOAD_BASE_URL}/{}", month.archive_name());
        let resp = client
            .get(&url)
            .send()
            .with_context(|| format!("request {url}"))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !resp.status().is_success() {
            return Err(anyhow!("http {} for {url}", resp.status()));
        }
        let body = resp.bytes().with_context(|| format!("read body of {url}"))?;

        let path = self.archive_path(month);
        let tmp = path.with_extension("zip.tmp");
        fs::write(&tmp, &body).with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| format!("swap {}", path.display()))?;

        self.extract_archive(&path)?;
        Ok(true)
    }

    fn extract_archive(&self, path: &Path) -> Result<()> {
        let file = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
        let mut archive =
            zip::ZipArchive::new(file).with_context(|| format!("read zip {}", path.display()))?;
        for index in 0..archive.len() {
            let mut entry = archive
                .by_index(index)
                .with_context(|| format!("read zip entry {index} of {}", path.display()))?;
            let Some(name) = entry.enclosed_name() else {
                continue;
            };
            let Some(file_name) = name.file_name() else {
                continue;
            };
            let out_path = self.dir.join(file_name);
            let mut out = fs::File::create(&out_path)
                .with_context(|| format!("create {}", out_path.display()))?;
            std::io::copy(&mut entry, &mut out)
                .with_context(|| format!("extract to {}", out_path.display()))?;
        }
        Ok(())
    }
}

fn load_manifest(dir: &Path) -> StoreManifest {
    let raw = fs::read_to_string(dir.join(MANIFEST_FILE)).ok();
    let Some(raw) = raw else {
        return StoreManifest::default();
    };
    let manifest = serde_json::from_str::<StoreManifest>(&raw).unwrap_or_default();
    if manifest.version != MANIFEST_VERSION {
        return StoreManifest::default();
    }
    manifest
}

fn save_manifest(dir: &Path, manifest: &StoreManifest) {
    let mut manifest = manifest.clone();
    manifest.version = MANIFEST_VERSION;
    let Ok(json) = serde_json::to_string(&manifest) else {
        return;
    };
    let path = dir.join(MANIFEST_FILE);
    let tmp = path.with_extension("json.tmp");
    if fs::write(&tmp, json).is_ok() {
        let _ = fs::rename(&tmp, &path);
    }
}

/// The lists are published as Latin-1; every byte maps straight to the
/// code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

pub mod models;


use std::{
    fs,
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use thiserror::Error;

use models::*;
use crate::util;


#[derive(Debug, Error)]
pub enum Error {
    #[error("report file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("report serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;


/// Report collection kept as a single JSON array file.
///
/// Every mutation is a full read-modify-write of the file. Writers inside one
/// process are serialized by `write_lock`; other processes sharing the file
/// are not coordinated with.
pub struct ReportStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ReportStore {
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let store = ReportStore {
            path: path.into(),
            write_lock: Mutex::new(()),
        };

        if !store.path.exists() {
            store.write_all(&[])?;
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every stored report in insertion order.
    ///
    /// A file that is not a valid report array reads as empty.
    pub fn read_all(&self) -> Result<Vec<Report>> {
        if !self.path.exists() {
            self.write_all(&[])?;
        }

        let raw = fs::read_to_string(&self.path)?;

        match serde_json::from_str(&raw) {
            Ok(reports) => Ok(reports),
            Err(err) => {
                warn!("Fail to parse {}, treating it as empty: {}", self.path.display(), err);
                Ok(Vec::new())
            },
        }
    }

    pub fn write_all(&self, reports: &[Report]) -> Result<()> {
        let data = serde_json::to_string_pretty(reports)?;

        let mut tmp_name = self.path.file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        fs::write(&tmp_path, data)?;
        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// Reports sorted newest first.
    pub fn get_reports(&self) -> Result<Vec<Report>> {
        let mut reports = self.read_all()?;
        reports.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(reports)
    }

    pub fn insert_report(&self, report: NewReport) -> Result<Report> {
        let _guard = self.write_lock.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut reports = self.read_all()?;

        let timestamp = util::now_millis();
        let id = reports.iter()
            .map(|r| r.id + 1)
            .fold(timestamp, i64::max);

        let report = report.into_report(id, timestamp);
        reports.push(report.clone());
        self.write_all(&reports)?;

        Ok(report)
    }
}

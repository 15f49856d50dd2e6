use std::{
    fs,
    io,
    path::PathBuf,
};
use rocket::{
    data::{ByteUnit, Limits, ToByteUnit},
    figment::Figment,
};
use serde::Deserialize;
use thiserror::Error;

use crate::db;


// Room left in a form for the text fields next to the photo.
const FORM_FIELDS_ALLOWANCE: u64 = 64 * 1024;


#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] rocket::figment::Error),
    #[error("directory creation failed: {0}")]
    Io(#[from] io::Error),
    #[error("report store is not usable: {0}")]
    Store(#[from] db::Error),
}


#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub reports_file: PathBuf,
    pub upload_dir: PathBuf,
    pub public_dir: PathBuf,
    pub photo_limit: ByteUnit,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            reports_file: PathBuf::from("reports.json"),
            upload_dir: PathBuf::from("uploads"),
            public_dir: PathBuf::from("public"),
            photo_limit: 5.mebibytes(),
        }
    }
}

impl AppConfig {
    pub fn from_figment(figment: &Figment) -> Result<Self, SetupError> {
        Ok(figment.extract::<AppConfig>()?)
    }

    /// Request limits with the photo cap applied on top of `base`.
    pub fn limits(&self, base: Limits) -> Limits {
        base.limit("file", self.photo_limit)
            .limit("data-form", self.photo_limit + FORM_FIELDS_ALLOWANCE.bytes())
    }

    pub fn prepare_dirs(&self) -> io::Result<()> {
        fs::create_dir_all(&self.upload_dir)?;
        fs::create_dir_all(&self.public_dir)?;

        match self.reports_file.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
            _ => Ok(()),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_keys_are_missing() {
        let figment = Figment::from(("port", 3000));
        let config = AppConfig::from_figment(&figment).unwrap();

        assert_eq!(config.reports_file, PathBuf::from("reports.json"));
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.photo_limit, 5.mebibytes());
    }

    #[test]
    fn keys_override_defaults() {
        let figment = Figment::new()
            .merge(("upload_dir", "/srv/photos"))
            .merge(("photo_limit", "1MiB"));
        let config = AppConfig::from_figment(&figment).unwrap();

        assert_eq!(config.upload_dir, PathBuf::from("/srv/photos"));
        assert_eq!(config.photo_limit, 1.mebibytes());
        assert_eq!(config.public_dir, PathBuf::from("public"));
    }

    #[test]
    fn limits_follow_photo_limit() {
        let config = AppConfig {
            photo_limit: 2.mebibytes(),
            ..AppConfig::default()
        };
        let limits = config.limits(Limits::default());

        assert_eq!(limits.get("file"), Some(2.mebibytes()));
        assert_eq!(limits.get("data-form"), Some(2.mebibytes() + 64.kibibytes()));
    }

    #[test]
    fn prepare_dirs_creates_missing_directories() {
        let root = tempfile::tempdir().unwrap();
        let config = AppConfig {
            reports_file: root.path().join("data/reports.json"),
            upload_dir: root.path().join("uploads"),
            public_dir: root.path().join("public"),
            ..AppConfig::default()
        };

        config.prepare_dirs().unwrap();

        assert!(root.path().join("data").is_dir());
        assert!(root.path().join("uploads").is_dir());
        assert!(root.path().join("public").is_dir());
    }
}

//! Debug downloads of the current route and of the last request payload.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use log::info;
use serde::Serialize;
use thiserror::Error;

use crate::render::Renderer;
use crate::view::star_map::StarMapView;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export yet")]
    Nothing,
    #[error("could not encode export: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not write export: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportKind {
    Route,
    Payload,
}

impl ExportKind {
    fn prefix(self) -> &'static str {
        match self {
            ExportKind::Route => "route",
            ExportKind::Payload => "payload",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DebugExport {
    pub file_name: String,
    pub contents: String,
}

impl DebugExport {
    /// Writes the export into `dir` and returns the full path.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
        let path = dir.as_ref().join(&self.file_name);
        fs::write(&path, &self.contents)?;
        info!("wrote {}", path.display());
        Ok(path)
    }
}

/// `route-YYYYMMDDHHMM.json` or `payload-YYYYMMDDHHMM.json`.
pub fn export_file_name<Tz: TimeZone>(kind: ExportKind, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}-{}.json", kind.prefix(), at.format("%Y%m%d%H%M"))
}

fn pretty<T: Serialize>(value: &T) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(value)?)
}

impl<R: Renderer> StarMapView<R> {
    pub fn debug_export<Tz: TimeZone>(&self, kind: ExportKind, at: &DateTime<Tz>) -> Result<DebugExport, ExportError>
    where
        Tz::Offset: std::fmt::Display,
    {
        let contents = match kind {
            ExportKind::Route => pretty(self.route().ok_or(ExportError::Nothing)?.as_ref())?,
            ExportKind::Payload => pretty(self.last_request().ok_or(ExportError::Nothing)?)?,
        };
        Ok(DebugExport {
            file_name: export_file_name(kind, at),
            contents,
        })
    }
}

//! Document emission for finished sessions: editor XML, a plain-text match
//! report and a JSON dump, all rendered from an already computed `MatchExport`.

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tagging::{MatchExport, MatchInfo};

pub mod notes;
pub mod xml;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Xml,
    Notes,
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Xml, ExportFormat::Notes, ExportFormat::Json];

    pub fn file_name(self, stem: &str) -> String {
        match self {
            ExportFormat::Xml => format!("{}.xml", stem),
            ExportFormat::Notes => format!("{}_notes.txt", stem),
            ExportFormat::Json => format!("{}.json", stem),
        }
    }

    pub fn render(self, export: &MatchExport, media_path: Option<&str>) -> Result<String> {
        match self {
            ExportFormat::Xml => xml::render(export, media_path),
            ExportFormat::Notes => Ok(notes::render(export)),
            ExportFormat::Json => Ok(serde_json::to_string_pretty(export)?),
        }
    }
}

/// `<sport>_<title>_<YYYYMMDD>`; every character of the title outside
/// `[a-z0-9]` becomes `_`.
pub fn file_stem(info: &MatchInfo) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let re = UNSAFE.get_or_init(|| Regex::new("(?i)[^a-z0-9]").expect("static pattern"));
    let title = re.replace_all(&info.title, "_").to_lowercase();
    format!("{}_{}_{}", info.sport.to_lowercase(), title, info.created_at.format("%Y%m%d"))
}

/// Receives computed export data and produces documents.
pub trait DocumentEmitter {
    fn emit(&self, export: &MatchExport, media_path: Option<&str>) -> Result<Vec<PathBuf>>;
}

/// Writes one file per format into a directory.
pub struct DirectoryEmitter {
    dir: PathBuf,
    formats: Vec<ExportFormat>,
}

impl DirectoryEmitter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), formats: vec![ExportFormat::Xml, ExportFormat::Notes] }
    }

    pub fn with_formats(mut self, formats: &[ExportFormat]) -> Self {
        self.formats = formats.to_vec();
        self
    }

    pub fn dir(&self) -> &Path { &self.dir }
}

impl DocumentEmitter for DirectoryEmitter {
    fn emit(&self, export: &MatchExport, media_path: Option<&str>) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.dir).with_context(|| format!("creating {}", self.dir.display()))?;
        let stem = file_stem(&export.info);
        let mut written = Vec::with_capacity(self.formats.len());
        for format in &self.formats {
            let body = format.render(export, media_path)?;
            let path = self.dir.join(format.file_name(&stem));
            fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), events = export.entries.len(), "export written");
            written.push(path);
        }
        Ok(written)
    }
}

// src/report_store.rs

use crate::core::models::{RiskLevel, ScanReport};
use crate::logging::get_data_dir;
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("report storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("report is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no saved report named {0}")]
    NotFound(String),
}

/// What the reports list shows for each saved scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportMeta {
    pub id: String,
    pub target: String,
    pub risk_level: RiskLevel,
    pub scan_time: DateTime<Local>,
}

/// Somewhere finished reports can be kept and read back.
pub trait ReportStore {
    /// Persists `report` and returns the id it can be loaded with.
    fn save(&self, report: &ScanReport) -> Result<String, StoreError>;
    /// Saved reports, newest first.
    fn list(&self) -> Result<Vec<ReportMeta>, StoreError>;
    fn load(&self, id: &str) -> Result<ScanReport, StoreError>;
}

/// Stores each report as a pretty-printed JSON file, with a plain-text
/// rendering written alongside it.
#[derive(Debug, Clone)]
pub struct JsonReportStore {
    dir: PathBuf,
}

impl JsonReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data dir>/reports`.
    pub fn default_location() -> Self {
        Self::new(get_data_dir().join("reports"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_report(path: &Path) -> Result<ScanReport, StoreError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Makes a target safe to embed in a file name.
pub fn sanitize_target(target: &str) -> String {
    let stripped = target
        .trim()
        .trim_start_matches("http://")
        .trim_start_matches("https://");
    let cleaned: String = stripped
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    if cleaned.is_empty() { "scan".to_string() } else { cleaned }
}

impl ReportStore for JsonReportStore {
    fn save(&self, report: &ScanReport) -> Result<String, StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        let base = format!(
            "{}_{}",
            sanitize_target(&report.target),
            report.metadata.scan_time.format("%Y%m%d_%H%M%S")
        );
        // Same target within the same second: suffix a counter instead of overwriting.
        let mut stem = base.clone();
        let mut n = 0u32;
        while self.dir.join(format!("scan_{}.json", stem)).exists() {
            n += 1;
            stem = format!("{}_{}", base, n);
        }
        let id = format!("scan_{}.json", stem);

        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(self.dir.join(&id), json)?;
        std::fs::write(self.dir.join(format!("report_{}.txt", stem)), render_text(report))?;

        info!(id = %id, dir = %self.dir.display(), "Saved scan report.");
        Ok(id)
    }

    fn list(&self) -> Result<Vec<ReportMeta>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut reports = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else { continue };
            if !(name.starts_with("scan_") && name.ends_with(".json")) {
                continue;
            }
            match Self::read_report(&path) {
                Ok(report) => reports.push(ReportMeta {
                    id: name.to_string(),
                    target: report.target,
                    risk_level: report.risk_level,
                    scan_time: report.metadata.scan_time,
                }),
                Err(e) => warn!(file = %name, error = %e, "Skipping unreadable report."),
            }
        }

        reports.sort_by(|a, b| b.scan_time.cmp(&a.scan_time).then_with(|| a.id.cmp(&b.id)));
        debug!(count = reports.len(), "Listed saved reports.");
        Ok(reports)
    }

    fn load(&self, id: &str) -> Result<ScanReport, StoreError> {
        // Only the file name is honored, so ids cannot climb out of the directory.
        let name = Path::new(id)
            .file_name()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let path = self.dir.join(name);
        if !path.is_file() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Self::read_report(&path)
    }
}

/// Human-readable rendering of a report.
pub fn render_text(report: &ScanReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "SECURITY SCAN REPORT: {}", report.target);
    let _ = writeln!(out, "Scanned: {}", report.metadata.scan_time.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "Host: {} ({})", report.hostname, report.ip);
    let _ = writeln!(out, "OS: {}", report.os_guess);
    let _ = writeln!(out, "Overall risk: {}", report.risk_level);
    let _ = writeln!(
        out,
        "Duration: {} | Ports: {} open of {}",
        report.metadata.duration_label(),
        report.metadata.open_count,
        report.metadata.total_ports
    );
    let _ = writeln!(out, "\n{}\n", report.summary);

    let _ = writeln!(out, "PORTS");
    for p in &report.scan_results {
        let _ = writeln!(out, "  {:>5}  {:<6}  {:<9}  {:<6}  {}", p.port, p.state, p.service, p.risk, p.recommendation);
    }

    let _ = writeln!(out, "\nWEB SERVER: {}", report.web_analysis.server);
    for (name, value) in &report.web_analysis.headers {
        let _ = writeln!(out, "  {}: {}", name, value);
    }

    let _ = writeln!(out, "\nVULNERABILITIES");
    if report.vulnerabilities.is_empty() {
        let _ = writeln!(out, "  None found.");
    }
    for v in &report.vulnerabilities {
        let _ = writeln!(out, "  [{}] {}: {}", v.risk, v.kind, v.message);
        let _ = writeln!(out, "      Fix: {}", v.recommendation);
    }
    out
}

// src/core/models.rs

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use strum::{Display, EnumString};

// --- Risk & State ---

/// Coarse severity tier attached to individual findings and to a whole scan.
///
/// Variants are ordered from least to most severe, so `max()` over a set of
/// findings yields the worst one.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Display,
    EnumString,
)]
pub enum RiskLevel {
    Safe,
    Low,
    Medium,
    High,
}

/// Result of a single TCP connect attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
pub enum PortState {
    Open,
    Closed,
}

// --- Port Prober Models ---

/// Outcome of probing one port. One per probed port, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortFinding {
    pub port: u16,
    pub state: PortState,
    pub service: String,
    pub risk: RiskLevel,
    pub recommendation: String,
}

impl PortFinding {
    pub fn is_open(&self) -> bool {
        self.state == PortState::Open
    }
}

// --- Header Analyzer Models ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
pub enum FindingKind {
    Info,
    Security,
}

/// A disclosure or misconfiguration spotted in the HTTP response headers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeaderFinding {
    pub kind: FindingKind,
    pub message: String,
    pub risk: RiskLevel,
    pub recommendation: String,
}

/// Everything the header analyzer hands back. `Default` is the degraded
/// payload used whenever the request could not be completed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeadersResults {
    pub server: String,
    pub findings: Vec<HeaderFinding>,
    pub headers: BTreeMap<String, String>,
}

impl Default for HeadersResults {
    fn default() -> Self {
        Self {
            server: UNKNOWN_SERVER.to_string(),
            findings: Vec::new(),
            headers: BTreeMap::new(),
        }
    }
}

pub const UNKNOWN_SERVER: &str = "Unknown";

// --- Vulnerabilities ---

/// Where a vulnerability came from. Serialized as a tagged value so reports
/// reload without ambiguity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VulnerabilityKind {
    OpenPort(u16),
    Header(FindingKind),
}

impl fmt::Display for VulnerabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VulnerabilityKind::OpenPort(port) => write!(f, "Open Port {}", port),
            VulnerabilityKind::Header(kind) => write!(f, "{}", kind),
        }
    }
}

/// A normalized finding, merged from open ports and header findings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vulnerability {
    pub kind: VulnerabilityKind,
    pub message: String,
    pub risk: RiskLevel,
    pub recommendation: String,
}

impl Vulnerability {
    pub fn from_open_port(finding: &PortFinding) -> Self {
        Self {
            kind: VulnerabilityKind::OpenPort(finding.port),
            message: format!("Service {} is exposed.", finding.service),
            risk: finding.risk,
            recommendation: finding.recommendation.clone(),
        }
    }
}

impl From<HeaderFinding> for Vulnerability {
    fn from(finding: HeaderFinding) -> Self {
        Self {
            kind: VulnerabilityKind::Header(finding.kind),
            message: finding.message,
            risk: finding.risk,
            recommendation: finding.recommendation,
        }
    }
}

// --- Main Report ---

/// Server banner plus the raw response headers of the HEAD request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebAnalysis {
    pub server: String,
    pub headers: BTreeMap<String, String>,
}

impl Default for WebAnalysis {
    fn default() -> Self {
        Self {
            server: UNKNOWN_SERVER.to_string(),
            headers: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanMetadata {
    /// Wall-clock duration of the whole scan.
    pub duration_ms: u64,
    pub total_ports: usize,
    pub open_count: usize,
    pub scan_time: DateTime<Local>,
}

impl ScanMetadata {
    /// Duration formatted the way reports display it, e.g. `1.27s`.
    pub fn duration_label(&self) -> String {
        format!("{:.2}s", self.duration_ms as f64 / 1000.0)
    }
}

/// The aggregate produced by one scan. Ownership passes to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanReport {
    pub target: String,
    pub hostname: String,
    pub ip: String,
    pub os_guess: String,
    pub scan_results: Vec<PortFinding>,
    pub web_analysis: WebAnalysis,
    pub vulnerabilities: Vec<Vulnerability>,
    pub risk_level: RiskLevel,
    pub metadata: ScanMetadata,
    #[serde(rename = "ai_summary")]
    pub summary: String,
}

impl ScanReport {
    pub fn open_ports(&self) -> impl Iterator<Item = &PortFinding> {
        self.scan_results.iter().filter(|p| p.is_open())
    }
}

/// What a scan hands back: either the full report or, when the target could
/// not be resolved, only an error message (`{"error": "..."}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ScanOutcome {
    Report(Box<ScanReport>),
    Failed { error: String },
}

// src/core/mod.rs

// The scan-and-score pipeline. Nothing under `core` touches the terminal or
// the filesystem; the front end and the report store sit outside it.

/// Data structures shared across the pipeline, such as `ScanReport`,
/// `PortFinding` and `RiskLevel`.
pub mod models;

/// The individual scanners (resolver, ports, OS, headers) and the
/// orchestrator that sequences them.
pub mod scanner;

/// Static port and header-rule tables with their remediation text.
pub mod knowledge_base;

/// Scoring of a finding set into an overall risk tier and summary.
pub mod risk;

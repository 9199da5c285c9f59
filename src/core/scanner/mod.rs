// src/core/scanner/mod.rs

// Public interface of the `scanner` module: the individual scanners plus the
// orchestrator that sequences them.
pub mod headers_scanner;
pub mod os_scanner;
pub mod port_scanner;
pub mod resolver;

use crate::config::ScanConfig;
use crate::core::models::{
    HeadersResults, PortFinding, ScanMetadata, ScanOutcome, ScanReport, Vulnerability, WebAnalysis,
};
use crate::core::risk;
use chrono::{DateTime, Local};
use std::time::{Duration, Instant};
use strum::Display;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use self::headers_scanner::run_headers_scan;
use self::os_scanner::{run_os_scan, EchoProbe, SystemPing};
use self::port_scanner::run_port_scan;
use self::resolver::{resolve_target, ResolvedTarget};

/// Message returned to the caller when the target cannot be resolved. The
/// underlying cause is logged, not surfaced.
pub const RESOLUTION_FAILED: &str = "Could not resolve hostname";

/// Where a scan currently is. Port probing and OS fingerprinting share the
/// `Probing` phase because they run concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ScanPhase {
    Resolving,
    Probing,
    HeaderAnalysis,
    Scoring,
    Done,
    Failed,
}

impl ScanPhase {
    pub fn label(&self) -> &'static str {
        match self {
            ScanPhase::Resolving => "Resolving target",
            ScanPhase::Probing => "Probing ports and fingerprinting OS",
            ScanPhase::HeaderAnalysis => "Analyzing HTTP headers",
            ScanPhase::Scoring => "Scoring findings",
            ScanPhase::Done => "Done",
            ScanPhase::Failed => "Failed",
        }
    }
}

/// Runs the scan pipeline against a single target.
pub struct Scanner<P: EchoProbe = SystemPing> {
    config: ScanConfig,
    echo: P,
    progress: Option<UnboundedSender<ScanPhase>>,
}

impl Scanner<SystemPing> {
    pub fn new(config: ScanConfig) -> Self {
        let echo = SystemPing::new(config.ping_timeout());
        Self::with_echo_probe(config, echo)
    }
}

impl<P: EchoProbe> Scanner<P> {
    pub fn with_echo_probe(config: ScanConfig, echo: P) -> Self {
        Self { config, echo, progress: None }
    }

    /// Publishes every phase transition on `tx`.
    pub fn with_progress(mut self, tx: UnboundedSender<ScanPhase>) -> Self {
        self.progress = Some(tx);
        self
    }

    fn enter(&self, phase: ScanPhase) {
        info!(phase = %phase, "Scan phase changed.");
        if let Some(tx) = &self.progress {
            // The receiver going away only means nobody is watching.
            let _ = tx.send(phase);
        }
    }

    /// Resolves, probes, analyzes and scores `target`.
    ///
    /// Only a resolution failure produces `ScanOutcome::Failed`; every other
    /// problem degrades into default values inside the report.
    pub async fn run(&self, target: &str) -> ScanOutcome {
        let started_at = Local::now();
        let clock = Instant::now();
        info!(target, "Starting scan.");

        self.enter(ScanPhase::Resolving);
        let resolved = match resolve_target(target).await {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(target, error = %e, "Target resolution failed, aborting scan.");
                self.enter(ScanPhase::Failed);
                return ScanOutcome::Failed { error: RESOLUTION_FAILED.to_string() };
            }
        };

        self.enter(ScanPhase::Probing);
        let (os_guess, ports) = tokio::join!(
            run_os_scan(&self.echo, resolved.ip),
            run_port_scan(
                resolved.ip,
                &self.config.ports,
                self.config.connect_timeout(),
                self.config.max_concurrency,
            )
        );

        let web_port_open = ports
            .iter()
            .any(|p| p.is_open() && self.config.web_ports.contains(&p.port));
        let headers = if web_port_open {
            self.enter(ScanPhase::HeaderAnalysis);
            Some(run_headers_scan(target, self.config.http_timeout(), &self.config.user_agent).await)
        } else {
            None
        };

        self.enter(ScanPhase::Scoring);
        let report = assemble_report(
            target,
            &resolved,
            os_guess.to_string(),
            ports,
            headers,
            &self.config,
            started_at,
            clock.elapsed(),
        );
        info!(
            target,
            risk = %report.risk_level,
            open = report.metadata.open_count,
            vulnerabilities = report.vulnerabilities.len(),
            "Scan finished."
        );
        self.enter(ScanPhase::Done);
        ScanOutcome::Report(Box::new(report))
    }
}

/// Builds the final report from the raw component results. Pure apart from
/// what it is given.
#[allow(clippy::too_many_arguments)]
pub fn assemble_report(
    target: &str,
    resolved: &ResolvedTarget,
    os_guess: String,
    ports: Vec<PortFinding>,
    headers: Option<HeadersResults>,
    config: &ScanConfig,
    started_at: DateTime<Local>,
    elapsed: Duration,
) -> ScanReport {
    let mut vulnerabilities: Vec<Vulnerability> = ports
        .iter()
        .filter(|p| p.is_open())
        .map(Vulnerability::from_open_port)
        .collect();

    let web_analysis = match headers {
        Some(results) => {
            vulnerabilities.extend(results.findings.into_iter().map(Vulnerability::from));
            WebAnalysis { server: results.server, headers: results.headers }
        }
        None => WebAnalysis::default(),
    };

    let assessment = risk::assess(&ports, &vulnerabilities, &config.scoring);
    let summary = risk::summarize(&os_guess, assessment.level);
    let open_count = ports.iter().filter(|p| p.is_open()).count();

    ScanReport {
        target: target.to_string(),
        hostname: resolved.hostname.clone(),
        ip: resolved.ip.to_string(),
        os_guess,
        metadata: ScanMetadata {
            duration_ms: elapsed.as_millis() as u64,
            total_ports: ports.len(),
            open_count,
            scan_time: started_at,
        },
        scan_results: ports,
        web_analysis,
        vulnerabilities,
        risk_level: assessment.level,
        summary,
    }
}

/// Scans `target` with `config` and the system `ping`.
pub async fn run_full_scan(
    target: &str,
    config: ScanConfig,
    progress: Option<UnboundedSender<ScanPhase>>,
) -> ScanOutcome {
    let scanner = Scanner::new(config);
    match progress {
        Some(tx) => scanner.with_progress(tx).run(target).await,
        None => scanner.run(target).await,
    }
}

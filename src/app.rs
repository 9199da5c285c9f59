// src/app.rs

use crate::core::models::{RiskLevel, ScanOutcome, ScanReport, Vulnerability};
use crate::core::scanner::ScanPhase;
use crate::logging::{log_file_path, tail_log};
use crate::report_store::{ReportMeta, ReportStore};
use ratatui::widgets::{ListState, ScrollbarState};
use tracing::{error, info};

pub const SPINNER_CHARS: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const LOG_TAIL_LINES: usize = 200;

pub enum ExportStatus {
    Idle,
    Success(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Idle,
    Scanning,
    Finished,
    Failed,
    Reports,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub open_ports: usize,
    pub high_issues: usize,
    pub medium_issues: usize,
    pub low_issues: usize,
}

pub struct App {
    pub should_quit: bool,
    pub show_disclaimer: bool,
    pub show_logs: bool,
    pub state: AppState,
    pub input: String,
    pub phase: Option<ScanPhase>,
    pub spinner_frame: usize,
    pub scan_report: Option<ScanReport>,
    pub scan_error: Option<String>,
    pub summary: ScanSummary,
    pub analysis_list_state: ListState,
    pub saved_reports: Vec<ReportMeta>,
    pub reports_list_state: ListState,
    pub log_content: Vec<String>,
    pub log_horizontal_scroll: usize,
    pub log_horizontal_scroll_state: ScrollbarState,
    pub export_status: ExportStatus,
}

impl App {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            show_disclaimer: true,
            show_logs: false,
            state: AppState::Idle,
            input: String::new(),
            phase: None,
            spinner_frame: 0,
            scan_report: None,
            scan_error: None,
            summary: ScanSummary::default(),
            analysis_list_state: ListState::default(),
            saved_reports: Vec::new(),
            reports_list_state: ListState::default(),
            log_content: Vec::new(),
            log_horizontal_scroll: 0,
            log_horizontal_scroll_state: ScrollbarState::default(),
            export_status: ExportStatus::Idle,
        }
    }

    pub fn start_scan(&mut self) {
        self.state = AppState::Scanning;
        self.phase = None;
        self.scan_report = None;
        self.scan_error = None;
        self.export_status = ExportStatus::Idle;
    }

    /// Takes the result of a finished scan. Reports are saved to `store`
    /// straight away; a failed save is shown but does not discard the report.
    pub fn finish_scan(&mut self, outcome: ScanOutcome, store: &impl ReportStore) {
        match outcome {
            ScanOutcome::Report(report) => {
                self.export_status = match store.save(&report) {
                    Ok(id) => ExportStatus::Success(id),
                    Err(e) => {
                        error!(error = %e, "Could not save scan report.");
                        ExportStatus::Error(e.to_string())
                    }
                };
                self.show_report(*report);
            }
            ScanOutcome::Failed { error } => {
                info!(error = %error, "Scan failed.");
                self.scan_error = Some(error);
                self.state = AppState::Failed;
            }
        }
    }

    fn show_report(&mut self, report: ScanReport) {
        self.scan_report = Some(report);
        self.state = AppState::Finished;
        self.analysis_list_state = ListState::default();
        self.update_summary();
    }

    pub fn update_summary(&mut self) {
        if let Some(report) = &self.scan_report {
            let count = |level: RiskLevel| report.vulnerabilities.iter().filter(|v| v.risk == level).count();
            self.summary = ScanSummary {
                open_ports: report.open_ports().count(),
                high_issues: count(RiskLevel::High),
                medium_issues: count(RiskLevel::Medium),
                low_issues: count(RiskLevel::Low),
            };
        }
    }

    pub fn selected_vulnerability(&self) -> Option<&Vulnerability> {
        let report = self.scan_report.as_ref()?;
        report.vulnerabilities.get(self.analysis_list_state.selected()?)
    }

    // --- Saved reports ---

    pub fn open_reports(&mut self, store: &impl ReportStore) {
        match store.list() {
            Ok(reports) => {
                self.saved_reports = reports;
                self.export_status = ExportStatus::Idle;
            }
            Err(e) => {
                error!(error = %e, "Could not list saved reports.");
                self.saved_reports = Vec::new();
                self.export_status = ExportStatus::Error(e.to_string());
            }
        }
        self.reports_list_state = ListState::default();
        if !self.saved_reports.is_empty() {
            self.reports_list_state.select(Some(0));
        }
        self.state = AppState::Reports;
    }

    /// Leaves the reports browser for whatever was on screen before it.
    pub fn close_reports(&mut self) {
        self.state = match (&self.scan_report, &self.scan_error) {
            (Some(_), _) => AppState::Finished,
            (None, Some(_)) => AppState::Failed,
            (None, None) => AppState::Idle,
        };
    }

    pub fn open_selected_report(&mut self, store: &impl ReportStore) {
        let Some(id) = self
            .reports_list_state
            .selected()
            .and_then(|i| self.saved_reports.get(i))
            .map(|meta| meta.id.clone())
        else {
            return;
        };
        match store.load(&id) {
            Ok(report) => {
                self.export_status = ExportStatus::Success(id);
                self.input = report.target.clone();
                self.show_report(report);
            }
            Err(e) => {
                error!(id = %id, error = %e, "Could not load saved report.");
                self.export_status = ExportStatus::Error(e.to_string());
            }
        }
    }

    // --- Navigation ---

    pub fn select_next(&mut self) {
        match self.state {
            AppState::Finished => {
                let len = self.scan_report.as_ref().map_or(0, |r| r.vulnerabilities.len());
                step(&mut self.analysis_list_state, len, true);
            }
            AppState::Reports => step(&mut self.reports_list_state, self.saved_reports.len(), true),
            _ => {}
        }
    }

    pub fn select_previous(&mut self) {
        match self.state {
            AppState::Finished => {
                let len = self.scan_report.as_ref().map_or(0, |r| r.vulnerabilities.len());
                step(&mut self.analysis_list_state, len, false);
            }
            AppState::Reports => step(&mut self.reports_list_state, self.saved_reports.len(), false),
            _ => {}
        }
    }

    pub fn toggle_logs(&mut self) {
        self.show_logs = !self.show_logs;
        if self.show_logs {
            self.refresh_logs();
        }
    }

    /// Widest log line, in characters. Scrolling further shows nothing.
    fn max_log_scroll(&self) -> usize {
        self.log_content.iter().map(|l| l.chars().count()).max().unwrap_or(0)
    }

    fn set_log_scroll(&mut self, offset: usize) {
        self.log_horizontal_scroll = offset.min(self.max_log_scroll());
        self.log_horizontal_scroll_state = self.log_horizontal_scroll_state.position(self.log_horizontal_scroll);
    }

    pub fn scroll_logs_left(&mut self) {
        self.set_log_scroll(self.log_horizontal_scroll.saturating_sub(4));
    }

    pub fn scroll_logs_right(&mut self) {
        self.set_log_scroll(self.log_horizontal_scroll.saturating_add(4));
    }

    fn refresh_logs(&mut self) {
        self.log_content = tail_log(&log_file_path(), LOG_TAIL_LINES);
        self.set_log_scroll(self.log_horizontal_scroll);
    }

    pub fn on_tick(&mut self) {
        if self.state == AppState::Scanning {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_CHARS.len();
        }
        if self.show_logs {
            self.refresh_logs();
        }
    }

    pub fn quit(&mut self) { self.should_quit = true; }

    pub fn reset(&mut self) {
        self.state = AppState::Idle;
        self.input = String::new();
        self.phase = None;
        self.scan_report = None;
        self.scan_error = None;
        self.summary = ScanSummary::default();
        self.analysis_list_state = ListState::default();
        self.export_status = ExportStatus::Idle;
    }
}

/// Moves a list selection one step, wrapping at both ends.
fn step(state: &mut ListState, len: usize, forward: bool) {
    if len == 0 {
        state.select(None);
        return;
    }
    let next = match (state.selected(), forward) {
        (None, true) => 0,
        (None, false) => len - 1,
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
    };
    state.select(Some(next));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{PortState, ScanMetadata, VulnerabilityKind, WebAnalysis};
    use crate::core::scanner::port_scanner::classify_port;
    use crate::report_store::StoreError;
    use chrono::Local;
    use std::cell::RefCell;

    #[derive(Default)]
    struct MemoryStore {
        saved: RefCell<Vec<ScanReport>>,
    }

    impl ReportStore for MemoryStore {
        fn save(&self, report: &ScanReport) -> Result<String, StoreError> {
            let mut saved = self.saved.borrow_mut();
            saved.push(report.clone());
            Ok(format!("mem-{}", saved.len() - 1))
        }

        fn list(&self) -> Result<Vec<ReportMeta>, StoreError> {
            Ok(self
                .saved
                .borrow()
                .iter()
                .enumerate()
                .map(|(i, r)| ReportMeta {
                    id: format!("mem-{}", i),
                    target: r.target.clone(),
                    risk_level: r.risk_level,
                    scan_time: r.metadata.scan_time,
                })
                .collect())
        }

        fn load(&self, id: &str) -> Result<ScanReport, StoreError> {
            id.strip_prefix("mem-")
                .and_then(|i| i.parse::<usize>().ok())
                .and_then(|i| self.saved.borrow().get(i).cloned())
                .ok_or_else(|| StoreError::NotFound(id.to_string()))
        }
    }

    fn vuln(port: u16, risk: RiskLevel) -> Vulnerability {
        Vulnerability {
            kind: VulnerabilityKind::OpenPort(port),
            message: format!("Service on {} is exposed.", port),
            risk,
            recommendation: "Close it.".into(),
        }
    }

    fn report(target: &str) -> ScanReport {
        ScanReport {
            target: target.into(),
            hostname: target.into(),
            ip: "10.0.0.5".into(),
            os_guess: "Unknown".into(),
            scan_results: [(21, PortState::Open), (22, PortState::Open), (80, PortState::Closed), (443, PortState::Open)]
                .into_iter()
                .map(|(port, state)| classify_port(port, state))
                .collect(),
            web_analysis: WebAnalysis::default(),
            vulnerabilities: vec![vuln(21, RiskLevel::High), vuln(22, RiskLevel::Medium), vuln(443, RiskLevel::Low)],
            risk_level: RiskLevel::High,
            metadata: ScanMetadata { duration_ms: 10, total_ports: 4, open_count: 3, scan_time: Local::now() },
            summary: String::new(),
        }
    }

    #[test]
    fn finished_scan_is_saved_and_summarized() {
        let store = MemoryStore::default();
        let mut app = App::new();
        app.start_scan();
        app.finish_scan(ScanOutcome::Report(Box::new(report("example.com"))), &store);

        assert_eq!(app.state, AppState::Finished);
        assert!(matches!(&app.export_status, ExportStatus::Success(id) if id == "mem-0"));
        assert_eq!(
            app.summary,
            ScanSummary { open_ports: 3, high_issues: 1, medium_issues: 1, low_issues: 1 }
        );
        assert_eq!(store.saved.borrow().len(), 1);
    }

    #[test]
    fn failed_scan_keeps_only_the_error() {
        let mut app = App::new();
        app.start_scan();
        app.finish_scan(ScanOutcome::Failed { error: "Could not resolve hostname".into() }, &MemoryStore::default());
        assert_eq!(app.state, AppState::Failed);
        assert!(app.scan_report.is_none());
        assert_eq!(app.scan_error.as_deref(), Some("Could not resolve hostname"));
    }

    #[test]
    fn finding_selection_wraps() {
        let mut app = App::new();
        app.finish_scan(ScanOutcome::Report(Box::new(report("example.com"))), &MemoryStore::default());

        app.select_previous();
        assert_eq!(app.analysis_list_state.selected(), Some(2));
        app.select_next();
        assert_eq!(app.analysis_list_state.selected(), Some(0));
        assert_eq!(app.selected_vulnerability().map(|v| v.risk), Some(RiskLevel::High));
    }

    #[test]
    fn saved_report_can_be_reopened() {
        let store = MemoryStore::default();
        store.save(&report("first.example")).unwrap();
        store.save(&report("second.example")).unwrap();

        let mut app = App::new();
        app.open_reports(&store);
        assert_eq!(app.state, AppState::Reports);
        assert_eq!(app.reports_list_state.selected(), Some(0));

        app.select_next();
        app.open_selected_report(&store);
        assert_eq!(app.state, AppState::Finished);
        assert_eq!(app.scan_report.as_ref().map(|r| r.target.as_str()), Some("second.example"));
        assert_eq!(app.input, "second.example");
    }

    #[test]
    fn closing_reports_restores_previous_view() {
        let store = MemoryStore::default();
        let mut app = App::new();
        app.open_reports(&store);
        assert!(app.saved_reports.is_empty());
        app.close_reports();
        assert_eq!(app.state, AppState::Idle);

        app.finish_scan(ScanOutcome::Report(Box::new(report("example.com"))), &store);
        app.open_reports(&store);
        app.close_reports();
        assert_eq!(app.state, AppState::Finished);
    }

    #[test]
    fn log_scroll_stops_at_the_widest_line() {
        let mut app = App::new();
        app.log_content = vec!["short".into(), "x".repeat(10)];
        for _ in 0..20_000 {
            app.scroll_logs_right();
        }
        assert_eq!(app.log_horizontal_scroll, 10);

        app.scroll_logs_left();
        assert_eq!(app.log_horizontal_scroll, 6);

        app.log_content.clear();
        app.scroll_logs_right();
        assert_eq!(app.log_horizontal_scroll, 0);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut app = App::new();
        app.input.push_str("example.com");
        app.finish_scan(ScanOutcome::Report(Box::new(report("example.com"))), &MemoryStore::default());
        app.reset();
        assert_eq!(app.state, AppState::Idle);
        assert!(app.input.is_empty());
        assert_eq!(app.summary, ScanSummary::default());
    }
}

//! Turns a finding set into a single score, an overall risk tier and the
//! summary paragraph shown at the top of a report. Everything here is a pure
//! function of its inputs.

use crate::config::ScoringConfig;
use crate::core::models::{PortFinding, RiskLevel, Vulnerability};

const SUMMARY_HIGH: &str =
    "CRITICAL: Multiple high-profile services exposed. Immediate hardening of MySQL/FTP required.";
const SUMMARY_MEDIUM: &str =
    "WARNING: Insecure services (HTTP/SSH) detected. Review firewall and encryption policies.";
const SUMMARY_LOW: &str = "Target security posture appears solid based on standard vectors.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskAssessment {
    pub score: u32,
    pub level: RiskLevel,
}

/// Sums the weights of every open port and every vulnerability.
///
/// Open ports weigh by their own risk; closed ports weigh nothing.
/// Vulnerabilities only count when Medium or High.
pub fn risk_score(ports: &[PortFinding], vulnerabilities: &[Vulnerability], weights: &ScoringConfig) -> u32 {
    let port_points: u32 = ports
        .iter()
        .filter(|p| p.is_open())
        .map(|p| match p.risk {
            RiskLevel::High => weights.open_port_high,
            RiskLevel::Medium => weights.open_port_medium,
            RiskLevel::Low | RiskLevel::Safe => weights.open_port_other,
        })
        .sum();

    let finding_points: u32 = vulnerabilities
        .iter()
        .map(|v| match v.risk {
            RiskLevel::High => weights.finding_high,
            RiskLevel::Medium => weights.finding_medium,
            RiskLevel::Low | RiskLevel::Safe => 0,
        })
        .sum();

    port_points + finding_points
}

pub fn level_for_score(score: u32, weights: &ScoringConfig) -> RiskLevel {
    if score >= weights.high_threshold {
        RiskLevel::High
    } else if score >= weights.medium_threshold {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

pub fn assess(ports: &[PortFinding], vulnerabilities: &[Vulnerability], weights: &ScoringConfig) -> RiskAssessment {
    let score = risk_score(ports, vulnerabilities, weights);
    RiskAssessment { score, level: level_for_score(score, weights) }
}

/// One paragraph naming the OS guess, followed by the warning for the tier.
pub fn summarize(os_guess: &str, level: RiskLevel) -> String {
    let verdict = match level {
        RiskLevel::High => SUMMARY_HIGH,
        RiskLevel::Medium => SUMMARY_MEDIUM,
        RiskLevel::Low | RiskLevel::Safe => SUMMARY_LOW,
    };
    format!("Detected {}. {}", os_guess, verdict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::knowledge_base::header_finding;
    use crate::core::models::PortState;
    use crate::core::scanner::port_scanner::classify_port;

    fn ports(open: &[u16]) -> Vec<PortFinding> {
        [21, 22, 80, 443, 3306, 8080]
            .into_iter()
            .map(|p| {
                let state = if open.contains(&p) { PortState::Open } else { PortState::Closed };
                classify_port(p, state)
            })
            .collect()
    }

    fn open_port_vulns(ports: &[PortFinding]) -> Vec<Vulnerability> {
        ports.iter().filter(|p| p.is_open()).map(Vulnerability::from_open_port).collect()
    }

    #[test]
    fn nothing_open_is_low() {
        let weights = ScoringConfig::default();
        let assessment = assess(&ports(&[]), &[], &weights);
        assert_eq!(assessment, RiskAssessment { score: 0, level: RiskLevel::Low });
    }

    #[test]
    fn web_ports_with_missing_hsts_are_medium() {
        let weights = ScoringConfig::default();
        let ports = ports(&[80, 443]);
        let mut vulns = open_port_vulns(&ports);
        vulns.extend(header_finding("HEADERS_HSTS_MISSING", None).map(Vulnerability::from));

        // ports 2 + 1, port-80 vuln 3, HSTS 3
        let assessment = assess(&ports, &vulns, &weights);
        assert_eq!(assessment.score, 9);
        assert_eq!(assessment.level, RiskLevel::Medium);

        let summary = summarize("Linux/Unix (TTL=64)", assessment.level);
        assert!(summary.starts_with("Detected Linux/Unix (TTL=64). "));
        assert!(summary.contains("WARNING"));
    }

    #[test]
    fn exposed_ftp_and_mysql_are_at_least_medium() {
        let weights = ScoringConfig::default();
        let ports = ports(&[21, 3306]);
        let vulns = open_port_vulns(&ports);
        let assessment = assess(&ports, &vulns, &weights);
        assert!(assessment.score >= 6);
        assert!(assessment.level >= RiskLevel::Medium);
        assert!(summarize("Unknown", assessment.level).contains("CRITICAL"));
    }

    #[test]
    fn low_findings_only_affect_display() {
        let weights = ScoringConfig::default();
        let banner = header_finding("HEADERS_SERVER_BANNER", Some("nginx")).map(Vulnerability::from);
        let vulns: Vec<Vulnerability> = banner.into_iter().collect();
        assert_eq!(risk_score(&[], &vulns, &weights), 0);
    }

    #[test]
    fn thresholds_are_inclusive_and_configurable() {
        let weights = ScoringConfig::default();
        assert_eq!(level_for_score(4, &weights), RiskLevel::Low);
        assert_eq!(level_for_score(5, &weights), RiskLevel::Medium);
        assert_eq!(level_for_score(10, &weights), RiskLevel::High);

        let strict = ScoringConfig { high_threshold: 4, medium_threshold: 2, ..ScoringConfig::default() };
        assert_eq!(level_for_score(4, &strict), RiskLevel::High);
    }

    #[test]
    fn assessment_is_deterministic() {
        let weights = ScoringConfig::default();
        let ports = ports(&[22, 80, 8080]);
        let vulns = open_port_vulns(&ports);
        let first = assess(&ports, &vulns, &weights);
        for _ in 0..5 {
            assert_eq!(assess(&ports, &vulns, &weights), first);
        }
    }
}

//! Static, read-only tables behind the risk assessment.
//! Every port the prober knows about is described here once, together with its
//! base risk and the remediation shown to the user, as are the templates for
//! the header findings. Keeping this data-driven means the scanners never
//! carry per-port conditional chains.

use crate::core::models::{FindingKind, HeaderFinding, PortState, RiskLevel};

/// What the scanner knows about a well-known port.
#[derive(Debug)]
pub struct PortProfile {
    pub port: u16,
    pub service: &'static str,
    /// Risk assigned when the port is found open.
    pub base_risk: RiskLevel,
    pub recommendation: &'static str,
}

/// The canonical port set, in ascending order.
pub static PORT_PROFILES: &[PortProfile] = &[
    PortProfile {
        port: 21,
        service: "FTP",
        base_risk: RiskLevel::High,
        recommendation: "Replace FTP with SFTP/SCP to encrypt traffic.",
    },
    PortProfile {
        port: 22,
        service: "SSH",
        base_risk: RiskLevel::Medium,
        recommendation: "Ensure SSH is configured with key-based auth and root login disabled.",
    },
    PortProfile {
        port: 80,
        service: "HTTP",
        base_risk: RiskLevel::Medium,
        recommendation: "Redirect all HTTP traffic to HTTPS (port 443).",
    },
    PortProfile {
        port: 443,
        service: "HTTPS",
        base_risk: RiskLevel::Low,
        recommendation: "Ensure strong TLS ciphers are enabled.",
    },
    PortProfile {
        port: 3306,
        service: "MySQL",
        base_risk: RiskLevel::High,
        recommendation: "Bind MySQL to localhost or use a VPN. Do not expose to public internet.",
    },
    PortProfile {
        port: 8080,
        service: "HTTP-Alt",
        base_risk: RiskLevel::Medium,
        recommendation: "Restrict access to administrative interfaces (VPN/IP allowlist).",
    },
];

pub const UNKNOWN_SERVICE: &str = "Unknown";
pub const NO_ACTION: &str = "None required.";
pub const GENERIC_RECOMMENDATION: &str = "Review service configuration and firewall rules.";

pub fn port_profile(port: u16) -> Option<&'static PortProfile> {
    PORT_PROFILES.iter().find(|p| p.port == port)
}

pub fn canonical_ports() -> Vec<u16> {
    PORT_PROFILES.iter().map(|p| p.port).collect()
}

pub fn service_name(port: u16) -> &'static str {
    port_profile(port).map_or(UNKNOWN_SERVICE, |p| p.service)
}

/// Closed ports are always safe; open ports take their table risk, or `Low`
/// when the port is not in the table.
pub fn port_risk(port: u16, state: PortState) -> RiskLevel {
    match state {
        PortState::Closed => RiskLevel::Safe,
        PortState::Open => port_profile(port).map_or(RiskLevel::Low, |p| p.base_risk),
    }
}

pub fn port_recommendation(port: u16, risk: RiskLevel) -> &'static str {
    if risk == RiskLevel::Safe {
        return NO_ACTION;
    }
    port_profile(port).map_or(GENERIC_RECOMMENDATION, |p| p.recommendation)
}

// --- Header findings ---

/// Template for a header finding. `message` may contain a single `{}` that is
/// replaced by the offending header value.
pub struct HeaderRule {
    pub code: &'static str,
    pub kind: FindingKind,
    pub risk: RiskLevel,
    pub message: &'static str,
    pub recommendation: &'static str,
}

pub static HEADER_RULES: &[HeaderRule] = &[
    HeaderRule {
        code: "HEADERS_X_POWERED_BY",
        kind: FindingKind::Info,
        risk: RiskLevel::Low,
        message: "Technology disclosed: {}",
        recommendation: "Remove 'X-Powered-By' header to prevent info leakage.",
    },
    HeaderRule {
        code: "HEADERS_HSTS_MISSING",
        kind: FindingKind::Security,
        risk: RiskLevel::Medium,
        message: "HSTS Header Missing",
        recommendation: "Enable HSTS (Strict-Transport-Security) to enforce HTTPS.",
    },
    HeaderRule {
        code: "HEADERS_SERVER_BANNER",
        kind: FindingKind::Info,
        risk: RiskLevel::Low,
        message: "Server banner exposed: {}",
        recommendation: "Configure server to suppress detailed version banners.",
    },
];

/// Builds the finding for `code`, substituting `value` into the message.
/// Returns `None` for codes that are not in the table.
pub fn header_finding(code: &str, value: Option<&str>) -> Option<HeaderFinding> {
    let rule = HEADER_RULES.iter().find(|r| r.code == code)?;
    let message = match value {
        Some(v) => rule.message.replacen("{}", v, 1),
        None => rule.message.to_string(),
    };
    Some(HeaderFinding {
        kind: rule.kind,
        message,
        risk: rule.risk,
        recommendation: rule.recommendation.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_ports_are_always_safe() {
        for port in canonical_ports().into_iter().chain([9999]) {
            assert_eq!(port_risk(port, PortState::Closed), RiskLevel::Safe);
            assert_eq!(port_recommendation(port, RiskLevel::Safe), NO_ACTION);
        }
    }

    #[test]
    fn open_port_risks_match_table() {
        let expected = [
            (21, RiskLevel::High),
            (22, RiskLevel::Medium),
            (80, RiskLevel::Medium),
            (443, RiskLevel::Low),
            (3306, RiskLevel::High),
            (8080, RiskLevel::Medium),
            (5432, RiskLevel::Low),
        ];
        for (port, risk) in expected {
            assert_eq!(port_risk(port, PortState::Open), risk, "port {}", port);
        }
    }

    #[test]
    fn unmapped_open_port_gets_generic_text() {
        assert_eq!(service_name(5432), UNKNOWN_SERVICE);
        assert_eq!(port_recommendation(5432, RiskLevel::Low), GENERIC_RECOMMENDATION);
        assert!(port_recommendation(21, RiskLevel::High).contains("SFTP/SCP"));
    }

    #[test]
    fn canonical_ports_are_sorted() {
        let ports = canonical_ports();
        assert_eq!(ports, vec![21, 22, 80, 443, 3306, 8080]);
    }

    #[test]
    fn header_finding_substitutes_value() {
        let f = header_finding("HEADERS_SERVER_BANNER", Some("nginx/1.25")).unwrap();
        assert_eq!(f.message, "Server banner exposed: nginx/1.25");
        assert_eq!(f.risk, RiskLevel::Low);
        assert!(header_finding("NOPE", None).is_none());
    }
}

// src/core/scanner/port_scanner.rs

use crate::core::knowledge_base;
use crate::core::models::{PortFinding, PortState};
use std::collections::BTreeSet;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// One TCP connect attempt. Refused, unreachable and timed-out connections
/// all collapse to `Closed`; the stream is dropped as soon as it opens.
async fn probe_port(ip: Ipv4Addr, port: u16, connect_timeout: Duration) -> PortState {
    let addr = SocketAddr::from((ip, port));
    match timeout(connect_timeout, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => {
            drop(stream);
            debug!(port, "Port open.");
            PortState::Open
        }
        Ok(Err(e)) => {
            debug!(port, error = %e, "Connect failed.");
            PortState::Closed
        }
        Err(_) => {
            debug!(port, "Connect timed out.");
            PortState::Closed
        }
    }
}

/// Builds the finding for a probed port from the static port table.
pub fn classify_port(port: u16, state: PortState) -> PortFinding {
    let risk = knowledge_base::port_risk(port, state);
    PortFinding {
        port,
        state,
        service: knowledge_base::service_name(port).to_string(),
        risk,
        recommendation: knowledge_base::port_recommendation(port, risk).to_string(),
    }
}

/// Probes every port in `ports` concurrently, with at most `max_concurrency`
/// connects in flight, and returns one finding per port sorted by port.
pub async fn run_port_scan(
    ip: Ipv4Addr,
    ports: &[u16],
    connect_timeout: Duration,
    max_concurrency: usize,
) -> Vec<PortFinding> {
    info!(%ip, count = ports.len(), "Starting port scan.");

    let limiter = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for &port in ports {
        let limiter = Arc::clone(&limiter);
        tasks.spawn(async move {
            // The semaphore is never closed, so acquiring only waits.
            let _permit = limiter.acquire_owned().await.ok();
            (port, probe_port(ip, port, connect_timeout).await)
        });
    }

    let mut findings = Vec::with_capacity(ports.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((port, state)) => findings.push(classify_port(port, state)),
            Err(e) => error!(error = %e, "Port probe task failed."),
        }
    }
    fill_missing(&mut findings, ports);

    info!(
        open = findings.iter().filter(|f| f.is_open()).count(),
        "Port scan finished."
    );
    findings
}

/// Adds a `Closed` finding for every port whose probe produced nothing, then
/// sorts by port. Completion order is arbitrary.
fn fill_missing(findings: &mut Vec<PortFinding>, ports: &[u16]) {
    let seen: BTreeSet<u16> = findings.iter().map(|f| f.port).collect();
    for &port in ports.iter().filter(|p| !seen.contains(p)) {
        warn!(port, "No probe result, reporting port as closed.");
        findings.push(classify_port(port, PortState::Closed));
    }
    findings.sort_by_key(|f| f.port);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::RiskLevel;
    use tokio::net::TcpListener;

    /// Binds and immediately releases a loopback port, leaving it closed.
    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    #[test]
    fn classify_uses_static_table() {
        let ftp = classify_port(21, PortState::Open);
        assert_eq!(ftp.service, "FTP");
        assert_eq!(ftp.risk, RiskLevel::High);

        let closed_db = classify_port(3306, PortState::Closed);
        assert_eq!(closed_db.risk, RiskLevel::Safe);
        assert_eq!(closed_db.service, "MySQL");
    }

    #[tokio::test]
    async fn detects_open_and_closed_ports_in_order() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open = listener.local_addr().unwrap().port();
        let closed_a = closed_port().await;
        let closed_b = closed_port().await;

        let ports = vec![closed_b, open, closed_a];
        let findings = run_port_scan(Ipv4Addr::LOCALHOST, &ports, Duration::from_millis(500), 20).await;

        assert_eq!(findings.len(), 3);
        let scanned: Vec<u16> = findings.iter().map(|f| f.port).collect();
        let mut sorted = scanned.clone();
        sorted.sort_unstable();
        assert_eq!(scanned, sorted);

        for finding in &findings {
            if finding.port == open {
                assert_eq!(finding.state, PortState::Open);
                assert_eq!(finding.risk, RiskLevel::Low);
            } else {
                assert_eq!(finding.state, PortState::Closed);
                assert_eq!(finding.risk, RiskLevel::Safe);
            }
        }
        drop(listener);
    }

    #[tokio::test]
    async fn single_permit_still_probes_every_port() {
        let mut ports = Vec::new();
        for _ in 0..4 {
            ports.push(closed_port().await);
        }
        let findings = run_port_scan(Ipv4Addr::LOCALHOST, &ports, Duration::from_millis(200), 1).await;
        assert_eq!(findings.len(), ports.len());
        assert!(findings.iter().all(|f| f.state == PortState::Closed));
    }

    #[test]
    fn ports_without_a_result_are_reported_closed() {
        let mut findings = vec![classify_port(8080, PortState::Open), classify_port(21, PortState::Open)];
        fill_missing(&mut findings, &[21, 22, 3306, 8080]);

        let ports: Vec<u16> = findings.iter().map(|f| f.port).collect();
        assert_eq!(ports, vec![21, 22, 3306, 8080]);
        assert_eq!(findings[1].state, PortState::Closed);
        assert_eq!(findings[2].risk, RiskLevel::Safe);
        assert_eq!(findings[3].state, PortState::Open);
    }
}

// src/core/scanner/resolver.rs

use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

/// The only failure that aborts a scan.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("target is empty")]
    EmptyTarget,
    #[error("malformed target: {0}")]
    Malformed(String),
    #[error("could not resolve {host}: {reason}")]
    Lookup { host: String, reason: String },
    #[error("{0} has no IPv4 address")]
    NoIpv4(String),
}

/// A target after parsing and name resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub hostname: String,
    pub ip: Ipv4Addr,
}

/// Extracts the bare host from a URL or a `host[:port][/path]` string. The
/// host is returned exactly as written in `target`.
pub fn extract_host(target: &str) -> Result<String, ResolutionError> {
    let target = target.trim();
    if target.is_empty() {
        return Err(ResolutionError::EmptyTarget);
    }

    let rest = match target.split_once("://") {
        Some((_, rest)) => {
            Url::parse(target).map_err(|e| ResolutionError::Malformed(format!("{}: {}", target, e)))?;
            rest
        }
        None => target,
    };

    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit('@').next().unwrap_or_default();
    let host = match host_port.strip_prefix('[') {
        Some(bracketed) => bracketed.split(']').next().unwrap_or_default(),
        None => host_port.split(':').next().unwrap_or_default(),
    };

    if host.is_empty() {
        return Err(ResolutionError::Malformed(target.to_string()));
    }
    Ok(host.to_string())
}

fn build_resolver() -> TokioAsyncResolver {
    match TokioAsyncResolver::tokio_from_system_conf() {
        Ok(resolver) => resolver,
        Err(e) => {
            warn!(error = %e, "System resolver configuration unavailable, falling back to defaults.");
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
        }
    }
}

/// Turns a user-supplied target into `(hostname, ipv4)`.
///
/// Literal IPv4 addresses skip DNS entirely. Names get exactly one lookup;
/// there is no retry.
pub async fn resolve_target(target: &str) -> Result<ResolvedTarget, ResolutionError> {
    let hostname = extract_host(target)?;
    debug!(target, hostname = %hostname, "Parsed target.");

    if let Ok(ip) = hostname.parse::<Ipv4Addr>() {
        info!(%ip, "Target is a literal IPv4 address.");
        return Ok(ResolvedTarget { hostname, ip });
    }

    let resolver = build_resolver();
    let lookup = resolver
        .lookup_ip(hostname.as_str())
        .await
        .map_err(|e| ResolutionError::Lookup { host: hostname.clone(), reason: e.to_string() })?;

    let ip = lookup
        .iter()
        .find_map(|addr| match addr {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .ok_or_else(|| ResolutionError::NoIpv4(hostname.clone()))?;

    info!(hostname = %hostname, %ip, "Resolved target.");
    Ok(ResolvedTarget { hostname, ip })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scheme_port_and_path() {
        assert_eq!(extract_host("https://example.com:8443/login?x=1").unwrap(), "example.com");
        assert_eq!(extract_host("http://example.com").unwrap(), "example.com");
        assert_eq!(extract_host("example.com:8080/admin").unwrap(), "example.com");
        assert_eq!(extract_host("  10.0.0.7  ").unwrap(), "10.0.0.7");
        assert_eq!(extract_host("admin@example.com:21").unwrap(), "example.com");
    }

    #[test]
    fn host_keeps_the_input_spelling() {
        let input = "HTTP://Example.COM/path";
        let host = extract_host(input).unwrap();
        assert_eq!(host, "Example.COM");
        assert!(input.contains(&host));
        assert_eq!(extract_host("https://user@Shop.Example.org:8443").unwrap(), "Shop.Example.org");
        assert_eq!(extract_host("http://[::1]:8080/").unwrap(), "::1");
    }

    #[test]
    fn rejects_empty_and_hostless_input() {
        assert_eq!(extract_host("   "), Err(ResolutionError::EmptyTarget));
        assert!(matches!(extract_host("http://"), Err(ResolutionError::Malformed(_))));
        assert!(matches!(extract_host(":8080/path"), Err(ResolutionError::Malformed(_))));
    }

    #[tokio::test]
    async fn literal_ip_resolves_without_dns() {
        let resolved = resolve_target("http://127.0.0.1:8080/index.html").await.unwrap();
        assert_eq!(resolved.ip, Ipv4Addr::LOCALHOST);
        assert_eq!(resolved.hostname, "127.0.0.1");
    }

    #[tokio::test]
    async fn localhost_resolves_to_loopback() {
        let resolved = resolve_target("localhost").await.unwrap();
        assert!(resolved.ip.is_loopback());
        assert!("localhost".contains(&resolved.hostname));
    }

    #[tokio::test]
    async fn reserved_invalid_tld_fails() {
        let err = resolve_target("no-such-host.invalid").await.unwrap_err();
        assert!(matches!(err, ResolutionError::Lookup { .. } | ResolutionError::NoIpv4(_)));
    }
}

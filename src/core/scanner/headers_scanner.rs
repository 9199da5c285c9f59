// src/core/scanner/headers_scanner.rs

use crate::core::knowledge_base::header_finding;
use crate::core::models::{HeaderFinding, HeadersResults, UNKNOWN_SERVER};
use reqwest::header::{HeaderMap, SERVER, STRICT_TRANSPORT_SECURITY};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const X_POWERED_BY: &str = "x-powered-by";

/// Gives the target an explicit `http://` scheme when it has none.
pub fn normalize_url(target: &str) -> String {
    let target = target.trim();
    if target.starts_with("http://") || target.starts_with("https://") {
        target.to_string()
    } else {
        format!("http://{}", target)
    }
}

/// Reads a header as text. Non-UTF-8 bytes are replaced rather than dropped,
/// so the header still counts as present.
fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).map(|value| match value.to_str() {
        Ok(s) => s.to_string(),
        Err(_) => {
            warn!(header_name = name, "Header contained invalid UTF-8.");
            String::from_utf8_lossy(value.as_bytes()).into_owned()
        }
    })
}

/// Flattens the response headers into a sorted name → value map. Repeated
/// headers are joined with `, `.
fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        map.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    map
}

/// Applies the header rules to a response. `is_https` decides whether a
/// missing HSTS header counts.
pub fn analyze_headers(headers: &HeaderMap, is_https: bool) -> Vec<HeaderFinding> {
    debug!("Analyzing collected header data.");
    let mut findings = Vec::new();

    if let Some(powered_by) = header_text(headers, X_POWERED_BY) {
        debug!(value = %powered_by, "X-Powered-By disclosed.");
        findings.extend(header_finding("HEADERS_X_POWERED_BY", Some(&powered_by)));
    }

    if is_https && !headers.contains_key(STRICT_TRANSPORT_SECURITY) {
        debug!("HSTS header missing on HTTPS target.");
        findings.extend(header_finding("HEADERS_HSTS_MISSING", None));
    }

    if let Some(server) = header_text(headers, SERVER.as_str()) {
        debug!(value = %server, "Server banner exposed.");
        findings.extend(header_finding("HEADERS_SERVER_BANNER", Some(&server)));
    }

    findings
}

/// Sends one HEAD request (redirects followed) and inspects the headers.
///
/// Every failure path returns `HeadersResults::default()`; the cause is only
/// logged.
pub async fn run_headers_scan(target: &str, http_timeout: Duration, user_agent: &str) -> HeadersResults {
    let url = normalize_url(target);
    info!(url = %url, "Starting headers scan.");

    let client = match reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(http_timeout)
        .no_proxy()
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client for headers scan.");
            return HeadersResults::default();
        }
    };

    match client.head(&url).send().await {
        Ok(response) => {
            info!(status = %response.status(), final_url = %response.url(), "Received HTTP response for headers scan.");
            let headers = response.headers();
            let results = HeadersResults {
                server: header_text(headers, SERVER.as_str()).unwrap_or_else(|| UNKNOWN_SERVER.to_string()),
                findings: analyze_headers(headers, url.starts_with("https://")),
                headers: collect_headers(headers),
            };
            info!(findings = %results.findings.len(), "Headers scan finished.");
            results
        }
        Err(e) => {
            warn!(url = %url, error = %e, "HTTP request failed for headers scan.");
            HeadersResults::default()
        }
    }
}

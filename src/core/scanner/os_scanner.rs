// src/core/scanner/os_scanner.rs

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::future::Future;
use std::net::Ipv4Addr;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

static RE_TTL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)ttl[= ]?(\d+)").unwrap());

/// Raw result of sending one ICMP echo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EchoReply {
    /// The probe exited successfully; `output` is whatever it printed.
    Replied { output: String },
    /// The probe ran but reported failure (no reply, filtered, unreachable).
    Blocked,
    /// The probe could not be run at all, or outlived its deadline.
    Failed(String),
}

/// Sends a single ICMP echo to a host. Implementations hide how the echo is
/// sent; the scanner only interprets the reply.
pub trait EchoProbe: Send + Sync {
    fn echo(&self, ip: Ipv4Addr) -> impl Future<Output = EchoReply> + Send;
}

/// Uses the operating system's own `ping` utility.
#[derive(Debug, Clone)]
pub struct SystemPing {
    pub timeout: Duration,
}

impl SystemPing {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Single-echo arguments for the host's `ping`. Windows and the BSD
    /// family take the wait in milliseconds, Linux in whole seconds.
    fn args(&self) -> [String; 4] {
        let millis = self.timeout.as_millis().max(1).to_string();
        if cfg!(windows) {
            ["-n".into(), "1".into(), "-w".into(), millis]
        } else if cfg!(any(target_os = "macos", target_os = "freebsd", target_os = "netbsd", target_os = "openbsd")) {
            ["-c".into(), "1".into(), "-W".into(), millis]
        } else {
            let secs = self.timeout.as_secs().max(1);
            ["-c".into(), "1".into(), "-W".into(), secs.to_string()]
        }
    }

    fn command(&self, ip: Ipv4Addr) -> Command {
        let mut cmd = Command::new("ping");
        cmd.args(self.args())
            .arg(ip.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

impl EchoProbe for SystemPing {
    async fn echo(&self, ip: Ipv4Addr) -> EchoReply {
        // Grace period on top of ping's own timeout before the child is killed.
        let deadline = self.timeout + Duration::from_secs(1);
        match timeout(deadline, self.command(ip).output()).await {
            Ok(Ok(output)) if output.status.success() => EchoReply::Replied {
                output: String::from_utf8_lossy(&output.stdout).into_owned(),
            },
            Ok(Ok(output)) => {
                debug!(status = ?output.status.code(), "Ping exited with failure.");
                EchoReply::Blocked
            }
            Ok(Err(e)) => EchoReply::Failed(format!("could not run ping: {}", e)),
            Err(_) => EchoReply::Failed("ping did not finish in time".to_string()),
        }
    }
}

/// Best-effort guess at the remote OS family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsGuess {
    LinuxUnix { ttl: u32 },
    Windows { ttl: u32 },
    NetworkDevice { ttl: u32 },
    UnknownTtl { ttl: u32 },
    PingBlocked,
    NoTtl,
    Unknown,
}

impl OsGuess {
    /// Maps a TTL to the OS family whose default initial TTL it falls under.
    pub fn from_ttl(ttl: u32) -> Self {
        match ttl {
            0..=64 => OsGuess::LinuxUnix { ttl },
            65..=128 => OsGuess::Windows { ttl },
            129..=255 => OsGuess::NetworkDevice { ttl },
            _ => OsGuess::UnknownTtl { ttl },
        }
    }

    pub fn from_reply(reply: &EchoReply) -> Self {
        match reply {
            EchoReply::Replied { output } => match parse_ttl(output) {
                Some(ttl) => Self::from_ttl(ttl),
                None => OsGuess::NoTtl,
            },
            EchoReply::Blocked => OsGuess::PingBlocked,
            EchoReply::Failed(_) => OsGuess::Unknown,
        }
    }
}

impl fmt::Display for OsGuess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsGuess::LinuxUnix { ttl } => write!(f, "Linux/Unix (TTL={})", ttl),
            OsGuess::Windows { ttl } => write!(f, "Windows (TTL={})", ttl),
            OsGuess::NetworkDevice { ttl } => write!(f, "Network Device (TTL={})", ttl),
            OsGuess::UnknownTtl { ttl } => write!(f, "Unknown (TTL={})", ttl),
            OsGuess::PingBlocked => write!(f, "Unknown (Ping Blocked)"),
            OsGuess::NoTtl => write!(f, "Unknown (No TTL)"),
            OsGuess::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Finds the first `ttl=N` / `ttl N` token, case-insensitively.
pub fn parse_ttl(output: &str) -> Option<u32> {
    RE_TTL
        .captures(output)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Sends one echo through `probe` and classifies the reply. Never fails.
pub async fn run_os_scan<P: EchoProbe>(probe: &P, ip: Ipv4Addr) -> OsGuess {
    info!(%ip, "Starting OS fingerprint.");
    let reply = probe.echo(ip).await;
    if let EchoReply::Failed(reason) = &reply {
        warn!(%ip, reason = %reason, "Echo probe failed.");
    }
    let guess = OsGuess::from_reply(&reply);
    info!(os = %guess, "OS fingerprint finished.");
    guess
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEcho(EchoReply);

    impl EchoProbe for FixedEcho {
        async fn echo(&self, _ip: Ipv4Addr) -> EchoReply {
            self.0.clone()
        }
    }

    #[test]
    fn parses_ttl_from_common_ping_outputs() {
        let linux = "64 bytes from 1.1.1.1: icmp_seq=1 ttl=57 time=3.21 ms";
        let windows = "Reply from 8.8.8.8: bytes=32 time=14ms TTL=117";
        let spaced = "reply ttl 250";
        assert_eq!(parse_ttl(linux), Some(57));
        assert_eq!(parse_ttl(windows), Some(117));
        assert_eq!(parse_ttl(spaced), Some(250));
        assert_eq!(parse_ttl("Request timed out."), None);
    }

    #[test]
    fn classifies_ttl_boundaries() {
        assert_eq!(OsGuess::from_ttl(64), OsGuess::LinuxUnix { ttl: 64 });
        assert_eq!(OsGuess::from_ttl(65), OsGuess::Windows { ttl: 65 });
        assert_eq!(OsGuess::from_ttl(128), OsGuess::Windows { ttl: 128 });
        assert_eq!(OsGuess::from_ttl(129), OsGuess::NetworkDevice { ttl: 129 });
        assert_eq!(OsGuess::from_ttl(255), OsGuess::NetworkDevice { ttl: 255 });
        assert_eq!(OsGuess::from_ttl(300).to_string(), "Unknown (TTL=300)");
        assert!(OsGuess::from_ttl(52).to_string().starts_with("Linux/Unix"));
    }

    #[tokio::test]
    async fn degraded_replies_map_to_sentinels() {
        let ip = Ipv4Addr::new(192, 0, 2, 1);
        let blocked = run_os_scan(&FixedEcho(EchoReply::Blocked), ip).await;
        assert_eq!(blocked.to_string(), "Unknown (Ping Blocked)");

        let no_ttl = FixedEcho(EchoReply::Replied { output: "1 packets transmitted".into() });
        assert_eq!(run_os_scan(&no_ttl, ip).await.to_string(), "Unknown (No TTL)");

        let failed = FixedEcho(EchoReply::Failed("permission denied".into()));
        assert_eq!(run_os_scan(&failed, ip).await.to_string(), "Unknown");
    }

    #[tokio::test]
    async fn windows_reply_is_classified() {
        let reply = FixedEcho(EchoReply::Replied { output: "Reply from 10.0.0.2: TTL=128".into() });
        let guess = run_os_scan(&reply, Ipv4Addr::new(10, 0, 0, 2)).await;
        assert_eq!(guess, OsGuess::Windows { ttl: 128 });
    }

    #[test]
    fn ping_wait_uses_the_platform_unit() {
        let args = SystemPing::new(Duration::from_millis(1500)).args();
        assert_eq!(args[1], "1");
        if cfg!(target_os = "linux") {
            assert_eq!(args, ["-c", "1", "-W", "1"]);
        }
        if cfg!(target_os = "macos") {
            assert_eq!(args, ["-c", "1", "-W", "1500"]);
        }
        if cfg!(windows) {
            assert_eq!(args, ["-n", "1", "-w", "1500"]);
        }
    }
}

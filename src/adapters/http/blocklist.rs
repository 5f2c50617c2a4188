//! File-backed IP blocklist for the query API.

use std::collections::HashSet;
use std::net::IpAddr;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::warn;

/// Blocked client addresses, loaded from a newline-separated file.
///
/// The file is read at startup and again on demand through the gated
/// refresh endpoint; a missing file simply means nothing is blocked.
pub struct Blocklist {
    path: PathBuf,
    blocked: RwLock<HashSet<IpAddr>>,
}

impl Blocklist {
    /// Load the blocklist from `path`.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let blocklist = Self {
            path: path.into(),
            blocked: RwLock::new(HashSet::new()),
        };
        if let Err(err) = blocklist.reload().await {
            warn!(path = %blocklist.path.display(), error = %err, "blocklist not loaded, starting empty");
        }
        blocklist
    }

    /// Re-read the file, replacing the in-memory set. Returns how many
    /// addresses are now blocked.
    pub async fn reload(&self) -> std::io::Result<usize> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let mut parsed = HashSet::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.parse::<IpAddr>() {
                Ok(ip) => {
                    parsed.insert(ip);
                }
                Err(_) => warn!(line, "skipping unparseable blocklist entry"),
            }
        }
        let count = parsed.len();
        *self.blocked.write().await = parsed;
        Ok(count)
    }

    /// Whether `ip` is currently blocked.
    pub async fn contains(&self, ip: IpAddr) -> bool {
        self.blocked.read().await.contains(&ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn missing_file_blocks_nothing() {
        let blocklist = Blocklist::load("definitely-absent.txt").await;
        assert!(!blocklist.contains("127.0.0.1".parse().unwrap()).await);
    }

    #[tokio::test]
    async fn loads_and_reloads_entries() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "10.0.0.7").unwrap();
        writeln!(file, "not-an-ip").unwrap();
        writeln!(file).unwrap();
        file.flush().unwrap();

        let blocklist = Blocklist::load(file.path()).await;
        assert!(blocklist.contains("10.0.0.7".parse().unwrap()).await);
        assert!(!blocklist.contains("10.0.0.8".parse().unwrap()).await);

        writeln!(file, "10.0.0.8").unwrap();
        file.flush().unwrap();
        let count = blocklist.reload().await.unwrap();
        assert_eq!(count, 2);
        assert!(blocklist.contains("10.0.0.8".parse().unwrap()).await);
    }
}

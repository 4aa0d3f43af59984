// File: bumpbot-core/src/config.rs
//
// JSON configuration for the bump scheduler. Loaded once at startup;
// malformed or missing configuration is fatal to the process.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::Error;

/// One resolved bump destination: the credential to log in with plus the
/// channel it posts into.
#[derive(Debug, Clone)]
pub struct BumpTarget {
    pub token: String,
    pub channel_id: u64,
    pub name: Option<String>,
}

impl BumpTarget {
    /// Human-readable label for log lines.
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.channel_id.to_string())
    }
}

/// The command string and delays the scheduler runs with.
#[derive(Debug, Clone)]
pub struct BumpSettings {
    pub command: String,
    pub inter_target_delay: Duration,
    pub cycle_delay: Duration,
}

#[derive(Debug, Deserialize)]
struct ServerEntry {
    token: Option<String>,
    channel_id: u64,
    name: Option<String>,
}

/// On-disk JSON config document.
#[derive(Debug, Deserialize)]
pub struct BumpConfig {
    /// Default token applied to any server entry without its own.
    token: Option<String>,
    #[serde(default = "default_command")]
    command: String,
    #[serde(default = "default_inter_target_delay_secs")]
    inter_target_delay_secs: u64,
    #[serde(default = "default_cycle_delay_secs")]
    cycle_delay_secs: u64,
    #[serde(default)]
    servers: Vec<ServerEntry>,
}

fn default_command() -> String {
    "/bump".to_string()
}

fn default_inter_target_delay_secs() -> u64 {
    5
}

// 2h15m, the platform's minimum re-bump cooldown.
fn default_cycle_delay_secs() -> u64 {
    8100
}

impl BumpConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let raw = fs::read_to_string(path.as_ref())?;
        let cfg: BumpConfig = serde_json::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.command.trim().is_empty() {
            return Err(Error::Config("'command' must not be empty".into()));
        }
        for (idx, server) in self.servers.iter().enumerate() {
            if server.channel_id == 0 {
                return Err(Error::Config(format!(
                    "server entry {} ('{}') has a zero channel_id",
                    idx,
                    server.name.as_deref().unwrap_or("unnamed"),
                )));
            }
            let has_token = server
                .token
                .as_deref()
                .or(self.token.as_deref())
                .map(|t| !t.is_empty())
                .unwrap_or(false);
            if !has_token {
                return Err(Error::Config(format!(
                    "server entry {} ('{}') has no token and no top-level token is set",
                    idx,
                    server
                        .name
                        .clone()
                        .unwrap_or_else(|| server.channel_id.to_string()),
                )));
            }
        }
        Ok(())
    }

    /// Resolved targets in send order, each carrying the token it will log
    /// in with (its own, or the top-level default).
    pub fn targets(&self) -> Vec<BumpTarget> {
        self.servers
            .iter()
            .map(|s| BumpTarget {
                token: s
                    .token
                    .clone()
                    .or_else(|| self.token.clone())
                    .unwrap_or_default(),
                channel_id: s.channel_id,
                name: s.name.clone(),
            })
            .collect()
    }

    pub fn settings(&self) -> BumpSettings {
        BumpSettings {
            command: self.command.clone(),
            inter_target_delay: Duration::from_secs(self.inter_target_delay_secs),
            cycle_delay: Duration::from_secs(self.cycle_delay_secs),
        }
    }
}

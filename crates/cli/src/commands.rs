//! Subcommands.
//!
//! Identities are passed in the record JSON form,
//! `{"tiers":[{"tier":"node","value":"A"}]}`; candidate files hold a JSON
//! array of such records.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;
use locality::codec::{encode_wire, from_json, from_record, to_json};
use locality::{LocalityConfig, MatchContext, TieredIdentity};
use tracing::{debug, info};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pick the candidate nearest to a local identity.
    Nearest {
        /// Local identity as a JSON record.
        #[arg(long)]
        local: String,
        /// File holding a JSON array of candidate records, `-` for stdin.
        #[arg(long)]
        candidates: PathBuf,
        /// Compare node tiers by resolved network address (`true`/`false`);
        /// overrides LOCALITY_COMPARE_NODE_IP.
        #[arg(long, value_name = "BOOL")]
        compare_node_ip: Option<bool>,
        /// Host lookup timeout in milliseconds.
        #[arg(long)]
        resolve_timeout_ms: Option<u64>,
    },
    /// Show the display, record and wire forms of an identity.
    Inspect {
        /// Identity as a JSON record.
        #[arg(long)]
        identity: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Nearest {
        index: usize,
        identity: TieredIdentity,
    },
    NoCandidates,
    Inspected {
        identity: TieredIdentity,
        record: String,
        wire_bytes: usize,
    },
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandResult::Nearest { index, identity } => {
                write!(f, "nearest: #{} {}", index, identity)
            }
            CommandResult::NoCandidates => write!(f, "no candidates"),
            CommandResult::Inspected {
                identity,
                record,
                wire_bytes,
            } => {
                writeln!(f, "{}", identity)?;
                writeln!(f, "record: {}", record)?;
                write!(f, "wire: {} bytes", wire_bytes)
            }
        }
    }
}

impl Command {
    pub fn execute(&self) -> anyhow::Result<CommandResult> {
        match self {
            Command::Nearest {
                local,
                candidates,
                compare_node_ip,
                resolve_timeout_ms,
            } => {
                let config =
                    apply_overrides(LocalityConfig::from_env()?, *compare_node_ip, *resolve_timeout_ms);
                let text = read_candidates(candidates)?;
                pick_nearest(local, &text, &config)
            }
            Command::Inspect { identity } => inspect(identity),
        }
    }
}

/// Command-line flags win over the environment when given.
pub(crate) fn apply_overrides(
    mut config: LocalityConfig,
    compare_node_ip: Option<bool>,
    resolve_timeout_ms: Option<u64>,
) -> LocalityConfig {
    if let Some(flag) = compare_node_ip {
        config.compare_node_ip = flag;
    }
    if let Some(timeout) = resolve_timeout_ms {
        config.resolve_timeout_ms = timeout;
    }
    config
}

/// Parses the local identity and candidates and runs nearest selection.
pub fn pick_nearest(
    local: &str,
    candidates: &str,
    config: &LocalityConfig,
) -> anyhow::Result<CommandResult> {
    let local = from_json(local).context("invalid --local identity")?;
    let records: Vec<serde_json::Value> =
        serde_json::from_str(candidates).context("candidates must be a JSON array")?;
    let candidates = records
        .iter()
        .enumerate()
        .map(|(i, record)| from_record(record).with_context(|| format!("invalid candidate #{}", i)))
        .collect::<anyhow::Result<Vec<_>>>()?;
    debug!(local = %local, candidates = candidates.len(), "selecting nearest");

    let ctx = MatchContext::from_config(config);
    Ok(match local.nearest_index(&candidates, &ctx) {
        Some(index) => {
            info!(index, "nearest candidate chosen");
            CommandResult::Nearest {
                index,
                identity: candidates[index].clone(),
            }
        }
        None => CommandResult::NoCandidates,
    })
}

pub fn inspect(identity: &str) -> anyhow::Result<CommandResult> {
    let identity = from_json(identity).context("invalid --identity")?;
    let wire_bytes = encode_wire(&identity)?.len();
    Ok(CommandResult::Inspected {
        record: to_json(&identity),
        identity,
        wire_bytes,
    })
}

fn read_candidates(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read candidates from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read candidates from {}", path.display()))
}

//! Command-line argument definitions using clap.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::config::ServerConfig;

/// Threat-intelligence lookup API
///
/// Aggregates IP, domain, hash, email, certificate and feed intelligence
/// from public OSINT providers and serves it as JSON.
#[derive(Parser, Debug)]
#[command(name = "netwatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (TOML); defaults are used when it does not exist
    #[arg(short, long, env = "NETWATCH_CONFIG", default_value = "netwatch.toml")]
    pub config: PathBuf,

    /// Listen address, overriding the configuration file
    #[arg(short, long)]
    pub listen: Option<SocketAddr>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// AbuseIPDB API key
    #[arg(long, env = "ABUSEIPDB_API_KEY", hide_env_values = true)]
    pub abuseipdb_key: Option<String>,

    /// AlienVault OTX API key
    #[arg(long, env = "ALIENVAULT_API_KEY", hide_env_values = true)]
    pub alienvault_key: Option<String>,

    /// abuse.ch Auth-Key (MalwareBazaar, ThreatFox, URLhaus)
    #[arg(long, env = "ABUSECH_API_KEY", hide_env_values = true)]
    pub abusech_key: Option<String>,

    /// WhoisFreaks API key
    #[arg(long, env = "WHOISFREAKS_API_KEY", hide_env_values = true)]
    pub whoisfreaks_key: Option<String>,
}

impl Cli {
    /// Apply command-line overrides on top of the file configuration
    pub fn apply(self, config: &mut ServerConfig) {
        if let Some(listen) = self.listen {
            config.listen = listen;
        }

        let keys = &mut config.providers.keys;
        for (slot, value) in [
            (&mut keys.abuseipdb, self.abuseipdb_key),
            (&mut keys.alienvault, self.alienvault_key),
            (&mut keys.abusech, self.abusech_key),
            (&mut keys.whoisfreaks, self.whoisfreaks_key),
        ] {
            if value.is_some() {
                *slot = value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_file_values() {
        let cli = Cli::parse_from([
            "netwatch",
            "--listen",
            "127.0.0.1:9000",
            "--abuseipdb-key",
            "from-cli",
        ]);
        let mut config = ServerConfig::default();
        config.providers.keys.alienvault = Some("from-file".into());

        cli.apply(&mut config);
        assert_eq!(config.listen.port(), 9000);
        assert_eq!(config.providers.keys.abuseipdb.as_deref(), Some("from-cli"));
        assert_eq!(config.providers.keys.alienvault.as_deref(), Some("from-file"));
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["netwatch"]);
        assert_eq!(cli.config, PathBuf::from("netwatch.toml"));
        assert!(!cli.log_json);
        assert!(cli.listen.is_none());
    }
}

//! Command-line argument definitions (clap).

use clap::Parser;
use std::net::IpAddr;

use pankha_agent_redfish::Domain;

#[derive(Parser, Debug)]
#[command(name = "pankha-agent-redfish")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pankha Redfish Host Agent - one collection cycle against one BMC", long_about = None)]
pub struct Args {
    // === Target ===
    /// BMC address to collect from
    #[arg(short = 't', long, help_heading = "Target")]
    pub target: Option<IpAddr>,

    /// BMC username (overrides the hosts table)
    #[arg(short = 'u', long, help_heading = "Target")]
    pub username: Option<String>,

    /// BMC password (overrides the hosts table)
    #[arg(short = 'p', long, help_heading = "Target")]
    pub password: Option<String>,

    /// Comma-separated domains to collect (system, sensors, power, storage, memory, network, event_log)
    #[arg(short = 'd', long, value_delimiter = ',', help_heading = "Target")]
    pub domains: Option<Vec<Domain>>,

    // === Config & Debug ===
    /// Config file (defaults to config.json next to the binary)
    #[arg(short = 'c', long, help_heading = "Config & Debug")]
    pub config: Option<String>,

    /// JSON file mapping target ips to device names
    #[arg(long, help_heading = "Config & Debug")]
    pub dict: Option<String>,

    /// Show current configuration (passwords masked) and exit
    #[arg(long = "show-config", help_heading = "Config & Debug")]
    pub show_config: bool,

    /// Pretty-print each record instead of one JSON object per line
    #[arg(long, help_heading = "Config & Debug")]
    pub pretty: bool,

    /// Set log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(long = "log-level", help_heading = "Config & Debug")]
    pub log_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_target_and_domains() {
        let args = Args::try_parse_from([
            "pankha-agent-redfish",
            "--target",
            "10.1.2.3",
            "--domains",
            "system,sel,storage",
            "--pretty",
        ])
        .unwrap();
        assert_eq!(args.target, Some("10.1.2.3".parse().unwrap()));
        assert_eq!(
            args.domains,
            Some(vec![Domain::System, Domain::EventLog, Domain::Storage])
        );
        assert!(args.pretty);
    }

    #[test]
    fn test_rejects_invalid_target_and_domain() {
        assert!(Args::try_parse_from(["pankha-agent-redfish", "--target", "bmc.local"]).is_err());
        assert!(Args::try_parse_from(["pankha-agent-redfish", "--target", "10.0.0.300"]).is_err());
        assert!(Args::try_parse_from(["pankha-agent-redfish", "--domains", "fans"]).is_err());
    }
}

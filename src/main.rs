//! Pankha Redfish agent entry point: one collection cycle, records to stdout.

mod app;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use app::cli::Args;
use app::logging::{init_tracing, level_filter};
use pankha_agent_redfish::config::persistence::{
    credentials_for, device_name_for, load_config, load_device_names, redacted,
};
use pankha_agent_redfish::config::ExporterConfig;
use pankha_agent_redfish::{start_collection, CollectionOptions, Credentials, DomainRecord, HttpTransport};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, source) = load_config(args.config.as_deref()).await?;

    // Priority: 1. --log-level flag, 2. LOG_LEVEL env, 3. config file
    let log_level = args
        .log_level
        .clone()
        .or_else(|| std::env::var("LOG_LEVEL").ok())
        .unwrap_or_else(|| config.logging.log_level.clone());
    let filter = level_filter(&log_level).unwrap_or_else(|| {
        eprintln!(
            "Invalid log level '{}'. Using INFO. Valid levels: TRACE, DEBUG, INFO, WARN, ERROR, CRITICAL",
            log_level
        );
        "info"
    });
    init_tracing(filter, config.logging.json);
    // Loading ran before the subscriber existed; report where the config came from now.
    info!("{}", source);

    if args.show_config {
        println!("{}", serde_json::to_string_pretty(&redacted(&config))?);
        return Ok(());
    }

    let Some(target) = args.target else {
        bail!("No target specified. Pass --target <BMC IP>.");
    };
    // IPv6 literals need brackets inside the URL authority.
    let host = match target {
        IpAddr::V6(v6) => format!("[{v6}]"),
        IpAddr::V4(v4) => v4.to_string(),
    };
    let target = target.to_string();

    let credentials = resolve_credentials(&config, &target, args.username, args.password)?;

    // Entries from --dict win over the config's table.
    let mut names = match args.dict.as_deref() {
        Some(dict) => load_device_names(Path::new(dict)).await?,
        None => Vec::new(),
    };
    names.extend(config.device_names.iter().cloned());
    let device_name = device_name_for(&names, &target);

    let domains = args
        .domains
        .unwrap_or_else(|| config.metrics.enabled_domains());
    info!(bmc = %target, ?domains, device_name = ?device_name, "Starting Redfish collection");

    let transport = HttpTransport::new(&host, credentials, config.collection.request_timeout())?;
    let options = CollectionOptions {
        domains,
        settings: config.collection.clone(),
        device_name,
    };

    let mut handle = start_collection(Arc::new(transport), options)
        .await
        .with_context(|| format!("Collection against {target} could not start"))?;

    loop {
        tokio::select! {
            record = handle.next() => match record {
                Some(record) => print_record(&record, args.pretty)?,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted, cancelling collection");
                handle.cancel();
            }
        }
    }

    let report = handle.finish().await?;
    if report.failed_domains().next().is_some() {
        warn!(
            failed = report.failed_domains().count(),
            "Collection finished with failed domains (partial results)"
        );
    }
    Ok(())
}

fn resolve_credentials(
    config: &ExporterConfig,
    target: &str,
    username: Option<String>,
    password: Option<String>,
) -> Result<Credentials> {
    if let (Some(username), Some(password)) = (username.clone(), password.clone()) {
        return Ok(Credentials { username, password });
    }
    let host = credentials_for(config, target).with_context(|| {
        format!("No credentials for {target}: add it to 'hosts' in the config or pass --username/--password")
    })?;
    Ok(Credentials {
        username: username.unwrap_or_else(|| host.username.clone()),
        password: password.unwrap_or_else(|| host.password.clone()),
    })
}

fn print_record(record: &DomainRecord, pretty: bool) -> Result<()> {
    let line = if pretty {
        serde_json::to_string_pretty(record)?
    } else {
        serde_json::to_string(record)?
    };
    println!("{}", line);
    Ok(())
}

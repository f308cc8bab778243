//! Collection cycle: discover once, run one task per enabled domain, stream
//! records to the caller, and report per-domain outcomes when the stream closes.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::collectors::{self, CollectorContext, ContextParts, CycleStats, Domain};
use crate::config::CollectionSettings;
use crate::discovery::{discover, ProtocolVersion, Session, Vendor};
use crate::error::{RedfishError, Result};
use crate::records::DomainRecord;
use crate::redfish::RedfishTransport;

const RECORD_BUFFER: usize = 256;

#[derive(Debug, Clone)]
pub struct CollectionOptions {
    pub domains: Vec<Domain>,
    pub settings: CollectionSettings,
    pub device_name: Option<String>,
}

impl Default for CollectionOptions {
    fn default() -> Self {
        Self {
            domains: Domain::ALL.to_vec(),
            settings: CollectionSettings::default(),
            device_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainOutcome {
    pub domain: Domain,
    pub records: usize,
    /// `None` when the domain finished; the failure otherwise.
    pub error: Option<String>,
}

impl DomainOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub cycle_id: String,
    pub host: String,
    pub vendor: Vendor,
    pub version: ProtocolVersion,
    pub domains: Vec<DomainOutcome>,
    pub records: usize,
    pub skipped_members: usize,
    pub decode_failures: usize,
}

impl CycleReport {
    pub fn failed_domains(&self) -> impl Iterator<Item = &DomainOutcome> {
        self.domains.iter().filter(|d| !d.is_ok())
    }

    pub fn outcome(&self, domain: Domain) -> Option<&DomainOutcome> {
        self.domains.iter().find(|d| d.domain == domain)
    }
}

/// A running cycle. Drain `records` until it yields `None`, then `finish`.
pub struct CollectionHandle {
    pub cycle_id: String,
    pub records: mpsc::Receiver<DomainRecord>,
    session: Arc<Session>,
    report: JoinHandle<CycleReport>,
    cancel: CancellationToken,
}

impl CollectionHandle {
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Stop every in-flight call at its next suspension point.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub async fn next(&mut self) -> Option<DomainRecord> {
        self.records.recv().await
    }

    /// Wait for every domain task and return the report.
    pub async fn finish(self) -> Result<CycleReport> {
        // Dropping the receiver unblocks any producer still waiting on a full buffer.
        drop(self.records);
        self.report.await.map_err(|e| {
            error!(cycle_id = %self.cycle_id, error = %e, "Cycle orchestrator failed");
            RedfishError::Cancelled
        })
    }

    /// Collect the whole stream, then the report.
    pub async fn drain(mut self) -> Result<(Vec<DomainRecord>, CycleReport)> {
        let mut out = Vec::new();
        while let Some(record) = self.records.recv().await {
            out.push(record);
        }
        let report = self.finish().await?;
        Ok((out, report))
    }
}

/// Discover the target, then start one collector task per enabled domain.
/// A discovery failure is returned here and no collector ever runs.
pub async fn start_collection(
    transport: Arc<dyn RedfishTransport>,
    options: CollectionOptions,
) -> Result<CollectionHandle> {
    let cycle_id = Uuid::new_v4().to_string();
    let span = info_span!("cycle", cycle_id = %cycle_id, host = transport.host());
    let deadline = options.settings.cycle_deadline().map(|d| Instant::now() + d);

    let discovery = discover(transport.as_ref(), options.device_name.clone());
    let session = match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, discovery)
            .instrument(span.clone())
            .await
            .map_err(|_| RedfishError::discovery("deadline", RedfishError::DeadlineExceeded))?,
        None => discovery.instrument(span.clone()).await,
    };
    let session = Arc::new(session.map_err(|e| {
        span.in_scope(|| error!(error = %e, "Discovery failed, nothing will be collected"));
        e
    })?);

    let mut domains = options.domains;
    domains.sort();
    domains.dedup();

    let (sink, records) = mpsc::channel(RECORD_BUFFER);
    let stats = Arc::new(CycleStats::default());
    let cancel = CancellationToken::new();
    let parts = ContextParts {
        transport,
        session: session.clone(),
        settings: Arc::new(options.settings),
        sink,
        stats: stats.clone(),
        deadline,
        cancel: cancel.clone(),
    };
    let contexts: Vec<_> = domains
        .into_iter()
        .map(|domain| CollectorContext::new(domain, &parts))
        .collect();
    // Only the collectors hold senders now; the stream closes when the last one ends.
    drop(parts);

    info!(parent: &span, domains = contexts.len(), "Starting collection");
    let report = tokio::spawn(run_cycle(cycle_id.clone(), session.clone(), contexts, stats).instrument(span));

    Ok(CollectionHandle {
        cycle_id,
        records,
        session,
        report,
        cancel,
    })
}

async fn run_cycle(
    cycle_id: String,
    session: Arc<Session>,
    contexts: Vec<CollectorContext>,
    stats: Arc<CycleStats>,
) -> CycleReport {
    let tasks: Vec<(Domain, JoinHandle<(usize, Result<()>)>)> = contexts
        .into_iter()
        .map(|ctx| {
            let domain = ctx.domain;
            let task = tokio::spawn(
                async move {
                    let result = collectors::collect(ctx.clone()).await;
                    (ctx.emitted(), result)
                }
                .in_current_span(),
            );
            (domain, task)
        })
        .collect();

    let mut domains = Vec::with_capacity(tasks.len());
    for (domain, task) in tasks {
        let outcome = match task.await {
            Ok((records, Ok(()))) => {
                info!(%domain, records, "Domain collected");
                DomainOutcome {
                    domain,
                    records,
                    error: None,
                }
            }
            Ok((records, Err(e))) => {
                let e = RedfishError::collector(domain, e);
                warn!(%domain, records, error = %e, "Domain collection failed");
                DomainOutcome {
                    domain,
                    records,
                    error: Some(e.to_string()),
                }
            }
            Err(e) => {
                error!(%domain, error = %e, "Domain task aborted");
                DomainOutcome {
                    domain,
                    records: 0,
                    error: Some(format!("{domain} collector aborted: {e}")),
                }
            }
        };
        domains.push(outcome);
    }

    let report = CycleReport {
        cycle_id,
        host: session.host.clone(),
        vendor: session.vendor,
        version: session.version,
        domains,
        records: stats.records.load(Ordering::Relaxed),
        skipped_members: stats.skipped.load(Ordering::Relaxed),
        decode_failures: stats.decode_failures.load(Ordering::Relaxed),
    };
    info!(
        records = report.records,
        skipped = report.skipped_members,
        decode_failures = report.decode_failures,
        failed_domains = report.failed_domains().count(),
        "Collection cycle complete"
    );
    report
}

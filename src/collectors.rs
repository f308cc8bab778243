//! Domain collectors and the plumbing they share: the per-domain context,
//! deadline/cancellation guarded calls, and bounded fan-out.

use std::future::Future;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::CollectionSettings;
use crate::discovery::Session;
use crate::error::{RedfishError, Result};
use crate::identifiers::SlotLabels;
use crate::quirks::VendorQuirks;
use crate::records::DomainRecord;
use crate::redfish::{from_value, get_as, RedfishTransport};

pub mod event_log;
pub mod memory;
pub mod network;
pub mod power;
pub mod sensors;
pub mod storage;
pub mod system;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    System,
    Sensors,
    Power,
    Storage,
    Memory,
    Network,
    EventLog,
}

impl Domain {
    pub const ALL: [Domain; 7] = [
        Domain::System,
        Domain::Sensors,
        Domain::Power,
        Domain::Storage,
        Domain::Memory,
        Domain::Network,
        Domain::EventLog,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::System => "system",
            Domain::Sensors => "sensors",
            Domain::Power => "power",
            Domain::Storage => "storage",
            Domain::Memory => "memory",
            Domain::Network => "network",
            Domain::EventLog => "event_log",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "system" => Ok(Domain::System),
            "sensors" | "thermal" => Ok(Domain::Sensors),
            "power" => Ok(Domain::Power),
            "storage" => Ok(Domain::Storage),
            "memory" => Ok(Domain::Memory),
            "network" => Ok(Domain::Network),
            "event_log" | "eventlog" | "sel" => Ok(Domain::EventLog),
            other => Err(format!(
                "unknown domain '{other}' (expected one of: system, sensors, power, storage, memory, network, event_log)"
            )),
        }
    }
}

/// Counters shared by every collector in one cycle.
#[derive(Debug, Default)]
pub(crate) struct CycleStats {
    pub records: AtomicUsize,
    pub skipped: AtomicUsize,
    pub decode_failures: AtomicUsize,
}

/// Everything one domain collector needs. Cheap to clone into fan-out tasks;
/// all shared state is behind `Arc` and read-only except the counters.
#[derive(Clone)]
pub(crate) struct CollectorContext {
    pub domain: Domain,
    pub session: Arc<Session>,
    pub quirks: VendorQuirks,
    pub settings: Arc<CollectionSettings>,
    pub labels: SlotLabels,
    transport: Arc<dyn RedfishTransport>,
    sink: mpsc::Sender<DomainRecord>,
    stats: Arc<CycleStats>,
    emitted: Arc<AtomicUsize>,
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

pub(crate) struct ContextParts {
    pub transport: Arc<dyn RedfishTransport>,
    pub session: Arc<Session>,
    pub settings: Arc<CollectionSettings>,
    pub sink: mpsc::Sender<DomainRecord>,
    pub stats: Arc<CycleStats>,
    pub deadline: Option<Instant>,
    pub cancel: CancellationToken,
}

impl CollectorContext {
    pub(crate) fn new(domain: Domain, parts: &ContextParts) -> Self {
        Self {
            domain,
            quirks: parts.session.quirks(),
            labels: SlotLabels::for_locale(parts.settings.identifier_locale),
            session: parts.session.clone(),
            settings: parts.settings.clone(),
            transport: parts.transport.clone(),
            sink: parts.sink.clone(),
            stats: parts.stats.clone(),
            emitted: Arc::new(AtomicUsize::new(0)),
            deadline: parts.deadline,
            cancel: parts.cancel.clone(),
        }
    }

    pub(crate) fn host(&self) -> &str {
        &self.session.host
    }

    /// Records this domain has put on the stream so far.
    pub(crate) fn emitted(&self) -> usize {
        self.emitted.load(Ordering::Relaxed)
    }

    /// Run a transport call under the cycle deadline and cancellation token.
    async fn guarded<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        let bounded = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, call)
                    .await
                    .map_err(|_| RedfishError::DeadlineExceeded)?,
                None => call.await,
            }
        };

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(RedfishError::Cancelled),
            result = bounded => result,
        };

        if matches!(&result, Err(e) if e.is_decode()) {
            self.stats.decode_failures.fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.guarded(get_as(self.transport.as_ref(), path)).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        self.guarded(async {
            let value = self.transport.post_action(path, body).await?;
            from_value(path, value)
        })
        .await
    }

    /// Resolve a discovered endpoint or fail the domain.
    pub(crate) fn endpoint<'a>(&self, path: &'a Option<String>, name: &'static str) -> Result<&'a str> {
        path.as_deref().ok_or(RedfishError::MissingEndpoint(name))
    }

    pub(crate) async fn emit(&self, record: impl Into<DomainRecord>) -> Result<()> {
        // A closed stream means the consumer went away; treat it as cancellation.
        // Sends wait on a slow consumer, so they honor the deadline too.
        self.guarded(async {
            self.sink
                .send(record.into())
                .await
                .map_err(|_| RedfishError::Cancelled)
        })
        .await?;
        self.stats.records.fetch_add(1, Ordering::Relaxed);
        self.emitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Run `work` once per path, at most `limit` at a time, each in its own task
    /// with its own values. A member that fails is logged and skipped; only a
    /// cycle-level stop (deadline, cancellation) aborts the whole fan-out.
    pub(crate) async fn fan_out<T, F, Fut>(&self, paths: Vec<String>, limit: usize, work: F) -> Result<Vec<T>>
    where
        T: Send + 'static,
        F: Fn(CollectorContext, String) -> Fut + Clone + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let gate = Arc::new(Semaphore::new(limit.max(1)));
        let mut tasks = JoinSet::new();

        for path in paths {
            let ctx = self.clone();
            let gate = gate.clone();
            let work = work.clone();
            tasks.spawn(async move {
                let result = match gate.acquire_owned().await {
                    Ok(_permit) => work(ctx, path.clone()).await,
                    Err(_) => Err(RedfishError::Cancelled),
                };
                (path, result)
            });
        }

        let mut done = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(value))) => done.push(value),
                Ok((_, Err(e @ (RedfishError::DeadlineExceeded | RedfishError::Cancelled)))) => {
                    return Err(e);
                }
                Ok((path, Err(e))) => self.skip(&path, &e),
                Err(e) => {
                    warn!(host = self.host(), domain = %self.domain, error = %e, "Fan-out task panicked");
                    self.stats.skipped.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
        Ok(done)
    }

    /// Fetch and decode every member concurrently, skipping the ones that fail.
    pub(crate) async fn fetch_members<T>(&self, paths: Vec<String>, limit: usize) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.fan_out(paths, limit, |ctx, path| async move { ctx.get::<T>(&path).await })
            .await
    }

    fn skip(&self, path: &str, error: &RedfishError) {
        warn!(
            host = self.host(),
            domain = %self.domain,
            path,
            error = %error,
            "Skipping member"
        );
        self.stats.skipped.fetch_add(1, Ordering::Relaxed);
    }
}

/// Member paths of a collection, ignoring empty links.
pub(crate) fn member_paths(collection: &crate::redfish::types::Collection) -> Vec<String> {
    collection
        .members
        .iter()
        .map(|m| m.odata_id.clone())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Run the collector for `domain`.
pub(crate) async fn collect(ctx: CollectorContext) -> Result<()> {
    match ctx.domain {
        Domain::System => system::collect(&ctx).await,
        Domain::Sensors => sensors::collect(&ctx).await,
        Domain::Power => power::collect(&ctx).await,
        Domain::Storage => storage::collect(&ctx).await,
        Domain::Memory => memory::collect(&ctx).await,
        Domain::Network => network::collect(&ctx).await,
        Domain::EventLog => event_log::collect(&ctx).await,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared harness: build a context over a mock transport and drain what it emitted.

    use super::*;
    use crate::discovery::{EndpointMap, ProtocolVersion, Vendor};
    use crate::redfish::mock::MockTransport;

    pub(crate) fn session(vendor: Vendor, version: ProtocolVersion) -> Session {
        Session {
            host: "10.0.0.1".to_string(),
            device_name: Some("rack1-db".to_string()),
            endpoints: EndpointMap {
                system: "/redfish/v1/Systems/1".to_string(),
                thermal: Some("/redfish/v1/Chassis/1/Thermal".to_string()),
                power: Some("/redfish/v1/Chassis/1/Power".to_string()),
                storage: Some("/redfish/v1/Systems/1/Storage".to_string()),
                memory: Some("/redfish/v1/Systems/1/Memory".to_string()),
                network: Some("/redfish/v1/Systems/1/NetworkInterfaces".to_string()),
            },
            vendor,
            version,
        }
    }

    pub(crate) struct Harness {
        pub ctx: CollectorContext,
        pub transport: Arc<MockTransport>,
        pub stats: Arc<CycleStats>,
        pub cancel: CancellationToken,
        rx: mpsc::Receiver<DomainRecord>,
    }

    impl Harness {
        /// Close the stream and return everything emitted.
        pub(crate) fn drain(mut self) -> Vec<DomainRecord> {
            drop(self.ctx);
            let mut out = Vec::new();
            while let Ok(record) = self.rx.try_recv() {
                out.push(record);
            }
            out
        }
    }

    pub(crate) fn harness(domain: Domain, session: Session, transport: MockTransport) -> Harness {
        harness_with(domain, session, transport, CollectionSettings::default())
    }

    pub(crate) fn harness_with(
        domain: Domain,
        session: Session,
        transport: MockTransport,
        settings: CollectionSettings,
    ) -> Harness {
        let transport = Arc::new(transport);
        let (sink, rx) = mpsc::channel(1024);
        let stats = Arc::new(CycleStats::default());
        let cancel = CancellationToken::new();
        let parts = ContextParts {
            transport: transport.clone(),
            session: Arc::new(session),
            settings: Arc::new(settings),
            sink,
            stats: stats.clone(),
            deadline: None,
            cancel: cancel.clone(),
        };
        Harness {
            ctx: CollectorContext::new(domain, &parts),
            transport,
            stats,
            cancel,
            rx,
        }
    }
}

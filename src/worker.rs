// Poll cycle driver. Targets are polled one after another; a failing target is tagged and
// skipped, never aborting the cycle. State is persisted after every cycle.

use crate::config::{AppConfig, TargetConfig};
use crate::credential_cache::CredentialCache;
use crate::engine::Engine;
use crate::error::PollError;
use crate::history_repo::{HistoryRepo, retention};
use crate::models::{GatewayReading, GatewayStatus, HistorySnapshot, RateCycle, sort_gateways};
use crate::monitor_store::MonitorStore;
use crate::source::{CounterRequest, TargetSource};
use crate::status::{CycleReport, StatusWriter, TargetReport};
use chrono::Utc;
use tokio::time::{Duration, Instant, sleep};
use tracing::{debug, info, warn};

/// Engine, persisted stores, and the collaborator the worker drives.
pub struct WorkerDeps<S> {
    pub source: S,
    pub engine: Engine,
    pub history_repo: HistoryRepo,
    pub history: HistorySnapshot,
    pub credentials: CredentialCache,
    pub monitor_store: MonitorStore,
    pub status_writer: StatusWriter,
}

pub struct WorkerConfig {
    pub targets: Vec<TargetConfig>,
    /// Raw interface ids to request, in display order.
    pub interfaces: Vec<String>,
    pub expiry_hours: u32,
    pub poll_interval_secs: u64,
}

impl WorkerConfig {
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            targets: config.targets.clone(),
            interfaces: config.bandwidth.interfaces.clone(),
            expiry_hours: config.session.expiry_hours,
            poll_interval_secs: config.general.poll_interval_secs,
        }
    }
}

struct Polled {
    cycle: RateCycle,
    gateways: Vec<GatewayReading>,
}

pub struct Worker<S: TargetSource> {
    deps: WorkerDeps<S>,
    config: WorkerConfig,
}

impl<S: TargetSource> Worker<S> {
    pub fn new(deps: WorkerDeps<S>, config: WorkerConfig) -> Self {
        Self { deps, config }
    }

    /// Load every persisted store named by `config`. Unreadable files start empty with a warning.
    pub fn from_config(config: &AppConfig, source: S) -> Self {
        let now = Utc::now().timestamp();
        let monitor_store = MonitorStore::new(config.general.monitor_file());
        let engine = Engine::from_state(
            monitor_store.load().into_logged("monitor data"),
            &config.bandwidth,
        );
        let history_repo = HistoryRepo::new(
            config.general.history_file(),
            config.bandwidth.retention_policy(),
            config.general.poll_interval_secs,
        );
        let history = history_repo.load(now).into_logged("bandwidth history");
        let credentials = CredentialCache::open(&config.session.auth_file).into_logged("credentials");
        Self::new(
            WorkerDeps {
                source,
                engine,
                history_repo,
                history,
                credentials,
                monitor_store,
                status_writer: StatusWriter::new(&config.general.status_output),
            },
            WorkerConfig::from_app(config),
        )
    }

    pub fn source(&self) -> &S {
        &self.deps.source
    }

    pub fn engine(&self) -> &Engine {
        &self.deps.engine
    }

    pub fn history(&self) -> &HistorySnapshot {
        &self.deps.history
    }

    pub fn credentials(&self) -> &CredentialCache {
        &self.deps.credentials
    }

    /// Cached cookies when still valid, otherwise a fresh login whose cookies are cached.
    async fn authenticate(&mut self, target: &TargetConfig) -> Result<S::Session, PollError> {
        if let Some(cached) = self.deps.credentials.lookup(&target.name) {
            debug!(firewall = %target.name, "using stored authentication data");
            return self.deps.source.resume(target, &cached.cookies).await;
        }
        info!(firewall = %target.name, "logging in");
        let (session, cookies) = self.deps.source.login(target).await?;
        if let Err(e) = self
            .deps
            .credentials
            .store(&target.name, cookies, self.config.expiry_hours)
        {
            warn!(firewall = %target.name, error = %e, "failed to save authentication data");
        }
        Ok(session)
    }

    async fn poll_target(
        &mut self,
        target: &TargetConfig,
        names_refreshed: &mut bool,
    ) -> Result<Polled, PollError> {
        let session = self.authenticate(target).await?;

        let now = Utc::now().timestamp() as f64;
        if !*names_refreshed && self.deps.engine.interfaces().needs_refresh(now) {
            match self.deps.source.interface_names(&session, target).await {
                Ok(Some(fetched)) => {
                    if self.deps.engine.interfaces_mut().merge(fetched, now) {
                        *names_refreshed = true;
                        info!(
                            firewall = %target.name,
                            names = self.deps.engine.interfaces().names().len(),
                            "updated interface names"
                        );
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(firewall = %target.name, error = %e, "interface name refresh failed"),
            }
        }

        let request = CounterRequest {
            interfaces: self.config.interfaces.clone(),
            real_interfaces: self
                .deps
                .engine
                .interfaces()
                .real_names_for(&self.config.interfaces),
        };
        let snapshot = self.deps.source.counters(&session, target, &request).await?;
        let cycle = self.deps.engine.process(&target.name, snapshot);

        let gateways = match self.deps.source.gateways(&session, target).await {
            Ok(g) => g,
            Err(e) => {
                warn!(firewall = %target.name, error = %e, "gateway status unavailable");
                Vec::new()
            }
        };
        Ok(Polled { cycle, gateways })
    }

    /// Poll every target once, update history, persist state, and write the status document.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let targets = self.config.targets.clone();
        let mut cycles: Vec<(String, RateCycle)> = Vec::with_capacity(targets.len());
        let mut reports = Vec::with_capacity(targets.len());
        let mut gateways = Vec::new();
        let mut failed = Vec::new();
        let mut names_refreshed = false;

        for target in &targets {
            let started = Instant::now();
            match self.poll_target(target, &mut names_refreshed).await {
                Ok(Polled { cycle, gateways: readings }) => {
                    let seconds = retention::round2(started.elapsed().as_secs_f64());
                    self.deps.engine.record_poll_time(&target.name, seconds);
                    let rows = self.deps.engine.report(&cycle);
                    let baseline = matches!(cycle, RateCycle::NoPriorData);
                    debug!(
                        firewall = %target.name,
                        poll_seconds = seconds,
                        interfaces = rows.len(),
                        baseline,
                        "target polled"
                    );
                    reports.push(TargetReport::polled(&target.name, baseline, seconds, rows));
                    gateways.extend(readings.into_iter().map(|r| GatewayStatus::new(&target.name, r)));
                    cycles.push((target.name.clone(), cycle));
                }
                Err(e) => {
                    warn!(firewall = %target.name, error = %e, "target poll failed");
                    reports.push(TargetReport::failed(&target.name, &e));
                    failed.push(target.name.clone());
                }
            }
        }

        if !failed.is_empty() {
            warn!(
                failed = %failed.join(", "),
                failed_count = failed.len(),
                reachable = cycles.len(),
                "some targets were unreachable this cycle"
            );
        }

        let now = Utc::now().timestamp();
        let active_target = if cycles.is_empty() {
            retention::prune(&mut self.deps.history, now, self.deps.history_repo.policy());
            None
        } else {
            self.deps
                .history_repo
                .record_cycle(&mut self.deps.history, &cycles, now)
        };
        self.deps.history_repo.persist(&mut self.deps.history, now);

        if let Err(e) = self.deps.monitor_store.save(&self.deps.engine.to_state(now)) {
            warn!(error = %e, "failed to save monitor data");
        }

        sort_gateways(&mut gateways);
        let report = CycleReport {
            generated_at: Utc::now(),
            poll_interval_secs: self.config.poll_interval_secs,
            interface_order: self.config.interfaces.clone(),
            targets: reports,
            active_target,
            gateways,
            history: self.deps.history.clone(),
        };
        if let Err(e) = self.deps.status_writer.write(&report) {
            warn!(error = %e, "failed to write status document");
        }
        report
    }

    /// Run cycles until `shutdown` resolves, pausing `poll_interval_secs` after each one
    /// completes. Shutdown is only observed during the pause. Returns the cycle count.
    pub async fn run_until<F: Future<Output = ()>>(&mut self, shutdown: F) -> usize {
        let pause = Duration::from_secs(self.config.poll_interval_secs);
        tokio::pin!(shutdown);
        let mut cycles = 0;
        loop {
            let report = self.run_cycle().await;
            cycles += 1;
            debug!(
                active_target = report.active_target.as_deref().unwrap_or("-"),
                "cycle complete"
            );
            tokio::select! {
                _ = sleep(pause) => {}
                _ = &mut shutdown => {
                    info!(cycles, "Received shutdown signal");
                    return cycles;
                }
            }
        }
    }
}

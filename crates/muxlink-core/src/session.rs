// ── Session abstraction ──
//
// Lifecycle management for one configured appliance: the device
// registry, the background poll task, command dispatch and the
// observable status/log streams.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use muxlink_api::{ApplianceClient, HttpTransport, Reply, ReplyStatus, Transport};

use crate::command::{Command, CommandOutcome};
use crate::config::SessionConfig;
use crate::error::CoreError;
use crate::log::{LogEntry, OperationLog};
use crate::store::{DeviceRegistry, MergeSummary};

// ── SessionStatus ────────────────────────────────────────────────

/// Health of the session as last observed. The most recently completed
/// operation wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum SessionStatus {
    Unknown,
    Ok,
    Error,
}

// ── Session ──────────────────────────────────────────────────────

/// One connection to one appliance.
///
/// Cheaply cloneable via `Arc<SessionInner>`. Owns the registry and the
/// poll task; commands may be dispatched concurrently and complete in any
/// order.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: RwLock<SessionConfig>,
    transport: Arc<dyn Transport>,
    client: RwLock<Option<ApplianceClient>>,
    registry: DeviceRegistry,
    status: watch::Sender<SessionStatus>,
    log: OperationLog,
    poller: Mutex<Option<Poller>>,
}

struct Poller {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Session {
    /// Create a session over the given transport. Does NOT contact the
    /// appliance; call [`start()`](Self::start).
    pub fn new(config: SessionConfig, transport: Arc<dyn Transport>) -> Self {
        let (status, _) = watch::channel(SessionStatus::Unknown);

        Self {
            inner: Arc::new(SessionInner {
                config: RwLock::new(config),
                transport,
                client: RwLock::new(None),
                registry: DeviceRegistry::new(),
                status,
                log: OperationLog::new(),
                poller: Mutex::new(None),
            }),
        }
    }

    /// Create a session backed by a reqwest transport built from the
    /// config's timeout.
    pub fn with_http(config: SessionConfig) -> Result<Self, CoreError> {
        let transport = HttpTransport::new(&config.transport_config())?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.inner.registry
    }

    pub async fn config(&self) -> SessionConfig {
        self.inner.config.read().await.clone()
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Validate the config, run one refresh and arm the poll task.
    ///
    /// An incomplete config is logged and leaves the session idle. The
    /// poll task is only armed when polling is enabled and the first
    /// refresh did not fail at the transport level.
    pub async fn start(&self) -> Result<MergeSummary, CoreError> {
        let config = self.config().await;

        let missing = config.missing_fields();
        if !missing.is_empty() {
            let reason = format!("missing {}", missing.join(", "));
            self.inner
                .log
                .warn(format!("Session not started: {reason}"));
            return Err(CoreError::NotConfigured { reason });
        }

        let client = match ApplianceClient::new(
            &config.host,
            config.credentials(),
            Arc::clone(&self.inner.transport),
        ) {
            Ok(client) => client,
            Err(e) => {
                let err = CoreError::from(e);
                self.set_status(SessionStatus::Error);
                self.inner.log.error(format!("{} : {err}", config.host));
                return Err(err);
            }
        };
        *self.inner.client.write().await = Some(client);

        let result = self.refresh().await;

        let halted = matches!(&result, Err(e) if e.is_transport());
        if config.polling && !halted && !config.poll_interval.is_zero() {
            self.arm_polling(config.poll_interval).await;
        }

        result
    }

    /// Swap in a new config: the old poll task is cancelled and joined
    /// before anything else, the registry is rebuilt from scratch.
    pub async fn reconfigure(&self, config: SessionConfig) -> Result<MergeSummary, CoreError> {
        self.stop_polling().await;
        self.inner.registry.clear();
        *self.inner.client.write().await = None;
        *self.inner.config.write().await = config;
        self.set_status(SessionStatus::Unknown);

        self.start().await
    }

    /// Cancel and join the poll task.
    pub async fn shutdown(&self) {
        self.stop_polling().await;
        debug!("session shut down");
    }

    // ── Registry refresh ─────────────────────────────────────────

    /// Fetch `get_devices` and merge the result.
    ///
    /// - transport failure: status `Error`, polling stops
    /// - `FAILED`: status `Error`, registry untouched
    /// - unknown or missing status: status `Error`, registry untouched
    /// - not started: status `Error`, nothing sent
    pub async fn refresh(&self) -> Result<MergeSummary, CoreError> {
        let client = match self.client().await {
            Ok(client) => client,
            Err(err) => {
                self.set_status(SessionStatus::Error);
                self.inner
                    .log
                    .error("Device refresh not sent, session is not configured");
                return Err(err);
            }
        };

        match client.get_devices().await {
            Ok(reply) => self.apply_devices_reply(&client, reply),
            Err(e) => {
                let err = CoreError::from(e);
                self.set_status(SessionStatus::Error);
                self.inner.log.error(format!("{} : {err}", client.host()));
                if err.is_transport() {
                    self.halt_polling().await;
                }
                Err(err)
            }
        }
    }

    fn apply_devices_reply(
        &self,
        client: &ApplianceClient,
        reply: Reply,
    ) -> Result<MergeSummary, CoreError> {
        match reply.status {
            Some(ReplyStatus::Success) => {
                let summary = self.inner.registry.apply_poll(reply.data);
                self.set_status(SessionStatus::Ok);
                Ok(summary)
            }
            Some(ReplyStatus::Failed) => {
                let message = match reply.message.as_deref().map(str::trim) {
                    Some(msg) if !msg.is_empty() => format!("Device refresh failed: {msg}"),
                    _ => "Device refresh failed".to_owned(),
                };
                self.set_status(SessionStatus::Error);
                self.inner.log.error(format!("{} : {message}", client.host()));
                Err(CoreError::Rejected { message })
            }
            other => {
                let status = describe_status(other.as_ref());
                self.set_status(SessionStatus::Error);
                self.inner.log.error(format!(
                    "{} : Device refresh returned unrecognized status {status}",
                    client.host()
                ));
                Err(CoreError::UnrecognizedReply { status })
            }
        }
    }

    // ── Command dispatch ─────────────────────────────────────────

    /// Send one command and reduce the reply to an outcome.
    ///
    /// Never fails: every outcome is also reported through the session
    /// status and exactly one log entry.
    pub async fn execute(&self, command: Command) -> CommandOutcome {
        let description = command.description();
        let target = command.target();

        let Ok(client) = self.client().await else {
            self.set_status(SessionStatus::Error);
            self.inner
                .log
                .error(format!("{description} not sent, session is not configured: {target}"));
            return CommandOutcome::NotConfigured;
        };

        debug!(command = %command, "dispatching");

        match client.send(command.kind(), Some(command.payload())).await {
            Ok(reply) => match reply.status {
                Some(ReplyStatus::Success) => {
                    self.set_status(SessionStatus::Ok);
                    self.inner.log.info(format!("{description} successful: {target}"));
                    CommandOutcome::Succeeded
                }
                Some(ReplyStatus::Failed) => {
                    let message = format!("{description} failed: {target}");
                    self.set_status(SessionStatus::Error);
                    self.inner.log.error(format!("{} : {message}", client.host()));
                    CommandOutcome::Rejected { message }
                }
                other => {
                    let status = describe_status(other.as_ref());
                    self.set_status(SessionStatus::Error);
                    self.inner.log.error(format!(
                        "{} : {description} returned unrecognized status {status}: {target}",
                        client.host()
                    ));
                    CommandOutcome::Unrecognized { status }
                }
            },
            Err(e) => {
                let message = e.to_string();
                self.set_status(SessionStatus::Error);
                self.inner.log.error(format!("{} : {message}", client.host()));
                CommandOutcome::TransportFailed {
                    message,
                    status: e.http_status(),
                }
            }
        }
    }

    /// Fire-and-forget dispatch. No ordering is kept between calls.
    pub fn spawn(&self, command: Command) -> JoinHandle<CommandOutcome> {
        let session = self.clone();
        tokio::spawn(async move { session.execute(command).await })
    }

    // ── Observation ──────────────────────────────────────────────

    pub fn status(&self) -> SessionStatus {
        *self.inner.status.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SessionStatus> {
        self.inner.status.subscribe()
    }

    /// One entry per completed operation.
    pub fn subscribe_logs(&self) -> broadcast::Receiver<LogEntry> {
        self.inner.log.subscribe()
    }

    pub async fn is_polling(&self) -> bool {
        self.inner
            .poller
            .lock()
            .await
            .as_ref()
            .is_some_and(|p| !p.cancel.is_cancelled() && !p.handle.is_finished())
    }

    // ── Private helpers ──────────────────────────────────────────

    async fn client(&self) -> Result<ApplianceClient, CoreError> {
        self.inner
            .client
            .read()
            .await
            .clone()
            .ok_or_else(|| CoreError::NotConfigured {
                reason: "session has not been started".into(),
            })
    }

    fn set_status(&self, status: SessionStatus) {
        self.inner.status.send_replace(status);
    }

    /// Arm a fresh poll task, cancelling any previous one first.
    async fn arm_polling(&self, interval: Duration) {
        self.stop_polling().await;

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_task(self.clone(), interval, cancel.clone()));
        *self.inner.poller.lock().await = Some(Poller { cancel, handle });
        debug!(interval_secs = interval.as_secs_f64(), "polling armed");
    }

    /// Cancel the poll task and wait for it to exit.
    async fn stop_polling(&self) {
        // Take the poller out before awaiting so a refresh inside the task
        // can still reach `halt_polling`.
        let poller = self.inner.poller.lock().await.take();
        if let Some(Poller { cancel, handle }) = poller {
            cancel.cancel();
            let _ = handle.await;
            debug!("polling stopped");
        }
    }

    /// Cancel the poll task without joining it. Safe to call from inside
    /// the task itself.
    async fn halt_polling(&self) {
        let poller = self.inner.poller.lock().await.take();
        if let Some(poller) = poller {
            poller.cancel.cancel();
            debug!("polling halted after transport failure");
        }
    }
}

fn describe_status(status: Option<&ReplyStatus>) -> String {
    status.map_or_else(|| "<missing>".to_owned(), ToString::to_string)
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically refresh the registry until cancelled.
async fn poll_task(session: Session, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    result = session.refresh() => {
                        if let Err(e) = result {
                            debug!(error = %e, "periodic refresh failed");
                        }
                    }
                }
            }
        }
    }
}

//! Notification presence service.
//!
//! The composition root of the client: owns the store, the transport task and
//! the REST API client. The application constructs one instance, hands clones
//! of it to the components that need it, and calls `stop` at session end.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::{runtime::Handle, sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    api::{HttpNotificationApi, NotificationApi},
    config::{ClientConfig, IdlePolicy},
    domain::{Credential, Notification, NotificationId, should_stop_immediately},
    error::ClientError,
    store::{NotificationStore, PresenceSnapshot},
    subscription::{Subscription, SubscriptionId},
    transport::{PushConnector, TransportContext, WebSocketConnector, run_transport},
};

struct TransportHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
    /// Runtime the task was spawned on
    runtime: Handle,
}

struct ServiceInner {
    config: ClientConfig,
    credential: Credential,
    store: Arc<NotificationStore>,
    api: Arc<dyn NotificationApi>,
    connector: Arc<dyn PushConnector>,
    transport: Mutex<Option<TransportHandle>>,
    /// Idle teardown still waiting for the previous task to finish
    teardown: Mutex<Option<JoinHandle<()>>>,
}

impl ServiceInner {
    fn is_running(&self) -> bool {
        self.transport
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.task.is_finished())
    }

    fn start(&self) {
        let mut slot = self.transport.lock();
        if slot.as_ref().is_some_and(|handle| !handle.task.is_finished()) {
            return;
        }

        let cancel = CancellationToken::new();
        let ctx = TransportContext {
            store: self.store.clone(),
            api: self.api.clone(),
            connector: self.connector.clone(),
            credential: self.credential.clone(),
            backoff: self.config.backoff.clone(),
            heartbeat_timeout: self.config.heartbeat_timeout(),
            resync_interval: self.config.resync_interval(),
        };
        // A new session must not start before the old one has been reset.
        let pending = self.teardown.lock().take();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            if let Some(teardown) = pending {
                join_logged(teardown).await;
            }
            run_transport(ctx, token).await;
        });
        *slot = Some(TransportHandle {
            cancel,
            task,
            runtime: Handle::current(),
        });
        tracing::info!("Notification transport started ({})", self.config.ws_url);
    }

    /// Cancel the transport task, if any, and hand it back for awaiting.
    fn halt(&self) -> Option<TransportHandle> {
        let handle = self.transport.lock().take()?;
        handle.cancel.cancel();
        Some(handle)
    }

    fn release(&self, id: SubscriptionId) {
        let Some(remaining) = self.store.unsubscribe(id) else {
            return;
        };
        tracing::debug!("Subscriber {:?} unmounted ({} active)", id, remaining);

        if remaining == 0 && self.config.idle_policy == IdlePolicy::Disconnect {
            tracing::info!("Last subscriber gone; closing notification channel");
            let Some(TransportHandle { task, runtime, .. }) = self.halt() else {
                self.store.reset();
                return;
            };
            // The task may be past its last await; reset once it has ended so
            // a late resync cannot repopulate the store.
            let store = self.store.clone();
            let teardown = runtime.spawn(async move {
                join_logged(task).await;
                store.reset();
            });
            *self.teardown.lock() = Some(teardown);
        }
    }
}

impl Drop for ServiceInner {
    fn drop(&mut self) {
        if let Some(handle) = self.transport.get_mut().take() {
            handle.cancel.cancel();
        }
    }
}

/// Live unread count and connection status for any number of subscribers,
/// over one shared push channel.
///
/// Cloning is cheap; clones share the same channel and state.
///
/// # Example
///
/// ```ignore
/// let service = NotificationService::new(config, Credential::new(token))?;
/// let _bell = service.subscribe(|snapshot| render(snapshot.unread_count, snapshot.is_connected));
/// // ...
/// service.stop().await;
/// ```
#[derive(Clone)]
pub struct NotificationService {
    inner: Arc<ServiceInner>,
}

impl NotificationService {
    /// Create a service talking WebSocket and HTTP to the configured URLs.
    pub fn new(config: ClientConfig, credential: Credential) -> Result<Self, ClientError> {
        let api = Arc::new(HttpNotificationApi::new(
            config.api_url.clone(),
            credential.clone(),
        )?);
        let connector = Arc::new(WebSocketConnector::new(config.ws_url.clone()));
        Ok(Self::with_parts(config, credential, api, connector))
    }

    /// Create a service over explicit API and connector implementations.
    pub fn with_parts(
        config: ClientConfig,
        credential: Credential,
        api: Arc<dyn NotificationApi>,
        connector: Arc<dyn PushConnector>,
    ) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                config,
                credential,
                store: Arc::new(NotificationStore::new()),
                api,
                connector,
                transport: Mutex::new(None),
                teardown: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Start the transport unless it is already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) {
        self.inner.start();
    }

    /// Close the channel, cancel any pending reconnect, and reset the state
    /// to zero and `Disconnected`.
    pub async fn stop(&self) {
        if let Some(handle) = self.inner.halt() {
            join_logged(handle.task).await;
        }
        let teardown = self.inner.teardown.lock().take();
        if let Some(teardown) = teardown {
            join_logged(teardown).await;
        }
        self.inner.store.reset();
    }

    pub fn is_running(&self) -> bool {
        self.inner.is_running()
    }

    /// Register a subscriber.
    ///
    /// `callback` receives the current snapshot immediately and then every
    /// change, synchronously with the mutation that caused it. It must not
    /// call `mark_read` / `mark_all_read` directly. The transport is started
    /// if it is not running, so this must be called from within a Tokio
    /// runtime. Dropping the returned `Subscription` unregisters it.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&PresenceSnapshot) + Send + Sync + 'static,
    {
        let (id, count) = self.inner.store.subscribe(Arc::new(callback));
        tracing::debug!("Subscriber {:?} mounted ({} active)", id, count);

        self.inner.start();

        let inner: Weak<ServiceInner> = Arc::downgrade(&self.inner);
        Subscription::new(
            id,
            Box::new(move |id| {
                if let Some(inner) = inner.upgrade() {
                    inner.release(id);
                }
            }),
        )
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.store.subscriber_count()
    }

    /// Current `{ unread_count, is_connected, .. }`
    pub fn state(&self) -> PresenceSnapshot {
        self.inner.store.snapshot()
    }

    /// Receiver that always holds the latest snapshot
    pub fn watch(&self) -> watch::Receiver<PresenceSnapshot> {
        self.inner.store.watch()
    }

    /// Notifications known to this client, in arrival order
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.store.notifications()
    }

    /// Mark one notification read and acknowledge it to the server in the
    /// background.
    ///
    /// Returns `false`, and sends nothing, if `id` is unknown or already read.
    pub fn mark_read(&self, id: &NotificationId) -> bool {
        if !self.inner.store.mark_read(id) {
            return false;
        }
        spawn_acknowledgment(self.inner.api.clone(), Ack::Read(id.clone()));
        true
    }

    /// Mark everything read and send one bulk acknowledgment in the
    /// background. The unread count is zero afterwards.
    pub fn mark_all_read(&self) {
        self.inner.store.mark_all_read();
        spawn_acknowledgment(self.inner.api.clone(), Ack::ReadAll);
    }
}

async fn join_logged(task: JoinHandle<()>) {
    if let Err(e) = task.await {
        tracing::warn!("Notification transport ended abnormally: {}", e);
    }
}

/// A read acknowledgment owed to the server.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Ack {
    Read(NotificationId),
    ReadAll,
}

async fn send_ack(api: &dyn NotificationApi, ack: &Ack) -> Result<(), ClientError> {
    match ack {
        Ack::Read(id) => api.mark_read(id).await,
        Ack::ReadAll => api.mark_all_read().await,
    }
}

/// Deliver `ack`, retrying at most once.
pub(crate) async fn acknowledge(api: &dyn NotificationApi, ack: &Ack) -> Result<(), ClientError> {
    match send_ack(api, ack).await {
        Ok(()) => Ok(()),
        Err(e) if should_stop_immediately(&e) => Err(e),
        Err(e) => {
            tracing::warn!("Acknowledgment {:?} failed, retrying once: {}", ack, e);
            send_ack(api, ack).await
        }
    }
}

fn spawn_acknowledgment(api: Arc<dyn NotificationApi>, ack: Ack) {
    tokio::spawn(async move {
        if let Err(e) = acknowledge(api.as_ref(), &ack).await {
            // The optimistic local update stands until the next resync.
            tracing::warn!("Acknowledgment {:?} abandoned: {}", ack, e);
        }
    });
}

//! Server execution logic.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post},
};
use storebell_shared::time::SystemClock;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    infrastructure::{
        repository::InMemoryFeedRepository, session_pusher::WebSocketSessionPusher,
    },
    usecase::{
        ConnectSessionUseCase, ListNotificationsUseCase, MarkReadUseCase,
        PublishNotificationUseCase,
    },
};

use super::{
    handler::{
        health_check, list_notifications, mark_all_read, mark_read, publish_notification,
        websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Notification push server
///
/// # Example
///
/// ```ignore
/// let server = Server::in_memory(Duration::from_secs(15));
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(
        connect_session_usecase: Arc<ConnectSessionUseCase>,
        list_notifications_usecase: Arc<ListNotificationsUseCase>,
        publish_notification_usecase: Arc<PublishNotificationUseCase>,
        mark_read_usecase: Arc<MarkReadUseCase>,
        heartbeat_interval: Duration,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                connect_session_usecase,
                list_notifications_usecase,
                publish_notification_usecase,
                mark_read_usecase,
                heartbeat_interval,
            }),
        }
    }

    /// Server wired to in-memory feeds, WebSocket sessions and the system clock.
    pub fn in_memory(heartbeat_interval: Duration) -> Self {
        // 1. Repository and SessionPusher
        let repository = Arc::new(InMemoryFeedRepository::new());
        let pusher = Arc::new(WebSocketSessionPusher::new());

        // 2. UseCases
        let connect_session_usecase = Arc::new(ConnectSessionUseCase::new(pusher.clone()));
        let list_notifications_usecase =
            Arc::new(ListNotificationsUseCase::new(repository.clone()));
        let publish_notification_usecase = Arc::new(PublishNotificationUseCase::new(
            repository.clone(),
            pusher.clone(),
            Arc::new(SystemClock),
        ));
        let mark_read_usecase = Arc::new(MarkReadUseCase::new(repository, pusher));

        Self::new(
            connect_session_usecase,
            list_notifications_usecase,
            publish_notification_usecase,
            mark_read_usecase,
            heartbeat_interval,
        )
    }

    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/notifications/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route(
                "/notifications",
                get(list_notifications).post(publish_notification),
            )
            .route("/notifications/read-all", post(mark_all_read))
            .route("/notifications/{id}/read", post(mark_read))
            .route("/api/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the server until Ctrl+C / SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!(
            "Notification server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Push channel: ws://{}/notifications/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
    }
}

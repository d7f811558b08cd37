//! Transport loop with reconnection support.

use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::{
    api::NotificationApi,
    domain::{
        BackoffPolicy, Credential, TransportEvent, should_attempt_reconnect,
        should_stop_immediately,
    },
    store::NotificationStore,
};

use super::{
    connector::PushConnector,
    session::{SessionEnd, run_session},
};

/// Everything the transport task needs.
#[derive(Clone)]
pub(crate) struct TransportContext {
    pub store: Arc<NotificationStore>,
    pub api: Arc<dyn NotificationApi>,
    pub connector: Arc<dyn PushConnector>,
    pub credential: Credential,
    pub backoff: BackoffPolicy,
    pub heartbeat_timeout: Duration,
    pub resync_interval: Duration,
}

/// Keep the push channel open until `cancel` fires or the server rejects
/// the credential.
///
/// After `max_consecutive_failures` failed attempts the status is reported
/// as `Disconnected` and retries continue at the maximum backoff interval
/// without publishing intermediate states; the next successful open resyncs
/// and goes straight back to `Connected`.
pub(crate) async fn run_transport(ctx: TransportContext, cancel: CancellationToken) {
    let mut consecutive_failures: u32 = 0;
    let mut degraded = false;

    ctx.store.transition(TransportEvent::Start);

    loop {
        let SessionEnd { opened, error } = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            end = run_session(&ctx, &cancel) => end,
        };

        if cancel.is_cancelled() {
            break;
        }

        if opened {
            consecutive_failures = 0;
            degraded = false;
        }

        if should_stop_immediately(&error) {
            tracing::error!("{}", error);
            tracing::error!("Notification channel cannot be opened with this session. Giving up.");
            ctx.store.transition(TransportEvent::GaveUp);
            break;
        }

        consecutive_failures = consecutive_failures.saturating_add(1);
        tracing::warn!("Notification channel lost: {}", error);

        if degraded {
            // Status already shows Disconnected; retry quietly.
        } else if should_attempt_reconnect(
            &error,
            consecutive_failures,
            ctx.backoff.max_consecutive_failures,
        ) {
            ctx.store.transition(TransportEvent::Failed);
        } else {
            tracing::error!(
                "Failed to reconnect after {} attempts. Live updates paused; retrying every {:?}.",
                consecutive_failures,
                ctx.backoff.max_delay()
            );
            degraded = true;
            ctx.store.transition(TransportEvent::GaveUp);
        }

        let base = if degraded {
            ctx.backoff.max_delay()
        } else {
            ctx.backoff.delay(consecutive_failures - 1)
        };
        let delay = ctx.backoff.jittered(base, &mut rand::rng());

        tracing::info!(
            "Reconnecting in {:?}... (attempt {})",
            delay,
            consecutive_failures + 1
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }

        if !degraded {
            ctx.store.transition(TransportEvent::Retry);
        }
    }

    ctx.store.transition(TransportEvent::Stopped);
    tracing::info!("Notification transport stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::MockNotificationApi,
        domain::{ConnectionStatus, ServerSnapshot},
        error::ClientError,
        store::PresenceSnapshot,
        test_support::{
            ScriptedConnector, channel_stream, fast_backoff, notification_frame, refused, text,
            wait_until,
        },
        transport::PushMessage,
    };
    use parking_lot::Mutex;
    use std::{
        collections::VecDeque,
        sync::atomic::{AtomicUsize, Ordering},
    };

    // ========================================
    // 【何をテストするか】
    // - 再接続ループの状態遷移（Connecting / Connected / Reconnecting / Disconnected）
    // - 接続直後の resync とフレームの適用
    // - 認証拒否での即時停止、連続失敗後の劣化モード、無通信タイムアウト
    //
    // 【どのようなシナリオをテストするか】
    // ネットワークの代わりにスクリプト化した PushConnector を使う。
    // 接続ごとにキューから結果を取り出し、空なら接続拒否を返す。
    // ========================================

    fn api_with_snapshot(unread_count: u64) -> Arc<MockNotificationApi> {
        let mut api = MockNotificationApi::new();
        api.expect_fetch_snapshot().returning(move || {
            Ok(ServerSnapshot {
                notifications: vec![],
                unread_count,
            })
        });
        api.expect_mark_read().times(0);
        api.expect_mark_all_read().times(0);
        Arc::new(api)
    }

    fn context(
        connector: Arc<ScriptedConnector>,
        api: Arc<MockNotificationApi>,
        backoff: BackoffPolicy,
        heartbeat_timeout: Duration,
    ) -> TransportContext {
        TransportContext {
            store: Arc::new(NotificationStore::new()),
            api,
            connector,
            credential: Credential::new("alice"),
            backoff,
            heartbeat_timeout,
            resync_interval: Duration::from_secs(60),
        }
    }

    fn record_statuses(store: &NotificationStore) -> Arc<Mutex<Vec<ConnectionStatus>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(Arc::new(move |snapshot: &PresenceSnapshot| {
            let mut seen = sink.lock();
            if seen.last() != Some(&snapshot.status) {
                seen.push(snapshot.status);
            }
        }));
        seen
    }

    #[tokio::test]
    async fn test_reconnects_after_failures_and_resyncs() {
        // テスト項目: 接続失敗を 2 回経て接続し、resync で未読数がサーバーの値になる
        // given (前提条件):
        let (tx, stream) = channel_stream();
        let connector = ScriptedConnector::new(VecDeque::from([refused(), refused(), Ok(stream)]));
        let ctx = context(
            connector.clone(),
            api_with_snapshot(4),
            fast_backoff(5),
            Duration::from_secs(5),
        );
        let store = ctx.store.clone();
        let statuses = record_statuses(&store);
        let cancel = CancellationToken::new();

        // when (操作):
        let task = tokio::spawn(run_transport(ctx, cancel.clone()));
        wait_until("connected", || store.snapshot().is_connected).await;
        wait_until("resync", || store.snapshot().unread_count == 4).await;
        tx.send(notification_frame("n-1")).unwrap();
        wait_until("live event", || store.snapshot().unread_count == 5).await;
        cancel.cancel();
        task.await.unwrap();

        // then (期待する結果):
        assert_eq!(connector.attempts(), 3);
        assert_eq!(
            *statuses.lock(),
            vec![
                ConnectionStatus::Disconnected,
                ConnectionStatus::Connecting,
                ConnectionStatus::Reconnecting,
                ConnectionStatus::Connecting,
                ConnectionStatus::Reconnecting,
                ConnectionStatus::Connecting,
                ConnectionStatus::Connected,
                ConnectionStatus::Disconnected,
            ]
        );
    }

    #[tokio::test]
    async fn test_unauthorized_stops_without_retry() {
        // テスト項目: 認証拒否の場合は再接続せずに停止する
        // given (前提条件):
        let connector = ScriptedConnector::new(VecDeque::from([Err(ClientError::Unauthorized(
            "401".to_string(),
        ))]));
        let ctx = context(
            connector.clone(),
            api_with_snapshot(0),
            fast_backoff(5),
            Duration::from_secs(5),
        );
        let store = ctx.store.clone();

        // when (操作):
        tokio::time::timeout(
            Duration::from_secs(3),
            run_transport(ctx, CancellationToken::new()),
        )
        .await
        .expect("transport should stop on its own");

        // then (期待する結果):
        assert_eq!(connector.attempts(), 1);
        assert_eq!(store.snapshot().status, ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_degrades_after_max_failures_then_catches_up() {
        // テスト項目: 連続失敗が上限に達すると Disconnected になり、再試行の成功で Connected に戻る
        // given (前提条件):
        let connector = ScriptedConnector::new(VecDeque::new());
        let ctx = context(
            connector.clone(),
            api_with_snapshot(2),
            fast_backoff(2),
            Duration::from_secs(5),
        );
        let store = ctx.store.clone();
        let cancel = CancellationToken::new();

        // when (操作):
        let task = tokio::spawn(run_transport(ctx, cancel.clone()));
        wait_until("degraded retries", || connector.attempts() >= 4).await;
        let degraded_status = store.snapshot().status;
        let (_tx, stream) = channel_stream();
        connector.push(Ok(stream));
        wait_until("catch-up", || store.snapshot().is_connected).await;
        cancel.cancel();
        task.await.unwrap();

        // then (期待する結果):
        assert_eq!(degraded_status, ConnectionStatus::Disconnected);
        assert_eq!(store.snapshot().unread_count, 2);
        assert_eq!(store.snapshot().status, ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_silent_channel_is_treated_as_dropped() {
        // テスト項目: 無通信がタイムアウトを超えると切断とみなして再接続する
        // given (前提条件):
        let (_tx, stream) = channel_stream();
        let connector = ScriptedConnector::new(VecDeque::from([Ok(stream)]));
        let ctx = context(
            connector.clone(),
            api_with_snapshot(0),
            fast_backoff(10),
            Duration::from_millis(30),
        );
        let store = ctx.store.clone();
        let statuses = record_statuses(&store);
        let cancel = CancellationToken::new();

        // when (操作):
        let task = tokio::spawn(run_transport(ctx, cancel.clone()));
        wait_until("reconnect attempt", || connector.attempts() >= 2).await;
        cancel.cancel();
        task.await.unwrap();

        // then (期待する結果):
        let statuses = statuses.lock();
        let connected_at = statuses
            .iter()
            .position(|s| *s == ConnectionStatus::Connected)
            .expect("should have connected");
        assert_eq!(statuses[connected_at + 1], ConnectionStatus::Reconnecting);
    }

    #[tokio::test]
    async fn test_malformed_frames_are_dropped() {
        // テスト項目: 不正なフレームは破棄され、接続は維持される
        // given (前提条件):
        let (tx, stream) = channel_stream();
        let connector = ScriptedConnector::new(VecDeque::from([Ok(stream)]));
        let ctx = context(
            connector.clone(),
            api_with_snapshot(0),
            fast_backoff(5),
            Duration::from_secs(5),
        );
        let store = ctx.store.clone();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_transport(ctx, cancel.clone()));
        wait_until("connected", || store.snapshot().is_connected).await;

        // when (操作):
        tx.send(text("{not json")).unwrap();
        tx.send(Ok(PushMessage::Liveness)).unwrap();
        tx.send(text(r#"{"type":"heartbeat","timestamp":1}"#)).unwrap();
        tx.send(text(
            r#"{"type":"notification","id":"n-1","kind":"system","createdAt":1,"read":false}"#,
        ))
        .unwrap();
        wait_until("valid event", || store.snapshot().unread_count == 1).await;

        // then (期待する結果):
        assert!(store.snapshot().is_connected);
        assert_eq!(connector.attempts(), 1);
        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_read_frames_from_other_sessions_are_not_acknowledged() {
        // テスト項目: 他セッションからの read / read-all フレームはローカルにのみ反映される
        // given (前提条件):
        let (tx, stream) = channel_stream();
        let connector = ScriptedConnector::new(VecDeque::from([Ok(stream)]));
        // api_with_snapshot は mark_read / mark_all_read の呼び出しを 0 回と期待する
        let ctx = context(
            connector,
            api_with_snapshot(0),
            fast_backoff(5),
            Duration::from_secs(5),
        );
        let store = ctx.store.clone();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_transport(ctx, cancel.clone()));
        wait_until("connected", || store.snapshot().is_connected).await;
        for id in ["n-1", "n-2", "n-3"] {
            tx.send(notification_frame(id)).unwrap();
        }
        wait_until("three unread", || store.snapshot().unread_count == 3).await;

        // when (操作):
        tx.send(text(r#"{"type":"read","id":"n-2"}"#)).unwrap();
        wait_until("read applied", || store.snapshot().unread_count == 2).await;
        tx.send(text(r#"{"type":"read-all"}"#)).unwrap();
        wait_until("read-all applied", || store.snapshot().unread_count == 0).await;

        // then (期待する結果):
        assert!(store.notifications().iter().all(|n| n.read));
        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_periodic_resync_corrects_missed_reads() {
        // テスト項目: 接続中も一定間隔で resync し、見逃した既読がサーバーの値で補正される
        // given (前提条件):
        let fetches = Arc::new(AtomicUsize::new(0));
        let counter = fetches.clone();
        let mut api = MockNotificationApi::new();
        api.expect_fetch_snapshot().returning(move || {
            let unread_count = if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                3
            } else {
                0
            };
            Ok(ServerSnapshot {
                notifications: vec![],
                unread_count,
            })
        });
        let (tx, stream) = channel_stream();
        let connector = ScriptedConnector::new(VecDeque::from([Ok(stream)]));
        let mut ctx = context(
            connector.clone(),
            Arc::new(api),
            fast_backoff(5),
            Duration::from_secs(5),
        );
        ctx.resync_interval = Duration::from_millis(20);
        let store = ctx.store.clone();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_transport(ctx, cancel.clone()));
        wait_until("initial resync", || store.snapshot().unread_count == 3).await;

        // when (操作):
        tx.send(text(r#"{"type":"read","id":"unseen"}"#)).unwrap();
        wait_until("periodic resync", || store.snapshot().unread_count == 0).await;
        cancel.cancel();
        task.await.unwrap();

        // then (期待する結果):
        assert!(fetches.load(Ordering::SeqCst) >= 2);
        assert_eq!(connector.attempts(), 1);
    }

    #[tokio::test]
    async fn test_cancel_during_backoff_stops_promptly() {
        // テスト項目: バックオフ待機中のキャンセルで即座に停止する
        // given (前提条件):
        let connector = ScriptedConnector::new(VecDeque::new());
        let slow = BackoffPolicy {
            initial_delay_ms: 60_000,
            max_delay_ms: 60_000,
            ..fast_backoff(5)
        };
        let ctx = context(
            connector.clone(),
            api_with_snapshot(0),
            slow,
            Duration::from_secs(5),
        );
        let store = ctx.store.clone();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_transport(ctx, cancel.clone()));
        wait_until("first failure", || {
            store.snapshot().status == ConnectionStatus::Reconnecting
        })
        .await;

        // when (操作):
        cancel.cancel();
        let result = tokio::time::timeout(Duration::from_secs(1), task).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(connector.attempts(), 1);
        assert_eq!(store.snapshot().status, ConnectionStatus::Disconnected);
    }
}

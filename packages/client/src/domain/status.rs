//! Connection status state machine.
//!
//! ```text
//! Disconnected --Start---> Connecting
//! Connecting   --Opened--> Connected
//! Connecting   --Failed--> Reconnecting
//! Connected    --Failed--> Reconnecting
//! Reconnecting --Retry---> Connecting
//! Disconnected --Opened--> Connected
//! (any)        --GaveUp / Stopped--> Disconnected
//! ```
//!
//! `Disconnected --Opened--> Connected` is the catch-up path taken when the
//! transport has given up on live delivery but a slow retry succeeds.

/// Connection status of the push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

/// Input of the status state machine, emitted only by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    /// The transport task started
    Start,
    /// The channel is open
    Opened,
    /// A connection attempt failed or an open channel dropped
    Failed,
    /// The backoff delay elapsed and a new attempt begins
    Retry,
    /// Too many consecutive failures, or a non-retryable error
    GaveUp,
    /// Deliberate shutdown
    Stopped,
}

impl ConnectionStatus {
    /// Compute the status after `event`.
    ///
    /// Events that make no sense in the current status leave it unchanged.
    pub fn next(self, event: TransportEvent) -> Self {
        use ConnectionStatus::*;
        use TransportEvent::*;

        match (self, event) {
            (_, GaveUp) | (_, Stopped) => Disconnected,
            (Disconnected, Start) => Connecting,
            (Connecting, Opened) | (Disconnected, Opened) => Connected,
            (Connecting, Failed) | (Connected, Failed) => Reconnecting,
            (Reconnecting, Retry) => Connecting,
            (current, _) => current,
        }
    }

    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_reaches_connected() {
        // テスト項目: Start → Opened で Connected に到達する
        // given (前提条件):
        let status = ConnectionStatus::default();

        // when (操作):
        let status = status.next(TransportEvent::Start).next(TransportEvent::Opened);

        // then (期待する結果):
        assert_eq!(status, ConnectionStatus::Connected);
        assert!(status.is_connected());
    }

    #[test]
    fn test_drop_and_reconnect_cycle() {
        // テスト項目: 切断後に Reconnecting → Connecting → Connected と遷移する
        // given (前提条件):
        let status = ConnectionStatus::Connected;

        // when (操作):
        let dropped = status.next(TransportEvent::Failed);
        let retrying = dropped.next(TransportEvent::Retry);
        let reopened = retrying.next(TransportEvent::Opened);

        // then (期待する結果):
        assert_eq!(dropped, ConnectionStatus::Reconnecting);
        assert_eq!(retrying, ConnectionStatus::Connecting);
        assert_eq!(reopened, ConnectionStatus::Connected);
    }

    #[test]
    fn test_failed_attempt_goes_to_reconnecting() {
        // テスト項目: 接続試行の失敗で Reconnecting に遷移する
        // given (前提条件):
        let status = ConnectionStatus::Connecting;

        // when (操作):
        let status = status.next(TransportEvent::Failed);

        // then (期待する結果):
        assert_eq!(status, ConnectionStatus::Reconnecting);
    }

    #[test]
    fn test_gave_up_and_stopped_always_disconnect() {
        // テスト項目: GaveUp / Stopped はどの状態からでも Disconnected になる
        // given (前提条件):
        let all = [
            ConnectionStatus::Disconnected,
            ConnectionStatus::Connecting,
            ConnectionStatus::Connected,
            ConnectionStatus::Reconnecting,
        ];

        for status in all {
            // when (操作):
            let gave_up = status.next(TransportEvent::GaveUp);
            let stopped = status.next(TransportEvent::Stopped);

            // then (期待する結果):
            assert_eq!(gave_up, ConnectionStatus::Disconnected);
            assert_eq!(stopped, ConnectionStatus::Disconnected);
        }
    }

    #[test]
    fn test_degraded_catch_up_opens_from_disconnected() {
        // テスト項目: 劣化モードからの再接続成功で Disconnected から Connected になる
        // given (前提条件):
        let status = ConnectionStatus::Disconnected;

        // when (操作):
        let status = status.next(TransportEvent::Opened);

        // then (期待する結果):
        assert_eq!(status, ConnectionStatus::Connected);
    }

    #[test]
    fn test_nonsense_events_are_ignored() {
        // テスト項目: 意味のないイベントでは状態が変わらない
        // given (前提条件):
        let cases = [
            (ConnectionStatus::Connected, TransportEvent::Start),
            (ConnectionStatus::Connected, TransportEvent::Retry),
            (ConnectionStatus::Disconnected, TransportEvent::Failed),
            (ConnectionStatus::Reconnecting, TransportEvent::Opened),
        ];

        for (status, event) in cases {
            // when (操作):
            let next = status.next(event);

            // then (期待する結果):
            assert_eq!(next, status, "{:?} + {:?}", status, event);
        }
    }
}

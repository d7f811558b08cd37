//! Opening the push channel.

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        self,
        client::IntoClientRequest,
        http::{HeaderValue, StatusCode, header::AUTHORIZATION},
        protocol::Message,
    },
};

use crate::{domain::Credential, error::ClientError};

/// What the session loop sees of the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushMessage {
    /// A text frame, to be parsed by `parse_frame`
    Text(String),
    /// Any other traffic (ping, pong, binary); proves the peer is alive
    Liveness,
}

/// Inbound half of an open channel. Ends, or yields an error, when the
/// channel drops.
pub type PushStream = Pin<Box<dyn Stream<Item = Result<PushMessage, ClientError>> + Send>>;

/// Opens push channels; the seam between the transport loop and the network.
#[async_trait]
pub trait PushConnector: Send + Sync {
    async fn connect(&self, credential: &Credential) -> Result<PushStream, ClientError>;
}

/// `PushConnector` over WebSocket (tokio-tungstenite).
pub struct WebSocketConnector {
    url: String,
}

impl WebSocketConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl PushConnector for WebSocketConnector {
    async fn connect(&self, credential: &Credential) -> Result<PushStream, ClientError> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| ClientError::Config(format!("invalid push URL '{}': {}", self.url, e)))?;
        let header = HeaderValue::from_str(&credential.bearer_header())
            .map_err(|e| ClientError::Unauthorized(format!("unusable credential: {}", e)))?;
        request.headers_mut().insert(AUTHORIZATION, header);

        let (ws_stream, response) = connect_async(request)
            .await
            .map_err(classify_handshake_error)?;
        tracing::debug!(
            "Push channel handshake completed with status {}",
            response.status()
        );

        // The write half is never used: pongs are queued by tungstenite and
        // flushed while reading.
        let stream = ws_stream.map(|message| match message {
            Ok(Message::Text(text)) => Ok(PushMessage::Text(text.to_string())),
            Ok(Message::Close(frame)) => Err(ClientError::Connection(match frame {
                Some(frame) => format!("closed by server: {} {}", frame.code, frame.reason),
                None => "closed by server".to_string(),
            })),
            Ok(_) => Ok(PushMessage::Liveness),
            Err(e) => Err(ClientError::Connection(e.to_string())),
        });

        Ok(Box::pin(stream))
    }
}

fn classify_handshake_error(error: tungstenite::Error) -> ClientError {
    match error {
        tungstenite::Error::Http(response)
            if response.status() == StatusCode::UNAUTHORIZED
                || response.status() == StatusCode::FORBIDDEN =>
        {
            ClientError::Unauthorized(format!("handshake rejected with {}", response.status()))
        }
        tungstenite::Error::Url(e) => ClientError::Config(e.to_string()),
        other => ClientError::Connection(other.to_string()),
    }
}

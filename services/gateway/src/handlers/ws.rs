//! Websocket participant bridge
//!
//! Each socket is one participant. Incoming text frames are parsed into
//! client commands and forwarded to the engine; the participant's mailbox
//! is drained into outgoing JSON frames by a separate writer task. When
//! either direction breaks, only this participant is disconnected.

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{Sink, SinkExt, Stream, stream::StreamExt};
use matching_engine::{EngineError, MarketEvent};
use simulation::{TraderKind, spawn_trader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use types::ids::ParticipantId;
use types::protocol::{ClientCommand, ClientRequest};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    if state.engine.is_closed() {
        return Err(EngineError::Closed.into());
    }

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state)))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (participant, events) = match state.engine.connect() {
        Ok(connected) => connected,
        Err(err) => {
            warn!(error = %err, "Rejecting socket");
            return;
        }
    };
    info!(participant = %participant, "Socket connected");

    let (sink, stream) = socket.split();
    bridge(&state, participant, events, sink, stream).await;

    let _ = state.engine.disconnect(participant);
    info!(participant = %participant, "Socket disconnected");
}

/// Pump one participant's traffic until either direction ends
///
/// The writer task ends when the engine drops the mailbox or the sink
/// fails; the reader loop then stops too, closing the socket.
async fn bridge<K, S>(
    state: &AppState,
    participant: ParticipantId,
    mut events: mpsc::Receiver<MarketEvent>,
    mut sink: K,
    mut stream: S,
) where
    K: Sink<Message> + Unpin + Send + 'static,
    K::Error: Send,
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let mut writer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(err) => {
                    warn!(participant = %participant, error = %err, "Failed to encode event");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                return;
            }
        }
        debug!(participant = %participant, "Mailbox closed by engine");
        let _ = sink.send(Message::Close(None)).await;
    });

    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if let Err(err) = handle_text(state, participant, text.as_str()) {
                        warn!(participant = %participant, error = %err, "Engine unavailable");
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    debug!(participant = %participant, error = %err, "Socket read failed");
                    break;
                }
            },
            _ = &mut writer => {
                debug!(participant = %participant, "Writer finished, closing socket");
                break;
            }
        }
    }

    writer.abort();
}

/// Parse one text frame and forward it. Malformed frames are logged and
/// skipped; only a closed engine is an error.
pub fn handle_text(
    state: &AppState,
    participant: ParticipantId,
    raw: &str,
) -> Result<(), EngineError> {
    match ClientRequest::parse(raw) {
        Ok(command) => dispatch(state, participant, command),
        Err(err) => {
            warn!(participant = %participant, error = %err, "Malformed client frame dropped");
            Ok(())
        }
    }
}

pub fn dispatch(
    state: &AppState,
    participant: ParticipantId,
    command: ClientCommand,
) -> Result<(), EngineError> {
    let engine = &state.engine;
    match command {
        ClientCommand::Submit(order) => engine.submit(order.with_owner(participant)),
        ClientCommand::Cancel(id) => engine.cancel(id, participant),
        ClientCommand::GetBooks => engine.get_books(participant),
        ClientCommand::StartRound => engine.start_round(),
        ClientCommand::StopRound => engine.stop_round(),
        ClientCommand::StartTrader(name) => {
            let kind = match name.parse::<TraderKind>() {
                Ok(kind) => kind,
                Err(err) => {
                    warn!(participant = %participant, error = %err, "Trader not started");
                    return Ok(());
                }
            };
            let spawned = spawn_trader(kind, &state.population, engine, &mut rand::thread_rng())?;
            info!(
                requester = %participant,
                trader = %spawned.participant,
                kind = %spawned.kind,
                "Trader started"
            );
            Ok(())
        }
    }
}

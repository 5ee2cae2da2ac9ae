//! WebSocket connection handler
//!
//! Handles individual client connections: WebSocket handshake,
//! frame parsing, acknowledgements, and bidirectional communication
//! with the ChatServer.

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::message::{ClientEvent, ClientFrame, ServerMessage};
use crate::server::{dispatch, ServerCommand};
use crate::types::ClientId;

/// Accept connections forever, one task per connection
pub async fn serve(listener: TcpListener, cmd_tx: mpsc::Sender<ServerCommand>, client_buffer: usize) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let cmd_tx = cmd_tx.clone();

                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, cmd_tx, client_buffer).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// Handle a new TCP connection
///
/// Performs the WebSocket handshake, registers the connection, relays
/// frames to the ChatServer and issues exactly one disconnect at the end.
pub async fn handle_connection(
    stream: TcpStream,
    cmd_tx: mpsc::Sender<ServerCommand>,
    client_buffer: usize,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    debug!("New TCP connection from {}", peer_addr);

    // WebSocket handshake
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let client_id = ClientId::new();
    info!("Client {} connected from {}", client_id, peer_addr);

    // Server -> client queue
    let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(client_buffer);

    if cmd_tx
        .send(ServerCommand::Connect {
            client_id,
            sender: msg_tx.clone(),
        })
        .await
        .is_err()
    {
        error!("Failed to register client {} - server closed", client_id);
        return Err(AppError::ChannelSend);
    }

    let connected_msg = ServerMessage::Connected {
        client_id: client_id.to_string(),
    };
    let json = serde_json::to_string(&connected_msg)?;
    ws_sender.send(Message::Text(json.into())).await?;

    let cmd_tx_read = cmd_tx.clone();

    // Read task (WebSocket -> ServerCommand)
    let mut read_task = tokio::spawn(async move {
        while let Some(msg_result) = ws_receiver.next().await {
            match msg_result {
                Ok(Message::Text(text)) => {
                    let frame = match serde_json::from_str::<ClientFrame>(&text) {
                        Ok(frame) => frame,
                        Err(e) => {
                            warn!("Invalid JSON from {}: {}", client_id, e);
                            let _ = msg_tx
                                .send(ServerMessage::Error {
                                    message: format!("Invalid message format: {}", e),
                                })
                                .await;
                            continue;
                        }
                    };

                    let leaving = frame.event == ClientEvent::Leave;
                    let Some(result) = dispatch(&cmd_tx_read, client_id, frame.event).await else {
                        debug!("Server closed, ending read task for {}", client_id);
                        break;
                    };

                    // Broadcasts for this event are already queued ahead of the ack
                    if let Some(ack) = frame.ack {
                        if msg_tx.send(ServerMessage::ack(ack, &result)).await.is_err() {
                            break;
                        }
                    }

                    if leaving {
                        debug!("Client {} left, closing", client_id);
                        break;
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("Client {} sent close frame", client_id);
                    break;
                }
                Ok(Message::Ping(_)) => {
                    // Pong is handled automatically by tungstenite
                    debug!("Ping from {}", client_id);
                }
                Ok(Message::Pong(_)) => {
                    debug!("Pong from {}", client_id);
                }
                Ok(_) => {
                    // Binary or other message types - ignore
                }
                Err(e) => {
                    error!("WebSocket error for {}: {}", client_id, e);
                    break;
                }
            }
        }
        debug!("Read task ended for {}", client_id);
    });

    // Write task (ServerMessage -> WebSocket)
    let mut write_task = tokio::spawn(async move {
        while let Some(msg) = msg_rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, ending write task");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize message: {}", e);
                }
            }
        }
        debug!("Write task ended for client");

        let _ = ws_sender.close().await;
    });

    tokio::select! {
        _ = &mut read_task => {
            debug!("Read task completed for {}", client_id);
        }
        _ = &mut write_task => {
            debug!("Write task completed for {}", client_id);
            read_task.abort();
        }
    }

    // Dropping the router's sender lets the write task drain and close
    let _ = cmd_tx.send(ServerCommand::Disconnect { client_id }).await;

    info!("Client {} disconnected", client_id);

    Ok(())
}

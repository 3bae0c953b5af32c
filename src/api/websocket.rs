//! WebSocket stream of ledger notifications

use crate::api::handlers::ApiState;
use crate::service::SharedLedger;
use crate::token::{ApprovalEvent, LedgerEvent, TransferEvent};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;

/// WebSocket events pushed to clients
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum WsEvent {
    /// Tokens moved
    Transfer(TransferEvent),
    /// Allowance set
    Approval(ApprovalEvent),
    /// Connection established
    Connected { message: String },
    /// Client fell behind and missed events
    Lagged { missed: u64 },
}

impl From<LedgerEvent> for WsEvent {
    fn from(event: LedgerEvent) -> Self {
        match event {
            LedgerEvent::Transfer(e) => WsEvent::Transfer(e),
            LedgerEvent::Approval(e) => WsEvent::Approval(e),
        }
    }
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<ApiState>,
) -> impl IntoResponse {
    let ledger = state.ledger.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, ledger))
}

async fn handle_socket(socket: WebSocket, ledger: SharedLedger) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = ledger.subscribe();

    let welcome = WsEvent::Connected {
        message: "Connected to OurToken ledger".to_string(),
    };
    if let Ok(json) = serde_json::to_string(&welcome) {
        let _ = sender.send(Message::Text(json.into())).await;
    }

    let mut send_task = tokio::spawn(async move {
        loop {
            let event = match rx.recv().await {
                Ok(event) => WsEvent::from(event),
                Err(RecvError::Lagged(missed)) => WsEvent::Lagged { missed },
                Err(RecvError::Closed) => break,
            };
            if let Ok(json) = serde_json::to_string(&event) {
                if sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(Message::Text(text)) => {
                    log::debug!("Received text message: {}", text);
                }
                Err(e) => {
                    log::warn!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    log::info!("WebSocket connection closed");
}

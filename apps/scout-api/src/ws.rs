//! WebSocket subscriber for a conversation's delivery events.

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use scout_service::{BoxFuture, DeliveryEvent, Error, EventKind, EventSink, Result};

use crate::state::AppState;

#[derive(Debug, PartialEq)]
pub enum Outbound {
	Text(String),
	Close,
}

/// Fan-out sink backed by the socket's writer task. Sends fail once the writer is gone.
pub struct WsSink {
	tx: mpsc::UnboundedSender<Outbound>,
}
impl WsSink {
	pub fn new(tx: mpsc::UnboundedSender<Outbound>) -> Self {
		Self { tx }
	}
}
impl EventSink for WsSink {
	fn send<'a>(&'a self, event: &'a DeliveryEvent) -> BoxFuture<'a, Result<()>> {
		let out = serde_json::to_string(event)
			.map_err(|err| Error::Delivery { message: format!("Failed to encode event: {err}") })
			.and_then(|text| {
				self.tx.send(Outbound::Text(text)).map_err(|_| Error::Delivery {
					message: "WebSocket writer is closed.".to_string(),
				})
			});

		Box::pin(async move { out })
	}

	fn close<'a>(&'a self) -> BoxFuture<'a, ()> {
		let _ = self.tx.send(Outbound::Close);

		Box::pin(async {})
	}
}

pub async fn handle_socket(state: AppState, conversation_id: String, socket: WebSocket) {
	let (mut sender, mut receiver) = socket.split();
	let (tx, mut rx) = mpsc::unbounded_channel::<Outbound>();
	let writer = tokio::spawn(async move {
		while let Some(outbound) = rx.recv().await {
			match outbound {
				Outbound::Text(text) =>
					if sender.send(Message::Text(text.into())).await.is_err() {
						break;
					},
				Outbound::Close => {
					let _ = sender.send(Message::Close(None)).await;

					break;
				},
			}
		}
	});
	let sink = std::sync::Arc::new(WsSink::new(tx));
	let greeting = DeliveryEvent::new(
		EventKind::ConnectionEstablished,
		conversation_id.as_str(),
		serde_json::json!({ "conversation_id": conversation_id }),
	);

	if let Err(err) = sink.send(&greeting).await {
		tracing::warn!(error = %err, conversation_id = %conversation_id, "Failed to greet socket.");

		writer.abort();

		return;
	}

	let (subscription, outcome) = state.scout.delivery.subscribe(&conversation_id, sink).await;

	tracing::info!(
		conversation_id = %conversation_id,
		replayed = outcome.replayed,
		active = outcome.active,
		"WebSocket subscribed."
	);

	if outcome.active {
		while let Some(message) = receiver.next().await {
			match message {
				Ok(Message::Close(_)) | Err(_) => break,
				Ok(_) => {},
			}
		}

		state.scout.delivery.unsubscribe(&subscription).await;
	}

	let _ = writer.await;

	tracing::info!(conversation_id = %conversation_id, "WebSocket closed.");
}

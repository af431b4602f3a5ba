//! `GET /remote/:id` — WebSocket rendezvous (C9/§5). Two clients join the
//! same room id and relay opaque messages to each other; a third is
//! rejected. The server never interprets a forwarded payload.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use idp_core::rooms::JoinOutcome;

use crate::prelude::*;

pub async fn remote(
	State(app): State<App>,
	Path(room_id): Path<Box<str>>,
	ws: WebSocketUpgrade,
) -> Response {
	ws.on_upgrade(move |socket| handle_socket(app, room_id, socket))
}

async fn handle_socket(app: App, room_id: Box<str>, socket: WebSocket) {
	let (mut sink, mut stream) = socket.split();
	let (tx, mut rx) = mpsc::unbounded_channel::<Box<str>>();

	let (outcome, peers) = app.rooms.join(&room_id, tx.clone());
	if matches!(outcome, JoinOutcome::Busy) {
		let _ = sink.send(Message::Text("busy".into())).await;
		let _ = sink.close().await;
		return;
	}

	let event = if matches!(outcome, JoinOutcome::Ready) { "ready" } else { "waiting" };
	let _ = tx.send(event.into());
	for peer in &peers {
		let _ = peer.send("ready".into());
	}

	let forward = tokio::spawn(async move {
		while let Some(message) = rx.recv().await {
			if sink.send(Message::Text(message.to_string().into())).await.is_err() {
				break;
			}
		}
	});

	while let Some(Ok(message)) = stream.next().await {
		match message {
			Message::Text(text) => app.rooms.broadcast(&room_id, &tx, &text),
			Message::Close(_) => break,
			_ => {}
		}
	}

	app.rooms.leave(&room_id, &tx);
	forward.abort();
}

// vim: ts=4

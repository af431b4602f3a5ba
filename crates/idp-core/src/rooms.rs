//! WebSocket rendezvous rooms (C9's `/remote/:id`, part of §5's shared
//! mutable state). Each room holds at most two clients; messages are
//! forwarded opaquely between them.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex as SyncMutex;
use tokio::sync::mpsc;

/// A single WebSocket client's outgoing half, as seen by the rest of its room.
pub type ClientSender = mpsc::UnboundedSender<Box<str>>;

#[derive(Default)]
struct Room {
	clients: Vec<ClientSender>,
}

/// Process-wide map of rendezvous rooms. The outer mutex guards allocation
/// and garbage collection; each room's own mutex guards its client set, so
/// one room filling up never blocks lookups into another.
#[derive(Clone, Default)]
pub struct RoomRegistry {
	rooms: Arc<SyncMutex<HashMap<Box<str>, Arc<SyncMutex<Room>>>>>,
}

/// Outcome of joining a room, broadcast to every member (including the
/// joiner for `Waiting`/`Ready`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
	Waiting,
	Ready,
	Busy,
}

impl std::fmt::Debug for RoomRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RoomRegistry").field("rooms", &self.rooms.lock().len()).finish()
	}
}

impl RoomRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `sender` in `room_id`, returning the outcome and the peer
	/// senders already present (to notify them of the new arrival). Rejects
	/// (`Busy`) without joining if the room already holds two clients.
	pub fn join(&self, room_id: &str, sender: ClientSender) -> (JoinOutcome, Vec<ClientSender>) {
		let room = {
			let mut rooms = self.rooms.lock();
			rooms.entry(room_id.into()).or_default().clone()
		};
		let mut room = room.lock();
		if room.clients.len() >= 2 {
			return (JoinOutcome::Busy, Vec::new());
		}
		let peers = room.clients.clone();
		room.clients.push(sender);
		let outcome = if room.clients.len() == 2 { JoinOutcome::Ready } else { JoinOutcome::Waiting };
		(outcome, peers)
	}

	/// Broadcasts `message` to every client in `room_id` other than `exclude`.
	pub fn broadcast(&self, room_id: &str, exclude: &ClientSender, message: &str) {
		let room = {
			let rooms = self.rooms.lock();
			rooms.get(room_id).cloned()
		};
		let Some(room) = room else { return };
		let room = room.lock();
		for client in &room.clients {
			if !client.same_channel(exclude) {
				let _ = client.send(message.into());
			}
		}
	}

	/// Removes `sender` from `room_id`; deletes the room entirely once empty.
	pub fn leave(&self, room_id: &str, sender: &ClientSender) {
		let mut rooms = self.rooms.lock();
		let Some(room) = rooms.get(room_id) else { return };
		let empty = {
			let mut room = room.lock();
			room.clients.retain(|c| !c.same_channel(sender));
			room.clients.is_empty()
		};
		if empty {
			rooms.remove(room_id);
		}
	}
}

// vim: ts=4

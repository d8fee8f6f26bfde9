//! Per-conversation fan-out of pipeline outputs to live subscribers, with a bounded replay queue
//! for events published while nobody is listening.

use std::{
	collections::{HashMap, VecDeque},
	sync::Arc,
};

use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{BoxFuture, Result};

/// Transport for one subscriber. A failed send removes the subscriber.
pub trait EventSink
where
	Self: Send + Sync,
{
	fn send<'a>(&'a self, event: &'a DeliveryEvent) -> BoxFuture<'a, Result<()>>;

	fn close<'a>(&'a self) -> BoxFuture<'a, ()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
	JudgeDecision,
	SearchResults,
	AiResponse,
	ProfileUpdate,
	ConnectionEstablished,
}

#[derive(Clone, Debug, Serialize)]
pub struct DeliveryEvent {
	pub kind: EventKind,
	pub conversation_id: String,
	pub payload: Value,
	#[serde(with = "crate::time_serde")]
	pub published_at: OffsetDateTime,
	pub replayed: bool,
}
impl DeliveryEvent {
	pub fn new(kind: EventKind, conversation_id: impl Into<String>, payload: Value) -> Self {
		Self {
			kind,
			conversation_id: conversation_id.into(),
			payload,
			published_at: OffsetDateTime::now_utc(),
			replayed: false,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subscription {
	pub id: Uuid,
	pub conversation_id: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PublishOutcome {
	pub delivered: usize,
	pub dropped: usize,
	pub queued: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SubscribeOutcome {
	pub replayed: usize,
	/// False when a replay send failed and the subscriber was dropped.
	pub active: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryStats {
	pub conversations: usize,
	pub subscribers: usize,
	pub queued_events: usize,
}

struct Subscriber {
	id: Uuid,
	sink: Arc<dyn EventSink>,
}

#[derive(Default)]
struct Channel {
	subscribers: Vec<Subscriber>,
	queue: VecDeque<DeliveryEvent>,
}
impl Channel {
	fn enqueue(&mut self, event: DeliveryEvent, capacity: usize) {
		while self.queue.len() >= capacity {
			self.queue.pop_front();
		}

		self.queue.push_back(event);
	}
}

pub struct FanOut {
	capacity: usize,
	channels: Mutex<HashMap<String, Arc<Mutex<Channel>>>>,
}
impl FanOut {
	pub fn new(replay_capacity: usize) -> Self {
		Self { capacity: replay_capacity.max(1), channels: Mutex::new(HashMap::new()) }
	}

	/// Registers a sink after replaying every queued event to it in publish order.
	pub async fn subscribe(
		&self,
		conversation_id: &str,
		sink: Arc<dyn EventSink>,
	) -> (Subscription, SubscribeOutcome) {
		let subscription =
			Subscription { id: Uuid::new_v4(), conversation_id: conversation_id.to_string() };
		let channel = self.channel(conversation_id).await;
		let mut channel = channel.lock().await;
		let mut replayed = 0;

		while let Some(event) = channel.queue.front() {
			let mut event = event.clone();

			event.replayed = true;

			if let Err(err) = sink.send(&event).await {
				tracing::warn!(
					error = %err,
					conversation_id,
					remaining = channel.queue.len(),
					"Replay send failed. Dropping subscriber."
				);

				sink.close().await;

				return (subscription, SubscribeOutcome { replayed, active: false });
			}

			channel.queue.pop_front();

			replayed += 1;
		}

		channel.subscribers.push(Subscriber { id: subscription.id, sink });

		tracing::debug!(
			conversation_id,
			replayed,
			subscribers = channel.subscribers.len(),
			"Subscriber registered."
		);

		(subscription, SubscribeOutcome { replayed, active: true })
	}

	/// Sends an event to every live subscriber, or queues it when none remain.
	pub async fn publish(&self, event: DeliveryEvent) -> PublishOutcome {
		let channel = self.channel(&event.conversation_id).await;
		let mut channel = channel.lock().await;
		let mut outcome = PublishOutcome::default();
		let mut index = 0;

		while index < channel.subscribers.len() {
			let sink = channel.subscribers[index].sink.clone();

			match sink.send(&event).await {
				Ok(()) => {
					outcome.delivered += 1;
					index += 1;
				},
				Err(err) => {
					let dead = channel.subscribers.remove(index);

					tracing::warn!(
						error = %err,
						conversation_id = %event.conversation_id,
						subscription_id = %dead.id,
						"Subscriber send failed. Removing subscriber."
					);

					dead.sink.close().await;

					outcome.dropped += 1;
				},
			}
		}

		if channel.subscribers.is_empty() {
			tracing::debug!(
				conversation_id = %event.conversation_id,
				kind = ?event.kind,
				queued = channel.queue.len() + 1,
				"No live subscribers. Queueing event."
			);

			channel.enqueue(event, self.capacity);

			outcome.queued = true;
		}

		outcome
	}

	/// Removes and closes the subscription's sink. Repeated calls are no-ops.
	pub async fn unsubscribe(&self, subscription: &Subscription) -> bool {
		let Some(channel) = self.existing_channel(&subscription.conversation_id).await else {
			return false;
		};
		let removed = {
			let mut channel = channel.lock().await;
			let Some(position) =
				channel.subscribers.iter().position(|s| s.id == subscription.id)
			else {
				return false;
			};

			channel.subscribers.remove(position)
		};

		drop(channel);
		removed.sink.close().await;
		self.release_if_idle(&subscription.conversation_id).await;

		true
	}

	pub async fn stats(&self) -> DeliveryStats {
		let channels: Vec<Arc<Mutex<Channel>>> =
			self.channels.lock().await.values().cloned().collect();
		let mut stats = DeliveryStats { conversations: channels.len(), ..Default::default() };

		for channel in channels {
			let channel = channel.lock().await;

			stats.subscribers += channel.subscribers.len();
			stats.queued_events += channel.queue.len();
		}

		stats
	}

	pub async fn conversation_stats(&self, conversation_id: &str) -> DeliveryStats {
		let Some(channel) = self.existing_channel(conversation_id).await else {
			return DeliveryStats::default();
		};
		let channel = channel.lock().await;

		DeliveryStats {
			conversations: 1,
			subscribers: channel.subscribers.len(),
			queued_events: channel.queue.len(),
		}
	}

	async fn channel(&self, conversation_id: &str) -> Arc<Mutex<Channel>> {
		self.channels.lock().await.entry(conversation_id.to_string()).or_default().clone()
	}

	// Handles are only cloned under the map lock, so a count of one means no task is about to use
	// the channel.
	async fn release_if_idle(&self, conversation_id: &str) {
		let mut channels = self.channels.lock().await;
		let idle = channels.get(conversation_id).is_some_and(|channel| {
			Arc::strong_count(channel) == 1
				&& channel
					.try_lock()
					.is_ok_and(|channel| channel.subscribers.is_empty() && channel.queue.is_empty())
		});

		if idle {
			channels.remove(conversation_id);

			tracing::debug!(conversation_id, "Released idle delivery channel.");
		}
	}

	async fn existing_channel(&self, conversation_id: &str) -> Option<Arc<Mutex<Channel>>> {
		self.channels.lock().await.get(conversation_id).cloned()
	}
}

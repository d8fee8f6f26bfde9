use std::sync::Arc;

use scout_service::{DeliveryEvent, EventKind, FanOut};

use super::{FlakySink, RecordingSink};

fn event(conversation_id: &str, seq: u64) -> DeliveryEvent {
	DeliveryEvent::new(EventKind::AiResponse, conversation_id, serde_json::json!({ "seq": seq }))
}

fn seqs(events: &[DeliveryEvent]) -> Vec<u64> {
	events.iter().filter_map(|event| event.payload["seq"].as_u64()).collect()
}

#[tokio::test]
async fn queued_events_replay_in_order_then_clear_once() {
	let fanout = FanOut::new(100);

	for seq in 1..=3 {
		let outcome = fanout.publish(event("conv-1", seq)).await;

		assert!(outcome.queued);
		assert_eq!(outcome.delivered, 0);
	}

	let first = RecordingSink::default();
	let (_, outcome) = fanout.subscribe("conv-1", Arc::new(first.clone())).await;

	assert_eq!(outcome.replayed, 3);
	assert!(outcome.active);
	assert_eq!(seqs(&first.events()), vec![1, 2, 3]);
	assert!(first.events().iter().all(|event| event.replayed));
	assert_eq!(fanout.conversation_stats("conv-1").await.queued_events, 0);

	let second = RecordingSink::default();
	let (_, outcome) = fanout.subscribe("conv-1", Arc::new(second.clone())).await;

	assert_eq!(outcome.replayed, 0);
	assert!(second.events().is_empty());

	let live = fanout.publish(event("conv-1", 4)).await;

	assert_eq!(live.delivered, 2);
	assert!(!live.queued);
	assert_eq!(seqs(&first.events()), vec![1, 2, 3, 4]);
	assert!(!first.events()[3].replayed);
}

#[tokio::test]
async fn replay_failure_drops_subscriber_and_keeps_remainder() {
	let fanout = FanOut::new(100);

	for seq in 1..=3 {
		fanout.publish(event("conv-2", seq)).await;
	}

	let flaky = FlakySink::new(1);
	let (_, outcome) = fanout.subscribe("conv-2", Arc::new(flaky.clone())).await;

	assert_eq!(outcome.replayed, 1);
	assert!(!outcome.active);
	assert_eq!(flaky.closed(), 1);

	let stats = fanout.conversation_stats("conv-2").await;

	assert_eq!(stats.subscribers, 0);
	assert_eq!(stats.queued_events, 2);

	let sink = RecordingSink::default();
	let (_, outcome) = fanout.subscribe("conv-2", Arc::new(sink.clone())).await;

	assert_eq!(outcome.replayed, 2);
	assert_eq!(seqs(&sink.events()), vec![2, 3]);
}

#[tokio::test]
async fn failed_send_removes_only_that_subscriber() {
	let fanout = FanOut::new(100);
	let dead = FlakySink::new(0);
	let live = RecordingSink::default();

	fanout.subscribe("conv-3", Arc::new(dead.clone())).await;
	fanout.subscribe("conv-3", Arc::new(live.clone())).await;

	let outcome = fanout.publish(event("conv-3", 1)).await;

	assert_eq!(outcome.delivered, 1);
	assert_eq!(outcome.dropped, 1);
	assert!(!outcome.queued);
	assert_eq!(dead.closed(), 1);
	assert_eq!(seqs(&live.events()), vec![1]);
	assert_eq!(fanout.conversation_stats("conv-3").await.subscribers, 1);
}

#[tokio::test]
async fn event_is_queued_when_every_subscriber_fails() {
	let fanout = FanOut::new(100);

	fanout.subscribe("conv-4", Arc::new(FlakySink::new(0))).await;
	fanout.subscribe("conv-4", Arc::new(FlakySink::new(0))).await;

	let outcome = fanout.publish(event("conv-4", 1)).await;

	assert_eq!(outcome.dropped, 2);
	assert!(outcome.queued);

	let sink = RecordingSink::default();
	let (_, outcome) = fanout.subscribe("conv-4", Arc::new(sink.clone())).await;

	assert_eq!(outcome.replayed, 1);
	assert_eq!(seqs(&sink.events()), vec![1]);
}

#[tokio::test]
async fn replay_queue_evicts_oldest_beyond_capacity() {
	let fanout = FanOut::new(2);

	for seq in 1..=3 {
		fanout.publish(event("conv-5", seq)).await;
	}

	let sink = RecordingSink::default();

	fanout.subscribe("conv-5", Arc::new(sink.clone())).await;

	assert_eq!(seqs(&sink.events()), vec![2, 3]);
}

#[tokio::test]
async fn unsubscribe_is_idempotent_and_closes_once() {
	let fanout = FanOut::new(100);
	let sink = RecordingSink::default();
	let (subscription, _) = fanout.subscribe("conv-6", Arc::new(sink.clone())).await;

	assert!(fanout.unsubscribe(&subscription).await);
	assert!(!fanout.unsubscribe(&subscription).await);
	assert_eq!(sink.closed(), 1);

	let outcome = fanout.publish(event("conv-6", 1)).await;

	assert!(outcome.queued);
	assert!(sink.events().is_empty());
}

#[tokio::test]
async fn conversations_are_isolated() {
	let fanout = FanOut::new(100);
	let sink = RecordingSink::default();

	fanout.subscribe("conv-7", Arc::new(sink.clone())).await;
	fanout.publish(event("conv-8", 1)).await;

	assert!(sink.events().is_empty());

	let stats = fanout.stats().await;

	assert_eq!(stats.conversations, 2);
	assert_eq!(stats.subscribers, 1);
	assert_eq!(stats.queued_events, 1);
}

#[tokio::test]
async fn idle_conversations_are_released_after_unsubscribe() {
	let fanout = FanOut::new(100);

	for n in 0..50 {
		let (subscription, _) =
			fanout.subscribe(&format!("conv-idle-{n}"), Arc::new(RecordingSink::default())).await;

		fanout.unsubscribe(&subscription).await;
	}

	assert_eq!(fanout.stats().await.conversations, 0);

	let (subscription, _) =
		fanout.subscribe("conv-9", Arc::new(RecordingSink::default())).await;
	let (other, _) = fanout.subscribe("conv-9", Arc::new(RecordingSink::default())).await;

	fanout.unsubscribe(&subscription).await;

	assert_eq!(fanout.stats().await.conversations, 1);

	fanout.unsubscribe(&other).await;
	fanout.publish(event("conv-9", 1)).await;

	let stats = fanout.stats().await;

	assert_eq!(stats.conversations, 1);
	assert_eq!(stats.queued_events, 1);

	let sink = RecordingSink::default();
	let (late, outcome) = fanout.subscribe("conv-9", Arc::new(sink.clone())).await;

	assert_eq!(outcome.replayed, 1);

	fanout.unsubscribe(&late).await;

	assert_eq!(fanout.stats().await, scout_service::delivery::DeliveryStats::default());
}

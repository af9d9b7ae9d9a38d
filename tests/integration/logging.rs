//! Logging integration tests
//!
//! Captures tracing events in memory and checks what the store and query
//! layers report.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use herd::foundation::{Entity, EntityId};
use herd::query::QueryEntity;
use herd::storage::{EntityStore, StoreConfig};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

// =============================================================================
// Capture Layer
// =============================================================================

#[derive(Clone, Debug)]
struct Captured {
    level: Level,
    fields: HashMap<String, String>,
}

impl Captured {
    fn message(&self) -> &str {
        self.fields.get("message").map_or("", String::as_str)
    }

    fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

#[derive(Default)]
struct FieldVisitor {
    fields: HashMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.fields.insert(field.name().to_string(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }
}

#[derive(Clone, Default)]
struct CaptureLayer {
    events: Arc<Mutex<Vec<Captured>>>,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let captured = Captured {
            level: *event.metadata().level(),
            fields: visitor.fields,
        };
        if let Ok(mut events) = self.events.lock() {
            events.push(captured);
        }
    }
}

fn capture(body: impl FnOnce()) -> Vec<Captured> {
    let layer = CaptureLayer::default();
    let events = layer.events.clone();
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, body);
    events.lock().map(|e| e.clone()).unwrap_or_default()
}

// =============================================================================
// Fixture
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
struct Card {
    id: i64,
    lane: &'static str,
}

impl Entity for Card {
    fn id(&self) -> EntityId {
        EntityId::from(self.id)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn published_snapshots_are_logged_at_debug() {
    let events = capture(|| {
        let store = EntityStore::new(StoreConfig::named("board"));
        store.set(vec![Card { id: 1, lane: "todo" }, Card { id: 2, lane: "doing" }]);
    });

    let published: Vec<_> = events
        .iter()
        .filter(|e| e.message() == "published snapshot")
        .collect();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].level, Level::DEBUG);
    assert_eq!(published[0].field("store"), Some("board"));
    assert_eq!(published[0].field("action"), Some("set"));
    assert_eq!(published[0].field("count"), Some("2"));
}

#[test]
fn no_ops_are_logged_at_trace() {
    let events = capture(|| {
        let store: EntityStore<Card> = EntityStore::new(StoreConfig::named("board"));
        store.remove(9);
    });

    assert!(
        events
            .iter()
            .any(|e| e.level == Level::TRACE && e.field("action") == Some("remove"))
    );
    assert!(!events.iter().any(|e| e.message() == "published snapshot"));
}

#[test]
fn id_changing_patch_is_logged_at_warn() {
    let events = capture(|| {
        let store = EntityStore::new(StoreConfig::named("board"));
        store.add(Card { id: 1, lane: "todo" });
        store.update(1, |card| card.id = 2);
    });

    let warning = events
        .iter()
        .find(|e| e.level == Level::WARN)
        .expect("warn event");
    assert_eq!(warning.field("id"), Some("1"));
    assert_eq!(warning.field("patched_id"), Some("2"));
}

#[test]
fn ignored_active_id_is_logged_at_debug() {
    let events = capture(|| {
        let store: EntityStore<Card> = EntityStore::new(StoreConfig::named("board"));
        store.set_active(5);
    });

    assert!(
        events
            .iter()
            .any(|e| e.level == Level::DEBUG && e.message() == "ignored unknown active id")
    );
}

#[test]
fn missing_active_entity_is_logged() {
    let events = capture(|| {
        let store: EntityStore<Card> = EntityStore::new(StoreConfig::named("board"));
        let query = QueryEntity::new(&store);
        assert!(query.select_active().is_err());
    });

    let event = events
        .iter()
        .find(|e| e.message() == "no active entity")
        .expect("debug event");
    assert_eq!(event.field("operation"), Some("select_active"));
}

#[test]
fn select_many_flush_is_traced() {
    let events = capture(|| {
        let store: EntityStore<Card> = EntityStore::new(StoreConfig::named("board"));
        let query = QueryEntity::new(&store);
        let _sub = query
            .select_many([1], &herd::query::SelectOptions::new())
            .subscribe(|_| {});
        store.add(Card { id: 1, lane: "todo" });
        query.turns().run_until_idle();
    });

    let flushes: Vec<_> = events
        .iter()
        .filter(|e| e.message() == "select_many flushed")
        .collect();
    assert_eq!(flushes.len(), 1);
    assert_eq!(flushes[0].field("count"), Some("1"));
}

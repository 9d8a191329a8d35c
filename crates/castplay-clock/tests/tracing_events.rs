#![forbid(unsafe_code)]

//! Structured log events emitted by the clock.
//!
//! A capturing layer records every event with its fields; the assertions
//! check that transitions are logged once with the fields operators filter
//! on.
//!
//! Run:
//!   cargo test -p castplay-clock --test tracing_events

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use castplay_clock::{ManualTicker, PlaybackClock};
use tracing_subscriber::layer::SubscriberExt;

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
    fields: HashMap<String, String>,
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let fields: HashMap<String, String> = visitor.0.into_iter().collect();
        let message = fields.get("message").cloned().unwrap_or_default();
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message,
            fields,
        });
    }
}

fn capture<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = EventCapture {
        events: Arc::clone(&events),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    captured
}

fn messages(events: &[CapturedEvent], message: &str) -> Vec<CapturedEvent> {
    events
        .iter()
        .filter(|e| e.message == message)
        .cloned()
        .collect()
}

#[test]
fn transitions_are_logged_once() {
    let events = capture(|| {
        let clock = PlaybackClock::new(Box::new(ManualTicker::new(1)));
        clock.start();
        clock.start();
        clock.pause();
        clock.stop();
        clock.stop();
    });
    assert_eq!(messages(&events, "Clock started").len(), 1);
    assert_eq!(messages(&events, "Clock paused").len(), 1);
    assert_eq!(messages(&events, "Clock stopped").len(), 1);
}

#[test]
fn reaching_duration_logs_clamped_time() {
    let events = capture(|| {
        let ticker = ManualTicker::new(1);
        let clock = PlaybackClock::with_duration(Box::new(ticker.clone()), 2.5).unwrap();
        clock.start();
        ticker.tick_n(5);
    });
    let reached = messages(&events, "Clock reached duration");
    assert_eq!(reached.len(), 1);
    assert_eq!(reached[0].level, tracing::Level::DEBUG);
    assert_eq!(reached[0].fields.get("time").map(String::as_str), Some("2.5"));
}

#[test]
fn timescale_change_carries_value() {
    let events = capture(|| {
        let clock = PlaybackClock::new(Box::new(ManualTicker::new(1)));
        clock.set_timescale(1.5).unwrap();
        assert!(clock.set_timescale(-1.0).is_err());
    });
    let changed = messages(&events, "Clock timescale changed");
    assert_eq!(changed.len(), 1);
    assert_eq!(
        changed[0].fields.get("timescale").map(String::as_str),
        Some("1.5")
    );
}

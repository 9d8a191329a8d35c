//! Property-based tests for player screen reconstruction.
//!
//! 1. `screen_at(t)` equals the concatenation of every event at or before `t`
//! 2. `changes_since(a, b)` equals the events in `(a, b]`
//! 3. `screen_at(a) + changes_since(a, b) == screen_at(b)`

use castplay::{Cast, CastEvent, CastHeader, ManualTicker, Player, PlayerConfig};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

/// Strictly increasing event times in milliseconds, with short payloads.
fn events_strategy() -> impl Strategy<Value = Vec<CastEvent>> {
    prop::collection::vec((1u32..500, "[a-z]{1,3}"), 1..60).prop_map(|items| {
        let mut at_ms = 0u32;
        items
            .into_iter()
            .enumerate()
            .map(|(i, (gap, data))| {
                if i > 0 {
                    at_ms += gap;
                }
                CastEvent::new(f64::from(at_ms) / 1000.0, data)
            })
            .collect()
    })
}

fn replay(events: &[CastEvent], after: f64, until: f64) -> String {
    events
        .iter()
        .filter(|e| e.time > after && e.time <= until)
        .map(|e| e.data.as_str())
        .collect()
}

fn player_config(step: usize) -> PlayerConfig {
    PlayerConfig {
        frame_events_step: step,
        ..PlayerConfig::default()
    }
}

proptest! {
    #[test]
    fn screen_matches_linear_replay(
        events in events_strategy(),
        step in 1usize..12,
        queries in prop::collection::vec(0u32..40_000, 1..20),
    ) {
        let cast = Cast::from_events(CastHeader::default(), events.clone());
        let player = Player::new(&cast, Box::new(ManualTicker::new(1)), &player_config(step)).unwrap();
        for q in queries {
            let t = f64::from(q) / 1000.0;
            prop_assert_eq!(
                player.screen_at(t).unwrap(),
                replay(&events, f64::NEG_INFINITY, t),
                "t={}", t
            );
        }
    }

    #[test]
    fn changes_extend_the_earlier_screen(
        events in events_strategy(),
        step in 1usize..12,
        a in 0u32..40_000,
        b in 0u32..40_000,
    ) {
        let (from, to) = (f64::from(a.min(b)) / 1000.0, f64::from(a.max(b)) / 1000.0);
        let cast = Cast::from_events(CastHeader::default(), events.clone());
        let player = Player::new(&cast, Box::new(ManualTicker::new(1)), &player_config(step)).unwrap();

        let changes = player.changes_since(from, to).unwrap();
        prop_assert_eq!(&changes, &replay(&events, from, to));

        let mut screen = player.screen_at(from).unwrap();
        screen.push_str(&changes);
        prop_assert_eq!(screen, player.screen_at(to).unwrap());
    }
}

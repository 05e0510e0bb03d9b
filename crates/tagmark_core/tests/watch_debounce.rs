use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use tagmark_core::{watch_update, WatchEffect, WatchMsg, WatchPhase, WatchState};

const WINDOW: Duration = Duration::from_millis(100);

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn insert(
    state: WatchState<u32>,
    nodes: &[u32],
    at: Instant,
) -> (WatchState<u32>, Vec<WatchEffect<u32>>) {
    watch_update(
        state,
        WatchMsg::Inserted {
            nodes: nodes.to_vec(),
            at,
        },
    )
}

#[test]
fn three_bursts_collapse_into_one_pass_after_last() {
    let t0 = Instant::now();
    let state = WatchState::new(WINDOW);

    let (state, _) = insert(state, &[1], t0);
    let (state, _) = insert(state, &[2, 3], t0 + ms(20));
    let (state, effects) = insert(state, &[3, 4], t0 + ms(40));
    assert_eq!(
        effects,
        vec![WatchEffect::ArmTimer {
            deadline: t0 + ms(140)
        }]
    );

    // The timer armed by the first burst is stale by now.
    let (state, effects) = watch_update(state, WatchMsg::TimerFired { at: t0 + ms(100) });
    assert!(effects.is_empty());

    let (state, effects) = watch_update(state, WatchMsg::TimerFired { at: t0 + ms(140) });
    assert_eq!(
        effects,
        vec![WatchEffect::RunPass {
            roots: vec![1, 2, 3, 4]
        }]
    );
    assert_eq!(state.phase(), WatchPhase::Idle);
    assert!(state.is_in_flight());

    let (state, effects) = watch_update(state, WatchMsg::TimerFired { at: t0 + ms(300) });
    assert!(effects.is_empty());
    let (state, _) = watch_update(state, WatchMsg::PassFinished);
    assert!(!state.is_in_flight());
}

#[test]
fn insertions_during_pass_are_dropped_not_queued() {
    let t0 = Instant::now();
    let (state, _) = insert(WatchState::new(WINDOW), &[1], t0);
    let (state, _) = watch_update(state, WatchMsg::TimerFired { at: t0 + ms(100) });
    assert!(state.is_in_flight());

    let (state, effects) = insert(state, &[7, 8], t0 + ms(110));
    assert!(effects.is_empty());
    assert_eq!(state.dropped(), 2);
    assert!(state.pending().is_empty());

    let (state, _) = watch_update(state, WatchMsg::PassFinished);
    let (state, effects) = insert(state, &[9], t0 + ms(200));
    assert_eq!(
        effects,
        vec![WatchEffect::ArmTimer {
            deadline: t0 + ms(300)
        }]
    );
    assert_eq!(state.pending(), &[9]);
}

#[test]
fn empty_insertions_do_not_arm() {
    let (state, effects) = insert(WatchState::new(WINDOW), &[], Instant::now());
    assert!(effects.is_empty());
    assert_eq!(state.phase(), WatchPhase::Idle);
}

#[test]
fn reset_discards_pending_window() {
    let t0 = Instant::now();
    let (mut state, _) = insert(WatchState::new(WINDOW), &[1, 2], t0);
    state.reset();
    assert_eq!(state.deadline(), None);

    let (_, effects) = watch_update(state, WatchMsg::TimerFired { at: t0 + ms(500) });
    assert!(effects.is_empty());
}

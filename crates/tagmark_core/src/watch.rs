//! Debounce state machine for subtree insertions.
//!
//! Insertions arm (or re-arm) a timer; when the timer fires after the window
//! has elapsed the collected nodes are handed out as one pass. While that pass
//! is in flight further insertions are dropped, not queued.

use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchPhase {
    #[default]
    Idle,
    Pending {
        deadline: Instant,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchState<N> {
    phase: WatchPhase,
    window: Duration,
    pending: Vec<N>,
    in_flight: bool,
    dropped: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchMsg<N> {
    /// One observation callback worth of inserted element nodes.
    Inserted { nodes: Vec<N>, at: Instant },
    /// The debounce timer elapsed.
    TimerFired { at: Instant },
    /// The annotation pass started by `RunPass` completed.
    PassFinished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEffect<N> {
    /// (Re)start the single debounce timer.
    ArmTimer { deadline: Instant },
    /// Annotate these subtree roots.
    RunPass { roots: Vec<N> },
}

impl<N> WatchState<N> {
    pub fn new(window: Duration) -> Self {
        Self {
            phase: WatchPhase::Idle,
            window,
            pending: Vec::new(),
            in_flight: false,
            dropped: 0,
        }
    }

    pub fn phase(&self) -> WatchPhase {
        self.phase
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.phase {
            WatchPhase::Pending { deadline } => Some(deadline),
            WatchPhase::Idle => None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn pending(&self) -> &[N] {
        &self.pending
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Number of inserted nodes ignored because a pass was in flight.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Forgets any pending window; used when the page session is disposed.
    pub fn reset(&mut self) {
        self.phase = WatchPhase::Idle;
        self.pending.clear();
        self.in_flight = false;
    }
}

impl<N> Default for WatchState<N> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

/// Pure transition function for the debounce state machine.
pub fn watch_update<N: PartialEq>(
    mut state: WatchState<N>,
    msg: WatchMsg<N>,
) -> (WatchState<N>, Vec<WatchEffect<N>>) {
    let effects = match msg {
        WatchMsg::Inserted { nodes, at } => {
            if nodes.is_empty() {
                return (state, Vec::new());
            }
            if state.in_flight {
                state.dropped += nodes.len() as u64;
                return (state, Vec::new());
            }
            for node in nodes {
                if !state.pending.contains(&node) {
                    state.pending.push(node);
                }
            }
            let deadline = at + state.window;
            state.phase = WatchPhase::Pending { deadline };
            vec![WatchEffect::ArmTimer { deadline }]
        }
        WatchMsg::TimerFired { at } => match state.phase {
            WatchPhase::Pending { deadline } if at >= deadline && !state.in_flight => {
                state.phase = WatchPhase::Idle;
                state.in_flight = true;
                let roots = std::mem::take(&mut state.pending);
                vec![WatchEffect::RunPass { roots }]
            }
            _ => Vec::new(),
        },
        WatchMsg::PassFinished => {
            state.in_flight = false;
            Vec::new()
        }
    };

    (state, effects)
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tap / double-tap / long-press disambiguation
//!
//! Built on the two raw controller events (`selectstart`, `selectend`) plus a
//! per-frame [`GestureRecognizer::poll`] that stands in for the long-press
//! timer. Time comes from a [`Clock`] so the recognizer can be driven
//! deterministically.
//!
//! ```text
//! idle --start--> armed(deadline) --end before deadline--> SingleTap
//!   |                  |
//!   |                  +--poll/end at or after deadline--> LongPress
//!   +--start within double-tap window of previous start--> DoubleTap
//! ```
//!
//! A double tap therefore reports `SingleTap` for the first press and
//! `DoubleTap` when the second press starts.

use std::cell::Cell;

/// Source of monotonic time in milliseconds
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Clock advanced by hand (tests, replay)
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now_ms(&self) -> f64 {
        (**self).now_ms()
    }
}

/// Recognized user intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    SingleTap,
    DoubleTap,
    LongPress,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PressState {
    Idle,
    /// Press in progress; becomes a long press at `deadline`
    Armed { deadline: f64 },
}

/// Timer-driven gesture state machine
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    long_press_ms: f64,
    double_tap_ms: f64,
    state: PressState,
    last_start: Option<f64>,
}

impl GestureRecognizer {
    pub fn new(long_press_ms: f64, double_tap_ms: f64) -> Self {
        Self {
            long_press_ms,
            double_tap_ms,
            state: PressState::Idle,
            last_start: None,
        }
    }

    /// Whether a press is waiting on its long-press deadline
    pub fn is_armed(&self) -> bool {
        matches!(self.state, PressState::Armed { .. })
    }

    pub fn select_start(&mut self, now: f64) -> Option<Gesture> {
        let is_double = self
            .last_start
            .is_some_and(|last| now - last < self.double_tap_ms);
        self.last_start = Some(now);

        if is_double {
            self.state = PressState::Idle;
            return Some(Gesture::DoubleTap);
        }

        self.state = PressState::Armed {
            deadline: now + self.long_press_ms,
        };
        None
    }

    pub fn select_end(&mut self, now: f64) -> Option<Gesture> {
        match self.state {
            PressState::Armed { deadline } => {
                self.state = PressState::Idle;
                if now >= deadline {
                    Some(Gesture::LongPress)
                } else {
                    Some(Gesture::SingleTap)
                }
            }
            PressState::Idle => None,
        }
    }

    /// Fire the long press once its deadline has passed
    pub fn poll(&mut self, now: f64) -> Option<Gesture> {
        match self.state {
            PressState::Armed { deadline } if now >= deadline => {
                self.state = PressState::Idle;
                Some(Gesture::LongPress)
            }
            _ => None,
        }
    }

    /// Drop any pending press (session end)
    pub fn reset(&mut self) {
        self.state = PressState::Idle;
        self.last_start = None;
    }
}

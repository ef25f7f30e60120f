//! # Stochastic Timer
//!
//! Per-frame Poisson trigger used to schedule spawns.
//!
//! Each poll asks: given a constant per-unit-time `rate`, did at least one event
//! happen since the previous poll? The survival probability over an interval of
//! length `dt` is `(1 - rate) ^ dt`; the timer fires when a uniform draw lands
//! above it. The window restarts on every poll, fired or not, so irregular frame
//! lengths are handled without accumulating state.

use crate::{LetterfallError, LetterfallResult};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Poisson-approximating event trigger.
///
/// # Examples
///
/// ```
/// use letterfall::StochasticTimer;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let mut timer = StochasticTimer::new(1.0).unwrap();
/// assert!(!timer.poll(0.0, &mut rng).unwrap()); // first poll only starts the clock
/// assert!(timer.poll(0.5, &mut rng).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StochasticTimer {
    rate: f64,
    last_poll: Option<f64>,
}

impl StochasticTimer {
    /// Creates a timer with the given rate in `[0, 1]`.
    pub fn new(rate: f64) -> LetterfallResult<Self> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(LetterfallError::InvalidRate(rate));
        }
        Ok(Self {
            rate,
            last_poll: None,
        })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Time of the most recent poll, if any.
    pub fn last_poll(&self) -> Option<f64> {
        self.last_poll
    }

    /// Forgets the last poll time; the next poll starts a fresh window.
    pub fn reset(&mut self) {
        self.last_poll = None;
    }

    /// Probability that no event occurs in an interval of length `dt`.
    pub fn survival_probability(&self, dt: f64) -> f64 {
        (1.0 - self.rate).powf(dt)
    }

    /// Reports whether an event fired since the previous poll.
    ///
    /// The first poll after construction or [`reset`](Self::reset) records the
    /// time and returns false. A `now` earlier than the previous poll is an
    /// error and leaves the timer unchanged.
    pub fn poll<R: Rng + ?Sized>(&mut self, now: f64, rng: &mut R) -> LetterfallResult<bool> {
        let last = match self.last_poll {
            None => {
                self.last_poll = Some(now);
                return Ok(false);
            }
            Some(last) => last,
        };

        let dt = now - last;
        if dt < 0.0 || dt.is_nan() {
            return Err(LetterfallError::ClockWentBackwards { last, current: now });
        }

        self.last_poll = Some(now);
        let survival = self.survival_probability(dt);
        let draw: f64 = rng.gen();
        Ok(survival < draw)
    }
}

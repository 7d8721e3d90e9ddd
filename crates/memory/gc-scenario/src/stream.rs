//! Composable per-cycle signal sources
//!
//! A [`Stream`] yields one sample per call. Generators describe each
//! workload dimension as a small expression of streams, e.g. a growth rate
//! that settles from 2.0 to 1.0 over eight cycles with a little noise:
//!
//! ```
//! use gc_scenario::stream::{Stream, shared_rng};
//!
//! let rng = shared_rng(1);
//! let mut growth = Stream::constant(2.0).mix([Stream::ramp(-1.0, 8), Stream::random(0.01, &rng)]);
//! let first = growth.sample();
//! assert!((first - 2.0).abs() <= 0.01);
//! ```

use std::cell::RefCell;
use std::f64::consts::PI;
use std::fmt;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random source shared by every noisy stream of one generated scenario
pub type SharedRng = Rc<RefCell<StdRng>>;

/// Create a seeded [`SharedRng`]
pub fn shared_rng(seed: u64) -> SharedRng {
    Rc::new(RefCell::new(StdRng::seed_from_u64(seed)))
}

/// Stateful source of `f64` samples
///
/// Streams are infinite; the [`Iterator`] impl never returns `None`.
pub struct Stream {
    next: Box<dyn FnMut() -> f64>,
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream").finish_non_exhaustive()
    }
}

impl Stream {
    /// Wrap a sample function
    pub fn from_fn(next: impl FnMut() -> f64 + 'static) -> Self {
        Self {
            next: Box::new(next),
        }
    }

    /// Produce the next sample
    pub fn sample(&mut self) -> f64 {
        (self.next)()
    }

    /// Always `value`
    pub fn constant(value: f64) -> Self {
        Self::from_fn(move || value)
    }

    /// `amp` once, then zero forever
    pub fn unit(amp: f64) -> Self {
        let mut dropped = false;
        Self::from_fn(move || {
            if dropped {
                return 0.0;
            }
            dropped = true;
            amp
        })
    }

    /// Sine wave of amplitude `amp` repeating every `period` samples
    pub fn oscillate(amp: f64, phase: f64, period: usize) -> Self {
        let mut cycle = 0usize;
        Self::from_fn(move || {
            let p = cycle as f64 / period as f64 * 2.0 * PI + phase;
            cycle += 1;
            if cycle == period {
                cycle = 0;
            }
            p.sin() * amp
        })
    }

    /// Linear climb from 0 to `height` over `len` samples, then flat
    pub fn ramp(height: f64, len: usize) -> Self {
        let mut cycle = 0usize;
        Self::from_fn(move || {
            let h = height * cycle as f64 / len as f64;
            if cycle < len {
                cycle += 1;
            }
            h
        })
    }

    /// Uniform noise in `[-amp, amp)`
    pub fn random(amp: f64, rng: &SharedRng) -> Self {
        let rng = Rc::clone(rng);
        Self::from_fn(move || {
            let u: f64 = rng.borrow_mut().r#gen();
            ((u - 0.5) * 2.0) * amp
        })
    }

    /// Shift by `cycles` samples, emitting zeros until the buffer fills
    ///
    /// A zero delay returns the stream unchanged.
    pub fn delay(mut self, cycles: usize) -> Self {
        if cycles == 0 {
            return self;
        }
        let mut buf = Vec::with_capacity(cycles);
        let mut next = 0usize;
        Self::from_fn(move || {
            let old = self.sample();
            if buf.len() < cycles {
                buf.push(old);
                return 0.0;
            }
            let res = std::mem::replace(&mut buf[next], old);
            next = (next + 1) % cycles;
            res
        })
    }

    /// Multiply by another stream, sample by sample
    pub fn vga(mut self, mut gain: Stream) -> Self {
        Self::from_fn(move || self.sample() * gain.sample())
    }

    /// Multiply by a constant
    pub fn scale(self, amount: f64) -> Self {
        self.vga(Self::constant(amount))
    }

    /// Add a constant
    pub fn offset(mut self, amount: f64) -> Self {
        Self::from_fn(move || self.sample() + amount)
    }

    /// Add other streams, sample by sample
    pub fn mix(mut self, others: impl IntoIterator<Item = Stream>) -> Self {
        let mut others: Vec<Stream> = others.into_iter().collect();
        Self::from_fn(move || {
            others
                .iter_mut()
                .fold(self.sample(), |sum, stream| sum + stream.sample())
        })
    }

    /// Round toward zero to a multiple of `mult`
    pub fn quantize(mut self, mult: f64) -> Self {
        Self::from_fn(move || {
            let r = self.sample() / mult;
            if r < 0.0 {
                r.ceil() * mult
            } else {
                r.floor() * mult
            }
        })
    }

    /// Clamp from below
    pub fn at_least(mut self, min: f64) -> Self {
        Self::from_fn(move || self.sample().max(min))
    }

    /// Clamp into `[min, max]`
    pub fn limit(mut self, min: f64, max: f64) -> Self {
        Self::from_fn(move || {
            let v = self.sample();
            if v < min {
                min
            } else if v > max {
                max
            } else {
                v
            }
        })
    }
}

impl Iterator for Stream {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.sample())
    }
}

//! Feedback controllers
//!
//! The controlled pacer corrects its extra-growth ratio once per cycle by
//! feeding the ratio it used and the ratio it measured into a
//! [`FeedbackController`]. The stock implementation is a PI controller with
//! back-calculation anti-windup.

use serde::{Deserialize, Serialize};

use crate::{PacerError, PacerResult};

/// Single-operation controller contract
///
/// Implementations carry their own accumulated state; calls must arrive in
/// sample order.
pub trait FeedbackController {
    /// Compute the correction for one sample period
    fn next(&mut self, input: f64, setpoint: f64) -> f64;
}

/// PI controller tuning
///
/// Field names follow the controller configuration file format. Fields
/// missing from a file keep their default tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PiConfig {
    /// Proportional gain
    #[serde(rename = "k_p")]
    pub kp: f64,

    /// Integral time; zero disables integral action
    #[serde(rename = "t_i")]
    pub ti: f64,

    /// Anti-windup tracking time; zero disables integral action
    #[serde(rename = "t_t")]
    pub tt: f64,

    /// Sample period
    pub period: f64,

    /// Lower output bound
    pub min: f64,

    /// Upper output bound
    pub max: f64,
}

impl Default for PiConfig {
    fn default() -> Self {
        Self {
            kp: 0.9,
            ti: 1.6,
            tt: 1000.0,
            period: 1.0,
            min: -2.0,
            max: 2.0,
        }
    }
}

impl PiConfig {
    /// Whether the integral term participates at all
    pub fn has_integral(&self) -> bool {
        self.ti != 0.0 && self.tt != 0.0
    }

    /// Check the tuning for values the controller cannot work with
    ///
    /// # Errors
    ///
    /// Returns [`PacerError::InvalidConfig`] for non-finite fields, a
    /// non-positive period or inverted output bounds.
    pub fn validate(&self) -> PacerResult<()> {
        let fields = [
            ("k_p", self.kp),
            ("t_i", self.ti),
            ("t_t", self.tt),
            ("period", self.period),
            ("min", self.min),
            ("max", self.max),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(PacerError::invalid_config(format!(
                "controller field {name} must be finite, got {value}"
            )));
        }
        if self.period <= 0.0 {
            return Err(PacerError::invalid_config(format!(
                "controller period must be positive, got {}",
                self.period
            )));
        }
        if self.min > self.max {
            return Err(PacerError::invalid_config(format!(
                "controller output bounds are inverted: min {} > max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Proportional-integral controller with output clamping
#[derive(Debug, Clone, PartialEq)]
pub struct PiController {
    config: PiConfig,
    integral: f64,
}

impl Default for PiController {
    fn default() -> Self {
        Self::new(PiConfig::default())
    }
}

impl PiController {
    /// Create a controller with a zeroed integral term
    pub fn new(config: PiConfig) -> Self {
        Self {
            config,
            integral: 0.0,
        }
    }

    /// Controller tuning
    pub fn config(&self) -> &PiConfig {
        &self.config
    }

    /// Current integral accumulator
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// Returns `(raw, clamped)` output for the given error signal
    fn output(&self, input: f64, setpoint: f64) -> (f64, f64) {
        let proportional = self.config.kp * (setpoint - input);
        let raw = proportional + self.integral;
        let clamped = if raw < self.config.min {
            self.config.min
        } else if raw > self.config.max {
            self.config.max
        } else {
            raw
        };
        (raw, clamped)
    }

    fn update(&mut self, input: f64, setpoint: f64, raw: f64, clamped: f64) {
        if !self.config.has_integral() {
            return;
        }
        let PiConfig { kp, ti, tt, period, .. } = self.config;
        // The second term bleeds the integral back while the output saturates.
        self.integral += (kp * period / ti) * (setpoint - input) + (period / tt) * (clamped - raw);
    }
}

impl FeedbackController for PiController {
    fn next(&mut self, input: f64, setpoint: f64) -> f64 {
        let (raw, clamped) = self.output(input, setpoint);
        self.update(input, setpoint, raw, clamped);
        log::trace!(
            "pi: input={input:.6} setpoint={setpoint:.6} raw={raw:.6} out={clamped:.6} integral={:.6}",
            self.integral
        );
        clamped
    }
}

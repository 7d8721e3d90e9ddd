//! Pacer selection
//!
//! Both algorithms share nothing but the [`Pacer`] step contract. The
//! [`PacerEngine`] facade picks one by name and, for the controlled pacer,
//! wires in a PI controller.

use std::fmt;
use std::str::FromStr;

use crate::controller::{PiConfig, PiController};
use crate::{
    ControlledPacer, CycleInput, CycleResult, LegacyPacer, PacerError, PacerResult, RunConfig,
};

/// One pacing algorithm, stepped once per GC cycle
///
/// Steps must be issued strictly in cycle order; each one depends on the
/// state the previous one left behind.
pub trait Pacer {
    /// Consume one cycle of workload and produce its pacing decision
    fn step(&mut self, cycle: &CycleInput) -> CycleResult;

    /// Which algorithm this is
    fn kind(&self) -> PacerKind;

    /// Number of completed steps
    fn cycles(&self) -> u64;

    /// Step through `cycles` in order, collecting every result
    fn run(&mut self, cycles: &[CycleInput]) -> Vec<CycleResult> {
        cycles.iter().map(|cycle| self.step(cycle)).collect()
    }
}

/// Available pacing algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PacerKind {
    /// Self-tuning trigger ratio, no external controller
    Legacy,
    /// Trigger back-solved from a PI-corrected growth ratio
    Controlled,
}

impl PacerKind {
    /// Every kind, in name order
    pub const ALL: [PacerKind; 2] = [PacerKind::Controlled, PacerKind::Legacy];

    /// Registry name
    pub fn name(self) -> &'static str {
        match self {
            PacerKind::Legacy => "legacy",
            PacerKind::Controlled => "controlled",
        }
    }

    /// Older runtime-version name this kind is also registered under
    pub fn alias(self) -> &'static str {
        match self {
            PacerKind::Legacy => "go116",
            PacerKind::Controlled => "go117",
        }
    }

    /// Registry names, sorted
    pub fn names() -> Vec<&'static str> {
        let mut names: Vec<_> = Self::ALL.iter().map(|kind| kind.name()).collect();
        names.sort_unstable();
        names
    }

    /// Utilization this pacer reports as its target
    pub fn target_utilization(self) -> f64 {
        match self {
            PacerKind::Legacy => crate::LEGACY_TARGET_UTILIZATION,
            PacerKind::Controlled => crate::CONTROLLED_TARGET_UTILIZATION,
        }
    }
}

impl fmt::Display for PacerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PacerKind {
    type Err = PacerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s || kind.alias() == s)
            .ok_or_else(|| PacerError::unknown_pacer(s, &Self::names()))
    }
}

/// Name-selected pacer
#[derive(Debug, Clone)]
pub enum PacerEngine {
    /// See [`LegacyPacer`]
    Legacy(LegacyPacer),
    /// See [`ControlledPacer`]
    Controlled(ControlledPacer<PiController>),
}

impl PacerEngine {
    /// Build the pacer registered under `name`
    ///
    /// `controller` only matters for the controlled pacer; when absent the
    /// default PI tuning is used.
    ///
    /// # Errors
    ///
    /// Returns [`PacerError::UnknownPacer`] for an unregistered name. No
    /// pacer state is created in that case.
    pub fn new(name: &str, run: RunConfig, controller: Option<PiConfig>) -> PacerResult<Self> {
        let kind: PacerKind = name.parse()?;
        Ok(Self::from_kind(kind, run, controller))
    }

    /// Build a pacer of a known kind
    pub fn from_kind(kind: PacerKind, run: RunConfig, controller: Option<PiConfig>) -> Self {
        log::info!(
            "creating {kind} pacer: gamma={} globals={} initial_heap={}",
            run.gamma,
            run.globals_bytes,
            run.initial_heap
        );
        match kind {
            PacerKind::Legacy => {
                if controller.is_some() {
                    log::debug!("legacy pacer ignores the supplied controller configuration");
                }
                PacerEngine::Legacy(LegacyPacer::new(run))
            }
            PacerKind::Controlled => {
                let config = controller.unwrap_or_default();
                log::debug!("controlled pacer tuning: {config:?}");
                PacerEngine::Controlled(ControlledPacer::new(run, PiController::new(config)))
            }
        }
    }

    fn as_pacer(&mut self) -> &mut dyn Pacer {
        match self {
            PacerEngine::Legacy(pacer) => pacer,
            PacerEngine::Controlled(pacer) => pacer,
        }
    }
}

impl Pacer for PacerEngine {
    fn step(&mut self, cycle: &CycleInput) -> CycleResult {
        self.as_pacer().step(cycle)
    }

    fn kind(&self) -> PacerKind {
        match self {
            PacerEngine::Legacy(_) => PacerKind::Legacy,
            PacerEngine::Controlled(_) => PacerKind::Controlled,
        }
    }

    fn cycles(&self) -> u64 {
        match self {
            PacerEngine::Legacy(pacer) => pacer.cycles(),
            PacerEngine::Controlled(pacer) => pacer.cycles(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_sorted() {
        assert_eq!(PacerKind::names(), vec!["controlled", "legacy"]);
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("legacy".parse::<PacerKind>().unwrap(), PacerKind::Legacy);
        assert_eq!(
            "controlled".parse::<PacerKind>().unwrap(),
            PacerKind::Controlled
        );
        assert_eq!(PacerKind::Controlled.to_string(), "controlled");
    }

    #[test]
    fn test_parse_version_aliases() {
        assert_eq!("go116".parse::<PacerKind>().unwrap(), PacerKind::Legacy);
        assert_eq!("go117".parse::<PacerKind>().unwrap(), PacerKind::Controlled);
        let engine = PacerEngine::new("go117", RunConfig::default(), None).unwrap();
        assert_eq!(engine.kind(), PacerKind::Controlled);
        // Aliases are accepted but not listed.
        assert_eq!(PacerKind::names(), vec!["controlled", "legacy"]);
    }

    #[test]
    fn test_unknown_name() {
        let err = PacerEngine::new("go118", RunConfig::default(), None).unwrap_err();
        assert!(matches!(err, PacerError::UnknownPacer { ref name, .. } if name == "go118"));
    }

    #[test]
    fn test_default_controller_tuning() {
        let engine = PacerEngine::new("controlled", RunConfig::default(), None).unwrap();
        match engine {
            PacerEngine::Controlled(pacer) => {
                assert_eq!(*pacer.controller().config(), PiConfig::default());
                assert_eq!(pacer.controller().integral(), 0.0);
            }
            PacerEngine::Legacy(_) => panic!("expected controlled pacer"),
        }
    }

    #[test]
    fn test_explicit_controller_tuning() {
        let tuning = PiConfig {
            kp: 0.5,
            ..PiConfig::default()
        };
        let engine = PacerEngine::new("controlled", RunConfig::default(), Some(tuning)).unwrap();
        let PacerEngine::Controlled(pacer) = engine else {
            panic!("expected controlled pacer");
        };
        assert_eq!(pacer.controller().config().kp, 0.5);
    }

    #[test]
    fn test_target_utilization_per_kind() {
        let cycle = CycleInput::default();
        for kind in PacerKind::ALL {
            let mut engine = PacerEngine::from_kind(kind, RunConfig::default(), None);
            assert_eq!(engine.kind(), kind);
            let result = engine.step(&cycle);
            assert_eq!(result.target_utilization, kind.target_utilization());
            assert_eq!(engine.cycles(), 1);
        }
    }
}

//! Chaos mode: a debug switch that randomly slows down or sabotages a fetch so the
//! offline fallback gets exercised.

use std::time::Duration;

use rand::Rng;

use crate::config::{CHAOS_DELAY, CHAOS_TOGGLE_ON};

/// What chaos decided for one fetch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChaosOutcome {
    /// No interference.
    Proceed,
    /// Sleep, then try the network as usual.
    Delay(Duration),
    /// Skip the network entirely and go offline.
    Abort,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChaosPolicy {
    probability: f64,
    abort_share: f64,
    delay: Duration,
}

impl Default for ChaosPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

impl ChaosPolicy {
    pub fn disabled() -> Self {
        Self { probability: 0.0, abort_share: 0.5, delay: CHAOS_DELAY }
    }

    /// Probability is clamped into [0, 1]; NaN counts as 0.
    pub fn with_probability(probability: f64) -> Self {
        Self { probability: clamp_unit(probability), ..Self::disabled() }
    }

    /// Fraction of triggered chaos events that abort instead of delaying.
    pub fn abort_share(mut self, share: f64) -> Self {
        self.abort_share = clamp_unit(share);
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn is_enabled(&self) -> bool {
        self.probability > 0.0
    }

    /// D key: off -> 0.2, anything on -> off. Keeps abort share and delay.
    pub fn toggled(self) -> Self {
        let probability = if self.is_enabled() { 0.0 } else { CHAOS_TOGGLE_ON };
        Self { probability, ..self }
    }

    pub fn decide<R: Rng + ?Sized>(&self, rng: &mut R) -> ChaosOutcome {
        if !self.is_enabled() {
            return ChaosOutcome::Proceed;
        }
        // gen::<f64>() is in [0, 1), so p = 1 always triggers
        if rng.r#gen::<f64>() >= self.probability {
            return ChaosOutcome::Proceed;
        }
        if rng.r#gen::<f64>() < self.abort_share {
            ChaosOutcome::Abort
        } else {
            ChaosOutcome::Delay(self.delay)
        }
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn probability_is_clamped() {
        assert_eq!(ChaosPolicy::with_probability(3.0).probability(), 1.0);
        assert_eq!(ChaosPolicy::with_probability(-1.0).probability(), 0.0);
        assert_eq!(ChaosPolicy::with_probability(f64::NAN).probability(), 0.0);
    }

    #[test]
    fn disabled_never_interferes() {
        let policy = ChaosPolicy::disabled();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            assert_eq!(policy.decide(&mut rng), ChaosOutcome::Proceed);
        }
    }

    #[test]
    fn forced_abort_always_aborts() {
        let policy = ChaosPolicy::with_probability(1.0).abort_share(1.0);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..1000 {
            assert_eq!(policy.decide(&mut rng), ChaosOutcome::Abort);
        }
    }

    #[test]
    fn forced_delay_uses_configured_delay() {
        let d = Duration::from_millis(3);
        let policy = ChaosPolicy::with_probability(1.0).abort_share(0.0).delay(d);
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(policy.decide(&mut rng), ChaosOutcome::Delay(d));
    }

    #[test]
    fn toggle_alternates_between_off_and_point_two() {
        let p = ChaosPolicy::disabled().toggled();
        assert_eq!(p.probability(), 0.2);
        assert_eq!(p.toggled().probability(), 0.0);
        assert_eq!(ChaosPolicy::with_probability(0.7).toggled().probability(), 0.0);
    }
}

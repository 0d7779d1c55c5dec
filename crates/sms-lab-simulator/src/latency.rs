use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use std::time::Duration;

use crate::error::SimError;

/// Source of simulated per-send latency.
pub trait LatencyModel: Send {
    fn sample(&mut self) -> Duration;
}

/// Normal(mean, spread) latency, clamped at zero.
#[derive(Debug, Clone)]
pub struct RandomLatencyModel {
    distribution: Normal<f64>,
    rng: StdRng,
}

impl RandomLatencyModel {
    /// `mean` and `spread` are in seconds.
    pub fn new(mean: f64, spread: f64, rng: StdRng) -> Result<Self, SimError> {
        let distribution = Normal::new(mean, spread)?;
        Ok(Self { distribution, rng })
    }

    pub fn mean(&self) -> Duration {
        Duration::from_secs_f64(self.distribution.mean().max(0.0))
    }
}

impl LatencyModel for RandomLatencyModel {
    fn sample(&mut self) -> Duration {
        let seconds = self.distribution.sample(&mut self.rng).max(0.0);
        Duration::from_secs_f64(seconds)
    }
}

/// Constant latency, mostly for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedLatency(pub Duration);

impl LatencyModel for FixedLatency {
    fn sample(&mut self) -> Duration {
        self.0
    }
}

/// Independent RNG stream `stream` of a run. With a seed the stream is
/// reproducible; without one it is drawn from the OS.
pub(crate) fn stream_rng(seed: Option<u64>, stream: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15)),
        None => StdRng::from_os_rng(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_never_negative() {
        // mean well below the spread, so roughly a third of raw draws are negative
        let mut model = RandomLatencyModel::new(0.01, 0.05, stream_rng(Some(7), 0)).unwrap();
        let mut clamped = 0;
        for _ in 0..10_000 {
            let d = model.sample();
            if d.is_zero() {
                clamped += 1;
            }
        }
        assert!(clamped > 0, "expected some draws to clamp at zero");
    }

    #[test]
    fn test_sample_mean_close_to_configured() {
        let mut model = RandomLatencyModel::new(0.5, 0.05, stream_rng(Some(42), 1)).unwrap();
        let n = 5_000;
        let total: f64 = (0..n).map(|_| model.sample().as_secs_f64()).sum();
        let mean = total / n as f64;
        assert!((mean - 0.5).abs() < 0.01, "sample mean {mean} too far from 0.5");
        assert_eq!(model.mean(), Duration::from_secs_f64(0.5));
    }

    #[test]
    fn test_seeded_streams_are_reproducible() {
        let mut a = RandomLatencyModel::new(0.1, 0.05, stream_rng(Some(9), 3)).unwrap();
        let mut b = RandomLatencyModel::new(0.1, 0.05, stream_rng(Some(9), 3)).unwrap();
        for _ in 0..100 {
            assert_eq!(a.sample(), b.sample());
        }
    }

    #[test]
    fn test_rejects_invalid_spread() {
        assert!(RandomLatencyModel::new(0.1, f64::NAN, stream_rng(None, 0)).is_err());
    }
}

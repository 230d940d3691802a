//! Volatility clustering: GARCH(1,1) driven by Box–Muller normal shocks.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// GARCH(1,1) coefficients.
///
/// `σ_t = sqrt(ω + α·(z·σ_{t-1})² + β·σ_{t-1}²)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GarchParams {
    pub omega: f64,
    pub alpha: f64,
    pub beta: f64,
}

impl Default for GarchParams {
    fn default() -> Self {
        Self {
            omega: 1e-6,
            alpha: 0.1,
            beta: 0.85,
        }
    }
}

impl GarchParams {
    /// Next volatility state from the previous one and a standard-normal shock.
    pub fn next(&self, sigma: f64, shock: f64) -> f64 {
        (self.omega + self.alpha * (shock * sigma).powi(2) + self.beta * sigma.powi(2)).sqrt()
    }
}

/// P&L scaling factor bounds.
pub const MIN_VOLATILITY_FACTOR: f64 = 0.5;
pub const MAX_VOLATILITY_FACTOR: f64 = 2.0;

/// P&L multiplier for the current volatility state: `clamp(1 + (σ - σ_base)·2, 0.5, 2)`.
pub fn volatility_factor(sigma: f64, base_sigma: f64) -> f64 {
    (1.0 + (sigma - base_sigma) * 2.0).clamp(MIN_VOLATILITY_FACTOR, MAX_VOLATILITY_FACTOR)
}

/// One standard-normal variate via Box–Muller.
///
/// Two uniforms in (0, 1); zero draws are rejected so `ln` stays finite.
/// Only the cosine branch is used.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u = nonzero_uniform(rng);
    let v = nonzero_uniform(rng);
    (-2.0 * u.ln()).sqrt() * (2.0 * std::f64::consts::PI * v).cos()
}

fn nonzero_uniform<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    loop {
        let x: f64 = rng.gen();
        if x != 0.0 {
            return x;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn garch_known_step() {
        let g = GarchParams::default();
        // z = 0: sqrt(1e-6 + 0.85 * 0.04)
        let next = g.next(0.2, 0.0);
        assert!((next - (1e-6_f64 + 0.85 * 0.04).sqrt()).abs() < 1e-12);
        // z = 2: adds 0.1 * (0.4)^2
        let next = g.next(0.2, 2.0);
        assert!((next - (1e-6_f64 + 0.016 + 0.034).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn garch_decays_without_shocks() {
        let g = GarchParams::default();
        let mut sigma = 0.18;
        for _ in 0..200 {
            sigma = g.next(sigma, 0.0);
        }
        // Fixed point of σ² = ω + β·σ² is sqrt(ω / (1 - β))
        let fixed = (1e-6_f64 / 0.15).sqrt();
        assert!((sigma - fixed).abs() < 1e-6);
    }

    #[test]
    fn factor_clamped() {
        assert_eq!(volatility_factor(0.18, 0.18), 1.0);
        assert_eq!(volatility_factor(2.0, 0.1), 2.0);
        assert_eq!(volatility_factor(0.0, 0.9), 0.5);
        assert!((volatility_factor(0.28, 0.18) - 1.2).abs() < 1e-12);
    }

    #[test]
    fn box_muller_moments() {
        let mut rng = StdRng::seed_from_u64(11);
        let n = 20_000;
        let draws: Vec<f64> = (0..n).map(|_| standard_normal(&mut rng)).collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        assert!(mean.abs() < 0.05, "mean = {mean}");
        assert!((var - 1.0).abs() < 0.05, "var = {var}");
        assert!(draws.iter().all(|x| x.is_finite()));
    }
}

//! Lorenz system integration.
//!
//! The three-variable Lorenz field
//!
//! ```text
//! dx/dt = sigma * (y - x)
//! dy/dt = x * (rho - z) - y
//! dz/dt = x * y - beta * z
//! ```
//!
//! is stepped with classic fourth-order Runge-Kutta. Stepping is pure:
//! the same state and parameters always produce the same next state.
//!
//! Nothing here bounds the trajectory. Boundedness comes from running in the
//! classic chaotic regime (`sigma = 10`, `rho = 28`, `beta = 8/3`) and from
//! keeping [`Modulation`] amplitudes small relative to those values.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Parameters of the Lorenz field plus the fixed integration step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LorenzParams {
    pub sigma: f64,
    pub rho: f64,
    pub beta: f64,
    /// Integration step size.
    pub dt: f64,
}

impl Default for LorenzParams {
    fn default() -> Self {
        Self {
            sigma: 10.0,
            rho: 28.0,
            beta: 8.0 / 3.0,
            dt: 0.001,
        }
    }
}

impl LorenzParams {
    /// Evaluate the vector field at `p`.
    #[inline]
    pub fn derivative(&self, p: DVec3) -> DVec3 {
        DVec3::new(
            self.sigma * (p.y - p.x),
            p.x * (self.rho - p.z) - p.y,
            p.x * p.y - self.beta * p.z,
        )
    }

    /// Advance `p` by one RK4 step of size `dt`.
    #[inline]
    pub fn step(&self, p: DVec3) -> DVec3 {
        let dt = self.dt;
        let k1 = self.derivative(p) * dt;
        let k2 = self.derivative(p + k1 * 0.5) * dt;
        let k3 = self.derivative(p + k2 * 0.5) * dt;
        let k4 = self.derivative(p + k3) * dt;
        p + (k1 + 2.0 * k2 + 2.0 * k3 + k4) / 6.0
    }

    /// Advance `p` by `steps` RK4 steps.
    pub fn advance(&self, mut p: DVec3, steps: u32) -> DVec3 {
        for _ in 0..steps {
            p = self.step(p);
        }
        p
    }

    /// Whether every parameter is finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        [self.sigma, self.rho, self.beta, self.dt]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }
}

/// Slow sinusoidal drift of the Lorenz parameters.
///
/// Each trail system `k` sees its own phase (`+ k` inside the sine), so the
/// roster never breathes in lock-step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modulation {
    pub rho_amplitude: f64,
    pub rho_rate: f64,
    pub sigma_amplitude: f64,
    pub sigma_rate: f64,
    /// Zero disables `beta` drift.
    pub beta_amplitude: f64,
    pub beta_rate: f64,
}

impl Default for Modulation {
    fn default() -> Self {
        Self {
            rho_amplitude: 0.4,
            rho_rate: 0.1,
            sigma_amplitude: 0.15,
            sigma_rate: 0.12,
            beta_amplitude: 0.0,
            beta_rate: 0.08,
        }
    }
}

impl Modulation {
    /// A modulation that leaves parameters untouched.
    pub fn none() -> Self {
        Self {
            rho_amplitude: 0.0,
            sigma_amplitude: 0.0,
            beta_amplitude: 0.0,
            ..Self::default()
        }
    }

    /// Perturb `base` for trail system `index` at virtual time `elapsed`.
    pub fn apply(&self, base: &LorenzParams, elapsed: f64, index: usize) -> LorenzParams {
        let t = elapsed;
        let k = index as f64;
        LorenzParams {
            sigma: base.sigma + (t * self.sigma_rate + k).cos() * self.sigma_amplitude,
            rho: base.rho + (t * self.rho_rate + k).sin() * self.rho_amplitude,
            beta: base.beta + (t * self.beta_rate + k).sin() * self.beta_amplitude,
            dt: base.dt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEEDS: [DVec3; 5] = [
        DVec3::new(0.1, 0.0, 0.0),
        DVec3::new(0.1, 0.1, 0.1),
        DVec3::new(-0.1, 0.1, 0.0),
        DVec3::new(0.0, 0.1, -0.1),
        DVec3::new(0.05, -0.05, 0.05),
    ];

    #[test]
    fn test_step_is_deterministic() {
        let params = LorenzParams::default();
        let a = params.advance(SEEDS[0], 5_000);
        let b = params.advance(SEEDS[0], 5_000);
        assert_eq!(a, b);
    }

    #[test]
    fn test_origin_is_fixed_point() {
        let params = LorenzParams::default();
        assert_eq!(params.step(DVec3::ZERO), DVec3::ZERO);
    }

    #[test]
    fn test_step_matches_derivative_for_tiny_dt() {
        let params = LorenzParams {
            dt: 1e-7,
            ..LorenzParams::default()
        };
        let p = DVec3::new(1.0, 2.0, 3.0);
        let expected = p + params.derivative(p) * params.dt;
        assert!((params.step(p) - expected).length() < 1e-10);
    }

    #[test]
    fn test_default_trajectories_stay_bounded() {
        let params = LorenzParams::default();
        for seed in SEEDS {
            let mut p = seed;
            for _ in 0..100_000 {
                p = params.step(p);
                assert!(p.is_finite());
                assert!(p.abs().max_element() <= 100.0, "escaped to {p:?}");
            }
        }
    }

    #[test]
    fn test_modulated_trajectory_stays_bounded() {
        let params = LorenzParams::default();
        let modulation = Modulation {
            beta_amplitude: 0.05,
            ..Modulation::default()
        };
        let mut p = SEEDS[1];
        for frame in 0..20_000 {
            let modulated = modulation.apply(&params, frame as f64 * 0.008, 1);
            p = modulated.advance(p, 4);
            assert!(p.abs().max_element() <= 100.0);
        }
    }

    #[test]
    fn test_modulation_amplitudes() {
        let base = LorenzParams::default();
        let modulation = Modulation::default();
        for i in 0..200 {
            let m = modulation.apply(&base, i as f64 * 0.5, i % 5);
            assert!((m.rho - base.rho).abs() <= 0.4 + 1e-12);
            assert!((m.sigma - base.sigma).abs() <= 0.15 + 1e-12);
            assert_eq!(m.beta, base.beta);
            assert_eq!(m.dt, base.dt);
        }
        assert_eq!(Modulation::none().apply(&base, 3.0, 2), base);
    }

    #[test]
    fn test_params_validation() {
        assert!(LorenzParams::default().is_valid());
        assert!(!LorenzParams { dt: 0.0, ..LorenzParams::default() }.is_valid());
        assert!(!LorenzParams { rho: f64::NAN, ..LorenzParams::default() }.is_valid());
    }
}

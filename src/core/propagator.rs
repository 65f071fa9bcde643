//! Exact propagators of the sub-threshold dynamics.
//!
//! Between spikes, the neuron obeys the linear system
//!
//! ```text
//! dI_k/dt = -I_k / tau_syn_k
//! dV/dt   = -V / tau_m + (I_e + I_inj + sum_k I_k) / C_m
//! ```
//!
//! whose solution over one time step `h` is a fixed linear map. Its coefficients
//! are computed once per calibration and the update loop only multiplies and adds.
use serde::{Deserialize, Serialize};

use super::parameters::Parameters;

/// Below this magnitude of `h * (1/tau_syn - 1/tau_m)`, the cross propagator is
/// evaluated with its first-order expansion.
pub const NEAR_DEGENERATE_TOLERANCE: f64 = 1e-6;

/// Returns `(exp(x) - 1) / x`, extended by continuity at zero.
fn relative_expm1(x: f64) -> f64 {
    if x.abs() < NEAR_DEGENERATE_TOLERANCE {
        // The neglected terms are below x^2 / 6.
        1.0 + 0.5 * x
    } else {
        x.exp_m1() / x
    }
}

/// Returns the contribution to the membrane potential after one step `h` of a unit
/// synaptic current with time constant `tau_syn`, i.e.,
///
/// ```text
/// tau_syn * tau_m / (C_m * (tau_syn - tau_m)) * (exp(-h / tau_syn) - exp(-h / tau_m))
/// ```
///
/// The difference of exponentials is rewritten as
/// `h / C_m * exp(-h / tau_syn) * (exp(x) - 1) / x` with `x = h * (tau_m - tau_syn) / (tau_m * tau_syn)`,
/// which stays well-conditioned when `tau_syn` approaches `tau_m` and tends to
/// `h / C_m * exp(-h / tau_m)` in the limit.
pub fn cross_propagator(tau_syn: f64, tau_m: f64, c_m: f64, h: f64) -> f64 {
    let x = h * (tau_m - tau_syn) / (tau_m * tau_syn);
    h / c_m * (-h / tau_syn).exp() * relative_expm1(x)
}

/// The propagators of a neuron for a given time step.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct Propagators {
    /// The time step (ms) the propagators were computed for.
    pub(crate) h: f64,
    /// Decay of the membrane potential over one step.
    pub(crate) p22: f64,
    /// Contribution of a constant current to the membrane potential over one step.
    pub(crate) p20: f64,
    /// Decay of each synaptic current over one step.
    pub(crate) p11: Vec<f64>,
    /// Contribution of each synaptic current to the membrane potential over one step.
    pub(crate) p21: Vec<f64>,
    /// The refractory period in number of steps.
    pub(crate) refractory_counts: usize,
}

impl Propagators {
    /// Compute all propagators of the given parameters for the time step `h` (ms).
    pub fn new(parameters: &Parameters, h: f64) -> Self {
        let p22 = (-h / parameters.tau_m).exp();
        let p20 = parameters.tau_m / parameters.c_m * (1.0 - p22);

        let p11 = parameters
            .tau_syn
            .iter()
            .map(|tau_syn| (-h / tau_syn).exp())
            .collect();
        let p21 = parameters
            .tau_syn
            .iter()
            .map(|&tau_syn| cross_propagator(tau_syn, parameters.tau_m, parameters.c_m, h))
            .collect();

        Propagators {
            h,
            p22,
            p20,
            p11,
            p21,
            refractory_counts: (parameters.t_ref / h).round() as usize,
        }
    }

    /// Returns the time step (ms) of the propagators.
    pub fn resolution(&self) -> f64 {
        self.h
    }

    /// Returns the decay factor of the membrane potential.
    pub fn decay_membrane(&self) -> f64 {
        self.p22
    }

    /// Returns the scaling factor of constant currents into the membrane potential.
    pub fn input_scale_membrane(&self) -> f64 {
        self.p20
    }

    /// Returns the decay factors of the synaptic currents.
    pub fn decay_synapse(&self) -> &[f64] {
        &self.p11
    }

    /// Returns the coefficients mapping synaptic currents into the membrane potential.
    pub fn cross(&self) -> &[f64] {
        &self.p21
    }

    /// Returns the refractory period as a number of steps.
    pub fn refractory_counts(&self) -> usize {
        self.refractory_counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parameters::ParameterUpdate;
    use approx::assert_relative_eq;
    use nalgebra::Matrix2;

    // The reference solution: the exponential of the system matrix acting on (I, V).
    fn expm_cross_propagator(tau_syn: f64, tau_m: f64, c_m: f64, h: f64) -> f64 {
        let a = Matrix2::new(-1.0 / tau_syn, 0.0, 1.0 / c_m, -1.0 / tau_m);
        (a * h).exp()[(1, 0)]
    }

    fn naive_cross_propagator(tau_syn: f64, tau_m: f64, c_m: f64, h: f64) -> f64 {
        tau_syn * tau_m / (c_m * (tau_syn - tau_m)) * ((-h / tau_syn).exp() - (-h / tau_m).exp())
    }

    #[test]
    fn test_membrane_propagators() {
        let parameters = Parameters::default();
        let propagators = Propagators::new(&parameters, 0.1);
        assert_relative_eq!(propagators.decay_membrane(), (-0.01_f64).exp());
        assert_relative_eq!(
            propagators.input_scale_membrane(),
            10.0 / 250.0 * (1.0 - (-0.01_f64).exp())
        );
        assert_eq!(propagators.refractory_counts(), 20);
        assert!(propagators.decay_synapse().is_empty());
        assert!(propagators.cross().is_empty());
    }

    #[test]
    fn test_synapse_propagators() {
        let parameters = Parameters::build(&[0.5, 2.0, 25.0]).unwrap();
        let propagators = Propagators::new(&parameters, 0.1);
        assert_eq!(propagators.decay_synapse().len(), 3);
        assert_eq!(propagators.cross().len(), 3);
        for (k, &tau_syn) in parameters.tau_syn().iter().enumerate() {
            assert_relative_eq!(propagators.decay_synapse()[k], (-0.1 / tau_syn).exp());
            assert_relative_eq!(
                propagators.cross()[k],
                expm_cross_propagator(tau_syn, 10.0, 250.0, 0.1),
                max_relative = 1e-10
            );
            assert_relative_eq!(
                propagators.cross()[k],
                naive_cross_propagator(tau_syn, 10.0, 250.0, 0.1),
                max_relative = 1e-10
            );
        }
    }

    #[test]
    fn test_refractory_counts_rounding() {
        let mut parameters = Parameters::default();
        parameters.set(&ParameterUpdate { t_ref: Some(0.26), ..Default::default() }).unwrap();
        assert_eq!(Propagators::new(&parameters, 0.1).refractory_counts(), 3);
        parameters.set(&ParameterUpdate { t_ref: Some(0.0), ..Default::default() }).unwrap();
        assert_eq!(Propagators::new(&parameters, 0.1).refractory_counts(), 0);
    }

    #[test]
    fn test_cross_propagator_near_degenerate() {
        let (tau_m, c_m, h): (f64, f64, f64) = (10.0, 250.0, 0.1);
        let singular = h / c_m * (-h / tau_m).exp();

        for k in 1..=15 {
            let eps = 10_f64.powi(-k);
            for tau_syn in [tau_m * (1.0 + eps), tau_m * (1.0 - eps)] {
                let p21 = cross_propagator(tau_syn, tau_m, c_m, h);
                assert!(p21.is_finite());
                assert!(p21 > 0.0);
                assert_relative_eq!(
                    p21,
                    expm_cross_propagator(tau_syn, tau_m, c_m, h),
                    max_relative = 1e-10
                );
                // The relative deviation from the singular limit is about h * eps / (2 * tau_m).
                assert_relative_eq!(p21, singular, max_relative = eps);
            }
        }
    }

    #[test]
    fn test_cross_propagator_matches_matrix_exponential() {
        for &tau_syn in &[0.1, 1.0, 9.99, 9.9999999, 10.0000001, 10.01, 100.0] {
            for &h in &[0.01, 0.1, 1.0] {
                assert_relative_eq!(
                    cross_propagator(tau_syn, 10.0, 250.0, h),
                    expm_cross_propagator(tau_syn, 10.0, 250.0, h),
                    max_relative = 1e-8
                );
            }
        }
    }

    #[test]
    fn test_relative_expm1_continuity() {
        assert_eq!(relative_expm1(0.0), 1.0);
        // Both branches agree with the series 1 + x / 2 + x^2 / 6 around the switch.
        for x in [
            NEAR_DEGENERATE_TOLERANCE * 0.999,
            NEAR_DEGENERATE_TOLERANCE * 1.001,
            -NEAR_DEGENERATE_TOLERANCE * 0.999,
            -NEAR_DEGENERATE_TOLERANCE * 1.001,
        ] {
            assert_relative_eq!(relative_expm1(x), 1.0 + x / 2.0 + x * x / 6.0, max_relative = 1e-12);
        }
    }
}

//! Module implementing the static configuration of a neuron.
//!
//! Potentials are exposed in absolute terms (mV) but the reset potential and the
//! firing threshold are stored relative to the resting potential, so that the
//! neuron dynamics only ever see deviations from rest.
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::SNNError;

/// Default membrane time constant (ms).
pub const DEFAULT_TAU_M: f64 = 10.0;
/// Default membrane capacitance (pF).
pub const DEFAULT_C_M: f64 = 250.0;
/// Default absolute refractory period (ms).
pub const DEFAULT_T_REF: f64 = 2.0;
/// Default resting potential (mV).
pub const DEFAULT_E_L: f64 = -70.0;
/// Default absolute reset potential (mV).
pub const DEFAULT_V_RESET: f64 = -70.0;
/// Default absolute firing threshold (mV).
pub const DEFAULT_V_TH: f64 = -55.0;

/// The settable fields of a neuron, with the names used by configuration files.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ParameterField {
    /// Resting potential `E_L` (mV).
    RestPotential,
    /// Constant background current `I_e` (pA).
    BackgroundCurrent,
    /// Absolute firing threshold `V_th` (mV).
    Threshold,
    /// Absolute reset potential `V_reset` (mV).
    ResetPotential,
    /// Membrane capacitance `C_m` (pF).
    Capacitance,
    /// Membrane time constant `tau_m` (ms).
    MembraneTimeConstant,
    /// Absolute refractory period `t_ref` (ms).
    RefractoryDuration,
    /// Synaptic time constants `tau_syn` (ms), one per receptor.
    SynapseTimeConstants,
    /// Absolute membrane potential `V_m` (mV).
    MembranePotential,
}

impl ParameterField {
    /// All settable fields, in the order they are applied.
    pub const ALL: [ParameterField; 9] = [
        ParameterField::RestPotential,
        ParameterField::ResetPotential,
        ParameterField::Threshold,
        ParameterField::BackgroundCurrent,
        ParameterField::Capacitance,
        ParameterField::MembraneTimeConstant,
        ParameterField::RefractoryDuration,
        ParameterField::SynapseTimeConstants,
        ParameterField::MembranePotential,
    ];

    /// Returns the external name of the field.
    pub fn name(&self) -> &'static str {
        match self {
            ParameterField::RestPotential => "E_L",
            ParameterField::BackgroundCurrent => "I_e",
            ParameterField::Threshold => "V_th",
            ParameterField::ResetPotential => "V_reset",
            ParameterField::Capacitance => "C_m",
            ParameterField::MembraneTimeConstant => "tau_m",
            ParameterField::RefractoryDuration => "t_ref",
            ParameterField::SynapseTimeConstants => "tau_syn",
            ParameterField::MembranePotential => "V_m",
        }
    }

    /// Returns the field with the given external name.
    pub fn from_name(name: &str) -> Result<Self, SNNError> {
        ParameterField::ALL
            .iter()
            .find(|field| field.name() == name)
            .copied()
            .ok_or_else(|| SNNError::InvalidParameter(format!("Unknown field '{}'", name)))
    }
}

/// A partial configuration update: only the provided fields are changed.
/// Potentials are given in absolute terms.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterUpdate {
    #[serde(rename = "E_L", default, skip_serializing_if = "Option::is_none")]
    pub e_l: Option<f64>,
    #[serde(rename = "I_e", default, skip_serializing_if = "Option::is_none")]
    pub i_e: Option<f64>,
    #[serde(rename = "V_th", default, skip_serializing_if = "Option::is_none")]
    pub v_th: Option<f64>,
    #[serde(rename = "V_reset", default, skip_serializing_if = "Option::is_none")]
    pub v_reset: Option<f64>,
    #[serde(rename = "C_m", default, skip_serializing_if = "Option::is_none")]
    pub c_m: Option<f64>,
    #[serde(rename = "tau_m", default, skip_serializing_if = "Option::is_none")]
    pub tau_m: Option<f64>,
    #[serde(rename = "t_ref", default, skip_serializing_if = "Option::is_none")]
    pub t_ref: Option<f64>,
    #[serde(rename = "tau_syn", default, skip_serializing_if = "Option::is_none")]
    pub tau_syn: Option<Vec<f64>>,
    #[serde(rename = "V_m", default, skip_serializing_if = "Option::is_none")]
    pub v_m: Option<f64>,
}

impl ParameterUpdate {
    /// Create an empty update, i.e., one that changes nothing.
    pub fn new() -> Self {
        ParameterUpdate::default()
    }

    /// Set a scalar field by name.
    /// Returns an error for unknown names and for `tau_syn`, which is not a scalar.
    pub fn set_scalar(&mut self, name: &str, value: f64) -> Result<&mut Self, SNNError> {
        let slot = match ParameterField::from_name(name)? {
            ParameterField::RestPotential => &mut self.e_l,
            ParameterField::BackgroundCurrent => &mut self.i_e,
            ParameterField::Threshold => &mut self.v_th,
            ParameterField::ResetPotential => &mut self.v_reset,
            ParameterField::Capacitance => &mut self.c_m,
            ParameterField::MembraneTimeConstant => &mut self.tau_m,
            ParameterField::RefractoryDuration => &mut self.t_ref,
            ParameterField::MembranePotential => &mut self.v_m,
            ParameterField::SynapseTimeConstants => {
                return Err(SNNError::InvalidParameter(
                    "tau_syn is an array, not a scalar".to_string(),
                ))
            }
        };
        *slot = Some(value);
        Ok(self)
    }

    /// Set the synaptic time constants.
    pub fn set_tau_syn(&mut self, tau_syn: &[f64]) -> &mut Self {
        self.tau_syn = Some(tau_syn.to_vec());
        self
    }

    /// Returns the fields present in the update.
    pub fn fields(&self) -> Vec<ParameterField> {
        ParameterField::ALL
            .iter()
            .filter(|field| match field {
                ParameterField::RestPotential => self.e_l.is_some(),
                ParameterField::BackgroundCurrent => self.i_e.is_some(),
                ParameterField::Threshold => self.v_th.is_some(),
                ParameterField::ResetPotential => self.v_reset.is_some(),
                ParameterField::Capacitance => self.c_m.is_some(),
                ParameterField::MembraneTimeConstant => self.tau_m.is_some(),
                ParameterField::RefractoryDuration => self.t_ref.is_some(),
                ParameterField::SynapseTimeConstants => self.tau_syn.is_some(),
                ParameterField::MembranePotential => self.v_m.is_some(),
            })
            .copied()
            .collect()
    }

    /// Returns an error naming the first provided field holding a non-finite value.
    fn check_finite(&self) -> Result<(), SNNError> {
        let scalars = [
            (ParameterField::RestPotential, self.e_l),
            (ParameterField::ResetPotential, self.v_reset),
            (ParameterField::Threshold, self.v_th),
            (ParameterField::BackgroundCurrent, self.i_e),
            (ParameterField::Capacitance, self.c_m),
            (ParameterField::MembraneTimeConstant, self.tau_m),
            (ParameterField::RefractoryDuration, self.t_ref),
            (ParameterField::MembranePotential, self.v_m),
        ];
        let non_finite = scalars
            .iter()
            .find(|(_, value)| value.map_or(false, |value| !value.is_finite()))
            .map(|(field, _)| *field)
            .or_else(|| {
                self.tau_syn
                    .as_ref()
                    .filter(|tau_syn| tau_syn.iter().any(|tau| !tau.is_finite()))
                    .map(|_| ParameterField::SynapseTimeConstants)
            });

        match non_finite {
            Some(field) => Err(SNNError::InvalidParameter(format!(
                "{} must be finite.",
                field.name()
            ))),
            None => Ok(()),
        }
    }

    /// Parse an update from a JSON object, e.g., `{"E_L": -65.0, "tau_syn": [0.5, 2.0]}`.
    pub fn from_json(json: &str) -> Result<Self, SNNError> {
        serde_json::from_str(json).map_err(|e| SNNError::InvalidParameter(e.to_string()))
    }

    /// Load an update from a JSON file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SNNError> {
        let file = File::open(path).map_err(|e| SNNError::IOError(e.to_string()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| {
            if e.is_io() {
                SNNError::IOError(e.to_string())
            } else {
                SNNError::InvalidParameter(e.to_string())
            }
        })
    }
}

/// The static configuration of a neuron with exponential synaptic currents.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Parameters {
    /// Membrane time constant (ms).
    pub(crate) tau_m: f64,
    /// Membrane capacitance (pF).
    pub(crate) c_m: f64,
    /// Refractory period (ms).
    pub(crate) t_ref: f64,
    /// Resting potential (mV).
    pub(crate) e_l: f64,
    /// Background current (pA).
    pub(crate) i_e: f64,
    /// Reset potential, relative to `e_l`.
    pub(crate) v_reset: f64,
    /// Firing threshold, relative to `e_l`.
    pub(crate) theta: f64,
    /// Synaptic time constants (ms), one per receptor.
    pub(crate) tau_syn: Vec<f64>,
    /// Whether a receptor has been bound to an incoming connection.
    pub(crate) has_connections: bool,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            tau_m: DEFAULT_TAU_M,
            c_m: DEFAULT_C_M,
            t_ref: DEFAULT_T_REF,
            e_l: DEFAULT_E_L,
            i_e: 0.0,
            v_reset: DEFAULT_V_RESET - DEFAULT_E_L,
            theta: DEFAULT_V_TH - DEFAULT_E_L,
            tau_syn: vec![],
            has_connections: false,
        }
    }
}

impl Parameters {
    /// Create a parameter set with default values and the given synaptic time constants.
    pub fn build(tau_syn: &[f64]) -> Result<Self, SNNError> {
        let mut parameters = Parameters::default();
        parameters.set(&ParameterUpdate {
            tau_syn: Some(tau_syn.to_vec()),
            ..Default::default()
        })?;
        Ok(parameters)
    }

    /// Apply a partial update and return the shift of the resting potential.
    ///
    /// Changing `E_L` alone shifts the relative reset and threshold so that their
    /// absolute values are preserved; explicitly provided values override the shift.
    /// The update is all-or-nothing: on error, the parameters are left untouched.
    pub fn set(&mut self, update: &ParameterUpdate) -> Result<f64, SNNError> {
        update.check_finite()?;
        let mut new = self.clone();

        let e_l_old = new.e_l;
        if let Some(e_l) = update.e_l {
            new.e_l = e_l;
        }
        let delta_e_l = new.e_l - e_l_old;

        new.v_reset = match update.v_reset {
            Some(v_reset) => v_reset - new.e_l,
            None => new.v_reset - delta_e_l,
        };
        new.theta = match update.v_th {
            Some(v_th) => v_th - new.e_l,
            None => new.theta - delta_e_l,
        };

        if let Some(i_e) = update.i_e {
            new.i_e = i_e;
        }
        if let Some(c_m) = update.c_m {
            new.c_m = c_m;
        }
        if let Some(tau_m) = update.tau_m {
            new.tau_m = tau_m;
        }
        if let Some(t_ref) = update.t_ref {
            new.t_ref = t_ref;
        }

        if !(new.c_m > 0.0) {
            return Err(SNNError::InvalidParameter(
                "Capacitance must be > 0.".to_string(),
            ));
        }
        if !(new.tau_m > 0.0) {
            return Err(SNNError::InvalidParameter(
                "Membrane time constant must be strictly positive.".to_string(),
            ));
        }
        if !(new.t_ref >= 0.0) {
            return Err(SNNError::InvalidParameter(
                "Refractory time must not be negative.".to_string(),
            ));
        }

        if let Some(tau_syn) = &update.tau_syn {
            if tau_syn.iter().any(|&tau| !(tau > 0.0)) {
                return Err(SNNError::InvalidParameter(
                    "All synaptic time constants must be strictly positive.".to_string(),
                ));
            }
            new.tau_syn = tau_syn.clone();
        }
        if new.tau_syn.iter().any(|&tau| tau == new.tau_m) {
            return Err(SNNError::InvalidParameter(
                "Membrane and synapse time constant(s) must differ.".to_string(),
            ));
        }
        if new.has_connections && new.tau_syn.len() < self.tau_syn.len() {
            return Err(SNNError::InvalidParameter(
                "The neuron has connections, therefore the number of ports cannot be reduced."
                    .to_string(),
            ));
        }

        if !(new.v_reset < new.theta) {
            return Err(SNNError::InvalidParameter(
                "Reset potential must be smaller than threshold.".to_string(),
            ));
        }

        if new.tau_syn.len() != self.tau_syn.len() {
            log::debug!(
                "Number of receptors changed from {} to {}",
                self.tau_syn.len(),
                new.tau_syn.len()
            );
        }

        *self = new;
        Ok(delta_e_l)
    }

    /// Returns the membrane time constant (ms).
    pub fn tau_m(&self) -> f64 {
        self.tau_m
    }

    /// Returns the membrane capacitance (pF).
    pub fn c_m(&self) -> f64 {
        self.c_m
    }

    /// Returns the refractory period (ms).
    pub fn t_ref(&self) -> f64 {
        self.t_ref
    }

    /// Returns the resting potential (mV).
    pub fn e_l(&self) -> f64 {
        self.e_l
    }

    /// Returns the background current (pA).
    pub fn i_e(&self) -> f64 {
        self.i_e
    }

    /// Returns the absolute reset potential (mV).
    pub fn v_reset(&self) -> f64 {
        self.v_reset + self.e_l
    }

    /// Returns the absolute firing threshold (mV).
    pub fn v_th(&self) -> f64 {
        self.theta + self.e_l
    }

    /// Returns the synaptic time constants (ms).
    pub fn tau_syn(&self) -> &[f64] {
        &self.tau_syn
    }

    /// Returns the number of receptors.
    pub fn num_receptors(&self) -> usize {
        self.tau_syn.len()
    }

    /// Whether a receptor has been bound to an incoming connection.
    pub fn has_connections(&self) -> bool {
        self.has_connections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    #[test]
    fn test_default_parameters() {
        let parameters = Parameters::default();
        assert_eq!(parameters.e_l(), -70.0);
        assert_eq!(parameters.v_reset(), -70.0);
        assert_eq!(parameters.v_th(), -55.0);
        assert_eq!(parameters.theta, 15.0);
        assert_eq!(parameters.v_reset, 0.0);
        assert_eq!(parameters.num_receptors(), 0);
        assert!(!parameters.has_connections());
    }

    #[test]
    fn test_field_names() {
        for field in ParameterField::ALL {
            assert_eq!(ParameterField::from_name(field.name()), Ok(field));
        }
        assert!(matches!(
            ParameterField::from_name("V_peak"),
            Err(SNNError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_rest_potential_shift_preserves_absolute_values() {
        let mut parameters = Parameters::default();
        let delta = parameters
            .set(&ParameterUpdate {
                e_l: Some(-65.0),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(delta, 5.0);
        assert_relative_eq!(parameters.v_th(), -55.0);
        assert_relative_eq!(parameters.v_reset(), -70.0);
        assert_relative_eq!(parameters.theta, 10.0);
    }

    #[test]
    fn test_explicit_threshold_overrides_shift() {
        let mut parameters = Parameters::default();
        parameters
            .set(&ParameterUpdate {
                e_l: Some(-60.0),
                v_th: Some(-50.0),
                v_reset: Some(-62.0),
                ..Default::default()
            })
            .unwrap();
        assert_relative_eq!(parameters.v_th(), -50.0);
        assert_relative_eq!(parameters.v_reset(), -62.0);
        assert_relative_eq!(parameters.theta, 10.0);
        assert_relative_eq!(parameters.v_reset, -2.0);
    }

    #[test]
    fn test_validation_leaves_parameters_unchanged() {
        let mut parameters = Parameters::build(&[2.0, 5.0]).unwrap();
        let before = parameters.clone();

        let invalid_updates = vec![
            ParameterUpdate { c_m: Some(0.0), ..Default::default() },
            ParameterUpdate { tau_m: Some(-1.0), ..Default::default() },
            ParameterUpdate { t_ref: Some(-0.1), ..Default::default() },
            ParameterUpdate { tau_syn: Some(vec![1.0, 0.0]), ..Default::default() },
            ParameterUpdate { tau_syn: Some(vec![1.0, 10.0]), ..Default::default() },
            ParameterUpdate { tau_m: Some(5.0), ..Default::default() },
            ParameterUpdate { v_reset: Some(-55.0), ..Default::default() },
            ParameterUpdate { e_l: Some(-60.0), i_e: Some(100.0), c_m: Some(f64::NAN), ..Default::default() },
        ];

        for update in invalid_updates {
            assert!(matches!(
                parameters.set(&update),
                Err(SNNError::InvalidParameter(_))
            ));
            assert_eq!(parameters, before);
        }
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let mut parameters = Parameters::build(&[2.0, 5.0]).unwrap();
        let before = parameters.clone();

        let invalid_updates = vec![
            ParameterUpdate { v_th: Some(f64::NAN), ..Default::default() },
            ParameterUpdate { v_reset: Some(f64::NAN), ..Default::default() },
            ParameterUpdate { e_l: Some(f64::NAN), ..Default::default() },
            ParameterUpdate { e_l: Some(f64::NEG_INFINITY), ..Default::default() },
            ParameterUpdate { i_e: Some(f64::INFINITY), ..Default::default() },
            ParameterUpdate { c_m: Some(f64::INFINITY), ..Default::default() },
            ParameterUpdate { tau_m: Some(f64::INFINITY), ..Default::default() },
            ParameterUpdate { t_ref: Some(f64::INFINITY), ..Default::default() },
            ParameterUpdate { v_m: Some(f64::NAN), ..Default::default() },
            ParameterUpdate { tau_syn: Some(vec![2.0, f64::INFINITY]), ..Default::default() },
        ];

        for update in invalid_updates {
            assert!(matches!(
                parameters.set(&update),
                Err(SNNError::InvalidParameter(_))
            ));
            assert_eq!(parameters, before);
        }

        assert_eq!(
            parameters.set(&ParameterUpdate { v_th: Some(f64::NAN), ..Default::default() }),
            Err(SNNError::InvalidParameter("V_th must be finite.".to_string()))
        );
        assert!(Parameters::build(&[f64::INFINITY]).is_err());
    }

    #[test]
    fn test_reset_threshold_overflow_rejected() {
        let mut parameters = Parameters::default();
        // Finite inputs whose relative values overflow.
        let update = ParameterUpdate {
            e_l: Some(f64::MAX),
            v_reset: Some(-f64::MAX),
            v_th: Some(-f64::MAX),
            ..Default::default()
        };
        assert!(parameters.set(&update).is_err());
        assert_eq!(parameters, Parameters::default());
    }

    #[test]
    fn test_validation_order() {
        let mut parameters = Parameters::default();
        assert_eq!(
            parameters.set(&ParameterUpdate {
                c_m: Some(-1.0),
                tau_m: Some(-1.0),
                ..Default::default()
            }),
            Err(SNNError::InvalidParameter("Capacitance must be > 0.".to_string()))
        );
        assert_eq!(
            parameters.set(&ParameterUpdate {
                t_ref: Some(-1.0),
                tau_syn: Some(vec![-1.0]),
                ..Default::default()
            }),
            Err(SNNError::InvalidParameter(
                "Refractory time must not be negative.".to_string()
            ))
        );
    }

    #[test]
    fn test_shrinking_receptors_with_connections() {
        let mut parameters = Parameters::build(&[2.0, 5.0]).unwrap();

        // Without connections, shrinking is allowed.
        parameters.set(&ParameterUpdate { tau_syn: Some(vec![2.0]), ..Default::default() }).unwrap();
        assert_eq!(parameters.num_receptors(), 1);

        parameters.has_connections = true;
        parameters.set(&ParameterUpdate { tau_syn: Some(vec![2.0, 3.0, 4.0]), ..Default::default() }).unwrap();
        assert_eq!(parameters.tau_syn(), &[2.0, 3.0, 4.0]);

        let before = parameters.clone();
        assert!(parameters.set(&ParameterUpdate { tau_syn: Some(vec![2.0]), ..Default::default() }).is_err());
        assert!(parameters.set(&ParameterUpdate { tau_syn: Some(vec![]), ..Default::default() }).is_err());
        assert_eq!(parameters, before);
    }

    #[test]
    fn test_set_scalar() {
        let mut update = ParameterUpdate::new();
        update.set_scalar("E_L", -65.0).unwrap().set_scalar("t_ref", 1.0).unwrap();
        update.set_tau_syn(&[0.5]);
        assert_eq!(update.e_l, Some(-65.0));
        assert_eq!(update.t_ref, Some(1.0));
        assert_eq!(
            update.fields(),
            vec![
                ParameterField::RestPotential,
                ParameterField::RefractoryDuration,
                ParameterField::SynapseTimeConstants
            ]
        );
        assert!(update.set_scalar("tau_syn", 1.0).is_err());
        assert!(update.set_scalar("g_L", 1.0).is_err());
    }

    #[test]
    fn test_update_from_json() {
        let update = ParameterUpdate::from_json(r#"{"E_L": -65.0, "tau_syn": [0.5, 2.0]}"#).unwrap();
        assert_eq!(update.e_l, Some(-65.0));
        assert_eq!(update.tau_syn, Some(vec![0.5, 2.0]));
        assert_eq!(update.v_th, None);

        assert!(matches!(
            ParameterUpdate::from_json(r#"{"E_L": -65.0, "V_peak": 0.0}"#),
            Err(SNNError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_update_load_from() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"C_m": 200.0, "tau_m": 20.0, "tau_syn": [1.0]}}"#).unwrap();

        let update = ParameterUpdate::load_from(file.path()).unwrap();
        assert_eq!(update.c_m, Some(200.0));
        assert_eq!(update.tau_m, Some(20.0));

        assert!(matches!(
            ParameterUpdate::load_from("does/not/exist.json"),
            Err(SNNError::IOError(_))
        ));
    }
}

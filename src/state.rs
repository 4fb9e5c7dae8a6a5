use crate::catalog::{MODULES, Module, find_module};
use crate::error::{LabError, LabResult};

/// Current slider values plus the selected module. Edits never mutate in
/// place: each one produces a fresh copy with a single field changed.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationState {
    pub theta_max: u32,
    pub phi: f64,
    pub s_total: f64,
    pub qubits: u32,
    pub coupling: f64,
    pub decoherence: f64,
    pub active_module_id: String,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self {
            theta_max: 50,
            phi: 1.618,
            s_total: 1.0,
            qubits: 4,
            coupling: 0.5,
            decoherence: 0.1,
            active_module_id: MODULES[0].id.to_string(),
        }
    }
}

impl SimulationState {
    pub fn active_module(&self) -> &'static Module {
        find_module(&self.active_module_id)
    }

    pub fn with_module(&self, id: &str) -> Self {
        Self {
            active_module_id: id.to_string(),
            ..self.clone()
        }
    }

    /// Parse `raw` for `param`, enforce the slider bounds, and return the
    /// edited copy.
    pub fn with_param(&self, param: Param, raw: &str) -> LabResult<Self> {
        let raw = raw.trim();
        let invalid = || LabError::InvalidValue {
            param: param.name(),
            value: raw.to_string(),
        };

        let value = if param.is_integer() {
            raw.parse::<u32>().map_err(|_| invalid())? as f64
        } else {
            raw.parse::<f64>().map_err(|_| invalid())?
        };
        if !value.is_finite() {
            return Err(invalid());
        }

        let (min, max) = param.range();
        if value < min || value > max {
            return Err(LabError::OutOfRange {
                param: param.name(),
                value,
                min,
                max,
            });
        }

        let mut next = self.clone();
        match param {
            Param::ThetaMax => next.theta_max = value as u32,
            Param::Phi => next.phi = value,
            Param::STotal => next.s_total = value,
            Param::Qubits => next.qubits = value as u32,
            Param::Coupling => next.coupling = value,
            Param::Decoherence => next.decoherence = value,
        }
        Ok(next)
    }

    pub fn value_of(&self, param: Param) -> f64 {
        match param {
            Param::ThetaMax => self.theta_max as f64,
            Param::Phi => self.phi,
            Param::STotal => self.s_total,
            Param::Qubits => self.qubits as f64,
            Param::Coupling => self.coupling,
            Param::Decoherence => self.decoherence,
        }
    }
}

/// The six numeric controls, in panel order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Param {
    STotal,
    Phi,
    Qubits,
    Coupling,
    Decoherence,
    ThetaMax,
}

impl Param {
    pub const ALL: [Param; 6] = [
        Param::STotal,
        Param::Phi,
        Param::Qubits,
        Param::Coupling,
        Param::Decoherence,
        Param::ThetaMax,
    ];

    pub fn from_name(name: &str) -> LabResult<Param> {
        let param = match name.trim().to_lowercase().as_str() {
            "stotal" | "s_total" | "s" | "modulation" => Param::STotal,
            "phi" | "ϕ" => Param::Phi,
            "qubits" | "n" => Param::Qubits,
            "coupling" | "j" => Param::Coupling,
            "decoherence" | "gamma" | "γ" => Param::Decoherence,
            "thetamax" | "theta_max" | "theta" | "length" => Param::ThetaMax,
            _ => return Err(LabError::UnknownParameter(name.to_string())),
        };
        Ok(param)
    }

    pub fn name(self) -> &'static str {
        match self {
            Param::STotal => "sTotal",
            Param::Phi => "phi",
            Param::Qubits => "qubits",
            Param::Coupling => "coupling",
            Param::Decoherence => "decoherence",
            Param::ThetaMax => "thetaMax",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Param::STotal => "Modulation (S_Total)",
            Param::Phi => "Phi Factor (ϕ)",
            Param::Qubits => "Qubits (N)",
            Param::Coupling => "Coupling (J)",
            Param::Decoherence => "Decoherence (Γ)",
            Param::ThetaMax => "Spiral Length (θ Max)",
        }
    }

    pub fn range(self) -> (f64, f64) {
        match self {
            Param::STotal => (0.0, 10.0),
            Param::Phi => (1.0, 2.5),
            Param::Qubits => (1.0, 32.0),
            Param::Coupling => (0.0, 1.0),
            Param::Decoherence => (0.0, 1.0),
            Param::ThetaMax => (10.0, 200.0),
        }
    }

    pub fn step(self) -> f64 {
        match self {
            Param::STotal => 0.1,
            Param::Phi => 0.001,
            Param::Qubits | Param::ThetaMax => 1.0,
            Param::Coupling | Param::Decoherence => 0.01,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, Param::Qubits | Param::ThetaMax)
    }

    /// Display precision used by the control panel.
    pub fn decimals(self) -> usize {
        match self {
            Param::Phi => 3,
            Param::STotal | Param::Coupling | Param::Decoherence => 2,
            Param::Qubits | Param::ThetaMax => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_session_start() {
        let state = SimulationState::default();
        assert_eq!(state.theta_max, 50);
        assert_eq!(state.phi, 1.618);
        assert_eq!(state.s_total, 1.0);
        assert_eq!(state.qubits, 4);
        assert_eq!(state.coupling, 0.5);
        assert_eq!(state.decoherence, 0.1);
        assert_eq!(state.active_module_id, "RECALLΩ");
    }

    #[test]
    fn edit_changes_exactly_one_field() {
        let state = SimulationState::default();
        let next = state.with_param(Param::Phi, "2.0").unwrap();
        assert_eq!(next.phi, 2.0);
        assert_eq!(SimulationState { phi: 1.618, ..next.clone() }, state);

        let next = state.with_param(Param::ThetaMax, "120").unwrap();
        assert_eq!(next.theta_max, 120);
        assert_eq!(next.qubits, state.qubits);
    }

    #[test]
    fn out_of_range_is_rejected() {
        let state = SimulationState::default();
        let err = state.with_param(Param::Phi, "3.0").unwrap_err();
        assert!(matches!(err, LabError::OutOfRange { param: "phi", .. }));
        assert!(state.with_param(Param::ThetaMax, "9").is_err());
        assert!(state.with_param(Param::Qubits, "33").is_err());
        assert!(state.with_param(Param::Decoherence, "-0.1").is_err());
    }

    #[test]
    fn bounds_are_inclusive() {
        let state = SimulationState::default();
        assert_eq!(state.with_param(Param::STotal, "10").unwrap().s_total, 10.0);
        assert_eq!(state.with_param(Param::Coupling, "0").unwrap().coupling, 0.0);
        assert_eq!(state.with_param(Param::Qubits, "32").unwrap().qubits, 32);
    }

    #[test]
    fn integer_params_reject_fractions_and_garbage() {
        let state = SimulationState::default();
        assert!(matches!(
            state.with_param(Param::Qubits, "4.5"),
            Err(LabError::InvalidValue { .. })
        ));
        assert!(matches!(
            state.with_param(Param::Phi, "golden"),
            Err(LabError::InvalidValue { .. })
        ));
        assert!(matches!(
            state.with_param(Param::STotal, "NaN"),
            Err(LabError::InvalidValue { .. })
        ));
    }

    #[test]
    fn param_names_and_aliases() {
        for param in Param::ALL {
            assert_eq!(Param::from_name(param.name()).unwrap(), param);
        }
        assert_eq!(Param::from_name("gamma").unwrap(), Param::Decoherence);
        assert_eq!(Param::from_name("S").unwrap(), Param::STotal);
        assert!(matches!(
            Param::from_name("spin"),
            Err(LabError::UnknownParameter(_))
        ));
    }

    #[test]
    fn unknown_module_id_resolves_to_first() {
        let state = SimulationState::default().with_module("GHOSTΩ");
        assert_eq!(state.active_module().id, "RECALLΩ");
        let state = state.with_module("CALMΩ");
        assert_eq!(state.active_module().perfect_number, 496);
    }
}

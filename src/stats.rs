// Display-only figures for the stat cards. None of these are physics:
// the labels are thematic, and the "Mersenne" exponent is a rough mapping
// kept as decoration.

use std::fmt;

use crate::catalog::Module;
use crate::state::SimulationState;

pub fn entropy(state: &SimulationState) -> f64 {
    state.decoherence * state.qubits as f64
}

pub fn resonance_hz(state: &SimulationState) -> f64 {
    state.phi * 100.0
}

/// round(log2(2n + 1) / 2). Not a real Mersenne exponent derivation.
pub fn display_mersenne_exponent(module: &Module) -> u32 {
    ((module.perfect_number as f64 * 2.0 + 1.0).log2() / 2.0).round() as u32
}

pub fn perfect_number(module: &Module) -> u64 {
    module.perfect_number
}

/// Format a number with comma separators: 8589869056 -> "8,589,869,056"
pub fn format_grouped(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stats {
    pub perfect_number: u64,
    pub mersenne_exponent: u32,
    pub entropy: f64,
    pub resonance_hz: f64,
}

impl Stats {
    pub fn derive(state: &SimulationState, module: &Module) -> Self {
        Stats {
            perfect_number: perfect_number(module),
            mersenne_exponent: display_mersenne_exponent(module),
            entropy: entropy(state),
            resonance_hz: resonance_hz(state),
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Perfect Number {} | Mersenne P 2^{}-1 | Entropy {:.3} | Resonance {:.1} Hz",
            format_grouped(self.perfect_number),
            self.mersenne_exponent,
            self.entropy,
            self.resonance_hz
        )
    }
}

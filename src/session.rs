use std::fmt::Write;

use tracing::debug;

use crate::catalog::{Module, list_modules, resolve_module};
use crate::error::LabResult;
use crate::oracle::OracleResult;
use crate::spiral::{CanvasSize, Point, generate_spiral};
use crate::state::{Param, SimulationState};
use crate::stats::{Stats, format_grouped};

/// Everything one operator session holds: the live parameters, the last
/// oracle reading, and whether a reading is in flight.
#[derive(Debug, Default)]
pub struct Session {
    state: SimulationState,
    oracle: Option<OracleResult>,
    pending: bool,
}

impl Session {
    pub fn new(state: SimulationState) -> Self {
        Session { state, oracle: None, pending: false }
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn active_module(&self) -> &'static Module {
        self.state.active_module()
    }

    pub fn spiral(&self, canvas: CanvasSize) -> Vec<Point> {
        generate_spiral(&self.state, self.active_module(), canvas)
    }

    pub fn stats(&self) -> Stats {
        Stats::derive(&self.state, self.active_module())
    }

    /// Apply one slider edit. The state is left untouched on error.
    pub fn apply(&mut self, param: Param, raw: &str) -> LabResult<()> {
        self.state = self.state.with_param(param, raw)?;
        debug!(param = param.name(), value = self.state.value_of(param), "parameter changed");
        Ok(())
    }

    pub fn select_module(&mut self, input: &str) -> Option<&'static Module> {
        let module = resolve_module(input)?;
        self.state = self.state.with_module(module.id);
        Some(module)
    }

    /// Snapshot for an oracle call. Returns `None` while a call is already
    /// pending, so a second trigger is ignored.
    pub fn begin_consult(&mut self) -> Option<(SimulationState, &'static Module)> {
        if self.pending {
            return None;
        }
        self.pending = true;
        self.oracle = None;
        Some((self.state.clone(), self.active_module()))
    }

    pub fn finish_consult(&mut self, result: OracleResult) {
        self.pending = false;
        self.oracle = Some(result);
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn oracle_result(&self) -> Option<&OracleResult> {
        self.oracle.as_ref()
    }

    pub fn reset_analysis(&mut self) {
        self.oracle = None;
    }

    pub fn render_report(&self) -> String {
        let module = self.active_module();
        let mut out = String::new();

        let _ = writeln!(
            out,
            "VIBRATIONAL_STATE: {} // QUBITS: {}",
            module.name(),
            self.state.qubits
        );
        let _ = writeln!(out, "module: {} ({})", module.name(), module.description);
        let _ = writeln!(out);

        for param in Param::ALL {
            let _ = writeln!(
                out,
                "  {:<24} {:>8.*}",
                param.label(),
                param.decimals(),
                self.state.value_of(param)
            );
        }
        let _ = writeln!(out);

        let stats = self.stats();
        let _ = writeln!(out, "  Perfect Number  {}", format_grouped(stats.perfect_number));
        let _ = writeln!(out, "  Mersenne P      2^{}-1", stats.mersenne_exponent);
        let _ = writeln!(out, "  Entropy         {:.3}", stats.entropy);
        let _ = writeln!(out, "  Resonance       {:.1} Hz", stats.resonance_hz);
        let _ = writeln!(out);

        match (&self.oracle, self.pending) {
            (_, true) => {
                let _ = writeln!(out, "oracle: CALCULATING_ENTROPY...");
            }
            (Some(result), false) => {
                let _ = writeln!(out, "Harmonic State: {}", result.harmonic_state);
                let _ = writeln!(out, "\"{}\"", result.interpretation);
                let _ = writeln!(out, "Focus: {}", result.suggested_focus);
            }
            (None, false) => {
                let _ = writeln!(out, "oracle: idle (/oracle to consult)");
            }
        }
        out
    }
}

/// One line per catalog entry, marking the active one.
pub fn render_catalog(active: &Module) -> String {
    let mut out = String::new();
    for module in list_modules() {
        let marker = if module.id == active.id { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "{} {:<10} PN: {:<14} {}",
            marker,
            module.name(),
            format_grouped(module.perfect_number),
            module.description
        );
    }
    out
}

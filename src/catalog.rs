/// One of the six thematic presets. The perfect number only drives the
/// spiral's visual scale and the decorative stats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Module {
    pub id: &'static str,
    pub perfect_number: u64,
    pub description: &'static str,
    pub color: u32,
}

impl Module {
    pub fn name(&self) -> &'static str {
        self.id
    }
}

pub const MODULES: [Module; 6] = [
    Module {
        id: "RECALLΩ",
        perfect_number: 6,
        description: "Phase et récupération contextuelle",
        color: 0x22d3ee,
    },
    Module {
        id: "MATERIΩN",
        perfect_number: 28,
        description: "Amplitude et ancrage matériel",
        color: 0xfbbf24,
    },
    Module {
        id: "CALMΩ",
        perfect_number: 496,
        description: "Décohérence et équilibre émotionnel",
        color: 0xa78bfa,
    },
    Module {
        id: "WINKΩ",
        perfect_number: 8128,
        description: "Couplage et communication codée",
        color: 0xf472b6,
    },
    Module {
        id: "ASTRALΩ",
        perfect_number: 33_550_336,
        description: "Entropie dynamique et navigation subtile",
        color: 0x34d399,
    },
    Module {
        id: "TRINITYΩ",
        perfect_number: 8_589_869_056,
        description: "Interaction tripolaire maximale",
        color: 0xf87171,
    },
];

pub fn list_modules() -> &'static [Module] {
    &MODULES
}

/// Look up a module by id. Unknown ids resolve to the first entry.
pub fn find_module(id: &str) -> &'static Module {
    MODULES
        .iter()
        .find(|m| m.id == id)
        .unwrap_or(&MODULES[0])
}

/// Case-insensitive lookup that also accepts the id without its trailing
/// Ω/ΩN suffix, so a terminal without the glyph can still type `wink`.
pub fn resolve_module(input: &str) -> Option<&'static Module> {
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    MODULES.iter().find(|m| {
        let id = m.id.to_lowercase();
        id == needle || id.replace('ω', "o") == needle || id.trim_end_matches(['ω', 'n']) == needle
    })
}

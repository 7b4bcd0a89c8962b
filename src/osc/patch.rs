/// Number of FM operators per voice.
pub const NUM_OPS: usize = 3;

/// Per-operator patch data, all in the raw hardware parameter domains.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OpPatch {
    /// Envelope rates, 0-99.
    pub rates: [u8; 4],
    /// Envelope levels, 0-99.
    pub levels: [u8; 4],
    /// Coarse frequency ratio, 0-31 (0 plays a sub-octave).
    pub coarse: u8,
    /// Fine ratio adjustment, 0-99 (percent of the coarse ratio).
    pub fine: u8,
    /// Detune, 0-14 with 7 as center.
    pub detune: u8,
    /// Output level, 0-99.
    pub output_level: u8,
}

/// A compiled patch: operator table, modulation matrix (`[carrier][modulator]`
/// raw amounts 0-99), and a display name for the demo host. Patches are
/// read-only and selected by index, never edited.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FmPatch {
    pub name: &'static str,
    pub ops: [OpPatch; NUM_OPS],
    pub matrix: [[u8; NUM_OPS]; NUM_OPS],
}

const fn op(
    rates: [u8; 4],
    levels: [u8; 4],
    coarse: u8,
    fine: u8,
    detune: u8,
    output_level: u8,
) -> OpPatch {
    OpPatch {
        rates,
        levels,
        coarse,
        fine,
        detune,
        output_level,
    }
}

const fn silent() -> OpPatch {
    op([99, 99, 99, 99], [0, 0, 0, 0], 1, 0, 7, 0)
}

/// The compiled patch bank.
pub static PATCHES: [FmPatch; 8] = [
    FmPatch {
        name: "INIT SINE",
        ops: [
            op([99, 99, 99, 99], [99, 99, 99, 0], 1, 0, 7, 99),
            silent(),
            silent(),
        ],
        matrix: [[0, 0, 0], [0, 0, 0], [0, 0, 0]],
    },
    FmPatch {
        name: "BRIGHT KEYS",
        ops: [
            op([95, 70, 40, 60], [99, 92, 85, 0], 1, 0, 7, 99),
            op([99, 60, 35, 55], [99, 70, 40, 0], 2, 0, 7, 0),
            silent(),
        ],
        matrix: [[0, 70, 0], [0, 0, 0], [0, 0, 0]],
    },
    FmPatch {
        name: "BELL",
        ops: [
            op([95, 40, 25, 45], [99, 85, 60, 0], 1, 0, 7, 99),
            op([95, 35, 20, 45], [99, 75, 45, 0], 3, 50, 9, 0),
            silent(),
        ],
        matrix: [[0, 85, 0], [0, 0, 0], [0, 0, 0]],
    },
    FmPatch {
        name: "SOLID BASS",
        ops: [
            op([99, 75, 50, 55], [99, 90, 80, 0], 0, 0, 7, 99),
            op([99, 65, 45, 50], [99, 80, 55, 0], 1, 0, 7, 0),
            op([99, 55, 40, 50], [99, 60, 30, 0], 1, 0, 7, 0),
        ],
        matrix: [[0, 75, 0], [0, 0, 45], [0, 0, 40]],
    },
    FmPatch {
        name: "DRAWBAR ORGAN",
        ops: [
            op([99, 90, 90, 70], [99, 99, 99, 0], 1, 0, 7, 90),
            op([99, 90, 90, 70], [99, 99, 99, 0], 2, 0, 6, 75),
            op([99, 90, 90, 70], [99, 99, 99, 0], 4, 0, 8, 50),
        ],
        matrix: [[0, 0, 0], [0, 0, 0], [0, 0, 0]],
    },
    FmPatch {
        name: "BRASS SECTION",
        ops: [
            op([70, 60, 45, 50], [99, 95, 90, 0], 1, 0, 7, 99),
            op([75, 55, 40, 50], [99, 85, 70, 0], 1, 0, 8, 0),
            op([80, 50, 35, 50], [99, 70, 50, 0], 1, 0, 6, 0),
        ],
        matrix: [[0, 60, 0], [0, 0, 50], [0, 0, 0]],
    },
    FmPatch {
        name: "WOOD PLUCK",
        ops: [
            op([99, 55, 30, 60], [99, 70, 0, 0], 1, 0, 7, 99),
            op([99, 45, 25, 60], [99, 50, 0, 0], 1, 0, 10, 0),
            silent(),
        ],
        matrix: [[0, 40, 0], [0, 0, 0], [0, 0, 0]],
    },
    FmPatch {
        name: "GLASS PAD",
        ops: [
            op([55, 45, 40, 35], [99, 95, 90, 0], 1, 0, 7, 90),
            op([50, 40, 35, 35], [99, 90, 80, 0], 7, 0, 7, 0),
            op([60, 45, 40, 35], [99, 85, 75, 0], 2, 0, 5, 45),
        ],
        matrix: [[0, 0, 75], [0, 0, 0], [0, 0, 0]],
    },
];

/// Clamp a raw patch index into the compiled bank.
pub fn clip_patch_index(index: usize) -> usize {
    index.min(PATCHES.len() - 1)
}

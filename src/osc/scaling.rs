// Rate/level scaling for the 0-99 parameter domain. The tables preserve the
// DX7 hardware's asymmetric level curve and its near-1.0 per-sample decay
// constants; timing-sensitive behavior depends on these exact values.

/// Per-sample exponential decay constants indexed by raw rate 0-99.
pub const RATES: [f32; 100] = [
    0.9999980835,
    0.9999978521,
    0.9999975927,
    0.999997302,
    0.9999969763,
    0.9999966111,
    0.9999962019,
    0.9999957433,
    0.9999952293,
    0.9999946532,
    0.9999940076,
    0.999993284,
    0.999992473,
    0.9999915641,
    0.9999905455,
    0.9999894038,
    0.9999881243,
    0.9999866903,
    0.9999850831,
    0.9999832819,
    0.9999812631,
    0.9999790006,
    0.9999764649,
    0.999973623,
    0.9999704379,
    0.9999668682,
    0.9999628675,
    0.9999583836,
    0.9999533584,
    0.9999477263,
    0.9999414141,
    0.9999343398,
    0.9999264112,
    0.9999175252,
    0.9999075661,
    0.9998964046,
    0.9998838952,
    0.9998698753,
    0.9998541624,
    0.9998365522,
    0.9998168156,
    0.9997946957,
    0.9997699047,
    0.9997421203,
    0.9997109807,
    0.999676081,
    0.9996369671,
    0.9995931301,
    0.9995439997,
    0.9994889367,
    0.9994272248,
    0.9993580609,
    0.9992805454,
    0.9991936698,
    0.9990963037,
    0.9989871804,
    0.9988648803,
    0.9987278122,
    0.9985741928,
    0.9984020236,
    0.9982090645,
    0.9979928053,
    0.9977504322,
    0.9974787922,
    0.9971743509,
    0.9968331478,
    0.9964507437,
    0.9960221634,
    0.9955418312,
    0.9950034979,
    0.9944001596,
    0.993723967,
    0.9929661227,
    0.9921167671,
    0.9911648499,
    0.9900979868,
    0.9889022976,
    0.9875622265,
    0.9860603389,
    0.9843770952,
    0.9824905963,
    0.9803762986,
    0.9780066949,
    0.9753509566,
    0.9723745323,
    0.9690386983,
    0.9653000554,
    0.9611099633,
    0.9564139087,
    0.9511507956,
    0.9452521504,
    0.9386412312,
    0.9312320295,
    0.9229281509,
    0.9136215614,
    0.9031911814,
    0.8915013108,
    0.8783998636,
    0.8637163887,
    0.8472598531,
];

/// Non-linear low end of the output-level curve (raw levels 0-19).
pub const LEVEL_LUT: [i32; 20] = [
    0, 5, 9, 13, 17, 20, 23, 25, 27, 29, 31, 33, 35, 37, 39, 41, 42, 43, 45, 46,
];

/// Approximate sample counts (at 44.1 kHz) for a zero-slope hold, indexed by
/// raw rate. Empirically measured; rates past the table use a linear fallback.
pub const STATICS: [i32; 77] = [
    1764000, 1764000, 1411200, 1411200, 1190700, 1014300, 992250, 882000, 705600, 705600, 584325,
    507150, 502740, 441000, 418950, 352800, 308700, 286650, 253575, 220500, 220500, 176400, 145530,
    145530, 125685, 110250, 110250, 88200, 88200, 74970, 61740, 61740, 55125, 48510, 44100, 37485,
    31311, 30870, 27562, 27562, 22050, 18522, 17640, 15435, 14112, 13230, 11025, 9261, 9261, 7717,
    6615, 6615, 5512, 5512, 4410, 3969, 3969, 3439, 2866, 2690, 2249, 1984, 1896, 1808, 1411, 1367,
    1234, 1146, 926, 837, 837, 705, 573, 573, 529, 441, 441,
];

/// Clip a raw parameter into the 0-99 domain.
pub fn clip_raw(raw: i32) -> i32 {
    raw.clamp(0, 99)
}

/// Normalize a raw 0-99 level to [0, 1].
pub fn scale_level(raw: f32) -> f32 {
    (raw / 99.0).clamp(0.0, 1.0)
}

/// Map a raw 0-99 level to the 0-127 output-level domain: a 20-entry lookup
/// below 20, `28 + raw` from 20 up.
pub fn scale_output_level(raw: i32) -> i32 {
    let raw = clip_raw(raw);
    if raw >= 20 {
        28 + raw
    } else {
        LEVEL_LUT[raw as usize]
    }
}

/// Per-sample multiplicative delta for a segment. Descending segments apply
/// the table constant directly; ascending segments apply its reciprocal so the
/// level converges upward instead.
pub fn scale_rate(raw: f32, start_level: f32, end_level: f32) -> f32 {
    let constant = RATES[clip_raw(raw as i32) as usize];
    if start_level < end_level {
        1.0 / constant
    } else {
        constant
    }
}

/// Segment duration in samples for a raw 0-99 rate, independent of direction.
/// Empirical power law fitted against hardware envelope timing.
pub fn rate_to_frames(raw: f32, sample_rate: f32) -> f32 {
    let raw = clip_raw(raw as i32) as f32;
    192.543832467932 * 0.893461267114903_f32.powf(raw) * sample_rate
}

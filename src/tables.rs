// Lookup tables for the enumerated WAVEDESC fields (LECROY_2_3 template)

pub static RECORD_TYPES: [&str; 10] = [
    "single_sweep",
    "interleaved",
    "histogram",
    "graph",
    "filter_coefficient",
    "complex",
    "extrema",
    "sequence_obsolete",
    "centered_RIS",
    "peak_detect",
];

pub static PROCESSINGS: [&str; 8] = [
    "no_processing",
    "fir_filter",
    "interpolated",
    "sparsed",
    "autoscaled",
    "no_result",
    "rolling",
    "cumulative",
];

pub static TIMEBASES: [&str; 49] = [
    "1_ps/div", "2_ps/div", "5_ps/div", "10_ps/div", "20_ps/div",
    "50_ps/div", "100_ps/div", "200_ps/div", "500_ps/div", "1_ns/div",
    "2_ns/div", "5_ns/div", "10_ns/div", "20_ns/div", "50_ns/div",
    "100_ns/div", "200_ns/div", "500_ns/div", "1_us/div", "2_us/div",
    "5_us/div", "10_us/div", "20_us/div", "50_us/div", "100_us/div",
    "200_us/div", "500_us/div", "1_ms/div", "2_ms/div", "5_ms/div",
    "10_ms/div", "20_ms/div", "50_ms/div", "100_ms/div", "200_ms/div",
    "500_ms/div", "1_s/div", "2_s/div", "5_s/div", "10_s/div",
    "20_s/div", "50_s/div", "100_s/div", "200_s/div", "500_s/div",
    "1_ks/div", "2_ks/div", "5_ks/div", "EXTERNAL",
];

// Index 1 and 3 both mean ground in the template.
pub static VERT_COUPLINGS: [&str; 5] = ["DC_50_Ohms", "ground", "DC_1MOhm", "ground", "AC,_1MOhm"];

pub static FIXED_VERT_GAINS: [&str; 28] = [
    "1_uV/div", "2_uV/div", "5_uV/div", "10_uV/div", "20_uV/div",
    "50_uV/div", "100_uV/div", "200_uV/div", "500_uV/div", "1_mV/div",
    "2_mV/div", "5_mV/div", "10_mV/div", "20_mV/div", "50_mV/div",
    "100_mV/div", "200_mV/div", "500_mV/div", "1_V/div", "2_V/div",
    "5_V/div", "10_V/div", "20_V/div", "50_V/div", "100_V/div",
    "200_V/div", "500_V/div", "1_kV/div",
];

//! Key profiles for template matching
//!
//! Each profile gives the expected weight of the 12 pitch classes relative to
//! the tonic (index 0 = tonic), for major and minor keys.

/// Available key profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyProfile {
    /// Electronic dance music profile, derived from EDM key annotations
    Edma,
}

const EDMA_MAJOR: [f32; 12] = [
    0.16519551, 0.04749026, 0.08293076, 0.06687112, 0.09994645, 0.09274123, 0.05294487,
    0.13159476, 0.05218986, 0.07443653, 0.06940723, 0.06424152,
];

const EDMA_MINOR: [f32; 12] = [
    0.17235348, 0.04, 0.0761009, 0.12221605, 0.05639959, 0.08001197, 0.05343368, 0.1454374,
    0.07618687, 0.05274242, 0.06120232, 0.05384378,
];

impl KeyProfile {
    pub fn name(self) -> &'static str {
        match self {
            KeyProfile::Edma => "edma",
        }
    }

    pub fn major(self) -> &'static [f32; 12] {
        match self {
            KeyProfile::Edma => &EDMA_MAJOR,
        }
    }

    pub fn minor(self) -> &'static [f32; 12] {
        match self {
            KeyProfile::Edma => &EDMA_MINOR,
        }
    }
}

/// Profile transposed so that `tonic` (0 = C) carries the tonic weight
pub fn rotate(profile: &[f32; 12], tonic: usize) -> [f32; 12] {
    let mut rotated = [0.0f32; 12];
    for (pitch, slot) in rotated.iter_mut().enumerate() {
        *slot = profile[(pitch + 12 - tonic % 12) % 12];
    }
    rotated
}

//! Reversible race codes.
//! Code format: <PRESET>-<WORD><NN>, e.g. CB-PAVE42, MT-COL07

use crate::course::PresetId;

fn fnv1a64(bytes: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;
    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash = (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME);
    }
    hash
}

fn sanitize_word(word: &str) -> String {
    word.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

pub const WORD_LIST: [&str; 64] = [
    "PAVE", "COL", "SPRINT", "ECHELON", "BIDON", "MUSETTE", "DOMESTIQ", "GRUPETTO", "PELOTON",
    "BONK", "ATTACK", "BREAK", "CHASE", "SUMMIT", "DESCENT", "HAIRPIN", "CROSSWND", "DRAFT",
    "WHEEL", "SADDLE", "CLEAT", "CHAIN", "SPOKE", "CADENCE", "TEMPO", "PULL", "ROULEUR",
    "CLIMBER", "PUNCHER", "LEADOUT", "FLAMME", "MAILLOT", "JERSEY", "POLKA", "GREEN", "YELLOW",
    "STAGE", "PROLOGUE", "ETAPE", "LANTERNE", "BELL", "FEED", "ZONE", "GEL", "GRAVEL", "DUST",
    "RAIN", "STORM", "GUST", "TAILWIND", "HEADWIND", "RIDGE", "PASS", "VALLEY", "ALPE", "GALIBIER",
    "VENTOUX", "ROUBAIX", "ARENBERG", "MUR", "KOPPENBG", "TOURMALT", "STELVIO", "ZONCOLAN",
];

const WORD_BITS: u32 = 6;
const NUMBER_BITS: u32 = 7;
const PACKED_MASK: u64 = (1 << (WORD_BITS + NUMBER_BITS)) - 1;

#[inline]
fn pack(word_index: u16, nn: u8) -> u16 {
    (word_index & 0x3F) | ((u16::from(nn) & 0x7F) << WORD_BITS)
}

#[inline]
fn unpack(packed: u16) -> (u16, u8) {
    let nn = u8::try_from((packed >> WORD_BITS) & 0x7F).unwrap_or(0);
    (packed & 0x3F, nn)
}

fn compose_seed(preset: PresetId, word_index: u16, nn: u8) -> u64 {
    let packed = pack(word_index, nn);
    // Domain-separated FNV input
    let prefix = preset.code_prefix().as_bytes();
    let mut buf = [0u8; 11];
    buf[..6].copy_from_slice(b"PELTN-");
    buf[6] = prefix[0];
    buf[7] = prefix[1];
    buf[8..10].copy_from_slice(&packed.to_le_bytes());
    buf[10] = 0x5A;
    let h = fnv1a64(&buf);
    (h & !PACKED_MASK) | u64::from(packed)
}

/// Render a seed as a race code for a preset.
#[must_use]
pub fn encode_race_code(preset: PresetId, seed: u64) -> String {
    let packed = u16::try_from(seed & PACKED_MASK).unwrap_or(0);
    let (wi, nn) = unpack(packed);
    let word = WORD_LIST
        .get(usize::from(wi))
        .copied()
        .unwrap_or(WORD_LIST[0]);
    format!("{}-{word}{:02}", preset.code_prefix(), nn % 100)
}

/// Parse a race code back into its preset and seed. Case and stray punctuation are ignored.
#[must_use]
pub fn decode_race_code(code: &str) -> Option<(PresetId, u64)> {
    let s = code.trim();
    let (prefix, rest) = s.split_once('-')?;
    let preset = PresetId::from_code_prefix(&prefix.to_ascii_uppercase())?;
    if rest.len() < 3 || !rest.is_char_boundary(rest.len() - 2) {
        return None;
    }
    let (word_part, nn_part) = rest.split_at(rest.len() - 2);
    let nn: u8 = nn_part.parse().ok()?;
    let word = sanitize_word(word_part);
    let idx = WORD_LIST.iter().position(|w| sanitize_word(w) == word)?;
    let wi = u16::try_from(idx).ok()?;
    Some((preset, compose_seed(preset, wi, nn)))
}

/// Fresh race code from arbitrary entropy.
#[must_use]
pub fn generate_race_code(preset: PresetId, entropy: u64) -> String {
    let len = u64::try_from(WORD_LIST.len()).unwrap_or(1);
    let wi = u16::try_from(entropy % len).unwrap_or(0);
    let nn = u8::try_from((entropy >> 17) % 100).unwrap_or(0);
    encode_race_code(preset, compose_seed(preset, wi, nn))
}

/// Accept either a plain numeric seed or a race code.
#[must_use]
pub fn parse_seed_token(token: &str) -> Option<(Option<PresetId>, u64)> {
    let token = token.trim();
    if let Ok(seed) = token.parse::<u64>() {
        return Some((None, seed));
    }
    decode_race_code(token).map(|(preset, seed)| (Some(preset), seed))
}

//! Seed inputs: numeric seeds, race codes and entropy-derived extras.
use anyhow::{Result, bail};
use peloton_game::{PresetId, encode_race_code, parse_seed_token};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

/// Seed metadata resolved from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    pub code: Option<String>,
    pub source_preset: Option<PresetId>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self {
            seed,
            code: None,
            source_preset: None,
        }
    }

    #[must_use]
    pub fn from_race_code(seed: u64, preset: PresetId, code: String) -> Self {
        Self {
            seed,
            code: Some(code),
            source_preset: Some(preset),
        }
    }

    /// Race codes only apply to the preset they were minted for; plain seeds apply everywhere.
    #[must_use]
    pub fn matches_preset(&self, preset: PresetId) -> bool {
        self.source_preset.is_none_or(|source| source == preset)
    }

    #[must_use]
    pub fn race_code_for(&self, preset: PresetId) -> String {
        if let (Some(code), Some(source)) = (&self.code, self.source_preset)
            && source == preset
        {
            return code.clone();
        }
        encode_race_code(preset, self.seed)
    }
}

/// Resolve CLI seed tokens, then append `random` seeds expanded from `entropy`.
///
/// Accepts integers (negative values use their magnitude) and race codes.
pub fn resolve_seed_inputs(tokens: &[String], random: usize, entropy: u64) -> Result<Vec<SeedInfo>> {
    let mut pending: Vec<SeedInfo> = Vec::new();
    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if let Ok(value) = token.parse::<i64>() {
            pending.push(SeedInfo::from_numeric(value.unsigned_abs()));
            continue;
        }
        match parse_seed_token(token) {
            Some((None, seed)) => pending.push(SeedInfo::from_numeric(seed)),
            Some((Some(preset), seed)) => {
                pending.push(SeedInfo::from_race_code(seed, preset, token.to_uppercase()));
            }
            None => bail!("Unrecognized seed token: {token}"),
        }
    }

    let mut rng = ChaCha8Rng::seed_from_u64(entropy);
    pending.extend((0..random).map(|_| SeedInfo::from_numeric(rng.r#gen::<u64>())));

    let mut seen = HashSet::new();
    let mut deduped: Vec<SeedInfo> = pending
        .into_iter()
        .filter(|info| seen.insert((info.seed, info.source_preset)))
        .collect();

    if deduped.is_empty() {
        deduped.push(SeedInfo::from_numeric(1337));
    }
    Ok(deduped)
}

//! Race weather and its effect modifiers.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_EXTREME_STREAK, WEATHER_PERSISTENCE};
use crate::course::PresetId;
use crate::numbers::clamp_probability;

/// Weather conditions affecting wind, shelter and incident odds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    #[default]
    Clear,
    Overcast,
    Rain,
    Crosswind,
    Storm,
}

const WEATHER_ORDER: [Weather; 5] = [
    Weather::Clear,
    Weather::Overcast,
    Weather::Rain,
    Weather::Crosswind,
    Weather::Storm,
];

impl Weather {
    /// Extreme weather is streak-limited.
    #[must_use]
    pub const fn is_extreme(self) -> bool {
        matches!(self, Self::Crosswind | Self::Storm)
    }

    /// Wet roads raise fall and cobblestone puncture odds.
    #[must_use]
    pub const fn is_wet(self) -> bool {
        matches!(self, Self::Rain | Self::Storm)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Overcast => "overcast",
            Self::Rain => "rain",
            Self::Crosswind => "crosswind",
            Self::Storm => "storm",
        }
    }

    /// Multiplier applied to the wind penalty card.
    #[must_use]
    pub const fn wind_card_multiplier(self) -> f64 {
        match self {
            Self::Crosswind | Self::Storm => 1.5,
            Self::Clear | Self::Overcast | Self::Rain => 1.0,
        }
    }

    /// Added to the base shelter recovery; the sum is floored at zero by the caller.
    #[must_use]
    pub const fn shelter_recovery_modifier(self) -> i32 {
        match self {
            Self::Clear => 1,
            Self::Overcast | Self::Crosswind => 0,
            Self::Rain => -1,
            Self::Storm => -2,
        }
    }

    /// Multiplier on the end-of-turn incident chance.
    #[must_use]
    pub const fn incident_multiplier(self) -> f64 {
        match self {
            Self::Clear | Self::Overcast => 1.0,
            Self::Crosswind => 1.2,
            Self::Rain => 1.5,
            Self::Storm => 1.8,
        }
    }

    /// Multiplier on cobblestone puncture odds.
    #[must_use]
    pub const fn puncture_multiplier(self) -> f64 {
        if self.is_wet() { 1.5 } else { 1.0 }
    }
}

/// Relative likelihood of each weather for a course preset.
#[must_use]
pub const fn weather_weights(preset: PresetId) -> [u32; 5] {
    // Order follows WEATHER_ORDER.
    match preset {
        PresetId::Flat => [40, 25, 10, 20, 5],
        PresetId::Hilly => [40, 30, 15, 10, 5],
        PresetId::Mountain => [35, 30, 20, 5, 10],
        PresetId::Balanced => [45, 25, 15, 10, 5],
        PresetId::Cobbles => [25, 30, 30, 10, 5],
    }
}

/// Weather tracking with extreme-weather streaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WeatherState {
    pub current: Weather,
    pub previous: Weather,
    pub extreme_streak: u8,
    pub turns_in_current: u32,
}

impl WeatherState {
    /// Draw the opening weather for a race.
    #[must_use]
    pub fn initial<R: Rng + ?Sized>(preset: PresetId, rng: &mut R) -> Self {
        let current = pick_weighted(&weather_weights(preset), false, rng);
        Self {
            current,
            previous: current,
            extreme_streak: u8::from(current.is_extreme()),
            turns_in_current: 1,
        }
    }
}

fn pick_weighted<R: Rng + ?Sized>(weights: &[u32; 5], calm_only: bool, rng: &mut R) -> Weather {
    let eligible = |weather: Weather| !calm_only || !weather.is_extreme();
    let total: u32 = WEATHER_ORDER
        .iter()
        .zip(weights)
        .filter(|(weather, _)| eligible(**weather))
        .map(|(_, weight)| *weight)
        .sum();
    if total == 0 {
        return Weather::Clear;
    }
    let mut roll = rng.gen_range(0..total);
    for (weather, weight) in WEATHER_ORDER.iter().zip(weights) {
        if !eligible(*weather) || *weight == 0 {
            continue;
        }
        if roll < *weight {
            return *weather;
        }
        roll -= weight;
    }
    Weather::Clear
}

/// Evolve the weather between turns. Returns the new weather when it changed.
pub fn evolve_weather<R: Rng + ?Sized>(
    state: &mut WeatherState,
    preset: PresetId,
    rng: &mut R,
) -> Option<Weather> {
    let streak_capped = state.current.is_extreme() && state.extreme_streak >= MAX_EXTREME_STREAK;
    let persistence = clamp_probability(WEATHER_PERSISTENCE);
    let mut next = if !streak_capped && rng.r#gen::<f64>() < persistence {
        state.current
    } else {
        pick_weighted(&weather_weights(preset), false, rng)
    };

    if next.is_extreme() && state.extreme_streak >= MAX_EXTREME_STREAK {
        next = pick_weighted(&weather_weights(preset), true, rng);
    }

    state.previous = state.current;
    state.current = next;
    state.extreme_streak = if next.is_extreme() {
        state.extreme_streak.saturating_add(1)
    } else {
        0
    };
    if next == state.previous {
        state.turns_in_current = state.turns_in_current.saturating_add(1);
        None
    } else {
        state.turns_in_current = 1;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn modifiers_match_conditions() {
        assert!(Weather::Rain.is_wet());
        assert!(!Weather::Crosswind.is_wet());
        assert!((Weather::Crosswind.wind_card_multiplier() - 1.5).abs() < f64::EPSILON);
        assert!((Weather::Rain.puncture_multiplier() - 1.5).abs() < f64::EPSILON);
        for weather in WEATHER_ORDER {
            assert!(3 + weather.shelter_recovery_modifier() >= 0);
        }
    }

    #[test]
    fn extreme_streak_is_capped() {
        for seed in 0..200 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut state = WeatherState {
                current: Weather::Storm,
                previous: Weather::Storm,
                extreme_streak: MAX_EXTREME_STREAK,
                turns_in_current: 3,
            };
            evolve_weather(&mut state, PresetId::Flat, &mut rng);
            assert!(!state.current.is_extreme(), "seed {seed}");
            assert_eq!(state.extreme_streak, 0);
        }
    }

    #[test]
    fn long_runs_never_exceed_streak_limit() {
        let mut rng = SmallRng::seed_from_u64(99);
        let mut state = WeatherState::initial(PresetId::Flat, &mut rng);
        for _ in 0..500 {
            evolve_weather(&mut state, PresetId::Flat, &mut rng);
            assert!(state.extreme_streak <= MAX_EXTREME_STREAK);
        }
    }

    #[test]
    fn change_is_reported() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut state = WeatherState::default();
        for _ in 0..50 {
            let before = state.current;
            let changed = evolve_weather(&mut state, PresetId::Cobbles, &mut rng);
            assert_eq!(changed.is_some(), before != state.current);
        }
    }
}

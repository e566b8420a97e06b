//! Race configuration consumed once to build the opening state.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::ai::{AiConfig, Difficulty, Personality, TacticalProfile};
use crate::constants::{
    DEFAULT_COURSE_LENGTH, DEFAULT_RIDERS_PER_TEAM, MAX_COURSE_LENGTH, MAX_RIDERS_PER_TEAM,
    MAX_TEAMS, MIN_COURSE_LENGTH,
};
use crate::course::PresetId;
use crate::rider::RiderType;
use crate::rng::StreamSeeds;
use crate::stage_race::StageSpec;

/// Errors emitted when validating a race configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("at least one player is required")]
    NoPlayers,
    #[error("{count} teams configured; at most {max} are supported")]
    TooManyTeams { count: usize, max: usize },
    #[error("team id must not be empty")]
    EmptyTeamId,
    #[error("duplicate team id `{0}`")]
    DuplicateTeam(String),
    #[error("{field} must be within [{min}, {max}] (got {value})")]
    RangeViolation {
        field: &'static str,
        min: u32,
        max: u32,
        value: u32,
    },
    #[error("team `{team}` has {count} riders; expected 1 to {max}")]
    RosterSize {
        team: String,
        count: usize,
        max: usize,
    },
    #[error("stage race requires at least one stage")]
    EmptyStageList,
}

/// Who takes decisions for a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Controller {
    #[default]
    Human,
    Ai(AiConfig),
}

impl Controller {
    #[must_use]
    pub const fn ai_config(&self) -> Option<&AiConfig> {
        match self {
            Self::Ai(config) => Some(config),
            Self::Human => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiderSpec {
    pub name: String,
    pub rider_type: RiderType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub team_id: String,
    pub name: String,
    #[serde(default)]
    pub controller: Controller,
    /// Explicit roster; empty means the default archetype rotation.
    #[serde(default)]
    pub riders: Vec<RiderSpec>,
}

const ROSTER_ROTATION: [RiderType; 5] = [
    RiderType::Climber,
    RiderType::Puncher,
    RiderType::Rouleur,
    RiderType::Sprinter,
    RiderType::Versatile,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub players: Vec<PlayerConfig>,
    #[serde(default = "GameConfig::default_course_length")]
    pub course_length: u32,
    #[serde(default)]
    pub preset: PresetId,
    /// Present for stage races; overrides `preset` and `course_length` per stage.
    #[serde(default)]
    pub stage_race: Option<Vec<StageSpec>>,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub stream_seeds: StreamSeeds,
    #[serde(default = "GameConfig::default_riders_per_team")]
    pub riders_per_team: usize,
}

impl GameConfig {
    const fn default_course_length() -> u32 {
        DEFAULT_COURSE_LENGTH
    }

    const fn default_riders_per_team() -> usize {
        DEFAULT_RIDERS_PER_TEAM
    }

    /// All-AI race with a spread of difficulties and personalities.
    #[must_use]
    pub fn ai_race(preset: PresetId, seed: u64, team_count: usize) -> Self {
        const DIFFICULTIES: [Difficulty; 3] = [Difficulty::Normal, Difficulty::Hard, Difficulty::Easy];
        const PERSONALITIES: [Personality; 4] = [
            Personality::Balanced,
            Personality::Attacker,
            Personality::Conservative,
            Personality::Opportunist,
        ];
        const PROFILES: [TacticalProfile; 3] = [
            TacticalProfile::Balanced,
            TacticalProfile::Opportunistic,
            TacticalProfile::Conservative,
        ];
        let players = (0..team_count)
            .map(|index| PlayerConfig {
                team_id: format!("team-{}", index + 1),
                name: format!("Team {}", index + 1),
                controller: Controller::Ai(AiConfig {
                    difficulty: DIFFICULTIES[index % DIFFICULTIES.len()],
                    personality: PERSONALITIES[index % PERSONALITIES.len()],
                    tactical_profile: PROFILES[index % PROFILES.len()],
                }),
                riders: Vec::new(),
            })
            .collect();
        Self {
            players,
            preset,
            seed,
            ..Self::default()
        }
    }

    /// Roster for a player, falling back to the archetype rotation.
    #[must_use]
    pub fn roster_for(&self, player: &PlayerConfig) -> Vec<RiderSpec> {
        if !player.riders.is_empty() {
            return player.riders.clone();
        }
        (0..self.riders_per_team)
            .map(|index| {
                let rider_type = ROSTER_ROTATION[index % ROSTER_ROTATION.len()];
                RiderSpec {
                    name: format!("{} {}", player.name, rider_type.as_str()),
                    rider_type,
                }
            })
            .collect()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_players()?;
        validate_length("course_length", self.course_length)?;
        if let Some(stages) = &self.stage_race {
            if stages.is_empty() {
                return Err(ConfigError::EmptyStageList);
            }
            for stage in stages {
                validate_length("stage_race.length", stage.length)?;
            }
        }
        Ok(())
    }

    fn validate_players(&self) -> Result<(), ConfigError> {
        if self.players.is_empty() {
            return Err(ConfigError::NoPlayers);
        }
        if self.players.len() > MAX_TEAMS {
            return Err(ConfigError::TooManyTeams {
                count: self.players.len(),
                max: MAX_TEAMS,
            });
        }
        let mut seen = HashSet::new();
        for player in &self.players {
            if player.team_id.trim().is_empty() {
                return Err(ConfigError::EmptyTeamId);
            }
            if !seen.insert(player.team_id.as_str()) {
                return Err(ConfigError::DuplicateTeam(player.team_id.clone()));
            }
            let count = self.roster_for(player).len();
            if count == 0 || count > MAX_RIDERS_PER_TEAM {
                return Err(ConfigError::RosterSize {
                    team: player.team_id.clone(),
                    count,
                    max: MAX_RIDERS_PER_TEAM,
                });
            }
        }
        Ok(())
    }
}

fn validate_length(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if (MIN_COURSE_LENGTH..=MAX_COURSE_LENGTH).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::RangeViolation {
            field,
            min: MIN_COURSE_LENGTH,
            max: MAX_COURSE_LENGTH,
            value,
        })
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            players: Vec::new(),
            course_length: Self::default_course_length(),
            preset: PresetId::default(),
            stage_race: None,
            seed: 0,
            stream_seeds: StreamSeeds::default(),
            riders_per_team: Self::default_riders_per_team(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage_race::StageType;

    #[test]
    fn ai_race_is_valid() {
        let config = GameConfig::ai_race(PresetId::Mountain, 42, 4);
        assert!(config.validate().is_ok());
        assert_eq!(config.players.len(), 4);
        assert!(config.players.iter().all(|p| p.controller.ai_config().is_some()));
        assert_eq!(config.roster_for(&config.players[0]).len(), DEFAULT_RIDERS_PER_TEAM);
    }

    #[test]
    fn rejects_bad_lengths_and_duplicates() {
        let mut config = GameConfig::ai_race(PresetId::Flat, 1, 2);
        config.course_length = 10;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RangeViolation { field: "course_length", .. })
        ));
        config.course_length = 80;
        config.players[1].team_id = config.players[0].team_id.clone();
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateTeam("team-1".into()))
        );
    }

    #[test]
    fn rejects_empty_inputs() {
        assert_eq!(GameConfig::default().validate(), Err(ConfigError::NoPlayers));
        let mut config = GameConfig::ai_race(PresetId::Flat, 1, 2);
        config.riders_per_team = 0;
        assert!(matches!(config.validate(), Err(ConfigError::RosterSize { count: 0, .. })));
        config.riders_per_team = 3;
        config.stage_race = Some(Vec::new());
        assert_eq!(config.validate(), Err(ConfigError::EmptyStageList));
        config.stage_race = Some(vec![StageSpec { stage_type: StageType::Flat, length: 20 }]);
        assert!(matches!(config.validate(), Err(ConfigError::RangeViolation { .. })));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let json = r#"{"players":[{"team_id":"x","name":"X","controller":"human"}]}"#;
        let config: GameConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.course_length, DEFAULT_COURSE_LENGTH);
        assert_eq!(config.riders_per_team, DEFAULT_RIDERS_PER_TEAM);
        assert!(config.validate().is_ok());
    }
}

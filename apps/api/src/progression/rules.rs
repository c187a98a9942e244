//! Level and XP rules. Pure functions over `Progress`, applied by the
//! handlers before persisting.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Last level of the journey.
pub const MAX_LEVEL: i32 = 20;
pub const DEFAULT_XP_REWARD: i64 = 100;
pub const MAX_XP_REWARD: i64 = 1000;

/// The mutable part of a progression row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub level: i32,
    pub xp: i64,
    pub quests: Vec<String>,
    pub perks: Vec<String>,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            level: 1,
            xp: 0,
            quests: Vec::new(),
            perks: Vec::new(),
        }
    }
}

/// Partial update sent by `PUT /api/progression/:userId`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgressPatch {
    pub level: Option<i32>,
    pub xp: Option<i64>,
    pub quests: Option<Vec<String>>,
    pub perks: Option<Vec<String>>,
}

/// Quest recorded when a level is completed.
pub fn level_quest(level: i32) -> String {
    format!("level-{level}")
}

fn check_level(level: i32) -> Result<(), AppError> {
    if (1..=MAX_LEVEL).contains(&level) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "level must be between 1 and {MAX_LEVEL}"
        )))
    }
}

impl Progress {
    pub fn apply(mut self, patch: ProgressPatch) -> Result<Self, AppError> {
        if let Some(level) = patch.level {
            check_level(level)?;
            self.level = level;
        }
        if let Some(xp) = patch.xp {
            if xp < 0 {
                return Err(AppError::Validation("xp cannot be negative".to_string()));
            }
            self.xp = xp;
        }
        if let Some(quests) = patch.quests {
            self.quests = dedup(quests);
        }
        if let Some(perks) = patch.perks {
            self.perks = dedup(perks);
        }
        Ok(self)
    }

    /// Outcome of finishing `level`. Completing the current level advances
    /// one level (stopping at `MAX_LEVEL`) and grants the reward once.
    /// Replaying an earlier level changes nothing.
    pub fn complete_level(mut self, level: i32, xp_reward: Option<i64>) -> Result<(Self, bool), AppError> {
        check_level(level)?;
        let reward = xp_reward.unwrap_or(DEFAULT_XP_REWARD);
        if !(0..=MAX_XP_REWARD).contains(&reward) {
            return Err(AppError::Validation(format!(
                "xp_reward must be between 0 and {MAX_XP_REWARD}"
            )));
        }
        if level > self.level {
            return Err(AppError::Validation(format!(
                "level {level} is not unlocked yet (current level {})",
                self.level
            )));
        }

        let quest = level_quest(level);
        if level < self.level || self.quests.contains(&quest) {
            return Ok((self, false));
        }

        self.quests.push(quest);
        self.xp = self.xp.saturating_add(reward);
        self.level = (self.level + 1).min(MAX_LEVEL);
        Ok((self, true))
    }
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let item = item.trim().to_string();
        if !item.is_empty() && !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

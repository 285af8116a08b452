//! Rank progression derived from a user's point total.

use crate::config::{Config, LevelDefinition};

#[derive(Debug, Clone)]
pub struct LevelTable {
    levels: Vec<LevelDefinition>,
}

impl LevelTable {
    /// Levels are sorted by `min_points` on construction.
    pub fn new(mut levels: Vec<LevelDefinition>) -> Self {
        levels.sort_by_key(|l| l.min_points);
        Self { levels }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.levels.clone())
    }

    pub fn levels(&self) -> &[LevelDefinition] {
        &self.levels
    }

    /// Highest level whose threshold has been reached. Totals below the first
    /// threshold still map to the first level.
    pub fn level_for(&self, points: i64) -> Option<&LevelDefinition> {
        self.levels
            .iter()
            .rev()
            .find(|l| points >= l.min_points)
            .or_else(|| self.levels.first())
    }

    /// The next level to reach, or `None` at the top.
    pub fn next_level(&self, points: i64) -> Option<&LevelDefinition> {
        self.levels.iter().find(|l| l.min_points > points)
    }

    /// Fraction of the way from the current level to the next, in
    /// `0.0..=1.0`. Always 1.0 at the top level.
    pub fn progress(&self, points: i64) -> f64 {
        let Some(next) = self.next_level(points) else {
            return 1.0;
        };
        let floor = match self.levels.iter().rev().find(|l| points >= l.min_points) {
            Some(current) => current.min_points,
            None => return 0.0,
        };
        let span = (next.min_points - floor) as f64;
        ((points - floor) as f64 / span).clamp(0.0, 1.0)
    }
}

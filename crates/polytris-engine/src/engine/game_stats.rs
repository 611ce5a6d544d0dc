/// Point values used by a session.
///
/// The defaults are the standard rules: 10 points per gravity row, 100 points per
/// cleared line, combo multiplier 4 and hard drops worth twice a gravity row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringRules {
    /// Points for every gravity step, and the base value of a hard-dropped row.
    pub points_per_row: u64,
    /// Points for each cleared line.
    pub points_per_clear: u64,
    /// Multiplier applied per combo step once a combo is running.
    pub combo_multiplier: u64,
    /// Multiplier applied to rows skipped by a hard drop.
    pub drop_line_multiplier: u64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            points_per_row: 10,
            points_per_clear: 100,
            combo_multiplier: 4,
            drop_line_multiplier: 2,
        }
    }
}

/// How the combo counter evolves between locks.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum ComboRule {
    /// The combo counter never changes, so every clear scores with multiplier 1.
    #[default]
    Frozen,
    /// Each lock that clears lines extends the combo; a lock that clears nothing resets it.
    Consecutive,
}

/// Score, line and combo counters of a session.
///
/// # Scoring
///
/// - Every gravity step: `points_per_row`
/// - Hard drop of `n` rows: `n * drop_line_multiplier * points_per_row`
/// - Lock clearing `n` lines: `m * points_per_clear * n`, where `m` is 1 without a
///   combo and `combo_multiplier * combo` otherwise
///
/// # Example
///
/// ```
/// use polytris_engine::{ComboRule, GameStats, ScoringRules};
///
/// let rules = ScoringRules::default();
/// let mut stats = GameStats::new();
/// stats.complete_piece_lock(2, &rules, ComboRule::Frozen);
///
/// assert_eq!(stats.score(), 200);
/// assert_eq!(stats.cleared_lines(), 2);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GameStats {
    score: u64,
    cleared_lines: u64,
    combo: u64,
    completed_pieces: u64,
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            cleared_lines: 0,
            combo: 0,
            completed_pieces: 0,
        }
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    #[must_use]
    pub const fn cleared_lines(&self) -> u64 {
        self.cleared_lines
    }

    #[must_use]
    pub const fn combo(&self) -> u64 {
        self.combo
    }

    /// Returns the number of pieces locked into the board.
    #[must_use]
    pub const fn completed_pieces(&self) -> u64 {
        self.completed_pieces
    }

    pub fn add_gravity_points(&mut self, rules: &ScoringRules) {
        self.score += rules.points_per_row;
    }

    pub fn add_hard_drop_points(&mut self, rows: u64, rules: &ScoringRules) {
        self.score += rows * rules.drop_line_multiplier * rules.points_per_row;
    }

    /// Updates the counters after a piece locks and `cleared` lines were removed.
    pub fn complete_piece_lock(&mut self, cleared: usize, rules: &ScoringRules, combo: ComboRule) {
        let cleared = u64::try_from(cleared).expect("cleared line count fits in u64");
        self.completed_pieces += 1;
        self.cleared_lines += cleared;
        if cleared > 0 {
            let multiplier = if self.combo == 0 {
                1
            } else {
                rules.combo_multiplier * self.combo
            };
            self.score += multiplier * rules.points_per_clear * cleared;
        }
        if combo.is_consecutive() {
            self.combo = if cleared > 0 { self.combo + 1 } else { 0 };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gravity_and_hard_drop_points() {
        let rules = ScoringRules::default();
        let mut stats = GameStats::new();
        stats.add_gravity_points(&rules);
        assert_eq!(stats.score(), 10);
        stats.add_hard_drop_points(7, &rules);
        assert_eq!(stats.score(), 10 + 7 * 2 * 10);
    }

    #[test]
    fn test_frozen_combo_scores_with_multiplier_one() {
        let rules = ScoringRules::default();
        let mut stats = GameStats::new();
        stats.complete_piece_lock(2, &rules, ComboRule::Frozen);
        assert_eq!(stats.score(), 200);
        stats.complete_piece_lock(1, &rules, ComboRule::Frozen);
        assert_eq!(stats.score(), 300);
        assert_eq!(stats.combo(), 0);
        assert_eq!(stats.cleared_lines(), 3);
        assert_eq!(stats.completed_pieces(), 2);
    }

    #[test]
    fn test_consecutive_combo_multiplies_later_clears() {
        let rules = ScoringRules::default();
        let mut stats = GameStats::new();
        stats.complete_piece_lock(1, &rules, ComboRule::Consecutive);
        assert_eq!(stats.score(), 100);
        assert_eq!(stats.combo(), 1);

        stats.complete_piece_lock(2, &rules, ComboRule::Consecutive);
        assert_eq!(stats.score(), 100 + 4 * 100 * 2);
        assert_eq!(stats.combo(), 2);

        stats.complete_piece_lock(0, &rules, ComboRule::Consecutive);
        assert_eq!(stats.score(), 900);
        assert_eq!(stats.combo(), 0);

        stats.complete_piece_lock(1, &rules, ComboRule::Consecutive);
        assert_eq!(stats.score(), 1000);
    }

    #[test]
    fn test_lock_without_clear_scores_nothing() {
        let mut stats = GameStats::new();
        stats.complete_piece_lock(0, &ScoringRules::default(), ComboRule::Frozen);
        assert_eq!(stats.score(), 0);
        assert_eq!(stats.completed_pieces(), 1);
    }
}

//! Single-elimination bracket advancement.
//!
//! When a bracketed match finishes, its winner is seated one round ahead:
//! slot `s` feeds slot `ceil(s / 2)` of the successor phase, on the blue
//! side when `s` is odd and the red side when `s` is even. The successor
//! match is created on first advancement and side-patched on the second,
//! through a single conflict-safe upsert.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::database::models::{Match, Phase, Side};
use crate::database::{MatchDatabase, PgDatabase};
use crate::CoreError;

/// Days between a match and the provisional date of its successor. A
/// placeholder for the admin to reschedule, not a promise.
const SUCCESSOR_OFFSET_DAYS: i64 = 7;

/// The bracket position a winner advances into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketTarget {
    pub phase: Phase,
    pub slot: i32,
    pub side: Side,
}

/// A fully-resolved advancement, ready to apply against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketAdvance {
    pub tournament_id: Uuid,
    pub team_id: Uuid,
    pub target: BracketTarget,
    pub provisional_date: DateTime<Utc>,
}

/// Why a finished match produces no advancement. None of these are errors;
/// the bracket simply has nothing to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceSkip {
    /// Group or exhibition match without a bracket slot.
    NotBracketed,
    /// The phase has no successor: the final, or group play.
    TerminalPhase,
    /// The declared winner is not seated on either side of the match.
    WinnerNotSeated,
}

/// The slot of the successor phase fed by `slot` (1-indexed).
pub fn successor_slot(slot: i32) -> i32 {
    (slot + 1) / 2
}

/// The side the winner of `slot` occupies in the successor match.
pub fn side_for_slot(slot: i32) -> Side {
    if slot % 2 == 1 {
        Side::Blue
    } else {
        Side::Red
    }
}

/// Plans the advancement for a finished match. Pure; the store is only
/// touched when the plan is applied.
pub fn plan_advance(game: &Match, winner_team_id: Uuid) -> Result<BracketAdvance, AdvanceSkip> {
    let slot = game.bracket_slot.ok_or(AdvanceSkip::NotBracketed)?;
    let phase = game.phase.successor().ok_or(AdvanceSkip::TerminalPhase)?;

    if game.side_of(winner_team_id).is_none() {
        return Err(AdvanceSkip::WinnerNotSeated);
    }

    Ok(BracketAdvance {
        tournament_id: game.tournament_id,
        team_id: winner_team_id,
        target: BracketTarget {
            phase,
            slot: successor_slot(slot),
            side: side_for_slot(slot),
        },
        provisional_date: game.scheduled_at + Duration::days(SUCCESSOR_OFFSET_DAYS),
    })
}

/// Seats the winner of a finished match one round ahead.
///
/// Looks the match up, plans the target position and applies it as an
/// upsert: the first branch to arrive creates the successor match with one
/// seat taken, the second patches the remaining side. Re-running with the
/// same inputs rewrites the same seat with the same team, so the operation
/// is idempotent.
pub async fn advance_bracket(
    db: &PgDatabase,
    match_id: Uuid,
    winner_team_id: Uuid,
) -> Result<(), CoreError> {
    let game = match db.get_match(match_id).await? {
        Some(game) => game,
        None => {
            warn!("No match {match_id} to advance the bracket from");
            return Ok(());
        }
    };

    let advance = match plan_advance(&game, winner_team_id) {
        Ok(advance) => advance,
        Err(AdvanceSkip::WinnerNotSeated) => {
            warn!(
                "Team {winner_team_id} won match {match_id} but is seated on neither side; \
                 leaving the bracket untouched"
            );
            return Ok(());
        }
        Err(skip) => {
            debug!("Match {match_id} feeds no successor ({skip:?})");
            return Ok(());
        }
    };

    let successor_id = db
        .upsert_bracket_seat(
            advance.tournament_id,
            advance.target.phase,
            advance.target.slot,
            advance.target.side,
            advance.team_id,
            advance.provisional_date,
        )
        .await?;

    info!(
        "Advanced team {} to {} slot {} ({} side) as match {}",
        advance.team_id, advance.target.phase, advance.target.slot, advance.target.side,
        successor_id
    );

    Ok(())
}

/// Fire-and-forget advancement for the statistics path. Bracket upkeep must
/// never fail a result submission, so every error ends here as a log line.
pub async fn advance_bracket_best_effort(db: &PgDatabase, match_id: Uuid, winner_team_id: Uuid) {
    if let Err(e) = advance_bracket(db, match_id, winner_team_id).await {
        error!("Failed to advance the bracket for match {match_id}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::MatchStatus;

    fn bracket_match(phase: Phase, slot: Option<i32>) -> (Match, Uuid, Uuid) {
        let blue = Uuid::new_v4();
        let red = Uuid::new_v4();
        let game = Match {
            id: Uuid::new_v4(),
            tournament_id: Uuid::new_v4(),
            phase,
            bracket_slot: slot,
            blue_team_id: Some(blue),
            red_team_id: Some(red),
            scheduled_at: Utc::now(),
            status: MatchStatus::Finished,
            winner_id: None,
            duration_seconds: None,
            provider_match_id: None,
        };
        (game, blue, red)
    }

    #[test]
    fn successor_slots_pair_up() {
        assert_eq!(successor_slot(1), 1);
        assert_eq!(successor_slot(2), 1);
        assert_eq!(successor_slot(3), 2);
        assert_eq!(successor_slot(4), 2);
        assert_eq!(successor_slot(7), 4);
        assert_eq!(successor_slot(8), 4);
    }

    #[test]
    fn odd_slots_take_blue_even_slots_take_red() {
        assert_eq!(side_for_slot(1), Side::Blue);
        assert_eq!(side_for_slot(2), Side::Red);
        assert_eq!(side_for_slot(3), Side::Blue);
        assert_eq!(side_for_slot(4), Side::Red);
    }

    #[test]
    fn semifinal_winner_advances_to_the_final() {
        let (game, blue, _) = bracket_match(Phase::Semifinal, Some(2));

        let advance = plan_advance(&game, blue).unwrap();
        assert_eq!(advance.target.phase, Phase::Final);
        assert_eq!(advance.target.slot, 1);
        assert_eq!(advance.target.side, Side::Red);
        assert_eq!(advance.team_id, blue);
        assert_eq!(
            advance.provisional_date,
            game.scheduled_at + Duration::days(7)
        );
    }

    #[test]
    fn final_and_group_matches_do_not_advance() {
        let (final_game, blue, _) = bracket_match(Phase::Final, Some(1));
        assert_eq!(
            plan_advance(&final_game, blue),
            Err(AdvanceSkip::TerminalPhase)
        );

        let (group_game, blue, _) = bracket_match(Phase::Groups, Some(1));
        assert_eq!(
            plan_advance(&group_game, blue),
            Err(AdvanceSkip::TerminalPhase)
        );
    }

    #[test]
    fn slotless_matches_do_not_advance() {
        let (game, blue, _) = bracket_match(Phase::Quarterfinal, None);
        assert_eq!(plan_advance(&game, blue), Err(AdvanceSkip::NotBracketed));
    }

    #[test]
    fn unseated_winner_is_rejected() {
        let (game, _, _) = bracket_match(Phase::Quarterfinal, Some(3));
        assert_eq!(
            plan_advance(&game, Uuid::new_v4()),
            Err(AdvanceSkip::WinnerNotSeated)
        );
    }

    #[test]
    fn planning_twice_yields_the_same_target() {
        let (game, _, red) = bracket_match(Phase::RoundOf16, Some(6));

        let first = plan_advance(&game, red).unwrap();
        let second = plan_advance(&game, red).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.target.phase, Phase::Quarterfinal);
        assert_eq!(first.target.slot, 3);
        assert_eq!(first.target.side, Side::Red);
    }

    #[test]
    fn sibling_slots_land_on_opposite_sides_of_one_match() {
        let (left, left_blue, _) = bracket_match(Phase::Quarterfinal, Some(3));
        let (right, _, right_red) = bracket_match(Phase::Quarterfinal, Some(4));

        let from_left = plan_advance(&left, left_blue).unwrap();
        let from_right = plan_advance(&right, right_red).unwrap();

        assert_eq!(from_left.target.phase, from_right.target.phase);
        assert_eq!(from_left.target.slot, from_right.target.slot);
        assert_eq!(from_left.target.side, Side::Blue);
        assert_eq!(from_right.target.side, Side::Red);
    }
}

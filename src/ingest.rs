//! Statistics entry and import.
//!
//! Manual form entry and provider imports both normalize to [`StatLine`]s
//! and go through the same replace-then-insert path, so the rest of the
//! system never knows where a statistic came from. Finalizing a result also
//! kicks off bracket advancement, strictly best-effort.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::{ApiResult, GameApi};
use crate::bracket::advance_bracket_best_effort;
use crate::database::models::{Lane, Match, MatchResultUpdate, NewStatistic, Side};
use crate::database::{MatchDatabase, PgDatabase, PlayerDatabase, StatsDatabase};
use crate::CoreError;

/// One player's line for one match, the shape shared by manual entry and
/// provider import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatLine {
    pub summoner_name: String,
    pub side: Side,
    pub lane: Option<Lane>,
    pub kills: i32,
    pub deaths: i32,
    pub assists: i32,
    pub cs_per_min: f64,
    pub dmg_per_min: f64,
    pub champion: String,
    pub win: bool,
}

/// What a submission ended up doing.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub inserted: usize,
    /// Summoner names that could not be matched to a registered player.
    pub skipped: Vec<String>,
    pub winner_id: Option<Uuid>,
}

/// The side that won, according to the lines themselves.
pub fn winning_side(lines: &[StatLine]) -> Option<Side> {
    lines.iter().find(|line| line.win).map(|line| line.side)
}

/// Records the full statistics set for a match, replacing whatever was
/// submitted before.
///
/// Lines for summoner names with no registered player are skipped with a
/// warning, mirroring how partial provider rosters are handled. A line on a
/// side whose seat is still open is a hard error: there is no team to
/// attribute it to, and nothing gets written.
///
/// On success the match is marked finished with its winner derived from the
/// winning side, and the bracket is advanced fire-and-forget.
pub async fn record_match_stats(
    db: &PgDatabase,
    match_id: Uuid,
    lines: Vec<StatLine>,
    duration_seconds: Option<i32>,
    provider_match_id: Option<String>,
) -> Result<IngestReport, CoreError> {
    let game = db
        .get_match(match_id)
        .await?
        .ok_or_else(|| anyhow!("Match {match_id} not found"))?;

    let mut rows = Vec::with_capacity(lines.len());
    let mut skipped = Vec::new();
    for line in &lines {
        let team_id = seated_side(&game, line.side)?;
        let player = match db.get_player_by_summoner_name(&line.summoner_name).await? {
            Some(player) => player,
            None => {
                warn!("No registered player named {:?}; skipping their line", line.summoner_name);
                skipped.push(line.summoner_name.clone());
                continue;
            }
        };

        rows.push(NewStatistic {
            player_id: player.id,
            team_id,
            lane: line.lane,
            kills: line.kills,
            deaths: line.deaths,
            assists: line.assists,
            cs_per_min: line.cs_per_min,
            dmg_per_min: line.dmg_per_min,
            champion: line.champion.clone(),
            win: line.win,
        });
    }

    let winner_id = match winning_side(&lines) {
        Some(side) => Some(seated_side(&game, side)?),
        None => None,
    };

    let inserted = db
        .replace_match_stats(
            match_id,
            &rows,
            &MatchResultUpdate {
                winner_id,
                duration_seconds,
                provider_match_id,
            },
        )
        .await?;

    info!("Recorded {inserted} statistic lines for match {match_id}");

    if let Some(winner_id) = winner_id {
        advance_bracket_best_effort(db, match_id, winner_id).await;
    }

    Ok(IngestReport {
        inserted,
        skipped,
        winner_id,
    })
}

/// Imports a match from the game provider and records it through the same
/// path as manual entry.
pub async fn import_provider_stats<A>(
    db: &PgDatabase,
    api: &A,
    match_id: Uuid,
    provider_match_id: &str,
) -> Result<IngestReport, CoreError>
where
    A: GameApi<Error = CoreError>,
{
    let provider_match = match api.get_match(provider_match_id).await? {
        ApiResult::Ok(provider_match) => provider_match,
        ApiResult::NotFound => {
            return Err(anyhow!("Match {provider_match_id} not found on the game provider"));
        }
        ApiResult::Maintenance => {
            return Err(anyhow!("The game provider is under maintenance; try again later"));
        }
    };

    let lines = provider_match.stat_lines();
    let duration = provider_match.duration_seconds();

    record_match_stats(
        db,
        match_id,
        lines,
        Some(duration),
        Some(provider_match_id.to_string()),
    )
    .await
}

fn seated_side(game: &Match, side: Side) -> Result<Uuid, CoreError> {
    game.seated_team(side)
        .ok_or_else(|| anyhow!("Match {} has no team seated on the {side} side", game.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, side: Side, win: bool) -> StatLine {
        StatLine {
            summoner_name: name.to_string(),
            side,
            lane: None,
            kills: 0,
            deaths: 0,
            assists: 0,
            cs_per_min: 0.0,
            dmg_per_min: 0.0,
            champion: "Unknown".to_string(),
            win,
        }
    }

    #[test]
    fn winning_side_comes_from_the_lines() {
        let lines = vec![
            line("a", Side::Blue, false),
            line("b", Side::Red, true),
            line("c", Side::Red, true),
        ];
        assert_eq!(winning_side(&lines), Some(Side::Red));
    }

    #[test]
    fn no_winning_line_means_no_winner() {
        let lines = vec![line("a", Side::Blue, false), line("b", Side::Red, false)];
        assert_eq!(winning_side(&lines), None);
        assert_eq!(winning_side(&[]), None);
    }
}

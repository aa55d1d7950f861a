//! The MVP leaderboard.
//!
//! A computed projection over the statistics of one tournament: never
//! persisted, recomputed on every request so it can not go stale against
//! statistic edits. The database does the per-player summing; scoring and
//! ordering happen here where they can be tested without a store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::{PgDatabase, StatsDatabase};
use crate::CoreError;

/// Leaderboards are capped for presentation.
const RANKING_LIMIT: usize = 100;

/// Per-player aggregate totals over one tournament, as summed by the store.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlayerTotals {
    pub player_id: Uuid,
    pub summoner_name: String,
    pub team_id: Option<Uuid>,
    pub team_name: Option<String>,
    pub total_kills: i64,
    pub total_deaths: i64,
    pub total_assists: i64,
    pub avg_cs_per_min: f64,
    pub avg_dmg_per_min: f64,
    pub matches_played: i64,
    pub matches_won: i64,
}

/// One leaderboard entry, in final display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRankingRow {
    pub player_id: Uuid,
    pub summoner_name: String,
    pub team_id: Option<Uuid>,
    pub team_name: Option<String>,
    pub total_kills: i64,
    pub total_deaths: i64,
    pub total_assists: i64,
    pub kda: f64,
    pub avg_cs_per_min: f64,
    pub avg_dmg_per_min: f64,
    pub matches_played: i64,
    pub matches_won: i64,
    pub mvp_score: f64,
}

/// Kills-deaths-assists ratio with deaths floored at one, so deathless
/// runs do not divide by zero.
pub fn kda(totals: &PlayerTotals) -> f64 {
    (totals.total_kills + totals.total_assists) as f64 / totals.total_deaths.max(1) as f64
}

/// The weighted MVP score. The weights reward sustained contribution and
/// winning over single-game kill-farming and are a product decision; do not
/// retune them here.
pub fn mvp_score(totals: &PlayerTotals) -> f64 {
    3.0 * totals.total_kills as f64 + 1.5 * totals.total_assists as f64
        - 1.0 * totals.total_deaths as f64
        + 10.0 * totals.matches_won as f64
        + 1.0 * totals.avg_cs_per_min
}

/// Scores and orders aggregate totals into the final leaderboard:
/// descending MVP score, ties broken by total kills, then by player id so
/// the output is fully deterministic. Capped at [`RANKING_LIMIT`] rows.
pub fn rank(totals: Vec<PlayerTotals>) -> Vec<PlayerRankingRow> {
    let mut rows: Vec<PlayerRankingRow> = totals
        .into_iter()
        .map(|t| {
            let kda = kda(&t);
            let mvp_score = mvp_score(&t);
            PlayerRankingRow {
                player_id: t.player_id,
                summoner_name: t.summoner_name,
                team_id: t.team_id,
                team_name: t.team_name,
                total_kills: t.total_kills,
                total_deaths: t.total_deaths,
                total_assists: t.total_assists,
                kda,
                avg_cs_per_min: t.avg_cs_per_min,
                avg_dmg_per_min: t.avg_dmg_per_min,
                matches_played: t.matches_played,
                matches_won: t.matches_won,
                mvp_score,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.mvp_score
            .total_cmp(&a.mvp_score)
            .then_with(|| b.total_kills.cmp(&a.total_kills))
            .then_with(|| a.player_id.cmp(&b.player_id))
    });
    rows.truncate(RANKING_LIMIT);

    rows
}

/// Computes the leaderboard of a tournament.
///
/// Read-only and safe to call concurrently with anything else; it reflects
/// whatever statistic rows are committed at query time. An unknown
/// tournament, or one without statistics yet, yields an empty leaderboard
/// rather than an error.
pub async fn compute_ranking(
    db: &PgDatabase,
    tournament_id: Uuid,
) -> Result<Vec<PlayerRankingRow>, CoreError> {
    let totals = db.player_totals(tournament_id).await?;
    Ok(rank(totals))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(name: &str, kills: i64, deaths: i64, assists: i64, won: i64, cs: f64) -> PlayerTotals {
        PlayerTotals {
            player_id: Uuid::new_v4(),
            summoner_name: name.to_string(),
            team_id: None,
            team_name: None,
            total_kills: kills,
            total_deaths: deaths,
            total_assists: assists,
            avg_cs_per_min: cs,
            avg_dmg_per_min: 0.0,
            matches_played: 1,
            matches_won: won,
        }
    }

    #[test]
    fn mvp_score_matches_the_worked_example() {
        // P1: 3 matches, 10/2/5 totals, 2 wins, avg cs 6.
        let p1 = totals("P1", 10, 2, 5, 2, 6.0);
        assert_eq!(mvp_score(&p1), 61.5);

        // P2: 1 match, 1/1/0, 0 wins, avg cs 4.
        let p2 = totals("P2", 1, 1, 0, 0, 4.0);
        assert_eq!(mvp_score(&p2), 6.0);

        let ranked = rank(vec![p2, p1]);
        assert_eq!(ranked[0].summoner_name, "P1");
        assert_eq!(ranked[1].summoner_name, "P2");
    }

    #[test]
    fn kda_floors_deaths_at_one() {
        let deathless = totals("Deathless", 8, 0, 4, 1, 5.0);
        assert_eq!(kda(&deathless), 12.0);

        let fed = totals("Fed", 9, 3, 6, 1, 5.0);
        assert_eq!(kda(&fed), 5.0);
    }

    #[test]
    fn empty_totals_rank_to_an_empty_leaderboard() {
        assert!(rank(Vec::new()).is_empty());
    }

    #[test]
    fn score_ties_break_by_kills_then_player_id() {
        // Same score: 30 + 10 = 40 vs 24 + 6 + 10 = 40.
        let kills_heavy = totals("KillsHeavy", 10, 0, 0, 1, 0.0);
        let assist_heavy = totals("AssistHeavy", 8, 0, 4, 1, 0.0);
        assert_eq!(mvp_score(&kills_heavy), mvp_score(&assist_heavy));

        let ranked = rank(vec![assist_heavy.clone(), kills_heavy.clone()]);
        assert_eq!(ranked[0].summoner_name, "KillsHeavy");

        // Identical lines: the lower player id wins the tie.
        let mut twin_a = totals("TwinA", 5, 1, 5, 0, 2.0);
        let mut twin_b = totals("TwinB", 5, 1, 5, 0, 2.0);
        if twin_b.player_id < twin_a.player_id {
            std::mem::swap(&mut twin_a.player_id, &mut twin_b.player_id);
        }
        let first_id = twin_a.player_id;
        let ranked = rank(vec![twin_b, twin_a]);
        assert_eq!(ranked[0].player_id, first_id);
    }

    #[test]
    fn leaderboard_is_capped() {
        let many: Vec<PlayerTotals> = (0..150)
            .map(|i| totals(&format!("Player{i}"), i, 1, 0, 0, 0.0))
            .collect();

        let ranked = rank(many);
        assert_eq!(ranked.len(), 100);
        // Highest scores survive the cap.
        assert_eq!(ranked[0].total_kills, 149);
        assert_eq!(ranked.last().unwrap().total_kills, 50);
    }
}

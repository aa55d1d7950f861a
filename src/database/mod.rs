use crate::ranking::PlayerTotals;
use crate::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

pub mod models;

use models::*;

/// The Postgres database backing the tournament system.
///
/// All access goes through the per-concern traits below. Changing the
/// implementation of those traits only changes which store is used; changing
/// the schema means changing the traits as well.
#[derive(Debug, Clone)]
pub struct PgDatabase {
    pub pool: PgPool,
}

impl PgDatabase {
    pub async fn connect() -> Result<Self, CoreError> {
        #[cfg(debug_assertions)]
        dotenv::dotenv().ok();

        let db_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                return Err(CoreError::msg("DATABASE_URL environment variable not found"));
            }
        };
        let pool = PgPool::connect(db_url.as_str()).await?;
        info!("Successfully connected to the database.");

        Ok(PgDatabase { pool })
    }

    pub async fn migrate(&self) -> Result<(), CoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[allow(async_fn_in_trait)]
pub trait TournamentDatabase {
    type Error;

    /// Creates a tournament, returning the stored row. New tournaments are
    /// never active; activation is a separate, exclusive operation.
    async fn create_tournament(
        &self,
        name: &str,
        description: &str,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<Tournament, Self::Error>;

    async fn get_tournament(&self, id: Uuid) -> Result<Option<Tournament>, Self::Error>;

    async fn get_all_tournaments(&self) -> Result<Vec<Tournament>, Self::Error>;

    /// The single currently active tournament, if any. Readers go through
    /// this lookup every time instead of caching the flag.
    async fn get_active_tournament(&self) -> Result<Option<Tournament>, Self::Error>;

    /// Makes the given tournament the only active one. Deactivation of every
    /// other row and activation of this one commit together; a crash
    /// mid-sequence leaves the previous state intact.
    async fn activate_tournament(&self, id: Uuid) -> Result<bool, Self::Error>;

    /// Updates the display status label ("upcoming", "in progress", ...).
    async fn set_tournament_status(&self, id: Uuid, status: &str) -> Result<(), Self::Error>;

    async fn delete_tournament(&self, id: Uuid) -> Result<bool, Self::Error>;

    /// Enrolls a team into a tournament. Enrolling twice is a no-op.
    async fn enroll_team(&self, tournament_id: Uuid, team_id: Uuid) -> Result<(), Self::Error>;

    async fn withdraw_team(&self, tournament_id: Uuid, team_id: Uuid) -> Result<(), Self::Error>;

    async fn get_tournament_teams(&self, tournament_id: Uuid) -> Result<Vec<Team>, Self::Error>;
}

impl TournamentDatabase for PgDatabase {
    type Error = CoreError;

    async fn create_tournament(
        &self,
        name: &str,
        description: &str,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<Tournament, Self::Error> {
        let tournament = sqlx::query_as::<_, Tournament>(
            r#"
            INSERT INTO tournaments (id, name, description, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(tournament)
    }

    async fn get_tournament(&self, id: Uuid) -> Result<Option<Tournament>, Self::Error> {
        let tournament = sqlx::query_as::<_, Tournament>(
            r#"
            SELECT * FROM tournaments WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tournament)
    }

    async fn get_all_tournaments(&self) -> Result<Vec<Tournament>, Self::Error> {
        let tournaments = sqlx::query_as::<_, Tournament>(
            r#"
            SELECT * FROM tournaments
            ORDER BY start_date DESC NULLS LAST
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tournaments)
    }

    async fn get_active_tournament(&self) -> Result<Option<Tournament>, Self::Error> {
        let tournament = sqlx::query_as::<_, Tournament>(
            r#"
            SELECT * FROM tournaments WHERE active = true
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(tournament)
    }

    async fn activate_tournament(&self, id: Uuid) -> Result<bool, Self::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE tournaments SET active = false WHERE active = true")
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("UPDATE tournaments SET active = true WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_tournament_status(&self, id: Uuid, status: &str) -> Result<(), Self::Error> {
        sqlx::query(
            r#"
            UPDATE tournaments
            SET status = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_tournament(&self, id: Uuid) -> Result<bool, Self::Error> {
        let result = sqlx::query("DELETE FROM tournaments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn enroll_team(&self, tournament_id: Uuid, team_id: Uuid) -> Result<(), Self::Error> {
        sqlx::query(
            r#"
            INSERT INTO tournament_teams (tournament_id, team_id)
            VALUES ($1, $2)
            ON CONFLICT (tournament_id, team_id)
            DO NOTHING
            "#,
        )
        .bind(tournament_id)
        .bind(team_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn withdraw_team(&self, tournament_id: Uuid, team_id: Uuid) -> Result<(), Self::Error> {
        sqlx::query(
            r#"
            DELETE FROM tournament_teams
            WHERE tournament_id = $1 AND team_id = $2
            "#,
        )
        .bind(tournament_id)
        .bind(team_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_tournament_teams(&self, tournament_id: Uuid) -> Result<Vec<Team>, Self::Error> {
        let teams = sqlx::query_as::<_, Team>(
            r#"
            SELECT t.*
            FROM teams AS t
            JOIN tournament_teams AS tt
            ON t.id = tt.team_id
            WHERE tt.tournament_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(teams)
    }
}

#[allow(async_fn_in_trait)]
pub trait TeamDatabase {
    type Error;

    async fn create_team(
        &self,
        name: &str,
        tag: &str,
        logo_url: Option<&str>,
    ) -> Result<Team, Self::Error>;

    async fn get_team(&self, id: Uuid) -> Result<Option<Team>, Self::Error>;

    async fn get_all_teams(&self) -> Result<Vec<Team>, Self::Error>;

    async fn update_team(
        &self,
        id: Uuid,
        name: &str,
        tag: &str,
        logo_url: Option<&str>,
    ) -> Result<bool, Self::Error>;

    async fn delete_team(&self, id: Uuid) -> Result<bool, Self::Error>;
}

impl TeamDatabase for PgDatabase {
    type Error = CoreError;

    async fn create_team(
        &self,
        name: &str,
        tag: &str,
        logo_url: Option<&str>,
    ) -> Result<Team, Self::Error> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (id, name, tag, logo_url)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(tag)
        .bind(logo_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(team)
    }

    async fn get_team(&self, id: Uuid) -> Result<Option<Team>, Self::Error> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            SELECT * FROM teams WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(team)
    }

    async fn get_all_teams(&self) -> Result<Vec<Team>, Self::Error> {
        let teams = sqlx::query_as::<_, Team>("SELECT * FROM teams ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(teams)
    }

    async fn update_team(
        &self,
        id: Uuid,
        name: &str,
        tag: &str,
        logo_url: Option<&str>,
    ) -> Result<bool, Self::Error> {
        let result = sqlx::query(
            r#"
            UPDATE teams
            SET name = $2,
                tag = $3,
                logo_url = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(tag)
        .bind(logo_url)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_team(&self, id: Uuid) -> Result<bool, Self::Error> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[allow(async_fn_in_trait)]
pub trait PlayerDatabase {
    type Error;

    async fn create_player(
        &self,
        summoner_name: &str,
        role_type: RoleType,
        lane: Option<Lane>,
        team_id: Option<Uuid>,
    ) -> Result<Player, Self::Error>;

    async fn get_player(&self, id: Uuid) -> Result<Option<Player>, Self::Error>;

    /// Looks a player up by in-game name. The provider import path matches
    /// participants against this.
    async fn get_player_by_summoner_name(
        &self,
        summoner_name: &str,
    ) -> Result<Option<Player>, Self::Error>;

    async fn get_players_by_team(&self, team_id: Uuid) -> Result<Vec<Player>, Self::Error>;

    async fn get_free_agents(&self) -> Result<Vec<Player>, Self::Error>;

    /// Moves a player onto a team, or onto the free-agent pool with `None`.
    async fn assign_team(&self, id: Uuid, team_id: Option<Uuid>) -> Result<bool, Self::Error>;

    async fn delete_player(&self, id: Uuid) -> Result<bool, Self::Error>;
}

impl PlayerDatabase for PgDatabase {
    type Error = CoreError;

    async fn create_player(
        &self,
        summoner_name: &str,
        role_type: RoleType,
        lane: Option<Lane>,
        team_id: Option<Uuid>,
    ) -> Result<Player, Self::Error> {
        let player = sqlx::query_as::<_, Player>(
            r#"
            INSERT INTO players (id, summoner_name, role_type, lane, team_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(summoner_name)
        .bind(role_type)
        .bind(lane)
        .bind(team_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(player)
    }

    async fn get_player(&self, id: Uuid) -> Result<Option<Player>, Self::Error> {
        let player = sqlx::query_as::<_, Player>(
            r#"
            SELECT * FROM players WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(player)
    }

    async fn get_player_by_summoner_name(
        &self,
        summoner_name: &str,
    ) -> Result<Option<Player>, Self::Error> {
        let player = sqlx::query_as::<_, Player>(
            r#"
            SELECT * FROM players WHERE summoner_name = $1
            LIMIT 1
            "#,
        )
        .bind(summoner_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(player)
    }

    async fn get_players_by_team(&self, team_id: Uuid) -> Result<Vec<Player>, Self::Error> {
        let players = sqlx::query_as::<_, Player>(
            r#"
            SELECT * FROM players
            WHERE team_id = $1
            ORDER BY lane, summoner_name
            "#,
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(players)
    }

    async fn get_free_agents(&self) -> Result<Vec<Player>, Self::Error> {
        let players = sqlx::query_as::<_, Player>(
            r#"
            SELECT * FROM players
            WHERE team_id IS NULL
            ORDER BY summoner_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(players)
    }

    async fn assign_team(&self, id: Uuid, team_id: Option<Uuid>) -> Result<bool, Self::Error> {
        let result = sqlx::query(
            r#"
            UPDATE players
            SET team_id = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(team_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_player(&self, id: Uuid) -> Result<bool, Self::Error> {
        let result = sqlx::query("DELETE FROM players WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[allow(async_fn_in_trait)]
pub trait MatchDatabase {
    type Error;

    /// Creates a match. Administrators may leave either seat open; the
    /// bracket engine creates successors with exactly one seat taken.
    #[allow(clippy::too_many_arguments)]
    async fn create_match(
        &self,
        tournament_id: Uuid,
        phase: Phase,
        bracket_slot: Option<i32>,
        blue_team_id: Option<Uuid>,
        red_team_id: Option<Uuid>,
        scheduled_at: DateTime<Utc>,
    ) -> Result<Match, Self::Error>;

    async fn get_match(&self, id: Uuid) -> Result<Option<Match>, Self::Error>;

    async fn get_match_by_provider_id(
        &self,
        provider_match_id: &str,
    ) -> Result<Option<Match>, Self::Error>;

    /// Retrieves all matches of a tournament, oldest first. Pass a phase to
    /// restrict to one round.
    async fn get_matches_by_tournament(
        &self,
        tournament_id: Uuid,
        phase: impl Into<Option<Phase>>,
    ) -> Result<Vec<Match>, Self::Error>;

    /// The match occupying a given bracket position, if one exists yet.
    async fn get_bracket_match(
        &self,
        tournament_id: Uuid,
        phase: Phase,
        bracket_slot: i32,
    ) -> Result<Option<Match>, Self::Error>;

    /// Seats a team on one side of a bracket position, creating the match if
    /// it does not exist yet. The insert and the fallback side-patch are one
    /// statement, so two branches feeding the same position can run
    /// concurrently without producing duplicate rows.
    async fn upsert_bracket_seat(
        &self,
        tournament_id: Uuid,
        phase: Phase,
        bracket_slot: i32,
        side: Side,
        team_id: Uuid,
        scheduled_at: DateTime<Utc>,
    ) -> Result<Uuid, Self::Error>;

    async fn set_match_status(&self, id: Uuid, status: MatchStatus) -> Result<(), Self::Error>;

    /// Marks a match live and demotes any other live match back to active.
    /// Both writes commit together so at most one match streams as live.
    async fn set_live_exclusive(&self, id: Uuid) -> Result<(), Self::Error>;

    async fn reschedule_match(
        &self,
        id: Uuid,
        scheduled_at: DateTime<Utc>,
    ) -> Result<bool, Self::Error>;

    async fn delete_match(&self, id: Uuid) -> Result<bool, Self::Error>;
}

impl MatchDatabase for PgDatabase {
    type Error = CoreError;

    async fn create_match(
        &self,
        tournament_id: Uuid,
        phase: Phase,
        bracket_slot: Option<i32>,
        blue_team_id: Option<Uuid>,
        red_team_id: Option<Uuid>,
        scheduled_at: DateTime<Utc>,
    ) -> Result<Match, Self::Error> {
        let game = sqlx::query_as::<_, Match>(
            r#"
            INSERT INTO matches
                (id, tournament_id, phase, bracket_slot, blue_team_id, red_team_id, scheduled_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tournament_id)
        .bind(phase)
        .bind(bracket_slot)
        .bind(blue_team_id)
        .bind(red_team_id)
        .bind(scheduled_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(game)
    }

    async fn get_match(&self, id: Uuid) -> Result<Option<Match>, Self::Error> {
        let game = sqlx::query_as::<_, Match>(
            r#"
            SELECT * FROM matches WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(game)
    }

    async fn get_match_by_provider_id(
        &self,
        provider_match_id: &str,
    ) -> Result<Option<Match>, Self::Error> {
        let game = sqlx::query_as::<_, Match>(
            r#"
            SELECT * FROM matches WHERE provider_match_id = $1
            LIMIT 1
            "#,
        )
        .bind(provider_match_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(game)
    }

    async fn get_matches_by_tournament(
        &self,
        tournament_id: Uuid,
        phase: impl Into<Option<Phase>>,
    ) -> Result<Vec<Match>, Self::Error> {
        let matches = match phase.into() {
            Some(phase) => {
                sqlx::query_as::<_, Match>(
                    r#"
                    SELECT * FROM matches
                    WHERE tournament_id = $1 AND phase = $2
                    ORDER BY bracket_slot NULLS LAST, scheduled_at
                    "#,
                )
                .bind(tournament_id)
                .bind(phase)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Match>(
                    r#"
                    SELECT * FROM matches
                    WHERE tournament_id = $1
                    ORDER BY scheduled_at
                    "#,
                )
                .bind(tournament_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(matches)
    }

    async fn get_bracket_match(
        &self,
        tournament_id: Uuid,
        phase: Phase,
        bracket_slot: i32,
    ) -> Result<Option<Match>, Self::Error> {
        let game = sqlx::query_as::<_, Match>(
            r#"
            SELECT * FROM matches
            WHERE tournament_id = $1 AND phase = $2 AND bracket_slot = $3
            LIMIT 1
            "#,
        )
        .bind(tournament_id)
        .bind(phase)
        .bind(bracket_slot)
        .fetch_optional(&self.pool)
        .await?;

        Ok(game)
    }

    async fn upsert_bracket_seat(
        &self,
        tournament_id: Uuid,
        phase: Phase,
        bracket_slot: i32,
        side: Side,
        team_id: Uuid,
        scheduled_at: DateTime<Utc>,
    ) -> Result<Uuid, Self::Error> {
        // The side column is picked from a fixed pair, never from input.
        let column = match side {
            Side::Blue => "blue_team_id",
            Side::Red => "red_team_id",
        };
        let sql = format!(
            r#"
            INSERT INTO matches
                (id, tournament_id, phase, bracket_slot, {column}, scheduled_at, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (tournament_id, phase, bracket_slot) WHERE bracket_slot IS NOT NULL
            DO UPDATE SET {column} = EXCLUDED.{column}
            RETURNING id
            "#
        );

        let id = sqlx::query_scalar::<_, Uuid>(&sql)
            .bind(Uuid::new_v4())
            .bind(tournament_id)
            .bind(phase)
            .bind(bracket_slot)
            .bind(team_id)
            .bind(scheduled_at)
            .bind(MatchStatus::Scheduled)
            .fetch_one(&self.pool)
            .await?;

        Ok(id)
    }

    async fn set_match_status(&self, id: Uuid, status: MatchStatus) -> Result<(), Self::Error> {
        sqlx::query(
            r#"
            UPDATE matches
            SET status = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_live_exclusive(&self, id: Uuid) -> Result<(), Self::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE matches
            SET status = 'active'
            WHERE status = 'live' AND id != $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE matches
            SET status = 'live'
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn reschedule_match(
        &self,
        id: Uuid,
        scheduled_at: DateTime<Utc>,
    ) -> Result<bool, Self::Error> {
        let result = sqlx::query(
            r#"
            UPDATE matches
            SET scheduled_at = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(scheduled_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_match(&self, id: Uuid) -> Result<bool, Self::Error> {
        let result = sqlx::query("DELETE FROM matches WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[allow(async_fn_in_trait)]
pub trait StatsDatabase {
    type Error;

    async fn get_match_stats(&self, match_id: Uuid) -> Result<Vec<Statistic>, Self::Error>;

    async fn get_player_stats(&self, player_id: Uuid) -> Result<Vec<Statistic>, Self::Error>;

    /// Replaces the full statistics set of a match and writes the derived
    /// match result in the same transaction. Statistics are never patched
    /// row by row; a resubmission wipes the previous set entirely.
    async fn replace_match_stats(
        &self,
        match_id: Uuid,
        rows: &[NewStatistic],
        result: &MatchResultUpdate,
    ) -> Result<usize, Self::Error>;

    /// Per-player aggregate totals over one tournament, the input to the
    /// ranking projection. Players without statistic rows do not appear.
    async fn player_totals(&self, tournament_id: Uuid) -> Result<Vec<PlayerTotals>, Self::Error>;

    /// Career totals for a player profile page, across all tournaments.
    async fn get_player_summary(&self, player_id: Uuid) -> Result<PlayerSummary, Self::Error>;
}

/// Career aggregate for one player, shown on the public profile page.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlayerSummary {
    pub total_kills: i64,
    pub total_deaths: i64,
    pub total_assists: i64,
    pub matches_played: i64,
    pub matches_won: i64,
    pub champions: Vec<String>,
}

impl StatsDatabase for PgDatabase {
    type Error = CoreError;

    async fn get_match_stats(&self, match_id: Uuid) -> Result<Vec<Statistic>, Self::Error> {
        let stats = sqlx::query_as::<_, Statistic>(
            r#"
            SELECT * FROM statistics
            WHERE match_id = $1
            ORDER BY team_id, lane, kills DESC
            "#,
        )
        .bind(match_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(stats)
    }

    async fn get_player_stats(&self, player_id: Uuid) -> Result<Vec<Statistic>, Self::Error> {
        let stats = sqlx::query_as::<_, Statistic>(
            r#"
            SELECT s.*
            FROM statistics AS s
            JOIN matches AS m
            ON s.match_id = m.id
            WHERE s.player_id = $1
            ORDER BY m.scheduled_at DESC
            "#,
        )
        .bind(player_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(stats)
    }

    async fn replace_match_stats(
        &self,
        match_id: Uuid,
        rows: &[NewStatistic],
        result: &MatchResultUpdate,
    ) -> Result<usize, Self::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM statistics WHERE match_id = $1")
            .bind(match_id)
            .execute(&mut *tx)
            .await?;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO statistics
                    (id, match_id, player_id, team_id, lane, kills, deaths, assists,
                     cs_per_min, dmg_per_min, champion, win)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(match_id)
            .bind(row.player_id)
            .bind(row.team_id)
            .bind(row.lane)
            .bind(row.kills)
            .bind(row.deaths)
            .bind(row.assists)
            .bind(row.cs_per_min)
            .bind(row.dmg_per_min)
            .bind(row.champion.as_str())
            .bind(row.win)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            UPDATE matches
            SET winner_id = $2,
                duration_seconds = COALESCE($3, duration_seconds),
                provider_match_id = COALESCE($4, provider_match_id),
                status = 'finished'
            WHERE id = $1
            "#,
        )
        .bind(match_id)
        .bind(result.winner_id)
        .bind(result.duration_seconds)
        .bind(result.provider_match_id.as_deref())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(rows.len())
    }

    async fn player_totals(&self, tournament_id: Uuid) -> Result<Vec<PlayerTotals>, Self::Error> {
        let totals = sqlx::query_as::<_, PlayerTotals>(
            r#"
            SELECT
                s.player_id,
                p.summoner_name,
                p.team_id,
                t.name AS team_name,
                COALESCE(SUM(s.kills), 0) AS total_kills,
                COALESCE(SUM(s.deaths), 0) AS total_deaths,
                COALESCE(SUM(s.assists), 0) AS total_assists,
                COALESCE(AVG(s.cs_per_min), 0) AS avg_cs_per_min,
                COALESCE(AVG(s.dmg_per_min), 0) AS avg_dmg_per_min,
                COUNT(s.match_id) AS matches_played,
                COUNT(*) FILTER (WHERE s.win) AS matches_won
            FROM statistics AS s
            JOIN players AS p ON s.player_id = p.id
            LEFT JOIN teams AS t ON p.team_id = t.id
            JOIN matches AS m ON s.match_id = m.id
            WHERE m.tournament_id = $1
            GROUP BY s.player_id, p.summoner_name, p.team_id, t.name
            "#,
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(totals)
    }

    async fn get_player_summary(&self, player_id: Uuid) -> Result<PlayerSummary, Self::Error> {
        let summary = sqlx::query_as::<_, PlayerSummary>(
            r#"
            SELECT
                COALESCE(SUM(kills), 0) AS total_kills,
                COALESCE(SUM(deaths), 0) AS total_deaths,
                COALESCE(SUM(assists), 0) AS total_assists,
                COUNT(DISTINCT match_id) AS matches_played,
                COUNT(*) FILTER (WHERE win) AS matches_won,
                COALESCE(ARRAY_AGG(DISTINCT champion) FILTER (WHERE champion IS NOT NULL), '{}') AS champions
            FROM statistics
            WHERE player_id = $1
            "#,
        )
        .bind(player_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }
}

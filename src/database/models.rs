use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};
use uuid::Uuid;

/// A tournament within the database.
///
/// At most one tournament is active at a time. That invariant is owned by
/// [`TournamentDatabase::activate_tournament`](super::TournamentDatabase),
/// which is the only writer of the `active` flag.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tournament {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Free-form display label ("upcoming", "in progress", ...). Not to be
    /// confused with the exclusive `active` flag.
    pub status: String,
    pub active: bool,
}

/// A team within the database. Enrolled into tournaments through the
/// `tournament_teams` relation.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub tag: String,
    pub logo_url: Option<String>,
}

/// The kind of slot a player occupies on a roster.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize, Display, Default,
)]
#[sqlx(type_name = "role_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    #[strum(to_string = "Starter")]
    #[default]
    Starter,
    #[strum(to_string = "Substitute")]
    Substitute,
    #[strum(to_string = "Coach")]
    Coach,
    #[strum(to_string = "Staff")]
    Staff,
}

impl RoleType {
    /// Whether this role ever takes the rift. Coaches and staff do not.
    pub fn is_playing(&self) -> bool {
        matches!(self, RoleType::Starter | RoleType::Substitute)
    }
}

/// An in-game position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize, Display)]
#[sqlx(type_name = "lane", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    #[strum(to_string = "Top")]
    Top,
    #[strum(to_string = "Jungle")]
    Jungle,
    #[strum(to_string = "Mid")]
    Mid,
    #[strum(to_string = "Bot")]
    Bot,
    #[strum(to_string = "Support")]
    Support,
}

impl Lane {
    /// Maps a provider position label (e.g. Riot's `teamPosition` field) to a
    /// lane. Unknown labels map to `None` rather than erroring so that odd
    /// game modes still import.
    pub fn from_provider(label: &str) -> Option<Self> {
        match label.to_ascii_uppercase().as_str() {
            "TOP" => Some(Lane::Top),
            "JUNGLE" => Some(Lane::Jungle),
            "MIDDLE" | "MID" => Some(Lane::Mid),
            "BOTTOM" | "BOT" => Some(Lane::Bot),
            "UTILITY" | "SUPPORT" => Some(Lane::Support),
            _ => None,
        }
    }
}

/// Whether a player's lane field means anything for their role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneAssignment {
    /// A playing role; the lane may still be unassigned.
    Playing(Option<Lane>),
    /// Coaches and staff have no lane by definition.
    NonPlaying,
}

/// A player within the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Player {
    pub id: Uuid,
    pub summoner_name: String,
    pub role_type: RoleType,
    pub lane: Option<Lane>,
    /// `None` means the player is a free agent.
    pub team_id: Option<Uuid>,
}

impl Player {
    pub fn is_free_agent(&self) -> bool {
        self.team_id.is_none()
    }

    /// Interprets the nullable lane column through the player's role so that
    /// callers never have to guess whether `None` means "unset" or
    /// "not applicable".
    pub fn lane_assignment(&self) -> LaneAssignment {
        if self.role_type.is_playing() {
            LaneAssignment::Playing(self.lane)
        } else {
            LaneAssignment::NonPlaying
        }
    }
}

/// A named round of single-elimination play.
///
/// The order is fixed: `Groups < RoundOf32 < RoundOf16 < Quarterfinal <
/// Semifinal < Final`. `Groups` stands outside the bracket and `Final` has
/// no successor; both make bracket advancement a no-op.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type, Serialize, Deserialize,
    Display, EnumIter,
)]
#[sqlx(type_name = "phase", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[strum(to_string = "Groups")]
    Groups,
    #[strum(to_string = "Round of 32")]
    RoundOf32,
    #[strum(to_string = "Round of 16")]
    RoundOf16,
    #[strum(to_string = "Quarterfinal")]
    Quarterfinal,
    #[strum(to_string = "Semifinal")]
    Semifinal,
    #[strum(to_string = "Final")]
    Final,
}

impl Phase {
    pub fn all() -> Vec<Phase> {
        Phase::iter().collect()
    }

    /// The phase the winner of a bracketed match moves on to.
    pub fn successor(&self) -> Option<Phase> {
        match self {
            Phase::Groups => None,
            Phase::RoundOf32 => Some(Phase::RoundOf16),
            Phase::RoundOf16 => Some(Phase::Quarterfinal),
            Phase::Quarterfinal => Some(Phase::Semifinal),
            Phase::Semifinal => Some(Phase::Final),
            Phase::Final => None,
        }
    }

    /// Whether matches in this phase occupy bracket slots at all.
    pub fn is_bracketed(&self) -> bool {
        !matches!(self, Phase::Groups)
    }
}

/// The lifecycle of a match.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize, Display, Default,
)]
#[sqlx(type_name = "match_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[strum(to_string = "Scheduled")]
    #[default]
    Scheduled,
    #[strum(to_string = "Active")]
    Active,
    #[strum(to_string = "Live")]
    Live,
    #[strum(to_string = "Finished")]
    Finished,
}

/// One of the two sides of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[strum(to_string = "Blue")]
    Blue,
    #[strum(to_string = "Red")]
    Red,
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Blue => Side::Red,
            Side::Red => Side::Blue,
        }
    }
}

/// A seat on one side of a match. Successor matches created by bracket
/// advancement start with one seat taken and the other open until the
/// sibling branch resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    Open,
    Taken(Uuid),
}

impl From<Option<Uuid>> for Seat {
    fn from(value: Option<Uuid>) -> Self {
        match value {
            Some(team_id) => Seat::Taken(team_id),
            None => Seat::Open,
        }
    }
}

/// A match within the database, associated with a particular tournament.
///
/// Matches are created either by an administrator (both seats possibly open)
/// or by the bracket engine (exactly one seat taken).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Match {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub phase: Phase,
    /// 1-indexed position within the phase; `None` for group and exhibition
    /// matches, which never feed the bracket.
    pub bracket_slot: Option<i32>,
    pub blue_team_id: Option<Uuid>,
    pub red_team_id: Option<Uuid>,
    pub scheduled_at: DateTime<Utc>,
    pub status: MatchStatus,
    pub winner_id: Option<Uuid>,
    pub duration_seconds: Option<i32>,
    pub provider_match_id: Option<String>,
}

impl Match {
    pub fn seat(&self, side: Side) -> Seat {
        match side {
            Side::Blue => self.blue_team_id.into(),
            Side::Red => self.red_team_id.into(),
        }
    }

    pub fn seated_team(&self, side: Side) -> Option<Uuid> {
        match side {
            Side::Blue => self.blue_team_id,
            Side::Red => self.red_team_id,
        }
    }

    /// The side a team occupies, if it is seated in this match at all.
    pub fn side_of(&self, team_id: Uuid) -> Option<Side> {
        if self.blue_team_id == Some(team_id) {
            Some(Side::Blue)
        } else if self.red_team_id == Some(team_id) {
            Some(Side::Red)
        } else {
            None
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finished
    }
}

/// A statistic row for one player in one match. Exactly one row exists per
/// (match, player) pair; re-entry replaces the whole set for the match.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Statistic {
    pub id: Uuid,
    pub match_id: Uuid,
    pub player_id: Uuid,
    pub team_id: Uuid,
    pub lane: Option<Lane>,
    pub kills: i32,
    pub deaths: i32,
    pub assists: i32,
    pub cs_per_min: f64,
    pub dmg_per_min: f64,
    pub champion: String,
    pub win: bool,
}

/// A statistic row about to be written. Ids are assigned at insert time.
#[derive(Debug, Clone)]
pub struct NewStatistic {
    pub player_id: Uuid,
    pub team_id: Uuid,
    pub lane: Option<Lane>,
    pub kills: i32,
    pub deaths: i32,
    pub assists: i32,
    pub cs_per_min: f64,
    pub dmg_per_min: f64,
    pub champion: String,
    pub win: bool,
}

/// The match-level fields written alongside a statistics submission.
#[derive(Debug, Clone, Default)]
pub struct MatchResultUpdate {
    pub winner_id: Option<Uuid>,
    pub duration_seconds: Option<i32>,
    pub provider_match_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_match(blue: Option<Uuid>, red: Option<Uuid>) -> Match {
        Match {
            id: Uuid::new_v4(),
            tournament_id: Uuid::new_v4(),
            phase: Phase::Quarterfinal,
            bracket_slot: Some(1),
            blue_team_id: blue,
            red_team_id: red,
            scheduled_at: Utc::now(),
            status: MatchStatus::Scheduled,
            winner_id: None,
            duration_seconds: None,
            provider_match_id: None,
        }
    }

    #[test]
    fn phase_order_is_total_and_final_is_terminal() {
        let phases = Phase::all();
        for pair in phases.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(Phase::Semifinal.successor(), Some(Phase::Final));
        assert_eq!(Phase::Final.successor(), None);
        assert_eq!(Phase::Groups.successor(), None);
    }

    #[test]
    fn side_of_resolves_seated_teams_only() {
        let blue = Uuid::new_v4();
        let red = Uuid::new_v4();
        let game = sample_match(Some(blue), Some(red));

        assert_eq!(game.side_of(blue), Some(Side::Blue));
        assert_eq!(game.side_of(red), Some(Side::Red));
        assert_eq!(game.side_of(Uuid::new_v4()), None);
    }

    #[test]
    fn open_seats_map_to_seat_open() {
        let blue = Uuid::new_v4();
        let game = sample_match(Some(blue), None);

        assert_eq!(game.seat(Side::Blue), Seat::Taken(blue));
        assert_eq!(game.seat(Side::Red), Seat::Open);
    }

    #[test]
    fn lane_assignment_follows_role_type() {
        let mut player = Player {
            id: Uuid::new_v4(),
            summoner_name: "Faker".to_string(),
            role_type: RoleType::Starter,
            lane: Some(Lane::Mid),
            team_id: None,
        };
        assert_eq!(
            player.lane_assignment(),
            LaneAssignment::Playing(Some(Lane::Mid))
        );

        player.role_type = RoleType::Coach;
        assert_eq!(player.lane_assignment(), LaneAssignment::NonPlaying);
    }

    #[test]
    fn provider_position_labels_map_to_lanes() {
        assert_eq!(Lane::from_provider("UTILITY"), Some(Lane::Support));
        assert_eq!(Lane::from_provider("Middle"), Some(Lane::Mid));
        assert_eq!(Lane::from_provider("Invalid"), None);
    }
}

use serde::{Deserialize, Serialize};

use crate::database::models::{Lane, Side};
use crate::ingest::StatLine;

/// A full match payload from the provider's match endpoint.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiotMatch {
    pub metadata: RiotMetadata,
    pub info: RiotMatchInfo,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiotMetadata {
    pub match_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiotMatchInfo {
    /// Seconds.
    pub game_duration: i64,
    pub game_mode: String,
    pub participants: Vec<RiotParticipant>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiotParticipant {
    pub summoner_name: String,
    pub champion_name: String,
    pub kills: i32,
    pub deaths: i32,
    pub assists: i32,
    pub total_minions_killed: i32,
    pub neutral_minions_killed: i32,
    pub total_damage_dealt_to_champions: i64,
    /// 100 is the blue side, 200 the red side.
    pub team_id: i32,
    #[serde(default)]
    pub team_position: Option<String>,
    pub win: bool,
}

impl RiotParticipant {
    pub fn side(&self) -> Side {
        if self.team_id == 100 {
            Side::Blue
        } else {
            Side::Red
        }
    }
}

impl RiotMatch {
    pub fn duration_seconds(&self) -> i32 {
        self.info.game_duration as i32
    }

    /// Normalizes the provider payload into the statistic shape shared with
    /// manual entry. Per-minute rates are derived from the game duration and
    /// rounded to two decimals; a zero-length game yields zero rates.
    pub fn stat_lines(&self) -> Vec<StatLine> {
        let minutes = self.info.game_duration as f64 / 60.0;

        self.info
            .participants
            .iter()
            .map(|p| {
                let per_minute = |total: f64| {
                    if minutes > 0.0 {
                        (total / minutes * 100.0).round() / 100.0
                    } else {
                        0.0
                    }
                };

                StatLine {
                    summoner_name: p.summoner_name.clone(),
                    side: p.side(),
                    lane: p
                        .team_position
                        .as_deref()
                        .and_then(Lane::from_provider),
                    kills: p.kills,
                    deaths: p.deaths,
                    assists: p.assists,
                    cs_per_min: per_minute(
                        (p.total_minions_killed + p.neutral_minions_killed) as f64,
                    ),
                    dmg_per_min: per_minute(p.total_damage_dealt_to_champions as f64),
                    champion: p.champion_name.clone(),
                    win: p.win,
                }
            })
            .collect()
    }
}

/// A summoner profile, used to resolve names to account ids.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiotSummoner {
    pub puuid: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_match() -> RiotMatch {
        serde_json::from_value(serde_json::json!({
            "metadata": { "matchId": "LA2_123456" },
            "info": {
                "gameDuration": 1800,
                "gameMode": "CLASSIC",
                "participants": [
                    {
                        "summonerName": "BlueMid",
                        "championName": "Ahri",
                        "kills": 7,
                        "deaths": 2,
                        "assists": 9,
                        "totalMinionsKilled": 210,
                        "neutralMinionsKilled": 30,
                        "totalDamageDealtToChampions": 24000,
                        "teamId": 100,
                        "teamPosition": "MIDDLE",
                        "win": true
                    },
                    {
                        "summonerName": "RedTop",
                        "championName": "Darius",
                        "kills": 3,
                        "deaths": 6,
                        "assists": 2,
                        "totalMinionsKilled": 180,
                        "neutralMinionsKilled": 0,
                        "totalDamageDealtToChampions": 15000,
                        "teamId": 200,
                        "teamPosition": "TOP",
                        "win": false
                    }
                ]
            }
        }))
        .expect("sample payload deserializes")
    }

    #[test]
    fn provider_team_ids_map_to_sides() {
        let lines = sample_match().stat_lines();
        assert_eq!(lines[0].side, Side::Blue);
        assert_eq!(lines[1].side, Side::Red);
    }

    #[test]
    fn per_minute_rates_derive_from_duration() {
        let game = sample_match();
        assert_eq!(game.duration_seconds(), 1800);

        let lines = game.stat_lines();
        // 240 cs over 30 minutes.
        assert_eq!(lines[0].cs_per_min, 8.0);
        assert_eq!(lines[0].dmg_per_min, 800.0);
        assert_eq!(lines[1].cs_per_min, 6.0);
    }

    #[test]
    fn lanes_and_results_carry_through() {
        let lines = sample_match().stat_lines();
        assert_eq!(lines[0].lane, Some(Lane::Mid));
        assert_eq!(lines[1].lane, Some(Lane::Top));
        assert!(lines[0].win);
        assert!(!lines[1].win);
        assert_eq!(lines[0].champion, "Ahri");
    }

    #[test]
    fn zero_length_games_produce_zero_rates() {
        let mut game = sample_match();
        game.info.game_duration = 0;

        let lines = game.stat_lines();
        assert_eq!(lines[0].cs_per_min, 0.0);
        assert_eq!(lines[0].dmg_per_min, 0.0);
    }
}

// Roster data (players and teams) and the derived lists the wizard shows:
// the search-filtered player list and the eligible opponents.

use serde::{Deserialize, Serialize};

/// A roster entry as returned by `GET ?type=players`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub team_id: Option<i64>,
    #[serde(default)]
    pub team_city: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub team_abbrev: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub sport: Option<String>,
}

impl Player {
    /// "City Name" for the player's team, or whichever half is known.
    pub fn team_display(&self) -> Option<String> {
        match (&self.team_city, &self.team_name) {
            (Some(city), Some(name)) => Some(format!("{city} {name}")),
            (None, Some(name)) => Some(name.clone()),
            (Some(city), None) => Some(city.clone()),
            (None, None) => None,
        }
    }
}

/// A team as returned by `GET ?type=teams`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub city: String,
    pub name: String,
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub conference: Option<String>,
}

impl Team {
    /// "City Name", the form sent as `opponent` in prediction requests.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.city, self.name)
    }
}

/// Players and teams loaded once at startup. Immutable for the session.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
}

impl Roster {
    pub fn new(players: Vec<Player>, teams: Vec<Team>) -> Self {
        Roster { players, teams }
    }

    pub fn team(&self, id: i64) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    /// Roster entries whose name appears in `featured_names`, in roster order.
    pub fn featured<'a>(&'a self, featured_names: &[String]) -> Vec<&'a Player> {
        self.players
            .iter()
            .filter(|p| featured_names.iter().any(|n| n == &p.name))
            .collect()
    }

    /// Players to show for the current search text.
    ///
    /// A blank query yields the featured subset, never the full roster.
    /// Otherwise an entry matches iff its lower-cased name contains the
    /// lower-cased query; at most `cap` matches are returned.
    pub fn filter_players<'a>(
        &'a self,
        query: &str,
        featured_names: &[String],
        cap: usize,
    ) -> Vec<&'a Player> {
        let query = query.trim();
        if query.is_empty() {
            return self.featured(featured_names);
        }
        let needle = query.to_lowercase();
        self.players
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .take(cap)
            .collect()
    }

    /// All teams except the player's own. With no known team, all teams.
    pub fn eligible_opponents(&self, player_team_id: Option<i64>) -> Vec<&Team> {
        match player_team_id {
            Some(own) => self.teams.iter().filter(|t| t.id != own).collect(),
            None => self.teams.iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Canonical franchise names and the alias table
//!
//! Every team name entering the system is resolved here exactly once and
//! replaced by an interned [`TeamId`]. Game rows and standings tables both go
//! through the same registry, so keys agree across relocations and renames.

use crate::{HoopsError, Result, TeamId};
use std::collections::HashMap;

/// Current franchise names, in the order they are interned
pub const CANONICAL_TEAMS: [&str; 30] = [
    "Atlanta Hawks",
    "Boston Celtics",
    "Brooklyn Nets",
    "Charlotte Hornets",
    "Chicago Bulls",
    "Cleveland Cavaliers",
    "Dallas Mavericks",
    "Denver Nuggets",
    "Detroit Pistons",
    "Golden State Warriors",
    "Houston Rockets",
    "Indiana Pacers",
    "Los Angeles Clippers",
    "Los Angeles Lakers",
    "Memphis Grizzlies",
    "Miami Heat",
    "Milwaukee Bucks",
    "Minnesota Timberwolves",
    "New Orleans Pelicans",
    "New York Knicks",
    "Oklahoma City Thunder",
    "Orlando Magic",
    "Philadelphia 76ers",
    "Phoenix Suns",
    "Portland Trail Blazers",
    "Sacramento Kings",
    "San Antonio Spurs",
    "Toronto Raptors",
    "Utah Jazz",
    "Washington Wizards",
];

/// Historical or relocated names and the franchise they map to
pub const ALIASES: [(&str, &str); 6] = [
    ("LA Clippers", "Los Angeles Clippers"),
    ("New Jersey Nets", "Brooklyn Nets"),
    ("New Orleans Hornets", "New Orleans Pelicans"),
    ("New Orleans/Oklahoma City Hornets", "New Orleans Pelicans"),
    ("Charlotte Bobcats", "Charlotte Hornets"),
    ("Seattle SuperSonics", "Oklahoma City Thunder"),
];

/// Lookup key: trimmed, lowercased, playoff marker (`*`) dropped
fn name_key(name: &str) -> String {
    name.trim().trim_end_matches('*').trim_end().to_lowercase()
}

/// Interning table of canonical team names
#[derive(Debug, Clone)]
pub struct TeamRegistry {
    names: Vec<String>,
    lookup: HashMap<String, TeamId>,
}

impl TeamRegistry {
    /// Create a registry from canonical names and (alias, canonical) pairs
    pub fn new<'a, I, A>(canonical: I, aliases: A) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
        A: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut registry = TeamRegistry {
            names: Vec::new(),
            lookup: HashMap::new(),
        };

        for name in canonical {
            let key = name_key(name);
            if registry.lookup.contains_key(&key) {
                continue;
            }
            let id = TeamId(registry.names.len() as u16);
            registry.names.push(name.trim().to_string());
            registry.lookup.insert(key, id);
        }

        for (alias, target) in aliases {
            registry.add_alias(alias, target)?;
        }

        Ok(registry)
    }

    /// The current NBA registry with the built-in alias table
    pub fn nba() -> Self {
        let mut registry = TeamRegistry {
            names: Vec::with_capacity(CANONICAL_TEAMS.len()),
            lookup: HashMap::new(),
        };
        for (i, name) in CANONICAL_TEAMS.iter().enumerate() {
            registry.names.push(name.to_string());
            registry.lookup.insert(name_key(name), TeamId(i as u16));
        }
        for (alias, target) in ALIASES {
            if let Some(id) = registry.lookup.get(&name_key(target)).copied() {
                registry.lookup.insert(name_key(alias), id);
            }
        }
        registry
    }

    /// Map an extra historical name onto an existing canonical team
    pub fn add_alias(&mut self, alias: &str, canonical: &str) -> Result<TeamId> {
        let id = self.resolve(canonical, "alias table")?;
        self.lookup.insert(name_key(alias), id);
        Ok(id)
    }

    /// Resolve a name or alias, or `None` if it is unknown
    pub fn get(&self, name: &str) -> Option<TeamId> {
        self.lookup.get(&name_key(name)).copied()
    }

    /// Resolve a name or alias, failing with context for unknown names
    pub fn resolve(&self, name: &str, context: &str) -> Result<TeamId> {
        self.get(name).ok_or_else(|| HoopsError::UnknownTeamName {
            name: name.to_string(),
            context: context.to_string(),
        })
    }

    /// Canonical name of an interned team
    pub fn name(&self, id: TeamId) -> &str {
        self.names
            .get(id.0 as usize)
            .map(String::as_str)
            .unwrap_or("<unregistered>")
    }

    /// Number of canonical teams
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All canonical teams in id order
    pub fn teams(&self) -> impl Iterator<Item = (TeamId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (TeamId(i as u16), name.as_str()))
    }
}

impl Default for TeamRegistry {
    fn default() -> Self {
        Self::nba()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nba_registry_has_thirty_teams() {
        let registry = TeamRegistry::nba();
        assert_eq!(registry.len(), 30);
        assert_eq!(registry.name(TeamId(0)), "Atlanta Hawks");
    }

    #[test]
    fn test_aliases_resolve_to_current_franchise() {
        let registry = TeamRegistry::nba();
        let thunder = registry.get("Oklahoma City Thunder").unwrap();
        assert_eq!(registry.get("Seattle SuperSonics"), Some(thunder));

        let nets = registry.get("Brooklyn Nets").unwrap();
        assert_eq!(registry.get("New Jersey Nets"), Some(nets));

        let clippers = registry.get("Los Angeles Clippers").unwrap();
        assert_eq!(registry.get("LA Clippers"), Some(clippers));
    }

    #[test]
    fn test_lookup_ignores_case_and_playoff_marker() {
        let registry = TeamRegistry::nba();
        let celtics = registry.get("Boston Celtics").unwrap();
        assert_eq!(registry.get("  boston celtics "), Some(celtics));
        assert_eq!(registry.get("Boston Celtics*"), Some(celtics));
    }

    #[test]
    fn test_unknown_name_fails_with_context() {
        let registry = TeamRegistry::nba();
        let err = registry.resolve("Springfield Atoms", "game 001").unwrap_err();
        match err {
            HoopsError::UnknownTeamName { name, context } => {
                assert_eq!(name, "Springfield Atoms");
                assert_eq!(context, "game 001");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_custom_registry_and_extra_alias() {
        let mut registry =
            TeamRegistry::new(["A", "B", "C"], [("Old A", "A")]).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get("Old A"), registry.get("A"));

        registry.add_alias("Older A", "Old A").unwrap();
        assert_eq!(registry.get("Older A"), registry.get("A"));

        assert!(registry.add_alias("Ghost", "Nobody").is_err());
    }
}

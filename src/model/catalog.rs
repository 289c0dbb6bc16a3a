use serde::{Deserialize, Serialize};

/// A named group of workers that tasks are assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
}

/// A named area or zone of the construction site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
    pub name: String,
    #[serde(default, rename = "desc", alias = "description")]
    pub description: String,
}

/// Site configuration document: sectors, teams and the project goals text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub sectors: Vec<Sector>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub project_goals: String,
}

/// True if `name` matches one of `names` case-insensitively after trimming,
/// ignoring the entry at index `except`.
fn clashes<'a>(names: impl Iterator<Item = &'a str>, name: &str, except: Option<usize>) -> bool {
    let wanted = name.trim().to_lowercase();
    names
        .enumerate()
        .any(|(i, n)| Some(i) != except && n.trim().to_lowercase() == wanted)
}

impl SiteConfig {
    /// Trim whitespace around every team and sector name.
    pub fn normalize(&mut self) {
        for team in &mut self.teams {
            team.name = team.name.trim().to_string();
        }
        for sector in &mut self.sectors {
            sector.name = sector.name.trim().to_string();
        }
    }

    pub fn team_index(&self, name: &str) -> Option<usize> {
        self.teams.iter().position(|t| t.name == name)
    }

    pub fn sector_index(&self, name: &str) -> Option<usize> {
        self.sectors.iter().position(|s| s.name == name)
    }

    pub fn has_team(&self, name: &str) -> bool {
        self.team_index(name).is_some()
    }

    pub fn has_sector(&self, name: &str) -> bool {
        self.sector_index(name).is_some()
    }

    pub fn team_name_taken(&self, name: &str, except: Option<usize>) -> bool {
        clashes(self.teams.iter().map(|t| t.name.as_str()), name, except)
    }

    pub fn sector_name_taken(&self, name: &str, except: Option<usize>) -> bool {
        clashes(self.sectors.iter().map(|s| s.name.as_str()), name, except)
    }

    pub fn team_names(&self) -> Vec<&str> {
        self.teams.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn sector_names(&self) -> Vec<&str> {
        self.sectors.iter().map(|s| s.name.as_str()).collect()
    }

    /// Goals split into non-empty trimmed lines.
    pub fn goal_lines(&self) -> Vec<&str> {
        self.project_goals
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SiteConfig {
        SiteConfig {
            sectors: vec![Sector {
                name: "Block A".into(),
                description: "North tower".into(),
            }],
            teams: vec![Team { name: "Alpha".into() }, Team { name: "Beta".into() }],
            project_goals: String::new(),
        }
    }

    #[test]
    fn name_clash_is_case_insensitive() {
        let cfg = config();
        assert!(cfg.team_name_taken("alpha", None));
        assert!(cfg.team_name_taken("  BETA ", None));
        assert!(!cfg.team_name_taken("Gamma", None));
        assert!(cfg.sector_name_taken("block a", None));
    }

    #[test]
    fn name_clash_skips_the_entry_being_renamed() {
        let cfg = config();
        assert!(!cfg.team_name_taken("ALPHA", Some(0)));
        assert!(cfg.team_name_taken("alpha", Some(1)));
    }

    #[test]
    fn normalize_trims_names() {
        let mut cfg: SiteConfig = serde_json::from_str(
            r#"{"sectors": [{"name": " Garage ", "desc": ""}], "teams": [{"name": "Roofing  "}]}"#,
        )
        .unwrap();
        cfg.normalize();
        assert_eq!(cfg.sector_names(), vec!["Garage"]);
        assert_eq!(cfg.team_names(), vec!["Roofing"]);
        assert_eq!(cfg.project_goals, "");
    }

    #[test]
    fn sector_description_uses_desc_key_on_disk() {
        let value = serde_json::to_value(&config()).unwrap();
        assert_eq!(value["sectors"][0]["desc"], "North tower");
    }

    #[test]
    fn goal_lines_skip_blank_lines() {
        let mut cfg = config();
        cfg.project_goals = "Finish structure by June\n\n  Zero accidents  \n".into();
        assert_eq!(cfg.goal_lines(), vec!["Finish structure by June", "Zero accidents"]);
    }
}

//! Difficulty profiles from built-in tiers and TOML files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use quizmines_core::{Difficulty, DifficultyProfile, SafeZone};
use serde::{Deserialize, Serialize};

/// A profiles file: any number of `[[profile]]` tables.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilesFile {
    #[serde(default, rename = "profile")]
    pub profiles: Vec<DifficultyProfile>,
}

impl ProfilesFile {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid profiles file")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Could not load {}", path.display()))
    }

    /// Rejects profiles no session could be started with.
    pub fn validate(&self, safe_zone: SafeZone) -> Result<()> {
        for profile in &self.profiles {
            profile
                .validate(safe_zone)
                .with_context(|| format!("Profile {:?} is not playable", profile.name))?;
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Could not serialize profiles")
    }
}

pub fn builtin_profiles() -> ProfilesFile {
    ProfilesFile {
        profiles: Difficulty::ALL.map(Difficulty::profile).into(),
    }
}

/// Looks a profile up by name, ignoring case. Profiles from `file` shadow
/// the built-in tiers.
pub fn find_profile(name: &str, file: Option<&ProfilesFile>) -> Result<DifficultyProfile> {
    let builtin = builtin_profiles();
    let found = file
        .into_iter()
        .chain([&builtin])
        .flat_map(|source| &source.profiles)
        .find(|profile| profile.name.eq_ignore_ascii_case(name));

    match found {
        Some(profile) => Ok(profile.clone()),
        None => bail!("Unknown profile {name:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUSTOM: &str = r#"
[[profile]]
name = "Tiny"
rows = 5
cols = 5
mines = 3
starting_lives = 1
reveal_points = 2
bonus_points = 5
penalty_points = 5
question_points = 5

[profile.specials]
questions = 1
bonuses = 0
penalties = 0

[[profile]]
name = "Easy"
rows = 8
cols = 8
mines = 8
starting_lives = 4
reveal_points = 1
mine_hit_points = -3
bonus_points = 8
penalty_points = 8
question_points = 8
"#;

    #[test]
    fn parses_and_shadows_builtins() {
        let file = ProfilesFile::parse(CUSTOM).unwrap();
        assert_eq!(file.profiles.len(), 2);
        file.validate(SafeZone::Neighborhood).unwrap();

        let tiny = find_profile("tiny", Some(&file)).unwrap();
        assert_eq!(tiny.specials.questions, 1);
        assert_eq!(tiny.mine_hit_points, 0);

        let easy = find_profile("EASY", Some(&file)).unwrap();
        assert_eq!((easy.rows, easy.mine_hit_points), (8, -3));
        assert_eq!(find_profile("easy", None).unwrap(), Difficulty::Easy.profile());
        assert!(find_profile("Nightmare", Some(&file)).is_err());
    }

    #[test]
    fn rejects_unplayable_profiles() {
        let mut file = ProfilesFile::parse(CUSTOM).unwrap();
        file.profiles[0].mines = 20;

        assert!(file.validate(SafeZone::Neighborhood).is_err());
        assert!(ProfilesFile::parse("[[profile]]\nname = 3").is_err());
    }

    #[test]
    fn builtins_survive_toml() {
        let text = builtin_profiles().to_toml().unwrap();

        assert_eq!(ProfilesFile::parse(&text).unwrap(), builtin_profiles());
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.toml");
        fs::write(&path, CUSTOM).unwrap();

        assert_eq!(ProfilesFile::load(&path).unwrap().profiles[0].name, "Tiny");
        assert!(ProfilesFile::load(&dir.path().join("missing.toml")).is_err());
    }
}

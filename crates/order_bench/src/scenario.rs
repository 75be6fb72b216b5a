use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use order_core::Strategy;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub name: String,
    /// Menu day to select from.
    pub date: NaiveDate,
    /// Rule config name. Falls back to the store default.
    #[serde(default)]
    pub rules: Option<String>,
    pub seeds: SeedSpec,
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub overrides: HashMap<String, serde_json::Value>,
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("./content")
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SeedSpec {
    List(Vec<u64>),
    Range { range: [u64; 2] },
}

impl SeedSpec {
    pub fn expand(&self) -> Vec<u64> {
        match self {
            SeedSpec::List(seeds) => seeds.clone(),
            SeedSpec::Range { range } => (range[0]..=range[1]).collect(),
        }
    }
}

pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading scenario file: {}", path.display()))?;
    let scenario: Scenario = serde_json::from_str(&json)
        .with_context(|| format!("parsing scenario file: {}", path.display()))?;
    if scenario.name.is_empty() {
        bail!("scenario 'name' must not be empty");
    }
    let seeds = scenario.seeds.expand();
    if seeds.is_empty() {
        bail!("scenario 'seeds' must produce at least one seed");
    }
    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_scenario(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_scenario_with_seed_list() {
        let file = write_temp_scenario(
            r#"{
            "name": "weekday_lunch",
            "date": "2026-10-19",
            "seeds": [1, 2, 3]
        }"#,
        );
        let scenario = load_scenario(file.path()).unwrap();
        assert_eq!(scenario.name, "weekday_lunch");
        assert_eq!(scenario.date, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert_eq!(scenario.seeds.expand(), vec![1, 2, 3]);
        assert_eq!(scenario.content_dir, PathBuf::from("./content"));
        assert_eq!(scenario.strategy, Strategy::Constrained);
        assert!(scenario.rules.is_none());
        assert!(scenario.overrides.is_empty());
    }

    #[test]
    fn test_load_scenario_with_seed_range() {
        let file = write_temp_scenario(
            r#"{
            "name": "range_test",
            "date": "2026-10-19",
            "seeds": {"range": [1, 5]}
        }"#,
        );
        let scenario = load_scenario(file.path()).unwrap();
        assert_eq!(scenario.seeds.expand(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_load_scenario_with_strategy_and_overrides() {
        let file = write_temp_scenario(
            r#"{
            "name": "override_test",
            "date": "2026-10-19",
            "rules": "friday",
            "strategy": "single-pass",
            "seeds": [42],
            "overrides": {
                "total_cost.max": 25.0,
                "max_attempts": 5
            }
        }"#,
        );
        let scenario = load_scenario(file.path()).unwrap();
        assert_eq!(scenario.rules.as_deref(), Some("friday"));
        assert_eq!(scenario.strategy, Strategy::SinglePass);
        assert_eq!(scenario.overrides.len(), 2);
    }

    #[test]
    fn test_load_scenario_empty_name_fails() {
        let file = write_temp_scenario(
            r#"{
            "name": "",
            "date": "2026-10-19",
            "seeds": [1]
        }"#,
        );
        let result = load_scenario(file.path());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("name"));
    }

    #[test]
    fn test_load_scenario_empty_seed_range_fails() {
        let file = write_temp_scenario(
            r#"{
            "name": "bad",
            "date": "2026-10-19",
            "seeds": {"range": [5, 1]}
        }"#,
        );
        assert!(load_scenario(file.path()).is_err());
    }

    #[test]
    fn test_load_scenario_bad_date_fails() {
        let file = write_temp_scenario(
            r#"{
            "name": "bad",
            "date": "19.10.2026",
            "seeds": [1]
        }"#,
        );
        assert!(load_scenario(file.path()).is_err());
    }
}

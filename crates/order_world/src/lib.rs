//! File-backed menu source and rule store shared between order_cli and
//! order_bench.
//!
//! Layout of a content directory:
//! - `menus/<YYYY-MM-DD>.json`: one menu snapshot per day
//! - `rules.json`: named rule configs plus the default name

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use order_core::rules::MAX_WEIGHT;
use order_core::{Menus, OrderLine, RuleConfig, TargetId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Serialize, Deserialize)]
pub struct MenuFile {
    pub date: NaiveDate,
    pub targets: Menus,
}

/// Named rule configs as the user maintains them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleStore {
    pub default: String,
    pub configs: BTreeMap<String, RuleConfig>,
}

impl RuleStore {
    /// Resolves `name`, or the default config when `name` is `None`.
    pub fn get(&self, name: Option<&str>) -> Result<(&str, &RuleConfig)> {
        let name = name.unwrap_or(&self.default);
        match self.configs.get_key_value(name) {
            Some((key, config)) => Ok((key.as_str(), config)),
            None => bail!(
                "unknown rule config '{name}'. Known configs: {}",
                self.names().join(", ")
            ),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.configs.keys().map(String::as_str).collect()
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .with_context(|| format!("invalid date '{value}', expected YYYY-MM-DD"))
}

pub fn menu_path(content_dir: &Path, date: NaiveDate) -> PathBuf {
    content_dir
        .join("menus")
        .join(format!("{}.json", date.format(DATE_FORMAT)))
}

/// Validates a menu snapshot, failing on any authoring error.
///
/// Catches mistakes like: an item filed under the wrong target, a duplicate
/// item id within one target, or a negative price.
pub fn validate_menus(menus: &Menus) -> Result<()> {
    let mut target_ids: Vec<&TargetId> = menus.keys().collect();
    target_ids.sort();
    for target_id in target_ids {
        let mut seen = HashSet::new();
        for item in &menus[target_id] {
            if item.target_id != *target_id {
                bail!(
                    "item '{}' is listed under target '{target_id}' but names target '{}'",
                    item.id,
                    item.target_id,
                );
            }
            if !seen.insert(&item.id) {
                bail!("target '{target_id}' lists item '{}' twice", item.id);
            }
            if !item.price.is_finite() || item.price < 0.0 {
                bail!(
                    "item '{target_id}/{}' has invalid price {}",
                    item.id,
                    item.price
                );
            }
        }
    }
    Ok(())
}

pub fn load_menus(content_dir: &Path, date: NaiveDate) -> Result<Menus> {
    let path = menu_path(content_dir, date);
    let file: MenuFile = serde_json::from_str(
        &std::fs::read_to_string(&path)
            .with_context(|| format!("reading menu file: {}", path.display()))?,
    )
    .with_context(|| format!("parsing menu file: {}", path.display()))?;
    if file.date != date {
        bail!(
            "menu file {} is dated {}, expected {date}",
            path.display(),
            file.date
        );
    }
    validate_menus(&file.targets).with_context(|| format!("validating {}", path.display()))?;
    Ok(file.targets)
}

/// Dates with a menu file, oldest first.
pub fn available_dates(content_dir: &Path) -> Result<Vec<NaiveDate>> {
    let dir = content_dir.join("menus");
    let mut dates = Vec::new();
    for entry in
        std::fs::read_dir(&dir).with_context(|| format!("listing {}", dir.display()))?
    {
        let path = entry.context("reading menu directory entry")?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        if let Ok(date) = NaiveDate::parse_from_str(stem, DATE_FORMAT) {
            dates.push(date);
        }
    }
    dates.sort();
    Ok(dates)
}

/// Rejects configs the selector cannot interpret sensibly.
pub fn validate_rules(config: &RuleConfig) -> Result<()> {
    let bounds = &config.total_cost;
    for (label, value) in [("min", bounds.min), ("mid", bounds.mid), ("max", bounds.max)] {
        if !value.is_finite() || value < 0.0 {
            bail!("totalCost.{label} must be a non-negative number, got {value}");
        }
    }
    if bounds.min > bounds.mid || bounds.mid > bounds.max {
        bail!(
            "totalCost must satisfy min <= mid <= max, got {} / {} / {}",
            bounds.min,
            bounds.mid,
            bounds.max
        );
    }
    if config.select_from_targets.is_empty() {
        bail!("selectFromTargets must name at least one target");
    }
    for (target_id, target_rules) in &config.targets_data {
        let categories = target_rules
            .categories
            .iter()
            .map(|(name, rule)| (format!("category '{name}'"), rule));
        let items = target_rules
            .items
            .iter()
            .map(|(id, rule)| (format!("item '{id}'"), rule));
        for (label, rule) in categories.chain(items) {
            if !rule.weight.is_finite() || rule.weight < 0.0 {
                bail!(
                    "target '{target_id}' {label} has invalid weight {}",
                    rule.weight
                );
            }
            if rule.weight > MAX_WEIGHT {
                bail!(
                    "target '{target_id}' {label} has weight {} above {MAX_WEIGHT}",
                    rule.weight
                );
            }
        }
    }
    Ok(())
}

/// Non-fatal mismatches between a config and a day's menu. The selector
/// ignores these references, but they usually mean the config went stale.
pub fn rule_warnings(config: &RuleConfig, menus: &Menus) -> Vec<String> {
    let mut warnings = Vec::new();
    for target_id in &config.select_from_targets {
        if !menus.contains_key(target_id) {
            warnings.push(format!("target '{target_id}' has no menu for this day"));
        }
    }

    let mut configured: Vec<_> = config.targets_data.iter().collect();
    configured.sort_by(|a, b| a.0.cmp(b.0));
    for (target_id, target_rules) in configured {
        if !config.select_from_targets.contains(target_id) {
            warnings.push(format!(
                "rules for target '{target_id}' are unused: it is not in selectFromTargets"
            ));
        }
        let Some(items) = menus.get(target_id) else {
            continue;
        };
        let categories: HashSet<&str> = items.iter().map(|item| item.category.as_str()).collect();
        let mut category_names: Vec<&String> = target_rules.categories.keys().collect();
        category_names.sort();
        for name in category_names {
            if !categories.contains(name.as_str()) {
                warnings.push(format!(
                    "target '{target_id}' has no category '{name}' on this menu"
                ));
            }
        }
        let mut item_ids: Vec<_> = target_rules.items.keys().collect();
        item_ids.sort();
        for item_id in item_ids {
            if !items.iter().any(|item| item.id == *item_id) {
                warnings.push(format!(
                    "target '{target_id}' has no item '{item_id}' on this menu"
                ));
            }
        }
    }
    warnings
}

pub fn load_rule_store(content_dir: &Path) -> Result<RuleStore> {
    let path = content_dir.join("rules.json");
    let store: RuleStore = serde_json::from_str(
        &std::fs::read_to_string(&path).context("reading rules.json")?,
    )
    .context("parsing rules.json")?;
    if !store.configs.contains_key(&store.default) {
        bail!("rules.json default '{}' is not a known config", store.default);
    }
    for (name, config) in &store.configs {
        validate_rules(config).with_context(|| format!("rule config '{name}'"))?;
    }
    Ok(store)
}

/// The summed quantity of all lines must fit in a `u32`.
pub fn read_basket(path: &Path) -> Result<Vec<OrderLine>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading basket file: {}", path.display()))?;
    let lines: Vec<OrderLine> = serde_json::from_str(&json)
        .with_context(|| format!("parsing basket file: {}", path.display()))?;
    if lines
        .iter()
        .try_fold(0u32, |units, line| units.checked_add(line.quantity))
        .is_none()
    {
        bail!("basket file {} holds more units than can be counted", path.display());
    }
    Ok(lines)
}

/// Write JSON atomically: write to `.tmp` then rename.
pub fn write_basket(path: &Path, lines: &[OrderLine]) -> Result<()> {
    write_json_atomic(path, &lines)
}

pub fn write_json_atomic(path: &Path, value: &impl Serialize) -> Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(value).context("serializing JSON")?;
    std::fs::write(&tmp_path, json)
        .with_context(|| format!("writing {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {} to {}", tmp_path.display(), path.display()))?;
    Ok(())
}

pub fn write_run_info(
    dir: &Path,
    run_id: &str,
    seed: u64,
    rules_name: &str,
    menu_date: NaiveDate,
    args: serde_json::Value,
) -> Result<()> {
    let info = serde_json::json!({
        "run_id": run_id,
        "seed": seed,
        "start_time": chrono::Utc::now().to_rfc3339(),
        "rules": rules_name,
        "menu_date": menu_date.format(DATE_FORMAT).to_string(),
        "args": args,
    });
    write_json_atomic(&dir.join("run_info.json"), &info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_core::test_fixtures::{canteen, item, line_for, menus_of, rule, set_item_rule};
    use tempfile::TempDir;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn write_menu_file(dir: &Path, date: NaiveDate, menus: &Menus) {
        std::fs::create_dir_all(dir.join("menus")).unwrap();
        let file = MenuFile {
            date,
            targets: menus.clone(),
        };
        std::fs::write(
            menu_path(dir, date),
            serde_json::to_string(&file).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn menus_round_trip_through_content_dir() {
        let temp = TempDir::new().unwrap();
        let (menus, _) = canteen();
        write_menu_file(temp.path(), day(), &menus);

        let loaded = load_menus(temp.path(), day()).unwrap();

        assert_eq!(loaded, menus);
        assert_eq!(available_dates(temp.path()).unwrap(), vec![day()]);
    }

    #[test]
    fn missing_menu_names_the_file() {
        let temp = TempDir::new().unwrap();
        let err = load_menus(temp.path(), day()).unwrap_err();
        assert!(format!("{err:#}").contains("2026-10-19.json"));
    }

    #[test]
    fn menu_dated_for_another_day_is_rejected() {
        let temp = TempDir::new().unwrap();
        let (menus, _) = canteen();
        write_menu_file(temp.path(), day(), &menus);
        let other = day().succ_opt().unwrap();
        std::fs::rename(menu_path(temp.path(), day()), menu_path(temp.path(), other)).unwrap();

        let err = load_menus(temp.path(), other).unwrap_err();
        assert!(format!("{err:#}").contains("is dated"));
    }

    #[test]
    fn misfiled_item_is_rejected() {
        let mut menus = menus_of(vec![item("A", "x", "Food", 1.0)]);
        menus
            .get_mut(&TargetId::from("A"))
            .unwrap()
            .push(item("B", "y", "Food", 1.0));
        let err = validate_menus(&menus).unwrap_err();
        assert!(err.to_string().contains("names target 'B'"));
    }

    #[test]
    fn duplicate_item_is_rejected() {
        let menus = menus_of(vec![item("A", "x", "Food", 1.0), item("A", "x", "Food", 2.0)]);
        assert!(validate_menus(&menus).unwrap_err().to_string().contains("twice"));
    }

    #[test]
    fn negative_price_is_rejected() {
        let menus = menus_of(vec![item("A", "x", "Food", -1.0)]);
        assert!(validate_menus(&menus).is_err());
    }

    #[test]
    fn rule_bounds_must_be_ordered() {
        let (_, mut rules) = canteen();
        assert!(validate_rules(&rules).is_ok());
        rules.total_cost.mid = rules.total_cost.max + 1.0;
        assert!(validate_rules(&rules)
            .unwrap_err()
            .to_string()
            .contains("min <= mid <= max"));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let (_, mut rules) = canteen();
        set_item_rule(&mut rules, "canteen", "curry", rule(-1.0, None, None));
        assert!(validate_rules(&rules)
            .unwrap_err()
            .to_string()
            .contains("invalid weight"));
    }

    #[test]
    fn huge_weight_is_rejected() {
        let (_, mut rules) = canteen();
        set_item_rule(&mut rules, "canteen", "curry", rule(1e300, None, None));
        let err = validate_rules(&rules).unwrap_err().to_string();
        assert!(err.contains("above"), "{err}");

        let (_, mut rules) = canteen();
        set_item_rule(&mut rules, "canteen", "curry", rule(MAX_WEIGHT, None, None));
        validate_rules(&rules).unwrap();
    }

    #[test]
    fn stale_references_become_warnings() {
        let (menus, mut rules) = canteen();
        assert!(rule_warnings(&rules, &menus).is_empty());

        rules.select_from_targets.push(TargetId::from("deli"));
        set_item_rule(&mut rules, "canteen", "pizza", rule(1.0, None, None));
        set_item_rule(&mut rules, "florist", "tulips", rule(1.0, None, None));

        let warnings = rule_warnings(&rules, &menus);
        assert_eq!(warnings.len(), 3, "{warnings:?}");
        assert!(warnings[0].contains("deli"));
        assert!(warnings.iter().any(|w| w.contains("pizza")));
        assert!(warnings.iter().any(|w| w.contains("florist")));
    }

    #[test]
    fn rule_store_resolves_default_and_named_configs() {
        let (_, rules) = canteen();
        let store = RuleStore {
            default: "weekday".to_string(),
            configs: BTreeMap::from([
                ("weekday".to_string(), rules.clone()),
                ("friday".to_string(), rules),
            ]),
        };
        assert_eq!(store.get(None).unwrap().0, "weekday");
        assert_eq!(store.get(Some("friday")).unwrap().0, "friday");
        let err = store.get(Some("sunday")).unwrap_err();
        assert!(err.to_string().contains("friday, weekday"));
    }

    #[test]
    fn rule_store_with_unknown_default_fails_to_load() {
        let temp = TempDir::new().unwrap();
        let (_, rules) = canteen();
        let store = RuleStore {
            default: "missing".to_string(),
            configs: BTreeMap::from([("weekday".to_string(), rules)]),
        };
        write_json_atomic(&temp.path().join("rules.json"), &store).unwrap();
        assert!(load_rule_store(temp.path()).is_err());
    }

    #[test]
    fn basket_files_round_trip() {
        let temp = TempDir::new().unwrap();
        let (menus, rules) = canteen();
        let lines = order_core::select(
            &menus,
            &rules,
            None,
            &mut order_core::test_fixtures::make_rng(),
        );
        let path = temp.path().join("basket.json");

        write_basket(&path, &lines).unwrap();

        assert_eq!(read_basket(&path).unwrap(), lines);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn basket_with_uncountable_units_is_rejected() {
        let temp = TempDir::new().unwrap();
        let (menus, _) = canteen();
        let curry = menus[&TargetId::from("canteen")]
            .iter()
            .find(|item| item.id.0 == "curry")
            .unwrap();
        let lines = vec![line_for(curry, u32::MAX), line_for(curry, 1)];
        let path = temp.path().join("basket.json");
        write_basket(&path, &lines).unwrap();

        let err = read_basket(&path).unwrap_err().to_string();
        assert!(err.contains("more units"), "{err}");
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert_eq!(parse_date("2026-10-19").unwrap(), day());
        assert!(parse_date("19.10.2026").is_err());
    }
}

//! Before/after comparison of `/health` readings across a redeploy.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_SNAPSHOT_FILE: &str = ".volcheck.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub url: String,
    pub taken_at: DateTime<Utc>,
    pub health: BTreeMap<String, Value>,
}

impl Snapshot {
    pub fn new(url: &str, health: BTreeMap<String, Value>) -> Self {
        Self {
            url: url.to_string(),
            taken_at: Utc::now(),
            health,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize snapshot")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write snapshot file: {}", path.display()))?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot file: {}", path.display()))?;
        serde_json::from_str(&data).context("Failed to parse snapshot file")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Check {
    pub key: String,
    pub before: Value,
    pub after: Value,
    pub passed: bool,
}

/// Counters must not go down and a store that existed must still exist.
/// Non-numeric, non-boolean fields (like `status`) are not compared.
pub fn compare(before: &BTreeMap<String, Value>, after: &BTreeMap<String, Value>) -> Vec<Check> {
    let mut checks = Vec::new();
    for (key, old) in before {
        let new = after.get(key).cloned().unwrap_or(Value::Null);
        let passed = match (old, &new) {
            (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => b >= a,
                _ => false,
            },
            (Value::Number(_), _) => false,
            (Value::Bool(true), Value::Bool(b)) => *b,
            (Value::Bool(true), _) => false,
            (Value::Bool(false), _) => true,
            _ => continue,
        };
        checks.push(Check {
            key: key.clone(),
            before: old.clone(),
            after: new,
            passed,
        });
    }
    checks
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> BTreeMap<String, Value> {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn growing_counts_pass() {
        let before = map(json!({"status": "healthy", "users": 2, "visits": 10, "db_exists": true}));
        let after = map(json!({"status": "healthy", "users": 2, "visits": 11, "db_exists": true}));
        let checks = compare(&before, &after);
        assert_eq!(checks.len(), 3);
        assert!(checks.iter().all(|c| c.passed));
    }

    #[test]
    fn reset_counts_fail() {
        let before = map(json!({"visits": 10, "files": 3, "visits_file_exists": true}));
        let after = map(json!({"visits": 1, "files": 0, "visits_file_exists": true}));
        let failed: Vec<_> = compare(&before, &after)
            .into_iter()
            .filter(|c| !c.passed)
            .map(|c| c.key)
            .collect();
        assert_eq!(failed, vec!["files", "visits"]);
    }

    #[test]
    fn vanished_store_fails() {
        let before = map(json!({"db_exists": true, "users": 1}));
        let after = map(json!({"db_exists": false}));
        let checks = compare(&before, &after);
        assert!(checks.iter().all(|c| !c.passed));
    }

    #[test]
    fn save_then_load() {
        let td = tempfile::TempDir::new().unwrap();
        let path = td.path().join("snap.json");
        let snap = Snapshot::new("http://localhost:5000", map(json!({"visits": 4})));
        snap.save(&path).unwrap();

        let loaded = Snapshot::load(&path).unwrap();
        assert_eq!(loaded.url, "http://localhost:5000");
        assert_eq!(loaded.health["visits"], json!(4));
    }
}

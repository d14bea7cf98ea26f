use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::param::ParamValue;
use super::store::ConfigStore;
use crate::error::Result;

/// Serializable snapshot of parameter values, `group -> key -> value`.
///
/// ```json
/// { "core": { "radius": 0.5, "detail": 2 }, "petal": { "color": "#f0f700" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preset {
    pub groups: BTreeMap<String, BTreeMap<String, ParamValue>>,
}

impl Preset {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl ConfigStore {
    pub fn snapshot(&self) -> Preset {
        let groups = self
            .groups()
            .iter()
            .map(|group| {
                let values = group
                    .params()
                    .iter()
                    .map(|p| (p.key().to_string(), p.value()))
                    .collect();
                (group.name().to_string(), values)
            })
            .collect();
        Preset { groups }
    }

    /// Apply every value in `preset` through the clamping setters and queue a
    /// change notification for each touched parameter. Returns how many
    /// values were applied.
    ///
    /// Fails on the first unknown group or parameter; values applied before
    /// the failure stay applied.
    pub fn apply_preset(&mut self, preset: &Preset) -> Result<usize> {
        let mut applied = 0;
        for (group, values) in &preset.groups {
            for (key, value) in values {
                self.set(group, key, *value)?;
                self.notify(group, key);
                applied += 1;
            }
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Param, ParameterGroup};
    use crate::error::SceneError;

    fn store() -> ConfigStore {
        ConfigStore::new().with_group(
            ParameterGroup::new("core")
                .with(Param::float("radius", 0.8, 0.1, 0.8))
                .with(Param::int("detail", 3, 0, 3)),
        )
    }

    #[test]
    fn test_snapshot_round_trip() {
        let config = store();
        let json = config.snapshot().to_json().unwrap();
        let preset = Preset::from_json(&json).unwrap();
        assert_eq!(preset, config.snapshot());
    }

    #[test]
    fn test_apply_clamps_and_notifies() {
        let mut config = store();
        let preset = Preset::from_json(r#"{ "core": { "radius": 3.0, "detail": 1 } }"#).unwrap();
        assert_eq!(config.apply_preset(&preset), Ok(2));
        assert_eq!(config.float("core", "radius"), Ok(0.8));
        assert_eq!(config.count("core", "detail"), Ok(1));

        let changes = config.drain_changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].keys, ["detail", "radius"]);
    }

    #[test]
    fn test_apply_unknown_group() {
        let mut config = store();
        let preset = Preset::from_json(r#"{ "petal": { "count": 3 } }"#).unwrap();
        assert_eq!(
            config.apply_preset(&preset),
            Err(SceneError::UnknownGroup("petal".into()))
        );
    }
}

use log::debug;

use super::param::{ParamValue, ParameterGroup, UpdateMode};
use crate::error::{Result, SceneError};
use crate::math::Rgb;

/// Notification that parameters of one group changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamChange {
    pub group: String,
    pub keys: Vec<String>,
}

/// All parameter groups of a scene plus the queue of pending change
/// notifications.
///
/// Shape parameters notify once, on [`finish_edit`](Self::finish_edit);
/// colour, intensity and motion parameters notify on every value change.
/// Notifications for the same group are merged until drained.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    groups: Vec<ParameterGroup>,
    pending: Vec<ParamChange>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, group: ParameterGroup) -> Self {
        self.groups.retain(|g| g.name() != group.name());
        self.groups.push(group);
        self
    }

    pub fn groups(&self) -> &[ParameterGroup] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Result<&ParameterGroup> {
        self.groups
            .iter()
            .find(|g| g.name() == name)
            .ok_or_else(|| SceneError::UnknownGroup(name.to_string()))
    }

    fn group_mut(&mut self, name: &str) -> Result<&mut ParameterGroup> {
        self.groups
            .iter_mut()
            .find(|g| g.name() == name)
            .ok_or_else(|| SceneError::UnknownGroup(name.to_string()))
    }

    pub fn value(&self, group: &str, key: &str) -> Result<ParamValue> {
        Ok(self.group(group)?.param(key)?.value())
    }

    pub fn float(&self, group: &str, key: &str) -> Result<f32> {
        self.group(group)?.float(key)
    }

    pub fn count(&self, group: &str, key: &str) -> Result<u32> {
        self.group(group)?.count(key)
    }

    pub fn color(&self, group: &str, key: &str) -> Result<Rgb> {
        self.group(group)?.color(key)
    }

    /// Store a new value, clamped into the parameter's domain.
    ///
    /// Returns whether the stored value changed. Continuous parameters queue
    /// a notification right away.
    pub fn set(&mut self, group: &str, key: &str, value: impl Into<ParamValue>) -> Result<bool> {
        let param = self.group_mut(group)?.param_mut(key)?;
        let outcome = param.assign(value.into());
        let mode = param.update_mode();
        match outcome {
            Ok(changed) => {
                if changed && mode == UpdateMode::Continuous {
                    self.notify(group, key);
                }
                Ok(changed)
            }
            Err(rejection) => Err(self.group(group)?.rejection(key, rejection)),
        }
    }

    /// Mark an interactive edit as complete. Queues a notification for
    /// finish-mode parameters; continuous ones were already reported.
    pub fn finish_edit(&mut self, group: &str, key: &str) -> Result<()> {
        if self.group(group)?.param(key)?.update_mode() == UpdateMode::Finish {
            self.notify(group, key);
        }
        Ok(())
    }

    /// Programmatic one-shot edit: [`set`](Self::set) followed by
    /// [`finish_edit`](Self::finish_edit)
    pub fn edit(&mut self, group: &str, key: &str, value: impl Into<ParamValue>) -> Result<bool> {
        let changed = self.set(group, key, value)?;
        self.finish_edit(group, key)?;
        Ok(changed)
    }

    pub(crate) fn notify(&mut self, group: &str, key: &str) {
        debug!("parameter {group}.{key} changed");
        match self.pending.iter_mut().find(|c| c.group == group) {
            Some(change) => {
                if !change.keys.iter().any(|k| k == key) {
                    change.keys.push(key.to_string());
                }
            }
            None => self.pending.push(ParamChange {
                group: group.to_string(),
                keys: vec![key.to_string()],
            }),
        }
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Take every queued notification, oldest group first
    pub fn drain_changes(&mut self) -> Vec<ParamChange> {
        std::mem::take(&mut self.pending)
    }
}

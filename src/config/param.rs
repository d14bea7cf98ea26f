use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};
use crate::math::Rgb;

/// Current value of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f32),
    Color(Rgb),
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Float(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v as f32)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<Rgb> for ParamValue {
    fn from(v: Rgb) -> Self {
        ParamValue::Color(v)
    }
}

/// Allowed values of a parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Domain {
    Float { min: f32, max: f32, step: Option<f32> },
    Int { min: i64, max: i64, step: i64 },
    Color,
}

/// What a change to the parameter invalidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    /// Shape or placement: geometry must be rebuilt
    Geometry,
    /// Material colour, patched in place
    Color,
    /// Light intensity, patched in place
    Intensity,
    /// Read every frame by the animation driver
    Motion,
}

/// When the control panel reports an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Every intermediate value while dragging
    Continuous,
    /// Once, when the edit is complete
    Finish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rejection {
    Type(&'static str),
    NonFinite,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    key: String,
    label: String,
    domain: Domain,
    value: ParamValue,
    effect: Effect,
}

impl Param {
    /// Bounded float; the default is clamped into `[min, max]`
    pub fn float(key: &str, value: f32, min: f32, max: f32) -> Self {
        Self::build(
            key,
            Domain::Float { min, max, step: None },
            ParamValue::Float(value),
            Effect::Geometry,
        )
    }

    /// Bounded integer with step 1
    pub fn int(key: &str, value: i64, min: i64, max: i64) -> Self {
        Self::build(
            key,
            Domain::Int { min, max, step: 1 },
            ParamValue::Int(value),
            Effect::Geometry,
        )
    }

    pub fn color(key: &str, hex: u32) -> Self {
        Self::build(key, Domain::Color, ParamValue::Color(Rgb::from_hex(hex)), Effect::Color)
    }

    fn build(key: &str, domain: Domain, value: ParamValue, effect: Effect) -> Self {
        let mut param = Self {
            key: key.to_string(),
            label: key.to_string(),
            domain,
            value,
            effect,
        };
        param.reclamp();
        param
    }

    /// Slider step of a float parameter; no effect on other domains
    pub fn step(mut self, step: f32) -> Self {
        if let Domain::Float { step: s, .. } = &mut self.domain {
            *s = Some(step).filter(|v| *v > 0.0);
            self.reclamp();
        }
        self
    }

    /// Slider step of an integer parameter, at least 1
    pub fn int_step(mut self, step: i64) -> Self {
        if let Domain::Int { step: s, .. } = &mut self.domain {
            *s = step.max(1);
            self.reclamp();
        }
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = effect;
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    fn reclamp(&mut self) {
        if let Ok(v) = self.coerce(self.value) {
            self.value = v;
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn value(&self) -> ParamValue {
        self.value
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    /// Shape edits are only reported once finished; the rest stream
    pub fn update_mode(&self) -> UpdateMode {
        match self.effect {
            Effect::Geometry => UpdateMode::Finish,
            Effect::Color | Effect::Intensity | Effect::Motion => UpdateMode::Continuous,
        }
    }

    /// Bring `value` into this parameter's domain: clamp, snap to step,
    /// convert between int and float.
    pub(crate) fn coerce(&self, value: ParamValue) -> std::result::Result<ParamValue, Rejection> {
        match self.domain {
            Domain::Float { min, max, step } => {
                let v = match value {
                    ParamValue::Float(v) => v,
                    ParamValue::Int(v) => v as f32,
                    ParamValue::Color(_) => return Err(Rejection::Type("number")),
                };
                if !v.is_finite() {
                    return Err(Rejection::NonFinite);
                }
                let snapped = match step {
                    Some(step) => min + ((v - min) / step).round() * step,
                    None => v,
                };
                Ok(ParamValue::Float(snapped.clamp(min, max)))
            }
            Domain::Int { min, max, step } => {
                let v = match value {
                    ParamValue::Int(v) => v,
                    ParamValue::Float(v) if v.is_finite() => v.round() as i64,
                    ParamValue::Float(_) => return Err(Rejection::NonFinite),
                    ParamValue::Color(_) => return Err(Rejection::Type("integer")),
                };
                // clamp first so the offset from `min` cannot overflow
                let offset = (v.clamp(min, max) as i128 - min as i128) as f64;
                let snapped = min as i128 + (offset / step as f64).round() as i128 * step as i128;
                Ok(ParamValue::Int(snapped.clamp(min as i128, max as i128) as i64))
            }
            Domain::Color => match value {
                ParamValue::Color(c) => Ok(ParamValue::Color(c.saturate())),
                _ => Err(Rejection::Type("colour")),
            },
        }
    }

    /// Apply a coerced value; returns whether it changed
    pub(crate) fn assign(&mut self, value: ParamValue) -> std::result::Result<bool, Rejection> {
        let value = self.coerce(value)?;
        let changed = value != self.value;
        self.value = value;
        Ok(changed)
    }
}

/// Named set of parameters, e.g. `core` or `petal`
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGroup {
    name: String,
    params: Vec<Param>,
}

impl ParameterGroup {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            params: Vec::new(),
        }
    }

    pub fn with(mut self, param: Param) -> Self {
        self.params.retain(|p| p.key != param.key);
        self.params.push(param);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn param(&self, key: &str) -> Result<&Param> {
        self.params
            .iter()
            .find(|p| p.key == key)
            .ok_or_else(|| self.unknown(key))
    }

    pub(crate) fn param_mut(&mut self, key: &str) -> Result<&mut Param> {
        let err = self.unknown(key);
        self.params.iter_mut().find(|p| p.key == key).ok_or(err)
    }

    fn unknown(&self, key: &str) -> SceneError {
        SceneError::UnknownParameter {
            group: self.name.clone(),
            key: key.to_string(),
        }
    }

    pub(crate) fn rejection(&self, key: &str, rejection: Rejection) -> SceneError {
        match rejection {
            Rejection::Type(expected) => SceneError::ParameterType {
                group: self.name.clone(),
                key: key.to_string(),
                expected,
            },
            Rejection::NonFinite => {
                SceneError::invalid(format!("{}.{key}", self.name), "value is not finite")
            }
        }
    }

    fn type_error(&self, key: &str, expected: &'static str) -> SceneError {
        self.rejection(key, Rejection::Type(expected))
    }

    pub fn float(&self, key: &str) -> Result<f32> {
        match self.param(key)?.value {
            ParamValue::Float(v) => Ok(v),
            ParamValue::Int(v) => Ok(v as f32),
            ParamValue::Color(_) => Err(self.type_error(key, "number")),
        }
    }

    pub fn int(&self, key: &str) -> Result<i64> {
        match self.param(key)?.value {
            ParamValue::Int(v) => Ok(v),
            _ => Err(self.type_error(key, "integer")),
        }
    }

    /// Integer parameter that must be a non-negative count
    pub fn count(&self, key: &str) -> Result<u32> {
        let v = self.int(key)?;
        u32::try_from(v).map_err(|_| {
            SceneError::invalid(format!("{}.{key}", self.name), format!("{v} is not a count"))
        })
    }

    pub fn color(&self, key: &str) -> Result<Rgb> {
        match self.param(key)?.value {
            ParamValue::Color(c) => Ok(c),
            _ => Err(self.type_error(key, "colour")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_clamps_and_snaps() {
        let mut p = Param::float("radius", 0.05, 0.01, 0.1).step(0.01);
        assert_eq!(p.assign(ParamValue::Float(5.0)), Ok(true));
        assert_eq!(p.value(), ParamValue::Float(0.1));

        p.assign(ParamValue::Float(0.034)).unwrap();
        let ParamValue::Float(v) = p.value() else { panic!("float expected") };
        assert!((v - 0.03).abs() < 1e-6);
    }

    #[test]
    fn test_default_is_clamped() {
        let p = Param::float("radius", 2.0, 0.1, 0.8);
        assert_eq!(p.value(), ParamValue::Float(0.8));
    }

    #[test]
    fn test_int_rounds_float_input() {
        let mut p = Param::int("detail", 3, 0, 3);
        p.assign(ParamValue::Float(1.6)).unwrap();
        assert_eq!(p.value(), ParamValue::Int(2));
        p.assign(ParamValue::Int(-4)).unwrap();
        assert_eq!(p.value(), ParamValue::Int(0));
    }

    #[test]
    fn test_int_step() {
        let mut p = Param::int("height", 30, 10, 60).int_step(5);
        p.assign(ParamValue::Int(42)).unwrap();
        assert_eq!(p.value(), ParamValue::Int(40));
    }

    #[test]
    fn test_float_step_leaves_int_domain_alone() {
        let p = Param::int("count", 8, 1, 12).step(0.4);
        assert_eq!(p.domain(), Domain::Int { min: 1, max: 12, step: 1 });
    }

    #[test]
    fn test_int_extremes_clamp_without_overflow() {
        let mut p = Param::int("count", 8, 1, 12);
        p.assign(ParamValue::Int(i64::MIN)).unwrap();
        assert_eq!(p.value(), ParamValue::Int(1));
        p.assign(ParamValue::Int(i64::MAX)).unwrap();
        assert_eq!(p.value(), ParamValue::Int(12));

        p.assign(ParamValue::Float(-1.0e30)).unwrap();
        assert_eq!(p.value(), ParamValue::Int(1));
        p.assign(ParamValue::Float(f32::MAX)).unwrap();
        assert_eq!(p.value(), ParamValue::Int(12));

        let mut stepped = Param::int("height", 30, 10, 60).int_step(5);
        stepped.assign(ParamValue::Int(i64::MIN)).unwrap();
        assert_eq!(stepped.value(), ParamValue::Int(10));
    }

    #[test]
    fn test_rejects_non_finite_and_wrong_type() {
        let mut p = Param::float("radius", 0.5, 0.1, 0.8);
        assert_eq!(p.assign(ParamValue::Float(f32::NAN)), Err(Rejection::NonFinite));
        assert_eq!(
            p.assign(ParamValue::Color(Rgb::WHITE)),
            Err(Rejection::Type("number"))
        );
        assert_eq!(p.value(), ParamValue::Float(0.5));
    }

    #[test]
    fn test_update_mode_follows_effect() {
        assert_eq!(Param::float("r", 1.0, 0.0, 2.0).update_mode(), UpdateMode::Finish);
        assert_eq!(Param::color("c", 0xffffff).update_mode(), UpdateMode::Continuous);
        assert_eq!(
            Param::float("i", 0.2, 0.1, 1.0).with_effect(Effect::Intensity).update_mode(),
            UpdateMode::Continuous
        );
    }

    #[test]
    fn test_group_accessors() {
        let group = ParameterGroup::new("petal")
            .with(Param::color("color", 0xf0f700))
            .with(Param::int("count", 8, 1, 12));
        assert_eq!(group.count("count"), Ok(8));
        assert_eq!(group.color("color").map(|c| c.to_hex()), Ok(0xf0f700));
        assert!(matches!(
            group.float("missing"),
            Err(SceneError::UnknownParameter { .. })
        ));
        assert!(matches!(
            group.color("count"),
            Err(SceneError::ParameterType { .. })
        ));
    }

    #[test]
    fn test_value_json_shapes() {
        let values = vec![
            ParamValue::Int(8),
            ParamValue::Float(0.5),
            ParamValue::Color(Rgb::from_hex(0x00ff00)),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r##"[8,0.5,"#00ff00"]"##);
        let back: Vec<ParamValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);
    }
}

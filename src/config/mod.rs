//! Configuration store: bounded, typed parameter groups edited by the
//! control panel, and the change notifications they produce.

mod param;
mod preset;
mod store;

pub use param::{Domain, Effect, Param, ParamValue, ParameterGroup, UpdateMode};
pub use preset::Preset;
pub use store::{ConfigStore, ParamChange};

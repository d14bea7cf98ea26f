//! Regeneration controller: applies parameter changes to a live scene.
//!
//! Every change is recomputed from the full current parameter snapshot, so
//! applying the same change twice yields the same scene. All replacement
//! geometry is built before the graph is touched; a rejected snapshot
//! leaves every node exactly as it was.

use log::{debug, warn};

use crate::config::{ConfigStore, Effect, ParamChange};
use crate::error::{Result, SceneError};
use crate::factory::crystal::{build_light_ring, core_geometry};
use crate::factory::flower::{
    bud_geometry, bud_transform, build_leaf_ring, build_petal_ring, petal_ring_transform,
    stalk_geometry,
};
use crate::factory::RingItem;
use crate::math::Rgb;
use crate::scene::{GroupId, NodeId, SceneGraph};
use crate::scenes::{attach_ring, crystal, flower};

/// Which kinds of effect a batch of changed keys has
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Effects {
    geometry: bool,
    color: bool,
    intensity: bool,
}

impl Effects {
    fn of(config: &ConfigStore, group: &str, keys: &[String]) -> Result<Self> {
        let group = config.group(group)?;
        let mut effects = Self::default();
        for key in keys {
            match group.param(key)?.effect() {
                Effect::Geometry => effects.geometry = true,
                Effect::Color => effects.color = true,
                Effect::Intensity => effects.intensity = true,
                Effect::Motion => {}
            }
        }
        Ok(effects)
    }
}

/// What one regeneration did to the scene
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegenReport {
    pub group: String,
    /// Primitives that received new geometry, ring members included
    pub rebuilt: usize,
    /// Materials and lights updated in place
    pub patched: usize,
    /// Geometry resources released
    pub released: u64,
}

impl RegenReport {
    pub fn is_noop(&self) -> bool {
        self.rebuilt == 0 && self.patched == 0
    }
}

/// Borrows the scene mutably and the configuration immutably for the
/// duration of a batch of changes.
pub struct RegenerationController<'a> {
    scene: &'a mut SceneGraph,
    config: &'a ConfigStore,
}

impl<'a> RegenerationController<'a> {
    pub fn new(scene: &'a mut SceneGraph, config: &'a ConfigStore) -> Self {
        Self { scene, config }
    }

    /// React to changed `keys` of parameter group `group`.
    ///
    /// Errors are logged and returned; the scene keeps its previous state.
    pub fn on_parameter_change(&mut self, group: &str, keys: &[String]) -> Result<RegenReport> {
        let released_before = self.scene.released_geometry_total();
        let mut report = RegenReport {
            group: group.to_string(),
            ..RegenReport::default()
        };

        match self.dispatch(group, keys, &mut report) {
            Ok(()) => {
                report.released = self.scene.released_geometry_total() - released_before;
                if !report.is_noop() {
                    debug!(
                        "regenerated `{group}` {keys:?}: {} rebuilt, {} patched, {} released",
                        report.rebuilt, report.patched, report.released
                    );
                }
                Ok(report)
            }
            Err(err) => {
                warn!("rejected change to `{group}` {keys:?}: {err}");
                Err(err)
            }
        }
    }

    pub fn apply(&mut self, change: &ParamChange) -> Result<RegenReport> {
        self.on_parameter_change(&change.group, &change.keys)
    }

    /// Apply every change in order, continuing past failures. Returns the
    /// number of changes that were rejected.
    pub fn apply_all(&mut self, changes: &[ParamChange]) -> usize {
        changes.iter().filter(|c| self.apply(c).is_err()).count()
    }

    fn dispatch(&mut self, group: &str, keys: &[String], report: &mut RegenReport) -> Result<()> {
        let effects = Effects::of(self.config, group, keys)?;
        match group {
            crystal::CORE_GROUP => self.core(effects, report),
            crystal::LIGHTS_GROUP => self.lights(effects, report),
            flower::PETAL_GROUP => self.petals(effects, report),
            flower::BUD_GROUP => self.bud(effects, report),
            flower::LEAF_GROUP => self.leaves(effects, report),
            flower::STALK_GROUP => self.stalk(effects, report),
            // motion parameters are read by the animation driver each frame
            crystal::MOTION_GROUP => Ok(()),
            other => Err(SceneError::UnknownGroup(other.to_string())),
        }
    }

    fn core(&mut self, effects: Effects, report: &mut RegenReport) -> Result<()> {
        let params = crystal::core_params(self.config)?;
        let core = self.scene.find_mesh(crystal::CORE)?;
        if effects.geometry {
            let geometry = core_geometry(&params)?;
            self.scene.replace_geometry(core, geometry)?;
            report.rebuilt += 1;
        }
        if effects.color {
            self.scene.mesh_mut(core)?.material.color = params.color;
            report.patched += 1;
        }
        Ok(())
    }

    fn lights(&mut self, effects: Effects, report: &mut RegenReport) -> Result<()> {
        let params = crystal::light_ring_params(self.config)?;
        let ring = self.scene.find_group(crystal::LIGHTS_RING)?;
        if effects.geometry {
            let items = build_light_ring(&params)?;
            report.rebuilt += self.replace_ring(crystal::LIGHTS_RING, crystal::LIGHT_PREFIX, items)?;
        } else if effects.intensity {
            report.patched += self.set_intensity(ring, params.intensity);
        }
        Ok(())
    }

    fn petals(&mut self, effects: Effects, report: &mut RegenReport) -> Result<()> {
        let petal = flower::petal_params(self.config)?;
        let bud = flower::bud_params(self.config)?;
        let ring = self.scene.find_group(flower::PETAL_RING)?;
        if effects.geometry {
            let items = build_petal_ring(&petal, &bud)?;
            report.rebuilt += self.replace_ring(flower::PETAL_RING, flower::PETAL_PREFIX, items)?;
        } else if effects.color {
            report.patched += self.recolor(ring.node(), petal.color);
        }
        Ok(())
    }

    /// The bud radius also moves the bud and the petal ring, and changes the
    /// petal placement radius
    fn bud(&mut self, effects: Effects, report: &mut RegenReport) -> Result<()> {
        let stalk = flower::stalk_params(self.config)?;
        let bud = flower::bud_params(self.config)?;
        let petal = flower::petal_params(self.config)?;
        let bud_mesh = self.scene.find_mesh(flower::BUD)?;
        let petal_ring = self.scene.find_group(flower::PETAL_RING)?;

        if effects.geometry {
            let geometry = bud_geometry(&bud)?;
            let petals = build_petal_ring(&petal, &bud)?;

            self.scene.replace_geometry(bud_mesh, geometry)?;
            self.scene.transform_mut(bud_mesh.node())?.position =
                bud_transform(&stalk, &bud).position;
            self.scene.transform_mut(petal_ring.node())?.position =
                petal_ring_transform(&stalk, &bud).position;
            report.rebuilt += 1;
            report.rebuilt += self.replace_ring(flower::PETAL_RING, flower::PETAL_PREFIX, petals)?;
        }
        if effects.color {
            self.scene.mesh_mut(bud_mesh)?.material.color = bud.color;
            report.patched += 1;
        }
        Ok(())
    }

    fn leaves(&mut self, effects: Effects, report: &mut RegenReport) -> Result<()> {
        let leaf = flower::leaf_params(self.config)?;
        let stalk = flower::stalk_params(self.config)?;
        let ring = self.scene.find_group(flower::LEAF_RING)?;
        if effects.geometry {
            let items = build_leaf_ring(&leaf, &stalk)?;
            report.rebuilt += self.replace_ring(flower::LEAF_RING, flower::LEAF_PREFIX, items)?;
        } else if effects.color {
            report.patched += self.recolor(ring.node(), leaf.color);
        }
        Ok(())
    }

    /// The stalk height moves the bud and petal ring; its radius changes the
    /// leaf placement radius
    fn stalk(&mut self, effects: Effects, report: &mut RegenReport) -> Result<()> {
        let stalk = flower::stalk_params(self.config)?;
        let bud = flower::bud_params(self.config)?;
        let leaf = flower::leaf_params(self.config)?;
        let stalk_mesh = self.scene.find_mesh(flower::STALK)?;
        let bud_mesh = self.scene.find_mesh(flower::BUD)?;
        let petal_ring = self.scene.find_group(flower::PETAL_RING)?;
        self.scene.find_group(flower::LEAF_RING)?;

        if effects.geometry {
            let geometry = stalk_geometry(&stalk)?;
            let leaves = build_leaf_ring(&leaf, &stalk)?;

            self.scene.replace_geometry(stalk_mesh, geometry)?;
            self.scene.transform_mut(bud_mesh.node())?.position =
                bud_transform(&stalk, &bud).position;
            self.scene.transform_mut(petal_ring.node())?.position =
                petal_ring_transform(&stalk, &bud).position;
            report.rebuilt += 1;
            report.rebuilt += self.replace_ring(flower::LEAF_RING, flower::LEAF_PREFIX, leaves)?;
        }
        if effects.color {
            self.scene.mesh_mut(stalk_mesh)?.material.color = stalk.color;
            report.patched += 1;
        }
        Ok(())
    }

    /// Destroy every member of `ring` (releasing their geometry) and attach
    /// the new set in its place
    fn replace_ring(&mut self, ring: &str, prefix: &str, items: Vec<RingItem>) -> Result<usize> {
        let removed = self.scene.clear_children(ring)?;
        let added = attach_ring(self.scene, ring, prefix, items)?;
        debug!("ring `{ring}`: {removed} nodes removed, {added} members attached");
        Ok(added)
    }

    fn recolor(&mut self, root: NodeId, color: Rgb) -> usize {
        let mut patched = 0;
        self.scene.visit_subtree_mut(root, |node| {
            if let Some(mesh) = node.as_mesh_mut() {
                mesh.material.color = color;
                patched += 1;
            }
        });
        patched
    }

    fn set_intensity(&mut self, ring: GroupId, intensity: f32) -> usize {
        let mut patched = 0;
        self.scene.visit_subtree_mut(ring.node(), |node| {
            if let Some(light) = node.as_light_mut() {
                light.intensity = intensity;
                patched += 1;
            }
        });
        patched
    }
}

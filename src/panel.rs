//! egui control panel: one collapsible folder per parameter group.
//!
//! Widgets never write the store directly. Edits are collected while the UI
//! is laid out and applied afterwards through the clamping setters.

use log::warn;

use crate::config::{ConfigStore, Domain, Param, ParamValue};
use crate::math::Rgb;

/// Read-only figures shown above the parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct PanelStats {
    pub scene: &'static str,
    pub fps: f32,
    pub nodes: usize,
    pub geometries: usize,
}

/// One widget interaction
#[derive(Debug, Clone, PartialEq)]
pub struct PanelEdit {
    pub group: String,
    pub key: String,
    /// New value, when the widget changed it
    pub value: Option<ParamValue>,
    /// Whether the interaction is complete (drag released, click, typed value)
    pub finished: bool,
}

/// Map a widget's response flags onto (value changed, edit finished).
///
/// A drag reports every intermediate value and finishes on release; a
/// click or a typed value changes and finishes in the same frame.
pub fn interaction(changed: bool, dragged: bool, drag_stopped: bool) -> (bool, bool) {
    (changed, drag_stopped || (changed && !dragged))
}

#[derive(Debug, Default)]
pub struct ControlPanel {
    edits: Vec<PanelEdit>,
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lay out the panel and apply whatever the operator changed
    pub fn show(&mut self, ctx: &egui::Context, config: &mut ConfigStore, stats: PanelStats) {
        let edits = &mut self.edits;
        egui::Window::new("Parameters")
            .resizable(false)
            .default_pos(egui::pos2(10.0, 10.0))
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(format!("{} · {:.0} FPS", stats.scene, stats.fps))
                        .strong()
                        .color(egui::Color32::from_rgb(74, 158, 255)),
                );
                ui.label(
                    egui::RichText::new(format!(
                        "{} nodes, {} geometries",
                        stats.nodes, stats.geometries
                    ))
                    .small()
                    .color(egui::Color32::GRAY),
                );
                ui.separator();

                for group in config.groups() {
                    egui::CollapsingHeader::new(group.name())
                        .default_open(true)
                        .show(ui, |ui| {
                            for param in group.params() {
                                if let Some(edit) = param_widget(ui, group.name(), param) {
                                    edits.push(edit);
                                }
                            }
                        });
                }
            });

        self.apply(config);
    }

    /// Push collected edits into the store; returns how many were applied
    pub fn apply(&mut self, config: &mut ConfigStore) -> usize {
        let mut applied = 0;
        for edit in self.edits.drain(..) {
            let mut result = match edit.value {
                Some(value) => config.set(&edit.group, &edit.key, value).map(|_| ()),
                None => Ok(()),
            };
            if result.is_ok() && edit.finished {
                result = config.finish_edit(&edit.group, &edit.key);
            }
            match result {
                Ok(()) => applied += 1,
                Err(err) => warn!("ignoring panel edit of {}.{}: {err}", edit.group, edit.key),
            }
        }
        applied
    }

    /// Queue an edit as if it came from a widget
    pub fn push(&mut self, edit: PanelEdit) {
        self.edits.push(edit);
    }
}

fn param_widget(ui: &mut egui::Ui, group: &str, param: &Param) -> Option<PanelEdit> {
    let (response, value) = match (param.domain(), param.value()) {
        (Domain::Float { min, max, step }, ParamValue::Float(mut v)) => {
            let mut slider = egui::Slider::new(&mut v, min..=max).text(param.label());
            if let Some(step) = step {
                slider = slider.step_by(step as f64);
            }
            let response = ui.add(slider);
            (response, ParamValue::Float(v))
        }
        (Domain::Int { min, max, step }, ParamValue::Int(mut v)) => {
            let slider = egui::Slider::new(&mut v, min..=max)
                .step_by(step as f64)
                .text(param.label());
            let response = ui.add(slider);
            (response, ParamValue::Int(v))
        }
        (Domain::Color, ParamValue::Color(color)) => {
            let mut rgb = color.to_array();
            let response = ui
                .horizontal(|ui| {
                    let response = ui.color_edit_button_rgb(&mut rgb);
                    ui.label(param.label());
                    response
                })
                .inner;
            (response, ParamValue::Color(Rgb::from(rgb)))
        }
        _ => return None,
    };

    let (changed, finished) = interaction(
        response.changed(),
        response.dragged(),
        response.drag_stopped(),
    );
    (changed || finished).then(|| PanelEdit {
        group: group.to_string(),
        key: param.key().to_string(),
        value: changed.then_some(value),
        finished,
    })
}

use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Pixels of trackpad scroll that count as one wheel step
const PIXELS_PER_STEP: f32 = 50.0;

/// Pointer state relevant to the scene: motion (the activity signal),
/// left-button drags (camera orbit) and wheel steps (zoom).
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    position: Option<(f32, f32)>,
    dragging: bool,
    drag_delta: (f32, f32),
    scroll: f32,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a window event. Returns true when the pointer moved.
    pub fn process_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(position.x as f32, position.y as f32)
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.set_dragging(*state == ElementState::Pressed);
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.add_scroll(match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_STEP,
                });
                false
            }
            WindowEvent::CursorLeft { .. } => {
                self.position = None;
                self.dragging = false;
                false
            }
            _ => false,
        }
    }

    pub fn cursor_moved(&mut self, x: f32, y: f32) -> bool {
        let moved = match self.position {
            Some((old_x, old_y)) => {
                if self.dragging {
                    self.drag_delta.0 += x - old_x;
                    self.drag_delta.1 += y - old_y;
                }
                (x, y) != (old_x, old_y)
            }
            None => true,
        };
        self.position = Some((x, y));
        moved
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    pub fn add_scroll(&mut self, steps: f32) {
        self.scroll += steps;
    }

    pub fn position(&self) -> Option<(f32, f32)> {
        self.position
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Drag distance accumulated since the last call
    pub fn take_drag(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.drag_delta)
    }

    /// Wheel steps accumulated since the last call
    pub fn take_scroll(&mut self) -> f32 {
        std::mem::take(&mut self.scroll)
    }
}

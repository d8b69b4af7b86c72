use eframe::egui::{Pos2, Vec2};

pub(in crate::app) const MIN_ZOOM: f32 = 0.5;
pub(in crate::app) const MAX_ZOOM: f32 = 3.0;

/// Maps world coordinates to canvas-local screen coordinates:
/// `local = translate + world * scale`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct ZoomTransform {
    pub(in crate::app) translate: Vec2,
    pub(in crate::app) scale: f32,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl ZoomTransform {
    pub(in crate::app) fn apply(self, origin: Pos2, world: Pos2) -> Pos2 {
        origin + self.translate + world.to_vec2() * self.scale
    }

    pub(in crate::app) fn invert(self, origin: Pos2, screen: Pos2) -> Pos2 {
        ((screen - origin - self.translate) / self.scale).to_pos2()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum TransformDelta {
    /// Multiplies the scale, keeping the canvas-local `anchor` fixed.
    Scale { factor: f32, anchor: Pos2 },
    Translate(Vec2),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum DragTarget {
    Node(usize),
    Pan,
}

#[derive(Default)]
pub(in crate::app) struct Viewport {
    transform: ZoomTransform,
    drag: Option<DragTarget>,
}

impl Viewport {
    pub(in crate::app) fn transform(&self) -> ZoomTransform {
        self.transform
    }

    pub(in crate::app) fn wheel_factor(scroll: f32) -> f32 {
        (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15)
    }

    /// Returns whether the transform changed.
    pub(in crate::app) fn apply(&mut self, delta: TransformDelta) -> bool {
        match delta {
            TransformDelta::Scale { factor, anchor } => {
                if !factor.is_finite() || factor <= 0.0 || !anchor.is_finite() {
                    return false;
                }

                let current = self.transform.scale.clamp(MIN_ZOOM, MAX_ZOOM);
                let scale = (current * factor).clamp(MIN_ZOOM, MAX_ZOOM);
                if (scale - self.transform.scale).abs() <= f32::EPSILON {
                    return false;
                }

                let world = (anchor.to_vec2() - self.transform.translate) / self.transform.scale;
                self.transform = ZoomTransform {
                    translate: anchor.to_vec2() - world * scale,
                    scale,
                };
                true
            }
            TransformDelta::Translate(offset) => {
                if !offset.is_finite() || offset == Vec2::ZERO {
                    return false;
                }
                self.transform.translate += offset;
                true
            }
        }
    }

    pub(in crate::app) fn drag(&self) -> Option<DragTarget> {
        self.drag
    }

    pub(in crate::app) fn dragged_node(&self) -> Option<usize> {
        match self.drag {
            Some(DragTarget::Node(id)) => Some(id),
            _ => None,
        }
    }

    pub(in crate::app) fn begin_drag(&mut self, target: DragTarget) {
        self.drag = Some(target);
    }

    pub(in crate::app) fn end_drag(&mut self) -> Option<DragTarget> {
        self.drag.take()
    }
}

/// Topmost node whose circle contains `world`; later nodes draw on top.
pub(in crate::app) fn hit_test(positions: &[Pos2], radii: &[f32], world: Pos2) -> Option<usize> {
    positions
        .iter()
        .zip(radii)
        .enumerate()
        .rev()
        .find(|(_, (position, radius))| position.distance(world) <= **radius)
        .map(|(index, _)| index)
}

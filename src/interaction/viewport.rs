use eframe::egui::{Vec2, vec2};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewportConfig {
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.5,
            max_scale: 3.0,
        }
    }
}

/// Pan/zoom mapping from model space to screen space.
///
/// Screen coordinates are relative to the center of the drawing surface:
/// `screen = translate + model * scale`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            scale: 1.0,
        }
    }
}

impl Viewport {
    pub fn translate(&self) -> Vec2 {
        vec2(self.translate_x, self.translate_y)
    }

    pub fn to_screen(&self, model: Vec2) -> Vec2 {
        self.translate() + model * self.scale
    }

    pub fn to_model(&self, screen: Vec2) -> Vec2 {
        (screen - self.translate()) / self.scale
    }

    pub(super) fn pan_by(&mut self, delta: Vec2) {
        self.translate_x += delta.x;
        self.translate_y += delta.y;
    }

    /// Multiplies the scale by `factor`, keeping the model point under `pointer` fixed.
    pub(super) fn zoom_at(&mut self, pointer: Vec2, factor: f32, config: &ViewportConfig) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }

        let anchor = self.to_model(pointer);
        self.scale = (self.scale * factor).clamp(config.min_scale, config.max_scale);
        let translate = pointer - anchor * self.scale;
        self.translate_x = translate.x;
        self.translate_y = translate.y;
    }
}

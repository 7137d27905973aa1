#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use kurbo::{Affine, Point, Rect, Vec2};

use crate::config::EditorConfig;

/// Pan/zoom state of the canvas inside its host container.
///
/// `pan_x` / `pan_y` are in container pixels; `zoom` is a scale factor
/// (1.0 = one world unit per pixel).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
    pub container_width: f64,
    pub container_height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport { zoom: 1.0, pan_x: 0.0, pan_y: 0.0, container_width: 0.0, container_height: 0.0 }
    }
}

impl Viewport {
    pub fn transform(&self) -> Affine {
        Affine::translate(Vec2::new(self.pan_x, self.pan_y)) * Affine::scale(self.zoom)
    }

    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new((screen.x - self.pan_x) / self.zoom, (screen.y - self.pan_y) / self.zoom)
    }

    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(world.x * self.zoom + self.pan_x, world.y * self.zoom + self.pan_y)
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.container_width = width.max(0.0);
        self.container_height = height.max(0.0);
    }

    pub fn center(&self) -> Point {
        Point::new(self.container_width / 2.0, self.container_height / 2.0)
    }

    /// Scale `workspace` to fit the container minus the inset and center it.
    /// Returns false when the container or workspace has no area.
    pub fn auto_fit(&mut self, workspace: Rect, config: &EditorConfig) -> bool {
        if self.container_width <= 0.0 || self.container_height <= 0.0 {
            return false;
        }
        if workspace.width() <= 0.0 || workspace.height() <= 0.0 {
            return false;
        }
        let usable = (1.0 - 2.0 * config.fit_inset).clamp(0.0, 1.0);
        let fit_x = self.container_width * usable / workspace.width();
        let fit_y = self.container_height * usable / workspace.height();
        self.zoom = fit_x.min(fit_y).clamp(config.min_zoom, config.max_zoom);
        let mid = workspace.center();
        self.pan_x = self.container_width / 2.0 - mid.x * self.zoom;
        self.pan_y = self.container_height / 2.0 - mid.y * self.zoom;
        true
    }

    /// Set zoom while keeping the world point under `pivot` (screen) fixed.
    pub fn zoom_at(&mut self, pivot: Point, zoom: f64) {
        let anchor = self.screen_to_world(pivot);
        self.zoom = zoom;
        self.pan_x = pivot.x - anchor.x * zoom;
        self.pan_y = pivot.y - anchor.y * zoom;
    }

    pub fn zoom_in(&mut self, config: &EditorConfig) {
        let next = (self.zoom * (1.0 + config.zoom_step)).min(config.max_zoom);
        self.zoom_at(self.center(), next);
    }

    /// Zoom-out never goes above `zoom_out_max`, so after zooming in past it
    /// a single zoom-out snaps back to that cap.
    pub fn zoom_out(&mut self, config: &EditorConfig) {
        let next = (self.zoom / (1.0 + config.zoom_step)).clamp(config.min_zoom, config.zoom_out_max);
        self.zoom_at(self.center(), next);
    }

    pub fn reset_identity(&mut self) {
        self.zoom = 1.0;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
    }
}

use foundation::math::{Vec2, Vec3};

/// Perspective camera with a client-space viewport.
///
/// Client coordinates are pixels with the origin at the top-left corner of
/// the viewport, x growing right and y growing down.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_rad: f64,
    pub near: f64,
    pub viewport_px: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            up: Vec3::new(0.0, 1.0, 0.0),
            fov_y_rad: std::f64::consts::FRAC_PI_4,
            near: 0.01,
            viewport_px: Vec2::new(800.0, 600.0),
        }
    }
}

impl Camera {
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        Self {
            eye,
            target,
            ..Self::default()
        }
    }

    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport_px = Vec2::new(width, height);
        self
    }

    pub fn with_fov_y(mut self, fov_y_rad: f64) -> Self {
        self.fov_y_rad = fov_y_rad;
        self
    }

    /// Projects a world-space point into client pixels.
    ///
    /// Returns `None` for points at or behind the near plane, or when the
    /// camera basis is degenerate (eye == target, or up parallel to the view).
    pub fn world_to_client(&self, point: Vec3) -> Option<Vec2> {
        let forward = (self.target - self.eye).normalized()?;
        let side = forward.cross(self.up).normalized()?;
        let up = side.cross(forward);

        let d = point - self.eye;
        let depth = d.dot(forward);
        if !depth.is_finite() || depth <= self.near {
            return None;
        }

        let w = self.viewport_px.x.max(1.0);
        let h = self.viewport_px.y.max(1.0);
        let tan_half = (0.5 * self.fov_y_rad).tan();
        let ndc_x = d.dot(side) / (depth * tan_half * (w / h));
        let ndc_y = d.dot(up) / (depth * tan_half);

        let client = Vec2::new((ndc_x * 0.5 + 0.5) * w, (1.0 - (ndc_y * 0.5 + 0.5)) * h);
        client.is_finite().then_some(client)
    }
}

// Copyright (c) 2026 rezky_nightky

use crate::scene::Scene;
use crate::surface::Surface;

pub const MAX_STEP_S: f32 = 0.25;

#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_step: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(MAX_STEP_S)
    }
}

impl FrameClock {
    pub fn new(max_step: f32) -> Self {
        Self {
            last_ms: None,
            max_step,
        }
    }

    // Seconds since the previous tick. The first tick yields `0.0`; a
    // timestamp going backwards also yields `0.0`.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        dt.clamp(0.0, self.max_step)
    }
}

pub struct Director {
    scene: Scene,
    clock: FrameClock,
}

impl Director {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            clock: FrameClock::default(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        if width == self.scene.width() && height == self.scene.height() {
            return;
        }
        self.scene.resize(width, height);
    }

    pub fn frame(&mut self, now_ms: f64, surface: &mut dyn Surface) -> f32 {
        let dt = self.clock.tick(now_ms);
        self.scene.update(dt);
        self.scene.draw(surface);
        dt
    }
}

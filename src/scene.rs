// Copyright (c) 2026 rezky_nightky

use crate::assets::Assets;
use crate::chunks::CodeChunkSystem;
use crate::hack::HackOrchestrator;
use crate::network::NodeNetwork;
use crate::palette::{FALLBACK_BG, HUD, OVERLAY};
use crate::rain::MatrixRain;
use crate::rng::{thread_random, RandomSource};
use crate::surface::{Blend, Surface};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneConfig {
    pub trail_alpha: f32,
    pub background_alpha: f32,
    pub hud: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            trail_alpha: 0.08,
            background_alpha: 0.06,
            hud: false,
        }
    }
}

pub struct Scene {
    pub rain: MatrixRain,
    pub chunks: CodeChunkSystem,
    pub network: NodeNetwork,
    pub hacks: HackOrchestrator,
    pub config: SceneConfig,
    assets: Assets,
    width: f32,
    height: f32,
}

impl Scene {
    pub fn new(width: f32, height: f32, assets: Assets, config: SceneConfig) -> Self {
        Self::with_random(width, height, assets, config, thread_random)
    }

    pub fn with_random<F>(
        width: f32,
        height: f32,
        assets: Assets,
        config: SceneConfig,
        mut make_rng: F,
    ) -> Self
    where
        F: FnMut() -> Box<dyn RandomSource>,
    {
        let mut scene = Self {
            rain: MatrixRain::new(make_rng()),
            chunks: CodeChunkSystem::new(make_rng()),
            network: NodeNetwork::new(make_rng()),
            hacks: HackOrchestrator::new(make_rng()),
            config,
            assets,
            width,
            height,
        };
        scene.resize(width, height);
        scene
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.rain.reset(width, height);
        self.network.setup_layout(width, height);
    }

    pub fn update(&mut self, dt: f32) {
        self.rain.update(dt, self.height);
        self.chunks.update(dt, self.width, self.height);
        self.network.update(dt);
        self.hacks.update(dt, &mut self.network);
    }

    // The dim wash over the previous frame plus the additive rain is what
    // leaves the trails, so the layer order here is fixed.
    pub fn draw(&mut self, surface: &mut dyn Surface) {
        let (w, h) = (surface.width(), surface.height());
        surface.save();

        surface.set_alpha(self.config.trail_alpha);
        surface.fill_rect(0.0, 0.0, w, h, OVERLAY);

        surface.set_alpha(self.config.background_alpha);
        match &self.assets.background {
            Some(bg) => surface.draw_image(bg, 0.0, 0.0, w, h),
            None => surface.fill_rect(0.0, 0.0, w, h, FALLBACK_BG),
        }

        surface.set_alpha(1.0);
        surface.set_blend(Blend::Lighten);
        self.rain.draw(surface, h);
        surface.set_blend(Blend::Normal);

        self.chunks.draw(surface);
        self.network.draw(surface, self.assets.skull.as_ref());

        if self.config.hud {
            self.draw_hud(surface);
        }

        surface.restore();
    }

    fn draw_hud(&self, surface: &mut dyn Surface) {
        let mut line = format!(
            "cols {}  chunks {}  packets {}  hacks done {}",
            self.rain.columns().len(),
            self.chunks.chunks().len(),
            self.network.packets().len(),
            self.hacks.completed(),
        );
        for ev in self.hacks.events() {
            line.push_str(&format!("  {}:{}", ev.state().label(), ev.target()));
        }
        surface.set_alpha(1.0);
        surface.fill_text(&line, 8.0, 0.0, HUD);
    }
}

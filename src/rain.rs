// Copyright (c) 2026 rezky_nightky

use crate::palette::RAIN;
use crate::rng::RandomSource;
use crate::surface::{Rgb, Surface, FONT_PX};

pub const COLUMN_SPACING: f32 = 16.0;
// Columns falling this far past the bottom edge wrap back above the top.
pub const WRAP_MARGIN: f32 = 100.0;
const TRAIL_GLYPHS: usize = 20;
const SPEED_MIN: f32 = 80.0;
const SPEED_MAX: f32 = 220.0;
const GLYPHS: [char; 2] = ['0', '1'];
const HEAD: Rgb = Rgb::hex(0xccffdd);

#[derive(Clone, Debug, PartialEq)]
pub struct RainColumn {
    pub x: f32,
    pub y: f32,
    // Pixels per second.
    pub speed: f32,
}

pub struct MatrixRain {
    columns: Vec<RainColumn>,
    rng: Box<dyn RandomSource>,
}

impl MatrixRain {
    pub fn new(rng: Box<dyn RandomSource>) -> Self {
        Self {
            columns: Vec::new(),
            rng,
        }
    }

    pub fn columns(&self) -> &[RainColumn] {
        &self.columns
    }

    pub fn reset(&mut self, width: f32, height: f32) {
        let count = (width.max(0.0) / COLUMN_SPACING).ceil() as usize;
        self.columns.clear();
        for i in 0..count {
            let y = self.rng.range(-height, 0.0);
            let speed = self.rng.range(SPEED_MIN, SPEED_MAX);
            self.columns.push(RainColumn {
                x: i as f32 * COLUMN_SPACING,
                y,
                speed,
            });
        }
    }

    pub fn update(&mut self, dt: f32, height: f32) {
        for c in &mut self.columns {
            c.y += c.speed * dt;
            if c.y > height + WRAP_MARGIN {
                c.y = self.rng.range(-height, 0.0);
            }
        }
    }

    pub fn draw(&mut self, surface: &mut dyn Surface, height: f32) {
        surface.save();
        for c in &self.columns {
            for j in 0..TRAIL_GLYPHS {
                let gy = c.y - j as f32 * FONT_PX;
                if gy < -FONT_PX || gy > height {
                    continue;
                }
                let alpha = 1.0 - j as f32 / TRAIL_GLYPHS as f32;
                let glyph = GLYPHS[self.rng.index(GLYPHS.len())];
                let color = if j == 0 { HEAD } else { RAIN };
                surface.set_alpha(alpha);
                let mut buf = [0u8; 4];
                surface.fill_text(glyph.encode_utf8(&mut buf), c.x, gy, color);
            }
        }
        surface.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::testing::fixed;
    use crate::rng::thread_random;
    use crate::surface::testing::{Op, RecordingSurface};

    #[test]
    fn one_column_per_spacing_interval() {
        let mut rain = MatrixRain::new(thread_random());
        rain.reset(1024.0, 768.0);
        assert_eq!(rain.columns().len(), 64);
        rain.reset(1030.0, 768.0);
        assert_eq!(rain.columns().len(), 65);
        assert_eq!(rain.columns()[3].x, 48.0);
    }

    #[test]
    fn columns_start_above_the_surface() {
        let mut rain = MatrixRain::new(thread_random());
        rain.reset(320.0, 200.0);
        for c in rain.columns() {
            assert!((-200.0..0.0).contains(&c.y));
            assert!((SPEED_MIN..SPEED_MAX).contains(&c.speed));
        }
    }

    #[test]
    fn columns_stay_within_wrap_bounds() {
        let (w, h) = (640.0, 480.0);
        let mut rain = MatrixRain::new(thread_random());
        rain.reset(w, h);
        for step in 0..5000 {
            let dt = if step % 97 == 0 { 0.9 } else { 1.0 / 60.0 };
            rain.update(dt, h);
            for c in rain.columns() {
                assert!(c.y >= -h && c.y <= h + WRAP_MARGIN, "y = {}", c.y);
            }
        }
    }

    #[test]
    fn wrapped_column_keeps_its_speed() {
        let mut rain = MatrixRain::new(fixed(0.5));
        rain.reset(16.0, 100.0);
        let speed = rain.columns()[0].speed;
        rain.update(10.0, 100.0);
        let c = &rain.columns()[0];
        assert_eq!(c.y, -50.0);
        assert_eq!(c.speed, speed);
    }

    #[test]
    fn trail_fades_from_the_leading_edge() {
        let mut rain = MatrixRain::new(fixed(0.0));
        rain.reset(16.0, 1000.0);
        rain.update(1000.0 / SPEED_MIN, 1000.0);
        assert_eq!(rain.columns()[0].y, 0.0);
        // Leading edge parked at y = 500.
        rain.update(500.0 / SPEED_MIN, 1000.0);

        let mut s = RecordingSurface::new(16.0, 1000.0);
        rain.draw(&mut s, 1000.0);
        let alphas: Vec<f32> = s
            .ops
            .iter()
            .map(|op| match op {
                Op::Text { alpha, text, .. } => {
                    assert_eq!(text, "0");
                    *alpha
                }
                _ => panic!("rain draws text only"),
            })
            .collect();
        assert_eq!(alphas.len(), TRAIL_GLYPHS);
        assert_eq!(alphas[0], 1.0);
        assert!(alphas.windows(2).all(|w| w[1] < w[0]));
        assert!(alphas[TRAIL_GLYPHS - 1] > 0.0);
        assert_eq!(s.depth(), 0);
    }
}

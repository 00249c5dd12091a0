// Copyright (c) 2026 rezky_nightky

use crate::assets::Image;

// Height of the monospace font, in surface pixels.
pub const FONT_PX: f32 = 16.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn hex(v: u32) -> Self {
        Self {
            r: ((v >> 16) & 0xff) as f32 / 255.0,
            g: ((v >> 8) & 0xff) as f32 / 255.0,
            b: (v & 0xff) as f32 / 255.0,
        }
    }

    pub fn scale(self, k: f32) -> Self {
        Self::new(self.r * k, self.g * k, self.b * k)
    }

    pub fn lerp(self, to: Rgb, t: f32) -> Self {
        Self::new(
            self.r + (to.r - self.r) * t,
            self.g + (to.g - self.g) * t,
            self.b + (to.b - self.b) * t,
        )
    }

    pub fn max(self, o: Rgb) -> Self {
        Self::new(self.r.max(o.r), self.g.max(o.g), self.b.max(o.b))
    }

    pub fn luma(self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    pub fn to_u8(self) -> (u8, u8, u8) {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        (q(self.r), q(self.g), q(self.b))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blend {
    Normal,
    // Per-channel maximum of destination and source; rain uses it so
    // overlapping glyphs brighten instead of covering each other.
    Lighten,
}

pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    fn save(&mut self);
    fn restore(&mut self);
    fn set_alpha(&mut self, alpha: f32);
    fn set_blend(&mut self, blend: Blend);

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb);
    fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: Rgb);
    fn stroke_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgb);
    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Rgb);
    fn draw_image(&mut self, image: &Image, x: f32, y: f32, w: f32, h: f32);
}

#[cfg(test)]
pub mod testing {
    use super::{Blend, Rgb, Surface};
    use crate::assets::Image;

    #[derive(Clone, Debug, PartialEq)]
    pub enum Op {
        Rect { alpha: f32, blend: Blend, w: f32, h: f32 },
        Circle { alpha: f32, x: f32, y: f32, r: f32 },
        Line,
        Text { alpha: f32, blend: Blend, text: String, x: f32, y: f32, color: Rgb },
        Image { alpha: f32, x: f32, y: f32, w: f32, h: f32 },
    }

    pub struct RecordingSurface {
        pub w: f32,
        pub h: f32,
        pub ops: Vec<Op>,
        alpha: f32,
        blend: Blend,
        stack: Vec<(f32, Blend)>,
    }

    impl RecordingSurface {
        pub fn new(w: f32, h: f32) -> Self {
            Self {
                w,
                h,
                ops: Vec::new(),
                alpha: 1.0,
                blend: Blend::Normal,
                stack: Vec::new(),
            }
        }

        pub fn texts(&self) -> Vec<&str> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Text { text, .. } => Some(text.as_str()),
                    _ => None,
                })
                .collect()
        }

        pub fn depth(&self) -> usize {
            self.stack.len()
        }
    }

    impl Surface for RecordingSurface {
        fn width(&self) -> f32 {
            self.w
        }

        fn height(&self) -> f32 {
            self.h
        }

        fn save(&mut self) {
            self.stack.push((self.alpha, self.blend));
        }

        fn restore(&mut self) {
            if let Some((a, b)) = self.stack.pop() {
                self.alpha = a;
                self.blend = b;
            }
        }

        fn set_alpha(&mut self, alpha: f32) {
            self.alpha = alpha;
        }

        fn set_blend(&mut self, blend: Blend) {
            self.blend = blend;
        }

        fn fill_rect(&mut self, _x: f32, _y: f32, w: f32, h: f32, _color: Rgb) {
            self.ops.push(Op::Rect {
                alpha: self.alpha,
                blend: self.blend,
                w,
                h,
            });
        }

        fn fill_circle(&mut self, x: f32, y: f32, r: f32, _color: Rgb) {
            self.ops.push(Op::Circle {
                alpha: self.alpha,
                x,
                y,
                r,
            });
        }

        fn stroke_line(&mut self, _x0: f32, _y0: f32, _x1: f32, _y1: f32, _color: Rgb) {
            self.ops.push(Op::Line);
        }

        fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Rgb) {
            self.ops.push(Op::Text {
                alpha: self.alpha,
                blend: self.blend,
                text: text.to_string(),
                x,
                y,
                color,
            });
        }

        fn draw_image(&mut self, _image: &Image, x: f32, y: f32, w: f32, h: f32) {
            self.ops.push(Op::Image {
                alpha: self.alpha,
                x,
                y,
                w,
                h,
            });
        }
    }
}

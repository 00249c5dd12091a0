// Copyright (c) 2026 rezky_nightky

use crate::assets::Image;
use crate::cell::{Cell, Pixel};
use crate::frame::Frame;
use crate::palette::{terminal_color, ColorMode};
use crate::surface::{Blend, Rgb, Surface};

pub const CELL_W: f32 = 8.0;
pub const CELL_H: f32 = 16.0;

// Glyphs dimmer than this are dropped from the cell.
const GLYPH_FLOOR: f32 = 0.02;
const MONO_INK: f32 = 0.15;
const BOLD_INK: f32 = 0.8;

pub struct Canvas {
    cols: u16,
    rows: u16,
    pixels: Vec<Pixel>,
    alpha: f32,
    blend: Blend,
    stack: Vec<(f32, Blend)>,
}

impl Canvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            pixels: vec![Pixel::EMPTY; cols as usize * rows as usize],
            alpha: 1.0,
            blend: Blend::Normal,
            stack: Vec::new(),
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.pixels.clear();
        self.pixels
            .resize(cols as usize * rows as usize, Pixel::EMPTY);
    }

    #[cfg(test)]
    pub fn pixel(&self, col: u16, row: u16) -> Option<&Pixel> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.pixels
            .get(row as usize * self.cols as usize + col as usize)
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 || col >= self.cols as i32 || row >= self.rows as i32 {
            return None;
        }
        Some(row as usize * self.cols as usize + col as usize)
    }

    fn cell_of(x: f32, y: f32) -> (i32, i32) {
        ((x / CELL_W).floor() as i32, (y / CELL_H).floor() as i32)
    }

    fn shade(&mut self, i: usize, color: Rgb) {
        let a = self.alpha.clamp(0.0, 1.0);
        let p = &mut self.pixels[i];
        match self.blend {
            Blend::Normal => {
                p.bg = p.bg.lerp(color, a);
                p.fg = p.fg.lerp(color, a);
            }
            Blend::Lighten => p.bg = p.bg.max(color.scale(a)),
        }
        if p.ink() < GLYPH_FLOOR {
            p.ch = ' ';
        }
    }

    fn put_glyph(&mut self, i: usize, ch: char, color: Rgb) {
        let a = self.alpha.clamp(0.0, 1.0);
        let p = &mut self.pixels[i];
        let candidate = match self.blend {
            Blend::Normal => p.bg.lerp(color, a),
            Blend::Lighten => {
                let base = if p.ch == ch { p.fg } else { p.bg };
                base.max(color.scale(a))
            }
        };
        let luma = candidate.luma();
        if luma < GLYPH_FLOOR {
            return;
        }
        if p.ch == ' ' || luma >= p.ink() {
            p.ch = ch;
            p.fg = candidate;
        }
    }

    pub fn present(&self, frame: &mut Frame, mode: ColorMode) {
        for (i, p) in self.pixels.iter().enumerate() {
            let ink = p.ink();
            let cell = if mode == ColorMode::Mono {
                Cell {
                    ch: if ink >= MONO_INK { p.ch } else { ' ' },
                    fg: None,
                    bg: None,
                    bold: ink >= BOLD_INK,
                }
            } else {
                Cell {
                    ch: p.ch,
                    fg: if p.ch == ' ' {
                        None
                    } else {
                        terminal_color(mode, p.fg)
                    },
                    bg: terminal_color(mode, p.bg),
                    bold: ink >= BOLD_INK,
                }
            };
            frame.set_index(i, cell);
        }
    }
}

fn line_glyph(dx: f32, dy: f32) -> char {
    let (cx, cy) = (dx / CELL_W, dy / CELL_H);
    if cy.abs() < cx.abs() * 0.5 {
        '─'
    } else if cx.abs() < cy.abs() * 0.5 {
        '│'
    } else if cx * cy > 0.0 {
        '╲'
    } else {
        '╱'
    }
}

impl Surface for Canvas {
    fn width(&self) -> f32 {
        self.cols as f32 * CELL_W
    }

    fn height(&self) -> f32 {
        self.rows as f32 * CELL_H
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

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        let c0 = (x / CELL_W).floor().max(0.0) as i32;
        let r0 = (y / CELL_H).floor().max(0.0) as i32;
        let c1 = ((x + w) / CELL_W).ceil().min(self.cols as f32) as i32;
        let r1 = ((y + h) / CELL_H).ceil().min(self.rows as f32) as i32;
        for row in r0..r1 {
            for col in c0..c1 {
                if let Some(i) = self.index(col, row) {
                    self.shade(i, color);
                }
            }
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: Rgb) {
        let (c0, r0) = Self::cell_of(cx - r, cy - r);
        let (c1, r1) = Self::cell_of(cx + r, cy + r);
        let center = Self::cell_of(cx, cy);
        for row in r0..=r1 {
            for col in c0..=c1 {
                let px = (col as f32 + 0.5) * CELL_W - cx;
                let py = (row as f32 + 0.5) * CELL_H - cy;
                if (col, row) != center && px * px + py * py > r * r {
                    continue;
                }
                if let Some(i) = self.index(col, row) {
                    self.shade(i, color);
                }
            }
        }
    }

    fn stroke_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgb) {
        let (dx, dy) = (x1 - x0, y1 - y0);
        let glyph = line_glyph(dx, dy);
        let steps = (dx.abs() / CELL_W).max(dy.abs() / CELL_H).ceil().max(1.0) as i32;
        let mut last = None;
        for s in 0..=steps {
            let t = s as f32 / steps as f32;
            let cell = Self::cell_of(x0 + dx * t, y0 + dy * t);
            if last == Some(cell) {
                continue;
            }
            last = Some(cell);
            if let Some(i) = self.index(cell.0, cell.1) {
                self.put_glyph(i, glyph, color);
            }
        }
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Rgb) {
        let (col, row) = Self::cell_of(x, y);
        for (k, ch) in text.chars().enumerate() {
            if ch == ' ' {
                continue;
            }
            if let Some(i) = self.index(col + k as i32, row) {
                self.put_glyph(i, ch, color);
            }
        }
    }

    fn draw_image(&mut self, image: &Image, x: f32, y: f32, w: f32, h: f32) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let (c0, r0) = Self::cell_of(x, y);
        let (c1, r1) = Self::cell_of(x + w, y + h);
        for row in r0..=r1 {
            for col in c0..=c1 {
                let u = ((col as f32 + 0.5) * CELL_W - x) / w;
                let v = ((row as f32 + 0.5) * CELL_H - y) / h;
                let Some(ch) = image.sample(u, v) else {
                    continue;
                };
                if let Some(i) = self.index(col, row) {
                    self.put_glyph(i, ch, image.tint);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn surface_size_is_cells_times_metrics() {
        let c = Canvas::new(128, 48);
        assert_eq!(c.width(), 1024.0);
        assert_eq!(c.height(), 768.0);
    }

    #[test]
    fn translucent_rect_blends_background() {
        let mut c = Canvas::new(4, 4);
        c.set_alpha(0.5);
        c.fill_rect(0.0, 0.0, 8.0, 16.0, Rgb::new(1.0, 0.0, 0.0));
        let p = c.pixel(0, 0).unwrap();
        assert!(close(p.bg.r, 0.5));
        assert!(close(c.pixel(1, 0).unwrap().bg.r, 0.0));
    }

    #[test]
    fn dark_overlay_fades_glyphs_until_they_drop() {
        let mut c = Canvas::new(2, 1);
        c.fill_text("A", 0.0, 0.0, Rgb::new(0.2, 0.2, 0.2));
        assert_eq!(c.pixel(0, 0).unwrap().ch, 'A');

        c.set_alpha(0.5);
        for _ in 0..8 {
            c.fill_rect(0.0, 0.0, 16.0, 16.0, Rgb::BLACK);
        }
        assert_eq!(c.pixel(0, 0).unwrap().ch, ' ');
    }

    #[test]
    fn brighter_text_wins_the_cell() {
        let mut c = Canvas::new(1, 1);
        c.fill_text("X", 0.0, 0.0, Rgb::new(1.0, 1.0, 1.0));
        c.set_alpha(0.2);
        c.fill_text("y", 0.0, 0.0, Rgb::new(1.0, 1.0, 1.0));
        assert_eq!(c.pixel(0, 0).unwrap().ch, 'X');
        c.set_alpha(1.0);
        c.fill_text("z", 0.0, 0.0, Rgb::new(1.0, 1.0, 1.0));
        assert_eq!(c.pixel(0, 0).unwrap().ch, 'z');
    }

    #[test]
    fn lighten_never_darkens() {
        let mut c = Canvas::new(1, 1);
        c.fill_text("1", 0.0, 0.0, Rgb::new(0.0, 0.8, 0.0));
        c.set_blend(Blend::Lighten);
        c.set_alpha(0.1);
        c.fill_text("1", 0.0, 0.0, Rgb::new(0.0, 1.0, 0.0));
        assert!(close(c.pixel(0, 0).unwrap().fg.g, 0.8));
    }

    #[test]
    fn save_restore_round_trips_state() {
        let mut c = Canvas::new(1, 1);
        c.save();
        c.set_alpha(0.1);
        c.set_blend(Blend::Lighten);
        c.restore();
        c.fill_rect(0.0, 0.0, 8.0, 16.0, Rgb::new(0.0, 0.0, 1.0));
        assert!(close(c.pixel(0, 0).unwrap().bg.b, 1.0));
    }

    #[test]
    fn text_lands_on_consecutive_cells_and_clips() {
        let mut c = Canvas::new(3, 2);
        c.fill_text("abcd", 8.0, 16.0, Rgb::new(1.0, 1.0, 1.0));
        assert_eq!(c.pixel(1, 1).unwrap().ch, 'a');
        assert_eq!(c.pixel(2, 1).unwrap().ch, 'b');
        assert_eq!(c.pixel(0, 1).unwrap().ch, ' ');
    }

    #[test]
    fn tiny_circle_still_marks_its_cell() {
        let mut c = Canvas::new(4, 4);
        c.fill_circle(20.0, 40.0, 1.0, Rgb::new(1.0, 1.0, 1.0));
        assert!(close(c.pixel(2, 2).unwrap().bg.r, 1.0));
        assert!(close(c.pixel(1, 2).unwrap().bg.r, 0.0));
    }

    #[test]
    fn lines_pick_glyph_by_direction() {
        assert_eq!(line_glyph(80.0, 0.0), '─');
        assert_eq!(line_glyph(0.0, 80.0), '│');
        assert_eq!(line_glyph(80.0, 160.0), '╲');
        assert_eq!(line_glyph(80.0, -160.0), '╱');

        let mut c = Canvas::new(10, 1);
        c.stroke_line(4.0, 8.0, 76.0, 8.0, Rgb::new(1.0, 1.0, 1.0));
        assert!((0..10).all(|col| c.pixel(col, 0).unwrap().ch == '─'));
    }

    #[test]
    fn image_is_stretched_over_destination() {
        let img = Image::parse("t", "#", Rgb::new(1.0, 0.0, 0.0)).unwrap();
        let mut c = Canvas::new(4, 2);
        c.draw_image(&img, 0.0, 0.0, 32.0, 32.0);
        for row in 0..2 {
            for col in 0..4 {
                assert_eq!(c.pixel(col, row).unwrap().ch, '#');
            }
        }
    }

    #[test]
    fn present_marks_changed_cells_only() {
        let mut c = Canvas::new(2, 1);
        let mut f = Frame::new(2, 1);
        c.present(&mut f, ColorMode::TrueColor);
        f.clear_dirty();

        c.fill_text("q", 8.0, 0.0, Rgb::new(1.0, 1.0, 1.0));
        c.present(&mut f, ColorMode::TrueColor);
        assert_eq!(f.dirty_indices(), &[1]);
        assert!(f.get(1, 0).unwrap().bold);
    }
}

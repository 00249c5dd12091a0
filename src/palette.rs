// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::surface::Rgb;

pub const RAIN: Rgb = Rgb::hex(0x00ff66);
pub const CODE: Rgb = Rgb::hex(0x66ffcc);
pub const PANEL: Rgb = Rgb::hex(0x001a10);
pub const LINK: Rgb = Rgb::hex(0x2f6f5f);
pub const TRAFFIC: Rgb = Rgb::hex(0x00ff88);
pub const ALERT: Rgb = Rgb::hex(0xff2244);
pub const LABEL: Rgb = Rgb::hex(0x9fd8c8);
pub const FALLBACK_BG: Rgb = Rgb::hex(0x03120c);
pub const OVERLAY: Rgb = Rgb::BLACK;
pub const HUD: Rgb = Rgb::hex(0xffd75f);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

impl ColorMode {
    pub fn label(self) -> &'static str {
        match self {
            ColorMode::TrueColor => "24-bit truecolor",
            ColorMode::Color256 => "8-bit (256-color)",
            ColorMode::Color16 => "16-color",
            ColorMode::Mono => "mono",
        }
    }
}

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = (r0 as i32) - (r1 as i32);
    let dg = (g0 as i32) - (g1 as i32);
    let db = (b0 as i32) - (b1 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

pub fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let level = |v: u8| (((v as u16 * 5) + 127) / 255) as u8;
    let (r6, g6, b6) = (level(r), level(g), level(b));
    let cube_idx = 16 + 36 * r6 + 6 * g6 + b6;
    let cube_dist = dist2(
        r,
        g,
        b,
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let (gray_idx, gv) = match avg {
        0..=7 => (16, 0),
        239..=255 => (231, 255),
        _ => {
            let i = (avg - 8) / 10;
            (232 + i, 8 + 10 * i)
        }
    };
    let gray_dist = dist2(r, g, b, gv, gv, gv);

    if gray_dist < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

pub fn rgb_to_color16(r: u8, g: u8, b: u8) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    TABLE
        .iter()
        .min_by_key(|(_, (cr, cg, cb))| dist2(r, g, b, *cr, *cg, *cb))
        .map(|(c, _)| *c)
        .unwrap_or(Color::White)
}

// Snaps each channel to a multiple of 8 so slowly fading colors do not
// repaint the terminal on every frame.
fn quantize(v: u8) -> u8 {
    (v & 0xf8) | (v >> 5)
}

pub fn terminal_color(mode: ColorMode, c: Rgb) -> Option<Color> {
    let (r, g, b) = c.to_u8();
    let (r, g, b) = (quantize(r), quantize(g), quantize(b));
    match mode {
        ColorMode::Mono => None,
        ColorMode::TrueColor => Some(Color::Rgb { r, g, b }),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(r, g, b))),
        ColorMode::Color16 => Some(rgb_to_color16(r, g, b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ansi256_prefers_gray_ramp_for_grays() {
        assert_eq!(rgb_to_ansi256(0, 0, 0), 16);
        assert_eq!(rgb_to_ansi256(255, 255, 255), 231);
        assert_eq!(rgb_to_ansi256(128, 128, 128), 244);
        assert_eq!(rgb_to_ansi256(0, 255, 0), 46);
    }

    #[test]
    fn color16_picks_nearest_entry() {
        assert_eq!(rgb_to_color16(250, 10, 10), Color::Red);
        assert_eq!(rgb_to_color16(0, 120, 0), Color::DarkGreen);
    }

    #[test]
    fn quantize_keeps_extremes() {
        assert_eq!(quantize(0), 0);
        assert_eq!(quantize(255), 255);
        assert_eq!(quantize(9), quantize(10));
    }

    #[test]
    fn mono_has_no_color() {
        assert_eq!(terminal_color(ColorMode::Mono, TRAFFIC), None);
        assert!(terminal_color(ColorMode::TrueColor, TRAFFIC).is_some());
    }
}

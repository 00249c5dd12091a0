// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::surface::Rgb;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        ch: ' ',
        fg: None,
        bg: None,
        bold: false,
    };
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pixel {
    pub ch: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl Pixel {
    pub const EMPTY: Pixel = Pixel {
        ch: ' ',
        fg: Rgb::BLACK,
        bg: Rgb::BLACK,
    };

    pub fn ink(&self) -> f32 {
        if self.ch == ' ' {
            0.0
        } else {
            self.fg.luma()
        }
    }
}

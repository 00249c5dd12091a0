// Copyright (c) 2026 rezky_nightky

use crate::palette::{CODE, PANEL};
use crate::rng::RandomSource;
use crate::surface::Surface;

pub const LINE_SPACING: f32 = 16.0;
// How far past either edge a faded chunk must drift before it is dropped.
pub const OFFSCREEN_MARGIN: f32 = 400.0;
pub const MAX_OPACITY: f32 = 0.8;
const FADE_IN_RATE: f32 = 0.5;
const FADE_OUT_RATE: f32 = 0.3;
const SPAWN_MIN_S: f32 = 5.0;
const SPAWN_MAX_S: f32 = 10.0;
const HOLD_MIN_S: f32 = 2.0;
const HOLD_MAX_S: f32 = 5.0;
const FIRST_SPAWN_S: f32 = 1.0;
const SPEED_MIN: f32 = 15.0;
const SPEED_MAX: f32 = 45.0;
const GLYPH_W: f32 = 8.0;

pub const SNIPPETS: &[&[&str]] = &[
    &[
        "$ nmap -sS -p- 10.0.0.0/24",
        "Starting Nmap 7.94",
        "22/tcp   open  ssh",
        "443/tcp  open  https",
        "8080/tcp open  http-proxy",
    ],
    &[
        "fn inject(buf: &mut [u8]) {",
        "    let nop = [0x90; 64];",
        "    buf[..64].copy_from_slice(&nop);",
        "    exec(buf.as_ptr());",
        "}",
    ],
    &[
        "SELECT user, hash FROM accounts",
        "  WHERE role = 'admin'",
        "  -- ' OR '1'='1",
        "> 3 rows returned",
    ],
    &[
        "[*] handshake captured",
        "[*] cracking WPA2-PSK ...",
        "[+] key found: hunter2",
        "[*] pivoting to 10.0.0.7",
    ],
    &[
        "ssh root@10.0.0.12",
        "root@srv1:~# cat /etc/shadow",
        "root:$6$Xq9...:19512:0:99999:7:::",
        "root@srv1:~# exit",
    ],
    &[
        "0x7ffd3a10  41 41 41 41 41 41 41 41",
        "0x7ffd3a18  de ad be ef 00 00 00 00",
        "0x7ffd3a20  ef be ad de ca fe ba be",
    ],
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChunkState {
    FadeIn,
    Hold { remaining: f32 },
    FadeOut,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CodeChunk {
    pub x: f32,
    pub y: f32,
    // `1.0` drifts right, `-1.0` drifts left.
    pub direction: f32,
    pub speed: f32,
    pub opacity: f32,
    pub state: ChunkState,
    pub lines: &'static [&'static str],
}

impl CodeChunk {
    pub fn new(x: f32, y: f32, direction: f32, speed: f32, lines: &'static [&'static str]) -> Self {
        Self {
            x,
            y,
            direction,
            speed,
            opacity: 0.0,
            state: ChunkState::FadeIn,
            lines,
        }
    }

    fn advance(&mut self, dt: f32, rng: &mut dyn RandomSource) {
        self.x += self.direction * self.speed * dt;
        match self.state {
            ChunkState::FadeIn => {
                self.opacity += FADE_IN_RATE * dt;
                if self.opacity >= MAX_OPACITY {
                    self.opacity = MAX_OPACITY;
                    self.state = ChunkState::Hold {
                        remaining: rng.range(HOLD_MIN_S, HOLD_MAX_S),
                    };
                }
            }
            ChunkState::Hold { remaining } => {
                let remaining = remaining - dt;
                self.state = if remaining <= 0.0 {
                    ChunkState::FadeOut
                } else {
                    ChunkState::Hold { remaining }
                };
            }
            ChunkState::FadeOut => {
                self.opacity = (self.opacity - FADE_OUT_RATE * dt).max(0.0);
            }
        }
    }

    pub fn is_expired(&self, width: f32) -> bool {
        self.opacity <= 0.0
            && (self.x < -OFFSCREEN_MARGIN || self.x > width + OFFSCREEN_MARGIN)
    }

    fn draw(&self, surface: &mut dyn Surface) {
        if self.opacity <= 0.0 {
            return;
        }
        let cols = self.lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        surface.save();
        surface.set_alpha(self.opacity * 0.5);
        surface.fill_rect(
            self.x - GLYPH_W,
            self.y - LINE_SPACING / 2.0,
            (cols as f32 + 2.0) * GLYPH_W,
            (self.lines.len() as f32 + 1.0) * LINE_SPACING,
            PANEL,
        );
        surface.set_alpha(self.opacity);
        for (i, line) in self.lines.iter().enumerate() {
            surface.fill_text(line, self.x, self.y + i as f32 * LINE_SPACING, CODE);
        }
        surface.restore();
    }
}

pub struct CodeChunkSystem {
    chunks: Vec<CodeChunk>,
    spawn_timer: f32,
    rng: Box<dyn RandomSource>,
}

impl CodeChunkSystem {
    pub fn new(rng: Box<dyn RandomSource>) -> Self {
        Self {
            chunks: Vec::new(),
            spawn_timer: FIRST_SPAWN_S,
            rng,
        }
    }

    pub fn chunks(&self) -> &[CodeChunk] {
        &self.chunks
    }

    #[cfg(test)]
    pub fn chunks_mut(&mut self) -> &mut Vec<CodeChunk> {
        &mut self.chunks
    }

    fn spawn(&mut self, width: f32, height: f32) {
        let lines = SNIPPETS[self.rng.index(SNIPPETS.len())];
        let direction = self.rng.sign();
        let x = self.rng.range(width * 0.1, width * 0.7);
        let y = self.rng.range(LINE_SPACING * 2.0, (height - 160.0).max(LINE_SPACING * 2.0));
        let speed = self.rng.range(SPEED_MIN, SPEED_MAX);
        self.chunks.push(CodeChunk::new(x, y, direction, speed, lines));
    }

    pub fn update(&mut self, dt: f32, width: f32, height: f32) {
        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            self.spawn_timer = self.rng.range(SPAWN_MIN_S, SPAWN_MAX_S);
            self.spawn(width, height);
        }

        for c in &mut self.chunks {
            c.advance(dt, self.rng.as_mut());
        }
        self.chunks.retain(|c| !c.is_expired(width));
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        for c in &self.chunks {
            c.draw(surface);
        }
    }
}

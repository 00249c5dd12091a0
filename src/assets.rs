// Copyright (c) 2026 rezky_nightky

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::{info, warn};

use crate::error::AssetError;
use crate::surface::Rgb;

const EMBEDDED_BACKGROUND: &str = include_str!("../assets/background.txt");
const EMBEDDED_SKULL: &str = include_str!("../assets/skull.txt");

#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    pub tint: Rgb,
    pixels: Vec<Option<char>>,
}

impl Image {
    pub fn parse(name: &'static str, text: &str, tint: Rgb) -> Result<Self, AssetError> {
        let rows: Vec<Vec<char>> = text
            .lines()
            .map(|l| l.trim_end_matches('\r').chars().collect())
            .collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let height = rows.len();

        let mut pixels = vec![None; width * height];
        let mut visible = 0usize;
        for (y, row) in rows.iter().enumerate() {
            for (x, &ch) in row.iter().enumerate() {
                if !ch.is_whitespace() {
                    pixels[y * width + x] = Some(ch);
                    visible += 1;
                }
            }
        }
        if visible == 0 {
            return Err(AssetError::Empty { name });
        }

        Ok(Self {
            width,
            height,
            tint,
            pixels,
        })
    }

    pub fn sample(&self, u: f32, v: f32) -> Option<char> {
        if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
            return None;
        }
        let x = ((u * self.width as f32) as usize).min(self.width - 1);
        let y = ((v * self.height as f32) as usize).min(self.height - 1);
        self.pixels[y * self.width + x]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Background,
    Skull,
}

impl AssetKind {
    pub fn name(self) -> &'static str {
        match self {
            AssetKind::Background => "background",
            AssetKind::Skull => "skull",
        }
    }

    fn tint(self) -> Rgb {
        match self {
            AssetKind::Background => Rgb::hex(0x1f8f6f),
            AssetKind::Skull => Rgb::hex(0xff4455),
        }
    }

    fn embedded(self) -> &'static str {
        match self {
            AssetKind::Background => EMBEDDED_BACKGROUND,
            AssetKind::Skull => EMBEDDED_SKULL,
        }
    }
}

#[derive(Clone, Debug)]
pub enum AssetSource {
    Embedded,
    File(PathBuf),
}

impl AssetSource {
    pub fn from_arg(path: Option<PathBuf>) -> Self {
        path.map(AssetSource::File).unwrap_or(AssetSource::Embedded)
    }
}

#[derive(Debug)]
pub enum AssetEvent {
    Loaded(AssetKind, Image),
    Failed(AssetKind, AssetError),
}

fn load(kind: AssetKind, source: &AssetSource) -> Result<Image, AssetError> {
    match source {
        AssetSource::Embedded => Image::parse(kind.name(), kind.embedded(), kind.tint()),
        AssetSource::File(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
                path: path.clone(),
                source,
            })?;
            Image::parse(kind.name(), &text, kind.tint())
        }
    }
}

pub fn spawn_loaders(requests: Vec<(AssetKind, AssetSource)>) -> AssetGate {
    let (tx, rx) = crossbeam_channel::unbounded();
    let pending = requests.len();
    for (kind, source) in requests {
        let worker_tx: Sender<AssetEvent> = tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("netrain-asset-{}", kind.name()))
            .spawn(move || {
                let ev = match load(kind, &source) {
                    Ok(img) => AssetEvent::Loaded(kind, img),
                    Err(e) => AssetEvent::Failed(kind, e),
                };
                let _ = worker_tx.send(ev);
            });
        if let Err(e) = spawned {
            let _ = tx.send(AssetEvent::Failed(
                kind,
                AssetError::Io {
                    path: PathBuf::from(kind.name()),
                    source: e,
                },
            ));
        }
    }
    AssetGate { rx, pending }
}

#[derive(Clone, Debug, Default)]
pub struct Assets {
    pub background: Option<Image>,
    pub skull: Option<Image>,
}

impl Assets {
    fn store(&mut self, kind: AssetKind, img: Image) {
        match kind {
            AssetKind::Background => self.background = Some(img),
            AssetKind::Skull => self.skull = Some(img),
        }
    }
}

pub struct AssetGate {
    rx: Receiver<AssetEvent>,
    pending: usize,
}

impl AssetGate {
    pub fn wait(mut self, timeout: Duration) -> Assets {
        let deadline = Instant::now() + timeout;
        let mut assets = Assets::default();

        while self.pending > 0 {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(left) {
                Ok(AssetEvent::Loaded(kind, img)) => {
                    info!(
                        "asset {} ready ({}x{} glyphs)",
                        kind.name(),
                        img.width,
                        img.height
                    );
                    assets.store(kind, img);
                }
                Ok(AssetEvent::Failed(kind, e)) => {
                    warn!("asset {} unavailable, using fallback: {}", kind.name(), e);
                }
                Err(RecvTimeoutError::Timeout) => {
                    warn!("gave up waiting for {} asset(s)", self.pending);
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
            self.pending -= 1;
        }

        assets
    }
}

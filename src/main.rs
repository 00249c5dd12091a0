// Copyright (c) 2026 rezky_nightky

mod assets;
mod canvas;
mod cell;
mod chunks;
mod config;
mod director;
mod error;
mod frame;
mod hack;
mod network;
mod palette;
mod rain;
mod rng;
mod scene;
mod surface;
mod terminal;

use std::env;
use std::fs::OpenOptions;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind};
use log::{debug, info};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::assets::{spawn_loaders, AssetKind, AssetSource};
use crate::canvas::{Canvas, CELL_H, CELL_W};
use crate::config::{color_enabled_stdout, default_params_usage_for_help, print_help_detail, Args};
use crate::director::Director;
use crate::frame::Frame;
use crate::palette::ColorMode;
use crate::scene::Scene;
use crate::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

fn build_info() -> &'static str {
    env!("NETRAIN_BUILD")
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> f64 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn require_f32_range(name: &str, v: f32, min: f32, max: f32) -> f32 {
    require_f64_range(name, v as f64, min as f64, max as f64) as f32
}

fn require_u64_range(name: &str, v: u64, min: u64, max: u64) -> u64 {
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term.contains("256color") {
        return ColorMode::Color256;
    }

    ColorMode::Color16
}

fn detect_color_mode(args: &Args) -> ColorMode {
    if let Some(m) = args.colormode {
        return match m {
            0 => ColorMode::Mono,
            16 => ColorMode::Color16,
            8 | 256 => ColorMode::Color256,
            24 | 32 => ColorMode::TrueColor,
            _ => {
                eprintln!("invalid --colormode: {} (allowed: 0,16,8,24)", m);
                std::process::exit(1);
            }
        };
    }

    detect_color_mode_auto()
}

// File logging only; the terminal itself is the animation.
fn init_logging(args: &Args) -> std::io::Result<()> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let mut builder = env_logger::Builder::new();
    builder.filter_level(args.log_level.filter());
    if let Ok(spec) = env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    builder
        .format_timestamp_millis()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .map_err(std::io::Error::other)
}

fn surface_size(cols: u16, rows: u16) -> (f32, f32) {
    (cols as f32 * CELL_W, rows as f32 * CELL_H)
}

#[derive(Default)]
struct PerfStats {
    frames: u64,
    drawn_frames: u64,
    work_sum_s: f64,
    work_max_s: f32,
    overshoot_frames: u64,
}

impl PerfStats {
    fn record(&mut self, work_s: f32, drawn: bool, period_s: f32) {
        self.frames = self.frames.saturating_add(1);
        if drawn {
            self.drawn_frames = self.drawn_frames.saturating_add(1);
        }
        self.work_sum_s += work_s as f64;
        self.work_max_s = self.work_max_s.max(work_s);
        if work_s > period_s {
            self.overshoot_frames = self.overshoot_frames.saturating_add(1);
        }
    }

    fn print(&self, elapsed: Duration, target_fps: f64) {
        let elapsed_s = elapsed.as_secs_f64().max(0.000_001);
        let frames = self.frames.max(1) as f64;

        println!("PERF STATS:");
        println!("  elapsed_s: {:.3}", elapsed_s);
        println!("  target_fps: {:.3}", target_fps);
        println!("  avg_fps: {:.3}", self.frames as f64 / elapsed_s);
        println!("  frames: {}", self.frames);
        println!(
            "  drawn_frames: {} ({:.1}%)",
            self.drawn_frames,
            self.drawn_frames as f64 / frames * 100.0
        );
        println!("  avg_work_ms: {:.3}", self.work_sum_s / frames * 1000.0);
        println!("  max_work_ms: {:.3}", self.work_max_s as f64 * 1000.0);
        println!(
            "  overshoot_frames: {} ({:.1}%)",
            self.overshoot_frames,
            self.overshoot_frames as f64 / frames * 100.0
        );
    }
}

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }
    cmd.build();

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.help_detail {
        print_help_detail();
        return Ok(());
    }

    if args.check_bitcolor {
        let colorterm = env::var("COLORTERM").unwrap_or_default();
        let term = env::var("TERM").unwrap_or_default();
        let auto = detect_color_mode_auto();
        let effective = detect_color_mode(&args);

        println!("BITCOLOR CHECK:");
        println!(
            "  COLORTERM: {}",
            if colorterm.is_empty() {
                "(unset)"
            } else {
                &colorterm
            }
        );
        println!(
            "  TERM: {}",
            if term.is_empty() { "(unset)" } else { &term }
        );
        println!("  auto_detected: {}", auto.label());
        if args.colormode.is_some() {
            println!("  forced: {}", effective.label());
        }
        println!("  effective: {}", effective.label());
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        println!("Commit: {}", env!("NETRAIN_GIT_SHA"));
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    let color_mode = detect_color_mode(&args);
    let target_fps = require_f64_range("--fps", args.fps, 1.0, 240.0);
    let duration_s = args
        .duration_s()
        .map(|s| require_f64_range("--duration", s, 0.1, 86400.0));
    require_f32_range("--trail-alpha", args.trail_alpha, 0.01, 1.0);
    require_f32_range("--bg-alpha", args.bg_alpha, 0.0, 1.0);
    let asset_timeout =
        require_u64_range("--asset-timeout-ms", args.asset_timeout_ms, 0, 60_000);

    if let Err(e) = init_logging(&args) {
        eprintln!("failed to open log file: {}", e);
        std::process::exit(1);
    }
    info!(
        "netrain {} starting: {} at {} fps",
        env!("CARGO_PKG_VERSION"),
        color_mode.label(),
        target_fps
    );

    // Assets load in the background while the rest of startup runs; the
    // first frame waits on the gate.
    let gate = spawn_loaders(vec![
        (
            AssetKind::Background,
            AssetSource::from_arg(args.background.clone()),
        ),
        (AssetKind::Skull, AssetSource::from_arg(args.skull.clone())),
    ]);

    let mut term = Terminal::new()?;
    let (cols, rows) = term.size()?;

    let assets = gate.wait(Duration::from_millis(asset_timeout));
    let (w, h) = surface_size(cols, rows);
    let mut director = Director::new(Scene::new(w, h, assets, args.scene_config()));
    let mut canvas = Canvas::new(cols, rows);
    let mut frame = Frame::new(cols, rows);
    info!("surface {}x{} px on {}x{} cells", w, h, cols, rows);

    let start_time = Instant::now();
    let end_time = duration_s.map(|s| start_time + Duration::from_secs_f64(s));

    let target_period = Duration::from_secs_f64(1.0 / target_fps);
    let target_period_s = target_period.as_secs_f32().max(0.000_001);
    let mut next_frame = Instant::now();
    let mut perf = PerfStats::default();
    let mut running = true;

    while running {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }
        let mut pending_resize: Option<(u16, u16)> = None;

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => {
                        pending_resize = Some((nw, nh));
                    }
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if args.screensaver || matches!(k.code, KeyCode::Esc | KeyCode::Char('q'))
                        {
                            running = false;
                        }
                    }
                    _ => {}
                }
            }

            if !running || pending_resize.is_some() {
                break;
            }

            let now = Instant::now();
            if now >= next_frame {
                break;
            }

            let mut timeout = next_frame - now;
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if !running {
            break;
        }

        if let Some((nw, nh)) = pending_resize {
            canvas.resize(nw, nh);
            frame = Frame::new(nw, nh);
            let (w, h) = surface_size(nw, nh);
            director.resize(w, h);
            debug!("resized to {}x{} cells", nw, nh);
        }

        let work_start = Instant::now();
        let now_ms = start_time.elapsed().as_secs_f64() * 1000.0;
        director.frame(now_ms, &mut canvas);
        canvas.present(&mut frame, color_mode);
        let drawn = frame.has_changes();
        if drawn {
            term.draw(&mut frame)?;
        }
        let work_s = work_start.elapsed().as_secs_f32();
        if args.perf_stats {
            perf.record(work_s, drawn, target_period_s);
        }

        next_frame += target_period;
        let now = Instant::now();
        if now > next_frame {
            next_frame = now;
        }
    }

    drop(term);
    info!(
        "stopped after {:.1}s, {} hack(s) completed",
        start_time.elapsed().as_secs_f64(),
        director.scene().hacks.completed()
    );

    if args.perf_stats {
        info!("{} frames, {} drawn", perf.frames, perf.drawn_frames);
        perf.print(start_time.elapsed(), target_fps);
    }

    Ok(())
}

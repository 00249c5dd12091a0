// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::scene::SceneConfig;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  netrain --fps 60 --trail-alpha 0.08 --bg-alpha 0.06 --asset-timeout-ms 2000 --log-level info";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize_help_detail(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 64);
    for chunk in text.split_inclusive('\n') {
        let (line, nl) = chunk
            .strip_suffix('\n')
            .map(|l| (l, "\n"))
            .unwrap_or((chunk, ""));

        let is_heading =
            !line.starts_with(' ') && line.ends_with(':') && line == line.to_ascii_uppercase();

        let styled = if is_heading {
            format!("\x1b[1;36m{line}\x1b[0m")
        } else if let Some(rest) = line.strip_prefix("      Example:") {
            format!("      \x1b[32mExample:\x1b[0m{rest}")
        } else if let Some(rest) = line.strip_prefix("  netrain") {
            format!("  \x1b[1;34mnetrain\x1b[0m{rest}")
        } else if let Some(rest) = line.strip_prefix("  -") {
            format!("  \x1b[33m-{rest}\x1b[0m")
        } else {
            line.to_string()
        };
        out.push_str(&styled);
        out.push_str(nl);
    }
    out
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_help_detail(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "netrain", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "GENERAL",
        help = "Target FPS (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "hud",
        help_heading = "GENERAL",
        help = "Show live subsystem counters in the top-left corner"
    )]
    pub hud: bool,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit (TERM=...256color), else 16-color"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "trail-alpha",
        default_value_t = 0.08,
        help_heading = "APPEARANCE",
        help = "Opacity of the per-frame fade that leaves trails (min 0.01 max 1)"
    )]
    pub trail_alpha: f32,

    #[arg(
        long = "bg-alpha",
        default_value_t = 0.06,
        help_heading = "APPEARANCE",
        help = "Opacity of the background layer (min 0 max 1)"
    )]
    pub bg_alpha: f32,

    #[arg(
        long = "background",
        value_name = "PATH",
        help_heading = "ASSETS",
        help = "Text-art background image (default: built-in circuit)"
    )]
    pub background: Option<PathBuf>,

    #[arg(
        long = "skull",
        value_name = "PATH",
        help_heading = "ASSETS",
        help = "Text-art marker drawn over breached nodes (default: built-in skull)"
    )]
    pub skull: Option<PathBuf>,

    #[arg(
        long = "asset-timeout-ms",
        default_value_t = 2000,
        help_heading = "ASSETS",
        help = "How long to wait for assets before starting without them (min 0 max 60000)"
    )]
    pub asset_timeout_ms: u64,

    #[arg(
        long = "log-file",
        value_name = "PATH",
        help_heading = "DIAGNOSTICS",
        help = "Write log records to this file (logging is off otherwise)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "log-level",
        default_value_t = LogLevel::Info,
        value_enum,
        help_heading = "DIAGNOSTICS",
        help = "Log filter for --log-file (RUST_LOG overrides)"
    )]
    pub log_level: LogLevel,

    #[arg(
        long = "perf-stats",
        help_heading = "DIAGNOSTICS",
        help = "Print performance statistics summary on exit"
    )]
    pub perf_stats: bool,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "help-detail",
        help_heading = "HELP",
        help = "Show detailed help for all parameters and exit"
    )]
    pub help_detail: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

impl Args {
    pub fn scene_config(&self) -> SceneConfig {
        SceneConfig {
            trail_alpha: self.trail_alpha,
            background_alpha: self.bg_alpha,
            hud: self.hud,
        }
    }

    pub fn duration_s(&self) -> Option<f64> {
        self.duration.filter(|d| *d > 0.0)
    }
}

pub fn print_help_detail() {
    let block = format!(
        "{}\n\nUSAGE:\n  netrain [OPTIONS]\n\nGENERAL:\n  -f, --fps <number>\n      Target FPS (min 1 max 240).\n      Example: netrain --fps 30\n\n  --duration <seconds>\n      Stop after N seconds (min 0.1 max 86400).\n      Example: netrain --duration 10\n\n  -s, --screensaver\n      Screensaver mode (exit on keypress).\n      Example: netrain -s\n\n  --hud\n      Show rain/chunk/packet/hack counters.\n      Example: netrain --hud\n\nAPPEARANCE:\n  --colormode <0|16|8|24>\n      Force color mode; otherwise auto-detected from COLORTERM/TERM.\n      Example: netrain --colormode 8\n\n  --trail-alpha <number>\n      Per-frame fade over the previous frame. Lower means longer trails.\n      Example: netrain --trail-alpha 0.05\n\n  --bg-alpha <number>\n      Opacity of the background layer.\n      Example: netrain --bg-alpha 0\n\nASSETS:\n  --background <path>\n      Text-art background; every non-space character is a lit pixel.\n      Example: netrain --background ./circuit.txt\n\n  --skull <path>\n      Text-art marker drawn over breached nodes.\n      Example: netrain --skull ./skull.txt\n\n  --asset-timeout-ms <ms>\n      Start without assets that are not loaded by then.\n      Example: netrain --asset-timeout-ms 500\n\nDIAGNOSTICS:\n  --log-file <path>\n      Append log records to a file.\n      Example: netrain --log-file netrain.log --log-level debug\n\n  --log-level <off|error|warn|info|debug|trace>\n      Filter for --log-file. RUST_LOG takes precedence.\n\n  --perf-stats\n      Print performance statistics summary on exit.\n      Example: netrain --duration 10 --perf-stats\n\nHELP:\n  --check-bitcolor\n      Print detected terminal color capability and exit.\n\n  --help\n      Show short help.\n\n  --help-detail\n      Show this detailed help.\n\n  -v, --version\n      Print version and exit.\n\n  -i, --info\n      Print version info and exit.\n",
        DEFAULT_PARAMS_USAGE
    );

    if color_enabled_stdout() {
        print!("{}", colorize_help_detail(&block));
    } else {
        print!("{}", block);
    }

    println!();
    println!("LIMITS / VALID RANGES:");
    println!("  --fps <number>              min 1 max 240");
    println!("  --duration <seconds>        min 0.1 max 86400 (<=0 disables)");
    println!("  --trail-alpha <number>      min 0.01 max 1");
    println!("  --bg-alpha <number>         min 0 max 1");
    println!("  --asset-timeout-ms <ms>     min 0 max 60000");
    println!("  --colormode <0|16|8|24>     allowed values only (8==256, 24==32)");
}

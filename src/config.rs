// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;

use crate::runtime::HeadStyle;
use crate::session::SessionConfig;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  katarain --fps 25 --head bold --charset matrix --color-bg black --end-title \"The Matrix. Goodbye!\"";

pub const DEFAULT_OPENING_TITLE: &str = "The Matrix";
pub const DEFAULT_END_TITLE: &str = "The Matrix. Goodbye!";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        let mut out = String::with_capacity(DEFAULT_PARAMS_USAGE.len() + 32);
        for line in DEFAULT_PARAMS_USAGE.lines() {
            if let Some(rest) = line.strip_prefix("  katarain") {
                out.push_str("  \x1b[1;34mkatarain\x1b[0m");
                out.push_str(rest);
            } else {
                out.push_str("\x1b[1;36m");
                out.push_str(line);
                out.push_str("\x1b[0m");
            }
            out.push('\n');
        }
        out
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBg {
    #[value(name = "black")]
    Black,
    #[value(name = "default-background")]
    DefaultBackground,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "katarain", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'c',
        long = "count",
        help_heading = "RAIN",
        help = "Max concurrent streams (min 1; default: half the terminal width)"
    )]
    pub count: Option<usize>,

    #[arg(
        short = 'S',
        long = "speed",
        help_heading = "RAIN",
        help = "Max fall speed in rows per frame (min 1 max 20; default: 1 + height/25)"
    )]
    pub speed: Option<u16>,

    #[arg(
        short = 'H',
        long = "head",
        default_value_t = HeadStyle::Bold,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Head style (bold looks better on large fonts, standout on small ones)"
    )]
    pub head: HeadStyle,

    #[arg(
        long = "charset",
        default_value = "matrix",
        help_heading = "APPEARANCE",
        help = "Charset preset (see --list-charsets)"
    )]
    pub charset: String,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: auto-detected from COLORTERM/TERM"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "color-bg",
        default_value_t = ColorBg::Black,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Background mode (black, default-background)"
    )]
    pub color_bg: ColorBg,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 25.0,
        help_heading = "GENERAL",
        help = "Frames per second (min 1 max 120)"
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
        help = "Screensaver mode (no intro, exit on first keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "no-intro",
        help_heading = "TITLES",
        help = "Start raining without the intro screen"
    )]
    pub no_intro: bool,

    #[arg(
        long = "no-title",
        help_heading = "TITLES",
        help = "Exit without the closing title"
    )]
    pub no_title: bool,

    #[arg(
        long = "opening-title",
        default_value = DEFAULT_OPENING_TITLE,
        help_heading = "TITLES",
        help = "Title shown on the intro screen"
    )]
    pub opening_title: String,

    #[arg(
        short = 't',
        long = "end-title",
        default_value = DEFAULT_END_TITLE,
        help_heading = "TITLES",
        help = "Title spelled out by the rain on exit"
    )]
    pub end_title: String,

    #[arg(
        long = "log-file",
        value_name = "PATH",
        help_heading = "DIAGNOSTICS",
        help = "Write logs to PATH (filter with RUST_LOG)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "verbose",
        help_heading = "DIAGNOSTICS",
        help = "Log at info level (with --log-file)"
    )]
    pub verbose: bool,

    #[arg(
        long = "debug",
        help_heading = "DIAGNOSTICS",
        help = "Log at debug level (with --log-file)"
    )]
    pub debug: bool,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "list-charsets",
        help_heading = "HELP",
        help = "List available charset presets and exit"
    )]
    pub list_charsets: bool,

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
    /// Session settings for a `width` x `height` grid, with command line overrides applied.
    pub fn session_config(&self, width: u16, height: u16) -> SessionConfig {
        let mut config = SessionConfig::for_grid(width, height);
        if let Some(count) = self.count {
            config.max_concurrent_streams = count;
        }
        if let Some(speed) = self.speed {
            config.max_fall_speed = speed;
        }
        config.head_style = self.head;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_grid() {
        let args = Args::parse_from(["katarain"]);
        let c = args.session_config(100, 60);
        assert_eq!(c.max_concurrent_streams, 50);
        assert_eq!(c.max_fall_speed, 3);
        assert_eq!(c.head_style, HeadStyle::Bold);
        assert_eq!(args.end_title, DEFAULT_END_TITLE);
        assert_eq!(args.fps, 25.0);
    }

    #[test]
    fn overrides_replace_grid_defaults() {
        let args = Args::parse_from(["katarain", "-c", "7", "-S", "4", "--head", "standout"]);
        let c = args.session_config(100, 60);
        assert_eq!(c.max_concurrent_streams, 7);
        assert_eq!(c.max_fall_speed, 4);
        assert_eq!(c.head_style, HeadStyle::Standout);
    }

    #[test]
    fn unknown_head_style_is_rejected() {
        assert!(Args::try_parse_from(["katarain", "--head", "italic"]).is_err());
    }
}

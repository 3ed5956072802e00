// Copyright (c) 2026 rezky_nightky

mod cell;
mod charset;
mod config;
mod error;
mod frame;
mod palette;
mod pool;
mod runtime;
mod scheduler;
mod session;
mod stream;
mod terminal;
mod title;

use std::env;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, info, warn};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::cell::Style;
use crate::charset::{charset_from_str, print_list_charsets, Glyphs};
use crate::config::{color_enabled_stdout, default_params_usage_for_help, Args, ColorBg};
use crate::error::RainError;
use crate::frame::Frame;
use crate::palette::Palette;
use crate::runtime::ColorMode;
use crate::session::RainSession;
use crate::terminal::{restore_terminal_best_effort, Terminal};
use crate::title::spaced;

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

const INTRO_LINES: [&str; 2] = [
    "Press any key to start. Press any key (except SPACE) to stop.",
    "Press key 'h' to try a different style.",
];

fn build_info() -> &'static str {
    env!("KATARAIN_BUILD")
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

fn require_u16_range(name: &str, v: u16, min: u16, max: u16) -> u16 {
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
                eprintln!("invalid --colormode: {} (allowed: 0,16,8/256,24/32)", m);
                std::process::exit(1);
            }
        };
    }

    detect_color_mode_auto()
}

/// Logs go to a file: the screen belongs to the rain.
fn init_logging(args: &Args) -> std::io::Result<()> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };
    let file = std::fs::File::create(path)?;

    let level = if args.debug {
        tracing::Level::DEBUG
    } else if args.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    info!(
        "katarain {} ({}) starting",
        env!("CARGO_PKG_VERSION"),
        build_info()
    );
    Ok(())
}

fn is_interrupt(k: &KeyEvent) -> bool {
    k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL)
}

fn wait_for_key() -> std::io::Result<KeyEvent> {
    loop {
        if let Event::Key(k) = Terminal::read_event()? {
            if k.kind == KeyEventKind::Press {
                return Ok(k);
            }
        }
    }
}

/// Draws the intro screen and blocks for a key. `false` means the user interrupted.
fn show_intro(
    term: &mut Terminal,
    frame: &mut Frame,
    opening_title: &str,
) -> std::io::Result<bool> {
    for (row, line) in INTRO_LINES.iter().enumerate() {
        frame.put_str(row as u16, 0, line, Style::NEUTRAL);
    }
    let title = spaced(opening_title);
    frame.put_str(frame.height / 3, frame.width / 4, &title, Style::NEUTRAL);
    term.draw(frame)?;

    let k = wait_for_key()?;
    frame.clear();
    Ok(!is_interrupt(&k))
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

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_charsets {
        print_list_charsets();
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
        println!(
            "  gradient: {}",
            if effective.has_continuous_palette() {
                "yes"
            } else {
                "no (plain/bold fallback)"
            }
        );
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    let target_fps = require_f64_range("--fps", args.fps, 1.0, 120.0);
    if let Some(speed) = args.speed {
        require_u16_range("--speed", speed, 1, 20);
    }
    if args.count == Some(0) {
        eprintln!("failed to apply --count 0 (min 1)");
        std::process::exit(1);
    }
    let duration_s = args.duration.and_then(|s| {
        if !s.is_finite() {
            eprintln!("failed to apply --duration {} (must be a finite number)", s);
            std::process::exit(1);
        }
        if s > 0.0 {
            return Some(require_f64_range("--duration", s, 0.1, 86400.0));
        }
        None
    });

    let charset = match charset_from_str(&args.charset) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    init_logging(&args)?;

    let color_mode = detect_color_mode(&args);
    let palette = Palette::new(color_mode, args.color_bg == ColorBg::DefaultBackground);

    let mut term = Terminal::new()?;
    let (w, h) = term.size()?;
    let mut frame = Frame::new(w, h, palette.bg);

    let show_intro_screen = !args.no_intro && !args.screensaver;
    if show_intro_screen && !show_intro(&mut term, &mut frame, &args.opening_title)? {
        return Ok(());
    }

    let config = args.session_config(w, h);
    let mut session = RainSession::start(config, w, h, Glyphs::new(charset), palette);
    let end_title = spaced(&args.end_title);
    let mut title_error: Option<RainError> = None;

    let start_time = Instant::now();
    let end_time = duration_s.map(|s| start_time + Duration::from_secs_f64(s));
    let target_period = Duration::from_secs_f64(1.0 / target_fps);
    let mut next_frame = Instant::now();

    while !session.is_complete() {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            debug!("duration elapsed");
            session.cancel();
            break;
        }

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                let Event::Key(k) = Terminal::read_event()? else {
                    continue;
                };
                if k.kind != KeyEventKind::Press {
                    continue;
                }

                if is_interrupt(&k) || args.screensaver {
                    session.cancel();
                    break;
                }

                if session.in_title() {
                    if k.code != KeyCode::Char(' ') {
                        session.cancel();
                    }
                    continue;
                }

                match k.code {
                    KeyCode::Char('h') => {
                        session.toggle_head_style();
                        debug!(head = ?session.head_style(), "head style toggled");
                    }
                    KeyCode::Char(' ') => {}
                    _ if args.no_title => session.cancel(),
                    _ => {
                        debug!(streams = session.live_streams(), "rain interrupted for title");
                        match session.request_title(&end_title, h / 2, w / 3) {
                            Ok(()) => frame.clear(),
                            Err(e) => {
                                warn!(%e, "title cannot be displayed");
                                title_error = Some(e);
                                session.cancel();
                            }
                        }
                    }
                }
            }

            if session.is_complete() {
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

        if session.is_complete() {
            break;
        }

        session.tick(&mut frame);
        if frame.is_dirty_all() || !frame.dirty_indices().is_empty() {
            term.draw(&mut frame)?;
        }

        next_frame += target_period;
        let now = Instant::now();
        if now > next_frame {
            next_frame = now;
        }
    }

    drop(term);
    if let Some(e) = title_error {
        eprintln!("title cannot be displayed: {}", e);
    }
    info!("exiting");
    Ok(())
}

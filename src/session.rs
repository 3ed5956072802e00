// Copyright (c) 2026 rezky_nightky

use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info};

use crate::charset::Glyphs;
use crate::error::RainResult;
use crate::frame::Frame;
use crate::palette::Palette;
use crate::pool::ColumnPool;
use crate::runtime::HeadStyle;
use crate::scheduler::{Scheduler, SpawnPolicy};
use crate::stream::DrawCtx;
use crate::title::TitleChoreographer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub max_concurrent_streams: usize,
    pub max_fall_speed: u16,
    pub head_style: HeadStyle,
}

impl SessionConfig {
    /// Defaults scaled to the grid: one stream per two columns, and faster
    /// falls on taller screens.
    pub fn for_grid(width: u16, height: u16) -> Self {
        Self {
            max_concurrent_streams: (width / 2) as usize,
            max_fall_speed: 1 + height / 25,
            head_style: HeadStyle::Bold,
        }
    }
}

#[derive(Clone, Debug)]
enum Mode {
    Rain(Scheduler),
    Title(TitleChoreographer),
    Done,
}

/// The rain as seen by the driver: tick it once per frame, ask for a title,
/// cancel it.
pub struct RainSession {
    config: SessionConfig,
    width: u16,
    height: u16,
    glyphs: Glyphs,
    palette: Palette,
    rng: StdRng,
    mode: Mode,
}

impl RainSession {
    pub fn start(
        config: SessionConfig,
        width: u16,
        height: u16,
        glyphs: Glyphs,
        palette: Palette,
    ) -> Self {
        Self::with_rng(config, width, height, glyphs, palette, StdRng::from_os_rng())
    }

    pub fn with_rng(
        config: SessionConfig,
        width: u16,
        height: u16,
        glyphs: Glyphs,
        palette: Palette,
        rng: StdRng,
    ) -> Self {
        let mut config = config;
        config.max_fall_speed = config.max_fall_speed.max(1);

        info!(
            width,
            height,
            streams = config.max_concurrent_streams,
            max_speed = config.max_fall_speed,
            gradient = palette.has_continuous_palette(),
            "rain session started"
        );

        let policy = SpawnPolicy {
            height,
            max_speed: config.max_fall_speed,
        };
        let rain = Scheduler::new(
            ColumnPool::full(width),
            config.max_concurrent_streams,
            policy,
        );

        Self {
            config,
            width,
            height,
            glyphs,
            palette,
            rng,
            mode: Mode::Rain(rain),
        }
    }

    fn policy(&self) -> SpawnPolicy {
        SpawnPolicy {
            height: self.height,
            max_speed: self.config.max_fall_speed,
        }
    }

    /// Advances every live stream by one frame.
    pub fn tick(&mut self, frame: &mut Frame) {
        let ctx = DrawCtx {
            glyphs: &self.glyphs,
            palette: &self.palette,
            head_style: self.config.head_style,
        };
        let finished = match &mut self.mode {
            Mode::Rain(rain) => {
                rain.tick(&ctx, &mut self.rng, frame);
                false
            }
            Mode::Title(title) => {
                title.tick(&ctx, &mut self.rng, frame);
                title.is_complete()
            }
            Mode::Done => false,
        };
        if finished {
            debug!("title finished");
            self.mode = Mode::Done;
        }
    }

    /// Replaces whatever is running with a title reveal.
    ///
    /// Streams of the current rain are dropped without draining. On error the
    /// session keeps running as before.
    pub fn request_title(&mut self, text: &str, row: u16, col: u16) -> RainResult<()> {
        let pool = ColumnPool::full(self.width);
        let policy = self.policy();
        let title =
            TitleChoreographer::begin(&pool, text, row, col, self.width, policy, &mut self.rng)?;
        self.mode = Mode::Title(title);
        Ok(())
    }

    pub fn in_title(&self) -> bool {
        matches!(self.mode, Mode::Title(_))
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.mode, Mode::Done)
    }

    /// Stops immediately, in rain or title mode alike.
    pub fn cancel(&mut self) {
        if !self.is_complete() {
            debug!("session cancelled");
        }
        self.mode = Mode::Done;
    }

    pub fn head_style(&self) -> HeadStyle {
        self.config.head_style
    }

    pub fn toggle_head_style(&mut self) {
        self.config.head_style = self.config.head_style.toggled();
    }

    pub fn live_streams(&self) -> usize {
        match &self.mode {
            Mode::Rain(rain) => rain.streams().len(),
            Mode::Title(title) => title.pinned_active() + title.filler_active(),
            Mode::Done => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RainError;
    use crate::runtime::ColorMode;

    fn session(width: u16, height: u16, seed: u64) -> RainSession {
        RainSession::with_rng(
            SessionConfig::for_grid(width, height),
            width,
            height,
            Glyphs::matrix(),
            Palette::new(ColorMode::Color256, false),
            StdRng::seed_from_u64(seed),
        )
    }

    #[test]
    fn config_scales_with_grid() {
        let c = SessionConfig::for_grid(80, 50);
        assert_eq!(c.max_concurrent_streams, 40);
        assert_eq!(c.max_fall_speed, 3);
        assert_eq!(c.head_style, HeadStyle::Bold);
    }

    #[test]
    fn rain_runs_until_cancelled() {
        let mut s = session(20, 12, 1);
        let mut frame = Frame::new(20, 12, None);
        for _ in 0..50 {
            s.tick(&mut frame);
            assert!(!s.is_complete());
        }
        assert_eq!(s.live_streams(), 10);
        s.cancel();
        assert!(s.is_complete());
        assert_eq!(s.live_streams(), 0);
    }

    #[test]
    fn title_completes_on_its_own() {
        let mut s = session(30, 12, 2);
        let mut frame = Frame::new(30, 12, None);
        s.tick(&mut frame);
        s.request_title("BYE", 6, 10).unwrap();
        assert!(s.in_title());

        let mut guard = 0;
        while !s.is_complete() {
            s.tick(&mut frame);
            guard += 1;
            assert!(guard < 500);
        }
        assert_eq!(frame.get(5, 10).unwrap().ch, 'B');
        assert_eq!(frame.get(5, 11).unwrap().ch, 'Y');
        assert_eq!(frame.get(5, 12).unwrap().ch, 'E');
    }

    #[test]
    fn cancel_overrides_title() {
        let mut s = session(30, 12, 3);
        let mut frame = Frame::new(30, 12, None);
        s.request_title("HI", 6, 0).unwrap();
        s.tick(&mut frame);
        s.cancel();
        assert!(s.is_complete());
        s.tick(&mut frame);
        assert!(s.is_complete());
    }

    #[test]
    fn failed_title_keeps_rain_running() {
        let mut s = session(10, 8, 4);
        let err = s.request_title("X", 0, 0).unwrap_err();
        assert_eq!(err, RainError::InvalidTitleOrigin { row: 0, height: 8 });
        assert!(!s.in_title());
        assert!(!s.is_complete());
    }

    #[test]
    fn head_style_toggle_is_per_session() {
        let mut a = session(10, 8, 5);
        let b = session(10, 8, 6);
        a.toggle_head_style();
        assert_eq!(a.head_style(), HeadStyle::Standout);
        assert_eq!(b.head_style(), HeadStyle::Bold);
    }
}

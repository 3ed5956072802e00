// Copyright (c) 2026 rezky_nightky

//! One falling stream of glyphs confined to a single column.
//!
//! A stream is a head (bright leading glyph), a body fading behind it, and a
//! gap behind the tail that gets blanked as the stream moves on. Each call to
//! [`RainStream::advance`] draws exactly one frame and returns.

use rand::Rng;

use crate::cell::Style;
use crate::charset::Glyphs;
use crate::frame::Frame;
use crate::palette::{gradient_level, Palette};
use crate::runtime::HeadStyle;

/// Shared read-only inputs for drawing a frame of rain.
pub struct DrawCtx<'a> {
    pub glyphs: &'a Glyphs,
    pub palette: &'a Palette,
    pub head_style: HeadStyle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Not drawn yet.
    Entering,
    /// Head inside the band.
    Falling,
    /// Head past the band, body still visible.
    Draining,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamKind {
    /// Column came from the pool and goes back to it.
    Free,
    /// Column fixed by a title.
    Pinned,
}

#[derive(Clone, Debug)]
pub struct RainStream {
    column: u16,
    kind: StreamKind,
    start: i32,
    end: i32,
    max_length: i32,
    speed: i32,
    head: i32,
    tail: i32,
    cleared_to: i32,
    finish_glyph: Option<char>,
    drawn: bool,
    finished: bool,
}

impl RainStream {
    /// A free-roaming stream over rows `start_row..end_row`.
    ///
    /// `end_row` is raised to `start_row` and length/speed to 1 if smaller.
    pub fn new(column: u16, start_row: u16, end_row: u16, max_length: u16, speed: u16) -> Self {
        let start = start_row as i32;
        let end = (end_row as i32).max(start);
        Self {
            column,
            kind: StreamKind::Free,
            start,
            end,
            max_length: (max_length as i32).max(1),
            speed: (speed as i32).max(1),
            head: start,
            tail: start,
            cleared_to: start,
            finish_glyph: None,
            drawn: false,
            finished: start >= end,
        }
    }

    /// Pins the stream to its column and leaves `glyph` at `end_row - 1` when it ends.
    pub fn pinned(mut self, glyph: char) -> Self {
        self.kind = StreamKind::Pinned;
        self.finish_glyph = Some(glyph);
        self
    }

    pub fn column(&self) -> u16 {
        self.column
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    pub fn head(&self) -> i32 {
        self.head
    }

    pub fn tail(&self) -> i32 {
        self.tail
    }

    pub fn start_row(&self) -> i32 {
        self.start
    }

    pub fn end_row(&self) -> i32 {
        self.end
    }

    pub fn max_length(&self) -> i32 {
        self.max_length
    }

    pub fn speed(&self) -> i32 {
        self.speed
    }

    pub fn finish_glyph(&self) -> Option<char> {
        self.finish_glyph
    }

    #[allow(dead_code)]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn phase(&self) -> Phase {
        if self.finished {
            Phase::Finished
        } else if !self.drawn {
            Phase::Entering
        } else if self.head < self.end {
            Phase::Falling
        } else {
            Phase::Draining
        }
    }

    fn tail_for(&self, head: i32) -> i32 {
        (head - self.max_length).max(self.start)
    }

    /// Draws one frame and moves the head down by `speed` rows.
    ///
    /// Returns `true` once the stream is finished; further calls do nothing.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        ctx: &DrawCtx<'_>,
        rng: &mut R,
        frame: &mut Frame,
    ) -> bool {
        if self.phase() == Phase::Finished {
            return true;
        }
        self.drawn = true;

        let tail = self.tail_for(self.head);
        self.clear_to(tail, frame);
        self.draw_body(tail, ctx, rng, frame);
        if self.head >= self.start && self.head < self.end {
            self.put(self.head, ctx.glyphs.pick(rng), ctx.palette.head(ctx.head_style), frame);
        }

        self.head += self.speed;
        self.tail = self.tail_for(self.head);

        if self.tail >= self.end {
            // the gap the next frame would have blanked
            self.clear_to(self.end, frame);
            if let Some(ch) = self.finish_glyph {
                self.put(self.end - 1, ch, Style::NEUTRAL, frame);
            }
            self.finished = true;
        }
        self.finished
    }

    fn clear_to(&mut self, upto: i32, frame: &mut Frame) {
        let upto = upto.min(self.end);
        for row in self.cleared_to..upto {
            self.put(row, ' ', Style::NEUTRAL, frame);
        }
        self.cleared_to = self.cleared_to.max(upto);
    }

    fn draw_body<R: Rng + ?Sized>(
        &self,
        tail: i32,
        ctx: &DrawCtx<'_>,
        rng: &mut R,
        frame: &mut Frame,
    ) {
        let lo = tail.max(self.start);
        let hi = self.head.min(self.end);

        if ctx.palette.has_continuous_palette() {
            for row in lo..hi {
                let style = ctx.palette.style_for(gradient_level(self.head, row));
                self.put(row, ctx.glyphs.pick(rng), style, frame);
            }
            return;
        }

        let middle = (self.head - self.max_length / 2).max(self.start);
        for row in lo..middle.min(hi) {
            self.put(row, ctx.glyphs.pick(rng), ctx.palette.body_plain(), frame);
        }
        for row in middle.max(lo)..hi {
            self.put(row, ctx.glyphs.pick(rng), ctx.palette.body_bold(), frame);
        }
    }

    /// All writes go through here; rows outside the band are skipped.
    fn put(&self, row: i32, ch: char, style: Style, frame: &mut Frame) {
        if row < self.start || row >= self.end {
            return;
        }
        let Ok(row) = u16::try_from(row) else {
            return;
        };
        frame.set_cell(row, self.column, ch, style);
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::runtime::ColorMode;

    struct Kit {
        glyphs: Glyphs,
        palette: Palette,
    }

    impl Kit {
        fn new(mode: ColorMode) -> Self {
            Self {
                glyphs: Glyphs::matrix(),
                palette: Palette::new(mode, true),
            }
        }

        fn ctx(&self) -> DrawCtx<'_> {
            DrawCtx {
                glyphs: &self.glyphs,
                palette: &self.palette,
                head_style: HeadStyle::Bold,
            }
        }
    }

    #[test]
    fn timing_matches_length_and_speed() {
        let kit = Kit::new(ColorMode::TrueColor);
        let mut frame = Frame::new(4, 20, None);
        let mut rng = StdRng::seed_from_u64(11);
        let mut s = RainStream::new(1, 0, 20, 10, 2);

        for _ in 0..5 {
            assert!(!s.advance(&kit.ctx(), &mut rng, &mut frame));
        }
        assert_eq!((s.head(), s.tail()), (10, 0));
        assert_eq!(s.phase(), Phase::Falling);

        for _ in 0..5 {
            assert!(!s.advance(&kit.ctx(), &mut rng, &mut frame));
        }
        assert_eq!((s.head(), s.tail()), (20, 10));
        assert_eq!(s.phase(), Phase::Draining);

        let mut ticks = 10;
        while !s.advance(&kit.ctx(), &mut rng, &mut frame) {
            ticks += 1;
        }
        ticks += 1;
        assert_eq!(ticks, 15);
        assert!(s.tail() >= s.end_row());
    }

    #[test]
    fn head_and_tail_invariants_hold_every_tick() {
        let kit = Kit::new(ColorMode::Color16);
        let mut frame = Frame::new(2, 30, None);
        let mut rng = StdRng::seed_from_u64(5);
        let mut s = RainStream::new(0, 4, 27, 7, 3);
        let mut last_head = s.head();

        loop {
            let done = s.advance(&kit.ctx(), &mut rng, &mut frame);
            assert!(s.tail() <= s.head());
            assert!(s.start_row() <= s.tail());
            assert!(s.head() >= last_head);
            last_head = s.head();
            if done {
                break;
            }
        }
    }

    #[test]
    fn finished_stream_ignores_further_advances() {
        let kit = Kit::new(ColorMode::Color256);
        let mut frame = Frame::new(1, 6, None);
        let mut rng = StdRng::seed_from_u64(2);
        let mut s = RainStream::new(0, 0, 6, 2, 3);
        while !s.advance(&kit.ctx(), &mut rng, &mut frame) {}

        let head = s.head();
        frame.clear_dirty();
        assert!(s.advance(&kit.ctx(), &mut rng, &mut frame));
        assert_eq!(s.head(), head);
        assert_eq!(s.phase(), Phase::Finished);
        assert!(frame.dirty_indices().is_empty());
    }

    #[test]
    fn finished_stream_leaves_column_blank() {
        let kit = Kit::new(ColorMode::TrueColor);
        let mut frame = Frame::new(3, 12, None);
        let mut rng = StdRng::seed_from_u64(9);
        let mut s = RainStream::new(2, 0, 12, 5, 2);
        while !s.advance(&kit.ctx(), &mut rng, &mut frame) {}

        for row in 0..12 {
            assert_eq!(frame.get(row, 2).unwrap().ch, ' ', "row {row}");
        }
    }

    #[test]
    fn pinned_stream_leaves_its_glyph_above_end_row() {
        let kit = Kit::new(ColorMode::TrueColor);
        let mut frame = Frame::new(3, 10, None);
        let mut rng = StdRng::seed_from_u64(4);
        let mut s = RainStream::new(1, 0, 5, 4, 1).pinned('A');
        while !s.advance(&kit.ctx(), &mut rng, &mut frame) {}

        let cell = frame.get(4, 1).unwrap();
        assert_eq!(cell.ch, 'A');
        assert_eq!(cell.style, Style::NEUTRAL);
        for row in 5..10 {
            assert_eq!(frame.get(row, 1).unwrap().ch, ' ');
        }
    }

    #[test]
    fn writes_stay_inside_the_band() {
        let kit = Kit::new(ColorMode::Color16);
        let mut frame = Frame::new(1, 20, None);
        let mut rng = StdRng::seed_from_u64(8);
        let mut s = RainStream::new(0, 5, 9, 20, 4);
        while !s.advance(&kit.ctx(), &mut rng, &mut frame) {
            for row in (0..5).chain(9..20) {
                assert_eq!(frame.get(row, 0).unwrap().ch, ' ');
            }
        }
    }

    #[test]
    fn head_is_drawn_with_head_style() {
        let kit = Kit::new(ColorMode::TrueColor);
        let mut frame = Frame::new(1, 10, None);
        let mut rng = StdRng::seed_from_u64(1);
        let mut s = RainStream::new(0, 0, 10, 5, 1);
        s.advance(&kit.ctx(), &mut rng, &mut frame);
        s.advance(&kit.ctx(), &mut rng, &mut frame);

        assert_eq!(
            frame.get(1, 0).unwrap().style,
            kit.palette.head(HeadStyle::Bold)
        );
        assert_eq!(
            frame.get(0, 0).unwrap().style,
            kit.palette.style_for(crate::palette::GRADIENT_TOP)
        );
    }

    #[test]
    fn fallback_body_is_plain_below_midpoint_and_bold_above() {
        let kit = Kit::new(ColorMode::Color16);
        let mut frame = Frame::new(1, 20, None);
        let mut rng = StdRng::seed_from_u64(6);
        let mut s = RainStream::new(0, 0, 20, 8, 1);
        for _ in 0..11 {
            s.advance(&kit.ctx(), &mut rng, &mut frame);
        }
        // last frame drew head at 10, body [2, 10), midpoint 6
        assert_eq!(frame.get(5, 0).unwrap().style, kit.palette.body_plain());
        assert_eq!(frame.get(6, 0).unwrap().style, kit.palette.body_bold());
        assert_eq!(frame.get(9, 0).unwrap().style, kit.palette.body_bold());
        assert_eq!(frame.get(1, 0).unwrap().ch, ' ');
    }

    #[test]
    fn different_seeds_change_glyphs_but_not_timing() {
        let kit = Kit::new(ColorMode::TrueColor);
        let run = |seed: u64| {
            let mut frame = Frame::new(1, 40, None);
            let mut rng = StdRng::seed_from_u64(seed);
            let mut s = RainStream::new(0, 0, 40, 30, 1);
            let mut steps = Vec::new();
            let mut glyphs = Vec::new();
            for _ in 0..25 {
                s.advance(&kit.ctx(), &mut rng, &mut frame);
                steps.push((s.head(), s.tail(), s.phase()));
                glyphs.extend((0..40).map(|r| frame.get(r, 0).unwrap().ch));
            }
            (steps, glyphs)
        };

        let (steps_a, glyphs_a) = run(100);
        let (steps_b, glyphs_b) = run(200);
        assert_eq!(steps_a, steps_b);
        assert_ne!(glyphs_a, glyphs_b);
    }

    #[test]
    fn empty_band_is_born_finished() {
        let s = RainStream::new(0, 7, 3, 4, 1);
        assert_eq!(s.end_row(), 7);
        assert!(s.is_finished());
    }
}

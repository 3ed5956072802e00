// Copyright (c) 2026 rezky_nightky

//! Title reveal: every visible letter gets its own stream pinned to the
//! letter's column, and the letter is left behind when that stream ends.
//! Filler rain runs on the other columns until all letters have landed.

use rand::Rng;
use tracing::{debug, info, trace};

use crate::error::{RainError, RainResult};
use crate::frame::Frame;
use crate::pool::ColumnPool;
use crate::scheduler::{Scheduler, SpawnPolicy};
use crate::stream::{DrawCtx, RainStream};

/// Upper-cases `text` and puts a space between letters, the way the titles
/// are meant to be shown: `"The Matrix"` becomes `"T H E   M A T R I X"`.
pub fn spaced(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for (i, ch) in text.chars().flat_map(char::to_uppercase).enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

#[derive(Clone, Debug)]
pub struct TitleChoreographer {
    pinned: Vec<RainStream>,
    fillers: Scheduler,
}

impl TitleChoreographer {
    /// Lays `title` out from (`origin_row`, `origin_col`); letters land on
    /// row `origin_row - 1`.
    ///
    /// Every column the title covers is claimed from `pool`, spaces included.
    /// Characters past the right edge are dropped. If any column is already
    /// owned the whole request fails and nothing is created. Roughly one
    /// filler stream is started per three columns left over.
    pub fn begin<R: Rng + ?Sized>(
        pool: &ColumnPool,
        title: &str,
        origin_row: u16,
        origin_col: u16,
        width: u16,
        policy: SpawnPolicy,
        rng: &mut R,
    ) -> RainResult<Self> {
        if origin_row == 0 || origin_row > policy.height {
            return Err(RainError::InvalidTitleOrigin {
                row: origin_row,
                height: policy.height,
            });
        }

        let mut pool = pool.clone();
        let mut letters = Vec::new();
        for (i, ch) in title.chars().enumerate() {
            let Some(col) = u16::try_from(i)
                .ok()
                .and_then(|i| origin_col.checked_add(i))
            else {
                break;
            };
            if col >= width {
                break;
            }
            pool.take(col)?;
            if ch != ' ' {
                letters.push((col, ch));
            }
        }

        let pinned: Vec<RainStream> = letters
            .into_iter()
            .map(|(col, ch)| policy.pinned_stream(col, origin_row, ch, rng))
            .collect();

        let filler_target = pool.len() / 3;
        let mut fillers = Scheduler::new(pool, filler_target, policy);
        fillers.replenish(rng);

        info!(
            letters = pinned.len(),
            fillers = filler_target,
            row = origin_row,
            col = origin_col,
            "title started"
        );

        let mut this = Self { pinned, fillers };
        this.sync_stop();
        Ok(this)
    }

    pub fn pinned_active(&self) -> usize {
        self.pinned.len()
    }

    pub fn filler_active(&self) -> usize {
        self.fillers.streams().len()
    }

    #[allow(dead_code)]
    pub fn pinned_streams(&self) -> &[RainStream] {
        &self.pinned
    }

    #[allow(dead_code)]
    pub fn fillers(&self) -> &Scheduler {
        &self.fillers
    }

    #[allow(dead_code)]
    pub fn stop_requested(&self) -> bool {
        self.fillers.stop_requested()
    }

    pub fn is_complete(&self) -> bool {
        self.pinned.is_empty() && self.fillers.is_idle()
    }

    /// One frame of the title. Once the last letter lands the fillers stop
    /// being replaced and drain out.
    pub fn tick<R: Rng + ?Sized>(&mut self, ctx: &DrawCtx<'_>, rng: &mut R, frame: &mut Frame) {
        self.pinned.retain_mut(|s| {
            if !s.advance(ctx, &mut *rng, frame) {
                return true;
            }
            trace!(column = s.column(), glyph = ?s.finish_glyph(), "title letter landed");
            false
        });
        self.sync_stop();
        self.fillers.tick(ctx, rng, frame);
    }

    fn sync_stop(&mut self) {
        if self.pinned.is_empty() && !self.fillers.stop_requested() {
            debug!("all title letters landed; stopping fillers");
            self.fillers.request_stop();
        }
    }
}

// Copyright (c) 2026 rezky_nightky

use rand::Rng;
use tracing::trace;

use crate::frame::Frame;
use crate::pool::ColumnPool;
use crate::stream::{DrawCtx, RainStream, StreamKind};

/// Random shape for a new stream on a grid of `height` rows.
///
/// Most streams start at the top and run to the bottom; the clamped ranges
/// let a minority start lower or stop early so they do not fall in lockstep.
#[derive(Clone, Copy, Debug)]
pub struct SpawnPolicy {
    pub height: u16,
    pub max_speed: u16,
}

impl SpawnPolicy {
    pub fn max_length<R: Rng + ?Sized>(&self, rng: &mut R) -> u16 {
        let h = self.height;
        rng.random_range(h / 2..=h).max(1)
    }

    pub fn speed<R: Rng + ?Sized>(&self, rng: &mut R) -> u16 {
        rng.random_range(1..=self.max_speed.max(1))
    }

    pub fn entry_row<R: Rng + ?Sized>(&self, rng: &mut R) -> u16 {
        let h = self.height as i32;
        rng.random_range(-h / 2..=h / 3).max(0) as u16
    }

    pub fn exit_row<R: Rng + ?Sized>(&self, rng: &mut R) -> u16 {
        let h = self.height as i32;
        rng.random_range(h / 2..=2 * h).min(h) as u16
    }

    pub fn free_stream<R: Rng + ?Sized>(&self, column: u16, rng: &mut R) -> RainStream {
        let start = self.entry_row(rng);
        let end = self.exit_row(rng);
        let len = self.max_length(rng);
        let speed = self.speed(rng);
        RainStream::new(column, start, end, len, speed)
    }

    pub fn pinned_stream<R: Rng + ?Sized>(
        &self,
        column: u16,
        end_row: u16,
        glyph: char,
        rng: &mut R,
    ) -> RainStream {
        let len = self.max_length(rng);
        let speed = self.speed(rng);
        RainStream::new(column, 0, end_row, len, speed).pinned(glyph)
    }
}

/// Advances free-roaming streams and keeps their number topped up from the pool.
#[derive(Clone, Debug)]
pub struct Scheduler {
    pool: ColumnPool,
    streams: Vec<RainStream>,
    target: usize,
    policy: SpawnPolicy,
    stop_requested: bool,
}

impl Scheduler {
    pub fn new(pool: ColumnPool, target: usize, policy: SpawnPolicy) -> Self {
        Self {
            pool,
            streams: Vec::with_capacity(target),
            target,
            policy,
            stop_requested: false,
        }
    }

    pub fn streams(&self) -> &[RainStream] {
        &self.streams
    }

    #[allow(dead_code)]
    pub fn pool(&self) -> &ColumnPool {
        &self.pool
    }

    pub fn is_idle(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// Lets live streams run out without replacing them.
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    /// One frame: advance every stream, retire the finished ones, then refill.
    pub fn tick<R: Rng + ?Sized>(&mut self, ctx: &DrawCtx<'_>, rng: &mut R, frame: &mut Frame) {
        let pool = &mut self.pool;
        self.streams.retain_mut(|s| {
            if !s.advance(ctx, &mut *rng, frame) {
                return true;
            }
            if s.kind() == StreamKind::Free {
                pool.release(s.column());
            }
            trace!(column = s.column(), head = s.head(), tail = s.tail(), "stream finished");
            false
        });

        if !self.stop_requested {
            self.replenish(rng);
        }
    }

    /// Spawns streams until the target is met or the pool runs dry.
    pub fn replenish<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        while self.streams.len() < self.target {
            match self.pool.draw(rng) {
                Ok(column) => {
                    let s = self.policy.free_stream(column, rng);
                    trace!(
                        column,
                        start = s.start_row(),
                        end = s.end_row(),
                        len = s.max_length(),
                        speed = s.speed(),
                        "stream spawned"
                    );
                    self.streams.push(s);
                }
                Err(e) => {
                    trace!(%e, "spawn skipped");
                    break;
                }
            }
        }
    }
}

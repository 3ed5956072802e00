// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::{Cell, Style};
use crate::frame::Frame;

/// What the terminal is currently set to, so unchanged attributes are not re-sent.
#[derive(Clone, Copy, Default)]
struct Pen {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
    reverse: bool,
}

pub struct Terminal {
    stdout: Stdout,
    last: Option<(u16, u16, Vec<Cell>)>,
    order: Vec<usize>,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            last: None,
            order: Vec::new(),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    fn pen_to(&mut self, pen: &mut Pen, style: Style, bg: Option<Color>) -> Result<()> {
        if style.fg != pen.fg {
            self.stdout
                .queue(SetForegroundColor(style.fg.unwrap_or(Color::Reset)))?;
            pen.fg = style.fg;
        }
        if bg != pen.bg {
            self.stdout
                .queue(SetBackgroundColor(bg.unwrap_or(Color::Reset)))?;
            pen.bg = bg;
        }
        if style.bold != pen.bold {
            self.stdout.queue(SetAttribute(if style.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
            pen.bold = style.bold;
        }
        if style.reverse != pen.reverse {
            self.stdout.queue(SetAttribute(if style.reverse {
                Attribute::Reverse
            } else {
                Attribute::NoReverse
            }))?;
            pen.reverse = style.reverse;
        }
        Ok(())
    }

    /// Commits the frame: repaints everything after a clear or size change,
    /// otherwise only the cells that differ from what is on screen.
    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let mut pen = Pen::default();
        let (w, h) = (frame.width, frame.height);
        let len = w as usize * h as usize;

        let same_size = matches!(&self.last, Some((lw, lh, _)) if *lw == w && *lh == h);
        let full = !same_size || frame.is_dirty_all();

        let mut last = match self.last.take() {
            Some((lw, lh, cells)) if lw == w && lh == h => cells,
            _ => vec![Cell::blank_with_bg(None); len],
        };

        if full {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
            for y in 0..h {
                self.stdout.queue(cursor::MoveTo(0, y))?;
                for x in 0..w {
                    let idx = y as usize * w as usize + x as usize;
                    let cell = frame.cell_at_index(idx);
                    self.pen_to(&mut pen, cell.style, cell.bg)?;
                    self.stdout.queue(Print(cell.ch))?;
                    last[idx] = cell;
                }
            }
        } else {
            self.order.clear();
            self.order.extend_from_slice(frame.dirty_indices());
            self.order.sort_unstable();

            let mut cursor_at: Option<usize> = None;
            for i in 0..self.order.len() {
                let idx = self.order[i];
                let cell = frame.cell_at_index(idx);
                if last.get(idx) == Some(&cell) {
                    continue;
                }
                last[idx] = cell;

                if cursor_at != Some(idx) {
                    let x = (idx % w as usize) as u16;
                    let y = (idx / w as usize) as u16;
                    self.stdout.queue(cursor::MoveTo(x, y))?;
                }
                self.pen_to(&mut pen, cell.style, cell.bg)?;
                self.stdout.queue(Print(cell.ch))?;
                cursor_at = if (idx + 1) % w as usize == 0 {
                    None
                } else {
                    Some(idx + 1)
                };
            }
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        self.last = Some((w, h, last));
        frame.clear_dirty();
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.stdout.execute(SetAttribute(Attribute::Reset));
        let _ = self.stdout.execute(ResetColor);
        let _ = self.stdout.execute(cursor::Show);
        let _ = self.stdout.execute(terminal::EnableLineWrap);
        let _ = self.stdout.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        let _ = self.stdout.flush();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

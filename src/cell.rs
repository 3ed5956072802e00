// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

/// Foreground attributes for one glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Style {
    pub fg: Option<Color>,
    pub bold: bool,
    pub reverse: bool,
}

impl Style {
    pub const NEUTRAL: Style = Style {
        fg: None,
        bold: false,
        reverse: false,
    };

    pub fn fg(color: Color) -> Self {
        Self {
            fg: Some(color),
            ..Self::NEUTRAL
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
    pub bg: Option<Color>,
}

impl Cell {
    pub fn blank_with_bg(bg: Option<Color>) -> Self {
        Self {
            ch: ' ',
            style: Style::NEUTRAL,
            bg,
        }
    }
}

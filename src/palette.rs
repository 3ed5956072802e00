// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::Style;
use crate::runtime::{ColorMode, HeadStyle};

/// Brightest gradient level. Levels run `0..=GRADIENT_TOP`.
pub const GRADIENT_TOP: i32 = 45;

/// Green step between adjacent levels, in thousandths of full intensity.
const GRADIENT_STEP: u32 = 20;

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = (r0 as i32) - (r1 as i32);
    let dg = (g0 as i32) - (g1 as i32);
    let db = (b0 as i32) - (b1 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let r6 = ((r as u16 * 5) + 127) / 255;
    let g6 = ((g as u16 * 5) + 127) / 255;
    let b6 = ((b as u16 * 5) + 127) / 255;

    let cr = CUBE_LEVELS[r6 as usize];
    let cg = CUBE_LEVELS[g6 as usize];
    let cb = CUBE_LEVELS[b6 as usize];
    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);
    let cube_dist = dist2(r, g, b, cr, cg, cb);

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let gray_idx = if avg < 8 {
        16
    } else if avg > 238 {
        231
    } else {
        232 + ((avg - 8) / 10)
    };
    let (gr, gg, gb) = if gray_idx == 16 {
        (0, 0, 0)
    } else if gray_idx == 231 {
        (255, 255, 255)
    } else {
        let v = 8 + 10 * (gray_idx - 232);
        (v, v, v)
    };
    let gray_dist = dist2(r, g, b, gr, gg, gb);

    if gray_dist < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_color(mode: ColorMode, r: u8, g: u8, b: u8) -> Color {
    match mode {
        ColorMode::TrueColor => Color::Rgb { r, g, b },
        _ => Color::AnsiValue(rgb_to_ansi256(r, g, b)),
    }
}

/// Green ramp from dim (level 0) to full (level `GRADIENT_TOP`).
fn green_gradient(mode: ColorMode) -> Vec<Color> {
    let floor = 1000 - GRADIENT_STEP * GRADIENT_TOP as u32;
    (0..=GRADIENT_TOP as u32)
        .map(|i| {
            let permille = floor + GRADIENT_STEP * i;
            let g = ((permille * 255 + 500) / 1000).min(255) as u8;
            rgb_color(mode, 0, g, 0)
        })
        .collect()
}

/// Maps a distance from a stream's head to a render style.
///
/// Negotiated once per session: either a continuous green gradient or the
/// two-level plain/bold fallback.
#[derive(Clone, Debug)]
pub struct Palette {
    pub mode: ColorMode,
    pub bg: Option<Color>,
    gradient: Vec<Color>,
}

impl Palette {
    pub fn new(mode: ColorMode, default_background: bool) -> Self {
        let bg = if default_background {
            None
        } else {
            Some(match mode {
                ColorMode::Color16 => Color::Black,
                ColorMode::TrueColor => Color::Rgb { r: 0, g: 0, b: 0 },
                _ => Color::AnsiValue(16),
            })
        };

        let gradient = if mode.has_continuous_palette() {
            green_gradient(mode)
        } else {
            Vec::new()
        };

        Self { mode, bg, gradient }
    }

    pub fn has_continuous_palette(&self) -> bool {
        !self.gradient.is_empty()
    }

    /// Gradient cell for `level`, clamped to `0..=GRADIENT_TOP`.
    /// Without a continuous palette this degrades to the bold body style.
    pub fn style_for(&self, level: i32) -> Style {
        let idx = level.clamp(0, GRADIENT_TOP) as usize;
        match self.gradient.get(idx) {
            Some(&c) => Style::fg(c),
            None => self.body_bold(),
        }
    }

    pub fn body_plain(&self) -> Style {
        match self.mode {
            ColorMode::Mono => Style::NEUTRAL,
            _ => Style::fg(Color::DarkGreen),
        }
    }

    pub fn body_bold(&self) -> Style {
        self.body_plain().bold()
    }

    pub fn head(&self, variant: HeadStyle) -> Style {
        let base = match self.mode {
            ColorMode::Mono => Style::NEUTRAL,
            ColorMode::TrueColor => Style::fg(Color::Rgb {
                r: 255,
                g: 255,
                b: 255,
            }),
            _ => Style::fg(Color::White),
        };
        match variant {
            HeadStyle::Bold => base.bold(),
            HeadStyle::Standout => base.reverse(),
        }
    }
}

/// Gradient level of a body cell at `row` for a head at `head`.
pub fn gradient_level(head: i32, row: i32) -> i32 {
    (GRADIENT_TOP - (head - row) + 1).clamp(0, GRADIENT_TOP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_has_one_color_per_level_and_brightens() {
        let p = Palette::new(ColorMode::TrueColor, false);
        assert!(p.has_continuous_palette());
        let dim = p.style_for(0).fg;
        let bright = p.style_for(GRADIENT_TOP).fg;
        assert_eq!(dim, Some(Color::Rgb { r: 0, g: 26, b: 0 }));
        assert_eq!(bright, Some(Color::Rgb { r: 0, g: 255, b: 0 }));
    }

    #[test]
    fn style_for_clamps_out_of_range_levels() {
        let p = Palette::new(ColorMode::TrueColor, false);
        assert_eq!(p.style_for(-10), p.style_for(0));
        assert_eq!(p.style_for(GRADIENT_TOP + 5), p.style_for(GRADIENT_TOP));
    }

    #[test]
    fn fallback_palette_uses_two_levels() {
        let p = Palette::new(ColorMode::Color16, false);
        assert!(!p.has_continuous_palette());
        assert!(!p.body_plain().bold);
        assert!(p.body_bold().bold);
        assert_eq!(p.body_plain().fg, p.body_bold().fg);
    }

    #[test]
    fn head_variants_differ() {
        let p = Palette::new(ColorMode::Color256, true);
        assert!(p.head(HeadStyle::Bold).bold);
        assert!(p.head(HeadStyle::Standout).reverse);
        assert_eq!(p.bg, None);
    }

    #[test]
    fn level_is_brightest_next_to_head() {
        assert_eq!(gradient_level(10, 9), GRADIENT_TOP);
        assert_eq!(gradient_level(10, 8), GRADIENT_TOP - 1);
        assert_eq!(gradient_level(100, 0), 0);
    }
}

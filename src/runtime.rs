// Copyright (c) 2026 rezky_nightky

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

impl ColorMode {
    /// Whether the terminal can show the many-level green gradient.
    pub fn has_continuous_palette(self) -> bool {
        matches!(self, ColorMode::Color256 | ColorMode::TrueColor)
    }

    pub fn label(self) -> &'static str {
        match self {
            ColorMode::TrueColor => "24-bit truecolor",
            ColorMode::Color256 => "8-bit (256-color)",
            ColorMode::Color16 => "16-color",
            ColorMode::Mono => "mono",
        }
    }
}

/// How the leading glyph of a stream stands out from its body.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeadStyle {
    #[value(name = "bold")]
    Bold,
    #[value(name = "standout")]
    Standout,
}

impl HeadStyle {
    pub fn toggled(self) -> Self {
        match self {
            HeadStyle::Bold => HeadStyle::Standout,
            HeadStyle::Standout => HeadStyle::Bold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_style_toggle_cycles_both_variants() {
        assert_eq!(HeadStyle::Bold.toggled(), HeadStyle::Standout);
        assert_eq!(HeadStyle::Bold.toggled().toggled(), HeadStyle::Bold);
    }

    #[test]
    fn only_256_and_truecolor_are_continuous() {
        assert!(ColorMode::TrueColor.has_continuous_palette());
        assert!(ColorMode::Color256.has_continuous_palette());
        assert!(!ColorMode::Color16.has_continuous_palette());
        assert!(!ColorMode::Mono.has_continuous_palette());
    }
}

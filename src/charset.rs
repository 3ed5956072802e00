// Copyright (c) 2026 rezky_nightky

use std::char;

use rand::seq::IndexedRandom;
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Charset(u32);

impl Charset {
    pub const ASCII_PRINTABLE: Charset = Charset(0x1);
    pub const KATAKANA: Charset = Charset(0x2);
    pub const DIGITS: Charset = Charset(0x4);
    pub const BINARY: Charset = Charset(0x8);
    pub const HEX: Charset = Charset(0x10);

    pub const MATRIX: Charset = Charset(0x3);

    pub fn contains(self, other: Charset) -> bool {
        (self.0 & other.0) != 0
    }
}

pub fn charset_from_str(spec: &str) -> Result<Charset, String> {
    let spec = spec.trim().to_ascii_lowercase();
    match spec.as_str() {
        "matrix" => Ok(Charset::MATRIX),
        "ascii" => Ok(Charset::ASCII_PRINTABLE),
        "katakana" => Ok(Charset::KATAKANA),
        "digits" | "dec" | "decimal" => Ok(Charset::DIGITS),
        "bin" | "binary" | "01" => Ok(Charset::BINARY),
        "hex" | "hexadecimal" => Ok(Charset::HEX),
        _ => Err(format!(
            "unsupported charset: {} (see --list-charsets)",
            spec
        )),
    }
}

fn push_range(out: &mut Vec<char>, start: u32, end: u32) {
    for v in start..=end {
        if let Some(ch) = char::from_u32(v) {
            out.push(ch);
        }
    }
}

/// Supplies a random displayable glyph each time it is asked.
#[derive(Clone, Debug)]
pub struct Glyphs {
    chars: Vec<char>,
}

impl Glyphs {
    pub fn new(charset: Charset) -> Self {
        let mut out: Vec<char> = Vec::new();

        if charset.contains(Charset::ASCII_PRINTABLE) {
            // '!' through '}'
            push_range(&mut out, 0x21, 0x7D);
        }
        if charset.contains(Charset::KATAKANA) {
            // half-width forms
            push_range(&mut out, 0xFF66, 0xFF9C);
        }
        if charset.contains(Charset::DIGITS) {
            push_range(&mut out, 0x30, 0x39);
        }
        if charset.contains(Charset::BINARY) {
            push_range(&mut out, 0x30, 0x31);
        }
        if charset.contains(Charset::HEX) {
            push_range(&mut out, 0x30, 0x39);
            push_range(&mut out, 0x41, 0x46);
        }

        if out.is_empty() {
            out.push('0');
            out.push('1');
        }

        Self { chars: out }
    }

    pub fn matrix() -> Self {
        Self::new(Charset::MATRIX)
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> char {
        self.chars.choose(rng).copied().unwrap_or('0')
    }

    #[allow(dead_code)]
    pub fn as_slice(&self) -> &[char] {
        &self.chars
    }
}

pub fn print_list_charsets() {
    println!("AVAILABLE CHARSET PRESETS:");
    println!();
    println!("VALUE        DESCRIPTION");
    println!("matrix       Printable ASCII + half-width katakana (default)");
    println!("ascii        Printable ASCII only");
    println!("katakana     Half-width katakana only");
    println!("digits       Digits only (aliases: dec, decimal)");
    println!("binary       0 and 1 (aliases: bin, 01)");
    println!("hex          0-9 and A-F (alias: hexadecimal)");
}

// Copyright (c) 2026 rezky_nightky

use thiserror::Error;

/// Failures raised by the rain core.
///
/// Only `ColumnAlreadyOwned` and `InvalidTitleOrigin` are meant to reach the
/// user; the rest are handled where they occur.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RainError {
    /// No free column left when a spawn was attempted.
    #[error("column pool exhausted")]
    ColumnPoolExhausted,

    /// A title tried to pin a column another stream already holds.
    #[error("column {0} is already owned by another stream")]
    ColumnAlreadyOwned(u16),

    /// A cell write landed outside the grid.
    #[error("cell ({row}, {col}) is outside the grid")]
    OutOfBounds { row: u16, col: u16 },

    /// The title row does not fit on the grid.
    #[error("title row {row} does not fit a grid of height {height}")]
    InvalidTitleOrigin { row: u16, height: u16 },
}

pub type RainResult<T> = std::result::Result<T, RainError>;

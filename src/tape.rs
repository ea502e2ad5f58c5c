//! The memory tape.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;

/// Cells allocated when no size is configured.
pub const DEFAULT_TAPE_SIZE: usize = 30_000;

/// A validated, non-zero tape length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "usize")]
pub struct TapeSize(NonZeroUsize);

impl TapeSize {
    /// A single cell.
    pub const MIN: TapeSize = TapeSize(NonZeroUsize::MIN);

    pub fn new(cells: usize) -> Result<Self, ConfigError> {
        NonZeroUsize::new(cells).map(Self).ok_or(ConfigError::ZeroTapeSize)
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for TapeSize {
    fn default() -> Self {
        Self(const { NonZeroUsize::new(DEFAULT_TAPE_SIZE).unwrap() })
    }
}

impl TryFrom<usize> for TapeSize {
    type Error = ConfigError;

    fn try_from(cells: usize) -> Result<Self, Self::Error> {
        Self::new(cells)
    }
}

impl FromStr for TapeSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cells = s
            .trim()
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidTapeSize(s.to_string()))?;
        Self::new(cells)
    }
}

impl fmt::Display for TapeSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed-length array of zero-initialised byte cells. Never resized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Box<[u8]>,
}

impl Tape {
    pub fn new(size: TapeSize) -> Self {
        Self { cells: vec![0; size.get()].into_boxed_slice() }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Index of the last cell.
    pub fn last_index(&self) -> usize {
        self.cells.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<u8> {
        self.cells.get(index).copied()
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub(crate) fn cell_mut(&mut self, index: usize) -> &mut u8 {
        &mut self.cells[index]
    }

    /// Zero every cell.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new(TapeSize::default())
    }
}

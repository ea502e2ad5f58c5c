//! Program source: an immutable byte sequence loaded once.

use std::fs;
use std::path::Path;

use crate::error::Error;

/// One of the eight meaningful bytes. Everything else is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Right,
    Left,
    Inc,
    Dec,
    Input,
    Output,
    LoopStart,
    LoopEnd,
}

impl Instruction {
    /// Decode a source byte. Returns `None` for inert bytes.
    pub fn decode(byte: u8) -> Option<Self> {
        match byte {
            b'>' => Some(Instruction::Right),
            b'<' => Some(Instruction::Left),
            b'+' => Some(Instruction::Inc),
            b'-' => Some(Instruction::Dec),
            b',' => Some(Instruction::Input),
            b'.' => Some(Instruction::Output),
            b'[' => Some(Instruction::LoopStart),
            b']' => Some(Instruction::LoopEnd),
            _ => None,
        }
    }
}

/// 1-based line/column of a byte in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

/// Program bytes, read-only after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    bytes: Box<[u8]>,
}

impl Program {
    pub fn new(bytes: impl Into<Box<[u8]>>) -> Self {
        Self { bytes: bytes.into() }
    }

    /// Load program bytes from `path`. Non-UTF-8 content is accepted as is.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| Error::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), len = bytes.len(), "loaded program source");
        Ok(Self::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Map a byte index to its line and column.
    ///
    /// Indices past the end map to the position just after the last byte.
    pub fn location(&self, offset: usize) -> Location {
        let end = offset.min(self.bytes.len());
        let head = &self.bytes[..end];
        let line = head.iter().filter(|&&b| b == b'\n').count() + 1;
        let line_start = head.iter().rposition(|&b| b == b'\n').map_or(0, |nl| nl + 1);
        Location { line, column: end - line_start + 1 }
    }

    /// The full source line containing `offset`, without its newline.
    pub fn line_at(&self, offset: usize) -> &[u8] {
        let end = offset.min(self.bytes.len());
        let start = self.bytes[..end].iter().rposition(|&b| b == b'\n').map_or(0, |nl| nl + 1);
        let stop = self.bytes[end..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(self.bytes.len(), |nl| end + nl);
        &self.bytes[start..stop]
    }
}

impl From<&str> for Program {
    fn from(code: &str) -> Self {
        Self::new(code.as_bytes())
    }
}

impl From<Vec<u8>> for Program {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

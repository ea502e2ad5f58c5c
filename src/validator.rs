//! Bracket validation and the bracket-match table.
//!
//! A single left-to-right pass checks balance and, for balanced programs,
//! records the partner of every bracket so the executor can jump in O(1).

use crate::error::ValidationError;
use crate::program::Program;

/// Check that every `[` has a later matching `]` and vice versa.
///
/// Fails fast on the first stray `]`. Read-only.
pub fn validate(program: &Program) -> Result<(), ValidationError> {
    analyze(program).map(|_| ())
}

/// Validate `program` and build its bracket-match table in the same pass.
pub fn analyze(program: &Program) -> Result<BracketMap, ValidationError> {
    let bytes = program.as_bytes();
    let mut partners: Vec<Option<usize>> = vec![None; bytes.len()];
    // Open bracket positions; its length is the nesting counter.
    let mut open: Vec<usize> = Vec::new();
    let mut line = 1usize;
    let mut line_start = 0usize;

    for (i, &byte) in bytes.iter().enumerate() {
        match byte {
            b'[' => open.push(i),
            b']' => {
                let Some(start) = open.pop() else {
                    let err = ValidationError::UnmatchedClose {
                        line,
                        column: i - line_start + 1,
                        offset: i,
                    };
                    tracing::debug!(%err, "validation failed");
                    return Err(err);
                };
                partners[start] = Some(i);
                partners[i] = Some(start);
            }
            b'\n' => {
                line += 1;
                line_start = i + 1;
            }
            _ => {}
        }
    }

    if let Some(&first) = open.first() {
        let err = ValidationError::UnmatchedOpen { count: open.len(), offset: first };
        tracing::debug!(%err, "validation failed");
        return Err(err);
    }

    Ok(BracketMap { partners })
}

/// Partner index for each bracket in a validated program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketMap {
    partners: Vec<Option<usize>>,
}

impl BracketMap {
    /// Index of the bracket matching the one at `index`, or `None` if
    /// `index` is not a bracket.
    pub fn partner(&self, index: usize) -> Option<usize> {
        self.partners.get(index).copied().flatten()
    }

    /// Number of matched pairs.
    pub fn pairs(&self) -> usize {
        self.partners.iter().filter(|p| p.is_some()).count() / 2
    }
}

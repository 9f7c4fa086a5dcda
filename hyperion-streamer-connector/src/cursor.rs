//! Cursor management and ordering validation.

use crate::{actions::ActionsPage, error::StreamError};
use serde_json::value::RawValue;
use std::fmt;

/// Upper bound rendered for [`UpperBound::Unbounded`]; the largest value the
/// indexer accepts in a `global_sequence` range.
const UNBOUNDED_WIRE_VALUE: u64 = i64::MAX as u64;

/// The upper end of the requested `global_sequence` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpperBound {
    /// No upper limit: follow the head of the chain.
    #[default]
    Unbounded,
}

impl fmt::Display for UpperBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpperBound::Unbounded => write!(f, "{UNBOUNDED_WIRE_VALUE}"),
        }
    }
}

/// The position of a stream in the global action log.
///
/// `lower_bound` is the highest global sequence already delivered to the
/// consumer. It only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    lower_bound: u64,
    upper_bound: UpperBound,
}

/// A group of actions fetched in one cycle, tagged with the highest
/// sequence it contains.
#[derive(Debug, Clone)]
pub struct Batch {
    pub head_global_sequence: u64,
    pub head_block: u32,
    pub actions: Vec<Box<RawValue>>,
}

/// Outcome of validating one page against the cursor.
#[derive(Debug)]
pub enum Progress {
    /// The page moved the cursor forward; the batch must be emitted.
    Advanced(Batch),
    /// Empty page, or nothing beyond the current lower bound.
    CaughtUp,
}

impl Cursor {
    /// Starts a cursor after `from`; the first query asks for `from + 1`.
    pub fn resume_from(from: u64) -> Self {
        Self {
            lower_bound: from,
            upper_bound: UpperBound::Unbounded,
        }
    }

    pub fn lower_bound(&self) -> u64 {
        self.lower_bound
    }

    /// The `global_sequence` query term, e.g. `101-9223372036854775807`.
    pub fn range(&self) -> String {
        format!("{}-{}", self.lower_bound.saturating_add(1), self.upper_bound)
    }

    /// Validates a page and advances the cursor when it carries new actions.
    ///
    /// The head is the maximum sequence in the page; the first action holding
    /// it provides the head block. A head below the lower bound means the node
    /// returned data outside the requested range and is fatal.
    pub fn evaluate(&mut self, page: ActionsPage) -> Result<Progress, StreamError> {
        if page.actions.is_empty() {
            return Ok(Progress::CaughtUp);
        }

        let mut head_global_sequence = 0;
        let mut head_block = 0;
        let mut actions = Vec::with_capacity(page.actions.len());
        for action in page.actions {
            if action.global_sequence > head_global_sequence {
                head_global_sequence = action.global_sequence;
                head_block = action.block_num;
            }
            actions.push(action.act);
        }

        if head_global_sequence == self.lower_bound {
            return Ok(Progress::CaughtUp);
        }
        if head_global_sequence < self.lower_bound {
            return Err(StreamError::OrderingViolation {
                head: head_global_sequence,
                lower_bound: self.lower_bound,
            });
        }

        self.lower_bound = head_global_sequence;
        Ok(Progress::Advanced(Batch {
            head_global_sequence,
            head_block,
            actions,
        }))
    }
}

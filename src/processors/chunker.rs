use chrono::{Duration, NaiveDate};

use crate::error::{FetchError, Result};
use crate::models::{Chunk, DateRange};

/// Split `[start, end]` into consecutive chunks of at most `max_span_days`.
///
/// The returned iterator is lazy and can be cloned to replay the plan.
pub fn chunk(start: NaiveDate, end: NaiveDate, max_span_days: i64) -> Result<Chunks> {
    if start > end {
        return Err(FetchError::InvertedRange { start, end });
    }
    if max_span_days < 1 {
        return Err(FetchError::InvalidRange {
            start,
            end,
            max_span_days,
        });
    }

    Ok(Chunks {
        cursor: Some(start),
        end,
        span: max_span_days,
        next_index: 0,
    })
}

/// Chunk an already validated range.
pub fn chunk_range(range: &DateRange, max_span_days: i64) -> Result<Chunks> {
    chunk(range.start(), range.end(), max_span_days)
}

#[derive(Debug, Clone)]
pub struct Chunks {
    cursor: Option<NaiveDate>,
    end: NaiveDate,
    span: i64,
    next_index: usize,
}

impl Iterator for Chunks {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        let start = self.cursor.filter(|cursor| *cursor <= self.end)?;

        let chunk_end = Duration::try_days(self.span - 1)
            .and_then(|span| start.checked_add_signed(span))
            .map_or(self.end, |candidate| candidate.min(self.end));

        // start <= chunk_end holds by construction
        let range = DateRange::new(start, chunk_end).ok()?;
        let chunk = Chunk {
            index: self.next_index,
            range,
        };

        self.next_index += 1;
        self.cursor = chunk_end.succ_opt();
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.cursor {
            Some(cursor) if cursor <= self.end => {
                let days = (self.end - cursor).num_days() + 1;
                (days / self.span + i64::from(days % self.span != 0)) as usize
            }
            _ => 0,
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Chunks {}

impl std::iter::FusedIterator for Chunks {}

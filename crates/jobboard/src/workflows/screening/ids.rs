//! Identifier allocation for stored question responses.
//!
//! [`next_id`] derives the next identifier from a snapshot of existing ones. Live
//! submissions go through [`ResponseIdSequence`], which serializes allocation behind a
//! lock so two reconciliations can never observe the same high-water mark.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::domain::QuestionResponseId;

pub const DEFAULT_RESPONSE_ID_PREFIX: &str = "QRS";
pub const DEFAULT_RESPONSE_ID_WIDTH: usize = 7;

/// Source of fresh response identifiers consumed by the reconciler.
pub trait ResponseIdSource {
    fn next_response_id(&mut self) -> QuestionResponseId;
}

/// Highest numeric suffix among `existing` ids shaped like `prefix` + `width` characters.
///
/// Ids with a non-numeric suffix count as zero.
pub fn highest_suffix<I, S>(existing: I, prefix: &str, width: usize) -> u64
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    existing
        .into_iter()
        .filter_map(|id| {
            let id = id.as_ref();
            if id.len() != prefix.len() + width {
                return None;
            }
            id.strip_prefix(prefix).map(parse_suffix)
        })
        .max()
        .unwrap_or(0)
}

fn parse_suffix(suffix: &str) -> u64 {
    if !suffix.bytes().all(|byte| byte.is_ascii_digit()) {
        return 0;
    }
    suffix.parse().unwrap_or(0)
}

pub fn format_id(prefix: &str, width: usize, value: u64) -> String {
    format!("{prefix}{value:0width$}")
}

/// Next identifier after every matching id in `existing`.
///
/// `next_id(&[], "QRS", 7)` is `"QRS0000001"`.
pub fn next_id<I, S>(existing: I, prefix: &str, width: usize) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let highest = highest_suffix(existing, prefix, width);
    format_id(prefix, width, highest.saturating_add(1))
}

/// Scan-based allocator over an in-memory id snapshot.
///
/// Each issued id joins the snapshot, so repeated calls never repeat themselves. It is not
/// shared across threads; use [`ResponseIdSequence`] for live allocation.
#[derive(Debug, Clone)]
pub struct SequentialIdAllocator {
    prefix: String,
    width: usize,
    issued: BTreeSet<String>,
}

impl SequentialIdAllocator {
    pub fn new(prefix: impl Into<String>, width: usize) -> Self {
        Self::with_existing(prefix, width, BTreeSet::new())
    }

    pub fn with_existing(
        prefix: impl Into<String>,
        width: usize,
        existing: BTreeSet<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            width,
            issued: existing,
        }
    }
}

impl ResponseIdSource for SequentialIdAllocator {
    fn next_response_id(&mut self) -> QuestionResponseId {
        let id = next_id(&self.issued, &self.prefix, self.width);
        self.issued.insert(id.clone());
        QuestionResponseId(id)
    }
}

/// Process-wide response id sequence.
///
/// The high-water mark is seeded from the store on first use and then advanced only by
/// committed leases.
#[derive(Debug)]
pub struct ResponseIdSequence {
    prefix: String,
    width: usize,
    high_water: Mutex<Option<u64>>,
}

impl Default for ResponseIdSequence {
    fn default() -> Self {
        Self::new(DEFAULT_RESPONSE_ID_PREFIX, DEFAULT_RESPONSE_ID_WIDTH)
    }
}

impl ResponseIdSequence {
    pub fn new(prefix: impl Into<String>, width: usize) -> Self {
        Self {
            prefix: prefix.into(),
            width,
            high_water: Mutex::new(None),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Take exclusive ownership of the sequence until the lease is committed or dropped.
    ///
    /// `seed` is only called when the sequence has no high-water mark yet.
    pub fn lease<E, F>(&self, seed: F) -> Result<ResponseIdLease<'_>, E>
    where
        F: FnOnce() -> Result<BTreeSet<String>, E>,
    {
        let mut guard = self.lock();
        let start = match *guard {
            Some(mark) => mark,
            None => {
                let existing = seed()?;
                let mark = highest_suffix(&existing, &self.prefix, self.width);
                *guard = Some(mark);
                mark
            }
        };

        Ok(ResponseIdLease {
            guard,
            prefix: &self.prefix,
            width: self.width,
            current: start,
        })
    }

    /// Forget the high-water mark so the next lease reseeds from the store.
    pub fn invalidate(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> MutexGuard<'_, Option<u64>> {
        // the guarded value is a plain counter, so a poisoned lock is still consistent
        self.high_water.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exclusive handle on [`ResponseIdSequence`].
///
/// Ids drawn from an uncommitted lease are handed out again by the next lease.
#[derive(Debug)]
pub struct ResponseIdLease<'a> {
    guard: MutexGuard<'a, Option<u64>>,
    prefix: &'a str,
    width: usize,
    current: u64,
}

impl ResponseIdLease<'_> {
    pub fn issued(&self) -> u64 {
        self.current - (*self.guard).unwrap_or(0)
    }

    pub fn commit(mut self) {
        *self.guard = Some(self.current);
    }
}

impl ResponseIdSource for ResponseIdLease<'_> {
    fn next_response_id(&mut self) -> QuestionResponseId {
        self.current = self.current.saturating_add(1);
        QuestionResponseId(format_id(self.prefix, self.width, self.current))
    }
}

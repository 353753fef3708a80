//! Unique ids for timers and cards.
//!
//! An id is the creation time in base-36 milliseconds, a `-`, and a base-36
//! sequence number. Ids of stored records come from [`IdGenerator::next_tracked`],
//! which advances a high-water mark kept in the persisted state, so a fresh
//! process (or a clock that steps backwards) never re-issues one.

use std::cell::Cell;

use chrono::{DateTime, Utc};

#[derive(Debug, Default)]
pub struct IdGenerator {
    seq: Cell<u64>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provisional id, unique within this process only.
    pub fn next_id(&self, now: DateTime<Utc>) -> String {
        let seq = self.seq.get();
        self.seq.set(seq.saturating_add(1));
        format_id(now, seq)
    }

    /// Id above both the local sequence and `high_water`, which is bumped past it.
    /// Callers persist `high_water` alongside the record the id names.
    pub fn next_tracked(&self, now: DateTime<Utc>, high_water: &mut u64) -> String {
        let seq = self.seq.get().max(*high_water);
        let next = seq.saturating_add(1);
        self.seq.set(next);
        *high_water = next;
        format_id(now, seq)
    }
}

fn format_id(now: DateTime<Utc>, seq: u64) -> String {
    let millis = now.timestamp_millis().max(0) as u64;
    format!("{}-{:0>4}", to_base36(millis), to_base36(seq))
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    // DIGITS is ASCII.
    String::from_utf8(out).unwrap_or_default()
}

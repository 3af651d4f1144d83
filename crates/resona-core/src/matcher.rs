//! Offset-vote matching
//!
//! Each matched hash votes for a (recording, offset) pair, where offset is
//! the anchor frame in the recording minus the anchor frame in the query.
//! A genuine match concentrates votes on one pair; collision noise spreads
//! thinly over many. Offsets go negative when the query extends before the
//! indexed start.

use std::collections::HashMap;

use crate::fingerprint::Fingerprint;
use crate::index::{HashIndex, RecordingId};

/// The winning (recording, alignment) pair and its vote count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub recording: RecordingId,
    /// Alignment in frames: t_db - t_query
    pub offset: i64,
    /// Query fingerprints voting for this alignment
    pub score: u64,
}

/// Find the (recording, offset) pair with the strongest consistent vote.
///
/// Single pass over the query; buckets are streamed and counters bumped in
/// place, never materializing the query x bucket product. Ties resolve to
/// the pair whose first vote arrived earliest, making the result
/// deterministic for a fixed query and index.
pub fn best_alignment(query: &[Fingerprint], index: &HashIndex) -> Option<Candidate> {
    // vote count plus the arrival sequence of the pair's first vote
    let mut votes: HashMap<(RecordingId, i64), (u64, u64)> = HashMap::new();
    let mut sequence = 0u64;

    for fp in query {
        for posting in index.lookup(&fp.key) {
            let offset = posting.anchor as i64 - fp.anchor as i64;
            let entry = votes.entry((posting.recording, offset)).or_insert_with(|| {
                let seq = sequence;
                sequence += 1;
                (0, seq)
            });
            entry.0 += 1;
        }
    }

    votes
        .into_iter()
        .map(|((recording, offset), (score, seq))| {
            (score, std::cmp::Reverse(seq), recording, offset)
        })
        .max()
        .map(|(score, _, recording, offset)| Candidate {
            recording,
            offset,
            score,
        })
}

// Candidate classification: pass 1 of the two-pass emitter.
//
// Walks one reference-hit group in input order and decides the fate of each
// candidate record before any SAM field is computed: emit it, suppress it in
// favor of a later candidate, or emit it with one or both mates forced
// unmapped. A candidate gets the forced treatment only when it is the
// read's last chance, i.e. every other candidate of the group has been
// suppressed. This guarantees at least one outcome per read is ultimately
// emitted.

use crate::hsp::{HitGroup, Hsp, MateSlot, Record};
use crate::pairing;

/// Outcome of pass 1 for one candidate record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFate {
    /// Skip the record entirely; a later candidate resolves the read.
    Suppress,
    /// Emit the record, overriding the flagged mates to unmapped.
    Emit { force_unmapped: [bool; 2] },
}

/// Classify every candidate of one group.
///
/// `min_align_len` == 0 disables the minimum-length policy; the
/// improper-pair deferral applies regardless.
pub fn classify_group(group: &HitGroup<'_>, min_align_len: i32) -> Vec<RecordFate> {
    let total = group.records.len();
    let mut fates = Vec::with_capacity(total);
    let mut suppressed = 0usize;

    for record in &group.records {
        // Only reachable on the final record: every other candidate of the
        // group has been suppressed.
        let last_chance = suppressed + 1 == total;

        let mut force_unmapped = [false; 2];
        if min_align_len > 0 {
            match min_len_fate(record, min_align_len, last_chance) {
                Some(force) => force_unmapped = force,
                None => {
                    suppressed += 1;
                    fates.push(RecordFate::Suppress);
                    continue;
                }
            }
        }

        if let Some((hsp0, hsp1)) = mapped_pair(record, force_unmapped) {
            if !pairing::is_proper_pair(hsp0, hsp1) {
                if !last_chance {
                    suppressed += 1;
                    fates.push(RecordFate::Suppress);
                    continue;
                }
                // Last candidate: the whole pair goes out unmapped.
                force_unmapped = [true, true];
            }
        }

        fates.push(RecordFate::Emit { force_unmapped });
    }

    log::debug!(
        "classify_group: {} candidates, {} suppressed",
        total,
        suppressed
    );
    fates
}

/// Minimum-alignment-length decision table. `None` means suppress;
/// otherwise the mates to force unmapped on emission.
fn min_len_fate(record: &Record<'_>, min_align_len: i32, last_chance: bool) -> Option<[bool; 2]> {
    let paired = record.mates[1].is_some();
    let mate0_long = long_enough(&record.mates[0], min_align_len);
    let mate1_long = long_enough(&record.mates[1], min_align_len);

    if mate0_long {
        if paired && !mate1_long {
            if !last_chance {
                return None;
            }
            return Some([false, true]);
        }
        Some([false, false])
    } else if mate1_long {
        if !last_chance {
            return None;
        }
        Some([true, false])
    } else {
        // Both mates short or unmapped (or a short single-end read)
        if !last_chance {
            return None;
        }
        Some([true, paired])
    }
}

/// Mapped with an alignment length strictly above the threshold?
fn long_enough(slot: &Option<MateSlot<'_>>, min_align_len: i32) -> bool {
    slot.as_ref()
        .and_then(|s| s.hsp.as_ref())
        .map_or(false, |h| h.align_len > min_align_len)
}

/// Both mates present and still mapped once forcing is applied.
fn mapped_pair<'r>(
    record: &'r Record<'_>,
    force_unmapped: [bool; 2],
) -> Option<(&'r Hsp, &'r Hsp)> {
    let hsp = |k: usize| {
        if force_unmapped[k] {
            None
        } else {
            record.mates[k].as_ref().and_then(|s| s.hsp.as_ref())
        }
    };
    match (hsp(0), hsp(1)) {
        (Some(hsp0), Some(hsp1)) => Some((hsp0, hsp1)),
        _ => None,
    }
}

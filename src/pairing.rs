// Template length and proper-pair bounds for paired-end records.
//
// A pair is proper when the observed template length is consistent with the
// two mates' individual reference spans; everything else defers to a later
// candidate or ends up forced unmapped (see filter.rs).

use crate::hsp::Hsp;

/// Upper proper-pair bound: |TLEN| may not exceed this multiple of the
/// longer mate's reference span. The lower bound is the shorter span itself.
pub const PROPER_PAIR_TLEN_FACTOR: i64 = 3;

/// Observed template length from `own`'s point of view: the distance
/// between the leftmost aligned coordinates of the two mates, biased one
/// unit away from zero when nonzero.
pub fn template_length(own: &Hsp, mate: &Hsp) -> i64 {
    let mut tlen = own.leftmost() - mate.leftmost();
    if tlen != 0 {
        tlen += if tlen > 0 { 1 } else { -1 };
    }
    tlen
}

/// Proper-pair test: |TLEN| within [min span, PROPER_PAIR_TLEN_FACTOR * max
/// span].
pub fn is_proper_pair(hsp0: &Hsp, hsp1: &Hsp) -> bool {
    let tlen = template_length(hsp0, hsp1).abs();
    let span0 = hsp0.ref_span();
    let span1 = hsp1.ref_span();
    tlen <= PROPER_PAIR_TLEN_FACTOR * span0.max(span1) && tlen >= span0.min(span1)
}

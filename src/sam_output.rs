// Per-mate SAM field computation and line serialization.
//
// Centralizes flag management, mate/pairing fields and the final
// tab-separated rendering. Which candidates reach this module at all is
// decided beforehand by filter::classify_group; records arriving here with
// both mates mapped are proper pairs.

use crate::cigar::{self, Cigar};
use crate::hsp::MateSlot;
use crate::pairing;
use crate::sam_opt::SamOpt;
use crate::utils::short_name;
use std::io::{self, Write};

/// SAM flag bit masks (SAM specification v1.6)
pub mod sam_flags {
    pub const PAIRED: u16 = 0x1; // Template having multiple segments in sequencing
    pub const PROPER_PAIR: u16 = 0x2; // Each segment properly aligned according to the aligner
    pub const UNMAPPED: u16 = 0x4; // Segment unmapped
    pub const MATE_UNMAPPED: u16 = 0x8; // Next segment in the template unmapped
    pub const REVERSE: u16 = 0x10; // SEQ being reverse complemented
    pub const MATE_REVERSE: u16 = 0x20; // SEQ of the next segment in the template being reverse complemented
    pub const FIRST_IN_PAIR: u16 = 0x40; // The first segment in the template
    pub const SECOND_IN_PAIR: u16 = 0x80; // The last segment in the template
    pub const SECONDARY: u16 = 0x100; // Secondary alignment
    pub const QCFAIL: u16 = 0x200; // Not passing filters, such as platform/vendor quality controls
    pub const DUPLICATE: u16 = 0x400; // PCR or optical duplicate
    pub const SUPPLEMENTARY: u16 = 0x800; // Supplementary alignment
}

/// Mapping quality reported for every mapped mate; no scoring model exists.
pub const MAPQ_MAPPED: u8 = 60;

/// One fully resolved output row. Borrows the read data, owns only its
/// CIGAR; write_sam_line consumes the row so the CIGAR is released right
/// after printing, on every exit path.
#[derive(Debug)]
pub struct SamLine<'a> {
    pub qname: &'a str,
    pub flag: u16,
    pub ref_name: &'a str,
    pub pos: i64,
    pub mapq: u8,
    pub cigar: Option<Cigar>,
    pub rnext: &'a str,
    pub pnext: i64,
    pub tlen: i64,
    pub seq: &'a str,
    pub qual: &'a str,
}

/// Compute every SAM field for one present mate of a candidate record.
///
/// `force_unmapped` comes from pass-1 classification; a forced mate is
/// treated as unmapped from the start, so no half-computed field can leak
/// into the output.
pub fn build_sam_line<'a>(
    slot: &'a MateSlot<'a>,
    sibling: Option<&'a MateSlot<'a>>,
    mate_index: usize,
    force_unmapped: [bool; 2],
    secondary: bool,
    opt: &SamOpt,
) -> SamLine<'a> {
    let own_hsp = if force_unmapped[mate_index] {
        None
    } else {
        slot.hsp.as_ref()
    };

    let mut flag = 0u16;
    let mut rnext = "*";
    let mut pnext = 0i64;
    let mut tlen = 0i64;

    // Paired end
    if let Some(sib) = sibling {
        flag |= sam_flags::PAIRED;
        flag |= if mate_index == 0 {
            sam_flags::FIRST_IN_PAIR
        } else {
            sam_flags::SECOND_IN_PAIR
        };

        let sib_hsp = if force_unmapped[mate_index ^ 1] {
            None
        } else {
            sib.hsp.as_ref()
        };

        match sib_hsp {
            // The mate is mapped
            Some(sib_hsp) => {
                if sib_hsp.is_reverse() {
                    flag |= sam_flags::MATE_REVERSE;
                }
                // PNEXT is the leftmost position of the mate alignment
                pnext = sib_hsp.leftmost() + ref_offset(opt, sib.ref_name.as_deref());

                match own_hsp {
                    Some(own_hsp) => {
                        tlen = pairing::template_length(own_hsp, sib_hsp);
                        rnext = "=";
                        flag |= sam_flags::PROPER_PAIR;
                    }
                    None => {
                        rnext = sib.ref_name.as_deref().map(short_name).unwrap_or("*");
                    }
                }
            }
            // The mate is unmapped
            None => {
                flag |= sam_flags::MATE_UNMAPPED;
            }
        }
    }

    let (ref_name, pos, mapq, cigar_str) = match own_hsp {
        // The read is mapped
        Some(own_hsp) => {
            if secondary {
                flag |= sam_flags::SECONDARY;
            }
            if own_hsp.is_reverse() {
                flag |= sam_flags::REVERSE;
            }
            let ref_name = slot.ref_name.as_deref().map(short_name).unwrap_or("*");
            // POS is the leftmost position of the read alignment
            let pos = own_hsp.leftmost() + ref_offset(opt, slot.ref_name.as_deref());
            let cigar_str = cigar::build_cigar(own_hsp, slot.query.read_len);
            (ref_name, pos, MAPQ_MAPPED, Some(cigar_str))
        }
        // The read is unmapped
        None => {
            flag |= sam_flags::UNMAPPED;
            ("*", 0, 0, None)
        }
    };

    SamLine {
        qname: &slot.query.name,
        flag,
        ref_name,
        pos,
        mapq,
        cigar: cigar_str,
        rnext,
        pnext,
        tlen,
        seq: &slot.query.seq,
        qual: &slot.query.qual,
    }
}

/// Position shift parsed from a colon-suffixed reference name, active only
/// when the option is enabled.
fn ref_offset(opt: &SamOpt, ref_name: Option<&str>) -> i64 {
    if !opt.pos_on_chr {
        return 0;
    }
    ref_name.map(first_pos_ref).unwrap_or(0)
}

/// Extract the coordinate following the first colon of a reference name
/// ("chr1:5000-9000" -> 5000). 0 when there is no colon or no digits after
/// it.
pub fn first_pos_ref(ref_name: &str) -> i64 {
    match ref_name.split_once(':') {
        Some((_, rest)) => {
            let end = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
            rest[..end].parse().unwrap_or(0)
        }
        None => 0,
    }
}

/// Serialize one computed mate record.
///
/// Reverse-strand alignments print their CIGAR elements in reverse order
/// (each element's own count and operation unchanged), the sequence
/// reverse-complemented and the quality reversed. The NM tag is emitted
/// only for mapped mates, the RG tag only when a read-group identifier is
/// configured.
pub fn write_sam_line<W: Write>(writer: &mut W, line: SamLine<'_>, opt: &SamOpt) -> io::Result<()> {
    let reverse = line.flag & sam_flags::REVERSE != 0;

    write!(
        writer,
        "{}\t{}\t{}\t{}\t{}\t",
        line.qname, line.flag, line.ref_name, line.pos, line.mapq
    )?;

    match &line.cigar {
        Some(cigar_str) if !cigar_str.is_empty() => {
            if reverse {
                for &(op, len) in cigar_str.elements.iter().rev() {
                    write!(writer, "{}{}", len, op.to_byte() as char)?;
                }
            } else {
                for &(op, len) in &cigar_str.elements {
                    write!(writer, "{}{}", len, op.to_byte() as char)?;
                }
            }
        }
        _ => writer.write_all(b"*")?,
    }

    write!(writer, "\t{}\t{}\t{}\t", line.rnext, line.pnext, line.tlen)?;

    if reverse {
        // Print SEQ and QUAL as the sequencer saw them
        let seq = reverse_complement(line.seq);
        let qual: String = line.qual.chars().rev().collect();
        write!(writer, "{}\t{}", seq, qual)?;
    } else {
        write!(writer, "{}\t{}", line.seq, line.qual)?;
    }

    if let Some(cigar_str) = &line.cigar {
        write!(writer, "\tNM:i:{}", cigar_str.edit_distance)?;
    }
    if let Some(id) = &opt.read_group_id {
        write!(writer, "\tRG:Z:{}", id)?;
    }
    writer.write_all(b"\n")
}

/// Reverse complement, case-insensitive on input, uppercase out; anything
/// outside {A,C,G,T} passes through unchanged.
fn reverse_complement(seq: &str) -> String {
    seq.chars()
        .rev()
        .map(|c| match c {
            'A' | 'a' => 'T',
            'T' | 't' => 'A',
            'C' | 'c' => 'G',
            'G' | 'g' => 'C',
            _ => c,
        })
        .collect()
}

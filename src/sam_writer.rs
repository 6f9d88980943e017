// Orchestration: pass 2 of the two-pass emitter.
//
// Classification (filter::classify_group) has decided each candidate's
// fate; this module writes the header and walks groups, records and mates
// in strict input order, one line per present mate of every non-suppressed
// record.

use crate::filter::{self, RecordFate};
use crate::header;
use crate::hsp::HitGroup;
use crate::sam_opt::SamOpt;
use crate::sam_output;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Map the configured output destination to a writer.
pub fn create_writer(opt: &SamOpt) -> Result<Box<dyn Write>> {
    match &opt.out {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating output file {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

/// Write the header and the alignment section for every group.
pub fn write_sam<W: Write>(
    writer: &mut W,
    groups: &[HitGroup<'_>],
    opt: &SamOpt,
    pg_line: &str,
) -> Result<()> {
    header::write_header(writer, opt, pg_line).context("writing SAM header")?;
    for group in groups {
        write_group(writer, group, opt).context("writing alignment section")?;
    }
    Ok(())
}

/// Emit one reference-hit group.
fn write_group<W: Write>(writer: &mut W, group: &HitGroup<'_>, opt: &SamOpt) -> io::Result<()> {
    let fates = filter::classify_group(group, opt.min_align_len);
    let mut emitted = 0usize;

    for (record, fate) in group.records.iter().zip(&fates) {
        let force_unmapped = match fate {
            RecordFate::Suppress => continue,
            RecordFate::Emit { force_unmapped } => *force_unmapped,
        };

        // First in pair, then the second
        for mate_index in 0..2 {
            if let Some(slot) = &record.mates[mate_index] {
                let sibling = record.mates[mate_index ^ 1].as_ref();
                let line = sam_output::build_sam_line(
                    slot,
                    sibling,
                    mate_index,
                    force_unmapped,
                    emitted > 0,
                    opt,
                );
                sam_output::write_sam_line(writer, line, opt)?;
            }
        }
        emitted += 1;
    }
    Ok(())
}

/// Convert the parsed groups to the configured destination, using the
/// default program line.
pub fn run(groups: &[HitGroup<'_>], opt: &SamOpt) -> Result<()> {
    let mut writer = create_writer(opt)?;
    write_sam(&mut writer, groups, opt, &header::default_pg_line())?;
    writer.flush().context("flushing SAM output")?;
    Ok(())
}

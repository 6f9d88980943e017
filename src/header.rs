// SAM header emission.
//
// Three header line kinds: the reference dictionary (@SQ), an optional read
// group (@RG) and the program line (@PG). The dictionary entries are
// forwarded from an external name/length index; the converter adds nothing
// of its own.

use crate::sam_opt::SamOpt;
use crate::utils;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// Forward the reference dictionary. The first line of the index (its own
/// header) is skipped; of every other line only the record tag, reference
/// name and length fields are kept.
pub fn write_sq_lines<W: Write>(writer: &mut W, dict: &Path) -> io::Result<()> {
    let reader = BufReader::new(utils::xzopen(dict)?);
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if idx == 0 || line.is_empty() {
            continue;
        }
        let kept: Vec<&str> = line.split('\t').take(3).collect();
        writeln!(writer, "{}", kept.join("\t"))?;
    }
    Ok(())
}

/// Validate a read-group line and extract its identifier.
///
/// The line must start with @RG and carry an ID field; anything else is a
/// formatting error and produces no header line.
pub fn read_group_id(line: &str) -> Result<String, String> {
    if !line.starts_with("@RG") {
        return Err(format!("read group line does not start with @RG: {}", line));
    }
    line.split('\t')
        .find_map(|field| field.strip_prefix("ID:"))
        .filter(|id| !id.is_empty())
        .map(|id| id.to_string())
        .ok_or_else(|| format!("read group line has no ID field: {}", line))
}

/// Default program line built from the crate metadata.
pub fn default_pg_line() -> String {
    format!(
        "@PG\tID:{}\tPN:{}\tVN:{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
}

/// Write the whole header section: @SQ lines, the read group when present
/// and well-formed, then the program line verbatim. A malformed read group
/// loses only its own line; everything already flushed stays valid.
pub fn write_header<W: Write>(writer: &mut W, opt: &SamOpt, pg_line: &str) -> io::Result<()> {
    write_sq_lines(writer, &opt.ref_dict)?;

    if let Some(rg) = &opt.read_group {
        match read_group_id(rg) {
            Ok(_) => writeln!(writer, "{}", rg)?,
            Err(e) => log::warn!("skipping read group header: {}", e),
        }
    }

    writeln!(writer, "{}", pg_line)
}

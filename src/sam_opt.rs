// Output settings consumed by the converter.
//
// Whatever drives the upstream parser fills this in; nothing here is parsed
// from the command line by this crate.

use crate::header;
use std::path::PathBuf;

/// Settings for one conversion run.
#[derive(Debug, Clone, Default)]
pub struct SamOpt {
    pub out: Option<PathBuf>,          // Output destination; None = stdout
    pub ref_dict: PathBuf,             // Reference name/length index
    pub read_group: Option<String>,    // Verbatim @RG header line
    pub read_group_id: Option<String>, // Identifier derived from it, for the RG tag
    pub min_align_len: i32,            // Minimum alignment length; 0 disables filtering
    pub pos_on_chr: bool,              // Shift positions by the colon-suffixed reference offset
}

impl SamOpt {
    /// Install a read-group line, validating it and deriving the identifier
    /// used for the per-record RG tag.
    pub fn set_read_group(&mut self, line: &str) -> Result<(), String> {
        let id = header::read_group_id(line)?;
        self.read_group = Some(line.to_string());
        self.read_group_id = Some(id);
        Ok(())
    }
}

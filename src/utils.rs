use flate2::read::GzDecoder;
use std::fs::OpenOptions;
use std::io::{self, stdin, BufReader, Read};
use std::path::Path;

/// Open a file for reading; "-" means stdin.
pub fn xopen(path: &Path) -> io::Result<Box<dyn Read>> {
    if path.to_str() == Some("-") {
        return Ok(Box::new(BufReader::new(stdin())));
    }

    let file = OpenOptions::new().read(true).open(path)?;
    Ok(Box::new(BufReader::new(file)))
}

/// Like xopen, decompressing transparently when the extension is .gz.
pub fn xzopen(path: &Path) -> io::Result<Box<dyn Read>> {
    let input = xopen(path)?;
    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        Ok(Box::new(GzDecoder::new(input)))
    } else {
        Ok(input)
    }
}

/// Reference names are printed up to the first space or tab (BLAST
/// definition lines carry a description after the accession).
pub fn short_name(name: &str) -> &str {
    match name.find([' ', '\t']) {
        Some(end) => &name[..end],
        None => name,
    }
}

// FASTQ reader module using bio::io::fastq
//
// Supplies Query values (name, bases, qualities) for the converter. The
// alignment-result parser pairs them with candidate spans; this crate only
// needs the sequences as they came out of the sequencer.

use crate::hsp::Query;
use bio::io::fastq;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufReader, Read};

/// FASTQ reader with automatic gzip detection by file extension.
pub struct FastqReader {
    records: fastq::Records<BufReader<Box<dyn Read>>>,
}

impl FastqReader {
    /// Open a FASTQ file (.fq, .fastq, optionally .gz-compressed).
    pub fn new(path: &str) -> io::Result<Self> {
        let file = File::open(path)?;

        let reader: Box<dyn Read> = if path.ends_with(".gz") {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };

        Ok(Self {
            records: fastq::Reader::new(reader).records(),
        })
    }

    /// Next query, or None at end of input.
    pub fn read_query(&mut self) -> io::Result<Option<Query>> {
        match self.records.next() {
            Some(Ok(record)) => {
                let seq = String::from_utf8_lossy(record.seq()).into_owned();
                let qual = String::from_utf8_lossy(record.qual()).into_owned();
                Ok(Some(Query::new(record.id(), seq, qual)))
            }
            Some(Err(e)) => Err(io::Error::new(io::ErrorKind::Other, e)),
            None => Ok(None),
        }
    }

    /// Read every remaining query.
    pub fn read_all(&mut self) -> io::Result<Vec<Query>> {
        let mut queries = Vec::new();
        while let Some(query) = self.read_query()? {
            queries.push(query);
        }
        Ok(queries)
    }
}

// blast2sam: convert parsed pairwise alignment results into SAM records.
//
// The upstream parser hands us ordered reference-hit groups of candidate
// records; this crate turns them into a SAM header plus one alignment line
// per present mate of every emitted record.

pub mod cigar; // CIGAR construction from gapped aligned sequence pairs
pub mod fastq_reader; // FASTQ reader using bio::io::fastq (query sequences/qualities)
pub mod filter; // Candidate classification: emit, suppress or force unmapped
pub mod header; // SAM header emission (@SQ, @RG, @PG)
pub mod hsp; // Input data model (queries, aligned spans, candidate records)
pub mod pairing; // Template length and proper-pair bounds
pub mod sam_opt; // Output settings
pub mod sam_output; // Per-mate flag/position computation and line serialization
pub mod sam_writer; // Orchestration: header, then classify and emit per group
pub mod utils; // Stream-opening helpers

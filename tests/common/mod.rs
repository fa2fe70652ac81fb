//! Shared helpers: an in-memory aligner that replays canned records.

#![allow(dead_code)]

use scaffolder_rs::error::Result;
use scaffolder_rs::{AlignmentBatch, AlignmentRecord, Anchor, AnchorAligner, Contig};
use std::collections::HashMap;

/// Replays scripted records for each reference contig id.
///
/// Every call against the same contig returns the same records; contigs
/// without a script get an empty batch.
#[derive(Debug, Default)]
pub struct ScriptedAligner {
    pub anchors: Vec<Anchor>,
    pub script: HashMap<String, Vec<AlignmentRecord>>,
    /// Reference contig ids in call order
    pub calls: Vec<String>,
}

impl ScriptedAligner {
    pub fn new() -> Self {
        ScriptedAligner::default()
    }

    pub fn on(mut self, contig_id: &str, records: Vec<AlignmentRecord>) -> Self {
        self.script
            .entry(contig_id.to_string())
            .or_default()
            .extend(records);
        self
    }
}

impl AnchorAligner for ScriptedAligner {
    fn load_anchors(&mut self, anchors: &[Anchor]) -> Result<()> {
        self.anchors = anchors.to_vec();
        Ok(())
    }

    fn align_anchors(&mut self, contig: &Contig) -> Result<AlignmentBatch> {
        self.calls.push(contig.id().to_string());
        let records = self.script.get(contig.id()).cloned().unwrap_or_default();
        Ok(AlignmentBatch::from_records(records))
    }
}

/// Forward-strand primary record of `anchor` at 0-based `begin`.
pub fn rec(anchor: &str, begin: i64, cigar: &str) -> AlignmentRecord {
    AlignmentRecord::new(anchor, begin, cigar.parse().expect("valid cigar"))
}

pub fn contig(id: &str, base: u8, len: usize) -> Contig {
    Contig::new(id, vec![base; len])
}

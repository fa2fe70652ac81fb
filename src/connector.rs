//! Greedy scaffold construction.
//!
//! The [`Connector`] repeatedly aligns the anchor pool against the frontier
//! contig of the scaffold under construction and merges the first contig the
//! evidence supports. When nothing can be merged the scaffold is finished
//! and the next unused contig seeds a new one.

use crate::aligner::AnchorAligner;
use crate::config::Config;
use crate::contig::{owner_contig_id, ContigId, ContigSet};
use crate::decision::{Decision, MergeEvaluator, SkipReason};
use crate::error::{Result, ScaffoldError};
use crate::fasta;
use crate::geometry::MergeGeometry;
use crate::scaffold::Scaffold;
use log::{debug, info};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::Path;

/// Where the connector is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorState {
    /// Trying to grow the current scaffold at its frontier
    ExtendingScaffold,
    /// The current scaffold is finished
    StartingNewScaffold,
    /// Every contig has been placed
    Done,
}

/// Counters collected over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectStats {
    /// Aligner calls made
    pub attempts: usize,
    /// Contigs merged into a scaffold
    pub merges: usize,
    /// Records that failed the merge decision, by reason
    pub skipped: HashMap<SkipReason, usize>,
    /// Accepted records whose target sat in an earlier scaffold
    pub placed_elsewhere: usize,
    /// Extensions stopped because the target was already in the scaffold
    pub cycles: usize,
    /// Scaffolds trimmed as circular
    pub circular: usize,
}

impl ConnectStats {
    fn record_skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_insert(0) += 1;
    }

    pub fn total_skipped(&self) -> usize {
        self.skipped.values().sum()
    }
}

impl fmt::Display for ConnectStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} alignments, {} merges, {} records skipped, {} cycles, {} circular",
            self.attempts,
            self.merges,
            self.total_skipped() + self.placed_elsewhere,
            self.cycles,
            self.circular
        )
    }
}

/// Result of a finished run.
#[derive(Debug, Clone)]
pub struct Assembly {
    /// Every input contig in its final orientation
    pub contigs: ContigSet,
    /// Scaffolds in completion order
    pub scaffolds: Vec<Scaffold>,
    pub stats: ConnectStats,
}

impl Assembly {
    /// FASTA name of the scaffold at `index`.
    pub fn scaffold_name(index: usize) -> String {
        format!("scaffold|{index}")
    }

    /// Named combined sequences, one per scaffold.
    pub fn sequences(&self) -> Vec<(String, Vec<u8>)> {
        self.scaffolds
            .iter()
            .enumerate()
            .map(|(i, scaffold)| {
                let name = Assembly::scaffold_name(i);
                let seq = scaffold.combined_sequence(&self.contigs);
                debug!(
                    "{}: {} contigs, {} bp, {:?} bp dropped at joins",
                    name,
                    scaffold.len(),
                    seq.len(),
                    scaffold.join_overlaps(&self.contigs)
                );
                (name, seq)
            })
            .collect()
    }

    /// Writes every scaffold to `path` and returns how many were written.
    pub fn write_fasta(&self, path: &Path) -> Result<usize> {
        let sequences = self.sequences();
        fasta::write_fasta(
            path,
            sequences
                .iter()
                .map(|(name, seq)| (name.as_str(), seq.as_slice())),
        )?;
        Ok(sequences.len())
    }
}

/// Drives scaffold construction over one contig set.
pub struct Connector<A: AnchorAligner> {
    aligner: A,
    evaluator: MergeEvaluator,
    contigs: ContigSet,
    unused: BTreeSet<ContigId>,
    used_ids: HashSet<String>,
    scaffolds: Vec<Scaffold>,
    state: ConnectorState,
    stats: ConnectStats,
}

impl<A: AnchorAligner> Connector<A> {
    /// Loads the anchor pool into `aligner` and seeds the first scaffold.
    pub fn new(contigs: ContigSet, mut aligner: A, config: &Config) -> Result<Self> {
        aligner.load_anchors(&contigs.anchors(config.anchor_len))?;

        let mut connector = Connector {
            aligner,
            evaluator: MergeEvaluator::from_config(config),
            unused: contigs.ids().collect(),
            contigs,
            used_ids: HashSet::new(),
            scaffolds: Vec::new(),
            state: ConnectorState::Done,
            stats: ConnectStats::default(),
        };
        if connector.start_scaffold() {
            connector.state = ConnectorState::ExtendingScaffold;
        }
        Ok(connector)
    }

    pub fn state(&self) -> ConnectorState {
        self.state
    }

    pub fn contigs(&self) -> &ContigSet {
        &self.contigs
    }

    pub fn scaffolds(&self) -> &[Scaffold] {
        &self.scaffolds
    }

    pub fn stats(&self) -> &ConnectStats {
        &self.stats
    }

    /// Anchor ids that have already justified a merge.
    pub fn used_anchor_ids(&self) -> &HashSet<String> {
        &self.used_ids
    }

    /// Contigs not yet placed in any scaffold.
    pub fn unused_count(&self) -> usize {
        self.unused.len()
    }

    /// Advances the state machine by one transition.
    pub fn step(&mut self) -> Result<ConnectorState> {
        self.state = match self.state {
            ConnectorState::ExtendingScaffold => {
                if self.connect_next()? {
                    ConnectorState::ExtendingScaffold
                } else {
                    ConnectorState::StartingNewScaffold
                }
            }
            ConnectorState::StartingNewScaffold => {
                if self.start_scaffold() {
                    ConnectorState::ExtendingScaffold
                } else {
                    self.trim_circular();
                    ConnectorState::Done
                }
            }
            ConnectorState::Done => ConnectorState::Done,
        };
        Ok(self.state)
    }

    /// Runs to completion.
    pub fn run(mut self) -> Result<Assembly> {
        while self.state != ConnectorState::Done {
            self.step()?;
        }
        info!(
            "Built {} scaffolds from {} contigs: {}",
            self.scaffolds.len(),
            self.contigs.len(),
            self.stats
        );
        Ok(self.into_assembly())
    }

    /// Hands over the current contigs and scaffolds, finished or not.
    pub fn into_assembly(self) -> Assembly {
        Assembly {
            contigs: self.contigs,
            scaffolds: self.scaffolds,
            stats: self.stats,
        }
    }

    fn start_scaffold(&mut self) -> bool {
        let Some(first) = self.unused.pop_first() else {
            return false;
        };
        info!(
            "Starting scaffold {} from {}",
            self.scaffolds.len(),
            self.contigs[first].id()
        );
        self.scaffolds.push(Scaffold::new(first));
        true
    }

    fn trim_circular(&mut self) {
        for (i, scaffold) in self.scaffolds.iter_mut().enumerate() {
            if scaffold.circular_genome_trim() {
                info!("Trimmed circular overlap of {}", Assembly::scaffold_name(i));
                self.stats.circular += 1;
            }
        }
    }

    /// One extension attempt on the current scaffold's frontier.
    ///
    /// Returns true if a contig was merged.
    fn connect_next(&mut self) -> Result<bool> {
        let Some(frontier) = self.scaffolds.last().map(Scaffold::last_contig) else {
            return Ok(false);
        };

        self.stats.attempts += 1;
        let batch = self.aligner.align_anchors(&self.contigs[frontier])?;
        if batch.is_empty() {
            debug!("No alignments against {}", self.contigs[frontier].id());
            return Ok(false);
        }

        for record in batch.iter() {
            let decision = self
                .evaluator
                .evaluate(&self.contigs[frontier], record, &self.used_ids);
            let evidence = match decision {
                Decision::Accept(evidence) => evidence,
                _ => {
                    if let Some(reason) = decision.skip_reason() {
                        debug!("Skipping {}: {}", record.query_name, reason);
                        self.stats.record_skip(reason);
                    }
                    continue;
                }
            };

            let owner = owner_contig_id(&record.query_name);
            let target = self
                .contigs
                .resolve(owner)
                .ok_or_else(|| ScaffoldError::UnknownContig {
                    anchor_id: record.query_name.clone(),
                    contig_id: owner.to_string(),
                })?;

            let Some(scaffold) = self.scaffolds.last_mut() else {
                return Ok(false);
            };

            if scaffold.contains(target) {
                if target == scaffold.first_contig() && !record.is_reverse() {
                    let geometry = MergeGeometry::compute(
                        &self.contigs[frontier],
                        &self.contigs[target],
                        record.begin_pos,
                    );
                    scaffold.mark_circular(geometry.current_end(), geometry.next_begin());
                    debug!("Scaffold closes on {}", self.contigs[target].id());
                }
                debug!(
                    "{} is already in the scaffold, stopping",
                    self.contigs[target].id()
                );
                self.stats.cycles += 1;
                return Ok(false);
            }

            if !self.unused.contains(&target) {
                debug!(
                    "Skipping {}: {} is already placed",
                    record.query_name,
                    self.contigs[target].id()
                );
                self.stats.placed_elsewhere += 1;
                continue;
            }

            if record.is_reverse() {
                self.contigs.get_mut(target).reverse_complement();
            }

            let geometry = MergeGeometry::compute(
                &self.contigs[frontier],
                &self.contigs[target],
                record.begin_pos,
            );
            if !scaffold.add_contig(target, geometry) {
                return Err(ScaffoldError::Other(format!(
                    "{} was placed twice in one scaffold",
                    self.contigs[target].id()
                )));
            }
            self.contigs
                .get_mut(target)
                .set_right_ext_pos(geometry.next_begin());

            self.used_ids.insert(record.query_name.clone());
            self.used_ids.insert(self.contigs[frontier].right_id());
            self.unused.remove(&target);
            self.stats.merges += 1;

            info!(
                "Merged {} after {} via {} (extension {} bp, overlap {} bp)",
                self.contigs[target].id(),
                self.contigs[frontier].id(),
                record.query_name,
                evidence.extension_length,
                geometry.merge_len
            );
            return Ok(true);
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::{AlignmentBatch, AlignmentRecord};
    use crate::contig::{Anchor, Contig};

    /// Returns canned records per reference contig id.
    #[derive(Default)]
    struct Canned {
        anchors: Vec<Anchor>,
        records: HashMap<String, Vec<AlignmentRecord>>,
    }

    impl AnchorAligner for Canned {
        fn load_anchors(&mut self, anchors: &[Anchor]) -> Result<()> {
            self.anchors = anchors.to_vec();
            Ok(())
        }

        fn align_anchors(&mut self, contig: &Contig) -> Result<AlignmentBatch> {
            Ok(AlignmentBatch::from_records(
                self.records.get(contig.id()).cloned().unwrap_or_default(),
            ))
        }
    }

    fn two_contigs() -> ContigSet {
        ContigSet::new(vec![
            Contig::new("A", vec![b'A'; 1000]),
            Contig::new("B", vec![b'C'; 800]),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_input_is_done() {
        let connector =
            Connector::new(ContigSet::default(), Canned::default(), &Config::default()).unwrap();
        assert_eq!(connector.state(), ConnectorState::Done);
        let assembly = connector.run().unwrap();
        assert!(assembly.scaffolds.is_empty());
    }

    #[test]
    fn test_anchor_pool_loaded_once() {
        let mut aligner = Canned::default();
        let connector = Connector::new(two_contigs(), &mut aligner, &Config::default()).unwrap();
        connector.run().unwrap();
        let ids: Vec<&str> = aligner.anchors.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["AL", "AR", "BL", "BR"]);
        assert_eq!(aligner.anchors[0].seq.len(), 150);
    }

    #[test]
    fn test_transitions_without_evidence() {
        let mut connector =
            Connector::new(two_contigs(), Canned::default(), &Config::default()).unwrap();
        assert_eq!(connector.state(), ConnectorState::ExtendingScaffold);
        assert_eq!(connector.step().unwrap(), ConnectorState::StartingNewScaffold);
        assert_eq!(connector.step().unwrap(), ConnectorState::ExtendingScaffold);
        assert_eq!(connector.step().unwrap(), ConnectorState::StartingNewScaffold);
        assert_eq!(connector.step().unwrap(), ConnectorState::Done);
        assert_eq!(connector.step().unwrap(), ConnectorState::Done);
        assert_eq!(connector.scaffolds().len(), 2);
        assert_eq!(connector.stats().attempts, 2);
    }

    #[test]
    fn test_merge_bookkeeping() {
        let mut aligner = Canned::default();
        aligner.records.insert(
            "A".to_string(),
            vec![AlignmentRecord::new("BL", 950, "900M100S".parse().unwrap())],
        );
        let mut connector = Connector::new(two_contigs(), aligner, &Config::default()).unwrap();

        assert_eq!(connector.step().unwrap(), ConnectorState::ExtendingScaffold);
        let used = connector.used_anchor_ids();
        assert!(used.contains("BL"));
        assert!(used.contains("AR"));
        assert_eq!(connector.unused_count(), 0);

        let scaffold = &connector.scaffolds()[0];
        assert_eq!(scaffold.len(), 2);
        assert_eq!(scaffold.members()[0].end, Some(950));
        assert_eq!(scaffold.members()[1].begin, 0);

        let b = connector.contigs().resolve("B").unwrap();
        assert_eq!(connector.contigs()[b].right_ext_pos(), 0);

        let assembly = connector.run().unwrap();
        assert_eq!(assembly.stats.merges, 1);
        assert_eq!(assembly.scaffolds.len(), 1);
        assert_eq!(assembly.sequences()[0].1.len(), 950 + 800);
    }

    #[test]
    fn test_unknown_owner_is_fatal() {
        let mut aligner = Canned::default();
        aligner.records.insert(
            "A".to_string(),
            vec![AlignmentRecord::new("ZZL", 950, "900M100S".parse().unwrap())],
        );
        let result = Connector::new(two_contigs(), aligner, &Config::default())
            .unwrap()
            .run();
        assert!(matches!(
            result,
            Err(ScaffoldError::UnknownContig { contig_id, .. }) if contig_id == "ZZ"
        ));
    }

    #[test]
    fn test_skips_are_counted() {
        let mut aligner = Canned::default();
        aligner.records.insert(
            "A".to_string(),
            vec![
                AlignmentRecord::new("AR", 950, "50M100S".parse().unwrap()),
                AlignmentRecord::new("BL", 900, "50M100S".parse().unwrap()),
                AlignmentRecord::new("BL", 900, "150M".parse().unwrap()),
            ],
        );
        let assembly = Connector::new(two_contigs(), aligner, &Config::default())
            .unwrap()
            .run()
            .unwrap();

        let stats = &assembly.stats;
        assert_eq!(stats.merges, 0);
        assert_eq!(stats.skipped.get(&SkipReason::SelfHit), Some(&1));
        assert_eq!(stats.skipped.get(&SkipReason::ShortExtension), Some(&1));
        assert_eq!(stats.skipped.get(&SkipReason::NoTrailingClip), Some(&1));
        assert_eq!(stats.total_skipped(), 3);
    }
}

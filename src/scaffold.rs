//! Scaffolds: ordered chains of spliced contigs.

use crate::contig::{ContigId, ContigSet};
use crate::geometry::MergeGeometry;
use std::collections::HashSet;

/// One contig of a scaffold and the window of it that ends up in the
/// combined sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaffoldMember {
    pub contig: ContigId,
    /// First contributing position
    pub begin: i64,
    /// End of the contribution (exclusive); `None` runs to the contig end
    pub end: Option<i64>,
}

impl ScaffoldMember {
    /// Contributing window clamped to `0..=len`.
    pub fn window(&self, len: usize) -> (usize, usize) {
        let len = len as i64;
        let begin = self.begin.clamp(0, len);
        let end = self.end.unwrap_or(len).clamp(begin, len);
        (begin as usize, end as usize)
    }
}

/// Splice points recorded when the frontier's evidence points back at the
/// first contig of its own scaffold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Closure {
    /// Where the frontier contig would have ended
    pub last_end: i64,
    /// Where the first contig would have started
    pub first_begin: i64,
}

/// Ordered chain of contigs plus per-join offsets.
#[derive(Debug, Clone)]
pub struct Scaffold {
    members: Vec<ScaffoldMember>,
    /// Geometry of the join in front of each member but the first
    joins: Vec<MergeGeometry>,
    contained: HashSet<ContigId>,
    closure: Option<Closure>,
}

impl Scaffold {
    /// Starts a scaffold from a single contig.
    pub fn new(first: ContigId) -> Self {
        Scaffold {
            members: vec![ScaffoldMember {
                contig: first,
                begin: 0,
                end: None,
            }],
            joins: Vec::new(),
            contained: HashSet::from([first]),
            closure: None,
        }
    }

    pub fn members(&self) -> &[ScaffoldMember] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Scaffolds always hold at least one contig.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn first_contig(&self) -> ContigId {
        self.members[0].contig
    }

    /// Frontier contig: the one further extensions start from.
    pub fn last_contig(&self) -> ContigId {
        self.members[self.members.len() - 1].contig
    }

    pub fn contains(&self, contig: ContigId) -> bool {
        self.contained.contains(&contig)
    }

    pub fn joins(&self) -> &[MergeGeometry] {
        &self.joins
    }

    /// Appends `next`, cutting the current frontier and `next` at the splice
    /// points of `geometry`.
    ///
    /// Returns false and leaves the scaffold untouched if `next` is already a
    /// member.
    pub fn add_contig(&mut self, next: ContigId, geometry: MergeGeometry) -> bool {
        if !self.contained.insert(next) {
            return false;
        }

        let last = self.members.len() - 1;
        self.members[last].end = Some(geometry.current_end());
        self.members.push(ScaffoldMember {
            contig: next,
            begin: geometry.next_begin(),
            end: None,
        });
        self.joins.push(geometry);
        true
    }

    /// Records that the scaffold closes on itself.
    pub fn mark_circular(&mut self, last_end: i64, first_begin: i64) {
        self.closure = Some(Closure {
            last_end,
            first_begin,
        });
    }

    pub fn closure(&self) -> Option<Closure> {
        self.closure
    }

    pub fn is_circular(&self) -> bool {
        self.closure.is_some()
    }

    /// Removes the sequence duplicated by a circular closure: the frontier is
    /// cut where the closing join would have ended it and the first contig
    /// starts no earlier than where the join would have started it.
    ///
    /// Returns true if a closure was applied. Applying twice is a no-op.
    pub fn circular_genome_trim(&mut self) -> bool {
        let Some(closure) = self.closure.take() else {
            return false;
        };

        let last = self.members.len() - 1;
        self.members[last].end = Some(closure.last_end);
        let first = &mut self.members[0];
        first.begin = first.begin.max(closure.first_begin);
        true
    }

    /// Concatenation of every member's contributing window.
    pub fn combined_sequence(&self, contigs: &ContigSet) -> Vec<u8> {
        let mut combined = Vec::with_capacity(self.combined_len(contigs));
        for member in &self.members {
            let seq = contigs[member.contig].seq();
            let (begin, end) = member.window(seq.len());
            combined.extend_from_slice(&seq[begin..end]);
        }
        combined
    }

    /// Length of [`Scaffold::combined_sequence`] without building it.
    pub fn combined_len(&self, contigs: &ContigSet) -> usize {
        self.members
            .iter()
            .map(|member| {
                let (begin, end) = member.window(contigs[member.contig].len());
                end - begin
            })
            .sum()
    }

    /// Bases dropped at each join: the tail cut off the earlier contig plus
    /// the head cut off the later one.
    pub fn join_overlaps(&self, contigs: &ContigSet) -> Vec<usize> {
        self.members
            .windows(2)
            .map(|pair| {
                let prev_len = contigs[pair[0].contig].len();
                let (_, prev_end) = pair[0].window(prev_len);
                let (next_begin, _) = pair[1].window(contigs[pair[1].contig].len());
                (prev_len - prev_end) + next_begin
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contig::Contig;
    use pretty_assertions::assert_eq;

    /// Zero-overlap join cutting a `len`-base frontier at `last_end` and the
    /// next contig at `next_begin`.
    fn splice(len: i64, last_end: i64, next_begin: i64) -> MergeGeometry {
        MergeGeometry {
            merge_start: last_end,
            right_ext_len: len - last_end,
            next_start: next_begin,
            merge_end: last_end,
            merge_len: 0,
        }
    }

    fn contigs() -> ContigSet {
        ContigSet::new(vec![
            Contig::new("a", b"AAAAACCCCC".to_vec()),
            Contig::new("b", b"CCCGGGGG".to_vec()),
            Contig::new("c", b"GGTTTT".to_vec()),
        ])
        .unwrap()
    }

    #[test]
    fn test_splice_and_materialize() {
        let set = contigs();
        let a = set.resolve("a").unwrap();
        let b = set.resolve("b").unwrap();
        let c = set.resolve("c").unwrap();

        let mut scaffold = Scaffold::new(a);
        assert!(scaffold.add_contig(b, splice(10, 8, 1)));
        assert!(scaffold.add_contig(c, splice(8, 7, 1)));

        assert_eq!(scaffold.last_contig(), c);
        assert_eq!(scaffold.first_contig(), a);
        assert!(scaffold.contains(b));
        assert_eq!(
            String::from_utf8(scaffold.combined_sequence(&set)).unwrap(),
            "AAAAACCC".to_string() + "CCGGGG" + "GTTTT"
        );
        assert_eq!(scaffold.join_overlaps(&set), vec![3, 2]);
        let spliced: Vec<i64> = scaffold
            .joins()
            .iter()
            .map(MergeGeometry::spliced_out)
            .collect();
        assert_eq!(spliced, vec![3, 2]);
        assert_eq!(scaffold.combined_len(&set), 10 + 8 + 6 - 3 - 2);
    }

    #[test]
    fn test_duplicate_member_refused() {
        let set = contigs();
        let a = set.resolve("a").unwrap();
        let b = set.resolve("b").unwrap();
        let mut scaffold = Scaffold::new(a);
        assert!(scaffold.add_contig(b, splice(10, 8, 1)));
        assert!(!scaffold.add_contig(a, splice(8, 5, 0)));
        assert_eq!(scaffold.len(), 2);
        assert_eq!(scaffold.joins().len(), 1);
        assert_eq!(scaffold.members()[1].end, None);
    }

    #[test]
    fn test_offsets_are_clamped() {
        let set = contigs();
        let a = set.resolve("a").unwrap();
        let b = set.resolve("b").unwrap();
        let mut scaffold = Scaffold::new(a);
        scaffold.add_contig(b, splice(10, 25, -4));
        assert_eq!(
            String::from_utf8(scaffold.combined_sequence(&set)).unwrap(),
            "AAAAACCCCCCCCGGGGG"
        );
    }

    #[test]
    fn test_circular_trim() {
        let set = contigs();
        let a = set.resolve("a").unwrap();
        let b = set.resolve("b").unwrap();
        let mut scaffold = Scaffold::new(a);
        scaffold.add_contig(b, splice(10, 8, 1));
        scaffold.mark_circular(6, 2);
        assert!(scaffold.is_circular());

        assert!(scaffold.circular_genome_trim());
        assert_eq!(
            String::from_utf8(scaffold.combined_sequence(&set)).unwrap(),
            "AAACCC".to_string() + "CCGGG"
        );
        assert!(!scaffold.circular_genome_trim());
    }

    #[test]
    fn test_trim_without_closure_is_noop() {
        let set = contigs();
        let mut scaffold = Scaffold::new(set.resolve("a").unwrap());
        assert!(!scaffold.circular_genome_trim());
        assert_eq!(scaffold.combined_sequence(&set), b"AAAAACCCCC".to_vec());
    }
}

//! Contigs, their anchors, and the arena that owns them.
//!
//! All contigs of a run live in one [`ContigSet`]. Scaffolds and the
//! connector refer to them through [`ContigId`] handles.

use crate::error::{Result, ScaffoldError};
use std::collections::HashMap;
use std::fmt;

/// Orientation of a contig relative to the draft genome it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Forward,
    Reverse,
}

impl Orientation {
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Forward => Orientation::Reverse,
            Orientation::Reverse => Orientation::Forward,
        }
    }
}

/// Which end of the contig, as read from the draft, an anchor was cut from.
///
/// The side is encoded as the last character of the anchor id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorSide {
    Left,
    Right,
}

impl AnchorSide {
    pub const fn suffix(self) -> char {
        match self {
            AnchorSide::Left => 'L',
            AnchorSide::Right => 'R',
        }
    }
}

/// Builds the id of the anchor cut from `side` of contig `contig_id`.
pub fn anchor_id(contig_id: &str, side: AnchorSide) -> String {
    let mut id = String::with_capacity(contig_id.len() + 1);
    id.push_str(contig_id);
    id.push(side.suffix());
    id
}

/// Id of the contig owning an anchor: the anchor id minus its last character.
pub fn owner_contig_id(anchor_id: &str) -> &str {
    match anchor_id.char_indices().last() {
        Some((idx, _)) => &anchor_id[..idx],
        None => anchor_id,
    }
}

/// Short sequence from one contig end used as alignment bait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub id: String,
    pub seq: Vec<u8>,
}

/// Assembled sequence fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contig {
    id: String,
    seq: Vec<u8>,
    orientation: Orientation,
    /// Bases at the current left end that came from read extension.
    ext_left: usize,
    /// Bases at the current right end that came from read extension.
    ext_right: usize,
    /// First position of this contig not yet spent by an incoming merge.
    right_ext_pos: i64,
}

impl Contig {
    pub fn new(id: impl Into<String>, seq: Vec<u8>) -> Self {
        Contig {
            id: id.into(),
            seq,
            orientation: Orientation::Forward,
            ext_left: 0,
            ext_right: 0,
            right_ext_pos: 0,
        }
    }

    /// Contig whose sequence is `left + core + right`, with `left` and `right`
    /// recorded as extension budgets.
    pub fn with_extensions(id: impl Into<String>, core: &[u8], left: &[u8], right: &[u8]) -> Self {
        let mut seq = Vec::with_capacity(left.len() + core.len() + right.len());
        seq.extend_from_slice(left);
        seq.extend_from_slice(core);
        seq.extend_from_slice(right);

        Contig {
            ext_left: left.len(),
            ext_right: right.len(),
            ..Contig::new(id, seq)
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn seq(&self) -> &[u8] {
        &self.seq
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// Length as a signed value for merge arithmetic.
    pub fn total_len(&self) -> i64 {
        self.seq.len() as i64
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Leftward overlap budget when this contig is the target of a merge.
    pub fn total_ext_left(&self) -> i64 {
        self.ext_left as i64
    }

    /// Rightward extension budget.
    pub fn total_ext_right(&self) -> i64 {
        self.ext_right as i64
    }

    pub fn right_ext_pos(&self) -> i64 {
        self.right_ext_pos
    }

    pub fn set_right_ext_pos(&mut self, pos: i64) {
        self.right_ext_pos = pos;
    }

    /// Anchor id of whatever now sits at this contig's right end.
    ///
    /// A forward contig ends with its original right side, a flipped one
    /// with its original left side.
    pub fn right_id(&self) -> String {
        match self.orientation {
            Orientation::Forward => anchor_id(&self.id, AnchorSide::Right),
            Orientation::Reverse => anchor_id(&self.id, AnchorSide::Left),
        }
    }

    /// Anchor id of whatever now sits at this contig's left end.
    pub fn left_id(&self) -> String {
        match self.orientation {
            Orientation::Forward => anchor_id(&self.id, AnchorSide::Left),
            Orientation::Reverse => anchor_id(&self.id, AnchorSide::Right),
        }
    }

    /// Reverse-complements the sequence in place.
    ///
    /// Extension budgets follow their bases: what was the left budget is now
    /// on the right and vice versa.
    pub fn reverse_complement(&mut self) {
        self.seq.reverse();
        for base in self.seq.iter_mut() {
            *base = needletail::sequence::complement(*base);
        }
        std::mem::swap(&mut self.ext_left, &mut self.ext_right);
        self.orientation = self.orientation.flipped();
    }

    /// The two anchors of this contig: up to `anchor_len` bases from each end.
    pub fn anchors(&self, anchor_len: usize) -> [Anchor; 2] {
        let take = anchor_len.min(self.seq.len());
        [
            Anchor {
                id: self.left_id(),
                seq: self.seq[..take].to_vec(),
            },
            Anchor {
                id: self.right_id(),
                seq: self.seq[self.seq.len() - take..].to_vec(),
            },
        ]
    }
}

impl fmt::Display for Contig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} bp, {:?}, ext {}/{})",
            self.id,
            self.seq.len(),
            self.orientation,
            self.ext_left,
            self.ext_right
        )
    }
}

/// Handle to a contig inside a [`ContigSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContigId(usize);

impl ContigId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Arena owning every contig of a run.
#[derive(Debug, Clone, Default)]
pub struct ContigSet {
    contigs: Vec<Contig>,
    by_name: HashMap<String, ContigId>,
}

impl ContigSet {
    /// Builds the arena, rejecting duplicate ids.
    pub fn new(contigs: Vec<Contig>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(contigs.len());
        for (i, contig) in contigs.iter().enumerate() {
            if by_name.insert(contig.id.clone(), ContigId(i)).is_some() {
                return Err(ScaffoldError::DuplicateContigId(contig.id.clone()));
            }
        }
        Ok(ContigSet { contigs, by_name })
    }

    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }

    /// Handles in input order.
    pub fn ids(&self) -> impl Iterator<Item = ContigId> {
        (0..self.contigs.len()).map(ContigId)
    }

    /// Looks a contig up by name.
    pub fn resolve(&self, name: &str) -> Option<ContigId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: ContigId) -> &Contig {
        &self.contigs[id.0]
    }

    pub fn get_mut(&mut self, id: ContigId) -> &mut Contig {
        &mut self.contigs[id.0]
    }

    /// Both anchors of every contig, in input order.
    pub fn anchors(&self, anchor_len: usize) -> Vec<Anchor> {
        self.contigs
            .iter()
            .flat_map(|contig| contig.anchors(anchor_len))
            .collect()
    }

    pub fn into_contigs(self) -> Vec<Contig> {
        self.contigs
    }
}

impl std::ops::Index<ContigId> for ContigSet {
    type Output = Contig;

    fn index(&self, id: ContigId) -> &Contig {
        self.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_ids() {
        assert_eq!(anchor_id("ctg1", AnchorSide::Left), "ctg1L");
        assert_eq!(owner_contig_id("ctg1L"), "ctg1");
        assert_eq!(owner_contig_id("ctg|7R"), "ctg|7");
        assert_eq!(owner_contig_id(""), "");
    }

    #[test]
    fn test_anchors_cut_from_both_ends() {
        let contig = Contig::new("c", b"AAACCCGGGTTT".to_vec());
        let [left, right] = contig.anchors(4);
        assert_eq!(left.id, "cL");
        assert_eq!(left.seq, b"AAAC".to_vec());
        assert_eq!(right.id, "cR");
        assert_eq!(right.seq, b"GTTT".to_vec());
    }

    #[test]
    fn test_short_contig_anchor_is_whole_sequence() {
        let contig = Contig::new("c", b"ACG".to_vec());
        let [left, right] = contig.anchors(150);
        assert_eq!(left.seq, b"ACG".to_vec());
        assert_eq!(right.seq, b"ACG".to_vec());
    }

    #[test]
    fn test_reverse_complement_swaps_budgets() {
        let mut contig = Contig::with_extensions("c", b"GGGG", b"AA", b"TTTTT");
        assert_eq!(contig.seq(), b"AAGGGGTTTTT");
        assert_eq!(contig.total_ext_left(), 2);
        assert_eq!(contig.total_ext_right(), 5);
        assert_eq!(contig.right_id(), "cR");

        contig.reverse_complement();
        assert_eq!(contig.seq(), b"AAAAACCCCTT");
        assert_eq!(contig.total_ext_left(), 5);
        assert_eq!(contig.total_ext_right(), 2);
        assert_eq!(contig.orientation(), Orientation::Reverse);
        assert_eq!(contig.right_id(), "cL");
        assert_eq!(contig.left_id(), "cR");

        contig.reverse_complement();
        assert_eq!(contig.seq(), b"AAGGGGTTTTT");
        assert_eq!(contig.orientation(), Orientation::Forward);
    }

    #[test]
    fn test_contig_set_lookup() {
        let set = ContigSet::new(vec![
            Contig::new("a", b"ACGT".to_vec()),
            Contig::new("b", b"TTTT".to_vec()),
        ])
        .unwrap();
        let b = set.resolve("b").unwrap();
        assert_eq!(set[b].id(), "b");
        assert_eq!(set.resolve("z"), None);
        assert_eq!(set.anchors(2).len(), 4);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = ContigSet::new(vec![
            Contig::new("a", b"ACGT".to_vec()),
            Contig::new("a", b"TTTT".to_vec()),
        ]);
        assert!(matches!(result, Err(ScaffoldError::DuplicateContigId(id)) if id == "a"));
    }
}

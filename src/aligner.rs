//! Interface to the external aligner.
//!
//! The connector never runs an aligner itself; it asks an [`AnchorAligner`]
//! for the alignments of the anchor pool against one contig at a time.
//! [`crate::runner::BwaAligner`] is the production implementation.

use crate::alignment::AlignmentBatch;
use crate::contig::{Anchor, Contig};
use crate::error::Result;

/// Aligns a fixed pool of anchors against one reference contig per call.
pub trait AnchorAligner {
    /// Stores the anchor pool used by every subsequent
    /// [`align_anchors`](AnchorAligner::align_anchors) call. Called once per
    /// run, before any alignment.
    fn load_anchors(&mut self, anchors: &[Anchor]) -> Result<()>;

    /// Aligns the anchor pool against `contig`.
    ///
    /// An empty batch means the contig has no candidate extension. Record
    /// order is unspecified.
    fn align_anchors(&mut self, contig: &Contig) -> Result<AlignmentBatch>;
}

impl<A: AnchorAligner + ?Sized> AnchorAligner for &mut A {
    fn load_anchors(&mut self, anchors: &[Anchor]) -> Result<()> {
        (**self).load_anchors(anchors)
    }

    fn align_anchors(&mut self, contig: &Contig) -> Result<AlignmentBatch> {
        (**self).align_anchors(contig)
    }
}

impl<A: AnchorAligner + ?Sized> AnchorAligner for Box<A> {
    fn load_anchors(&mut self, anchors: &[Anchor]) -> Result<()> {
        (**self).load_anchors(anchors)
    }

    fn align_anchors(&mut self, contig: &Contig) -> Result<AlignmentBatch> {
        (**self).align_anchors(contig)
    }
}

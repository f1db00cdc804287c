//! Generic `BlobTracker` trait for the color-signature camera.
//!
//! The tracker runs on its own and raises a "new data" edge whenever it has
//! a fresh detection.  The edge stays raised until the consumer calls
//! [`BlobTracker::mark_processed`].

use bbc_types::{BbcError, BlobReading};

/// A camera that reports the largest blob matching one of its trained color
/// signatures.
pub trait BlobTracker {
    /// Open the tracker and start tracking.
    ///
    /// # Errors
    ///
    /// Returns [`BbcError::CollaboratorInit`] if the camera does not respond.
    /// The caller must treat this as fatal.
    fn open(&mut self) -> Result<(), BbcError>;

    /// `true` while an unprocessed detection is available.
    fn has_new_data(&self) -> bool;

    /// Return the most recent detection.
    fn consume_data(&mut self) -> BlobReading;

    /// Lower the "new data" edge.
    fn mark_processed(&mut self);
}

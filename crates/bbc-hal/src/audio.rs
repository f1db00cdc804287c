//! Generic `Audio` trait for the piezo speaker.

/// Fire-and-forget playback of pre-recorded cue sequences.
pub trait Audio {
    /// Start playing the sequence identified by `id`.  Unknown ids are ignored.
    fn play_sequence(&mut self, id: u8);
}

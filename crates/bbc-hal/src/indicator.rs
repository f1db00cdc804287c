//! Generic `Indicator` trait for the on-board debug LEDs.

/// The LEDs the core toggles while sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Led {
    Green,
    Red,
}

/// A bank of discrete on/off indicators.
pub trait Indicator {
    /// Flip `led` to the opposite state.
    fn toggle(&mut self, led: Led);

    /// Light `led`.
    fn set(&mut self, led: Led);

    /// Extinguish `led`.
    fn clear(&mut self, led: Led);

    /// Return `true` if `led` is currently lit.
    fn is_lit(&self, led: Led) -> bool;
}

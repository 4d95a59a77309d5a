//! Operator-input and indicator vocabulary.
//!
//! Buttons and axes are named by small integer ids.  Each control tick the
//! host samples every source once into an [`InputSnapshot`]; triggers and
//! commands read only that snapshot, so every consumer sees the same values
//! within a tick.

/// Number of button slots in an [`InputSnapshot`].
pub const MAX_BUTTONS: usize = 64;
/// Number of axis slots in an [`InputSnapshot`].
pub const MAX_AXES: usize = 16;

/// A named boolean input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ButtonId(pub u8);

/// A named continuous input source, nominally in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisId(pub u8);

/// A boolean-settable indicator (button LED, dashboard lamp).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndicatorId(pub u8);

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One tick's worth of operator input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSnapshot {
    buttons: [bool; MAX_BUTTONS],
    axes: [f32; MAX_AXES],
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self {
            buttons: [false; MAX_BUTTONS],
            axes: [0.0; MAX_AXES],
        }
    }
}

impl InputSnapshot {
    /// Out-of-range ids read as released.
    pub fn button(&self, id: ButtonId) -> bool {
        self.buttons.get(id.0 as usize).copied().unwrap_or(false)
    }

    /// Out-of-range ids and non-finite samples read as centered.
    pub fn axis(&self, id: AxisId) -> f32 {
        self.axes
            .get(id.0 as usize)
            .copied()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }

    pub fn set_button(&mut self, id: ButtonId, pressed: bool) {
        if let Some(slot) = self.buttons.get_mut(id.0 as usize) {
            *slot = pressed;
        }
    }

    pub fn set_axis(&mut self, id: AxisId, value: f32) {
        if let Some(slot) = self.axes.get_mut(id.0 as usize) {
            *slot = value;
        }
    }

    /// Builder form of [`set_button`](Self::set_button).
    #[must_use]
    pub fn with_button(mut self, id: ButtonId, pressed: bool) -> Self {
        self.set_button(id, pressed);
        self
    }

    /// Builder form of [`set_axis`](Self::set_axis).
    #[must_use]
    pub fn with_axis(mut self, id: AxisId, value: f32) -> Self {
        self.set_axis(id, value);
        self
    }
}

// ---------------------------------------------------------------------------
// Context-side traits
// ---------------------------------------------------------------------------

/// Implemented by a control context so triggers can read this tick's input.
pub trait OperatorInput {
    fn button(&self, id: ButtonId) -> bool;
    fn axis(&self, id: AxisId) -> f32;
}

impl OperatorInput for InputSnapshot {
    fn button(&self, id: ButtonId) -> bool {
        InputSnapshot::button(self, id)
    }

    fn axis(&self, id: AxisId) -> f32 {
        InputSnapshot::axis(self, id)
    }
}

/// Implemented by a control context so indicator bindings can write lamps.
pub trait IndicatorOutput {
    fn set_indicator(&mut self, id: IndicatorId, on: bool);
}

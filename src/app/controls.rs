//! Operator-interface map: which physical control is which id.
//!
//! Three devices share one [`InputSnapshot`](crate::io::InputSnapshot): an
//! Xbox-style controller, a launchpad button box and a flight joystick.
//! Button ids are partitioned per device.

use crate::io::{AxisId, ButtonId, IndicatorId};

/// Xbox-style drive controller.
pub mod controller {
    use super::{AxisId, ButtonId};

    pub const A: ButtonId = ButtonId(0);
    pub const B: ButtonId = ButtonId(1);
    pub const X: ButtonId = ButtonId(2);
    pub const Y: ButtonId = ButtonId(3);
    pub const LEFT_BUMPER: ButtonId = ButtonId(4);
    pub const RIGHT_BUMPER: ButtonId = ButtonId(5);

    pub const LEFT_X: AxisId = AxisId(0);
    pub const LEFT_Y: AxisId = AxisId(1);
    /// Triggers read 0 (released) to 1 (fully pulled).
    pub const LEFT_TRIGGER: AxisId = AxisId(2);
    pub const RIGHT_TRIGGER: AxisId = AxisId(3);
}

/// Launchpad button box.
pub mod launchpad {
    use super::{AxisId, ButtonId, IndicatorId};

    pub const BUTTON_A: ButtonId = ButtonId(16);
    pub const BUTTON_B: ButtonId = ButtonId(17);
    pub const BUTTON_C: ButtonId = ButtonId(18);
    pub const BUTTON_D: ButtonId = ButtonId(19);
    pub const BUTTON_E: ButtonId = ButtonId(20);
    pub const BUTTON_F: ButtonId = ButtonId(21);
    pub const BUTTON_G: ButtonId = ButtonId(22);
    pub const BUTTON_H: ButtonId = ButtonId(23);
    pub const BUTTON_I: ButtonId = ButtonId(24);
    /// Covered "missile" switches.
    pub const MISSILE_A: ButtonId = ButtonId(25);
    pub const MISSILE_B: ButtonId = ButtonId(26);

    pub const AXIS_A: AxisId = AxisId(4);
    pub const AXIS_B: AxisId = AxisId(5);

    // Button LEDs share the button's letter.
    pub const LED_A: IndicatorId = IndicatorId(0);
    pub const LED_B: IndicatorId = IndicatorId(1);
    pub const LED_C: IndicatorId = IndicatorId(2);
    pub const LED_D: IndicatorId = IndicatorId(3);
    pub const LED_E: IndicatorId = IndicatorId(4);
    pub const LED_F: IndicatorId = IndicatorId(5);
    pub const LED_G: IndicatorId = IndicatorId(6);
    pub const LED_H: IndicatorId = IndicatorId(7);
    pub const LED_I: IndicatorId = IndicatorId(8);
    pub const BIG_LED_GREEN: IndicatorId = IndicatorId(9);
    pub const BIG_LED_RED: IndicatorId = IndicatorId(10);
}

/// Flight joystick used for manual overrides.
pub mod joystick {
    use super::{AxisId, ButtonId};

    pub const BUTTON_1: ButtonId = ButtonId(32);
    pub const BUTTON_2: ButtonId = ButtonId(33);
    pub const BUTTON_3: ButtonId = ButtonId(34);
    pub const BUTTON_4: ButtonId = ButtonId(35);
    pub const TRIGGER: ButtonId = ButtonId(36);

    pub const AXIS_X: AxisId = AxisId(6);
    pub const AXIS_Y: AxisId = AxisId(7);
}

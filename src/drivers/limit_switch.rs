//! Active-low limit switch.
//!
//! Normally-open switch to ground with a pull-up: the input reads low while
//! the mechanism is seated on it.

use embedded_hal::digital::InputPin;

pub struct LimitSwitch<P> {
    pin: P,
}

impl<P: InputPin> LimitSwitch<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    pub fn is_pressed(&mut self) -> Result<bool, P::Error> {
        self.pin.is_low()
    }

    /// Sample for a sensor frame.  A failed read reports no sample, which
    /// the sensor hub ages like any missing reading.
    pub fn sample(&mut self) -> Option<bool> {
        self.is_pressed().ok()
    }

    pub fn pin_mut(&mut self) -> &mut P {
        &mut self.pin
    }
}

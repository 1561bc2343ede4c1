//! Digital input access
//!
//! The scan loop reads inputs through the [`InputSource`] trait; the GPIO
//! implementation resolves every configured pin once at startup so reads on
//! the hot path are plain register reads that cannot fail.

use rppal::gpio::{Gpio, InputPin};
use thiserror::Error;

/// Index into the set of inputs resolved at startup. Stable for the process
/// lifetime; each channel holds exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputHandle(pub usize);

/// Source of digital input reads. Reads are non-blocking and instantaneous.
pub trait InputSource {
    fn read_digital(&self, handle: InputHandle) -> bool;
}

/// Errors while acquiring hardware inputs at startup
#[derive(Debug, Error)]
pub enum InputError {
    #[error("GPIO peripheral unavailable")]
    Gpio(#[source] rppal::gpio::Error),

    #[error("failed to acquire BCM pin {pin}")]
    Pin {
        pin: u8,
        #[source]
        source: rppal::gpio::Error,
    },
}

/// Inputs backed by Raspberry Pi GPIO pins, configured with pull-ups.
///
/// Handles index into the acquisition order, which follows the channel
/// configuration order.
pub struct GpioInputSource {
    pins: Vec<InputPin>,
}

impl GpioInputSource {
    /// Acquire all configured BCM pins. Fails fast if the GPIO peripheral is
    /// missing or any pin is already claimed.
    pub fn new(bcm_pins: &[u8]) -> Result<Self, InputError> {
        let gpio = Gpio::new().map_err(InputError::Gpio)?;
        let mut pins = Vec::with_capacity(bcm_pins.len());
        for &pin in bcm_pins {
            let acquired = gpio
                .get(pin)
                .map_err(|source| InputError::Pin { pin, source })?;
            pins.push(acquired.into_input_pullup());
        }
        Ok(Self { pins })
    }
}

impl InputSource for GpioInputSource {
    fn read_digital(&self, handle: InputHandle) -> bool {
        self.pins[handle.0].is_high()
    }
}

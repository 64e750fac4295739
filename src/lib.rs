//! A driver for WCS linear Hall-effect current sensors read through an
//! [`embedded-hal`](embedded_hal) ADC.
//!
//! The sensor outputs a voltage proportional to the current through it,
//! centered on a zero offset (half the supply voltage). Raw ADC values
//! are converted to that voltage and then to a current in amperes, using
//! the datasheet calibration for the selected [`SensorModel`].
//!
//! # Features
//!
//! - **`defmt`**: Derive `defmt::Format` on the public data types and log
//!   acquisitions and calibration changes.
//!
//! # Examples
//!
//! ```
//! use linear_hall_current::{Config, HallCurrentSensor, SensorModel};
//! # use embedded_hal_mock::{
//! #     adc::{Mock, MockChan0, Transaction},
//! #     delay::MockNoop,
//! # };
//! #
//! # let expectations: [Transaction<u16>; 1] = [Transaction::read(0, 0)];
//! # let mut adc = Mock::new(&expectations);
//! # let mut delay = MockNoop::new();
//! # let pin = MockChan0 {};
//!
//! let config = Config {
//!     model: SensorModel::Wcs38A25,
//!     supply_voltage: 5.0,
//!     precision: 10,
//! };
//!
//! let mut sensor = HallCurrentSensor::new(pin, config);
//! let reading = sensor.describe(&mut adc, &mut delay, true).unwrap();
//!
//! assert_eq!(
//!     reading.to_string(),
//!     "Analog value: 0\nVoltage: 0.0000V\nCurrent: -0.3571A"
//! );
//! ```

#![cfg_attr(not(test), no_std)]

pub mod calibration;
mod hall_sensor;
mod source;

pub use calibration::{Calibration, SensorModel};
pub use hall_sensor::{AdcError, Config, HallCurrentSensor, Reading};
pub use source::SampleSource;

use crate::calibration::SensorModel;
use crate::source::SampleSource;
use core::fmt;
use core::num::NonZeroU8;
use embedded_hal::adc::{Channel, OneShot};
use embedded_hal::blocking::delay::DelayMs;

/// Configuration for a `HallCurrentSensor`.
///
/// - `model`: The sensor part connected to the ADC pin
/// - `supply_voltage`: The voltage powering the sensor, which is also the ADC reference (V)
/// - `precision`: The precision of the ADC in bits (eg. for 10-bit precision, use `10`)
///
/// # Examples
///
/// ```
/// use linear_hall_current::{Config, SensorModel};
///
/// let config = Config {
///     model: SensorModel::Wcs1800,
///     supply_voltage: 3.3, // 3.3 V
///     precision: 12,       // 12 bits of precision
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub model: SensorModel,
    pub supply_voltage: f32,
    pub precision: u8,
}

/// One acquisition converted to voltage and current.
///
/// Displays as three lines:
///
/// ```text
/// Analog value: 512
/// Voltage: 2.5024V
/// Current: 0.2222A
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// Averaged raw ADC value
    pub raw: u32,
    /// Sensor output voltage (V)
    pub voltage: f32,
    /// Current through the sensor (A)
    pub current: f32,
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Analog value: {}\nVoltage: {:.4}V\nCurrent: {:.4}A",
            self.raw, self.voltage, self.current
        )
    }
}

/// A linear Hall-effect current sensor wired to an ADC pin.
///
/// Samples come from the ADC passed to each read, unless a
/// [`SampleSource`] has been installed, in which case the source is used
/// instead.
#[derive(Debug)]
pub struct HallCurrentSensor<Pin, S = fn() -> u32> {
    pin: Pin,
    model: SensorModel,
    supply_voltage: f32,
    adc_max_value: u32,
    zero_offset: f32,
    sensitivity: f32,
    sample_count: NonZeroU8,
    sample_delay_ms: u16,
    last_raw: u32,
    sample_source: Option<S>,
}

/// The error returned by the `OneShot` ADC a sensor is read with.
pub type AdcError<Adc, ADC, Word, Pin> = <Adc as OneShot<ADC, Word, Pin>>::Error;

impl<Pin> HallCurrentSensor<Pin> {
    /// Returns a sensor reading from `pin`, calibrated with the datasheet
    /// values for `config.model` at `config.supply_voltage`.
    ///
    /// `config.precision` must be between 1 and 32 bits or this function
    /// will panic when running in debug mode.
    ///
    /// # Examples
    ///
    /// ```
    /// use linear_hall_current::{Config, HallCurrentSensor, SensorModel};
    /// # use embedded_hal_mock::adc::MockChan0;
    /// #
    /// # let pin = MockChan0 {};
    ///
    /// let config = Config {
    ///     model: SensorModel::Wcs1500,
    ///     supply_voltage: 5.0,
    ///     precision: 10,
    /// };
    ///
    /// let sensor = HallCurrentSensor::new(pin, config);
    ///
    /// assert_eq!(sensor.adc_max_value(), 1023);
    /// assert_eq!(sensor.zero_offset(), 2.5);
    /// ```
    pub fn new<ADC>(pin: Pin, config: Config) -> Self
    where
        Pin: Channel<ADC>,
    {
        debug_assert!(
            (1..=32).contains(&config.precision),
            "The ADC precision must be between 1 and 32 bits"
        );

        let precision = u32::from(config.precision.clamp(1, 32));
        let calibration = config.model.calibration(config.supply_voltage);

        Self {
            pin,
            model: config.model,
            supply_voltage: config.supply_voltage,
            adc_max_value: u32::MAX >> (32 - precision),
            zero_offset: calibration.zero_offset,
            sensitivity: calibration.sensitivity,
            sample_count: NonZeroU8::MIN,
            sample_delay_ms: 0,
            last_raw: 0,
            sample_source: None,
        }
    }
}

impl<Pin, S> HallCurrentSensor<Pin, S> {
    /// Destroys the sensor and returns the `Pin`.
    pub fn free(self) -> Pin {
        self.pin
    }

    /// Reads samples from `source` instead of the ADC.
    pub fn set_sample_source(&mut self, source: S) {
        self.sample_source = Some(source);
    }

    /// Goes back to reading samples from the ADC.
    pub fn clear_sample_source(&mut self) {
        self.sample_source = None;
    }

    /// Returns the sensor reading samples from `source` instead of the ADC.
    ///
    /// Unlike [`set_sample_source`](HallCurrentSensor::set_sample_source)
    /// this accepts any kind of source, such as a capturing closure.
    /// Calibration, oversampling settings and the cached raw value are kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use linear_hall_current::{Config, HallCurrentSensor, SensorModel};
    /// # use embedded_hal_mock::{
    /// #     adc::{Mock, MockChan0, Transaction},
    /// #     delay::MockNoop,
    /// # };
    /// #
    /// # let expectations: [Transaction<u16>; 0] = [];
    /// # let mut adc = Mock::new(&expectations);
    /// # let mut delay = MockNoop::new();
    /// # let pin = MockChan0 {};
    ///
    /// let config = Config {
    ///     model: SensorModel::Wcs1600,
    ///     supply_voltage: 5.0,
    ///     precision: 10,
    /// };
    ///
    /// let mut level = 0u32;
    /// let mut sensor = HallCurrentSensor::new(pin, config).with_sample_source(move || {
    ///     level += 100;
    ///     level
    /// });
    ///
    /// assert_eq!(sensor.read_raw(&mut adc, &mut delay, true), Ok(100));
    /// assert_eq!(sensor.read_raw(&mut adc, &mut delay, true), Ok(200));
    /// ```
    pub fn with_sample_source<T>(self, source: T) -> HallCurrentSensor<Pin, T>
    where
        T: SampleSource,
    {
        HallCurrentSensor {
            pin: self.pin,
            model: self.model,
            supply_voltage: self.supply_voltage,
            adc_max_value: self.adc_max_value,
            zero_offset: self.zero_offset,
            sensitivity: self.sensitivity,
            sample_count: self.sample_count,
            sample_delay_ms: self.sample_delay_ms,
            last_raw: self.last_raw,
            sample_source: Some(source),
        }
    }

    /// Returns the sensor model the calibration was taken from.
    pub fn model(&self) -> SensorModel {
        self.model
    }

    /// Returns the supply and ADC reference voltage (V).
    pub fn supply_voltage(&self) -> f32 {
        self.supply_voltage
    }

    /// Returns the largest raw value the ADC can produce (`2^precision - 1`).
    pub fn adc_max_value(&self) -> u32 {
        self.adc_max_value
    }

    /// Returns the raw value cached by the last acquisition.
    pub fn last_raw(&self) -> u32 {
        self.last_raw
    }

    /// Returns the most negative current the sensor model can measure (A).
    pub fn min_current(&self) -> f32 {
        self.model.min_current()
    }

    /// Returns the largest current the sensor model can measure (A).
    pub fn max_current(&self) -> f32 {
        self.model.max_current()
    }

    /// Returns the output voltage corresponding to zero current (V).
    pub fn zero_offset(&self) -> f32 {
        self.zero_offset
    }

    /// Overrides the output voltage corresponding to zero current (V),
    /// eg. after measuring it with no load.
    pub fn set_zero_offset(&mut self, volts: f32) {
        #[cfg(feature = "defmt")]
        defmt::debug!("zero offset set to {} V", volts);

        self.zero_offset = volts;
    }

    /// Returns the sensitivity (V/A).
    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    /// Overrides the sensitivity (V/A).
    ///
    /// The value is not checked. A sensitivity of zero makes
    /// [`read_current`](HallCurrentSensor::read_current) return an
    /// infinite or NaN current, and a negative one flips its sign.
    pub fn set_sensitivity(&mut self, volts_per_amp: f32) {
        #[cfg(feature = "defmt")]
        defmt::debug!("sensitivity set to {} V/A", volts_per_amp);

        self.sensitivity = volts_per_amp;
    }

    /// Returns how many samples are averaged for each acquisition.
    pub fn sample_count(&self) -> NonZeroU8 {
        self.sample_count
    }

    /// Sets how many samples are averaged for each acquisition.
    ///
    /// The count can't be zero, so an acquisition always takes at least
    /// one sample:
    ///
    /// ```compile_fail
    /// use linear_hall_current::{Config, HallCurrentSensor, SensorModel};
    /// # use embedded_hal_mock::adc::MockChan0;
    /// #
    /// # let pin = MockChan0 {};
    ///
    /// let config = Config {
    ///     model: SensorModel::Wcs1500,
    ///     supply_voltage: 5.0,
    ///     precision: 10,
    /// };
    ///
    /// let mut sensor = HallCurrentSensor::new(pin, config);
    /// sensor.set_sample_count(0);
    /// ```
    pub fn set_sample_count(&mut self, count: NonZeroU8) {
        #[cfg(feature = "defmt")]
        defmt::debug!("averaging {} samples", count.get());

        self.sample_count = count;
    }

    /// Returns the delay after each sample of an acquisition (ms).
    pub fn sample_delay(&self) -> u16 {
        self.sample_delay_ms
    }

    /// Sets the delay after each sample of an acquisition (ms). `0` disables it.
    pub fn set_sample_delay(&mut self, ms: u16) {
        #[cfg(feature = "defmt")]
        defmt::debug!("sample delay set to {} ms", ms);

        self.sample_delay_ms = ms;
    }

    fn voltage_from_raw(&self, raw: u32) -> f32 {
        self.supply_voltage / self.adc_max_value as f32 * raw as f32
    }

    fn current_from_raw(&self, raw: u32) -> f32 {
        (self.voltage_from_raw(raw) - self.zero_offset) / self.sensitivity
    }
}

impl<Pin, S> HallCurrentSensor<Pin, S>
where
    S: SampleSource,
{
    /// Returns the raw value of the sensor.
    ///
    /// If `refresh` is `true`, takes [`sample_count`](HallCurrentSensor::sample_count)
    /// samples, waiting [`sample_delay`](HallCurrentSensor::sample_delay)
    /// milliseconds after each one, and caches their integer average.
    /// Otherwise returns the cached value without touching `adc` or `delay`.
    ///
    /// If the ADC fails, the acquisition is abandoned and the cached value
    /// is left as it was.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::num::NonZeroU8;
    /// use linear_hall_current::{Config, HallCurrentSensor, SensorModel};
    /// # use embedded_hal_mock::{
    /// #     adc::{Mock, MockChan0, Transaction},
    /// #     delay::MockNoop,
    /// # };
    /// #
    /// # let expectations: [Transaction<u16>; 2] = [
    /// #     Transaction::read(0, 500),
    /// #     Transaction::read(0, 503),
    /// # ];
    /// # let mut adc = Mock::new(&expectations);
    /// # let mut delay = MockNoop::new();
    /// # let pin = MockChan0 {};
    ///
    /// let config = Config {
    ///     model: SensorModel::Wcs2800,
    ///     supply_voltage: 5.0,
    ///     precision: 10,
    /// };
    ///
    /// let mut sensor = HallCurrentSensor::new(pin, config);
    /// sensor.set_sample_count(NonZeroU8::new(2).unwrap());
    ///
    /// // Samples of 500 and 503 average to 501
    /// assert_eq!(sensor.read_raw(&mut adc, &mut delay, true), Ok(501));
    /// assert_eq!(sensor.read_raw(&mut adc, &mut delay, false), Ok(501));
    /// ```
    pub fn read_raw<Adc, ADC, Word, D>(
        &mut self,
        adc: &mut Adc,
        delay: &mut D,
        refresh: bool,
    ) -> Result<u32, AdcError<Adc, ADC, Word, Pin>>
    where
        Word: Into<u32>,
        Pin: Channel<ADC>,
        Adc: OneShot<ADC, Word, Pin>,
        D: DelayMs<u16>,
    {
        if !refresh {
            return Ok(self.last_raw);
        }

        let count = self.sample_count.get();
        let mut sum: u64 = 0;

        for _ in 0..count {
            let sample: u32 = match self.sample_source.as_mut() {
                Some(source) => source.sample(),
                None => nb::block!(adc.read(&mut self.pin))?.into(),
            };
            sum += u64::from(sample);

            if self.sample_delay_ms > 0 {
                delay.delay_ms(self.sample_delay_ms);
            }
        }

        // the average of u32 samples always fits in a u32
        self.last_raw = (sum / u64::from(count)) as u32;

        #[cfg(feature = "defmt")]
        defmt::trace!("raw value {} averaged over {} samples", self.last_raw, count);

        Ok(self.last_raw)
    }

    /// Returns the sensor output voltage (V), scaling the raw value
    /// linearly from `0..=adc_max_value` to `0..=supply_voltage`.
    ///
    /// `refresh` is passed on to [`read_raw`](HallCurrentSensor::read_raw).
    pub fn read_voltage<Adc, ADC, Word, D>(
        &mut self,
        adc: &mut Adc,
        delay: &mut D,
        refresh: bool,
    ) -> Result<f32, AdcError<Adc, ADC, Word, Pin>>
    where
        Word: Into<u32>,
        Pin: Channel<ADC>,
        Adc: OneShot<ADC, Word, Pin>,
        D: DelayMs<u16>,
    {
        let raw = self.read_raw(adc, delay, refresh)?;
        Ok(self.voltage_from_raw(raw))
    }

    /// Returns the current through the sensor (A). The sign gives the
    /// direction of the current relative to the sensor's orientation.
    ///
    /// `refresh` is passed on to [`read_raw`](HallCurrentSensor::read_raw).
    ///
    /// # Examples
    ///
    /// ```
    /// use linear_hall_current::{Config, HallCurrentSensor, SensorModel};
    /// # use embedded_hal_mock::{
    /// #     adc::{Mock, MockChan0, Transaction},
    /// #     delay::MockNoop,
    /// # };
    /// #
    /// # let expectations: [Transaction<u16>; 1] = [Transaction::read(0, 0)];
    /// # let mut adc = Mock::new(&expectations);
    /// # let mut delay = MockNoop::new();
    /// # let pin = MockChan0 {};
    ///
    /// let config = Config {
    ///     model: SensorModel::Wcs38A25,
    ///     supply_voltage: 5.0,
    ///     precision: 10,
    /// };
    ///
    /// let mut sensor = HallCurrentSensor::new(pin, config);
    ///
    /// // With the output at 0 V, the current is -2.5 V / 7 V/A
    /// let current = sensor.read_current(&mut adc, &mut delay, true).unwrap();
    /// assert!((current + 0.35714).abs() < 1e-4);
    /// ```
    pub fn read_current<Adc, ADC, Word, D>(
        &mut self,
        adc: &mut Adc,
        delay: &mut D,
        refresh: bool,
    ) -> Result<f32, AdcError<Adc, ADC, Word, Pin>>
    where
        Word: Into<u32>,
        Pin: Channel<ADC>,
        Adc: OneShot<ADC, Word, Pin>,
        D: DelayMs<u16>,
    {
        let raw = self.read_raw(adc, delay, refresh)?;
        Ok(self.current_from_raw(raw))
    }

    /// Returns the raw value, voltage and current of a single acquisition.
    ///
    /// At most one acquisition is made. Voltage and current are computed
    /// from the same raw value.
    pub fn describe<Adc, ADC, Word, D>(
        &mut self,
        adc: &mut Adc,
        delay: &mut D,
        refresh: bool,
    ) -> Result<Reading, AdcError<Adc, ADC, Word, Pin>>
    where
        Word: Into<u32>,
        Pin: Channel<ADC>,
        Adc: OneShot<ADC, Word, Pin>,
        D: DelayMs<u16>,
    {
        let raw = self.read_raw(adc, delay, refresh)?;

        Ok(Reading {
            raw,
            voltage: self.voltage_from_raw(raw),
            current: self.current_from_raw(raw),
        })
    }
}

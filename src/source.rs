/// Something that can produce raw samples in place of the ADC.
///
/// Installed on a [`HallCurrentSensor`](crate::HallCurrentSensor) with
/// [`set_sample_source`](crate::HallCurrentSensor::set_sample_source) or
/// [`with_sample_source`](crate::HallCurrentSensor::with_sample_source).
/// Samples must use the same scale as the ADC the sensor was configured
/// for (`0..=2^precision - 1`).
///
/// Samples are unsigned like ADC codes. A source that wants to apply its
/// own offset correction must clamp the result at zero, since the
/// conversion to voltage assumes `0` means 0 V.
///
/// Any `FnMut() -> u32` is a sample source.
pub trait SampleSource {
    /// Produces the next raw sample.
    fn sample(&mut self) -> u32;
}

impl<F> SampleSource for F
where
    F: FnMut() -> u32,
{
    fn sample(&mut self) -> u32 {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::SampleSource;

    fn constant() -> u32 {
        512
    }

    #[test]
    fn function_pointer() {
        let mut source: fn() -> u32 = constant;
        assert_eq!(source.sample(), 512);
    }

    #[test]
    fn closure() {
        let mut next = 0;
        let mut source = || {
            next += 10;
            next
        };

        assert_eq!(source.sample(), 10);
        assert_eq!(source.sample(), 20);
    }

    #[test]
    fn offset_correction_saturates_at_zero() {
        let mut readings = [520u32, 4].into_iter();
        let mut source = move || readings.next().unwrap_or(0).saturating_sub(8);

        assert_eq!(source.sample(), 512);
        assert_eq!(source.sample(), 0);
    }
}

use uom::si::{
    f64::{TemperatureInterval, ThermodynamicTemperature},
    temperature_interval::kelvin as delta_kelvin,
    thermodynamic_temperature::kelvin as abs_kelvin,
};

/// Extension trait for subtracting absolute temperatures.
///
/// `uom` does not define `ThermodynamicTemperature - ThermodynamicTemperature`
/// as a [`TemperatureInterval`]; see
/// [#380](https://github.com/iliekturtles/uom/issues/380).
pub trait TemperatureDifference {
    /// Returns the temperature difference `self - other`.
    fn minus(self, other: Self) -> TemperatureInterval;

    /// Returns the absolute temperature `delta` below `self`.
    fn lowered_by(self, delta: TemperatureInterval) -> Self;
}

impl TemperatureDifference for ThermodynamicTemperature {
    fn minus(self, other: Self) -> TemperatureInterval {
        TemperatureInterval::new::<delta_kelvin>(
            self.get::<abs_kelvin>() - other.get::<abs_kelvin>(),
        )
    }

    fn lowered_by(self, delta: TemperatureInterval) -> Self {
        ThermodynamicTemperature::new::<abs_kelvin>(
            self.get::<abs_kelvin>() - delta.get::<delta_kelvin>(),
        )
    }
}

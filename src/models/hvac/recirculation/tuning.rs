use tracing::info;
use uom::si::{
    f64::{Ratio, TemperatureInterval, ThermodynamicTemperature, Time, VolumeRate},
    ratio::{part_per_million, percent, ratio},
    thermodynamic_temperature::degree_celsius,
    time::second,
    volume_rate::cubic_meter_per_second,
};

use crate::support::{
    constraint::{Constrained, UnitIntervalOpen},
    feedback::Gains,
    psychro::{saturation_mass_fraction, specific_humidity, vapor_mass_fraction},
    units::TemperatureDifference,
};

use super::TuningError;

/// Outside air conditions the vapor loop is tuned against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ambient {
    /// Outside air temperature.
    pub temperature: ThermodynamicTemperature,

    /// Outside relative humidity, strictly between 0 and 1.
    pub relative_humidity: Constrained<Ratio, UnitIntervalOpen>,
}

/// Occupant and ventilation figures used to size the vapor loop.
///
/// The defaults describe one resting adult in a small cabin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccupantLoad {
    /// Volume of air breathed out.
    pub breathing_rate: VolumeRate,

    /// CO2 concentration of exhaled air.
    pub exhaled_co2: Ratio,

    /// Fresh air volume flow entering the cabin.
    pub fresh_air_flow: VolumeRate,

    /// CO2 concentration of outside air.
    pub ambient_co2: Ratio,

    /// Temperature of exhaled air.
    pub breath_temperature: ThermodynamicTemperature,

    /// Relative humidity of exhaled air when estimating the moisture load.
    pub breath_relative_humidity: Ratio,

    /// Relative humidity of exhaled air when estimating the settling time.
    pub settling_relative_humidity: Ratio,

    /// Empirical multiplier on the settling time estimate.
    pub settling_factor: f64,
}

impl Default for OccupantLoad {
    fn default() -> Self {
        Self {
            breathing_rate: VolumeRate::new::<cubic_meter_per_second>(1.5e-4),
            exhaled_co2: Ratio::new::<part_per_million>(40_000.0),
            fresh_air_flow: VolumeRate::new::<cubic_meter_per_second>(0.0803),
            ambient_co2: Ratio::new::<part_per_million>(420.0),
            breath_temperature: ThermodynamicTemperature::new::<degree_celsius>(37.0),
            breath_relative_humidity: Ratio::new::<percent>(95.0),
            settling_relative_humidity: Ratio::new::<percent>(90.0),
            settling_factor: 5.7,
        }
    }
}

/// Gains derived for the vapor loop, with the intermediate figures behind them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VaporTuning {
    /// Proportional and integral gains; both negative.
    pub gains: Gains,

    /// Mass fraction headroom between ambient air and saturation at
    /// `dew_point_margin` below ambient temperature.
    pub humidity_margin: Ratio,

    /// Recirculation ratio expected at equilibrium.
    pub steady_state_recirculation: Ratio,

    /// Expected settling time; the integral gain is `kp / settling_time`.
    pub settling_time: Time,
}

/// Estimates the recirculation ratio the cabin settles at.
///
/// Two mass balances bound it from above: keeping CO2 at `co2_setpoint`
/// against the occupant's exhalation, and keeping cabin moisture below
/// saturation at `dew_point_margin` below ambient. The tighter of the two
/// wins and its magnitude is returned.
///
/// # Errors
///
/// Returns [`TuningError::Psychro`] if a humidity relation fails, or
/// [`TuningError::Co2SetpointAtAmbient`] if the setpoint does not exceed the
/// outside CO2 level.
pub fn steady_state_recirculation(
    ambient: &Ambient,
    co2_setpoint: Ratio,
    dew_point_margin: TemperatureInterval,
    load: &OccupantLoad,
) -> Result<Ratio, TuningError> {
    let breathing = load.breathing_rate.get::<cubic_meter_per_second>();
    let fresh = load.fresh_air_flow.get::<cubic_meter_per_second>();

    let co2_headroom = (co2_setpoint - load.ambient_co2).get::<part_per_million>();
    if co2_headroom <= 0.0 {
        return Err(TuningError::Co2SetpointAtAmbient {
            setpoint_ppm: co2_setpoint.get::<part_per_million>(),
            ambient_ppm: load.ambient_co2.get::<part_per_million>(),
        });
    }
    let co2_bound =
        1.0 - breathing * load.exhaled_co2.get::<part_per_million>() / (fresh * co2_headroom);

    let q_ambient = ambient_humidity(ambient)?;
    let q_limit = specific_humidity(
        ambient.temperature.lowered_by(dew_point_margin),
        Ratio::new::<ratio>(1.0),
    )?
    .get::<ratio>();
    let q_breath =
        specific_humidity(load.breath_temperature, load.breath_relative_humidity)?.get::<ratio>();
    let humidity_bound = 1.0 / (1.0 + (breathing * q_breath / fresh) / (q_limit - q_ambient));

    Ok(Ratio::new::<ratio>(humidity_bound.min(co2_bound).abs()))
}

/// Derives the vapor loop gains for `ambient` conditions.
///
/// ```text
/// kp = -(1 - RH) * (1 + (T_amb[°C] + 20) / 20) / dx
/// ki = kp / t_settle
/// t_settle = r_ss * factor * dx / (V_breath * q_breath)
/// ```
///
/// where `dx` is the humidity margin and `r_ss` the steady-state
/// recirculation ratio.
///
/// # Errors
///
/// Returns a [`TuningError`] if a humidity relation fails, the ambient air
/// leaves no humidity margin, or the CO2 setpoint is not above ambient.
pub fn vapor_tuning(
    ambient: &Ambient,
    co2_setpoint: Ratio,
    dew_point_margin: TemperatureInterval,
    load: &OccupantLoad,
) -> Result<VaporTuning, TuningError> {
    let x_ambient = vapor_mass_fraction(Ratio::new::<ratio>(ambient_humidity(ambient)?))?;
    let x_limit = saturation_mass_fraction(ambient.temperature.lowered_by(dew_point_margin))?;
    let margin = (x_limit - x_ambient).get::<ratio>();
    if margin <= 0.0 {
        return Err(TuningError::NoHumidityMargin {
            ambient_fraction: x_ambient.get::<ratio>(),
            limit_fraction: x_limit.get::<ratio>(),
        });
    }

    let rh = ambient.relative_humidity.into_inner().get::<ratio>();
    let celsius = ambient.temperature.get::<degree_celsius>();
    let kp = -(1.0 - rh) * (1.0 + (celsius + 20.0) / 20.0) / margin;

    let steady = steady_state_recirculation(ambient, co2_setpoint, dew_point_margin, load)?;
    let q_settle =
        specific_humidity(load.breath_temperature, load.settling_relative_humidity)?.get::<ratio>();
    let settling_time = steady.get::<ratio>() * load.settling_factor * margin
        / (load.breathing_rate.get::<cubic_meter_per_second>() * q_settle);

    let ki = kp / settling_time;

    info!(
        kp,
        ki,
        settling_time_s = settling_time,
        steady_state_recirculation = steady.get::<ratio>(),
        "derived vapor loop tuning"
    );

    Ok(VaporTuning {
        gains: Gains::pi(kp, ki),
        humidity_margin: Ratio::new::<ratio>(margin),
        steady_state_recirculation: steady,
        settling_time: Time::new::<second>(settling_time),
    })
}

fn ambient_humidity(ambient: &Ambient) -> Result<f64, TuningError> {
    let q = specific_humidity(ambient.temperature, ambient.relative_humidity.into_inner())?;
    Ok(q.get::<ratio>())
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::temperature_interval::kelvin as delta_kelvin;

    fn ambient(celsius: f64, rh: f64) -> Ambient {
        Ambient {
            temperature: ThermodynamicTemperature::new::<degree_celsius>(celsius),
            relative_humidity: UnitIntervalOpen::new(Ratio::new::<ratio>(rh)).unwrap(),
        }
    }

    fn one_kelvin() -> TemperatureInterval {
        TemperatureInterval::new::<delta_kelvin>(1.0)
    }

    fn ppm(value: f64) -> Ratio {
        Ratio::new::<part_per_million>(value)
    }

    #[test]
    fn winter_steady_state_is_humidity_bound() {
        let load = OccupantLoad::default();
        let steady =
            steady_state_recirculation(&ambient(-10.0, 0.7), ppm(1000.0), one_kelvin(), &load)
                .unwrap();

        // The CO2 balance alone would allow about 0.87.
        let co2_bound = 1.0 - 1.5e-4 * 40_000.0 / (0.0803 * 580.0);
        assert!(steady.get::<ratio>() < co2_bound);
        assert_relative_eq!(steady.get::<ratio>(), 0.843, epsilon = 5e-3);
    }

    #[test]
    fn winter_vapor_gains() {
        let tuning =
            vapor_tuning(&ambient(-10.0, 0.7), ppm(1000.0), one_kelvin(), &OccupantLoad::default())
                .unwrap();

        assert_relative_eq!(tuning.gains.kp, -1138.7, max_relative = 1e-3);
        assert_relative_eq!(tuning.settling_time.get::<second>(), 339.1, max_relative = 1e-3);
        assert_relative_eq!(
            tuning.gains.ki,
            tuning.gains.kp / tuning.settling_time.get::<second>(),
            max_relative = 1e-12
        );
        assert!(tuning.gains.kd == 0.0);
    }

    #[test]
    fn warmer_ambient_gives_smaller_proportional_gain() {
        let load = OccupantLoad::default();
        let cold = vapor_tuning(&ambient(-10.0, 0.7), ppm(1000.0), one_kelvin(), &load).unwrap();
        let mild = vapor_tuning(&ambient(10.0, 0.7), ppm(1000.0), one_kelvin(), &load).unwrap();

        assert!(cold.gains.kp < 0.0);
        assert!(mild.gains.kp < 0.0);
        assert!(mild.humidity_margin > cold.humidity_margin);
        assert!(mild.gains.kp.abs() < cold.gains.kp.abs());
    }

    #[test]
    fn nearly_saturated_ambient_is_rejected() {
        let result =
            vapor_tuning(&ambient(-10.0, 0.99), ppm(1000.0), one_kelvin(), &OccupantLoad::default());
        assert!(matches!(result, Err(TuningError::NoHumidityMargin { .. })));
    }

    #[test]
    fn co2_setpoint_at_ambient_is_rejected() {
        let result =
            vapor_tuning(&ambient(-10.0, 0.7), ppm(420.0), one_kelvin(), &OccupantLoad::default());
        assert!(matches!(
            result,
            Err(TuningError::Co2SetpointAtAmbient { .. })
        ));
    }
}

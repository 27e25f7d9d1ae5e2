use log::debug;
use ndarray::Zip;

use crate::{
    constants::{KELVIN_OFFSET, KELVIN_THRESHOLD},
    error::FWIError,
    models::{dataset::Dataset, input::InputVariableName, Grid},
};

/// Temperature in °C. Values above 200 are taken as Kelvin.
pub fn to_celsius(temp: f32) -> f32 {
    if temp > KELVIN_THRESHOLD {
        temp - KELVIN_OFFSET
    } else {
        temp
    }
}

/// Relative humidity [%] from temperature and dew point temperature [°C],
/// capped at 100 %.
pub fn relative_humidity(temp: f32, temp_dew: f32) -> f32 {
    let rh = 100.0
        * (f32::exp((17.67 * temp_dew) / (temp_dew + 243.5))
            / f32::exp((17.67 * temp) / (temp + 243.5)));
    if rh > 100.0 {
        100.0
    } else {
        rh
    }
}

/// Wind speed [km/h] from the u and v components [m/s].
pub fn wind_speed_kmh(u: f32, v: f32) -> f32 {
    f32::sqrt(u * u + v * v) * 3.6
}

/// Precipitation depth from metres to millimetres.
pub fn metres_to_mm(value: f32) -> f32 {
    value * 1000.0
}

/// Builds the engine variables (`t2m_C`, `RH`, `windspeed`, `tp` in mm) from
/// the raw reanalysis fields (`t2m`, `d2m`, `u10`, `v10`, `tp`).
///
/// Engine variables already in the dataset are kept as they are. A `tp`
/// variable whose units are `m` is converted to mm in place; it must already
/// be the 24 h total of the day (for ERA5-Land, the 00:00 UTC step of the
/// following day).
pub fn prepare_dataset(raw: &Dataset) -> Result<Dataset, FWIError> {
    use InputVariableName::*;
    let mut dataset = raw.clone();

    let t2m_c_name = t2m_C.to_string();
    if !dataset.contains(&t2m_c_name) {
        debug!("computing {} from {}", t2m_C, t2m);
        let temp = dataset.require(&t2m.to_string())?.mapv(to_celsius);
        dataset.insert(&t2m_c_name, Some(t2m_C.units()), temp)?;
    }

    let rh_name = RH.to_string();
    if !dataset.contains(&rh_name) {
        debug!("computing {} from {} and {}", RH, t2m_C, d2m);
        let temp = dataset.require(&t2m_c_name)?;
        let temp_dew = dataset.require(&d2m.to_string())?;
        let rh: Grid = Zip::from(temp)
            .and(temp_dew)
            .par_map_collect(|&t, &r| relative_humidity(t, to_celsius(r)));
        dataset.insert(&rh_name, Some(RH.units()), rh)?;
    }

    let ws_name = windspeed.to_string();
    if !dataset.contains(&ws_name) {
        debug!("computing {} from {} and {}", windspeed, u10, v10);
        let u = dataset.require(&u10.to_string())?;
        let v = dataset.require(&v10.to_string())?;
        let ws: Grid = Zip::from(u)
            .and(v)
            .par_map_collect(|&u, &v| wind_speed_kmh(u, v));
        dataset.insert(&ws_name, Some(windspeed.units()), ws)?;
    }

    let tp_name = tp.to_string();
    if dataset.units(&tp_name) == Some("m") {
        debug!("converting {} from m to mm", tp);
        let rain = dataset.require(&tp_name)?.mapv(metres_to_mm);
        dataset.insert(&tp_name, Some(tp.units()), rain)?;
    }
    dataset.require(&tp_name)?;

    Ok(dataset)
}

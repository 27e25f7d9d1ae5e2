use chrono::{DateTime, Utc};
use ndarray::Zip;

use serde_derive::{Deserialize, Serialize};
use strum::EnumProperty;
use strum_macros::{Display, EnumIter, EnumProperty, EnumString};

use crate::error::FWIError;

use super::{dataset::Dataset, Grid};

/// Daily weather sample for every cell of the grid.
/// Units are the ones expected by the engine; conversion from raw fields
/// happens upstream (see `modules::functions`).
#[derive(Debug, Clone)]
pub struct WeatherSample {
    /// air temperature [°C]
    pub temperature: Grid,
    /// relative humidity [%]
    pub humidity: Grid,
    /// wind speed [km/h]
    pub wind_speed: Grid,
    /// daily precipitation [mm]
    pub rain: Grid,
}

impl WeatherSample {
    pub fn new(
        temperature: Grid,
        humidity: Grid,
        wind_speed: Grid,
        rain: Grid,
    ) -> Result<Self, FWIError> {
        let shape = temperature.shape();
        for (name, grid) in [("RH", &humidity), ("windspeed", &wind_speed), ("tp", &rain)] {
            if grid.shape() != shape {
                return Err(format!(
                    "{name} has shape {:?}, temperature has shape {:?}",
                    grid.shape(),
                    shape
                )
                .into());
            }
        }
        Ok(Self {
            temperature,
            humidity,
            wind_speed,
            rain,
        })
    }

    /// Reads `t2m_C`, `RH`, `windspeed` and `tp` from the dataset.
    pub fn from_dataset(dataset: &Dataset) -> Result<Self, FWIError> {
        let get = |var: InputVariableName| dataset.require(&var.to_string()).cloned();
        Self::new(
            get(InputVariableName::t2m_C)?,
            get(InputVariableName::RH)?,
            get(InputVariableName::windspeed)?,
            get(InputVariableName::tp)?,
        )
    }

    pub fn shape(&self) -> &[usize] {
        self.temperature.shape()
    }

    /// Cells where any of the four fields is missing.
    pub fn missing_mask(&self) -> ndarray::ArrayD<bool> {
        Zip::from(&self.temperature)
            .and(&self.humidity)
            .and(&self.wind_speed)
            .and(&self.rain)
            .par_map_collect(|t, h, w, r| t.is_nan() || h.is_nan() || w.is_nan() || r.is_nan())
    }
}

pub struct Input {
    pub time: DateTime<Utc>,
    pub data: WeatherSample,
}

#[allow(clippy::upper_case_acronyms, non_camel_case_types)]
#[derive(
    Debug,
    PartialEq,
    Eq,
    Hash,
    Copy,
    Clone,
    EnumString,
    EnumIter,
    EnumProperty,
    Display,
    Serialize,
    Deserialize,
)]
pub enum InputVariableName {
    /// ENGINE VARIABLES

    /// Air temperature at 2 m [°C]
    #[strum(props(long_name = "Air Temperature", units = "°C"))]
    t2m_C,
    /// Relative humidity [%]
    #[strum(props(long_name = "Relative Humidity", units = "%"))]
    RH,
    /// Wind speed at 10 m [km/h]
    #[strum(props(long_name = "Wind Speed", units = "km/h"))]
    windspeed,
    /// Daily precipitation [mm]
    #[strum(props(long_name = "Total Precipitation", units = "mm"))]
    tp,

    /// RAW REANALYSIS VARIABLES

    /// 2 m temperature [K]
    #[strum(props(long_name = "2m Temperature", units = "K"))]
    t2m,
    /// 2 m dew point temperature [K]
    #[strum(props(long_name = "2m Dewpoint Temperature", units = "K"))]
    d2m,
    /// U component of the wind at 10 m [m/s]
    #[strum(props(long_name = "10m U Wind Component", units = "m/s"))]
    u10,
    /// V component of the wind at 10 m [m/s]
    #[strum(props(long_name = "10m V Wind Component", units = "m/s"))]
    v10,
}

impl InputVariableName {
    pub fn units(&self) -> &'static str {
        self.get_str("units").unwrap_or("-")
    }

    pub fn long_name(&self) -> &'static str {
        self.get_str("long_name").unwrap_or("")
    }

    /// The four variables read by the engine.
    pub fn engine_variables() -> [InputVariableName; 4] {
        use InputVariableName::*;
        [t2m_C, RH, windspeed, tp]
    }
}

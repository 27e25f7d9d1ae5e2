use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};
use strum::EnumProperty;
use strum_macros::{Display, EnumIter, EnumProperty, EnumString};

use super::Grid;

/// Indices of one day merged with the weather sample they were computed from.
#[derive(Debug, Clone)]
pub struct Output {
    pub time: DateTime<Utc>,

    // ---------------- FWI ----------------- //
    /// Fine Fuel Moisture Code
    pub ffmc: Grid,
    /// Duff Moisture Code
    pub dmc: Grid,
    /// Drought Code
    pub dc: Grid,
    /// Initial Spread Index
    pub isi: Grid,
    /// Build Up Index
    pub bui: Grid,
    /// Fire Weather Index
    pub fwi: Grid,

    // ----------------- INPUTS ---------------//
    /// Input temperature in celsius
    pub temperature: Grid,
    /// Input relative humidity in %
    pub humidity: Grid,
    /// Input wind speed in km/h
    pub wind_speed: Grid,
    /// Input rain in mm
    pub rain: Grid,
}

impl Output {
    pub fn get(&self, variable: &OutputVariableName) -> Option<&Grid> {
        match variable {
            OutputVariableName::FFMC => Some(&self.ffmc),
            OutputVariableName::DMC => Some(&self.dmc),
            OutputVariableName::DC => Some(&self.dc),
            OutputVariableName::ISI => Some(&self.isi),
            OutputVariableName::BUI => Some(&self.bui),
            OutputVariableName::FWI => Some(&self.fwi),
            OutputVariableName::temperature => Some(&self.temperature),
            OutputVariableName::humidity => Some(&self.humidity),
            OutputVariableName::windSpeed => Some(&self.wind_speed),
            OutputVariableName::rain => Some(&self.rain),
        }
    }

    pub fn shape(&self) -> &[usize] {
        self.ffmc.shape()
    }
}

#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
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
#[strum(ascii_case_insensitive)]
pub enum OutputVariableName {
    /// Fine Fuel Moisture Code
    #[strum(props(long_name = "Fine Fuel Moisture Code", units = "-"))]
    FFMC,
    /// Duff Moisture Code
    #[strum(props(long_name = "Duff Moisture Code", units = "-"))]
    DMC,
    /// Drought Code
    #[strum(props(long_name = "Drought Code", units = "-"))]
    DC,
    /// Initial Spread Index
    #[strum(props(long_name = "Initial Spread Index", units = "-"))]
    ISI,
    /// Build Up Index
    #[strum(props(long_name = "Build Up Index", units = "-"))]
    BUI,
    /// Fire Weather Index
    #[strum(props(long_name = "Fire Weather Index", units = "-"))]
    FWI,

    /// Input Temperature
    #[strum(props(long_name = "Input Temperature", units = "°C"))]
    temperature,
    /// Input Relative Humidity
    #[strum(props(long_name = "Input Relative Humidity", units = "%"))]
    humidity,
    /// Input Wind Speed
    #[strum(props(long_name = "Input Wind Speed", units = "km/h"))]
    windSpeed,
    /// Input Rain
    #[strum(props(long_name = "Input Rain", units = "mm"))]
    rain,
}

impl OutputVariableName {
    pub fn units(&self) -> &'static str {
        self.get_str("units").unwrap_or("-")
    }

    pub fn long_name(&self) -> &'static str {
        self.get_str("long_name").unwrap_or("")
    }

    pub fn indices() -> [OutputVariableName; 6] {
        use OutputVariableName::*;
        [FFMC, DMC, DC, ISI, BUI, FWI]
    }
}

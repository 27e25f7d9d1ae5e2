//! Requests for the reanalysis archive.
//!
//! The engine does not talk to the archive: authentication and transfer are
//! done by the archive client, which submits the document built here.

use serde_derive::{Deserialize, Serialize};
use serde_json::{json, Value};
use strum_macros::{Display, EnumString};

use crate::error::FWIError;

pub const ERA5_LAND_MONTHLY: &str = "reanalysis-era5-land-monthly-means";
pub const ERA5_LAND_HOURLY: &str = "reanalysis-era5-land";

/// UTC hour of the daily weather observation (temperature, humidity, wind).
pub const WEATHER_HOUR: u32 = 12;
/// UTC hour holding the previous day's precipitation total. ERA5-Land hourly
/// accumulations restart at 00 UTC, so the 00:00 step of day D+1 is the full
/// 24 h total of day D.
pub const DAILY_RAIN_HOUR: u32 = 0;

/// Bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub north: f32,
    pub west: f32,
    pub south: f32,
    pub east: f32,
}

impl Area {
    pub fn new(north: f32, west: f32, south: f32, east: f32) -> Self {
        Self {
            north,
            west,
            south,
            east,
        }
    }

    /// Order expected by the archive: N, W, S, E
    pub fn as_array(&self) -> [f32; 4] {
        [self.north, self.west, self.south, self.east]
    }
}

impl Default for Area {
    fn default() -> Self {
        Area::new(75.0, -15.0, 30.0, 60.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DataFormat {
    Grib,
    Netcdf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DownloadFormat {
    Unarchived,
    Zip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalRequest {
    pub dataset: String,
    pub product_type: Vec<String>,
    pub variables: Vec<String>,
    pub years: Vec<i32>,
    pub months: Vec<u32>,
    pub hours: Vec<u32>,
    pub area: Area,
    pub data_format: DataFormat,
    pub download_format: DownloadFormat,
}

impl Default for RetrievalRequest {
    /// Monthly means by hour of day over Europe, 2000-2024.
    fn default() -> Self {
        RetrievalRequest {
            dataset: ERA5_LAND_MONTHLY.to_string(),
            product_type: vec!["monthly_averaged_reanalysis_by_hour_of_day".to_string()],
            variables: [
                "2m_dewpoint_temperature",
                "2m_temperature",
                "potential_evaporation",
                "total_evaporation",
                "10m_u_component_of_wind",
                "10m_v_component_of_wind",
                "total_precipitation",
                "leaf_area_index_high_vegetation",
                "leaf_area_index_low_vegetation",
            ]
            .iter()
            .map(|v| v.to_string())
            .collect(),
            years: (2000..=2024).collect(),
            months: (1..=12).collect(),
            hours: (0..24).collect(),
            area: Area::default(),
            data_format: DataFormat::Grib,
            download_format: DownloadFormat::Unarchived,
        }
    }
}

impl RetrievalRequest {
    /// Hourly fields needed to derive the engine inputs.
    ///
    /// Temperature, dew point and wind of day D are read at 12:00 UTC; the
    /// daily `tp` of day D is the 00:00 UTC value of day D+1. The last day of
    /// the final year therefore needs the first step of the following year.
    pub fn fwi_inputs(years: Vec<i32>, area: Area) -> Self {
        RetrievalRequest {
            dataset: ERA5_LAND_HOURLY.to_string(),
            product_type: vec![],
            variables: [
                "2m_temperature",
                "2m_dewpoint_temperature",
                "10m_u_component_of_wind",
                "10m_v_component_of_wind",
                "total_precipitation",
            ]
            .iter()
            .map(|v| v.to_string())
            .collect(),
            years,
            hours: vec![DAILY_RAIN_HOUR, WEATHER_HOUR],
            area,
            data_format: DataFormat::Netcdf,
            ..RetrievalRequest::default()
        }
    }

    pub fn validate(&self) -> Result<(), FWIError> {
        if self.dataset.trim().is_empty() {
            return Err("dataset id is empty".into());
        }
        if self.variables.is_empty() {
            return Err("no variables requested".into());
        }
        if self.years.is_empty() {
            return Err("no years requested".into());
        }
        if self.months.is_empty() {
            return Err("no months requested".into());
        }
        if self.hours.is_empty() {
            return Err("no hours requested".into());
        }
        if let Some(month) = self.months.iter().find(|m| !(1..=12).contains(*m)) {
            return Err(format!("invalid month {month}").into());
        }
        if let Some(hour) = self.hours.iter().find(|h| **h > 23) {
            return Err(format!("invalid hour {hour}").into());
        }
        let area = &self.area;
        if area.north < area.south {
            return Err(format!(
                "north bound {} is below south bound {}",
                area.north, area.south
            )
            .into());
        }
        if !(-90.0..=90.0).contains(&area.north) || !(-90.0..=90.0).contains(&area.south) {
            return Err("latitude bounds must be within [-90, 90]".into());
        }
        Ok(())
    }

    /// Request body in the archive's vocabulary.
    pub fn body(&self) -> Result<Value, FWIError> {
        self.validate()?;
        let mut body = json!({
            "variable": self.variables,
            "year": self.years.iter().map(|y| y.to_string()).collect::<Vec<_>>(),
            "month": self.months.iter().map(|m| format!("{m:02}")).collect::<Vec<_>>(),
            "time": self.hours.iter().map(|h| format!("{h:02}:00")).collect::<Vec<_>>(),
            "data_format": self.data_format.to_string(),
            "download_format": self.download_format.to_string(),
            "area": self.area.as_array(),
        });
        if !self.product_type.is_empty() {
            body["product_type"] = json!(self.product_type);
        }
        Ok(body)
    }

    /// Full document: dataset id plus request body.
    pub fn to_json(&self) -> Result<String, FWIError> {
        let document = json!({
            "dataset": self.dataset,
            "request": self.body()?,
        });
        serde_json::to_string_pretty(&document)
            .map_err(|err| format!("cannot serialize request: {err}").into())
    }

    /// Name of the file the archive client should download to.
    pub fn target_file_name(&self) -> String {
        let extension = match (self.download_format, self.data_format) {
            (DownloadFormat::Zip, _) => "zip",
            (DownloadFormat::Unarchived, DataFormat::Grib) => "grib",
            (DownloadFormat::Unarchived, DataFormat::Netcdf) => "nc",
        };
        let first = self.years.iter().min().copied().unwrap_or_default();
        let last = self.years.iter().max().copied().unwrap_or_default();
        format!("{}_{}-{}.{}", self.dataset, first, last, extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request_mirrors_monthly_means_download() {
        let request = RetrievalRequest::default();
        assert!(request.validate().is_ok());
        let body = request.body().expect("valid request");
        assert_eq!(body["variable"].as_array().map(|v| v.len()), Some(9));
        assert_eq!(body["year"][0], "2000");
        assert_eq!(body["year"][24], "2024");
        assert_eq!(body["month"][0], "01");
        assert_eq!(body["month"][11], "12");
        assert_eq!(body["time"][23], "23:00");
        assert_eq!(body["data_format"], "grib");
        assert_eq!(body["download_format"], "unarchived");
        assert_eq!(body["area"], json!([75.0, -15.0, 30.0, 60.0]));
        assert_eq!(body["product_type"][0], "monthly_averaged_reanalysis_by_hour_of_day");
    }

    #[test]
    fn invalid_requests_are_rejected() {
        let mut request = RetrievalRequest::default();
        request.months = vec![0, 5];
        assert!(request.validate().is_err());

        let mut request = RetrievalRequest::default();
        request.hours = vec![24];
        assert!(request.body().is_err());

        let mut request = RetrievalRequest::default();
        request.area = Area::new(30.0, -15.0, 75.0, 60.0);
        assert!(request.validate().is_err());

        let mut request = RetrievalRequest::default();
        request.variables.clear();
        assert!(request.to_json().is_err());
    }

    #[test]
    fn fwi_inputs_request() {
        let request = RetrievalRequest::fwi_inputs(vec![2023], Area::new(48.0, 6.0, 36.0, 19.0));
        let json = request.to_json().expect("valid request");
        assert!(json.contains(ERA5_LAND_HOURLY));
        assert!(json.contains("2m_dewpoint_temperature"));
        assert!(!json.contains("product_type"));
        assert_eq!(request.target_file_name(), "reanalysis-era5-land_2023-2023.nc");

        // the 00:00 step carries the previous day's 24 h precipitation
        let body = request.body().expect("valid request");
        assert_eq!(body["time"], json!(["00:00", "12:00"]));
        assert!(request.hours.contains(&DAILY_RAIN_HOUR));
        assert!(request.variables.iter().any(|v| v == "total_precipitation"));
    }

    #[test]
    fn request_deserializes_with_defaults() {
        let request: RetrievalRequest =
            serde_json::from_str(r#"{"years": [2010, 2011], "data_format": "netcdf"}"#)
                .expect("should parse");
        assert_eq!(request.years, vec![2010, 2011]);
        assert_eq!(request.data_format, DataFormat::Netcdf);
        assert_eq!(request.dataset, ERA5_LAND_MONTHLY);
        assert_eq!(request.hours.len(), 24);
    }
}

use chrono::{DateTime, Utc};
use fwi::{
    error::FWIError,
    models::{
        dataset::{filled, Dataset},
        input::{Input, InputVariableName, WeatherSample},
    },
    modules::functions::prepare_dataset,
};
use log::{debug, warn};
use strum::IntoEnumIterator;

use crate::common::io::readers::prelude::InputHandler;

/// Collects every variable available at `time`, converted to engine units.
pub fn load_dataset(handler: &dyn InputHandler, time: &DateTime<Utc>) -> Result<Dataset, FWIError> {
    let mut dataset = Dataset::new();
    for var in InputVariableName::iter() {
        if let Some(values) = handler.get_values(var, time)? {
            debug!("Loaded {} for {}", var, time.format("%Y-%m-%d %H:%M"));
            dataset.insert(&var.to_string(), Some(var.units()), values)?;
        }
    }
    prepare_dataset(&dataset)
}

/// Get the input data from the input handler and save it in the Input struct.
/// A day whose variables cannot be assembled is returned as all missing.
pub fn get_input(
    handler: &dyn InputHandler,
    time: &DateTime<Utc>,
    shape: &[usize],
) -> Result<Input, FWIError> {
    let data = match load_dataset(handler, time) {
        Ok(dataset) => WeatherSample::from_dataset(&dataset)?,
        Err(err) => {
            warn!(
                "Incomplete input for {}: {}",
                time.format("%Y-%m-%d %H:%M"),
                err
            );
            WeatherSample::new(
                filled(shape, f32::NAN),
                filled(shape, f32::NAN),
                filled(shape, f32::NAN),
                filled(shape, f32::NAN),
            )?
        }
    };
    if data.shape() != shape {
        return Err(format!(
            "input shape {:?} does not match grid shape {:?}",
            data.shape(),
            shape
        )
        .into());
    }
    Ok(Input {
        time: time.to_owned(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::io::models::grid::RegularGrid;
    use chrono::TimeZone;
    use fwi::models::Grid;
    use std::collections::HashMap;

    struct MemoryHandler {
        grid: RegularGrid,
        values: HashMap<InputVariableName, Grid>,
    }

    impl InputHandler for MemoryHandler {
        fn get_values(
            &self,
            var: InputVariableName,
            _date: &DateTime<Utc>,
        ) -> Result<Option<Grid>, FWIError> {
            Ok(self.values.get(&var).cloned())
        }

        fn get_timeline(&self) -> Vec<DateTime<Utc>> {
            vec![]
        }

        fn get_grid(&self) -> &RegularGrid {
            &self.grid
        }

        fn info_input(&self) -> String {
            String::new()
        }
    }

    fn handler(vars: &[(InputVariableName, f32)]) -> MemoryHandler {
        MemoryHandler {
            grid: RegularGrid::new(1, 2, 40.0, 10.0, 40.0, 11.0),
            values: vars
                .iter()
                .map(|(var, value)| (*var, filled(&[1, 2], *value)))
                .collect(),
        }
    }

    #[test]
    fn raw_fields_are_converted() {
        use InputVariableName::*;
        let handler = handler(&[(t2m, 293.15), (d2m, 293.15), (u10, 3.0), (v10, 4.0), (tp, 2.0)]);
        let time = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        let input = get_input(&handler, &time, &[1, 2]).expect("should load");
        assert!((input.data.temperature[[0, 0]] - 20.0).abs() < 1e-3);
        assert!((input.data.humidity[[0, 1]] - 100.0).abs() < 1e-2);
        assert!((input.data.wind_speed[[0, 0]] - 18.0).abs() < 1e-3);
        assert_eq!(input.data.rain[[0, 1]], 2.0);
        assert_eq!(input.time, time);
    }

    #[test]
    fn incomplete_day_is_missing_everywhere() {
        use InputVariableName::*;
        let handler = handler(&[(t2m_C, 20.0), (RH, 40.0)]);
        let time = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        let input = get_input(&handler, &time, &[1, 2]).expect("should not fail");
        assert!(input.data.missing_mask().iter().all(|m| *m));
    }

    #[test]
    fn shape_must_match_grid() {
        use InputVariableName::*;
        let handler = handler(&[(t2m_C, 20.0), (RH, 40.0), (windspeed, 5.0), (tp, 0.0)]);
        let time = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        assert!(get_input(&handler, &time, &[2, 2]).is_err());
    }
}

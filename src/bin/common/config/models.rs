use std::{
    fs::File,
    io::{self, BufRead, BufWriter, Write},
};

use chrono::{DateTime, Duration, Utc};
use fwi::{
    constants::{nan_to_nodata, nodata_to_nan},
    error::FWIError,
    models::output::Output,
    modules::fwi::{
        config::FWIModelConfig,
        models::{FWIState, FWIWarmState},
    },
};
use itertools::izip;
use log::{info, warn};
use ndarray::Array2;
use rayon::prelude::*;

use crate::common::io::models::{grid::RegularGrid, output::OutputType};

use super::builder::{FWIConfigBuilder, OutputTypeConfig};

/// Days searched back from the run date for a warm state file
const WARM_STATE_SEARCH_DAYS: i64 = 3;

pub struct Config {
    run_date: DateTime<Utc>,
    model_name: String,
    warm_state_path: String,
    warm_state: FWIWarmState,
    warm_state_time: DateTime<Utc>,
    grid: RegularGrid,
    model_config: FWIModelConfig,
    output_time_resolution: u32,
    output_types_defs: Vec<OutputTypeConfig>,
}

pub struct OutputWriter {
    outputs: Vec<OutputType>,
}

impl OutputWriter {
    pub fn new(
        outputs_defs: &[OutputTypeConfig],
        date: &DateTime<Utc>,
        grid: &RegularGrid,
    ) -> Result<Self, FWIError> {
        let outputs = outputs_defs
            .iter()
            .map(|t| OutputType::new(t, date, grid))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { outputs })
    }

    pub fn write_output(&mut self, output: &Output) -> Result<(), FWIError> {
        self.outputs.par_iter_mut().for_each(|output_type| {
            if let Err(e) = output_type.write_variables(output) {
                warn!("Error writing output {}: {}", output_type.name(), e);
            }
        });
        Ok(())
    }
}

impl Config {
    pub fn new(
        config_defs: &FWIConfigBuilder,
        date: DateTime<Utc>,
        grid: &RegularGrid,
    ) -> Result<Config, FWIError> {
        let shape = grid.shape();
        let model_config = config_defs.model.clone();

        let (warm_state, warm_state_time) =
            match read_warm_state(&config_defs.warm_state_path, date, &shape) {
                Some(loaded) => loaded,
                None => {
                    info!(
                        "Starting from initial values FFMC={} DMC={} DC={}",
                        model_config.ffmc_init, model_config.dmc_init, model_config.dc_init
                    );
                    (
                        FWIWarmState::from_config(&shape, &model_config),
                        date - Duration::try_days(1).ok_or("invalid duration")?,
                    )
                }
            };

        Ok(Config {
            run_date: date,
            model_name: config_defs.model_name.clone(),
            warm_state_path: config_defs.warm_state_path.clone(),
            warm_state,
            warm_state_time,
            grid: *grid,
            model_config,
            output_time_resolution: config_defs.output_time_resolution.max(1),
            output_types_defs: config_defs.output_types.clone(),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn new_state(&self) -> FWIState {
        FWIState::new(
            self.warm_state.clone(),
            &self.warm_state_time,
            self.model_config.clone(),
        )
    }

    pub fn get_output_writer(&self) -> Result<OutputWriter, FWIError> {
        OutputWriter::new(&self.output_types_defs, &self.run_date, &self.grid)
    }

    pub fn should_write_output(&self, time: &DateTime<Utc>) -> bool {
        let hours = time.signed_duration_since(self.run_date).num_hours();
        hours % self.output_time_resolution as i64 == 0
    }

    /// The warm state is written for every step up to the day after the run
    /// date, so that the next run can start from it.
    pub fn should_write_warm_state(&self, time: &DateTime<Utc>) -> bool {
        match Duration::try_days(1) {
            Some(day) => *time <= self.run_date + day,
            None => false,
        }
    }

    pub fn write_warm_state(&self, state: &FWIState) -> Result<String, FWIError> {
        let warm_state_time = state.time + Duration::try_days(1).ok_or("invalid duration")?;
        let warm_state_name = warm_state_file_name(&self.warm_state_path, &warm_state_time);
        write_warm_state(&warm_state_name, &state.data)?;
        Ok(warm_state_name)
    }
}

fn warm_state_file_name(base_warm_file: &str, date: &DateTime<Utc>) -> String {
    format!("{}{}", base_warm_file, date.format("%Y%m%d%H%M"))
}

/// Writes one `ffmc dmc dc` line per cell, NODATAVAL where NaN
pub fn write_warm_state(file_name: &str, warm_state: &FWIWarmState) -> Result<(), FWIError> {
    let mut warm_state_file = File::create(file_name)
        .map_err(|error| format!("error creating {}, {}", file_name, error))?;
    let mut warm_state_writer = BufWriter::new(&mut warm_state_file);

    for (ffmc, dmc, dc) in izip!(&warm_state.ffmc, &warm_state.dmc, &warm_state.dc) {
        writeln!(
            warm_state_writer,
            "{}\t{}\t{}",
            nan_to_nodata(*ffmc),
            nan_to_nodata(*dmc),
            nan_to_nodata(*dc)
        )
        .map_err(|error| format!("error writing to {}, {}", file_name, error))?;
    }
    warm_state_writer
        .flush()
        .map_err(|error| format!("error writing to {}, {}", file_name, error))?;
    Ok(())
}

/// Parses a warm state file into grids of the given shape
pub fn parse_warm_state(file: File, shape: &[usize; 2]) -> Result<FWIWarmState, FWIError> {
    let reader = io::BufReader::new(file);
    let mut ffmc: Vec<f32> = Vec::new();
    let mut dmc: Vec<f32> = Vec::new();
    let mut dc: Vec<f32> = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|err| format!("Error reading warm state line {i}: {err}"))?;
        if line.trim().is_empty() {
            continue;
        }
        let values = line
            .split_whitespace()
            .map(|v| v.parse::<f32>().map(nodata_to_nan))
            .collect::<Result<Vec<f32>, _>>()
            .map_err(|err| format!("Could not parse warm state line {i} '{line}': {err}"))?;
        if values.len() != 3 {
            return Err(format!("Expected 3 values on warm state line {i}, got '{line}'").into());
        }
        ffmc.push(values[0]);
        dmc.push(values[1]);
        dc.push(values[2]);
    }

    let to_grid = |values: Vec<f32>| {
        Array2::from_shape_vec((shape[0], shape[1]), values)
            .map(|grid| grid.into_dyn())
            .map_err(|err| format!("Warm state does not fit grid {shape:?}: {err}"))
    };
    FWIWarmState::new(to_grid(ffmc)?, to_grid(dmc)?, to_grid(dc)?)
}

/// Reads the warm state from the file
/// The warm state is stored in a file named <base_warm_file><YYYYmmDDHHMM>.
/// Returns the state and the time it refers to, the day before the file date.
pub fn read_warm_state(
    base_warm_file: &str,
    date: DateTime<Utc>,
    shape: &[usize; 2],
) -> Option<(FWIWarmState, DateTime<Utc>)> {
    for days_before in 0..=WARM_STATE_SEARCH_DAYS {
        let current_date = date - Duration::try_days(days_before)?;
        let filename = warm_state_file_name(base_warm_file, &current_date);

        let file = match File::open(&filename) {
            Ok(file) => file,
            Err(_) => continue,
        };

        info!(
            "Loading warm state from {}",
            current_date.format("%Y-%m-%d")
        );
        return match parse_warm_state(file, shape) {
            Ok(warm_state) => Some((warm_state, current_date - Duration::try_days(1)?)),
            Err(err) => {
                warn!("Invalid warm state file {}: {}", filename, err);
                None
            }
        };
    }
    warn!(
        "WARNING: Could not find a valid warm state file for run date {}",
        date.format("%Y-%m-%d")
    );
    None
}

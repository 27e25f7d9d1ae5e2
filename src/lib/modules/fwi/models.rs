use chrono::{DateTime, Duration, Utc};
use log::{debug, trace, warn};
use ndarray::{stack, ArrayD, ArrayView, Axis, IxDyn, Zip};

use crate::{
    error::FWIError,
    models::{
        dataset::{filled, Dataset},
        input::{Input, WeatherSample},
        output::{Output, OutputVariableName},
        Grid,
    },
};

use super::{
    config::FWIModelConfig,
    constants::TIME_STEP,
    functions::{compute_bui, compute_dc, compute_dmc, compute_ffmc, compute_fwi, compute_isi},
};

// WARM STATE
/// FFMC, DMC and DC carried from one day to the next.
#[derive(Debug, Clone, PartialEq)]
pub struct FWIWarmState {
    pub ffmc: Grid,
    pub dmc: Grid,
    pub dc: Grid,
}

impl FWIWarmState {
    pub fn new(ffmc: Grid, dmc: Grid, dc: Grid) -> Result<Self, FWIError> {
        if ffmc.shape() != dmc.shape() || ffmc.shape() != dc.shape() {
            return Err(format!(
                "warm state grids have different shapes: ffmc {:?}, dmc {:?}, dc {:?}",
                ffmc.shape(),
                dmc.shape(),
                dc.shape()
            )
            .into());
        }
        Ok(Self { ffmc, dmc, dc })
    }

    /// Same values in every cell.
    pub fn uniform(shape: &[usize], ffmc: f32, dmc: f32, dc: f32) -> Self {
        Self {
            ffmc: filled(shape, ffmc),
            dmc: filled(shape, dmc),
            dc: filled(shape, dc),
        }
    }

    /// Start-up state from the configured initial values.
    pub fn from_config(shape: &[usize], config: &FWIModelConfig) -> Self {
        Self::uniform(shape, config.ffmc_init, config.dmc_init, config.dc_init)
    }

    pub fn shape(&self) -> &[usize] {
        self.ffmc.shape()
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.ffmc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_shape(&self, sample: &WeatherSample) -> Result<(), FWIError> {
        if self.shape() != sample.shape() {
            return Err(format!(
                "state shape {:?} does not match weather shape {:?}",
                self.shape(),
                sample.shape()
            )
            .into());
        }
        Ok(())
    }
}

// INDICES
#[derive(Debug, Clone)]
pub struct FWIIndices {
    pub ffmc: Grid,
    pub dmc: Grid,
    pub dc: Grid,
    pub isi: Grid,
    pub bui: Grid,
    pub fwi: Grid,
}

impl FWIIndices {
    pub fn get(&self, variable: &OutputVariableName) -> Option<&Grid> {
        match variable {
            OutputVariableName::FFMC => Some(&self.ffmc),
            OutputVariableName::DMC => Some(&self.dmc),
            OutputVariableName::DC => Some(&self.dc),
            OutputVariableName::ISI => Some(&self.isi),
            OutputVariableName::BUI => Some(&self.bui),
            OutputVariableName::FWI => Some(&self.fwi),
            _ => None,
        }
    }

    /// Today's state, to be fed to tomorrow's computation.
    pub fn warm_state(&self) -> FWIWarmState {
        FWIWarmState {
            ffmc: self.ffmc.clone(),
            dmc: self.dmc.clone(),
            dc: self.dc.clone(),
        }
    }

    pub fn into_output(self, time: DateTime<Utc>, sample: &WeatherSample) -> Output {
        Output {
            time,
            ffmc: self.ffmc,
            dmc: self.dmc,
            dc: self.dc,
            isi: self.isi,
            bui: self.bui,
            fwi: self.fwi,
            temperature: sample.temperature.clone(),
            humidity: sample.humidity.clone(),
            wind_speed: sample.wind_speed.clone(),
            rain: sample.rain.clone(),
        }
    }
}

/// Moisture codes of today. FFMC, DMC and DC do not depend on each other.
fn compute_moisture_codes(sample: &WeatherSample, previous: &FWIWarmState) -> FWIWarmState {
    let (ffmc, (dmc, dc)) = rayon::join(
        || {
            compute_ffmc(
                &sample.temperature,
                &sample.humidity,
                &sample.wind_speed,
                &sample.rain,
                &previous.ffmc,
            )
        },
        || {
            rayon::join(
                || compute_dmc(&sample.temperature, &sample.humidity, &sample.rain, &previous.dmc),
                || compute_dc(&sample.temperature, &sample.rain, &previous.dc),
            )
        },
    );
    FWIWarmState { ffmc, dmc, dc }
}

fn compute_derived(state: FWIWarmState, wind_speed: &Grid) -> FWIIndices {
    let isi = compute_isi(&state.ffmc, wind_speed);
    let bui = compute_bui(&state.dmc, &state.dc);
    let fwi = compute_fwi(&isi, &bui);
    FWIIndices {
        ffmc: state.ffmc,
        dmc: state.dmc,
        dc: state.dc,
        isi,
        bui,
        fwi,
    }
}

/// The six indices of one day from the day's weather and yesterday's state.
pub fn compute_indices(
    sample: &WeatherSample,
    previous: &FWIWarmState,
) -> Result<FWIIndices, FWIError> {
    previous.check_shape(sample)?;
    let state = compute_moisture_codes(sample, previous);
    Ok(compute_derived(state, &sample.wind_speed))
}

/// The six indices of one day merged with the weather they were computed from.
pub fn compute_all(input: &Input, previous: &FWIWarmState) -> Result<Output, FWIError> {
    let indices = compute_indices(&input.data, previous)?;
    Ok(indices.into_output(input.time, &input.data))
}

/// Reads `t2m_C`, `RH`, `windspeed`, `tp` and returns a copy of the dataset
/// with `FFMC`, `DMC`, `DC`, `ISI`, `BUI` and `FWI` appended.
pub fn compute_dataset(dataset: &Dataset, previous: &FWIWarmState) -> Result<Dataset, FWIError> {
    let sample = WeatherSample::from_dataset(dataset)?;
    let indices = compute_indices(&sample, previous)?;

    let mut updated = dataset.clone();
    for variable in OutputVariableName::indices() {
        let values = indices
            .get(&variable)
            .ok_or_else(|| format!("no values for {variable}"))?;
        updated.insert(&variable.to_string(), Some(variable.units()), values.clone())?;
    }
    Ok(updated)
}

// STATE
#[derive(Debug)]
pub struct FWIState {
    pub time: DateTime<Utc>,
    pub data: FWIWarmState,
    config: FWIModelConfig,
}

impl FWIState {
    /// Create a new state.
    pub fn new(warm_state: FWIWarmState, time: &DateTime<Utc>, config: FWIModelConfig) -> FWIState {
        FWIState {
            time: *time,
            data: warm_state,
            config,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn config(&self) -> &FWIModelConfig {
        &self.config
    }

    fn update_state(&mut self, input: &Input) -> Result<(), FWIError> {
        let sample = &input.data;
        self.data.check_shape(sample)?;
        let mut new_state = compute_moisture_codes(sample, &self.data);

        if self.config.keep_state_on_missing {
            // keep current state where we don't have all the data
            let missing = sample.missing_mask();
            let n_missing = missing.iter().filter(|m| **m).count();
            if n_missing > 0 {
                debug!("{n_missing} cells without weather data, keeping their state");
                keep_where(&mut new_state.ffmc, &self.data.ffmc, &missing);
                keep_where(&mut new_state.dmc, &self.data.dmc, &missing);
                keep_where(&mut new_state.dc, &self.data.dc, &missing);
            }
        }
        self.data = new_state;
        Ok(())
    }

    /// Advance the state to the time of the input.
    pub fn update(&mut self, input: &Input) -> Result<(), FWIError> {
        let hours = input.time.signed_duration_since(self.time).num_hours();
        if hours != TIME_STEP {
            warn!(
                "Updating state from {} to {}: {} hours instead of {}",
                self.time.format("%Y-%m-%d %H:%M"),
                input.time.format("%Y-%m-%d %H:%M"),
                hours,
                TIME_STEP
            );
        }
        self.update_state(input)?;
        self.time = input.time;
        Ok(())
    }

    /// Indices of the current state, merged with the input.
    pub fn output(&self, input: &Input) -> Result<Output, FWIError> {
        self.data.check_shape(&input.data)?;
        let indices = compute_derived(self.data.clone(), &input.data.wind_speed);
        Ok(indices.into_output(self.time, &input.data))
    }
}

fn keep_where(new: &mut Grid, old: &Grid, mask: &ArrayD<bool>) {
    Zip::from(new).and(old).and(mask).par_for_each(|n, &o, &m| {
        if m {
            *n = o;
        }
    });
}

/// Runs the model over a dataset whose first axis is time.
///
/// Days are processed in order, each one starting from the state left by the
/// previous one. `warm_state` must have the spatial shape of the dataset (all
/// axes but the first). Returns the dataset with the six indices appended and
/// the state after the last day.
pub fn run_series(
    dataset: &Dataset,
    timeline: &[DateTime<Utc>],
    warm_state: FWIWarmState,
    config: FWIModelConfig,
) -> Result<(Dataset, FWIState), FWIError> {
    let n_steps = dataset
        .axis_len(0)
        .ok_or("dataset has no time axis")?;
    if n_steps != timeline.len() {
        return Err(format!(
            "timeline has {} entries, dataset time axis has {}",
            timeline.len(),
            n_steps
        )
        .into());
    }
    let first = timeline.first().ok_or("empty timeline")?;

    let start = *first - Duration::try_hours(TIME_STEP).ok_or("invalid time step")?;
    let mut state = FWIState::new(warm_state, &start, config);

    let mut series: Vec<Vec<Grid>> = vec![Vec::with_capacity(n_steps); 6];
    for (index, time) in timeline.iter().enumerate() {
        trace!("Processing {}", time.format("%Y-%m-%d %H:%M"));
        let day = dataset.index_axis(0, index)?;
        let input = Input {
            time: *time,
            data: WeatherSample::from_dataset(&day)?,
        };
        state.update(&input)?;
        let output = state.output(&input)?;
        for (values, variable) in series.iter_mut().zip(OutputVariableName::indices()) {
            let grid = output
                .get(&variable)
                .ok_or_else(|| format!("no values for {variable}"))?;
            values.push(grid.clone());
        }
    }

    let mut updated = dataset.clone();
    for (values, variable) in series.iter().zip(OutputVariableName::indices()) {
        let views: Vec<ArrayView<f32, IxDyn>> = values.iter().map(|g| g.view()).collect();
        let stacked = stack(Axis(0), &views)
            .map_err(|err| format!("cannot stack {variable}: {err}"))?;
        updated.insert(&variable.to_string(), Some(variable.units()), stacked)?;
    }
    Ok((updated, state))
}

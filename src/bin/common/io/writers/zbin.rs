use std::path::PathBuf;

use chrono::{DateTime, Utc};
use fwi::{
    error::FWIError,
    models::output::{Output, OutputVariableName},
};
use log::debug;
use rayon::prelude::*;

use crate::common::io::models::grid::RegularGrid;

use super::{
    helpers::{extract_errors, write_to_zbin_file},
    prelude::OutputSink,
};

pub struct ZBinWriter {
    path: PathBuf,
    name: String,
    run_date: DateTime<Utc>,
}

impl ZBinWriter {
    pub fn new(path: &str, name: &str, run_date: &DateTime<Utc>) -> Self {
        Self {
            path: PathBuf::from(path),
            name: name.to_string(),
            run_date: *run_date,
        }
    }

    /// `<path>/<name>_<run date>_<date>_<VARIABLE>.zbin`
    pub fn file_name(&self, time: &DateTime<Utc>, variable: &OutputVariableName) -> PathBuf {
        self.path.join(format!(
            "{}_{}_{}_{}.zbin",
            self.name,
            self.run_date.format("%Y%m%d%H%M"),
            time.format("%Y%m%d%H%M"),
            variable
        ))
    }
}

impl OutputSink for ZBinWriter {
    fn write(
        &mut self,
        output: &Output,
        grid: &RegularGrid,
        variables: &[OutputVariableName],
    ) -> Result<(), FWIError> {
        let results: Vec<Result<(), FWIError>> = variables
            .par_iter()
            .map(|variable| {
                let file = self.file_name(&output.time, variable);
                let file = file
                    .to_str()
                    .ok_or_else(|| format!("invalid output path {file:?}"))?;

                let values = match output.get(variable) {
                    Some(values) => values,
                    None => return Ok(()),
                };
                debug!("[ZBIN] Writing variable {} to {}", variable, file);
                let values: Vec<f32> = values.iter().copied().collect();
                write_to_zbin_file(file, grid, &values)
                    .map_err(|err| format!("Cannot write file {}: error {err}", file))?;
                Ok(())
            })
            .collect();

        extract_errors("ZBIN Errors", results)
    }
}

use chrono::{DateTime, Utc};
use fwi::{
    error::FWIError,
    models::output::{Output, OutputVariableName},
};
use log::debug;

use crate::common::{
    config::builder::OutputTypeConfig,
    io::writers::{prelude::OutputSink, zbin::ZBinWriter},
};

use super::grid::RegularGrid;

/// A set of variables written with the same format to the same place
pub struct OutputType {
    name: String,
    grid: RegularGrid,
    format: String,
    variables: Vec<OutputVariableName>,
    writer: Box<dyn OutputSink>,
}

impl OutputType {
    pub fn new(
        output_type_def: &OutputTypeConfig,
        run_date: &DateTime<Utc>,
        grid: &RegularGrid,
    ) -> Result<Self, FWIError> {
        let name = &output_type_def.name;
        let path = &output_type_def.path;
        let format = output_type_def.format.to_uppercase();

        let writer: Box<dyn OutputSink> = match format.as_str() {
            "ZBIN" => Box::new(ZBinWriter::new(path, name, run_date)),
            _ => return Err(format!("Unsupported output format {format} for {name}").into()),
        };

        Ok(Self {
            name: name.to_string(),
            grid: *grid,
            format,
            variables: output_type_def.variables.clone(),
            writer,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn write_variables(&mut self, output: &Output) -> Result<(), FWIError> {
        if output.shape() != self.grid.shape() {
            return Err(format!(
                "output shape {:?} does not match grid {:?}",
                output.shape(),
                self.grid.shape()
            )
            .into());
        }
        debug!("Writing variables for {}, {}", self.name, self.format);
        let res = self.writer.write(output, &self.grid, &self.variables);
        debug!("Done Writing variables for {}, {}", self.name, self.format);
        res
    }
}

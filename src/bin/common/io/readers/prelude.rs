use chrono::{DateTime, Utc};
use fwi::{
    error::FWIError,
    models::{input::InputVariableName, Grid},
};

use crate::common::io::models::grid::RegularGrid;

/// Trait defining the behavior of an InputHandler for the model
pub trait InputHandler {
    /// get the desired variable at the desired date, NaN where missing
    fn get_values(
        &self,
        var: InputVariableName,
        date: &DateTime<Utc>,
    ) -> Result<Option<Grid>, FWIError>;

    /// Returns the timeline of the input data
    fn get_timeline(&self) -> Vec<DateTime<Utc>>;

    /// Grid shared by all the input files
    fn get_grid(&self) -> &RegularGrid;

    /// Human readable list of the inputs
    fn info_input(&self) -> String;
}

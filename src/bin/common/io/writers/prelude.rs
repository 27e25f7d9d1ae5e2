use fwi::{
    error::FWIError,
    models::output::{Output, OutputVariableName},
};

use crate::common::io::models::grid::RegularGrid;

/// Trait implemented by output sinks that persist the daily indices.
pub trait OutputSink: Send {
    fn write(
        &mut self,
        output: &Output,
        grid: &RegularGrid,
        variables: &[OutputVariableName],
    ) -> Result<(), FWIError>;
}

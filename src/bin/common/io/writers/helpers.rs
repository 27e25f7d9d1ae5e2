use std::{
    fs::File,
    io::{self, Write},
};

use fwi::{constants::nan_to_nodata, error::FWIError};
use libflate::gzip;

use crate::common::io::models::grid::RegularGrid;

/// Writes a gzip-compressed grid file: regular-grid header, then the values
/// row by row as little-endian f32. NaN cells are written as NODATAVAL.
pub fn write_to_zbin_file(file: &str, grid: &RegularGrid, values: &[f32]) -> Result<(), io::Error> {
    if values.len() != grid.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "{} values for a {}x{} grid",
                values.len(),
                grid.nrows,
                grid.ncols
            ),
        ));
    }
    let output = File::create(file)?;
    let output = io::BufWriter::new(output);
    let mut encoder = gzip::Encoder::new(output)?;

    encoder.write_all(&1u32.to_le_bytes())?;
    encoder.write_all(&(grid.nrows as u32).to_le_bytes())?;
    encoder.write_all(&(grid.ncols as u32).to_le_bytes())?;

    encoder.write_all(&grid.min_lat.to_le_bytes())?;
    encoder.write_all(&grid.max_lat.to_le_bytes())?;
    encoder.write_all(&grid.min_lon.to_le_bytes())?;
    encoder.write_all(&grid.max_lon.to_le_bytes())?;

    let buf: Vec<u8> = values
        .iter()
        .flat_map(|v| nan_to_nodata(*v).to_le_bytes())
        .collect();
    encoder.write_all(&buf)?;
    let mut output = encoder.finish().into_result()?;
    output.flush()?;
    Ok(())
}

/// Collapses the results of parallel writes into a single error listing
/// every failure.
pub fn extract_errors(prefix: &str, results: Vec<Result<(), FWIError>>) -> Result<(), FWIError> {
    let errors: Vec<String> = results
        .into_iter()
        .filter_map(|result| result.err())
        .map(|err| err.to_string())
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(format!("{}:\n{}", prefix, errors.join("\n")).into())
    }
}

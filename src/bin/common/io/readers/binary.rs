use chrono::{DateTime, NaiveDateTime, Utc};
use fwi::{
    constants::nodata_to_nan,
    error::FWIError,
    models::{input::InputVariableName, Grid},
};
use itertools::Itertools;
use libflate::gzip::{self, Decoder};
use log::warn;
use ndarray::Array2;

use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufRead, Read},
    path::Path,
};

use crate::common::io::models::grid::RegularGrid;

use super::prelude::InputHandler;

fn read_u32<T: Read>(decoder: &mut Decoder<T>) -> Result<u32, io::Error> {
    let mut buf: [u8; 4] = [0; 4];
    decoder.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_f32<T: Read>(decoder: &mut Decoder<T>) -> Result<f32, io::Error> {
    let mut buf: [u8; 4] = [0; 4];
    decoder.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

fn read_header_from_file<T>(decoder: &mut Decoder<T>) -> Result<RegularGrid, io::Error>
where
    T: Read,
{
    let is_regular = read_u32(decoder)?;
    let nrows = read_u32(decoder)? as usize;
    let ncols = read_u32(decoder)? as usize;
    if is_regular != 1 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unsupported grid type {is_regular}, only regular grids can be read"),
        ));
    }
    let min_lat = read_f32(decoder)?;
    let max_lat = read_f32(decoder)?;
    let min_lon = read_f32(decoder)?;
    let max_lon = read_f32(decoder)?;
    Ok(RegularGrid::new(
        nrows, ncols, min_lat, min_lon, max_lat, max_lon,
    ))
}

fn read_array_from_file<T>(decoder: &mut Decoder<T>, len: usize) -> Result<Vec<f32>, io::Error>
where
    T: Read,
{
    let mut buffer: Vec<u8> = vec![0; len * 4];
    decoder.read_exact(&mut buffer)?;

    let values = buffer
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .map(nodata_to_nan)
        .collect();
    Ok(values)
}

fn open_decoder(file: &str) -> Result<Decoder<io::BufReader<File>>, io::Error> {
    let input = File::open(file)?;
    let input = io::BufReader::new(input);
    gzip::Decoder::new(input)
}

pub fn read_grid_from_file(file: &str) -> Result<RegularGrid, io::Error> {
    let mut decoder = open_decoder(file)?;
    read_header_from_file(&mut decoder)
}

/// Reads a grid file and returns its grid and values, NaN where no data
pub fn read_values_from_file(file: &str) -> Result<(RegularGrid, Vec<f32>), io::Error> {
    let mut decoder = open_decoder(file)?;
    let grid = read_header_from_file(&mut decoder)?;
    let values = read_array_from_file(&mut decoder, grid.len())?;
    Ok((grid, values))
}

/// Parse an input filename and return a tuple with grid_name, variable and datetime
pub fn parse_line(line: &str) -> Result<(String, String, DateTime<Utc>), FWIError> {
    let filename = Path::new(&line)
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or(format!("Invalid line in input file list: {line}"))?;

    let name_and_ext = filename.split('.').collect::<Vec<&str>>();

    if name_and_ext.is_empty() || name_and_ext.len() > 2 {
        return Err(format!("Error parsing filename {line}").into());
    }

    let name = name_and_ext[0];
    let components: Vec<&str> = name.split('_').collect();

    if components.len() < 3 {
        return Err(format!("Error parsing filename {name}").into());
    }

    let date = components[0];
    let grid_name = components[1].to_string();
    // variable names may contain underscores (t2m_C)
    let variable = components[2..].join("_");

    let date = NaiveDateTime::parse_from_str(date, "%Y%m%d%H%M")
        .map_err(|error| format!("Error parsing date: {error}"))?;

    let date = DateTime::from_naive_utc_and_offset(date, Utc);

    Ok((grid_name, variable, date))
}

#[derive(Debug)]
pub struct BinaryInputFile {
    pub grid_name: String,
    pub path: String,
}

#[derive(Debug)]
pub struct BinaryInputHandler {
    pub grid: RegularGrid,
    pub data_map: HashMap<DateTime<Utc>, HashMap<InputVariableName, BinaryInputFile>>,
}

impl BinaryInputHandler {
    pub fn new(file_path: &str) -> Result<Self, FWIError> {
        let mut data_map: HashMap<DateTime<Utc>, HashMap<InputVariableName, BinaryInputFile>> =
            HashMap::new();

        let file = File::open(file_path)
            .map_err(|err| format!("Cannot open input list {file_path}: {err}"))?;

        // each line is a file with the following structure:
        // directory/<YYYYmmDDHHMM>_<grid_name>_<variable>.zbin
        let reader = io::BufReader::new(file);

        for line in reader.lines() {
            let line = match line {
                Ok(line) => line.trim().to_string(),
                Err(e) => {
                    warn!("Error reading line: {}", e);
                    continue;
                }
            };

            if !line.ends_with(".zbin") {
                continue;
            }

            let (grid_name, variable, date) = match parse_line(&line) {
                Ok(parsed) => parsed,
                Err(err) => {
                    warn!("Error parsing filename {line}: {err}");
                    continue;
                }
            };

            let var = match variable.parse::<InputVariableName>() {
                Ok(var) => var,
                Err(_) => {
                    warn!("Error parsing variable {variable}");
                    continue;
                }
            };

            data_map.entry(date).or_default().insert(
                var,
                BinaryInputFile {
                    grid_name,
                    path: line,
                },
            );
        }

        let first_file = data_map
            .values()
            .flat_map(|files| files.values())
            .next()
            .ok_or(format!("No valid input file listed in {file_path}"))?;
        let grid = read_grid_from_file(&first_file.path)
            .map_err(|err| format!("Cannot read grid from {}: {err}", first_file.path))?;

        Ok(BinaryInputHandler { grid, data_map })
    }
}

impl InputHandler for BinaryInputHandler {
    fn get_values(
        &self,
        var: InputVariableName,
        date: &DateTime<Utc>,
    ) -> Result<Option<Grid>, FWIError> {
        let file = match self.data_map.get(date).and_then(|files| files.get(&var)) {
            Some(file) => file,
            None => return Ok(None),
        };

        let (grid, values) = read_values_from_file(&file.path)
            .map_err(|err| format!("Error reading file {}: {err}", file.path))?;
        if grid.shape() != self.grid.shape() {
            return Err(format!(
                "{} is on grid {} with shape {:?}, expected {:?}",
                file.path,
                file.grid_name,
                grid.shape(),
                self.grid.shape()
            )
            .into());
        }
        let values = Array2::from_shape_vec((grid.nrows, grid.ncols), values)
            .map_err(|err| format!("Error reading file {}: {err}", file.path))?;
        Ok(Some(values.into_dyn()))
    }

    /// Returns the timeline
    fn get_timeline(&self) -> Vec<DateTime<Utc>> {
        self.data_map.keys().copied().sorted().collect()
    }

    fn get_grid(&self) -> &RegularGrid {
        &self.grid
    }

    fn info_input(&self) -> String {
        self.get_timeline()
            .iter()
            .map(|date| {
                let variables = self
                    .data_map
                    .get(date)
                    .map(|files| files.keys().map(|v| v.to_string()).sorted().join(", "))
                    .unwrap_or_default();
                format!("{}: {}", date.format("%Y-%m-%d %H:%M"), variables)
            })
            .join("\n")
    }
}

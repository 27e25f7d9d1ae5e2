use chrono::{DateTime, Utc};
use fwi::{
    error::FWIError,
    models::output::OutputVariableName,
    modules::fwi::config::FWIModelConfig,
    retrieval::RetrievalRequest,
};
use serde_derive::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, Read};
use std::str::FromStr;

use crate::common::io::models::grid::RegularGrid;

use super::models::Config;

pub type ConfigMap = HashMap<String, Vec<String>>;

const MODEL_NAME_KEY: &str = "MODELNAME";
const WARM_STATE_PATH_KEY: &str = "STATO0";
const OUTPUTS_KEY: &str = "MODEL";
const VARIABLES_KEY: &str = "VARIABLE";
const KEY_HOURSRESOLUTION: &str = "OUTPUTHRES";
const KEEP_STATE_KEY: &str = "KEEPSTATE";
const FFMC_INIT_KEY: &str = "FFMC0";
const DMC_INIT_KEY: &str = "DMC0";
const DC_INIT_KEY: &str = "DC0";

const DEFAULT_OUTPUT_RESOLUTION: u32 = 24;

trait ConfigMapExt {
    /// Get the first value of a key in the config map
    fn first(&self, key: &str) -> Option<String>;
    fn all(&self, key: &str) -> Option<Vec<String>>;
    fn parse_first<T: FromStr>(&self, key: &str) -> Result<Option<T>, FWIError>;
}

impl ConfigMapExt for ConfigMap {
    fn first(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|values| values.first().cloned())
    }

    fn all(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).cloned()
    }

    fn parse_first<T: FromStr>(&self, key: &str) -> Result<Option<T>, FWIError> {
        match self.first(key) {
            Some(value) => value
                .parse::<T>()
                .map(Some)
                .map_err(|_| format!("Invalid value for {key}: {value}").into()),
            None => Ok(None),
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "true" | "True" | "TRUE" | "1")
}

pub fn read_config(file_name: impl Into<String>) -> Result<ConfigMap, FWIError> {
    let file_name = file_name.into();
    let file =
        File::open(&file_name).map_err(|error| format!("error opening config file: {error}"))?;
    let reader = io::BufReader::new(file);

    let mut config_map: ConfigMap = ConfigMap::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|error| format!("error line: {i} \n {error}"))?;
        let line = line.trim();

        if line.starts_with('%') || line.starts_with('#') || line.is_empty() {
            // skip comments and empty lines
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .ok_or(format!("error parsing config file {file_name} at line {i}."))?;

        config_map
            .entry(key.trim().to_string())
            .or_default()
            .push(value.trim().to_string());
    }
    Ok(config_map)
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OutputTypeConfig {
    pub name: String,
    pub path: String,
    #[serde(default = "default_format")]
    pub format: String,
    pub variables: Vec<OutputVariableName>,
}

fn default_format() -> String {
    "ZBIN".to_string()
}

fn default_output_resolution() -> u32 {
    DEFAULT_OUTPUT_RESOLUTION
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FWIConfigBuilder {
    pub model_name: String,
    pub warm_state_path: String,
    pub output_types: Vec<OutputTypeConfig>,
    #[serde(default = "default_output_resolution")]
    pub output_time_resolution: u32,
    #[serde(default)]
    pub model: FWIModelConfig,
}

impl FWIConfigBuilder {
    pub fn build(&self, date: &DateTime<Utc>, grid: &RegularGrid) -> Result<Config, FWIError> {
        Config::new(self, *date, grid)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigContainer {
    #[serde(default)]
    pub models: Vec<FWIConfigBuilder>,
    #[serde(default)]
    pub retrieval: Option<RetrievalRequest>,
}

impl ConfigContainer {
    pub fn from_file(config_file: &str) -> Result<ConfigContainer, FWIError> {
        // Check the file extension to determine which method to use
        if config_file.ends_with(".yaml") || config_file.ends_with(".yml") {
            Self::from_yaml(config_file)
        } else if config_file.ends_with(".txt") {
            Self::from_txt_file(config_file)
        } else {
            Err(FWIError::from(format!(
                "Unsupported config file format: {}",
                config_file
            )))
        }
    }

    pub fn from_yaml(config_file: &str) -> Result<Self, FWIError> {
        let mut file = File::open(config_file)
            .map_err(|err| format!("Cannot open config file {}: {}", config_file, err))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|err| format!("Cannot read config file {}: {}", config_file, err))?;

        Self::from_yaml_str(&contents)
            .map_err(|err| format!("Cannot parse config file {}: {}", config_file, err).into())
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, FWIError> {
        let conf: ConfigContainer =
            serde_yaml::from_str(contents).map_err(|err| format!("{err}"))?;
        Ok(conf)
    }

    /// `MODEL=<internal name>:<file name prefix>:<path>:<format>` lines define
    /// the outputs, `VARIABLE=<internal name>:<variable>` lines assign them
    /// their variables.
    fn parse_output_types(
        output_types_defs: &[String],
        variables_defs: &[String],
    ) -> Result<Vec<OutputTypeConfig>, FWIError> {
        let mut output_types: Vec<(String, OutputTypeConfig)> = Vec::new();

        for out_type_def in output_types_defs {
            let parts = out_type_def.split(':').collect::<Vec<&str>>();
            if parts.len() != 4 {
                return Err(format!("Invalid output definition {out_type_def}").into());
            }
            let (internal_name, name, path, format) = (parts[0], parts[1], parts[2], parts[3]);
            output_types.push((
                internal_name.to_string(),
                OutputTypeConfig {
                    name: name.into(),
                    path: path.into(),
                    format: format.into(),
                    variables: Vec::new(),
                },
            ));
        }

        for variable_def in variables_defs {
            let parts = variable_def.split(':').collect::<Vec<&str>>();
            if parts.len() != 2 {
                return Err(format!("Invalid variable definition {variable_def}").into());
            }
            let (output_type, variable) = (parts[0], parts[1]);
            let variable = OutputVariableName::from_str(variable)
                .map_err(|_| format!("Invalid Variable Name {variable}"))?;

            let (_, output_type) = output_types
                .iter_mut()
                .find(|(internal_name, _)| internal_name == output_type)
                .ok_or(format!("Unknown output {output_type} in {variable_def}"))?;
            output_type.variables.push(variable);
        }

        Ok(output_types.into_iter().map(|(_, t)| t).collect())
    }

    pub fn from_txt_file(config_file: &str) -> Result<ConfigContainer, FWIError> {
        let config_map = read_config(config_file)?;
        Self::from_config_map(&config_map)
    }

    fn from_config_map(config_map: &ConfigMap) -> Result<ConfigContainer, FWIError> {
        let model_name = config_map
            .first(MODEL_NAME_KEY)
            .ok_or(format!("Error: {MODEL_NAME_KEY} not found in config"))?;

        let warm_state_path = config_map
            .first(WARM_STATE_PATH_KEY)
            .ok_or(format!("Error: {WARM_STATE_PATH_KEY} not found in config"))?;

        let output_time_resolution = config_map
            .parse_first::<u32>(KEY_HOURSRESOLUTION)?
            .unwrap_or(DEFAULT_OUTPUT_RESOLUTION);

        let output_types_defs = config_map.all(OUTPUTS_KEY).unwrap_or_default();
        let variables_defs = config_map.all(VARIABLES_KEY).unwrap_or_default();
        let output_types = Self::parse_output_types(&output_types_defs, &variables_defs)?;

        let defaults = FWIModelConfig::default();
        let model = FWIModelConfig {
            keep_state_on_missing: config_map
                .first(KEEP_STATE_KEY)
                .map(|value| parse_bool(&value))
                .unwrap_or(defaults.keep_state_on_missing),
            ffmc_init: config_map
                .parse_first(FFMC_INIT_KEY)?
                .unwrap_or(defaults.ffmc_init),
            dmc_init: config_map
                .parse_first(DMC_INIT_KEY)?
                .unwrap_or(defaults.dmc_init),
            dc_init: config_map
                .parse_first(DC_INIT_KEY)?
                .unwrap_or(defaults.dc_init),
        };

        let config = FWIConfigBuilder {
            model_name,
            warm_state_path,
            output_types,
            output_time_resolution,
            model,
        };

        Ok(ConfigContainer {
            models: vec![config],
            retrieval: None,
        })
    }
}

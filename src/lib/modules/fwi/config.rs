use serde_derive::{Deserialize, Serialize};

use super::constants::{DC_INIT, DMC_INIT, FFMC_INIT};

/// Run-time options of the FWI model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FWIModelConfig {
    /// Cells with missing weather keep yesterday's FFMC, DMC and DC
    /// instead of turning NaN.
    #[serde(default = "default_keep_state")]
    pub keep_state_on_missing: bool,
    /// Start-up values used when no warm state is available
    #[serde(default = "default_ffmc")]
    pub ffmc_init: f32,
    #[serde(default = "default_dmc")]
    pub dmc_init: f32,
    #[serde(default = "default_dc")]
    pub dc_init: f32,
}

fn default_keep_state() -> bool {
    true
}

fn default_ffmc() -> f32 {
    FFMC_INIT
}

fn default_dmc() -> f32 {
    DMC_INIT
}

fn default_dc() -> f32 {
    DC_INIT
}

impl Default for FWIModelConfig {
    fn default() -> Self {
        FWIModelConfig {
            keep_state_on_missing: default_keep_state(),
            ffmc_init: FFMC_INIT,
            dmc_init: DMC_INIT,
            dc_init: DC_INIT,
        }
    }
}

impl FWIModelConfig {
    /// Pure formula evaluation: missing cells propagate NaN.
    pub fn strict() -> Self {
        FWIModelConfig {
            keep_state_on_missing: false,
            ..FWIModelConfig::default()
        }
    }
}

use ndarray::Zip;

use crate::models::Grid;

use super::constants::*;

// Comparisons with NaN are false, so both clips leave NaN untouched
// (f32::max / f32::min would swallow it).
fn clip_min(value: f32, min: f32) -> f32 {
    if value < min {
        min
    } else {
        value
    }
}

fn clip_max(value: f32, max: f32) -> f32 {
    if value > max {
        max
    } else {
        value
    }
}

// FFMC MODULE
pub fn from_ffmc_to_moisture(ffmc: f32) -> f32 {
    FFMC_S1 * (FFMC_MAX - ffmc) / (FFMC_S2 + ffmc)
}

pub fn from_moisture_to_ffmc(moisture: f32) -> f32 {
    FFMC_S2 * (MOISTURE_MAX - moisture) / (FFMC_S1 + moisture)
}

/// Rain exceeding the 0.5 mm interception threshold, 0 otherwise.
pub fn ffmc_effective_rain(rain: f32) -> f32 {
    if rain > FFMC_MIN_RAIN {
        rain - FFMC_MIN_RAIN
    } else {
        0.0
    }
}

/// Moisture after wetting by `rain_eff` mm of effective rain, capped at 250.
pub fn moisture_rain_effect(moisture: f32, rain_eff: f32) -> f32 {
    let mut moisture_new: f32 = moisture
        + FFMC_R1
            * rain_eff
            * f32::exp(-100.0 / (251.0 - moisture))
            * (1.0 - f32::exp(-FFMC_R2 / rain_eff));
    // sovra-saturation conditions
    if moisture > FFMC_NORMAL_COND {
        moisture_new += FFMC_R3
            * f32::powf(moisture - FFMC_NORMAL_COND, FFMC_R4)
            * f32::powf(rain_eff, FFMC_R5);
    }
    clip_max(moisture_new, MOISTURE_MAX)
}

pub fn emc_dry(hum: f32, temp: f32) -> f32 {
    FFMC_A1D * f32::powf(hum, FFMC_A2D)
        + FFMC_A3D * f32::exp((hum - 100.0) / 10.0)
        + FFMC_A4 * (21.1 - temp) * (1.0 - f32::exp(-FFMC_A5 * hum))
}

pub fn emc_wet(hum: f32, temp: f32) -> f32 {
    FFMC_A1W * f32::powf(hum, FFMC_A2W)
        + FFMC_A3W * f32::exp((hum - 100.0) / 10.0)
        + FFMC_A4 * (21.1 - temp) * (1.0 - f32::exp(-FFMC_A5 * hum))
}

/// Log drying (or wetting) rate for the given humidity ratio.
fn log_rate(hum_ratio: f32, temp: f32, w_speed: f32) -> f32 {
    let k0: f32 = FFMC_B1 * (1.0 - f32::powf(hum_ratio, FFMC_B2))
        + FFMC_B3 * f32::powf(w_speed, FFMC_B4) * (1.0 - f32::powf(hum_ratio, FFMC_B5));
    k0 * FFMC_B6 * f32::exp(FFMC_B7 * temp)
}

pub fn update_moisture(moisture: f32, hum: f32, temp: f32, w_speed: f32) -> f32 {
    let emc_d = emc_dry(hum, temp);
    let emc_w = emc_wet(hum, temp);
    if moisture > emc_d {
        // drying process
        let k_dry = log_rate(hum / 100.0, temp, w_speed);
        emc_d + (moisture - emc_d) / f32::powf(10.0, k_dry)
    } else if moisture < emc_w {
        // wetting process
        let k_wet = log_rate((100.0 - hum) / 100.0, temp, w_speed);
        emc_w - (emc_w - moisture) / f32::powf(10.0, k_wet)
    } else {
        moisture
    }
}

pub fn update_ffmc(temp: f32, hum: f32, w_speed: f32, rain: f32, ffmc: f32) -> f32 {
    let moisture = from_ffmc_to_moisture(ffmc);
    let rain_eff = ffmc_effective_rain(rain);
    let moisture = if rain_eff > 0.0 {
        moisture_rain_effect(moisture, rain_eff)
    } else {
        clip_max(moisture, MOISTURE_MAX)
    };
    let moisture = update_moisture(moisture, hum, temp, w_speed);
    clip_min(clip_max(from_moisture_to_ffmc(moisture), FFMC_MAX), 0.0)
}

// DMC MODULE
pub fn dmc_rain_effect(rain: f32) -> f32 {
    if rain > DMC_MIN_RAIN {
        DMC_R1 * rain - DMC_R2
    } else {
        0.0
    }
}

pub fn dmc_drying_effect(temp: f32, hum: f32) -> f32 {
    DMC_T1 * (temp + DMC_T2) * (100.0 - hum) * DMC_T3
}

pub fn update_dmc(temp: f32, hum: f32, rain: f32, dmc: f32) -> f32 {
    clip_min(dmc + dmc_rain_effect(rain) + dmc_drying_effect(temp, hum), 0.0)
}

// DC MODULE
pub fn dc_rain_effect(dc: f32, rain: f32) -> f32 {
    let rd: f32 = DC_R1 * rain - DC_R2;
    let q0: f32 = DC_R3 * f32::exp(-dc / DC_R4);
    let qr: f32 = q0 + DC_R5 * rd;
    DC_R4 * f32::ln(DC_R3 / qr)
}

/// Potential evapotranspiration term, 0 below -2.8 °C.
pub fn dc_evapotranspiration(temp: f32) -> f32 {
    if temp >= DC_MIN_TEMP {
        DC_T1 * (temp + DC_T2)
    } else {
        0.0
    }
}

pub fn update_dc(temp: f32, rain: f32, dc: f32) -> f32 {
    let dc_new = if rain > DC_MIN_RAIN {
        dc_rain_effect(dc, rain)
    } else {
        dc + DC_T3 * dc_evapotranspiration(temp)
    };
    clip_min(dc_new, 0.0)
}

// ISI MODULE
pub fn get_isi(ffmc: f32, w_speed: f32) -> f32 {
    let moisture: f32 = from_ffmc_to_moisture(ffmc);
    let fw: f32 = f32::exp(ISI_A0 * w_speed);
    let ff: f32 =
        ISI_A1 * f32::exp(ISI_A2 * moisture) * (1.0 + f32::powf(moisture, ISI_A3) / ISI_A4);
    ISI_A5 * fw * ff
}

// BUI MODULE
pub fn get_bui(dmc: f32, dc: f32) -> f32 {
    // the first branch is 0/0 at DMC = DC = 0, its limit is 0
    if dmc == 0.0 && dc == 0.0 {
        return 0.0;
    }
    let bui = if dmc <= BUI_A1 * dc {
        BUI_A2 * ((dmc * dc) / (dmc + BUI_A1 * dc))
    } else {
        dmc - (1.0 - BUI_A2 * (dc / (dmc + BUI_A1 * dc))) * (BUI_A3 + BUI_A4 * dmc)
    };
    clip_min(bui, 0.0)
}

// FWI MODULE
pub fn duff_function(bui: f32) -> f32 {
    if bui <= FWI_BUI_LIMIT {
        FWI_A1 * f32::powf(bui, FWI_A2) + FWI_A3
    } else {
        1000.0 / (FWI_A4 + FWI_A5 * f32::exp(FWI_A6 * bui))
    }
}

pub fn get_fwi(isi: f32, bui: f32) -> f32 {
    let b: f32 = 0.1 * isi * duff_function(bui);
    if b > 1.0 {
        f32::exp(FWI_A7 * f32::powf(FWI_A8 * f32::ln(b), FWI_A9))
    } else {
        b
    }
}

// GRID OPERATIONS
// Every operation applies its kernel cell by cell, in parallel.
// Arguments must share the same shape (ndarray panics otherwise).

/// Today's FFMC from today's weather and yesterday's FFMC.
pub fn compute_ffmc(
    temperature: &Grid,
    humidity: &Grid,
    wind_speed: &Grid,
    rain: &Grid,
    ffmc_yesterday: &Grid,
) -> Grid {
    Zip::from(temperature)
        .and(humidity)
        .and(wind_speed)
        .and(rain)
        .and(ffmc_yesterday)
        .par_map_collect(|&t, &h, &w, &r, &f| update_ffmc(t, h, w, r, f))
}

/// Today's DMC from today's weather and yesterday's DMC.
pub fn compute_dmc(temperature: &Grid, humidity: &Grid, rain: &Grid, dmc_yesterday: &Grid) -> Grid {
    Zip::from(temperature)
        .and(humidity)
        .and(rain)
        .and(dmc_yesterday)
        .par_map_collect(|&t, &h, &r, &d| update_dmc(t, h, r, d))
}

/// Today's DC from today's weather and yesterday's DC.
pub fn compute_dc(temperature: &Grid, rain: &Grid, dc_yesterday: &Grid) -> Grid {
    Zip::from(temperature)
        .and(rain)
        .and(dc_yesterday)
        .par_map_collect(|&t, &r, &d| update_dc(t, r, d))
}

pub fn compute_isi(ffmc: &Grid, wind_speed: &Grid) -> Grid {
    Zip::from(ffmc)
        .and(wind_speed)
        .par_map_collect(|&f, &w| get_isi(f, w))
}

pub fn compute_bui(dmc: &Grid, dc: &Grid) -> Grid {
    Zip::from(dmc).and(dc).par_map_collect(|&d, &c| get_bui(d, c))
}

pub fn compute_fwi(isi: &Grid, bui: &Grid) -> Grid {
    Zip::from(isi).and(bui).par_map_collect(|&i, &b| get_fwi(i, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, Array1};

    fn assert_approx(actual: f32, expected: f32, tol: f32) {
        assert!(
            (actual - expected).abs() < tol,
            "expected {expected} ± {tol}, got {actual}"
        );
    }

    // -- FFMC --

    #[test]
    fn moisture_conversion_is_consistent() {
        assert_approx(from_ffmc_to_moisture(101.0), 0.0, 1e-5);
        assert_approx(from_moisture_to_ffmc(0.0), 101.046, 1e-2);
        let m = from_ffmc_to_moisture(85.0);
        assert_approx(m, 16.299, 1e-3);
        assert_approx(from_moisture_to_ffmc(m), 85.0, 0.1);
    }

    #[test]
    fn ffmc_drying_day_raises_ffmc() {
        // moisture 16.3 is above the drying equilibrium (11.75 at RH 40 %)
        assert!(from_ffmc_to_moisture(85.0) > emc_dry(40.0, 20.0));
        let ffmc = update_ffmc(20.0, 40.0, 10.0, 0.0, 85.0);
        assert_approx(ffmc, 88.273, 1e-2);
    }

    #[test]
    fn ffmc_wetting_day_lowers_ffmc() {
        // moisture 2.8 is below the wetting equilibrium (25.3 at RH 95 %)
        assert!(from_ffmc_to_moisture(98.0) < emc_wet(95.0, 20.0));
        let ffmc = update_ffmc(20.0, 95.0, 10.0, 0.0, 98.0);
        assert_approx(ffmc, 80.570, 1e-2);
    }

    #[test]
    fn ffmc_rain_threshold_is_exclusive() {
        assert_eq!(ffmc_effective_rain(0.5), 0.0);
        assert_approx(ffmc_effective_rain(0.51), 0.01, 1e-6);

        let dry = update_ffmc(20.0, 40.0, 10.0, 0.0, 85.0);
        let at_threshold = update_ffmc(20.0, 40.0, 10.0, 0.5, 85.0);
        let above = update_ffmc(20.0, 40.0, 10.0, 0.51, 85.0);
        assert_eq!(dry, at_threshold);
        assert!(above < at_threshold);
        assert_approx(above, 88.218, 1e-2);
    }

    #[test]
    fn ffmc_heavy_rain_drops_sharply() {
        let ffmc = update_ffmc(20.0, 40.0, 10.0, 20.0, 85.0);
        assert_approx(ffmc, 61.881, 2e-2);
    }

    #[test]
    fn ffmc_rain_on_saturated_fuel_is_capped() {
        // FFMC 0 means moisture ~250, above the 150 saturation threshold
        let wet = moisture_rain_effect(from_ffmc_to_moisture(0.0), 2.5);
        assert_eq!(wet, MOISTURE_MAX);
        let ffmc = update_ffmc(20.0, 40.0, 10.0, 3.0, 0.0);
        assert_approx(ffmc, 52.969, 2e-2);
    }

    #[test]
    fn ffmc_stays_in_range_without_rain() {
        for ffmc in (0..=101).map(|v| v as f32) {
            for hum in [0.0, 15.0, 40.0, 75.0, 100.0] {
                for temp in [-10.0, 5.0, 20.0, 40.0] {
                    let value = update_ffmc(temp, hum, 25.0, 0.0, ffmc);
                    assert!(
                        (0.0..=101.0).contains(&value),
                        "ffmc {ffmc}, hum {hum}, temp {temp} -> {value}"
                    );
                }
            }
        }
    }

    // -- DMC --

    #[test]
    fn dmc_without_rain_adds_drying_term_only() {
        let dmc = update_dmc(20.0, 40.0, 0.0, 6.0);
        assert_approx(dmc, 6.0 + 1.894 * 21.1 * 60.0 * 1e-4, 1e-5);
    }

    #[test]
    fn dmc_rain_threshold_is_exclusive() {
        assert_eq!(dmc_rain_effect(1.5), 0.0);
        assert_eq!(update_dmc(20.0, 40.0, 1.5, 6.0), update_dmc(20.0, 40.0, 0.0, 6.0));
        let diff = update_dmc(20.0, 40.0, 1.6, 6.0) - update_dmc(20.0, 40.0, 0.0, 6.0);
        assert_approx(diff, 0.202, 1e-4);
    }

    #[test]
    fn dmc_is_never_negative() {
        for dmc in [0.0, 0.1, 5.0, 80.0] {
            for rain in [0.0, 1.0, 1.6, 30.0] {
                for temp in [-30.0, -5.0, 0.0, 25.0] {
                    assert!(update_dmc(temp, 100.0, rain, dmc) >= 0.0);
                    assert!(update_dmc(temp, 20.0, rain, dmc) >= 0.0);
                }
            }
        }
    }

    // -- DC --

    #[test]
    fn dc_without_rain_adds_half_evapotranspiration() {
        assert_approx(update_dc(20.0, 0.0, 15.0), 19.104, 1e-4);
        assert_eq!(dc_evapotranspiration(-5.0), 0.0);
        assert_eq!(update_dc(-5.0, 0.0, 15.0), 15.0);
    }

    #[test]
    fn dc_heavy_rain_overrides_base_update() {
        assert_approx(update_dc(20.0, 5.0, 300.0), 288.175, 1e-2);
        // rain on a low DC drives the moisture equivalent below zero DC
        assert_eq!(update_dc(20.0, 20.0, 15.0), 0.0);
        assert_ne!(update_dc(20.0, 20.0, 15.0), update_dc(20.0, 0.0, 15.0));
    }

    #[test]
    fn dc_is_never_negative() {
        for dc in [0.0, 1.0, 15.0, 400.0] {
            for rain in [0.0, 2.8, 2.9, 10.0, 100.0] {
                for temp in [-30.0, -2.8, 0.0, 30.0] {
                    assert!(update_dc(temp, rain, dc) >= 0.0);
                }
            }
        }
    }

    // -- ISI / BUI / FWI --

    #[test]
    fn isi_reference_values() {
        assert_approx(get_isi(88.27323, 10.0), 5.5388, 1e-2);
        assert!(get_isi(85.0, 30.0) > get_isi(85.0, 10.0));
    }

    #[test]
    fn bui_branches() {
        assert_approx(get_bui(6.2397804, 19.104), 6.8699, 1e-3);
        assert_approx(get_bui(100.0, 50.0), 98.6267, 1e-2);
        assert_eq!(get_bui(0.0, 0.0), 0.0);
        assert_eq!(get_bui(0.0, 100.0), 0.0);
    }

    #[test]
    fn fwi_branches() {
        assert_approx(get_fwi(5.538847, 6.869908), 4.9490, 1e-2);
        assert_approx(get_fwi(10.0, 100.0), 31.4989, 5e-2);
        // B <= 1 is returned unchanged
        assert_approx(get_fwi(0.5, 10.0), 0.30162, 1e-4);
    }

    #[test]
    fn fwi_of_negative_isi_is_nan_free_below_one() {
        // B < 1 skips the logarithm
        assert!(get_fwi(-1.0, 10.0).is_finite());
    }

    #[test]
    fn nan_propagates_through_clips() {
        assert!(update_dmc(f32::NAN, 40.0, 0.0, 6.0).is_nan());
        assert!(update_dc(20.0, 0.0, f32::NAN).is_nan());
        assert!(update_ffmc(20.0, 40.0, 10.0, 0.0, f32::NAN).is_nan());
        // drying regime with an undefined rate
        assert!(update_ffmc(20.0, 40.0, f32::NAN, 0.0, 85.0).is_nan());
        assert!(get_bui(f32::NAN, 10.0).is_nan());
        assert!(get_bui(0.0, f32::NAN).is_nan());
    }

    // -- grids --

    #[test]
    fn grid_operations_match_scalar_kernels() {
        let temp = arr1(&[20.0, 20.0, 5.0]).into_dyn();
        let hum = arr1(&[40.0, 40.0, 90.0]).into_dyn();
        let wind = arr1(&[10.0, 10.0, 0.0]).into_dyn();
        let rain = arr1(&[0.0, 20.0, 3.0]).into_dyn();
        let ffmc0 = Array1::from_elem(3, FFMC_INIT).into_dyn();
        let dmc0 = Array1::from_elem(3, DMC_INIT).into_dyn();
        let dc0 = Array1::from_elem(3, DC_INIT).into_dyn();

        let ffmc = compute_ffmc(&temp, &hum, &wind, &rain, &ffmc0);
        let dmc = compute_dmc(&temp, &hum, &rain, &dmc0);
        let dc = compute_dc(&temp, &rain, &dc0);
        let isi = compute_isi(&ffmc, &wind);
        let bui = compute_bui(&dmc, &dc);
        let fwi = compute_fwi(&isi, &bui);

        for i in 0..3 {
            let (t, h, w, r) = (temp[[i]], hum[[i]], wind[[i]], rain[[i]]);
            assert_eq!(ffmc[[i]], update_ffmc(t, h, w, r, FFMC_INIT));
            assert_eq!(dmc[[i]], update_dmc(t, h, r, DMC_INIT));
            assert_eq!(dc[[i]], update_dc(t, r, DC_INIT));
            assert_eq!(isi[[i]], get_isi(ffmc[[i]], w));
            assert_eq!(bui[[i]], get_bui(dmc[[i]], dc[[i]]));
            assert_eq!(fwi[[i]], get_fwi(isi[[i]], bui[[i]]));
        }
    }
}

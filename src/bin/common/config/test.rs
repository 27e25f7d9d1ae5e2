use std::{env::temp_dir, fs};

use chrono::{TimeZone, Utc};
use fwi::{
    models::output::OutputVariableName, modules::fwi::models::FWIWarmState,
    retrieval::DataFormat,
};
use ndarray::arr2;

use crate::common::io::models::grid::RegularGrid;

use super::{
    builder::{read_config, ConfigContainer},
    models::{read_warm_state, write_warm_state},
};

fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = temp_dir().join(format!("fwi-engine-{name}"));
    fs::create_dir_all(&dir).expect("temp dir");
    dir
}

#[test]
fn read_config_skips_comments_and_collects_repeated_keys() {
    let dir = scratch_dir("read-config");
    let file = dir.join("config.txt");
    fs::write(
        &file,
        concat!(
            "% comment\n",
            "# another\n",
            "\n",
            "MODELNAME=europe\n",
            "MODEL=daily:EU:/tmp/out:ZBIN\n",
            "VARIABLE=daily:FFMC\n",
            "VARIABLE=daily:FWI\n",
        ),
    )
    .expect("should write");

    let config_map = read_config(file.to_str().expect("utf8 path")).expect("should parse");
    assert_eq!(config_map["MODELNAME"], vec!["europe"]);
    assert_eq!(config_map["VARIABLE"], vec!["daily:FFMC", "daily:FWI"]);
    assert!(!config_map.contains_key("% comment"));

    fs::write(&file, "MODELNAME europe\n").expect("should write");
    assert!(read_config(file.to_str().expect("utf8 path")).is_err());
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn txt_config_builds_a_model() {
    let dir = scratch_dir("txt-config");
    let file = dir.join("config.txt");
    fs::write(
        &file,
        concat!(
            "MODELNAME=europe\n",
            "STATO0=/tmp/state/fwi_\n",
            "MODEL=daily:EU:/tmp/out:ZBIN\n",
            "VARIABLE=daily:FFMC\n",
            "VARIABLE=daily:fwi\n",
            "KEEPSTATE=false\n",
            "DC0=100\n",
        ),
    )
    .expect("should write");

    let configs = ConfigContainer::from_file(file.to_str().expect("utf8 path"))
        .expect("should parse");
    assert_eq!(configs.models.len(), 1);
    let model = &configs.models[0];
    assert_eq!(model.model_name, "europe");
    assert_eq!(model.warm_state_path, "/tmp/state/fwi_");
    assert_eq!(model.output_time_resolution, 24);
    assert_eq!(model.output_types[0].name, "EU");
    assert_eq!(
        model.output_types[0].variables,
        vec![OutputVariableName::FFMC, OutputVariableName::FWI]
    );
    assert!(!model.model.keep_state_on_missing);
    assert_eq!(model.model.dc_init, 100.0);
    assert_eq!(model.model.ffmc_init, 85.0);
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn txt_config_rejects_unknown_output() {
    let dir = scratch_dir("txt-config-bad");
    let file = dir.join("config.txt");
    fs::write(
        &file,
        "MODELNAME=europe\nSTATO0=/tmp/state/fwi_\nVARIABLE=daily:FFMC\n",
    )
    .expect("should write");
    assert!(ConfigContainer::from_file(file.to_str().expect("utf8 path")).is_err());
    assert!(ConfigContainer::from_file("config.ini").is_err());
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn yaml_config_with_defaults() {
    let yaml = r#"
models:
  - model_name: europe
    warm_state_path: /tmp/state/fwi_
    output_types:
      - name: EU
        path: /tmp/out
        variables: [FFMC, DMC, DC, ISI, BUI, FWI]
retrieval:
  years: [2023]
  data_format: netcdf
"#;
    let configs = ConfigContainer::from_yaml_str(yaml).expect("should parse");
    let model = &configs.models[0];
    assert_eq!(model.output_types[0].format, "ZBIN");
    assert_eq!(model.output_types[0].variables.len(), 6);
    assert!(model.model.keep_state_on_missing);
    let retrieval = configs.retrieval.expect("retrieval section");
    assert_eq!(retrieval.years, vec![2023]);
    assert_eq!(retrieval.data_format, DataFormat::Netcdf);

    let retrieval_only = ConfigContainer::from_yaml_str("retrieval:\n  hours: [12]\n")
        .expect("models are optional");
    assert!(retrieval_only.models.is_empty());
    assert!(ConfigContainer::from_yaml_str("models: 3").is_err());
}

#[test]
fn config_output_schedule() {
    let yaml = r#"
models:
  - model_name: europe
    warm_state_path: /nonexistent/fwi_
    output_types: []
    output_time_resolution: 48
"#;
    let configs = ConfigContainer::from_yaml_str(yaml).expect("should parse");
    let run_date = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
    let grid = RegularGrid::new(2, 2, 40.0, 10.0, 41.0, 11.0);
    let config = configs.models[0]
        .build(&run_date, &grid)
        .expect("should build");

    assert!(config.should_write_output(&run_date));
    assert!(!config.should_write_output(&Utc.with_ymd_and_hms(2024, 7, 2, 12, 0, 0).unwrap()));
    assert!(config.should_write_output(&Utc.with_ymd_and_hms(2024, 7, 3, 12, 0, 0).unwrap()));
    assert!(config.should_write_warm_state(&Utc.with_ymd_and_hms(2024, 7, 2, 12, 0, 0).unwrap()));
    assert!(!config.should_write_warm_state(&Utc.with_ymd_and_hms(2024, 7, 3, 12, 0, 0).unwrap()));

    // no warm state on disk: initial values, one day before the run
    let state = config.new_state();
    assert_eq!(state.time, Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap());
    assert!(state.data.ffmc.iter().all(|v| *v == 85.0));
}

#[test]
fn warm_state_round_trip() {
    let dir = scratch_dir("warm-state");
    let base = dir.join("fwi_");
    let base = base.to_str().expect("utf8 path");

    let warm_state = FWIWarmState::new(
        arr2(&[[86.0, 90.5], [f32::NAN, 70.0]]).into_dyn(),
        arr2(&[[6.0, 12.25], [f32::NAN, 3.0]]).into_dyn(),
        arr2(&[[15.0, 300.0], [f32::NAN, 0.0]]).into_dyn(),
    )
    .expect("same shapes");
    // written two days before the run date
    let file_date = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
    let file_name = format!("{}{}", base, file_date.format("%Y%m%d%H%M"));
    write_warm_state(&file_name, &warm_state).expect("should write");
    let contents = fs::read_to_string(&file_name).expect("should read");
    assert!(contents.contains("-9999"));

    let run_date = Utc.with_ymd_and_hms(2024, 7, 3, 0, 0, 0).unwrap();
    let (loaded, time) = read_warm_state(base, run_date, &[2, 2]).expect("should find state");
    assert_eq!(time, Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap());
    assert_eq!(loaded.ffmc[[0, 1]], 90.5);
    assert_eq!(loaded.dc[[0, 1]], 300.0);
    assert!(loaded.dmc[[1, 0]].is_nan());

    // wrong number of cells
    assert!(read_warm_state(base, run_date, &[3, 2]).is_none());
    // too old
    let late = Utc.with_ymd_and_hms(2024, 7, 5, 0, 0, 0).unwrap();
    assert!(read_warm_state(base, late, &[2, 2]).is_none());
    fs::remove_dir_all(&dir).ok();
}

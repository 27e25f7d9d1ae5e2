mod common;
use std::env::{set_var, var};
use std::error::Error;
use std::fs;
use std::path::Path;

use chrono::prelude::*;
use clap::{arg, command, Parser, Subcommand};

use common::config::builder::{ConfigContainer, FWIConfigBuilder};
use common::helpers::get_input;
use common::io::readers::binary::BinaryInputHandler;
use common::io::readers::prelude::InputHandler;
use fwi::error::FWIError;
use fwi::retrieval::RetrievalRequest;
use fwi::version::LONG_VERSION;
use log::{info, trace, warn};

#[derive(Parser, Debug)]
#[command(
    version,
    long_version=LONG_VERSION,
    about="Canadian Forest Fire Weather Index engine for gridded daily weather",
    long_about=concat!(
        "Computes the six codes and indices of the Canadian Forest Fire Weather Index System ",
        "(FFMC, DMC, DC, ISI, BUI, FWI) day by day on gridded weather, carrying the moisture ",
        "codes from one day to the next through a warm state."
    )
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the model on the input files listed in a text file
    Run {
        #[arg(required = true, help = "Model date in the format YYYYMMDDHHMM", index = 1)]
        date: String,

        #[arg(required = true, help = "Path to the configuration file", index = 2)]
        config_path: String,

        #[arg(required = true, help = "Path to the input file list", index = 3)]
        input_path: String,
    },
    /// Print the reanalysis retrieval request document
    Request {
        #[arg(long, help = "YAML configuration with a retrieval section")]
        config: Option<String>,

        #[arg(long, help = "Write the request to this file instead of stdout")]
        output: Option<String>,
    },
}

fn run_fwi(
    model_config: &FWIConfigBuilder,
    date: &DateTime<Utc>,
    handler: &dyn InputHandler,
) -> Result<(), FWIError> {
    let config = model_config
        .build(date, handler.get_grid())
        .map_err(|err| format!("Could not configure model: {err}"))?;

    let mut output_writer = config
        .get_output_writer()
        .map_err(|err| format!("Could not configure output writer: {err}"))?;

    let mut state = config.new_state();
    info!(
        "Model {} starts from the state of {}",
        config.model_name(),
        state.time.format("%Y-%m-%d %H:%M")
    );
    let shape = handler.get_grid().shape();

    let timeline = handler.get_timeline();
    for time in timeline {
        if time <= state.time {
            trace!("Skipping {}, before the warm state", time.format("%Y-%m-%d %H:%M"));
            continue;
        }
        let step_time = Utc::now();
        info!("Processing {}", time.format("%Y-%m-%d %H:%M"));
        let input = get_input(handler, &time, &shape)?;

        let c = Utc::now();
        state.update(&input)?;
        trace!("Updating state took {} seconds", Utc::now() - c);

        if config.should_write_output(&state.time) {
            let c = Utc::now();
            let output = state.output(&input)?;
            trace!("Generating output took {} seconds", Utc::now() - c);

            let c = Utc::now();
            if let Err(err) = output_writer.write_output(&output) {
                warn!("Error writing output: {}", err);
            }
            trace!("Writing output took {} seconds", Utc::now() - c);
        }

        if config.should_write_warm_state(&time) {
            let c = Utc::now();
            match config.write_warm_state(&state) {
                Ok(file) => info!("Warm state written to {}", file),
                Err(err) => warn!("Error writing warm state: {}", err),
            }
            trace!("Writing warm state took {} seconds", Utc::now() - c);
        }
        trace!("Step took {} seconds", Utc::now() - step_time);
    }
    Ok(())
}

fn run(date_str: &str, config_path_str: &str, input_path_str: &str) -> Result<(), Box<dyn Error>> {
    if !Path::new(config_path_str).is_file() {
        return Err(format!("Config file {} is not a file", config_path_str).into());
    }
    if !Path::new(input_path_str).is_file() {
        return Err(format!("Input path {} is not valid", input_path_str).into());
    }

    let date = NaiveDateTime::parse_from_str(date_str, "%Y%m%d%H%M")
        .map_err(|_| format!("Could not parse run date '{}'", date_str))?;
    let date = DateTime::from_naive_utc_and_offset(date, Utc);

    let configs = ConfigContainer::from_file(config_path_str)
        .map_err(|err| format!("Failed to load config: {}", err))?;
    if configs.models.is_empty() {
        return Err(format!("No model configured in {}", config_path_str).into());
    }

    info!(
        "Loading input data from {} using BinaryInputHandler",
        input_path_str
    );
    let input_handler = BinaryInputHandler::new(input_path_str)?;
    info!("Input files:\n{}", input_handler.info_input());

    for model_config in &configs.models {
        info!("Running model: {}", model_config.model_name);
        let start_time = Utc::now();

        if let Err(err) = run_fwi(model_config, &date, &input_handler) {
            warn!("Error running model: {}", err);
        }

        let elapsed_time = Utc::now() - start_time;
        info!("Elapsed time: {} seconds", elapsed_time.num_seconds());
    }
    Ok(())
}

fn request(config: Option<&str>, output: Option<&str>) -> Result<(), Box<dyn Error>> {
    let retrieval = match config {
        Some(config) => ConfigContainer::from_file(config)?
            .retrieval
            .unwrap_or_default(),
        None => RetrievalRequest::default(),
    };
    let document = retrieval.to_json()?;
    match output {
        Some(file) => {
            fs::write(file, document)?;
            info!(
                "Request written to {}, download target {}",
                file,
                retrieval.target_file_name()
            );
        }
        None => println!("{}", document),
    }
    Ok(())
}

/// main function
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if var("RUST_LOG").is_err() {
        set_var("RUST_LOG", "info")
    }
    pretty_env_logger::init();

    match args.command {
        Command::Run {
            date,
            config_path,
            input_path,
        } => run(&date, &config_path, &input_path),
        Command::Request { config, output } => request(config.as_deref(), output.as_deref()),
    }
}

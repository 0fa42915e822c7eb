use std::path::Path;

use clap::{ArgAction, Args, Command, FromArgMatches as _};
use log::{debug, info};

use crate::error::SurvivalError;
use crate::horizon::{HazardWindow, Period};
use crate::log::{set_log_level, set_module_filters, LevelFilter};
use crate::outcomes::CohortOutcomes;
use crate::parameters::Parameters;
use crate::random::SeedPolicy;
use crate::report::{write_reports, ReportOptions};

/// Default cli arguments for the survival model runner
#[derive(Args, Debug, Default)]
pub struct BaseArgs {
    /// Random seed
    #[arg(short, long, default_value = "0")]
    pub random_seed: u64,

    /// Seed every patient from system entropy instead of the random seed
    #[arg(long, conflicts_with = "random_seed")]
    pub unseeded: bool,

    /// Optional path for a JSON parameters file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Optional directory for CSV report output
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Optional prefix for report files
    #[arg(long = "prefix", default_value = "")]
    pub file_prefix: String,

    /// Overwrite existing report files
    #[arg(short, long)]
    pub force_overwrite: bool,

    /// Enable logging, either a level ("info") or a list of filters ("info,survival_model=trace")
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, action = ArgAction::Count)]
    pub verbose: u8,

    /// Simulate the patients on all available cores
    #[arg(long)]
    pub parallel: bool,
}

/// Command line overrides for the model parameters
#[derive(Args, Debug, Default)]
pub struct ModelArgs {
    /// Cohort id
    #[arg(long)]
    pub cohort_id: Option<u64>,

    /// Number of patients in the cohort
    #[arg(long)]
    pub pop_size: Option<usize>,

    /// Per-period probability of death
    #[arg(long)]
    pub mortality_prob: Option<f64>,

    /// Number of periods to simulate
    #[arg(long)]
    pub time_steps: Option<Period>,

    /// Whether a patient can die in the last period
    #[arg(long, value_enum)]
    pub hazard_window: Option<HazardWindow>,
}

/// The result of a run: the parameters actually used and the cohort outcomes.
#[derive(Debug)]
pub struct SimulationRun {
    pub parameters: Parameters,
    pub outcomes: CohortOutcomes,
}

fn create_cli() -> Command {
    let cli = Command::new("survival-model")
        .about("Simulates the survival of a cohort of patients with a constant mortality risk");
    let cli = BaseArgs::augment_args(cli);
    ModelArgs::augment_args(cli)
}

/// Runs a simulation configured from the process's command line arguments.
///
/// # Errors
/// Returns an error if argument parsing, parameter validation, simulation or report output fails
pub fn run_with_args() -> Result<SimulationRun, Box<dyn std::error::Error>> {
    let matches = create_cli().get_matches();
    let base_args = BaseArgs::from_arg_matches(&matches)?;
    let model_args = ModelArgs::from_arg_matches(&matches)?;
    run_with_args_internal(&base_args, &model_args)
}

/// Runs a simulation configured from the given arguments. The first item is the program name.
///
/// # Errors
/// Returns an error if argument parsing, parameter validation, simulation or report output fails
pub fn run_from<I, T>(args: I) -> Result<SimulationRun, Box<dyn std::error::Error>>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = create_cli().try_get_matches_from(args)?;
    let base_args = BaseArgs::from_arg_matches(&matches)?;
    let model_args = ModelArgs::from_arg_matches(&matches)?;
    run_with_args_internal(&base_args, &model_args)
}

fn run_with_args_internal(
    args: &BaseArgs,
    model_args: &ModelArgs,
) -> Result<SimulationRun, Box<dyn std::error::Error>> {
    configure_logging(args)?;

    let parameters = resolve_parameters(args, model_args)?;
    debug!("running with parameters {parameters:?}");
    let horizon = parameters.time_horizon()?;

    let seed_policy = if args.unseeded {
        SeedPolicy::Entropy
    } else {
        SeedPolicy::Fixed {
            base_seed: args.random_seed,
        }
    };
    if !seed_policy.is_reproducible() {
        info!("seeding patients from system entropy, results will vary between runs");
    }
    let mut cohort = parameters.build_cohort()?.with_seed_policy(seed_policy);

    if args.parallel {
        simulate_parallel(&mut cohort, &horizon)?;
    } else {
        cohort.simulate(&horizon)?;
    }
    let outcomes = cohort
        .into_outcomes()
        .ok_or("cohort finished without outcomes")?;

    if let Some(output_dir) = &args.output_dir {
        let mut report_options = ReportOptions::new();
        report_options
            .directory(output_dir)
            .file_prefix(args.file_prefix.clone())
            .overwrite(args.force_overwrite);
        write_reports(&outcomes, &horizon, &report_options)?;
    }

    Ok(SimulationRun {
        parameters,
        outcomes,
    })
}

#[cfg(feature = "parallel")]
fn simulate_parallel(
    cohort: &mut crate::cohort::Cohort,
    horizon: &crate::horizon::TimeHorizon,
) -> Result<(), SurvivalError> {
    cohort.simulate_parallel(horizon)?;
    Ok(())
}

#[cfg(not(feature = "parallel"))]
fn simulate_parallel(
    cohort: &mut crate::cohort::Cohort,
    horizon: &crate::horizon::TimeHorizon,
) -> Result<(), SurvivalError> {
    log::warn!("built without the `parallel` feature, simulating sequentially");
    cohort.simulate(horizon)?;
    Ok(())
}

/// Defaults, then the config file, then command line overrides.
fn resolve_parameters(
    args: &BaseArgs,
    model_args: &ModelArgs,
) -> Result<Parameters, SurvivalError> {
    let mut parameters = match &args.config {
        Some(path) => {
            println!("Loading parameters from: {path}");
            Parameters::load(Path::new(path))?
        }
        None => Parameters::default(),
    };

    if let Some(cohort_id) = model_args.cohort_id {
        parameters.cohort_id = cohort_id;
    }
    if let Some(pop_size) = model_args.pop_size {
        parameters.pop_size = pop_size;
    }
    if let Some(mortality_prob) = model_args.mortality_prob {
        parameters.mortality_prob = mortality_prob;
    }
    if let Some(time_steps) = model_args.time_steps {
        parameters.time_steps = time_steps;
    }
    if let Some(hazard_window) = model_args.hazard_window {
        parameters.hazard_window = hazard_window;
    }

    parameters.validate()?;
    Ok(parameters)
}

fn configure_logging(args: &BaseArgs) -> Result<(), SurvivalError> {
    let verbosity_level = match args.verbose {
        0 => None,
        1 => Some(LevelFilter::Info),
        2 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    };

    let (global_level, module_filters) = match &args.log_level {
        Some(spec) => parse_log_levels(spec)?,
        None => (None, Vec::new()),
    };

    // The more verbose of the two wins.
    if let Some(level) = global_level.max(verbosity_level) {
        set_log_level(level);
        if let Some(message) = logging_enabled_message(None, level) {
            println!("{message}");
        }
    }
    if !module_filters.is_empty() {
        let filters: Vec<(&str, LevelFilter)> = module_filters
            .iter()
            .map(|(module, level)| (module.as_str(), *level))
            .collect();
        set_module_filters(&filters);
        for (module, level) in &module_filters {
            if let Some(message) = logging_enabled_message(Some(module.as_str()), *level) {
                println!("{message}");
            }
        }
    }
    info!("logging configured");
    Ok(())
}

/// `None` when `level` turns logging off.
fn logging_enabled_message(module: Option<&str>, level: LevelFilter) -> Option<String> {
    if level == LevelFilter::Off {
        return None;
    }
    let level = level.to_string().to_uppercase();
    Some(match module {
        Some(module) => format!("Logging enabled for {module} at level {level}"),
        None => format!("Logging enabled at level {level}"),
    })
}

type LogLevels = (Option<LevelFilter>, Vec<(String, LevelFilter)>);

/// Parses `"level"`, `"module=level"` or a comma separated list of both. Levels are case
/// insensitive.
fn parse_log_levels(spec: &str) -> Result<LogLevels, SurvivalError> {
    let parse_level = |level: &str| {
        level.trim().parse::<LevelFilter>().map_err(|_| {
            SurvivalError::ConfigError(format!("invalid log level `{}`", level.trim()))
        })
    };

    let mut global_level = None;
    let mut module_filters = Vec::new();
    for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        match entry.split_once('=') {
            Some((module, level)) => {
                module_filters.push((module.trim().to_string(), parse_level(level)?));
            }
            None => global_level = Some(parse_level(entry)?),
        }
    }
    Ok((global_level, module_filters))
}

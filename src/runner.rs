use std::path::{Path, PathBuf};

use clap::{Args, Command, FromArgMatches as _};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use xxhash_rust::xxh3::xxh3_64;

use crate::canvas::{Canvas, CanvasEvent, DrawRequest, HeadlessCanvas};
use crate::engine::Engine;
use crate::error::SimError;
use crate::log::{apply_log_spec, debug, info, warn};
use crate::pacing::FramePacer;
use crate::parameters::{Parameters, Scenario, SimulationConfig, TransmissionMode};
use crate::plot::{write_svg, Curves, FIGURE_NAME};
use crate::population::Population;
use crate::progress::{
    finalize_custom_progress, init_custom_progress_bar, update_custom_progress, RECOVERED_LABEL,
};
use crate::report::{CountsReport, ReportOptions};
use crate::time_series::{Summary, TimeSeries};
#[cfg(feature = "window")]
use crate::window::WindowCanvas;

/// Default cli arguments for the simulator
#[derive(Args, Debug, Clone, Default)]
pub struct BaseArgs {
    /// Random seed
    #[arg(short, long, default_value = "0")]
    pub random_seed: u64,

    /// Optional path for a JSON simulation config file
    #[arg(short, long, default_value = "")]
    pub config: String,

    /// Optional path for report and plot output
    #[arg(short, long, default_value = "")]
    pub output_dir: String,

    /// Enable logging, either globally (`info`) or per module (`flusim::engine=trace,...`)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Run without a display and without frame pacing
    #[arg(long)]
    pub headless: bool,

    /// Stop each scenario after this many ticks
    #[arg(long)]
    pub max_ticks: Option<usize>,

    /// Whether infections found during a tick take effect within that tick
    #[arg(long, value_enum)]
    pub transmission_mode: Option<TransmissionMode>,

    /// Do not write the epidemic curve figure
    #[arg(long)]
    pub no_plot: bool,

    /// Show a progress bar of recovered agents (headless runs only)
    #[arg(long)]
    pub progress: bool,
}

/// Why a scenario stopped ticking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// No infected agents remain.
    Extinct,
    /// The canvas asked to quit.
    QuitRequested,
    /// The configured tick limit was reached.
    TickLimit,
}

#[derive(Clone, Debug)]
pub struct ScenarioOutcome {
    pub scenario: Scenario,
    pub series: TimeSeries,
    pub stop_reason: StopReason,
}

impl ScenarioOutcome {
    #[must_use]
    pub fn summary(&self) -> Option<Summary> {
        self.series.summary()
    }
}

/// Seed for a scenario's random number generator. Each scenario gets its own stream derived
/// from the base seed and the scenario label, so adding or reordering scenarios does not change
/// the others.
#[must_use]
pub fn scenario_seed(base_seed: u64, scenario: &Scenario) -> u64 {
    base_seed.wrapping_add(xxh3_64(scenario.label.as_bytes()))
}

/// Runs one scenario to completion on `canvas`.
///
/// Each iteration polls the canvas for a quit request, advances the engine one tick, draws
/// every agent, waits for the frame pacer and records the counts. The run ends once no agent
/// is infected, after the iteration in which a quit is requested, or when
/// `parameters.max_ticks` is reached.
///
/// # Errors
///
/// Returns an error if the parameters or scenario are invalid or if the canvas fails.
pub fn run_scenario<C: Canvas + ?Sized, R: Rng + ?Sized>(
    parameters: &Parameters,
    scenario: &Scenario,
    canvas: &mut C,
    rng: &mut R,
    frame_rate: u32,
    show_progress: bool,
) -> Result<ScenarioOutcome, SimError> {
    parameters.validate()?;
    scenario.validate()?;
    info!(
        "setting up scenario {} ({}): population={}, vaccination_fraction={}, mode={:?}",
        scenario.label,
        scenario.name,
        parameters.population,
        scenario.vaccination_fraction,
        parameters.transmission_mode
    );

    let population = Population::new(parameters, scenario.vaccination_fraction, rng);
    let mut engine = Engine::new(parameters.clone(), population);
    let mut pacer = FramePacer::new(frame_rate);
    let mut series = TimeSeries::new();

    canvas.open(&scenario.caption())?;
    if show_progress {
        init_custom_progress_bar(RECOVERED_LABEL, parameters.population);
    }

    let mut stop_reason = None;
    while stop_reason.is_none() {
        canvas.clear();
        if canvas.poll_events().contains(&CanvasEvent::Quit) {
            warn!("quit requested during scenario {}", scenario.label);
            stop_reason = Some(StopReason::QuitRequested);
        }

        let counts = engine.tick(rng);
        for agent in engine.population() {
            canvas.draw(DrawRequest::for_agent(agent, parameters.agent_radius));
        }
        canvas.present()?;
        pacer.wait();

        series.record(counts);
        if show_progress {
            update_custom_progress(counts.recovered);
        }

        if counts.infected == 0 {
            stop_reason = Some(StopReason::Extinct);
        } else if stop_reason.is_none()
            && parameters.max_ticks.is_some_and(|limit| series.len() >= limit)
        {
            stop_reason = Some(StopReason::TickLimit);
        }
    }

    if show_progress {
        finalize_custom_progress();
    }
    canvas.close();

    let stop_reason = stop_reason.unwrap_or(StopReason::Extinct);
    info!(
        "scenario {} stopped after {} ticks ({:?})",
        scenario.label,
        series.len(),
        stop_reason
    );
    Ok(ScenarioOutcome {
        scenario: scenario.clone(),
        series,
        stop_reason,
    })
}

/// Runs every scenario in `config` in order, each with its own random number generator.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or if a scenario fails.
pub fn run_scenarios<C: Canvas + ?Sized>(
    config: &SimulationConfig,
    base_seed: u64,
    canvas: &mut C,
    frame_rate: u32,
    show_progress: bool,
) -> Result<Vec<ScenarioOutcome>, SimError> {
    config.validate()?;
    let mut outcomes = Vec::with_capacity(config.scenarios.len());
    for scenario in &config.scenarios {
        println!("Running Scenario {}: {}...", scenario.label, scenario.name);
        let seed = scenario_seed(base_seed, scenario);
        debug!("scenario {} uses seed {}", scenario.label, seed);
        let mut rng = SmallRng::seed_from_u64(seed);
        let outcome = run_scenario(
            &config.parameters,
            scenario,
            canvas,
            &mut rng,
            frame_rate,
            show_progress,
        )?;
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

/// Writes the counts report and, unless disabled, the epidemic curve figure.
///
/// # Errors
///
/// Returns an error if an output file cannot be written.
pub fn write_outputs(
    outcomes: &[ScenarioOutcome],
    options: &ReportOptions,
    plot: bool,
) -> Result<(), SimError> {
    let mut report = CountsReport::create(options)?;
    for outcome in outcomes {
        report.write_series(&outcome.scenario.label, &outcome.series)?;
    }
    info!("wrote counts to {}", report.path().display());

    if plot {
        let charts: Vec<Curves> = outcomes
            .iter()
            .map(|outcome| Curves {
                title: outcome.scenario.title(),
                infected: outcome.series.infected(),
                susceptible: outcome.series.susceptible(),
            })
            .collect();
        let path = options.path_for(FIGURE_NAME);
        write_svg(&path, &charts)?;
        info!("wrote epidemic curves to {}", path.display());
    }
    Ok(())
}

fn print_summary(outcome: &ScenarioOutcome) {
    if let Some(summary) = outcome.summary() {
        info!("scenario {} summary: {:?}", outcome.scenario.label, summary);
        println!(
            "Scenario {} finished after {} ticks: peak of {} infected at tick {}; final S={} I={} R={}",
            outcome.scenario.label,
            summary.duration,
            summary.peak_infected,
            summary.peak_tick,
            summary.final_susceptible,
            summary.final_infected,
            summary.final_recovered
        );
    }
}

#[cfg(feature = "window")]
fn window_canvas(parameters: &Parameters) -> Result<Box<dyn Canvas>, SimError> {
    Ok(Box::new(WindowCanvas::new(parameters.width, parameters.height)?))
}

#[cfg(not(feature = "window"))]
fn window_canvas(_parameters: &Parameters) -> Result<Box<dyn Canvas>, SimError> {
    Err(SimError::DisplayError(
        "built without the `window` feature; use --headless".to_string(),
    ))
}

fn create_cli() -> Command {
    let cli = Command::new("flusim")
        .about("Agent-based SIR epidemic simulation in a bounded arena");
    BaseArgs::augment_args(cli)
}

/// Parses the command line and runs every configured scenario.
///
/// # Errors
///
/// Returns an error if argument parsing, configuration, the display or output fails
pub fn run_with_args() -> Result<Vec<ScenarioOutcome>, Box<dyn std::error::Error>> {
    let matches = create_cli().get_matches();
    let args = BaseArgs::from_arg_matches(&matches)?;
    Ok(run_with_args_internal(args)?)
}

/// Loads the configuration named by `args`, applying command line overrides.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or holds invalid values.
pub fn load_config(args: &BaseArgs) -> Result<SimulationConfig, SimError> {
    let mut config = if args.config.is_empty() {
        SimulationConfig::default()
    } else {
        println!("Loading simulation config from: {}", args.config);
        SimulationConfig::load(Path::new(&args.config))?
    };
    if let Some(max_ticks) = args.max_ticks {
        config.parameters.max_ticks = Some(max_ticks);
    }
    if let Some(mode) = args.transmission_mode {
        config.parameters.transmission_mode = mode;
    }
    config.validate()?;
    Ok(config)
}

fn run_with_args_internal(args: BaseArgs) -> Result<Vec<ScenarioOutcome>, SimError> {
    if let Some(spec) = &args.log_level {
        apply_log_spec(spec)?;
    }

    let config = load_config(&args)?;

    let mut report_options = ReportOptions::default();
    if !args.output_dir.is_empty() {
        report_options.directory(PathBuf::from(&args.output_dir));
    }

    let outcomes = if args.headless {
        let mut canvas = HeadlessCanvas::new();
        run_scenarios(&config, args.random_seed, &mut canvas, 0, args.progress)?
    } else {
        let mut canvas = window_canvas(&config.parameters)?;
        run_scenarios(
            &config,
            args.random_seed,
            canvas.as_mut(),
            config.parameters.frame_rate,
            false,
        )?
    };

    for outcome in &outcomes {
        print_summary(outcome);
    }
    write_outputs(&outcomes, &report_options, !args.no_plot)?;
    Ok(outcomes)
}

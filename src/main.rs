//! ghsom-inspect CLI - inspection of trained hierarchical SOMs
//!
//! Command-line interface for fit metrics, weight images and interactive
//! drill-down through a trained model.

use clap::{Parser, Subcommand};
use ghsom_inspect::{
    metrics, Colormap, Config, Dataset, HierarchyNavigator, InspectError, ModelFile, PngSurface,
    Result,
};
use ghsom_inspect::navigator::run_session;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use log::error;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "ghsom-inspect")]
#[command(author = "ghsom-inspect Contributors")]
#[command(version)]
#[command(about = "Inspect trained growing hierarchical SOMs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print dataset summary, model structure and fit metrics
    Inspect {
        /// Trained model file
        #[arg(short, long)]
        model: PathBuf,

        /// Dataset file (one point per line, label in the last column)
        #[arg(short, long)]
        data: PathBuf,

        /// The dataset has no label column
        #[arg(long)]
        no_labels: bool,
    },

    /// Render the top-level map as a PNG
    Render {
        /// Trained model file
        #[arg(short, long)]
        model: PathBuf,

        /// Output PNG directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Dataset to overlay (optional)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// The dataset has no label column
        #[arg(long)]
        no_labels: bool,

        /// Pixel scale factor
        #[arg(long)]
        scale: Option<u32>,

        /// Colormap (bone_r, gray, viridis)
        #[arg(long)]
        colormap: Option<String>,
    },

    /// Interactively drill into child maps (commands on stdin)
    Browse {
        /// Trained model file
        #[arg(short, long)]
        model: PathBuf,

        /// Dataset to overlay and pass down to child views (optional)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// The dataset has no label column
        #[arg(long)]
        no_labels: bool,

        /// Directory receiving one PNG per opened view
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pixel scale factor
        #[arg(long)]
        scale: Option<u32>,

        /// Colormap (bone_r, gray, viridis)
        #[arg(long)]
        colormap: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let result = load_config(cli.config).and_then(|config| match cli.command {
        Commands::Inspect {
            model,
            data,
            no_labels,
        } => inspect(model, data, !no_labels),

        Commands::Render {
            model,
            output,
            data,
            no_labels,
            scale,
            colormap,
        } => {
            let config = apply_overrides(config, output, scale, colormap)?;
            render_root(model, data, !no_labels, config)
        }

        Commands::Browse {
            model,
            data,
            no_labels,
            output,
            scale,
            colormap,
        } => {
            let config = apply_overrides(config, output, scale, colormap)?;
            browse(model, data, !no_labels, config)
        }
    });

    if let Err(e) = result {
        error!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path),
        None => Ok(Config::default()),
    }
}

fn parse_colormap(name: &str) -> Result<Colormap> {
    match name.to_ascii_lowercase().as_str() {
        "bone_r" | "bone-reversed" | "bone_reversed" => Ok(Colormap::BoneReversed),
        "gray" | "grey" => Ok(Colormap::Gray),
        "viridis" => Ok(Colormap::Viridis),
        other => Err(InspectError::Config(format!("unknown colormap {:?}", other))),
    }
}

fn apply_overrides(
    mut config: Config,
    output: Option<PathBuf>,
    scale: Option<u32>,
    colormap: Option<String>,
) -> Result<Config> {
    if let Some(output) = output {
        config.session.output_dir = output;
    }
    if let Some(scale) = scale {
        config.render.scale = scale;
    }
    if let Some(name) = colormap {
        config.render.colormap = parse_colormap(&name)?;
    }
    config.validate()?;
    Ok(config)
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn load_dataset(path: Option<PathBuf>, labelled: bool) -> Result<Option<Dataset>> {
    path.map(|p| Dataset::load(p, labelled)).transpose()
}

fn inspect(model_path: PathBuf, data_path: PathBuf, labelled: bool) -> Result<()> {
    let start_time = Instant::now();

    let pb = spinner("Loading dataset...");
    let dataset = Dataset::load(&data_path, labelled)?;
    pb.finish_and_clear();

    println!("dataset length: {}", dataset.len());
    println!("features per example: {}", dataset.features());
    println!("number of labels: {}", dataset.distinct_labels().len());
    println!();

    let pb = spinner("Loading model...");
    let model = ModelFile::read(&model_path)?;
    pb.finish_and_clear();

    println!("{}", model);

    let pb = spinner("Descending data points to their leaves...");
    let report = metrics::evaluate(&model, &dataset)?;
    pb.finish_and_clear();

    println!("{}", report);
    println!("Completed in {}", HumanDuration(start_time.elapsed()));

    Ok(())
}

fn render_root(
    model_path: PathBuf,
    data_path: Option<PathBuf>,
    labelled: bool,
    config: Config,
) -> Result<()> {
    let model = ModelFile::read(&model_path)?;
    let dataset = load_dataset(data_path, labelled)?;

    let surface = PngSurface::new(&config.session.output_dir, config.render, config.overlay)?;
    let mut nav = HierarchyNavigator::new(surface);
    let root = nav.open_root(&model, dataset)?;

    let surface = nav.into_surface();
    if let Some(path) = surface.path_of(root) {
        println!("✓ Wrote {}", path.display());
    }
    Ok(())
}

fn browse(
    model_path: PathBuf,
    data_path: Option<PathBuf>,
    labelled: bool,
    config: Config,
) -> Result<()> {
    let model = ModelFile::read(&model_path)?;
    let dataset = load_dataset(data_path, labelled)?;

    println!("{}", model);

    let surface = PngSurface::new(&config.session.output_dir, config.render, config.overlay)?;
    println!("Views are written to {}", surface.dir().display());
    println!("Type `help` for commands.");

    let mut nav = HierarchyNavigator::new(surface);
    let root = nav.open_root(&model, dataset)?;
    if let Some(view) = nav.view(root) {
        println!("opened view {}: {}", root, view.title());
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run_session(&mut nav, BufReader::new(stdin.lock()), &mut stdout, config.session.prompt)?;

    println!("Session ended with {} open view(s)", nav.views().len());
    Ok(())
}

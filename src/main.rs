mod app;
mod source;

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use knowledge_graph_view::{FrameBuffer, GraphView, LayoutConfig};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph JSON with `nodes` and `edges` arrays.
    graph: PathBuf,

    /// Layout config JSON; defaults apply to anything it leaves out.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    link_distance: Option<f32>,

    /// Charge strength; negative repels.
    #[arg(long, allow_hyphen_values = true)]
    charge: Option<f32>,

    /// Seed for initial placement of nodes without coordinates.
    #[arg(long)]
    seed: Option<u64>,

    /// Run the layout to rest and print the node positions as JSON instead of opening a window.
    #[arg(long)]
    headless: bool,

    /// Tick limit for `--headless`.
    #[arg(long, default_value_t = 10_000)]
    max_ticks: u64,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

impl Args {
    fn layout_config(&self) -> anyhow::Result<LayoutConfig> {
        let mut config = source::load_config(self.config.as_deref())?;

        if let Some(distance) = self.link_distance {
            config
                .forces
                .link
                .get_or_insert_with(Default::default)
                .distance = distance;
        }
        if let Some(strength) = self.charge {
            config
                .forces
                .charge
                .get_or_insert_with(Default::default)
                .strength = strength;
        }
        if let Some(seed) = self.seed {
            config.scatter.seed = seed;
        }

        config
            .validate()
            .context("invalid layout overrides on the command line")?;
        Ok(config)
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries the headless snapshot
    match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

fn run_headless(args: &Args, config: LayoutConfig) -> anyhow::Result<()> {
    let data = source::load_graph(&args.graph)?;
    let mut view = GraphView::initialize(&data, config, FrameBuffer::default())
        .with_context(|| format!("invalid graph in {}", args.graph.display()))?;

    let ticks = view.settle(args.max_ticks);
    let status = view.status();
    tracing::info!(ticks, state = ?status.state, alpha = status.alpha, "headless layout finished");

    let snapshot = view.snapshot().context("layout was destroyed before it finished")?;
    view.destroy();

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &snapshot).context("failed to write snapshot")?;
    writeln!(stdout)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format);

    let config = args.layout_config()?;
    if args.headless {
        return run_headless(&args, config);
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    let graph_path = args.graph.clone();
    eframe::run_native(
        "knowledge-graph-view",
        options,
        Box::new(move |cc| Ok(Box::new(app::GraphViewerApp::new(cc, graph_path, config)))),
    )
    .map_err(|error| anyhow::anyhow!("viewer exited with an error: {error}"))
}

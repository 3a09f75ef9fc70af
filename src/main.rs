//! Lesson runner - Main Entry Point
//!
//! Runs every teaching scenario and prints its trace, so the call order of
//! sequential and parallel pipelines can be compared by eye.

use lazy_pipeline::{
    config::{PipelineConfig, DEFAULT_CONFIG_FILE},
    lessons, ResultExt, Trace,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Logs go through a non-blocking writer so parallel workers never wait on stdout
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,lazy_pipeline=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = if config_path.exists() {
        tracing::info!("Loading pipeline config from {:?}", config_path);
        PipelineConfig::load(&config_path)?
    } else {
        PipelineConfig::default()
    };
    let trace = Trace::from_target(config.trace);

    let comparison = match run_lessons(&config, &trace) {
        Ok(comparison) => comparison,
        Err(e) => {
            if let Some(failure) = e.pipeline_error() {
                tracing::error!(
                    "Lesson drain failed in {:?} stage at element {:?}",
                    failure.stage_kind(),
                    failure.element_index()
                );
            }
            return Err(e.into());
        }
    };
    anyhow::ensure!(
        comparison.agrees(),
        "sequential and parallel sums differ: {:?}",
        comparison
    );

    tracing::info!("All lessons finished");
    Ok(())
}

/// Run every lesson, returning the sequential/parallel comparison for checking.
fn run_lessons(
    config: &PipelineConfig,
    trace: &Trace,
) -> lazy_pipeline::Result<lessons::ModeComparison> {
    tracing::info!("Running lessons");

    let product = lessons::factorial(6).context("factorial lesson")?;
    tracing::info!("6! = {}", product);

    let joined = lessons::reduce_walkthrough(&["a", "b", "c"], "x", trace)
        .context("reduce walkthrough lesson")?;
    tracing::info!("reduce(\"x\", [a, b, c]) = {}", joined);

    let comparison = lessons::lazy_vs_eager(0, 10, trace).context("lazy vs eager lesson")?;
    tracing::info!(
        "sequential = {}, parallel = {}",
        comparison.sequential,
        comparison.parallel
    );

    let configured = lessons::configured_sum(0, 10, config).context("configured drain")?;
    tracing::info!("{} drain with config = {}", config.mode, configured);

    lessons::simple_grouping(trace).context("grouping lesson")?;
    lessons::simple_partition(trace).context("partition lesson")?;

    let laziness = lessons::laziness_probe(1, 10).context("laziness lesson")?;
    tracing::info!(
        "predicate calls: lazy after build = {}, lazy after drain = {}, eager after build = {}",
        laziness.lazy_after_build,
        laziness.lazy_after_drain,
        laziness.eager_after_build
    );
    Ok(comparison)
}

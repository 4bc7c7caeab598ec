use anyhow::{Context, Result};
use delaycomp::{
    figures::{self, derive_all},
    labels::Labels,
    load::load_workbook,
    schema::normalize_table,
    Config,
};
use std::{env, time::Instant};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,delaycomp=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    let start = Instant::now();
    info!("startup");

    // ─── 2) config: optional single positional path ─────────────────
    let cfg = match env::args().nth(1) {
        Some(path) => Config::load(&path).with_context(|| format!("config stage: {}", path))?,
        None => Config::default(),
    };

    // ─── 3) load both worksheets once ───────────────────────────────
    let book = load_workbook(&cfg.input, &cfg.annual_sheet, &cfg.periodic_sheet)
        .with_context(|| format!("load stage: {}", cfg.input.display()))?;

    // ─── 4) normalize headers ───────────────────────────────────────
    let metadata = cfg.metadata_columns();
    let annual = normalize_table(&book.annual, &metadata)
        .with_context(|| format!("normalize stage: sheet {}", cfg.annual_sheet))?;
    let periodic = normalize_table(&book.periodic, &metadata)
        .with_context(|| format!("normalize stage: sheet {}", cfg.periodic_sheet))?;
    drop(book);

    // ─── 5) filter / reshape / align into the four figure tables ────
    let derived = derive_all(&annual, &periodic, &cfg).context("derive stage")?;

    // ─── 6) render the composite ────────────────────────────────────
    let labels = Labels::new(cfg.labels.clone());
    figures::render(&derived, &cfg.theme, &labels, &cfg.output)
        .with_context(|| format!("render stage: {}", cfg.output.display()))?;

    info!(output = %cfg.output.display(), elapsed = ?start.elapsed(), "all done");
    Ok(())
}

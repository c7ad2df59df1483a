// SPDX-License-Identifier: MPL-2.0

use adform::config::Config;
use adform::context::PageContext;
use adform::helpers;
use adform::widgets::SectionId;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Load the ad form's category and location selectors")]
struct Args {
    /// Site root serving /ads/ajax/ (overrides the config file)
    #[arg(short, long)]
    base_url: Option<String>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page context: a JSON file, or a rendered page containing the page-context script
    #[arg(short, long)]
    page_context: Option<PathBuf>,

    /// Ad being edited; omit for a create form
    #[arg(short, long)]
    ad_id: Option<u64>,

    /// Apply a change after loading, as SECTION:LEVEL:VALUE (e.g. category:2:55)
    #[arg(short, long = "select")]
    selections: Vec<String>,
}

fn parse_selection(spec: &str) -> Option<(SectionId, usize, String)> {
    let mut parts = spec.splitn(3, ':');
    let section = SectionId::parse(parts.next()?)?;
    let level = parts.next()?.parse().ok()?;
    let value = parts.next().unwrap_or_default().to_string();
    Some((section, level, value))
}

fn load_context(path: &Path) -> Result<PageContext, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    let parsed = if text.trim_start().starts_with('<') {
        PageContext::from_html(&text)
    } else {
        PageContext::from_json(&text)
    };
    parsed.map_err(|e| e.to_string())
}

async fn run(args: Args) -> Result<(), String> {
    let mut config = match &args.config {
        Some(path) => Config::load(path).map_err(|e| e.to_string())?,
        None => Config::default(),
    };
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }

    let context = match &args.page_context {
        Some(path) => load_context(path)?,
        None => PageContext::empty(),
    };

    let selections = args
        .selections
        .iter()
        .map(|spec| parse_selection(spec).ok_or_else(|| format!("invalid --select {spec:?}")))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(base_url = %config.base_url, ad_id = ?args.ad_id, "loading form");
    let mut runtime = helpers::load_form(config, context, args.ad_id)
        .await
        .map_err(|e| e.to_string())?;

    for (section, level, value) in selections {
        tracing::info!(%section, level, value = %value, "selecting");
        runtime.select(section, level, &value);
        runtime.run_until_idle().await;
    }

    let placeholder = &runtime.controller().config().placeholder_label;
    let form = runtime.form();
    println!("{}", form.to_html(placeholder));
    println!(
        "category={} neighbourhood={}",
        form.category_field.map(|id| id.to_string()).unwrap_or_default(),
        form.neighbourhood_field.map(|id| id.to_string()).unwrap_or_default()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "adform failed");
            ExitCode::FAILURE
        }
    }
}

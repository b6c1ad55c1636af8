mod args;
mod output;

use std::fs;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use mxsniff::mx::system_resolver;
use mxsniff::{CancelToken, ProviderTable, Sniffer, bulk_sniff};
use tracing_subscriber::EnvFilter;

use args::Cli;
use output::{Format, Reporter};

fn main() -> Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();
    let format = Format::parse(&cli.format)?;
    let sniff_options = cli.sniff_options()?;
    let bulk_options = cli.bulk_options()?;
    let probing = bulk_options.probe.is_some();

    let table = load_table(&cli)?;
    let resolver = system_resolver(&sniff_options.resolver).context("initialise DNS resolver")?;
    let sniffer = Arc::new(Sniffer::new(resolver, table, sniff_options));

    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    ctrlc::set_handler(move || on_interrupt.cancel()).context("install Ctrl-C handler")?;

    let results = bulk_sniff(sniffer, cli.inputs()?, bulk_options, cancel.clone())?;

    let stdout = io::stdout();
    let mut reporter = Reporter::new(format, stdout.lock(), cli.verbose, probing);
    for item in results {
        reporter.write(item)?;
    }
    let tally = reporter.finish()?;

    if cancel.is_cancelled() {
        eprintln!("interrompu: {} résultat(s) écrits", tally.total);
    }

    // codes de sortie : 0 OK, 2 entrées en échec, 1 fatal
    if tally.failed > 0 && !cli.ignore_errors {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_table(cli: &Cli) -> Result<Arc<ProviderTable>> {
    let Some(path) = &cli.providers else {
        return Ok(ProviderTable::builtin()?);
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("read provider table {}", path.display()))?;
    parse_table(&json).with_context(|| format!("load provider table {}", path.display()))
}

#[cfg(feature = "with-serde")]
fn parse_table(json: &str) -> Result<Arc<ProviderTable>> {
    Ok(Arc::new(ProviderTable::from_json(json)?))
}

#[cfg(not(feature = "with-serde"))]
fn parse_table(_: &str) -> Result<Arc<ProviderTable>> {
    anyhow::bail!("--providers nécessite la feature 'with-serde'")
}

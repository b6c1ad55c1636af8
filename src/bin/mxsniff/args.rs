use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use mxsniff::{BulkOptions, ProbeOptions, ResolverOptions, ResultOrder, SniffOptions};

#[derive(Parser)]
#[command(
    name = "mxsniff",
    version,
    about = "identifie le fournisseur e-mail d'un domaine à partir de ses MX"
)]
pub struct Cli {
    /// adresses e-mail, URL ou domaines; @fichier lit une entrée par ligne
    pub inputs: Vec<String>,

    /// lit les entrées depuis stdin (une par ligne)
    #[arg(long)]
    pub stdin: bool,

    /// affiche les enregistrements MX
    #[arg(short, long)]
    pub verbose: bool,

    /// code de sortie 0 même si certaines entrées échouent
    #[arg(short, long)]
    pub ignore_errors: bool,

    /// timeout DNS et SMTP, en secondes
    #[arg(short, long, default_value_t = 5.0)]
    pub timeout: f64,

    /// sonde SMTP chaque adresse avec cet expéditeur (MAIL FROM)
    #[arg(short, long, value_name = "SENDER")]
    pub probe: Option<String>,

    /// nom annoncé dans EHLO/HELO pendant la sonde
    #[arg(long)]
    pub helo: Option<String>,

    /// nombre de threads de travail
    #[arg(short, long, default_value_t = 10)]
    pub workers: usize,

    /// ordre des résultats: input|completed
    #[arg(long, default_value = "input")]
    pub order: String,

    /// format: human|csv|json|ndjson
    #[arg(long, default_value = "human")]
    pub format: String,

    /// reconnaît les domaines connus des fournisseurs sans requête DNS
    #[arg(long)]
    pub static_domains: bool,

    /// réduit chaque hôte à son domaine enregistrable
    #[arg(long)]
    pub registrable: bool,

    /// table de fournisseurs JSON remplaçant la table intégrée
    #[arg(long, value_name = "FILE")]
    pub providers: Option<PathBuf>,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn timeout(&self) -> Result<Duration> {
        if !self.timeout.is_finite() || self.timeout <= 0.0 {
            bail!("--timeout must be a positive number of seconds");
        }
        Ok(Duration::from_secs_f64(self.timeout))
    }

    pub fn sniff_options(&self) -> Result<SniffOptions> {
        Ok(SniffOptions {
            verbose: self.verbose,
            use_static_domains: self.static_domains,
            registrable_domain: self.registrable,
            resolver: ResolverOptions::with_timeout(self.timeout()?),
        })
    }

    pub fn bulk_options(&self) -> Result<BulkOptions> {
        let probe = match &self.probe {
            Some(sender) => {
                let timeout = self.timeout()?;
                Some(ProbeOptions {
                    sender: sender.clone(),
                    helo_domain: self.helo.clone(),
                    connect_timeout: timeout,
                    command_timeout: timeout,
                    ..ProbeOptions::default()
                })
            }
            None => None,
        };
        Ok(BulkOptions {
            workers: self.workers,
            ordering: order_from_str(&self.order)?,
            probe,
            ..BulkOptions::default()
        })
    }

    /// Identifiers from the command line (with `@file` expanded), followed
    /// by stdin when `--stdin` is set. Stdin is read lazily.
    pub fn inputs(&self) -> Result<Box<dyn Iterator<Item = String> + Send>> {
        let listed = expand_inputs(&self.inputs)?;
        if listed.is_empty() && !self.stdin {
            bail!("no input given; pass identifiers, @file or --stdin");
        }
        if !self.stdin {
            return Ok(Box::new(listed.into_iter()));
        }
        let stdin = BufReader::new(io::stdin())
            .lines()
            .map_while(|line| match line {
                Ok(line) => Some(line),
                Err(err) => {
                    tracing::error!(error = %err, "failed to read stdin");
                    None
                }
            })
            .filter_map(|line| entry(&line).map(str::to_string));
        Ok(Box::new(listed.into_iter().chain(stdin)))
    }
}

pub fn order_from_str(s: &str) -> Result<ResultOrder> {
    match s {
        "input" => Ok(ResultOrder::Input),
        "completed" => Ok(ResultOrder::Completed),
        other => bail!("unknown --order '{other}', use: input|completed"),
    }
}

/// Expand `@file` arguments: one identifier per line, blank lines and `#`
/// comments skipped.
pub fn expand_inputs(args: &[String]) -> Result<Vec<String>> {
    let mut inputs = Vec::new();
    for arg in args {
        match arg.strip_prefix('@') {
            Some(path) if !path.is_empty() => {
                let text =
                    fs::read_to_string(path).with_context(|| format!("read input file {path}"))?;
                inputs.extend(text.lines().filter_map(entry).map(str::to_string));
            }
            _ => inputs.push(arg.clone()),
        }
    }
    Ok(inputs)
}

fn entry(line: &str) -> Option<&str> {
    let line = line.trim();
    (!line.is_empty() && !line.starts_with('#')).then_some(line)
}

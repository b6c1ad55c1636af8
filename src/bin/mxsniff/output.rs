use std::collections::BTreeMap;
use std::io::Write;

use anyhow::{Result, bail};
use mxsniff::{BulkItem, MxRecord, ProbeResult, SniffResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Human,
    Csv,
    Json,
    Ndjson,
}

impl Format {
    pub fn parse(s: &str) -> Result<Self> {
        let format = match s {
            "human" => Self::Human,
            "csv" => Self::Csv,
            "json" => Self::Json,
            "ndjson" => Self::Ndjson,
            other => bail!("unknown --format '{other}', use: human|csv|json|ndjson"),
        };
        if cfg!(not(feature = "with-serde")) && matches!(format, Self::Json | Self::Ndjson) {
            bail!("format={s} nécessite la feature 'with-serde'");
        }
        if cfg!(not(feature = "with-csv")) && format == Self::Csv {
            bail!("format=csv nécessite la feature 'with-csv'");
        }
        Ok(format)
    }
}

/// Counts per provider (or failure kind) over a run.
#[derive(Debug, Default)]
pub struct Tally {
    pub total: usize,
    pub failed: usize,
    counts: BTreeMap<String, usize>,
}

impl Tally {
    fn record(&mut self, result: &SniffResult) {
        self.total += 1;
        let key = match &result.error {
            Some(failure) => {
                self.failed += 1;
                format!("error: {}", failure.kind)
            }
            None => result.label(),
        };
        *self.counts.entry(key).or_default() += 1;
    }

    /// Most frequent first, ties by name.
    fn sorted(&self) -> Vec<(&str, usize)> {
        let mut rows: Vec<(&str, usize)> = self
            .counts
            .iter()
            .map(|(label, count)| (label.as_str(), *count))
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        rows
    }
}

/// Streams bulk results to `out` in the chosen format.
pub struct Reporter<W: Write> {
    format: Format,
    out: W,
    verbose: bool,
    probe: bool,
    tally: Tally,
    #[cfg(feature = "with-serde")]
    buffered: Vec<BulkItem>,
    header_written: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(format: Format, out: W, verbose: bool, probe: bool) -> Self {
        Self {
            format,
            out,
            verbose,
            probe,
            tally: Tally::default(),
            #[cfg(feature = "with-serde")]
            buffered: Vec::new(),
            header_written: false,
        }
    }

    pub fn write(&mut self, item: BulkItem) -> Result<()> {
        self.tally.record(&item.result);
        match self.format {
            Format::Human => self.write_human(&item),
            Format::Csv => self.write_csv(&item),
            Format::Json => self.buffer_json(item),
            Format::Ndjson => self.write_ndjson(&item),
        }
    }

    pub fn finish(mut self) -> Result<Tally> {
        match self.format {
            Format::Human => self.write_tally()?,
            Format::Json => self.flush_json()?,
            Format::Csv | Format::Ndjson => {}
        }
        self.out.flush()?;
        Ok(self.tally)
    }

    fn write_human(&mut self, item: &BulkItem) -> Result<()> {
        let result = &item.result;
        match &result.error {
            None => {
                let mut line = format!("[OK]    {} -> {}", result.input, result.label());
                let titles: Vec<&str> = result
                    .providers
                    .iter()
                    .filter_map(|provider| provider.title.as_deref())
                    .collect();
                if !titles.is_empty() {
                    line.push_str(&format!(" ({})", titles.join(", ")));
                }
                if result.is_public {
                    line.push_str(" [public]");
                }
                writeln!(self.out, "{line}")?;
            }
            Some(failure) => writeln!(self.out, "[ERROR] {} :: {failure}", result.input)?,
        }

        if self.verbose {
            if let Some(mx) = &result.mx {
                writeln!(self.out, "        mx: {}", mx_summary(mx))?;
            }
            if let Some(canonical) = &result.canonical {
                writeln!(self.out, "        canonical: {canonical}")?;
            }
        }
        if let Some(probe) = &item.probe {
            writeln!(self.out, "        smtp: {}", probe_summary(probe))?;
        }
        Ok(())
    }

    fn write_tally(&mut self) -> Result<()> {
        if self.tally.total == 0 {
            return Ok(());
        }
        writeln!(self.out)?;
        for (label, count) in self.tally.sorted() {
            writeln!(self.out, "{count:>6}  {label}")?;
        }
        writeln!(
            self.out,
            "{:>6}  total ({} failed)",
            self.tally.total, self.tally.failed
        )?;
        Ok(())
    }

    #[cfg(feature = "with-csv")]
    fn write_csv(&mut self, item: &BulkItem) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut self.out);
        if !self.header_written {
            wtr.write_record(csv_header(self.verbose, self.probe))?;
            self.header_written = true;
        }
        wtr.write_record(csv_record(item, self.verbose, self.probe))?;
        wtr.flush()?;
        Ok(())
    }

    #[cfg(not(feature = "with-csv"))]
    fn write_csv(&mut self, _: &BulkItem) -> Result<()> {
        bail!("format=csv nécessite la feature 'with-csv'")
    }

    #[cfg(feature = "with-serde")]
    fn buffer_json(&mut self, item: BulkItem) -> Result<()> {
        self.buffered.push(item);
        Ok(())
    }

    #[cfg(not(feature = "with-serde"))]
    fn buffer_json(&mut self, _: BulkItem) -> Result<()> {
        bail!("format=json nécessite la feature 'with-serde'")
    }

    #[cfg(feature = "with-serde")]
    fn flush_json(&mut self) -> Result<()> {
        let s = serde_json::to_string_pretty(&self.buffered)?;
        writeln!(self.out, "{s}")?;
        Ok(())
    }

    #[cfg(not(feature = "with-serde"))]
    fn flush_json(&mut self) -> Result<()> {
        Ok(())
    }

    #[cfg(feature = "with-serde")]
    fn write_ndjson(&mut self, item: &BulkItem) -> Result<()> {
        writeln!(self.out, "{}", serde_json::to_string(item)?)?;
        Ok(())
    }

    #[cfg(not(feature = "with-serde"))]
    fn write_ndjson(&mut self, _: &BulkItem) -> Result<()> {
        bail!("format=ndjson nécessite la feature 'with-serde'")
    }
}

fn mx_summary(records: &[MxRecord]) -> String {
    if records.is_empty() {
        return "none".to_string();
    }
    records
        .iter()
        .map(|record| format!("{} {}", record.priority, record.exchange))
        .collect::<Vec<_>>()
        .join(", ")
}

fn probe_summary(probe: &ProbeResult) -> String {
    let mut summary = probe.outcome.to_string();
    if !probe.detail.is_empty() {
        summary.push_str(&format!(" ({})", probe.detail));
    }
    if let Some(host) = &probe.host {
        summary.push_str(&format!(" via {host}"));
    }
    summary
}

#[cfg(feature = "with-csv")]
fn csv_header(verbose: bool, probe: bool) -> Vec<&'static str> {
    let mut header = vec![
        "index",
        "input",
        "domain",
        "match",
        "routing",
        "public",
        "canonical",
        "error_kind",
        "error_detail",
    ];
    if verbose {
        header.push("mx");
    }
    if probe {
        header.extend(["smtp_outcome", "smtp_code", "smtp_detail"]);
    }
    header
}

#[cfg(feature = "with-csv")]
fn csv_record(item: &BulkItem, verbose: bool, probe: bool) -> Vec<String> {
    let result = &item.result;
    let mut record = vec![
        item.index.to_string(),
        result.input.clone(),
        result.domain.clone().unwrap_or_default(),
        result.matched.to_string(),
        result
            .routing
            .map(|routing| routing.to_string())
            .unwrap_or_default(),
        result.is_public.to_string(),
        result.canonical.clone().unwrap_or_default(),
        result
            .error
            .as_ref()
            .map(|failure| failure.kind.to_string())
            .unwrap_or_default(),
        result
            .error
            .as_ref()
            .map(|failure| failure.detail.clone())
            .unwrap_or_default(),
    ];
    if verbose {
        record.push(result.mx.as_deref().map(mx_summary).unwrap_or_default());
    }
    if probe {
        match &item.probe {
            Some(probe) => {
                record.push(probe.outcome.to_string());
                record.push(probe.code.map(|code| code.to_string()).unwrap_or_default());
                record.push(probe.detail.clone());
            }
            None => record.extend([String::new(), String::new(), String::new()]),
        }
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use mxsniff::{
        Failure, FailureKind, ProbeOutcome, ProviderInfo, ProviderMatch, Routing,
    };

    fn item(index: usize, input: &str, id: Option<&str>) -> BulkItem {
        let matched = id.map_or(ProviderMatch::None, |id| ProviderMatch::Single(id.into()));
        let providers = id
            .map(|id| ProviderInfo {
                id: id.to_string(),
                title: Some("Gmail".to_string()),
                note: None,
                url: None,
                public: true,
            })
            .into_iter()
            .collect();
        BulkItem {
            index,
            result: SniffResult {
                input: input.to_string(),
                domain: Some("gmail.com".to_string()),
                routing: Some(if id.is_some() {
                    Routing::Provider
                } else {
                    Routing::NullMx
                }),
                matched,
                providers,
                mx: Some(vec![MxRecord::new(5, "gmail-smtp-in.l.google.com")]),
                is_public: id.is_some(),
                canonical: None,
                error: None,
            },
            probe: None,
        }
    }

    fn failed(index: usize, input: &str) -> BulkItem {
        let mut failed = item(index, input, None);
        failed.result.domain = None;
        failed.result.routing = None;
        failed.result.error = Some(Failure::new(
            FailureKind::InvalidIdentifier,
            "identifier is empty",
        ));
        failed
    }

    fn render(format: Format, verbose: bool, items: Vec<BulkItem>) -> String {
        let mut buf = Vec::new();
        let mut reporter = Reporter::new(format, &mut buf, verbose, false);
        for item in items {
            reporter.write(item).unwrap();
        }
        reporter.finish().unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn human_report_with_tally() {
        let out = render(
            Format::Human,
            false,
            vec![
                item(0, "a@gmail.com", Some("google-gmail")),
                item(1, "b@gmail.com", Some("google-gmail")),
                item(2, "example.com", None),
                failed(3, " "),
            ],
        );
        insta::assert_snapshot!(out.trim_end(), @r"
        [OK]    a@gmail.com -> google-gmail (Gmail) [public]
        [OK]    b@gmail.com -> google-gmail (Gmail) [public]
        [OK]    example.com -> null_mx
        [ERROR]   :: invalid_identifier: identifier is empty

             2  google-gmail
             1  error: invalid_identifier
             1  null_mx
             4  total (1 failed)
        ");
    }

    #[test]
    fn verbose_human_report_shows_mx_and_probe() {
        let mut probed = item(0, "a@gmail.com", Some("google-gmail"));
        probed.probe = Some(ProbeResult {
            email: "a@gmail.com".to_string(),
            outcome: ProbeOutcome::HardFail,
            detail: "550 5.1.1 User unknown".to_string(),
            code: Some(550),
            host: Some("gmail-smtp-in.l.google.com".to_string()),
            failure: None,
            transcript: Vec::new(),
        });
        let out = render(Format::Human, true, vec![probed]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1], "        mx: 5 gmail-smtp-in.l.google.com");
        assert_eq!(
            lines[2],
            "        smtp: hard_fail (550 5.1.1 User unknown) via gmail-smtp-in.l.google.com"
        );
    }

    #[cfg(feature = "with-csv")]
    #[test]
    fn csv_report() {
        let out = render(
            Format::Csv,
            false,
            vec![item(0, "a@gmail.com", Some("google-gmail")), failed(1, "")],
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "index,input,domain,match,routing,public,canonical,error_kind,error_detail",
                "0,a@gmail.com,gmail.com,google-gmail,provider,true,,,",
                "1,,,,,false,,invalid_identifier,identifier is empty",
            ]
        );
    }

    #[cfg(feature = "with-serde")]
    #[test]
    fn ndjson_report_is_one_object_per_line() {
        let out = render(
            Format::Ndjson,
            false,
            vec![item(0, "a@gmail.com", Some("google-gmail")), item(1, "x", None)],
        );
        let values: Vec<serde_json::Value> = out
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0]["index"], 0);
        assert_eq!(values[0]["result"]["match"]["providers"], "google-gmail");
        assert_eq!(values[1]["result"]["match"]["kind"], "none");
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Format::parse("xml").is_err());
        assert_eq!(Format::parse("human").unwrap(), Format::Human);
    }
}

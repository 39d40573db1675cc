use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use paper_extract::config::get_config;
use paper_extract::models::{BatchSummary, ExtractionResult, Record};
use paper_extract::utils::resolve_doi;
use paper_extract::Extractor;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Paper Extract - Turn bibliographic records into plain text
#[derive(Parser, Debug)]
#[command(name = "paper-extract")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract full text or abstracts for bibliographic records", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv, -vvv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Plain)]
    output_format: OutputFormat,

    /// Log format
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Contact address sent to the metadata services
    #[arg(long, global = true)]
    email: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Just the text
    Plain,
    /// JSON format (machine-readable)
    Json,
}

/// Log line format
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract text for a single record
    #[command(alias = "x")]
    Extract {
        /// Landing page or PDF URL
        #[arg(long, short)]
        url: Option<String>,

        /// DOI (e.g., "10.1038/nature14539")
        #[arg(long, short)]
        doi: Option<String>,

        /// Paper title
        #[arg(long, short)]
        title: Option<String>,
    },

    /// Extract text for every record in a JSON array or JSON-lines file
    #[command(alias = "b")]
    Batch {
        /// Input file
        file: PathBuf,

        /// Number of records processed at once (default: from config)
        #[arg(long, short)]
        concurrency: Option<usize>,

        /// Write results here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Print the DOI that would be used for a record
    Doi {
        /// Landing page URL
        #[arg(long, short)]
        url: Option<String>,

        /// Explicit DOI
        #[arg(long, short)]
        doi: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli);

    let mut config = get_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(email) = cli.email.clone() {
        config.http.contact_email = email;
    }

    match cli.command {
        Commands::Extract { url, doi, title } => {
            let record = Record::new(url, doi, title);
            let extractor = Extractor::from_config(&config)?;
            let result = extractor.extract(&record).await;
            print_result(&result, cli.output_format)?;
        }

        Commands::Batch {
            file,
            concurrency,
            output,
        } => {
            let records = read_records(&file)?;
            let concurrency = concurrency.unwrap_or(config.batch.concurrency);
            tracing::info!(
                "Processing {} records from {} ({} at a time)",
                records.len(),
                file.display(),
                concurrency
            );

            let extractor = Extractor::from_config(&config)?;
            let results = extractor.extract_all(&records, concurrency).await;

            match output {
                Some(path) => {
                    let file = std::fs::File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    write_results(BufWriter::new(file), &results)?;
                }
                None => write_results(std::io::stdout().lock(), &results)?,
            }

            if !cli.quiet {
                print_summary(&BatchSummary::from_results(&results));
            }
        }

        Commands::Doi { url, doi } => {
            let record = Record::new(url, doi, None);
            match resolve_doi(&record) {
                Some(doi) => println!("{}", doi),
                None => bail!("No DOI found"),
            }
        }
    }

    Ok(())
}

fn init_tracing(cli: &Cli) {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = if cli.quiet { "error" } else { log_level };
    let json = cli.log_format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("paper_extract={}", env_filter)),
        ))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .init();
}

fn print_result(result: &ExtractionResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
        OutputFormat::Plain => {
            if result.is_empty() {
                eprintln!("No text found");
            } else {
                println!("{}", result.text);
            }
        }
    }
    Ok(())
}

/// Parse a JSON array of records, or one record per line
fn parse_records(content: &str) -> Result<Vec<Record>> {
    if content.trim_start().starts_with('[') {
        return serde_json::from_str(content).context("Invalid JSON array of records");
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).with_context(|| format!("Invalid record on line {}", i + 1))
        })
        .collect()
}

fn read_records(path: &Path) -> Result<Vec<Record>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_records(&content)
}

fn write_results<W: Write>(mut out: W, results: &[ExtractionResult]) -> Result<()> {
    for result in results {
        serde_json::to_writer(&mut out, result)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

fn print_summary(summary: &BatchSummary) {
    eprintln!("Processed {} records", summary.total);
    for (source, count) in &summary.by_source {
        eprintln!("  {:<18} {}", source.to_string(), count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paper_extract::TextSource;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["paper-extract", "doi", "--doi", "10.1/x"]);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        assert_eq!(cli.output_format, OutputFormat::Plain);
        assert_eq!(cli.log_format, LogFormat::Text);
        assert!(cli.config.is_none());
        assert!(cli.email.is_none());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::parse_from(["paper-extract", "-vv", "doi"]);
        assert_eq!(cli.verbose, 2);

        let cli = Cli::parse_from(["paper-extract", "doi", "--verbose"]);
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_cli_extract_command() {
        let cli = Cli::parse_from([
            "paper-extract",
            "--output-format",
            "json",
            "extract",
            "--url",
            "https://doi.org/10.1000/xyz",
            "--title",
            "A paper",
        ]);
        assert_eq!(cli.output_format, OutputFormat::Json);
        match cli.command {
            Commands::Extract { url, doi, title } => {
                assert_eq!(url.as_deref(), Some("https://doi.org/10.1000/xyz"));
                assert!(doi.is_none());
                assert_eq!(title.as_deref(), Some("A paper"));
            }
            _ => panic!("Expected Extract command"),
        }
    }

    #[test]
    fn test_cli_batch_command() {
        let cli = Cli::parse_from([
            "paper-extract",
            "-q",
            "--log-format",
            "json",
            "batch",
            "records.jsonl",
            "-c",
            "8",
            "-o",
            "out.jsonl",
        ]);
        assert!(cli.quiet);
        assert_eq!(cli.log_format, LogFormat::Json);
        match cli.command {
            Commands::Batch {
                file,
                concurrency,
                output,
            } => {
                assert_eq!(file, PathBuf::from("records.jsonl"));
                assert_eq!(concurrency, Some(8));
                assert_eq!(output, Some(PathBuf::from("out.jsonl")));
            }
            _ => panic!("Expected Batch command"),
        }
    }

    #[test]
    fn test_cli_email_flag() {
        let cli = Cli::parse_from(["paper-extract", "--email", "me@example.org", "doi"]);
        assert_eq!(cli.email.as_deref(), Some("me@example.org"));
    }

    #[test]
    fn test_parse_records_array() {
        let records = parse_records(
            r#"[{"pdfUrl": "https://a.example/p.pdf"}, {"doi": "10.1/x", "title": "T"}]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].target_url.as_deref(), Some("https://a.example/p.pdf"));
        assert_eq!(records[1].doi.as_deref(), Some("10.1/x"));
    }

    #[test]
    fn test_parse_records_lines() {
        let content = "{\"url\": \"https://a.example\"}\n\n{\"paperTitle\": \"T\"}\n";
        let records = parse_records(content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].title.as_deref(), Some("T"));
    }

    #[test]
    fn test_parse_records_reports_line() {
        let err = parse_records("{\"url\": \"a\"}\nnot json\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_write_results_jsonl() {
        let results = vec![
            ExtractionResult::found("Text.".into(), TextSource::Crossref),
            ExtractionResult::empty(),
        ];
        let mut out = Vec::new();
        write_results(&mut out, &results).unwrap();

        let lines: Vec<&str> = std::str::from_utf8(&out).unwrap().lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"crossref\""));
        assert!(lines[1].contains("\"none\""));
    }
}

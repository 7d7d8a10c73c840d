use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use linefold::core::config::LayoutConfig;
use linefold::pipeline::{build_page, run_batch, BatchReport, PipelineConfig, TranscriptSource};
use linefold::reconstruct::GeometricLineEngine;
use linefold::transcript::{TextPolicy, TranscriptFormat};

#[derive(Parser, Debug)]
#[command(name = "linefold")]
#[command(version, about = "Rebuild canonical PAGE-XML text lines from HTR layout output", long_about = None)]
struct Cli {
    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rebuild lines for every layout file, leaving texts empty
    Convert {
        /// Directory holding `page/*.xml` plus images and resource files
        input: PathBuf,

        /// Output directory (default: ./<input_name>_output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Rebuild lines and fill them from a manual transcript
    Apply {
        /// Directory holding `page/*.xml` plus images and resource files
        input: PathBuf,

        /// Transcript file covering every page, in file name order
        #[arg(short, long)]
        transcript: PathBuf,

        /// Output directory (default: ./<input_name>_output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// How pages are delimited in the transcript
        #[arg(long, value_enum, default_value_t = FormatArg::BlankLine)]
        transcript_format: FormatArg,

        /// Keep every line when the transcript has fewer texts
        #[arg(long)]
        pad_missing: bool,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Print the rebuilt lines of a single layout file as JSON
    Inspect {
        input: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,
    },
}

#[derive(Args, Debug)]
struct LayoutArgs {
    /// Built-in parameter set
    #[arg(long, value_enum, default_value_t = Preset::Margins)]
    preset: Preset,

    /// JSON layout config; replaces the preset
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    bucket_size: Option<i64>,

    #[arg(long)]
    min_baseline_length: Option<f64>,

    #[arg(long)]
    min_line_separation: Option<i64>,

    /// Also write per-page JSON into <output>/debug
    #[arg(short, long)]
    debug: bool,

    /// Worker threads (default: one per core)
    #[arg(short, long)]
    jobs: Option<usize>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Preset {
    Margins,
    HeightScaled,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum FormatArg {
    BlankLine,
    Bracketed,
}

impl From<FormatArg> for TranscriptFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::BlankLine => TranscriptFormat::BlankLine,
            FormatArg::Bracketed => TranscriptFormat::Bracketed,
        }
    }
}

impl LayoutArgs {
    fn layout_config(&self) -> Result<LayoutConfig> {
        let mut config = match &self.config {
            Some(path) => LayoutConfig::from_json_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => match self.preset {
                Preset::Margins => LayoutConfig::margins(),
                Preset::HeightScaled => LayoutConfig::height_scaled(),
            },
        };
        if let Some(bucket_size) = self.bucket_size {
            config.bucket_size = bucket_size;
        }
        if let Some(min_length) = self.min_baseline_length {
            config.min_baseline_length = min_length;
        }
        if let Some(separation) = self.min_line_separation {
            config.min_line_separation = separation;
        }
        config.validate()?;
        Ok(config)
    }

    fn pipeline_config(&self, input: PathBuf, output: Option<PathBuf>) -> Result<PipelineConfig> {
        if !input.is_dir() {
            anyhow::bail!("Input is not a directory: {}", input.display());
        }
        let output = output.unwrap_or_else(|| {
            let stem = input
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "linefold".to_string());
            PathBuf::from(format!("{stem}_output"))
        });
        let mut config = PipelineConfig::new(input, output, self.layout_config()?);
        config.debug_json = self.debug;
        config.jobs = self.jobs;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let quiet = cli.quiet;
    match cli.command {
        Commands::Convert {
            input,
            output,
            layout,
        } => {
            let config = layout.pipeline_config(input, output)?;
            finish(run_batch(&config)?, &config, quiet)
        }
        Commands::Apply {
            input,
            transcript,
            output,
            transcript_format,
            pad_missing,
            layout,
        } => {
            let policy = if pad_missing {
                TextPolicy::Pad
            } else {
                TextPolicy::Truncate
            };
            let config = layout
                .pipeline_config(input, output)?
                .with_transcript(TranscriptSource {
                    path: transcript,
                    format: transcript_format.into(),
                    policy,
                });
            finish(run_batch(&config)?, &config, quiet)
        }
        Commands::Inspect { input, layout } => inspect(input, &layout),
    }
}

fn finish(report: BatchReport, config: &PipelineConfig, quiet: bool) -> Result<()> {
    if !quiet {
        println!(
            "[*] {} page(s) written to {}",
            report.written,
            config.page_dir().display()
        );
        for (path, reason) in &report.skipped {
            eprintln!("  [!] Skipped {}: {reason}", path.display());
        }
        for (path, mismatch) in &report.mismatches {
            eprintln!("  [!] {}: {mismatch}", path.display());
        }
        for (path, reason) in &report.asset_failures {
            eprintln!("  [!] Asset not copied {}: {reason}", path.display());
        }
    }
    if report.all_failed() {
        anyhow::bail!("{} file(s) failed to process", report.skipped.len());
    }
    Ok(())
}

fn inspect(input: PathBuf, layout: &LayoutArgs) -> Result<()> {
    let xml = fs::read_to_string(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let engine = GeometricLineEngine::new(layout.layout_config()?);
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (record, _) = build_page(&xml, &stem, &engine, None)
        .with_context(|| format!("failed to rebuild {}", input.display()))?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PipelineConfig {
        PipelineConfig::new(
            PathBuf::from("in"),
            PathBuf::from("out"),
            LayoutConfig::default(),
        )
    }

    #[test]
    fn quiet_finish_still_fails_when_every_page_failed() {
        let report = BatchReport {
            skipped: vec![(PathBuf::from("a.xml"), "broken".to_string())],
            ..BatchReport::default()
        };
        assert!(finish(report, &config(), true).is_err());
    }

    #[test]
    fn quiet_finish_accepts_asset_failures() {
        let report = BatchReport {
            written: 1,
            asset_failures: vec![(PathBuf::from("x.jpg"), "gone".to_string())],
            ..BatchReport::default()
        };
        assert!(finish(report, &config(), true).is_ok());
    }
}

use std::path::PathBuf;

use clap::{command, Args, Parser, Subcommand};
use enoe::{
    config::{
        ConcatConfig, Config, ConsolidateConfig, FilterConfig, InflationConfig, ResidencyConfig,
        UnknownEntityPolicy,
    },
    io::Encoding,
    BatchOutcome, Enoe, Output,
};
use enum_dispatch::enum_dispatch;
use log::{debug, info, warn};

use crate::display::{display_skipped, display_table};
use crate::error::EnoeCliResult;

/// Decimals shown for tables of percentages.
const PERCENT_DECIMALS: usize = 2;
/// Decimals shown for the consolidated report.
const REPORT_DECIMALS: usize = 4;
/// Rows shown for row-level tables.
const PREVIEW_ROWS: usize = 10;

/// Trait that defines what to run when a given subcommand is invoked.
#[enum_dispatch]
pub trait RunCommand {
    fn run(&self, config: Config) -> EnoeCliResult<()>;
}

fn show_output(output: &Output, decimals: usize, quiet: bool) -> EnoeCliResult<()> {
    info!("Wrote {}", output.path.display());
    if !quiet {
        display_table(&output.table, decimals)?;
    }
    Ok(())
}

fn show_outcome(
    outcome: &BatchOutcome,
    decimals: usize,
    max_rows: Option<usize>,
    quiet: bool,
) -> EnoeCliResult<()> {
    match (&outcome.table, &outcome.path) {
        (Some(table), Some(path)) => {
            info!(
                "Wrote {} from {} files ({} skipped)",
                path.display(),
                outcome.processed.len(),
                outcome.skipped.len()
            );
            if !quiet {
                match max_rows {
                    Some(max) => display_table(&table.head(Some(max)), decimals)?,
                    None => display_table(table, decimals)?,
                }
            }
        }
        _ => warn!("Nothing was written"),
    }
    if !quiet {
        display_skipped(&outcome.skipped);
    }
    Ok(())
}

/// The `filter` command keeps only the needed columns of a raw extract.
#[derive(Args, Debug)]
pub struct FilterCommand {
    #[arg(help = "Raw extract, CSV or spreadsheet")]
    input: Option<PathBuf>,
    #[arg(
        short = 'c',
        long = "column",
        help = "Column to keep, repeat for each column in output order"
    )]
    columns: Vec<String>,
    #[arg(long, help = "Suffix replacing the input extension in the output name")]
    suffix: Option<String>,
    #[arg(short = 'e', long, value_name = "utf8|latin1")]
    encoding: Option<Encoding>,
    #[arg(from_global)]
    quiet: bool,
}

impl FilterCommand {
    fn configure(&self, mut config: FilterConfig) -> FilterConfig {
        if let Some(input) = &self.input {
            config.input = input.clone();
        }
        if !self.columns.is_empty() {
            config.columns = self.columns.clone();
        }
        if let Some(suffix) = &self.suffix {
            config.suffix = suffix.clone();
        }
        if let Some(encoding) = self.encoding {
            config.encoding = encoding;
        }
        config
    }
}

impl RunCommand for FilterCommand {
    fn run(&self, mut config: Config) -> EnoeCliResult<()> {
        config.filter = self.configure(config.filter);
        let output = Enoe::new_with_config(config).filter()?;
        info!("Wrote {}", output.path.display());
        if !self.quiet {
            display_table(&output.table.head(Some(PREVIEW_ROWS)), PERCENT_DECIMALS)?;
        }
        Ok(())
    }
}

/// The `concat` command merges the monthly files of a quarter.
#[derive(Args, Debug)]
pub struct ConcatCommand {
    #[arg(help = "Monthly files relative to the base directory, in period order")]
    files: Vec<PathBuf>,
    #[arg(short = 'd', long, help = "Directory holding the monthly files")]
    base_dir: Option<PathBuf>,
    #[arg(short = 'p', long, help = "Period label stamped on every row, e.g. \"2020 T2\"")]
    period_label: Option<String>,
    #[arg(short = 'o', long, help = "Output file, defaults to Trimestre_<label>.csv")]
    output: Option<PathBuf>,
    #[arg(short = 'e', long, value_name = "utf8|latin1")]
    encoding: Option<Encoding>,
    #[arg(from_global)]
    quiet: bool,
}

impl ConcatCommand {
    fn configure(&self, mut config: ConcatConfig) -> ConcatConfig {
        if !self.files.is_empty() {
            config.files = self.files.clone();
        }
        if let Some(base_dir) = &self.base_dir {
            config.base_dir = base_dir.clone();
        }
        if let Some(label) = &self.period_label {
            config.period_label = label.clone();
        }
        if self.output.is_some() {
            config.output = self.output.clone();
        }
        if let Some(encoding) = self.encoding {
            config.encoding = encoding;
        }
        config
    }
}

impl RunCommand for ConcatCommand {
    fn run(&self, mut config: Config) -> EnoeCliResult<()> {
        config.concat = self.configure(config.concat);
        let outcome = Enoe::new_with_config(config).concat()?;
        show_outcome(&outcome, PERCENT_DECIMALS, Some(PREVIEW_ROWS), self.quiet)
    }
}

/// The `residency` command computes the residency percentages per entity.
#[derive(Args, Debug)]
pub struct ResidencyCommand {
    #[arg(help = "Quarterly table produced by `concat`")]
    input: Option<PathBuf>,
    #[arg(short = 'o', long, help = "Output file for the percentage table")]
    output: Option<PathBuf>,
    #[arg(short = 'e', long, value_name = "utf8|latin1")]
    encoding: Option<Encoding>,
    #[arg(
        long,
        value_name = "exclude|group",
        help = "How to treat rows whose entity code has no known name"
    )]
    unknown_entity: Option<UnknownEntityPolicy>,
    #[arg(from_global)]
    quiet: bool,
}

impl ResidencyCommand {
    fn configure(&self, mut config: ResidencyConfig) -> ResidencyConfig {
        if let Some(input) = &self.input {
            config.input = input.clone();
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(encoding) = self.encoding {
            config.encoding = encoding;
        }
        if let Some(policy) = self.unknown_entity {
            config.unknown_entity = policy;
        }
        config
    }
}

impl RunCommand for ResidencyCommand {
    fn run(&self, mut config: Config) -> EnoeCliResult<()> {
        config.residency = self.configure(config.residency);
        match Enoe::new_with_config(config).residency()? {
            Some(output) => show_output(&output, PERCENT_DECIMALS, self.quiet),
            None => {
                warn!("Nothing was written");
                Ok(())
            }
        }
    }
}

/// The `inflation` command computes the period-over-period change of a price index.
#[derive(Args, Debug)]
pub struct InflationCommand {
    #[arg(help = "Monthly price index table")]
    input: Option<PathBuf>,
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
    #[arg(short = 'c', long, help = "Index column to use")]
    index_column: Option<String>,
    #[arg(short = 'p', long, help = "Months per period, 3 for quarterly")]
    period: Option<usize>,
    #[arg(from_global)]
    quiet: bool,
}

impl InflationCommand {
    fn configure(&self, mut config: InflationConfig) -> InflationConfig {
        if let Some(input) = &self.input {
            config.input = input.clone();
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(column) = &self.index_column {
            config.index_column = column.clone();
        }
        if let Some(period) = self.period {
            config.period = period;
        }
        config
    }
}

impl RunCommand for InflationCommand {
    fn run(&self, mut config: Config) -> EnoeCliResult<()> {
        config.inflation = self.configure(config.inflation);
        let output = Enoe::new_with_config(config).inflation()?;
        show_output(&output, REPORT_DECIMALS, self.quiet)
    }
}

/// The `consolidate` command summarises a directory of percentage tables.
#[derive(Args, Debug)]
pub struct ConsolidateCommand {
    #[arg(help = "Directory holding the percentage tables")]
    dir: Option<PathBuf>,
    #[arg(long, help = "Glob pattern of the files to read, e.g. \"*.csv\"")]
    pattern: Option<String>,
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
    #[arg(
        long = "entity",
        help = "Entity reported individually, repeat for each entity"
    )]
    entities: Vec<String>,
    #[arg(from_global)]
    quiet: bool,
}

impl ConsolidateCommand {
    fn configure(&self, mut config: ConsolidateConfig) -> ConsolidateConfig {
        if let Some(dir) = &self.dir {
            config.dir = dir.clone();
        }
        if let Some(pattern) = &self.pattern {
            config.pattern = pattern.clone();
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if !self.entities.is_empty() {
            config.entities = self.entities.clone();
        }
        config
    }
}

impl RunCommand for ConsolidateCommand {
    fn run(&self, mut config: Config) -> EnoeCliResult<()> {
        config.consolidate = self.configure(config.consolidate);
        debug!("consolidate config: {:?}", config.consolidate);
        let outcome = Enoe::new_with_config(config).consolidate()?;
        show_outcome(&outcome, REPORT_DECIMALS, None, self.quiet)
    }
}

/// The entrypoint for the CLI.
#[derive(Parser, Debug)]
#[command(version, about="Prepare ENOE quarterly survey extracts and price indices for analysis", long_about = None, name="enoe")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    #[arg(
        long = "config",
        help = "TOML configuration file, defaults to enoe/config.toml in the user config directory",
        global = true
    )]
    pub config: Option<PathBuf>,
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Do not print result tables. Logs (see `RUST_LOG`) are still printed.",
        global = true
    )]
    quiet: bool,
}

/// Commands contains the list of subcommands available for use in the CLI.
/// Each command implements the RunCommand trait and lists the settings it can override.
#[derive(Subcommand, Debug)]
#[enum_dispatch(RunCommand)]
pub enum Commands {
    /// Keep only the needed columns of a raw monthly extract
    Filter(FilterCommand),
    /// Merge the monthly files of a quarter and adjust the expansion factor
    Concat(ConcatCommand),
    /// Percentage of usual residents, definitive absentees and new residents per entity
    Residency(ResidencyCommand),
    /// Period-over-period change of a price index
    Inflation(InflationCommand),
    /// Summarise a directory of percentage tables into one report
    Consolidate(ConsolidateCommand),
}

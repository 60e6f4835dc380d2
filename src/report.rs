use log::{debug, info, warn};

use election_results::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::report::config_reader::*;
use crate::report::io_common::{simplify_file_name, TableDirectory};
use crate::report::summary::build_summary_js;

pub mod config_reader;
pub mod io_common;
pub mod io_tsv;
pub mod io_xlsx;
pub mod summary;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AppError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("The JSON file {path} does not contain an object"))]
    NotAnObject { path: String },
    #[snafu(display("Error serializing the summary"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Error opening table {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error opening workbook {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Table {path} is empty"))]
    EmptyTable { path: String },
    #[snafu(display("Line {lineno} of {path}: cannot read cell {content}"))]
    ExcelWrongCellType {
        path: String,
        lineno: usize,
        content: String,
    },
    #[snafu(display("Unknown results format {format:?} (expected tsv or xlsx)"))]
    UnknownFormat { format: String },
    #[snafu(display("Missing option: {option}"))]
    MissingOption { option: String },
    #[snafu(display("{source}"))]
    Results { source: ResultsError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type AppResult<T> = Result<T, AppError>;
pub type BAppResult<T> = Result<T, Box<AppError>>;

/// Name of the digest file written next to an output file.
fn digest_path(output_path: &str) -> String {
    format!("{}.sha256", output_path)
}

fn write_output(output_path: Option<&str>, contents: &str) -> BAppResult<()> {
    match output_path {
        None | Some("") | Some("stdout") => {
            println!("{}", contents);
        }
        Some(path) => {
            fs::write(path, contents).context(WritingFileSnafu { path })?;
            // Same layout as the output of sha256sum.
            let digest = sha256::digest(contents.to_string());
            let line = format!("{}  {}\n", digest, simplify_file_name(path));
            let dpath = digest_path(path);
            fs::write(&dpath, line).context(WritingFileSnafu { path: &dpath })?;
            info!("write_output: wrote {:?} (sha256 {})", path, digest);
        }
    }
    Ok(())
}

fn check_reference(reference_path: &str, pretty_js_stats: &str) -> AppResult<()> {
    let summary_ref = read_summary(reference_path)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(SerializingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        whatever!("Difference detected between computed summary and reference summary")
    }
    info!("check_reference: summary matches {:?}", reference_path);
    Ok(())
}

/// The effective configuration: the configuration file if any, with its
/// relative paths resolved, then the command line options.
pub fn effective_config(args: &Args) -> BAppResult<ReportConfig> {
    let config = match args.config.as_ref() {
        Some(config_path) => {
            let base_dir: PathBuf = Path::new(config_path)
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            read_config(config_path)?.resolve(&base_dir)
        }
        None => ReportConfig::default(),
    };
    Ok(config.with_overrides(args))
}

pub fn run(args: &Args) -> BAppResult<()> {
    let config = effective_config(args)?;
    info!("config: {:?}", config);

    if config.input_paths.is_empty() {
        return MissingOptionSnafu { option: "input" }
            .fail()
            .map_err(Box::new);
    }
    let definition = read_definition(&config.input_paths)?;
    let mut election = load_election(&definition).context(ResultsSnafu {})?;

    let results_dir = config.results_dir()?;
    let source = TableDirectory::new(results_dir, config.results_format()?);
    debug!("run: reading results from {:?}", source);
    election
        .load_summary_results(&source)
        .context(ResultsSnafu {})?;

    let result_js = build_summary_js(&election, &config, &source).context(ResultsSnafu {})?;
    let pretty_js_stats =
        serde_json::to_string_pretty(&result_js).context(SerializingJsonSnafu {})?;
    write_output(config.output_path.as_deref(), &pretty_js_stats)?;

    // The reference summary, if provided for comparison
    if let Some(reference_path) = args.reference.as_ref() {
        check_reference(reference_path, &pretty_js_stats)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_written_next_to_the_output() {
        let _ = env_logger::try_init();
        let dir = std::env::temp_dir().join(format!("results-reporter-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let out = dir.join("summary.json").display().to_string();
        write_output(Some(&out), "{}").unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "{}");
        let digest_line = fs::read_to_string(digest_path(&out)).unwrap();
        assert_eq!(
            digest_line,
            format!("{}  summary.json\n", sha256::digest("{}".to_string()))
        );
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_input_is_reported() {
        let args = Args {
            config: None,
            reference: None,
            out: None,
            input: None,
            results_dir: None,
            results_format: None,
            verbose: false,
        };
        let err = run(&args).unwrap_err();
        assert!(matches!(*err, AppError::MissingOption { .. }));
    }
}

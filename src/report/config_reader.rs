use crate::args::Args;
use crate::report::io_common::ResultsFormat;
use crate::report::*;

use serde::{Deserialize, Serialize};
use serde_json::Map as JSMap;

/// Stat holding the continuing ballots of ranked-choice rounds.
pub const DEFAULT_CONTINUING_STAT_ID: &str = "RSCon";

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Election definition files. Their top-level keys are merged, the
    /// later files replacing the earlier ones.
    #[serde(rename = "inputPaths", default)]
    pub input_paths: Vec<String>,
    #[serde(rename = "resultsDirectory")]
    pub results_directory: Option<String>,
    #[serde(rename = "resultsFormat")]
    pub results_format: Option<String>,
    #[serde(rename = "continuingStatId")]
    pub continuing_stat_id: Option<String>,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    /// If set, the summary also lists the selected columns for every
    /// reporting group.
    #[serde(rename = "columnSelector")]
    pub column_selector: Option<String>,
}

fn resolve_path(base_dir: &Path, path: &str) -> String {
    let p: PathBuf = [base_dir, Path::new(path)].iter().collect();
    p.as_path().display().to_string()
}

impl ReportConfig {
    /// Makes the relative paths relative to the given directory.
    pub fn resolve(mut self, base_dir: &Path) -> ReportConfig {
        self.input_paths = self
            .input_paths
            .iter()
            .map(|p| resolve_path(base_dir, p))
            .collect();
        self.results_directory = self
            .results_directory
            .map(|p| resolve_path(base_dir, &p));
        self.output_path = match self.output_path {
            Some(p) if p != "stdout" => Some(resolve_path(base_dir, &p)),
            x => x,
        };
        self
    }

    /// Command line options take precedence over the file.
    pub fn with_overrides(mut self, args: &Args) -> ReportConfig {
        if let Some(input) = args.input.as_ref() {
            self.input_paths = vec![input.clone()];
        }
        if let Some(dir) = args.results_dir.as_ref() {
            self.results_directory = Some(dir.clone());
        }
        if let Some(format) = args.results_format.as_ref() {
            self.results_format = Some(format.clone());
        }
        if let Some(out) = args.out.as_ref() {
            self.output_path = Some(out.clone());
        }
        self
    }

    pub fn continuing_stat_id(&self) -> &str {
        self.continuing_stat_id
            .as_deref()
            .unwrap_or(DEFAULT_CONTINUING_STAT_ID)
    }

    pub fn results_format(&self) -> AppResult<ResultsFormat> {
        match self.results_format.as_deref() {
            None => Ok(ResultsFormat::Tsv),
            Some(format) => ResultsFormat::parse(format),
        }
    }

    /// The results directory, by default the directory of the first
    /// definition file.
    pub fn results_dir(&self) -> AppResult<PathBuf> {
        if let Some(dir) = self.results_directory.as_ref() {
            return Ok(PathBuf::from(dir));
        }
        let first = self
            .input_paths
            .first()
            .context(MissingOptionSnafu { option: "input" })?;
        Ok(Path::new(first)
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_default())
    }
}

fn read_json_object(path: &str) -> AppResult<JSMap<String, JSValue>> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    match js {
        JSValue::Object(obj) => Ok(obj),
        _ => NotAnObjectSnafu { path }.fail(),
    }
}

pub fn read_config(path: &str) -> BAppResult<ReportConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config: ReportConfig =
        serde_json::from_str(&contents).context(ParsingJsonSnafu { path })?;
    Ok(config)
}

/// Reads and merges the definition files.
pub fn read_definition(paths: &[String]) -> BAppResult<JSValue> {
    let mut res: JSMap<String, JSValue> = JSMap::new();
    for path in paths.iter() {
        let obj = read_json_object(path)?;
        debug!(
            "read_definition: {:?}: keys {:?}",
            path,
            obj.keys().collect::<Vec<_>>()
        );
        res.extend(obj);
        info!("read_definition: loaded {:?}", path);
    }
    Ok(JSValue::Object(res))
}

/// A reference summary to compare the output with.
pub fn read_summary(path: &str) -> AppResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })
}

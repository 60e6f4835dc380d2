use clap::Parser;

/// This is an election results reporting program.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The configuration of the report in JSON format.
    /// The other options override the values of this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, results-reporter
    /// checks that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) Where the summary is written in JSON format.
    /// A digest of the summary is written next to it in a '.sha256' file.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) The election definition in JSON format.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (directory) The directory holding the result tables, one file per contest
    /// ('contest_<id>') and one for the turnout ('turnout').
    #[clap(long, value_parser)]
    pub results_dir: Option<String>,

    /// (default tsv) The format of the result tables: 'tsv' or 'xlsx'.
    #[clap(long, value_parser)]
    pub results_format: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}

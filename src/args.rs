use clap::Parser;

/// This is a participatory budgeting tabulation program.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The file containing the election data. The first line carries the voter,
    /// project and group counts; each following line is one ballot. For more information about
    /// the file format, read the documentation.
    #[clap(short, long, value_parser)]
    pub input: String,

    /// (file path) A reference file containing the expected text output of the election. If
    /// provided, pbtally will check that the tabulated output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path or 'stdout') If specified, a summary of the election will be written in JSON
    /// format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}

//! 命令行参数

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(name = "daily_insp")]
#[command(about = "Upload daily inspiration packages to the CMS")]
#[command(version)]
pub struct Cli {
    /// The input zip file or a directory of zip files
    #[arg(short = 'i', long = "infile", short_aliases = ['f', 'z'], alias = "zf")]
    pub infile: PathBuf,

    /// Flag true if an open access link is required
    #[arg(
        short = 'a',
        long,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        default_value = "false"
    )]
    pub access: bool,

    /// Flag true if the article was guest edited
    #[arg(
        short = 'g',
        long,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        default_value = "false"
    )]
    pub guest: bool,

    /// Keep processing the remaining packages after one fails
    #[arg(long)]
    pub keep_going: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to a TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

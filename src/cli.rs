use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tubegrab")]
#[command(author, version, about = "Telegram bot that downloads YouTube videos in the format you pick", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (long polling)
    Run,

    /// List the formats of a URL without starting the bot
    Formats {
        /// Video URL
        url: String,

        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

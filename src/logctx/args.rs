use clap::Parser;
use logctx::model::Level;

#[derive(Parser, Debug)]
#[command(name = "logctx-demo")]
#[command(
    about = "Walk a nested data set and show log context flowing into error messages",
    long_about = None
)]
pub struct Cli {
    /// Minimum level the base handler emits (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub level: Level,

    /// Emit log records as JSON instead of key=value text
    #[arg(long)]
    pub json: bool,
}

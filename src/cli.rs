use clap::Parser;
use std::path::PathBuf;

pub const HELP_KEYS: &str = "\
Key Bindings:
  Esc / Enter   : Quit (flagged files are moved to __delete/)
  Right / Down  : Next image
  Left / Up     : Previous image
  F11           : Toggle fullscreen / windowed
  F12           : Toggle filename overlay
  Delete        : Flag / unflag current file for deletion on exit
";

#[derive(Parser)]
#[command(name = "fsv", about = "A minimalist fullscreen image viewer", after_help = HELP_KEYS)]
pub struct Cli {
    /// Image file to open; its siblings become the browsing list
    pub path: PathBuf,
}

//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::still::ImageFormat;

/// tab-capture - Browser tab recording and screenshot toolkit
#[derive(Parser, Debug)]
#[command(name = "tab-capture")]
#[command(version)]
#[command(about = "Tab recording and screenshot toolkit: settings, still images and runtime state")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage capture settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Scale and re-encode a still image
    Resize(ResizeArgs),
    /// Inspect or reset persisted runtime state
    State {
        #[command(subcommand)]
        action: StateAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create settings file with defaults
    Init,
    /// Set a settings value
    Set {
        /// Settings key
        key: String,
        /// Settings value
        value: String,
    },
    /// Get a settings value
    Get {
        /// Settings key
        key: String,
    },
    /// List all settings values
    List,
    /// Show settings file path
    Path,
}

/// Runtime state subcommands
#[derive(Subcommand, Debug, Clone, Copy)]
pub enum StateAction {
    /// Show the recording flag and saved window geometry
    Show,
    /// Clear a stale recording flag
    Reset {
        /// Also forget the saved window geometry
        #[arg(long)]
        all: bool,
    },
}

/// Arguments for `resize`
#[derive(clap::Args, Debug, Clone)]
pub struct ResizeArgs {
    /// Image to resize
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Scale factor (0.1 to 1.0)
    #[arg(short = 's', long, value_name = "SCALE")]
    pub scale: Option<f64>,

    /// Output format
    #[arg(short = 'f', long, value_name = "FORMAT")]
    pub format: Option<FormatArg>,

    /// Quality for lossy formats (1-100)
    #[arg(short = 'q', long, value_name = "QUALITY", value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// Output file (defaults to <INPUT stem>-resized.<ext>)
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Image format argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Png,
    #[value(alias = "jpg")]
    Jpeg,
    Webp,
}

impl From<FormatArg> for ImageFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Png => ImageFormat::Png,
            FormatArg::Jpeg => ImageFormat::Jpeg,
            FormatArg::Webp => ImageFormat::Webp,
        }
    }
}

/// Valid settings keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "tab_audio",
    "mic_audio",
    "countdown_seconds",
    "frame_rate",
    "video_bitrate_kbps",
    "resolution_scale",
    "capture_format",
    "capture_quality",
    "capture_scale",
    "default_window_size",
];

/// Check if a settings key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_requires_a_subcommand() {
        assert!(Cli::try_parse_from(["tab-capture"]).is_err());
    }

    #[test]
    fn cli_parses_config_init() {
        let cli = Cli::parse_from(["tab-capture", "config", "init"]);
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Init
            }
        ));
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["tab-capture", "config", "set", "frame_rate", "60"]);
        if let Commands::Config {
            action: ConfigAction::Set { key, value },
        } = cli.command
        {
            assert_eq!(key, "frame_rate");
            assert_eq!(value, "60");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn cli_parses_resize() {
        let cli = Cli::parse_from([
            "tab-capture", "resize", "shot.png", "-s", "0.5", "-f", "jpg", "-q", "80", "-o",
            "out.jpeg",
        ]);
        let Commands::Resize(args) = cli.command else {
            panic!("Expected Resize command");
        };
        assert_eq!(args.input, PathBuf::from("shot.png"));
        assert_eq!(args.scale, Some(0.5));
        assert_eq!(args.format, Some(FormatArg::Jpeg));
        assert_eq!(args.quality, Some(80));
        assert_eq!(args.output, Some(PathBuf::from("out.jpeg")));
    }

    #[test]
    fn cli_rejects_quality_out_of_range() {
        assert!(Cli::try_parse_from(["tab-capture", "resize", "a.png", "-q", "0"]).is_err());
        assert!(Cli::try_parse_from(["tab-capture", "resize", "a.png", "-q", "101"]).is_err());
    }

    #[test]
    fn cli_parses_state_reset() {
        let cli = Cli::parse_from(["tab-capture", "state", "reset", "--all"]);
        assert!(matches!(
            cli.command,
            Commands::State {
                action: StateAction::Reset { all: true }
            }
        ));
    }

    #[test]
    fn format_arg_converts() {
        assert_eq!(ImageFormat::from(FormatArg::Webp), ImageFormat::Webp);
        assert_eq!(ImageFormat::from(FormatArg::Jpeg), ImageFormat::Jpeg);
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("capture_format"));
        assert!(is_valid_config_key("default_window_size"));
        assert!(!is_valid_config_key("api_key"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}

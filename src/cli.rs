//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Teach a camera to recognise objects with five buttons.
#[derive(Debug, Clone, Parser)]
#[command(name = "teachable-machine", version, about)]
pub struct Cli {
    /// File path of the ONNX embedding model.
    #[arg(long, value_name = "PATH")]
    pub model: Option<PathBuf>,

    /// Run a test of the buttons and LEDs.  Ctrl-C to abort.
    #[arg(long)]
    pub testui: bool,

    /// Settings file to use instead of the platform default.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write the effective settings (file, defaults and `--model`) back to
    /// the settings file and exit.
    #[arg(long)]
    pub save_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_is_valid() {
        let cli = Cli::try_parse_from(["teachable-machine"]).unwrap();
        assert!(cli.model.is_none());
        assert!(!cli.testui);
        assert!(cli.config.is_none());
        assert!(!cli.save_config);
    }

    #[test]
    fn all_arguments_parse() {
        let cli = Cli::try_parse_from([
            "teachable-machine",
            "--model",
            "models/mobilenet.onnx",
            "--testui",
            "--config",
            "/tmp/settings.toml",
        ])
        .unwrap();
        assert_eq!(cli.model, Some(PathBuf::from("models/mobilenet.onnx")));
        assert!(cli.testui);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/settings.toml")));
    }

    #[test]
    fn save_config_takes_no_value() {
        let cli = Cli::try_parse_from(["teachable-machine", "--save-config", "--model", "m.onnx"])
            .unwrap();
        assert!(cli.save_config);
        assert_eq!(cli.model, Some(PathBuf::from("m.onnx")));
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["teachable-machine", "--kNN", "5"]).is_err());
    }

    #[test]
    fn definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Generate an AWS Lambda C++ inference handler from YAML settings.
#[derive(Debug, Parser)]
#[command(name = "torchgen", version, long_about = None)]
pub struct Cli {
    /// Settings file (YAML or JSON).
    pub config: PathBuf,

    /// Directory `main.cpp` is written into; created if missing.
    pub destination: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positional_paths() {
        let cli = Cli::try_parse_from(["torchgen", "settings.yaml", "build/src"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("settings.yaml"));
        assert_eq!(cli.destination, PathBuf::from("build/src"));
    }

    #[test]
    fn test_missing_destination_is_a_usage_error() {
        let err = Cli::try_parse_from(["torchgen", "settings.yaml"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_extra_argument_is_a_usage_error() {
        let err = Cli::try_parse_from(["torchgen", "a.yaml", "out", "more"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        assert_eq!(err.exit_code(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_paths_are_accepted() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let config = OsString::from_vec(b"\xff.yaml".to_vec());
        let args = [OsString::from("torchgen"), config.clone(), OsString::from("out")];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config.as_os_str(), config.as_os_str());
    }
}

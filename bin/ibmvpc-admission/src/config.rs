//! Command line and environment settings

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ibmvpc-admission")]
#[command(about = "Print and validate IBMVPCCluster resources")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Print the IBMVPCCluster CustomResourceDefinition
    Crd,

    /// Decode and validate IBMVPCCluster manifests of any version
    Validate {
        /// Manifest files, each holding one or more YAML documents
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// Output format for printed CRDs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args, Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    #[arg(
        long,
        global = true,
        env = "IBMVPC_OUTPUT_FORMAT",
        value_enum,
        default_value_t
    )]
    pub output_format: OutputFormat,

    /// Also validate the status block of manifests
    #[arg(long, global = true, env = "IBMVPC_STRICT_STATUS")]
    pub strict_status: bool,

    /// File listing known cloud resources; when set, network references
    /// are resolved against it
    #[arg(long, global = true, env = "IBMVPC_INVENTORY")]
    pub inventory: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = "IBMVPC_LOG_FORMAT",
        value_enum,
        default_value_t
    )]
    pub log_format: LogFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("ibmvpc-admission").chain(args.iter().copied()))
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn crd_with_defaults() {
        let cli = parse(&["crd"]).unwrap();
        assert_eq!(cli.command, Command::Crd);
        assert_eq!(cli.config, Config::default());
    }

    #[test]
    fn validate_takes_files_and_global_flags() {
        let cli = parse(&[
            "validate",
            "cluster.yaml",
            "legacy.yaml",
            "--strict-status",
            "--inventory",
            "/etc/ibmvpc/inventory.yaml",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::Validate {
                files: vec![PathBuf::from("cluster.yaml"), PathBuf::from("legacy.yaml")],
            }
        );
        assert!(cli.config.strict_status);
        assert_eq!(cli.config.log_format, LogFormat::Json);
        assert_eq!(
            cli.config.inventory,
            Some(PathBuf::from("/etc/ibmvpc/inventory.yaml"))
        );

        let cli = parse(&["--output-format", "json", "crd"]).unwrap();
        assert_eq!(cli.config.output_format, OutputFormat::Json);
    }

    #[test]
    fn validate_needs_a_file() {
        let err = parse(&["validate"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn rejects_unknown_values_and_commands() {
        assert_eq!(
            parse(&["--output-format", "toml", "crd"]).unwrap_err().kind(),
            ErrorKind::InvalidValue
        );
        assert_eq!(
            parse(&["--log-format", "logfmt", "crd"]).unwrap_err().kind(),
            ErrorKind::InvalidValue
        );
        assert_eq!(
            parse(&["apply"]).unwrap_err().kind(),
            ErrorKind::InvalidSubcommand
        );
    }

    #[test]
    fn help_and_version_are_generated() {
        assert_eq!(parse(&["--help"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
        assert_eq!(
            parse(&["--version"]).unwrap_err().kind(),
            ErrorKind::DisplayVersion
        );
    }
}

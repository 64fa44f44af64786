//! resgen command-line interface.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use resgen::RunConfig;
use resgen::codegen::{Category, Filenames};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "resgen", version)]
#[command(about = "Generate Go method sets for resource-shaped declarations")]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate method sets for every recognized declaration
    #[command(name = "generate-methodsets", alias = "gen-methodsets")]
    GenerateMethodsets(GenerateArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Declaration document describing the packages
    #[arg(long)]
    input: PathBuf,

    /// Package(s) to generate methods for, for example example.com/apis/...
    #[arg(long, default_value = "./...")]
    paths: String,

    /// The contents of this file are added to the top of all generated files
    #[arg(long)]
    header_file: Option<PathBuf>,

    /// Filename of generated managed resource files
    #[arg(long, default_value = Category::Managed.default_filename())]
    filename_managed: String,

    /// Filename of generated managed resource list files
    #[arg(long, default_value = Category::ManagedList.default_filename())]
    filename_managed_list: String,

    /// Filename of generated target config files
    #[arg(long, default_value = Category::TargetConfig.default_filename())]
    filename_tc: String,

    /// Filename of generated target config usage files
    #[arg(long, default_value = Category::TargetConfigUsage.default_filename())]
    filename_tcu: String,

    /// Filename of generated target config usage list files
    #[arg(long, default_value = Category::TargetConfigUsageList.default_filename())]
    filename_tcu_list: String,

    /// Fail when a declaration matches more than one category
    #[arg(long)]
    strict: bool,

    /// Directory package directories are resolved against
    #[arg(long)]
    output_root: Option<PathBuf>,
}

impl From<GenerateArgs> for RunConfig {
    fn from(args: GenerateArgs) -> Self {
        Self {
            input: args.input,
            pattern: args.paths,
            header_file: args.header_file,
            filenames: Filenames {
                managed: args.filename_managed,
                managed_list: args.filename_managed_list,
                target_config: args.filename_tc,
                target_config_usage: args.filename_tcu,
                target_config_usage_list: args.filename_tcu_list,
            },
            strict: args.strict,
            output_root: args.output_root,
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::GenerateMethodsets(args) => {
            let report = resgen::run(&RunConfig::from(args))?;
            for path in &report.written {
                tracing::debug!("generated {}", path.display());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["resgen", "generate-methodsets", "--input", "decls.xml"]).unwrap();
        assert!(!cli.verbose);
        let Command::GenerateMethodsets(args) = cli.command;
        let config = RunConfig::from(args);
        assert_eq!(config, RunConfig::new("decls.xml", "./..."));
    }

    #[test]
    fn test_cli_alias_and_flags() {
        let cli = Cli::try_parse_from([
            "resgen",
            "gen-methodsets",
            "--input",
            "decls.xml",
            "--paths",
            "example.com/apis/...",
            "--header-file",
            "hack/boilerplate.go.txt",
            "--filename-tc",
            "tc.go",
            "--strict",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);

        let Command::GenerateMethodsets(args) = cli.command;
        let config = RunConfig::from(args);
        assert_eq!(config.pattern, "example.com/apis/...");
        assert_eq!(config.header_file, Some(PathBuf::from("hack/boilerplate.go.txt")));
        assert_eq!(config.filenames.target_config, "tc.go");
        assert_eq!(config.filenames.managed, "zz_generated.managed.go");
        assert!(config.strict);
    }

    #[test]
    fn test_cli_requires_input() {
        assert!(Cli::try_parse_from(["resgen", "generate-methodsets"]).is_err());
    }
}

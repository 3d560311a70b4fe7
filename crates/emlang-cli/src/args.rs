//! Command-line argument definitions for the Emlang CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Global arguments select the configuration file and the
//! logging verbosity; each subcommand names its input, where `-` reads
//! standard input.

use clap::{Parser, Subcommand};

use emlang::format::KeyStyle;

/// Command-line arguments for the Emlang event modeling tool
#[derive(Parser, Debug)]
#[command(name = "emlang", author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of the Emlang CLI.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a model and print its structure
    Parse {
        /// Input file, or `-` for standard input
        input: String,
    },

    /// Report modeling issues
    Lint {
        /// Input file, or `-` for standard input
        input: String,
    },

    /// Rewrite a model in canonical form
    Fmt {
        /// Write the result back to the input file instead of stdout
        #[arg(short, long)]
        write: bool,

        /// Element key style (short or long)
        #[arg(long)]
        keys: Option<KeyStyle>,

        /// Input file, or `-` for standard input
        input: String,
    },

    /// Render a model as an HTML diagram
    Diagram {
        /// Output HTML file (defaults to stdout)
        #[arg(short, long, conflicts_with = "serve")]
        output: Option<String>,

        /// Serve the diagram over HTTP and reload it when the input changes
        #[arg(long)]
        serve: bool,

        /// Listen address of the live-reload server
        #[arg(long, requires = "serve")]
        address: Option<String>,

        /// Port of the live-reload server
        #[arg(long, requires = "serve")]
        port: Option<u16>,

        /// Input file, or `-` for standard input
        input: String,
    },

    /// Start an interactive editor with a live diagram preview
    Repl {
        /// Listen address of the REPL server
        #[arg(long)]
        address: Option<String>,

        /// Port of the REPL server
        #[arg(long)]
        port: Option<u16>,

        /// Model loaded into the editor at startup
        input: Option<String>,
    },

    /// Create a default configuration file
    Init {
        /// Path of the configuration file to create
        #[arg(default_value = ".emlang.toml")]
        path: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "emlang",
            "lint",
            "model.yaml",
            "--config",
            "custom.toml",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(args.config.as_deref(), Some("custom.toml"));
        assert_eq!(args.log_level, "debug");
        assert!(matches!(args.command, Command::Lint { ref input } if input == "model.yaml"));
    }

    #[test]
    fn test_fmt_flags() {
        let args = Args::try_parse_from(["emlang", "fmt", "-w", "--keys", "short", "model.yaml"])
            .unwrap();

        match args.command {
            Command::Fmt { write, keys, input } => {
                assert!(write);
                assert_eq!(keys, Some(KeyStyle::Short));
                assert_eq!(input, "model.yaml");
            }
            other => panic!("Expected fmt, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_key_style_rejected() {
        let result = Args::try_parse_from(["emlang", "fmt", "--keys", "medium", "model.yaml"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_diagram_serve_flags() {
        let args =
            Args::try_parse_from(["emlang", "diagram", "--serve", "--port", "9000", "model.yaml"])
                .unwrap();

        match args.command {
            Command::Diagram {
                output,
                serve,
                address,
                port,
                input,
            } => {
                assert_eq!(output, None);
                assert!(serve);
                assert_eq!(address, None);
                assert_eq!(port, Some(9000));
                assert_eq!(input, "model.yaml");
            }
            other => panic!("Expected diagram, got {other:?}"),
        }
    }

    #[test]
    fn test_serve_conflicts_with_output() {
        let result =
            Args::try_parse_from(["emlang", "diagram", "--serve", "-o", "out.html", "model.yaml"]);
        assert!(result.is_err());

        let result = Args::try_parse_from(["emlang", "diagram", "--port", "9000", "model.yaml"]);
        assert!(result.is_err(), "--port requires --serve");
    }

    #[test]
    fn test_repl_input_is_optional() {
        let args = Args::try_parse_from(["emlang", "repl", "--address", "0.0.0.0"]).unwrap();

        assert!(matches!(
            args.command,
            Command::Repl { ref address, port: None, input: None }
                if address.as_deref() == Some("0.0.0.0")
        ));
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["emlang", "init"]).unwrap();

        assert_eq!(args.config, None);
        assert_eq!(args.log_level, "warn");
        assert!(matches!(args.command, Command::Init { ref path } if path == ".emlang.toml"));
    }
}

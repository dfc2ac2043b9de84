//! Binary entry point for the archgraph CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Summarize a source tree
//! archgraph analyze path/to/project
//!
//! # Dump the resolved structural model
//! archgraph model path/to/project -e 'tests/**'
//!
//! # Build a graph
//! archgraph graph path/to/project --kind call-graph --focus-module app.services
//!
//! # List graph kinds
//! archgraph kinds
//! ```
//!
//! Every command prints one JSON document on stdout. Logs go to stderr.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use archgraph::cli::{require_root, run_analysis, run_analyze, run_graph, AnalysisRequest, GraphFlags};
use archgraph_core::cancel::CancellationToken;
use archgraph_core::error::ArchError;
use archgraph_core::graph::GraphKind;
use archgraph_core::output::{emit_response, ErrorResponse, KindsResponse, ModelResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Structural graphs of Python source trees.
///
/// Walks a directory, extracts classes, functions, imports and calls from
/// every Python file, resolves references across modules and derives class
/// hierarchy, dependency, call and package graphs. All output is JSON.
#[derive(Parser, Debug)]
#[command(name = "archgraph", version, about = "Structural graphs of Python source trees")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output. `RUST_LOG` takes precedence.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Log line format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    /// Config file (default: archgraph.json in the analyzed root).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Graph kind argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum KindArg {
    ClassHierarchy,
    Dependency,
    CallGraph,
    PackageTree,
}

impl From<KindArg> for GraphKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::ClassHierarchy => GraphKind::ClassHierarchy,
            KindArg::Dependency => GraphKind::Dependency,
            KindArg::CallGraph => GraphKind::CallGraph,
            KindArg::PackageTree => GraphKind::PackageTree,
        }
    }
}

/// Root directory and excludes shared by the analysis commands.
#[derive(clap::Args, Debug)]
struct SourceArgs {
    /// Root directory of the source tree.
    root: PathBuf,

    /// Extra exclude glob (repeatable).
    #[arg(short = 'e', long = "exclude")]
    exclude: Vec<String>,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a source tree and print a summary.
    Analyze {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print the full resolved structural model.
    Model {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Build one graph from a source tree.
    Graph {
        #[command(flatten)]
        source: SourceArgs,
        /// Which graph to build.
        #[arg(long, value_enum)]
        kind: KindArg,
        #[command(flatten)]
        flags: GraphFlags,
    },
    /// List the available graph kinds.
    Kinds,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level, cli.global.log_format);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = %err, "command failed");
            let response = ErrorResponse::from_error(&err);
            // Errors go to stdout as JSON, like every other response
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();
            ExitCode::from(err.exit_code())
        }
    }
}

/// Initialize tracing subscriber on stderr.
fn init_tracing(level: LogLevel, format: LogFormat) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn source_request(global: &GlobalArgs, source: SourceArgs) -> Result<AnalysisRequest, ArchError> {
    require_root(&source.root)?;
    Ok(AnalysisRequest {
        root: source.root,
        config: global.config.clone(),
        exclude: source.exclude,
    })
}

fn execute(cli: Cli) -> Result<(), ArchError> {
    let cancel = CancellationToken::new();
    let mut stdout = io::stdout();
    match cli.command {
        Command::Analyze { source } => {
            let response = run_analyze(&source_request(&cli.global, source)?, &cancel)?;
            emit(&response, &mut stdout)
        }
        Command::Model { source } => {
            let request = source_request(&cli.global, source)?;
            let analysis = run_analysis(&request, &cancel)?;
            let response = ModelResponse::new(
                request.root.display().to_string(),
                &analysis.model,
                analysis.warnings,
            );
            emit(&response, &mut stdout)
        }
        Command::Graph {
            source,
            kind,
            flags,
        } => {
            let request = source_request(&cli.global, source)?;
            let response = run_graph(&request, kind.into(), &flags, &cancel)?;
            emit(&response, &mut stdout)
        }
        Command::Kinds => emit(&KindsResponse::new(), &mut stdout),
    }
}

fn emit<T: serde::Serialize>(response: &T, out: &mut impl Write) -> Result<(), ArchError> {
    emit_response(response, out).map_err(|e| ArchError::internal(e.to_string()))?;
    let _ = out.flush();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod cli_parsing {
        use super::*;

        #[test]
        fn graph_with_flags() {
            let args = [
                "archgraph",
                "graph",
                "src",
                "--kind",
                "call-graph",
                "--focus-module",
                "app.services",
                "--max-depth",
                "2",
                "--no-methods",
            ];
            let cli = Cli::try_parse_from(args).unwrap();
            match cli.command {
                Command::Graph {
                    source,
                    kind,
                    flags,
                } => {
                    assert_eq!(source.root, PathBuf::from("src"));
                    assert_eq!(kind, KindArg::CallGraph);
                    assert_eq!(flags.focus_module.as_deref(), Some("app.services"));
                    assert_eq!(flags.max_depth, Some(2));
                    assert!(flags.no_methods);
                    assert!(!flags.include_private);
                }
                _ => panic!("expected Graph"),
            }
        }

        #[test]
        fn negative_depth_reaches_validation() {
            let args = [
                "archgraph", "graph", "src", "--kind", "dependency", "--max-depth", "-1",
            ];
            let cli = Cli::try_parse_from(args).unwrap();
            match cli.command {
                Command::Graph { flags, .. } => assert_eq!(flags.max_depth, Some(-1)),
                _ => panic!("expected Graph"),
            }
        }

        #[test]
        fn repeated_excludes_and_globals() {
            let args = [
                "archgraph",
                "analyze",
                "proj",
                "-e",
                "tests/**",
                "--exclude",
                "docs",
                "--log-level",
                "debug",
                "--log-format",
                "json",
                "--config",
                "cfg.json",
            ];
            let cli = Cli::try_parse_from(args).unwrap();
            assert!(matches!(cli.global.log_level, LogLevel::Debug));
            assert_eq!(cli.global.log_format, LogFormat::Json);
            assert_eq!(cli.global.config, Some(PathBuf::from("cfg.json")));
            match cli.command {
                Command::Analyze { source } => {
                    assert_eq!(source.exclude, vec!["tests/**", "docs"]);
                }
                _ => panic!("expected Analyze"),
            }
        }

        #[test]
        fn graph_requires_kind() {
            assert!(Cli::try_parse_from(["archgraph", "graph", "src"]).is_err());
            assert!(Cli::try_parse_from(["archgraph", "graph", "src", "--kind", "uml"]).is_err());
        }

        #[test]
        fn kind_names_match_core() {
            for kind in GraphKind::ALL {
                let arg = KindArg::from_str(kind.as_str(), false).unwrap();
                assert_eq!(GraphKind::from(arg), kind);
            }
        }
    }
}

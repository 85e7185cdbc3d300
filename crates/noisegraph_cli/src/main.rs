// SPDX-License-Identifier: MIT OR Apache-2.0
//! `noisegraph` - compile persisted noise graphs to HLSL.
//!
//! Loads a graph saved as RON or binary, compiles it with an optional RON
//! compiler configuration and writes the source unit and its parameter
//! manifest.

use clap::{Parser, Subcommand};
use noisegraph::{
    CompileError, CompilerConfig, ConfigError, Dimensions, Graph, MathOp, NodeKind, NoiseKind,
    NoiseNode, PersistError, ShaderCompiler,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "noisegraph")]
#[command(version)]
#[command(about = "Compile procedural noise graphs to HLSL", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a graph into a source unit
    Compile {
        /// Graph file (.ron or binary)
        graph: PathBuf,
        /// Compiler configuration (.ron)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output source file; printed to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also write the parameter manifest as JSON
        #[arg(long)]
        manifest: Option<PathBuf>,
    },

    /// Print the parameter manifest of a graph
    Params {
        /// Graph file (.ron or binary)
        graph: PathBuf,
        /// Compiler configuration (.ron)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Convert a graph between RON and binary, chosen by extension
    Convert {
        /// Input graph file
        input: PathBuf,
        /// Output graph file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write a demo graph (white noise raised to a power)
    Demo {
        /// Output graph file
        #[arg(short, long, default_value = "demo.ron")]
        output: PathBuf,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Compilation failed: {0}")]
    Compile(#[from] CompileError),

    #[error("Manifest serialization failed: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid demo graph: {0}")]
    Demo(#[from] noisegraph::GraphError),
}

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("noisegraph=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Compile {
            graph,
            config,
            output,
            manifest,
        } => {
            let graph = Graph::load(&graph)?;
            let unit = compiler(config.as_deref())?.compile(&graph)?;
            match output {
                Some(path) => write_file(&path, &unit.text)?,
                None => print!("{}", unit.text),
            }
            if let Some(path) = manifest {
                write_file(&path, &unit.manifest_json()?)?;
            }
        }
        Commands::Params { graph, config } => {
            let graph = Graph::load(&graph)?;
            let unit = compiler(config.as_deref())?.compile(&graph)?;
            println!("{}", unit.manifest_json()?);
        }
        Commands::Convert { input, output } => {
            Graph::load(&input)?.save(&output)?;
        }
        Commands::Demo { output } => {
            demo_graph()?.save(&output)?;
        }
    }
    Ok(())
}

fn compiler(config: Option<&Path>) -> Result<ShaderCompiler, CliError> {
    let config = match config {
        Some(path) => CompilerConfig::load(path)?,
        None => CompilerConfig::default(),
    };
    Ok(ShaderCompiler::new(config))
}

fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    std::fs::write(path, contents).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

fn demo_graph() -> Result<Graph, CliError> {
    let mut graph = Graph::new("demo");
    let noise = graph.add_node(NodeKind::Noise(NoiseNode::new(NoiseKind::White, Dimensions::One)))?;
    graph.set_input_by_name(noise, "X", 234.1241f32)?;
    let power = graph.add_node(NodeKind::Math(MathOp::Power))?;
    graph.set_input_by_name(power, "Base", noise)?;
    graph.set_input_by_name(power, "Exponent", 3.0f32)?;
    graph.set_output(power);
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_graph_compiles() {
        let compiled = demo_graph().unwrap().compile().unwrap();
        assert_eq!(compiled.statements.len(), 2);
        assert_eq!(compiled.output, "float result = Power_1;");
    }

    #[test]
    fn test_cli_parses_compile() {
        let cli = Cli::parse_from(["noisegraph", "compile", "g.ron", "-o", "out.hlsl", "--manifest", "p.json"]);
        match cli.command {
            Commands::Compile {
                graph,
                config,
                output,
                manifest,
            } => {
                assert_eq!(graph, PathBuf::from("g.ron"));
                assert!(config.is_none());
                assert_eq!(output, Some(PathBuf::from("out.hlsl")));
                assert_eq!(manifest, Some(PathBuf::from("p.json")));
            }
            _ => panic!("expected compile"),
        }
    }

    #[test]
    fn test_convert_round_trip() {
        let dir = std::env::temp_dir();
        let ron = dir.join(format!("noisegraph-cli-{}.ron", std::process::id()));
        let bin = dir.join(format!("noisegraph-cli-{}.ngraph", std::process::id()));
        run(Commands::Demo { output: ron.clone() }).unwrap();
        run(Commands::Convert {
            input: ron.clone(),
            output: bin.clone(),
        })
        .unwrap();
        let loaded = Graph::load(&bin).unwrap();
        std::fs::remove_file(&ron).unwrap();
        std::fs::remove_file(&bin).unwrap();
        assert_eq!(loaded, demo_graph().unwrap());
    }
}

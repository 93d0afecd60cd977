mod terminal;

use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;

use meshprobe_core::pipeline::Pipeline;
use meshprobe_core::registry::{Registry, RegistryConfig};

#[derive(Parser)]
#[command(name = "meshprobe")]
#[command(
    about = "Discovers network nodes, runs connectivity probes between them and reports the results."
)]
struct CommandLine {
    /// Path to the declarative spec file.
    spec_file: PathBuf,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Extension directory holding plugin manifests, one subdirectory per
    /// capability kind. Defaults to the built-in implementations.
    #[arg(short, long)]
    extensions: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CommandLine::parse();

    terminal::logging::init(args.verbose);

    if !args.spec_file.is_file() {
        bail!("spec file '{}' not found", args.spec_file.display());
    }

    let registry = Registry::with_config(RegistryConfig {
        extension_dir: args.extensions,
    });

    let pipeline = Pipeline::load(&args.spec_file, registry)?;
    pipeline.run().await?;

    Ok(())
}

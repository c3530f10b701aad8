use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sdix::cache::{self, AlphabetWidth, CacheConfig};
use sdix::construct::{self, Artifact, ArtifactState, InputFormat, LcpAlgorithm};
use sdix::int_vector::IntVector;
use sdix::output;
use sdix::storage::{Storage, RAM_PREFIX};
use sdix::utils::{logger, BuildConfig, ProgressSink};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "sdix")]
#[command(about = "Build and inspect suffix arrays, BWTs and LCP arrays")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable coloured output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an artifact and its prerequisites into a cache directory
    Build {
        /// Input text
        file: String,

        /// Artifact to build: text, sa, isa, bwt or lcp
        #[arg(short, long, default_value_t = Artifact::Lcp)]
        artifact: Artifact,

        /// LCP algorithm: kasai, phi, semi-phi, bwt, go or go-phi
        #[arg(long)]
        lcp: Option<LcpAlgorithm>,

        /// Input format: bytes, int, u16, u32, u64 or decimal
        #[arg(short, long, default_value_t = InputFormat::Bytes)]
        format: InputFormat,

        /// Treat the text as integers instead of bytes
        #[arg(long)]
        int: bool,

        /// Cache directory
        #[arg(short, long, conflicts_with = "ram")]
        dir: Option<PathBuf>,

        /// Keep artifacts in RAM files (discarded on exit)
        #[arg(long)]
        ram: bool,

        /// Run identifier (a fresh one is generated if omitted)
        #[arg(long)]
        id: Option<String>,

        /// Delete every cached file after a successful build
        #[arg(long)]
        delete: bool,
    },
    /// Print a cached integer vector
    Show {
        file: String,

        /// Maximum elements to print
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
    /// Delete every file of a run recorded in its manifest
    Clean {
        #[arg(short, long)]
        dir: PathBuf,

        #[arg(long)]
        id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let color = !cli.no_color;
    logger::init(cli.verbose, color).context("Failed to install logger")?;
    let build_config = BuildConfig::load()?;

    match cli.command {
        Commands::Build {
            file,
            artifact,
            lcp,
            format,
            int,
            dir,
            ram,
            id,
            delete,
        } => {
            let alphabet = if int {
                AlphabetWidth::Integer
            } else {
                AlphabetWidth::Byte
            };
            let dir = if ram {
                RAM_PREFIX.to_string()
            } else {
                let dir = dir.unwrap_or_else(|| build_config.cache_dir.clone());
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create cache directory {}", dir.display()))?;
                dir.to_string_lossy().into_owned()
            };
            let delete = delete || build_config.delete_files;
            let algorithm = lcp.unwrap_or(build_config.lcp_algorithm);

            let sink = Arc::new(ProgressSink::new());
            let mut config = CacheConfig::new(delete, dir, id.unwrap_or_default())
                .with_sink(sink.clone());
            config.buffer_size = build_config.buffer_size;

            let result = construct::construct_artifact(
                &file, &mut config, format, alphabet, artifact, algorithm,
            );
            sink.finish();
            let before = result.with_context(|| format!("Failed to build {} for `{}`", artifact, file))?;

            if before == ArtifactState::Cached {
                println!("{} already cached for run {}", artifact, config.id);
            } else {
                println!("Built {} for run {}", artifact, config.id);
            }
            output::print_registry(&config, color)?;

            if config.delete_files {
                cache::delete_all_files(&mut config).context("Failed to delete cache files")?;
                println!("Deleted cache files");
            } else if !config.is_ram() {
                let manifest = config.save_manifest().context("Failed to save manifest")?;
                println!("Manifest: {}", manifest);
            }
        }
        Commands::Show { file, limit } => {
            let storage = Storage::new();
            let v = IntVector::load_from_file(&storage, &file)
                .with_context(|| format!("Failed to load `{}`", file))?;
            output::print_vector(&file, &v, limit, color)?;
        }
        Commands::Clean { dir, id } => {
            let storage = Storage::new();
            let dir = dir.to_string_lossy().into_owned();
            let mut config = CacheConfig::open_manifest(&storage, &dir, &id)
                .with_context(|| format!("No manifest for run {} in {}", id, dir))?;
            let count = config.file_map.len();
            cache::delete_all_files(&mut config)?;
            storage.remove(&config.manifest_file())?;
            println!("Removed {} files of run {}", count, id);
        }
    }

    Ok(())
}

//! RAX Storage - Entry Point
//!
//! Command-line access to a configured storage backend.

use clap::{Parser, Subcommand};
use log::info;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use rax_storage::error::AppError;
use rax_storage::error::handlers::{error_to_exit_code, report_error};
use rax_storage::storage::transfer::copy_chunked;
use rax_storage::{BackendRegistry, FileSystemStorage, NamedContent, OpenMode, StorageConfig};

#[derive(Debug, Parser)]
#[command(name = "rax-storage", version, about = "Manage files in a storage root")]
struct Cli {
    /// Config file (defaults to ./storage.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List directories and files
    Ls {
        #[arg(default_value = "")]
        dir: String,
    },
    /// Copy a local file into storage
    Put { name: String, file: PathBuf },
    /// Move a local file into storage
    Import { name: String, file: PathBuf },
    /// Write stored content to stdout
    Cat { name: String },
    /// Delete stored content
    Rm { name: String },
    /// Show size and timestamps
    Stat { name: String },
    /// Print the public URI
    Url { name: String },
    /// Print the absolute path
    Path { name: String },
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = match &cli.config {
        Some(path) => StorageConfig::load_from(path)?,
        None => StorageConfig::load()?,
    };

    let registry = BackendRegistry::with_defaults();
    let factory = registry.resolve(&config.backend)?;
    let storage = factory.build(&config)?;
    info!("Using {} backend", factory.name());

    match cli.command {
        Command::Ls { dir } => {
            let listing = storage.listdir(&dir)?;
            for d in &listing.directories {
                println!("{}/", d);
            }
            for f in &listing.files {
                println!("{}", f);
            }
        }
        Command::Put { name, file } => {
            let mut content = NamedContent::new(name, File::open(&file)?);
            let saved = storage.save(None, &mut content)?;
            println!("{}", saved);
        }
        Command::Import { name, file } => {
            // Importing needs the concrete filesystem backend.
            let fs_storage = FileSystemStorage::new(&config.location, config.base_uri.clone())?;
            println!("{}", fs_storage.import(&name, &file)?);
        }
        Command::Cat { name } => {
            let mut handle = storage.open(&name, OpenMode::Read)?;
            copy_chunked(&mut handle, &mut io::stdout().lock())?;
        }
        Command::Rm { name } => storage.delete(&name)?,
        Command::Stat { name } => {
            println!("path:     {}", storage.path(&name)?.display());
            println!("size:     {}", storage.size(&name)?);
            println!("accessed: {}", storage.accessed_time(&name)?);
            println!("created:  {}", storage.created_time(&name)?);
            println!("modified: {}", storage.modified_time(&name)?);
        }
        Command::Url { name } => println!("{}", storage.uri(&name)?),
        Command::Path { name } => println!("{}", storage.path(&name)?.display()),
    }

    Ok(())
}

fn main() -> ExitCode {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::from(error_to_exit_code(&e) as u8)
        }
    }
}

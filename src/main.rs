//! MP3 auto-tagger: looks selected files up in the Spotify catalog by title and
//! writes the matched metadata and cover art into their ID3 tags.

mod catalog;
mod config;
mod credentials;
mod errors;
mod file_intake;
mod metadata_tags;
mod pipeline;
mod reconciler;
mod report;
mod tag_writer;
#[cfg(test)]
mod test_support;

use std::path::PathBuf;

use clap::Parser;
use log::{debug, info};

use crate::catalog::spotify::SpotifyCatalog;
use crate::config::{default_config_path, load_or_create_config};
use crate::file_intake::{partition_selected_paths, pick_input_files};
use crate::report::RunReport;

#[derive(Parser, Debug)]
#[command(
    name = "autofiller",
    version,
    about = "Fill in MP3 metadata from the Spotify catalog using each file's name as the track title"
)]
struct Cli {
    /// MP3 files to tag. A file dialog opens when none are given.
    paths: Vec<PathBuf>,

    /// Alternate configuration file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Store the catalog client secret in the OS keyring and exit.
    #[arg(long, value_name = "SECRET")]
    store_client_secret: Option<String>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut clog = colog::default_builder();
    clog.filter(
        None,
        if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        },
    );
    clog.init();

    std::panic::set_hook(Box::new(|panic_info| {
        let current_thread = std::thread::current();
        let thread_name = current_thread.name().unwrap_or("unnamed");
        log::error!("panic in thread '{}': {}", thread_name, panic_info);
    }));

    let config_file = match cli.config.clone() {
        Some(path) => path,
        None => default_config_path().ok_or("Could not determine the user config directory")?,
    };
    let config = load_or_create_config(&config_file)?;
    debug!("Loaded config path={}", config_file.display());

    if let Some(secret) = cli.store_client_secret.as_deref() {
        if config.catalog.client_id.is_empty() {
            return Err(format!(
                "Set [catalog].client_id in {} before storing a client secret",
                config_file.display()
            )
            .into());
        }
        credentials::set_client_secret(&config.catalog.client_id, secret.trim())?;
        println!(
            "Stored client secret for client '{}' in the system keyring.",
            config.catalog.client_id
        );
        return Ok(());
    }

    let catalog_credentials = credentials::resolve_credentials(&config.catalog)?;

    let selected_paths = if cli.paths.is_empty() {
        println!(
            "Please select the MP3 file(s) you wish to get metadata for. Name each file after its track, e.g. \"Track Name.mp3\".\n"
        );
        pick_input_files()
    } else {
        cli.paths.clone()
    };
    if selected_paths.is_empty() {
        println!("No files selected. Nothing to do.");
        return Ok(());
    }

    let mut intake = partition_selected_paths(&selected_paths);
    info!(
        "Intake: {} candidate(s), {} wrong extension, {} unprocessable",
        intake.candidates.len(),
        intake.wrong_extension.len(),
        intake.unprocessable.len()
    );
    if !intake.wrong_extension.is_empty() {
        println!(
            "{} selected file(s) are not MP3 files and will be skipped; see the summary below.\n",
            intake.wrong_extension.len()
        );
    }

    let candidates = std::mem::take(&mut intake.candidates);
    let batch = if candidates.is_empty() {
        pipeline::BatchOutcome::default()
    } else {
        let mut spotify =
            SpotifyCatalog::new(catalog_credentials, &config.catalog, &config.network);
        spotify.authorize()?;
        pipeline::run_batch(candidates, &mut spotify)
    };

    let report = RunReport::from_parts(intake, batch);
    if report.has_problems() {
        info!("Run finished with skipped files; see summary");
    }
    println!();
    print!("{}", report.render());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_cli_parses_paths_and_flags() {
        let cli = Cli::parse_from([
            "autofiller",
            "-v",
            "--config",
            "/tmp/custom.toml",
            "a.mp3",
            "b.mp3",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/custom.toml")));
        assert_eq!(
            cli.paths,
            vec![PathBuf::from("a.mp3"), PathBuf::from("b.mp3")]
        );
        assert!(cli.store_client_secret.is_none());
    }

    #[test]
    fn test_cli_store_client_secret_without_paths() {
        let cli = Cli::parse_from(["autofiller", "--store-client-secret", "s3cret"]);
        assert_eq!(cli.store_client_secret.as_deref(), Some("s3cret"));
        assert!(cli.paths.is_empty());
    }
}

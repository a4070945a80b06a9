use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use claim_sdk::{
    ClaimConfig, ClaimPipeline, ConfirmationScreen, RawImage, RegistrationScreen,
    ResultRepository, ResultStore, RocksRepository, Route,
};
use dotenv::dotenv;
use log::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Register for the in-store prize campaign")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a page: `/<storeId>` registers, `/exit` shows the last result.
    Visit {
        path: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        dni: String,
        /// Photo to compress and upload.
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Leave the confirmation page and forget the stored result.
    Home,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let config = ClaimConfig::load()?;
    let store = ResultStore::new(
        RocksRepository::open(&config.store_path)
            .with_context(|| format!("Failed to open result store at {}", config.store_path))?,
    );

    match args.command {
        Command::Visit {
            path,
            name,
            phone,
            dni,
            photo,
        } => match Route::parse(&path) {
            Some(Route::Registration { store_id }) => {
                let form = FormInput {
                    name,
                    phone,
                    dni,
                    photo,
                };
                register(&config, store, store_id, form).await
            }
            Some(Route::Confirmation) => {
                let screen = ConfirmationScreen::open(None, &store)?;
                render_confirmation(&screen);
                Ok(ExitCode::SUCCESS)
            }
            Some(Route::Home) => {
                println!("Escanea el código QR de tu tienda para participar.");
                Ok(ExitCode::SUCCESS)
            }
            None => {
                error!("No page matches {}", path);
                Ok(ExitCode::FAILURE)
            }
        },
        Command::Home => {
            let route = ConfirmationScreen::return_home(&store)?;
            info!("Navigating to {}", route);
            println!("Volviste al inicio.");
            Ok(ExitCode::SUCCESS)
        }
    }
}

struct FormInput {
    name: String,
    phone: String,
    dni: String,
    photo: Option<PathBuf>,
}

async fn register<R: ResultRepository>(
    config: &ClaimConfig,
    store: ResultStore<R>,
    store_id: String,
    form: FormInput,
) -> Result<ExitCode> {
    let mut screen = RegistrationScreen::new(Some(store_id), config);
    if let Some(notice) = screen.missing_store_notice() {
        eprintln!("{}", notice);
        return Ok(ExitCode::FAILURE);
    }

    screen.name = form.name;
    screen.phone_number = form.phone;
    screen.dni = form.dni;
    if let Some(path) = form.photo.as_deref() {
        screen.select_photo(Some(read_photo(path)?)).await;
    }

    println!("1. REGISTRATE PARA PARTICIPAR");
    if let Some(badge) = screen.store_badge() {
        println!("Tienda ID: {}", badge);
    }
    if let Some(size) = screen.compressed_size_label() {
        println!("Foto: {}", size);
    }

    let pipeline = ClaimPipeline::from_config(config, store);
    info!(
        "Submitting to {} for campaign {}",
        config.claim_endpoint(),
        pipeline.campaign()
    );
    println!("ENVIANDO...");
    match screen.submit(&pipeline).await {
        Some(navigation) => {
            info!("Navigating to {}", navigation.route);
            let confirmation = ConfirmationScreen::open(Some(&navigation.result), pipeline.store())?;
            render_confirmation(&confirmation);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("{}", screen.message);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn read_photo(path: &Path) -> Result<RawImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo".to_string());
    Ok(RawImage { file_name, bytes })
}

fn render_confirmation(screen: &ConfirmationScreen) {
    println!("¡Felicidades!");
    println!("Tu registro ha sido completado con éxito.");
    println!();
    println!("Has ganado: {}", screen.headline);
    if let Some(url) = &screen.photo_url {
        println!("Foto registrada: {}", url);
    }
    println!();
    println!("¡Un encargado de la tienda te contactará pronto para coordinar la entrega de tu premio!");
    println!("(claim home para volver al inicio)");
}

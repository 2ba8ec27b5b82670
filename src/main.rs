use std::env;
use std::process::ExitCode;

use anyhow::Context;
use myqr_studio::exchange::ExchangeOutcome;
use myqr_studio::form::{FieldUpdate, LogoFile, PresetCatalog};
use myqr_studio::{ClientConfig, ErrorResponse, Session};

#[tokio::main]
async fn main() -> ExitCode {
    myqr_studio::init_logging();

    match run().await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<ExitCode> {
    let config = ClientConfig::from_env().context("Invalid client configuration")?;
    let mut session = Session::from_config(&config).context("Failed to start session")?;

    if let Ok(name) = env::var("MYQR_PRESET") {
        let path = env::var("MYQR_PRESETS").context("MYQR_PRESET requires MYQR_PRESETS")?;
        let catalog = PresetCatalog::from_path(&path)
            .with_context(|| format!("Failed to load presets from {}", path))?;
        session.apply_preset(catalog.get(&name)?);
    }

    for update in updates_from_env()? {
        session.set_field(update);
    }

    let ticket = match session.submit() {
        Ok(ticket) => ticket,
        Err(violation) => {
            let response = ErrorResponse::validation(&violation);
            eprintln!("{}: {}", response.title, response.message);
            return Ok(ExitCode::from(2));
        }
    };

    log::info!("Generating poster, this may take 30-60s if the server is waking up");

    match ticket.wait().await {
        ExchangeOutcome::Succeeded(artifact) => {
            let path = artifact
                .save_to(env::current_dir()?)
                .context("Failed to save poster")?;
            println!("{}", path.display());
            Ok(ExitCode::SUCCESS)
        }
        ExchangeOutcome::Failed(error) => {
            let response = ErrorResponse::exchange(&error);
            eprintln!("{}: {}", response.title, response.message);
            Ok(ExitCode::FAILURE)
        }
        ExchangeOutcome::Cancelled => Ok(ExitCode::FAILURE),
    }
}

fn updates_from_env() -> anyhow::Result<Vec<FieldUpdate>> {
    let mut updates = Vec::new();
    if let Ok(value) = env::var("MYQR_SHOP_NAME") {
        updates.push(FieldUpdate::ShopName(value));
    }
    if let Ok(value) = env::var("MYQR_UPI_ID") {
        updates.push(FieldUpdate::UpiId(value));
    }
    if let Ok(value) = env::var("MYQR_TAGLINE") {
        updates.push(FieldUpdate::Tagline(value));
    }
    if let Ok(value) = env::var("MYQR_PRIMARY_COLOR") {
        updates.push(FieldUpdate::PrimaryColor(value.parse()?));
    }
    if let Ok(value) = env::var("MYQR_TEXT_COLOR") {
        updates.push(FieldUpdate::TextColor(value.parse()?));
    }
    if let Ok(path) = env::var("MYQR_LOGO") {
        let logo = LogoFile::from_path(&path)
            .with_context(|| format!("Failed to read logo {}", path))?;
        updates.push(FieldUpdate::Logo(Some(logo)));
    }
    Ok(updates)
}

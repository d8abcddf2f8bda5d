use rgenai_studio::{config::SETUP_INSTRUCTIONS, logger, Config, Studio, StudioError};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file first
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init_with_config(logger::LoggerConfig::from_env())?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = Config::from_env();
    logger::log_startup_info(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        &config.bind_address(),
    );
    logger::log_config_info(&config);

    let studio = match Studio::from_config(&config.huggingface) {
        Ok(studio) => studio,
        Err(StudioError::CredentialMissing) => {
            log::error!("❌ HuggingFace API token not configured!");
            for line in SETUP_INSTRUCTIONS.lines() {
                log::error!("{}", line);
            }
            std::process::exit(1);
        }
        Err(e) => {
            log::error!("❌ Failed to initialize HuggingFace client: {}", e);
            return Err(e.into());
        }
    };

    log::info!("📚 {} styles available", studio.catalog().entries().len());

    rgenai_studio::server::run(config, studio).await?;

    log::info!("👋 Server stopped");
    Ok(())
}

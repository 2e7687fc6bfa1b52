use clap::Parser;
use resume_scout::adapters::site_adapters;
use resume_scout::app::bot::{run_bot, BotContext};
use resume_scout::app::SessionStore;
use resume_scout::config::cli::BotArgs;
use resume_scout::config::TELEGRAM_BOT_TOKEN;
use resume_scout::utils::validation::{validate_required_field, Validate};
use resume_scout::utils::{error::Result, logger};
use resume_scout::{Dispatcher, Renderer, ScoutError, Settings};
use std::sync::Arc;
use teloxide::Bot;

fn load_settings(args: &BotArgs) -> Result<(Settings, String)> {
    let settings = Settings::load(args.config.as_deref())?;
    settings.validate()?;
    let token = validate_required_field(TELEGRAM_BOT_TOKEN, &settings.credentials.telegram_bot_token)?
        .clone();
    Ok((settings, token))
}

fn exit_with(e: ScoutError) -> ! {
    tracing::error!(
        "❌ Startup failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code().max(1));
}

#[tokio::main]
async fn main() {
    let args = BotArgs::parse();

    // A missing .env is fine; the variables may come from the real environment.
    match &args.env_file {
        Some(path) => {
            if let Err(e) = dotenvy::from_path(path) {
                eprintln!("⚠️ Could not read {}: {}", path.display(), e);
            }
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }
    tracing::info!("Starting resume-scout bot");

    let (settings, token) = match load_settings(&args) {
        Ok(loaded) => loaded,
        Err(e) => exit_with(e),
    };
    tracing::debug!("Settings: {:?}", settings);

    let adapters = match site_adapters(&settings) {
        Ok(adapters) => adapters,
        Err(e) => exit_with(e),
    };
    let context = BotContext::new(
        SessionStore::new(settings.bot.clone()),
        Dispatcher::new(adapters, settings.adapter_timeout()),
        Renderer::new(settings.delivery.max_message_chars),
        settings.search.per_site_limit,
    );

    run_bot(Bot::new(token), Arc::new(context)).await;
}

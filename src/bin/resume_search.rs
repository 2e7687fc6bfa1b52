use anyhow::Context;
use clap::Parser;
use resume_scout::adapters::site_adapters;
use resume_scout::adapters::stdout::StdoutSink;
use resume_scout::config::cli::SearchArgs;
use resume_scout::core::deliver;
use resume_scout::utils::logger;
use resume_scout::utils::validation::Validate;
use resume_scout::{Dispatcher, Renderer, ScoutError, SearchRequest, Settings};

fn fail(e: ScoutError) -> ! {
    tracing::error!("❌ {} (Category: {:?})", e, e.category());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code().max(1));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = SearchArgs::parse();
    dotenvy::dotenv().ok();
    logger::init_cli_logger(args.verbose);

    let settings = Settings::load(args.config.as_deref()).unwrap_or_else(|e| fail(e));
    if let Err(e) = settings.validate() {
        fail(e);
    }

    let criteria = args.criteria();
    if !criteria.is_searchable() {
        anyhow::bail!("give a search query or --category");
    }

    let adapters = site_adapters(&settings).unwrap_or_else(|e| fail(e));
    let dispatcher = Dispatcher::new(adapters, settings.adapter_timeout());
    let request = SearchRequest {
        criteria,
        limit: args.limit.unwrap_or(settings.search.per_site_limit),
    };

    let report = dispatcher.handle_request(&request).await;

    if args.json {
        for (site, failure) in &report.failures {
            eprintln!("⚠️ {} could not be searched: {}", site, failure);
        }
        let json = serde_json::to_string_pretty(&report.resumes)
            .context("failed to serialize resumes")?;
        println!("{}", json);
        return Ok(());
    }

    let renderer = Renderer::new(settings.delivery.max_message_chars);
    let mut messages = vec![renderer.summary(&report)];
    messages.extend(renderer.render(&report.resumes));
    deliver(&StdoutSink::stdout(), 0, &messages)
        .await
        .context("failed to print results")?;

    Ok(())
}

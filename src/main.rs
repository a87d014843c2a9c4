use anyhow::Context;
use clap::Parser;
use pet_list_renderer::core::{ConfigProvider, Pipeline};
use pet_list_renderer::utils::error::{ErrorSeverity, RenderError};
use pet_list_renderer::utils::{logger, validation::Validate};
use pet_list_renderer::{
    CliConfig, HtmlFileDocument, LocalStorage, PetListRenderer, RenderEngine, RenderOutcome,
    TomlConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    match cli.config.clone() {
        Some(path) => {
            let config = TomlConfig::from_file(&path).with_context(|| {
                format!(
                    "failed to load config file '{}' (make sure it exists and is valid TOML)",
                    path
                )
            })?;

            logger::init_logger(
                config.log_format().unwrap_or(cli.log_format),
                config.verbose() || cli.verbose,
            );
            tracing::info!("📁 Loaded configuration from: {}", path);
            run(config, cli.dry_run).await
        }
        None => {
            logger::init_logger(cli.log_format, cli.verbose);
            let dry_run = cli.dry_run;
            run(cli, dry_run).await
        }
    }
}

async fn run<C>(config: C, dry_run: bool) -> anyhow::Result<()>
where
    C: ConfigProvider + Validate + std::fmt::Debug,
{
    tracing::info!("Starting pet-list");
    tracing::debug!("Config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let document = HtmlFileDocument::new(
        LocalStorage::new(".".to_string()),
        config.document_path(),
    );
    let fallback_notice = config.fallback_notice().map(str::to_string);

    let renderer = match PetListRenderer::new(document, config) {
        Ok(renderer) => renderer,
        Err(e) => fail(&e),
    };

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - the document will not be modified");
        let rendered = match renderer.extract().await {
            Ok(pets) => renderer.transform(pets).await,
            Err(e) => Err(e),
        };
        match rendered {
            Ok(rendered) => println!("{}", rendered.markup),
            Err(e) => fail(&e),
        }
        return Ok(());
    }

    let engine = RenderEngine::new_with_fallback(renderer, fallback_notice);

    match engine.run().await {
        Ok(RenderOutcome::Rendered { records, .. }) => {
            let target = engine.pipeline().config().target_id();
            let path = engine.pipeline().document().path();
            tracing::info!("📁 Updated #{} in {}", target, path);
            println!("✅ Rendered {} pets into #{} ({})", records, target, path);
        }
        Ok(RenderOutcome::Superseded { generation }) => {
            tracing::warn!("Render {} was superseded before it could write", generation);
        }
        Err(e) => fail(&e),
    }

    Ok(())
}

fn fail(e: &RenderError) -> ! {
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2, // 可重試
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}

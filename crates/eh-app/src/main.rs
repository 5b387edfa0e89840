use anyhow::Result;
use clap::Parser;
use eh_core::cancel::CancelToken;
use eh_core::config::EqualizeConfig;

pub mod batch;
pub mod cli;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Valider le mode
    cli.validate()?;
    let region = cli.region()?;

    // 4. Charger la config puis appliquer les overrides CLI
    let mut config = resolve_config(&cli)?;
    cli.apply_overrides(&mut config);
    log::debug!("Config effective : {config:?}");

    // 5. Ctrl-C : arrêt coopératif, le résultat partiel est quand même écrit
    let cancel = CancelToken::new();
    let handle = cancel.clone();
    ctrlc::set_handler(move || {
        log::warn!("Interruption demandée, arrêt en cours...");
        handle.cancel();
    })?;

    if let Some(folder) = cli.batch_folder.as_deref() {
        let count = batch::run_batch(folder, cli.batch_out.as_deref(), &config, region, &cancel)?;
        log::info!("{count} images traitées");
        return Ok(());
    }

    if let (Some(input), Some(output)) = (cli.input.as_deref(), cli.output.as_deref()) {
        let report = batch::process_file(input, output, &config, region, &cancel)?;
        for pass in &report.passes {
            log::info!(
                "Passe {} {:?} : écart {} → {} en {} itérations",
                pass.pass,
                pass.channel,
                pass.diffusion.spread_before,
                pass.diffusion.spread_after,
                pass.diffusion.iterations
            );
        }
    }
    Ok(())
}

/// Config fichier si présente, défauts sinon.
fn resolve_config(cli: &cli::Cli) -> Result<EqualizeConfig> {
    if cli.config.exists() {
        eh_core::config::load_config(&cli.config)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        Ok(EqualizeConfig::default())
    }
}

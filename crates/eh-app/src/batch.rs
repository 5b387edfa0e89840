use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use eh_core::cancel::CancelToken;
use eh_core::config::EqualizeConfig;
use eh_core::frame::Region;
use eh_engine::pipeline::{EqualizeReport, equalize};
use eh_source::folder::{mirror_path, scan_images};
use eh_source::image::{load_image, save_image};
use rayon::prelude::*;

/// Égalise un fichier et écrit le résultat, même partiel.
///
/// # Errors
/// Retourne une erreur si la lecture, la sélection ou l'écriture échoue.
pub fn process_file(
    input: &Path,
    output: &Path,
    config: &EqualizeConfig,
    region: Option<Region>,
    cancel: &CancelToken,
) -> Result<EqualizeReport> {
    let source = load_image(input)?;
    let region = region.unwrap_or_else(|| Region::full(&source));
    let equalized = equalize(&source, region, config, cancel)
        .with_context(|| format!("Égalisation de {}", input.display()))?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Création de {}", parent.display()))?;
    }
    save_image(&equalized.frame, output)?;

    if equalized.report.cancelled {
        log::warn!("{} : annulé, résultat partiel écrit", input.display());
    } else {
        log::info!("{} → {}", input.display(), output.display());
    }
    Ok(equalized.report)
}

/// Dossier de sortie par défaut : frère du dossier d'entrée, suffixé.
#[must_use]
pub fn default_batch_out(folder: &Path) -> PathBuf {
    let name = folder
        .file_name()
        .map_or_else(|| "images".into(), |n| n.to_string_lossy());
    folder.with_file_name(format!("{name}_equalized"))
}

/// Point d'entrée du traitement par lots.
///
/// Chaque fichier est une égalisation indépendante, avec son propre flux
/// aléatoire initialisé par `config.seed` : les fichiers sont traités en
/// parallèle sans changer leurs sorties.
///
/// # Errors
/// Retourne une erreur si le dossier ne peut être lu ou si un fichier échoue.
pub fn run_batch(
    folder: &Path,
    batch_out: Option<&Path>,
    config: &EqualizeConfig,
    region: Option<Region>,
    cancel: &CancelToken,
) -> Result<usize> {
    let files = scan_images(folder)?;
    let out_root = batch_out.map_or_else(|| default_batch_out(folder), Path::to_path_buf);
    log::info!("Lot : {} fichiers → {}", files.len(), out_root.display());

    let failures: Vec<String> = files
        .par_iter()
        .filter_map(|file| {
            if cancel.is_cancelled() {
                return None;
            }
            let output = mirror_path(file, folder, &out_root);
            process_file(file, &output, config, region, cancel)
                .err()
                .map(|e| format!("{} : {e:#}", file.display()))
        })
        .collect();

    for failure in &failures {
        log::error!("{failure}");
    }
    if !failures.is_empty() {
        anyhow::bail!("{} fichier(s) sur {} en échec", failures.len(), files.len());
    }
    Ok(files.len())
}

use std::path::PathBuf;

use clap::Parser;
use eh_core::config::EqualizeConfig;
use eh_core::frame::Region;

/// evenhist — égalisation d'histogramme qui préserve le détail.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Image à égaliser (PNG, JPEG, BMP).
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    /// Fichier de sortie, format déduit de l'extension. Requis avec --input.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Égaliser toutes les images d'un dossier (récursif).
    #[arg(long)]
    pub batch_folder: Option<PathBuf>,

    /// Dossier de sortie du lot. Défaut : `<dossier>_equalized`.
    #[arg(long)]
    pub batch_out: Option<PathBuf>,

    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Graine du flux aléatoire.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Itérations de diffusion maximales (0 = jusqu'à équilibre).
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Pas d'équilibrage supplémentaires par itération (0..=256).
    #[arg(long)]
    pub sweep_steps: Option<u16>,

    /// Égaliser R, G et B indépendamment au lieu du rouge seul.
    #[arg(long, default_value_t = false)]
    pub color: bool,

    /// Activer le débruitage avec cette force [0, 1].
    #[arg(long)]
    pub denoise: Option<f32>,

    /// Deuxième passe sans débruitage.
    #[arg(long, default_value_t = false)]
    pub run_again: bool,

    /// Mélange avec la source [-1, 2].
    #[arg(long, allow_negative_numbers = true)]
    pub mix: Option<f64>,

    /// Sélection "x,y,largeur,hauteur". Défaut : toute l'image.
    #[arg(long)]
    pub region: Option<String>,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Validate that exactly one mode is requested.
    ///
    /// # Errors
    /// Returns an error if neither or both of `--input` and `--batch-folder`
    /// are given, or if `--input` lacks `--output`.
    pub fn validate(&self) -> anyhow::Result<()> {
        match (&self.input, &self.batch_folder) {
            (None, None) => {
                anyhow::bail!("Aucune entrée. Utilisez --input <image> ou --batch-folder <dossier>.")
            }
            (Some(_), Some(_)) => {
                anyhow::bail!("--input et --batch-folder sont exclusifs.")
            }
            (Some(_), None) if self.output.is_none() => {
                anyhow::bail!("--output est requis avec --input.")
            }
            _ => Ok(()),
        }
    }

    /// Sélection parsée, `None` pour toute l'image.
    ///
    /// # Errors
    /// Returns an error if `--region` is malformed.
    pub fn region(&self) -> anyhow::Result<Option<Region>> {
        Ok(self.region.as_deref().map(Region::parse).transpose()?)
    }

    /// Applique les flags CLI par-dessus la config fichier.
    pub fn apply_overrides(&self, config: &mut EqualizeConfig) {
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if let Some(v) = self.max_iterations {
            config.max_iterations = v;
        }
        if let Some(v) = self.sweep_steps {
            config.sweep_steps = v;
        }
        if self.color {
            config.grayscale = false;
        }
        if let Some(v) = self.denoise {
            config.denoise = true;
            config.denoise_strength = v;
        }
        if self.run_again {
            config.run_again = true;
        }
        if let Some(v) = self.mix {
            config.mix = v;
        }
        config.clamp_all();
    }
}

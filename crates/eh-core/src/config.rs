use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Largeur d'un histogramme : une barre par niveau 8 bits.
pub const LEVELS: usize = 256;

/// Paramètres d'une égalisation.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine.
///
/// # Example
/// ```
/// use eh_core::config::EqualizeConfig;
/// let config = EqualizeConfig::default();
/// assert_eq!(config.max_iterations, 10_000);
/// assert_eq!(config.sweep_steps, 256);
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct EqualizeConfig {
    // === Diffusion ===
    /// Graine du flux aléatoire unique de la passe.
    pub seed: u64,
    /// Nombre maximal d'itérations de diffusion. 0 = jusqu'à équilibre.
    pub max_iterations: u32,
    /// Pas d'équilibrage supplémentaires par itération [0, 256].
    /// 0 désactive le balayage, 256 visite chaque barre une fois.
    pub sweep_steps: u16,

    // === Canaux ===
    /// Tirage unique sur le rouge, recopié sur R, G et B.
    pub grayscale: bool,

    // === Débruitage ===
    /// Remodeler chaque distribution en triangle autour de sa médiane.
    pub denoise: bool,
    /// Force du débruitage [0.0, 1.0]. 1.0 = étalement entre extrêmes.
    pub denoise_strength: f32,
    /// Deuxième passe sans débruitage sur la sortie de la première.
    pub run_again: bool,

    // === Mélange ===
    /// Mélange source/résultat [-1.0, 2.0], extrapole hors de [0, 1].
    pub mix: f64,
}

impl Default for EqualizeConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_iterations: 10_000,
            sweep_steps: LEVELS as u16,
            grayscale: true,
            denoise: false,
            denoise_strength: 0.5,
            run_again: false,
            mix: 1.0,
        }
    }
}

impl EqualizeConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization and CLI overrides.
    pub fn clamp_all(&mut self) {
        if self.sweep_steps > LEVELS as u16 {
            log::warn!("sweep_steps {} ramené à {LEVELS}", self.sweep_steps);
            self.sweep_steps = LEVELS as u16;
        }
        let strength = if self.denoise_strength.is_nan() {
            0.0
        } else {
            self.denoise_strength.clamp(0.0, 1.0)
        };
        if strength.to_bits() != self.denoise_strength.to_bits() {
            log::warn!("denoise_strength {} ramené à {strength}", self.denoise_strength);
            self.denoise_strength = strength;
        }
        let mix = if self.mix.is_nan() {
            1.0
        } else {
            self.mix.clamp(-1.0, 2.0)
        };
        if mix.to_bits() != self.mix.to_bits() {
            log::warn!("mix {} ramené à {mix}", self.mix);
            self.mix = mix;
        }
        if self.sweep_steps == 0 && self.max_iterations == 0 {
            log::warn!("Sans balayage ni limite d'itérations, la diffusion peut se bloquer");
        }
    }
}

/// Structure TOML intermédiaire, toutes sections optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    equalize: Option<EqualizeSection>,
}

/// Equalize section of the TOML config, all fields optional for partial override.
#[derive(Deserialize)]
struct EqualizeSection {
    seed: Option<u64>,
    max_iterations: Option<u32>,
    sweep_steps: Option<u16>,
    quicker: Option<bool>,
    grayscale: Option<bool>,
    denoise: Option<bool>,
    denoise_strength: Option<f32>,
    run_again: Option<bool>,
    mix: Option<f64>,
}

/// Parse une config TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the TOML is malformed.
///
/// # Example
/// ```
/// use eh_core::config::parse_config;
/// let config = parse_config("[equalize]\nseed = 7\nmix = 9.0\n").unwrap();
/// assert_eq!(config.seed, 7);
/// assert_eq!(config.mix, 2.0);
/// ```
pub fn parse_config(content: &str) -> Result<EqualizeConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;

    let mut config = EqualizeConfig::default();

    if let Some(e) = file.equalize {
        if let Some(v) = e.seed {
            config.seed = v;
        }
        if let Some(v) = e.max_iterations {
            config.max_iterations = v;
        }
        if let Some(v) = e.sweep_steps {
            config.sweep_steps = v;
        } else if let Some(v) = e.quicker {
            config.sweep_steps = if v { LEVELS as u16 } else { 0 };
        }
        if let Some(v) = e.grayscale {
            config.grayscale = v;
        }
        if let Some(v) = e.denoise {
            config.denoise = v;
        }
        if let Some(v) = e.denoise_strength {
            config.denoise_strength = v;
        }
        if let Some(v) = e.run_again {
            config.run_again = v;
        }
        if let Some(v) = e.mix {
            config.mix = v;
        }
    }

    config.clamp_all();
    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use eh_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<EqualizeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Config invalide : {}", path.display()))
}

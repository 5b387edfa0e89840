use eh_core::cancel::CancelToken;
use eh_core::config::EqualizeConfig;
use eh_core::error::CoreError;
use eh_core::frame::{Channel, FrameBuffer, Region};

use crate::denoise::denoise;
use crate::diffuse::{DiffuseReport, Diffuser};
use crate::histogram::Histogram;
use crate::rng::RngStream;
use crate::sampler;

/// Bilan d'un canal dans une passe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelPass {
    /// 0 pour la passe principale, 1 pour la passe "run again".
    pub pass: u8,
    pub channel: Channel,
    pub diffusion: DiffuseReport,
    /// Pixels effectivement réécrits.
    pub remapped: u64,
    /// Débruitage appliqué sur ce canal.
    pub denoised: bool,
}

/// Bilan d'une égalisation complète.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EqualizeReport {
    /// Canaux traités, dans l'ordre de consommation du flux aléatoire.
    pub passes: Vec<ChannelPass>,
    /// Arrêt anticipé sur annulation.
    pub cancelled: bool,
}

/// Image égalisée et bilan.
#[derive(Clone, Debug)]
pub struct Equalized {
    pub frame: FrameBuffer,
    pub report: EqualizeReport,
}

/// Égalise l'histogramme de `region` dans `source`.
///
/// Pour chaque passe et chaque canal, dans un ordre fixe et sur un flux
/// aléatoire unique : construction, diffusion, transposition, débruitage
/// (passe principale seulement), tirage. Le mélange avec la source est
/// appliqué une fois à la fin.
///
/// Une annulation rend une image incomplète mais valide : les pixels non
/// réécrits gardent leur valeur source.
///
/// # Errors
/// Returns [`CoreError::RegionOutOfBounds`] if `region` leaves `source`.
///
/// # Example
/// ```
/// use eh_core::{CancelToken, EqualizeConfig, FrameBuffer, Region};
/// use eh_engine::pipeline::equalize;
///
/// let source = FrameBuffer::from_gray(2, 2, &[10, 10, 200, 200]).unwrap();
/// let config = EqualizeConfig { max_iterations: 0, ..EqualizeConfig::default() };
/// let out = equalize(&source, Region::full(&source), &config, &CancelToken::new()).unwrap();
/// assert!(!out.report.cancelled);
/// assert_eq!(out.report.passes.len(), 1);
/// ```
pub fn equalize(
    source: &FrameBuffer,
    region: Region,
    config: &EqualizeConfig,
    cancel: &CancelToken,
) -> Result<Equalized, CoreError> {
    region.validate(source)?;
    log::info!(
        "Égalisation de {} pixels ({}×{} en {},{})",
        region.pixel_count(),
        region.width,
        region.height,
        region.x,
        region.y
    );

    let mut rng = RngStream::new(config.seed);
    let diffuser = Diffuser::from_config(config);
    let mut working = source.clone();
    let mut report = EqualizeReport::default();

    let channels: &[Channel] = if config.grayscale {
        &[Channel::Red]
    } else {
        &Channel::RGB
    };
    let pass_count = if config.run_again { 2 } else { 1 };

    'passes: for pass in 0..pass_count {
        let denoised = config.denoise && pass == 0 && config.denoise_strength > 0.0;

        for &channel in channels {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break 'passes;
            }
            let targets: &[Channel] = if config.grayscale {
                &Channel::RGB
            } else {
                std::slice::from_ref(&channel)
            };

            let mut histogram = Histogram::from_channel(&working, region, channel);
            debug_assert_eq!(histogram.total(), region.pixel_count());
            let diffusion = diffuser.run(&mut histogram, &mut rng, cancel);
            let mut transposed = histogram.transpose();
            if denoised {
                denoise(&mut transposed, config.denoise_strength);
            }
            let remapped = sampler::remap(
                &mut working,
                region,
                channel,
                targets,
                &mut transposed,
                &mut rng,
                cancel,
            );

            log::info!(
                "Passe {pass} canal {channel:?} : {} pixels, {} itérations ({:?})",
                remapped.pixels,
                diffusion.iterations,
                diffusion.outcome
            );
            report.passes.push(ChannelPass {
                pass,
                channel,
                diffusion,
                remapped: remapped.pixels,
                denoised,
            });

            if remapped.cancelled {
                report.cancelled = true;
                break 'passes;
            }
        }
    }

    if report.cancelled {
        log::warn!("Égalisation annulée, résultat partiel");
    }

    sampler::blend(source, &mut working, region, config.mix);
    Ok(Equalized {
        frame: working,
        report,
    })
}

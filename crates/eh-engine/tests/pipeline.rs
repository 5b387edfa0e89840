use eh_core::{CancelToken, Channel, EqualizeConfig, FrameBuffer, Region};
use eh_engine::{DiffuseOutcome, equalize};

fn unbounded() -> EqualizeConfig {
    EqualizeConfig {
        max_iterations: 0,
        ..EqualizeConfig::default()
    }
}

fn level_counts(frame: &FrameBuffer, channel: Channel) -> [u32; 256] {
    let mut counts = [0u32; 256];
    for y in 0..frame.height {
        for x in 0..frame.width {
            counts[usize::from(frame.channel(x, y, channel))] += 1;
        }
    }
    counts
}

fn even_levels(width: u32, height: u32) -> FrameBuffer {
    let values: Vec<u8> = (0..width * height).map(|i| (i % 128 * 2) as u8).collect();
    FrameBuffer::from_gray(width, height, &values).unwrap()
}

#[test]
fn two_by_two_grayscale_example() {
    let source = FrameBuffer::from_gray(2, 2, &[10, 10, 200, 200]).unwrap();
    let out = equalize(&source, Region::full(&source), &unbounded(), &CancelToken::new()).unwrap();

    let pass = out.report.passes[0];
    assert_eq!(pass.diffusion.outcome, DiffuseOutcome::Balanced);
    assert_eq!(pass.diffusion.spread_before, 2);
    assert!(pass.diffusion.spread_after <= 1);
    assert_eq!(pass.remapped, 4);

    let counts = level_counts(&out.frame, Channel::Red);
    assert_eq!(counts.iter().sum::<u32>(), 4);
    assert!(counts.iter().all(|&c| c <= 1));
    for y in 0..2 {
        for x in 0..2 {
            let (r, g, b, a) = out.frame.pixel(x, y);
            assert_eq!((r, a), (g, 255));
            assert_eq!(r, b);
        }
    }
}

#[test]
fn output_histogram_is_flat() {
    let source = even_levels(32, 32);
    let out = equalize(&source, Region::full(&source), &unbounded(), &CancelToken::new()).unwrap();
    assert_eq!(out.report.passes[0].diffusion.outcome, DiffuseOutcome::Balanced);
    let counts = level_counts(&out.frame, Channel::Red);
    assert!(counts.iter().all(|&c| c == 4), "{counts:?}");
}

#[test]
fn nearby_values_stay_nearby() {
    let source = even_levels(32, 32);
    let out = equalize(&source, Region::full(&source), &unbounded(), &CancelToken::new()).unwrap();
    let mut displacement = 0u32;
    for y in 0..32 {
        for x in 0..32 {
            let before = source.channel(x, y, Channel::Red);
            let after = out.frame.channel(x, y, Channel::Red);
            displacement += u32::from(before.abs_diff(after));
        }
    }
    let mean = f64::from(displacement) / 1024.0;
    assert!(mean < 4.0, "déplacement moyen {mean}");
}

#[test]
fn same_seed_same_bytes() {
    let source = even_levels(16, 16);
    let config = EqualizeConfig {
        seed: 77,
        max_iterations: 500,
        grayscale: false,
        denoise: true,
        run_again: true,
        ..EqualizeConfig::default()
    };
    let a = equalize(&source, Region::full(&source), &config, &CancelToken::new()).unwrap();
    let b = equalize(&source, Region::full(&source), &config, &CancelToken::new()).unwrap();
    assert_eq!(a.frame, b.frame);
    assert_eq!(a.report, b.report);
}

#[test]
fn seed_changes_the_remap() {
    let source = even_levels(32, 32);
    let run = |seed| {
        let config = EqualizeConfig { seed, ..unbounded() };
        equalize(&source, Region::full(&source), &config, &CancelToken::new())
            .unwrap()
            .frame
    };
    assert_ne!(run(1), run(2));
}

#[test]
fn outside_region_and_alpha_pass_through() {
    let mut source = even_levels(8, 8);
    for (i, px) in source.data.chunks_exact_mut(4).enumerate() {
        px[3] = (i * 3) as u8;
    }
    let region = Region::new(2, 2, 4, 4);
    let out = equalize(&source, region, &unbounded(), &CancelToken::new()).unwrap();

    for y in 0..8 {
        for x in 0..8 {
            let inside = (2..6).contains(&x) && (2..6).contains(&y);
            let (_, _, _, alpha) = out.frame.pixel(x, y);
            assert_eq!(alpha, source.pixel(x, y).3);
            if !inside {
                assert_eq!(out.frame.pixel(x, y), source.pixel(x, y));
            }
        }
    }
    assert_eq!(out.report.passes[0].remapped, 16);
}

#[test]
fn color_mode_processes_rgb_in_order() {
    let values: Vec<u8> = (0..64u32)
        .flat_map(|i| [(i * 4) as u8, (255 - i * 4) as u8, (i % 8 * 32) as u8, 255])
        .collect();
    let source = FrameBuffer::from_raw(8, 8, values).unwrap();
    let config = EqualizeConfig {
        grayscale: false,
        ..unbounded()
    };
    let out = equalize(&source, Region::full(&source), &config, &CancelToken::new()).unwrap();

    let order: Vec<Channel> = out.report.passes.iter().map(|p| p.channel).collect();
    assert_eq!(order, Channel::RGB.to_vec());
    for channel in Channel::RGB {
        let counts = level_counts(&out.frame, channel);
        assert_eq!(counts.iter().sum::<u32>(), 64);
        assert!(counts.iter().all(|&c| c <= 1), "{channel:?}");
    }
}

#[test]
fn run_again_adds_an_undenoised_pass() {
    let source = even_levels(16, 16);
    let config = EqualizeConfig {
        denoise: true,
        denoise_strength: 0.8,
        run_again: true,
        ..unbounded()
    };
    let out = equalize(&source, Region::full(&source), &config, &CancelToken::new()).unwrap();
    let passes = &out.report.passes;
    assert_eq!(passes.len(), 2);
    assert!(passes[0].denoised);
    assert!(!passes[1].denoised);
    assert_eq!(passes[1].pass, 1);
    assert_eq!(passes[1].diffusion.outcome, DiffuseOutcome::Balanced);

    let counts = level_counts(&out.frame, Channel::Red);
    assert_eq!(counts.iter().sum::<u32>(), 256);
    assert!(counts.iter().all(|&c| c == 1));
}

#[test]
fn mix_zero_returns_source() {
    let source = even_levels(16, 16);
    let config = EqualizeConfig { mix: 0.0, ..unbounded() };
    let out = equalize(&source, Region::full(&source), &config, &CancelToken::new()).unwrap();
    assert_eq!(out.frame, source);
}

#[test]
fn extrapolated_mix_moves_further() {
    let source = even_levels(32, 32);
    let region = Region::full(&source);
    let plain = equalize(&source, region, &unbounded(), &CancelToken::new()).unwrap();
    let config = EqualizeConfig { mix: 2.0, ..unbounded() };
    let pushed = equalize(&source, region, &config, &CancelToken::new()).unwrap();
    for y in 0..32 {
        for x in 0..32 {
            let s = f64::from(source.channel(x, y, Channel::Red));
            let c = f64::from(plain.frame.channel(x, y, Channel::Red));
            let expected = (s + (c - s) * 2.0).clamp(0.0, 255.0).round_ties_even() as u8;
            assert_eq!(pushed.frame.channel(x, y, Channel::Red), expected);
        }
    }
}

#[test]
fn cancelled_run_returns_source() {
    let source = even_levels(16, 16);
    let cancel = CancelToken::new();
    cancel.cancel();
    let out = equalize(&source, Region::full(&source), &unbounded(), &cancel).unwrap();
    assert!(out.report.cancelled);
    assert!(out.report.passes.is_empty());
    assert_eq!(out.frame, source);
}

#[test]
fn empty_region_is_a_noop() {
    let source = even_levels(4, 4);
    let out = equalize(&source, Region::new(1, 1, 0, 3), &unbounded(), &CancelToken::new()).unwrap();
    assert_eq!(out.frame, source);
    let pass = out.report.passes[0];
    assert_eq!(pass.remapped, 0);
    assert_eq!(pass.diffusion.iterations, 0);
    assert_eq!(pass.diffusion.outcome, DiffuseOutcome::Balanced);
}

#[test]
fn region_outside_frame_is_rejected() {
    let source = even_levels(4, 4);
    let err = equalize(&source, Region::new(3, 3, 2, 2), &unbounded(), &CancelToken::new());
    assert!(err.is_err());
}

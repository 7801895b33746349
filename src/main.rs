use std::env;
use std::f32::consts::PI;

use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rustfft::num_complex::Complex;

use rustydab::sync::{CarrierOffset, TimingLock};
use rustydab::{DabMode, SnapshotBuffer, SpectrumTransform, SyncEngine};

/// Synthesize a Mode I reference symbol: delayed in time, shifted by an
/// integer number of carrier bins, buried in complex AWGN.
fn synthesize(
    engine: &SyncEngine,
    delay: usize,
    bin_shift: i32,
    noise_sigma: f32,
) -> Vec<Complex<f32>> {
    let t_u = engine.params().t_u;
    let reference = engine.phase_table().reference();

    let mut spectrum = vec![Complex::new(0.0f32, 0.0); t_u];
    for (k, v) in reference.iter().enumerate() {
        let shifted = (k as i32 + bin_shift).rem_euclid(t_u as i32) as usize;
        spectrum[shifted] = *v;
    }

    let transform = SpectrumTransform::new(t_u);
    transform.inverse(&mut spectrum);

    let mut rng = rand::rngs::StdRng::seed_from_u64(0x0dab);
    let normal = Normal::new(0.0f32, noise_sigma).unwrap();
    let mut window = vec![Complex::new(0.0f32, 0.0); t_u];
    for (i, &v) in spectrum.iter().enumerate() {
        window[(i + delay) % t_u] = v;
    }
    for v in window.iter_mut() {
        *v += Complex::new(normal.sample(&mut rng), normal.sample(&mut rng));
    }
    window
}

fn main() {
    rustydab::tracing_init::init_tracing();

    let args: Vec<String> = env::args().collect();
    let noise_sigma: f32 = args.get(1).and_then(|a| a.parse().ok()).unwrap_or(0.005);
    let bin_shift: i32 = args.get(2).and_then(|a| a.parse().ok()).unwrap_or(0);

    let mut engine = SyncEngine::new(DabMode::ModeI, 42, 3, Some(Box::new(SnapshotBuffer::new())))
        .expect("Mode I parameters are valid");

    let t_g = engine.params().t_g;
    let delay = t_g + 17;
    let window = synthesize(&engine, delay, bin_shift, noise_sigma);

    println!("Mode I, injected delay {delay}, bin shift {bin_shift}, noise sigma {noise_sigma}");

    match engine
        .find_index(&window, 10)
        .expect("window length matches T_u")
    {
        TimingLock::Locked(index) => println!("Timing lock at sample {index}"),
        TimingLock::NotLocked { confidence } => {
            println!("No lock (peak/mean ratio {confidence:.2})");
            return;
        }
    }

    match engine
        .estimate_carrier_offset(&window)
        .expect("window length matches T_u")
    {
        CarrierOffset::Resolved(offset) => println!("Coarse offset: {offset} bins"),
        CarrierOffset::Inconclusive => println!("Coarse offset: inconclusive"),
    }

    let fine = engine
        .estimate_fine_offset(&window)
        .expect("window length matches T_u");
    println!(
        "Fine offset: {fine:.5} rad/bin ({:.1} Hz at 1 kHz spacing)",
        fine / (2.0 * PI) * 1000.0
    );
}

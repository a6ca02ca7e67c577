// Statistical checks on the SNR sweep. These push 10,000 symbols through
// several sweeps, so they are noticeably faster in release mode:
//   cargo test -p ofdmsim-core --test sweep_statistics_test --release

use ofdmsim_core::{Constellation, NoiseScaling, SimConfig, Transceiver};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SWEEP: [f64; 7] = [0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0];

fn random_payload(len: usize, seed: u64) -> Vec<u8> {
    let mut data = vec![0u8; len];
    ChaCha8Rng::seed_from_u64(seed).fill_bytes(&mut data);
    data
}

fn gray_qam_config(seed: u64) -> SimConfig {
    SimConfig {
        constellation: Constellation::GrayQam,
        sweep_snr_db: SWEEP.to_vec(),
        seed: Some(seed),
        ..Default::default()
    }
}

#[test]
fn test_error_rate_non_increasing_in_snr() {
    let _ = env_logger::builder().is_test(true).try_init();

    // 5000 bytes -> 10,000 16-QAM symbols
    let payload = random_payload(5000, 2024);
    let repetitions = 4;
    let mut mean = vec![0.0; SWEEP.len()];

    for rep in 0..repetitions {
        let transceiver = Transceiver::new(gray_qam_config(100 + rep)).expect("config");
        let tx = transceiver.transmit(&payload).expect("transmit");
        assert_eq!(tx.indices.len(), 10_000);
        let result = transceiver.sweep_parallel(&tx).expect("sweep");
        for (acc, rate) in mean.iter_mut().zip(result.error_rates()) {
            *acc += rate / repetitions as f64;
        }
    }

    // one-sided slack of ~3 standard errors at the worst case p = 0.5
    let slack = 3.0 * (0.25 / (10_000.0 * repetitions as f64)).sqrt();
    for pair in mean.windows(2) {
        assert!(pair[1] <= pair[0] + slack, "error rate rose with SNR: {:?}", mean);
    }
    assert!(mean[0] > 0.5, "0 dB should be mostly errors: {:?}", mean);
    assert!(mean[6] < 1e-3, "30 dB should be nearly error free: {:?}", mean);
}

#[test]
fn test_error_rate_tracks_16qam_theory() {
    // Nominal scaling adds 10^(-snr/10) per sample; the unscaled forward
    // transform sums 64 samples, so each axis sees variance 32·10^(-snr/10).
    let expected = [(10.0, 0.6775), (15.0, 0.4226), (20.0, 0.1123), (25.0, 0.0025)];

    let payload = random_payload(5000, 7);
    let config = SimConfig {
        sweep_snr_db: expected.iter().map(|&(snr, _)| snr).collect(),
        ..gray_qam_config(77)
    };
    let transceiver = Transceiver::new(config).expect("config");
    let tx = transceiver.transmit(&payload).expect("transmit");
    let result = transceiver.sweep(&tx).expect("sweep");

    for (&(snr, theory), point) in expected.iter().zip(result.points()) {
        assert_eq!(point.snr_db, snr);
        assert!(
            (point.error_rate - theory).abs() < 0.02,
            "SNR {} dB: measured {} theory {}",
            snr,
            point.error_rate,
            theory
        );
    }
}

#[test]
fn test_same_seed_same_rates_different_seed_same_keys() {
    let payload = random_payload(2000, 1);

    let run = |seed: u64| {
        let transceiver = Transceiver::new(gray_qam_config(seed)).expect("config");
        let tx = transceiver.transmit(&payload).expect("transmit");
        transceiver.sweep(&tx).expect("sweep")
    };

    let a = run(5);
    let b = run(5);
    let c = run(6);
    assert_eq!(a, b);
    assert_eq!(a.snr_values(), SWEEP.to_vec());
    assert_eq!(c.snr_values(), SWEEP.to_vec());
    assert_ne!(a.error_rates(), c.error_rates());
}

#[test]
fn test_signal_power_scaling_is_true_snr() {
    // At a true 20 dB SNR the 16-QAM grid (mean power 10) is barely touched,
    // whereas the nominal scale at 20 dB loses about one symbol in nine.
    let payload = random_payload(5000, 3);
    let measure = |noise_scaling: NoiseScaling| {
        let config = SimConfig {
            noise_scaling,
            sweep_snr_db: vec![20.0],
            ..gray_qam_config(31)
        };
        let transceiver = Transceiver::new(config).expect("config");
        let tx = transceiver.transmit(&payload).expect("transmit");
        transceiver.sweep(&tx).expect("sweep").points()[0].error_rate
    };

    let nominal = measure(NoiseScaling::Nominal);
    let true_snr = measure(NoiseScaling::SignalPower);
    assert!(nominal > 0.08, "nominal {}", nominal);
    assert!(true_snr < 0.01, "signal-power {}", true_snr);
}

use crate::channel::AwgnChannel;
use crate::config::{ByteRepacking, SimConfig};
use crate::error::Result;
use crate::framing::{frame_bytes, repack_values_as_bytes, repack_values_as_symbols};
use crate::mapper::SymbolMapper;
use crate::ofdm::{OfdmDemodulator, OfdmModulator};
use crate::sweep::{count_mismatches, error_rate, SweepEvaluator, SweepResult};
use rustfft::num_complex::Complex64;

/// Everything the transmit side produced for one payload
#[derive(Debug, Clone, PartialEq)]
pub struct Transmission {
    /// Payload bit count before padding
    pub num_bits: usize,
    pub indices: Vec<u32>,
    pub symbols: Vec<Complex64>,
    pub blocks: usize,
    pub waveform: Vec<Complex64>,
}

impl Transmission {
    pub fn num_bytes(&self) -> usize {
        self.num_bits / 8
    }
}

/// One pass through the channel and receiver
#[derive(Debug, Clone, PartialEq)]
pub struct Reception {
    pub snr_db: f64,
    pub waveform: Vec<Complex64>,
    /// Noisy recovered symbols, truncated to the transmitted symbol count
    pub symbols: Vec<Complex64>,
    pub values: Vec<i64>,
    pub errors: usize,
    pub error_rate: f64,
    pub payload: Vec<u8>,
}

/// The full OFDM pipeline for one validated configuration
pub struct Transceiver {
    config: SimConfig,
    mapper: Box<dyn SymbolMapper>,
    modulator: OfdmModulator,
    demodulator: OfdmDemodulator,
}

impl Transceiver {
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let mapper = config.constellation.mapper(config.bits_per_symbol());
        let modulator = OfdmModulator::new(config.subcarriers, config.cp_len)?;
        let demodulator = OfdmDemodulator::new(config.subcarriers, config.cp_len)?;
        Ok(Self {
            config,
            mapper,
            modulator,
            demodulator,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Bytes to time-domain waveform
    pub fn transmit(&self, payload: &[u8]) -> Result<Transmission> {
        let k = self.config.bits_per_symbol();
        let indices = frame_bytes(payload, k);
        let symbols = self.mapper.map_all(&indices)?;
        let grid = self.modulator.build_grid(&symbols)?;
        let blocks = self.modulator.to_time_domain(&grid)?;
        let waveform = OfdmModulator::flatten(&blocks);

        log::debug!(
            "transmit: {} bytes -> {} symbols -> {} blocks -> {} samples",
            payload.len(),
            indices.len(),
            blocks.len(),
            waveform.len()
        );

        Ok(Transmission {
            num_bits: payload.len() * 8,
            indices,
            symbols,
            blocks: blocks.len(),
            waveform,
        })
    }

    /// Channel the transmission at `snr_db` and recover the payload
    pub fn receive(&self, transmission: &Transmission, channel: &mut AwgnChannel, snr_db: f64) -> Result<Reception> {
        let waveform = channel.apply(&transmission.waveform, snr_db);
        let mut symbols = self.demodulator.demodulate(&waveform)?;
        symbols.truncate(transmission.indices.len());

        let values = self.mapper.demap_all(&symbols);
        let errors = count_mismatches(&transmission.indices, &values);
        let payload = match self.config.byte_repacking {
            ByteRepacking::Reference => repack_values_as_bytes(&values, transmission.num_bytes()),
            ByteRepacking::Symbols => {
                repack_values_as_symbols(&values, self.config.bits_per_symbol(), transmission.num_bits)
            }
        };

        log::debug!(
            "receive at {} dB: {} symbol errors, {} output bytes",
            snr_db,
            errors,
            payload.len()
        );

        Ok(Reception {
            snr_db,
            waveform,
            symbols,
            errors,
            error_rate: error_rate(errors, transmission.indices.len()),
            values,
            payload,
        })
    }

    /// Receive at the configured operating SNR with the configured seed
    pub fn receive_at_operating_point(&self, transmission: &Transmission) -> Result<Reception> {
        let mut channel = match self.config.seed {
            Some(seed) => AwgnChannel::seeded(self.config.noise_scaling, seed),
            None => AwgnChannel::new(self.config.noise_scaling),
        };
        self.receive(transmission, &mut channel, self.config.snr_db)
    }

    pub fn evaluator(&self) -> SweepEvaluator<'_> {
        SweepEvaluator::new(&self.demodulator, self.mapper.as_ref(), self.config.noise_scaling)
            .with_seed(self.config.seed)
    }

    /// Error rate at every configured sweep SNR
    pub fn sweep(&self, transmission: &Transmission) -> Result<SweepResult> {
        self.evaluator()
            .run(&transmission.indices, &transmission.waveform, &self.config.sweep_snr_db)
    }

    pub fn sweep_parallel(&self, transmission: &Transmission) -> Result<SweepResult> {
        self.evaluator()
            .run_parallel(&transmission.indices, &transmission.waveform, &self.config.sweep_snr_db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Constellation, NoiseScaling};
    use crate::error::SimError;

    #[test]
    fn test_rejects_invalid_config() {
        let config = SimConfig { cp_len: 100, ..Default::default() };
        assert!(matches!(Transceiver::new(config), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_transmit_shapes() {
        let transceiver = Transceiver::new(SimConfig::default()).unwrap();
        let tx = transceiver.transmit(&[0xAB; 100]).unwrap();
        assert_eq!(tx.num_bits, 800);
        assert_eq!(tx.indices.len(), 200);
        assert_eq!(tx.symbols.len(), 200);
        assert_eq!(tx.blocks, 4);
        assert_eq!(tx.waveform.len(), 4 * 80);
    }

    #[test]
    fn test_receive_truncates_to_symbol_count() {
        let config = SimConfig { seed: Some(3), ..Default::default() };
        let transceiver = Transceiver::new(config).unwrap();
        let tx = transceiver.transmit(b"abc").unwrap();
        let rx = transceiver.receive_at_operating_point(&tx).unwrap();
        assert_eq!(rx.symbols.len(), 6);
        assert_eq!(rx.values.len(), 6);
        assert_eq!(rx.waveform.len(), tx.waveform.len());
        assert_eq!(rx.payload.len(), 3);
    }

    #[test]
    fn test_gray_qam_symbol_repacking_round_trip() {
        let config = SimConfig {
            constellation: Constellation::GrayQam,
            byte_repacking: ByteRepacking::Symbols,
            noise_scaling: NoiseScaling::SignalPower,
            snr_db: 120.0,
            seed: Some(9),
            ..Default::default()
        };
        let transceiver = Transceiver::new(config).unwrap();
        let payload: Vec<u8> = (0..=255).collect();
        let tx = transceiver.transmit(&payload).unwrap();
        let rx = transceiver.receive_at_operating_point(&tx).unwrap();
        assert_eq!(rx.errors, 0);
        assert_eq!(rx.payload, payload);
    }

    #[test]
    fn test_sweep_uses_configured_snrs() {
        let config = SimConfig {
            sweep_snr_db: vec![0.0, 20.0],
            seed: Some(1),
            ..Default::default()
        };
        let transceiver = Transceiver::new(config).unwrap();
        let tx = transceiver.transmit(b"sweep me").unwrap();
        let result = transceiver.sweep(&tx).unwrap();
        assert_eq!(result.snr_values(), vec![0.0, 20.0]);
        assert_eq!(result, transceiver.sweep_parallel(&tx).unwrap());
    }
}

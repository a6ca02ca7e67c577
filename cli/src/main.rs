mod report;

use clap::{Args, Parser, Subcommand, ValueEnum};
use hound::WavSpec;
use ofdmsim_core::config::snr_range;
use ofdmsim_core::{
    spectrum, ByteRepacking, Complex64, Constellation, NoiseScaling, SimConfig, SweepResult, Transceiver,
};
use report::{SweepReport, TransmitReport};
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ofdmsim")]
#[command(about = "OFDM transceiver simulation over an AWGN channel")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure symbol error rate across a range of SNR values
    Sweep {
        /// Input binary file used as the bit source
        #[arg(value_name = "INPUT.BIN")]
        input: PathBuf,

        /// Write the sweep result as JSON
        #[arg(long, value_name = "PATH")]
        json: Option<PathBuf>,

        #[command(flatten)]
        sim: SimArgs,
    },

    /// Send a file through the channel once at the operating SNR
    Transmit {
        /// Input binary file
        #[arg(value_name = "INPUT.BIN")]
        input: PathBuf,

        /// Recovered binary file
        #[arg(value_name = "OUTPUT.BIN")]
        output: PathBuf,

        /// Write spectrum, constellation and waveforms as JSON
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,

        /// Write the real part of the transmitted waveform as a float WAV
        #[arg(long, value_name = "PATH")]
        tx_wav: Option<PathBuf>,

        /// Write the real part of the received waveform as a float WAV
        #[arg(long, value_name = "PATH")]
        rx_wav: Option<PathBuf>,

        #[command(flatten)]
        sim: SimArgs,
    },
}

#[derive(Args)]
struct SimArgs {
    /// Subcarriers per OFDM block (N)
    #[arg(long, default_value_t = ofdmsim_core::NUM_SUBCARRIERS)]
    subcarriers: usize,

    /// Cyclic prefix length in samples
    #[arg(long, default_value_t = ofdmsim_core::CP_LEN)]
    cp_len: usize,

    /// Constellation size M (power of two)
    #[arg(long, default_value_t = ofdmsim_core::MODULATION_ORDER)]
    order: usize,

    /// Operating SNR in dB for the single transmit pass
    #[arg(long, default_value_t = ofdmsim_core::OPERATING_SNR_DB, allow_negative_numbers = true)]
    snr: f64,

    /// First sweep SNR in dB
    #[arg(long, default_value_t = ofdmsim_core::SWEEP_SNR_START_DB, allow_negative_numbers = true)]
    snr_start: f64,

    /// Sweep stops before this SNR in dB
    #[arg(long, default_value_t = ofdmsim_core::SWEEP_SNR_STOP_DB, allow_negative_numbers = true)]
    snr_stop: f64,

    /// Sweep SNR step in dB
    #[arg(long, default_value_t = ofdmsim_core::SWEEP_SNR_STEP_DB)]
    snr_step: f64,

    /// Explicit comma-separated sweep SNR values, overriding start/stop/step
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    snr_values: Vec<f64>,

    #[arg(long, value_enum, default_value_t = ConstellationArg::Reference)]
    constellation: ConstellationArg,

    #[arg(long, value_enum, default_value_t = NoiseScalingArg::Nominal)]
    noise_scaling: NoiseScalingArg,

    #[arg(long, value_enum, default_value_t = RepackingArg::Reference)]
    repacking: RepackingArg,

    /// Fix the noise seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Run sweep trials concurrently
    #[arg(long)]
    parallel: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ConstellationArg {
    Reference,
    GrayQam,
}

#[derive(Clone, Copy, ValueEnum)]
enum NoiseScalingArg {
    Nominal,
    SignalPower,
}

#[derive(Clone, Copy, ValueEnum)]
enum RepackingArg {
    Reference,
    Symbols,
}

impl SimArgs {
    fn to_config(&self) -> ofdmsim_core::Result<SimConfig> {
        let sweep_snr_db = if self.snr_values.is_empty() {
            snr_range(self.snr_start, self.snr_stop, self.snr_step)?
        } else {
            self.snr_values.clone()
        };

        Ok(SimConfig {
            subcarriers: self.subcarriers,
            cp_len: self.cp_len,
            order: self.order,
            snr_db: self.snr,
            sweep_snr_db,
            constellation: match self.constellation {
                ConstellationArg::Reference => Constellation::Reference,
                ConstellationArg::GrayQam => Constellation::GrayQam,
            },
            noise_scaling: match self.noise_scaling {
                NoiseScalingArg::Nominal => NoiseScaling::Nominal,
                NoiseScalingArg::SignalPower => NoiseScaling::SignalPower,
            },
            byte_repacking: match self.repacking {
                RepackingArg::Reference => ByteRepacking::Reference,
                RepackingArg::Symbols => ByteRepacking::Symbols,
            },
            seed: self.seed,
            ..Default::default()
        })
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Sweep { input, json, sim } => sweep_command(&input, json.as_deref(), &sim)?,
        Commands::Transmit {
            input,
            output,
            report,
            tx_wav,
            rx_wav,
            sim,
        } => transmit_command(
            &input,
            &output,
            report.as_deref(),
            tx_wav.as_deref(),
            rx_wav.as_deref(),
            &sim,
        )?,
    }

    Ok(())
}

fn sweep_command(input_path: &Path, json_path: Option<&Path>, sim: &SimArgs) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(input_path)?;
    println!("Read {} bytes from {}", data.len(), input_path.display());

    let transceiver = Transceiver::new(sim.to_config()?)?;
    let tx = transceiver.transmit(&data)?;
    println!(
        "Transmitted {} symbols in {} OFDM blocks ({} samples)",
        tx.indices.len(),
        tx.blocks,
        tx.waveform.len()
    );

    let result = if sim.parallel {
        transceiver.sweep_parallel(&tx)?
    } else {
        transceiver.sweep(&tx)?
    };
    print_sweep_table(&result);

    if let Some(path) = json_path {
        let report = SweepReport::new(transceiver.config(), &result);
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        println!("Wrote sweep result to {}", path.display());
    }
    Ok(())
}

fn transmit_command(
    input_path: &Path,
    output_path: &Path,
    report_path: Option<&Path>,
    tx_wav_path: Option<&Path>,
    rx_wav_path: Option<&Path>,
    sim: &SimArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(input_path)?;
    println!("Read {} bytes from {}", data.len(), input_path.display());

    let transceiver = Transceiver::new(sim.to_config()?)?;
    let tx = transceiver.transmit(&data)?;
    let rx = transceiver.receive_at_operating_point(&tx)?;
    println!(
        "Received at {} dB: {} / {} symbol errors (rate {:.6})",
        rx.snr_db,
        rx.errors,
        tx.indices.len(),
        rx.error_rate
    );

    std::fs::write(output_path, &rx.payload)?;
    println!("Wrote {} bytes to {}", rx.payload.len(), output_path.display());
    if rx.payload != data {
        log::warn!("recovered payload differs from input");
    }

    let config = transceiver.config();
    if let Some(path) = report_path {
        let points = spectrum(&tx.waveform, config.sample_rate);
        let report = TransmitReport::new(config, &data, &tx, &rx, &points);
        std::fs::write(path, serde_json::to_string(&report)?)?;
        println!("Wrote report to {}", path.display());
    }
    if let Some(path) = tx_wav_path {
        write_wav(path, &tx.waveform, config.sample_rate)?;
        println!("Wrote transmitted waveform to {}", path.display());
    }
    if let Some(path) = rx_wav_path {
        write_wav(path, &rx.waveform, config.sample_rate)?;
        println!("Wrote received waveform to {}", path.display());
    }
    Ok(())
}

fn print_sweep_table(result: &SweepResult) {
    println!("SNR (dB)     BER");
    for point in result.points() {
        println!("{:>8.1}     {:.6}", point.snr_db, point.error_rate);
    }
}

/// Real part of a waveform as mono 32-bit float samples
fn write_wav(path: &Path, waveform: &[Complex64], sample_rate: f64) -> Result<(), Box<dyn std::error::Error>> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: sample_rate as u32,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let file = File::create(path)?;
    let mut writer = hound::WavWriter::new(file, spec)?;
    for sample in waveform {
        writer.write_sample(sample.re as f32)?;
    }
    writer.finalize()?;
    Ok(())
}

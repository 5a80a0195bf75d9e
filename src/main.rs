use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lora_tpc::logging::{log_debug, log_warn};
use lora_tpc::{
    init_logger, log_info, normalized_energy, run_batch, LinkParameters, MarginModel,
    SpreadingFactor, TpcController,
};
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lora-tpc")]
#[command(about = "Margin-driven SF/TP control for LoRa links")]
struct Cli {
    /// JSON configuration file (defaults are used when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide SF/TP for a single predicted SNR
    Decide {
        #[arg(long, allow_hyphen_values = true)]
        snr: f64,
        #[arg(long)]
        sf: Option<u8>,
        #[arg(long, allow_hyphen_values = true)]
        tp: Option<f64>,
    },
    /// Normalized energy of an operating point
    Energy {
        #[arg(long, allow_hyphen_values = true)]
        tp: f64,
        #[arg(long)]
        sf: u8,
        #[arg(long, allow_hyphen_values = true)]
        tp_ref: Option<f64>,
        #[arg(long)]
        sf_ref: Option<u8>,
    },
    /// Decide every row of a predictions CSV
    Batch {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Write the baseline comparison summary as JSON
        #[arg(long)]
        summary: Option<PathBuf>,
    },
    /// Print the effective configuration
    ShowConfig,
}

fn load_model(path: Option<&PathBuf>) -> Result<MarginModel> {
    match path {
        Some(path) => MarginModel::from_file(path)
            .with_context(|| format!("Loading configuration from {}", path.display())),
        None => Ok(MarginModel::default()),
    }
}

fn main() -> Result<()> {
    init_logger();

    let cli = Cli::parse();
    let model = load_model(cli.config.as_ref())?;
    log_debug(&format!("Margin model: {model:?}"));
    let controller = TpcController::with_model(model);

    match cli.command {
        Commands::Decide { snr, sf, tp } => {
            let sf = sf.map(SpreadingFactor::try_from).transpose()?;
            let decision = lora_tpc::decide(controller.model(), snr, sf, tp);
            if !decision.is_link_safe() {
                log_warn(&format!(
                    "Margin {} dB is negative at {}",
                    decision.me_db,
                    decision.params()
                ));
            }
            let out = json!({
                "sf": decision.sf,
                "tp": decision.tp_dbm,
                "me": decision.me_db,
                "energy_norm": controller.energy_norm(&decision),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Commands::Energy {
            tp,
            sf,
            tp_ref,
            sf_ref,
        } => {
            let baseline = controller.model().baseline();
            let point = LinkParameters::new(SpreadingFactor::try_from(sf)?, tp);
            let reference = LinkParameters::new(
                sf_ref.map(SpreadingFactor::try_from).transpose()?.unwrap_or(baseline.sf),
                tp_ref.unwrap_or(baseline.tp_dbm),
            );
            let ratio = normalized_energy(point.tp_dbm, point.sf, reference.tp_dbm, reference.sf);
            println!("{ratio}");
        }
        Commands::Batch {
            input,
            output,
            summary,
        } => {
            let report = run_batch(&controller, &input, &output)
                .with_context(|| format!("Running batch on {}", input.display()))?;
            if report.decisions.is_empty() {
                log_warn(&format!("No predictions in {}, skipping summary", input.display()));
            } else {
                let stats = report.summarize(&controller)?;
                print!("{}", stats.render());
                if let Some(path) = summary {
                    std::fs::write(&path, serde_json::to_string_pretty(&stats)?)
                        .with_context(|| format!("Writing summary to {}", path.display()))?;
                    log_info(&format!("Saved summary: {}", path.display()));
                }
            }
            log_info(&format!("Saved decisions: {}", output.display()));
        }
        Commands::ShowConfig => {
            println!(
                "{}",
                serde_json::to_string_pretty(&controller.model().to_config())?
            );
        }
    }

    Ok(())
}

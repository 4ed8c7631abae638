use captcha::{CaptchaConfig, SliderSolver, backend::ort::OrtBackend, logging::setup_logging};
use clap::Parser;
use std::path::PathBuf;

/// Solve a slider captcha and print the drag distance as JSON
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Captcha background image (PNG or JPEG)
    #[arg(long)]
    image: PathBuf,

    /// ONNX model path, overrides MODEL_PATH
    #[arg(long)]
    model: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = CaptchaConfig::from_env();
    if let Some(model) = args.model {
        config.model_path = model;
    }

    setup_logging(&config);

    tracing::info!(
        config = ?config,
        "Loaded configuration"
    );

    let backend = OrtBackend::load_model(&config.model_path)?;
    let mut solver = SliderSolver::from_config(backend, &config);

    let image_bytes = std::fs::read(&args.image)?;
    let distance = solver.solve(&image_bytes)?;

    println!("{}", serde_json::json!({ "distance": distance }));

    Ok(())
}

mod cli;
mod convert;
mod pipeline;

use anyhow::Result;
use cli::{Args, Command};
use convert::ConvertConfig;
use pipeline::batch::BatchConfig;

fn main() -> Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args = Args::parse_args();

    match args.command {
        Command::Infer(infer) => {
            let config = BatchConfig {
                input_dir: infer.input_dir,
                output_dir: infer.output_dir,
                person_model_path: infer.person_model_path,
                ppe_model_path: infer.ppe_model_path,
                min_confidence: infer.min_confidence,
                workers: infer.workers,
                font_path: infer.font_path,
            };
            pipeline::batch::run_batch(&config)?;
        }
        Command::Convert(convert_args) => {
            let config = ConvertConfig {
                input_dir: convert_args.input_dir,
                output_dir: convert_args.output_dir,
            };
            convert::run_convert(&config)?;
        }
    }

    Ok(())
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run person + PPE detection over a directory of images
    Infer(InferArgs),
    /// Convert a PascalVOC corpus into person/PPE YOLO datasets
    Convert(ConvertArgs),
}

#[derive(Parser, Debug)]
pub struct InferArgs {
    /// Directory containing input images
    #[arg(long, env = "PPE_VISION_INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Directory for annotated output images
    #[arg(long, env = "PPE_VISION_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Path to the person detection model
    #[arg(long)]
    pub person_model_path: String,

    /// Path to the PPE detection model
    #[arg(long)]
    pub ppe_model_path: String,

    /// Minimum confidence for a detection to be kept
    #[arg(long, default_value_t = 0.25)]
    pub min_confidence: f32,

    /// Number of inference worker threads (each loads its own models)
    #[arg(long, default_value_t = 1)]
    pub workers: usize,

    /// TTF font used for label text (falls back to system fonts)
    #[arg(long, env = "PPE_VISION_FONT")]
    pub font_path: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Corpus root containing "images" and "labels" subdirectories
    #[arg(long)]
    pub input_dir: PathBuf,

    /// Output root for the person_detection and ppe_detection datasets
    #[arg(long)]
    pub output_dir: PathBuf,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

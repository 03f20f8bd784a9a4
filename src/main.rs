use clap::{Parser, Subcommand};
use detmetrics_core::BoxFormat;
use std::path::PathBuf;

mod commands;

/// Detection metrics: IoU, non-max suppression and mean average precision
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// IoU of two boxes
    Iou {
        /// First box, four comma-separated coordinates
        #[arg(long, value_name = "C0,C1,C2,C3")]
        a: String,
        /// Second box, four comma-separated coordinates
        #[arg(long, value_name = "C0,C1,C2,C3")]
        b: String,
        /// corners (x1,y1,x2,y2) or midpoint (cx,cy,w,h)
        #[arg(long, default_value = "corners")]
        format: BoxFormat,
    },
    /// Non-max suppression over a JSON file of [class, score, c0, c1, c2, c3] rows
    Nms {
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        #[arg(long, default_value = "0.5", value_name = "THRESHOLD")]
        iou_threshold: f64,
        /// Boxes scoring at or below this are dropped
        #[arg(long, default_value = "0.0", value_name = "THRESHOLD")]
        score_threshold: f64,
        #[arg(long, default_value = "corners")]
        format: BoxFormat,
    },
    /// Mean average precision of detections against ground truth
    Map {
        /// JSON rows [image, class, score, c0, c1, c2, c3]
        #[arg(long, value_name = "FILE")]
        detections: PathBuf,
        /// JSON rows [image, class, c0, c1, c2, c3]
        #[arg(long, value_name = "FILE")]
        ground_truths: PathBuf,
        /// JSON evaluation config; flags below override it
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        #[arg(long, value_name = "THRESHOLD")]
        iou_threshold: Option<f64>,
        #[arg(long)]
        format: Option<BoxFormat>,
        #[arg(long, value_name = "COUNT")]
        num_classes: Option<usize>,
        /// Average over IoU thresholds 0.50:0.05:0.95
        #[arg(long)]
        coco: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let output = match cli.command {
        Command::Iou { a, b, format } => commands::iou(&a, &b, format)?,
        Command::Nms {
            input,
            iou_threshold,
            score_threshold,
            format,
        } => commands::nms(&input, iou_threshold, score_threshold, format)?,
        Command::Map {
            detections,
            ground_truths,
            config,
            iou_threshold,
            format,
            num_classes,
            coco,
        } => {
            let overrides = commands::MapOverrides {
                iou_threshold,
                format,
                num_classes,
                coco,
            };
            commands::map(&detections, &ground_truths, config.as_deref(), overrides)?
        }
    };

    println!("{}", output);
    Ok(())
}

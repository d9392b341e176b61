mod args;

use {
    args::Args,
    base::{CancelToken, log},
    candle_core::Device,
    clap::Parser,
    gesture::{TrainConfig, read_csv, train},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    base::init_stdout_logger();
    let args = Args::parse();

    let train_rows = read_csv(&args.train_data_path)?;
    let test_rows = read_csv(&args.test_data_path)?;
    log::info!(
        "Loaded {} train rows from {} and {} test rows from {}",
        train_rows.len(),
        args.train_data_path.display(),
        test_rows.len(),
        args.test_data_path.display()
    );

    let device = Device::cuda_if_available(0)?;
    let config = TrainConfig::new(args.epochs, args.n_classes, train_rows, test_rows);
    let model = train(&config, &device, &CancelToken::new(), |progress| {
        println!(
            "epoch {:>3}/{}  loss {:.4}  accuracy {:.3}",
            progress.epoch + 1,
            progress.epoch_count,
            progress.loss,
            progress.accuracy
        );
    })?;

    match model.report().evaluation {
        Some(evaluation) => println!(
            "test: loss {:.4}  accuracy {:.3} ({} rows)",
            evaluation.loss, evaluation.accuracy, evaluation.sample_count
        ),
        None => println!("test: no rows"),
    }

    model.save(&args.model_save_path)?;
    println!("Model saved to {}", args.model_save_path.display());
    Ok(())
}

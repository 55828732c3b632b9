use clap::{Parser, Subcommand};
use nalgebra::DMatrix;
use std::collections::HashMap;

use crt_tensor_mpc::protocol::io::{decode_output, encode_input};
use crt_tensor_mpc::{EngineConfig, Engine};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Fractional precision bits; defaults to the source's 16.16 config.
    #[arg(long = "fractional-bits", default_value_t = 16)]
    fractional_bits: u32,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// dot([[1.5, -2.25]], [[2.0], [4.0]]) -> [[-6.0]]
    Dot,
    /// sigmoid([0.0, 1.0, -1.0])
    Sigmoid,
}

fn main() {
    env_logger::builder().filter_level(log::LevelFilter::Info).init();
    let cli = Cli::parse();

    let m = vec![1201, 1433, 1217, 1237, 1321, 1103, 1129, 1367, 1093, 1039];
    let config = EngineConfig::new(m, 16, cli.fractional_bits, 20, 1024, HashMap::new())
        .expect("demo CRT parameters must satisfy the engine invariants");
    let mut engine = Engine::new(config.clone());

    match cli.command {
        Commands::Dot => {
            let x = DMatrix::from_row_slice(1, 2, &[1.5, -2.25]);
            let y = DMatrix::from_row_slice(2, 1, &[2.0, 4.0]);

            let (_, x) = engine.define_input(encode_input(&x, &config));
            let (_, y) = engine.define_input(encode_input(&y, &config));

            let z = engine.dot(x, y).expect("shapes are compatible for a 1x2 . 2x1 dot");
            let revealed = engine.reveal(z);
            log::debug!("dot result placed on {}", revealed.role());
            let decoded = decode_output(revealed.as_ref(), &config);
            log::info!("dot(x, y) revealed = {decoded}");
        }
        Commands::Sigmoid => {
            let x = DMatrix::from_row_slice(1, 3, &[0.0, 1.0, -1.0]);
            let (_, x) = engine.define_input(encode_input(&x, &config));

            let y = engine.sigmoid(x).expect("sigmoid never fails to build");
            let revealed = engine.reveal(y);
            log::debug!("sigmoid result placed on {}", revealed.role());
            let decoded = decode_output(revealed.as_ref(), &config);
            log::info!("sigmoid(x) revealed = {decoded}");
        }
    }
}

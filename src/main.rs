use clap::Parser;
use pallet_loader::{compare, generate, solver};

#[derive(Parser, Debug)]
#[command(version, about)]
enum Command {
    /// Write a random TruckAndPallets/Pallets dataset pair
    Generate(generate::Options),
    /// Solve one dataset with one algorithm
    Solve(solver::Options),
    /// Run every algorithm on one dataset and compare the results
    Compare(compare::Options),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stdout);
    builder.init();

    let command = Command::parse();

    match command {
        Command::Generate(options) => generate::run(&options)?,
        Command::Solve(options) => solver::run(&options)?,
        Command::Compare(options) => compare::run(&options)?,
    }

    Ok(())
}

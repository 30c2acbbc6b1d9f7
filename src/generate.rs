use crate::dataset;
use crate::solver::problem::{Item, Problem};
use clap::{Parser, ValueEnum};
use log::info;
use rand::distributions::Uniform;
use rand::prelude::*;
use std::path::PathBuf;

#[derive(ValueEnum, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Correlation {
    None,
    Some,
}

#[derive(Parser, Debug)]
pub struct Options {
    /// How the weight and profit of the pallets should correlate.
    /// If choosing some, use the coeff argument to determine
    /// amount of correlation
    #[arg(long, value_enum, default_value_t = Correlation::None)]
    correlation: Correlation,

    #[arg(long, default_value_t = 0.1)]
    coeff: f32,

    /// How many pallets to generate
    #[arg(short = 'n', long, default_value_t = 30)]
    item_count: usize,

    /// Capacity for the truck.
    /// If unspecified, use the weight sum proportion
    #[arg(short, long)]
    capacity: Option<usize>,

    /// Capacity, by default is proportion of sum of pallet weights
    #[arg(long, default_value_t = 0.5)]
    capacity_ratio: f32,

    /// Upper bound on weight
    #[arg(short, long, default_value_t = 100)]
    weight_bound: usize,

    /// Upper bound on profit
    #[arg(short, long, default_value_t = 100)]
    profit_bound: usize,

    /// Lower bound for profits, between 0 and 1.0,
    /// scaled with profit_bound
    #[arg(long, default_value_t = 0.0)]
    profit_t_lower_bound: f32,

    /// Seed for reproducible datasets
    #[arg(long)]
    seed: Option<u64>,

    /// Dataset number NN used in the file names
    #[arg(short, long, default_value_t = 1)]
    dataset: u32,

    /// Where to write the dataset files
    #[arg(short, long, default_value = "datasets")]
    output_dir: PathBuf,
}

pub fn run(options: &Options) -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let items = match options.correlation {
        Correlation::None => no_correlation(options, &mut rng),
        Correlation::Some => correlation(options, &mut rng),
    };
    let weight_sum: usize = items.iter().map(|i| i.weight).sum();

    let capacity = if let Some(c) = options.capacity {
        c
    } else {
        (options.capacity_ratio * weight_sum as f32).ceil() as usize
    };
    println!("Weight Sum: {}, Capacity: {}", weight_sum, capacity);

    std::fs::create_dir_all(&options.output_dir)?;
    let problem = Problem::new(items, capacity);
    let (truck, pallets) = dataset::write_pair(&options.output_dir, options.dataset, &problem)?;
    info!("wrote {} and {}", truck.display(), pallets.display());

    Ok(())
}

fn profit_floor(options: &Options) -> usize {
    let floor = (options.profit_t_lower_bound.clamp(0.0, 1.0) * options.profit_bound as f32) as usize;
    floor.min(options.profit_bound.saturating_sub(1))
}

fn no_correlation<R: Rng>(options: &Options, rng: &mut R) -> Vec<Item> {
    let profit_distribution = Uniform::from(profit_floor(options)..options.profit_bound.max(1));
    // No zero weights
    let weight_distribution = Uniform::from(1..options.weight_bound.max(2));
    (0..options.item_count)
        .map(|index| {
            let profit = profit_distribution.sample(rng);
            let weight = weight_distribution.sample(rng);
            Item::new(index + 1, weight, profit)
        })
        .collect()
}

fn correlation<R: Rng>(options: &Options, rng: &mut R) -> Vec<Item> {
    let t_lower = options.profit_t_lower_bound.clamp(0.0, 1.0);
    let t_distribution = Uniform::from(t_lower..=1f32);
    let offset_distribution = Uniform::from(-1.0..1.0f32);
    let profit_bound_f32 = options.profit_bound as f32;
    let weight_bound_f32 = options.weight_bound as f32;
    (0..options.item_count)
        .map(|index| {
            let profit_t = t_distribution.sample(rng);
            let offset = offset_distribution.sample(rng);

            let weight_t = (profit_t + profit_t * options.coeff * offset).clamp(0.0, 1.0);
            let profit = (profit_t * profit_bound_f32) as usize;
            // No zero weights
            let weight = 1.max((weight_t * weight_bound_f32) as usize);
            Item::new(index + 1, weight, profit)
        })
        .collect()
}

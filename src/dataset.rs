//! Reading and writing the two-file CSV dataset format, plus console entry.
//!
//! `TruckAndPallets_NN.csv` holds a header and one `capacity,pallet_count`
//! row; `Pallets_NN.csv` holds a header and one `id,weight,profit` row per
//! pallet.

use crate::error::DatasetError;
use crate::solver::problem::{Item, Problem};
use clap::Args;
use log::debug;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// A loaded problem and the pallet limit entered with it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub problem: Problem,
    pub max_count: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct Source {
    /// Directory holding TruckAndPallets_NN.csv / Pallets_NN.csv pairs
    #[arg(long, default_value = "datasets")]
    pub dataset_dir: PathBuf,

    /// Dataset number NN to load from the dataset directory
    #[arg(short, long)]
    pub dataset: Option<u32>,

    /// Explicit truck file, instead of a dataset number
    #[arg(long, requires = "pallets_file", conflicts_with = "dataset")]
    pub truck_file: Option<PathBuf>,

    /// Explicit pallets file, instead of a dataset number
    #[arg(long, requires = "truck_file", conflicts_with = "dataset")]
    pub pallets_file: Option<PathBuf>,

    /// Type the dataset in on the console
    #[arg(short, long, conflicts_with_all = ["dataset", "truck_file"])]
    pub interactive: bool,
}

impl Source {
    pub fn load(&self) -> Result<Dataset, DatasetError> {
        if self.interactive {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            return read_console(stdin.lock(), stdout.lock());
        }
        if let (Some(truck), Some(pallets)) = (&self.truck_file, &self.pallets_file) {
            return read_pair(truck, pallets);
        }
        match self.dataset {
            Some(number) => {
                let (truck, pallets) = dataset_paths(&self.dataset_dir, number);
                read_pair(&truck, &pallets)
            }
            None => Err(DatasetError::NoInput),
        }
    }
}

/// Paths of the truck and pallets files for dataset `number`.
pub fn dataset_paths(dir: &Path, number: u32) -> (PathBuf, PathBuf) {
    (
        dir.join(format!("TruckAndPallets_{:02}.csv", number)),
        dir.join(format!("Pallets_{:02}.csv", number)),
    )
}

fn reader(path: &Path) -> Result<csv::Reader<std::fs::File>, DatasetError> {
    let file = std::fs::File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file))
}

fn field(
    record: &csv::StringRecord,
    position: usize,
    name: &'static str,
    path: &Path,
) -> Result<usize, DatasetError> {
    let value = record.get(position).unwrap_or("");
    value.parse::<usize>().map_err(|_| DatasetError::Parse {
        path: path.to_path_buf(),
        line: record.position().map_or(0, |p| p.line()),
        field: name,
        value: value.to_string(),
    })
}

/// Reads `(capacity, pallet_count)` from a truck file.
pub fn read_truck(path: &Path) -> Result<(usize, usize), DatasetError> {
    let mut rdr = reader(path)?;
    let mut truck = None;
    for record in rdr.records() {
        let record = record.map_err(|source| DatasetError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        // The last data row wins
        truck = Some((
            field(&record, 0, "capacity", path)?,
            field(&record, 1, "pallet count", path)?,
        ));
    }
    truck.ok_or_else(|| DatasetError::Empty(path.to_path_buf()))
}

pub fn read_pallets(path: &Path) -> Result<Vec<Item>, DatasetError> {
    let mut rdr = reader(path)?;
    let mut items = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|source| DatasetError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        items.push(Item::new(
            field(&record, 0, "pallet id", path)?,
            field(&record, 1, "weight", path)?,
            field(&record, 2, "profit", path)?,
        ));
    }
    Ok(items)
}

pub fn read_pair(truck: &Path, pallets: &Path) -> Result<Dataset, DatasetError> {
    let (capacity, declared) = read_truck(truck)?;
    let items = read_pallets(pallets)?;
    if items.len() != declared {
        return Err(DatasetError::CountMismatch {
            path: truck.to_path_buf(),
            declared,
            found: items.len(),
        });
    }
    debug!(
        "loaded {} pallets, capacity {} from {}",
        items.len(),
        capacity,
        pallets.display()
    );
    Ok(Dataset {
        problem: Problem::checked(items, capacity)?,
        max_count: None,
    })
}

fn csv_error(path: &Path) -> impl FnOnce(csv::Error) -> DatasetError {
    let path = path.to_path_buf();
    move |source| DatasetError::Csv { path, source }
}

/// Writes dataset `number` into `dir`, returning the two file paths.
pub fn write_pair(
    dir: &Path,
    number: u32,
    problem: &Problem,
) -> Result<(PathBuf, PathBuf), DatasetError> {
    let (truck, pallets) = dataset_paths(dir, number);

    let mut wtr = csv::Writer::from_path(&truck).map_err(csv_error(&truck))?;
    wtr.write_record(["Capacity", "Pallets"])
        .map_err(csv_error(&truck))?;
    wtr.write_record([problem.capacity.to_string(), problem.items.len().to_string()])
        .map_err(csv_error(&truck))?;
    wtr.flush().map_err(|source| DatasetError::Io {
        path: truck.clone(),
        source,
    })?;

    let mut wtr = csv::Writer::from_path(&pallets).map_err(csv_error(&pallets))?;
    wtr.write_record(["Pallet", "Weight", "Profit"])
        .map_err(csv_error(&pallets))?;
    for item in &problem.items {
        wtr.write_record([
            item.id.to_string(),
            item.weight.to_string(),
            item.profit.to_string(),
        ])
        .map_err(csv_error(&pallets))?;
    }
    wtr.flush().map_err(|source| DatasetError::Io {
        path: pallets.clone(),
        source,
    })?;

    Ok((truck, pallets))
}

/// Whitespace separated tokens pulled from a line based reader.
struct Tokens<R> {
    input: R,
    pending: Vec<String>,
}

impl<R: BufRead> Tokens<R> {
    fn new(input: R) -> Tokens<R> {
        Tokens {
            input,
            pending: Vec::new(),
        }
    }

    fn next(&mut self) -> Result<String, DatasetError> {
        while self.pending.is_empty() {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(DatasetError::UnexpectedEnd);
            }
            self.pending = line.split_whitespace().rev().map(String::from).collect();
        }
        Ok(self.pending.pop().unwrap_or_default())
    }

    fn discard_line(&mut self) {
        self.pending.clear();
    }

    /// Reads `count` numbers, re-prompting until they all parse and pass
    /// `accept`.
    fn numbers<W: Write>(
        &mut self,
        count: usize,
        accept: fn(usize) -> bool,
        retry: &str,
        output: &mut W,
    ) -> Result<Vec<usize>, DatasetError> {
        'attempt: loop {
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                match self.next()?.parse::<usize>() {
                    Ok(v) if accept(v) => values.push(v),
                    _ => {
                        self.discard_line();
                        write!(output, "{}", retry)?;
                        output.flush()?;
                        continue 'attempt;
                    }
                }
            }
            return Ok(values);
        }
    }
}

fn any(_: usize) -> bool {
    true
}

fn positive(v: usize) -> bool {
    v > 0
}

/// Prompts for capacity, pallet limit, pallet count and one
/// `id weight profit` line per pallet.
pub fn read_console<R: BufRead, W: Write>(
    input: R,
    mut output: W,
) -> Result<Dataset, DatasetError> {
    let mut tokens = Tokens::new(input);
    let retry = "Invalid input. Please enter a positive integer: ";

    writeln!(output, "\n===== INTERACTIVE INPUT MODE =====")?;
    write!(output, "Enter truck capacity (max weight): ")?;
    output.flush()?;
    let capacity = tokens.numbers(1, any, retry, &mut output)?[0];

    write!(output, "Enter maximum number of pallets allowed: ")?;
    output.flush()?;
    let max_count = tokens.numbers(1, positive, retry, &mut output)?[0];

    write!(output, "Enter number of pallets: ")?;
    output.flush()?;
    let n = tokens.numbers(1, positive, retry, &mut output)?[0];

    writeln!(output, "\nEnter pallet details (ID Weight Profit):")?;
    let mut items = Vec::with_capacity(n);
    for i in 0..n {
        write!(output, "Pallet {}: ", i + 1)?;
        output.flush()?;
        let values = tokens.numbers(
            3,
            any,
            "Invalid input. Please enter three integers (ID Weight Profit): ",
            &mut output,
        )?;
        items.push(Item::new(values[0], values[1], values[2]));
    }

    Ok(Dataset {
        problem: Problem::checked(items, capacity)?,
        max_count: Some(max_count),
    })
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn dataset_paths_are_zero_padded() {
        let (truck, pallets) = dataset_paths(Path::new("data"), 3);
        assert_eq!(truck, Path::new("data/TruckAndPallets_03.csv"));
        assert_eq!(pallets, Path::new("data/Pallets_03.csv"));
        let (truck, _) = dataset_paths(Path::new("data"), 10);
        assert_eq!(truck, Path::new("data/TruckAndPallets_10.csv"));
    }

    #[test]
    fn console_entry() {
        let input = "100\n2\n3\n1 10 60\n2 20 100\n3 30 120\n";
        let mut output = Vec::new();
        let dataset = read_console(Cursor::new(input), &mut output).unwrap();
        assert_eq!(dataset.max_count, Some(2));
        assert_eq!(dataset.problem.capacity, 100);
        assert_eq!(dataset.problem.items[2], Item::new(3, 30, 120));
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Pallet 3: "));
    }

    #[test]
    fn console_entry_reprompts_on_bad_tokens() {
        let input = "lots\n50\n0\n1\n1\n1 x 3\n1 2 3\n";
        let mut output = Vec::new();
        let dataset = read_console(Cursor::new(input), &mut output).unwrap();
        assert_eq!(dataset.problem.capacity, 50);
        assert_eq!(dataset.max_count, Some(1));
        assert_eq!(dataset.problem.items, vec![Item::new(1, 2, 3)]);
        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches("Invalid input").count(), 3);
    }

    #[test]
    fn console_entry_stops_at_end_of_input() {
        let result = read_console(Cursor::new("10\n"), Vec::new());
        assert!(matches!(result, Err(DatasetError::UnexpectedEnd)));
    }
}

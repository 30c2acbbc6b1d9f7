use pallet_loader::dataset::{dataset_paths, read_pair, write_pair};
use pallet_loader::{DatasetError, Item, Problem};
use std::fs;
use std::path::PathBuf;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "pallet-loader-dataset-{}-{}",
        std::process::id(),
        name
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn written_dataset_reads_back() {
    let dir = scratch_dir("round-trip");
    let problem = Problem::new(
        vec![Item::new(1, 10, 60), Item::new(2, 20, 100), Item::new(3, 30, 120)],
        50,
    );
    let (truck, pallets) = write_pair(&dir, 4, &problem).unwrap();
    assert_eq!((truck.clone(), pallets.clone()), dataset_paths(&dir, 4));

    let text = fs::read_to_string(&truck).unwrap();
    assert_eq!(text, "Capacity,Pallets\n50,3\n");

    let dataset = read_pair(&truck, &pallets).unwrap();
    assert_eq!(dataset.problem, problem);
    assert_eq!(dataset.max_count, None);
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn reads_hand_written_files_with_spaces() {
    let dir = scratch_dir("spaces");
    let (truck, pallets) = dataset_paths(&dir, 1);
    fs::write(&truck, "Capacity, Pallets\n 100 , 2\n").unwrap();
    fs::write(&pallets, "Pallet,Weight,Profit\n1, 10, 5\n2,20 ,7\n").unwrap();

    let dataset = read_pair(&truck, &pallets).unwrap();
    assert_eq!(dataset.problem.capacity, 100);
    assert_eq!(dataset.problem.items[1], Item::new(2, 20, 7));
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn declared_count_must_match() {
    let dir = scratch_dir("mismatch");
    let (truck, pallets) = dataset_paths(&dir, 2);
    fs::write(&truck, "Capacity,Pallets\n100,3\n").unwrap();
    fs::write(&pallets, "Pallet,Weight,Profit\n1,10,5\n2,20,7\n").unwrap();

    let result = read_pair(&truck, &pallets);
    assert!(matches!(
        result,
        Err(DatasetError::CountMismatch {
            declared: 3,
            found: 2,
            ..
        })
    ));
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn malformed_rows_are_reported() {
    let dir = scratch_dir("malformed");
    let (truck, pallets) = dataset_paths(&dir, 3);
    fs::write(&truck, "Capacity,Pallets\n100,1\n").unwrap();
    fs::write(&pallets, "Pallet,Weight,Profit\n1,heavy,5\n").unwrap();

    match read_pair(&truck, &pallets) {
        Err(DatasetError::Parse { field, value, .. }) => {
            assert_eq!(field, "weight");
            assert_eq!(value, "heavy");
        }
        other => panic!("unexpected result {:?}", other),
    }

    fs::write(&truck, "Capacity,Pallets\n").unwrap();
    assert!(matches!(
        read_pair(&truck, &pallets),
        Err(DatasetError::Empty(_))
    ));
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_files_are_io_errors() {
    let dir = scratch_dir("missing");
    let (truck, pallets) = dataset_paths(&dir, 9);
    assert!(matches!(
        read_pair(&truck, &pallets),
        Err(DatasetError::Io { .. })
    ));
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn overflowing_profit_totals_are_rejected() {
    let dir = scratch_dir("overflow");
    let (truck, pallets) = dataset_paths(&dir, 5);
    fs::write(&truck, "Capacity,Pallets\n10,2\n").unwrap();
    fs::write(
        &pallets,
        format!("Pallet,Weight,Profit\n1,1,{}\n2,1,1\n", usize::MAX),
    )
    .unwrap();

    assert!(matches!(
        read_pair(&truck, &pallets),
        Err(DatasetError::Invalid(_))
    ));
    fs::remove_dir_all(&dir).unwrap();
}

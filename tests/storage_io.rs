use rust_decimal::Decimal;
use std::fs;
use std::str::FromStr;
use wbi_literacy::models::{Country, Metric};
use wbi_literacy::{CountryStore, Database, SqliteCountryStore, storage};

fn sample() -> Vec<Country> {
    vec![
        Country::new("USA", "United States")
            .unwrap()
            .with_metric(Metric::InternetUsers, Some(Decimal::from_str("87.00").unwrap()))
            .with_metric(Metric::AdultLiteracyRate, Some(Decimal::from_str("99.00").unwrap())),
        Country::new("ZWE", "Zimbabwe")
            .unwrap()
            .with_metric(Metric::AdultLiteracyRate, Some(Decimal::from_str("86.50").unwrap())),
    ]
}

#[test]
fn save_csv_and_json() {
    let rows = sample();
    let tmp = tempfile::tempdir().unwrap();

    let csv_path = tmp.path().join("countries.csv");
    storage::save_csv(&rows, &csv_path).unwrap();
    let csv_txt = fs::read_to_string(&csv_path).unwrap();
    assert!(csv_txt.starts_with("code,name,internet_users,adult_literacy_rate"));
    assert_eq!(csv_txt.lines().count(), 1 + rows.len());
    assert!(csv_txt.contains("ZWE,Zimbabwe,,86.50"));

    let json_path = tmp.path().join("countries.json");
    storage::save_json(&rows, &json_path).unwrap();
    let v: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    let arr = v.as_array().unwrap();
    assert_eq!(arr.len(), rows.len());
    assert_eq!(arr[1]["code"], "ZWE");
    assert!(arr[1]["internet_users"].is_null());
}

// Cells starting with =, +, - or @ are executed as formulas by spreadsheet
// applications. They are written with a leading single quote instead.
#[test]
fn csv_cells_are_prefixed_to_avoid_formulas() {
    let rows = vec![Country::new("@XY", "=HYPERLINK(\"http://evil\")").unwrap()];
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("injection.csv");
    storage::save_csv(&rows, &path).unwrap();

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let row = rdr.records().next().expect("one data row expected").unwrap();
    assert_eq!(&row[0], "'@XY");
    assert!(row[1].starts_with("'=HYPERLINK"));

    // and they come back unchanged
    assert_eq!(storage::load_csv(&path).unwrap(), rows);
}

#[test]
fn import_upserts_into_store() {
    let tmp = tempfile::tempdir().unwrap();
    let csv_path = tmp.path().join("seed.csv");
    fs::write(
        &csv_path,
        "code,name,internet_users,adult_literacy_rate\n\
         usa, United States ,87.00,99.00\n\
         ZWE,Zimbabwe,,86.50\n",
    )
    .unwrap();

    let store = SqliteCountryStore::new(Database::open(tmp.path().join("wb.db")).unwrap());
    store.insert(&Country::new("USA", "Old name").unwrap()).unwrap();

    assert_eq!(storage::import_csv(&store, &csv_path).unwrap(), 2);
    assert_eq!(store.list_all().unwrap(), sample());
}

#[test]
fn import_of_invalid_file_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let csv_path = tmp.path().join("seed.csv");
    fs::write(
        &csv_path,
        "code,name,internet_users,adult_literacy_rate\nUSA,United States,87,99\nTOOLONG,Nowhere,,\n",
    )
    .unwrap();

    let store = SqliteCountryStore::new(Database::open(tmp.path().join("wb.db")).unwrap());
    assert!(storage::import_csv(&store, &csv_path).is_err());
    assert!(store.list_all().unwrap().is_empty());
}

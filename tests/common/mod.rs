//! Shared fixtures for integration tests

#![allow(dead_code)]

use polars::prelude::*;
use std::io::Write;
use std::path::Path;

const MANUFACTURERS: [&str; 3] = ["TOYOTA", "HYUNDAI", "MERCEDES-BENZ"];
const MODELS: [&str; 3] = ["Prius", "Elantra", "E 350"];
const CATEGORIES: [&str; 3] = ["Sedan", "Jeep", "Hatchback"];
const FUELS: [&str; 3] = ["Hybrid", "Petrol", "Diesel"];
const GEARS: [&str; 4] = ["Automatic", "Tiptronic", "Manual", "Variator"];
const DRIVES: [&str; 3] = ["Front", "4x4", "Rear"];
const WHEELS: [&str; 2] = ["Left wheel", "Right-hand drive"];
const COLORS: [&str; 4] = ["Silver", "Black", "White", "Grey"];
const YES_NO: [&str; 2] = ["No", "Yes"];

/// Cleaned vehicle table with `n` rows; `seed` shifts the value cycles so
/// different seeds give different tables. Some Levy and Color values are null.
pub fn cleaned_vehicle_frame(n: usize, seed: usize) -> DataFrame {
    let idx: Vec<usize> = (0..n).map(|i| i + seed).collect();
    let pick = |values: &[&'static str], step: usize| -> Vec<&'static str> {
        idx.iter().map(|i| values[(i * step + i / 3) % values.len()]).collect()
    };

    let price: Vec<i64> = idx.iter().map(|i| 5_000 + (i * 137 % 20_000) as i64).collect();
    let levy: Vec<Option<i64>> = idx
        .iter()
        .map(|i| if i % 7 == 0 { None } else { Some((i * 53 % 1_500) as i64) })
        .collect();
    let year: Vec<i64> = idx.iter().map(|i| 1995 + (i % 25) as i64).collect();
    let engine: Vec<f64> = idx.iter().map(|i| 1.0 + (i % 8) as f64 * 0.4).collect();
    let cylinders: Vec<f64> = idx.iter().map(|i| [4.0, 6.0, 8.0][i % 3]).collect();
    let doors: Vec<f64> = idx.iter().map(|i| [4.0, 2.0, 5.0][i % 3]).collect();
    let airbags: Vec<i64> = idx.iter().map(|i| (i % 13) as i64).collect();
    let color: Vec<Option<&str>> = idx
        .iter()
        .map(|i| if i % 11 == 0 { None } else { Some(COLORS[(i * 3) % COLORS.len()]) })
        .collect();

    df!(
        "Price" => &price,
        "Levy" => &levy,
        "Manufacturer" => &pick(&MANUFACTURERS, 1),
        "Model" => &pick(&MODELS, 1),
        "Prod. year" => &year,
        "Category" => &pick(&CATEGORIES, 2),
        "Leather interior" => &pick(&YES_NO, 1),
        "Fuel type" => &pick(&FUELS, 2),
        "Engine volume" => &engine,
        "Cylinders" => &cylinders,
        "Gear box type" => &pick(&GEARS, 3),
        "Drive wheels" => &pick(&DRIVES, 1),
        "Doors" => &doors,
        "Wheel" => &pick(&WHEELS, 1),
        "Color" => &color,
        "Airbags" => &airbags,
        "Turbo engine" => &pick(&YES_NO, 5)
    )
    .unwrap()
}

/// Replace one string column of `df`
pub fn with_string_column(df: &DataFrame, name: &str, values: Vec<&str>) -> DataFrame {
    let mut df = df.clone();
    df.with_column(Series::new(name.into(), values)).unwrap();
    df
}

pub const RAW_HEADER: &str = "ID,Price,Levy,Manufacturer,Model,Prod. year,Category,Leather interior,\
Fuel type,Engine volume,Mileage,Cylinders,Gear box type,Drive wheels,Doors,Wheel,Color,Airbags";

/// One raw CSV line
pub fn raw_row(id: usize, model: &str, levy: &str, engine: &str, doors: &str, variant: usize) -> String {
    format!(
        "{id},{price},{levy},TOYOTA,{model},{year},Sedan,{leather},Hybrid,{engine},{mileage} km,4.0,\
Automatic,Front,{doors},Left wheel,{color},{airbags}",
        id = id,
        price = 10_000 + variant * 25,
        levy = levy,
        model = model,
        year = 2000 + variant % 20,
        leather = YES_NO[variant % 2],
        engine = engine,
        mileage = 50_000 + id,
        doors = doors,
        color = COLORS[variant % COLORS.len()],
        airbags = variant % 13,
    )
}

/// Raw source with 120 distinct "Prius" rows, 3 duplicates of row 0 (with new
/// identifiers and mileage) and 5 rows of a rare model.
pub fn write_raw_vehicle_csv(path: &Path) {
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "{}", RAW_HEADER).unwrap();

    let engines = ["2.0 Turbo", "1.8", "3.5"];
    let doors = ["04-May", "02-Mar", ">5"];
    let levies = ["-", "1399", "862"];

    for v in 0..120 {
        let line = raw_row(1_000 + v, "Prius", levies[v % 3], engines[v % 3], doors[v % 3], v);
        writeln!(file, "{}", line).unwrap();
    }
    for d in 0..3 {
        let line = raw_row(5_000 + d, "Prius", levies[0], engines[0], doors[0], 0);
        writeln!(file, "{}", line).unwrap();
    }
    for r in 0..5 {
        let line = raw_row(9_000 + r, "Rare", levies[1], engines[1], doors[1], r);
        writeln!(file, "{}", line).unwrap();
    }
}

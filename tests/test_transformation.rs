//! Integration test: fit on train, transform both splits, persist and reload

mod common;

use common::{cleaned_vehicle_frame, with_string_column};
use ndarray::s;
use std::sync::Arc;
use vehicle_pricing_prep::prelude::*;

fn runner(dir: &std::path::Path) -> DataTransformation {
    let config = TransformationConfig::new().with_preprocessor_path(dir.join("preprocessor.json"));
    DataTransformation::new(config)
}

fn features(df: &polars::prelude::DataFrame) -> polars::prelude::DataFrame {
    df.drop("Price").unwrap()
}

#[test]
fn test_run_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let train = cleaned_vehicle_frame(60, 0);
    let test = cleaned_vehicle_frame(25, 60);

    let output = runner(dir.path()).run(&train, &test, "Price").unwrap();

    assert_eq!(output.train_features.nrows(), 60);
    assert_eq!(output.test_features.nrows(), 25);
    assert_eq!(output.train_features.ncols(), output.test_features.ncols());
    assert_eq!(output.train_features.ncols(), output.feature_names.len());
    assert_eq!(output.train_target.len(), 60);
    assert_eq!(output.test_target.len(), 25);
    assert!(output.train_features.iter().all(|v| v.is_finite()));
    assert!(output.preprocessor_path.exists());

    // Reloaded transformer reproduces the test matrix
    let reloaded = ColumnTransformer::load(&output.preprocessor_path).unwrap();
    let again = reloaded.transform(&features(&test)).unwrap();
    assert_eq!(again, output.test_features);
}

#[test]
fn test_feature_layout() {
    let dir = tempfile::tempdir().unwrap();
    let train = cleaned_vehicle_frame(40, 0);
    let output = runner(dir.path()).run(&train, &train, "Price").unwrap();

    let names = &output.feature_names;
    assert_eq!(&names[..6], &["Levy", "Prod. year", "Engine volume", "Cylinders", "Doors", "Airbags"]);
    assert_eq!(
        &names[6..12],
        &["Gear box type", "Drive wheels", "Fuel type", "Turbo engine", "Leather interior", "Wheel"]
    );
    assert!(names[12..].iter().all(|n| {
        n.starts_with("Manufacturer_")
            || n.starts_with("Model_")
            || n.starts_with("Category_")
            || n.starts_with("Color_")
    }));

    // Each nominal block holds exactly one 1.0 per row
    let onehot = output.train_features.slice(s![.., 12..]);
    for row in onehot.rows() {
        assert_eq!(row.iter().filter(|v| **v == 1.0).count(), 4);
        assert!(row.iter().all(|v| *v == 0.0 || *v == 1.0));
    }
}

#[test]
fn test_fit_transform_matches_fit_then_transform() {
    let schema = Schema::cleaned_vehicle();
    let x = features(&cleaned_vehicle_frame(50, 3));

    let mut a = vehicle_pipeline(&schema, UnknownCategoryPolicy::Ignore).unwrap();
    let combined = a.fit_transform(&x).unwrap();

    let mut b = vehicle_pipeline(&schema, UnknownCategoryPolicy::Ignore).unwrap();
    b.fit(&x).unwrap();
    let separate = b.transform(&x).unwrap();

    assert_eq!(combined, separate);
    assert_eq!(a, b);
}

#[test]
fn test_transform_does_not_refit() {
    let schema = Schema::cleaned_vehicle();
    let train = features(&cleaned_vehicle_frame(50, 0));
    let y1 = features(&cleaned_vehicle_frame(20, 100));
    let y2 = features(&cleaned_vehicle_frame(30, 500));

    let mut transformer = vehicle_pipeline(&schema, UnknownCategoryPolicy::Ignore).unwrap();
    transformer.fit(&train).unwrap();
    let snapshot = transformer.clone();

    let first = transformer.transform(&y1).unwrap();
    transformer.transform(&y2).unwrap();
    let second = transformer.transform(&y1).unwrap();

    assert_eq!(first, second);
    assert_eq!(transformer, snapshot);
}

#[test]
fn test_ordinal_encoding_is_deterministic() {
    let schema = Schema::cleaned_vehicle();
    let train = features(&cleaned_vehicle_frame(30, 0));
    let other = features(&cleaned_vehicle_frame(30, 7));

    let mut a = vehicle_pipeline(&schema, UnknownCategoryPolicy::Ignore).unwrap();
    let mut b = vehicle_pipeline(&schema, UnknownCategoryPolicy::Ignore).unwrap();
    a.fit(&train).unwrap();
    b.fit(&train).unwrap();

    let from_a = a.transform(&other).unwrap();
    let from_b = b.transform(&other).unwrap();
    assert_eq!(from_a.slice(s![.., 6..12]), from_b.slice(s![.., 6..12]));
}

#[test]
fn test_unseen_nominal_category_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let train = cleaned_vehicle_frame(30, 0);
    let test = with_string_column(&cleaned_vehicle_frame(5, 30), "Manufacturer", vec!["LADA"; 5]);

    let output = runner(dir.path()).run(&train, &test, "Price").unwrap();
    assert_eq!(output.test_features.nrows(), 5);

    let manufacturer: Vec<usize> = output
        .feature_names
        .iter()
        .enumerate()
        .filter(|(_, n)| n.starts_with("Manufacturer_"))
        .map(|(i, _)| i)
        .collect();
    assert!(!manufacturer.is_empty());
    for row in output.test_features.rows() {
        assert!(manufacturer.iter().all(|&i| row[i] == 0.0));
    }
}

#[test]
fn test_unseen_nominal_category_with_error_policy() {
    let dir = tempfile::tempdir().unwrap();
    let config = TransformationConfig::new()
        .with_preprocessor_path(dir.path().join("preprocessor.json"))
        .with_unknown_category_policy(UnknownCategoryPolicy::Error);
    let train = cleaned_vehicle_frame(30, 0);
    let test = with_string_column(&cleaned_vehicle_frame(3, 30), "Color", vec!["Purple"; 3]);

    let err = DataTransformation::new(config).run(&train, &test, "Price").unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Transform));
    assert!(matches!(
        err.root(),
        PipelineError::UnknownCategory { column, value } if column == "Color" && value == "Purple"
    ));
}

#[test]
fn test_value_outside_rank_list_fails() {
    let dir = tempfile::tempdir().unwrap();
    let train = cleaned_vehicle_frame(30, 0);
    let test = with_string_column(&cleaned_vehicle_frame(3, 30), "Fuel type", vec!["Hydrogen"; 3]);

    let err = runner(dir.path()).run(&train, &test, "Price").unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Transform));
    assert!(matches!(err.root(), PipelineError::UnknownCategory { column, .. } if column == "Fuel type"));
    assert!(!dir.path().join("preprocessor.json").exists());
}

#[test]
fn test_non_numeric_value_in_numeric_column_fails() {
    let dir = tempfile::tempdir().unwrap();
    let train = cleaned_vehicle_frame(30, 0);
    let test = with_string_column(&cleaned_vehicle_frame(3, 30), "Levy", vec!["-", "abc", "12"]);

    let err = runner(dir.path()).run(&train, &test, "Price").unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Transform));
    assert!(matches!(
        err.root(),
        PipelineError::Data(m) if m.contains("'Levy'") && m.contains("'-'")
    ));
    assert!(!dir.path().join("preprocessor.json").exists());
}

#[test]
fn test_non_numeric_value_in_training_split_fails_fit() {
    let dir = tempfile::tempdir().unwrap();
    let train = with_string_column(&cleaned_vehicle_frame(4, 0), "Doors", vec!["4", "2", "four", "5"]);
    let test = cleaned_vehicle_frame(3, 30);

    let err = runner(dir.path()).run(&train, &test, "Price").unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Fit));
    assert!(matches!(err.root(), PipelineError::Data(m) if m.contains("'four'")));
}

#[test]
fn test_missing_target_column() {
    let dir = tempfile::tempdir().unwrap();
    let train = cleaned_vehicle_frame(10, 0);
    let test = features(&cleaned_vehicle_frame(10, 10));

    let err = runner(dir.path()).run(&train, &test, "Price").unwrap_err();
    assert_eq!(err.stage(), Some(Stage::ValidateSchema));
    assert!(matches!(err.root(), PipelineError::SchemaMismatch(_)));
}

#[test]
fn test_missing_feature_column() {
    let dir = tempfile::tempdir().unwrap();
    let train = cleaned_vehicle_frame(10, 0).drop("Airbags").unwrap();
    let test = cleaned_vehicle_frame(10, 10).drop("Airbags").unwrap();

    let err = runner(dir.path()).run(&train, &test, "Price").unwrap_err();
    assert_eq!(err.stage(), Some(Stage::ValidateSchema));
    assert!(matches!(err.root(), PipelineError::SchemaMismatch(m) if m.contains("Airbags")));
}

#[test]
fn test_stage_order_is_observed() {
    let dir = tempfile::tempdir().unwrap();
    let observer = Arc::new(RecordingObserver::new());
    let train = cleaned_vehicle_frame(20, 0);
    let test = cleaned_vehicle_frame(10, 20);

    runner(dir.path())
        .with_observer(observer.clone())
        .run(&train, &test, "Price")
        .unwrap();

    assert_eq!(
        observer.completed_stages(),
        vec![
            Stage::ValidateSchema,
            Stage::BuildPipeline,
            Stage::Fit,
            Stage::Transform,
            Stage::Transform,
            Stage::Persist,
        ]
    );
}

#[test]
fn test_persisted_parameters_round_trip_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("preprocessor.json");
    let x = features(&cleaned_vehicle_frame(45, 2));

    let mut transformer = vehicle_pipeline(&Schema::cleaned_vehicle(), UnknownCategoryPolicy::Ignore).unwrap();
    transformer.fit(&x).unwrap();
    transformer.save(&path).unwrap();

    let loaded = ColumnTransformer::load(&path).unwrap();
    assert_eq!(loaded, transformer);
    assert_eq!(loaded.transform(&x).unwrap(), transformer.transform(&x).unwrap());
}

#[test]
fn test_unfit_transformer_cannot_be_saved() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preprocessor.json");
    let transformer = vehicle_pipeline(&Schema::cleaned_vehicle(), UnknownCategoryPolicy::Ignore).unwrap();

    assert!(matches!(transformer.save(&path), Err(PipelineError::NotFitted)));
    assert!(!path.exists());
}

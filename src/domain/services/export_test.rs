use anyhow::Result;
use serde_json::json;

use super::Export;
use super::ExportFormat;

#[test]
fn it_pretty_prints_json_with_two_spaces() -> Result<()> {
    let res = Export::to_json(&json!({"total": 42, "rows": [1]}))?;

    assert_eq!(res, "{\n  \"total\": 42,\n  \"rows\": [\n    1\n  ]\n}");
    return Ok(());
}

#[test]
fn it_builds_csv_headers_from_every_record() -> Result<()> {
    let records = vec![
        json!({"name": "north", "total": 12}),
        json!({"total": 7, "region": {"code": "S"}, "name": "south, east"}),
        json!({"active": true, "name": null}),
    ];

    let res = Export::to_csv(&records)?;

    insta::assert_snapshot!(res, @r###"
    name,total,region,active
    north,12,,
    "south, east",7,"{""code"":""S""}",
    ,,,true
    "###);

    return Ok(());
}

#[test]
fn it_renders_empty_csv_for_no_records() -> Result<()> {
    assert_eq!(Export::to_csv(&[])?, "");
    assert_eq!(Export::render(&json!(null), ExportFormat::Csv)?, "");
    return Ok(());
}

#[test]
fn it_rejects_non_object_rows() {
    let res = Export::to_csv(&[json!([1, 2])]);

    assert!(res.is_err());
}

#[test]
fn it_treats_a_single_object_as_one_row() -> Result<()> {
    let res = Export::render(&json!({"sql": "SELECT 1"}), ExportFormat::Csv)?;

    assert_eq!(res, "sql\nSELECT 1\n");
    return Ok(());
}

#[tokio::test]
async fn it_writes_files_into_new_directories() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let file_path = dir.path().join("exports/result.json");

    Export::write(&file_path, b"[]").await?;

    assert_eq!(tokio::fs::read_to_string(&file_path).await?, "[]");
    return Ok(());
}

#[test]
fn it_names_exports_by_time() {
    let name = Export::default_file_name("result", "csv");

    assert!(name.starts_with("result-"));
    assert!(name.ends_with(".csv"));
    assert_eq!(name.len(), "result-20240101-000000.csv".len());
}

use std::io::Write;

use campaign_client::{
    error::Error,
    services::import_service::CsvPreview,
    utils::csv::{csv_template, parse_csv},
};
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

fn upload(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn preview_reads_and_validates_an_upload() {
    let file = upload(
        "mobile_number,variable_1,variable_2\n\
         919876543210,Asha,Monday\n\
         \n\
         9876543210,Ravi,Tuesday\n\
         919876543211,Meera\n\
         919876543212,Kiran,Friday,extra\n",
    );

    let preview = CsvPreview::from_file(file.path(), 2).await.unwrap();

    assert_eq!(
        preview.header,
        Some(vec![
            "mobile_number".to_string(),
            "variable_1".to_string(),
            "variable_2".to_string()
        ])
    );
    assert_eq!(preview.total_rows, 4);
    assert_eq!(preview.valid_count(), 2);
    assert_eq!(preview.result.invalid_rows, vec![3, 4]);
    assert_eq!(
        preview
            .errors()
            .iter()
            .map(|e| (e.row, e.field.as_str()))
            .collect::<Vec<_>>(),
        vec![(3, "mobile_number"), (4, "columns")]
    );

    let recipients = preview.into_recipients();
    assert_eq!(recipients[1].mobile_number, "919876543212");
    assert_eq!(recipients[1].dynamic_variables, vec!["Kiran", "Friday"]);
}

#[tokio::test]
async fn downloaded_template_round_trips_through_the_validator() {
    let mut contents = csv_template(2);
    contents.push_str("919000000001,Dr. Rao,10am\n");
    let file = upload(&contents);

    let preview = CsvPreview::from_file(file.path(), 2).await.unwrap();

    assert!(preview.is_valid());
    assert_eq!(preview.valid_count(), 2);
}

#[tokio::test]
async fn windows_line_endings_are_tolerated() {
    let file = upload("mobile_number,variable_1\r\n919876543210,Asha\r\n");

    let rows = parse_csv(file.path()).await.unwrap();

    assert_eq!(rows[1], vec!["919876543210".to_string(), "Asha".to_string()]);
}

#[tokio::test]
async fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = CsvPreview::from_file(dir.path().join("nope.csv"), 1).await;

    assert!(matches!(result, Err(Error::Io(_))));
}

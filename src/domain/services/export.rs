#[cfg(test)]
#[path = "export_test.rs"]
mod tests;

use std::path;

use anyhow::bail;
use anyhow::Result;
use chrono::Local;
use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString, strum::EnumVariantNames)]
#[strum(serialize_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

pub struct Export {}

impl Export {
    pub fn render(value: &Value, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Json => return Export::to_json(value),
            ExportFormat::Csv => {
                let records = match value {
                    Value::Array(records) => records.as_slice(),
                    Value::Null => &[],
                    _ => std::slice::from_ref(value),
                };
                return Export::to_csv(records);
            }
        }
    }

    pub fn to_json(value: &Value) -> Result<String> {
        return Ok(serde_json::to_string_pretty(value)?);
    }

    /// One row per record. Columns are every key seen across the records, in
    /// the order they first appear.
    pub fn to_csv(records: &[Value]) -> Result<String> {
        let mut header: Vec<String> = vec![];
        for record in records {
            let obj = match record {
                Value::Object(obj) => obj,
                _ => bail!("CSV export needs a list of objects"),
            };
            for key in obj.keys() {
                if !header.contains(key) {
                    header.push(key.to_string());
                }
            }
        }

        let mut writer = csv::Writer::from_writer(vec![]);
        if header.is_empty() {
            return Ok("".to_string());
        }
        writer.write_record(&header)?;

        for record in records {
            let row = header
                .iter()
                .map(|key| return cell(record.get(key)))
                .collect::<Vec<String>>();
            writer.write_record(&row)?;
        }

        return Ok(String::from_utf8(writer.into_inner()?)?);
    }

    pub async fn write(file_path: &path::Path, contents: &[u8]) -> Result<()> {
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }

        let mut file = fs::File::create(file_path).await?;
        file.write_all(contents).await?;

        tracing::debug!(path = %file_path.display(), bytes = contents.len(), "Exported file");
        return Ok(());
    }

    /// `<prefix>-<local timestamp>.<format>`
    pub fn default_file_name(prefix: &str, extension: &str) -> String {
        let timestamp = Local::now().format("%Y%m%d-%H%M%S");
        return format!("{prefix}-{timestamp}.{extension}");
    }
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => return "".to_string(),
        Some(Value::String(text)) => return text.to_string(),
        Some(Value::Bool(flag)) => return flag.to_string(),
        Some(Value::Number(number)) => return number.to_string(),
        Some(nested) => return nested.to_string(),
    }
}

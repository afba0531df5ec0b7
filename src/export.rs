//! Request decoding and the download filename policy.

use crate::error::PipelineError;
use quire_types::{records_from_value, ContentRecord, HeaderInfo, ViewMode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The body accepted by `POST /generate-pdf` and by the CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub header_info: HeaderInfo,
    #[serde(default)]
    pub view_mode: Option<String>,
    /// A number or a string; anything else is ignored.
    #[serde(default)]
    pub unit_number: Option<Value>,
}

impl GenerationRequest {
    /// Validates the request. `data` must be an array of objects and the
    /// view mode, when present, must be known.
    pub fn into_job(self) -> Result<GenerationJob, PipelineError> {
        let records = records_from_value(self.data.as_ref())?;
        let view_mode = match self.view_mode.as_deref() {
            Some(mode) => mode.parse::<ViewMode>()?,
            None => ViewMode::default(),
        };
        let unit_number = self.unit_number.as_ref().and_then(unit_label);
        Ok(GenerationJob { records, header: self.header_info, view_mode, unit_number })
    }
}

fn unit_label(value: &Value) -> Option<String> {
    let raw = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        _ => return None,
    };
    let label = sanitize(&raw);
    (!label.is_empty()).then_some(label)
}

/// A validated generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationJob {
    pub records: Vec<ContentRecord>,
    pub header: HeaderInfo,
    pub view_mode: ViewMode,
    pub unit_number: Option<String>,
}

impl GenerationJob {
    pub fn from_records(records: Vec<ContentRecord>, header: HeaderInfo, view_mode: ViewMode) -> Self {
        Self { records, header, view_mode, unit_number: None }
    }

    /// `<title> - <view-mode-label>[ - Unit <n>].pdf`
    pub fn filename(&self) -> String {
        export_filename(&self.header.title, self.view_mode, self.unit_number.as_deref())
    }
}

impl TryFrom<GenerationRequest> for GenerationJob {
    type Error = PipelineError;

    fn try_from(request: GenerationRequest) -> Result<Self, Self::Error> {
        request.into_job()
    }
}

/// Keeps letters and digits of any script plus spaces; whitespace runs
/// collapse to a single space and the ends are trimmed.
pub fn sanitize(input: &str) -> String {
    let kept: String = input
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Builds the download filename, including the `.pdf` extension.
pub fn export_filename(title: &str, view_mode: ViewMode, unit: Option<&str>) -> String {
    let title = sanitize(title);
    let title = if title.is_empty() { "Document" } else { title.as_str() };
    let mut name = format!("{} - {}", title, view_mode.label());
    if let Some(unit) = unit.map(sanitize).filter(|u| !u.is_empty()) {
        name.push_str(" - Unit ");
        name.push_str(&unit);
    }
    name.push_str(".pdf");
    name
}

/// `Content-Disposition` value for a download of `filename`.
///
/// ASCII names are sent as a plain quoted `filename`. Other names get an
/// ASCII fallback plus an RFC 5987 `filename*` carrying the UTF-8 name.
pub fn content_disposition(filename: &str) -> String {
    if filename.is_ascii() {
        return format!("attachment; filename=\"{}\"", filename);
    }
    let fallback: String = filename
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}

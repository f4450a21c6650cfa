use std::borrow::Cow;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

use crate::model::FileKind;

// Characters that cannot appear raw inside one path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Every route the viewer API serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    PatientFiles { patient_id: String },
    ViewerData { kind: FileKind, id: String },
    UpdateConfig { kind: FileKind, id: String },
    Health,
}

fn kind_prefix(kind: FileKind) -> &'static str {
    match kind {
        FileKind::Stack => "/api/dicom/stack",
        FileKind::Volume => "/api/dicom/volume",
        FileKind::Image => "/api/image",
    }
}

impl Route {
    pub fn method(&self) -> &'static str {
        match self {
            Route::UpdateConfig { .. } => "PATCH",
            _ => "GET",
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::PatientFiles { patient_id } => {
                format!("/api/patient/{}/files", encode(patient_id))
            }
            Route::ViewerData { kind, id } => format!("{}/{}", kind_prefix(*kind), encode(id)),
            Route::UpdateConfig { kind, id } => {
                format!("{}/{}/config", kind_prefix(*kind), encode(id))
            }
            Route::Health => "/health".to_string(),
        }
    }

    /// Matches `method` and `path` against the route table. Segments are
    /// percent-decoded; query strings and a trailing slash are ignored.
    pub fn parse(method: &str, path: &str) -> Option<Route> {
        let path = path.split('?').next().unwrap_or_default();
        let decoded = path
            .trim_matches('/')
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| percent_decode_str(segment).decode_utf8().ok())
            .collect::<Option<Vec<Cow<'_, str>>>>()?;
        let segments: Vec<&str> = decoded.iter().map(|segment| &**segment).collect();
        let method = method.to_ascii_uppercase();

        let route = match (method.as_str(), segments.as_slice()) {
            ("GET", ["health"]) => Route::Health,
            ("GET", ["api", "patient", patient_id, "files"]) => Route::PatientFiles {
                patient_id: patient_id.to_string(),
            },
            ("GET", ["api", "dicom", kind, id]) => Route::ViewerData {
                kind: dicom_kind(kind)?,
                id: id.to_string(),
            },
            ("GET", ["api", "image", id]) => Route::ViewerData {
                kind: FileKind::Image,
                id: id.to_string(),
            },
            ("PATCH", ["api", "dicom", kind, id, "config"]) => Route::UpdateConfig {
                kind: dicom_kind(kind)?,
                id: id.to_string(),
            },
            ("PATCH", ["api", "image", id, "config"]) => Route::UpdateConfig {
                kind: FileKind::Image,
                id: id.to_string(),
            },
            _ => return None,
        };
        Some(route)
    }
}

fn encode(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

// Only stacks and volumes live under /api/dicom.
fn dicom_kind(segment: &str) -> Option<FileKind> {
    match segment {
        "stack" => Some(FileKind::Stack),
        "volume" => Some(FileKind::Volume),
        _ => None,
    }
}

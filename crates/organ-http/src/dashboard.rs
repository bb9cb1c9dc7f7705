//! HTML dashboard rendering.

use std::time::SystemTime;

use askama::Template;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::recordings::Recording;

/// Mount point of the static recordings server.
pub const AUDIO_PREFIX: &str = "/audio";

const BYTES_PER_MIB: f32 = 1024.0 * 1024.0;

/// Whole-page template. The organ name and entry names are HTML-escaped.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage<'a> {
    organ_name: &'a str,
    readable: bool,
    rows: Vec<RecordingRow>,
}

/// One rendered table row. `href` is percent-encoded and rendered unescaped.
pub struct RecordingRow {
    name: String,
    href: String,
    size_mib: String,
    modified: String,
}

impl RecordingRow {
    fn from_recording(rec: &Recording) -> Self {
        Self {
            name: rec.name.clone(),
            href: download_href(&rec.name),
            size_mib: format_size_mib(rec.size_bytes),
            modified: rec.modified.map(format_modified).unwrap_or_default(),
        }
    }
}

impl<'a> DashboardPage<'a> {
    /// Page for a readable directory.
    pub fn listing(organ_name: &'a str, recordings: &[Recording]) -> Self {
        Self {
            organ_name,
            readable: true,
            rows: recordings.iter().map(RecordingRow::from_recording).collect(),
        }
    }

    /// Page shown when the directory cannot be enumerated.
    pub fn inaccessible(organ_name: &'a str) -> Self {
        Self {
            organ_name,
            readable: false,
            rows: Vec::new(),
        }
    }
}

/// `/audio/<percent-encoded name>`.
pub fn download_href(name: &str) -> String {
    format!("{AUDIO_PREFIX}/{}", urlencoding::encode(name))
}

/// Size in MiB with one decimal, computed in single precision.
pub fn format_size_mib(bytes: u64) -> String {
    format!("{:.1}", bytes as f32 / BYTES_PER_MIB)
}

fn format_modified(time: SystemTime) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
    OffsetDateTime::from(time)
        .format(&format)
        .unwrap_or_default()
}

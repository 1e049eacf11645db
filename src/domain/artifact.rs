//! Output artifact naming

use chrono::NaiveDateTime;

use super::capture::OUTPUT_MIME_TYPE;
use super::still::ImageFormat;

pub const RECORDING_PREFIX: &str = "tab-recording";
pub const CAPTURE_PREFIX: &str = "tab-capture";

/// Second-resolution timestamp, e.g. `20240131-094502`
pub fn timestamp_label(at: NaiveDateTime) -> String {
    at.format("%Y%m%d-%H%M%S").to_string()
}

/// File name for a finished recording
pub fn recording_filename(at: NaiveDateTime) -> String {
    let extension = OUTPUT_MIME_TYPE.rsplit('/').next().unwrap_or("webm");
    format!("{}-{}.{}", RECORDING_PREFIX, timestamp_label(at), extension)
}

/// File name for a screenshot
pub fn capture_filename(at: NaiveDateTime, format: ImageFormat) -> String {
    format!(
        "{}-{}.{}",
        CAPTURE_PREFIX,
        timestamp_label(at),
        format.extension()
    )
}

/// Current local time, the reference for artifact names
pub fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(9, 5, 2)
            .unwrap()
    }

    #[test]
    fn label_is_zero_padded() {
        assert_eq!(timestamp_label(at()), "20240131-090502");
    }

    #[test]
    fn recording_name() {
        assert_eq!(recording_filename(at()), "tab-recording-20240131-090502.webm");
    }

    #[test]
    fn capture_name_uses_format_extension() {
        assert_eq!(
            capture_filename(at(), ImageFormat::Jpeg),
            "tab-capture-20240131-090502.jpeg"
        );
        assert_eq!(
            capture_filename(at(), ImageFormat::Png),
            "tab-capture-20240131-090502.png"
        );
    }
}

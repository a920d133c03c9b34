use std::str::FromStr;

use crate::logger::error::LogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
    Journald,
}

impl FromStr for LogFormat {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase();
        match norm.as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "journald" | "journal" => {
                #[cfg(all(target_os = "linux", feature = "journald"))]
                {
                    Ok(LogFormat::Journald)
                }

                #[cfg(not(all(target_os = "linux", feature = "journald")))]
                {
                    Err(LogError::JournaldNotSupported)
                }
            }
            _ => Err(LogError::InvalidFormat(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_formats_case_insensitively() {
        assert_eq!(LogFormat::from_str("Text").unwrap(), LogFormat::Text);
        assert_eq!(LogFormat::from_str(" json ").unwrap(), LogFormat::Json);
    }

    #[test]
    fn rejects_unknown_formats() {
        assert!(matches!(
            LogFormat::from_str("xml"),
            Err(LogError::InvalidFormat(_))
        ));
    }
}

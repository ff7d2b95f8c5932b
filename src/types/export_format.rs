use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Supported conversation export formats.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExportFormat {
    /// The full history as a JSON array, system message included.
    Json,

    /// Non-system messages rendered one labeled block per message.
    Txt,
}

impl ExportFormat {
    /// Returns the file extension conventionally used for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Txt => "txt",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(ExportFormat::Json),
            "txt" => Ok(ExportFormat::Txt),
            other => Err(Error::unsupported_format(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_formats() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Txt);
    }

    #[test]
    fn rejects_anything_else() {
        for format in ["xml", "csv", "TXT", ""] {
            let err = format.parse::<ExportFormat>().unwrap_err();
            assert!(err.is_unsupported_format(), "{format} should be rejected");
        }
    }
}

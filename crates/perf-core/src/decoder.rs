//! Payload decoders for lines of the message file.

use crate::error::{ConfigError, DecodeError};
use base64::{engine::general_purpose, Engine as _};
use std::fmt;
use std::str::FromStr;

/// Encoding of each line in the message file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecoderScheme {
    /// Line bytes are the payload
    #[default]
    Raw,
    /// Line is hex encoded
    Hex,
    /// Line is standard-alphabet base64
    Base64,
}

impl DecoderScheme {
    /// Decode one line into a payload.
    pub fn decode(self, line: &[u8]) -> Result<Vec<u8>, DecodeError> {
        match self {
            DecoderScheme::Raw => Ok(line.to_vec()),
            DecoderScheme::Hex => Ok(hex::decode(line)?),
            DecoderScheme::Base64 => Ok(general_purpose::STANDARD.decode(line)?),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DecoderScheme::Raw => "raw",
            DecoderScheme::Hex => "hex",
            DecoderScheme::Base64 => "base64",
        }
    }
}

impl FromStr for DecoderScheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(DecoderScheme::Raw),
            "hex" => Ok(DecoderScheme::Hex),
            "base64" => Ok(DecoderScheme::Base64),
            other => Err(ConfigError::UnknownScheme {
                kind: "message decoder",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for DecoderScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

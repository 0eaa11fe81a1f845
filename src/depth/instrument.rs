//! Instrument identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Exchange segment as named by the broker quote API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    #[serde(rename = "NSE_EQ")]
    NseEq,
    #[serde(rename = "NSE_FNO", alias = "NSE_FO")]
    NseFno,
    #[serde(rename = "BSE_EQ")]
    BseEq,
    #[serde(rename = "BSE_FNO", alias = "BSE_FO")]
    BseFno,
    #[serde(rename = "NSE_CURRENCY")]
    NseCurrency,
    #[serde(rename = "BSE_CURRENCY")]
    BseCurrency,
    #[serde(rename = "MCX_COMM")]
    McxComm,
    #[serde(rename = "IDX_I")]
    Index,
}

impl Segment {
    /// Segment code used in quote requests and responses
    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::NseEq => "NSE_EQ",
            Segment::NseFno => "NSE_FNO",
            Segment::BseEq => "BSE_EQ",
            Segment::BseFno => "BSE_FNO",
            Segment::NseCurrency => "NSE_CURRENCY",
            Segment::BseCurrency => "BSE_CURRENCY",
            Segment::McxComm => "MCX_COMM",
            Segment::Index => "IDX_I",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Segment string that matches no known segment
#[derive(Debug, Clone, Error)]
#[error("unknown exchange segment: {0}")]
pub struct UnknownSegment(pub String);

impl FromStr for Segment {
    type Err = UnknownSegment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NSE_EQ" => Ok(Segment::NseEq),
            // Dashboard sends NSE_FO for the F&O segment
            "NSE_FNO" | "NSE_FO" => Ok(Segment::NseFno),
            "BSE_EQ" => Ok(Segment::BseEq),
            "BSE_FNO" | "BSE_FO" => Ok(Segment::BseFno),
            "NSE_CURRENCY" => Ok(Segment::NseCurrency),
            "BSE_CURRENCY" => Ok(Segment::BseCurrency),
            "MCX_COMM" => Ok(Segment::McxComm),
            "IDX_I" => Ok(Segment::Index),
            _ => Err(UnknownSegment(s.to_string())),
        }
    }
}

/// A security on a given exchange segment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    /// Broker security identifier
    pub security_id: String,
    /// Exchange segment
    pub segment: Segment,
}

impl Instrument {
    /// Create a new instrument
    pub fn new(security_id: impl Into<String>, segment: Segment) -> Self {
        Self {
            security_id: security_id.into(),
            segment,
        }
    }

    /// Parse `ID` or `ID:SEGMENT`, using `default` when no segment is given
    pub fn parse_with_default(s: &str, default: Segment) -> Result<Self, UnknownSegment> {
        match s.split_once(':') {
            Some((id, segment)) => Ok(Self::new(id.trim(), segment.parse()?)),
            None => Ok(Self::new(s.trim(), default)),
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.segment, self.security_id)
    }
}

/// Parses `ID` or `ID:SEGMENT`, defaulting to NSE_FNO
impl FromStr for Instrument {
    type Err = UnknownSegment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_default(s, Segment::NseFno)
    }
}

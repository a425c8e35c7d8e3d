//! Zoom argument parsing.
//!
//! Accepts a single level (`"3"`) or an inclusive range (`"2-6"`).

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::TilerError;
use crate::tile::MAX_ZOOM;

/// Inclusive range of zoom levels to generate, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomRange {
    min: u32,
    max: u32,
}

impl ZoomRange {
    /// Single zoom level.
    pub fn single(zoom: u32) -> Self {
        Self {
            min: zoom,
            max: zoom,
        }
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Levels in ascending order.
    pub fn levels(&self) -> RangeInclusive<u32> {
        self.min..=self.max
    }

    /// Number of levels in the range (never zero).
    pub fn level_count(&self) -> usize {
        (self.max - self.min + 1) as usize
    }
}

impl fmt::Display for ZoomRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

fn parse_level(input: &str, part: &str) -> Result<u32, TilerError> {
    let invalid = |reason: String| TilerError::ZoomParse {
        input: input.to_string(),
        reason,
    };

    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(format!("'{}' is not a non-negative integer", part)));
    }

    let level: u32 = part
        .parse()
        .map_err(|_| invalid(format!("'{}' is out of range", part)))?;

    if level > MAX_ZOOM {
        return Err(invalid(format!(
            "zoom {} exceeds the maximum of {}",
            level, MAX_ZOOM
        )));
    }

    Ok(level)
}

impl FromStr for ZoomRange {
    type Err = TilerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();

        match input.split_once('-') {
            None => parse_level(s, input).map(ZoomRange::single),
            Some((min, max)) => {
                let min = parse_level(s, min.trim())?;
                let max = parse_level(s, max.trim())?;
                if min > max {
                    return Err(TilerError::ZoomParse {
                        input: s.to_string(),
                        reason: format!("range start {} is above its end {}", min, max),
                    });
                }
                Ok(ZoomRange { min, max })
            }
        }
    }
}

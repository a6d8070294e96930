use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

const REM_SIZE: f64 = 16.0;

const COMPARISON_OPERATORS: &str = r"(?P<operator>(?:<=?)|(?:>=?)|=)\s*";
const PROPERTY: &str = r"(?:(?P<property>((?:min|max)-)?(?:device-)?(?:width|height))\s*)";
const COLON: &str = r"(?P<colon>:\s*)";
const LENGTH: &str = r"(?P<length>-?\d*\.?\d+)(?P<unit>ch|em|ex|px|rem)?\s*";

/// `(min-width: 600px)`
static MIN_MAX_SYNTAX: Lazy<Regex> = Lazy::new(|| {
  Regex::new(&format!("{}{}{}", PROPERTY, COLON, LENGTH)).expect("invalid min/max regex")
});
/// `(600px <= width)`
static REVERSED_RANGE_SYNTAX: Lazy<Regex> = Lazy::new(|| {
  Regex::new(&format!("{}{}{}", LENGTH, COMPARISON_OPERATORS, PROPERTY))
    .expect("invalid reversed range regex")
});
/// `(width >= 600px)`
static RANGE_SYNTAX: Lazy<Regex> = Lazy::new(|| {
  Regex::new(&format!("{}{}{}", PROPERTY, COMPARISON_OPERATORS, LENGTH))
    .expect("invalid range regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Feature {
  Width,
  Height,
  DeviceWidth,
  DeviceHeight,
}

impl Feature {
  fn sort_order(self) -> i32 {
    match self {
      Feature::Width => 1,
      Feature::Height => 2,
      Feature::DeviceWidth => 101,
      Feature::DeviceHeight => 102,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
  LessEqual,
  Equal,
  GreaterEqual,
  Less,
  Greater,
}

impl Comparison {
  fn sort_order(self) -> i32 {
    match self {
      Comparison::Greater => 10,
      Comparison::GreaterEqual => 20,
      Comparison::Less => 30,
      Comparison::LessEqual => 40,
      Comparison::Equal => 50,
    }
  }

  fn includes_greater(self) -> bool {
    matches!(self, Comparison::Greater | Comparison::GreaterEqual)
  }

  fn reverse(self) -> Self {
    match self {
      Comparison::Less => Comparison::Greater,
      Comparison::Greater => Comparison::Less,
      Comparison::LessEqual => Comparison::GreaterEqual,
      Comparison::GreaterEqual => Comparison::LessEqual,
      Comparison::Equal => Comparison::Equal,
    }
  }
}

/// One width/height constraint of a media query, reduced to a totally
/// ordered key.
///
/// Lower bounds sort ascending and upper bounds descending, so with
/// `min-width` queries the wider breakpoint is emitted later and wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MediaBound {
  pub group: i32,
  pub position: i64,
}

struct ParsedBound {
  index: usize,
  bound: MediaBound,
}

/// Extract the ordered width/height bounds of a media query prelude.
pub fn parse_media_bounds(params: &str) -> Vec<MediaBound> {
  let mut parsed: Vec<ParsedBound> = Vec::new();

  for captures in MIN_MAX_SYNTAX.captures_iter(params) {
    if let Some(bound) = parse_min_max(&captures) {
      parsed.push(bound);
    }
  }

  for captures in REVERSED_RANGE_SYNTAX.captures_iter(params) {
    if let Some(bound) = parse_range(&captures, true) {
      parsed.push(bound);
    }
  }

  for captures in RANGE_SYNTAX.captures_iter(params) {
    if let Some(bound) = parse_range(&captures, false) {
      parsed.push(bound);
    }
  }

  parsed.sort_by_key(|parsed| parsed.index);
  parsed.into_iter().map(|parsed| parsed.bound).collect()
}

fn parse_min_max(captures: &Captures<'_>) -> Option<ParsedBound> {
  let (feature, comparison) = match captures.name("property")?.as_str() {
    "min-width" => (Feature::Width, Comparison::GreaterEqual),
    "max-width" => (Feature::Width, Comparison::LessEqual),
    "min-height" => (Feature::Height, Comparison::GreaterEqual),
    "max-height" => (Feature::Height, Comparison::LessEqual),
    "min-device-width" => (Feature::DeviceWidth, Comparison::GreaterEqual),
    "max-device-width" => (Feature::DeviceWidth, Comparison::LessEqual),
    "min-device-height" => (Feature::DeviceHeight, Comparison::GreaterEqual),
    "max-device-height" => (Feature::DeviceHeight, Comparison::LessEqual),
    _ => return None,
  };

  assemble(captures, feature, comparison)
}

fn parse_range(captures: &Captures<'_>, reversed: bool) -> Option<ParsedBound> {
  let feature = match captures.name("property")?.as_str() {
    "width" => Feature::Width,
    "height" => Feature::Height,
    "device-width" => Feature::DeviceWidth,
    "device-height" => Feature::DeviceHeight,
    _ => return None,
  };

  let comparison = match captures.name("operator")?.as_str() {
    "<=" => Comparison::LessEqual,
    "=" => Comparison::Equal,
    ">=" => Comparison::GreaterEqual,
    "<" => Comparison::Less,
    ">" => Comparison::Greater,
    _ => return None,
  };

  let comparison = if reversed {
    comparison.reverse()
  } else {
    comparison
  };

  assemble(captures, feature, comparison)
}

fn assemble(captures: &Captures<'_>, feature: Feature, comparison: Comparison) -> Option<ParsedBound> {
  let matched = captures.get(0)?;
  // A match at the very start is not inside a parenthesised feature.
  if matched.start() == 0 {
    return None;
  }

  let length = length_in_px(captures)?;
  // Thousandths of a pixel keep the key integral and totally ordered.
  let scaled = (length * 1000.0).round() as i64;
  let position = if comparison.includes_greater() {
    scaled
  } else {
    -scaled
  };

  Some(ParsedBound {
    index: matched.start(),
    bound: MediaBound {
      group: feature.sort_order() + comparison.sort_order(),
      position,
    },
  })
}

fn length_in_px(captures: &Captures<'_>) -> Option<f64> {
  let length = captures.name("length")?.as_str();
  if length == "0" {
    return Some(0.0);
  }

  let value: f64 = length.parse().ok()?;
  match captures.name("unit")?.as_str() {
    "ch" | "ex" => Some(value * 0.5 * REM_SIZE),
    "em" | "rem" => Some(value * REM_SIZE),
    "px" => Some(value),
    _ => None,
  }
}

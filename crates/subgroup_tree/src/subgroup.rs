use core::fmt;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

use crate::errors::{SubgroupError, SubgroupResult};
use crate::node::Counts;
use crate::selector::{Operator, Pattern, Selector, SelectorValue};

static LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^Description: \[(?P<description>.*)\], Target: (?P<target>.+?) ; Quality Measure (?P<measure>\S+) = (?P<quality>\S+) ; tp = (?P<tp>-?\d+) ; fp = (?P<fp>-?\d+) ; TP = (?P<tp_total>-?\d+) ; FP = (?P<fp_total>-?\d+)$",
    )
    .expect("subgroup line regex")
});

static SELECTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<attribute>.+?) (?P<operator>!=|<=|>=|=|<|>) (?P<value>.+)$")
        .expect("selector regex")
});

/// An accepted subgroup: description, target and counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subgroup {
    pub pattern: Pattern,
    pub target: Selector,
    pub counts: Counts,
    /// Dataset-wide `(TP, FP)`.
    pub totals: Counts,
    pub quality_measure: String,
    pub quality: f64,
}

impl fmt::Display for Subgroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Description: {}, Target: {} ; Quality Measure {} = {} ; tp = {} ; fp = {} ; TP = {} ; FP = {}",
            self.pattern,
            self.target,
            self.quality_measure,
            self.quality,
            self.counts.tp,
            self.counts.fp,
            self.totals.tp,
            self.totals.fp,
        )
    }
}

/// Split a description on the `", "` separators that sit outside quoted
/// values. A doubled `''` inside a value toggles twice and stays quoted.
fn split_selectors(description: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    if description.is_empty() {
        return parts;
    }
    let bytes = description.as_bytes();
    let mut quoted = false;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' => quoted = !quoted,
            b',' if !quoted && bytes.get(i + 1) == Some(&b' ') => {
                parts.push(&description[start..i]);
                start = i + 2;
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&description[start..]);
    parts
}

fn parse_value(raw: &str) -> SubgroupResult<SelectorValue> {
    if let Some(inner) = raw.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')) {
        // only doubled quotes may appear inside a quoted value
        if inner.replace("''", "").contains('\'') {
            return Err(SubgroupError::Parse(format!("unescaped quote in {raw}")));
        }
        return Ok(SelectorValue::from(inner.replace("''", "'").as_str()));
    }
    if let Ok(v) = raw.parse::<i64>() {
        return Ok(SelectorValue::Int(v));
    }
    raw.parse::<f64>()
        .map(SelectorValue::Float)
        .map_err(|_| SubgroupError::Parse(format!("bad selector value '{raw}'")))
}

fn parse_selector(text: &str) -> SubgroupResult<Selector> {
    let caps = SELECTOR_RE
        .captures(text)
        .ok_or_else(|| SubgroupError::Parse(format!("bad selector '{text}'")))?;
    let operator = Operator::from_str(&caps["operator"])?;
    let value = parse_value(&caps["value"])?;
    Ok(Selector::new(&caps["attribute"], operator, value))
}

fn parse_count(caps: &Captures, name: &str) -> SubgroupResult<i64> {
    caps[name]
        .parse::<i64>()
        .map_err(|e| SubgroupError::Parse(format!("{name}: {e}")))
}

impl FromStr for Subgroup {
    type Err = SubgroupError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end();
        let caps = LINE_RE
            .captures(line)
            .ok_or_else(|| SubgroupError::Parse(format!("unrecognised line: {line}")))?;

        let pattern = split_selectors(&caps["description"])
            .into_iter()
            .map(parse_selector)
            .collect::<SubgroupResult<Pattern>>()?;
        let target = parse_selector(&caps["target"])?;

        let quality = caps["quality"]
            .parse::<f64>()
            .map_err(|e| SubgroupError::Parse(format!("quality: {e}")))?;

        Ok(Subgroup {
            pattern,
            target,
            counts: Counts::new(parse_count(&caps, "tp")?, parse_count(&caps, "fp")?),
            totals: Counts::new(
                parse_count(&caps, "tp_total")?,
                parse_count(&caps, "fp_total")?,
            ),
            quality_measure: caps["measure"].to_string(),
            quality,
        })
    }
}

/// Pretty JSON array of subgroups.
pub fn subgroups_to_json(subgroups: &[Subgroup]) -> SubgroupResult<String> {
    Ok(serde_json::to_string_pretty(subgroups)?)
}

use core::fmt;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::SubgroupError;

/// -------------------
/// Operator
/// -------------------
/// Declaration order is the selector order: `=`, `!=`, `<`, `>`, `<=`, `>=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operator {
    Equal,
    NotEqual,
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::Less => "<",
            Operator::Greater => ">",
            Operator::LessOrEqual => "<=",
            Operator::GreaterOrEqual => ">=",
        }
    }

    fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Operator::Equal => ordering == Ordering::Equal,
            Operator::NotEqual => ordering != Ordering::Equal,
            Operator::Less => ordering == Ordering::Less,
            Operator::Greater => ordering == Ordering::Greater,
            Operator::LessOrEqual => ordering != Ordering::Greater,
            Operator::GreaterOrEqual => ordering != Ordering::Less,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = SubgroupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(Operator::Equal),
            "!=" => Ok(Operator::NotEqual),
            "<" => Ok(Operator::Less),
            ">" => Ok(Operator::Greater),
            "<=" => Ok(Operator::LessOrEqual),
            ">=" => Ok(Operator::GreaterOrEqual),
            other => Err(SubgroupError::Parse(format!("unknown operator '{other}'"))),
        }
    }
}

/// -------------------
/// SelectorValue
/// -------------------
/// Floats compare and hash by bit pattern so the type can be a map key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorValue {
    Int(i64),
    Float(f64),
    Str(Arc<str>),
}

impl SelectorValue {
    fn rank(&self) -> u8 {
        match self {
            SelectorValue::Int(_) => 0,
            SelectorValue::Float(_) => 1,
            SelectorValue::Str(_) => 2,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SelectorValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for SelectorValue {
    fn from(value: &str) -> Self {
        SelectorValue::Str(Arc::from(value))
    }
}

impl From<i64> for SelectorValue {
    fn from(value: i64) -> Self {
        SelectorValue::Int(value)
    }
}

impl From<f64> for SelectorValue {
    fn from(value: f64) -> Self {
        SelectorValue::Float(value)
    }
}

impl PartialEq for SelectorValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SelectorValue::Int(a), SelectorValue::Int(b)) => a == b,
            (SelectorValue::Float(a), SelectorValue::Float(b)) => a.to_bits() == b.to_bits(),
            (SelectorValue::Str(a), SelectorValue::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for SelectorValue {}

impl Hash for SelectorValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            SelectorValue::Int(v) => v.hash(state),
            SelectorValue::Float(v) => v.to_bits().hash(state),
            SelectorValue::Str(v) => v.hash(state),
        }
    }
}

impl Ord for SelectorValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SelectorValue::Int(a), SelectorValue::Int(b)) => a.cmp(b),
            (SelectorValue::Float(a), SelectorValue::Float(b)) => a.total_cmp(b),
            (SelectorValue::Str(a), SelectorValue::Str(b)) => a.cmp(b),
            (SelectorValue::Int(a), SelectorValue::Float(b)) => {
                (*a as f64).total_cmp(b).then(Ordering::Less)
            }
            (SelectorValue::Float(a), SelectorValue::Int(b)) => {
                a.total_cmp(&(*b as f64)).then(Ordering::Greater)
            }
            // Strings and numbers are not mutually comparable: fall back to the text form.
            _ => self
                .to_string()
                .cmp(&other.to_string())
                .then_with(|| self.rank().cmp(&other.rank())),
        }
    }
}

impl PartialOrd for SelectorValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SelectorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorValue::Int(v) => write!(f, "{v}"),
            // Debug keeps the decimal point, so "2.0" reads back as a float
            SelectorValue::Float(v) => write!(f, "{v:?}"),
            // quotes inside a value are doubled
            SelectorValue::Str(v) => write!(f, "'{}'", v.replace('\'', "''")),
        }
    }
}

/// -------------------
/// Selector
/// -------------------
/// An atomic `attribute operator value` condition. Ordered by attribute,
/// then operator, then value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Selector {
    attribute: Arc<str>,
    operator: Operator,
    value: SelectorValue,
}

impl Selector {
    pub fn new(
        attribute: impl Into<Arc<str>>,
        operator: Operator,
        value: impl Into<SelectorValue>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            operator,
            value: value.into(),
        }
    }

    /// Shorthand for the `attribute = 'value'` selectors built from categorical data.
    pub fn equal(attribute: &str, value: &str) -> Self {
        Self::new(attribute, Operator::Equal, value)
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn value(&self) -> &SelectorValue {
        &self.value
    }

    /// Evaluate the selector against a categorical cell.
    pub fn matches_str(&self, cell: &str) -> bool {
        match &self.value {
            SelectorValue::Str(v) => self.operator.holds(cell.cmp(v)),
            other => self.operator.holds(cell.cmp(other.to_string().as_str())),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.attribute, self.operator, self.value)
    }
}

/// -------------------
/// Pattern
/// -------------------
/// A canonical conjunction of selectors: always sorted and deduplicated, so
/// structural equality is pattern equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pattern {
    selectors: Vec<Selector>,
}

impl Pattern {
    pub fn new<I: IntoIterator<Item = Selector>>(selectors: I) -> Self {
        let mut selectors: Vec<Selector> = selectors.into_iter().collect();
        selectors.sort();
        selectors.dedup();
        Self { selectors }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn union(&self, other: &Pattern) -> Pattern {
        Pattern::new(self.selectors.iter().chain(other.selectors.iter()).cloned())
    }

    /// `{selector} ∪ self`
    pub fn with(&self, selector: &Selector) -> Pattern {
        Pattern::new(std::iter::once(selector.clone()).chain(self.selectors.iter().cloned()))
    }

    pub fn contains(&self, selector: &Selector) -> bool {
        self.selectors.binary_search(selector).is_ok()
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Selector> {
        self.selectors.iter()
    }

    pub fn as_slice(&self) -> &[Selector] {
        &self.selectors
    }
}

impl FromIterator<Selector> for Pattern {
    fn from_iter<I: IntoIterator<Item = Selector>>(iter: I) -> Self {
        Pattern::new(iter)
    }
}

impl<'a> IntoIterator for &'a Pattern {
    type Item = &'a Selector;
    type IntoIter = std::slice::Iter<'a, Selector>;

    fn into_iter(self) -> Self::IntoIter {
        self.selectors.iter()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, selector) in self.selectors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{selector}")?;
        }
        f.write_str("]")
    }
}

/// -------------------
/// SelectorPool
/// -------------------
/// Per-run intern table for `attribute = value` selectors. Equal selectors
/// handed out by one pool share their string allocations.
#[derive(Debug, Default)]
pub struct SelectorPool {
    selectors: HashMap<Arc<str>, HashMap<Arc<str>, Selector>>,
}

impl SelectorPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern_equal(&mut self, attribute: &str, value: &str) -> Selector {
        if let Some(selector) = self.selectors.get(attribute).and_then(|m| m.get(value)) {
            return selector.clone();
        }
        let attribute: Arc<str> = match self.selectors.get_key_value(attribute) {
            Some((key, _)) => Arc::clone(key),
            None => Arc::from(attribute),
        };
        let value: Arc<str> = Arc::from(value);
        let selector = Selector {
            attribute: Arc::clone(&attribute),
            operator: Operator::Equal,
            value: SelectorValue::Str(Arc::clone(&value)),
        };
        self.selectors
            .entry(attribute)
            .or_default()
            .insert(value, selector.clone());
        selector
    }

    pub fn len(&self) -> usize {
        self.selectors.values().map(|m| m.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

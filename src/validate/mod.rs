//! Strict IPv4 validation and extraction from free text.
//!
//! Text from the command line, a batch file, or stdin is reduced to a single
//! dotted-decimal IPv4 address before any provider is queried. The text of
//! each octet must be its canonical decimal form.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error_handling::ResolutionError;

/// Four dotted digit runs. Each run is taken whole, so "999.1.1.1" is one
/// (invalid) candidate and never "99.1.1.1".
const CANDIDATE_PATTERN_STR: &str = r"[0-9]+(?:\.[0-9]+){3}";

/// Compiles a pattern that is a compile-time constant of this module.
///
/// # Panics
///
/// Panics if the pattern does not compile, which means the constant itself is
/// broken.
fn compile_regex_unsafe(pattern: &str, context: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| {
        panic!(
            "Failed to compile regex pattern '{}' in {}: {}. This is a programming error.",
            pattern, context, e
        )
    })
}

static CANDIDATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(CANDIDATE_PATTERN_STR, "CANDIDATE_PATTERN"));

/// Returns true if `s` is exactly four dot-separated decimal octets, each in
/// 0–255 and written without leading zeros (except the literal "0").
///
/// # Examples
///
/// ```
/// use ipeed::is_valid_ipv4;
///
/// assert!(is_valid_ipv4("192.168.1.1"));
/// assert!(is_valid_ipv4("0.0.0.0"));
/// assert!(!is_valid_ipv4("256.1.1.1"));
/// assert!(!is_valid_ipv4("01.2.3.4"));
/// ```
pub fn is_valid_ipv4(s: &str) -> bool {
    let parts: Vec<&str> = s.split('.').collect();
    if parts.len() != 4 {
        return false;
    }

    parts.iter().all(|part| is_canonical_octet(part))
}

fn is_canonical_octet(part: &str) -> bool {
    if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if part.len() > 1 && part.starts_with('0') {
        return false;
    }
    match part.parse::<u16>() {
        Ok(value) => value <= 255 && value.to_string() == part,
        Err(_) => false,
    }
}

/// Returns the first address in `text` (scanning left to right) that passes
/// [`is_valid_ipv4`], or `None`.
///
/// When a candidate fails validation, scanning resumes at its second digit
/// run. Longer dotted runs therefore still yield their valid tail:
/// "999.1.1.1.1" gives "1.1.1.1". A digit run is never split, so
/// "01.2.3.4" gives nothing.
///
/// # Examples
///
/// ```
/// use ipeed::extract_first_valid_ipv4;
///
/// let ip = extract_first_valid_ipv4("text 999.1.1.1 then 10.0.0.1 end");
/// assert_eq!(ip.as_ref().map(|ip| ip.as_str()), Some("10.0.0.1"));
/// ```
pub fn extract_first_valid_ipv4(text: &str) -> Option<Ipv4> {
    let mut start = 0;
    while let Some(m) = CANDIDATE_PATTERN.find_at(text, start) {
        let candidate = m.as_str();
        if is_valid_ipv4(candidate) {
            return Some(Ipv4(candidate.to_string()));
        }
        // the pattern guarantees a dot inside every match
        let first_dot = candidate.find('.')?;
        start = m.start() + first_dot + 1;
    }
    None
}

/// A validated dotted-decimal IPv4 address.
///
/// Can only be constructed through validation, so holding one means the text
/// is canonical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ipv4(String);

impl Ipv4 {
    /// Returns the address text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Ipv4 {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_valid_ipv4(s) {
            Ok(Ipv4(s.to_string()))
        } else {
            Err(ResolutionError::InvalidInput(s.to_string()))
        }
    }
}

impl TryFrom<String> for Ipv4 {
    type Error = ResolutionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_valid_ipv4(&value) {
            Ok(Ipv4(value))
        } else {
            Err(ResolutionError::InvalidInput(value))
        }
    }
}

impl From<Ipv4> for String {
    fn from(ip: Ipv4) -> Self {
        ip.0
    }
}

impl AsRef<str> for Ipv4 {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ipv4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Five-digit class number, one space, then a two to four syllable Hangul name.
const STUDENT_ID_PATTERN: &str = r"^[0-9]{5}\s[가-힣]{2,4}$";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StudentIdError {
    #[error("student id is empty")]
    Empty,
    #[error("invalid student id {0:?} (expected e.g. \"10218 홍길동\")")]
    Malformed(String),
}

/// A validated student identifier such as `10218 홍길동`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StudentId(String);

fn pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(STUDENT_ID_PATTERN).expect("valid student id regex"))
}

pub fn is_valid_student_id(candidate: &str) -> bool {
    pattern().is_match(candidate)
}

impl StudentId {
    pub fn parse(candidate: &str) -> Result<Self, StudentIdError> {
        if candidate.is_empty() {
            return Err(StudentIdError::Empty);
        }
        if !is_valid_student_id(candidate) {
            return Err(StudentIdError::Malformed(candidate.to_string()));
        }
        Ok(Self(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for StudentId {
    type Err = StudentIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for StudentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_valid_ids() {
        assert!(is_valid_student_id("10218 홍길동"));
        assert!(is_valid_student_id("30101 김철"));
        assert!(is_valid_student_id("20305 남궁민수"));
    }

    #[test]
    fn test_invalid_ids() {
        assert!(!is_valid_student_id("1021 홍길동"));
        assert!(!is_valid_student_id("102188 홍길동"));
        assert!(!is_valid_student_id("10218홍길동"));
        assert!(!is_valid_student_id("10218  홍길동"));
        assert!(!is_valid_student_id("10218 홍"));
        assert!(!is_valid_student_id("10218 홍길동전설"));
        assert!(!is_valid_student_id("10218 hong"));
        assert!(!is_valid_student_id("10218 ㅎㄱㄷ"));
        assert!(!is_valid_student_id(" 10218 홍길동"));
        assert!(!is_valid_student_id("10218 홍길동 "));
    }

    #[test]
    fn test_parse() {
        let id: StudentId = "10218 홍길동".parse().unwrap();
        assert_eq!(id.as_str(), "10218 홍길동");
        assert_eq!(id.to_string(), "10218 홍길동");

        assert_matches!(StudentId::parse(""), Err(StudentIdError::Empty));
        assert_matches!(StudentId::parse("abc"), Err(StudentIdError::Malformed(s)) if s == "abc");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = StudentId::parse("10218 홍길동").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"10218 홍길동\"");
    }
}

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Practice modes offered by the trainer.
///
/// The `Display` form is the wire name used by the backend in URLs and records.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    ValueEnum,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
pub enum PracticeMode {
    #[strum(serialize = "자리")]
    #[serde(rename = "자리")]
    #[default]
    Keys,
    #[strum(serialize = "낱말")]
    #[serde(rename = "낱말")]
    Words,
    #[strum(serialize = "문장")]
    #[serde(rename = "문장")]
    Sentences,
    #[strum(serialize = "문단")]
    #[serde(rename = "문단")]
    Paragraphs,
}

impl PracticeMode {
    pub const ALL: [PracticeMode; 4] = [
        PracticeMode::Keys,
        PracticeMode::Words,
        PracticeMode::Sentences,
        PracticeMode::Paragraphs,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            PracticeMode::Keys => "자리 연습",
            PracticeMode::Words => "낱말 연습",
            PracticeMode::Sentences => "문장 연습",
            PracticeMode::Paragraphs => "문단 연습",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PracticeMode::Keys => "파이썬 키워드와 키보드를 연습하세요",
            PracticeMode::Words => "파이썬 키워드와 함수명을 연습하세요",
            PracticeMode::Sentences => "파이썬 구문과 표현식을 연습하세요",
            PracticeMode::Paragraphs => "완전한 파이썬 코드 블록을 연습하세요",
        }
    }

    /// Looks a mode up by its wire name
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.to_string() == name)
    }
}

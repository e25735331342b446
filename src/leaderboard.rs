use std::cmp::Ordering;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

use crate::mode::PracticeMode;

/// A stored record as returned by the leaderboard endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardRecord {
    pub id: i64,
    pub student_id: String,
    pub mode: PracticeMode,
    pub wpm: u32,
    pub accuracy: f64,
    pub score: u32,
    pub duration_sec: u32,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Paging block of `GET /api/records`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
    pub total: u32,
    pub has_more: bool,
    pub current_count: u32,
}

/// One page of ranked records for a mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordsPage {
    pub mode: PracticeMode,
    pub records: Vec<LeaderboardRecord>,
    pub pagination: Pagination,
}

/// Class-wide totals across every mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordStats {
    pub total_students: u32,
    pub total_records: u32,
    pub avg_wpm: f64,
    pub avg_accuracy: f64,
}

/// Ranking order: score, then accuracy, then wpm (all descending), earliest record first on ties.
pub fn compare_records(a: &LeaderboardRecord, b: &LeaderboardRecord) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| b.accuracy.total_cmp(&a.accuracy))
        .then_with(|| b.wpm.cmp(&a.wpm))
        .then_with(|| match (a.created_at, b.created_at) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

pub fn rank(records: &mut [LeaderboardRecord]) {
    records.sort_by(compare_records);
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{text}{}", " ".repeat(fill))
}

/// Plain-text table of ranked records for terminal output
pub fn render_table(mode: PracticeMode, records: &[LeaderboardRecord]) -> String {
    render_ranked(&format!("{} TOP {}", mode.title(), records.len()), 1, records)
}

/// Like [`render_table`], numbered from the page offset, with a hint for the next page
pub fn render_page(page: &RecordsPage) -> String {
    let p = &page.pagination;
    let title = if page.records.is_empty() {
        format!("{} ({} records)", page.mode.title(), p.total)
    } else {
        format!(
            "{} {}-{} of {}",
            page.mode.title(),
            p.offset + 1,
            p.offset + p.current_count,
            p.total
        )
    };

    let mut out = render_ranked(&title, p.offset as usize + 1, &page.records);
    if p.has_more {
        out.push_str(&format!("more: --offset {}\n", p.offset + p.limit));
    }
    out
}

pub fn render_stats(stats: &RecordStats) -> String {
    format!(
        "{} students, {} records, avg {:.1} wpm, avg {:.1}% acc\n",
        stats.total_students, stats.total_records, stats.avg_wpm, stats.avg_accuracy
    )
}

fn render_ranked(title: &str, first_rank: usize, records: &[LeaderboardRecord]) -> String {
    let mut out = format!("{title}\n");

    if records.is_empty() {
        out.push_str("no records yet\n");
        return out;
    }

    let name_width = records
        .iter()
        .map(|r| r.student_id.width())
        .max()
        .unwrap_or(0)
        .max("student".len());

    out.push_str(&format!(
        "{:>4}  {}  {:>6}  {:>5}  {:>6}\n",
        "rank",
        pad("student", name_width),
        "score",
        "wpm",
        "acc"
    ));

    for (idx, record) in records.iter().enumerate() {
        out.push_str(&format!(
            "{:>4}  {}  {:>6}  {:>5}  {:>5.1}%\n",
            first_rank + idx,
            pad(&record.student_id, name_width),
            record.score,
            record.wpm,
            record.accuracy
        ));
    }

    out
}

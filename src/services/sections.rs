use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// Resume sections recognised by header lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Education,
    Experience,
    Skills,
    Projects,
    Competitive,
    Achievements,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Education => "education",
            SectionKind::Experience => "experience",
            SectionKind::Skills => "skills",
            SectionKind::Projects => "projects",
            SectionKind::Competitive => "competitive",
            SectionKind::Achievements => "achievements",
        }
    }
}

// Checked in this order; the first matching header wins.
static HEADER_PATTERNS: Lazy<Vec<(SectionKind, Regex)>> = Lazy::new(|| {
    [
        (
            SectionKind::Education,
            r"(?i)^(?:education|academic background|educational qualifications|academic details|qualification)s?(?:\s*:|\s*$)",
        ),
        (
            SectionKind::Experience,
            r"(?i)^(?:experience|work experience|employment|professional experience|work history)s?(?:\s*:|\s*$)",
        ),
        (
            SectionKind::Skills,
            r"(?i)^(?:skills|technical skills|core competencies|expertise|technologies|technical expertise)s?(?:\s*:|\s*$)",
        ),
        (
            SectionKind::Projects,
            r"(?i)^(?:projects?|personal projects?|academic projects?|major projects?)(?:\s*:|\s*$)",
        ),
        (
            SectionKind::Competitive,
            r"(?i)^(?:competitive programming|coding profiles?|programming profiles?|competitive coding|online judges?|coding platforms?)(?:\s*:|\s*$)",
        ),
        (
            SectionKind::Achievements,
            r"(?i)^(?:achievements?|accomplishments?|honors?|awards?|certifications?)(?:\s*:|\s*$)",
        ),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).expect("valid section header pattern")))
    .collect()
});

/// Line range of a section body. `start` is the line after the header and
/// `end` (exclusive) is the next detected header, or the end of the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSpan {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Sections {
    spans: HashMap<SectionKind, SectionSpan>,
    order: Vec<SectionKind>,
}

impl Sections {
    /// Scans `text` line by line for section headers.
    pub fn detect(text: &str) -> Self {
        let lines: Vec<&str> = text.split('\n').collect();
        let mut headers: Vec<(SectionKind, usize)> = Vec::new();

        for (index, raw) in lines.iter().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(kind) = header_kind(line) {
                headers.push((kind, index));
            }
        }

        let mut sections = Sections::default();
        for (position, (kind, index)) in headers.iter().enumerate() {
            let end = headers
                .get(position + 1)
                .map(|(_, next)| *next)
                .unwrap_or(lines.len());
            // A repeated header replaces the earlier span.
            sections.spans.insert(
                *kind,
                SectionSpan {
                    start: index + 1,
                    end,
                },
            );
            sections.order.push(*kind);
        }

        sections
    }

    pub fn span(&self, kind: SectionKind) -> Option<&SectionSpan> {
        self.spans.get(&kind)
    }

    /// Section names in the order their headers appear, repeats included.
    pub fn names(&self) -> Vec<&'static str> {
        self.order.iter().map(SectionKind::as_str).collect()
    }

    /// The body lines of `kind`, taken from the same `lines` the text was split into.
    pub fn lines<'a>(&self, kind: SectionKind, lines: &'a [&'a str]) -> Option<&'a [&'a str]> {
        let span = self.span(kind)?;
        let end = span.end.min(lines.len());
        let start = span.start.min(end);
        Some(&lines[start..end])
    }
}

fn header_kind(line: &str) -> Option<SectionKind> {
    HEADER_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(line))
        .map(|(kind, _)| *kind)
}

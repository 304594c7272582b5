use std::fmt::Write as _;

use crate::models::{ParsedResume, MIME_DOC, MIME_DOCX, MIME_PDF};

/// One titled block of the result view.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub title: &'static str,
    pub lines: Vec<String>,
}

impl Card {
    fn new(title: &'static str) -> Self {
        Self {
            title,
            lines: Vec::new(),
        }
    }

    fn push_field(&mut self, label: &str, value: &str) {
        if !value.is_empty() {
            self.lines.push(format!("{label}: {value}"));
        }
    }

    fn push_line(&mut self, indent: usize, value: &str) {
        if !value.is_empty() {
            self.lines.push(format!("{}{}", "  ".repeat(indent), value));
        }
    }
}

/// Builds the result cards. Personal Information is always present; every
/// other card appears only when it has something to show.
pub fn cards(parsed: &ParsedResume) -> Vec<Card> {
    let mut cards = Vec::new();

    let mut personal = Card::new("Personal Information");
    personal.push_field("Name", &parsed.name);
    personal.push_field("Email", &parsed.contact.email);
    personal.push_field("Phone", &parsed.contact.phone);
    personal.push_field("Location", &parsed.contact.location);
    personal.push_field("LinkedIn", &parsed.contact.linkedin);
    cards.push(personal);

    if !parsed.education.is_empty() {
        let mut card = Card::new("Education");
        for edu in &parsed.education {
            card.push_line(0, &edu.year);
            card.push_line(1, &edu.degree);
            card.push_line(1, &edu.institution);
            if !edu.grade.is_empty() {
                card.push_line(1, &format!("Grade: {}", edu.grade));
            }
        }
        cards.push(card);
    }

    if parsed.skills.values().any(|skills| !skills.is_empty()) {
        let mut card = Card::new("Technical Skills");
        for (category, skills) in &parsed.skills {
            if skills.is_empty() {
                continue;
            }
            card.push_line(0, category);
            card.push_line(1, &skills.join(" | "));
        }
        cards.push(card);
    }

    if !parsed.experience.is_empty() {
        let mut card = Card::new("Work Experience");
        for exp in &parsed.experience {
            card.push_line(0, &exp.role);
            card.push_line(1, &exp.company);
            card.push_line(1, &exp.dates);
            card.push_line(1, &exp.details);
        }
        cards.push(card);
    }

    if !parsed.projects.is_empty() {
        let mut card = Card::new("Projects");
        for project in &parsed.projects {
            card.push_line(0, &project.title);
            card.push_line(1, &project.description);
            let technologies = project.technology_list();
            if !technologies.is_empty() {
                card.push_line(1, &format!("Technologies Used: {}", technologies.join(" | ")));
            }
        }
        cards.push(card);
    }

    let profiles = &parsed.competitive_programming.profiles;
    if !profiles.is_empty() {
        let mut card = Card::new("Programming Profiles");
        for (platform, profile) in profiles {
            card.push_line(0, platform);
            card.push_line(1, &profile.username);
            if let Some(rating) = profile.rating.as_deref().filter(|r| !r.is_empty()) {
                card.push_line(1, &format!("Rating: {rating}"));
            }
        }
        cards.push(card);
    }

    if !parsed.achievements.is_empty() {
        let mut card = Card::new("Achievements");
        for achievement in &parsed.achievements {
            card.push_line(0, &format!("* {achievement}"));
        }
        cards.push(card);
    }

    cards
}

/// Renders the cards as plain text, separated by blank lines.
pub fn render_resume(parsed: &ParsedResume) -> String {
    let mut out = String::new();
    for (i, card) in cards(parsed).iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{}", card.title);
        let _ = writeln!(out, "{}", "-".repeat(card.title.len()));
        for line in &card.lines {
            let _ = writeln!(out, "{line}");
        }
    }
    out
}

/// Human-readable size with up to two decimals, e.g. `1.5 KB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    while unit + 1 < UNITS.len() && bytes >= 1024u64.pow(unit as u32 + 1) {
        unit += 1;
    }

    let value = bytes as f64 / 1024f64.powi(unit as i32);
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

pub fn file_type_text(mime_type: &str) -> &'static str {
    match mime_type {
        MIME_PDF => "PDF",
        MIME_DOC | MIME_DOCX => "Document",
        _ => "File",
    }
}

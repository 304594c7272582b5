use std::collections::BTreeSet;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::models::{
    CodingProfile, CompetitiveProgramming, ContactInfo, EducationEntry, ExperienceEntry,
    ParsedResume, ProjectEntry,
};
use crate::services::sections::{SectionKind, Sections};

const NAME_SCAN_CHARS: usize = 1000;
const NAME_SCAN_LINES: usize = 3;
const OTHER_SKILLS: &str = "Other Skills";

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());
static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:\+?\d{1,3}[-. ]?)?\(?\d{3}\)?[-. ]?\d{3}[-. ]?\d{4}\b").unwrap()
});
static LOCATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:address|location|residing at|based in)[^\n]*").unwrap());
static LINKEDIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:https?://)?(?:www\.)?linkedin\.com/in/[a-zA-Z0-9-]+").unwrap()
});

static DEGREE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(b\.?tech|m\.?tech|b\.?e|m\.?e|b\.?sc|m\.?sc|phd|bachelor|master|diploma)")
        .unwrap()
});
static YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:19|20)\d{2}(?:\s*-\s*(?:19|20)\d{2}|(?:\s*-\s*)?present)?").unwrap()
});
static GRADE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:(?:cgpa|gpa|percentage|score)\s*:?\s*)((?:\d+\.?\d*)|(?:\d+\.?\d*%?))")
        .unwrap()
});
static INSTITUTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:university|institute|college|school)\s+(?:of\s+)?[A-Za-z\s,]+").unwrap()
});

static SKILL_CATEGORY_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w\s&]+:?$").unwrap());
static SKILL_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,|•]").unwrap());

/// Known skills per category. Each keyword is matched as a whole token so
/// short names like `r` or `go` do not fire inside longer words.
static SKILL_KEYWORDS: Lazy<Vec<(&'static str, Vec<Regex>)>> = Lazy::new(|| {
    let categories: [(&str, &[&str]); 6] = [
        (
            "Programming Languages",
            &[
                "python", "java", r"c\+\+", "javascript", "ruby", "php", "swift", "kotlin", "go",
                "rust", "c#", "scala", "r", "matlab", "perl", "typescript", "dart",
            ],
        ),
        (
            "Web Technologies",
            &[
                "html5?", "css3?", "sass", "less", "jquery", "ajax", "rest", "graphql", "xml",
                "json", "websocket",
            ],
        ),
        (
            "Frameworks",
            &[
                "react", "angular", "vue", "django", "flask", "spring", "express", "laravel",
                "rails", r"next\.?js", r"node\.?js", "bootstrap", "tailwind",
            ],
        ),
        (
            "Databases",
            &[
                "mysql", "postgresql", "mongodb", "oracle", "sqlite", "redis", "cassandra",
                "elasticsearch", "neo4j", "mariadb", "dynamodb",
            ],
        ),
        (
            "Cloud & DevOps",
            &[
                "aws", "azure", "gcp", "docker", "kubernetes", "jenkins", "git", "ci/cd",
                "terraform", "ansible", "nginx", "apache",
            ],
        ),
        (
            "Tools & Technologies",
            &[
                r"vs\s*code", "intellij", "eclipse", "git", "docker", "postman", "jira",
                "confluence", "maven", "gradle", "npm", "yarn", "webpack",
            ],
        ),
    ];

    categories
        .iter()
        .map(|(category, keywords)| {
            let patterns = keywords
                .iter()
                .map(|kw| Regex::new(&format!(r"(?i)(?:^|[^\w+#])({kw})(?:$|[^\w+#])")).unwrap())
                .collect();
            (*category, patterns)
        })
        .collect()
});

static COMPANY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:\bat|\bwith|@)\s+([\w\s&\-.,]+)").unwrap());
static ROLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(software|developer|engineer|intern|analyst|consultant|manager|lead|architect)")
        .unwrap()
});
static DATE_RANGE: Lazy<Regex> = Lazy::new(|| {
    let month = r"(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\.?\s*(?:19|20)\d{2}";
    Regex::new(&format!(
        r"(?:{month}|(?:19|20)\d{{2}})(?:\s*-\s*(?:{month}|(?:19|20)\d{{2}}|present))?"
    ))
    .unwrap()
});

static PROJECT_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:project|•|\d+\.|\*)\s*(.+?)(?::|$)").unwrap());
static PROJECT_TECH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:technologies?|tech stack|built with|developed using|tools used)[:\s]*(.*?)(?:\.|$)",
    )
    .unwrap()
});

static PLATFORMS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("leetcode", "leetcode"),
        ("codechef", "codechef"),
        ("codeforces", "codeforces"),
        ("hackerrank", "hackerrank"),
        ("geeksforgeeks", "(?:geeksforgeeks|gfg)"),
    ]
    .into_iter()
    .map(|(platform, name)| {
        let pattern = format!(r"(?i){name}[:\s]*([\w-]+)(?:\s*\(.*?(\d+).*?\))?");
        (platform, Regex::new(&pattern).unwrap())
    })
    .collect()
});
static RATING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(?:rating|score)[:\s]*(\d+)").unwrap());
static RANK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:rank|ranking)[:\s]*(?:global|world|india)?[:\s]*(?:#)?(\d+)").unwrap()
});
static CONTEST: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(?:contest|competition)").unwrap());

static ACHIEVEMENT_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-•*]|\d+\.|\(?\d+\))").unwrap());
static ACHIEVEMENT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(?:won|winner|awarded|received|achieved|secured|qualified).*?(?:award|prize|medal|certification|rank)",
        r"(?i)(?:first|1st|second|2nd|third|3rd).*?(?:place|position|prize|rank)",
        r"(?i)(?:gold|silver|bronze).*?(?:medal|award|prize)",
        r"(?i)(?:national|international|global).*?(?:competition|contest|championship)",
    ]
    .into_iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Runs every extractor over the plain text of a resume.
pub fn parse_resume(text: &str) -> ParsedResume {
    let sections = Sections::detect(text);
    debug!(sections = ?sections.names(), "Identified resume sections");

    ParsedResume {
        name: extract_name(text),
        contact: extract_contact_info(text),
        education: extract_education(text, &sections),
        skills: extract_skills(text, &sections),
        experience: extract_experience(text, &sections),
        projects: extract_projects(text, &sections),
        competitive_programming: extract_competitive_programming(text, &sections),
        achievements: extract_achievements(text, &sections),
    }
}

/// Picks the first name-shaped line among the opening lines of the
/// document. Blank lines still count towards the lines scanned.
pub fn extract_name(text: &str) -> String {
    let head: String = text.chars().take(NAME_SCAN_CHARS).collect();

    head.split('\n')
        .take(NAME_SCAN_LINES)
        .map(str::trim)
        .filter(|line| !line.is_empty() && !mentions_resume(line))
        .find(|line| looks_like_person_name(line))
        .map(str::to_string)
        .unwrap_or_default()
}

fn mentions_resume(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("resume")
        || lower.contains("curriculum")
        || lower.split(|c: char| !c.is_alphanumeric()).any(|w| w == "cv")
}

fn looks_like_person_name(line: &str) -> bool {
    let words: Vec<&str> = line.split_whitespace().collect();
    if !(2..=4).contains(&words.len()) {
        return false;
    }
    words.iter().all(|word| {
        let mut chars = word.chars();
        let starts_upper = chars.next().map(|c| c.is_uppercase()).unwrap_or(false);
        starts_upper
            && word.chars().count() <= 20
            && word
                .chars()
                .all(|c| c.is_alphabetic() || matches!(c, '.' | '\'' | '-'))
    })
}

pub fn extract_contact_info(text: &str) -> ContactInfo {
    let location = LOCATION
        .find(text)
        .and_then(|m| m.as_str().split_once(':'))
        .map(|(_, value)| value.trim().to_string())
        .unwrap_or_default();

    ContactInfo {
        email: first_match(&EMAIL, text),
        phone: first_match(&PHONE, text),
        location,
        linkedin: first_match(&LINKEDIN, text),
    }
}

fn first_match(pattern: &Regex, text: &str) -> String {
    pattern
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

pub fn extract_education(text: &str, sections: &Sections) -> Vec<EducationEntry> {
    let all_lines: Vec<&str> = text.split('\n').collect();
    let Some(lines) = sections.lines(SectionKind::Education, &all_lines) else {
        return Vec::new();
    };

    let mut education = Vec::new();
    let mut current: Option<EducationEntry> = None;

    for raw in lines {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let degree = DEGREE.is_match(line);
        let year = YEAR.find(line);

        if degree || year.is_some() {
            if let Some(done) = current.take() {
                education.push(done);
            }
            current = Some(EducationEntry::default());
        }

        let Some(entry) = current.as_mut() else {
            continue;
        };

        if degree && entry.degree.is_empty() {
            entry.degree = line.to_string();
        }
        if let Some(year) = year {
            if entry.year.is_empty() {
                entry.year = year.as_str().to_string();
            }
        }
        if let Some(grade) = GRADE.captures(line).and_then(|c| c.get(1)) {
            if entry.grade.is_empty() {
                entry.grade = grade.as_str().to_string();
            }
        }
        if INSTITUTION.is_match(line) && entry.institution.is_empty() {
            entry.institution = line.to_string();
        }
    }

    education.extend(current);
    education
}

/// Groups skills by category. The fixed categories come first in their
/// table order, then `Other Skills`, then labels found in the text.
pub fn extract_skills(text: &str, sections: &Sections) -> IndexMap<String, Vec<String>> {
    let all_lines: Vec<&str> = text.split('\n').collect();
    let Some(lines) = sections.lines(SectionKind::Skills, &all_lines) else {
        return IndexMap::new();
    };

    let mut by_category: IndexMap<String, BTreeSet<String>> = SKILL_KEYWORDS
        .iter()
        .map(|(category, _)| category.to_string())
        .chain(std::iter::once(OTHER_SKILLS.to_string()))
        .map(|category| (category, BTreeSet::new()))
        .collect();
    let mut current_category = OTHER_SKILLS.to_string();

    for raw in lines {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        // A bare label line opens a new category unless it is itself a known skill.
        if SKILL_CATEGORY_HEADER.is_match(line) && (line.ends_with(':') || !has_known_skill(line)) {
            current_category = line.trim_end_matches(':').trim().to_string();
            by_category.entry(current_category.clone()).or_default();
            continue;
        }

        for (category, patterns) in SKILL_KEYWORDS.iter() {
            for pattern in patterns {
                for caps in pattern.captures_iter(line) {
                    if let Some(skill) = caps.get(1) {
                        by_category
                            .entry(category.to_string())
                            .or_default()
                            .insert(title_case(skill.as_str().trim()));
                    }
                }
            }
        }

        for piece in SKILL_SEPARATOR.split(line) {
            let skill = piece.trim();
            if !skill.is_empty() && !has_known_skill(skill) {
                by_category
                    .entry(current_category.clone())
                    .or_default()
                    .insert(title_case(skill));
            }
        }
    }

    by_category
        .into_iter()
        .filter(|(_, skills)| !skills.is_empty())
        .map(|(category, skills)| (category, skills.into_iter().collect()))
        .collect()
}

fn has_known_skill(text: &str) -> bool {
    SKILL_KEYWORDS
        .iter()
        .flat_map(|(_, patterns)| patterns.iter())
        .any(|pattern| pattern.is_match(text))
}

/// Capitalises the first letter of every alphabetic run and lowercases the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

pub fn extract_experience(text: &str, sections: &Sections) -> Vec<ExperienceEntry> {
    let all_lines: Vec<&str> = text.split('\n').collect();
    let Some(lines) = sections.lines(SectionKind::Experience, &all_lines) else {
        return Vec::new();
    };

    let mut experience = Vec::new();
    let mut current: Option<ExperienceEntry> = None;
    let mut description: Vec<&str> = Vec::new();

    for raw in lines {
        let line = raw.trim();
        if line.is_empty() {
            // A blank line closes an entry only once it has a description.
            if current.is_some() && !description.is_empty() {
                if let Some(mut done) = current.take() {
                    done.details = description.join(" ");
                    experience.push(done);
                }
                description.clear();
            }
            continue;
        }

        let role = ROLE.is_match(line);
        let dates = DATE_RANGE.find(line);

        if role || dates.is_some() {
            if let Some(mut done) = current.take() {
                done.details = description.join(" ");
                experience.push(done);
                description.clear();
            }

            let mut entry = ExperienceEntry::default();
            if role {
                entry.role = line.to_string();
            }
            if let Some(company) = COMPANY.captures(line).and_then(|c| c.get(1)) {
                entry.company = company.as_str().trim().to_string();
            }
            if let Some(dates) = dates {
                entry.dates = dates.as_str().to_string();
            }
            current = Some(entry);
        } else if current.is_some() {
            description.push(line);
        }
    }

    if let Some(mut done) = current {
        if !description.is_empty() {
            done.details = description.join(" ");
            experience.push(done);
        }
    }

    experience
}

pub fn extract_projects(text: &str, sections: &Sections) -> Vec<ProjectEntry> {
    let all_lines: Vec<&str> = text.split('\n').collect();
    let Some(lines) = sections.lines(SectionKind::Projects, &all_lines) else {
        return Vec::new();
    };

    let mut projects = Vec::new();
    let mut current: Option<ProjectEntry> = None;
    let mut description: Vec<&str> = Vec::new();

    for raw in lines {
        let line = raw.trim();
        if line.is_empty() {
            if current.is_some() && !description.is_empty() {
                if let Some(mut done) = current.take() {
                    done.description = description.join(" ");
                    projects.push(done);
                }
                description.clear();
            }
            continue;
        }

        if let Some(title) = PROJECT_TITLE.captures(line).and_then(|c| c.get(1)) {
            if let Some(mut done) = current.take() {
                done.description = description.join(" ");
                projects.push(done);
                description.clear();
            }

            let mut entry = ProjectEntry {
                title: title.as_str().trim().to_string(),
                ..ProjectEntry::default()
            };
            if let Some(tech) = technologies_in(line) {
                entry.technologies = tech;
            }
            current = Some(entry);
        } else if let Some(entry) = current.as_mut() {
            match technologies_in(line) {
                Some(tech) if entry.technologies.is_empty() => entry.technologies = tech,
                _ => description.push(line),
            }
        }
    }

    if let Some(mut done) = current {
        if !description.is_empty() {
            done.description = description.join(" ");
            projects.push(done);
        }
    }

    projects
}

fn technologies_in(line: &str) -> Option<String> {
    PROJECT_TECH
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

pub fn extract_competitive_programming(text: &str, sections: &Sections) -> CompetitiveProgramming {
    let all_lines: Vec<&str> = text.split('\n').collect();
    // Without a dedicated section the whole document is searched.
    let lines = sections
        .lines(SectionKind::Competitive, &all_lines)
        .unwrap_or(&all_lines);

    let mut info = CompetitiveProgramming::default();

    for raw in lines {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        for (platform, pattern) in PLATFORMS.iter() {
            let Some(caps) = pattern.captures(line) else {
                continue;
            };
            let username = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
            let rating = caps.get(2).map(|m| m.as_str().to_string());
            info.profiles
                .insert(platform.to_string(), CodingProfile { username, rating });

            if RATING.is_match(line) || RANK.is_match(line) {
                push_unique(&mut info.achievements, line);
            }
        }

        let lower = line.to_lowercase();
        let names_platform = PLATFORMS.iter().any(|(platform, _)| lower.contains(*platform));
        if CONTEST.is_match(line) && !names_platform {
            push_unique(&mut info.achievements, line);
        }
    }

    info
}

pub fn extract_achievements(text: &str, sections: &Sections) -> Vec<String> {
    let all_lines: Vec<&str> = text.split('\n').collect();
    let mut achievements = Vec::new();

    if let Some(lines) = sections.lines(SectionKind::Achievements, &all_lines) {
        let mut current: Vec<&str> = Vec::new();
        for raw in lines {
            let line = raw.trim();
            if line.is_empty() {
                if !current.is_empty() {
                    achievements.push(current.join(" "));
                    current.clear();
                }
                continue;
            }

            if ACHIEVEMENT_BULLET.is_match(line) {
                if !current.is_empty() {
                    achievements.push(current.join(" "));
                    current.clear();
                }
                current.push(strip_bullet(line));
            } else {
                current.push(line);
            }
        }
        if !current.is_empty() {
            achievements.push(current.join(" "));
        }
    }

    for raw in &all_lines {
        let line = raw.trim();
        if ACHIEVEMENT_PATTERNS.iter().any(|p| p.is_match(line)) {
            push_unique(&mut achievements, line);
        }
    }

    achievements
}

fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(|c: char| "[-•*0123456789.) ]".contains(c))
}

fn push_unique(items: &mut Vec<String>, line: &str) {
    if !items.iter().any(|existing| existing == line) {
        items.push(line.to_string());
    }
}

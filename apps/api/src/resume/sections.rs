//! Heuristic resume section detection: summary paragraph and bullet lines.
//!
//! Line-pattern scanning only. Results feed the Editor stage and the
//! side-by-side view; they are never validated by a model.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::agents::schema::normalize_whitespace;

/// Default number of bullets handed to the Editor.
pub const MAX_BULLETS: usize = 8;

const SUMMARY_FALLBACK_CHARS: usize = 800;
const SUMMARY_MAX_CHARS: usize = 900;
const HEADING_MAX_CHARS: usize = 70;
const BULLET_MIN_CHARS: usize = 20;
const BULLET_MAX_CHARS: usize = 240;

const BULLET_PREFIXES: &[&str] = &["- ", "* ", "\u{2022}", "\u{25cf}"];
const BULLET_MARKERS: &[char] = &['-', '*', '\u{2022}', '\u{25cf}', ' '];

fn summary_heading() -> &'static Regex {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    HEADING.get_or_init(|| {
        Regex::new(r"(?im)^(professional\s+summary|summary|profile|about)\s*:?\s*$")
            .expect("summary heading pattern is valid")
    })
}

fn section_stop() -> &'static Regex {
    static STOP: OnceLock<Regex> = OnceLock::new();
    STOP.get_or_init(|| {
        Regex::new(
            r"(?i)^(experience|work\s+experience|education|skills|projects|certifications|achievements|publications|contact)\b",
        )
        .expect("section stop pattern is valid")
    })
}

/// Returns the resume's summary paragraph, or the first 800 characters of
/// whitespace-collapsed text when no summary heading is found.
pub fn extract_summary_candidate(resume_text: &str) -> String {
    let text = resume_text.replace("\r\n", "\n");

    let Some(heading) = summary_heading().find(&text) else {
        return fallback_snippet(&text);
    };

    let mut collected: Vec<&str> = Vec::new();
    let mut collected_chars = 0;

    for line in text[heading.end()..].split('\n') {
        let stripped = line.trim();
        if stripped.is_empty() {
            if !collected.is_empty() {
                collected.push("");
            }
            continue;
        }
        if section_stop().is_match(stripped) {
            break;
        }
        if stripped.chars().count() < HEADING_MAX_CHARS
            && (is_all_caps(stripped) || stripped.ends_with(':'))
        {
            break;
        }
        collected.push(stripped);
        collected_chars += stripped.chars().count();
        if collected_chars > SUMMARY_MAX_CHARS {
            break;
        }
    }

    let candidate = collected.join("\n").trim().to_string();
    if candidate.is_empty() {
        fallback_snippet(&text)
    } else {
        candidate
    }
}

/// Lines that look like bullet points, marker stripped, 20–240 characters,
/// deduplicated case- and whitespace-insensitively. Scanning stops once
/// `max_bullets` candidates are collected.
pub fn extract_bullet_candidates(resume_text: &str, max_bullets: usize) -> Vec<String> {
    let text = resume_text.replace("\r\n", "\n");
    let mut bullets: Vec<String> = Vec::new();

    for line in text.split('\n').map(str::trim) {
        if line.is_empty() {
            continue;
        }
        if BULLET_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) {
            let clean = line.trim_start_matches(BULLET_MARKERS).trim();
            let len = clean.chars().count();
            if (BULLET_MIN_CHARS..=BULLET_MAX_CHARS).contains(&len) {
                bullets.push(clean.to_string());
            }
        }
        if bullets.len() >= max_bullets {
            break;
        }
    }

    let mut seen = HashSet::new();
    bullets
        .into_iter()
        .filter(|b| {
            let key = normalize_whitespace(b).to_lowercase();
            !key.is_empty() && seen.insert(key)
        })
        .collect()
}

/// Bounds user-provided text before it goes into a prompt.
pub fn trim_for_prompt(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(max_chars).collect();
    format!("{}\n\n[TRUNCATED]", cut.trim_end())
}

fn fallback_snippet(text: &str) -> String {
    normalize_whitespace(text)
        .chars()
        .take(SUMMARY_FALLBACK_CHARS)
        .collect()
}

/// At least one cased character and no lowercase ones.
fn is_all_caps(s: &str) -> bool {
    let has_cased = s.chars().any(|c| c.is_uppercase() || c.is_lowercase());
    has_cased && !s.chars().any(char::is_lowercase)
}

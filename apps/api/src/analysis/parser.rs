//! Splits model output into `###Heading###` sections and numbered sub-blocks.
//!
//! The parser never fails: markers it cannot read are left in the text, and a
//! heading that is absent simply yields an empty field.

use serde::{Deserialize, Serialize};

const MARKER: &str = "###";

/// One `###Heading###` block and the text that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

/// A numbered entry such as a recommended job: its title line and the
/// bullet points below it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberedItem {
    pub title: String,
    pub points: Vec<String>,
}

/// Finds every `###Heading###` marker and slices the text between a marker
/// and the next one (or the end of the input).
pub fn parse_sections(text: &str) -> Vec<Section> {
    let mut markers: Vec<(usize, usize, String)> = Vec::new();
    let mut cursor = 0;

    while let Some(found) = text[cursor..].find(MARKER) {
        let open = cursor + found;
        let inner_start = open + MARKER.len();
        let Some(close_rel) = text[inner_start..].find(MARKER) else {
            break;
        };
        let close = inner_start + close_rel;
        let raw = &text[inner_start..close];
        let heading = raw.trim().trim_matches('#').trim();

        if heading.is_empty() || raw.contains('\n') {
            // Not a heading (e.g. a stray "###" line); retry from the second marker.
            cursor = inner_start;
            continue;
        }

        markers.push((open, close + MARKER.len(), heading.to_string()));
        cursor = close + MARKER.len();
    }

    markers
        .iter()
        .enumerate()
        .map(|(i, (_, body_start, heading))| {
            let body_end = markers.get(i + 1).map_or(text.len(), |next| next.0);
            Section {
                heading: heading.clone(),
                body: text[*body_start..body_end]
                    .trim_start_matches('#')
                    .trim()
                    .to_string(),
            }
        })
        .collect()
}

/// Returns the body of the first section whose heading matches, comparing
/// case- and accent-insensitively.
pub fn find_section<'a>(sections: &'a [Section], heading: &str) -> Option<&'a str> {
    let wanted = normalize_heading(heading);
    sections
        .iter()
        .find(|s| normalize_heading(&s.heading) == wanted)
        .map(|s| s.body.as_str())
}

/// Cleaned body of a section, or an empty string when the heading is missing.
pub fn section_text(sections: &[Section], heading: &str) -> String {
    find_section(sections, heading)
        .map(strip_emphasis)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Removes markdown emphasis markers (`**`, `__`, `*`, backticks).
pub fn strip_emphasis(text: &str) -> String {
    text.replace("**", "")
        .replace("__", "")
        .replace(['*', '`'], "")
}

/// Splits a section body into numbered blocks (`1.`, `2)` ...). Lines before
/// the first number are ignored.
pub fn parse_numbered_items(body: &str) -> Vec<NumberedItem> {
    let mut items: Vec<NumberedItem> = Vec::new();

    for line in body.lines() {
        let clean = strip_emphasis(line);
        let clean = clean.trim();
        if clean.is_empty() {
            continue;
        }

        if let Some(title) = numbered_title(clean) {
            items.push(NumberedItem {
                title: tidy_title(title),
                points: Vec::new(),
            });
            continue;
        }

        let Some(current) = items.last_mut() else {
            continue;
        };
        let point = strip_bullet(clean);
        if point.is_empty() {
            continue;
        }
        if current.title.is_empty() {
            current.title = tidy_title(point);
        } else {
            current.points.push(point.to_string());
        }
    }

    items
}

/// `"3. Infirmier"` → `Some("Infirmier")`; digits must be followed by `.` or
/// `)` and then whitespace or the end of the line.
fn numbered_title(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 || digits > 3 {
        return None;
    }
    let rest = &line[digits..];
    let rest = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')'))?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(['-', '•', '–', '·'])
        .trim()
}

fn tidy_title(title: &str) -> String {
    title.trim().trim_end_matches(':').trim().to_string()
}

fn normalize_heading(heading: &str) -> String {
    heading
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' => 'i',
            'ô' | 'ö' => 'o',
            'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

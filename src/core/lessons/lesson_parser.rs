// =============================================================================
// LESSON PARSER
// =============================================================================
//
// Lesson notes are plain documents where each lesson starts with a dated
// heading line, e.g.
//
//   Monday 12th May 2025 - Lesson 14
//   Worked on scales...
//
//   2025-05-19
//   ...
//
// A paragraph counts as a heading when it is short and *starts* with a date.
// Everything up to the next heading is that lesson's body. Text before the
// first heading (student details, goals, etc.) is not a lesson.

use crate::core::docs::estimate_tokens;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Longest paragraph (in chars) that can still be a heading.
const MAX_HEADING_CHARS: usize = 80;

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

static DATE_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
        ^\s*
        (?:(?:mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?\s+)?
        (?:
            (?P<iso_y>\d{4})-(?P<iso_m>\d{1,2})-(?P<iso_d>\d{1,2})
          | (?P<num_d>\d{1,2})[/.\-](?P<num_m>\d{1,2})[/.\-](?P<num_y>\d{4}|\d{2})
          | (?P<dm_d>\d{1,2})(?:st|nd|rd|th)?\s+(?P<dm_m>[a-z]{3,9})\.?,?\s+(?P<dm_y>\d{4})
          | (?P<md_m>[a-z]{3,9})\.?\s+(?P<md_d>\d{1,2})(?:st|nd|rd|th)?,?\s+(?P<md_y>\d{4})
        )
        \b",
    )
    .expect("date heading regex is valid")
});

/// One dated section of a lesson-notes document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub date: NaiveDate,
    pub heading: String,
    pub text: String,
    pub token_count: usize,
}

/// Parses the date a heading line starts with, if it is a heading at all.
pub fn parse_heading_date(line: &str) -> Option<NaiveDate> {
    let line = line.trim();
    if line.is_empty() || line.chars().count() > MAX_HEADING_CHARS {
        return None;
    }

    let caps = DATE_HEADING.captures(line)?;
    let num = |name: &str| caps.name(name).and_then(|m| m.as_str().parse::<u32>().ok());

    let (year, month, day) = if let Some(y) = num("iso_y") {
        (y, num("iso_m")?, num("iso_d")?)
    } else if let Some(y) = num("num_y") {
        (expand_year(y, caps.name("num_y")?.as_str().len()), num("num_m")?, num("num_d")?)
    } else if let Some(y) = num("dm_y") {
        (y, month_from_name(caps.name("dm_m")?.as_str())?, num("dm_d")?)
    } else {
        let y = num("md_y")?;
        (y, month_from_name(caps.name("md_m")?.as_str())?, num("md_d")?)
    };

    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

/// Splits document paragraphs into lessons, in document order.
pub fn parse_lessons(paragraphs: &[String]) -> Vec<Lesson> {
    let mut lessons = Vec::new();
    let mut current: Option<(NaiveDate, String, Vec<&str>)> = None;

    for paragraph in paragraphs {
        if let Some(date) = parse_heading_date(paragraph) {
            if let Some(open) = current.take() {
                lessons.push(finish_lesson(open));
            }
            current = Some((date, paragraph.trim().to_string(), Vec::new()));
        } else if let Some((_, _, body)) = current.as_mut() {
            body.push(paragraph.as_str());
        }
    }

    if let Some(open) = current {
        lessons.push(finish_lesson(open));
    }

    lessons
}

fn finish_lesson((date, heading, body): (NaiveDate, String, Vec<&str>)) -> Lesson {
    let text = body.join("\n").trim().to_string();
    let token_count = estimate_tokens(&heading) + estimate_tokens(&text);
    Lesson {
        date,
        heading,
        text,
        token_count,
    }
}

fn month_from_name(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    if name == "sept" {
        return Some(9);
    }
    if name.len() < 3 {
        return None;
    }

    MONTHS
        .iter()
        .position(|full| full.starts_with(&name))
        .map(|i| i as u32 + 1)
}

fn expand_year(year: u32, digits: usize) -> u32 {
    if digits == 2 {
        2000 + year
    } else {
        year
    }
}

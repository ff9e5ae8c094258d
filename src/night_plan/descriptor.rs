// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Extraction of run and night metadata from section labels.
//!
//! Run labels are free text, e.g.
//! `run 3, 110.2474.004, UTs, MATISSE, LR`. Anything that can't be found in a
//! label is asked of the operator through a [`Prompt`], which can be replaced
//! for headless use.

use console::Term;
use itertools::Itertools;
use log::debug;
use regex::Regex;
use strum::IntoEnumIterator;

use super::{error::DescriptorError, segment::PREAMBLE_SECTION_PREFIX};
use crate::{
    constants::FULL_SECTION_PREFIX,
    instrument::{ArrayConfiguration, OperationalMode, Resolution},
};

lazy_static::lazy_static! {
    static ref PROGRAM_ID_REGEX: Regex = Regex::new(r"^\d+\.\d+\.\d+$").unwrap();
}

/// Words in a run label that indicate the ATs.
const AT_KEYWORDS: [&str; 5] = ["ats", "small", "medium", "large", "extended"];

/// Something that can ask the operator to choose between options.
pub trait Prompt {
    /// Ask for one of `choices` for the run's `what`, returning the index of
    /// the chosen element.
    fn select(&mut self, what: &str, choices: &[String]) -> Result<usize, DescriptorError>;
}

impl<F> Prompt for F
where
    F: FnMut(&str, &[String]) -> usize,
{
    fn select(&mut self, what: &str, choices: &[String]) -> Result<usize, DescriptorError> {
        Ok(self(what, choices))
    }
}

/// Ask the operator on the terminal.
pub struct TerminalPrompt {
    term: Term,
}

impl TerminalPrompt {
    pub fn new() -> TerminalPrompt {
        TerminalPrompt {
            term: Term::stdout(),
        }
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for TerminalPrompt {
    fn select(&mut self, what: &str, choices: &[String]) -> Result<usize, DescriptorError> {
        let menu = choices
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}: {c}", i + 1))
            .join(", ");
        self.term.write_line(&format!(
            "Run's {what} could not be automatically detected!"
        ))?;
        loop {
            self.term
                .write_str(&format!("Please input run's {what} ({menu}): "))?;
            let input = self.term.read_line()?;
            let input = input.trim();
            if input.is_empty() {
                return Err(DescriptorError::NoSelection(what.to_string()));
            }
            match input.parse::<usize>() {
                Ok(n) if (1..=choices.len()).contains(&n) => return Ok(n - 1),
                _ => self
                    .term
                    .write_line(&format!("'{input}' is not one of the options"))?,
            }
        }
    }
}

/// Ask `prompt` to pick one of `choices`, checking the answer.
fn select_from<T: Copy + std::fmt::Display>(
    prompt: &mut dyn Prompt,
    what: &str,
    choices: &[T],
) -> Result<T, DescriptorError> {
    let names: Vec<String> = choices.iter().map(|c| c.to_string()).collect();
    let index = prompt.select(what, &names)?;
    choices
        .get(index)
        .copied()
        .ok_or(DescriptorError::InvalidSelection {
            what: what.to_string(),
            index,
            num_choices: choices.len(),
        })
}

/// Get the array configuration out of a run label. `UTs` must be written
/// literally; AT configurations are found by keyword, where the first of
/// small, medium and large present wins and anything else is extended.
pub fn parse_array_configuration(
    label: &str,
    prompt: &mut dyn Prompt,
) -> Result<ArrayConfiguration, DescriptorError> {
    if label.contains("UTs") {
        return Ok(ArrayConfiguration::Uts);
    }

    let lower = label.to_lowercase();
    if AT_KEYWORDS.iter().any(|k| lower.contains(k)) {
        let config = [
            ArrayConfiguration::Small,
            ArrayConfiguration::Medium,
            ArrayConfiguration::Large,
        ]
        .into_iter()
        .find(|c| lower.contains(&c.to_string()))
        .unwrap_or(ArrayConfiguration::Extended);
        return Ok(config);
    }

    debug!("No array configuration in '{label}'");
    let choices: Vec<ArrayConfiguration> = ArrayConfiguration::iter().collect();
    select_from(prompt, "array configuration", &choices)
}

/// Get the spectral resolution out of a run label (`LR`, `MR` or `HR`).
pub fn parse_resolution(label: &str, prompt: &mut dyn Prompt) -> Result<Resolution, DescriptorError> {
    for (token, resolution) in [
        ("LR", Resolution::Low),
        ("MR", Resolution::Med),
        ("HR", Resolution::High),
    ] {
        if label.contains(token) {
            return Ok(resolution);
        }
    }

    debug!("No resolution in '{label}'");
    let choices: Vec<Resolution> = Resolution::iter().collect();
    select_from(prompt, "resolution", &choices)
}

/// Get the operational mode out of a run label (`GRA4MAT` or `MATISSE`).
pub fn parse_operational_mode(
    label: &str,
    prompt: &mut dyn Prompt,
) -> Result<OperationalMode, DescriptorError> {
    let upper = label.to_uppercase();
    if upper.contains("GRA4MAT") {
        return Ok(OperationalMode::Gra4mat);
    }
    if upper.contains("MATISSE") {
        return Ok(OperationalMode::Matisse);
    }

    debug!("No operational mode in '{label}'");
    let choices: Vec<OperationalMode> = OperationalMode::iter().collect();
    select_from(prompt, "operational mode", &choices)
}

/// Get the ESO program ID (e.g. `110.2474.004`) out of a run label. The first
/// token made of three dot-separated numbers wins.
pub fn parse_program_id(label: &str) -> Option<String> {
    label
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '(' | ')')))
        .find(|t| PROGRAM_ID_REGEX.is_match(t))
        .map(|t| t.to_string())
}

/// Turn a run label into a directory-safe name: everything before the first
/// comma, without whitespace.
pub fn parse_run_name(label: &str) -> String {
    label.split(',').next().unwrap_or_default().split_whitespace().collect()
}

/// Turn a night label into a directory-safe name. A label like
/// `night 2: 2023-01-10, 3h` becomes `night2_2023-01-10`; labels that
/// weren't read from a header pass through unchanged.
pub fn parse_night_name(label: &str) -> String {
    let squash = |s: &str| -> String { s.split_whitespace().collect() };

    if label.starts_with(FULL_SECTION_PREFIX) || label.starts_with(PREAMBLE_SECTION_PREFIX) {
        return label.to_string();
    }

    let (mut night, mut date) = match label.split_once(':') {
        Some((night, rest)) => (
            night.trim(),
            rest.split(',').next().unwrap_or_default().trim(),
        ),
        None => (label.trim(), ""),
    };
    // Labels like "night 2, 2023-01-10 xyz" have no colon before the date.
    if date.is_empty() && night.split_whitespace().count() > 2 {
        if let Some((n, d)) = night.split_once(',') {
            night = n;
            date = d.split_whitespace().next().unwrap_or_default();
        }
    }

    if date.is_empty() {
        squash(night)
    } else {
        format!("{}_{}", squash(night), squash(date))
    }
}

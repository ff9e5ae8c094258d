// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Cutting a sequence of lines into labelled sections.

use crate::constants::FULL_SECTION_PREFIX;

/// Label prefix of the lines preceding the first header line.
pub const PREAMBLE_SECTION_PREFIX: &str = "preamble_";

/// A contiguous range of lines, labelled by the (trimmed) header line that
/// starts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a, S> {
    pub label: String,
    pub lines: &'a [S],
}

/// Cut `lines` into sections. A line starts a new section if its lower-cased
/// form starts with `identifier`; the section runs up to (not including) the
/// next such line.
///
/// If no line matches, all of `lines` is one section labelled
/// `full_<identifier>`. Lines before the first header form a section labelled
/// `preamble_<identifier>`, so that no line is ever dropped.
pub fn segment<'a, S: AsRef<str>>(lines: &'a [S], identifier: &str) -> Vec<Section<'a, S>> {
    let identifier = identifier.to_lowercase();
    let starts: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.as_ref().to_lowercase().starts_with(&identifier))
        .map(|(i, _)| i)
        .collect();

    if starts.is_empty() {
        return vec![Section {
            label: format!("{FULL_SECTION_PREFIX}{identifier}"),
            lines,
        }];
    }

    let mut sections = Vec::with_capacity(starts.len() + 1);
    if starts[0] > 0 {
        sections.push(Section {
            label: format!("{PREAMBLE_SECTION_PREFIX}{identifier}"),
            lines: &lines[..starts[0]],
        });
    }
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(lines.len());
        sections.push(Section {
            label: lines[start].as_ref().trim().to_string(),
            lines: &lines[start..end],
        });
    }
    sections
}

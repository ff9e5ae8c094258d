// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A catalog read from a file of target records.

use std::path::Path;

use indexmap::IndexMap;
use log::{debug, info};

use super::{Catalog, CatalogError, CatalogQuery, TargetRecord};
use crate::settings::read_document_as;

/// Targets are matched by name regardless of case, whitespace and
/// underscores, so "HD 142666", "hd142666" and "HD_142666" are the same.
fn normalise_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Target records kept in memory, e.g. read from a toml, json or yaml file
/// mapping target names to their records.
#[derive(Debug, Clone, Default)]
pub struct LocalCatalog {
    records: IndexMap<String, TargetRecord>,
}

impl LocalCatalog {
    pub fn from_records<I, S>(records: I) -> LocalCatalog
    where
        I: IntoIterator<Item = (S, TargetRecord)>,
        S: AsRef<str>,
    {
        LocalCatalog {
            records: records
                .into_iter()
                .map(|(name, record)| (normalise_name(name.as_ref()), record))
                .collect(),
        }
    }

    pub fn from_file(path: &Path) -> Result<LocalCatalog, CatalogError> {
        let records: IndexMap<String, TargetRecord> = read_document_as(path)?;
        info!("Read {} targets from {}", records.len(), path.display());
        Ok(LocalCatalog::from_records(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl CatalogQuery for LocalCatalog {
    fn query(&mut self, target: &str, catalogs: &[Catalog]) -> Result<TargetRecord, CatalogError> {
        let record = self
            .records
            .get(&normalise_name(target))
            .ok_or_else(|| CatalogError::NotFound(target.to_string()))?;
        let record = record.restrict_to(catalogs);
        debug!("'{target}': {} fields", record.len());
        Ok(record)
    }
}

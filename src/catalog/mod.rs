// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Astronomical catalog queries.
//!
//! A query returns a flat, sparse [`TargetRecord`] whose keys are the field
//! names of the catalogs that contributed to it (e.g. `RA`, `Kmag`,
//! `med-Lflux`). Nothing about which keys are present is guaranteed.

mod error;
mod local;

pub use error::CatalogError;
pub use local::LocalCatalog;

use std::{
    thread,
    time::{Duration, Instant},
};

use indexmap::IndexMap;
use log::trace;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// The catalogs that target data can come from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Catalog {
    #[strum(serialize = "gaia")]
    Gaia,

    #[strum(serialize = "tycho")]
    Tycho,

    #[strum(serialize = "nomad")]
    Nomad,

    #[strum(serialize = "2mass")]
    #[serde(rename = "2mass")]
    TwoMass,

    #[strum(serialize = "wise")]
    Wise,

    #[strum(serialize = "mdfc")]
    Mdfc,

    #[strum(serialize = "simbad")]
    Simbad,

    /// The observer's own target list.
    #[strum(serialize = "local")]
    Local,
}

impl Catalog {
    /// The VizieR identifier of the catalog, if it is served by VizieR.
    pub fn vizier_id(self) -> Option<&'static str> {
        match self {
            Catalog::Gaia => Some("I/345/gaia2"),
            Catalog::Tycho => Some("I/350/tyc2tdsc"),
            Catalog::Nomad => Some("I/297/out"),
            Catalog::TwoMass => Some("II/246/out"),
            Catalog::Wise => Some("II/311/wise"),
            Catalog::Mdfc => Some("II/361/mdfc-v10"),
            Catalog::Simbad | Catalog::Local => None,
        }
    }

    /// The record fields this catalog contributes. `None` means any field.
    pub fn fields(self) -> Option<&'static [&'static str]> {
        match self {
            Catalog::Gaia => Some(&["Gmag", "pmRA", "pmDE"]),
            Catalog::Tycho => Some(&["VTmag"]),
            Catalog::Nomad => Some(&["Vmag"]),
            Catalog::TwoMass => Some(&["Jmag", "Hmag", "Kmag"]),
            Catalog::Wise => Some(&["W1mag", "W3mag", "Hmag", "Kmag"]),
            Catalog::Mdfc => Some(&["med-Lflux", "med-Nflux", "Hmag", "Kmag"]),
            Catalog::Simbad => Some(&[
                "SP_TYPE", "RA", "DEC", "PMRA", "PMDEC", "FLUX_V", "FLUX_H", "FLUX_K",
            ]),
            Catalog::Local => None,
        }
    }
}

/// A single value of a [`TargetRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    Number(f64),
    Text(String),
    Missing,
}

/// What the catalogs know about a target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetRecord(IndexMap<String, RecordValue>);

impl TargetRecord {
    pub fn new() -> TargetRecord {
        TargetRecord::default()
    }

    pub fn insert<K: Into<String>>(&mut self, key: K, value: RecordValue) {
        self.0.insert(key.into(), value);
    }

    /// Whether `key` has a usable value.
    pub fn contains(&self, key: &str) -> bool {
        match self.0.get(key) {
            Some(RecordValue::Number(n)) => n.is_finite(),
            Some(RecordValue::Text(t)) => !t.trim().is_empty(),
            Some(RecordValue::Missing) | None => false,
        }
    }

    /// Get a numeric value. Text that reads as a number is accepted; NaNs and
    /// anything else count as absent.
    pub fn number(&self, key: &str) -> Option<f64> {
        let value = match self.0.get(key)? {
            RecordValue::Number(n) => *n,
            RecordValue::Text(t) => t.trim().parse().ok()?,
            RecordValue::Missing => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Get a textual value. Numbers are formatted.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            RecordValue::Text(t) if !t.trim().is_empty() => Some(t.trim().to_string()),
            RecordValue::Number(n) if n.is_finite() => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keep only the fields that `catalogs` contribute.
    pub fn restrict_to(&self, catalogs: &[Catalog]) -> TargetRecord {
        let mut allowed = vec![];
        for catalog in catalogs {
            match catalog.fields() {
                None => return self.clone(),
                Some(fields) => allowed.extend_from_slice(fields),
            }
        }
        TargetRecord(
            self.0
                .iter()
                .filter(|(k, _)| allowed.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

impl<K: Into<String>> FromIterator<(K, RecordValue)> for TargetRecord {
    fn from_iter<I: IntoIterator<Item = (K, RecordValue)>>(iter: I) -> Self {
        TargetRecord(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<f64> for RecordValue {
    fn from(n: f64) -> Self {
        RecordValue::Number(n)
    }
}

impl From<&str> for RecordValue {
    fn from(s: &str) -> Self {
        RecordValue::Text(s.to_string())
    }
}

/// Something that can look up targets in catalogs.
pub trait CatalogQuery {
    fn query(&mut self, target: &str, catalogs: &[Catalog]) -> Result<TargetRecord, CatalogError>;
}

impl<F> CatalogQuery for F
where
    F: FnMut(&str, &[Catalog]) -> Result<TargetRecord, CatalogError>,
{
    fn query(&mut self, target: &str, catalogs: &[Catalog]) -> Result<TargetRecord, CatalogError> {
        self(target, catalogs)
    }
}

/// Waits between consecutive queries of the wrapped catalog, so that
/// third-party services aren't hammered.
pub struct Throttled<Q> {
    inner: Q,
    delay: Duration,
    last_query: Option<Instant>,
}

impl<Q: CatalogQuery> Throttled<Q> {
    pub fn new(inner: Q, delay: Duration) -> Throttled<Q> {
        Throttled {
            inner,
            delay,
            last_query: None,
        }
    }
}

impl<Q: CatalogQuery> CatalogQuery for Throttled<Q> {
    fn query(&mut self, target: &str, catalogs: &[Catalog]) -> Result<TargetRecord, CatalogError> {
        if let Some(last) = self.last_query {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                trace!("Waiting {:?} before querying '{target}'", self.delay - elapsed);
                thread::sleep(self.delay - elapsed);
            }
        }
        let result = self.inner.query(target, catalogs);
        self.last_query = Some(Instant::now());
        result
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Uploading OBs to ESO's Phase 2 (P2) service.
//!
//! The service itself is behind the [`P2Api`] trait; the [`Uploader`] decides
//! which containers OBs go into.

mod error;

pub use error::UploadError;

use std::collections::HashMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::ob::{FieldMap, ObDescriptor, Section};

pub type ContainerId = u64;
pub type ObId = u64;

/// The P2 server to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum P2Server {
    #[default]
    #[strum(serialize = "production")]
    Production,

    /// For testing; nothing done here is observed.
    #[strum(serialize = "demo")]
    Demo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub server: P2Server,
}

/// How the observations are carried out. This decides the kind of
/// containers OBs are put into.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ObservationMode {
    /// The observers are at the telescope.
    #[default]
    #[strum(serialize = "visitor")]
    Visitor,

    /// The observatory staff observe in a queue.
    #[strum(serialize = "service")]
    Service,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ContainerKind {
    #[strum(serialize = "folder")]
    Folder,

    /// OBs in a concatenation are executed back to back.
    #[strum(serialize = "concatenation")]
    Concatenation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TemplateKind {
    #[strum(serialize = "acquisition")]
    Acquisition,

    #[strum(serialize = "observation")]
    Observation,
}

/// The operations of the P2 service that OBs need.
pub trait P2Api {
    type Session;

    fn login(&mut self, credentials: &Credentials) -> Result<Self::Session, UploadError>;

    fn create_container(
        &mut self,
        session: &Self::Session,
        name: &str,
        parent: ContainerId,
        kind: ContainerKind,
    ) -> Result<ContainerId, UploadError>;

    /// Create an OB from its header fields (user, target, constraints and
    /// description).
    fn create_ob(
        &mut self,
        session: &Self::Session,
        container: ContainerId,
        header: &FieldMap,
    ) -> Result<ObId, UploadError>;

    /// Add a template to an OB. The fields include the template's name.
    fn set_template(
        &mut self,
        session: &Self::Session,
        ob: ObId,
        kind: TemplateKind,
        fields: &FieldMap,
    ) -> Result<(), UploadError>;
}

/// All header fields of an OB in one map.
pub fn header_fields(ob: &ObDescriptor) -> FieldMap {
    [
        Section::User,
        Section::Target,
        Section::Constraints,
        Section::Description,
    ]
    .into_iter()
    .flat_map(|section| ob.field_map(section))
    .collect()
}

/// Uploads OBs into a folder hierarchy below a run's container.
///
/// In visitor mode, every folder of an OB's location becomes a P2 folder and
/// every group gets its own folder. In service mode, groups become
/// concatenations directly in the run's container.
pub struct Uploader<A: P2Api> {
    api: A,
    session: A::Session,
    mode: ObservationMode,
    run_container: ContainerId,

    /// Containers that have already been created, by their path.
    containers: HashMap<Vec<String>, ContainerId>,
}

impl<A: P2Api> Uploader<A> {
    pub fn new(
        mut api: A,
        credentials: &Credentials,
        mode: ObservationMode,
        run_container: ContainerId,
    ) -> Result<Uploader<A>, UploadError> {
        let session = api.login(credentials)?;
        info!(
            "Logged in to P2 ({}) as '{}'",
            credentials.server, credentials.username
        );
        Ok(Uploader {
            api,
            session,
            mode,
            run_container,
            containers: HashMap::new(),
        })
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Get a container by its path, creating it if necessary.
    fn container(
        &mut self,
        path: &[String],
        parent: ContainerId,
        kind: ContainerKind,
    ) -> Result<ContainerId, UploadError> {
        if let Some(id) = self.containers.get(path) {
            return Ok(*id);
        }
        let name = path.last().map(|n| n.as_str()).unwrap_or_default();
        let id = self
            .api
            .create_container(&self.session, name, parent, kind)?;
        debug!("Created {kind} '{name}' ({id})");
        self.containers.insert(path.to_vec(), id);
        Ok(id)
    }

    /// Upload an OB. `folders` is where the OB belongs (e.g. run, night and
    /// operational mode), and `group` is the science target that the OB
    /// belongs to.
    pub fn upload(
        &mut self,
        folders: &[String],
        group: &str,
        ob: &ObDescriptor,
    ) -> Result<ObId, UploadError> {
        let mut path = folders.to_vec();
        path.push(group.to_string());
        let container = match self.mode {
            ObservationMode::Visitor => {
                let mut parent = self.run_container;
                for depth in 1..=path.len() {
                    parent = self.container(&path[..depth], parent, ContainerKind::Folder)?;
                }
                parent
            }
            ObservationMode::Service => {
                self.container(&path, self.run_container, ContainerKind::Concatenation)?
            }
        };

        let ob_id = self
            .api
            .create_ob(&self.session, container, &header_fields(ob))?;
        self.api.set_template(
            &self.session,
            ob_id,
            TemplateKind::Acquisition,
            &ob.field_map(Section::Acquisition),
        )?;
        self.api.set_template(
            &self.session,
            ob_id,
            TemplateKind::Observation,
            &ob.field_map(Section::Observation),
        )?;
        info!("Uploaded '{}' ({ob_id})", ob.name);
        Ok(ob_id)
    }
}

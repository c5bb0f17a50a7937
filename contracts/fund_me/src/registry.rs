//! Project registration and lookup.

use tracing::info;

use crate::address::Address;
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::storage::RecordStore;
use crate::types::{validate_project, Project, ProjectMetadata};
use crate::FundMe;

impl<S: RecordStore, C: Clock> FundMe<S, C> {
    /// Register a new fundraising project for `owner`.
    ///
    /// The project lives at `derive("project", owner, project_id)` and starts
    /// with `current_amount = 0`. Registering the same `(owner, project_id)`
    /// twice fails with [`Error::AlreadyExists`] and leaves the first record
    /// untouched.
    ///
    /// `end_time` is not compared with the clock: a project whose deadline
    /// has already passed can be created, it just never accepts donations.
    pub async fn init_project(
        &self,
        owner: Address,
        project_id: &str,
        metadata: ProjectMetadata,
        target_amount: u64,
        end_time: i64,
    ) -> Result<Project> {
        validate_project(project_id, &metadata, target_amount)?;

        let (address, bump) = self.project_address(&owner, project_id)?;
        let project = Project {
            owner,
            project_id: project_id.to_string(),
            metadata,
            target_amount,
            current_amount: 0,
            end_time,
            bump,
        };

        self.store.insert_project(&address, &project).await?;

        info!(
            "Project {} initialised at {address} by {owner}: \"{}\", target {}, deadline {}",
            project.project_id, project.metadata.title, project.target_amount, project.end_time
        );
        Ok(project)
    }

    /// Retrieve the project stored at `address`.
    pub async fn get_project(&self, address: &Address) -> Result<Project> {
        self.store
            .load_project(address)
            .await?
            .ok_or(Error::NotFound(*address))
    }
}

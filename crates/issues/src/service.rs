use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::IssueError;
use crate::facility::Facility;
use crate::issue::{Issue, NewIssue};
use crate::store::{InsertOutcome, IssueStore};

/// Maximum number of issues a deployment holds, across all facilities.
pub const DEFAULT_ISSUE_LIMIT: usize = 256;

/// Facility-scoped issue listing and creation on top of an [`IssueStore`].
#[derive(Clone)]
pub struct IssueService {
    store: Arc<dyn IssueStore>,
    limit: usize,
}

impl IssueService {
    pub fn new(store: Arc<dyn IssueStore>) -> Self {
        Self {
            store,
            limit: DEFAULT_ISSUE_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub async fn list(&self, facility: &str) -> Result<Vec<Issue>, IssueError> {
        let facility: Facility = facility.parse()?;
        let issues = self.store.list(facility).await?;
        debug!(%facility, count = issues.len(), "listed issues");
        Ok(issues)
    }

    /// Validates and stores a new issue.
    ///
    /// The limit is global: issues of every facility count against it.
    pub async fn create(&self, facility: &str, new: NewIssue) -> Result<Issue, IssueError> {
        let facility: Facility = facility.parse()?;
        new.validate()?;

        let issue = new.into_issue(facility, Utc::now());
        match self.store.insert_within_limit(issue, self.limit).await? {
            InsertOutcome::Inserted(issue) => {
                info!(%facility, id = %issue.id, part = %issue.part_id, "issue created");
                Ok(issue)
            }
            InsertOutcome::LimitReached { count } => {
                warn!(%facility, count, limit = self.limit, "issue limit reached");
                Err(IssueError::Capacity { limit: self.limit })
            }
        }
    }
}

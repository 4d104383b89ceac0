//! In-memory gateway implementation.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::error::{Error, Result};
use crate::gateway::{Gateway, Tx};
use crate::records::{ProjectRecord, ResourceRecord};

/// What one open transaction has staged so far.
#[derive(Debug, Clone, Default)]
struct Staged {
    projects: Vec<ProjectRecord>,
    resources: Vec<ResourceRecord>,
    containments: Vec<(String, String)>,
    dependencies: Vec<(String, String, String)>,
    users: BTreeSet<String>,
    iac_targets: BTreeSet<String>,
    resource_types: BTreeSet<String>,
    dependency_types: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct State {
    open: HashMap<u64, Staged>,
    committed: Staged,
}

/// A [`Gateway`] backed by process memory.
///
/// Staged writes only become visible once their transaction commits, which
/// is enough transactional behavior for tests and embedded use. A failure
/// can be injected with [`fail_next_save`] to exercise rollback paths.
///
/// [`fail_next_save`]: MemoryGateway::fail_next_save
#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: Mutex<State>,
    next_tx: AtomicU64,
    fail_saves: AtomicBool,
}

impl MemoryGateway {
    /// Create an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent save operation fail until cleared.
    pub fn fail_next_save(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Committed project rows.
    #[must_use]
    pub fn committed_projects(&self) -> Vec<ProjectRecord> {
        self.locked().committed.projects.clone()
    }

    /// Committed resource rows.
    #[must_use]
    pub fn committed_resources(&self) -> Vec<ResourceRecord> {
        self.locked().committed.resources.clone()
    }

    /// Committed containment links.
    #[must_use]
    pub fn committed_containments(&self) -> Vec<(String, String)> {
        self.locked().committed.containments.clone()
    }

    /// Committed dependency links.
    #[must_use]
    pub fn committed_dependencies(&self) -> Vec<(String, String, String)> {
        self.locked().committed.dependencies.clone()
    }

    /// Number of transactions still open.
    #[must_use]
    pub fn open_transactions(&self) -> usize {
        self.locked().open.len()
    }

    /// Lock the interior state, recovering from poisoning.
    fn locked(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn with_staged<F>(&self, tx: Tx, operation: &str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut Staged),
    {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Error::failure(operation, "injected failure"));
        }
        let mut state = self.locked();
        let staged = state
            .open
            .get_mut(&tx.id)
            .ok_or(Error::UnknownTransaction { tx_id: tx.id })?;
        apply(staged);
        Ok(())
    }
}

impl Gateway for MemoryGateway {
    fn begin(&self) -> Result<Tx> {
        let id = self.next_tx.fetch_add(1, Ordering::SeqCst);
        self.locked().open.insert(id, Staged::default());
        debug!(tx = id, "transaction opened");
        Ok(Tx { id })
    }

    fn commit(&self, tx: Tx) -> Result<()> {
        let mut state = self.locked();
        let staged = state
            .open
            .remove(&tx.id)
            .ok_or(Error::UnknownTransaction { tx_id: tx.id })?;
        let committed = &mut state.committed;
        committed.projects.extend(staged.projects);
        committed.resources.extend(staged.resources);
        committed.containments.extend(staged.containments);
        committed.dependencies.extend(staged.dependencies);
        committed.users.extend(staged.users);
        committed.iac_targets.extend(staged.iac_targets);
        committed.resource_types.extend(staged.resource_types);
        committed.dependency_types.extend(staged.dependency_types);
        debug!(tx = tx.id, "transaction committed");
        Ok(())
    }

    fn rollback(&self, tx: Tx) -> Result<()> {
        let mut state = self.locked();
        state
            .open
            .remove(&tx.id)
            .ok_or(Error::UnknownTransaction { tx_id: tx.id })?;
        debug!(tx = tx.id, "transaction rolled back");
        Ok(())
    }

    fn save_project(&self, tx: Tx, project: &ProjectRecord) -> Result<()> {
        let project = project.clone();
        self.with_staged(tx, "save_project", |staged| staged.projects.push(project))
    }

    fn save_resource(&self, tx: Tx, resource: &ResourceRecord) -> Result<()> {
        let resource = resource.clone();
        self.with_staged(tx, "save_resource", |staged| staged.resources.push(resource))
    }

    fn save_containment(&self, tx: Tx, parent: &str, child: &str) -> Result<()> {
        let link = (parent.to_string(), child.to_string());
        self.with_staged(tx, "save_containment", |staged| staged.containments.push(link))
    }

    fn save_dependency(&self, tx: Tx, from: &str, to: &str, kind: &str) -> Result<()> {
        let link = (from.to_string(), to.to_string(), kind.to_string());
        self.with_staged(tx, "save_dependency", |staged| staged.dependencies.push(link))
    }

    fn ensure_user(&self, tx: Tx, user_id: &str) -> Result<()> {
        let user_id = user_id.to_string();
        self.with_staged(tx, "ensure_user", |staged| {
            staged.users.insert(user_id);
        })
    }

    fn ensure_iac_target(&self, tx: Tx, target: &str) -> Result<()> {
        let target = target.to_string();
        self.with_staged(tx, "ensure_iac_target", |staged| {
            staged.iac_targets.insert(target);
        })
    }

    fn ensure_resource_type(&self, tx: Tx, type_name: &str) -> Result<()> {
        let type_name = type_name.to_string();
        self.with_staged(tx, "ensure_resource_type", |staged| {
            staged.resource_types.insert(type_name);
        })
    }

    fn ensure_dependency_type(&self, tx: Tx, kind: &str) -> Result<()> {
        let kind = kind.to_string();
        self.with_staged(tx, "ensure_dependency_type", |staged| {
            staged.dependency_types.insert(kind);
        })
    }
}

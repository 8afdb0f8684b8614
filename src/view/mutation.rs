//! Mutation coordinator: runs create/update/delete/toggle calls and decides
//! how the store is reconciled afterwards

use crate::config::{ReconcileConfig, ReconcilePolicy, ViewConfig};
use crate::core::error::{MutationError, ValidationError};
use crate::core::events::{Notice, NoticeBoard};
use crate::core::field::FieldValue;
use crate::core::record::{Record, RecordId};
use crate::core::service::{Ack, Fields, RecordApi};
use crate::core::validation::FormRules;
use crate::view::store::StorePatch;
use std::collections::HashSet;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// What the view must do with its store after a successful mutation
#[derive(Debug, Clone, PartialEq)]
pub enum Reconcile<T> {
    /// Apply the change locally; search, sort and page stay as they are
    Patch(StorePatch<T>),
    /// Refetch the collection
    Reload,
}

/// A successful mutation
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome<T> {
    pub ack: Ack<T>,
    pub reconcile: Reconcile<T>,

    /// Success notice that was posted
    pub notice: Notice,
}

/// Runs mutations for one view
///
/// Each call runs once, with no retry, and only when its target has no other
/// mutation in flight. Success and failure both post a notice; a failure
/// never produces a [`Reconcile`], so the store is left untouched.
pub struct MutationCoordinator<T, A> {
    api: Arc<A>,
    resource: String,
    rules: FormRules,
    policy: ReconcileConfig,
    timeout: Duration,
    success_message: String,
    notices: NoticeBoard,
    in_flight: Arc<Mutex<HashSet<String>>>,
    _record: PhantomData<fn() -> T>,
}

impl<T, A> Clone for MutationCoordinator<T, A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            resource: self.resource.clone(),
            rules: self.rules.clone(),
            policy: self.policy,
            timeout: self.timeout,
            success_message: self.success_message.clone(),
            notices: self.notices.clone(),
            in_flight: Arc::clone(&self.in_flight),
            _record: PhantomData,
        }
    }
}

impl<T, A> std::fmt::Debug for MutationCoordinator<T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationCoordinator")
            .field("resource", &self.resource)
            .field("policy", &self.policy)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Removes its target from the in-flight set when dropped
struct InFlightGuard {
    set: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock_set(&self.set).remove(&self.key);
    }
}

fn lock_set(set: &Mutex<HashSet<String>>) -> MutexGuard<'_, HashSet<String>> {
    set.lock().unwrap_or_else(|e| e.into_inner())
}

const CREATE_TARGET: &str = "<create>";
const CLEAR_TARGET: &str = "<clear_all>";

impl<T, A> MutationCoordinator<T, A>
where
    T: Record,
    A: RecordApi<T>,
{
    pub fn new(api: Arc<A>, config: &ViewConfig, notices: NoticeBoard) -> Self {
        Self {
            api,
            resource: config.resource.clone(),
            rules: FormRules::new(),
            policy: config.reconcile,
            timeout: config.request_timeout(),
            success_message: config.success_message.clone(),
            notices,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            _record: PhantomData,
        }
    }

    /// Validate create and update forms with `rules`
    pub fn with_rules(mut self, rules: FormRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    /// Whether a mutation on `id` is still running
    pub fn in_flight(&self, id: &RecordId) -> bool {
        lock_set(&self.in_flight).contains(id.as_str())
    }

    /// Whether any mutation is still running
    pub fn is_busy(&self) -> bool {
        !lock_set(&self.in_flight).is_empty()
    }

    /// Create a record from a form
    pub async fn create(&self, fields: Fields) -> Result<MutationOutcome<T>, MutationError> {
        let fields = self.check(self.rules.apply(fields), None)?;
        let ack = self
            .run("create", CREATE_TARGET, None, self.api.create(fields))
            .await?;

        let reconcile = match (self.policy.create, &ack.record) {
            (ReconcilePolicy::Patch, Some(record)) => {
                Reconcile::Patch(StorePatch::Upsert(record.clone()))
            }
            // Nothing to insert without the created record
            _ => Reconcile::Reload,
        };
        Ok(self.succeed(ack, reconcile, None))
    }

    /// Update a record with the submitted fields
    pub async fn update(
        &self,
        id: &RecordId,
        fields: Fields,
    ) -> Result<MutationOutcome<T>, MutationError> {
        let fields = self.check(self.rules.apply_partial(fields), Some(id))?;
        let ack = self
            .run("update", id.as_str(), Some(id), self.api.update(id, fields.clone()))
            .await?;

        let reconcile = match self.policy.update {
            ReconcilePolicy::Patch => Reconcile::Patch(match &ack.record {
                Some(record) => StorePatch::Upsert(record.clone()),
                None => StorePatch::SetFields {
                    id: id.clone(),
                    fields,
                },
            }),
            ReconcilePolicy::Reload => Reconcile::Reload,
        };
        Ok(self.succeed(ack, reconcile, Some(id)))
    }

    /// Delete a record
    pub async fn remove(&self, id: &RecordId) -> Result<MutationOutcome<T>, MutationError> {
        let ack = self
            .run("remove", id.as_str(), Some(id), self.api.remove(id))
            .await?;

        let reconcile = match self.policy.remove {
            ReconcilePolicy::Patch => Reconcile::Patch(StorePatch::Remove(id.clone())),
            ReconcilePolicy::Reload => Reconcile::Reload,
        };
        Ok(self.succeed(ack, reconcile, Some(id)))
    }

    /// Set a boolean flag (e.g. `blocked`) on a record
    pub async fn toggle_flag(
        &self,
        id: &RecordId,
        flag: &str,
        value: bool,
    ) -> Result<MutationOutcome<T>, MutationError> {
        let ack = self
            .run("toggle", id.as_str(), Some(id), self.api.toggle(id, flag, value))
            .await?;

        let reconcile = match self.policy.toggle {
            ReconcilePolicy::Patch => {
                let mut fields = Fields::new();
                fields.insert(flag.to_string(), FieldValue::Boolean(value));
                Reconcile::Patch(StorePatch::SetFields {
                    id: id.clone(),
                    fields,
                })
            }
            ReconcilePolicy::Reload => Reconcile::Reload,
        };
        Ok(self.succeed(ack, reconcile, Some(id)))
    }

    /// Delete every record in one call
    pub async fn clear_all(&self) -> Result<MutationOutcome<T>, MutationError> {
        let ack = self
            .run("clear_all", CLEAR_TARGET, None, self.api.clear_all())
            .await?;

        let reconcile = match self.policy.clear_all {
            ReconcilePolicy::Patch => Reconcile::Patch(StorePatch::Clear),
            ReconcilePolicy::Reload => Reconcile::Reload,
        };
        Ok(self.succeed(ack, reconcile, None))
    }

    fn check<V>(
        &self,
        validated: Result<V, ValidationError>,
        target: Option<&RecordId>,
    ) -> Result<V, MutationError> {
        validated.map_err(|e| {
            let error = MutationError::from(e);
            tracing::debug!(resource = %self.resource, "Form rejected: {}", error);
            self.notices
                .post(Notice::error(error.user_message(), target.cloned()));
            error
        })
    }

    fn acquire(&self, operation: &str, key: &str) -> Result<InFlightGuard, MutationError> {
        let mut set = lock_set(&self.in_flight);
        if !set.insert(key.to_string()) {
            return Err(MutationError::InFlight {
                operation: operation.to_string(),
                target: key.to_string(),
            });
        }
        Ok(InFlightGuard {
            set: Arc::clone(&self.in_flight),
            key: key.to_string(),
        })
    }

    async fn run<F>(
        &self,
        operation: &'static str,
        key: &str,
        target: Option<&RecordId>,
        call: F,
    ) -> Result<Ack<T>, MutationError>
    where
        F: Future<Output = Result<Ack<T>, MutationError>>,
    {
        // A refused duplicate posts no notice
        let _guard = self.acquire(operation, key)?;
        tracing::debug!(resource = %self.resource, operation, target = key, "Mutation started");

        let result = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(MutationError::Timeout {
                after_ms: self.timeout.as_millis() as u64,
            }),
        };

        if let Err(error) = &result {
            tracing::warn!(
                resource = %self.resource,
                operation,
                target = key,
                code = error.error_code(),
                "Mutation failed: {}",
                error
            );
            self.notices
                .post(Notice::error(error.user_message(), target.cloned()));
        }
        result
    }

    fn succeed(
        &self,
        ack: Ack<T>,
        reconcile: Reconcile<T>,
        target: Option<&RecordId>,
    ) -> MutationOutcome<T> {
        let message = ack
            .message
            .clone()
            .unwrap_or_else(|| self.success_message.clone());
        let notice = Notice::success(message, target.cloned());
        tracing::info!(
            resource = %self.resource,
            reload = matches!(reconcile, Reconcile::Reload),
            "Mutation succeeded"
        );
        self.notices.post(notice.clone());

        MutationOutcome {
            ack,
            reconcile,
            notice,
        }
    }
}

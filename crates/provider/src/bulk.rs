//! Bulk Sub-resource Reconciliation
//!
//! A bulk resource owns a map of named FMC objects. FMC can create and delete
//! such objects in bulk (version permitting) but offers no bulk update, so the
//! reconciler mixes bulk and one-by-one calls. Whatever succeeded before a
//! failure is kept in the returned state so the next apply only redoes the
//! remaining delta.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use fmc_common::{BatchLimits, BulkCapabilities, BulkOperation, Error, FmcVersion, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::RestClient;
use crate::state::{find_by_field, items_of};

/// Items of a bulk resource, keyed by user-assigned name
pub type ItemMap<I> = BTreeMap<String, I>;

/// A sub-object managed through a bulk resource
pub trait BulkItem:
    Clone + PartialEq + fmt::Debug + Default + Serialize + DeserializeOwned + Send + Sync
{
    /// Backend id, when known
    fn id(&self) -> Option<&str>;

    /// JSON object for create/update requests
    fn to_body(&self, name: &str) -> Value;

    /// Overwrite every field from `body`
    fn from_body(&mut self, body: &Value);

    /// Overwrite fields that are not null locally
    fn from_body_partial(&mut self, body: &Value);

    /// Fill fields that are still unknown
    fn from_body_unknowns(&mut self, body: &Value);

    /// Mark backend-computed fields as unknown unless already known
    fn mark_computed_unknown(&mut self);

    /// Take computed fields over from the prior state of the same item
    fn adopt_computed(&mut self, prior: &Self);
}

/// Result of classifying plan against state
#[derive(Debug, Clone, PartialEq)]
pub struct Changes<I> {
    pub to_create: ItemMap<I>,
    pub to_delete: ItemMap<I>,
    pub to_update: ItemMap<I>,
}

impl<I> Changes<I> {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_delete.is_empty() && self.to_update.is_empty()
    }
}

/// Split `plan` and `state` into create/delete/update sets.
///
/// Items are matched by backend id, so a renamed key that keeps its id is an
/// update rather than a delete plus create.
pub fn classify<I: BulkItem>(state: &ItemMap<I>, plan: &ItemMap<I>) -> Changes<I> {
    let plan_ids: HashMap<&str, &str> = plan
        .iter()
        .filter_map(|(name, item)| item.id().map(|id| (id, name.as_str())))
        .collect();

    let state_by_id: HashMap<&str, (&str, &I)> = state
        .iter()
        .filter_map(|(name, item)| item.id().map(|id| (id, (name.as_str(), item))))
        .collect();

    let to_delete = state
        .iter()
        .filter(|(_, item)| item.id().map_or(true, |id| !plan_ids.contains_key(id)))
        .map(|(name, item)| (name.clone(), item.clone()))
        .collect();

    let to_create = plan
        .iter()
        .filter(|(_, item)| item.id().is_none())
        .map(|(name, item)| (name.clone(), item.clone()))
        .collect();

    let to_update = plan
        .iter()
        .filter(|(name, item)| {
            let Some(id) = item.id() else {
                return false;
            };
            match state_by_id.get(id) {
                Some((state_name, state_item)) => state_name != name || *state_item != *item,
                None => true,
            }
        })
        .map(|(name, item)| (name.clone(), item.clone()))
        .collect();

    Changes {
        to_create,
        to_delete,
        to_update,
    }
}

/// A reconciliation failure carrying the state as of the failure
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct PartialApply<I: fmt::Debug> {
    /// State reflecting every operation that did succeed
    pub state: ItemMap<I>,
    #[source]
    pub error: Error,
}

impl<I: fmt::Debug> PartialApply<I> {
    fn new(state: ItemMap<I>, error: Error) -> Self {
        Self { state, error }
    }
}

pub type ReconcileResult<I> = std::result::Result<ItemMap<I>, PartialApply<I>>;

/// Applies bulk changes for one resource collection
pub struct BulkReconciler<'c> {
    client: &'c dyn RestClient,
    resource: &'c str,
    path: String,
    capabilities: BulkCapabilities,
    limits: BatchLimits,
}

impl<'c> BulkReconciler<'c> {
    /// `path` is the collection path, e.g. `/api/fmc_config/v1/domain/{uuid}/object/icmpv4objects`
    pub fn new(
        client: &'c dyn RestClient,
        resource: &'c str,
        path: String,
        capabilities: BulkCapabilities,
        limits: BatchLimits,
    ) -> Self {
        Self {
            client,
            resource,
            path,
            capabilities,
            limits,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn version(&self) -> &FmcVersion {
        self.client.version()
    }

    fn bulk(&self, op: BulkOperation) -> bool {
        self.capabilities.supports(op, self.version())
    }

    /// Fail before any call when the resource is not available on this FMC
    pub fn ensure_available(&self) -> Result<()> {
        self.capabilities
            .ensure_available(self.resource, self.version())
    }

    /// Bring `state` in line with `plan`: delete, then create, then update
    pub async fn reconcile<I: BulkItem>(&self, state: ItemMap<I>, plan: &ItemMap<I>) -> ReconcileResult<I> {
        if let Err(e) = self.ensure_available() {
            return Err(PartialApply::new(state, e));
        }

        let changes = classify(&state, plan);
        info!(
            "Reconciling {}: {} to create, {} to update, {} to delete",
            self.resource,
            changes.to_create.len(),
            changes.to_update.len(),
            changes.to_delete.len()
        );

        let state = self.delete_subresources(state, changes.to_delete).await?;
        let state = self.create_subresources(state, changes.to_create).await?;
        self.update_subresources(state, changes.to_update).await
    }

    /// Create `to_create`, merging each confirmed item into `state`
    pub async fn create_subresources<I: BulkItem>(
        &self,
        mut state: ItemMap<I>,
        to_create: ItemMap<I>,
    ) -> ReconcileResult<I> {
        if to_create.is_empty() {
            return Ok(state);
        }
        if let Err(e) = self.ensure_available() {
            return Err(PartialApply::new(state, e));
        }

        let bulk = self.bulk(BulkOperation::Create);
        let batch_size = if bulk {
            self.limits.max_create_items.max(1)
        } else {
            1
        };

        let items: Vec<(String, I)> = to_create
            .into_iter()
            .map(|(name, mut item)| {
                item.mark_computed_unknown();
                (name, item)
            })
            .collect();

        debug!(
            "Creating {} {} items (bulk: {}, batch size: {})",
            items.len(),
            self.resource,
            bulk,
            batch_size
        );

        for batch in items.chunks(batch_size) {
            let result = if bulk {
                self.post_bulk(batch, &mut state).await
            } else {
                self.post_single(batch, &mut state).await
            };
            if let Err(e) = result {
                return Err(PartialApply::new(state, e));
            }
        }

        Ok(state)
    }

    async fn post_bulk<I: BulkItem>(&self, batch: &[(String, I)], state: &mut ItemMap<I>) -> Result<()> {
        let body = Value::Array(batch.iter().map(|(name, item)| item.to_body(name)).collect());
        let response = self
            .client
            .post(&format!("{}?bulk=true", self.path), &body)
            .await?;

        let created = items_of(&response);
        for (name, item) in batch {
            let object = find_by_field(created, "name", name).ok_or_else(|| {
                Error::UnexpectedResponse(format!("bulk create response is missing {}", name))
            })?;
            merge_created(state, name, item, object)?;
        }
        Ok(())
    }

    async fn post_single<I: BulkItem>(&self, batch: &[(String, I)], state: &mut ItemMap<I>) -> Result<()> {
        for (name, item) in batch {
            let response = self.client.post(&self.path, &item.to_body(name)).await?;
            merge_created(state, name, item, &response)?;
        }
        Ok(())
    }

    /// Delete `to_delete`, removing each confirmed name from `state`.
    ///
    /// A 404 means the object is already gone and counts as success.
    pub async fn delete_subresources<I: BulkItem>(
        &self,
        mut state: ItemMap<I>,
        to_delete: ItemMap<I>,
    ) -> ReconcileResult<I> {
        if to_delete.is_empty() {
            return Ok(state);
        }
        if let Err(e) = self.ensure_available() {
            return Err(PartialApply::new(state, e));
        }

        let bulk = self.bulk(BulkOperation::Delete);
        let limit = self.limits.max_delete_param_len;
        debug!(
            "Deleting {} {} items (bulk: {})",
            to_delete.len(),
            self.resource,
            bulk
        );

        let mut pending: Vec<String> = Vec::new();
        let mut ids = String::new();

        for (name, item) in to_delete {
            let Some(id) = item.id() else {
                // never created on the backend
                state.remove(&name);
                continue;
            };

            if !bulk {
                if let Err(e) = self.delete_one(id).await {
                    return Err(PartialApply::new(state, e));
                }
                state.remove(&name);
                continue;
            }

            let encoded = urlencoding::encode(id);
            if !pending.is_empty() && ids.len() + 1 + encoded.len() > limit {
                if let Err(e) = self.delete_batch(&ids).await {
                    return Err(PartialApply::new(state, e));
                }
                for done in pending.drain(..) {
                    state.remove(&done);
                }
                ids.clear();
            }

            if !ids.is_empty() {
                ids.push(',');
            }
            ids.push_str(&encoded);
            pending.push(name);
        }

        if !pending.is_empty() {
            if let Err(e) = self.delete_batch(&ids).await {
                return Err(PartialApply::new(state, e));
            }
            for done in pending {
                state.remove(&done);
            }
        }

        Ok(state)
    }

    async fn delete_one(&self, id: &str) -> Result<()> {
        let path = format!("{}/{}", self.path, urlencoding::encode(id));
        match self.client.delete(&path).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => {
                warn!("{} object {} already deleted", self.resource, id);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn delete_batch(&self, ids: &str) -> Result<()> {
        debug!("Bulk delete of {} ({} chars)", self.resource, ids.len());
        let path = format!("{}?bulk=true&filter=ids:{}", self.path, ids);
        match self.client.delete(&path).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => {
                warn!("{} bulk delete found nothing to delete", self.resource);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Update `to_update`, one PUT per item unless bulk update is available
    pub async fn update_subresources<I: BulkItem>(
        &self,
        mut state: ItemMap<I>,
        to_update: ItemMap<I>,
    ) -> ReconcileResult<I> {
        if to_update.is_empty() {
            return Ok(state);
        }
        if let Err(e) = self.ensure_available() {
            return Err(PartialApply::new(state, e));
        }

        let bulk = self.bulk(BulkOperation::Update);
        debug!(
            "Updating {} {} items (bulk: {})",
            to_update.len(),
            self.resource,
            bulk
        );

        // planned name of every id about to be updated
        let targets: HashMap<String, String> = to_update
            .iter()
            .filter_map(|(name, item)| item.id().map(|id| (id.to_string(), name.clone())))
            .collect();
        let items: Vec<(String, I)> = to_update.into_iter().collect();

        if bulk {
            for batch in items.chunks(self.limits.max_create_items.max(1)) {
                if let Err(e) = self.put_bulk(batch, &targets, &mut state).await {
                    return Err(PartialApply::new(state, e));
                }
            }
            return Ok(state);
        }

        for (name, mut item) in items {
            let Some(id) = item.id().map(str::to_string) else {
                continue;
            };
            let path = format!("{}/{}", self.path, urlencoding::encode(&id));
            match self.client.put(&path, &item.to_body(&name)).await {
                Ok(response) => {
                    item.from_body_unknowns(&response);
                    place_item(&mut state, &targets, name, item);
                }
                Err(e) => return Err(PartialApply::new(state, e)),
            }
        }

        Ok(state)
    }

    async fn put_bulk<I: BulkItem>(
        &self,
        batch: &[(String, I)],
        targets: &HashMap<String, String>,
        state: &mut ItemMap<I>,
    ) -> Result<()> {
        let body = Value::Array(batch.iter().map(|(name, item)| item.to_body(name)).collect());
        let response = self
            .client
            .put(&format!("{}?bulk=true", self.path), &body)
            .await?;

        let updated = items_of(&response);
        for (name, item) in batch {
            let mut item = item.clone();
            if let Some(object) = find_by_field(updated, "name", name) {
                item.from_body_unknowns(object);
            }
            place_item(state, targets, name.clone(), item);
        }
        Ok(())
    }

    /// Refresh `state` from the backend collection.
    ///
    /// Items with an id are refreshed partially, items without one (fresh from
    /// import) are looked up by name and read in full. Items missing on the
    /// backend are dropped.
    pub async fn read<I: BulkItem>(&self, state: ItemMap<I>) -> Result<ItemMap<I>> {
        self.ensure_available()?;

        let objects = self.fetch_all().await?;
        let mut refreshed = ItemMap::new();

        for (name, mut item) in state {
            match item.id() {
                Some(id) => match find_by_field(&objects, "id", id) {
                    Some(object) => {
                        item.from_body_partial(object);
                        refreshed.insert(name, item);
                    }
                    None => debug!("{} item {} no longer exists", self.resource, name),
                },
                None => match find_by_field(&objects, "name", &name) {
                    Some(object) => {
                        item.from_body(object);
                        refreshed.insert(name, item);
                    }
                    None => debug!("{} item {} not found by name", self.resource, name),
                },
            }
        }

        Ok(refreshed)
    }

    async fn fetch_all(&self) -> Result<Vec<Value>> {
        const PAGE: usize = 1000;
        let mut objects = Vec::new();

        loop {
            let path = format!(
                "{}?expanded=true&limit={}&offset={}",
                self.path,
                PAGE,
                objects.len()
            );
            let response = match self.client.get(&path).await {
                Ok(response) => response,
                Err(e) if e.is_not_found() => break,
                Err(e) => return Err(e),
            };

            let page = items_of(&response);
            if page.is_empty() {
                break;
            }
            objects.extend(page.iter().cloned());

            let total = response
                .get("paging")
                .and_then(|p| p.get("count"))
                .and_then(Value::as_u64)
                .unwrap_or(0) as usize;
            if objects.len() >= total {
                break;
            }
        }

        Ok(objects)
    }
}

fn merge_created<I: BulkItem>(state: &mut ItemMap<I>, name: &str, item: &I, response: &Value) -> Result<()> {
    let mut created = item.clone();
    created.from_body_unknowns(response);
    if created.id().is_none() {
        return Err(Error::UnexpectedResponse(format!(
            "create response for {} carries no id",
            name
        )));
    }
    state.insert(name.to_string(), created);
    Ok(())
}

/// Store `item` under `name` without losing any tracked backend id.
///
/// The stale entry holding the same id is dropped. An item with another id
/// already stored under `name` moves to the name its own pending update
/// targets, so a failure later in the phase still leaves it in state.
fn place_item<I: BulkItem>(
    state: &mut ItemMap<I>,
    targets: &HashMap<String, String>,
    name: String,
    item: I,
) {
    if let Some(id) = item.id() {
        state.retain(|existing_name, existing| *existing_name == name || existing.id() != Some(id));
    }

    let mut next = Some((name, item));
    while let Some((name, item)) = next.take() {
        let id = item.id().map(str::to_string);
        let Some(displaced) = state.insert(name.clone(), item) else {
            continue;
        };
        let Some(displaced_id) = displaced
            .id()
            .filter(|d| Some(*d) != id.as_deref())
            .map(str::to_string)
        else {
            continue;
        };

        let target = targets
            .get(&displaced_id)
            .filter(|target| **target != name)
            .cloned()
            .unwrap_or_else(|| format!("{}#{}", name, displaced_id));
        debug!("Moving {} ({}) to {} until its own update lands", name, displaced_id, target);
        next = Some((target, displaced));
    }
}

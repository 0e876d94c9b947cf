//! Generic handler for bulk resources
//!
//! Every bulk resource has the same state shape: a resource id, an optional
//! domain, and a map of named items. The handler wires that state to the
//! reconciler; the per-type adapter only supplies the type name, the path and
//! the item serializer.

use std::marker::PhantomData;

use fmc_common::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use super::import::parse_import_id;
use super::{ApplyFailure, ApplyResult, BulkResource, ChangeSummary, Resource, ResourceContext};
use crate::bulk::{classify, BulkItem, BulkReconciler, ItemMap, ReconcileResult};
use crate::state::{decode_state, encode_state, Attr};

/// Resource-level state of a bulk resource
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BulkState<I> {
    #[serde(default)]
    pub id: Attr<String>,
    #[serde(default)]
    pub domain: Attr<String>,
    #[serde(default)]
    pub items: ItemMap<I>,
}

/// `Resource` implementation shared by all bulk resources
pub struct BulkHandler<R>(PhantomData<R>);

impl<R: BulkResource> BulkHandler<R> {
    fn reconciler<'a>(ctx: &ResourceContext<'a>, domain: &Attr<String>) -> Result<BulkReconciler<'a>> {
        let uuid = ctx.client.domain_uuid(domain.as_str())?;
        Ok(BulkReconciler::new(
            ctx.client,
            R::TYPE_NAME,
            R::collection_path(&uuid),
            ctx.capabilities.get(R::TYPE_NAME),
            ctx.limits,
        ))
    }

    /// Fold a reconcile result into resource state
    fn finish(mut state: BulkState<R::Item>, result: ReconcileResult<R::Item>) -> ApplyResult {
        match result {
            Ok(items) => {
                state.items = items;
                Ok(encode_state(&state)?)
            }
            Err(partial) => {
                state.items = partial.state;
                let encoded = encode_state(&state)
                    .map_err(|e| warn!("Failed to encode partial {} state: {}", R::TYPE_NAME, e))
                    .ok();
                Err(ApplyFailure {
                    state: encoded,
                    error: partial.error,
                })
            }
        }
    }
}

#[async_trait::async_trait]
impl<R: BulkResource> Resource for BulkHandler<R> {
    fn type_name() -> &'static str {
        R::TYPE_NAME
    }

    fn plan(prior: Option<&Value>, config: &Value) -> Result<Value> {
        let mut planned: BulkState<R::Item> = decode_state(config)?;
        let prior: Option<BulkState<R::Item>> = prior
            .filter(|v| !v.is_null())
            .map(decode_state::<BulkState<R::Item>>)
            .transpose()?;

        if let Some(prior) = &prior {
            planned.id.adopt(&prior.id);
        }
        planned.id.mark_unknown();

        for (name, item) in planned.items.iter_mut() {
            let prior_item = prior
                .as_ref()
                .and_then(|p| p.items.get(name))
                .filter(|p| p.id().is_some());
            match prior_item {
                Some(prior_item) => item.adopt_computed(prior_item),
                None => item.mark_computed_unknown(),
            }
        }

        Ok(encode_state(&planned)?)
    }

    fn changes(prior: Option<&Value>, planned: &Value) -> Result<ChangeSummary> {
        let planned: BulkState<R::Item> = decode_state(planned)?;
        let prior: BulkState<R::Item> = prior
            .map(decode_state::<BulkState<R::Item>>)
            .transpose()?
            .unwrap_or_default();

        let changes = classify(&prior.items, &planned.items);
        Ok(ChangeSummary {
            create: changes.to_create.into_keys().collect(),
            update: changes.to_update.into_keys().collect(),
            delete: changes.to_delete.into_keys().collect(),
        })
    }

    async fn create(ctx: &ResourceContext<'_>, planned: &Value) -> ApplyResult {
        let planned: BulkState<R::Item> = decode_state(planned)?;
        let reconciler = Self::reconciler(ctx, &planned.domain)?;

        let state = BulkState {
            id: match &planned.id {
                Attr::Known(id) => Attr::Known(id.clone()),
                _ => Attr::Known(Uuid::new_v4().to_string()),
            },
            domain: planned.domain.clone(),
            items: ItemMap::new(),
        };

        info!("Creating {} with {} items", R::TYPE_NAME, planned.items.len());
        let result = reconciler.reconcile(ItemMap::new(), &planned.items).await;
        Self::finish(state, result)
    }

    async fn read(ctx: &ResourceContext<'_>, state: &Value) -> Result<Option<Value>> {
        if state.is_null() {
            return Ok(None);
        }

        let mut state: BulkState<R::Item> = decode_state(state)?;
        let reconciler = Self::reconciler(ctx, &state.domain)?;
        state.items = reconciler.read(std::mem::take(&mut state.items)).await?;

        Ok(Some(encode_state(&state)?))
    }

    async fn update(ctx: &ResourceContext<'_>, prior: &Value, planned: &Value) -> ApplyResult {
        let prior: BulkState<R::Item> = decode_state(prior)?;
        let planned: BulkState<R::Item> = decode_state(planned)?;

        if prior.domain != planned.domain {
            return Err(Error::InvalidConfig(format!(
                "{} cannot move between domains in place",
                R::TYPE_NAME
            ))
            .into());
        }

        let reconciler = Self::reconciler(ctx, &prior.domain)?;
        let BulkState { id, domain, items } = prior;
        let state = BulkState {
            id,
            domain,
            items: ItemMap::new(),
        };

        info!("Updating {}", R::TYPE_NAME);
        let result = reconciler.reconcile(items, &planned.items).await;
        Self::finish(state, result)
    }

    async fn delete(ctx: &ResourceContext<'_>, prior: &Value) -> ApplyResult {
        let prior: BulkState<R::Item> = decode_state(prior)?;
        let reconciler = Self::reconciler(ctx, &prior.domain)?;

        info!("Deleting {} with {} items", R::TYPE_NAME, prior.items.len());
        let BulkState { id, domain, items } = prior;
        let to_delete = items.clone();
        let state = BulkState {
            id,
            domain,
            items: ItemMap::new(),
        };

        match reconciler.delete_subresources(items, to_delete).await {
            Ok(_) => Ok(Value::Null),
            Err(partial) => Self::finish(state, Err(partial)),
        }
    }

    async fn import(ctx: &ResourceContext<'_>, id: &str) -> Result<Value> {
        let import = parse_import_id(id)?;
        info!(
            "Importing {} items into {}",
            import.names.len(),
            R::TYPE_NAME
        );

        let mut state: BulkState<R::Item> = BulkState {
            id: Attr::Known(Uuid::new_v4().to_string()),
            domain: import.domain.clone().into(),
            items: import
                .names
                .iter()
                .map(|name| (name.clone(), R::Item::default()))
                .collect(),
        };

        let reconciler = Self::reconciler(ctx, &state.domain)?;
        state.items = reconciler.read(std::mem::take(&mut state.items)).await?;

        let missing: Vec<&str> = import
            .names
            .iter()
            .filter(|name| !state.items.contains_key(name.as_str()))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            warn!("{} import could not find {:?}", R::TYPE_NAME, missing);
            return Err(Error::InvalidImportId(format!(
                "{} not found: {}",
                R::TYPE_NAME,
                missing.join(", ")
            )));
        }

        Ok(encode_state(&state)?)
    }
}

//! Hook dispatch.
//!
//! Each `run_*` method awaits the registered handler, if any, and returns
//! its error unchanged so the hook's own error identity reaches the caller.
//! Unregistered slots resolve to `Ok(())` without doing anything.
//!
//! No timeout is applied: a slow handler holds up the operation that
//! invoked it.

use serde_json::Value;
use tracing::{debug, warn};

use recordhub_core::result::AppResult;

use crate::context::OperationContext;
use crate::definitions::{HookFuture, HookPoint};
use crate::set::HookSet;

async fn dispatch(point: HookPoint, ctx: &OperationContext, fut: HookFuture) -> AppResult<()> {
    debug!(
        hook = %point,
        entity_type = %ctx.entity_type,
        entity_id = ?ctx.entity_id,
        "Dispatching hook"
    );

    let result = fut.await;
    if let Err(ref err) = result {
        warn!(
            hook = %point,
            entity_type = %ctx.entity_type,
            entity_id = ?ctx.entity_id,
            error = %err,
            "Hook failed"
        );
    }
    result
}

impl<T> HookSet<T> {
    /// Runs `before_create` with the validated payload.
    pub async fn run_before_create(&self, data: &Value, ctx: &OperationContext) -> AppResult<()> {
        match &self.before_create {
            Some(hook) => {
                dispatch(HookPoint::BeforeCreate, ctx, hook(data.clone(), ctx.clone())).await
            }
            None => Ok(()),
        }
    }

    /// Runs `after_create` with the stored record.
    pub async fn run_after_create(&self, record: &T, ctx: &OperationContext) -> AppResult<()>
    where
        T: Clone,
    {
        match &self.after_create {
            Some(hook) => {
                dispatch(HookPoint::AfterCreate, ctx, hook(record.clone(), ctx.clone())).await
            }
            None => Ok(()),
        }
    }

    /// Runs `before_update` with the validated patch.
    pub async fn run_before_update(&self, data: &Value, ctx: &OperationContext) -> AppResult<()> {
        match &self.before_update {
            Some(hook) => {
                dispatch(HookPoint::BeforeUpdate, ctx, hook(data.clone(), ctx.clone())).await
            }
            None => Ok(()),
        }
    }

    /// Runs `after_update` with the new record and the previous one.
    pub async fn run_after_update(
        &self,
        record: &T,
        previous: Option<&T>,
        ctx: &OperationContext,
    ) -> AppResult<()>
    where
        T: Clone,
    {
        match &self.after_update {
            Some(hook) => {
                let fut = hook(record.clone(), previous.cloned(), ctx.clone());
                dispatch(HookPoint::AfterUpdate, ctx, fut).await
            }
            None => Ok(()),
        }
    }

    /// Runs `before_delete` with the record id.
    pub async fn run_before_delete(&self, id: &str, ctx: &OperationContext) -> AppResult<()> {
        match &self.before_delete {
            Some(hook) => {
                dispatch(HookPoint::BeforeDelete, ctx, hook(id.to_string(), ctx.clone())).await
            }
            None => Ok(()),
        }
    }

    /// Runs `after_delete` with the record as it was before deletion.
    pub async fn run_after_delete(&self, record: &T, ctx: &OperationContext) -> AppResult<()>
    where
        T: Clone,
    {
        match &self.after_delete {
            Some(hook) => {
                dispatch(HookPoint::AfterDelete, ctx, hook(record.clone(), ctx.clone())).await
            }
            None => Ok(()),
        }
    }

    /// Runs `before_read`.
    pub async fn run_before_read(&self, ctx: &OperationContext) -> AppResult<()> {
        match &self.before_read {
            Some(hook) => dispatch(HookPoint::BeforeRead, ctx, hook(ctx.clone())).await,
            None => Ok(()),
        }
    }
}

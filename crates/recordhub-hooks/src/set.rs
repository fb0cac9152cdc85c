//! Hook set: one optional handler per hook point.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use recordhub_core::result::AppResult;

use crate::context::OperationContext;
use crate::definitions::{
    ContextHook, HookFuture, HookPoint, IdHook, PayloadHook, RecordHook, UpdateHook,
};

/// The lifecycle hooks of one operation set.
///
/// Every slot is optional and set independently through the builder
/// methods. Handlers are async; a synchronous handler simply returns a
/// ready future (`async move { Ok(()) }`).
pub struct HookSet<T> {
    pub(crate) before_create: Option<PayloadHook>,
    pub(crate) after_create: Option<RecordHook<T>>,
    pub(crate) before_update: Option<PayloadHook>,
    pub(crate) after_update: Option<UpdateHook<T>>,
    pub(crate) before_delete: Option<IdHook>,
    pub(crate) after_delete: Option<RecordHook<T>>,
    pub(crate) before_read: Option<ContextHook>,
}

impl<T> HookSet<T> {
    /// Creates an empty hook set.
    pub fn new() -> Self {
        Self {
            before_create: None,
            after_create: None,
            before_update: None,
            after_update: None,
            before_delete: None,
            after_delete: None,
            before_read: None,
        }
    }

    /// Sets the `before_create` hook.
    pub fn before_create<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Value, OperationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        let handler = move |data: Value, ctx: OperationContext| -> HookFuture {
            Box::pin(hook(data, ctx))
        };
        self.before_create = Some(Arc::new(handler));
        self
    }

    /// Sets the `after_create` hook.
    pub fn after_create<F, Fut>(mut self, hook: F) -> Self
    where
        T: 'static,
        F: Fn(T, OperationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        let handler =
            move |record: T, ctx: OperationContext| -> HookFuture { Box::pin(hook(record, ctx)) };
        self.after_create = Some(Arc::new(handler));
        self
    }

    /// Sets the `before_update` hook.
    pub fn before_update<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Value, OperationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        let handler = move |data: Value, ctx: OperationContext| -> HookFuture {
            Box::pin(hook(data, ctx))
        };
        self.before_update = Some(Arc::new(handler));
        self
    }

    /// Sets the `after_update` hook.
    ///
    /// Registering it makes `update` fetch the previous record first.
    pub fn after_update<F, Fut>(mut self, hook: F) -> Self
    where
        T: 'static,
        F: Fn(T, Option<T>, OperationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        let handler = move |record: T, previous: Option<T>, ctx: OperationContext| -> HookFuture {
            Box::pin(hook(record, previous, ctx))
        };
        self.after_update = Some(Arc::new(handler));
        self
    }

    /// Sets the `before_delete` hook.
    pub fn before_delete<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(String, OperationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        let handler =
            move |id: String, ctx: OperationContext| -> HookFuture { Box::pin(hook(id, ctx)) };
        self.before_delete = Some(Arc::new(handler));
        self
    }

    /// Sets the `after_delete` hook.
    ///
    /// Registering it makes `delete` fetch the record first.
    pub fn after_delete<F, Fut>(mut self, hook: F) -> Self
    where
        T: 'static,
        F: Fn(T, OperationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        let handler =
            move |record: T, ctx: OperationContext| -> HookFuture { Box::pin(hook(record, ctx)) };
        self.after_delete = Some(Arc::new(handler));
        self
    }

    /// Sets the `before_read` hook.
    pub fn before_read<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(OperationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        let handler = move |ctx: OperationContext| -> HookFuture { Box::pin(hook(ctx)) };
        self.before_read = Some(Arc::new(handler));
        self
    }

    /// Returns whether a handler is registered for `point`.
    pub fn has(&self, point: HookPoint) -> bool {
        match point {
            HookPoint::BeforeCreate => self.before_create.is_some(),
            HookPoint::AfterCreate => self.after_create.is_some(),
            HookPoint::BeforeUpdate => self.before_update.is_some(),
            HookPoint::AfterUpdate => self.after_update.is_some(),
            HookPoint::BeforeDelete => self.before_delete.is_some(),
            HookPoint::AfterDelete => self.after_delete.is_some(),
            HookPoint::BeforeRead => self.before_read.is_some(),
        }
    }

    /// Returns all hook points with a registered handler.
    pub fn registered(&self) -> Vec<HookPoint> {
        ALL_POINTS.iter().copied().filter(|p| self.has(*p)).collect()
    }
}

const ALL_POINTS: [HookPoint; 7] = [
    HookPoint::BeforeCreate,
    HookPoint::AfterCreate,
    HookPoint::BeforeUpdate,
    HookPoint::AfterUpdate,
    HookPoint::BeforeDelete,
    HookPoint::AfterDelete,
    HookPoint::BeforeRead,
];

impl<T> Default for HookSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for HookSet<T> {
    fn clone(&self) -> Self {
        Self {
            before_create: self.before_create.clone(),
            after_create: self.after_create.clone(),
            before_update: self.before_update.clone(),
            after_update: self.after_update.clone(),
            before_delete: self.before_delete.clone(),
            after_delete: self.after_delete.clone(),
            before_read: self.before_read.clone(),
        }
    }
}

impl<T> std::fmt::Debug for HookSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookSet")
            .field("registered", &self.registered())
            .finish()
    }
}

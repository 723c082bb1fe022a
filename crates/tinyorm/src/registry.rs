//! The type-to-model cache.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::{Entity, Model, ModelOpt, OrmResult};

/// Cache mapping entity types to their derived [`Model`]s.
///
/// Constructed once per [`Db`](crate::Db) (or standalone) and never torn
/// down. Lookups take a read lock; a miss falls back to derivation and a
/// double-checked publish, so concurrent first callers for the same type may
/// duplicate the derivation work but always converge on a single published
/// model. Published models are immutable and shared by `Arc`.
#[derive(Debug, Default)]
pub struct Registry {
    models: RwLock<HashMap<TypeId, Arc<Model>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached model for `T`, deriving and publishing it on first use.
    pub fn get<T: Entity>(&self) -> Arc<Model> {
        let key = TypeId::of::<T>();
        if let Some(model) = self.models.read().unwrap().get(&key) {
            return model.clone();
        }
        let model = Model::of::<T>();
        let mut models = self.models.write().unwrap();
        // Re-check under the write lock: the first writer wins and later
        // racers adopt its model.
        models
            .entry(key)
            .or_insert_with(|| Arc::new(model))
            .clone()
    }

    /// Derive the model for `T`, apply `opts` to it, and publish it,
    /// replacing any previously cached model for the type.
    pub fn register<T: Entity>(&self, opts: Vec<ModelOpt>) -> OrmResult<Arc<Model>> {
        let mut model = Model::of::<T>();
        for opt in opts {
            opt(&mut model)?;
        }
        let model = Arc::new(model);
        self.models
            .write()
            .unwrap()
            .insert(TypeId::of::<T>(), model.clone());
        Ok(model)
    }
}

//! The `Db` handle: registry + session + dialect + access mode.

use std::sync::Arc;

use crate::qb::{Deletor, Inserter, Selector, Updater};
use crate::session::{Session, Transaction};
use crate::valuer::AccessMode;
use crate::{Dialect, Entity, OrmResult, Registry};

/// The entry point: owns the model registry and the session, and hands out
/// statement builders.
///
/// Cheap to share by reference; builders borrow it. The dialect and access
/// mode are fixed at construction time and shared by every builder.
pub struct Db {
    registry: Registry,
    session: Arc<dyn Session>,
    dialect: Dialect,
    mode: AccessMode,
}

impl Db {
    /// Wrap a session with the defaults: MySQL dialect, accessor-based row
    /// binding.
    pub fn new(session: impl Session + 'static) -> Self {
        Db {
            registry: Registry::new(),
            session: Arc::new(session),
            dialect: Dialect::default(),
            mode: AccessMode::default(),
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_access_mode(mut self, mode: AccessMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn access_mode(&self) -> AccessMode {
        self.mode
    }

    /// The underlying session.
    pub fn session(&self) -> &dyn Session {
        &*self.session
    }

    /// Open a transaction on the underlying session. Usually driven through
    /// the [`transaction!`](crate::transaction) macro.
    pub async fn begin(&self) -> OrmResult<Box<dyn Transaction>> {
        self.session.begin().await
    }

    pub fn select<T: Entity>(&self) -> Selector<'_, T> {
        Selector::new(self, &*self.session)
    }

    pub fn insert<T: Entity>(&self) -> Inserter<'_, T> {
        Inserter::new(self, &*self.session)
    }

    pub fn delete<T: Entity>(&self) -> Deletor<'_, T> {
        Deletor::new(self, &*self.session)
    }

    pub fn update<T: Entity>(&self) -> Updater<'_, T> {
        Updater::new(self, &*self.session)
    }
}

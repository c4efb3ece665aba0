//! Test utilities shared by unit tests (in `src/`) and integration tests (in
//! `tests/`).
//!
//! [`InMemoryStore`] implements both repository ports over plain maps and
//! mirrors the storage rules the PostgreSQL schema enforces: sequential ids,
//! unique usernames and emails, owner existence for calculations, cascade on
//! user delete and the users/calculations inner join.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageRequest;

use crate::domain::ports::{
    CalculationPersistenceError, CalculationRepository, UniqueField, UserPersistenceError,
    UserRepository,
};
use crate::domain::{
    Calculation, CalculationId, CalculationSummary, CalculationUpdate, EmailAddress,
    NewCalculation, NewUser, User, UserId, UserUpdate, Username,
};

#[derive(Debug, Clone)]
struct StoredUser {
    username: Username,
    email: EmailAddress,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i32, StoredUser>,
    calculations: BTreeMap<i32, Calculation>,
    last_user_id: i32,
    last_calculation_id: i32,
}

impl Tables {
    fn assemble(&self, id: i32, stored: &StoredUser) -> User {
        User {
            id: UserId::new(id),
            username: stored.username.clone(),
            email: stored.email.clone(),
            created_at: stored.created_at,
            calculations: self
                .calculations
                .values()
                .filter(|calc| calc.user_id.get() == id)
                .cloned()
                .collect(),
        }
    }

    /// First unique column the given values collide on, ignoring user `except`.
    fn collision(
        &self,
        username: Option<&Username>,
        email: Option<&EmailAddress>,
        except: Option<i32>,
    ) -> Option<UniqueField> {
        let others = || {
            self.users
                .iter()
                .filter(move |(id, _)| Some(**id) != except)
                .map(|(_, user)| user)
        };
        if let Some(username) = username {
            if others().any(|user| &user.username == username) {
                return Some(UniqueField::Username);
            }
        }
        if let Some(email) = email {
            if others().any(|user| &user.email == email) {
                return Some(UniqueField::Email);
            }
        }
        None
    }
}

/// In-memory implementation of [`UserRepository`] and
/// [`CalculationRepository`].
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use calc_api::domain::UserService;
/// use calc_api::test_support::InMemoryStore;
///
/// let store = Arc::new(InMemoryStore::default());
/// let _users = UserService::new(store);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    /// Make every subsequent call fail as if the database were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, String> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err("database unavailable".to_owned());
        }
        self.tables
            .lock()
            .map_err(|_| "in-memory store lock poisoned".to_owned())
    }

    fn users(&self) -> Result<MutexGuard<'_, Tables>, UserPersistenceError> {
        self.lock().map_err(UserPersistenceError::connection)
    }

    fn calculations(&self) -> Result<MutexGuard<'_, Tables>, CalculationPersistenceError> {
        self.lock().map_err(CalculationPersistenceError::connection)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut tables = self.users()?;
        if let Some(field) = tables.collision(Some(&user.username), Some(&user.email), None) {
            return Err(UserPersistenceError::duplicate(field));
        }
        tables.last_user_id += 1;
        let id = tables.last_user_id;
        let stored = StoredUser {
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: Utc::now(),
        };
        let created = tables.assemble(id, &stored);
        tables.users.insert(id, stored);
        Ok(created)
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<User>, UserPersistenceError> {
        let tables = self.users()?;
        Ok(page
            .apply(tables.users.iter())
            .map(|(id, stored)| tables.assemble(*id, stored))
            .collect())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let tables = self.users()?;
        Ok(tables
            .users
            .get(&id.get())
            .map(|stored| tables.assemble(id.get(), stored)))
    }

    async fn update(
        &self,
        id: UserId,
        update: &UserUpdate,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut tables = self.users()?;
        if !tables.users.contains_key(&id.get()) {
            return Ok(None);
        }
        if let Some(field) = tables.collision(
            update.username.as_ref(),
            update.email.as_ref(),
            Some(id.get()),
        ) {
            return Err(UserPersistenceError::duplicate(field));
        }
        let Some(entry) = tables.users.get_mut(&id.get()) else {
            return Ok(None);
        };
        if let Some(username) = &update.username {
            entry.username = username.clone();
        }
        if let Some(email) = &update.email {
            entry.email = email.clone();
        }
        let snapshot = entry.clone();
        Ok(Some(tables.assemble(id.get(), &snapshot)))
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut tables = self.users()?;
        if tables.users.remove(&id.get()).is_none() {
            return Ok(false);
        }
        tables.calculations.retain(|_, calc| calc.user_id != id);
        Ok(true)
    }
}

#[async_trait]
impl CalculationRepository for InMemoryStore {
    async fn create(
        &self,
        calculation: &NewCalculation,
    ) -> Result<Calculation, CalculationPersistenceError> {
        let mut tables = self.calculations()?;
        if !tables.users.contains_key(&calculation.user_id.get()) {
            return Err(CalculationPersistenceError::user_not_found());
        }
        tables.last_calculation_id += 1;
        let id = tables.last_calculation_id;
        let created = Calculation {
            id: CalculationId::new(id),
            operation: calculation.operation.clone(),
            operand_a: calculation.operand_a,
            operand_b: calculation.operand_b,
            result: calculation.result,
            timestamp: Utc::now(),
            user_id: calculation.user_id,
        };
        tables.calculations.insert(id, created.clone());
        Ok(created)
    }

    async fn list(
        &self,
        page: PageRequest,
    ) -> Result<Vec<Calculation>, CalculationPersistenceError> {
        let tables = self.calculations()?;
        Ok(page.apply(tables.calculations.values().cloned()).collect())
    }

    async fn find_by_id(
        &self,
        id: CalculationId,
    ) -> Result<Option<Calculation>, CalculationPersistenceError> {
        let tables = self.calculations()?;
        Ok(tables.calculations.get(&id.get()).cloned())
    }

    async fn list_with_usernames(
        &self,
    ) -> Result<Vec<CalculationSummary>, CalculationPersistenceError> {
        let tables = self.calculations()?;
        Ok(tables
            .calculations
            .values()
            .filter_map(|calc| {
                tables
                    .users
                    .get(&calc.user_id.get())
                    .map(|owner| CalculationSummary {
                        username: owner.username.clone(),
                        operation: calc.operation.clone(),
                        operand_a: calc.operand_a,
                        operand_b: calc.operand_b,
                        result: calc.result,
                    })
            })
            .collect())
    }

    async fn update_result(
        &self,
        id: CalculationId,
        update: CalculationUpdate,
    ) -> Result<Option<Calculation>, CalculationPersistenceError> {
        let mut tables = self.calculations()?;
        Ok(tables.calculations.get_mut(&id.get()).map(|calc| {
            calc.result = update.result;
            calc.clone()
        }))
    }

    async fn delete(&self, id: CalculationId) -> Result<bool, CalculationPersistenceError> {
        let mut tables = self.calculations()?;
        Ok(tables.calculations.remove(&id.get()).is_some())
    }
}

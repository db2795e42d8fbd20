//! In-memory store with the same semantics as `MongoStore`; tests drive the
//! router against it.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::infrastructure::store::{Store, StoreError};
use crate::models::{
    Admission, Booking, Payment, Role, Service, ServiceName, UpdateOutcome, User, UserProfile,
};

#[derive(Default)]
struct Collections {
    services: Vec<Service>,
    bookings: Vec<Booking>,
    users: Vec<User>,
    payments: Vec<Payment>,
}

/// Vec-backed document store.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a service catalog.
    pub fn with_services(services: Vec<Service>) -> Self {
        Self {
            inner: RwLock::new(Collections {
                services,
                ..Collections::default()
            }),
        }
    }

    /// Insert a user record directly, bypassing the login upsert.
    pub fn seed_user(&self, user: User) -> Result<(), StoreError> {
        self.write()?.users.push(user);
        Ok(())
    }

    /// Snapshot of the recorded payment receipts.
    pub fn payments(&self) -> Result<Vec<Payment>, StoreError> {
        Ok(self.read()?.payments.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Internal("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Internal("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_services(&self) -> Result<Vec<Service>, StoreError> {
        Ok(self.read()?.services.clone())
    }

    async fn list_service_names(&self) -> Result<Vec<ServiceName>, StoreError> {
        Ok(self
            .read()?
            .services
            .iter()
            .map(|service| ServiceName {
                name: service.name.clone(),
            })
            .collect())
    }

    async fn find_service_by_name(&self, name: &str) -> Result<Option<Service>, StoreError> {
        Ok(self
            .read()?
            .services
            .iter()
            .find(|service| service.name == name)
            .cloned())
    }

    async fn bookings_for_date(&self, date: &str) -> Result<Vec<Booking>, StoreError> {
        Ok(self
            .read()?
            .bookings
            .iter()
            .filter(|booking| booking.treatment_date == date)
            .cloned()
            .collect())
    }

    async fn bookings_for_patient(&self, email: &str) -> Result<Vec<Booking>, StoreError> {
        Ok(self
            .read()?
            .bookings
            .iter()
            .filter(|booking| booking.patient == email)
            .cloned()
            .collect())
    }

    async fn list_all_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        Ok(self.read()?.bookings.clone())
    }

    async fn booking_by_id(&self, id: &str) -> Result<Option<Booking>, StoreError> {
        Ok(self
            .read()?
            .bookings
            .iter()
            .find(|booking| booking.id == id)
            .cloned())
    }

    async fn insert_booking_unique(&self, booking: Booking) -> Result<Admission, StoreError> {
        // Check and insert under one exclusive lock; concurrent duplicate
        // submissions serialize here.
        let mut inner = self.write()?;
        if let Some(existing) = inner.bookings.iter().find(|b| {
            b.treatment_name == booking.treatment_name
                && b.treatment_date == booking.treatment_date
                && b.patient == booking.patient
        }) {
            return Ok(Admission::Rejected(existing.clone()));
        }
        inner.bookings.push(booking.clone());
        Ok(Admission::Admitted(booking))
    }

    async fn mark_booking_paid(
        &self,
        id: &str,
        transaction_id: &str,
    ) -> Result<Option<Booking>, StoreError> {
        let mut inner = self.write()?;
        let Some(booking) = inner.bookings.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        booking.paid = true;
        booking.transaction_id = Some(transaction_id.to_string());
        Ok(Some(booking.clone()))
    }

    async fn record_payment(&self, payment: Payment) -> Result<(), StoreError> {
        self.write()?.payments.push(payment);
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.read()?.users.clone())
    }

    async fn find_user(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .read()?
            .users
            .iter()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn upsert_user(
        &self,
        email: &str,
        profile: &UserProfile,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut inner = self.write()?;
        if let Some(user) = inner.users.iter_mut().find(|user| user.email == email) {
            // A write that changes nothing reports zero modifications,
            // matching the driver.
            let mut modified = 0;
            if let Some(name) = &profile.name {
                if user.name.as_ref() != Some(name) {
                    user.name = Some(name.clone());
                    modified = 1;
                }
            }
            if let Some(phone) = &profile.phone {
                if user.phone.as_ref() != Some(phone) {
                    user.phone = Some(phone.clone());
                    modified = 1;
                }
            }
            return Ok(UpdateOutcome {
                matched_count: 1,
                modified_count: modified,
                upserted: false,
            });
        }
        inner.users.push(User {
            email: email.to_string(),
            role: Role::Patient,
            name: profile.name.clone(),
            phone: profile.phone.clone(),
        });
        Ok(UpdateOutcome {
            matched_count: 0,
            modified_count: 0,
            upserted: true,
        })
    }

    async fn promote_to_admin(&self, email: &str) -> Result<UpdateOutcome, StoreError> {
        let mut inner = self.write()?;
        match inner.users.iter_mut().find(|user| user.email == email) {
            Some(user) => {
                user.role = Role::Admin;
                Ok(UpdateOutcome {
                    matched_count: 1,
                    modified_count: 1,
                    upserted: false,
                })
            }
            None => Ok(UpdateOutcome {
                matched_count: 0,
                modified_count: 0,
                upserted: false,
            }),
        }
    }
}

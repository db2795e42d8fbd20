use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::{
    FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument, UpdateOptions,
};
use mongodb::{Client, Collection, IndexModel};

use crate::infrastructure::store::{Store, StoreError};
use crate::models::{
    Admission, Booking, Payment, Service, ServiceName, UpdateOutcome, User, UserProfile,
};

/// MongoDB-backed store over the portal's four collections.
#[derive(Clone)]
pub struct MongoStore {
    services: Collection<Service>,
    bookings: Collection<Booking>,
    users: Collection<User>,
    payments: Collection<Payment>,
}

impl MongoStore {
    /// Connect, ping, and make sure the uniqueness indexes exist.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(db_name);
        db.run_command(doc! { "ping": 1 }, None).await?;
        let store = Self {
            services: db.collection("services"),
            bookings: db.collection("bookings"),
            users: db.collection("users"),
            payments: db.collection("payments"),
        };
        store.ensure_indexes().await?;
        tracing::info!("connected to mongodb database {db_name}");
        Ok(store)
    }

    async fn ensure_indexes(&self) -> Result<(), StoreError> {
        // One booking per (treatment, date, patient): a concurrent duplicate
        // insert loses with a duplicate-key error instead of racing a
        // check-then-insert.
        let admission_key = IndexModel::builder()
            .keys(doc! { "treatmentName": 1, "treatmentDate": 1, "patient": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.bookings.create_index(admission_key, None).await?;

        let email_key = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.users.create_index(email_key, None).await?;
        Ok(())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_err)) => write_err.code == 11000,
        _ => false,
    }
}

#[async_trait]
impl Store for MongoStore {
    async fn list_services(&self) -> Result<Vec<Service>, StoreError> {
        let cursor = self.services.find(doc! {}, None).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn list_service_names(&self) -> Result<Vec<ServiceName>, StoreError> {
        let options = FindOptions::builder()
            .projection(doc! { "name": 1, "_id": 0 })
            .build();
        let cursor = self
            .services
            .clone_with_type::<ServiceName>()
            .find(doc! {}, options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_service_by_name(&self, name: &str) -> Result<Option<Service>, StoreError> {
        Ok(self.services.find_one(doc! { "name": name }, None).await?)
    }

    async fn bookings_for_date(&self, date: &str) -> Result<Vec<Booking>, StoreError> {
        let cursor = self
            .bookings
            .find(doc! { "treatmentDate": date }, None)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn bookings_for_patient(&self, email: &str) -> Result<Vec<Booking>, StoreError> {
        let cursor = self.bookings.find(doc! { "patient": email }, None).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn list_all_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        let cursor = self.bookings.find(doc! {}, None).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn booking_by_id(&self, id: &str) -> Result<Option<Booking>, StoreError> {
        Ok(self.bookings.find_one(doc! { "_id": id }, None).await?)
    }

    async fn insert_booking_unique(&self, booking: Booking) -> Result<Admission, StoreError> {
        match self.bookings.insert_one(&booking, None).await {
            Ok(_) => Ok(Admission::Admitted(booking)),
            Err(err) if is_duplicate_key(&err) => {
                // Bookings are never deleted, so the record that won the
                // index race is still there to hand back.
                let filter = doc! {
                    "treatmentName": &booking.treatment_name,
                    "treatmentDate": &booking.treatment_date,
                    "patient": &booking.patient,
                };
                let existing =
                    self.bookings.find_one(filter, None).await?.ok_or_else(|| {
                        StoreError::Internal("duplicate booking vanished".to_string())
                    })?;
                Ok(Admission::Rejected(existing))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn mark_booking_paid(
        &self,
        id: &str,
        transaction_id: &str,
    ) -> Result<Option<Booking>, StoreError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        Ok(self
            .bookings
            .find_one_and_update(
                doc! { "_id": id },
                doc! { "$set": { "paid": true, "transactionId": transaction_id } },
                options,
            )
            .await?)
    }

    async fn record_payment(&self, payment: Payment) -> Result<(), StoreError> {
        self.payments.insert_one(&payment, None).await?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let cursor = self.users.find(doc! {}, None).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_user(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.find_one(doc! { "email": email }, None).await?)
    }

    async fn upsert_user(
        &self,
        email: &str,
        profile: &UserProfile,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut set = doc! { "email": email };
        if let Some(name) = &profile.name {
            set.insert("name", name);
        }
        if let Some(phone) = &profile.phone {
            set.insert("phone", phone);
        }
        // New accounts always start as patients; promotion is a separate
        // admin-gated write.
        let update = doc! {
            "$set": set,
            "$setOnInsert": { "role": "patient" },
        };
        let options = UpdateOptions::builder().upsert(true).build();
        let result = self
            .users
            .update_one(doc! { "email": email }, update, options)
            .await?;
        Ok(UpdateOutcome {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted: result.upserted_id.is_some(),
        })
    }

    async fn promote_to_admin(&self, email: &str) -> Result<UpdateOutcome, StoreError> {
        let result = self
            .users
            .update_one(
                doc! { "email": email },
                doc! { "$set": { "role": "admin" } },
                None,
            )
            .await?;
        Ok(UpdateOutcome {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted: false,
        })
    }
}

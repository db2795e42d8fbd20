//! Booking admission and payment confirmation.

use chrono::Utc;

use crate::error::ApiError;
use crate::infrastructure::Store;
use crate::models::{Admission, Booking, BookingRequest, Payment, PaymentReceipt};

/// Admit a booking unless the patient already holds one for the same
/// treatment and date.
///
/// The slot is stored as submitted; membership in the service's template and
/// current availability are not re-checked here.
pub async fn submit_booking(
    store: &dyn Store,
    request: BookingRequest,
) -> Result<Admission, ApiError> {
    let admission = store.insert_booking_unique(request.into_booking()).await?;
    match &admission {
        Admission::Admitted(booking) => {
            tracing::info!(
                "booking {} admitted: {} on {} for {}",
                booking.id,
                booking.treatment_name,
                booking.treatment_date,
                booking.patient
            );
        }
        Admission::Rejected(existing) => {
            tracing::debug!(
                "booking rejected: {} already booked {} on {}",
                existing.patient,
                existing.treatment_name,
                existing.treatment_date
            );
        }
    }
    Ok(admission)
}

/// Mark a booking paid and append the receipt.
///
/// Two separate writes, not a transaction: when the receipt append fails the
/// booking stays paid, and a retried confirmation converges on the same
/// state.
pub async fn confirm_payment(
    store: &dyn Store,
    booking_id: &str,
    receipt: PaymentReceipt,
) -> Result<Booking, ApiError> {
    let updated = store
        .mark_booking_paid(booking_id, &receipt.transaction_id)
        .await?
        .ok_or(ApiError::NotFound("Booking"))?;

    let payment = Payment {
        booking_id: updated.id.clone(),
        amount: receipt.amount,
        transaction_id: receipt.transaction_id,
        created_at: Utc::now(),
    };
    if let Err(err) = store.record_payment(payment).await {
        tracing::error!("booking {} paid but receipt not recorded: {err}", updated.id);
        return Err(err.into());
    }
    tracing::info!("payment recorded for booking {}", updated.id);
    Ok(updated)
}

pub async fn list_bookings_for_patient(
    store: &dyn Store,
    email: &str,
) -> Result<Vec<Booking>, ApiError> {
    Ok(store.bookings_for_patient(email).await?)
}

pub async fn list_all_bookings(store: &dyn Store) -> Result<Vec<Booking>, ApiError> {
    Ok(store.list_all_bookings().await?)
}

pub async fn get_booking_by_id(store: &dyn Store, id: &str) -> Result<Booking, ApiError> {
    store
        .booking_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("Booking"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryStore;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn request(treatment: &str, date: &str, slot: &str, patient: &str) -> BookingRequest {
        BookingRequest {
            treatment_name: treatment.to_string(),
            treatment_date: date.to_string(),
            patient: patient.to_string(),
            slot: slot.to_string(),
        }
    }

    fn receipt(transaction_id: &str) -> PaymentReceipt {
        PaymentReceipt {
            transaction_id: transaction_id.to_string(),
            amount: Decimal::from(30),
        }
    }

    #[tokio::test]
    async fn a_duplicate_triple_is_rejected_with_the_existing_record() {
        let store = MemoryStore::new();
        let first = submit_booking(&store, request("Cleaning", "2024-01-05", "10am", "a@x.com"))
            .await
            .expect("first");
        let Admission::Admitted(original) = first else {
            panic!("first submission should be admitted");
        };

        // Same triple, different slot: still rejected.
        let second = submit_booking(&store, request("Cleaning", "2024-01-05", "11am", "a@x.com"))
            .await
            .expect("second");
        let Admission::Rejected(existing) = second else {
            panic!("second submission should be rejected");
        };
        assert_eq!(existing, original);
        assert_eq!(
            list_all_bookings(&store).await.expect("list").len(),
            1,
            "the rejected submission must not write"
        );
    }

    #[tokio::test]
    async fn triples_differing_in_one_field_are_both_admitted() {
        let store = MemoryStore::new();
        let submissions = [
            request("Cleaning", "2024-01-05", "10am", "a@x.com"),
            request("Cleaning", "2024-01-06", "10am", "a@x.com"),
            request("Whitening", "2024-01-05", "10am", "a@x.com"),
            request("Cleaning", "2024-01-05", "10am", "b@x.com"),
        ];
        for submission in submissions {
            let admission = submit_booking(&store, submission).await.expect("submit");
            assert!(matches!(admission, Admission::Admitted(_)));
        }
        assert_eq!(list_all_bookings(&store).await.expect("list").len(), 4);
    }

    #[tokio::test]
    async fn concurrent_duplicate_submissions_admit_exactly_once() {
        let store = Arc::new(MemoryStore::new());

        let first = {
            let store = store.clone();
            tokio::spawn(async move {
                submit_booking(
                    store.as_ref(),
                    request("Cleaning", "2024-01-05", "10am", "a@x.com"),
                )
                .await
            })
        };
        let second = {
            let store = store.clone();
            tokio::spawn(async move {
                submit_booking(
                    store.as_ref(),
                    request("Cleaning", "2024-01-05", "11am", "a@x.com"),
                )
                .await
            })
        };

        let outcomes = [
            first.await.expect("join").expect("submit"),
            second.await.expect("join").expect("submit"),
        ];
        let admitted = outcomes
            .iter()
            .filter(|outcome| matches!(outcome, Admission::Admitted(_)))
            .count();
        assert_eq!(admitted, 1);
        assert_eq!(list_all_bookings(store.as_ref()).await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn confirming_sets_paid_and_records_one_receipt() {
        let store = MemoryStore::new();
        let admission = submit_booking(&store, request("Cleaning", "2024-01-05", "10am", "a@x.com"))
            .await
            .expect("submit");
        let Admission::Admitted(booking) = admission else {
            panic!("expected admission");
        };
        assert!(!booking.paid);

        let updated = confirm_payment(&store, &booking.id, receipt("txn_1"))
            .await
            .expect("confirm");
        assert!(updated.paid);
        assert_eq!(updated.transaction_id.as_deref(), Some("txn_1"));

        let payments = store.payments().expect("payments");
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].booking_id, booking.id);
        assert_eq!(payments[0].transaction_id, "txn_1");
    }

    #[tokio::test]
    async fn confirming_an_unknown_booking_writes_nothing() {
        let store = MemoryStore::new();
        let err = confirm_payment(&store, "no-such-id", receipt("txn_1"))
            .await
            .expect_err("missing booking");
        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(store.payments().expect("payments").is_empty());
    }

    #[tokio::test]
    async fn a_second_receipt_overwrites_the_transaction_id() {
        // Known gap, kept deliberately: re-confirming with a different
        // receipt replaces the recorded transaction id.
        let store = MemoryStore::new();
        let admission = submit_booking(&store, request("Cleaning", "2024-01-05", "10am", "a@x.com"))
            .await
            .expect("submit");
        let Admission::Admitted(booking) = admission else {
            panic!("expected admission");
        };

        confirm_payment(&store, &booking.id, receipt("txn_1"))
            .await
            .expect("first confirm");
        let updated = confirm_payment(&store, &booking.id, receipt("txn_2"))
            .await
            .expect("second confirm");
        assert_eq!(updated.transaction_id.as_deref(), Some("txn_2"));
    }

    #[tokio::test]
    async fn lookup_by_id_returns_the_stored_booking() {
        let store = MemoryStore::new();
        let admission = submit_booking(&store, request("Cleaning", "2024-01-05", "10am", "a@x.com"))
            .await
            .expect("submit");
        let Admission::Admitted(booking) = admission else {
            panic!("expected admission");
        };

        let found = get_booking_by_id(&store, &booking.id).await.expect("found");
        assert_eq!(found, booking);
        let err = get_booking_by_id(&store, "missing").await.expect_err("missing");
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}

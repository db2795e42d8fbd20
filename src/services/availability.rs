//! Slot availability per service for a given date.

use std::collections::{HashMap, HashSet};

use crate::error::ApiError;
use crate::infrastructure::Store;
use crate::models::{Booking, Service, ServiceAvailability};

/// Compute the open slots of every service on `date`.
///
/// Reads the catalog and the day's bookings once; no writes happen on this
/// path, so two calls without an intervening submission answer identically.
pub async fn compute_availability(
    store: &dyn Store,
    date: &str,
) -> Result<Vec<ServiceAvailability>, ApiError> {
    let services = store.list_services().await?;
    let bookings = store.bookings_for_date(date).await?;
    Ok(annotate(services, &bookings))
}

/// Annotate each service with the slots not yet booked.
///
/// Booked slots are grouped by treatment name in one pass so the per-service
/// filtering never rescans the booking list. Slot labels compare exactly and
/// case-sensitively; template order is preserved.
fn annotate(services: Vec<Service>, bookings: &[Booking]) -> Vec<ServiceAvailability> {
    let mut booked: HashMap<&str, HashSet<&str>> = HashMap::new();
    for booking in bookings {
        booked
            .entry(booking.treatment_name.as_str())
            .or_default()
            .insert(booking.slot.as_str());
    }

    // A booked treatment missing from the catalog is a data inconsistency,
    // not a failure.
    let known: HashSet<&str> = services.iter().map(|s| s.name.as_str()).collect();
    for name in booked.keys() {
        if !known.contains(name) {
            tracing::warn!("booking references unknown treatment {name:?}");
        }
    }

    services
        .into_iter()
        .map(|service| {
            let taken = booked.get(service.name.as_str());
            let available = service
                .slots
                .iter()
                .filter(|slot| taken.map_or(true, |set| !set.contains(slot.as_str())))
                .cloned()
                .collect();
            ServiceAvailability { service, available }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryStore;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn catalog() -> Vec<Service> {
        vec![
            Service {
                name: "Teeth Cleaning".to_string(),
                slots: vec!["9am".to_string(), "10am".to_string(), "11am".to_string()],
                price: Decimal::from(30),
            },
            Service {
                name: "Whitening".to_string(),
                slots: vec!["10am".to_string(), "2pm".to_string()],
                price: Decimal::from(80),
            },
        ]
    }

    fn booking(treatment: &str, date: &str, slot: &str, patient: &str) -> Booking {
        Booking {
            id: Uuid::new_v4().to_string(),
            treatment_name: treatment.to_string(),
            treatment_date: date.to_string(),
            patient: patient.to_string(),
            slot: slot.to_string(),
            paid: false,
            transaction_id: None,
        }
    }

    #[test]
    fn empty_day_leaves_every_slot_open() {
        let out = annotate(catalog(), &[]);
        assert_eq!(out[0].available, vec!["9am", "10am", "11am"]);
        assert_eq!(out[1].available, vec!["10am", "2pm"]);
    }

    #[test]
    fn booked_slots_are_removed_in_template_order() {
        let bookings = vec![booking("Teeth Cleaning", "2024-01-05", "10am", "a@x.com")];
        let out = annotate(catalog(), &bookings);
        assert_eq!(out[0].available, vec!["9am", "11am"]);
        // Another service's identical label stays open.
        assert_eq!(out[1].available, vec!["10am", "2pm"]);
    }

    #[test]
    fn a_fully_booked_service_has_no_open_slots() {
        let bookings = vec![
            booking("Whitening", "2024-01-05", "10am", "a@x.com"),
            booking("Whitening", "2024-01-05", "2pm", "b@x.com"),
        ];
        let out = annotate(catalog(), &bookings);
        assert!(out[1].available.is_empty());
        assert_eq!(out[0].available, vec!["9am", "10am", "11am"]);
    }

    #[test]
    fn slot_labels_compare_case_sensitively() {
        let bookings = vec![booking("Teeth Cleaning", "2024-01-05", "10AM", "a@x.com")];
        let out = annotate(catalog(), &bookings);
        assert_eq!(out[0].available, vec!["9am", "10am", "11am"]);
    }

    #[test]
    fn unknown_treatments_do_not_disturb_the_catalog() {
        let bookings = vec![booking("Ghost Treatment", "2024-01-05", "10am", "a@x.com")];
        let out = annotate(catalog(), &bookings);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].available, vec!["9am", "10am", "11am"]);
    }

    #[tokio::test]
    async fn rereading_availability_is_stable() {
        let store = MemoryStore::with_services(catalog());
        store
            .insert_booking_unique(booking("Teeth Cleaning", "2024-01-05", "10am", "a@x.com"))
            .await
            .expect("insert");

        let first = compute_availability(&store, "2024-01-05")
            .await
            .expect("first read");
        let second = compute_availability(&store, "2024-01-05")
            .await
            .expect("second read");
        assert_eq!(first, second);
        assert_eq!(first[0].available, vec!["9am", "11am"]);
    }

    #[tokio::test]
    async fn bookings_on_other_dates_are_invisible() {
        let store = MemoryStore::with_services(catalog());
        store
            .insert_booking_unique(booking("Teeth Cleaning", "2024-01-06", "10am", "a@x.com"))
            .await
            .expect("insert");

        let out = compute_availability(&store, "2024-01-05")
            .await
            .expect("read");
        assert_eq!(out[0].available, vec!["9am", "10am", "11am"]);
    }
}

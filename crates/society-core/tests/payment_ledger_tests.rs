use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use uuid::Uuid;

use society_core::auth::{Principal, Role};
use society_core::error::SocietyError;
use society_core::service::{PaymentInput, SocietyService};
use society_core::store::SocietyStore;

// ===========================================================================
// Contribution payment tests
// ===========================================================================

fn service() -> (SocietyService, Principal, Principal) {
    let service = SocietyService::new(SocietyStore::new());
    let admin = Principal::new(Uuid::new_v4(), Role::Admin);
    let staff = Principal::new(Uuid::new_v4(), Role::Staff);
    (service, admin, staff)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn pay(amount: &str, month: &str) -> PaymentInput {
    PaymentInput {
        amount: amount.parse().unwrap(),
        month: month.into(),
    }
}

#[test]
fn test_payment_matches_default_amount() {
    let (service, admin, staff) = service();

    // No amount configured: the default of 600 applies.
    assert_eq!(service.current_amount(&staff).unwrap(), dec!(600));

    let out = service.make_payment(&staff, pay("600", "2025-01")).unwrap();
    assert_eq!(out.payment.amount, dec!(600));
    assert_eq!(out.total_balance, dec!(600));

    // Anything else is rejected, including overpayment.
    assert!(matches!(
        service.make_payment(&staff, pay("650", "2025-02")),
        Err(SocietyError::InvalidInput { .. })
    ));
    assert!(service.make_payment(&staff, pay("599.99", "2025-02")).is_err());

    // The failed attempts posted nothing.
    assert_eq!(service.total_balance(&admin).unwrap(), dec!(600));
}

#[test]
fn test_payment_tracks_effective_amount() {
    let (service, admin, staff) = service();
    service.add_amount(&admin, dec!(650), date(2020, 1, 1)).unwrap();

    assert!(service.make_payment(&staff, pay("600", "2025-01")).is_err());
    let out = service.make_payment(&staff, pay("650", "2025-01")).unwrap();
    assert_eq!(out.total_balance, dec!(650));
}

#[test]
fn test_payment_month_label_must_be_period() {
    let (service, _, staff) = service();
    assert!(service.make_payment(&staff, pay("600", "January")).is_err());
    assert!(service.make_payment(&staff, pay("600", "2025-13")).is_err());
    assert!(service.make_payment(&staff, pay("600", "2025-01")).is_ok());
}

#[test]
fn test_delete_payment_reverses_exactly() {
    let (service, admin, staff) = service();
    service.create_ledger_entry(&admin, dec!(1000), "opening float".into()).unwrap();
    let before = service.total_balance(&admin).unwrap();

    let out = service.make_payment(&staff, pay("600", "2025-01")).unwrap();
    assert_eq!(out.total_balance, before + dec!(600));

    let balance = service.delete_payment(&admin, out.payment.id).unwrap();
    assert_eq!(balance, before);

    // The record is gone but both ledger entries remain.
    assert!(matches!(
        service.delete_payment(&admin, out.payment.id),
        Err(SocietyError::NotFound { .. })
    ));
    assert_eq!(service.list_ledger_entries(&admin).unwrap().entries.len(), 3);
}

#[test]
fn test_update_payment_posts_delta_even_when_zero() {
    let (service, admin, staff) = service();
    let out = service.make_payment(&staff, pay("600", "2025-01")).unwrap();

    // Month correction with an unchanged amount: a zero-amount entry is
    // still posted, keeping the adjustment trail complete.
    let updated = service
        .update_payment(&admin, out.payment.id, pay("600", "2025-02"))
        .unwrap();
    assert_eq!(updated.payment.month, "2025-02");
    assert_eq!(updated.total_balance, dec!(600));

    let ledger = service.list_ledger_entries(&admin).unwrap();
    assert_eq!(ledger.entries.len(), 2);
    assert!(ledger.entries.iter().any(|e| e.amount == dec!(0)));
}

#[test]
fn test_update_payment_revalidates_against_effective_amount() {
    let (service, admin, staff) = service();
    let out = service.make_payment(&staff, pay("600", "2025-01")).unwrap();

    assert!(service
        .update_payment(&admin, out.payment.id, pay("700", "2025-01"))
        .is_err());
    assert!(matches!(
        service.update_payment(&staff, out.payment.id, pay("600", "2025-01")),
        Err(SocietyError::Forbidden(_))
    ));
}

#[test]
fn test_list_payments_scopes_by_role() {
    let (service, admin, staff) = service();
    let other = Principal::new(Uuid::new_v4(), Role::Staff);
    service.make_payment(&staff, pay("600", "2025-01")).unwrap();
    service.make_payment(&other, pay("600", "2025-01")).unwrap();

    assert_eq!(service.list_payments(&admin).unwrap().len(), 2);
    assert_eq!(service.list_payments(&staff).unwrap().len(), 1);
}

// ===========================================================================
// Manual ledger entries and the derived balance
// ===========================================================================

#[test]
fn test_balance_is_recomputed_from_entries() {
    let (service, admin, _) = service();

    let a = service.create_ledger_entry(&admin, dec!(250.50), "donation".into()).unwrap();
    service.create_ledger_entry(&admin, dec!(-100.25), "stationery".into()).unwrap();
    service.create_ledger_entry(&admin, dec!(49.75), "bank interest".into()).unwrap();
    assert_eq!(service.total_balance(&admin).unwrap(), dec!(200.00));

    // Editing a manual entry is absorbed by the fold on the next read.
    let updated = service
        .update_ledger_entry(&admin, a.entry.id, Some(dec!(300.50)), None)
        .unwrap();
    assert_eq!(updated.total_balance, dec!(250.00));

    // Deleting a manual entry has no cascading effect beyond the sum.
    let balance = service.delete_ledger_entry(&admin, a.entry.id).unwrap();
    assert_eq!(balance, dec!(-50.50));
}

#[test]
fn test_ledger_is_admin_only() {
    let (service, _, staff) = service();
    assert!(matches!(
        service.create_ledger_entry(&staff, dec!(1), "x".into()),
        Err(SocietyError::Forbidden(_))
    ));
    assert!(service.list_ledger_entries(&staff).is_err());
    assert!(service.total_balance(&staff).is_err());
}

// ===========================================================================
// Effective series administration
// ===========================================================================

#[test]
fn test_amount_series_admin_crud() {
    let (service, admin, staff) = service();

    assert!(matches!(
        service.add_amount(&staff, dec!(600), date(2024, 1, 1)),
        Err(SocietyError::Forbidden(_))
    ));

    let record = service.add_amount(&admin, dec!(650), date(2020, 1, 1)).unwrap();
    assert_eq!(service.current_amount(&staff).unwrap(), dec!(650));

    service
        .update_amount(&admin, record.id, Some(dec!(700)), None)
        .unwrap();
    assert_eq!(service.current_amount(&staff).unwrap(), dec!(700));

    service.delete_amount(&admin, record.id).unwrap();
    assert_eq!(service.current_amount(&staff).unwrap(), dec!(600));
    assert!(service.list_amounts(&admin).unwrap().is_empty());
}

#[test]
fn test_rate_series_defaults_to_none() {
    let (service, admin, staff) = service();
    assert_eq!(service.current_rate(&staff).unwrap(), None);

    service.add_rate(&admin, dec!(12), date(2020, 1, 1)).unwrap();
    assert_eq!(service.current_rate(&staff).unwrap(), Some(dec!(12)));

    // Future-dated revisions do not apply yet.
    service.add_rate(&admin, dec!(14), date(2099, 1, 1)).unwrap();
    assert_eq!(service.current_rate(&staff).unwrap(), Some(dec!(12)));
}

//! Lease fixtures

use chrono::{NaiveDate, TimeZone, Utc};
use lessor_domain::{
    Actor, ApprovalStatus, ClientId, CoTenant, Lease, LeaseDuration, LeaseFees, LeaseId,
    LeaseStatus, Luid, PropertyRef, RenewalOptions, SigningMethod, TenantParty, TenantRef, UserId,
};

/// Fixed calendar date helper
#[must_use]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Tenant party with a resolved account
#[must_use]
pub fn tenant_party(email: &str) -> TenantParty {
    TenantParty {
        reference: TenantRef::ExistingUser(UserId::new()),
        name: "Sam Tenant".into(),
        email: email.into(),
    }
}

/// Co-tenant without an account
#[must_use]
pub fn co_tenant(email: &str) -> CoTenant {
    CoTenant {
        name: "Robin Cosigner".into(),
        email: email.into(),
        user_id: None,
    }
}

/// Draft lease with sensible defaults
#[must_use]
pub fn draft_lease() -> Lease {
    let now = Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap();
    Lease {
        id: LeaseId::new(),
        luid: Luid::generate(),
        client_id: ClientId::new(),
        lease_number: "L-1001".into(),
        status: LeaseStatus::Draft,
        approval_status: ApprovalStatus::Draft,
        tenant: Some(tenant_party("sam@example.com")),
        co_tenants: vec![],
        property: PropertyRef {
            property_id: "prop-1".into(),
            unit_id: Some("unit-2a".into()),
            manager_user_id: Some(UserId::new()),
            manager_email: Some("manager@example.com".into()),
        },
        duration: LeaseDuration::new(date(2025, 2, 1), date(2026, 1, 31)),
        fees: LeaseFees {
            monthly_rent_cents: 150_000,
            security_deposit_cents: 150_000,
            rent_due_day: 1,
            currency: "USD".into(),
            late_fee_cents: Some(5_000),
            late_fee_grace_days: Some(5),
        },
        renewal_options: RenewalOptions::default(),
        pet_policy: None,
        utilities_included: vec!["water".into()],
        legal_terms: Some("Standard residential terms".into()),
        signing_method: SigningMethod::Manual,
        esign_provider: None,
        esignature: None,
        signatures: vec![],
        document: None,
        pending_changes: None,
        approval_details: vec![],
        previous_lease_id: None,
        auto_send_info: None,
        internal_notes: None,
        inspection_date: None,
        created_by: Actor::admin(UserId::new()),
        last_modified_by: vec![],
        created_at: now,
        updated_at: now,
        deleted: false,
    }
}

/// Active, approved lease
#[must_use]
pub fn active_lease() -> Lease {
    let mut lease = draft_lease();
    lease.status = LeaseStatus::Active;
    lease.approval_status = ApprovalStatus::Approved;
    lease
}

/// Active lease configured for auto-renew generation
#[must_use]
pub fn auto_renew_lease(end_date: NaiveDate, days_before_generation: i64) -> Lease {
    let mut lease = active_lease();
    lease.duration.end_date = end_date;
    lease.renewal_options = RenewalOptions {
        auto_renew: true,
        require_approval: false,
        days_before_expiry_to_generate_renewal: Some(days_before_generation),
        enable_auto_send_for_signature: true,
        days_before_expiry_to_auto_send_signature: Some(14),
        renewal_term_months: Some(12),
    };
    lease.signing_method = SigningMethod::Electronic;
    lease.esign_provider = Some("docuseal".into());
    lease
}

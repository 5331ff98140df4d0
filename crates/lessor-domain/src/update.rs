//! Typed partial-update payloads
//!
//! Callers submit a typed field set rather than a free-form document; the
//! classification table in the policy crate matches statically on
//! [`LeaseField`], with no dot-path walking. Keys the type does not know
//! (including every immutable bookkeeping field) land in `unrecognized`,
//! where the policy layer rejects them by name.

use crate::lease::{CoTenant, PetPolicy, PropertyRef, RenewalOptions, SigningMethod, TenantParty};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Closed set of mutable top-level lease fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaseField {
    Tenant,
    CoTenants,
    Property,
    StartDate,
    EndDate,
    MoveInDate,
    MoveOutDate,
    MonthlyRent,
    SecurityDeposit,
    RentDueDay,
    Currency,
    LateFee,
    LegalTerms,
    RenewalOptions,
    PetPolicy,
    UtilitiesIncluded,
    SigningMethod,
    InternalNotes,
    InspectionDate,
}

impl LeaseField {
    /// Wire name used in payloads and error messages
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            LeaseField::Tenant => "tenant",
            LeaseField::CoTenants => "co_tenants",
            LeaseField::Property => "property",
            LeaseField::StartDate => "start_date",
            LeaseField::EndDate => "end_date",
            LeaseField::MoveInDate => "move_in_date",
            LeaseField::MoveOutDate => "move_out_date",
            LeaseField::MonthlyRent => "monthly_rent",
            LeaseField::SecurityDeposit => "security_deposit",
            LeaseField::RentDueDay => "rent_due_day",
            LeaseField::Currency => "currency",
            LeaseField::LateFee => "late_fee",
            LeaseField::LegalTerms => "legal_terms",
            LeaseField::RenewalOptions => "renewal_options",
            LeaseField::PetPolicy => "pet_policy",
            LeaseField::UtilitiesIncluded => "utilities_included",
            LeaseField::SigningMethod => "signing_method",
            LeaseField::InternalNotes => "internal_notes",
            LeaseField::InspectionDate => "inspection_date",
        }
    }
}

impl std::fmt::Display for LeaseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed partial update; every field is optional, absent means "unchanged"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<TenantParty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co_tenants: Option<Vec<CoTenant>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<PropertyRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_in_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_out_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_rent_cents: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_deposit_cents: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent_due_day: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub late_fee_cents: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub late_fee_grace_days: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_terms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewal_options: Option<RenewalOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet_policy: Option<PetPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utilities_included: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_method: Option<SigningMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspection_date: Option<NaiveDate>,

    /// Keys outside the typed field set, captured for rejection by name
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty", default)]
    pub unrecognized: BTreeMap<String, serde_json::Value>,
}

impl UpdatePayload {
    /// Fields present in this payload, in declaration order
    #[must_use]
    pub fn fields(&self) -> Vec<LeaseField> {
        let mut present = Vec::new();
        let mut push = |cond: bool, field: LeaseField| {
            if cond && !present.contains(&field) {
                present.push(field);
            }
        };
        push(self.tenant.is_some(), LeaseField::Tenant);
        push(self.co_tenants.is_some(), LeaseField::CoTenants);
        push(self.property.is_some(), LeaseField::Property);
        push(self.start_date.is_some(), LeaseField::StartDate);
        push(self.end_date.is_some(), LeaseField::EndDate);
        push(self.move_in_date.is_some(), LeaseField::MoveInDate);
        push(self.move_out_date.is_some(), LeaseField::MoveOutDate);
        push(self.monthly_rent_cents.is_some(), LeaseField::MonthlyRent);
        push(
            self.security_deposit_cents.is_some(),
            LeaseField::SecurityDeposit,
        );
        push(self.rent_due_day.is_some(), LeaseField::RentDueDay);
        push(self.currency.is_some(), LeaseField::Currency);
        push(
            self.late_fee_cents.is_some() || self.late_fee_grace_days.is_some(),
            LeaseField::LateFee,
        );
        push(self.legal_terms.is_some(), LeaseField::LegalTerms);
        push(self.renewal_options.is_some(), LeaseField::RenewalOptions);
        push(self.pet_policy.is_some(), LeaseField::PetPolicy);
        push(
            self.utilities_included.is_some(),
            LeaseField::UtilitiesIncluded,
        );
        push(self.signing_method.is_some(), LeaseField::SigningMethod);
        push(self.internal_notes.is_some(), LeaseField::InternalNotes);
        push(self.inspection_date.is_some(), LeaseField::InspectionDate);
        present
    }

    /// Whether no typed field is present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// New payload containing only the listed fields
    #[must_use]
    pub fn project(&self, keep: &[LeaseField]) -> UpdatePayload {
        let mut out = UpdatePayload::default();
        for field in keep {
            match field {
                LeaseField::Tenant => out.tenant = self.tenant.clone(),
                LeaseField::CoTenants => out.co_tenants = self.co_tenants.clone(),
                LeaseField::Property => out.property = self.property.clone(),
                LeaseField::StartDate => out.start_date = self.start_date,
                LeaseField::EndDate => out.end_date = self.end_date,
                LeaseField::MoveInDate => out.move_in_date = self.move_in_date,
                LeaseField::MoveOutDate => out.move_out_date = self.move_out_date,
                LeaseField::MonthlyRent => out.monthly_rent_cents = self.monthly_rent_cents,
                LeaseField::SecurityDeposit => {
                    out.security_deposit_cents = self.security_deposit_cents;
                }
                LeaseField::RentDueDay => out.rent_due_day = self.rent_due_day,
                LeaseField::Currency => out.currency = self.currency.clone(),
                LeaseField::LateFee => {
                    out.late_fee_cents = self.late_fee_cents;
                    out.late_fee_grace_days = self.late_fee_grace_days;
                }
                LeaseField::LegalTerms => out.legal_terms = self.legal_terms.clone(),
                LeaseField::RenewalOptions => out.renewal_options = self.renewal_options,
                LeaseField::PetPolicy => out.pet_policy = self.pet_policy.clone(),
                LeaseField::UtilitiesIncluded => {
                    out.utilities_included = self.utilities_included.clone();
                }
                LeaseField::SigningMethod => out.signing_method = self.signing_method,
                LeaseField::InternalNotes => out.internal_notes = self.internal_notes.clone(),
                LeaseField::InspectionDate => out.inspection_date = self.inspection_date,
            }
        }
        out
    }

    /// Apply every present field to the lease. Classification and status
    /// gating must already have happened; this is a plain merge.
    pub fn apply_to(&self, lease: &mut crate::lease::Lease) {
        if let Some(tenant) = &self.tenant {
            lease.tenant = Some(tenant.clone());
        }
        if let Some(co_tenants) = &self.co_tenants {
            lease.co_tenants = co_tenants.clone();
        }
        if let Some(property) = &self.property {
            lease.property = property.clone();
        }
        if let Some(start) = self.start_date {
            lease.duration.start_date = start;
        }
        if let Some(end) = self.end_date {
            lease.duration.end_date = end;
        }
        if let Some(move_in) = self.move_in_date {
            lease.duration.move_in_date = Some(move_in);
        }
        if let Some(move_out) = self.move_out_date {
            lease.duration.move_out_date = Some(move_out);
        }
        if let Some(rent) = self.monthly_rent_cents {
            lease.fees.monthly_rent_cents = rent;
        }
        if let Some(deposit) = self.security_deposit_cents {
            lease.fees.security_deposit_cents = deposit;
        }
        if let Some(day) = self.rent_due_day {
            lease.fees.rent_due_day = day;
        }
        if let Some(currency) = &self.currency {
            lease.fees.currency = currency.clone();
        }
        if let Some(late_fee) = self.late_fee_cents {
            lease.fees.late_fee_cents = Some(late_fee);
        }
        if let Some(grace) = self.late_fee_grace_days {
            lease.fees.late_fee_grace_days = Some(grace);
        }
        if let Some(terms) = &self.legal_terms {
            lease.legal_terms = Some(terms.clone());
        }
        if let Some(options) = self.renewal_options {
            lease.renewal_options = options;
        }
        if let Some(policy) = &self.pet_policy {
            lease.pet_policy = Some(policy.clone());
        }
        if let Some(utilities) = &self.utilities_included {
            lease.utilities_included = utilities.clone();
        }
        if let Some(method) = self.signing_method {
            lease.signing_method = method;
        }
        if let Some(notes) = &self.internal_notes {
            lease.internal_notes = Some(notes.clone());
        }
        if let Some(date) = self.inspection_date {
            lease.inspection_date = Some(date);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fields_reports_present_fields_only() {
        let payload = UpdatePayload {
            monthly_rent_cents: Some(200_000),
            internal_notes: Some("called tenant".into()),
            ..Default::default()
        };
        assert_eq!(
            payload.fields(),
            vec![LeaseField::MonthlyRent, LeaseField::InternalNotes]
        );
    }

    #[test]
    fn late_fee_halves_report_one_field() {
        let payload = UpdatePayload {
            late_fee_grace_days: Some(5),
            ..Default::default()
        };
        assert_eq!(payload.fields(), vec![LeaseField::LateFee]);
    }

    #[test]
    fn project_keeps_only_requested_fields() {
        let payload = UpdatePayload {
            monthly_rent_cents: Some(200_000),
            internal_notes: Some("note".into()),
            ..Default::default()
        };
        let projected = payload.project(&[LeaseField::InternalNotes]);
        assert_eq!(projected.fields(), vec![LeaseField::InternalNotes]);
        assert_eq!(projected.monthly_rent_cents, None);
    }

    #[test]
    fn unknown_keys_are_captured_not_dropped() {
        let payload: UpdatePayload = serde_json::from_value(serde_json::json!({
            "internal_notes": "ok",
            "approval_status": "approved"
        }))
        .unwrap();
        assert!(payload.unrecognized.contains_key("approval_status"));
    }
}

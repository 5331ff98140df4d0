//! Field classification table

use lessor_domain::LeaseField;

/// Mutation class of a lease field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    /// Changes legal or financial terms; requires approval-role authorization
    HighImpact,
    /// Safe to apply directly once the status gate permits any edit
    Operational,
}

/// Classify a mutable field.
///
/// Immutable fields never reach this table: they are not representable in
/// [`lessor_domain::UpdatePayload`] and are rejected by key via
/// [`IMMUTABLE_KEYS`].
#[must_use]
pub fn classification(field: LeaseField) -> FieldClass {
    use LeaseField::*;
    match field {
        Tenant | CoTenants | Property | StartDate | EndDate | MoveInDate | MoveOutDate
        | MonthlyRent | SecurityDeposit | RentDueDay | Currency | LateFee | LegalTerms
        | RenewalOptions | PetPolicy | UtilitiesIncluded => FieldClass::HighImpact,
        SigningMethod | InternalNotes | InspectionDate => FieldClass::Operational,
    }
}

/// Identity and bookkeeping keys that can never appear in an accepted update
/// payload, regardless of status or role.
pub const IMMUTABLE_KEYS: &[&str] = &[
    "id",
    "luid",
    "client_id",
    "lease_number",
    "status",
    "approval_status",
    "signatures",
    "esignature",
    "esign_provider",
    "document",
    "pending_changes",
    "approval_details",
    "previous_lease_id",
    "auto_send_info",
    "created_by",
    "created_at",
    "updated_at",
    "last_modified_by",
    "deleted",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn financial_and_legal_fields_are_high_impact() {
        for field in [
            LeaseField::MonthlyRent,
            LeaseField::Tenant,
            LeaseField::StartDate,
            LeaseField::LegalTerms,
        ] {
            assert_eq!(classification(field), FieldClass::HighImpact, "{field}");
        }
    }

    #[test]
    fn notes_and_inspection_are_operational() {
        assert_eq!(
            classification(LeaseField::InternalNotes),
            FieldClass::Operational
        );
        assert_eq!(
            classification(LeaseField::InspectionDate),
            FieldClass::Operational
        );
    }
}

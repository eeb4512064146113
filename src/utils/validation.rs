//! Validation utilities

use bigdecimal::BigDecimal;

use crate::schedule::ScheduleTable;
use crate::traits::*;
use crate::types::*;

/// Validate that an amount is not negative
pub fn validate_non_negative_amount(amount: &BigDecimal) -> TrackerResult<()> {
    if *amount < BigDecimal::from(0) {
        Err(TrackerError::Validation(
            "Amount cannot be negative".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate that a contract number is valid
pub fn validate_contract_number(contract_number: &str) -> TrackerResult<()> {
    if contract_number.trim().is_empty() {
        return Err(TrackerError::Validation(
            "Contract number cannot be empty".to_string(),
        ));
    }

    if contract_number.len() > 50 {
        return Err(TrackerError::Validation(
            "Contract number cannot exceed 50 characters".to_string(),
        ));
    }

    // Contract numbers look like "123/2024" or "CT-0042.1"
    if !contract_number
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '/' | '.'))
    {
        return Err(TrackerError::Validation(
            "Contract number can only contain alphanumeric characters, dashes, underscores, slashes, and dots"
                .to_string(),
        ));
    }

    Ok(())
}

/// Validate that a party name is valid
pub fn validate_party_name(field: &str, name: &str) -> TrackerResult<()> {
    if name.trim().is_empty() {
        return Err(TrackerError::Validation(format!("{} cannot be empty", field)));
    }

    if name.len() > 200 {
        return Err(TrackerError::Validation(format!(
            "{} cannot exceed 200 characters",
            field
        )));
    }

    Ok(())
}

/// Validate that a line item name is valid
pub fn validate_item_name(name: &str) -> TrackerResult<()> {
    if name.trim().is_empty() {
        return Err(TrackerError::Validation(
            "Line item name cannot be empty".to_string(),
        ));
    }

    if name.len() > 100 {
        return Err(TrackerError::Validation(
            "Line item name cannot exceed 100 characters".to_string(),
        ));
    }

    Ok(())
}

/// Enhanced project validator with detailed checks
pub struct EnhancedProjectValidator;

impl ProjectValidator for EnhancedProjectValidator {
    fn validate_details(&self, details: &ProjectDetails) -> TrackerResult<()> {
        // Basic validation
        DefaultProjectValidator.validate_details(details)?;

        validate_contract_number(&details.contract_number)?;
        validate_party_name("Contracting party", &details.contracting_party)?;
        validate_party_name("Contractor", &details.contractor)?;
        validate_non_negative_amount(&details.value_received)?;

        Ok(())
    }

    fn validate_schedule(&self, table: &ScheduleTable) -> TrackerResult<()> {
        DefaultProjectValidator.validate_schedule(table)?;

        for row in table.rows() {
            validate_item_name(&row.name)?;
            for amount in &row.values {
                validate_non_negative_amount(amount).map_err(|_| {
                    TrackerError::Validation(format!(
                        "Line item '{}' has a negative amount",
                        row.name
                    ))
                })?;
            }
        }

        Ok(())
    }
}

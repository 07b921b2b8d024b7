//! Boundary validation: turns the raw form into an [`EligibilityRequest`].
//!
//! Checks run in a fixed order and stop at the first problem: mandatory
//! fields, numeric types, then non-negativity. The credit score is carried
//! raw and parsed with [`parse_credit_score`] when its rule runs.

use std::fmt;

use crate::models::{
    EligibilityRequest, RawForm, CREDIT_SCORE_PARAM, MANDATORY_PARAMS, NUMERIC_PARAMS,
};

/// Why a request was rejected before rule evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more mandatory fields are absent.
    MissingParameter(Vec<&'static str>),
    /// The named field does not parse as a number.
    InvalidType(&'static str),
    /// The named field is below zero.
    NegativeValue(&'static str),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingParameter(_) => {
                write!(f, "all mandatory parameters are not sent")
            }
            ValidationError::InvalidType(param) => write!(f, "Parameter {} should be numeric", param),
            ValidationError::NegativeValue(param) => {
                write!(f, "Parameter {} should not be negative", param)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    /// Label written to the call history for this failure.
    pub fn history_label(&self) -> String {
        match self {
            ValidationError::MissingParameter(_) => "missing mandatory parameter".to_string(),
            ValidationError::InvalidType(param) => format!("{} data type", param),
            ValidationError::NegativeValue(param) => format!("{} negative", param),
        }
    }
}

/// Returns the mandatory fields absent from `form`, in declaration order.
pub fn missing_parameters(form: &RawForm, mandatory: &[&'static str]) -> Vec<&'static str> {
    mandatory
        .iter()
        .copied()
        .filter(|param| !form.contains_key(*param))
        .collect()
}

/// True when every mandatory field is present.
pub fn check_required_parameter(form: &RawForm, mandatory: &[&'static str]) -> bool {
    missing_parameters(form, mandatory).is_empty()
}

/// Parses a finite number, tolerating surrounding whitespace.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parses the credit score as an integer, tolerating surrounding whitespace.
pub fn parse_credit_score(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// Validates `form` and builds the typed request.
pub fn validate(form: &RawForm) -> Result<EligibilityRequest, ValidationError> {
    let missing = missing_parameters(form, &MANDATORY_PARAMS);
    if !missing.is_empty() {
        return Err(ValidationError::MissingParameter(missing));
    }

    let mut numbers = [0.0_f64; NUMERIC_PARAMS.len()];
    for (slot, param) in numbers.iter_mut().zip(NUMERIC_PARAMS) {
        *slot = parse_number(field(form, param)).ok_or(ValidationError::InvalidType(param))?;
    }

    if let Some((_, param)) = numbers
        .iter()
        .zip(NUMERIC_PARAMS)
        .find(|(value, _)| **value < 0.0)
    {
        return Err(ValidationError::NegativeValue(param));
    }

    let [vintage_months, average_annual_turnover, required_loan_amount, preferred_monthly_emi, _pincode] =
        numbers;

    Ok(EligibilityRequest {
        application_id: field(form, "application_id").to_string(),
        business_name: field(form, "business_name").to_string(),
        business_pincode: field(form, "business_pincode").to_string(),
        mobile_number: field(form, "mobile_number").to_string(),
        business_type: field(form, "business_type").to_string(),
        business_main_sector: field(form, "business_main_sector").to_string(),
        business_specific_sector: field(form, "business_specific_sector").to_string(),
        vintage_months,
        average_annual_turnover,
        required_loan_amount,
        preferred_monthly_emi,
        applicant_name: field(form, "applicant_name").to_string(),
        highmark_score: field(form, CREDIT_SCORE_PARAM).to_string(),
        loan_purpose: optional(form, "loan_purpose"),
        applicant_pan_number: optional(form, "applicant_pan_number"),
        email_address: optional(form, "email_address"),
        email_type: optional(form, "email_type"),
        dev_bypass: optional(form, "dev_bypass"),
        loan_type: optional(form, "loan_type"),
        applicant_highmark_xml: optional(form, "applicant_highmark_XML"),
    })
}

// Only called for fields already confirmed present.
fn field<'a>(form: &'a RawForm, key: &str) -> &'a str {
    form.get(key).map(String::as_str).unwrap_or_default()
}

fn optional(form: &RawForm, key: &str) -> Option<String> {
    form.get(key).cloned()
}

//! Ordered eligibility rules.
//!
//! [`RULE_CHAIN`] is evaluated front to back and the first failing rule
//! decides the response; later rules never run.

use crate::errors::{AppError, ResultExt};
use crate::models::{EligibilityRequest, CREDIT_SCORE_PARAM, EXCLUDED_LOAN_PURPOSES};
use crate::pincode_client::PincodeLookup;
use crate::response::{EligibilityResult, NA};
use crate::sectors::SectorCatalog;
use crate::thresholds::ThresholdSet;
use crate::validation::{parse_credit_score, ValidationError};

/// Pincodes this long or longer are rejected before any lookup.
pub const MAX_PINCODE_LEN: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    PincodeFormat,
    PincodeServiceability,
    Sector,
    SubSector,
    Vintage,
    Turnover,
    LoanAmount,
    CreditScore,
    LoanPurpose,
}

/// Evaluation order.
pub const RULE_CHAIN: [Rule; 9] = [
    Rule::PincodeFormat,
    Rule::PincodeServiceability,
    Rule::Sector,
    Rule::SubSector,
    Rule::Vintage,
    Rule::Turnover,
    Rule::LoanAmount,
    Rule::CreditScore,
    Rule::LoanPurpose,
];

/// Why the chain stopped for a lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The lead failed this rule.
    Rule(Rule),
    /// A field read only by a rule could not be parsed when that rule ran.
    Invalid(ValidationError),
}

/// External lookups some rules depend on.
pub struct Lookups<'a> {
    pub pincodes: &'a dyn PincodeLookup,
    pub sectors: &'a dyn SectorCatalog,
}

impl Rule {
    /// `error_response_code` reported when this rule fails.
    pub fn error_code(self) -> &'static str {
        match self {
            Rule::PincodeFormat => NA,
            Rule::PincodeServiceability => "252",
            Rule::Sector => "253",
            Rule::SubSector => "254",
            Rule::Vintage => "255",
            Rule::Turnover => "256",
            Rule::LoanAmount => "257",
            Rule::CreditScore => "258",
            Rule::LoanPurpose => "251",
        }
    }

    /// `body_message` reported when this rule fails. Also the history label.
    pub fn body_message(self) -> &'static str {
        match self {
            Rule::PincodeFormat => "entered pincode is wrong",
            Rule::PincodeServiceability => "Non Serviceable Pin-code",
            Rule::Sector => "Excluded Sector",
            Rule::SubSector => "Excluded Sub-Sector",
            Rule::Vintage => "Low vintage",
            Rule::Turnover => "Low Annual Business Turnover",
            Rule::LoanAmount => "Loan Amount not in Range",
            Rule::CreditScore => "Highmark Score is not as per the loan policy",
            Rule::LoanPurpose => "Non Serviceable Loan Purpose",
        }
    }

    /// Short name used in step logs.
    pub fn name(self) -> &'static str {
        match self {
            Rule::PincodeFormat => "pincode format",
            Rule::PincodeServiceability => "pincode serviceability",
            Rule::Sector => "sector validity",
            Rule::SubSector => "sub-sector validity",
            Rule::Vintage => "vintage",
            Rule::Turnover => "annual turnover",
            Rule::LoanAmount => "loan amount",
            Rule::CreditScore => "highmark score",
            Rule::LoanPurpose => "loan purpose",
        }
    }

    /// Envelope returned when this rule rejects the lead.
    pub fn failure(self) -> EligibilityResult {
        EligibilityResult::rule_failure(self.body_message(), self.error_code())
    }

    /// `None` when the lead passes this rule. Lookup failures are errors, not rejections.
    pub async fn check(
        self,
        request: &EligibilityRequest,
        thresholds: &ThresholdSet,
        lookups: &Lookups<'_>,
    ) -> Result<Option<Rejection>, AppError> {
        let passed = match self {
            Rule::PincodeFormat => pincode_format_ok(&request.business_pincode),
            Rule::PincodeServiceability => lookups
                .pincodes
                .check_pincode(&request.business_pincode)
                .await
                .context("checking pincode serviceability")?,
            Rule::Sector => lookups
                .sectors
                .validate_sector(&request.business_main_sector, &request.business_type)
                .await
                .context("validating sector")?,
            Rule::SubSector => !lookups
                .sectors
                .validate_subsector(
                    &request.business_main_sector,
                    &request.business_type,
                    &request.business_specific_sector,
                )
                .await
                .context("validating sub-sector")?,
            Rule::Vintage => {
                vintage_ok(&request.business_type, request.vintage_months, thresholds)
            }
            Rule::Turnover => within_bounds(
                request.average_annual_turnover,
                thresholds.min_turnover,
                thresholds.max_turnover,
            ),
            Rule::LoanAmount => within_bounds(
                request.required_loan_amount,
                thresholds.min_loan_amount,
                thresholds.max_loan_amount,
            ),
            Rule::CreditScore => match parse_credit_score(&request.highmark_score) {
                Some(score) => credit_score_ok(score, thresholds),
                None => {
                    let invalid = ValidationError::InvalidType(CREDIT_SCORE_PARAM);
                    return Ok(Some(Rejection::Invalid(invalid)));
                }
            },
            Rule::LoanPurpose => loan_purpose_ok(&request.normalized_loan_purpose()),
        };
        Ok((!passed).then_some(Rejection::Rule(self)))
    }
}

/// Runs [`RULE_CHAIN`] and returns the first rejection, if any.
pub async fn first_failure(
    request: &EligibilityRequest,
    thresholds: &ThresholdSet,
    lookups: &Lookups<'_>,
) -> Result<Option<Rejection>, AppError> {
    for rule in RULE_CHAIN {
        tracing::debug!(
            application_id = %request.application_id,
            "Evaluating {} rule",
            rule.name()
        );
        if let Some(rejection) = rule.check(request, thresholds, lookups).await? {
            tracing::info!(
                application_id = %request.application_id,
                "Lead stopped at {} rule: {:?}",
                rule.name(),
                rejection
            );
            return Ok(Some(rejection));
        }
    }
    Ok(None)
}

pub fn pincode_format_ok(pincode: &str) -> bool {
    pincode.chars().count() < MAX_PINCODE_LEN
}

/// Manufacturing needs at least `min_vintage` months, trading and services at
/// least `max_vintage`. Other business types are not vintage-checked.
pub fn vintage_ok(business_type: &str, vintage_months: f64, thresholds: &ThresholdSet) -> bool {
    match business_type.to_lowercase().as_str() {
        "manufacturing" => vintage_months >= thresholds.min_vintage as f64,
        "trading" | "services" => vintage_months >= thresholds.max_vintage as f64,
        _ => true,
    }
}

/// Inclusive on both ends.
pub fn within_bounds(value: f64, min: i64, max: i64) -> bool {
    value >= min as f64 && value <= max as f64
}

/// Fails scores strictly inside `(min_crif_score, max_crif_score)`.
///
/// This is the literal production condition and reads inverted against a
/// usual "score must be in band" policy. Kept until product confirms intent.
pub fn credit_score_ok(score: i64, thresholds: &ThresholdSet) -> bool {
    !(score > thresholds.min_crif_score && score < thresholds.max_crif_score)
}

pub fn loan_purpose_ok(normalized_purpose: &str) -> bool {
    !EXCLUDED_LOAN_PURPOSES.contains(&normalized_purpose)
}

use std::collections::HashMap;

/// Form fields exactly as submitted, keyed by field name.
pub type RawForm = HashMap<String, String>;

/// Fields every eligibility request must carry.
pub const MANDATORY_PARAMS: [&str; 13] = [
    "application_id",
    "business_name",
    "business_pincode",
    "mobile_number",
    "business_type",
    "business_main_sector",
    "business_specific_sector",
    "vintage_months",
    "average_annual_turnover",
    "required_loan_amount",
    "preferred_monthly_EMI",
    "applicant_name",
    "app_highmark_score_A8",
];

/// Fields that are read when present.
pub const OPTIONAL_PARAMS: [&str; 7] = [
    "loan_purpose",
    "applicant_pan_number",
    "email_address",
    "email_type",
    "dev_bypass",
    "loan_type",
    "applicant_highmark_XML",
];

/// Fields that must parse as non-negative numbers, checked in this order.
pub const NUMERIC_PARAMS: [&str; 5] = [
    "vintage_months",
    "average_annual_turnover",
    "required_loan_amount",
    "preferred_monthly_EMI",
    "business_pincode",
];

pub const CREDIT_SCORE_PARAM: &str = "app_highmark_score_A8";

/// Loan purposes the lender does not serve, in normalized form.
pub const EXCLUDED_LOAN_PURPOSES: [&str; 2] = ["machine_purchase", "asset_purchase"];

/// A lead after boundary validation. Built once per request and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct EligibilityRequest {
    pub application_id: String,
    pub business_name: String,
    /// Pincode as submitted; the format rule inspects its raw length.
    pub business_pincode: String,
    pub mobile_number: String,
    pub business_type: String,
    pub business_main_sector: String,
    pub business_specific_sector: String,
    pub vintage_months: f64,
    pub average_annual_turnover: f64,
    pub required_loan_amount: f64,
    pub preferred_monthly_emi: f64,
    pub applicant_name: String,
    /// Raw `app_highmark_score_A8`; parsed only by the credit score rule.
    pub highmark_score: String,
    pub loan_purpose: Option<String>,
    pub applicant_pan_number: Option<String>,
    pub email_address: Option<String>,
    pub email_type: Option<String>,
    pub dev_bypass: Option<String>,
    pub loan_type: Option<String>,
    /// Accepted for compatibility; the report is never fetched.
    pub applicant_highmark_xml: Option<String>,
}

impl EligibilityRequest {
    /// `dev_bypass` counts only when it is case-insensitively `"true"`.
    pub fn is_dev_bypass(&self) -> bool {
        self.dev_bypass
            .as_deref()
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
    }

    pub fn normalized_loan_purpose(&self) -> String {
        normalize_loan_purpose(self.loan_purpose.as_deref())
    }
}

/// Lowercases and replaces spaces with underscores; absent purposes become `"missing"`.
pub fn normalize_loan_purpose(purpose: Option<&str>) -> String {
    purpose
        .unwrap_or("missing")
        .to_lowercase()
        .replace(' ', "_")
}

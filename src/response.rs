//! Uniform result envelope returned by every non-internal branch.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Placeholder used for body fields that do not apply to a branch.
pub const NA: &str = "NA";

/// `request_message` of every response where the API call itself succeeded.
pub const API_CALL_COMPLETED: &str = "successfully completed API call";

/// Whether the API call itself succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Success,
    Fail,
}

/// Eligibility verdict carried in the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum EligibilityStatus {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "fail")]
    Fail,
    /// The request never reached rule evaluation.
    #[serde(rename = "NA")]
    NotApplicable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResultBody {
    pub online_leads_eligibility_status: EligibilityStatus,
    pub body_message: String,
    /// Stable rule code (`"251"`..`"258"`) or `"NA"`.
    pub error_response_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EligibilityResult {
    pub request_status: RequestStatus,
    pub request_message: String,
    pub body: ResultBody,
}

impl EligibilityResult {
    pub fn new(
        request_status: RequestStatus,
        request_message: impl Into<String>,
        online_leads_eligibility_status: EligibilityStatus,
        body_message: impl Into<String>,
        error_response_code: impl Into<String>,
    ) -> Self {
        Self {
            request_status,
            request_message: request_message.into(),
            body: ResultBody {
                online_leads_eligibility_status,
                body_message: body_message.into(),
                error_response_code: error_response_code.into(),
            },
        }
    }

    /// The caller's request was unprocessable (method, token, parameters).
    pub fn request_failure(request_message: impl Into<String>) -> Self {
        Self::new(
            RequestStatus::Fail,
            request_message,
            EligibilityStatus::NotApplicable,
            NA,
            NA,
        )
    }

    /// The request was valid but the lead failed an eligibility rule.
    pub fn rule_failure(body_message: impl Into<String>, error_response_code: impl Into<String>) -> Self {
        Self::new(
            RequestStatus::Success,
            API_CALL_COMPLETED,
            EligibilityStatus::Fail,
            body_message,
            error_response_code,
        )
    }

    /// The lead is eligible (or evaluation was bypassed).
    pub fn eligible(body_message: impl Into<String>) -> Self {
        Self::new(
            RequestStatus::Success,
            API_CALL_COMPLETED,
            EligibilityStatus::Success,
            body_message,
            NA,
        )
    }

    /// Outcome recorded as `logic_status` in the call history.
    pub fn logic_status(&self) -> &'static str {
        match (self.request_status, self.body.online_leads_eligibility_status) {
            (RequestStatus::Success, EligibilityStatus::Success) => "success",
            _ => "fail",
        }
    }
}

//! The eligibility pipeline behind the endpoint.
//!
//! Flow:
//! 1. Token and API-access check.
//! 2. Mandatory parameters, numeric types, non-negativity.
//! 3. `dev_bypass` short-circuit.
//! 4. Threshold fetch.
//! 5. Rule chain, first failure wins.
//!
//! Every terminal branch is written to the call history. Collaborator
//! failures come back as `Err` and are never recorded as rejections.

use std::sync::Arc;

use crate::auth::{AccessDecision, AccessGate};
use crate::errors::{AppError, ResultExt};
use crate::history::{make_log, CallHistory, CallRecord};
use crate::models::RawForm;
use crate::pincode_client::PincodeLookup;
use crate::response::{EligibilityResult, NA};
use crate::rules::{first_failure, Lookups, Rejection};
use crate::sectors::SectorCatalog;
use crate::thresholds::ThresholdProvider;
use crate::validation::validate;

pub const DEV_BYPASS_MESSAGE: &str =
    "DEV_BYPASS -> online_leads_eligibility process has been by-passed successfully";
pub const ELIGIBLE_MESSAGE: &str = "online leads eligibility process completed successfully";

/// Runs the eligibility pipeline for one request.
pub struct EligibilityService {
    api_name: String,
    access: Arc<dyn AccessGate>,
    thresholds: Arc<dyn ThresholdProvider>,
    pincodes: Arc<dyn PincodeLookup>,
    sectors: Arc<dyn SectorCatalog>,
    history: Arc<dyn CallHistory>,
}

impl EligibilityService {
    pub fn new(
        api_name: impl Into<String>,
        access: Arc<dyn AccessGate>,
        thresholds: Arc<dyn ThresholdProvider>,
        pincodes: Arc<dyn PincodeLookup>,
        sectors: Arc<dyn SectorCatalog>,
        history: Arc<dyn CallHistory>,
    ) -> Self {
        Self {
            api_name: api_name.into(),
            access,
            thresholds,
            pincodes,
            sectors,
            history,
        }
    }

    pub async fn evaluate(&self, form: &RawForm) -> Result<EligibilityResult, AppError> {
        let api_name = self.api_name.as_str();

        make_log(form, "Token authentication", api_name);
        let decision = self
            .access
            .validate_token_and_api_access(form, api_name)
            .await
            .context("validating API token")?;
        if let AccessDecision::Denied(reason) = decision {
            let result = EligibilityResult::request_failure(reason);
            return Ok(self.finish(form, "token", result));
        }

        make_log(form, "Validating request parameters", api_name);
        let request = match validate(form) {
            Ok(request) => request,
            Err(e) => {
                tracing::info!(api_name, "Request rejected: {}", e);
                let result = EligibilityResult::request_failure(e.to_string());
                return Ok(self.finish(form, e.history_label(), result));
            }
        };

        if request.is_dev_bypass() {
            make_log(form, "dev_bypass is set, skipping eligibility rules", api_name);
            return Ok(self.finish(form, NA, EligibilityResult::eligible(DEV_BYPASS_MESSAGE)));
        }

        make_log(form, "Fetching eligibility thresholds", api_name);
        let thresholds = self
            .thresholds
            .thresholds(api_name)
            .await
            .context("fetching eligibility thresholds")?;
        tracing::debug!(api_name, "Thresholds for this API: {:?}", thresholds);

        let lookups = Lookups {
            pincodes: self.pincodes.as_ref(),
            sectors: self.sectors.as_ref(),
        };
        match first_failure(&request, &thresholds, &lookups).await? {
            Some(Rejection::Rule(rule)) => {
                Ok(self.finish(form, rule.body_message(), rule.failure()))
            }
            Some(Rejection::Invalid(e)) => {
                tracing::info!(api_name, "Request rejected: {}", e);
                let result = EligibilityResult::request_failure(e.to_string());
                Ok(self.finish(form, e.history_label(), result))
            }
            None => {
                make_log(form, "All checks are completed - Success response", api_name);
                Ok(self.finish(form, NA, EligibilityResult::eligible(ELIGIBLE_MESSAGE)))
            }
        }
    }

    fn finish(
        &self,
        form: &RawForm,
        api_error_label: impl Into<String>,
        result: EligibilityResult,
    ) -> EligibilityResult {
        self.history.add_api_call_hist_data(CallRecord::new(
            &self.api_name,
            api_error_label,
            form,
            &result,
        ));
        result
    }
}

//! In-memory collaborators shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use online_leads_eligibility::auth::{AccessDecision, AccessGate};
use online_leads_eligibility::eligibility::EligibilityService;
use online_leads_eligibility::errors::AppError;
use online_leads_eligibility::history::{CallHistory, CallRecord};
use online_leads_eligibility::models::RawForm;
use online_leads_eligibility::pincode_client::PincodeLookup;
use online_leads_eligibility::sectors::SectorCatalog;
use online_leads_eligibility::thresholds::{ThresholdProvider, ThresholdSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const API_NAME: &str = "los/v1/online_leads_eligibility";

pub struct FakeAccess {
    pub decision: AccessDecision,
}

#[async_trait]
impl AccessGate for FakeAccess {
    async fn validate_token_and_api_access(
        &self,
        _form: &RawForm,
        _api_name: &str,
    ) -> Result<AccessDecision, AppError> {
        Ok(self.decision.clone())
    }
}

pub struct FakeThresholds {
    pub result: Result<ThresholdSet, AppError>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl ThresholdProvider for FakeThresholds {
    async fn thresholds(&self, _api_name: &str) -> Result<ThresholdSet, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

pub struct FakePincodes {
    pub serviceable: Result<bool, AppError>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl PincodeLookup for FakePincodes {
    async fn check_pincode(&self, _pincode: &str) -> Result<bool, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.serviceable.clone()
    }
}

pub struct FakeSectors {
    pub sector_valid: bool,
    pub subsector_excluded: bool,
    pub calls: AtomicUsize,
}

#[async_trait]
impl SectorCatalog for FakeSectors {
    async fn validate_sector(
        &self,
        _main_sector: &str,
        _business_type: &str,
    ) -> Result<bool, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.sector_valid)
    }

    async fn validate_subsector(
        &self,
        _main_sector: &str,
        _business_type: &str,
        _specific_sector: &str,
    ) -> Result<bool, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.subsector_excluded)
    }
}

#[derive(Default)]
pub struct RecordingHistory {
    pub records: Mutex<Vec<CallRecord>>,
}

impl CallHistory for RecordingHistory {
    fn add_api_call_hist_data(&self, record: CallRecord) {
        self.records.lock().unwrap().push(record);
    }
}

impl RecordingHistory {
    pub fn labels(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.api_error_label.clone())
            .collect()
    }
}

pub fn default_thresholds() -> ThresholdSet {
    ThresholdSet {
        min_vintage: 12,
        max_vintage: 24,
        min_turnover: 600_000,
        max_turnover: 180_000_000,
        min_loan_amount: 50_000,
        max_loan_amount: 3_000_000,
        min_crif_score: 300,
        max_crif_score: 650,
    }
}

/// A lead that passes every rule against [`default_thresholds`].
pub fn valid_form() -> RawForm {
    [
        ("token", "test-token"),
        ("application_id", "APP-2024-0042"),
        ("business_name", "Lakshmi Fabrications"),
        ("business_pincode", "560058"),
        ("mobile_number", "9845012345"),
        ("business_type", "manufacturing"),
        ("business_main_sector", "textiles"),
        ("business_specific_sector", "garments"),
        ("vintage_months", "48"),
        ("average_annual_turnover", "2500000"),
        ("required_loan_amount", "800000"),
        ("preferred_monthly_EMI", "25000"),
        ("applicant_name", "Lakshmi Narayan"),
        ("app_highmark_score_A8", "720"),
        ("loan_purpose", "Working Capital"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

pub fn with(mut form: RawForm, key: &str, value: &str) -> RawForm {
    form.insert(key.to_string(), value.to_string());
    form
}

pub fn without(mut form: RawForm, key: &str) -> RawForm {
    form.remove(key);
    form
}

/// Service wired to fakes, with handles kept for assertions.
pub struct Harness {
    pub thresholds: Arc<FakeThresholds>,
    pub pincodes: Arc<FakePincodes>,
    pub sectors: Arc<FakeSectors>,
    pub history: Arc<RecordingHistory>,
    pub service: EligibilityService,
}

pub struct HarnessBuilder {
    access: AccessDecision,
    thresholds: Result<ThresholdSet, AppError>,
    serviceable: Result<bool, AppError>,
    sector_valid: bool,
    subsector_excluded: bool,
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self {
            access: AccessDecision::Granted,
            thresholds: Ok(default_thresholds()),
            serviceable: Ok(true),
            sector_valid: true,
            subsector_excluded: false,
        }
    }
}

impl HarnessBuilder {
    pub fn access(mut self, decision: AccessDecision) -> Self {
        self.access = decision;
        self
    }

    pub fn thresholds(mut self, result: Result<ThresholdSet, AppError>) -> Self {
        self.thresholds = result;
        self
    }

    pub fn serviceable(mut self, result: Result<bool, AppError>) -> Self {
        self.serviceable = result;
        self
    }

    pub fn sector_valid(mut self, valid: bool) -> Self {
        self.sector_valid = valid;
        self
    }

    pub fn subsector_excluded(mut self, excluded: bool) -> Self {
        self.subsector_excluded = excluded;
        self
    }

    pub fn build(self) -> Harness {
        let thresholds = Arc::new(FakeThresholds {
            result: self.thresholds,
            calls: AtomicUsize::new(0),
        });
        let pincodes = Arc::new(FakePincodes {
            serviceable: self.serviceable,
            calls: AtomicUsize::new(0),
        });
        let sectors = Arc::new(FakeSectors {
            sector_valid: self.sector_valid,
            subsector_excluded: self.subsector_excluded,
            calls: AtomicUsize::new(0),
        });
        let history = Arc::new(RecordingHistory::default());

        let service = EligibilityService::new(
            API_NAME,
            Arc::new(FakeAccess {
                decision: self.access,
            }),
            thresholds.clone(),
            pincodes.clone(),
            sectors.clone(),
            history.clone(),
        );

        Harness {
            thresholds,
            pincodes,
            sectors,
            history,
            service,
        }
    }
}

pub fn harness() -> HarnessBuilder {
    HarnessBuilder::default()
}

impl Harness {
    pub fn lookup_calls(&self) -> usize {
        self.pincodes.calls.load(Ordering::SeqCst) + self.sectors.calls.load(Ordering::SeqCst)
    }

    pub fn threshold_calls(&self) -> usize {
        self.thresholds.calls.load(Ordering::SeqCst)
    }
}

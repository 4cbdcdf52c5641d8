use serde::{Deserialize, Deserializer, Serialize};

/// Raw form values as entered by the user, keyed by field name.
///
/// Everything is a string at this layer; `normalize` performs the only
/// coercion the client does. Semantic validation is the estimator's job.
#[derive(Debug, Clone)]
pub struct RawFields {
    pub vcpu: String,
    pub memory_gb: String,
    pub concurrency: String,
    pub avg_duration_ms: String,
    pub requests_per_min: String,
    pub region: String,
    pub min_instances: String,
    pub max_instances: String,
    pub idle_utilization_pc: String,
}

impl Default for RawFields {
    fn default() -> Self {
        Self {
            vcpu: "1".into(),
            memory_gb: "1".into(),
            concurrency: "80".into(),
            avg_duration_ms: "200".into(),
            requests_per_min: "600".into(),
            region: "asia-south1".into(),
            min_instances: "0".into(),
            max_instances: "5".into(),
            idle_utilization_pc: "10".into(),
        }
    }
}

/// Coerce raw form fields into a typed request.
///
/// Unparseable numerics become sentinels instead of errors: floats carry
/// `f64::NAN` and integers `None`. Both serialize to JSON `null`, which the
/// estimator rejects on its side of the contract.
pub fn normalize(raw: &RawFields) -> EstimateRequest {
    EstimateRequest {
        vcpu: parse_float(&raw.vcpu),
        memory_gb: parse_float(&raw.memory_gb),
        concurrency: parse_int(&raw.concurrency),
        avg_duration_ms: parse_int(&raw.avg_duration_ms),
        requests_per_min: parse_int(&raw.requests_per_min),
        region: raw.region.trim().to_string(),
        min_instances: parse_int(&raw.min_instances),
        max_instances: parse_int(&raw.max_instances),
        idle_utilization_pc: parse_float(&raw.idle_utilization_pc),
    }
}

fn parse_float(s: &str) -> f64 {
    s.trim().parse().unwrap_or(f64::NAN)
}

fn parse_int(s: &str) -> Option<i64> {
    s.trim().parse().ok()
}

/// serde: accept `null` back as NaN so persisted sentinel snapshots reload.
fn f64_or_nan<'de, D>(d: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NAN))
}

/// Normalized deployment-sizing parameters sent to the estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    #[serde(deserialize_with = "f64_or_nan")]
    pub vcpu: f64,
    #[serde(deserialize_with = "f64_or_nan")]
    pub memory_gb: f64,
    pub concurrency: Option<i64>,
    pub avg_duration_ms: Option<i64>,
    pub requests_per_min: Option<i64>,
    pub region: String,
    pub min_instances: Option<i64>,
    pub max_instances: Option<i64>,
    #[serde(deserialize_with = "f64_or_nan")]
    pub idle_utilization_pc: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitFootprint {
    pub cost_usd: f64,
    pub co2_g: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyForecast {
    pub cost_usd: f64,
    pub co2_kg: f64,
}

/// Successful estimator output. The service sends more (per-hour figures,
/// assumptions); anything not listed here is ignored on parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateResponse {
    pub risk_score: f64,
    pub per_1k_requests: UnitFootprint,
    pub monthly_forecast: MonthlyForecast,
    pub suggested_yaml: String,
    pub advice: Vec<String>,
}

/// Parsed body of a completed exchange: either a report or the service's own
/// `{ "error": ... }` shape. Both occupy the same result slot and both are
/// recorded in history; only transport/parse failures are excluded there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EstimateOutcome {
    Report(EstimateResponse),
    ServiceError { error: String },
}

impl EstimateOutcome {
    pub fn risk_score(&self) -> f64 {
        match self {
            EstimateOutcome::Report(r) => r.risk_score,
            EstimateOutcome::ServiceError { .. } => 0.0,
        }
    }

    pub fn cost_per_1k(&self) -> f64 {
        match self {
            EstimateOutcome::Report(r) => r.per_1k_requests.cost_usd,
            EstimateOutcome::ServiceError { .. } => 0.0,
        }
    }
}

/// Immutable snapshot of one completed request/response pair, plus the two
/// derived fields the history listing shows without unpacking `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unix timestamp in milliseconds.
    pub ts: i64,
    pub region: String,
    pub input: EstimateRequest,
    pub data: EstimateOutcome,
    pub score: f64,
    #[serde(rename = "costPer1k")]
    pub cost_per_1k: f64,
}

impl HistoryEntry {
    /// Snapshot a completed exchange, stamped with the current wall clock.
    pub fn record(input: EstimateRequest, data: EstimateOutcome) -> Self {
        Self::record_at(unix_millis_now(), input, data)
    }

    pub fn record_at(ts: i64, input: EstimateRequest, data: EstimateOutcome) -> Self {
        Self {
            ts,
            region: input.region.clone(),
            score: data.risk_score(),
            cost_per_1k: data.cost_per_1k(),
            input,
            data,
        }
    }
}

fn unix_millis_now() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Display tone for a risk score. Thresholds are advisory only; the score
/// itself comes from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskTier {
    ProductionReady,
    NeedsReview,
    AtRisk,
}

impl RiskTier {
    pub fn for_score(score: f64) -> Self {
        if score >= 90.0 {
            RiskTier::ProductionReady
        } else if score >= 70.0 {
            RiskTier::NeedsReview
        } else {
            RiskTier::AtRisk
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskTier::ProductionReady => "production ready",
            RiskTier::NeedsReview => "needs review",
            RiskTier::AtRisk => "at risk",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_coerces_defaults() {
        let req = normalize(&RawFields::default());
        assert_eq!(req.vcpu, 1.0);
        assert_eq!(req.memory_gb, 1.0);
        assert_eq!(req.concurrency, Some(80));
        assert_eq!(req.avg_duration_ms, Some(200));
        assert_eq!(req.requests_per_min, Some(600));
        assert_eq!(req.region, "asia-south1");
        assert_eq!(req.min_instances, Some(0));
        assert_eq!(req.max_instances, Some(5));
        assert_eq!(req.idle_utilization_pc, 10.0);
    }

    #[test]
    fn normalize_keeps_invalid_input_as_sentinels() {
        let raw = RawFields {
            vcpu: "two".into(),
            concurrency: "lots".into(),
            region: "  europe-west4 ".into(),
            ..RawFields::default()
        };
        let req = normalize(&raw);
        assert!(req.vcpu.is_nan());
        assert_eq!(req.concurrency, None);
        // Region is passed through untouched apart from trimming.
        assert_eq!(req.region, "europe-west4");
    }

    #[test]
    fn sentinels_serialize_as_null() {
        let raw = RawFields {
            vcpu: "".into(),
            max_instances: "many".into(),
            ..RawFields::default()
        };
        let v = serde_json::to_value(normalize(&raw)).unwrap();
        assert_eq!(v["vcpu"], serde_json::Value::Null);
        assert_eq!(v["max_instances"], serde_json::Value::Null);
        assert_eq!(v["concurrency"], 80);
    }

    #[test]
    fn request_with_sentinels_round_trips() {
        let raw = RawFields {
            memory_gb: "x".into(),
            ..RawFields::default()
        };
        let req = normalize(&raw);
        let blob = serde_json::to_string(&req).unwrap();
        let back: EstimateRequest = serde_json::from_str(&blob).unwrap();
        assert!(back.memory_gb.is_nan());
        assert_eq!(back.vcpu, 1.0);
    }

    #[test]
    fn outcome_parses_both_shapes() {
        let success = r#"{
            "risk_score": 95,
            "per_1k_requests": {"energy_kwh": 0.001, "co2_g": 2, "cost_usd": 0.01},
            "monthly_forecast": {"cost_usd": 4.32, "co2_kg": 0.9, "requests": 1000},
            "suggested_yaml": "region: asia-south1\n",
            "advice": ["ok"]
        }"#;
        match serde_json::from_str::<EstimateOutcome>(success).unwrap() {
            EstimateOutcome::Report(r) => {
                assert_eq!(r.risk_score, 95.0);
                assert_eq!(r.per_1k_requests.cost_usd, 0.01);
                assert_eq!(r.advice, vec!["ok"]);
            }
            other => panic!("expected report, got {other:?}"),
        }

        let failure = r#"{"error": "use POST"}"#;
        assert_eq!(
            serde_json::from_str::<EstimateOutcome>(failure).unwrap(),
            EstimateOutcome::ServiceError {
                error: "use POST".into()
            }
        );
    }

    #[test]
    fn outcome_rejects_neither_shape() {
        assert!(serde_json::from_str::<EstimateOutcome>("{}").is_err());
        assert!(serde_json::from_str::<EstimateOutcome>("<html>busy</html>").is_err());
    }

    #[test]
    fn history_entry_copies_derived_fields() {
        let input = normalize(&RawFields::default());
        let outcome = EstimateOutcome::Report(EstimateResponse {
            risk_score: 72.0,
            per_1k_requests: UnitFootprint {
                cost_usd: 0.0123,
                co2_g: 4.0,
            },
            monthly_forecast: MonthlyForecast {
                cost_usd: 9.5,
                co2_kg: 1.1,
            },
            suggested_yaml: String::new(),
            advice: vec![],
        });
        let entry = HistoryEntry::record_at(1_700_000_000_000, input.clone(), outcome);
        assert_eq!(entry.region, input.region);
        assert_eq!(entry.score, 72.0);
        assert_eq!(entry.cost_per_1k, 0.0123);
    }

    #[test]
    fn history_entry_defaults_derived_fields_on_service_error() {
        let entry = HistoryEntry::record_at(
            1_700_000_000_000,
            normalize(&RawFields::default()),
            EstimateOutcome::ServiceError {
                error: "invalid json".into(),
            },
        );
        assert_eq!(entry.score, 0.0);
        assert_eq!(entry.cost_per_1k, 0.0);
    }

    #[test]
    fn risk_tier_thresholds() {
        assert_eq!(RiskTier::for_score(95.0), RiskTier::ProductionReady);
        assert_eq!(RiskTier::for_score(90.0), RiskTier::ProductionReady);
        assert_eq!(RiskTier::for_score(89.9), RiskTier::NeedsReview);
        assert_eq!(RiskTier::for_score(70.0), RiskTier::NeedsReview);
        assert_eq!(RiskTier::for_score(69.9), RiskTier::AtRisk);
        assert_eq!(RiskTier::for_score(0.0), RiskTier::AtRisk);
    }
}

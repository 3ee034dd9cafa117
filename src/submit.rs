use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{info, warn};

/// One spreadsheet row ready for delivery: the destination tab
/// (discriminator) plus the columns in sheet header order.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    tab: String,
    columns: Vec<(&'static str, String)>,
}

impl SheetRow {
    pub fn new(tab: impl Into<String>, columns: Vec<(&'static str, String)>) -> Self {
        Self {
            tab: tab.into(),
            columns,
        }
    }

    pub fn tab(&self) -> &str {
        &self.tab
    }

    /// Body for the direct JSON transport. The `sheet` key tells the Apps
    /// Script which tab receives the row.
    pub fn json_body(&self) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        body.insert("sheet".to_string(), self.tab.clone().into());
        for (name, value) in &self.columns {
            body.insert((*name).to_string(), value.clone().into());
        }
        serde_json::Value::Object(body)
    }

    /// Pairs for the form-encoded fallback transport. Same fields, same
    /// discriminator as the JSON body.
    pub fn form_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![("sheet", self.tab.as_str())];
        pairs.extend(self.columns.iter().map(|(name, value)| (*name, value.as_str())));
        pairs
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint rejected the record: {0}")]
    Rejected(String),

    #[error("no transport configured")]
    NoTransport,
}

/// A single delivery mechanism for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// POST the row as a JSON body.
    Direct,
    /// POST the row form-encoded, for endpoints that reject a JSON
    /// cross-origin post.
    FormPost,
}

/// Which transports to try, in order. `direct` keeps the form-post
/// fallback behind it; `form-post` is already the conservative transport
/// and has nothing to fall back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStrategy {
    Direct,
    FormPost,
}

impl TransportStrategy {
    pub fn order(self) -> Vec<Transport> {
        match self {
            TransportStrategy::Direct => vec![Transport::Direct, Transport::FormPost],
            TransportStrategy::FormPost => vec![Transport::FormPost],
        }
    }
}

impl FromStr for TransportStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(TransportStrategy::Direct),
            "form-post" => Ok(TransportStrategy::FormPost),
            other => Err(format!(
                "unknown transport '{other}' (expected 'direct' or 'form-post')"
            )),
        }
    }
}

/// Performs one delivery attempt. Seam for tests; production uses
/// [`HttpDelivery`].
#[allow(async_fn_in_trait)]
pub trait Delivery {
    async fn deliver(&self, row: &SheetRow, transport: Transport) -> Result<(), SubmitError>;
}

pub struct HttpDelivery {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpDelivery {
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }
}

impl Delivery for HttpDelivery {
    async fn deliver(&self, row: &SheetRow, transport: Transport) -> Result<(), SubmitError> {
        let request = self.http.post(self.endpoint.clone());

        let response = match transport {
            Transport::Direct => request.json(&row.json_body()).send().await?,
            Transport::FormPost => request.form(&row.form_pairs()).send().await?,
        };

        let response = response.error_for_status()?;
        let body = response.text().await?;
        interpret_body(&body)
    }
}

/// A delivered response counts as success unless the payload explicitly
/// says otherwise. Apps Script endpoints answer
/// `{"result":"success"}` / `{"result":"error","error":"..."}`, but plain
/// text or HTML responses also happen and are not failures.
fn interpret_body(body: &str) -> Result<(), SubmitError> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return Ok(());
    };

    if value.get("result").and_then(|r| r.as_str()) == Some("error") {
        let message = value
            .get("error")
            .or_else(|| value.get("message"))
            .and_then(|m| m.as_str())
            .unwrap_or("endpoint reported an error")
            .to_string();
        return Err(SubmitError::Rejected(message));
    }

    Ok(())
}

/// Delivers validated rows to the spreadsheet endpoint, retrying each
/// transport with a fixed delay and falling through to the next transport
/// after the attempts are exhausted. First success wins; the error
/// reported after total failure is the last attempt's.
pub struct Submitter<D = HttpDelivery> {
    delivery: D,
    transports: Vec<Transport>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl<D: Delivery> Submitter<D> {
    pub fn new(
        delivery: D,
        strategy: TransportStrategy,
        max_attempts: u32,
        retry_delay: Duration,
    ) -> Self {
        Self {
            delivery,
            transports: strategy.order(),
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }

    pub async fn submit(&self, row: &SheetRow) -> Result<String, SubmitError> {
        let mut last_error = SubmitError::NoTransport;

        for &transport in &self.transports {
            for attempt in 1..=self.max_attempts {
                match self.delivery.deliver(row, transport).await {
                    Ok(()) => {
                        info!(tab = row.tab(), ?transport, attempt, "record delivered");
                        return Ok(format!("Record sent to '{}'", row.tab()));
                    }
                    Err(err) => {
                        warn!(
                            tab = row.tab(),
                            ?transport,
                            attempt,
                            error = %err,
                            "delivery attempt failed"
                        );
                        last_error = err;
                        if attempt < self.max_attempts {
                            sleep(self.retry_delay).await;
                        }
                    }
                }
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn sample_row() -> SheetRow {
        SheetRow::new(
            "Leads",
            vec![
                ("nome", "Maria Silva".to_string()),
                ("telefone", "(11) 98765-4321".to_string()),
                ("status", "Novo".to_string()),
            ],
        )
    }

    /// Scripted delivery: pops one outcome per attempt and records which
    /// transport was used.
    struct ScriptedDelivery {
        outcomes: Mutex<Vec<Result<(), String>>>,
        attempts: Mutex<Vec<Transport>>,
    }

    impl ScriptedDelivery {
        fn new(outcomes: Vec<Result<(), String>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes),
                attempts: Mutex::new(Vec::new()),
            }
        }

        fn attempts(&self) -> Vec<Transport> {
            self.attempts.lock().unwrap().clone()
        }
    }

    impl Delivery for &ScriptedDelivery {
        async fn deliver(&self, _row: &SheetRow, transport: Transport) -> Result<(), SubmitError> {
            self.attempts.lock().unwrap().push(transport);
            let mut outcomes = self.outcomes.lock().unwrap();
            if outcomes.is_empty() {
                return Err(SubmitError::Rejected("script exhausted".to_string()));
            }
            outcomes.remove(0).map_err(SubmitError::Rejected)
        }
    }

    fn submitter(delivery: &ScriptedDelivery, strategy: TransportStrategy) -> Submitter<&ScriptedDelivery> {
        Submitter::new(delivery, strategy, 3, Duration::ZERO)
    }

    #[tokio::test]
    async fn first_success_short_circuits() {
        let delivery = ScriptedDelivery::new(vec![Ok(())]);
        let result = submitter(&delivery, TransportStrategy::Direct)
            .submit(&sample_row())
            .await;

        assert!(result.is_ok());
        assert_eq!(delivery.attempts(), vec![Transport::Direct]);
    }

    #[tokio::test]
    async fn retries_up_to_max_then_succeeds() {
        let delivery = ScriptedDelivery::new(vec![
            Err("timeout".to_string()),
            Err("timeout".to_string()),
            Ok(()),
        ]);
        let result = submitter(&delivery, TransportStrategy::Direct)
            .submit(&sample_row())
            .await;

        assert!(result.is_ok());
        assert_eq!(
            delivery.attempts(),
            vec![Transport::Direct, Transport::Direct, Transport::Direct]
        );
    }

    #[tokio::test]
    async fn falls_back_to_form_post_after_direct_exhausts() {
        let delivery = ScriptedDelivery::new(vec![
            Err("blocked".to_string()),
            Err("blocked".to_string()),
            Err("blocked".to_string()),
            Ok(()),
        ]);
        let result = submitter(&delivery, TransportStrategy::Direct)
            .submit(&sample_row())
            .await;

        assert!(result.is_ok());
        assert_eq!(
            delivery.attempts(),
            vec![
                Transport::Direct,
                Transport::Direct,
                Transport::Direct,
                Transport::FormPost,
            ]
        );
    }

    #[tokio::test]
    async fn total_failure_reports_the_last_error() {
        let delivery = ScriptedDelivery::new(vec![
            Err("first".to_string()),
            Err("second".to_string()),
            Err("third".to_string()),
            Err("fourth".to_string()),
            Err("fifth".to_string()),
            Err("last".to_string()),
        ]);
        let err = submitter(&delivery, TransportStrategy::Direct)
            .submit(&sample_row())
            .await
            .unwrap_err();

        // 3 direct attempts + 3 form-post attempts, last message wins.
        assert_eq!(delivery.attempts().len(), 6);
        assert_eq!(err.to_string(), "endpoint rejected the record: last");
    }

    #[tokio::test]
    async fn form_post_strategy_never_tries_direct() {
        let delivery = ScriptedDelivery::new(vec![Ok(())]);
        let result = submitter(&delivery, TransportStrategy::FormPost)
            .submit(&sample_row())
            .await;

        assert!(result.is_ok());
        assert_eq!(delivery.attempts(), vec![Transport::FormPost]);
    }

    #[test]
    fn transports_carry_equivalent_payloads() {
        let row = sample_row();

        let json = row.json_body();
        let json = json.as_object().unwrap();
        let pairs = row.form_pairs();

        assert_eq!(json.len(), pairs.len());
        for (name, value) in &pairs {
            assert_eq!(json[*name].as_str(), Some(*value));
        }
        assert_eq!(json["sheet"].as_str(), Some("Leads"));
        assert_eq!(pairs[0], ("sheet", "Leads"));
    }

    #[test]
    fn non_json_response_is_success() {
        assert!(interpret_body("ok").is_ok());
        assert!(interpret_body("").is_ok());
    }

    #[test]
    fn explicit_success_response_is_success() {
        assert!(interpret_body(r#"{"result":"success","row":42}"#).is_ok());
    }

    #[test]
    fn explicit_error_response_is_rejected_with_its_message() {
        let err = interpret_body(r#"{"result":"error","error":"sheet not found"}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "endpoint rejected the record: sheet not found"
        );
    }

    #[test]
    fn transport_strategy_parses_config_values() {
        assert_eq!(
            "direct".parse::<TransportStrategy>().unwrap().order(),
            vec![Transport::Direct, Transport::FormPost]
        );
        assert_eq!(
            "form-post".parse::<TransportStrategy>().unwrap().order(),
            vec![Transport::FormPost]
        );
        assert!("carrier-pigeon".parse::<TransportStrategy>().is_err());
    }
}

//! # Integration Flows
//!
//! Drives the full router with in-memory adapters in place of the Stacks
//! node and Google Sheets.

pub mod topics;
pub mod webhook;

#[cfg(test)]
pub(crate) mod fixtures {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use chainhook_reporter::adapters::{
        InMemoryRecordSink, StaticLedgerReader, StaticTopicSource,
    };
    use chainhook_reporter::{
        ProposalId, ProposalRecord, ReportGenerator, ReportingConfig, SystemTimeSource,
        TopicsService, WebhookPipeline,
    };
    use reporter_gateway::{build_router, AppState, GatewayConfig};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    pub const SECRET: &str = "hook-key";

    /// Router plus handles on the fakes behind it.
    pub struct Harness {
        pub ledger: Arc<StaticLedgerReader>,
        pub sink: Arc<InMemoryRecordSink>,
        pub router: Router,
    }

    pub struct HarnessBuilder {
        gateway: GatewayConfig,
        reporting: ReportingConfig,
        topics: StaticTopicSource,
        records: Vec<ProposalRecord>,
    }

    impl HarnessBuilder {
        pub fn new() -> Self {
            Self {
                gateway: GatewayConfig::default(),
                reporting: ReportingConfig::default(),
                topics: StaticTopicSource::new(Vec::new()),
                records: Vec::new(),
            }
        }

        pub fn secret(mut self, secret: &str) -> Self {
            self.gateway.webhook_secret = Some(secret.to_string());
            self
        }

        pub fn max_body_bytes(mut self, limit: usize) -> Self {
            self.gateway.max_body_bytes = limit;
            self
        }

        pub fn reporting(mut self, config: ReportingConfig) -> Self {
            self.reporting = config;
            self
        }

        pub fn topics(mut self, source: StaticTopicSource) -> Self {
            self.topics = source;
            self
        }

        pub fn proposals(mut self, ids: &[u64]) -> Self {
            self.records.extend(ids.iter().map(|id| record(*id)));
            self
        }

        pub fn build(self) -> Harness {
            let ledger = Arc::new(StaticLedgerReader::with_records(self.records));
            let sink = Arc::new(InMemoryRecordSink::new());
            let generator = ReportGenerator::new(
                ledger.clone(),
                sink.clone(),
                Arc::new(SystemTimeSource),
                self.reporting,
            );
            let state = AppState::new(
                Arc::new(WebhookPipeline::new(Arc::new(generator))),
                Arc::new(TopicsService::new(Arc::new(self.topics))),
            );
            Harness {
                ledger,
                sink,
                router: build_router(&self.gateway, state),
            }
        }
    }

    pub fn record(id: u64) -> ProposalRecord {
        ProposalRecord {
            proposal_id: ProposalId(id),
            proposer: "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7".to_string(),
            yes_votes: 100 + u128::from(id),
            no_votes: 7,
        }
    }

    /// Bare `{ chainhook: { blocks } }` delivery with one
    /// `PROPOSAL_EXECUTED` print per id.
    pub fn executed_delivery(ids: &[u64]) -> Value {
        let events: Vec<Value> = ids
            .iter()
            .map(|id| {
                json!({
                    "type": "contract_event",
                    "contract_event": {
                        "topic": "print",
                        "value": { "event": "PROPOSAL_EXECUTED", "id": { "value": id } }
                    }
                })
            })
            .collect();
        json!({
            "chainhook": {
                "blocks": [{ "transactions": [{ "events": events }] }]
            }
        })
    }

    /// Same delivery wrapped the way the chainhook service posts it.
    pub fn enveloped_delivery(ids: &[u64]) -> Value {
        json!({ "payload": executed_delivery(ids) })
    }

    pub fn post_chainhook(body: impl Into<Body>, headers: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/chainhook")
            .header("content-type", "application/json");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(body.into()).unwrap()
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    pub async fn send_json(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = send(router, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }
}

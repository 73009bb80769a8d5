//! `POST /chainhook` flows: extraction, reporting, partial failure and the
//! webhook secret.

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use axum::http::StatusCode;
    use chainhook_reporter::{
        LedgerReadError, ProposalId, ReportingConfig, SinkWriteError,
    };
    use reporter_gateway::SECRET_HEADER;
    use serde_json::json;

    // =============================================================================
    // DELIVERIES
    // =============================================================================

    #[tokio::test]
    async fn test_delivery_without_executed_proposals_is_acknowledged() {
        let harness = HarnessBuilder::new().build();

        let delivery = json!({ "chainhook": { "blocks": [] } });
        let (status, body) = send(
            &harness.router,
            post_chainhook(delivery.to_string(), &[]),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"Events processed successfully.");
        assert_eq!(harness.ledger.call_count(), 0);
        assert_eq!(harness.sink.call_count(), 0);
    }

    #[tokio::test]
    async fn test_enveloped_delivery_appends_one_row_per_proposal() {
        let harness = HarnessBuilder::new().proposals(&[4, 9]).build();

        let (status, _) = send(
            &harness.router,
            post_chainhook(enveloped_delivery(&[4, 9]).to_string(), &[]),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let rows = harness.sink.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].proposal_id, ProposalId(4));
        assert_eq!(rows[0].yes_votes, 104);
        assert_eq!(rows[1].proposal_id, ProposalId(9));
        assert_eq!(rows[1].no_votes, 7);
    }

    #[tokio::test]
    async fn test_bare_delivery_is_accepted() {
        let harness = HarnessBuilder::new().proposals(&[1]).build();

        let (status, _) = send(
            &harness.router,
            post_chainhook(executed_delivery(&[1]).to_string(), &[]),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(harness.sink.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_partial_failure_reports_failed_proposals() {
        let harness = HarnessBuilder::new().proposals(&[1, 2, 3]).build();
        harness
            .sink
            .fail_with(ProposalId(2), SinkWriteError::Network("connection reset".into()));

        let (status, body) = send_json(
            &harness.router,
            post_chainhook(executed_delivery(&[1, 2, 3]).to_string(), &[]),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["error"],
            "Internal Server Error during Chainhook processing."
        );
        assert_eq!(body["code"], "PARTIAL_FAILURE");
        assert_eq!(body["status"], "partial_failure");
        assert_eq!(body["summary"]["detected"], 3);
        assert_eq!(body["summary"]["reported"], 2);
        assert_eq!(body["summary"]["failed"], 1);
        assert_eq!(body["failures"][0]["proposal_id"], 2);
        assert_eq!(body["failures"][0]["stage"], "sink_write");
        assert_eq!(body["failures"][0]["transient"], true);

        // The other proposals were still reported.
        let reported: Vec<ProposalId> =
            harness.sink.rows().iter().map(|r| r.proposal_id).collect();
        assert_eq!(reported, vec![ProposalId(1), ProposalId(3)]);
    }

    #[tokio::test]
    async fn test_unknown_proposal_fails_delivery() {
        let harness = HarnessBuilder::new().build();

        let (status, body) = send_json(
            &harness.router,
            post_chainhook(executed_delivery(&[42]).to_string(), &[]),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "REPORTING_FAILED");
        assert_eq!(body["status"], "failed");
        assert_eq!(body["failures"][0]["stage"], "ledger_read");
        assert_eq!(body["failures"][0]["transient"], false);
        assert_eq!(harness.sink.call_count(), 0);
    }

    #[tokio::test]
    async fn test_redelivery_after_ledger_outage_reports_proposal() {
        let harness = HarnessBuilder::new()
            .proposals(&[5])
            .reporting(ReportingConfig {
                dedupe_reported: true,
                ..ReportingConfig::default()
            })
            .build();
        harness
            .ledger
            .fail_with(ProposalId(5), LedgerReadError::Network("node down".into()));

        let delivery = executed_delivery(&[5]).to_string();
        let (status, _) = send(&harness.router, post_chainhook(delivery.clone(), &[])).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(harness.sink.rows().is_empty());

        harness.ledger.recover(ProposalId(5));
        let (status, _) = send(&harness.router, post_chainhook(delivery, &[])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(harness.sink.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_redelivery_is_skipped_when_deduplicating() {
        let harness = HarnessBuilder::new()
            .proposals(&[8])
            .reporting(ReportingConfig {
                dedupe_reported: true,
                ..ReportingConfig::default()
            })
            .build();

        let delivery = executed_delivery(&[8]).to_string();
        for _ in 0..2 {
            let (status, _) = send(&harness.router, post_chainhook(delivery.clone(), &[])).await;
            assert_eq!(status, StatusCode::OK);
        }

        assert_eq!(harness.sink.rows().len(), 1);
        assert_eq!(harness.ledger.call_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_reports_keep_delivery_order() {
        let harness = HarnessBuilder::new()
            .proposals(&[3, 1, 2])
            .reporting(ReportingConfig {
                max_concurrent_reports: 3,
                ..ReportingConfig::default()
            })
            .build();
        harness
            .ledger
            .fail_with(ProposalId(1), LedgerReadError::Decode("bad tuple".into()));

        let (status, body) = send_json(
            &harness.router,
            post_chainhook(executed_delivery(&[3, 1, 2]).to_string(), &[]),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["failures"].as_array().unwrap().len(), 1);
        assert_eq!(body["failures"][0]["proposal_id"], 1);
        assert_eq!(harness.sink.rows().len(), 2);
    }

    #[tokio::test]
    async fn test_non_json_body_is_rejected() {
        let harness = HarnessBuilder::new().build();

        let (status, body) =
            send_json(&harness.router, post_chainhook("not json", &[])).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
        assert_eq!(harness.ledger.call_count(), 0);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let harness = HarnessBuilder::new().max_body_bytes(64).build();

        let (status, _) = send(
            &harness.router,
            post_chainhook(executed_delivery(&[1, 2, 3]).to_string(), &[]),
        )
        .await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(harness.ledger.call_count(), 0);
    }

    // =============================================================================
    // WEBHOOK SECRET
    // =============================================================================

    #[tokio::test]
    async fn test_missing_secret_is_unauthorized() {
        let harness = HarnessBuilder::new().secret(SECRET).proposals(&[1]).build();

        let (status, body) = send_json(
            &harness.router,
            post_chainhook(executed_delivery(&[1]).to_string(), &[]),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");
        assert_eq!(harness.ledger.call_count(), 0);
    }

    #[tokio::test]
    async fn test_wrong_secret_is_unauthorized() {
        let harness = HarnessBuilder::new().secret(SECRET).proposals(&[1]).build();

        let (status, _) = send(
            &harness.router,
            post_chainhook(
                executed_delivery(&[1]).to_string(),
                &[(SECRET_HEADER, "guess")],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(harness.sink.rows().is_empty());
    }

    #[tokio::test]
    async fn test_valid_secret_is_accepted() {
        let harness = HarnessBuilder::new().secret(SECRET).proposals(&[1]).build();

        let (status, _) = send(
            &harness.router,
            post_chainhook(
                executed_delivery(&[1]).to_string(),
                &[(SECRET_HEADER, SECRET)],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let bearer = format!("Bearer {SECRET}");
        let (status, _) = send(
            &harness.router,
            post_chainhook(
                executed_delivery(&[1]).to_string(),
                &[("authorization", bearer.as_str())],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(harness.sink.rows().len(), 2);
    }

    #[tokio::test]
    async fn test_secret_does_not_guard_other_routes() {
        let harness = HarnessBuilder::new().secret(SECRET).build();

        let (status, _) = send(&harness.router, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
    }
}

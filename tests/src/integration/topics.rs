//! `GET /api/voting-topics`, `/health` and `/metrics`.

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use axum::http::StatusCode;
    use chainhook_reporter::adapters::StaticTopicSource;
    use chainhook_reporter::{ProposalId, SinkWriteError, TopicFetchError};
    use serde_json::json;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn header() -> Vec<String> {
        row(&["Title", "Duration (blocks)", "Category", "Description"])
    }

    // =============================================================================
    // VOTING TOPICS
    // =============================================================================

    #[tokio::test]
    async fn test_topics_are_listed_without_header() {
        let harness = HarnessBuilder::new()
            .topics(StaticTopicSource::new(vec![
                header(),
                row(&["Treasury grant", "144", "funding", "Fund the docs team"]),
                row(&["Fee change", "n/a"]),
            ]))
            .build();

        let (status, body) = send_json(&harness.router, get("/api/voting-topics")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "topics": [
                    {
                        "title": "Treasury grant",
                        "durationBlocks": 144,
                        "category": "funding",
                        "description": "Fund the docs team"
                    },
                    { "title": "Fee change", "durationBlocks": null }
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_header_only_sheet_is_not_found() {
        let harness = HarnessBuilder::new()
            .topics(StaticTopicSource::new(vec![header()]))
            .build();

        let (status, body) = send_json(&harness.router, get("/api/voting-topics")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "No active voting topics found.");
    }

    #[tokio::test]
    async fn test_unreachable_sheet_is_server_error() {
        let harness = HarnessBuilder::new()
            .topics(StaticTopicSource::failing(TopicFetchError::Unavailable(
                "HTTP 403".into(),
            )))
            .build();

        let (status, body) = send_json(&harness.router, get("/api/voting-topics")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch topics from Google Sheets.");
    }

    // =============================================================================
    // HEALTH & METRICS
    // =============================================================================

    #[tokio::test]
    async fn test_health() {
        let harness = HarnessBuilder::new().build();

        let (status, body) = send_json(&harness.router, get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], reporter_gateway::VERSION);
    }

    #[tokio::test]
    async fn test_metrics_count_deliveries_and_topics() {
        let harness = HarnessBuilder::new()
            .secret(SECRET)
            .proposals(&[1, 2])
            .topics(StaticTopicSource::new(vec![header()]))
            .build();
        harness
            .sink
            .fail_with(ProposalId(2), SinkWriteError::Auth("token expired".into()));

        let auth = [(reporter_gateway::SECRET_HEADER, SECRET)];
        send(
            &harness.router,
            post_chainhook(executed_delivery(&[1, 2]).to_string(), &auth),
        )
        .await;
        send(&harness.router, post_chainhook("{", &auth)).await;
        send(&harness.router, post_chainhook("{}", &[])).await;
        send(&harness.router, get("/api/voting-topics")).await;

        let (status, body) = send_json(&harness.router, get("/metrics")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deliveries"]["total"], 1);
        assert_eq!(body["deliveries"]["failed"], 1);
        assert_eq!(body["deliveries"]["rejected"], 2);
        assert_eq!(body["proposals"]["detected"], 2);
        assert_eq!(body["proposals"]["reported"], 1);
        assert_eq!(body["proposals"]["sink_write_failures"], 1);
        assert_eq!(body["topics"]["requests"], 1);
        assert_eq!(body["topics"]["errors"], 1);
    }
}

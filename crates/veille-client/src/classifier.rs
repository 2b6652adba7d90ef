//! HTTP client for the external categorization service.

use reqwest::Client;
use serde::Serialize;
use veille_core::error::AppError;
use veille_core::models::Offer;
use veille_core::traits::Classifier;

/// Payload sent to the categorization endpoint.
#[derive(Debug, Serialize)]
struct CategorizeRequest<'a> {
    url: &'a str,
    title: &'a str,
    description: &'a str,
    content: &'a str,
}

/// Classifier backed by an HTTP categorization endpoint.
///
/// POSTs the offer's textual fields and expects a JSON array of category
/// labels in return.
#[derive(Clone)]
pub struct HttpClassifier {
    client: Client,
    endpoint: String,
}

impl HttpClassifier {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::ClassifierError(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl Classifier for HttpClassifier {
    async fn categorize(&self, offer: &Offer) -> Result<Vec<String>, AppError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&CategorizeRequest {
                url: &offer.url,
                title: &offer.title,
                description: &offer.description,
                content: &offer.content,
            })
            .send()
            .await
            .map_err(|e| AppError::ClassifierError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ClassifierError(format!(
                "HTTP {} from {}",
                status.as_u16(),
                self.endpoint
            )));
        }

        let labels = response
            .json::<Vec<String>>()
            .await
            .map_err(|e| AppError::ClassifierError(format!("Invalid response: {e}")))?;

        tracing::debug!(url = %offer.url, count = labels.len(), "Offer categorized");
        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::*;

    fn sample_offer() -> Offer {
        let mut offer = Offer::new(
            "https://jobs.example.com/offers/1",
            "Data Engineer",
            "Pipelines",
            None,
            None,
        );
        offer.content = "Profil BAC+5, CDI.".to_string();
        offer
    }

    #[tokio::test]
    async fn categorize_parses_label_array() {
        let server = MockServer::start();
        let endpoint = server.mock(|when, then| {
            when.method(POST)
                .path("/categorize")
                .json_body_partial(r#"{"title": "Data Engineer"}"#);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!(["informatique", "data"]));
        });

        let classifier = HttpClassifier::new(server.url("/categorize")).unwrap();
        let labels = classifier.categorize(&sample_offer()).await.unwrap();

        endpoint.assert();
        assert_eq!(labels, vec!["informatique", "data"]);
    }

    #[tokio::test]
    async fn server_error_is_a_classifier_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/categorize");
            then.status(503);
        });

        let classifier = HttpClassifier::new(server.url("/categorize")).unwrap();
        let err = classifier.categorize(&sample_offer()).await.unwrap_err();

        assert!(matches!(err, AppError::ClassifierError(_)));
    }
}

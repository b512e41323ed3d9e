//! Order submission: package the draft and send it to the endpoint.

use std::sync::Arc;

use certificate_order_core::{Catalog, OrderPayload, OrderWizard, SubmissionState, WizardError};
use chrono::Utc;
use tokio::sync::Mutex;

use super::webhook::WebhookClient;

/// Run one submission attempt for `wizard`.
///
/// The wizard is locked only to begin and to record the attempt, so a
/// concurrent call observes [`SubmissionState::Submitting`] and returns
/// without contacting the endpoint a second time. Sending and recording run
/// on a spawned task: if the caller is dropped mid-request the outcome is
/// still stored and the draft can be resubmitted.
///
/// Returns the submission state after the call.
///
/// # Errors
///
/// Returns [`WizardError`] if the wizard is not ready to submit (wrong step,
/// incomplete draft, already sent). Endpoint failures are not errors here:
/// they are recorded as [`SubmissionState::Failed`].
pub async fn submit_order(
    wizard: &Arc<Mutex<OrderWizard>>,
    catalog: &Catalog,
    webhook: &WebhookClient,
) -> Result<SubmissionState, WizardError> {
    let payload = {
        let mut guard = wizard.lock().await;
        match guard.begin_submission(catalog, Utc::now())? {
            Some(payload) => payload,
            None => {
                tracing::debug!("submission already in flight, ignoring");
                return Ok(guard.submission().clone());
            }
        }
    };

    let task = tokio::spawn(send_and_record(
        Arc::clone(wizard),
        webhook.clone(),
        payload,
    ));

    match task.await {
        Ok(state) => Ok(state),
        Err(e) => {
            tracing::error!(error = %e, "order submission task failed");
            let mut guard = wizard.lock().await;
            if guard.submission().is_submitting() {
                guard.complete_submission(Err(e.to_string()));
            }
            Ok(guard.submission().clone())
        }
    }
}

async fn send_and_record(
    wizard: Arc<Mutex<OrderWizard>>,
    webhook: WebhookClient,
    payload: OrderPayload,
) -> SubmissionState {
    let outcome = webhook.send_order(&payload).await;

    match &outcome {
        Ok(()) => tracing::info!(
            certificate_size = %payload.certificate_size,
            product_id = %payload.product_id,
            order_date = %payload.order_date,
            "order sent"
        ),
        Err(e) => tracing::warn!(
            certificate_size = %payload.certificate_size,
            product_id = %payload.product_id,
            error = %e,
            "order submission failed"
        ),
    }

    let mut guard = wizard.lock().await;
    guard.complete_submission(outcome.map_err(|e| e.to_string()));
    guard.submission().clone()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use certificate_order_core::{Field, ImageUpload, Step};
    use secrecy::SecretString;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::WebhookConfig;

    fn ready_wizard() -> OrderWizard {
        let mut wizard = OrderWizard::new();
        let ticket = wizard.begin_image_intake();
        wizard.complete_image_intake(
            ticket,
            ImageUpload::encode("photo.png", "image/png", b"png bytes").unwrap(),
        );
        wizard.advance().unwrap();
        wizard.select_size("6x6").unwrap();
        wizard.advance().unwrap();
        for (field, value) in [
            (Field::FirstName, "Grace"),
            (Field::LastName, "Hopper"),
            (Field::Email, "grace@example.com"),
            (Field::Address, "1 Navy Way"),
            (Field::City, "Arlington"),
            (Field::PostalCode, "22201"),
            (Field::Country, "United States"),
        ] {
            wizard.update_field(field, value).unwrap();
        }
        wizard.advance().unwrap();
        assert_eq!(wizard.step(), Step::Review);
        wizard
    }

    fn webhook(url: Option<String>) -> WebhookClient {
        WebhookClient::new(&WebhookConfig {
            url: url.map(SecretString::from),
            timeout: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_successful_submission() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let wizard = Arc::new(Mutex::new(ready_wizard()));
        let state = submit_order(&wizard, &Catalog::default(), &webhook(Some(server.uri())))
            .await
            .unwrap();
        assert_eq!(state, SubmissionState::Succeeded);

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["certificateSize"], "6x6");
        assert_eq!(body["productId"], 4843);
        assert_eq!(body["personalData"]["phone"], "");
        assert!(
            body["image"]["data"]
                .as_str()
                .unwrap()
                .starts_with("data:image/png;base64,")
        );
    }

    #[tokio::test]
    async fn test_missing_endpoint_fails_without_request() {
        let wizard = Arc::new(Mutex::new(ready_wizard()));
        let before = wizard.lock().await.draft().clone();

        let state = submit_order(&wizard, &Catalog::default(), &webhook(None))
            .await
            .unwrap();

        assert!(state.is_failed());
        assert_eq!(wizard.lock().await.draft(), &before);
    }

    #[tokio::test]
    async fn test_server_error_then_retry_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let wizard = Arc::new(Mutex::new(ready_wizard()));
        let client = webhook(Some(server.uri()));
        let catalog = Catalog::default();

        let first = submit_order(&wizard, &catalog, &client).await.unwrap();
        assert!(first.is_failed());

        let second = submit_order(&wizard, &catalog, &client).await.unwrap();
        assert_eq!(second, SubmissionState::Succeeded);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_submit_sends_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
            .expect(1)
            .mount(&server)
            .await;

        let wizard = Arc::new(Mutex::new(ready_wizard()));
        let client = webhook(Some(server.uri()));
        let catalog = Catalog::default();

        let first = submit_order(&wizard, &catalog, &client);
        let second = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            submit_order(&wizard, &catalog, &client).await
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first.unwrap(), SubmissionState::Succeeded);
        assert_eq!(second.unwrap(), SubmissionState::Submitting);
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dropped_caller_still_records_outcome() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
            .expect(1)
            .mount(&server)
            .await;

        let wizard = Arc::new(Mutex::new(ready_wizard()));
        let client = webhook(Some(server.uri()));
        let catalog = Catalog::default();

        let dropped = tokio::time::timeout(
            Duration::from_millis(50),
            submit_order(&wizard, &catalog, &client),
        )
        .await;
        assert!(dropped.is_err());
        assert!(wizard.lock().await.submission().is_submitting());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(
            wizard.lock().await.submission(),
            &SubmissionState::Succeeded
        );
    }

    #[tokio::test]
    async fn test_dropped_caller_failure_allows_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_delay(Duration::from_millis(300)))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let wizard = Arc::new(Mutex::new(ready_wizard()));
        let client = webhook(Some(server.uri()));
        let catalog = Catalog::default();

        let dropped = tokio::time::timeout(
            Duration::from_millis(50),
            submit_order(&wizard, &catalog, &client),
        )
        .await;
        assert!(dropped.is_err());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(wizard.lock().await.submission().is_failed());

        let retry = submit_order(&wizard, &catalog, &client).await.unwrap();
        assert_eq!(retry, SubmissionState::Succeeded);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_submit_outside_review_is_error() {
        let wizard = Arc::new(Mutex::new(OrderWizard::new()));
        let err = submit_order(&wizard, &Catalog::default(), &webhook(None))
            .await
            .unwrap_err();
        assert_eq!(err, WizardError::NotOnReview);
    }
}

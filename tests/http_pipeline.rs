//! Blocking HTTP calls moved onto an I/O runtime and unwrapped.

use std::time::Duration;

use tideline::http::NO_BODY_MESSAGE;
use tideline::prelude::*;
use tideline::schedulers::TestSchedulerProvider;
use tokio::runtime::Handle;

#[derive(Debug, Clone, PartialEq)]
struct Profile {
    id: u64,
    name: String,
}

fn profile_call(status: u16, body: Option<&str>) -> impl FnOnce() -> Result<HttpResponse<String>> {
    let body = body.map(str::to_owned);
    move || Ok(HttpResponse::new(status, body).with_reason("Service Unavailable"))
}

fn parse_profile(body: String) -> Response<Profile> {
    Response::catching(|| {
        let (id, name) = body
            .split_once(':')
            .ok_or_else(|| Error::response(format!("malformed body: {}", body)))?;
        let id = id
            .parse()
            .map_err(|_| Error::response(format!("bad id: {}", id)))?;
        Ok(Some(Profile {
            id,
            name: name.to_string(),
        }))
    })
}

#[tokio::test]
async fn call_runs_on_the_io_handle_and_parses_the_body() {
    let provider = TestSchedulerProvider::new(Handle::current());
    let call = profile_call(200, Some("7:ada"));

    let profile = async move { call.execute_with(parse_profile) }
        .subscribe_on_io(&provider)
        .await
        .unwrap()
        .into_result()
        .unwrap();

    assert_eq!(
        profile,
        Profile {
            id: 7,
            name: "ada".to_string()
        }
    );
}

#[test]
fn malformed_body_is_a_response_error() {
    let response = profile_call(200, Some("ada")).execute_with(parse_profile);

    assert!(response.is_erroneous());
    assert!(!response.has_result());
}

#[tokio::test(start_paused = true)]
async fn server_errors_are_retried_as_http_errors() {
    let mut statuses = vec![200, 503, 503].into_iter();
    let mut attempts = 0;

    let profile = handle_retries(
        || {
            attempts += 1;
            let status = statuses.next_back().unwrap_or(200);
            async move { profile_call(status, Some("1:grace")).execute_with(parse_profile) }
                .result_or_error()
        },
        RetryPolicy::constant(Duration::from_secs(1)).with_max_retries(3),
    )
    .await;

    assert_eq!(profile.unwrap().name, "grace");
    assert_eq!(attempts, 3);
}

#[test]
fn missing_body_is_reported() {
    let response = profile_call(204, None).execute_with(parse_profile);

    match response.error() {
        Some(Error::Response { message: Some(message) }) => assert_eq!(message, NO_BODY_MESSAGE),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(
        response.error().map(ToString::to_string).as_deref(),
        Some("response error: Received no response From the Server.")
    );
}

use axum::body::{self, Body};
use axum::http::{StatusCode, header};
use axum::response::Response;
use serde::de::DeserializeOwned;

/// Reads a whole response body and parses it as JSON. Panics, failing the test,
/// if the body can't be read or doesn't parse into [T].
pub async fn deserialize_body<T: DeserializeOwned>(response_body: Body) -> T {
    let bytes = body::to_bytes(response_body, usize::MAX)
        .await
        .expect("Could not read data from response body!");

    serde_json::from_slice(&bytes).unwrap_or_else(|err| {
        panic!("Response body did not parse: {err}, received body: {bytes:?}")
    })
}

/// Asserts the response is a 303 pointing the browser at [location]
pub fn assert_redirects_to(response: &Response, location: &str) {
    assert_eq!(StatusCode::SEE_OTHER, response.status());

    let redirected_to = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok());
    assert_eq!(Some(location), redirected_to);
}

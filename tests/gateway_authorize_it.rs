mod common;

// crates.io
use httpmock::prelude::*;
// self
use auth_gateway::{gateway::Gateway, token::AccessToken};
use common::*;

#[tokio::test]
async fn stored_token_is_sent_as_bearer_header() {
	let server = MockServer::start_async().await;
	let (gateway, store) = build_test_gateway(&server.base_url());

	seed_token(&store, &gateway.config, "abc").await;

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/profile").header("authorization", "Bearer abc");
			then.status(200).body("{\"name\":\"demo\"}");
		})
		.await;
	let response = gateway
		.clone()
		.into_client()
		.get(server.url("/profile"))
		.send()
		.await
		.expect("Authorized request should succeed.");

	assert_eq!(response.status().as_u16(), 200);

	mock.assert_async().await;
}

#[tokio::test]
async fn missing_token_sends_request_unauthenticated() {
	let server = MockServer::start_async().await;
	let (gateway, _store) = build_test_gateway(&server.base_url());
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/public").header_missing("authorization");
			then.status(200);
		})
		.await;
	let response = gateway
		.clone()
		.into_client()
		.get(server.url("/public"))
		.send()
		.await
		.expect("Unauthenticated request should still be sent.");

	assert_eq!(response.status().as_u16(), 200);
	assert_eq!(gateway.metrics.attempts(), 0);

	mock.assert_async().await;
}

#[tokio::test]
async fn default_content_type_is_attached() {
	let server = MockServer::start_async().await;
	let (gateway, _store) = build_test_gateway(&server.base_url());
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/typed").header("content-type", "application/json");
			then.status(204);
		})
		.await;
	let response = gateway
		.into_client()
		.get(server.url("/typed"))
		.send()
		.await
		.expect("Request with default headers should succeed.");

	assert_eq!(response.status().as_u16(), 204);

	mock.assert_async().await;
}

#[tokio::test]
async fn non_unauthorized_errors_pass_through() {
	let server = MockServer::start_async().await;
	let (gateway, store) = build_test_gateway(&server.base_url());

	seed_token(&store, &gateway.config, "abc").await;

	let forbidden = server
		.mock_async(|when, then| {
			when.method(GET).path("/admin");
			then.status(403);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200).header("authorization", "Bearer: never-used");
		})
		.await;
	let response = gateway
		.clone()
		.into_client()
		.get(server.url("/admin"))
		.send()
		.await
		.expect("Forbidden responses should reach the caller unchanged.");

	assert_eq!(response.status().as_u16(), 403);

	forbidden.assert_async().await;
	refresh.assert_calls_async(0).await;

	assert_eq!(stored_token(&store, &gateway.config).await.as_deref(), Some("abc"));
}

#[tokio::test]
async fn cookie_backed_gateway_sends_token_header_and_cookie() {
	let server = MockServer::start_async().await;
	let gateway = Gateway::with_cookie_store(test_config(&server.base_url()))
		.expect("Cookie-backed gateway should build.");

	gateway
		.store
		.set(&gateway.config.token_cookie, AccessToken::new("cookie-token"), gateway.config.token_ttl)
		.await
		.expect("Writing the token cookie should succeed.");

	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/me")
				.header("authorization", "Bearer cookie-token")
				.header("cookie", "accessToken=cookie-token");
			then.status(200);
		})
		.await;
	let response = gateway
		.into_client()
		.get(server.url("/me"))
		.send()
		.await
		.expect("Cookie-backed request should succeed.");

	assert_eq!(response.status().as_u16(), 200);

	mock.assert_async().await;
}

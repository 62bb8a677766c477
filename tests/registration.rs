//! Driver registration, teardown, and claim lifecycle tests.

use axum::http::StatusCode;
use intercept_proxy::config::ProxyConfig;
use intercept_proxy::driver::{DriverRegistry, InterceptDriver};
use intercept_proxy::exchange::CanonicalResponse;
use intercept_proxy::http::HttpServer;
use intercept_proxy::routing::RouteTable;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

mod common;

use common::{client, start_proxy, start_recording_backend};

fn table() -> RouteTable {
    RouteTable::from_pairs([("api", "http://127.0.0.1:1")]).unwrap()
}

#[test]
fn test_attach_is_exclusive_per_server() {
    let registry = DriverRegistry::new();
    let server = HttpServer::new(ProxyConfig::default());

    let _driver = InterceptDriver::attach(&server, table(), &registry).unwrap();

    let error = InterceptDriver::attach(&server, table(), &registry).unwrap_err();
    assert_eq!(error.instance, server.instance_id());
    assert!(error.to_string().contains("already has a driver attached"));
}

#[test]
fn test_separate_servers_attach_independently() {
    let registry = DriverRegistry::new();
    let first = HttpServer::new(ProxyConfig::default());
    let second = HttpServer::new(ProxyConfig::default());
    assert_ne!(first.instance_id(), second.instance_id());

    let _a = InterceptDriver::attach(&first, table(), &registry).unwrap();
    let _b = InterceptDriver::attach(&second, table(), &registry).unwrap();

    assert!(registry.is_claimed(first.instance_id()));
    assert!(registry.is_claimed(second.instance_id()));
}

#[test]
fn test_separate_registries_do_not_interfere() {
    let server = HttpServer::new(ProxyConfig::default());

    let first_registry = DriverRegistry::new();
    let second_registry = DriverRegistry::new();

    let _a = InterceptDriver::attach(&server, table(), &first_registry).unwrap();
    let _b = InterceptDriver::attach(&server, table(), &second_registry).unwrap();

    assert!(first_registry.is_claimed(server.instance_id()));
    assert!(second_registry.is_claimed(server.instance_id()));
}

#[tokio::test]
async fn test_request_teardown_deactivates_and_releases() {
    let proxy = start_proxy(&[("api", "http://127.0.0.1:1".to_string())]).await;
    let instance = proxy.driver.instance_id();
    assert_eq!(instance, proxy.server.instance_id());
    assert!(proxy.registry.is_claimed(instance));

    let teardown = proxy.driver.on_request_fn(|intercepted| async move {
        intercepted.respond(CanonicalResponse::new(StatusCode::OK, "alive"), "stub");
        Ok(())
    });

    let res = client()
        .get(format!("http://{}/api/ping", proxy.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "alive");

    teardown.run();

    // The served router still points at the torn-down driver, which now
    // refuses interception.
    let res = client()
        .get(format!("http://{}/api/ping", proxy.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.text().await.unwrap(), "driver not active");
    assert!(!proxy.driver.is_active());
    assert!(!proxy.registry.is_claimed(instance));

    // The released instance can take a fresh driver, and running the old
    // teardown again must not disturb the new claim.
    let _fresh = InterceptDriver::attach(&proxy.server, table(), &proxy.registry).unwrap();
    teardown.run();
    assert!(proxy.registry.is_claimed(instance));

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_response_teardown_restores_noop() {
    let proxy = start_proxy(&[("api", "http://127.0.0.1:1".to_string())]).await;

    proxy.driver.on_request_fn(|intercepted| async move {
        intercepted.respond(CanonicalResponse::new(StatusCode::OK, "ok"), "stub");
        Ok(())
    });

    let observed = Arc::new(AtomicU32::new(0));
    let counter = observed.clone();
    let teardown = proxy.driver.on_response_fn(move |_exchange| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    });

    client()
        .get(format!("http://{}/api/one", proxy.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(observed.load(Ordering::SeqCst), 1);

    teardown.run();
    teardown.run(); // idempotent

    // Exchanges still flow, just unobserved.
    let res = client()
        .get(format!("http://{}/api/two", proxy.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(observed.load(Ordering::SeqCst), 1);

    // The driver itself is untouched by a response teardown.
    assert!(proxy.driver.is_active());
    assert!(proxy.registry.is_claimed(proxy.driver.instance_id()));

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_reinstalling_request_observer_replaces_handler() {
    let (backend, recorded) = start_recording_backend(200, "from upstream").await;
    let proxy = start_proxy(&[("api", format!("http://{backend}"))]).await;

    proxy.driver.on_request_fn(|intercepted| async move {
        intercepted.pass_through("passthrough").await;
        Ok(())
    });

    let res = client()
        .get(format!("http://{}/api/first", proxy.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "from upstream");

    proxy.driver.on_request_fn(|intercepted| async move {
        intercepted.respond(CanonicalResponse::new(StatusCode::OK, "stubbed"), "stub");
        Ok(())
    });

    let res = client()
        .get(format!("http://{}/api/second", proxy.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "stubbed");

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.len(), 1, "Only the first request reaches upstream");
    assert_eq!(recorded[0].target, "/first");

    proxy.shutdown.trigger();
}

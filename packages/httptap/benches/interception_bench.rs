// packages/httptap/benches/interception_bench.rs
//! Interception overhead: fixed responses, handlers and unmatched routes
//!
//! The log is cleared after every iteration so memory stays flat.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use httptap::{body, CannedResponse, HyperTransport, Interceptor};
use hyper::{Request, StatusCode};
use std::sync::Arc;

const URL: &str = "http://bench.test/resource";

fn get() -> Request<httptap::TransportBody> {
    Request::get(URL)
        .body(body::empty())
        .expect("static request is valid")
}

fn bench_intercept(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("failed to build runtime");

    let fixed = Interceptor::new(Arc::new(HyperTransport::new()));
    fixed
        .when("GET", URL)
        .respond(StatusCode::OK, "body", "text/plain");

    let handler = Interceptor::new(Arc::new(HyperTransport::new()));
    handler
        .when("GET", URL)
        .respond_with(|req| CannedResponse::new(StatusCode::OK, req.url(), "text/plain"));

    let unmatched = Interceptor::new(Arc::new(HyperTransport::new()));

    let mut group = c.benchmark_group("intercept");

    group.bench_function("fixed", |b| {
        b.iter(|| {
            let response = runtime.block_on(fixed.intercept(black_box(get())));
            fixed.reset();
            response
        })
    });
    group.bench_function("handler", |b| {
        b.iter(|| {
            let response = runtime.block_on(handler.intercept(black_box(get())));
            handler.reset();
            response
        })
    });
    group.bench_function("unmatched", |b| {
        b.iter(|| {
            let response = runtime.block_on(unmatched.intercept(black_box(get())));
            unmatched.reset();
            response
        })
    });

    group.finish();
}

fn bench_request_body(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("failed to build runtime");

    let interceptor = Interceptor::new(Arc::new(HyperTransport::new()));
    let payload = "x".repeat(16 * 1024);
    runtime
        .block_on(
            interceptor.intercept(
                Request::post(URL)
                    .body(body::full(payload))
                    .expect("static request is valid"),
            ),
        )
        .expect("unmatched requests answer 404");

    c.bench_function("request_body_16k", |b| {
        b.iter(|| runtime.block_on(interceptor.request_body(black_box(0))))
    });
}

criterion_group!(benches, bench_intercept, bench_request_body);
criterion_main!(benches);

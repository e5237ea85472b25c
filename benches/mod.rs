use criterion::{criterion_group, criterion_main};


criterion_group!(
    benches,
    network::application::http::client::bench_query_assembly,
    network::application::http::client::bench_get,
    network::application::http::client::bench_get_with_redirect
);
criterion_main!(benches);

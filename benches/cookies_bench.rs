use criterion::{black_box, criterion_group, criterion_main, Criterion};
use statebot::cookies::persistence;
use statebot::cookies::store::CookieStore;
use statebot::History;
use url::Url;

fn benchmark_cookie_insert(c: &mut Criterion) {
    let store = CookieStore::new();
    let url = Url::parse("https://example.com").unwrap();

    c.bench_function("cookie_parse_and_save", |b| {
        b.iter(|| {
            store
                .jar()
                .parse_and_save_cookie(black_box(&url), black_box("foo=bar; Path=/; Secure"));
        })
    });
}

fn benchmark_cookie_get(c: &mut Criterion) {
    let store = CookieStore::new();
    let url = Url::parse("https://www.example.com/foo/bar").unwrap();
    for i in 0..40 {
        store
            .jar()
            .parse_and_save_cookie(&url, &format!("cookie{}=val; Path=/foo", i));
        store
            .jar()
            .parse_and_save_cookie(&url, &format!("shared{}=val; Domain=example.com", i));
    }

    c.bench_function("cookie_get_for_url", |b| {
        b.iter(|| {
            black_box(store.jar().get_cookies_for_url(black_box(&url)));
        })
    });
}

fn benchmark_snapshot(c: &mut Criterion) {
    let store = CookieStore::new();
    let mut history = History::new();
    for host in 0..20 {
        let url = Url::parse(&format!("http://site{}.example.com/", host)).unwrap();
        for i in 0..10 {
            store
                .jar()
                .parse_and_save_cookie(&url, &format!("c{}=v{}; Max-Age=3600", i, i));
        }
        history.add(url.as_str());
    }
    let encoded = persistence::encode_cookies(&store, &history).unwrap();

    c.bench_function("cookie_snapshot_encode", |b| {
        b.iter(|| black_box(persistence::encode_cookies(&store, &history).unwrap()))
    });

    c.bench_function("cookie_snapshot_decode", |b| {
        b.iter(|| {
            let fresh = CookieStore::new();
            let mut fresh_history = History::new();
            black_box(
                persistence::decode_cookies(&fresh, &mut fresh_history, black_box(&encoded))
                    .unwrap(),
            )
        })
    });
}

criterion_group!(
    benches,
    benchmark_cookie_insert,
    benchmark_cookie_get,
    benchmark_snapshot
);
criterion_main!(benches);

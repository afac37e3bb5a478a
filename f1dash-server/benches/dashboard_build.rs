use criterion::{black_box, criterion_group, criterion_main, Criterion};
use f1dash_core::metrics::{animation_frames, AnimationOptions};
use f1dash_core::model::LoadOptions;
use f1dash_core::telemetry::get_fastest_lap_telemetry;
use f1dash_core::{build_dashboard, SessionKey, SessionProvider, SessionType};
use f1dash_providers::DemoProvider;

fn bench_dashboard(c: &mut Criterion) {
    let provider = DemoProvider::new();
    let key = SessionKey::new(2023, "British Grand Prix", SessionType::Qualifying).unwrap();
    let options = AnimationOptions::default();

    let mut group = c.benchmark_group("dashboard");

    group.bench_function("load_demo_session", |b| {
        b.iter(|| {
            provider
                .load_session(black_box(&key), LoadOptions::laps_and_telemetry())
                .unwrap()
        });
    });

    let session = provider
        .load_session(&key, LoadOptions::laps_and_telemetry())
        .unwrap();

    group.bench_function("build_dashboard", |b| {
        b.iter(|| build_dashboard(black_box(&session), "VER", "HAM", &options).unwrap());
    });

    let (_, telemetry) = get_fastest_lap_telemetry(&session, "VER").unwrap();
    group.bench_function("animation_frames", |b| {
        b.iter(|| animation_frames(black_box(&telemetry), &options));
    });

    group.finish();
}

criterion_group!(benches, bench_dashboard);
criterion_main!(benches);

//! Benchmarks for frame composition and export.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use orbit_playback::{
    animation::{FrameSink, MemorySink, SceneLayout, encode_frame},
    playback::{PlaybackSession, TrajectoryStore},
    render::{RenderSurface, SceneBuffer},
    schema::{MarkerPolicy, PlaybackConfig, TrajectoryFile},
};

const SAMPLES: usize = 1400;

fn session(config: &PlaybackConfig) -> PlaybackSession<SceneBuffer> {
    let keys: Vec<&str> = config.bodies.iter().map(|b| b.key.as_str()).collect();
    let data = TrajectoryFile::synthetic(&keys, SAMPLES);
    let store = TrajectoryStore::load(&data).expect("synthetic data loads");
    PlaybackSession::setup(config, store, SceneBuffer::new()).expect("session setup")
}

fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("compositor_apply");
    let config = PlaybackConfig::default();
    let mut session = session(&config);
    let compositor =
        orbit_playback::FrameCompositor::for_store(session.store(), MarkerPolicy::Keep);

    for num in [1, 100, 700, SAMPLES] {
        group.bench_with_input(BenchmarkId::from_parameter(num), &num, |b, &num| {
            b.iter(|| {
                let (store, registry, surface) = session.parts_mut();
                compositor
                    .apply(black_box(num), registry.bodies(), store, surface)
                    .expect("frame in range");
            });
        });
    }

    group.finish();
}

fn bench_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_export");
    let config = PlaybackConfig::default();
    let mut session = session(&config);
    let compositor =
        orbit_playback::FrameCompositor::for_store(session.store(), MarkerPolicy::Keep);

    for num in [100, SAMPLES] {
        {
            let (store, registry, surface) = session.parts_mut();
            compositor
                .apply(num, registry.bodies(), store, surface)
                .expect("frame in range");
        }
        let frame = session.surface().snapshot();
        let layout = SceneLayout::of(&frame, &config.export.artist);
        assert!(layout.matches(&frame));

        group.bench_with_input(BenchmarkId::new("encode", num), &frame, |b, frame| {
            let mut buf = Vec::new();
            b.iter(|| {
                buf.clear();
                encode_frame(black_box(frame), &mut buf);
            });
        });

        group.bench_with_input(BenchmarkId::new("memory_sink", num), &frame, |b, frame| {
            b.iter(|| {
                let mut sink = MemorySink::new();
                sink.write_frame(num, black_box(frame)).expect("memory write");
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_apply, bench_export);
criterion_main!(benches);

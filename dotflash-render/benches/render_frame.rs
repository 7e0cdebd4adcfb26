use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use dotflash_core::{Dot, FrameView, SignalIndicator, SignalPanel, TrialPhase};
use dotflash_render::SkiaRenderer;
use dotflash_timing::HighPrecisionTimer;

const W: u32 = 1920;
const H: u32 = 1080;

fn ring_of_dots() -> Vec<Dot> {
    (0..10)
        .map(|i| {
            let angle = i as f64 * std::f64::consts::TAU / 10.0;
            Dot::new(960.0 + 30.0 * angle.cos(), 540.0 + 30.0 * angle.sin(), 100.0)
        })
        .collect()
}

fn bench_render_frame(c: &mut Criterion) {
    let dots = ring_of_dots();
    let timer = HighPrecisionTimer::new();

    let mut group = c.benchmark_group("render_frame");
    for (name, phase, highlight, signals) in [
        ("pre_flash", TrialPhase::PreFlash, false, SignalPanel::dark()),
        (
            "flashing",
            TrialPhase::Flashing,
            true,
            SignalPanel::with(&[SignalIndicator::Low, SignalIndicator::High]),
        ),
    ] {
        group.bench_function(name, |b| {
            b.iter_batched(
                || {
                    let renderer = SkiaRenderer::new(W, H).expect("renderer");
                    let frame = vec![0u8; (W * H * 4) as usize];
                    (renderer, frame)
                },
                |(mut renderer, mut frame)| {
                    let view = FrameView {
                        dots: &dots,
                        flash_index: 0,
                        highlight,
                        signals,
                        diode_heights: [10, 70, 130],
                        phase,
                    };
                    let stats = renderer
                        .render_frame(&view, &mut frame, &timer)
                        .expect("render");
                    black_box(stats);
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_render_frame);
criterion_main!(benches);

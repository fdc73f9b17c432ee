/*!
 * Scope Benchmarks
 *
 * Push/pop cost by stack depth and the disabled capture fast path
 */

use capture_scope::client::NoopClient;
use capture_scope::{ClientOptions, Event, FlowContext, Guard, Sdk};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_push_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("push_pop");

    for depth in [1usize, 16, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            FlowContext::root().run(|| {
                let sdk = Sdk::new();
                let mut base: Vec<_> = (1..depth).map(|_| sdk.push_scope()).collect();

                b.iter(|| {
                    let mut guard = sdk.push_scope();
                    guard.release().ok();
                });

                while let Some(guard) = base.pop() {
                    drop(guard);
                }
            });
        });
    }

    group.finish();
}

fn bench_capture(c: &mut Criterion) {
    let mut group = c.benchmark_group("capture");

    let disabled = Sdk::new();
    group.bench_function("disabled_lazy", |b| {
        b.iter(|| {
            disabled
                .capture_event_with(|| Event::from(black_box("x".repeat(4096))))
                .ok()
        });
    });

    let enabled = Sdk::new();
    enabled.init_with_client(NoopClient, ClientOptions::default());
    enabled.configure_scope(|s| s.add_tag("bench"));
    group.bench_function("enabled_noop", |b| {
        b.iter(|| enabled.capture_event(Event::from(black_box("x"))).ok());
    });

    group.finish();
}

criterion_group!(benches, bench_push_pop, bench_capture);
criterion_main!(benches);

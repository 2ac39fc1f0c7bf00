//! End-to-end decode-then-validate filter pipeline benchmarks, covering
//! every fixture tier in the same run — these schemas stay small enough
//! in practice that there is no need for a separate on-disk-fixture bench
//! binary.
#![allow(clippy::expect_used)]

use std::sync::OnceLock;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use pbv_bench::{SizeTier, generate_schema, generate_value};
use pbv_core::filter::{EngineViolationBuffer, Filter, FilterSpec, VIOLATION_CAPACITY};
use pbv_core::{Codec, CodecError, Descriptor, Message, MessageValue, NoStreamedFields, Schema, SystemClock, ValidationContext};

struct StubDescriptor;

impl Descriptor for StubDescriptor {
    fn message_name(&self) -> &str {
        "Record"
    }
}

/// A codec stub that hands back a pre-decoded value rather than parsing
/// real wire bytes; this bench measures the filter's dispatch and
/// validation overhead around whatever `Codec` a real deployment plugs in.
struct TableCodec {
    value: MessageValue,
}

impl Codec for TableCodec {
    fn decode(&self, bytes: &[u8], _descriptor: &dyn Descriptor) -> Result<MessageValue, CodecError> {
        if bytes.is_empty() {
            return Err(CodecError::Malformed);
        }
        Ok(self.value.clone())
    }

    fn encode(&self, _value: &MessageValue, _descriptor: &dyn Descriptor) -> Result<Vec<u8>, CodecError> {
        Ok(Vec::new())
    }

    fn descriptor_of(&self, message_type_name: &str) -> Result<Box<dyn Descriptor>, CodecError> {
        if message_type_name == "Record" {
            Ok(Box::new(StubDescriptor))
        } else {
            Err(CodecError::UnknownType)
        }
    }
}

static SMALL_SCHEMA_AND_MESSAGE: OnceLock<(Schema, Message)> = OnceLock::new();
static MEDIUM_SCHEMA_AND_MESSAGE: OnceLock<(Schema, Message)> = OnceLock::new();
static LARGE_SCHEMA_AND_MESSAGE: OnceLock<(Schema, Message)> = OnceLock::new();

fn schema_and_message(tier: SizeTier) -> &'static (Schema, Message) {
    let lock = match tier {
        SizeTier::Small => &SMALL_SCHEMA_AND_MESSAGE,
        SizeTier::Medium => &MEDIUM_SCHEMA_AND_MESSAGE,
        SizeTier::Large => &LARGE_SCHEMA_AND_MESSAGE,
    };
    lock.get_or_init(|| {
            let schema = generate_schema(tier);
            let message = schema.files[0].messages[0].clone();
            (schema, message)
    })
}

/// The shape a real emitted `validate_Record` would have: a bare
/// [`pbv_core::filter::ValidatorFn`] function pointer. Each tier's
/// validator interprets `pbv-codegen`'s IR against a schema cached in a
/// `OnceLock`, since the compiled-Rust-source path is exercised by
/// `pbv-codegen`'s own tests rather than here.
fn validate_small(value: &MessageValue, violations: &mut EngineViolationBuffer) -> bool {
    let (schema, message) = schema_and_message(SizeTier::Small);
    let mut ctx = ValidationContext::new(violations, 256);
    pbv_codegen::validate_message(schema, message, value, &mut ctx, &SystemClock, &NoStreamedFields)
}

fn validate_medium(value: &MessageValue, violations: &mut EngineViolationBuffer) -> bool {
    let (schema, message) = schema_and_message(SizeTier::Medium);
    let mut ctx = ValidationContext::new(violations, 256);
    pbv_codegen::validate_message(schema, message, value, &mut ctx, &SystemClock, &NoStreamedFields)
}

fn validate_large(value: &MessageValue, violations: &mut EngineViolationBuffer) -> bool {
    let (schema, message) = schema_and_message(SizeTier::Large);
    let mut ctx = ValidationContext::new(violations, 256);
    pbv_codegen::validate_message(schema, message, value, &mut ctx, &SystemClock, &NoStreamedFields)
}

fn bench_filter_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter/process");

    let tiers: [(&str, SizeTier, pbv_core::filter::ValidatorFn); 3] =
    [("S", SizeTier::Small, validate_small), ("M", SizeTier::Medium, validate_medium), ("L", SizeTier::Large, validate_large)];

    for (name, tier, validator) in tiers {
        let conforming_codec = TableCodec { value: generate_value(tier, true) };
        let violating_codec = TableCodec { value: generate_value(tier, false) };
        let filter_ok = Filter::new(&conforming_codec, FilterSpec::new("Record", validator));
        let filter_reject = Filter::new(&violating_codec, FilterSpec::new("Record", validator));

        group.throughput(Throughput::Elements(tier.field_count() as u64));

        group.bench_function(BenchmarkId::new("accept", name), |b| {
                b.iter(|| {
                        let mut ctx = ();
                        let _ = filter_ok.process(b"\x01", true, &mut ctx);
                });
        });

        group.bench_function(BenchmarkId::new("reject", name), |b| {
                b.iter(|| {
                        let mut ctx = ();
                        let _ = filter_reject.process(b"\x01", true, &mut ctx);
                });
        });
    }

    group.finish();
}

fn bench_invalid_input_fast_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter/invalid_input");
    let codec = TableCodec { value: generate_value(SizeTier::Small, true) };
    let filter = Filter::new(&codec, FilterSpec::new("Record", validate_small));

    group.bench_function(format!("empty_bytes/capacity_{VIOLATION_CAPACITY}"), |b| {
            b.iter(|| {
                    let mut ctx = ();
                    let _ = filter.process(b"", true, &mut ctx);
            });
    });
    group.finish();
}

criterion_group!(benches, bench_filter_process, bench_invalid_input_fast_path);
criterion_main!(benches);

//! Full-path signal tests: build → decode → rehydrate
//!
//! Exercises the outbound and inbound halves together the way a connection
//! would: an application event becomes a byte envelope, the envelope is
//! generically decoded into a wire record, and the record is rehydrated back
//! into the concrete event type.

use codec::{decode_signal, rehydrate, Rehydrated, SignalEnvelope};
use signet_e2e_tests::{init_tracing, test_context, StatusChanged};
use types::{BusEvent, Signature, Value};

#[test]
fn round_trip_preserves_header_fields_and_arguments() {
    init_tracing();
    let ctx = test_context();

    let envelope = SignalEnvelope::build(
        &ctx,
        Some(":1.23"),
        "/org/test/obj",
        "org.test.Iface",
        "StatusChanged",
        Some(Signature::new("s").unwrap()),
        vec![Value::from("hello")],
    )
    .unwrap();
    let serial = envelope.serial();
    let bytes = envelope.into_bytes().unwrap();

    let record = decode_signal(&bytes).unwrap();
    assert_eq!(record.source.as_deref(), Some(":1.23"));
    assert_eq!(record.path.as_str(), "/org/test/obj");
    assert_eq!(record.interface, "org.test.Iface");
    assert_eq!(record.member, "StatusChanged");
    assert_eq!(record.signature.as_ref().map(Signature::as_str), Some("s"));
    assert_eq!(record.serial, serial);
    assert_eq!(record.raw_args, vec![Value::from("hello")]);

    let Rehydrated::Event(event) = rehydrate(&record, &ctx).unwrap() else {
        panic!("expected a typed event");
    };
    let typed = event.as_any().downcast_ref::<StatusChanged>().unwrap();
    assert_eq!(typed.status, "hello");
    let meta = typed.meta();
    assert_eq!(meta.source.as_deref(), Some(":1.23"));
    assert_eq!(meta.path.as_str(), "/org/test/obj");
    assert_eq!(meta.interface, "org.test.Iface");
    assert_eq!(meta.member, "StatusChanged");
    assert_eq!(meta.serial, serial);
    assert_eq!(meta.wire_bytes, bytes);
    assert_eq!(meta.byte_len(), bytes.len());
}

#[test]
fn round_trip_without_signature_has_empty_body() {
    init_tracing();
    let ctx = test_context();

    let envelope = SignalEnvelope::build(
        &ctx,
        None,
        "/com/example/widget",
        "com.example.Foo.Bar",
        "Moved",
        None,
        vec![],
    )
    .unwrap();
    let body_start = envelope.body_start();
    let bytes = envelope.into_bytes().unwrap();

    assert_eq!(body_start % 8, 0);
    assert_eq!(bytes.len(), body_start, "no body bytes after padding");
    assert_eq!(u32::from_le_bytes(bytes[..4].try_into().unwrap()), 0);

    let record = decode_signal(&bytes).unwrap();
    assert!(record.raw_args.is_empty());
    assert!(matches!(
        rehydrate(&record, &ctx).unwrap(),
        Rehydrated::Event(_)
    ));
}

#[test]
fn round_trip_mixed_argument_types() {
    init_tracing();
    let ctx = test_context();

    // LevelChanged declares (path, variant) first, so any payload type is
    // accepted; the round trip must hand the variant back intact.
    let envelope = SignalEnvelope::build(
        &ctx,
        None,
        "/org/test/obj",
        "org.test.Iface",
        "LevelChanged",
        Some(Signature::new("v").unwrap()),
        vec![Value::Variant(Box::new(Value::U64(40)))],
    )
    .unwrap();
    let bytes = envelope.into_bytes().unwrap();

    let record = decode_signal(&bytes).unwrap();
    let Rehydrated::Event(event) = rehydrate(&record, &ctx).unwrap() else {
        panic!("expected a typed event");
    };
    let typed = event
        .as_any()
        .downcast_ref::<signet_e2e_tests::LevelChanged>()
        .unwrap();
    assert_eq!(typed.variant_index, 0);
    assert_eq!(typed.level, Value::Variant(Box::new(Value::U64(40))));
}

#[test]
fn deferred_build_round_trips_after_finalize() {
    init_tracing();
    let ctx = test_context();

    let mut envelope = SignalEnvelope::build_deferred(
        &ctx,
        Some(":1.8"),
        "/org/test/obj",
        "org.test.Iface",
        "StatusChanged",
        &[types::ArgType::Str],
        vec![Value::from("deferred")],
    )
    .unwrap();

    envelope.finalize(&ctx).unwrap();
    envelope.finalize(&ctx).unwrap();

    let record = decode_signal(&envelope.into_bytes().unwrap()).unwrap();
    assert_eq!(record.signature.as_ref().map(Signature::as_str), Some("s"));
    let Rehydrated::Event(event) = rehydrate(&record, &ctx).unwrap() else {
        panic!("expected a typed event");
    };
    let typed = event.as_any().downcast_ref::<StatusChanged>().unwrap();
    assert_eq!(typed.status, "deferred");
}

#[test]
fn serials_are_strictly_increasing_under_concurrency() {
    init_tracing();
    let ctx = std::sync::Arc::new(test_context());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .build()
        .unwrap();
    let serials = runtime.block_on(async {
        let mut handles = Vec::new();
        for _ in 0..32 {
            let ctx = ctx.clone();
            handles.push(tokio::spawn(async move {
                SignalEnvelope::build(&ctx, None, "/o", "i.F", "M", None, vec![])
                    .unwrap()
                    .serial()
            }));
        }
        let mut serials = Vec::new();
        for handle in handles {
            serials.push(handle.await.unwrap());
        }
        serials
    });

    let mut sorted = serials.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), serials.len(), "serials must be unique");
    assert_eq!(*sorted.first().unwrap(), 1);
    assert_eq!(*sorted.last().unwrap(), serials.len() as u32);
}

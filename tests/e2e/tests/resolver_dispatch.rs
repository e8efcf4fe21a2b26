//! Resolution and dispatch-path behavior across the public surface
//!
//! Covers the fallback search, alias-driven resolution, cache determinism
//! under concurrent first access, constructor declaration-order selection,
//! and the error/no-match split the dispatch layer relies on.

use std::sync::Arc;

use codec::{decode_signal, rehydrate, ProtocolError, Rehydrated, SignalEnvelope};
use signet_e2e_tests::{init_tracing, test_context, test_registry, LevelChanged, Moved};
use types::{Signature, Value};

#[test]
fn nested_type_resolves_through_fallback_search() {
    init_tracing();
    let ctx = test_context();

    // Wire interface "com.example.Foo.Bar" has no direct registration; only
    // the nesting form "com.example.Foo$Bar$Moved" exists.
    let entry = ctx
        .registry()
        .resolve(ctx.aliases(), "com.example.Foo.Bar", "Moved")
        .unwrap();
    assert_eq!(entry.type_name(), "com.example.Foo$Bar$Moved");

    let bytes = SignalEnvelope::build(&ctx, None, "/w", "com.example.Foo.Bar", "Moved", None, vec![])
        .unwrap()
        .into_bytes()
        .unwrap();
    let record = decode_signal(&bytes).unwrap();
    let Rehydrated::Event(event) = rehydrate(&record, &ctx).unwrap() else {
        panic!("expected a typed event");
    };
    assert!(event.as_any().downcast_ref::<Moved>().is_some());
}

#[test]
fn aliases_map_wire_names_to_local_types() {
    init_tracing();
    let ctx = test_context();
    ctx.aliases().alias_interface("org.test.Iface", "org.vendor.RenamedIface");
    ctx.aliases().alias_member("StatusChanged", "Status");

    let entry = ctx
        .registry()
        .resolve(ctx.aliases(), "org.vendor.RenamedIface", "Status")
        .unwrap();
    assert_eq!(entry.type_name(), "org.test.Iface$StatusChanged");
}

#[test]
fn unresolvable_pair_raises_resolution_error() {
    init_tracing();
    let ctx = test_context();
    let err = ctx
        .registry()
        .resolve(ctx.aliases(), "org.nowhere.Iface", "Nothing")
        .unwrap_err();
    assert!(matches!(err, ProtocolError::Resolution { .. }));
}

#[test]
fn repeated_resolution_returns_identical_cached_entry() {
    init_tracing();
    let ctx = test_context();
    let first = ctx
        .registry()
        .resolve(ctx.aliases(), "org.test.Iface", "StatusChanged")
        .unwrap();
    for _ in 0..8 {
        let again = ctx
            .registry()
            .resolve(ctx.aliases(), "org.test.Iface", "StatusChanged")
            .unwrap();
        assert!(Arc::ptr_eq(&first, &again));
    }

    // A second key resolves independently and does not disturb the first.
    let other = ctx
        .registry()
        .resolve(ctx.aliases(), "org.test.Iface", "LevelChanged")
        .unwrap();
    assert_eq!(other.type_name(), "org.test.Iface$LevelChanged");
    let still = ctx
        .registry()
        .resolve(ctx.aliases(), "org.test.Iface", "StatusChanged")
        .unwrap();
    assert!(Arc::ptr_eq(&first, &still));
}

#[test]
fn concurrent_first_resolution_converges_on_one_entry() {
    init_tracing();
    let registry = test_registry();
    let aliases = Arc::new(codec::SignalAliases::default());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(8)
        .build()
        .unwrap();
    let entries = runtime.block_on(async {
        let mut handles = Vec::new();
        for _ in 0..32 {
            let registry = registry.clone();
            let aliases = aliases.clone();
            handles.push(tokio::spawn(async move {
                registry
                    .resolve(&aliases, "com.example.Foo.Bar", "Moved")
                    .unwrap()
            }));
        }
        let mut entries = Vec::new();
        for handle in handles {
            entries.push(handle.await.unwrap());
        }
        entries
    });

    let first = &entries[0];
    for entry in &entries {
        assert!(
            Arc::ptr_eq(first, entry),
            "all concurrent first callers must observe the same cached entry"
        );
    }
}

#[test]
fn first_declared_constructor_wins_for_ambiguous_arguments() {
    init_tracing();
    let ctx = test_context();

    // A u32 payload satisfies both LevelChanged variants (the variant-typed
    // one via assignability); declaration order must pick the first.
    let bytes = SignalEnvelope::build(
        &ctx,
        None,
        "/org/test/obj",
        "org.test.Iface",
        "LevelChanged",
        Some(Signature::new("u").unwrap()),
        vec![Value::U32(3)],
    )
    .unwrap()
    .into_bytes()
    .unwrap();

    let record = decode_signal(&bytes).unwrap();
    let Rehydrated::Event(event) = rehydrate(&record, &ctx).unwrap() else {
        panic!("expected a typed event");
    };
    let typed = event.as_any().downcast_ref::<LevelChanged>().unwrap();
    assert_eq!(typed.variant_index, 0, "first declared constructor must win");
    // The declared Variant parameter wraps the bare u32 during conversion.
    assert_eq!(typed.level, Value::Variant(Box::new(Value::U32(3))));
}

#[test]
fn argument_drift_yields_no_match_without_error() {
    init_tracing();
    let ctx = test_context();

    // StatusChanged locally declares a single string; the wire carries two.
    let bytes = SignalEnvelope::build(
        &ctx,
        None,
        "/org/test/obj",
        "org.test.Iface",
        "StatusChanged",
        Some(Signature::new("ss").unwrap()),
        vec![Value::from("a"), Value::from("b")],
    )
    .unwrap()
    .into_bytes()
    .unwrap();

    let record = decode_signal(&bytes).unwrap();
    assert!(matches!(
        rehydrate(&record, &ctx).unwrap(),
        Rehydrated::NoMatch
    ));

    // Subsequent signals keep flowing after a drop.
    let ok = SignalEnvelope::build(
        &ctx,
        None,
        "/org/test/obj",
        "org.test.Iface",
        "StatusChanged",
        Some(Signature::new("s").unwrap()),
        vec![Value::from("fine")],
    )
    .unwrap()
    .into_bytes()
    .unwrap();
    assert!(matches!(
        rehydrate(&decode_signal(&ok).unwrap(), &ctx).unwrap(),
        Rehydrated::Event(_)
    ));
}

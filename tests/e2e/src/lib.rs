//! Shared fixtures for Signet end-to-end tests
//!
//! Defines a small set of concrete event types the way an application (or
//! generated binding code) would, registers them, and hands out contexts
//! wired to the shared registries.

use std::sync::Arc;

use codec::{BusContext, ConstructorSpec, SignalAliases, SignalTypeRegistry};
use types::{ArgType, BusEvent, EventMeta, ObjectPath, Value};

/// Install a default subscriber once; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_test_writer()
        .try_init();
}

/// `org.test.Iface.StatusChanged`: single string payload.
#[derive(Debug)]
pub struct StatusChanged {
    meta: EventMeta,
    pub status: String,
}

impl StatusChanged {
    fn factory(
        path: ObjectPath,
        mut args: Vec<Value>,
    ) -> Result<Box<dyn BusEvent>, Box<dyn std::error::Error + Send + Sync>> {
        let Some(Value::Str(status)) = args.pop() else {
            return Err("StatusChanged takes exactly one string argument".into());
        };
        Ok(Box::new(Self {
            meta: EventMeta::new(path),
            status,
        }))
    }
}

impl BusEvent for StatusChanged {
    fn meta(&self) -> &EventMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut EventMeta {
        &mut self.meta
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// `org.test.Iface.LevelChanged`: two constructor variants, declaration
/// order significant: the variant-typed one is declared first.
#[derive(Debug)]
pub struct LevelChanged {
    meta: EventMeta,
    pub level: Value,
    /// Which declared constructor produced this instance.
    pub variant_index: usize,
}

impl LevelChanged {
    fn factory_any(
        path: ObjectPath,
        mut args: Vec<Value>,
    ) -> Result<Box<dyn BusEvent>, Box<dyn std::error::Error + Send + Sync>> {
        let Some(level) = args.pop() else {
            return Err("LevelChanged takes exactly one argument".into());
        };
        Ok(Box::new(Self {
            meta: EventMeta::new(path),
            level,
            variant_index: 0,
        }))
    }

    fn factory_u32(
        path: ObjectPath,
        mut args: Vec<Value>,
    ) -> Result<Box<dyn BusEvent>, Box<dyn std::error::Error + Send + Sync>> {
        let Some(level @ Value::U32(_)) = args.pop() else {
            return Err("LevelChanged takes exactly one u32 argument".into());
        };
        Ok(Box::new(Self {
            meta: EventMeta::new(path),
            level,
            variant_index: 1,
        }))
    }
}

impl BusEvent for LevelChanged {
    fn meta(&self) -> &EventMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut EventMeta {
        &mut self.meta
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// `com.example.Foo.Bar.Moved`: declared nested two levels deep, so it is
/// only reachable through the trailing-separator fallback search.
#[derive(Debug)]
pub struct Moved {
    meta: EventMeta,
}

impl Moved {
    fn factory(
        path: ObjectPath,
        _args: Vec<Value>,
    ) -> Result<Box<dyn BusEvent>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Box::new(Self {
            meta: EventMeta::new(path),
        }))
    }
}

impl BusEvent for Moved {
    fn meta(&self) -> &EventMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut EventMeta {
        &mut self.meta
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Registry populated with every fixture type.
pub fn test_registry() -> Arc<SignalTypeRegistry> {
    let registry = SignalTypeRegistry::default();
    registry
        .register(
            "org.test.Iface$StatusChanged",
            vec![ConstructorSpec {
                params: vec![ArgType::Path, ArgType::Str],
                factory: StatusChanged::factory,
            }],
        )
        .unwrap();
    registry
        .register(
            "org.test.Iface$LevelChanged",
            vec![
                ConstructorSpec {
                    params: vec![ArgType::Path, ArgType::Variant],
                    factory: LevelChanged::factory_any,
                },
                ConstructorSpec {
                    params: vec![ArgType::Path, ArgType::U32],
                    factory: LevelChanged::factory_u32,
                },
            ],
        )
        .unwrap();
    registry
        .register(
            "com.example.Foo$Bar$Moved",
            vec![ConstructorSpec {
                params: vec![ArgType::Path],
                factory: Moved::factory,
            }],
        )
        .unwrap();
    Arc::new(registry)
}

/// A fresh connection context over shared fixture registries.
pub fn test_context() -> BusContext {
    BusContext::with_registries(Arc::new(SignalAliases::default()), test_registry())
}

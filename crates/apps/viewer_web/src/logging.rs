use std::sync::Once;

static INIT: Once = Once::new();

/// Routes `tracing` events to the browser console. Safe to call on every
/// mount; only the first call installs the subscriber.
pub fn init(level: tracing::Level) {
    INIT.call_once(|| {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default_with_config(
            tracing_wasm::WASMLayerConfigBuilder::new()
                .set_max_level(level)
                .build(),
        );
    });
}

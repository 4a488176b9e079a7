#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    if let Ok(cfg) = cruise_config::load_toml(data) {
        if cfg.validate().is_ok() {
            // a valid config always maps onto a full store
            let table = cruise_core::ParamTable::from(&cfg);
            assert_eq!(table.len(), cruise_core::params::PARAM_SPECS.len());
        }
    }
});

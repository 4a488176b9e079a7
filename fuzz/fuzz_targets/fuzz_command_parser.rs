#![no_main]
use libfuzzer_sys::fuzz_target;

use cruise_core::NavCommand;

fuzz_target!(|data: &str| {
    // Any text either parses or yields a typed error
    let _ = data.parse::<NavCommand>();
    if let Some((op, arg)) = data.split_once(' ') {
        let _ = NavCommand::parse_lossy(op, arg);
    }
});

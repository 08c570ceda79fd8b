#![no_main]

use libfuzzer_sys::fuzz_target;
use modlib::config::{ConfigFormat, ConfigReader};

fuzz_target!(|data: &[u8]| {
    let _ = ConfigReader::new(ConfigFormat::Simple).parse(data);
    let _ = ConfigReader::new(ConfigFormat::Indexed).parse(data);
});

#![no_main]

use libfuzzer_sys::fuzz_target;
use modlib::library::{LibraryHeader, ModuleIdIndex, ModuleIdQuery, VersionPolicy};

fuzz_target!(|data: &[u8]| {
    let _ = LibraryHeader::parse(data);

    if let Ok(index) = ModuleIdIndex::parse(data) {
        for entry in index.entries() {
            let Ok(query) = ModuleIdQuery::parse(&entry.id) else {
                continue;
            };
            let _ = index.resolve(&query, VersionPolicy::Newest);
            let _ = index.resolve(&query, VersionPolicy::LastMatch);
        }
    }
});

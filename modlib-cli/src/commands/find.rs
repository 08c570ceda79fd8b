use std::path::Path;

use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::{context_by_name, load_resolver},
    output::{field, print_output},
};

#[derive(Debug, Serialize)]
pub struct FoundClass {
    pub class: String,
    pub module: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

pub fn run(
    library: &Path,
    class: &str,
    query: Option<&str>,
    context: Option<&str>,
    opts: &GlobalOptions,
) -> anyhow::Result<()> {
    let (resolver, base) = load_resolver(library, query, &[], opts)?;
    let start = match context {
        Some(name) => context_by_name(&resolver, name)?,
        None => base,
    };

    let (module, size) = resolver.find_local_class(Some(start), class)?;
    let info = resolver.module_info(module)?;
    let found = FoundClass {
        class: class.to_string(),
        module: info.name,
        version: info.version,
        size,
        source: info.source.map(|p| p.display().to_string()),
    };

    print_output(&found, opts, |f| {
        field("Class", &f.class);
        match &f.version {
            Some(version) => field("Module", format!("{}@{}", f.module, version)),
            None => field("Module", &f.module),
        }
        field("Size", f.size);
        if let Some(source) = &f.source {
            field("Container", source);
        }
    })
}

use std::path::Path;

use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::resolve_config,
    output::{field, print_output},
};

#[derive(Debug, Serialize)]
pub struct Resolution {
    pub query: String,
    pub classpath_mode: bool,
    pub module_dir: String,
    pub config: String,
}

pub fn run(library: &Path, query: Option<&str>, opts: &GlobalOptions) -> anyhow::Result<()> {
    let (resolved, config) = resolve_config(library, query, opts)?;
    let module_dir = config
        .parent()
        .map_or_else(String::new, |dir| dir.display().to_string());

    let resolution = Resolution {
        query: resolved,
        classpath_mode: query.is_none(),
        module_dir,
        config: config.display().to_string(),
    };

    print_output(&resolution, opts, |r| {
        field("Query", &r.query);
        if r.classpath_mode {
            field("Mode", "classpath");
        }
        field("Module dir", &r.module_dir);
        field("Config", &r.config);
    })
}

use std::path::Path;

use modlib::{ContextHandle, Resolver};
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::load_resolver,
    output::{field, print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
pub struct ModuleRow {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContextRow {
    pub name: String,
    pub base: bool,
    pub bootstrap: bool,
    pub modules: Vec<ModuleRow>,
}

#[derive(Debug, Serialize)]
pub struct ContextsOutput {
    pub config: String,
    pub classpath_mode: bool,
    pub contexts: Vec<ContextRow>,
}

fn collect(resolver: &Resolver, base: ContextHandle) -> anyhow::Result<ContextsOutput> {
    let config = resolver
        .configuration()
        .ok_or(modlib::Error::ContextsNotLoaded)?;

    let mut contexts = Vec::new();
    for (handle, context) in config.contexts() {
        let mut modules = Vec::with_capacity(context.modules().len());
        for &module in context.modules() {
            let entry = config.module(module)?;
            modules.push(ModuleRow {
                name: entry.name().to_string(),
                version: entry.version().map(ToString::to_string),
                library: entry.library_path().map(|p| p.display().to_string()),
            });
        }
        contexts.push(ContextRow {
            name: context.name().to_string(),
            base: handle == base,
            bootstrap: context.is_bootstrap(),
            modules,
        });
    }

    Ok(ContextsOutput {
        config: config.config_path().display().to_string(),
        classpath_mode: config.is_classpath_mode(),
        contexts,
    })
}

pub fn run(
    library: &Path,
    query: Option<&str>,
    excluded: &[String],
    opts: &GlobalOptions,
) -> anyhow::Result<()> {
    let (resolver, base) = load_resolver(library, query, excluded, opts)?;
    let output = collect(&resolver, base)?;

    print_output(&output, opts, |out| {
        field("Config", &out.config);
        field("Mode", if out.classpath_mode { "classpath" } else { "module" });
        field("Contexts", out.contexts.len());

        for context in &out.contexts {
            let mut tags = Vec::new();
            if context.base {
                tags.push("base");
            }
            if context.bootstrap {
                tags.push("bootstrap");
            }
            println!();
            if tags.is_empty() {
                println!("{}", context.name);
            } else {
                println!("{} [{}]", context.name, tags.join(", "));
            }

            let mut table = TabWriter::new(&[
                ("Module", Align::Left),
                ("Version", Align::Left),
                ("Library", Align::Left),
            ])
            .indent("  ");
            for module in &context.modules {
                table.row(vec![
                    module.name.clone(),
                    module.version.clone().unwrap_or_else(|| "-".to_string()),
                    module.library.clone().unwrap_or_default(),
                ]);
            }
            table.print();
        }
    })
}

use std::path::Path;

use anyhow::Context;
use modlib::{
    format::MODULE_IDS_FILE,
    library::{LibraryFlags, ModuleIdIndex, ModuleLibrary},
};
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    output::{field, print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
pub struct LibraryInfo {
    pub root: String,
    pub flags: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub natlibs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub natcmds: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configs: Option<String>,
    pub module_ids: usize,
    pub aliases: usize,
}

#[derive(Debug, Serialize)]
pub struct ChainInfo {
    pub libraries: Vec<LibraryInfo>,
}

fn format_flags(flags: LibraryFlags) -> String {
    if flags.is_empty() {
        return "none".to_string();
    }
    flags
        .iter_names()
        .map(|(name, _)| name.to_lowercase())
        .collect::<Vec<_>>()
        .join("|")
}

fn display_path(path: Option<&Path>) -> Option<String> {
    path.map(|p| p.display().to_string())
}

fn describe(library: &ModuleLibrary) -> anyhow::Result<LibraryInfo> {
    let mids_path = library.root().join(MODULE_IDS_FILE);
    let mids = ModuleIdIndex::read(&mids_path)
        .with_context(|| format!("failed to read {}", mids_path.display()))?;
    let header = library.header();

    Ok(LibraryInfo {
        root: library.root().display().to_string(),
        flags: format_flags(header.flags),
        parent: display_path(header.parent.as_deref()),
        natlibs: display_path(header.natlibs.as_deref()),
        natcmds: display_path(header.natcmds.as_deref()),
        configs: display_path(header.configs.as_deref()),
        module_ids: mids.len(),
        aliases: mids.entries().iter().filter(|e| e.is_alias()).count(),
    })
}

pub fn run(path: &Path, opts: &GlobalOptions) -> anyhow::Result<()> {
    let chain = ModuleLibrary::open(path)
        .with_context(|| format!("failed to open library: {}", path.display()))?;

    let info = ChainInfo {
        libraries: chain.chain().map(describe).collect::<anyhow::Result<_>>()?,
    };

    print_output(&info, opts, |info| {
        for (depth, library) in info.libraries.iter().enumerate() {
            if depth > 0 {
                println!();
            }
            field("Library", &library.root);
            field("Depth", depth);
            field("Flags", &library.flags);
            if let Some(parent) = &library.parent {
                field("Parent", parent);
            }
            for (label, value) in [
                ("Native libs", &library.natlibs),
                ("Native cmds", &library.natcmds),
                ("Configs", &library.configs),
            ] {
                if let Some(value) = value {
                    field(label, value);
                }
            }

            let mut table =
                TabWriter::new(&[("Module ids", Align::Right), ("Aliases", Align::Right)])
                    .indent("  ");
            table.row(vec![
                library.module_ids.to_string(),
                library.aliases.to_string(),
            ]);
            table.print();
        }
    })
}

use std::{fs, path::Path};

use anyhow::Context;

use crate::{app::GlobalOptions, commands::common::load_resolver};

pub fn run(
    library: &Path,
    class: &str,
    query: Option<&str>,
    output: &Path,
    opts: &GlobalOptions,
) -> anyhow::Result<()> {
    let (resolver, base) = load_resolver(library, query, &[], opts)?;
    let (module, size) = resolver.find_local_class(Some(base), class)?;

    let len = usize::try_from(size).context("class file does not fit in memory")?;
    let mut buf = vec![0u8; len];
    resolver.read_local_class(module, class, &mut buf)?;

    fs::write(output, &buf)
        .with_context(|| format!("failed to write {}", output.display()))?;
    if opts.json {
        let summary = serde_json::json!({
            "class": class,
            "size": buf.len(),
            "output": output.display().to_string(),
        });
        println!("{summary}");
    } else {
        println!("{} bytes written to {}", buf.len(), output.display());
    }
    Ok(())
}

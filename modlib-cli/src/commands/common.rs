use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use modlib::{
    format::{BASE_MODULE, CLASSPATH_MODULE},
    library::{ModuleIdQuery, ModuleLibrary},
    ContextHandle, Resolver, ResolverSettings,
};

use crate::app::GlobalOptions;

/// Environment settings with the command line overrides applied.
pub fn settings(opts: &GlobalOptions) -> anyhow::Result<ResolverSettings> {
    let mut settings = ResolverSettings::from_env();
    if let Some(format) = &opts.format {
        settings.config_format = format
            .parse()
            .with_context(|| format!("unknown configuration format: {format}"))?;
    }
    if let Some(policy) = &opts.policy {
        settings.version_policy = policy
            .parse()
            .with_context(|| format!("unknown version policy: {policy}"))?;
    }
    Ok(settings)
}

/// Load the contexts for `query` (classpath mode without one) from `library`.
pub fn load_resolver(
    library: &Path,
    query: Option<&str>,
    excluded: &[String],
    opts: &GlobalOptions,
) -> anyhow::Result<(Resolver, ContextHandle)> {
    let excluded: Vec<&str> = excluded.iter().map(String::as_str).collect();
    let mut resolver = Resolver::with_settings(settings(opts)?);
    let base = resolver
        .load_contexts(library, None, query, &excluded)
        .with_context(|| {
            format!(
                "failed to load contexts for {} from {}",
                query.unwrap_or("<classpath>"),
                library.display()
            )
        })?;
    Ok((resolver, base))
}

/// Resolve `query` to its declaring module directory and configuration file.
///
/// Without a query the classpath module is resolved, falling back to the base module.
pub fn resolve_config(
    library: &Path,
    query: Option<&str>,
    opts: &GlobalOptions,
) -> anyhow::Result<(String, PathBuf)> {
    let policy = settings(opts)?.version_policy;
    let chain = ModuleLibrary::open(library)
        .with_context(|| format!("failed to open library: {}", library.display()))?;

    let candidates = match query {
        Some(query) => vec![query],
        None => vec![CLASSPATH_MODULE, BASE_MODULE],
    };
    for candidate in candidates {
        let parsed = ModuleIdQuery::parse(candidate)?;
        match chain.find_config(&parsed, policy) {
            Ok(path) => return Ok((candidate.to_string(), path)),
            Err(modlib::Error::ModuleNotFound(_)) if query.is_none() => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(anyhow!("neither {CLASSPATH_MODULE} nor {BASE_MODULE} is declared"))
}

/// Find a context of the loaded configuration by name.
pub fn context_by_name(resolver: &Resolver, name: &str) -> anyhow::Result<ContextHandle> {
    resolver
        .contexts()?
        .find(|(_, context)| context.name() == name)
        .map(|(handle, _)| handle)
        .ok_or_else(|| anyhow!("no context named {name}"))
}

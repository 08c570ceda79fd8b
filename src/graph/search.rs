use crate::{
    container::{ContainerBackend, EntryInfo},
    format::{CLASSPATH_MODULE, CLASS_SUFFIX},
    graph::{Configuration, ContextHandle, ModuleHandle},
    Error, Result,
};

/// Map a class name to its container entry name.
///
/// The name is used as supplied, in dot or slash form, with `.class` appended.
///
/// # Errors
/// Returns [`crate::Error::InvalidClassName`] for an empty name and
/// [`crate::Error::ClassNameTooLong`] for a name of `max_len` bytes or more.
pub fn class_entry_name(class_name: &str, max_len: usize) -> Result<String> {
    if class_name.is_empty() {
        return Err(Error::InvalidClassName(class_name.to_string()));
    }
    if class_name.len() >= max_len {
        return Err(Error::ClassNameTooLong {
            len: class_name.len(),
            max: max_len,
        });
    }

    let mut entry = String::with_capacity(class_name.len() + CLASS_SUFFIX.len());
    entry.push_str(class_name);
    entry.push_str(CLASS_SUFFIX);
    Ok(entry)
}

impl Configuration {
    /// Modules of `context` in the order they are searched.
    ///
    /// In the base context the base module comes first and is not visited again at its
    /// declared position. `jdk.classpath` is left out.
    pub fn search_order(
        &self,
        context: ContextHandle,
    ) -> Result<impl Iterator<Item = ModuleHandle> + '_> {
        let cx = self.context(context)?;
        let first = (context.index == self.base_context).then(|| self.base_module());

        let rest = cx
            .modules()
            .iter()
            .copied()
            .filter(move |&handle| Some(handle) != first);

        Ok(first
            .into_iter()
            .chain(rest)
            .filter(move |&handle| self.modules[handle.index].name() != CLASSPATH_MODULE))
    }

    /// Search one context for a container entry.
    ///
    /// Absence in a module moves on to the next one. A container that fails to open counts as
    /// absence and its error is pushed to `failures`. Any other error ends the search of this
    /// context.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidContext`] for a stale handle, or the first container
    /// error other than an open failure.
    pub fn find_class(
        &self,
        context: ContextHandle,
        entry: &str,
        backend: &dyn ContainerBackend,
        failures: &mut Vec<Error>,
    ) -> Result<Option<(ModuleHandle, EntryInfo)>> {
        for handle in self.search_order(context)? {
            let module = &self.modules[handle.index];
            let path = self.container_path(module);

            match module.container().find(&path, backend, entry) {
                Ok(Some(info)) => return Ok(Some((handle, info))),
                Ok(None) => {}
                Err(e @ Error::ContainerOpen { .. }) => {
                    log::trace!("{}", e);
                    failures.push(e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(None)
    }

    /// Find the module supplying `class_name`, starting from `context` (the base context if
    /// `None`).
    ///
    /// If the class is not in that context and the configuration is in classpath mode, every
    /// other bootstrap-eligible context is searched in declaration order, skipping the base
    /// context. The first hit wins.
    ///
    /// # Errors
    /// Returns [`crate::Error::ClassNotFound`] if no searched module has the class, or
    /// [`crate::Error::SearchFailed`] if it was not found and container failures occurred.
    pub fn find_local_class(
        &self,
        context: Option<ContextHandle>,
        class_name: &str,
        backend: &dyn ContainerBackend,
        max_len: usize,
    ) -> Result<(ModuleHandle, EntryInfo)> {
        let start = context.unwrap_or_else(|| self.base_context());
        self.context(start)?;
        let entry = class_entry_name(class_name, max_len)?;

        let mut failures = Vec::new();
        let mut found = self.search_context(start, &entry, backend, &mut failures);

        if found.is_none() && self.classpath_mode {
            let base = self.base_context();
            for (handle, cx) in self.contexts() {
                if handle == start || handle == base || !cx.is_bootstrap() {
                    continue;
                }
                found = self.search_context(handle, &entry, backend, &mut failures);
                if found.is_some() {
                    break;
                }
            }
        }

        match found {
            Some(hit) => {
                for failure in &failures {
                    log::debug!("ignored while finding {}: {}", class_name, failure);
                }
                Ok(hit)
            }
            None if failures.is_empty() => Err(Error::ClassNotFound(class_name.to_string())),
            None => Err(Error::SearchFailed {
                class: class_name.to_string(),
                failures,
            }),
        }
    }

    /// Read the class file of `class_name` from `module` into `buf`.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidModule`] for a stale handle,
    /// [`crate::Error::ClassNotFound`] if the module lacks the class,
    /// [`crate::Error::BufferTooShort`] if `buf` is smaller than the class file, and the
    /// container's open or read error otherwise.
    pub fn read_local_class(
        &self,
        module: ModuleHandle,
        class_name: &str,
        buf: &mut [u8],
        backend: &dyn ContainerBackend,
        max_len: usize,
    ) -> Result<EntryInfo> {
        let entry = self.module(module)?;
        let name = class_entry_name(class_name, max_len)?;
        let path = self.container_path(entry);

        match entry.container().read(&path, backend, &name, buf)? {
            Some(info) => Ok(info),
            None => Err(Error::ClassNotFound(class_name.to_string())),
        }
    }

    /// Search one context, recording an aborted search as a failure.
    fn search_context(
        &self,
        context: ContextHandle,
        entry: &str,
        backend: &dyn ContainerBackend,
        failures: &mut Vec<Error>,
    ) -> Option<(ModuleHandle, EntryInfo)> {
        match self.find_class(context, entry, backend, failures) {
            Ok(found) => found,
            Err(e) => {
                log::debug!("search of context {} aborted: {}", context, e);
                failures.push(e);
                None
            }
        }
    }
}

// Generation pipeline
// Loader -> visibility -> emitter -> printer, then both outputs are persisted
// together or not at all.

use crate::config::GeneratorConfig;
use crate::emit::{CppPrinter, Emitter, Module, Printer};
use crate::error::{Result, ScanError};
use crate::loader::Loader;
use crate::model::Protocol;
use crate::visibility::VisibilityMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Declaration and definition texts for one protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub declarations: String,
    pub definitions: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub interfaces: usize,
    pub emitted: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Driver {
    config: GeneratorConfig,
}

impl Driver {
    pub fn new(config: GeneratorConfig) -> Self {
        Driver { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn load(&self, input: impl AsRef<Path>) -> Result<Protocol> {
        Loader::from_config(&self.config).load_file(input)
    }

    /// Lower every interface that is not hand-maintained
    pub fn module(&self, protocol: &Protocol) -> Module {
        let visibility = VisibilityMap::resolve(protocol);
        let emitter = Emitter::new(&visibility, &self.config.namespace_prefix);

        let classes = protocol
            .interfaces()
            .filter(|interface| {
                let skip = self.config.is_hand_maintained(&interface.name);
                if skip {
                    debug!(interface = %interface.name, "Skipping hand-maintained interface");
                }
                !skip
            })
            .map(|interface| emitter.lower(interface))
            .collect();

        Module::new(classes)
    }

    pub fn render(&self, protocol: &Protocol) -> Result<Rendered> {
        self.render_with(protocol, &CppPrinter::new(self.config.output.clone()))
    }

    pub fn render_with(&self, protocol: &Protocol, printer: &dyn Printer) -> Result<Rendered> {
        let module = self.module(protocol);
        let declarations = printer
            .declarations(&module)
            .map_err(|_| ScanError::Render {
                output: "declarations",
            })?;
        let definitions = printer
            .definitions(&module)
            .map_err(|_| ScanError::Render {
                output: "definitions",
            })?;
        Ok(Rendered {
            declarations,
            definitions,
        })
    }

    /// Load `input` and write the declaration and definition files.
    ///
    /// Both outputs are staged next to their destinations and only renamed
    /// into place once both are fully written. If the definitions rename
    /// fails after the declarations were committed, the previous declarations
    /// file is restored (or the new one removed when there was none).
    pub fn run(
        &self,
        input: impl AsRef<Path>,
        declarations: impl AsRef<Path>,
        definitions: impl AsRef<Path>,
    ) -> Result<RunSummary> {
        let protocol = self.load(input)?;
        let rendered = self.render(&protocol)?;
        let (declarations, definitions) = (declarations.as_ref(), definitions.as_ref());

        let staged_declarations = stage(declarations, rendered.declarations.as_bytes())?;
        let staged_definitions = stage(definitions, rendered.definitions.as_bytes())?;
        let previous = backup(declarations)?;

        commit(staged_declarations, declarations)?;
        if let Err(err) = commit(staged_definitions, definitions) {
            rollback(previous, declarations);
            return Err(err);
        }

        let skipped = protocol
            .interfaces()
            .filter(|interface| self.config.is_hand_maintained(&interface.name))
            .count();
        let summary = RunSummary {
            interfaces: protocol.len(),
            emitted: protocol.len() - skipped,
            skipped,
        };
        info!(
            emitted = summary.emitted,
            skipped = summary.skipped,
            "Wrote {} and {}",
            declarations.display(),
            definitions.display()
        );
        Ok(summary)
    }
}

fn write_error(path: &Path) -> impl FnOnce(std::io::Error) -> ScanError + '_ {
    move |source| ScanError::Write {
        path: path.to_path_buf(),
        source,
    }
}

fn staging_dir(destination: &Path) -> PathBuf {
    match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Write `contents` into a temporary file beside `destination`
fn stage(destination: &Path, contents: &[u8]) -> Result<NamedTempFile> {
    let mut file =
        NamedTempFile::new_in(staging_dir(destination)).map_err(write_error(destination))?;
    file.write_all(contents)
        .map_err(write_error(destination))?;
    file.as_file()
        .sync_all()
        .map_err(write_error(destination))?;
    debug!(
        "Staged {} bytes for {}",
        contents.len(),
        destination.display()
    );
    Ok(file)
}

fn commit(staged: NamedTempFile, destination: &Path) -> Result<()> {
    staged
        .persist(destination)
        .map_err(|err| write_error(destination)(err.error))?;
    Ok(())
}

/// Copy of the file currently at `destination`, if there is one
fn backup(destination: &Path) -> Result<Option<NamedTempFile>> {
    if !destination.is_file() {
        return Ok(None);
    }
    let contents = fs::read(destination).map_err(write_error(destination))?;
    stage(destination, &contents).map(Some)
}

/// Put `destination` back the way it was before this run
fn rollback(previous: Option<NamedTempFile>, destination: &Path) {
    let restored = match previous {
        Some(file) => file.persist(destination).map(drop).map_err(|err| err.error),
        None => fs::remove_file(destination),
    };
    match restored {
        Ok(()) => debug!("Rolled back {}", destination.display()),
        Err(err) => warn!(
            "Could not roll back {}: {}",
            destination.display(),
            err
        ),
    }
}

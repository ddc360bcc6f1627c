// Where rendered artifacts go. The generator itself never touches the
// filesystem; `run_generate` hands its artifacts to a sink.

use std::path::{Path, PathBuf};

use crate::error::{CodegenError, CodegenResult};
use crate::rust_gen::Artifact;

pub trait ArtifactSink {
    fn write(&mut self, artifact: &Artifact) -> CodegenResult<()>;
}

/// Writes artifacts under a root directory, creating parents as needed.
#[derive(Debug)]
pub struct DirSink {
    root: PathBuf,
}

impl DirSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirSink { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactSink for DirSink {
    fn write(&mut self, artifact: &Artifact) -> CodegenResult<()> {
        let path = self.root.join(&artifact.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CodegenError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&path, &artifact.contents).map_err(|source| CodegenError::Write { path, source })
    }
}

/// Keeps artifacts in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub artifacts: Vec<Artifact>,
}

impl ArtifactSink for MemorySink {
    fn write(&mut self, artifact: &Artifact) -> CodegenResult<()> {
        self.artifacts.push(artifact.clone());
        Ok(())
    }
}

pub fn write_all(sink: &mut dyn ArtifactSink, artifacts: &[Artifact]) -> CodegenResult<()> {
    for artifact in artifacts {
        sink.write(artifact)?;
    }
    Ok(())
}

/// Check that every artifact landed under `root` and is non-empty.
pub fn verify_written(root: &Path, artifacts: &[Artifact]) -> Vec<String> {
    let mut problems = Vec::new();
    for artifact in artifacts {
        let path = root.join(&artifact.path);
        match std::fs::metadata(&path) {
            Ok(m) if m.len() == 0 => problems.push(format!("empty: {}", path.display())),
            Err(_) => problems.push(format!("missing: {}", path.display())),
            _ => {}
        }
    }
    problems
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(path: &str, contents: &str) -> Artifact {
        Artifact {
            path: PathBuf::from(path),
            contents: contents.to_string(),
        }
    }

    #[test]
    fn dir_sink_creates_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirSink::new(dir.path().join("out"));
        let artifacts = [artifact("lib.rs", "pub mod classes;\n"), artifact("classes/foo.rs", "pub struct Foo;\n")];
        write_all(&mut sink, &artifacts).unwrap();

        let foo = std::fs::read_to_string(sink.root().join("classes/foo.rs")).unwrap();
        assert_eq!(foo, "pub struct Foo;\n");
        assert!(verify_written(sink.root(), &artifacts).is_empty());
    }

    #[test]
    fn verify_reports_missing_and_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("empty.rs"), "").unwrap();
        let problems = verify_written(
            dir.path(),
            &[artifact("empty.rs", "x"), artifact("gone.rs", "x")],
        );
        assert_eq!(problems.len(), 2);
        assert!(problems[0].starts_with("empty: "));
        assert!(problems[1].starts_with("missing: "));
    }

    #[test]
    fn write_errors_carry_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a dir").unwrap();
        let mut sink = DirSink::new(&blocker);
        let err = sink.write(&artifact("classes/foo.rs", "x")).unwrap_err();
        assert!(matches!(err, CodegenError::Write { .. }));
        assert!(err.to_string().contains("blocker"));
    }

    #[test]
    fn memory_sink_keeps_order() {
        let mut sink = MemorySink::default();
        write_all(&mut sink, &[artifact("a.rs", "a"), artifact("b.rs", "b")]).unwrap();
        let paths: Vec<_> = sink.artifacts.iter().map(|a| a.path.clone()).collect();
        assert_eq!(paths, [PathBuf::from("a.rs"), PathBuf::from("b.rs")]);
    }
}

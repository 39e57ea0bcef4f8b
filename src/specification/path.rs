//! Lexical path helpers shared by the upload and download mappers.
//!
//! None of these touch the filesystem: normalization resolves `.` and `..`
//! textually and never follows symlinks.

use std::path::{Component, Path, PathBuf};

use super::SpecificationError;

/// Characters the artifact service refuses in artifact names.
const INVALID_ARTIFACT_NAME_CHARACTERS: &[(char, &str)] = &[
    ('"', "double quote"),
    (':', "colon"),
    ('<', "less than"),
    ('>', "greater than"),
    ('|', "vertical bar"),
    ('*', "asterisk"),
    ('?', "question mark"),
    ('\r', "carriage return"),
    ('\n', "line feed"),
    ('\\', "backslash"),
    ('/', "forward slash"),
];

/// Rejects artifact names the remote store cannot represent.
///
/// # Errors
///
/// Returns [`SpecificationError::InvalidArtifactName`] for empty names or names
/// containing any forbidden character.
pub fn validate_artifact_name(name: &str) -> Result<(), SpecificationError> {
    if name.trim().is_empty() {
        return Err(SpecificationError::invalid_name(name, "name is empty"));
    }

    for (character, label) in INVALID_ARTIFACT_NAME_CHARACTERS {
        if name.contains(*character) {
            return Err(SpecificationError::invalid_name(
                name,
                format!("contains forbidden character ({label})"),
            ));
        }
    }

    Ok(())
}

/// Makes `path` absolute against the current directory, without resolving symlinks.
///
/// # Errors
///
/// Returns [`SpecificationError::Io`] if the current directory cannot be read.
pub fn to_absolute(path: &Path) -> Result<PathBuf, SpecificationError> {
    if path.is_absolute() {
        return Ok(lexical_normalize(path));
    }
    let cwd = std::env::current_dir().map_err(|e| SpecificationError::io(path, e))?;
    Ok(lexical_normalize(&cwd.join(path)))
}

/// Removes `.` components and resolves `..` components lexically.
#[must_use]
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                // `/..` is still `/`
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            _ => components.push(component),
        }
    }

    components.iter().collect()
}

/// Joins the components of a relative path with forward slashes.
///
/// The result never carries a leading separator regardless of the host's
/// path style. Returns `None` when a component is not valid UTF-8.
#[must_use]
pub fn to_remote_path(relative: &Path) -> Option<String> {
    let parts = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_str()),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

/// Rebases a remote container entry under `root`.
///
/// Container entries are reported as `<artifact>/<relative>`; the artifact
/// prefix is dropped when present. Both `/` and `\` separate remote segments.
///
/// # Errors
///
/// Returns [`SpecificationError::InvalidPath`] if the entry would resolve
/// outside `root` (a `..` segment).
pub fn rebase_remote_path(
    remote_path: &str,
    artifact_name: &str,
    root: &Path,
) -> Result<PathBuf, SpecificationError> {
    let mut segments = remote_path
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .peekable();

    if segments.peek() == Some(&artifact_name) {
        segments.next();
    }

    let mut local = root.to_path_buf();
    for segment in segments {
        if segment == ".." || segment.contains(':') {
            return Err(SpecificationError::invalid_path(remote_path, root));
        }
        local.push(segment);
    }

    Ok(local)
}

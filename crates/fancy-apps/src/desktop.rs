//! Desktop integration: desktop icons and the clipboard.

use log::{debug, info};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use url::Url;

/// Result of copying a desktop file onto the desktop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Copied(PathBuf),
    /// The destination exists and overwriting was not confirmed.
    Declined(PathBuf),
}

/// Copy `source` into `desktop_dir`, keeping its file name.
///
/// `confirm_overwrite` is only asked when the destination already exists.
pub fn export_to_desktop<F>(
    source: &Path,
    desktop_dir: &Path,
    confirm_overwrite: F,
) -> std::io::Result<ExportOutcome>
where
    F: FnOnce(&Path) -> bool,
{
    let file_name = source.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} has no file name", source.display()),
        )
    })?;
    let destination = desktop_dir.join(file_name);

    if destination.exists() && !confirm_overwrite(&destination) {
        debug!("Not overwriting {}", destination.display());
        return Ok(ExportOutcome::Declined(destination));
    }

    std::fs::copy(source, &destination)?;
    info!("Copied {} to {}", source.display(), destination.display());
    Ok(ExportOutcome::Copied(destination))
}

/// `file://` URI of an absolute path. Encodes the raw path bytes.
pub fn file_uri(path: &Path) -> std::io::Result<String> {
    Url::from_file_path(path)
        .map(String::from)
        .map_err(|()| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not an absolute path", path.display()),
            )
        })
}

/// Places file references on the system clipboard.
pub trait Clipboard {
    fn copy_file_reference(&self, path: &Path) -> std::io::Result<()>;
}

/// Clipboard backed by `wl-copy` on Wayland and `xclip` on X11.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl SystemClipboard {
    fn command(mime: &str) -> Command {
        if std::env::var_os("WAYLAND_DISPLAY").is_some() {
            let mut cmd = Command::new("wl-copy");
            cmd.args(["--type", mime]);
            cmd
        } else {
            let mut cmd = Command::new("xclip");
            cmd.args(["-selection", "clipboard", "-t", mime]);
            cmd
        }
    }
}

impl Clipboard for SystemClipboard {
    fn copy_file_reference(&self, path: &Path) -> std::io::Result<()> {
        let uri = file_uri(path)?;
        let mut child = Self::command("text/uri-list")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            writeln!(stdin, "{}", uri)?;
        }
        // The helper keeps serving the selection; reap it in the background
        std::thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn copies_onto_the_desktop() {
        let src = TempDir::new().unwrap();
        let desktop = TempDir::new().unwrap();
        let source = src.path().join("editor.desktop");
        fs::write(&source, "[Desktop Entry]\n").unwrap();

        let outcome = export_to_desktop(&source, desktop.path(), |_| panic!("no prompt")).unwrap();
        let destination = desktop.path().join("editor.desktop");
        assert_eq!(outcome, ExportOutcome::Copied(destination.clone()));
        assert_eq!(fs::read_to_string(destination).unwrap(), "[Desktop Entry]\n");
    }

    #[test]
    fn existing_files_need_confirmation() {
        let src = TempDir::new().unwrap();
        let desktop = TempDir::new().unwrap();
        let source = src.path().join("editor.desktop");
        let destination = desktop.path().join("editor.desktop");
        fs::write(&source, "new").unwrap();
        fs::write(&destination, "old").unwrap();

        let outcome = export_to_desktop(&source, desktop.path(), |_| false).unwrap();
        assert_eq!(outcome, ExportOutcome::Declined(destination.clone()));
        assert_eq!(fs::read_to_string(&destination).unwrap(), "old");

        export_to_desktop(&source, desktop.path(), |_| true).unwrap();
        assert_eq!(fs::read_to_string(&destination).unwrap(), "new");
    }

    #[test]
    fn unwritable_destination_is_an_error() {
        let src = TempDir::new().unwrap();
        let source = src.path().join("editor.desktop");
        fs::write(&source, "x").unwrap();

        let missing = src.path().join("no/such/dir");
        assert!(export_to_desktop(&source, &missing, |_| true).is_err());
    }

    #[test]
    fn uris_are_percent_encoded() {
        assert_eq!(
            file_uri(Path::new("/usr/share/applications/my app.desktop")).unwrap(),
            "file:///usr/share/applications/my%20app.desktop"
        );
        assert!(file_uri(Path::new("apps/relative.desktop")).is_err());
    }

    #[test]
    fn non_utf8_paths_keep_their_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"/apps/caf\xe9.desktop"));
        assert_eq!(file_uri(path).unwrap(), "file:///apps/caf%E9.desktop");
    }
}

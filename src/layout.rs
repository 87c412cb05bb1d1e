//! Where things live on disk.  The layout is handed to whoever needs
//! it rather than held in globals, so tests can point the whole
//! pipeline at a scratch directory.

use crate::errors::ZoomError;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Default name of the data root, relative to the working directory.
pub const DEFAULT_ROOT: &str = "my_data";

/// Default frame file extension.
pub const DEFAULT_EXTENSION: &str = "png";

/// The directory tree a movie is rendered into:
///
/// ```text
/// <root>/
///   bin/
///     calced/
///     image/
///   image/
///     1.png 2.png ...
///   <movie>
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    root: PathBuf,
    extension: String,
}

impl Layout {
    /// A layout rooted at `root`, with PNG frames.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Layout {
            root: root.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Use a different frame file name extension.  Frames are encoded
    /// as PNG whatever the extension says.
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// The data root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scratch space for partially computed artifacts.
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    /// Scratch space for computed escape-time data.
    pub fn calced_dir(&self) -> PathBuf {
        self.bin_dir().join("calced")
    }

    /// Scratch space for intermediate images.
    pub fn bin_image_dir(&self) -> PathBuf {
        self.bin_dir().join("image")
    }

    /// Where finished frames are written.
    pub fn image_dir(&self) -> PathBuf {
        self.root.join("image")
    }

    /// The frame file for a 1-based index.  Its existence is the only
    /// record that the frame was rendered.
    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.image_dir().join(format!("{}.{}", index, self.extension))
    }

    /// The output video, at the data root.
    pub fn movie_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Create every directory of the layout that does not exist yet.
    pub fn create(&self) -> Result<(), ZoomError> {
        for dir in &[
            self.root.clone(),
            self.bin_dir(),
            self.calced_dir(),
            self.bin_image_dir(),
            self.image_dir(),
        ] {
            fs::create_dir_all(dir).map_err(|e| ZoomError::io(dir, e))?;
        }
        Ok(())
    }

    /// Throw away everything computed so far.  The movie file at the
    /// root, if any, is left alone.
    pub fn purge(&self) -> Result<(), ZoomError> {
        for dir in &[self.bin_dir(), self.image_dir()] {
            match fs::remove_dir_all(dir) {
                Ok(()) => {}
                Err(ref e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(ZoomError::io(dir, e)),
            }
        }
        Ok(())
    }
}

/// Ask a yes/no question.  Only an answer of exactly `y` counts as
/// yes; anything else, including no answer at all, is no.
pub fn confirm<R: BufRead, W: Write>(
    prompt: &str,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool> {
    writeln!(output, "{} [y/N]", prompt)?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim() == "y")
}

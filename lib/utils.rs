//! Miscellaneous output helpers for driver programs.
//!
//! Both macros use `?` and so must be called from a function returning a
//! `Result` whose error type can be built from [`std::io::Error`] and
//! [`ndarray_npy::WriteNpzError`] (e.g. `anyhow::Result`).

#[doc(hidden)]
pub use ndarray_npy as __npy;

/// Create a directory and all of its parents if it does not already exist.
#[macro_export]
macro_rules! mkdir {
    ( $dir:expr ) => {
        {
            let dir: &std::path::Path = $dir.as_ref();
            if !dir.is_dir() {
                tracing::info!(dir = %dir.display(), "creating output directory");
                std::fs::create_dir_all(dir)?;
            }
        }
    }
}

/// Write a set of named arrays to a `.npz` archive.
///
/// ```ignore
/// write_npz!(
///     outdir.join("data.npz"),
///     arrays: {
///         "x" => &x,
///         "y" => &y,
///     }
/// );
/// ```
#[macro_export]
macro_rules! write_npz {
    (
        $filename:expr,
        arrays: { $( $key:expr => $val:expr ),+ $(,)? }
    ) => {
        {
            let path: std::path::PathBuf = $filename.into();
            let file = std::fs::File::create(&path)?;
            let mut npz = $crate::utils::__npy::NpzWriter::new(file);
            $( npz.add_array($key, $val)?; )+
            npz.finish()?;
            tracing::info!(path = %path.display(), "wrote arrays");
        }
    }
}

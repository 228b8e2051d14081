//! Small filesystem and output helpers for driver programs.

/// Create a directory and all of its parents, printing a warning to stderr
/// on failure.
#[macro_export]
macro_rules! mkdir {
    ( $dir:expr ) => {
        if let Err(err) = std::fs::create_dir_all(&$dir) {
            eprintln!("couldn't create directory {:?}: {}", $dir, err);
        }
    }
}

/// Write named arrays to a `.npz` file, panicking on failure.
///
/// ```ignore
/// write_npz!(
///     outdir.join("run.npz"),
///     arrays: {
///         "time" => &time,
///         "signal" => &signal,
///     }
/// );
/// ```
#[macro_export]
macro_rules! write_npz {
    (
        $path:expr,
        arrays: { $( $name:expr => $arr:expr ),* $(,)? }
    ) => {
        {
            let path = $path;
            let mut npz = ::ndarray_npy::NpzWriter::new(
                std::fs::File::create(&path)
                    .unwrap_or_else(|err| {
                        panic!("couldn't create file {:?}: {}", path, err)
                    })
            );
            $(
                npz.add_array($name, $arr)
                    .unwrap_or_else(|err| {
                        panic!("couldn't write array {:?}: {}", $name, err)
                    });
            )*
            npz.finish()
                .unwrap_or_else(|err| {
                    panic!("couldn't finalize {:?}: {}", path, err)
                });
        }
    }
}

//! Test corpus loading
//!
//! Discovers every `.test` file under a directory and parses it. Files are
//! returned sorted by relative path so the corpus order is stable.

use crate::ast::TestFile;
use crate::error::LoadError;
use crate::parser::CaseFileParser;
use std::fs;
use std::path::{Path, PathBuf};

/// File extension of test case files
pub const TEST_FILE_EXTENSION: &str = "test";

/// Load and parse every test file below `dir`
pub fn load_test_files(dir: &Path) -> Result<Vec<TestFile>, LoadError> {
    let mut test_files = Vec::new();

    for (relative_path, absolute_path) in find_test_files(dir)? {
        let source = fs::read_to_string(&absolute_path).map_err(|source| LoadError::Io {
            path: absolute_path.clone(),
            source,
        })?;

        let test_file = CaseFileParser::parse_file(&source, &relative_path).map_err(|error| {
            LoadError::Parse {
                file_name: relative_path.clone(),
                error,
            }
        })?;

        tracing::debug!(
            file = %relative_path,
            cases = test_file.test_case_count(),
            "loaded test file"
        );
        test_files.push(test_file);
    }

    Ok(test_files)
}

/// Find all test files, as (relative path, absolute path) pairs
fn find_test_files(dir: &Path) -> Result<Vec<(String, PathBuf)>, LoadError> {
    let mut files = Vec::new();
    find_test_files_recursive(dir, dir, &mut files)?;
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

fn find_test_files_recursive(
    root_dir: &Path,
    current_dir: &Path,
    files: &mut Vec<(String, PathBuf)>,
) -> Result<(), LoadError> {
    let io_error = |source| LoadError::Io {
        path: current_dir.to_path_buf(),
        source,
    };

    for entry in fs::read_dir(current_dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();

        if path.is_dir() {
            find_test_files_recursive(root_dir, &path, files)?;
        } else if path
            .extension()
            .is_some_and(|ext| ext == TEST_FILE_EXTENSION)
        {
            let relative_path = path
                .strip_prefix(root_dir)
                .unwrap_or(&path)
                .to_string_lossy()
                .replace('\\', "/");
            files.push((relative_path, path));
        }
    }

    Ok(())
}

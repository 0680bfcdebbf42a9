use std::fs;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use pss_qc::columns::check_file;
use pss_qc::error::QcError;
use pss_qc::output::write_columns;
use pss_qc::set_file::write_set_file;

fn scratch() -> (tempfile::TempDir, Utf8PathBuf) {
    let temp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    (temp, root)
}

#[test]
fn set_file_truncates_existing_output() {
    let (_temp, root) = scratch();
    let input = root.join("delta.txt");
    let output = root.join("delta.set");
    fs::write(&input, "  AB000001\n\nAB000002").unwrap();
    fs::write(&output, "stale\tstale\n").unwrap();

    let result = write_set_file(&input, &output).unwrap();

    assert_eq!(result.rows, 2);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "AB000001\tAB000001\nAB000002\tAB000002\n"
    );
}

#[test]
fn set_file_missing_input() {
    let (_temp, root) = scratch();
    let err = write_set_file(&root.join("none.txt"), &root.join("out.set")).unwrap_err();
    assert_matches!(err, QcError::InputOpen(_));
}

#[test]
fn column_check_output_lists_short_lines() {
    let (_temp, root) = scratch();
    let path = root.join("load.txt");
    fs::write(&path, "a\tb\nc\n").unwrap();

    let check = check_file(&path, 2).unwrap();
    assert!(!check.passed());

    let mut out = Vec::new();
    write_columns(&mut out, &check).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Lines With Missing Columns\n--------------------------\n"));
    assert!(text.contains("lineNum: 2, columns: [\"c\"] numColumns: 1"));
}

#[test]
fn column_check_passes_wide_lines() {
    let (_temp, root) = scratch();
    let path = root.join("load.txt");
    fs::write(&path, "a\tb\tc\n").unwrap();
    assert!(check_file(&path, 2).unwrap().passed());
}

use std::io::Write;

use cl_domain::config::Config;
use cl_lint::{JobSource, Validator};
use cronlint::cli::lint;
use cronlint::cli::Format;

fn validator() -> Validator {
    Validator::from_config(&Config::default(), None)
}

fn crontab(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn dash_means_standard_input() {
    assert_eq!(lint::source_for("-").name(), "standard input");
    assert_eq!(
        lint::source_for("/etc/crontab").name(),
        "crontab file /etc/crontab"
    );
}

#[test]
fn check_passes_on_warnings_and_fails_on_errors() {
    let v = validator();
    assert!(lint::check(&v, "0 0 1 * 1", Format::Text).unwrap());
    assert!(!lint::check(&v, "0 0 30 2 *", Format::Json).unwrap());
}

#[test]
fn lint_reflects_file_validity() {
    let v = validator();
    let good = crontab("0 3 * * * /usr/bin/backup > /dev/null 2>&1\n");
    let bad = crontab("0 3 * * * /usr/bin/backup > /dev/null 2>&1\n99 * * * * /bin/x\n");

    assert!(lint::lint(&v, good.path().to_str().unwrap(), Format::Text).unwrap());
    assert!(!lint::lint(&v, bad.path().to_str().unwrap(), Format::Json).unwrap());
}

#[test]
fn unreadable_crontab_fails_lint_but_errors_overlaps() {
    let v = validator();
    assert!(!lint::lint(&v, "/nonexistent/crontab", Format::Text).unwrap());

    let err = lint::overlaps(&v, "/nonexistent/crontab", Format::Text).unwrap_err();
    assert!(err.to_string().contains("crontab file /nonexistent/crontab"));
}

#[test]
fn overlaps_succeeds_on_readable_crontab() {
    let file = crontab("0 * * * * /usr/bin/a\n0 * * * * /usr/bin/b\n");
    let ok = lint::overlaps(&validator(), file.path().to_str().unwrap(), Format::Json).unwrap();
    assert!(ok);
}

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn memory_write_then_read() {
    let access = MemoryFileAccess::new();
    let mut out = access.open("log.txt", OpenMode::Write).unwrap();
    assert!(out.write("first\n"));
    assert!(out.write("second\n"));
    assert!(out.read_line().is_none());

    let mut input = access.open("log.txt", OpenMode::Read).unwrap();
    assert!(!input.is_eof());
    assert_eq!(input.read_line().as_deref(), Some("first"));
    assert_eq!(input.read_line().as_deref(), Some("second"));
    assert!(input.is_eof());
}

#[test]
fn memory_append_keeps_contents() {
    let access = MemoryFileAccess::new();
    access.insert("a", "x\n");
    let mut out = access.open("a", OpenMode::Append).unwrap();
    out.write("y\n");
    assert_eq!(access.contents("a").as_deref(), Some("x\ny\n"));
}

#[test]
fn memory_read_missing_fails() {
    let access = MemoryFileAccess::new();
    assert!(access.open("nope", OpenMode::Read).is_none());
    assert!(!access.delete("nope"));
    access.insert("yes", "");
    assert!(access.delete("yes"));
    assert!(!access.exists("yes"));
}

#[test]
fn modes_parse() {
    assert_eq!(OpenMode::parse("r"), Some(OpenMode::Read));
    assert_eq!(OpenMode::parse("a"), Some(OpenMode::Append));
    assert_eq!(OpenMode::parse("rw"), None);
}

#[test]
fn fs_names_cannot_escape_root() {
    let access = FsFileAccess::new("/tmp/cbot-root");
    assert!(access.resolve("../etc/passwd").is_none());
    assert!(access.resolve("/etc/passwd").is_none());
    assert!(access.resolve("").is_none());
    assert_eq!(
        access.resolve("data/x.txt"),
        Some(PathBuf::from("/tmp/cbot-root/data/x.txt"))
    );
}

#[test]
fn fs_round_trip() {
    let dir = std::env::temp_dir().join(format!("cbot-fs-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let access = FsFileAccess::new(&dir);
    {
        let mut out = access.open("t.txt", OpenMode::Write).unwrap();
        assert!(out.write("hello\nworld\n"));
    }
    let mut input = access.open("t.txt", OpenMode::Read).unwrap();
    assert_eq!(input.read_line().as_deref(), Some("hello"));
    assert_eq!(input.read_line().as_deref(), Some("world"));
    assert!(input.is_eof());
    assert!(access.delete("t.txt"));
    let _ = std::fs::remove_dir(&dir);
}
